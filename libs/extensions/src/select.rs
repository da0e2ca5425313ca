use tracing::debug;

use crate::descriptor::ExtensionProviderDescriptor;

/// Keeps the descriptors that apply to `transport_name`, preserving discovery order.
///
/// A descriptor applies when its transport equals the name, when it is the `all`
/// wildcard, or when it has no transport and the name is `default`.
pub fn select(
    pool: &[ExtensionProviderDescriptor],
    transport_name: &str,
) -> Vec<ExtensionProviderDescriptor> {
    let selected: Vec<_> = pool
        .iter()
        .filter(|descriptor| descriptor.applies_to(transport_name))
        .cloned()
        .collect();
    debug!(
        transport = transport_name,
        available = pool.len(),
        selected = selected.len(),
        "selected consumption extensions"
    );
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(descriptors: &[ExtensionProviderDescriptor]) -> Vec<&str> {
        descriptors.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn keeps_named_and_wildcard_providers_only() {
        let pool = vec![
            ExtensionProviderDescriptor::new("aFooExtension", Some("aName"), 0),
            ExtensionProviderDescriptor::new("aBarExtension", Some("anotherName"), 0),
            ExtensionProviderDescriptor::new("aBazExtension", Some("all"), 0),
            ExtensionProviderDescriptor::new("anUntaggedExtension", None, 0),
        ];

        assert_eq!(
            ids(&select(&pool, "aName")),
            vec!["aFooExtension", "aBazExtension"]
        );
    }

    #[test]
    fn default_transport_picks_up_untransported_providers() {
        let pool = vec![
            ExtensionProviderDescriptor::new("aFooExtension", None, 0),
            ExtensionProviderDescriptor::new("aBarExtension", Some("aName"), 0),
            ExtensionProviderDescriptor::new("aBazExtension", None, 0),
            ExtensionProviderDescriptor::new("explicitDefault", Some("default"), 0),
        ];

        assert_eq!(
            ids(&select(&pool, "default")),
            vec!["aFooExtension", "aBazExtension", "explicitDefault"]
        );
    }

    #[test]
    fn selection_does_not_reorder_by_priority() {
        let pool = vec![
            ExtensionProviderDescriptor::new("low", Some("all"), -10),
            ExtensionProviderDescriptor::new("high", Some("all"), 10),
        ];
        assert_eq!(ids(&select(&pool, "x")), vec!["low", "high"]);
    }
}
