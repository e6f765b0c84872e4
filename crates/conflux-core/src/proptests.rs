//! Property-based tests for the prefixing strategy.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::prefix::{
        apply_name_prefix, apply_resource_prefix, strip_name_prefix, strip_resource_prefix,
        ResourcePrefixFormat,
    };
    use proptest::prelude::*;

    // Prefixes free of both separators ('/' and '+'), per mount-time
    // validation.
    const PREFIX: &str = "[a-z][a-z0-9_-]{0,11}";
    const SCHEME: &str = "[a-z][a-z0-9]{0,7}";
    const REST: &str = "[a-zA-Z0-9/._-]{0,24}";

    proptest! {
        #[test]
        fn test_path_prefix_roundtrip(
            scheme in SCHEME,
            rest in REST,
            prefix in PREFIX,
        ) {
            let uri = format!("{scheme}://{rest}");
            let prefixed =
                apply_resource_prefix(&uri, &prefix, ResourcePrefixFormat::Path).unwrap();
            prop_assert_eq!(
                strip_resource_prefix(&prefixed, &prefix, ResourcePrefixFormat::Path),
                Some(uri)
            );
        }

        #[test]
        fn test_protocol_prefix_roundtrip(
            scheme in SCHEME,
            rest in REST,
            prefix in PREFIX,
        ) {
            let uri = format!("{scheme}://{rest}");
            let prefixed =
                apply_resource_prefix(&uri, &prefix, ResourcePrefixFormat::Protocol).unwrap();
            prop_assert_eq!(
                strip_resource_prefix(&prefixed, &prefix, ResourcePrefixFormat::Protocol),
                Some(uri)
            );
        }

        #[test]
        fn test_formats_are_not_interchangeable(
            scheme in SCHEME,
            rest in REST,
            prefix in PREFIX,
        ) {
            let uri = format!("{scheme}://{rest}");
            let path_prefixed =
                apply_resource_prefix(&uri, &prefix, ResourcePrefixFormat::Path).unwrap();
            // A path-prefixed URI never strips under the protocol format.
            prop_assert_eq!(
                strip_resource_prefix(&path_prefixed, &prefix, ResourcePrefixFormat::Protocol),
                None
            );
        }

        #[test]
        fn test_name_prefix_roundtrip(
            name in "[a-zA-Z0-9_./-]{1,24}",
            prefix in PREFIX,
        ) {
            let prefixed = apply_name_prefix(&name, &prefix);
            prop_assert_eq!(strip_name_prefix(&prefixed, &prefix), Some(name.as_str()));
        }
    }
}
