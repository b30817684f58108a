//! Watch sets for import diagnostics.

use crate::models::EntityId;
use std::collections::HashSet;

/// A set of entity identifiers to trace during an import run.
///
/// Membership only controls diagnostic logging; it never alters what is
/// written or whether the run succeeds. An empty set means no tracing
/// was requested.
#[derive(Debug, Clone, Default)]
pub struct WatchSet {
    ids: HashSet<EntityId>,
}

impl WatchSet {
    /// Creates an empty watch set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a watch set from raw identifier strings.
    ///
    /// Each string is parsed as a canonical entity identifier.
    /// Duplicates collapse silently. A malformed string logs one warning
    /// and is dropped; building never fails outright, so a fully
    /// malformed input simply yields an empty set.
    pub fn build<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ids = HashSet::new();
        for entry in raw {
            let entry = entry.as_ref();
            match EntityId::parse(entry) {
                Ok(id) => {
                    ids.insert(id);
                },
                Err(e) => {
                    tracing::warn!(raw = entry, error = %e, "ignoring invalid watch identifier");
                },
            }
        }
        Self { ids }
    }

    /// Checks whether an identifier is watched.
    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.ids.contains(id)
    }

    /// Returns the number of watched identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns whether no tracing was requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_build_empty() {
        let watch = WatchSet::build(Vec::<String>::new());
        assert!(watch.is_empty());
    }

    #[test]
    fn test_build_drops_malformed_entries() {
        let valid = EntityId::random();
        let watch = WatchSet::build([valid.to_string(), "not-a-uuid".to_string()]);
        assert_eq!(watch.len(), 1);
        assert!(watch.contains(&valid));
    }

    #[test]
    fn test_build_collapses_duplicates() {
        let id = EntityId::random();
        let watch = WatchSet::build([id.to_string(), id.to_string()]);
        assert_eq!(watch.len(), 1);
    }

    #[test]
    fn test_build_all_malformed_yields_empty_set() {
        let watch = WatchSet::build(["", "xyz", "1234"]);
        assert!(watch.is_empty());
    }

    proptest! {
        #[test]
        fn build_never_fails_and_keeps_only_valid_entries(
            raw in proptest::collection::vec(
                prop_oneof![
                    "[a-z0-9-]{0,40}",
                    proptest::arbitrary::any::<u128>()
                        .prop_map(|n| uuid::Uuid::from_u128(n).to_string()),
                ],
                0..16,
            ),
        ) {
            let watch = WatchSet::build(&raw);
            let valid: std::collections::HashSet<_> = raw
                .iter()
                .filter_map(|s| EntityId::parse(s).ok())
                .collect();
            prop_assert!(watch.len() <= raw.len());
            prop_assert_eq!(watch.len(), valid.len());
            for id in &valid {
                prop_assert!(watch.contains(id));
            }
        }
    }
}
