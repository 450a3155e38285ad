//! Storage instance selection strategies.

use std::convert::Infallible;
use std::str::FromStr;

use chrono::Utc;
use rand::Rng;
use tracing::debug;

use super::registry::{StorageProfile, StorageRegistry};

/// Policy used to pick a storage instance for an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStrategy {
    /// Round-robin keyed by wall-clock second: `ids[t mod N]`.
    ///
    /// Two selections within the same second pick the same instance. This
    /// only spreads load statistically and carries no back-pressure signal.
    LoadBalance,
    /// Uniform pick from the thread-local RNG. Not reproducible.
    Random,
    /// Always the first configured instance. No failover at this layer.
    PrimaryFirst,
    /// Content-aware routing hook. Not yet differentiated: always primary.
    ByFileType,
    /// Any name not listed above. Routes to the primary instance.
    Unrecognized,
}

impl SelectionStrategy {
    /// Parse a strategy name. Unknown names map to `Unrecognized`.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "load_balance" => Self::LoadBalance,
            "random" => Self::Random,
            "primary_first" => Self::PrimaryFirst,
            "by_file_type" => Self::ByFileType,
            _ => Self::Unrecognized,
        }
    }

    /// Canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoadBalance => "load_balance",
            Self::Random => "random",
            Self::PrimaryFirst => "primary_first",
            Self::ByFileType => "by_file_type",
            Self::Unrecognized => "unrecognized",
        }
    }
}

impl FromStr for SelectionStrategy {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl std::fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a strategy to one registry entry.
#[derive(Debug, Clone, Copy)]
pub struct StorageSelector<'a> {
    registry: &'a StorageRegistry,
}

impl<'a> StorageSelector<'a> {
    /// Create a selector over a registry.
    #[must_use]
    pub const fn new(registry: &'a StorageRegistry) -> Self {
        Self { registry }
    }

    /// Pick an instance id using the current wall-clock second.
    #[must_use]
    pub fn select(&self, strategy: SelectionStrategy) -> &'a str {
        self.select_at(strategy, Utc::now().timestamp())
    }

    /// Pick an instance id as if the clock read `unix_secs`.
    #[must_use]
    pub fn select_at(&self, strategy: SelectionStrategy, unix_secs: i64) -> &'a str {
        let profiles = self.registry.profiles();
        let count = self.registry.len();

        let index = match strategy {
            SelectionStrategy::LoadBalance => {
                let len = i64::try_from(count).unwrap_or(i64::MAX);
                usize::try_from(unix_secs.rem_euclid(len)).unwrap_or(0)
            }
            SelectionStrategy::Random => rand::rng().random_range(0..count),
            SelectionStrategy::PrimaryFirst
            | SelectionStrategy::ByFileType
            | SelectionStrategy::Unrecognized => 0,
        };

        let id = profiles[index].id.as_str();
        debug!(strategy = %strategy, storage_id = id, "Storage instance selected");
        id
    }

    /// Pick an instance and resolve its profile.
    #[must_use]
    pub fn select_profile(&self, strategy: SelectionStrategy) -> &'a StorageProfile {
        self.registry.get_profile(Some(self.select(strategy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::registry::tests::registry;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("load_balance", SelectionStrategy::LoadBalance)]
    #[case("random", SelectionStrategy::Random)]
    #[case("primary_first", SelectionStrategy::PrimaryFirst)]
    #[case("by_file_type", SelectionStrategy::ByFileType)]
    #[case(" Load_Balance ", SelectionStrategy::LoadBalance)]
    #[case("round_robin", SelectionStrategy::Unrecognized)]
    #[case("", SelectionStrategy::Unrecognized)]
    fn test_parse(#[case] name: &str, #[case] expected: SelectionStrategy) {
        assert_eq!(SelectionStrategy::parse(name), expected);
        assert_eq!(name.parse::<SelectionStrategy>(), Ok(expected));
    }

    #[test]
    fn test_primary_first_is_stable() {
        let registry = registry(4);
        let selector = StorageSelector::new(&registry);
        for t in 0..20 {
            assert_eq!(
                selector.select_at(SelectionStrategy::PrimaryFirst, t),
                "storage1"
            );
        }
        assert_eq!(selector.select(SelectionStrategy::PrimaryFirst), "storage1");
    }

    #[rstest]
    #[case(SelectionStrategy::ByFileType)]
    #[case(SelectionStrategy::Unrecognized)]
    fn test_fallback_strategies_pick_primary(#[case] strategy: SelectionStrategy) {
        let registry = registry(4);
        let selector = StorageSelector::new(&registry);
        assert_eq!(selector.select_at(strategy, 7), "storage1");
    }

    #[test]
    fn test_load_balance_cycles_by_second() {
        let registry = registry(4);
        let selector = StorageSelector::new(&registry);
        let picked: Vec<_> = (100..108)
            .map(|t| selector.select_at(SelectionStrategy::LoadBalance, t))
            .collect();
        assert_eq!(
            picked,
            [
                "storage1", "storage2", "storage3", "storage4", "storage1", "storage2",
                "storage3", "storage4"
            ]
        );
    }

    #[test]
    fn test_load_balance_negative_clock() {
        let registry = registry(4);
        let selector = StorageSelector::new(&registry);
        assert_eq!(
            selector.select_at(SelectionStrategy::LoadBalance, -1),
            "storage4"
        );
    }

    #[test]
    fn test_random_stays_within_registry() {
        let registry = registry(4);
        let selector = StorageSelector::new(&registry);
        for _ in 0..200 {
            let id = selector.select(SelectionStrategy::Random);
            assert!(registry.find(id).is_some());
        }
    }

    #[test]
    fn test_select_profile_resolves() {
        let registry = registry(2);
        let selector = StorageSelector::new(&registry);
        let profile = selector.select_profile(SelectionStrategy::PrimaryFirst);
        assert_eq!(profile.id, "storage1");
        assert_eq!(profile.endpoint_url, "https://storage1.supabase.co");
    }

    proptest! {
        /// index = floor(t) mod N, and same second means same id.
        #[test]
        fn prop_load_balance_index(t in 0i64..4_000_000_000, n in 1usize..10) {
            let registry = registry(n);
            let selector = StorageSelector::new(&registry);
            let first = selector.select_at(SelectionStrategy::LoadBalance, t);
            let second = selector.select_at(SelectionStrategy::LoadBalance, t);
            let expected = usize::try_from(t).unwrap() % n;

            prop_assert_eq!(first, second);
            prop_assert_eq!(first, registry.profiles()[expected].id.as_str());
        }
    }
}
