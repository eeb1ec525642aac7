//! Sharded address-to-actor lookup.

// Layer 1: Standard library imports
use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::actor::cell::ActorOps;
use crate::util::Address;

/// Shard and capacity configuration for the [`Directory`].
///
/// Presets:
///
/// | Preset | buckets | initial capacity per bucket |
/// |---|---|---|
/// | `DEFAULT` | 32 | 64 |
/// | `SMALL` | 4 | 16 |
/// | `HIGH_CAPACITY` | 128 | 8192 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Shard count.
    pub buckets: usize,

    /// Pre-sized bucket capacity hint.
    pub initial_capacity_per_bucket: usize,
}

impl DirectoryConfig {
    /// General-purpose sizing.
    pub const DEFAULT: Self = Self {
        buckets: 32,
        initial_capacity_per_bucket: 64,
    };

    /// Sizing for tests and small tools.
    pub const SMALL: Self = Self {
        buckets: 4,
        initial_capacity_per_bucket: 16,
    };

    /// Sizing for stages holding tens of thousands of live actors.
    pub const HIGH_CAPACITY: Self = Self {
        buckets: 128,
        initial_capacity_per_bucket: 8192,
    };

    /// Custom sizing.
    pub fn new(buckets: usize, initial_capacity_per_bucket: usize) -> Self {
        Self {
            buckets,
            initial_capacity_per_bucket,
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.buckets == 0 {
            return Err("directory buckets must be >= 1".to_string());
        }
        if self.initial_capacity_per_bucket == 0 {
            return Err("directory initial_capacity_per_bucket must be >= 1".to_string());
        }
        Ok(())
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Occupancy snapshot of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryStats {
    /// Shard count.
    pub buckets: usize,

    /// Total registered actors.
    pub size: usize,

    /// Registered actors per shard, in shard order.
    pub distribution: Vec<usize>,
}

/// One registered actor: the shared typed proxy (type-erased) plus the
/// runtime control surface.
#[derive(Clone)]
pub(crate) struct DirectoryEntry {
    proxy: Arc<dyn Any + Send + Sync>,
    ops: Arc<dyn ActorOps>,
}

impl DirectoryEntry {
    pub(crate) fn new(proxy: Arc<dyn Any + Send + Sync>, ops: Arc<dyn ActorOps>) -> Self {
        Self { proxy, ops }
    }

    pub(crate) fn proxy(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.proxy
    }

    pub(crate) fn ops(&self) -> &Arc<dyn ActorOps> {
        &self.ops
    }
}

/// Two-level address index: `shards[hash(address) % buckets]` is a map
/// from address string to the registered actor.
///
/// The directory does not own actor lifetimes; the lifecycle machine
/// inserts at `Running` entry and removes at `Stopped` entry. All
/// operations are O(1) average and guarded per shard.
pub struct Directory {
    shards: Vec<RwLock<HashMap<String, DirectoryEntry>>>,
}

impl Directory {
    /// Build a directory from its configuration. A zero bucket count is
    /// treated as one bucket.
    pub fn new(config: DirectoryConfig) -> Self {
        let buckets = config.buckets.max(1);
        let capacity = config.initial_capacity_per_bucket.max(1);
        let shards = (0..buckets)
            .map(|_| RwLock::new(HashMap::with_capacity(capacity)))
            .collect();
        Self { shards }
    }

    fn shard_for(&self, key: &str) -> &RwLock<HashMap<String, DirectoryEntry>> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() as usize) % self.shards.len();
        &self.shards[index]
    }

    /// Register or overwrite the actor at an address.
    pub(crate) fn put(&self, address: &Address, entry: DirectoryEntry) {
        let key = address.to_string();
        self.shard_for(&key).write().insert(key, entry);
    }

    /// Look up the actor registered at an address.
    pub(crate) fn get(&self, address: &Address) -> Option<DirectoryEntry> {
        let key = address.to_string();
        self.shard_for(&key).read().get(&key).cloned()
    }

    /// Remove an address; true when it was present.
    pub(crate) fn remove(&self, address: &Address) -> bool {
        let key = address.to_string();
        self.shard_for(&key).write().remove(&key).is_some()
    }

    /// Snapshot of every registered entry.
    pub(crate) fn entries(&self) -> Vec<DirectoryEntry> {
        self.shards
            .iter()
            .flat_map(|shard| shard.read().values().cloned().collect::<Vec<_>>())
            .collect()
    }

    /// Total registered actors.
    pub fn size(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    /// Occupancy per shard.
    pub fn stats(&self) -> DirectoryStats {
        let distribution: Vec<usize> = self.shards.iter().map(|shard| shard.read().len()).collect();
        DirectoryStats {
            buckets: self.shards.len(),
            size: distribution.iter().sum(),
            distribution,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::actor::lifecycle::LifeCycleState;
    use crate::message::{ActorFault, Completes};
    use crate::util::AddressFactory;
    use std::time::Duration;

    struct FakeOps {
        address: Address,
    }

    impl ActorOps for FakeOps {
        fn address(&self) -> &Address {
            &self.address
        }
        fn protocol(&self) -> &str {
            "fake"
        }
        fn parent_address(&self) -> Option<&Address> {
            None
        }
        fn state(&self) -> LifeCycleState {
            LifeCycleState::Running
        }
        fn suspend(&self) {}
        fn resume(&self, _reason: Option<ActorFault>) {}
        fn restart(&self, _reason: ActorFault) {}
        fn stop(&self, _timeout: Option<Duration>) -> Completes<()> {
            Completes::resolved(())
        }
        fn restarts_within(&self, _period: Duration) -> u32 {
            0
        }
    }

    fn entry_for(address: Address) -> DirectoryEntry {
        DirectoryEntry::new(Arc::new(()), Arc::new(FakeOps { address }))
    }

    #[test]
    fn test_fresh_directory_is_empty() {
        let directory = Directory::new(DirectoryConfig::SMALL);
        assert_eq!(directory.size(), 0);
        let stats = directory.stats();
        assert_eq!(stats.buckets, 4);
        assert_eq!(stats.distribution, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_put_get_remove() {
        let directory = Directory::new(DirectoryConfig::default());
        let factory = AddressFactory::new();
        let address = factory.unique();

        directory.put(&address, entry_for(address));
        assert_eq!(directory.size(), 1);
        assert!(directory.get(&address).is_some());

        assert!(directory.remove(&address));
        assert!(!directory.remove(&address));
        assert!(directory.get(&address).is_none());
        assert_eq!(directory.size(), 0);
    }

    #[test]
    fn test_put_overwrites() {
        let directory = Directory::new(DirectoryConfig::default());
        let address = AddressFactory::new().unique();
        directory.put(&address, entry_for(address));
        directory.put(&address, entry_for(address));
        assert_eq!(directory.size(), 1);
    }

    #[test]
    fn test_distribution_covers_all_entries() {
        let directory = Directory::new(DirectoryConfig::new(8, 4));
        let factory = AddressFactory::new();
        for _ in 0..100 {
            let address = factory.unique();
            directory.put(&address, entry_for(address));
        }
        let stats = directory.stats();
        assert_eq!(stats.size, 100);
        assert_eq!(stats.distribution.len(), 8);
        assert_eq!(stats.distribution.iter().sum::<usize>(), 100);
    }

    #[test]
    fn test_config_validation() {
        assert!(DirectoryConfig::new(0, 8).validate().is_err());
        assert!(DirectoryConfig::new(8, 0).validate().is_err());
        assert!(DirectoryConfig::DEFAULT.validate().is_ok());
        assert!(DirectoryConfig::SMALL.validate().is_ok());
        assert!(DirectoryConfig::HIGH_CAPACITY.validate().is_ok());
    }
}
