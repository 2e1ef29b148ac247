use serde::{Deserialize, Serialize};

/// One mebibyte.
const MIB: usize = 1 << 20;

/// Engine tuning applied once when the store is opened.
///
/// Defaults are sized for records up to ~48 KiB: a 32 MiB block cache for
/// reads plus a 32 MiB write buffer, which `redb` receives as one combined
/// cache budget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Read cache budget in bytes.
    pub block_cache_size: usize,
    /// Write buffer budget in bytes.
    pub write_buffer_size: usize,
    /// When a committed `put` is guaranteed to be on disk.
    pub durability: Durability,
}

impl StoreConfig {
    /// Total cache handed to the engine.
    pub fn cache_size(&self) -> usize {
        self.block_cache_size.saturating_add(self.write_buffer_size)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            block_cache_size: 32 * MIB,
            write_buffer_size: 32 * MIB,
            durability: Durability::Immediate,
        }
    }
}

/// Commit durability for writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Durability {
    /// fsync on every commit.
    #[default]
    Immediate,
    /// Commits become durable at a later commit; a crash may lose the tail.
    Eventual,
}

impl From<Durability> for redb::Durability {
    fn from(d: Durability) -> Self {
        match d {
            Durability::Immediate => redb::Durability::Immediate,
            Durability::Eventual => redb::Durability::Eventual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert_eq!(c.block_cache_size, 32 * 1024 * 1024);
        assert_eq!(c.write_buffer_size, 32 * 1024 * 1024);
        assert_eq!(c.cache_size(), 64 * 1024 * 1024);
        assert_eq!(c.durability, Durability::Immediate);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c: StoreConfig = toml::from_str("durability = \"eventual\"").unwrap();
        assert_eq!(c.durability, Durability::Eventual);
        assert_eq!(c.block_cache_size, 32 * MIB);
    }
}
