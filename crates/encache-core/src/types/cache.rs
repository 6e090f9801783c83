use serde::{Deserialize, Serialize};

/// Backend layout preferences a cache must honor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Granularity, in positions, that cache storage is padded to.
    pub cache_padding: usize,
    /// Store values with their axes reordered to `[1, 2, 0, 3]`.
    pub permuted_v: bool,
}

impl CacheConfig {
    #[must_use]
    pub const fn new(cache_padding: usize, permuted_v: bool) -> Self {
        Self {
            cache_padding,
            permuted_v,
        }
    }
}

/// A buffer operation deferred until the owning context is computed.
#[derive(Debug, Clone)]
pub enum PendingOp<B> {
    Copy { src: B, dst: B },
}

impl<B> PendingOp<B> {
    #[must_use]
    pub const fn copy(src: B, dst: B) -> Self {
        Self::Copy { src, dst }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheState {
    Uninitialized,
    Empty,
    Cached,
    Closed,
}

impl std::fmt::Display for CacheState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Empty => "empty",
            Self::Cached => "cached",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_zero_value() {
        let config = CacheConfig::default();
        assert_eq!(config.cache_padding, 0);
        assert!(!config.permuted_v);
    }

    #[test]
    fn config_serde_roundtrip() {
        let config = CacheConfig::new(1, true);
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: CacheConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn state_display() {
        assert_eq!(CacheState::Cached.to_string(), "cached");
        assert_eq!(CacheState::Uninitialized.to_string(), "uninitialized");
    }
}
