use serde::{Deserialize, Serialize};

use crate::types::CacheConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfigFile {
    pub cache_padding: usize,
    pub permuted_v: bool,
}

impl CacheConfigFile {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ENCACHE_CACHE_PADDING") {
            if let Ok(v) = val.parse() {
                self.cache_padding = v;
            }
        }
        if let Ok(val) = std::env::var("ENCACHE_PERMUTED_V") {
            if let Ok(v) = val.parse() {
                self.permuted_v = v;
            }
        }
    }

    #[must_use]
    pub const fn to_cache_config(&self) -> CacheConfig {
        CacheConfig::new(self.cache_padding, self.permuted_v)
    }
}
