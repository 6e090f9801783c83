use candle_core::Device;
use encache_core::{Backend, CacheConfig};

use crate::context::CandleContext;
use crate::error::CandleError;

#[derive(Debug, Clone)]
pub struct CandleBackend {
    device: Device,
    cache_config: Option<CacheConfig>,
}

impl CandleBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::with_device(Self::select_device())
    }

    #[must_use]
    pub fn with_device(device: Device) -> Self {
        Self {
            device,
            cache_config: None,
        }
    }

    #[must_use]
    pub fn cpu() -> Self {
        Self::with_device(Device::Cpu)
    }

    /// Advertises layout preferences to caches initialized on this backend.
    #[must_use]
    pub fn with_cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = Some(config);
        self
    }

    fn select_device() -> Device {
        #[cfg(feature = "metal")]
        {
            if let Ok(device) = Device::new_metal(0) {
                tracing::info!("Using Metal device");
                return device;
            }
        }

        #[cfg(feature = "cuda")]
        {
            if let Ok(device) = Device::new_cuda(0) {
                tracing::info!("Using CUDA device 0");
                return device;
            }
        }

        tracing::info!("Using CPU device");
        Device::Cpu
    }

    #[must_use]
    pub const fn device(&self) -> &Device {
        &self.device
    }
}

impl Default for CandleBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for CandleBackend {
    type Context = CandleContext;

    fn new_context(&self) -> Result<CandleContext, CandleError> {
        Ok(CandleContext::new(self.device.clone()))
    }

    fn cache_config(&self) -> Option<CacheConfig> {
        self.cache_config
    }
}
