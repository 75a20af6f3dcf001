use crate::{EmberApiDef, EmberResult};
use std::sync::Arc;

use crate::dx12::{EmberDeviceContextDx12, EmberDeviceContextDx12Inner};

/// Dx12-specific configuration
#[derive(Debug, Clone)]
pub struct EmberApiDefDx12 {
    /// Validate resource states and descriptor use as work executes, even when the shared
    /// validation mode is disabled. Failures are logged and counted by the native device.
    pub enable_debug_layer: bool,
}

impl Default for EmberApiDefDx12 {
    fn default() -> Self {
        EmberApiDefDx12 {
            enable_debug_layer: cfg!(debug_assertions),
        }
    }
}

#[derive(Debug)]
pub struct EmberApiDx12 {
    device_context: Option<EmberDeviceContextDx12>,
}

impl Drop for EmberApiDx12 {
    fn drop(&mut self) {
        if let Err(e) = self.destroy() {
            log::error!("Failed to destroy the dx12 device: {}", e);
        }
    }
}

impl EmberApiDx12 {
    pub fn device_context(&self) -> EmberResult<&EmberDeviceContextDx12> {
        Ok(self
            .device_context
            .as_ref()
            .ok_or("The dx12 device was already destroyed")?)
    }

    pub fn new(
        api_def: &EmberApiDef,
        dx12_api_def: &EmberApiDefDx12,
    ) -> EmberResult<Self> {
        let inner = Arc::new(EmberDeviceContextDx12Inner::new(api_def, dx12_api_def)?);
        let device_context = EmberDeviceContextDx12::new(inner)?;

        Ok(EmberApiDx12 {
            device_context: Some(device_context),
        })
    }

    pub fn destroy(&mut self) -> EmberResult<()> {
        if let Some(device_context) = self.device_context.take() {
            // Let in-flight work finish so the queue thread holds no references
            if let Err(e) = device_context.wait_for_idle() {
                log::warn!("Destroying the dx12 device without waiting for idle: {}", e);
            }

            let inner = device_context.inner.clone();

            #[cfg(debug_assertions)]
            #[cfg(feature = "track-device-contexts")]
            let _create_index = device_context.create_index;

            // This should be the final device context
            std::mem::drop(device_context);

            let _strong_count = Arc::strong_count(&inner);
            match Arc::try_unwrap(inner) {
                Ok(inner) => std::mem::drop(inner),
                Err(_arc) => {
                    #[cfg(debug_assertions)]
                    #[cfg(feature = "track-device-contexts")]
                    {
                        let mut all_contexts = _arc.all_contexts.lock().unwrap();
                        all_contexts.remove(&_create_index);
                        for (k, v) in all_contexts.iter_mut() {
                            v.resolve();
                            println!("context allocation: {}\n{:?}", k, v);
                        }
                    }

                    Err(format!(
                        "Could not destroy device, {} references to it exist",
                        _strong_count
                    ))?;
                }
            }
        }

        Ok(())
    }
}
