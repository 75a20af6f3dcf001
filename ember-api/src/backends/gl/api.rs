use crate::{EmberApiDef, EmberResult};
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};
use std::sync::Arc;

use crate::gl::{EmberDeviceContextGl, EmberDeviceContextGlInner};

/// Gl-specific configuration
#[derive(Debug, Clone, Default)]
pub struct EmberApiDefGl {
    /// Log debug groups and markers as they are pushed
    pub enable_debug_output: bool,
}

#[derive(Debug)]
pub struct EmberApiGl {
    device_context: Option<EmberDeviceContextGl>,
}

impl Drop for EmberApiGl {
    fn drop(&mut self) {
        if let Err(e) = self.destroy() {
            log::error!("Failed to destroy the gl device: {}", e);
        }
    }
}

impl EmberApiGl {
    pub fn device_context(&self) -> EmberResult<&EmberDeviceContextGl> {
        Ok(self
            .device_context
            .as_ref()
            .ok_or("The gl device was already destroyed")?)
    }

    /// The context is created against `window`, which must outlive the device
    pub fn new(
        display: &dyn HasRawDisplayHandle,
        window: &dyn HasRawWindowHandle,
        api_def: &EmberApiDef,
        gl_api_def: &EmberApiDefGl,
    ) -> EmberResult<Self> {
        let inner = Arc::new(EmberDeviceContextGlInner::new(
            display, window, api_def, gl_api_def,
        )?);
        let device_context = EmberDeviceContextGl::new(inner)?;

        Ok(EmberApiGl {
            device_context: Some(device_context),
        })
    }

    pub fn destroy(&mut self) -> EmberResult<()> {
        if let Some(device_context) = self.device_context.take() {
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
