#[cfg(any(feature = "ember-dx12", test))]
use crate::dx12::{EmberApiDefDx12, EmberApiDx12};
#[cfg(any(feature = "ember-gl", test))]
use crate::gl::{EmberApiDefGl, EmberApiGl};
use crate::*;
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};

/// Primary entry point to using the API. Use the `new_*` functions to initialize the desired
/// backend.
///
/// **This API object must persist for the lifetime of all objects created through it.** This
/// is verified at runtime when the API object is destroyed - either explicitly via `destroy()` or
/// by dropping the object.
///
/// Once the API object is created, use `device_context()` to obtain a cloneable handle to the
/// device. The `EmberDeviceContext` is the primary way of interacting with the API once it has
/// been initialized. These contexts and all other objects created through them must be dropped
/// before dropping `EmberApi` or calling `EmberApi::destroy()`.
pub enum EmberApi {
    #[cfg(any(feature = "ember-gl", test))]
    Gl(EmberApiGl),
    #[cfg(any(feature = "ember-dx12", test))]
    Dx12(EmberApiDx12),
}

impl EmberApi {
    /// Create a device using the "default" backend for the platform: dx12 on windows, gl
    /// everywhere else (or whichever backend is compiled in). The gl backend creates its context
    /// against `window`.
    #[allow(unreachable_code, unused_variables)]
    pub fn new(
        display: &dyn HasRawDisplayHandle,
        window: &dyn HasRawWindowHandle,
        api_def: &EmberApiDef,
    ) -> EmberResult<Self> {
        #[cfg(all(feature = "ember-dx12", target_os = "windows"))]
        {
            return EmberApi::new_dx12(api_def, &Default::default());
        }

        #[cfg(any(feature = "ember-gl", test))]
        {
            return EmberApi::new_gl(display, window, api_def, &Default::default());
        }

        #[cfg(any(feature = "ember-dx12", test))]
        {
            return EmberApi::new_dx12(api_def, &Default::default());
        }
    }

    /// Initialize a device using gl
    #[cfg(any(feature = "ember-gl", test))]
    pub fn new_gl(
        display: &dyn HasRawDisplayHandle,
        window: &dyn HasRawWindowHandle,
        api_def: &EmberApiDef,
        gl_api_def: &EmberApiDefGl,
    ) -> EmberResult<Self> {
        Ok(EmberApi::Gl(EmberApiGl::new(
            display, window, api_def, gl_api_def,
        )?))
    }

    /// Initialize a device using dx12
    #[cfg(any(feature = "ember-dx12", test))]
    pub fn new_dx12(
        api_def: &EmberApiDef,
        dx12_api_def: &EmberApiDefDx12,
    ) -> EmberResult<Self> {
        Ok(EmberApi::Dx12(EmberApiDx12::new(api_def, dx12_api_def)?))
    }

    pub fn api_type(&self) -> EmberApiType {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberApi::Gl(_) => EmberApiType::Gl,
            #[cfg(any(feature = "ember-dx12", test))]
            EmberApi::Dx12(_) => EmberApiType::Dx12,
        }
    }

    /// Create a cloneable handle to the device. Most of the interaction with the graphics backend
    /// is done through this handle.
    ///
    /// The `EmberDeviceContext` does not need to be kept in scope. As long as the `EmberApi`
    /// remains in scope, dropping the device context does not do anything, and it can be obtained
    /// again by calling this function.
    pub fn device_context(&self) -> EmberResult<EmberDeviceContext> {
        Ok(match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberApi::Gl(inner) => EmberDeviceContext::Gl(inner.device_context()?.clone()),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberApi::Dx12(inner) => EmberDeviceContext::Dx12(inner.device_context()?.clone()),
        })
    }

    /// Destroys the graphics API instance. Any `EmberDeviceContext` created through this API, and
    /// any object created through those device contexts, must be dropped before calling destroy()
    ///
    /// `destroy()` is automatically called if EmberApi is dropped and it has not yet been called,
    /// so it is not necessary to call this function explicitly.
    pub fn destroy(&mut self) -> EmberResult<()> {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberApi::Gl(inner) => inner.destroy(),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberApi::Dx12(inner) => inner.destroy(),
        }
    }

    /// Get the underlying gl API object.
    #[cfg(any(feature = "ember-gl", test))]
    pub fn gl_api(&self) -> Option<&EmberApiGl> {
        match self {
            EmberApi::Gl(inner) => Some(inner),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberApi::Dx12(_) => None,
        }
    }

    /// Get the underlying dx12 API object.
    #[cfg(any(feature = "ember-dx12", test))]
    pub fn dx12_api(&self) -> Option<&EmberApiDx12> {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberApi::Gl(_) => None,
            EmberApi::Dx12(inner) => Some(inner),
        }
    }
}
