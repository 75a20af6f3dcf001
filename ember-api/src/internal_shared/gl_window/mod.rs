//! Platform GL contexts for native windows.
//!
//! One context is created against the device's window. Every other window gets a surface whose
//! pixel format matches the context, so the context (and every object it owns) can draw to any of
//! them by switching the current surface.
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

use std::ffi::c_void;
use std::marker::PhantomData;

#[cfg(target_os = "windows")]
mod win;
#[cfg(target_os = "windows")]
use win as platform;

#[cfg(target_os = "linux")]
mod x11;
#[cfg(target_os = "linux")]
use self::x11 as platform;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "macos")]
use macos as platform;

#[derive(Debug, Clone)]
pub struct GlConfig {
    pub version: (u8, u8),
    pub profile: Profile,
    pub red_bits: u8,
    pub blue_bits: u8,
    pub green_bits: u8,
    pub alpha_bits: u8,
    pub depth_bits: u8,
    pub stencil_bits: u8,
    pub samples: Option<u8>,
    pub srgb: bool,
    pub double_buffer: bool,
    pub vsync: bool,

    // Not available on macOS
    pub use_debug_context: bool,
}

impl Default for GlConfig {
    fn default() -> Self {
        GlConfig {
            version: (4, 3),
            profile: Profile::Core,
            red_bits: 8,
            blue_bits: 8,
            green_bits: 8,
            alpha_bits: 8,
            depth_bits: 24,
            stencil_bits: 8,
            samples: None,
            srgb: true,
            double_buffer: true,
            vsync: true,
            use_debug_context: false,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Profile {
    Compatibility,
    Core,
}

#[derive(Debug)]
pub enum GlError {
    InvalidWindowHandle,
    VersionNotSupported,
    CreationFailed,
    MakeCurrentFailed,
}

impl std::fmt::Display for GlError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        match self {
            GlError::InvalidWindowHandle => write!(f, "The window handle cannot host a GL surface"),
            GlError::VersionNotSupported => write!(f, "The requested GL version is not supported"),
            GlError::CreationFailed => write!(f, "Failed to create the GL context"),
            GlError::MakeCurrentFailed => write!(f, "Failed to make the GL context current"),
        }
    }
}

impl From<GlError> for crate::EmberError {
    fn from(error: GlError) -> Self {
        crate::EmberError::StringError(error.to_string())
    }
}

/// A window the context can draw to
pub struct GlSurface {
    surface: platform::GlSurface,
    phantom: PhantomData<*mut ()>,
}

pub struct GlContext {
    context: platform::GlContext,
    phantom: PhantomData<*mut ()>,
}

impl GlContext {
    /// Returns the context and the surface of the window it was created against
    pub fn create(
        display: RawDisplayHandle,
        window: RawWindowHandle,
        config: &GlConfig,
    ) -> Result<(GlContext, GlSurface), GlError> {
        let (context, surface) = platform::GlContext::create(display, window, config)?;
        Ok((
            GlContext {
                context,
                phantom: PhantomData,
            },
            GlSurface {
                surface,
                phantom: PhantomData,
            },
        ))
    }

    /// The window's pixel format is set to the one the context was created with
    pub fn create_surface(
        &self,
        window: RawWindowHandle,
    ) -> Result<GlSurface, GlError> {
        let surface = self.context.create_surface(window)?;
        Ok(GlSurface {
            surface,
            phantom: PhantomData,
        })
    }

    pub fn make_current(
        &self,
        surface: &GlSurface,
    ) -> Result<(), GlError> {
        self.context.make_current(&surface.surface)
    }

    pub fn make_not_current(&self) {
        self.context.make_not_current();
    }

    pub fn get_proc_address(
        &self,
        symbol: &str,
    ) -> *const c_void {
        self.context.get_proc_address(symbol)
    }

    pub fn swap_buffers(
        &self,
        surface: &GlSurface,
    ) {
        self.context.swap_buffers(&surface.surface);
    }

    /// Picks up a new drawable size after the window was resized
    pub fn update_surface(
        &self,
        surface: &GlSurface,
    ) {
        self.context.update_surface(&surface.surface);
    }
}
