use std::cell::Cell;
use std::ffi::c_void;
use std::str::FromStr;

use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

use cocoa::appkit::{
    NSOpenGLContext, NSOpenGLContextParameter, NSOpenGLPFAAccelerated, NSOpenGLPFAAlphaSize,
    NSOpenGLPFAColorSize, NSOpenGLPFADepthSize, NSOpenGLPFADoubleBuffer, NSOpenGLPFAMultisample,
    NSOpenGLPFAOpenGLProfile, NSOpenGLPFASampleBuffers, NSOpenGLPFASamples, NSOpenGLPFAStencilSize,
    NSOpenGLPixelFormat, NSOpenGLProfileVersion3_2Core, NSOpenGLProfileVersion4_1Core,
    NSOpenGLProfileVersionLegacy,
};
use cocoa::base::{id, nil};
use cocoa::foundation::NSAutoreleasePool;

use core_foundation::base::TCFType;
use core_foundation::bundle::{CFBundleGetBundleWithIdentifier, CFBundleGetFunctionPointerForName};
use core_foundation::string::CFString;

use objc::runtime::Object;
use objc::{msg_send, sel, sel_impl};

use super::{GlConfig, GlError, Profile};

fn view_of(window: RawWindowHandle) -> Result<id, GlError> {
    let handle = match window {
        RawWindowHandle::AppKit(handle) => handle,
        _ => return Err(GlError::InvalidWindowHandle),
    };

    if !handle.ns_view.is_null() {
        Ok(handle.ns_view as id)
    } else if !handle.ns_window.is_null() {
        let ns_window = handle.ns_window as *mut Object;
        let ns_view: *mut c_void = unsafe { msg_send![ns_window, contentView] };
        if ns_view.is_null() {
            return Err(GlError::InvalidWindowHandle);
        }

        Ok(ns_view as id)
    } else {
        Err(GlError::InvalidWindowHandle)
    }
}

pub struct GlSurface {
    view: id,
}

pub struct GlContext {
    context: id,
    // The view the context currently draws to. A context has one view at a time.
    current_view: Cell<id>,
}

impl GlContext {
    pub fn create(
        _display: RawDisplayHandle,
        window: RawWindowHandle,
        config: &GlConfig,
    ) -> Result<(GlContext, GlSurface), GlError> {
        let view = view_of(window)?;

        unsafe {
            // macOS stops at 4.1. It is the closest core profile to what was asked for.
            let version = if config.version < (3, 2) && config.profile == Profile::Compatibility {
                NSOpenGLProfileVersionLegacy
            } else if config.version == (3, 2) && config.profile == Profile::Core {
                NSOpenGLProfileVersion3_2Core
            } else if config.version > (3, 2) && config.profile == Profile::Core {
                NSOpenGLProfileVersion4_1Core
            } else {
                return Err(GlError::VersionNotSupported);
            };

            #[rustfmt::skip]
            let mut attrs = vec![
                NSOpenGLPFAOpenGLProfile as u32, version as u32,
                NSOpenGLPFAColorSize as u32, (config.red_bits + config.blue_bits + config.green_bits) as u32,
                NSOpenGLPFAAlphaSize as u32, config.alpha_bits as u32,
                NSOpenGLPFADepthSize as u32, config.depth_bits as u32,
                NSOpenGLPFAStencilSize as u32, config.stencil_bits as u32,
                NSOpenGLPFAAccelerated as u32,
            ];

            if let Some(samples) = config.samples {
                #[rustfmt::skip]
                attrs.extend_from_slice(&[
                    NSOpenGLPFAMultisample as u32,
                    NSOpenGLPFASampleBuffers as u32, 1,
                    NSOpenGLPFASamples as u32, samples as u32,
                ]);
            }

            if config.double_buffer {
                attrs.push(NSOpenGLPFADoubleBuffer as u32);
            }

            attrs.push(0);

            let pixel_format = NSOpenGLPixelFormat::alloc(nil).initWithAttributes_(&attrs);

            if pixel_format == nil {
                return Err(GlError::CreationFailed);
            }

            let gl_context = NSOpenGLContext::alloc(nil).initWithFormat_shareContext_(pixel_format, nil);
            let () = msg_send![pixel_format, release];

            if gl_context == nil {
                return Err(GlError::CreationFailed);
            }

            gl_context.setView_(view);

            gl_context.setValues_forParameter_(
                &(config.vsync as i32),
                NSOpenGLContextParameter::NSOpenGLCPSwapInterval,
            );

            let context = GlContext {
                context: gl_context,
                current_view: Cell::new(view),
            };

            Ok((context, GlSurface { view }))
        }
    }

    pub fn create_surface(
        &self,
        window: RawWindowHandle,
    ) -> Result<GlSurface, GlError> {
        Ok(GlSurface {
            view: view_of(window)?,
        })
    }

    pub fn make_current(
        &self,
        surface: &GlSurface,
    ) -> Result<(), GlError> {
        unsafe {
            if self.current_view.get() != surface.view {
                self.context.setView_(surface.view);
                self.current_view.set(surface.view);
            }

            self.context.makeCurrentContext();
        }

        Ok(())
    }

    pub fn make_not_current(&self) {
        unsafe {
            NSOpenGLContext::clearCurrentContext(self.context);
        }
    }

    pub fn get_proc_address(
        &self,
        symbol: &str,
    ) -> *const c_void {
        let (symbol_name, framework_name) =
            match (CFString::from_str(symbol), CFString::from_str("com.apple.opengl")) {
                (Ok(symbol_name), Ok(framework_name)) => (symbol_name, framework_name),
                _ => return std::ptr::null(),
            };

        let framework =
            unsafe { CFBundleGetBundleWithIdentifier(framework_name.as_concrete_TypeRef()) };
        let addr = unsafe {
            CFBundleGetFunctionPointerForName(framework, symbol_name.as_concrete_TypeRef())
        };
        addr as *const c_void
    }

    pub fn swap_buffers(
        &self,
        surface: &GlSurface,
    ) {
        unsafe {
            if self.current_view.get() != surface.view {
                self.context.setView_(surface.view);
                self.current_view.set(surface.view);
            }

            let pool = NSAutoreleasePool::new(nil);
            self.context.flushBuffer();
            let _: () = msg_send![pool, release];
        }
    }

    pub fn update_surface(
        &self,
        surface: &GlSurface,
    ) {
        unsafe {
            if self.current_view.get() == surface.view {
                self.context.update();
            }
        }
    }
}

impl Drop for GlContext {
    fn drop(&mut self) {
        unsafe {
            let () = msg_send![self.context, release];
        }
    }
}
