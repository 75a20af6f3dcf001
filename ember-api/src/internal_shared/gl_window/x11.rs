use std::ffi::{c_void, CString};
use std::os::raw::{c_int, c_ulong};

use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

use x11::glx;
use x11::xlib;

use super::{GlConfig, GlError, Profile};

// See https://www.khronos.org/registry/OpenGL/extensions/ARB/GLX_ARB_create_context.txt

type GlXCreateContextAttribsARB = unsafe extern "C" fn(
    dpy: *mut xlib::Display,
    fbc: glx::GLXFBConfig,
    share_context: glx::GLXContext,
    direct: xlib::Bool,
    attribs: *const c_int,
) -> glx::GLXContext;

// See https://www.khronos.org/registry/OpenGL/extensions/EXT/EXT_swap_control.txt

type GlXSwapIntervalEXT =
    unsafe extern "C" fn(dpy: *mut xlib::Display, drawable: glx::GLXDrawable, interval: i32);

// See https://www.khronos.org/registry/OpenGL/extensions/ARB/ARB_framebuffer_sRGB.txt

const GLX_FRAMEBUFFER_SRGB_CAPABLE_ARB: i32 = 0x20B2;

extern "C" fn err_handler(
    _dpy: *mut xlib::Display,
    _err: *mut xlib::XErrorEvent,
) -> i32 {
    0
}

fn get_proc_address(symbol: &str) -> *const c_void {
    let symbol = match CString::new(symbol) {
        Ok(symbol) => symbol,
        Err(_) => return std::ptr::null(),
    };

    unsafe {
        match glx::glXGetProcAddress(symbol.as_ptr() as *const u8) {
            Some(addr) => addr as *const c_void,
            None => std::ptr::null(),
        }
    }
}

fn window_of(window: RawWindowHandle) -> Result<c_ulong, GlError> {
    match window {
        RawWindowHandle::Xlib(handle) if handle.window != 0 => Ok(handle.window),
        _ => Err(GlError::InvalidWindowHandle),
    }
}

pub struct GlSurface {
    window: c_ulong,
}

pub struct GlContext {
    display: *mut xlib::Display,
    context: glx::GLXContext,
    swap_interval: Option<GlXSwapIntervalEXT>,
    vsync: bool,
}

impl GlContext {
    pub fn create(
        display: RawDisplayHandle,
        window: RawWindowHandle,
        config: &GlConfig,
    ) -> Result<(GlContext, GlSurface), GlError> {
        let display = match display {
            RawDisplayHandle::Xlib(handle) if !handle.display.is_null() => {
                handle.display as *mut xlib::Display
            }
            _ => return Err(GlError::InvalidWindowHandle),
        };
        let window = window_of(window)?;

        let prev_callback = unsafe { xlib::XSetErrorHandler(Some(err_handler)) };
        let result = Self::create_with_display(display, window, config);
        unsafe {
            xlib::XSetErrorHandler(prev_callback);
        }

        result
    }

    fn create_with_display(
        display: *mut xlib::Display,
        window: c_ulong,
        config: &GlConfig,
    ) -> Result<(GlContext, GlSurface), GlError> {
        let screen = unsafe { xlib::XDefaultScreen(display) };

        #[rustfmt::skip]
        let fb_attribs = [
            glx::GLX_X_RENDERABLE, 1,
            glx::GLX_X_VISUAL_TYPE, glx::GLX_TRUE_COLOR,
            glx::GLX_DRAWABLE_TYPE, glx::GLX_WINDOW_BIT,
            glx::GLX_RENDER_TYPE, glx::GLX_RGBA_BIT,
            glx::GLX_RED_SIZE, config.red_bits as i32,
            glx::GLX_GREEN_SIZE, config.green_bits as i32,
            glx::GLX_BLUE_SIZE, config.blue_bits as i32,
            glx::GLX_ALPHA_SIZE, config.alpha_bits as i32,
            glx::GLX_DEPTH_SIZE, config.depth_bits as i32,
            glx::GLX_STENCIL_SIZE, config.stencil_bits as i32,
            glx::GLX_DOUBLEBUFFER, config.double_buffer as i32,
            glx::GLX_SAMPLE_BUFFERS, config.samples.is_some() as i32,
            glx::GLX_SAMPLES, config.samples.unwrap_or(0) as i32,
            GLX_FRAMEBUFFER_SRGB_CAPABLE_ARB, config.srgb as i32,
            0,
        ];

        let mut n_configs = 0;
        let fb_configs =
            unsafe { glx::glXChooseFBConfig(display, screen, fb_attribs.as_ptr(), &mut n_configs) };

        if fb_configs.is_null() || n_configs <= 0 {
            return Err(GlError::CreationFailed);
        }

        let fb_config = unsafe { *fb_configs };
        unsafe {
            xlib::XFree(fb_configs as *mut c_void);
        }

        #[allow(non_snake_case)]
        let glXCreateContextAttribsARB: GlXCreateContextAttribsARB = unsafe {
            let addr = get_proc_address("glXCreateContextAttribsARB");
            if addr.is_null() {
                return Err(GlError::CreationFailed);
            } else {
                std::mem::transmute(addr)
            }
        };

        let swap_interval: Option<GlXSwapIntervalEXT> = unsafe {
            let addr = get_proc_address("glXSwapIntervalEXT");
            if addr.is_null() {
                None
            } else {
                Some(std::mem::transmute(addr))
            }
        };

        let profile_mask = match config.profile {
            Profile::Core => glx::arb::GLX_CONTEXT_CORE_PROFILE_BIT_ARB,
            Profile::Compatibility => glx::arb::GLX_CONTEXT_COMPATIBILITY_PROFILE_BIT_ARB,
        };

        let mut flags = 0;
        if config.use_debug_context {
            flags |= glx::arb::GLX_CONTEXT_DEBUG_BIT_ARB;
        }

        #[rustfmt::skip]
        let ctx_attribs = [
            glx::arb::GLX_CONTEXT_MAJOR_VERSION_ARB, config.version.0 as i32,
            glx::arb::GLX_CONTEXT_MINOR_VERSION_ARB, config.version.1 as i32,
            glx::arb::GLX_CONTEXT_PROFILE_MASK_ARB, profile_mask,
            glx::arb::GLX_CONTEXT_FLAGS_ARB, flags,
            0,
        ];

        let context = unsafe {
            glXCreateContextAttribsARB(
                display,
                fb_config,
                std::ptr::null_mut(),
                1,
                ctx_attribs.as_ptr(),
            )
        };

        if context.is_null() {
            return Err(GlError::VersionNotSupported);
        }

        let context = GlContext {
            display,
            context,
            swap_interval,
            vsync: config.vsync,
        };

        let surface = context.surface_for_window(window);
        Ok((context, surface))
    }

    fn surface_for_window(
        &self,
        window: c_ulong,
    ) -> GlSurface {
        if let Some(swap_interval) = self.swap_interval {
            unsafe {
                swap_interval(self.display, window, self.vsync as i32);
            }
        }

        GlSurface { window }
    }

    /// The window must have been created with a visual compatible with the context's config
    pub fn create_surface(
        &self,
        window: RawWindowHandle,
    ) -> Result<GlSurface, GlError> {
        let window = window_of(window)?;
        Ok(self.surface_for_window(window))
    }

    pub fn make_current(
        &self,
        surface: &GlSurface,
    ) -> Result<(), GlError> {
        let result = unsafe { glx::glXMakeCurrent(self.display, surface.window, self.context) };
        if result == 0 {
            return Err(GlError::MakeCurrentFailed);
        }

        Ok(())
    }

    pub fn make_not_current(&self) {
        unsafe {
            glx::glXMakeCurrent(self.display, 0, std::ptr::null_mut());
        }
    }

    pub fn get_proc_address(
        &self,
        symbol: &str,
    ) -> *const c_void {
        get_proc_address(symbol)
    }

    pub fn swap_buffers(
        &self,
        surface: &GlSurface,
    ) {
        unsafe {
            glx::glXSwapBuffers(self.display, surface.window);
        }
    }

    // GLX drawables follow the window size
    pub fn update_surface(
        &self,
        _surface: &GlSurface,
    ) {
    }
}

impl Drop for GlContext {
    fn drop(&mut self) {
        unsafe {
            glx::glXMakeCurrent(self.display, 0, std::ptr::null_mut());
            glx::glXDestroyContext(self.display, self.context);
        }
    }
}
