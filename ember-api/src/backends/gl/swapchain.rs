use crate::gl::texture::flip_rows;
use crate::gl::{
    calculate_window_hash, gl_format_info, EmberDeviceContextGl, GlDeferredDestroy, WindowHash,
    NONE_FRAMEBUFFER,
};
use crate::{
    EmberDeviceContext, EmberFramebuffer, EmberResult, EmberSampleCount, EmberSwapchainDef,
};
use raw_window_handle::HasRawWindowHandle;
use std::sync::{Arc, Mutex};

use crate::gl::gl43;

/// The window's default framebuffer. Multisampled swapchains draw into an offscreen
/// framebuffer that is blitted into the back buffer when the swapchain is unbound.
#[derive(Debug)]
pub struct EmberSwapchainGl {
    device_context: EmberDeviceContextGl,
    window_hash: WindowHash,
    swapchain_def: Mutex<EmberSwapchainDef>,
    multisampled_framebuffer: Mutex<Option<Arc<EmberFramebuffer>>>,
}

impl Drop for EmberSwapchainGl {
    fn drop(&mut self) {
        self.device_context
            .destroy_later(GlDeferredDestroy::Surface(self.window_hash));
    }
}

impl EmberSwapchainGl {
    pub fn swapchain_def(&self) -> EmberSwapchainDef {
        self.swapchain_def.lock().unwrap().clone()
    }

    pub fn gl_window_hash(&self) -> WindowHash {
        self.window_hash
    }

    pub fn multisampled_framebuffer(&self) -> Option<Arc<EmberFramebuffer>> {
        self.multisampled_framebuffer.lock().unwrap().clone()
    }

    pub fn new(
        device_context: &EmberDeviceContextGl,
        raw_window_handle: &dyn HasRawWindowHandle,
        swapchain_def: &EmberSwapchainDef,
    ) -> EmberResult<Self> {
        let window_hash = calculate_window_hash(raw_window_handle);
        let multisampled = swapchain_def.sample_count != EmberSampleCount::SampleCount1;

        {
            let mut gl_context = device_context.gl_context();

            // The depth buffer belongs to the multisampled framebuffer when there is one
            let surface_depth_format = if multisampled {
                None
            } else {
                swapchain_def.depth_stencil_format
            };

            gl_context.create_surface(
                window_hash,
                raw_window_handle,
                swapchain_def.width,
                swapchain_def.height,
                swapchain_def.format,
                surface_depth_format,
            )?;
            gl_context.make_current(window_hash)?;
        }

        if !swapchain_def.enable_vsync {
            log::debug!("vsync is always enabled on gl surfaces");
        }

        let multisampled_framebuffer = match Self::create_multisampled_framebuffer(
            device_context,
            swapchain_def,
        ) {
            Ok(framebuffer) => framebuffer,
            Err(e) => {
                device_context.gl_context().destroy_surface(window_hash);
                return Err(e);
            }
        };

        log::debug!(
            "Created gl swapchain {}x{} {:?} {:?}",
            swapchain_def.width,
            swapchain_def.height,
            swapchain_def.format,
            swapchain_def.sample_count
        );

        Ok(EmberSwapchainGl {
            device_context: device_context.clone(),
            window_hash,
            swapchain_def: Mutex::new(swapchain_def.clone()),
            multisampled_framebuffer: Mutex::new(multisampled_framebuffer),
        })
    }

    fn create_multisampled_framebuffer(
        device_context: &EmberDeviceContextGl,
        swapchain_def: &EmberSwapchainDef,
    ) -> EmberResult<Option<Arc<EmberFramebuffer>>> {
        if swapchain_def.sample_count == EmberSampleCount::SampleCount1 {
            return Ok(None);
        }

        let framebuffer = EmberDeviceContext::Gl(device_context.clone())
            .create_framebuffer(&swapchain_def.multisampled_framebuffer_def())?;
        Ok(Some(framebuffer))
    }

    pub fn present(&self) -> EmberResult<()> {
        let mut gl_context = self.device_context.gl_context();
        gl_context.swap_buffers(self.window_hash)
    }

    pub fn resize(
        &self,
        swapchain_def: &EmberSwapchainDef,
    ) -> EmberResult<()> {
        self.device_context.gl_context().resize_surface(
            self.window_hash,
            swapchain_def.width,
            swapchain_def.height,
        )?;

        let multisampled_framebuffer =
            Self::create_multisampled_framebuffer(&self.device_context, swapchain_def)?;
        *self.multisampled_framebuffer.lock().unwrap() = multisampled_framebuffer;
        *self.swapchain_def.lock().unwrap() = swapchain_def.clone();

        log::debug!(
            "Resized gl swapchain to {}x{}",
            swapchain_def.width,
            swapchain_def.height
        );
        Ok(())
    }

    pub fn read_back_buffer(&self) -> EmberResult<Vec<u8>> {
        let swapchain_def = self.swapchain_def();
        let format_info = gl_format_info(swapchain_def.format).ok_or_else(|| {
            format!(
                "Swapchain format {:?} cannot be read back",
                swapchain_def.format
            )
        })?;

        let pixels = {
            let mut gl_context = self.device_context.gl_context();
            gl_context.make_current(self.window_hash)?;
            gl_context.gl_bind_framebuffer(gl43::READ_FRAMEBUFFER, NONE_FRAMEBUFFER)?;
            gl_context.gl_read_buffer(gl43::BACK_LEFT)?;
            gl_context.gl_read_pixels(
                0,
                0,
                swapchain_def.width as i32,
                swapchain_def.height as i32,
                format_info.pixel_format,
                format_info.pixel_type,
            )?
        };

        let row_pitch = swapchain_def.width as usize * swapchain_def.format.size_in_bytes()? as usize;
        Ok(flip_rows(&pixels, row_pitch))
    }
}
