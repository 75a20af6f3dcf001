use crate::{
    EmberApiDef, EmberApiType, EmberBufferDef, EmberCommandExecutor, EmberCommandList,
    EmberDeviceInfo, EmberFramebufferDef, EmberGraphicsCapabilities, EmberPipelineDef,
    EmberReplayStats, EmberResourceSetDef, EmberResult, EmberSamplerDef, EmberShaderPackage,
    EmberSwapchainDef, EmberTextureDef,
};
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::gl::{
    EmberApiDefGl, EmberBufferGl, EmberCommandExecutorGl, EmberFenceGl, EmberFramebufferGl,
    EmberPipelineGl, EmberResourceSetGl, EmberSamplerGl, EmberShaderModuleGl, EmberSwapchainGl,
    EmberTextureGl, EmberTimingQueryGl,
};

use crate::gl::gl43;
use crate::gl::{GlContext, GlDeferredDestroy};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

// GL timestamps are in nanoseconds
const GL_TIMESTAMP_FREQUENCY: u64 = 1_000_000_000;

/// The locked GL context, current on the locking thread until the guard drops
pub(crate) struct GlContextGuard<'a> {
    gl_context: MutexGuard<'a, GlContext>,
}

impl<'a> GlContextGuard<'a> {
    fn new(mut gl_context: MutexGuard<'a, GlContext>) -> Self {
        gl_context.acquire_thread();
        GlContextGuard { gl_context }
    }
}

impl<'a> Deref for GlContextGuard<'a> {
    type Target = GlContext;

    fn deref(&self) -> &GlContext {
        &self.gl_context
    }
}

impl<'a> DerefMut for GlContextGuard<'a> {
    fn deref_mut(&mut self) -> &mut GlContext {
        &mut self.gl_context
    }
}

impl<'a> Drop for GlContextGuard<'a> {
    fn drop(&mut self) {
        self.gl_context.release_thread();
    }
}

pub struct EmberDeviceContextGlInner {
    pub(crate) device_info: EmberDeviceInfo,

    gl_context: Mutex<GlContext>,
    deferred_destroys: Mutex<Vec<GlDeferredDestroy>>,
    destroyed: AtomicBool,
    pub(crate) wait_for_idle_after_submit: bool,
    pub(crate) gl_finish_call_count: AtomicU64,

    #[cfg(debug_assertions)]
    #[cfg(feature = "track-device-contexts")]
    next_create_index: AtomicU64,

    #[cfg(debug_assertions)]
    #[cfg(feature = "track-device-contexts")]
    pub(crate) all_contexts: Mutex<fnv::FnvHashMap<u64, backtrace::Backtrace>>,
}

impl Drop for EmberDeviceContextGlInner {
    fn drop(&mut self) {
        log::trace!("destroying device");
        if let (Ok(gl_context), Ok(deferred_destroys)) =
            (self.gl_context.get_mut(), self.deferred_destroys.get_mut())
        {
            gl_context.acquire_thread();
            for deferred_destroy in deferred_destroys.drain(..) {
                deferred_destroy.destroy(gl_context);
            }
            gl_context.release_thread();
        }
        self.destroyed.swap(true, Ordering::AcqRel);
    }
}

impl EmberDeviceContextGlInner {
    pub fn new(
        display: &dyn HasRawDisplayHandle,
        window: &dyn HasRawWindowHandle,
        api_def: &EmberApiDef,
        gl_api_def: &EmberApiDefGl,
    ) -> EmberResult<Self> {
        log::debug!("Initializing GL backend");
        let mut gl_context = GlContext::create(display, window)?;
        gl_context.acquire_thread();
        let result = Self::query_device_info(&mut gl_context, gl_api_def);
        gl_context.release_thread();
        let device_info = result?;

        #[cfg(debug_assertions)]
        #[cfg(feature = "track-device-contexts")]
        let all_contexts = {
            let create_backtrace = backtrace::Backtrace::new_unresolved();
            let mut all_contexts = fnv::FnvHashMap::<u64, backtrace::Backtrace>::default();
            all_contexts.insert(0, create_backtrace);
            all_contexts
        };

        Ok(EmberDeviceContextGlInner {
            device_info,
            gl_context: Mutex::new(gl_context),
            deferred_destroys: Default::default(),
            destroyed: AtomicBool::new(false),
            wait_for_idle_after_submit: api_def.wait_for_idle_after_submit,
            gl_finish_call_count: AtomicU64::new(0),

            #[cfg(debug_assertions)]
            #[cfg(feature = "track-device-contexts")]
            all_contexts: Mutex::new(all_contexts),

            #[cfg(debug_assertions)]
            #[cfg(feature = "track-device-contexts")]
            next_create_index: AtomicU64::new(1),
        })
    }

    fn query_device_info(
        gl_context: &mut GlContext,
        gl_api_def: &EmberApiDefGl,
    ) -> EmberResult<EmberDeviceInfo> {
        let renderer = gl_context.gl_get_string(gl43::RENDERER)?;
        log::debug!("Renderer: {}", renderer);
        let version = gl_context.gl_get_string(gl43::VERSION)?;
        log::debug!("Version: {}", version);
        let vendor = gl_context.gl_get_string(gl43::VENDOR)?;
        log::debug!("Vendor: {}", vendor);
        let shading_language_version = gl_context.gl_get_string(gl43::SHADING_LANGUAGE_VERSION)?;
        log::debug!("Shading Language Version: {}", shading_language_version);

        let max_vertex_attribute_count =
            gl_context.gl_get_integerv(gl43::MAX_VERTEX_ATTRIBS)? as u32;
        let min_uniform_buffer_offset_alignment =
            gl_context.gl_get_integerv(gl43::UNIFORM_BUFFER_OFFSET_ALIGNMENT)? as u32;
        let max_color_attachments = gl_context.gl_get_integerv(gl43::MAX_DRAW_BUFFERS)? as u32;

        let device_info = EmberDeviceInfo {
            api_type: EmberApiType::Gl,
            min_uniform_buffer_offset_alignment,
            max_vertex_attribute_count,
            max_color_attachments,
            timestamp_frequency: GL_TIMESTAMP_FREQUENCY,
            renderer_name: renderer,
        };

        if gl_api_def.enable_debug_output {
            gl_context.gl_enable(gl43::DEBUG_OUTPUT)?;
        }

        Ok(device_info)
    }
}

pub struct EmberDeviceContextGl {
    pub(crate) inner: Arc<EmberDeviceContextGlInner>,
    #[cfg(debug_assertions)]
    #[cfg(feature = "track-device-contexts")]
    pub(crate) create_index: u64,
}

impl std::fmt::Debug for EmberDeviceContextGl {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        f.debug_struct("EmberDeviceContextGl")
            .field("renderer", &self.inner.device_info.renderer_name)
            .finish()
    }
}

impl Clone for EmberDeviceContextGl {
    fn clone(&self) -> Self {
        #[cfg(debug_assertions)]
        #[cfg(feature = "track-device-contexts")]
        let create_index = {
            let create_index = self.inner.next_create_index.fetch_add(1, Ordering::Relaxed);

            let create_backtrace = backtrace::Backtrace::new_unresolved();
            self.inner
                .as_ref()
                .all_contexts
                .lock()
                .unwrap()
                .insert(create_index, create_backtrace);

            log::trace!("Cloned EmberDeviceContextGl create_index {}", create_index);
            create_index
        };

        EmberDeviceContextGl {
            inner: self.inner.clone(),
            #[cfg(debug_assertions)]
            #[cfg(feature = "track-device-contexts")]
            create_index,
        }
    }
}

impl Drop for EmberDeviceContextGl {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        #[cfg(feature = "track-device-contexts")]
        {
            self.inner
                .all_contexts
                .lock()
                .unwrap()
                .remove(&self.create_index);
        }
    }
}

impl Into<crate::EmberDeviceContext> for EmberDeviceContextGl {
    fn into(self) -> crate::EmberDeviceContext {
        crate::EmberDeviceContext::Gl(self)
    }
}

impl EmberDeviceContextGl {
    pub fn device_info(&self) -> &EmberDeviceInfo {
        &self.inner.device_info
    }

    pub fn graphics_capabilities(&self) -> EmberGraphicsCapabilities {
        EmberGraphicsCapabilities {
            supports_multisampled_textures: true,
            supports_lod_bias: true,
            supports_instance_offset: true,
            supports_multiple_swapchains: true,
            supports_independent_blend: true,
        }
    }

    /// Lock the context. Every GL call goes through the returned guard, which also makes this
    /// the submission lock. Objects dropped since the last lock are destroyed first.
    pub(crate) fn gl_context(&self) -> GlContextGuard {
        let mut gl_context = GlContextGuard::new(self.inner.gl_context.lock().unwrap());
        let deferred_destroys = std::mem::take(&mut *self.inner.deferred_destroys.lock().unwrap());
        for deferred_destroy in deferred_destroys {
            deferred_destroy.destroy(&mut gl_context);
        }

        gl_context
    }

    /// Queue a GL object for destruction. Safe to call from `Drop` while the context is locked.
    pub(crate) fn destroy_later(
        &self,
        deferred_destroy: GlDeferredDestroy,
    ) {
        self.inner
            .deferred_destroys
            .lock()
            .unwrap()
            .push(deferred_destroy);
    }

    fn check_not_destroyed(&self) -> EmberResult<()> {
        if self.inner.destroyed.load(Ordering::Acquire) {
            Err("The gl device was destroyed")?;
        }

        Ok(())
    }

    // Used internally to support polling fences
    pub(crate) fn gl_finish(&self) -> EmberResult<()> {
        self.gl_context().gl_finish()?;
        self.inner
            .gl_finish_call_count
            .fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn new(inner: Arc<EmberDeviceContextGlInner>) -> EmberResult<Self> {
        Ok(EmberDeviceContextGl {
            inner,
            #[cfg(debug_assertions)]
            #[cfg(feature = "track-device-contexts")]
            create_index: 0,
        })
    }

    pub fn create_texture(
        &self,
        texture_def: &EmberTextureDef,
        data: Option<&[u8]>,
    ) -> EmberResult<EmberTextureGl> {
        EmberTextureGl::new(self, texture_def, data)
    }

    pub fn create_sampler(
        &self,
        sampler_def: &EmberSamplerDef,
    ) -> EmberResult<EmberSamplerGl> {
        EmberSamplerGl::new(self, sampler_def)
    }

    pub fn create_buffer(
        &self,
        buffer_def: &EmberBufferDef,
    ) -> EmberResult<EmberBufferGl> {
        EmberBufferGl::new(self, buffer_def)
    }

    pub fn create_shader_module(
        &self,
        shader_package: &EmberShaderPackage,
    ) -> EmberResult<EmberShaderModuleGl> {
        EmberShaderModuleGl::new(self, shader_package)
    }

    pub fn create_pipeline(
        &self,
        pipeline_def: &EmberPipelineDef,
    ) -> EmberResult<EmberPipelineGl> {
        EmberPipelineGl::new(self, pipeline_def)
    }

    pub fn create_resource_set(
        &self,
        resource_set_def: &EmberResourceSetDef,
    ) -> EmberResult<EmberResourceSetGl> {
        EmberResourceSetGl::new(self, resource_set_def)
    }

    /// Commands execute on the calling thread while the context is locked. The optional fence
    /// is complete as soon as this returns.
    pub fn submit_command_list(
        &self,
        command_list: &EmberCommandList,
        signal_fence: Option<&EmberFenceGl>,
    ) -> EmberResult<EmberReplayStats> {
        self.check_not_destroyed()?;

        let stats = {
            let mut executor = EmberCommandExecutorGl::new(self, self.gl_context());
            executor.execute_commands(command_list.recorder())
        };

        log::trace!(
            "Submitted {} commands, {} skipped",
            stats.executed_commands,
            stats.skipped_commands
        );

        if let Some(fence) = signal_fence {
            fence.set_submitted(true);
        }

        if self.inner.wait_for_idle_after_submit || signal_fence.is_some() {
            self.gl_finish()?;
        }

        Ok(stats)
    }

    pub fn wait_for_idle(&self) -> EmberResult<()> {
        self.gl_finish()
    }

    pub fn create_fence(&self) -> EmberResult<EmberFenceGl> {
        EmberFenceGl::new(self)
    }

    pub fn create_framebuffer(
        &self,
        framebuffer_def: &EmberFramebufferDef,
    ) -> EmberResult<EmberFramebufferGl> {
        EmberFramebufferGl::new(self, framebuffer_def)
    }

    pub fn create_swapchain(
        &self,
        raw_window_handle: &dyn HasRawWindowHandle,
        swapchain_def: &EmberSwapchainDef,
    ) -> EmberResult<EmberSwapchainGl> {
        EmberSwapchainGl::new(self, raw_window_handle, swapchain_def)
    }

    pub fn create_timing_query(&self) -> EmberResult<EmberTimingQueryGl> {
        EmberTimingQueryGl::new(self)
    }
}
