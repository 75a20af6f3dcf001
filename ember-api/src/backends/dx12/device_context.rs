use crate::{
    EmberApiDef, EmberApiType, EmberBufferDef, EmberCommandExecutor, EmberCommandList,
    EmberDeviceInfo, EmberError, EmberFramebufferDef, EmberGraphicsCapabilities,
    EmberPipelineDef, EmberReplayStats, EmberResourceSetDef, EmberResult, EmberSamplerDef,
    EmberShaderPackage, EmberSwapchainDef, EmberTextureDef, EmberValidationMode,
};
use raw_window_handle::HasRawWindowHandle;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::dx12::{
    EmberApiDefDx12, EmberBufferDx12, EmberCommandExecutorDx12, EmberFenceDx12,
    EmberFramebufferDx12, EmberPipelineDx12, EmberResourceSetDx12, EmberSamplerDx12,
    EmberShaderModuleDx12, EmberSwapchainDx12, EmberTextureDx12, EmberTimingQueryDx12,
};

use crate::dx12::d3d12;
use crate::dx12::{Dx12DescriptorHeapSet, Dx12ResourceStateSnapshot, EmberResourceStateArena};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

const MIN_UNIFORM_BUFFER_OFFSET_ALIGNMENT: u32 = 256;
const MAX_VERTEX_ATTRIBUTE_COUNT: u32 = 16;

pub struct EmberDeviceContextDx12Inner {
    pub(crate) device_info: EmberDeviceInfo,

    device: d3d12::Dx12Device,
    queue: d3d12::Dx12CommandQueue,
    dxgi_factory: d3d12::Dx12Factory,
    // All recording happens on this list, so holding it is also the submission lock
    command_list: Mutex<d3d12::Dx12CommandList>,
    pub(crate) descriptor_heaps: Dx12DescriptorHeapSet,
    pub(crate) resource_state_arena: Arc<EmberResourceStateArena>,

    // Signaled by the queue after every execution
    idle_fence: d3d12::Dx12Fence,
    last_idle_fence_value: AtomicU64,
    fence_timeout: Duration,
    debug_layer: bool,

    device_lost: AtomicBool,
    destroyed: AtomicBool,
    pub(crate) wait_for_idle_after_submit: bool,

    #[cfg(debug_assertions)]
    #[cfg(feature = "track-device-contexts")]
    next_create_index: AtomicU64,

    #[cfg(debug_assertions)]
    #[cfg(feature = "track-device-contexts")]
    pub(crate) all_contexts: Mutex<fnv::FnvHashMap<u64, backtrace::Backtrace>>,
}

impl Drop for EmberDeviceContextDx12Inner {
    fn drop(&mut self) {
        log::trace!("destroying device");
        self.destroyed.swap(true, Ordering::AcqRel);
    }
}

impl EmberDeviceContextDx12Inner {
    pub fn new(
        api_def: &EmberApiDef,
        dx12_api_def: &EmberApiDefDx12,
    ) -> EmberResult<Self> {
        log::debug!("Initializing DX12 backend");
        let debug_layer = api_def.validation_mode == EmberValidationMode::Enabled
            || dx12_api_def.enable_debug_layer;
        log::debug!("Debug layer enabled: {}", debug_layer);

        let device = d3d12::create_device(debug_layer)?;
        let queue = device.create_command_queue()?;
        let dxgi_factory = d3d12::create_factory(debug_layer)?;
        let command_list = device.create_command_list()?;
        let idle_fence = device.create_fence(0)?;
        let descriptor_heaps = Dx12DescriptorHeapSet::new(&device)?;

        let timestamp_frequency = queue.timestamp_frequency()?;
        log::debug!("Timestamp frequency: {}", timestamp_frequency);

        let device_info = EmberDeviceInfo {
            api_type: EmberApiType::Dx12,
            min_uniform_buffer_offset_alignment: MIN_UNIFORM_BUFFER_OFFSET_ALIGNMENT,
            max_vertex_attribute_count: MAX_VERTEX_ATTRIBUTE_COUNT,
            max_color_attachments: d3d12::D3D12_SIMULTANEOUS_RENDER_TARGET_COUNT as u32,
            timestamp_frequency,
            renderer_name: device.adapter_name(),
        };

        #[cfg(debug_assertions)]
        #[cfg(feature = "track-device-contexts")]
        let all_contexts = {
            let create_backtrace = backtrace::Backtrace::new_unresolved();
            let mut all_contexts = fnv::FnvHashMap::<u64, backtrace::Backtrace>::default();
            all_contexts.insert(0, create_backtrace);
            all_contexts
        };

        Ok(EmberDeviceContextDx12Inner {
            device_info,
            device,
            queue,
            dxgi_factory,
            command_list: Mutex::new(command_list),
            descriptor_heaps,
            resource_state_arena: Default::default(),
            idle_fence,
            last_idle_fence_value: AtomicU64::new(0),
            fence_timeout: api_def.fence_timeout,
            debug_layer,
            device_lost: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
            wait_for_idle_after_submit: api_def.wait_for_idle_after_submit,

            #[cfg(debug_assertions)]
            #[cfg(feature = "track-device-contexts")]
            all_contexts: Mutex::new(all_contexts),

            #[cfg(debug_assertions)]
            #[cfg(feature = "track-device-contexts")]
            next_create_index: AtomicU64::new(1),
        })
    }
}

pub struct EmberDeviceContextDx12 {
    pub(crate) inner: Arc<EmberDeviceContextDx12Inner>,
    #[cfg(debug_assertions)]
    #[cfg(feature = "track-device-contexts")]
    pub(crate) create_index: u64,
}

impl std::fmt::Debug for EmberDeviceContextDx12 {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        f.debug_struct("EmberDeviceContextDx12")
            .field("device", &self.inner.device)
            .finish()
    }
}

impl Clone for EmberDeviceContextDx12 {
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

            log::trace!(
                "Cloned EmberDeviceContextDx12 create_index {}",
                create_index
            );
            create_index
        };

        EmberDeviceContextDx12 {
            inner: self.inner.clone(),
            #[cfg(debug_assertions)]
            #[cfg(feature = "track-device-contexts")]
            create_index,
        }
    }
}

impl Drop for EmberDeviceContextDx12 {
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

impl Into<crate::EmberDeviceContext> for EmberDeviceContextDx12 {
    fn into(self) -> crate::EmberDeviceContext {
        crate::EmberDeviceContext::Dx12(self)
    }
}

impl EmberDeviceContextDx12 {
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

    pub fn dx12_device(&self) -> &d3d12::Dx12Device {
        &self.inner.device
    }

    pub fn dx12_queue(&self) -> &d3d12::Dx12CommandQueue {
        &self.inner.queue
    }

    pub(crate) fn dxgi_factory(&self) -> &d3d12::Dx12Factory {
        &self.inner.dxgi_factory
    }

    pub(crate) fn descriptor_heaps(&self) -> &Dx12DescriptorHeapSet {
        &self.inner.descriptor_heaps
    }

    pub(crate) fn resource_state_arena(&self) -> &Arc<EmberResourceStateArena> {
        &self.inner.resource_state_arena
    }

    pub fn debug_layer_enabled(&self) -> bool {
        self.inner.debug_layer
    }

    /// True once a wait for the GPU timed out. Every later submission fails.
    pub fn is_device_lost(&self) -> bool {
        self.inner.device_lost.load(Ordering::Acquire)
    }

    pub(crate) fn check_device(&self) -> EmberResult<()> {
        if self.inner.destroyed.load(Ordering::Acquire) {
            Err("The dx12 device was destroyed")?;
        }

        if self.is_device_lost() {
            return Err(EmberError::DeviceLost);
        }

        Ok(())
    }

    /// Lock the device's command list. Holding the guard is the submission lock.
    pub(crate) fn command_list(&self) -> MutexGuard<d3d12::Dx12CommandList> {
        self.inner.command_list.lock().unwrap()
    }

    // Must be called with the command list locked so fence values reach the queue in order
    fn signal_idle_fence(&self) -> EmberResult<u64> {
        let value = self
            .inner
            .last_idle_fence_value
            .fetch_add(1, Ordering::AcqRel)
            + 1;
        self.inner.queue.signal(&self.inner.idle_fence, value)?;
        Ok(value)
    }

    /// True once the queue has executed everything submitted before `value` was signaled
    pub(crate) fn is_idle_fence_value_complete(
        &self,
        value: u64,
    ) -> bool {
        self.inner.idle_fence.completed_value() >= value
    }

    /// Block until `fence` reaches `value`. Exceeding the fence timeout loses the device.
    pub(crate) fn wait_for_fence_value(
        &self,
        fence: &d3d12::Dx12Fence,
        value: u64,
    ) -> EmberResult<()> {
        if fence.completed_value() >= value {
            return Ok(());
        }

        let timeout_ms = self.inner.fence_timeout.as_millis().min(u32::MAX as u128 - 1) as u32;
        let event = d3d12::Dx12Event::new()?;
        fence.set_event_on_completion(value, &event)?;
        if !event.wait(timeout_ms) {
            log::error!(
                "Timed out after {:?} waiting for fence value {}, the device is lost",
                self.inner.fence_timeout,
                value
            );
            self.inner.device_lost.store(true, Ordering::Release);
            return Err(EmberError::SubmissionTimeout);
        }

        Ok(())
    }

    /// Close, execute and reset the locked command list. Lists that fail to close are dropped
    /// and the tracked states go back to `states_before`, taken when recording started.
    /// Returns the idle fence value that completes once this work has executed.
    pub(crate) fn execute_command_list(
        &self,
        command_list: &mut d3d12::Dx12CommandList,
        states_before: Dx12ResourceStateSnapshot,
    ) -> EmberResult<u64> {
        let close_result = command_list.close();
        if close_result.is_ok() {
            self.inner.queue.execute_command_lists(&[&*command_list]);
        }
        command_list.reset()?;

        if let Err(e) = close_result {
            log::error!("The command list failed to record and was dropped: {}", e);
            self.inner.resource_state_arena.restore(states_before);
            Err(e)?;
        }

        self.signal_idle_fence()
    }

    /// Record work with `f` and wait for it to execute. Used for uploads and readbacks.
    pub(crate) fn execute_immediate<T, F>(
        &self,
        f: F,
    ) -> EmberResult<T>
    where
        F: FnOnce(&mut d3d12::Dx12CommandList) -> EmberResult<T>,
    {
        self.check_device()?;

        let fence_value = {
            let mut command_list = self.command_list();
            let states_before = self.inner.resource_state_arena.snapshot();
            // Whatever was recorded is executed even on failure, the arena already counts it
            let result = f(&mut command_list);
            let fence_value = self.execute_command_list(&mut command_list, states_before)?;
            (result?, fence_value)
        };

        self.wait_for_fence_value(&self.inner.idle_fence, fence_value.1)?;
        Ok(fence_value.0)
    }

    pub fn new(inner: Arc<EmberDeviceContextDx12Inner>) -> EmberResult<Self> {
        Ok(EmberDeviceContextDx12 {
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
    ) -> EmberResult<EmberTextureDx12> {
        EmberTextureDx12::new(self, texture_def, data)
    }

    pub fn create_sampler(
        &self,
        sampler_def: &EmberSamplerDef,
    ) -> EmberResult<EmberSamplerDx12> {
        EmberSamplerDx12::new(self, sampler_def)
    }

    pub fn create_buffer(
        &self,
        buffer_def: &EmberBufferDef,
    ) -> EmberResult<EmberBufferDx12> {
        EmberBufferDx12::new(self, buffer_def)
    }

    pub fn create_shader_module(
        &self,
        shader_package: &EmberShaderPackage,
    ) -> EmberResult<EmberShaderModuleDx12> {
        EmberShaderModuleDx12::new(self, shader_package)
    }

    pub fn create_pipeline(
        &self,
        pipeline_def: &EmberPipelineDef,
    ) -> EmberResult<EmberPipelineDx12> {
        EmberPipelineDx12::new(self, pipeline_def)
    }

    pub fn create_resource_set(
        &self,
        resource_set_def: &EmberResourceSetDef,
    ) -> EmberResult<EmberResourceSetDx12> {
        EmberResourceSetDx12::new(self, resource_set_def)
    }

    /// Commands are recorded while the command list is locked and then executed by the queue
    /// thread. The optional fence is signaled once they have executed.
    pub fn submit_command_list(
        &self,
        command_list: &EmberCommandList,
        signal_fence: Option<&EmberFenceDx12>,
    ) -> EmberResult<EmberReplayStats> {
        profiling::scope!("submit_command_list");
        self.check_device()?;

        let (stats, fence_value) = {
            let mut dx12_command_list = self.command_list();
            let states_before = self.inner.resource_state_arena.snapshot();
            let (stats, timing_queries) = {
                let mut executor = EmberCommandExecutorDx12::new(self, &mut dx12_command_list);
                let stats = executor.execute_commands(command_list.recorder());
                (stats, executor.take_stopped_timing_queries())
            };

            let fence_value = self.execute_command_list(&mut dx12_command_list, states_before)?;
            for timing_query in timing_queries {
                if let Some(dx12_timing_query) = timing_query.dx12_timing_query() {
                    dx12_timing_query.set_submitted(fence_value);
                }
            }

            if let Some(fence) = signal_fence {
                fence.signal_on_queue(&self.inner.queue)?;
            }

            (stats, fence_value)
        };

        log::trace!(
            "Submitted {} commands, {} skipped",
            stats.executed_commands,
            stats.skipped_commands
        );

        if self.inner.wait_for_idle_after_submit {
            self.wait_for_fence_value(&self.inner.idle_fence, fence_value)?;
        }

        Ok(stats)
    }

    pub fn wait_for_idle(&self) -> EmberResult<()> {
        self.check_device()?;
        let fence_value = {
            let _command_list = self.command_list();
            self.signal_idle_fence()?
        };

        self.wait_for_fence_value(&self.inner.idle_fence, fence_value)
    }

    pub fn create_fence(&self) -> EmberResult<EmberFenceDx12> {
        EmberFenceDx12::new(self)
    }

    pub fn create_framebuffer(
        &self,
        framebuffer_def: &EmberFramebufferDef,
    ) -> EmberResult<EmberFramebufferDx12> {
        EmberFramebufferDx12::new(self, framebuffer_def)
    }

    pub fn create_swapchain(
        &self,
        raw_window_handle: &dyn HasRawWindowHandle,
        swapchain_def: &EmberSwapchainDef,
    ) -> EmberResult<EmberSwapchainDx12> {
        EmberSwapchainDx12::new(self, raw_window_handle, swapchain_def)
    }

    pub fn create_timing_query(&self) -> EmberResult<EmberTimingQueryDx12> {
        EmberTimingQueryDx12::new(self)
    }
}
