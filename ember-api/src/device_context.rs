#[cfg(any(feature = "ember-dx12", test))]
use crate::dx12::EmberDeviceContextDx12;
#[cfg(any(feature = "ember-gl", test))]
use crate::gl::EmberDeviceContextGl;
use crate::*;
use raw_window_handle::HasRawWindowHandle;
use std::sync::Arc;

/// A cloneable, thread-safe handle used to create graphics resources and submit work.
///
/// All device contexts, and every object created through them, must be dropped before the
/// `EmberApi` that created them is destroyed.
#[derive(Clone, Debug)]
pub enum EmberDeviceContext {
    #[cfg(any(feature = "ember-gl", test))]
    Gl(EmberDeviceContextGl),
    #[cfg(any(feature = "ember-dx12", test))]
    Dx12(EmberDeviceContextDx12),
}

impl EmberDeviceContext {
    pub fn api_type(&self) -> EmberApiType {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberDeviceContext::Gl(_) => EmberApiType::Gl,
            #[cfg(any(feature = "ember-dx12", test))]
            EmberDeviceContext::Dx12(_) => EmberApiType::Dx12,
        }
    }

    /// Limits and requirements of the device
    pub fn device_info(&self) -> &EmberDeviceInfo {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberDeviceContext::Gl(inner) => inner.device_info(),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberDeviceContext::Dx12(inner) => inner.device_info(),
        }
    }

    /// Optional features. Code that relies on one of these must check for it first.
    pub fn graphics_capabilities(&self) -> EmberGraphicsCapabilities {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberDeviceContext::Gl(inner) => inner.graphics_capabilities(),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberDeviceContext::Dx12(inner) => inner.graphics_capabilities(),
        }
    }

    /// Create a texture. `data` holds every mip level, each tightly packed with the top row
    /// first. Without data the contents are undefined.
    pub fn create_texture(
        &self,
        texture_def: &EmberTextureDef,
        data: Option<&[u8]>,
    ) -> EmberResult<Arc<EmberTexture>> {
        texture_def.verify()?;
        if texture_def.sample_count != EmberSampleCount::SampleCount1
            && !self
                .graphics_capabilities()
                .supports_multisampled_textures
        {
            Err("The device does not support multisampled textures")?;
        }

        if let Some(data) = data {
            let expected_size = texture_data_size(texture_def)?;
            if data.len() != expected_size {
                Err(format!(
                    "Texture data is {} bytes, {} bytes are required for {:?} with {} mips",
                    data.len(),
                    expected_size,
                    texture_def.extents,
                    texture_def.mip_count
                ))?;
            }

            if texture_def.sample_count != EmberSampleCount::SampleCount1 {
                Err("Multisampled textures cannot be initialized with data")?;
            }
        }

        Ok(Arc::new(match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberDeviceContext::Gl(inner) => {
                EmberTexture::Gl(inner.create_texture(texture_def, data)?)
            }
            #[cfg(any(feature = "ember-dx12", test))]
            EmberDeviceContext::Dx12(inner) => {
                EmberTexture::Dx12(inner.create_texture(texture_def, data)?)
            }
        }))
    }

    pub fn create_sampler(
        &self,
        sampler_def: &EmberSamplerDef,
    ) -> EmberResult<Arc<EmberSampler>> {
        if sampler_def.mip_lod_bias != 0.0 && !self.graphics_capabilities().supports_lod_bias {
            log::warn!("The device does not support LOD bias, it will be ignored");
        }

        Ok(Arc::new(match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberDeviceContext::Gl(inner) => EmberSampler::Gl(inner.create_sampler(sampler_def)?),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberDeviceContext::Dx12(inner) => {
                EmberSampler::Dx12(inner.create_sampler(sampler_def)?)
            }
        }))
    }

    /// Create a buffer, optionally initialized with `data`. Data may be shorter than the buffer.
    pub fn create_buffer(
        &self,
        buffer_def: &EmberBufferDef,
        data: Option<&[u8]>,
    ) -> EmberResult<Arc<EmberBuffer>> {
        buffer_def.verify()?;

        let buffer = Arc::new(match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberDeviceContext::Gl(inner) => EmberBuffer::Gl(inner.create_buffer(buffer_def)?),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberDeviceContext::Dx12(inner) => {
                EmberBuffer::Dx12(inner.create_buffer(buffer_def)?)
            }
        });

        if let Some(data) = data {
            buffer.copy_to_buffer(0, data)?;
        }

        Ok(buffer)
    }

    pub fn create_vertex_buffer(
        &self,
        buffer_def: &EmberBufferDef,
        data: Option<&[u8]>,
    ) -> EmberResult<Arc<EmberBuffer>> {
        Self::verify_buffer_kind(buffer_def, EmberResourceType::VERTEX_BUFFER)?;
        self.create_buffer(buffer_def, data)
    }

    pub fn create_index_buffer(
        &self,
        buffer_def: &EmberBufferDef,
        data: Option<&[u8]>,
    ) -> EmberResult<Arc<EmberBuffer>> {
        Self::verify_buffer_kind(buffer_def, EmberResourceType::INDEX_BUFFER)?;
        self.create_buffer(buffer_def, data)
    }

    pub fn create_uniform_buffer(
        &self,
        buffer_def: &EmberBufferDef,
        data: Option<&[u8]>,
    ) -> EmberResult<Arc<EmberBuffer>> {
        Self::verify_buffer_kind(buffer_def, EmberResourceType::UNIFORM_BUFFER)?;
        let alignment = self.device_info().min_uniform_buffer_offset_alignment as u64;
        let buffer_def = EmberBufferDef {
            size: ember_base::memory::round_size_up_to_alignment_u64(buffer_def.size, alignment),
            ..buffer_def.clone()
        };
        self.create_buffer(&buffer_def, data)
    }

    fn verify_buffer_kind(
        buffer_def: &EmberBufferDef,
        resource_type: EmberResourceType,
    ) -> EmberResult<()> {
        if !buffer_def.resource_type.contains(resource_type) {
            Err(format!(
                "Buffer definition with resource type {:?} cannot create a {:?}",
                buffer_def.resource_type, resource_type
            ))?;
        }

        Ok(())
    }

    /// Create a shader module from the form of the package this backend consumes. Compilation
    /// errors are returned.
    pub fn create_shader_module(
        &self,
        shader_package: &EmberShaderPackage,
    ) -> EmberResult<Arc<EmberShaderModule>> {
        Ok(Arc::new(match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberDeviceContext::Gl(inner) => {
                EmberShaderModule::Gl(inner.create_shader_module(shader_package)?)
            }
            #[cfg(any(feature = "ember-dx12", test))]
            EmberDeviceContext::Dx12(inner) => {
                EmberShaderModule::Dx12(inner.create_shader_module(shader_package)?)
            }
        }))
    }

    pub fn create_pipeline(
        &self,
        pipeline_def: &EmberPipelineDef,
    ) -> EmberResult<Arc<EmberPipeline>> {
        pipeline_def.verify(self.device_info())?;
        if pipeline_def.blend_state.independent_blend
            && !self.graphics_capabilities().supports_independent_blend
        {
            Err("The device does not support independent blend states")?;
        }

        Ok(Arc::new(match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberDeviceContext::Gl(inner) => {
                EmberPipeline::Gl(inner.create_pipeline(pipeline_def)?)
            }
            #[cfg(any(feature = "ember-dx12", test))]
            EmberDeviceContext::Dx12(inner) => {
                EmberPipeline::Dx12(inner.create_pipeline(pipeline_def)?)
            }
        }))
    }

    /// Create a resource set. Fails if two bindings share a linear slot or a name.
    pub fn create_resource_set(
        &self,
        resource_set_def: &EmberResourceSetDef,
    ) -> EmberResult<Arc<EmberResourceSet>> {
        Ok(Arc::new(match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberDeviceContext::Gl(inner) => {
                EmberResourceSet::Gl(inner.create_resource_set(resource_set_def)?)
            }
            #[cfg(any(feature = "ember-dx12", test))]
            EmberDeviceContext::Dx12(inner) => {
                EmberResourceSet::Dx12(inner.create_resource_set(resource_set_def)?)
            }
        }))
    }

    /// Create a resource set matching the bindings the pipeline was created with
    pub fn create_resource_set_for_pipeline(
        &self,
        pipeline: &EmberPipeline,
    ) -> EmberResult<Arc<EmberResourceSet>> {
        self.create_resource_set(&pipeline.pipeline_def().resource_set_def)
    }

    pub fn create_command_list(&self) -> EmberResult<EmberCommandList> {
        Ok(EmberCommandList::new())
    }

    /// Replay the recorded commands on the device. If a fence is given it is signaled once the
    /// GPU has finished the work. Commands that cannot be replayed are logged, skipped and
    /// counted in the returned stats.
    pub fn submit_command_list(
        &self,
        command_list: &EmberCommandList,
        signal_fence: Option<&EmberFence>,
    ) -> EmberResult<EmberReplayStats> {
        profiling::scope!("submit_command_list");
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberDeviceContext::Gl(inner) => {
                let fence = match signal_fence {
                    Some(fence) => Some(
                        fence
                            .gl_fence()
                            .ok_or("Fence was not created by the gl backend")?,
                    ),
                    None => None,
                };
                inner.submit_command_list(command_list, fence)
            }
            #[cfg(any(feature = "ember-dx12", test))]
            EmberDeviceContext::Dx12(inner) => {
                let fence = match signal_fence {
                    Some(fence) => Some(
                        fence
                            .dx12_fence()
                            .ok_or("Fence was not created by the dx12 backend")?,
                    ),
                    None => None,
                };
                inner.submit_command_list(command_list, fence)
            }
        }
    }

    /// Block until all submitted work has completed
    pub fn wait_for_idle(&self) -> EmberResult<()> {
        profiling::scope!("wait_for_idle");
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberDeviceContext::Gl(inner) => inner.wait_for_idle(),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberDeviceContext::Dx12(inner) => inner.wait_for_idle(),
        }
    }

    pub fn create_fence(&self) -> EmberResult<EmberFence> {
        Ok(match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberDeviceContext::Gl(inner) => EmberFence::Gl(inner.create_fence()?),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberDeviceContext::Dx12(inner) => EmberFence::Dx12(inner.create_fence()?),
        })
    }

    /// Wait for every given fence that has work pending
    pub fn wait_for_fences(
        &self,
        fences: &[&EmberFence],
    ) -> EmberResult<()> {
        EmberFence::wait_for_fences(fences)
    }

    pub fn create_framebuffer(
        &self,
        framebuffer_def: &EmberFramebufferDef,
    ) -> EmberResult<Arc<EmberFramebuffer>> {
        Ok(Arc::new(match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberDeviceContext::Gl(inner) => {
                EmberFramebuffer::Gl(inner.create_framebuffer(framebuffer_def)?)
            }
            #[cfg(any(feature = "ember-dx12", test))]
            EmberDeviceContext::Dx12(inner) => {
                EmberFramebuffer::Dx12(inner.create_framebuffer(framebuffer_def)?)
            }
        }))
    }

    /// Create a swapchain presenting to the given window
    pub fn create_swapchain(
        &self,
        raw_window_handle: &dyn HasRawWindowHandle,
        swapchain_def: &EmberSwapchainDef,
    ) -> EmberResult<Arc<EmberSwapchain>> {
        swapchain_def.verify()?;
        Ok(Arc::new(match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberDeviceContext::Gl(inner) => {
                EmberSwapchain::Gl(inner.create_swapchain(raw_window_handle, swapchain_def)?)
            }
            #[cfg(any(feature = "ember-dx12", test))]
            EmberDeviceContext::Dx12(inner) => {
                EmberSwapchain::Dx12(inner.create_swapchain(raw_window_handle, swapchain_def)?)
            }
        }))
    }

    pub fn create_timing_query(&self) -> EmberResult<Arc<EmberTimingQuery>> {
        Ok(Arc::new(match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberDeviceContext::Gl(inner) => EmberTimingQuery::Gl(inner.create_timing_query()?),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberDeviceContext::Dx12(inner) => {
                EmberTimingQuery::Dx12(inner.create_timing_query()?)
            }
        }))
    }

    #[cfg(any(feature = "ember-gl", test))]
    pub fn gl_device_context(&self) -> Option<&EmberDeviceContextGl> {
        match self {
            EmberDeviceContext::Gl(inner) => Some(inner),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberDeviceContext::Dx12(_) => None,
        }
    }

    #[cfg(any(feature = "ember-dx12", test))]
    pub fn dx12_device_context(&self) -> Option<&EmberDeviceContextDx12> {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberDeviceContext::Gl(_) => None,
            EmberDeviceContext::Dx12(inner) => Some(inner),
        }
    }
}

/// Bytes of tightly packed data covering every mip of a texture
pub(crate) fn texture_data_size(texture_def: &EmberTextureDef) -> EmberResult<usize> {
    let texel_size = texture_def.format.size_in_bytes()? as usize;
    let mut size = 0;
    for mip_level in 0..texture_def.mip_count {
        let extents = texture_def.mip_extents(mip_level);
        size += extents.width as usize * extents.height as usize * texel_size;
    }

    Ok(size)
}

/// Splits tightly packed texture data into one slice per mip
pub(crate) fn split_mip_data<'a>(
    texture_def: &EmberTextureDef,
    data: &'a [u8],
) -> EmberResult<Vec<&'a [u8]>> {
    let texel_size = texture_def.format.size_in_bytes()? as usize;
    let mut mips = Vec::with_capacity(texture_def.mip_count as usize);
    let mut offset = 0;
    for mip_level in 0..texture_def.mip_count {
        let extents = texture_def.mip_extents(mip_level);
        let size = extents.width as usize * extents.height as usize * texel_size;
        let mip = data
            .get(offset..offset + size)
            .ok_or("Texture data is too short for its mip chain")?;
        mips.push(mip);
        offset += size;
    }

    Ok(mips)
}
