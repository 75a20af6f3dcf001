use crate::command_executor::{
    upgrade, verify_depth_clear_value, verify_rect, verify_resolve, verify_viewport,
};
use crate::command_executor::{BoundIndexBuffer, BoundVertexBuffer, EmberBoundState};
use crate::dx12::d3d12;
use crate::dx12::{
    Dx12BackBuffer, Dx12BoundResource, EmberDeviceContextDx12, EmberPipelineDx12,
    START_QUERY_INDEX, STOP_QUERY_INDEX,
};
use crate::{
    EmberCommandExecutor, EmberFormat, EmberFramebuffer, EmberPipeline, EmberRenderCommand,
    EmberRenderTarget, EmberReplayError, EmberReplayResult, EmberResourceSet, EmberResult,
    EmberSwapchain, EmberTexture, EmberTimingQuery,
};
use std::sync::Arc;

/// The native resources behind the bound render target. Holding them keeps the views valid
/// until the target is unbound.
#[derive(Default)]
struct Dx12BoundTarget {
    color: Vec<Arc<EmberTexture>>,
    depth_stencil: Option<Arc<EmberTexture>>,
    back_buffer: Option<Arc<Dx12BackBuffer>>,
    render_target_views: Vec<d3d12::D3D12_CPU_DESCRIPTOR_HANDLE>,
    depth_stencil_view: Option<d3d12::D3D12_CPU_DESCRIPTOR_HANDLE>,
}

impl Dx12BoundTarget {
    fn contains(
        &self,
        texture: &Arc<EmberTexture>,
    ) -> bool {
        self.color.iter().any(|color| Arc::ptr_eq(color, texture))
            || self
                .depth_stencil
                .as_ref()
                .map(|depth_stencil| Arc::ptr_eq(depth_stencil, texture))
                .unwrap_or(false)
    }
}

/// Replays a command list into the device's native command list. Resource states are tracked
/// per mip, and every state a command needs is reached with explicit barriers before the command
/// is recorded.
pub struct EmberCommandExecutorDx12<'a> {
    command_list: &'a mut d3d12::Dx12CommandList,
    bound: EmberBoundState,
    target: Dx12BoundTarget,
    stopped_timing_queries: Vec<Arc<EmberTimingQuery>>,
}

impl<'a> EmberCommandExecutorDx12<'a> {
    pub(crate) fn new(
        device_context: &'a EmberDeviceContextDx12,
        command_list: &'a mut d3d12::Dx12CommandList,
    ) -> Self {
        let descriptor_heaps = device_context.descriptor_heaps();
        command_list.set_descriptor_heaps(&[
            descriptor_heaps.gpu_cbv_srv_uav_heap.dx12_heap(),
            descriptor_heaps.gpu_sampler_heap.dx12_heap(),
        ]);

        EmberCommandExecutorDx12 {
            command_list,
            bound: EmberBoundState::default(),
            target: Dx12BoundTarget::default(),
            stopped_timing_queries: Vec::default(),
        }
    }

    /// Queries whose results are resolved by this replay. They become readable once the
    /// submission executes.
    pub(crate) fn take_stopped_timing_queries(&mut self) -> Vec<Arc<EmberTimingQuery>> {
        std::mem::take(&mut self.stopped_timing_queries)
    }

    fn dx12_pipeline(pipeline: &EmberPipeline) -> Result<&EmberPipelineDx12, EmberReplayError> {
        pipeline
            .dx12_pipeline()
            .ok_or_else(|| "The pipeline was not created by the dx12 backend".into())
    }

    //
    // Render targets
    //

    fn framebuffer_target(framebuffer: &EmberFramebuffer) -> EmberResult<Dx12BoundTarget> {
        let dx12_framebuffer = framebuffer
            .dx12_framebuffer()
            .ok_or("The framebuffer was not created by the dx12 backend")?;
        let attachments = dx12_framebuffer.attachments();

        let mut render_target_views = Vec::with_capacity(attachments.color.len());
        for texture in &attachments.color {
            let render_target_view = texture
                .dx12_texture()
                .and_then(|dx12_texture| dx12_texture.render_target_view())
                .ok_or("Framebuffer color attachment has no dx12 render target view")?;
            render_target_views.push(render_target_view);
        }

        let depth_stencil_view = match &attachments.depth_stencil {
            Some(texture) => Some(
                texture
                    .dx12_texture()
                    .and_then(|dx12_texture| dx12_texture.depth_stencil_view())
                    .ok_or("Framebuffer depth attachment has no dx12 depth stencil view")?,
            ),
            None => None,
        };

        Ok(Dx12BoundTarget {
            color: attachments.color,
            depth_stencil: attachments.depth_stencil,
            back_buffer: None,
            render_target_views,
            depth_stencil_view,
        })
    }

    // A multisampled swapchain renders into its framebuffer, otherwise into the current back
    // buffer
    fn swapchain_target(swapchain: &EmberSwapchain) -> EmberResult<Dx12BoundTarget> {
        let dx12_swapchain = swapchain
            .dx12_swapchain()
            .ok_or("The swapchain was not created by the dx12 backend")?;

        if let Some(framebuffer) = dx12_swapchain.multisampled_framebuffer() {
            return Self::framebuffer_target(&framebuffer);
        }

        let back_buffer = dx12_swapchain.current_back_buffer()?;
        let depth_stencil = dx12_swapchain.depth_stencil();
        let depth_stencil_view = match &depth_stencil {
            Some(texture) => Some(
                texture
                    .dx12_texture()
                    .and_then(|dx12_texture| dx12_texture.depth_stencil_view())
                    .ok_or("Swapchain depth buffer has no dx12 depth stencil view")?,
            ),
            None => None,
        };

        Ok(Dx12BoundTarget {
            color: Vec::default(),
            depth_stencil,
            render_target_views: vec![back_buffer.render_target_view()],
            back_buffer: Some(back_buffer),
            depth_stencil_view,
        })
    }

    // Puts every resource of the bound target back into its writable state
    fn transition_bound_target(&mut self) {
        for texture in &self.target.color {
            if let Some(dx12_texture) = texture.dx12_texture() {
                dx12_texture
                    .tracked()
                    .transition_all(self.command_list, d3d12::D3D12_RESOURCE_STATE_RENDER_TARGET);
            }
        }

        if let Some(back_buffer) = &self.target.back_buffer {
            back_buffer
                .tracked()
                .transition_all(self.command_list, d3d12::D3D12_RESOURCE_STATE_RENDER_TARGET);
        }

        if let Some(dx12_texture) = self
            .target
            .depth_stencil
            .as_ref()
            .and_then(|texture| texture.dx12_texture())
        {
            dx12_texture
                .tracked()
                .transition_all(self.command_list, d3d12::D3D12_RESOURCE_STATE_DEPTH_WRITE);
        }
    }

    fn bind_render_target(
        &mut self,
        render_target: EmberRenderTarget,
    ) -> EmberReplayResult {
        let target = match &render_target {
            EmberRenderTarget::None => Err("Cannot bind the None render target")?,
            EmberRenderTarget::Swapchain(swapchain) => Self::swapchain_target(swapchain)?,
            EmberRenderTarget::Framebuffer(framebuffer) => Self::framebuffer_target(framebuffer)?,
        };

        let extents = render_target.extents()?;
        if render_target != self.bound.render_target {
            self.unbind_render_target()?;
        }

        self.target = target;
        self.transition_bound_target();
        self.command_list.om_set_render_targets(
            &self.target.render_target_views,
            self.target.depth_stencil_view.as_ref(),
        );

        self.bound.bind_render_target(render_target, extents);
        self.command_list
            .rs_set_viewports(&[d3d12::D3D12_VIEWPORT::from(&self.bound.viewport)]);
        self.command_list
            .rs_set_scissor_rects(&[d3d12::D3D12_RECT::from(&self.bound.scissor)]);

        log::trace!(
            "Bound {:?} render target {:?}",
            self.bound.render_target.target_type(),
            extents
        );
        Ok(())
    }

    // Back buffers return to PRESENT when the swapchain stops being the target. A multisampled
    // swapchain is resolved into its back buffer first.
    fn unbind_render_target(&mut self) -> EmberReplayResult {
        let render_target = std::mem::take(&mut self.bound.render_target);
        self.bound.unbind_render_target();
        let target = std::mem::take(&mut self.target);

        if let EmberRenderTarget::Swapchain(swapchain) = render_target {
            let dx12_swapchain = swapchain
                .dx12_swapchain()
                .ok_or("The swapchain was not created by the dx12 backend")?;

            if dx12_swapchain.multisampled_framebuffer().is_some() {
                let source = target
                    .color
                    .first()
                    .ok_or("Multisampled swapchain has no color attachment")?;
                let back_buffer = dx12_swapchain.current_back_buffer()?;
                self.resolve_into_back_buffer(source, &back_buffer)?;
            } else if let Some(back_buffer) = &target.back_buffer {
                back_buffer
                    .tracked()
                    .transition_all(self.command_list, d3d12::D3D12_RESOURCE_STATE_PRESENT);
            }
        }

        Ok(())
    }

    /// Resolves a color texture into the top-left corner of a back buffer, leaving the back
    /// buffer ready to present
    fn resolve_into_back_buffer(
        &mut self,
        source: &EmberTexture,
        back_buffer: &Dx12BackBuffer,
    ) -> EmberResult<()> {
        let dx12_source = source
            .dx12_texture()
            .ok_or("The texture was not created by the dx12 backend")?;

        dx12_source
            .tracked()
            .transition_all(self.command_list, d3d12::D3D12_RESOURCE_STATE_RESOLVE_SOURCE);
        back_buffer
            .tracked()
            .transition_all(self.command_list, d3d12::D3D12_RESOURCE_STATE_RESOLVE_DEST);

        self.command_list.resolve_subresource_region(
            back_buffer.tracked().dx12_resource(),
            0,
            0,
            0,
            dx12_source.dx12_resource(),
            0,
            None,
            dx12_source.dxgi_format(),
        );

        back_buffer
            .tracked()
            .transition_all(self.command_list, d3d12::D3D12_RESOURCE_STATE_PRESENT);
        Ok(())
    }

    fn resolve_framebuffer_to_swapchain(
        &mut self,
        framebuffer: &Arc<EmberFramebuffer>,
        color_attachment_index: u32,
        swapchain: &EmberSwapchain,
    ) -> EmberReplayResult {
        let source_format = EmberRenderTarget::Framebuffer(framebuffer.clone())
            .color_format(color_attachment_index)?;
        verify_resolve(
            framebuffer.extents(),
            source_format,
            swapchain.extents(),
            swapchain.format(),
        )?;

        let source = framebuffer
            .color_attachment(color_attachment_index)
            .ok_or("The framebuffer has no such color attachment")?;
        let dx12_swapchain = swapchain
            .dx12_swapchain()
            .ok_or("The swapchain was not created by the dx12 backend")?;
        let back_buffer = dx12_swapchain.current_back_buffer()?;

        let result = self.resolve_into_back_buffer(&source, &back_buffer);

        // The source or the back buffer may be part of the bound target
        self.transition_bound_target();
        result?;
        Ok(())
    }

    fn depth_stencil_format(&self) -> Option<EmberFormat> {
        match &self.bound.render_target {
            EmberRenderTarget::Swapchain(swapchain) => {
                swapchain.swapchain_def().depth_stencil_format
            }
            EmberRenderTarget::Framebuffer(framebuffer) => {
                framebuffer.framebuffer_def().depth_stencil_format
            }
            EmberRenderTarget::None => None,
        }
    }

    //
    // Draws
    //

    // Pipeline state objects bake in the formats and sample count they render to
    fn verify_pipeline_matches_target(
        &self,
        pipeline: &EmberPipeline,
    ) -> EmberReplayResult {
        let pipeline_def = pipeline.pipeline_def();
        let render_target = &self.bound.render_target;

        let color_attachment_count = render_target.color_attachment_count()?;
        if pipeline_def.color_formats.len() as u32 != color_attachment_count {
            Err(format!(
                "The pipeline writes {} color attachments but the render target has {}",
                pipeline_def.color_formats.len(),
                color_attachment_count
            ))?;
        }

        for (attachment_index, &format) in pipeline_def.color_formats.iter().enumerate() {
            let target_format = render_target.color_format(attachment_index as u32)?;
            if format != target_format {
                Err(format!(
                    "The pipeline writes {:?} to color attachment {} but the render target is {:?}",
                    format, attachment_index, target_format
                ))?;
            }
        }

        let sample_count = render_target.sample_count()?;
        if pipeline_def.sample_count != sample_count {
            Err(format!(
                "The pipeline renders with {:?} but the render target has {:?}",
                pipeline_def.sample_count, sample_count
            ))?;
        }

        if let Some(depth_stencil_format) = pipeline_def.depth_stencil_format {
            if self.depth_stencil_format() != Some(depth_stencil_format) {
                Err(format!(
                    "The pipeline uses a {:?} depth attachment which the render target does not have",
                    depth_stencil_format
                ))?;
            }
        }

        Ok(())
    }

    fn prepare_draw(
        &mut self,
        pipeline: &EmberPipeline,
        dx12_pipeline: &EmberPipelineDx12,
    ) -> EmberReplayResult {
        self.verify_pipeline_matches_target(pipeline)?;

        // Every slot up to the last one an attribute reads from needs a view
        let slot_count = pipeline
            .pipeline_def()
            .vertex_layout
            .attributes
            .iter()
            .map(|attribute| attribute.buffer_index + 1)
            .max()
            .unwrap_or(0)
            .min(dx12_pipeline.vertex_buffer_count());

        let mut views = Vec::with_capacity(slot_count as usize);
        for slot in 0..slot_count {
            let BoundVertexBuffer {
                buffer,
                byte_offset,
            } = self
                .bound
                .vertex_buffers
                .get(&slot)
                .ok_or_else(|| format!("Vertex buffer slot {} has no buffer bound", slot))?;
            let dx12_buffer = buffer
                .dx12_buffer()
                .ok_or("The vertex buffer was not created by the dx12 backend")?;

            let size = buffer.buffer_def().size;
            if *byte_offset >= size {
                Err(format!(
                    "Vertex buffer offset {} is past the end of the {} byte buffer",
                    byte_offset, size
                ))?;
            }

            views.push(d3d12::D3D12_VERTEX_BUFFER_VIEW {
                BufferLocation: dx12_buffer.gpu_address() + byte_offset,
                SizeInBytes: (size - byte_offset) as u32,
                StrideInBytes: dx12_pipeline.vertex_buffer_stride(slot).unwrap_or(0),
            });
        }

        if !views.is_empty() {
            self.command_list.ia_set_vertex_buffers(0, &views);
        }

        self.apply_resource_set(dx12_pipeline)
    }

    // Sampled textures move to PIXEL_SHADER_RESOURCE. Textures of the bound target stay
    // writable.
    fn transition_sampled_textures(
        &mut self,
        resource_set: &EmberResourceSet,
    ) -> EmberReplayResult {
        let dx12_resource_set = resource_set
            .dx12_resource_set()
            .ok_or("The resource set was not created by the dx12 backend")?;

        let bound_resources = dx12_resource_set.bound_resources();
        for binding in dx12_resource_set.binding_table().bindings() {
            if let Some(Dx12BoundResource::CombinedImageSampler { texture, .. }) =
                &bound_resources[binding.resource_index as usize]
            {
                if self.target.contains(texture) {
                    log::warn!(
                        "Texture bound to {} is also bound as a render target and cannot be sampled",
                        binding.name
                    );
                    continue;
                }

                let dx12_texture = texture
                    .dx12_texture()
                    .ok_or("The texture was not created by the dx12 backend")?;
                dx12_texture.tracked().transition_all(
                    self.command_list,
                    d3d12::D3D12_RESOURCE_STATE_PIXEL_SHADER_RESOURCE,
                );
            }
        }

        Ok(())
    }

    // Setting a root signature drops the bound tables, so every draw binds them again: the
    // sampler table first, then the texture and uniform buffer table
    fn apply_resource_set(
        &mut self,
        dx12_pipeline: &EmberPipelineDx12,
    ) -> EmberReplayResult {
        if dx12_pipeline.cbv_srv_root_index().is_none()
            && dx12_pipeline.sampler_root_index().is_none()
        {
            return Ok(());
        }

        let resource_set = self
            .bound
            .resource_set
            .clone()
            .ok_or("The pipeline has resource bindings but no resource set is bound")?;
        let dx12_resource_set = resource_set
            .dx12_resource_set()
            .ok_or("The resource set was not created by the dx12 backend")?;

        if !dx12_resource_set
            .binding_table()
            .is_layout_compatible(dx12_pipeline.binding_table())
        {
            Err("The bound resource set does not have the pipeline's binding layout")?;
        }

        {
            let bound_resources = dx12_resource_set.bound_resources();
            for binding in dx12_resource_set.binding_table().bindings() {
                if bound_resources[binding.resource_index as usize].is_none() {
                    log::warn!("Resource set binding {} has nothing written to it", binding.name);
                }
            }
        }

        // The target may have changed since the set was bound
        self.transition_sampled_textures(&resource_set)?;

        if let (Some(root_index), Some(table)) = (
            dx12_pipeline.sampler_root_index(),
            dx12_resource_set.sampler_table(),
        ) {
            self.command_list
                .set_graphics_root_descriptor_table(root_index, table);
        }

        if let (Some(root_index), Some(table)) = (
            dx12_pipeline.cbv_srv_root_index(),
            dx12_resource_set.cbv_srv_table(),
        ) {
            self.command_list
                .set_graphics_root_descriptor_table(root_index, table);
        }

        Ok(())
    }

    fn draw(
        &mut self,
        vertex_start: u32,
        vertex_count: u32,
        instance_start: u32,
        instance_count: u32,
    ) -> EmberReplayResult {
        let pipeline = self.bound.verify_draw()?;
        let dx12_pipeline = Self::dx12_pipeline(&pipeline)?;
        self.prepare_draw(&pipeline, dx12_pipeline)?;

        self.command_list
            .draw_instanced(vertex_count, instance_count, vertex_start, instance_start);
        Ok(())
    }

    fn draw_indexed(
        &mut self,
        index_start: u32,
        index_count: u32,
        vertex_offset: i32,
        instance_start: u32,
        instance_count: u32,
    ) -> EmberReplayResult {
        let (pipeline, index_buffer) = self.bound.verify_indexed_draw()?;
        let dx12_pipeline = Self::dx12_pipeline(&pipeline)?;
        self.prepare_draw(&pipeline, dx12_pipeline)?;

        let BoundIndexBuffer {
            buffer,
            index_type,
            byte_offset,
        } = index_buffer;
        let dx12_buffer = buffer
            .dx12_buffer()
            .ok_or("The index buffer was not created by the dx12 backend")?;

        let size = buffer.buffer_def().size;
        if byte_offset >= size {
            Err(format!(
                "Index buffer offset {} is past the end of the {} byte buffer",
                byte_offset, size
            ))?;
        }

        self.command_list
            .ia_set_index_buffer(Some(&d3d12::D3D12_INDEX_BUFFER_VIEW {
                BufferLocation: dx12_buffer.gpu_address() + byte_offset,
                SizeInBytes: (size - byte_offset) as u32,
                Format: index_type.dx12_index_format(),
            }));
        self.command_list.draw_indexed_instanced(
            index_count,
            instance_count,
            index_start,
            vertex_offset,
            instance_start,
        );
        Ok(())
    }
}

impl<'a> EmberCommandExecutor for EmberCommandExecutorDx12<'a> {
    fn execute_command(
        &mut self,
        command: &EmberRenderCommand,
    ) -> EmberReplayResult {
        match command {
            EmberRenderCommand::SetVertexBuffer {
                buffer,
                slot,
                byte_offset,
            } => {
                let buffer = upgrade(buffer, "vertex buffer")?;
                self.bound.vertex_buffers.insert(
                    *slot,
                    BoundVertexBuffer {
                        buffer,
                        byte_offset: *byte_offset,
                    },
                );
            }
            EmberRenderCommand::SetIndexBuffer {
                buffer,
                index_type,
                byte_offset,
            } => {
                let buffer = upgrade(buffer, "index buffer")?;
                self.bound.index_buffer = Some(BoundIndexBuffer {
                    buffer,
                    index_type: *index_type,
                    byte_offset: *byte_offset,
                });
            }
            EmberRenderCommand::SetPipeline { pipeline } => {
                let pipeline = upgrade(pipeline, "pipeline")?;
                let dx12_pipeline = Self::dx12_pipeline(&pipeline)?;

                if let Some(render_target) = &pipeline.pipeline_def().render_target {
                    if *render_target != self.bound.render_target {
                        self.bind_render_target(render_target.clone())?;
                    }
                }

                // Setting the root signature invalidates the bound descriptor tables, draws
                // set them again
                self.command_list
                    .set_graphics_root_signature(dx12_pipeline.dx12_root_signature());
                self.command_list
                    .set_pipeline_state(dx12_pipeline.dx12_pipeline_state());
                self.command_list
                    .ia_set_primitive_topology(dx12_pipeline.dx12_topology());
                self.command_list.om_set_blend_factor(self.bound.blend_factor);
                self.command_list
                    .om_set_stencil_ref(self.bound.stencil_reference as u32);
                self.bound.pipeline = Some(pipeline.clone());
            }
            EmberRenderCommand::Draw {
                vertex_start,
                vertex_count,
            } => self.draw(*vertex_start, *vertex_count, 0, 1)?,
            EmberRenderCommand::DrawIndexed {
                index_start,
                index_count,
                vertex_offset,
            } => self.draw_indexed(*index_start, *index_count, *vertex_offset, 0, 1)?,
            EmberRenderCommand::DrawInstanced {
                vertex_start,
                vertex_count,
                instance_start,
                instance_count,
            } => self.draw(*vertex_start, *vertex_count, *instance_start, *instance_count)?,
            EmberRenderCommand::DrawInstancedIndexed {
                index_start,
                index_count,
                vertex_offset,
                instance_start,
                instance_count,
            } => self.draw_indexed(
                *index_start,
                *index_count,
                *vertex_offset,
                *instance_start,
                *instance_count,
            )?,
            EmberRenderCommand::SetResourceSet { resource_set } => {
                let resource_set = upgrade(resource_set, "resource set")?;
                self.transition_sampled_textures(&resource_set)?;
                self.bound.resource_set = Some(resource_set);
            }
            EmberRenderCommand::ClearColorTarget {
                attachment_index,
                value,
                rect,
            } => {
                self.bound.verify_color_attachment(*attachment_index)?;
                let render_target_view = *self
                    .target
                    .render_target_views
                    .get(*attachment_index as usize)
                    .ok_or("The color attachment has no render target view")?;

                let rects = match rect {
                    Some(rect) => {
                        verify_rect(rect, self.bound.render_target_extents)?;
                        vec![d3d12::D3D12_RECT::from(rect)]
                    }
                    None => Vec::default(),
                };

                self.command_list
                    .clear_render_target_view(render_target_view, value.0, &rects);
            }
            EmberRenderCommand::ClearDepthTarget { value, rect } => {
                self.bound.verify_depth_attachment()?;
                verify_depth_clear_value(value)?;
                let depth_stencil_view = self
                    .target
                    .depth_stencil_view
                    .ok_or("The depth attachment has no depth stencil view")?;

                let rects = match rect {
                    Some(rect) => {
                        verify_rect(rect, self.bound.render_target_extents)?;
                        vec![d3d12::D3D12_RECT::from(rect)]
                    }
                    None => Vec::default(),
                };

                let has_stencil = self
                    .depth_stencil_format()
                    .map(|format| format.has_stencil())
                    .unwrap_or(false);
                let mut flags = d3d12::D3D12_CLEAR_FLAG_DEPTH;
                if has_stencil {
                    flags |= d3d12::D3D12_CLEAR_FLAG_STENCIL;
                }

                self.command_list.clear_depth_stencil_view(
                    depth_stencil_view,
                    flags,
                    value.depth,
                    value.stencil,
                    &rects,
                );
            }
            EmberRenderCommand::SetRenderTarget { render_target } => {
                let render_target = render_target
                    .upgrade()
                    .ok_or(EmberReplayError::Expired("render target"))?;
                self.bind_render_target(render_target)?;
            }
            EmberRenderCommand::SetViewport { viewport } => {
                if !self.bound.has_render_target() {
                    Err("No render target is bound")?;
                }

                verify_viewport(viewport, self.bound.render_target_extents)?;
                self.command_list
                    .rs_set_viewports(&[d3d12::D3D12_VIEWPORT::from(viewport)]);
                self.bound.viewport = *viewport;
            }
            EmberRenderCommand::SetScissor { scissor } => {
                if !self.bound.has_render_target() {
                    Err("No render target is bound")?;
                }

                verify_rect(scissor, self.bound.render_target_extents)?;
                self.command_list
                    .rs_set_scissor_rects(&[d3d12::D3D12_RECT::from(scissor)]);
                self.bound.scissor = *scissor;
            }
            EmberRenderCommand::ResolveFramebufferToSwapchain {
                framebuffer,
                color_attachment_index,
                swapchain,
            } => {
                let framebuffer = upgrade(framebuffer, "framebuffer")?;
                let swapchain = upgrade(swapchain, "swapchain")?;
                self.resolve_framebuffer_to_swapchain(
                    &framebuffer,
                    *color_attachment_index,
                    &swapchain,
                )?;
            }
            EmberRenderCommand::StartTimingQuery { query } => {
                let query = upgrade(query, "timing query")?;
                let dx12_query = query
                    .dx12_timing_query()
                    .ok_or("The timing query was not created by the dx12 backend")?;
                self.command_list.end_query(
                    dx12_query.dx12_query_heap(),
                    d3d12::D3D12_QUERY_TYPE_TIMESTAMP,
                    START_QUERY_INDEX,
                );
            }
            EmberRenderCommand::StopTimingQuery { query } => {
                let query = upgrade(query, "timing query")?;
                let dx12_query = query
                    .dx12_timing_query()
                    .ok_or("The timing query was not created by the dx12 backend")?;
                self.command_list.end_query(
                    dx12_query.dx12_query_heap(),
                    d3d12::D3D12_QUERY_TYPE_TIMESTAMP,
                    STOP_QUERY_INDEX,
                );
                self.command_list.resolve_query_data(
                    dx12_query.dx12_query_heap(),
                    d3d12::D3D12_QUERY_TYPE_TIMESTAMP,
                    START_QUERY_INDEX,
                    2,
                    dx12_query.dx12_readback_buffer(),
                    0,
                );
                self.stopped_timing_queries.push(query);
            }
            EmberRenderCommand::SetBlendFactor { factor } => {
                self.command_list.om_set_blend_factor(*factor);
                self.bound.blend_factor = *factor;
            }
            EmberRenderCommand::SetStencilReference { reference } => {
                self.bound.stencil_reference = (*reference).min(0xFF) as u8;
                self.command_list
                    .om_set_stencil_ref(self.bound.stencil_reference as u32);
            }
            EmberRenderCommand::PushDebugGroup { name } => {
                self.command_list.begin_event(name);
                self.bound.push_debug_group();
            }
            EmberRenderCommand::PopDebugGroup => {
                self.bound.pop_debug_group()?;
                self.command_list.end_event();
            }
            EmberRenderCommand::InsertDebugMarker { name } => {
                self.command_list.set_marker(name);
            }
        }

        Ok(())
    }

    fn end_replay(&mut self) {
        let open_debug_groups = self.bound.take_open_debug_groups();
        if open_debug_groups > 0 {
            log::warn!(
                "{} debug groups were left open at the end of the command list",
                open_debug_groups
            );
        }
        for _ in 0..open_debug_groups {
            self.command_list.end_event();
        }

        if let Err(e) = self.unbind_render_target() {
            log::error!("Failed to unbind the render target at the end of replay: {}", e);
        }
    }
}
