use crate::command_executor::{
    upgrade, verify_depth_clear_value, verify_rect, verify_resolve, verify_viewport,
};
use crate::command_executor::{BoundIndexBuffer, BoundVertexBuffer, EmberBoundState};
use crate::gl::{
    EmberDeviceContextGl, EmberPipelineGl, GlBoundResource, GlContext, GlContextGuard,
    GlDepthStencilState, WindowHash, NONE_FRAMEBUFFER,
};
use crate::{
    EmberCommandExecutor, EmberFramebuffer, EmberPipeline, EmberRenderCommand, EmberRenderTarget,
    EmberReplayError, EmberReplayResult, EmberResult, EmberScissor, EmberSwapchain,
    EmberViewport,
};
use std::sync::Arc;

use crate::gl::gl43;

/// Top-left origin viewport to GL window coordinates, which have a bottom-left origin
pub(crate) fn to_gl_viewport(
    viewport: &EmberViewport,
    target_height: u32,
) -> [i32; 4] {
    let y = target_height as f32 - (viewport.y + viewport.height);
    [
        viewport.x.round() as i32,
        y.round() as i32,
        viewport.width.round() as i32,
        viewport.height.round() as i32,
    ]
}

/// Inverse of `to_gl_viewport` for viewports on whole pixels
#[cfg(test)]
pub(crate) fn from_gl_viewport(
    viewport: [i32; 4],
    depth_range: [f32; 2],
    target_height: u32,
) -> EmberViewport {
    let [x, y, width, height] = viewport;
    let top = target_height as i64 - (y as i64 + height as i64);
    EmberViewport {
        x: x as f32,
        y: top as f32,
        width: width as f32,
        height: height as f32,
        min_depth: depth_range[0],
        max_depth: depth_range[1],
    }
}

/// Top-left origin rect to GL window coordinates. Used for scissors and clear rects.
pub(crate) fn to_gl_rect(
    rect: &EmberScissor,
    target_height: u32,
) -> [i32; 4] {
    let y = target_height as i64 - (rect.y as i64 + rect.height as i64);
    [rect.x, y as i32, rect.width as i32, rect.height as i32]
}

/// Inverse of `to_gl_rect`
#[cfg(test)]
pub(crate) fn from_gl_rect(
    rect: [i32; 4],
    target_height: u32,
) -> EmberScissor {
    let [x, y, width, height] = rect;
    let top = target_height as i64 - (y as i64 + height as i64);
    EmberScissor {
        x,
        y: top as i32,
        width: width as u32,
        height: height as u32,
    }
}

/// Replays a command list against the GL context. Holding the context guard for the lifetime of
/// the executor keeps any other submission out until replay is finished.
pub struct EmberCommandExecutorGl<'a> {
    device_context: &'a EmberDeviceContextGl,
    gl_context: GlContextGuard<'a>,
    bound: EmberBoundState,
}

impl<'a> EmberCommandExecutorGl<'a> {
    pub(crate) fn new(
        device_context: &'a EmberDeviceContextGl,
        gl_context: GlContextGuard<'a>,
    ) -> Self {
        EmberCommandExecutorGl {
            device_context,
            gl_context,
            bound: EmberBoundState::default(),
        }
    }

    fn gl_pipeline(pipeline: &EmberPipeline) -> Result<&EmberPipelineGl, EmberReplayError> {
        pipeline
            .gl_pipeline()
            .ok_or_else(|| "The pipeline was not created by the gl backend".into())
    }

    //
    // Render targets
    //

    fn gl_swapchain_framebuffer(
        gl_context: &mut GlContext,
        swapchain: &EmberSwapchain,
    ) -> EmberResult<()> {
        let gl_swapchain = swapchain
            .gl_swapchain()
            .ok_or("The swapchain was not created by the gl backend")?;
        gl_context.make_current(gl_swapchain.gl_window_hash())?;

        match swapchain.multisampled_framebuffer() {
            Some(framebuffer) => Self::gl_framebuffer(gl_context, &framebuffer),
            None => {
                gl_context.gl_bind_framebuffer(gl43::FRAMEBUFFER, NONE_FRAMEBUFFER)?;
                gl_context.gl_draw_buffers(&[gl43::BACK_LEFT])
            }
        }
    }

    fn gl_framebuffer(
        gl_context: &mut GlContext,
        framebuffer: &EmberFramebuffer,
    ) -> EmberResult<()> {
        let gl_framebuffer = framebuffer
            .gl_framebuffer()
            .ok_or("The framebuffer was not created by the gl backend")?;
        gl_context.gl_bind_framebuffer(gl43::FRAMEBUFFER, gl_framebuffer.gl_framebuffer_id())
    }

    // Binds the native framebuffer of a target without touching viewport or scissor
    fn bind_native_target(
        &mut self,
        render_target: &EmberRenderTarget,
    ) -> EmberResult<()> {
        match render_target {
            EmberRenderTarget::None => self
                .gl_context
                .gl_bind_framebuffer(gl43::FRAMEBUFFER, NONE_FRAMEBUFFER),
            EmberRenderTarget::Swapchain(swapchain) => {
                Self::gl_swapchain_framebuffer(&mut self.gl_context, swapchain)
            }
            EmberRenderTarget::Framebuffer(framebuffer) => {
                Self::gl_framebuffer(&mut self.gl_context, framebuffer)
            }
        }
    }

    fn bind_render_target(
        &mut self,
        render_target: EmberRenderTarget,
    ) -> EmberReplayResult {
        if render_target == EmberRenderTarget::None {
            Err("Cannot bind the None render target")?;
        }

        let extents = render_target.extents()?;
        if render_target != self.bound.render_target {
            self.unbind_render_target()?;
        }

        self.bind_native_target(&render_target)?;
        self.bound.bind_render_target(render_target, extents);

        let gl_context = &mut self.gl_context;
        gl_context.gl_viewport(0, 0, extents.width as i32, extents.height as i32)?;
        gl_context.gl_depth_rangef(0.0, 1.0)?;
        gl_context.gl_scissor(0, 0, extents.width as i32, extents.height as i32)?;
        gl_context.gl_enable(gl43::SCISSOR_TEST)?;

        log::trace!(
            "Bound {:?} render target {:?}",
            self.bound.render_target.target_type(),
            extents
        );
        Ok(())
    }

    // A multisampled swapchain is resolved into its back buffer when it stops being the target
    fn unbind_render_target(&mut self) -> EmberReplayResult {
        let render_target = std::mem::take(&mut self.bound.render_target);
        self.bound.unbind_render_target();

        if let EmberRenderTarget::Swapchain(swapchain) = render_target {
            if let Some(framebuffer) = swapchain.multisampled_framebuffer() {
                let extents = swapchain.extents();
                let gl_swapchain = swapchain
                    .gl_swapchain()
                    .ok_or("The swapchain was not created by the gl backend")?;
                self.blit_to_back_buffer(
                    &framebuffer,
                    0,
                    gl_swapchain.gl_window_hash(),
                    [0, 0, extents.width as i32, extents.height as i32],
                )?;
            }
        }

        Ok(())
    }

    /// Copies one color attachment into a window's back buffer. The scissor test is suspended
    /// during the copy. The framebuffer bindings are left for the caller to restore.
    fn blit_to_back_buffer(
        &mut self,
        framebuffer: &EmberFramebuffer,
        color_attachment_index: u32,
        window_hash: WindowHash,
        dst_rect: [i32; 4],
    ) -> EmberResult<()> {
        let gl_framebuffer = framebuffer
            .gl_framebuffer()
            .ok_or("The framebuffer was not created by the gl backend")?;
        let extents = framebuffer.extents();

        let gl_context = &mut self.gl_context;
        gl_context
            .gl_bind_framebuffer(gl43::READ_FRAMEBUFFER, gl_framebuffer.gl_framebuffer_id())?;
        gl_context.gl_read_buffer(gl43::COLOR_ATTACHMENT0 + color_attachment_index)?;
        gl_context.make_current(window_hash)?;
        gl_context.gl_bind_framebuffer(gl43::DRAW_FRAMEBUFFER, NONE_FRAMEBUFFER)?;
        gl_context.gl_draw_buffers(&[gl43::BACK_LEFT])?;

        let scissor_enabled = gl_context.gl_is_enabled(gl43::SCISSOR_TEST);
        gl_context.gl_disable(gl43::SCISSOR_TEST)?;
        let [x, y, width, height] = dst_rect;
        let result = gl_context.gl_blit_framebuffer(
            0,
            0,
            extents.width as i32,
            extents.height as i32,
            x,
            y,
            x + width,
            y + height,
            gl43::COLOR_BUFFER_BIT,
            gl43::NEAREST,
        );
        gl_context.gl_read_buffer(gl43::COLOR_ATTACHMENT0)?;
        if scissor_enabled {
            gl_context.gl_enable(gl43::SCISSOR_TEST)?;
        }

        result
    }

    fn resolve_framebuffer_to_swapchain(
        &mut self,
        framebuffer: &Arc<EmberFramebuffer>,
        color_attachment_index: u32,
        swapchain: &EmberSwapchain,
    ) -> EmberReplayResult {
        let source_format = EmberRenderTarget::Framebuffer(framebuffer.clone())
            .color_format(color_attachment_index)?;
        let source_extents = framebuffer.extents();
        let destination_extents = swapchain.extents();
        verify_resolve(
            source_extents,
            source_format,
            destination_extents,
            swapchain.format(),
        )?;

        let gl_swapchain = swapchain
            .gl_swapchain()
            .ok_or("The swapchain was not created by the gl backend")?;

        // Aligned to the top-left corner of the back buffer
        let dst_rect = [
            0,
            (destination_extents.height - source_extents.height) as i32,
            source_extents.width as i32,
            source_extents.height as i32,
        ];
        let result = self.blit_to_back_buffer(
            framebuffer,
            color_attachment_index,
            gl_swapchain.gl_window_hash(),
            dst_rect,
        );

        let render_target = self.bound.render_target.clone();
        self.bind_native_target(&render_target)?;
        result?;
        Ok(())
    }

    //
    // Pipeline state
    //

    // Shared by SetPipeline and SetStencilReference
    fn do_set_stencil_compare_ref_mask(
        gl_context: &mut GlContext,
        state: &GlDepthStencilState,
        stencil_reference: u8,
    ) -> EmberResult<()> {
        gl_context.gl_stencil_func_separate(
            gl43::FRONT,
            state.front.compare_op,
            stencil_reference as i32,
            state.stencil_read_mask,
        )?;
        gl_context.gl_stencil_func_separate(
            gl43::BACK,
            state.back.compare_op,
            stencil_reference as i32,
            state.stencil_read_mask,
        )
    }

    fn apply_pipeline_state(
        &mut self,
        gl_pipeline: &EmberPipelineGl,
    ) -> EmberResult<()> {
        let gl_context = &mut self.gl_context;
        gl_context.gl_use_program(gl_pipeline.gl_program_id())?;

        let gl_rasterizer_state = gl_pipeline.gl_rasterizer_state();
        if gl_rasterizer_state.cull_enabled {
            gl_context.gl_enable(gl43::CULL_FACE)?;
            gl_context.gl_cull_face(gl_rasterizer_state.cull_mode)?;
        } else {
            gl_context.gl_disable(gl43::CULL_FACE)?;
        }
        gl_context.gl_front_face(gl_rasterizer_state.front_face)?;
        gl_context.gl_polygon_mode(gl43::FRONT_AND_BACK, gl_rasterizer_state.fill_mode)?;

        if gl_rasterizer_state.offset_enabled {
            gl_context.gl_enable(gl43::POLYGON_OFFSET_FILL)?;
            gl_context.gl_enable(gl43::POLYGON_OFFSET_LINE)?;
            gl_context.gl_polygon_offset(
                gl_rasterizer_state.offset_factor,
                gl_rasterizer_state.offset_units,
            )?;
        } else {
            gl_context.gl_disable(gl43::POLYGON_OFFSET_FILL)?;
            gl_context.gl_disable(gl43::POLYGON_OFFSET_LINE)?;
        }

        if gl_rasterizer_state.depth_clamp_enabled {
            gl_context.gl_enable(gl43::DEPTH_CLAMP)?;
        } else {
            gl_context.gl_disable(gl43::DEPTH_CLAMP)?;
        }

        let gl_depth_stencil_state = gl_pipeline.gl_depth_stencil_state();
        if gl_depth_stencil_state.depth_test_enabled {
            gl_context.gl_enable(gl43::DEPTH_TEST)?;
            gl_context.gl_depth_func(gl_depth_stencil_state.depth_compare_op)?;
        } else {
            gl_context.gl_disable(gl43::DEPTH_TEST)?;
        }
        gl_context.gl_depth_mask(gl_depth_stencil_state.depth_write_enabled)?;

        if gl_depth_stencil_state.stencil_test_enabled {
            gl_context.gl_enable(gl43::STENCIL_TEST)?;
            Self::do_set_stencil_compare_ref_mask(
                gl_context,
                gl_depth_stencil_state,
                self.bound.stencil_reference,
            )?;
            gl_context.gl_stencil_op_separate(
                gl43::FRONT,
                gl_depth_stencil_state.front.fail_op,
                gl_depth_stencil_state.front.depth_fail_op,
                gl_depth_stencil_state.front.pass_op,
            )?;
            gl_context.gl_stencil_op_separate(
                gl43::BACK,
                gl_depth_stencil_state.back.fail_op,
                gl_depth_stencil_state.back.depth_fail_op,
                gl_depth_stencil_state.back.pass_op,
            )?;
        } else {
            gl_context.gl_disable(gl43::STENCIL_TEST)?;
        }
        gl_context.gl_stencil_mask_separate(
            gl43::FRONT_AND_BACK,
            gl_depth_stencil_state.stencil_write_mask,
        )?;

        for (index, target) in gl_pipeline.gl_blend_state().targets.iter().enumerate() {
            let index = index as u32;
            if target.enabled {
                gl_context.gl_enablei(gl43::BLEND, index)?;
                gl_context.gl_blend_func_separatei(
                    index,
                    target.src_factor,
                    target.dst_factor,
                    target.src_factor_alpha,
                    target.dst_factor_alpha,
                )?;
                gl_context.gl_blend_equation_separatei(
                    index,
                    target.blend_op,
                    target.blend_op_alpha,
                )?;
            } else {
                gl_context.gl_disablei(gl43::BLEND, index)?;
            }

            let [red, green, blue, alpha] = target.color_mask;
            gl_context.gl_color_maski(index, red, green, blue, alpha)?;
        }

        let [red, green, blue, alpha] = self.bound.blend_factor;
        gl_context.gl_blend_color(red, green, blue, alpha)
    }

    // Clears ignore the pipeline's write masks. They are put back afterwards.
    fn restore_write_masks(&mut self) -> EmberResult<()> {
        let pipeline = self.bound.pipeline.clone();
        let gl_pipeline = pipeline.as_ref().and_then(|pipeline| pipeline.gl_pipeline());
        let gl_context = &mut self.gl_context;

        match gl_pipeline {
            Some(gl_pipeline) => {
                let gl_depth_stencil_state = gl_pipeline.gl_depth_stencil_state();
                gl_context.gl_depth_mask(gl_depth_stencil_state.depth_write_enabled)?;
                gl_context.gl_stencil_mask_separate(
                    gl43::FRONT_AND_BACK,
                    gl_depth_stencil_state.stencil_write_mask,
                )?;
                for (index, target) in gl_pipeline.gl_blend_state().targets.iter().enumerate() {
                    let [red, green, blue, alpha] = target.color_mask;
                    gl_context.gl_color_maski(index as u32, red, green, blue, alpha)?;
                }
            }
            None => {
                gl_context.gl_depth_mask(true)?;
                gl_context.gl_stencil_mask_separate(gl43::FRONT_AND_BACK, 0xFF)?;
            }
        }

        let extents = self.bound.render_target_extents;
        let [x, y, width, height] = to_gl_rect(&self.bound.scissor, extents.height);
        gl_context.gl_scissor(x, y, width, height)
    }

    // Scissor covering a clear rect, or the whole target
    fn set_clear_scissor(
        &mut self,
        rect: &Option<EmberScissor>,
    ) -> EmberReplayResult {
        let extents = self.bound.render_target_extents;
        let rect = match rect {
            Some(rect) => {
                verify_rect(rect, extents)?;
                *rect
            }
            None => EmberScissor::covering(extents),
        };

        let [x, y, width, height] = to_gl_rect(&rect, extents.height);
        self.gl_context.gl_scissor(x, y, width, height)?;
        Ok(())
    }

    //
    // Draws
    //

    fn prepare_draw(
        &mut self,
        gl_pipeline: &EmberPipelineGl,
    ) -> EmberReplayResult {
        let max_vertex_attribute_count = self
            .device_context
            .device_info()
            .max_vertex_attribute_count;
        let mut used_locations = vec![false; max_vertex_attribute_count as usize];

        for attribute in gl_pipeline.gl_attributes() {
            let BoundVertexBuffer {
                buffer,
                byte_offset,
            } = &self.bound.vertex_buffers[&attribute.buffer_index];
            let gl_buffer = buffer
                .gl_buffer()
                .ok_or("The vertex buffer was not created by the gl backend")?;

            let gl_context = &mut self.gl_context;
            gl_context.gl_bind_buffer(gl43::ARRAY_BUFFER, gl_buffer.gl_buffer_id())?;
            gl_context.gl_vertex_attrib_pointer(
                attribute.location,
                attribute.format.size,
                attribute.format.gl_type,
                attribute.format.is_normalized,
                attribute.stride as i32,
                byte_offset + attribute.byte_offset as u64,
            )?;
            gl_context.gl_enable_vertex_attrib_array(attribute.location)?;
            gl_context.gl_vertex_attrib_divisor(attribute.location, attribute.divisor)?;

            if let Some(used) = used_locations.get_mut(attribute.location as usize) {
                *used = true;
            }
        }

        for (location, used) in used_locations.iter().enumerate() {
            if !used {
                self.gl_context
                    .gl_disable_vertex_attrib_array(location as u32)?;
            }
        }

        self.apply_resource_set(gl_pipeline)
    }

    // Samplers use the texture unit, and uniform blocks the binding point, equal to the
    // binding's resource index
    fn apply_resource_set(
        &mut self,
        gl_pipeline: &EmberPipelineGl,
    ) -> EmberReplayResult {
        let resource_set = match &self.bound.resource_set {
            Some(resource_set) => resource_set.clone(),
            None => return Ok(()),
        };
        let gl_resource_set = resource_set
            .gl_resource_set()
            .ok_or("The resource set was not created by the gl backend")?;

        let program_id = gl_pipeline.gl_program_id();
        let bound_resources = gl_resource_set.bound_resources();
        for binding in gl_resource_set.binding_table().bindings() {
            let resource = match &bound_resources[binding.resource_index as usize] {
                Some(resource) => resource,
                None => {
                    log::warn!("Resource set binding {} has nothing written to it", binding.name);
                    continue;
                }
            };

            let gl_context = &mut self.gl_context;
            match resource {
                GlBoundResource::UniformBuffer(buffer) => {
                    let block_index =
                        gl_context.gl_get_uniform_block_index(program_id, &binding.name)?;
                    if block_index == gl43::INVALID_INDEX {
                        log::trace!("Program has no uniform block {}", binding.name);
                        continue;
                    }

                    let gl_buffer = buffer
                        .gl_buffer()
                        .ok_or("The uniform buffer was not created by the gl backend")?;
                    gl_context.gl_uniform_block_binding(
                        program_id,
                        block_index,
                        binding.resource_index,
                    )?;
                    gl_context.gl_bind_buffer_range(
                        gl43::UNIFORM_BUFFER,
                        binding.resource_index,
                        gl_buffer.gl_buffer_id(),
                        0,
                        buffer.buffer_def().size,
                    )?;
                }
                GlBoundResource::CombinedImageSampler { texture, sampler } => {
                    let location =
                        match gl_context.gl_get_uniform_location(program_id, &binding.name)? {
                            Some(location) => location,
                            None => {
                                log::trace!("Program has no sampler uniform {}", binding.name);
                                continue;
                            }
                        };

                    let gl_texture = texture
                        .gl_texture()
                        .ok_or("The texture was not created by the gl backend")?;
                    let gl_sampler = sampler
                        .gl_sampler()
                        .ok_or("The sampler was not created by the gl backend")?;
                    let unit = binding.resource_index;
                    gl_context.gl_active_texture(gl43::TEXTURE0 + unit)?;
                    gl_context.gl_bind_texture(gl_texture.gl_target(), gl_texture.gl_texture_id())?;
                    gl_context.gl_bind_sampler(unit, gl_sampler.gl_sampler_id())?;
                    gl_context.gl_uniform_1i(location, unit as i32)?;
                }
            }
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
        let gl_pipeline = Self::gl_pipeline(&pipeline)?;
        self.prepare_draw(gl_pipeline)?;

        self.gl_context.gl_draw_arrays_instanced_base_instance(
            gl_pipeline.gl_topology(),
            vertex_start as i32,
            vertex_count as i32,
            instance_count as i32,
            instance_start,
        )?;
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
        let gl_pipeline = Self::gl_pipeline(&pipeline)?;
        self.prepare_draw(gl_pipeline)?;

        let BoundIndexBuffer {
            buffer,
            index_type,
            byte_offset,
        } = index_buffer;
        let gl_buffer = buffer
            .gl_buffer()
            .ok_or("The index buffer was not created by the gl backend")?;

        let offset = byte_offset + index_start as u64 * index_type.size_in_bytes() as u64;
        let gl_context = &mut self.gl_context;
        gl_context.gl_bind_buffer(gl43::ELEMENT_ARRAY_BUFFER, gl_buffer.gl_buffer_id())?;
        gl_context.gl_draw_elements_instanced_base_vertex_base_instance(
            gl_pipeline.gl_topology(),
            index_count as i32,
            index_type.gl_index_type(),
            offset,
            instance_count as i32,
            vertex_offset,
            instance_start,
        )?;
        Ok(())
    }
}

impl<'a> EmberCommandExecutor for EmberCommandExecutorGl<'a> {
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
                let gl_pipeline = Self::gl_pipeline(&pipeline)?;

                if let Some(render_target) = &pipeline.pipeline_def().render_target {
                    if *render_target != self.bound.render_target {
                        self.bind_render_target(render_target.clone())?;
                    }
                }

                self.apply_pipeline_state(gl_pipeline)?;
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
                if resource_set.gl_resource_set().is_none() {
                    Err("The resource set was not created by the gl backend")?;
                }
                self.bound.resource_set = Some(resource_set);
            }
            EmberRenderCommand::ClearColorTarget {
                attachment_index,
                value,
                rect,
            } => {
                self.bound.verify_color_attachment(*attachment_index)?;
                self.set_clear_scissor(rect)?;
                self.gl_context
                    .gl_color_maski(*attachment_index, true, true, true, true)?;
                let result =
                    self.gl_context
                        .gl_clear_buffer_fv(gl43::COLOR, *attachment_index, &value.0);
                self.restore_write_masks()?;
                result?;
            }
            EmberRenderCommand::ClearDepthTarget { value, rect } => {
                self.bound.verify_depth_attachment()?;
                verify_depth_clear_value(value)?;
                self.set_clear_scissor(rect)?;

                let depth_stencil_format = match &self.bound.render_target {
                    EmberRenderTarget::Swapchain(swapchain) => {
                        swapchain.swapchain_def().depth_stencil_format
                    }
                    EmberRenderTarget::Framebuffer(framebuffer) => {
                        framebuffer.framebuffer_def().depth_stencil_format
                    }
                    EmberRenderTarget::None => None,
                };
                let has_stencil = depth_stencil_format
                    .map(|format| format.has_stencil())
                    .unwrap_or(false);

                let gl_context = &mut self.gl_context;
                gl_context.gl_depth_mask(true)?;
                gl_context.gl_stencil_mask_separate(gl43::FRONT_AND_BACK, 0xFF)?;
                let result = if has_stencil {
                    gl_context.gl_clear_buffer_fi(
                        gl43::DEPTH_STENCIL,
                        0,
                        value.depth,
                        value.stencil as i32,
                    )
                } else {
                    gl_context.gl_clear_buffer_fv(gl43::DEPTH, 0, &[value.depth])
                };
                self.restore_write_masks()?;
                result?;
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

                let extents = self.bound.render_target_extents;
                verify_viewport(viewport, extents)?;
                let [x, y, width, height] = to_gl_viewport(viewport, extents.height);
                self.gl_context.gl_viewport(x, y, width, height)?;
                self.gl_context
                    .gl_depth_rangef(viewport.min_depth, viewport.max_depth)?;
                self.bound.viewport = *viewport;
            }
            EmberRenderCommand::SetScissor { scissor } => {
                if !self.bound.has_render_target() {
                    Err("No render target is bound")?;
                }

                let extents = self.bound.render_target_extents;
                verify_rect(scissor, extents)?;
                let [x, y, width, height] = to_gl_rect(scissor, extents.height);
                self.gl_context.gl_scissor(x, y, width, height)?;
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
                let gl_query = query
                    .gl_timing_query()
                    .ok_or("The timing query was not created by the gl backend")?;
                self.gl_context
                    .gl_query_counter(gl_query.gl_start_query(), gl43::TIMESTAMP)?;
            }
            EmberRenderCommand::StopTimingQuery { query } => {
                let query = upgrade(query, "timing query")?;
                let gl_query = query
                    .gl_timing_query()
                    .ok_or("The timing query was not created by the gl backend")?;
                self.gl_context
                    .gl_query_counter(gl_query.gl_stop_query(), gl43::TIMESTAMP)?;
            }
            EmberRenderCommand::SetBlendFactor { factor } => {
                let [red, green, blue, alpha] = *factor;
                self.gl_context.gl_blend_color(red, green, blue, alpha)?;
                self.bound.blend_factor = *factor;
            }
            EmberRenderCommand::SetStencilReference { reference } => {
                self.bound.stencil_reference = (*reference).min(0xFF) as u8;
                let pipeline = self.bound.pipeline.clone();
                if let Some(gl_pipeline) = pipeline.as_ref().and_then(|p| p.gl_pipeline()) {
                    Self::do_set_stencil_compare_ref_mask(
                        &mut self.gl_context,
                        gl_pipeline.gl_depth_stencil_state(),
                        self.bound.stencil_reference,
                    )?;
                }
            }
            EmberRenderCommand::PushDebugGroup { name } => {
                self.gl_context
                    .gl_push_debug_group(gl43::DEBUG_SOURCE_APPLICATION, 0, name)?;
                self.bound.push_debug_group();
            }
            EmberRenderCommand::PopDebugGroup => {
                self.bound.pop_debug_group()?;
                self.gl_context.gl_pop_debug_group()?;
            }
            EmberRenderCommand::InsertDebugMarker { name } => {
                self.gl_context.gl_debug_message_insert(
                    gl43::DEBUG_SOURCE_APPLICATION,
                    gl43::DEBUG_TYPE_MARKER,
                    0,
                    gl43::DEBUG_SEVERITY_NOTIFICATION,
                    name,
                )?;
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
            if let Err(e) = self.gl_context.gl_pop_debug_group() {
                log::error!("Failed to close debug group: {}", e);
            }
        }

        if let Err(e) = self.unbind_render_target() {
            log::error!("Failed to unbind the render target at the end of replay: {}", e);
        }
    }
}
