use crate::*;
use std::sync::Arc;

/// The public recording surface. Every recording call appends exactly one command, in call
/// order. Nothing is validated while recording: a draw before any `set_pipeline` records fine
/// and is skipped when the list is replayed.
///
/// Command lists are created with `EmberDeviceContext::create_command_list` and replayed with
/// `EmberDeviceContext::submit_command_list`. The same recorded list can be submitted against
/// either backend.
#[derive(Debug, Default)]
pub struct EmberCommandList {
    recorder: EmberCommandRecorder,
    is_open: bool,
}

impl EmberCommandList {
    pub(crate) fn new() -> Self {
        Default::default()
    }

    /// Discard previously recorded commands and open the list for recording
    pub fn begin(&mut self) {
        self.recorder.clear();
        self.is_open = true;
    }

    /// Close the list. This is advisory, recording more commands is not an error.
    pub fn end(&mut self) {
        if !self.is_open {
            log::debug!("EmberCommandList::end called on a list that is not open");
        }
        self.is_open = false;
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn recorder(&self) -> &EmberCommandRecorder {
        &self.recorder
    }

    fn record(
        &mut self,
        command: EmberRenderCommand,
    ) {
        log::trace!("record {}", command.name());
        self.recorder.push(command);
    }

    /// Bind a vertex buffer to a slot of the pipeline's vertex layout. The stride comes from the
    /// layout of the pipeline bound at draw time.
    pub fn set_vertex_buffer(
        &mut self,
        slot: u32,
        buffer: &Arc<EmberBuffer>,
        byte_offset: u64,
    ) {
        self.record(EmberRenderCommand::SetVertexBuffer {
            buffer: Arc::downgrade(buffer),
            slot,
            byte_offset,
        });
    }

    /// Bind an index buffer. The element format is taken from the buffer's definition.
    pub fn set_index_buffer(
        &mut self,
        buffer: &Arc<EmberBuffer>,
        byte_offset: u64,
    ) {
        let index_type = buffer.buffer_def().index_type;
        self.record(EmberRenderCommand::SetIndexBuffer {
            buffer: Arc::downgrade(buffer),
            index_type,
            byte_offset,
        });
    }

    pub fn set_pipeline(
        &mut self,
        pipeline: &Arc<EmberPipeline>,
    ) {
        self.record(EmberRenderCommand::SetPipeline {
            pipeline: Arc::downgrade(pipeline),
        });
    }

    pub fn draw(
        &mut self,
        vertex_start: u32,
        vertex_count: u32,
    ) {
        self.record(EmberRenderCommand::Draw {
            vertex_start,
            vertex_count,
        });
    }

    pub fn draw_indexed(
        &mut self,
        index_start: u32,
        index_count: u32,
        vertex_offset: i32,
    ) {
        self.record(EmberRenderCommand::DrawIndexed {
            index_start,
            index_count,
            vertex_offset,
        });
    }

    pub fn draw_instanced(
        &mut self,
        vertex_start: u32,
        vertex_count: u32,
        instance_start: u32,
        instance_count: u32,
    ) {
        self.record(EmberRenderCommand::DrawInstanced {
            vertex_start,
            vertex_count,
            instance_start,
            instance_count,
        });
    }

    pub fn draw_instanced_indexed(
        &mut self,
        index_start: u32,
        index_count: u32,
        vertex_offset: i32,
        instance_start: u32,
        instance_count: u32,
    ) {
        self.record(EmberRenderCommand::DrawInstancedIndexed {
            index_start,
            index_count,
            vertex_offset,
            instance_start,
            instance_count,
        });
    }

    pub fn set_resource_set(
        &mut self,
        resource_set: &Arc<EmberResourceSet>,
    ) {
        self.record(EmberRenderCommand::SetResourceSet {
            resource_set: Arc::downgrade(resource_set),
        });
    }

    /// Clear a whole color attachment of the bound render target. Attachment indices the target
    /// does not have are skipped at replay.
    pub fn clear_color_target(
        &mut self,
        attachment_index: u32,
        value: EmberColorClearValue,
    ) {
        self.clear_color_target_rect(attachment_index, value, None);
    }

    /// Clear part of a color attachment. The rect uses a top-left origin.
    pub fn clear_color_target_rect(
        &mut self,
        attachment_index: u32,
        value: EmberColorClearValue,
        rect: Option<EmberClearRect>,
    ) {
        self.record(EmberRenderCommand::ClearColorTarget {
            attachment_index,
            value,
            rect,
        });
    }

    pub fn clear_depth_target(
        &mut self,
        value: EmberDepthStencilClearValue,
    ) {
        self.clear_depth_target_rect(value, None);
    }

    pub fn clear_depth_target_rect(
        &mut self,
        value: EmberDepthStencilClearValue,
        rect: Option<EmberClearRect>,
    ) {
        self.record(EmberRenderCommand::ClearDepthTarget { value, rect });
    }

    /// Bind a swapchain or framebuffer. Binding `EmberRenderTarget::None` is skipped at replay.
    pub fn set_render_target(
        &mut self,
        render_target: &EmberRenderTarget,
    ) {
        self.record(EmberRenderCommand::SetRenderTarget {
            render_target: render_target.downgrade(),
        });
    }

    /// Viewport in pixels, top-left origin with Y growing down
    pub fn set_viewport(
        &mut self,
        viewport: EmberViewport,
    ) {
        self.record(EmberRenderCommand::SetViewport { viewport });
    }

    /// Scissor in pixels, top-left origin with Y growing down
    pub fn set_scissor(
        &mut self,
        scissor: EmberScissor,
    ) {
        self.record(EmberRenderCommand::SetScissor { scissor });
    }

    pub fn resolve_framebuffer_to_swapchain(
        &mut self,
        framebuffer: &Arc<EmberFramebuffer>,
        color_attachment_index: u32,
        swapchain: &Arc<EmberSwapchain>,
    ) {
        self.record(EmberRenderCommand::ResolveFramebufferToSwapchain {
            framebuffer: Arc::downgrade(framebuffer),
            color_attachment_index,
            swapchain: Arc::downgrade(swapchain),
        });
    }

    pub fn start_timing_query(
        &mut self,
        query: &Arc<EmberTimingQuery>,
    ) {
        self.record(EmberRenderCommand::StartTimingQuery {
            query: Arc::downgrade(query),
        });
    }

    pub fn stop_timing_query(
        &mut self,
        query: &Arc<EmberTimingQuery>,
    ) {
        self.record(EmberRenderCommand::StopTimingQuery {
            query: Arc::downgrade(query),
        });
    }

    /// Constant color used by the `ConstantColor` blend factors
    pub fn set_blend_factor(
        &mut self,
        factor: [f32; 4],
    ) {
        self.record(EmberRenderCommand::SetBlendFactor { factor });
    }

    pub fn set_stencil_reference(
        &mut self,
        reference: u32,
    ) {
        self.record(EmberRenderCommand::SetStencilReference { reference });
    }

    pub fn push_debug_group(
        &mut self,
        name: &str,
    ) {
        self.record(EmberRenderCommand::PushDebugGroup {
            name: name.to_string(),
        });
    }

    pub fn pop_debug_group(&mut self) {
        self.record(EmberRenderCommand::PopDebugGroup);
    }

    pub fn insert_debug_marker(
        &mut self,
        name: &str,
    ) {
        self.record(EmberRenderCommand::InsertDebugMarker {
            name: name.to_string(),
        });
    }
}
