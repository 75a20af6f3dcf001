use crate::*;
use std::sync::Weak;

/// A single recorded operation. Each variant carries exactly the data needed to replay it.
///
/// Resources are referenced weakly. The application keeps resources alive, and a command whose
/// resource was dropped before replay is logged and skipped by the executor.
#[derive(Clone, Debug)]
pub enum EmberRenderCommand {
    SetVertexBuffer {
        buffer: Weak<EmberBuffer>,
        slot: u32,
        byte_offset: u64,
    },
    SetIndexBuffer {
        buffer: Weak<EmberBuffer>,
        index_type: EmberIndexType,
        byte_offset: u64,
    },
    SetPipeline {
        pipeline: Weak<EmberPipeline>,
    },
    Draw {
        vertex_start: u32,
        vertex_count: u32,
    },
    DrawIndexed {
        index_start: u32,
        index_count: u32,
        vertex_offset: i32,
    },
    DrawInstanced {
        vertex_start: u32,
        vertex_count: u32,
        instance_start: u32,
        instance_count: u32,
    },
    DrawInstancedIndexed {
        index_start: u32,
        index_count: u32,
        vertex_offset: i32,
        instance_start: u32,
        instance_count: u32,
    },
    SetResourceSet {
        resource_set: Weak<EmberResourceSet>,
    },
    ClearColorTarget {
        attachment_index: u32,
        value: EmberColorClearValue,
        rect: Option<EmberClearRect>,
    },
    ClearDepthTarget {
        value: EmberDepthStencilClearValue,
        rect: Option<EmberClearRect>,
    },
    SetRenderTarget {
        render_target: EmberRenderTargetRef,
    },
    SetViewport {
        viewport: EmberViewport,
    },
    SetScissor {
        scissor: EmberScissor,
    },
    ResolveFramebufferToSwapchain {
        framebuffer: Weak<EmberFramebuffer>,
        color_attachment_index: u32,
        swapchain: Weak<EmberSwapchain>,
    },
    StartTimingQuery {
        query: Weak<EmberTimingQuery>,
    },
    StopTimingQuery {
        query: Weak<EmberTimingQuery>,
    },
    SetBlendFactor {
        factor: [f32; 4],
    },
    SetStencilReference {
        reference: u32,
    },
    PushDebugGroup {
        name: String,
    },
    PopDebugGroup,
    InsertDebugMarker {
        name: String,
    },
}

impl EmberRenderCommand {
    /// Short name of the command kind, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            EmberRenderCommand::SetVertexBuffer { .. } => "SetVertexBuffer",
            EmberRenderCommand::SetIndexBuffer { .. } => "SetIndexBuffer",
            EmberRenderCommand::SetPipeline { .. } => "SetPipeline",
            EmberRenderCommand::Draw { .. } => "Draw",
            EmberRenderCommand::DrawIndexed { .. } => "DrawIndexed",
            EmberRenderCommand::DrawInstanced { .. } => "DrawInstanced",
            EmberRenderCommand::DrawInstancedIndexed { .. } => "DrawInstancedIndexed",
            EmberRenderCommand::SetResourceSet { .. } => "SetResourceSet",
            EmberRenderCommand::ClearColorTarget { .. } => "ClearColorTarget",
            EmberRenderCommand::ClearDepthTarget { .. } => "ClearDepthTarget",
            EmberRenderCommand::SetRenderTarget { .. } => "SetRenderTarget",
            EmberRenderCommand::SetViewport { .. } => "SetViewport",
            EmberRenderCommand::SetScissor { .. } => "SetScissor",
            EmberRenderCommand::ResolveFramebufferToSwapchain { .. } => {
                "ResolveFramebufferToSwapchain"
            }
            EmberRenderCommand::StartTimingQuery { .. } => "StartTimingQuery",
            EmberRenderCommand::StopTimingQuery { .. } => "StopTimingQuery",
            EmberRenderCommand::SetBlendFactor { .. } => "SetBlendFactor",
            EmberRenderCommand::SetStencilReference { .. } => "SetStencilReference",
            EmberRenderCommand::PushDebugGroup { .. } => "PushDebugGroup",
            EmberRenderCommand::PopDebugGroup => "PopDebugGroup",
            EmberRenderCommand::InsertDebugMarker { .. } => "InsertDebugMarker",
        }
    }
}
