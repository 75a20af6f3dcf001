use crate::dx12::d3d12::*;
use crate::{
    EmberAddressMode, EmberBlendFactor, EmberBlendOp, EmberBlendState, EmberColorFlags,
    EmberCompareOp, EmberCullMode, EmberDepthState, EmberFillMode, EmberFilterType,
    EmberFrontFace, EmberIndexType, EmberMipMapMode, EmberPrimitiveTopology,
    EmberRasterizerState, EmberResourceState, EmberSamplerDef, EmberScissor, EmberStencilOp,
    EmberVertexAttributeRate, EmberViewport,
};

impl EmberCompareOp {
    pub fn dx12_comparison_func(self) -> D3D12_COMPARISON_FUNC {
        match self {
            EmberCompareOp::Never => D3D12_COMPARISON_FUNC_NEVER,
            EmberCompareOp::Less => D3D12_COMPARISON_FUNC_LESS,
            EmberCompareOp::Equal => D3D12_COMPARISON_FUNC_EQUAL,
            EmberCompareOp::LessOrEqual => D3D12_COMPARISON_FUNC_LESS_EQUAL,
            EmberCompareOp::Greater => D3D12_COMPARISON_FUNC_GREATER,
            EmberCompareOp::NotEqual => D3D12_COMPARISON_FUNC_NOT_EQUAL,
            EmberCompareOp::GreaterOrEqual => D3D12_COMPARISON_FUNC_GREATER_EQUAL,
            EmberCompareOp::Always => D3D12_COMPARISON_FUNC_ALWAYS,
        }
    }
}

impl EmberStencilOp {
    pub fn dx12_stencil_op(self) -> D3D12_STENCIL_OP {
        match self {
            EmberStencilOp::Keep => D3D12_STENCIL_OP_KEEP,
            EmberStencilOp::Zero => D3D12_STENCIL_OP_ZERO,
            EmberStencilOp::Replace => D3D12_STENCIL_OP_REPLACE,
            EmberStencilOp::IncrementAndClamp => D3D12_STENCIL_OP_INCR_SAT,
            EmberStencilOp::DecrementAndClamp => D3D12_STENCIL_OP_DECR_SAT,
            EmberStencilOp::Invert => D3D12_STENCIL_OP_INVERT,
            EmberStencilOp::IncrementAndWrap => D3D12_STENCIL_OP_INCR,
            EmberStencilOp::DecrementAndWrap => D3D12_STENCIL_OP_DECR,
        }
    }
}

impl EmberBlendFactor {
    pub fn dx12_blend(self) -> D3D12_BLEND {
        match self {
            EmberBlendFactor::Zero => D3D12_BLEND_ZERO,
            EmberBlendFactor::One => D3D12_BLEND_ONE,
            EmberBlendFactor::SrcColor => D3D12_BLEND_SRC_COLOR,
            EmberBlendFactor::OneMinusSrcColor => D3D12_BLEND_INV_SRC_COLOR,
            EmberBlendFactor::DstColor => D3D12_BLEND_DEST_COLOR,
            EmberBlendFactor::OneMinusDstColor => D3D12_BLEND_INV_DEST_COLOR,
            EmberBlendFactor::SrcAlpha => D3D12_BLEND_SRC_ALPHA,
            EmberBlendFactor::OneMinusSrcAlpha => D3D12_BLEND_INV_SRC_ALPHA,
            EmberBlendFactor::DstAlpha => D3D12_BLEND_DEST_ALPHA,
            EmberBlendFactor::OneMinusDstAlpha => D3D12_BLEND_INV_DEST_ALPHA,
            EmberBlendFactor::SrcAlphaSaturate => D3D12_BLEND_SRC_ALPHA_SAT,
            EmberBlendFactor::ConstantColor => D3D12_BLEND_BLEND_FACTOR,
            EmberBlendFactor::OneMinusConstantColor => D3D12_BLEND_INV_BLEND_FACTOR,
        }
    }
}

impl EmberBlendOp {
    pub fn dx12_blend_op(self) -> D3D12_BLEND_OP {
        match self {
            EmberBlendOp::Add => D3D12_BLEND_OP_ADD,
            EmberBlendOp::Subtract => D3D12_BLEND_OP_SUBTRACT,
            EmberBlendOp::ReverseSubtract => D3D12_BLEND_OP_REV_SUBTRACT,
            EmberBlendOp::Min => D3D12_BLEND_OP_MIN,
            EmberBlendOp::Max => D3D12_BLEND_OP_MAX,
        }
    }
}

impl EmberPrimitiveTopology {
    pub fn dx12_topology(self) -> D3D_PRIMITIVE_TOPOLOGY {
        match self {
            EmberPrimitiveTopology::PointList => D3D_PRIMITIVE_TOPOLOGY_POINTLIST,
            EmberPrimitiveTopology::LineList => D3D_PRIMITIVE_TOPOLOGY_LINELIST,
            EmberPrimitiveTopology::LineStrip => D3D_PRIMITIVE_TOPOLOGY_LINESTRIP,
            EmberPrimitiveTopology::TriangleList => D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST,
            EmberPrimitiveTopology::TriangleStrip => D3D_PRIMITIVE_TOPOLOGY_TRIANGLESTRIP,
        }
    }

    /// The topology class a pipeline state is compiled for
    pub fn dx12_topology_type(self) -> D3D12_PRIMITIVE_TOPOLOGY_TYPE {
        match self {
            EmberPrimitiveTopology::PointList => D3D12_PRIMITIVE_TOPOLOGY_TYPE_POINT,
            EmberPrimitiveTopology::LineList | EmberPrimitiveTopology::LineStrip => {
                D3D12_PRIMITIVE_TOPOLOGY_TYPE_LINE
            }
            EmberPrimitiveTopology::TriangleList | EmberPrimitiveTopology::TriangleStrip => {
                D3D12_PRIMITIVE_TOPOLOGY_TYPE_TRIANGLE
            }
        }
    }
}

impl EmberCullMode {
    pub fn dx12_cull_mode(self) -> D3D12_CULL_MODE {
        match self {
            EmberCullMode::None => D3D12_CULL_MODE_NONE,
            EmberCullMode::Back => D3D12_CULL_MODE_BACK,
            EmberCullMode::Front => D3D12_CULL_MODE_FRONT,
        }
    }
}

impl EmberFillMode {
    pub fn dx12_fill_mode(self) -> D3D12_FILL_MODE {
        match self {
            EmberFillMode::Solid => D3D12_FILL_MODE_SOLID,
            EmberFillMode::Wireframe => D3D12_FILL_MODE_WIREFRAME,
        }
    }
}

impl EmberAddressMode {
    pub fn dx12_address_mode(self) -> D3D12_TEXTURE_ADDRESS_MODE {
        match self {
            EmberAddressMode::Mirror => D3D12_TEXTURE_ADDRESS_MODE_MIRROR,
            EmberAddressMode::Repeat => D3D12_TEXTURE_ADDRESS_MODE_WRAP,
            EmberAddressMode::ClampToEdge => D3D12_TEXTURE_ADDRESS_MODE_CLAMP,
            EmberAddressMode::ClampToBorder => D3D12_TEXTURE_ADDRESS_MODE_BORDER,
        }
    }
}

/// D3D12 packs min, mag and mip filtering into one enum
pub(crate) fn dx12_filter(
    min_filter: EmberFilterType,
    mag_filter: EmberFilterType,
    mip_map_mode: EmberMipMapMode,
) -> D3D12_FILTER {
    let mut filter = D3D12_FILTER_MIN_MAG_MIP_POINT;
    if min_filter == EmberFilterType::Linear {
        filter |= D3D12_FILTER_MIN_LINEAR;
    }
    if mag_filter == EmberFilterType::Linear {
        filter |= D3D12_FILTER_MAG_LINEAR;
    }
    if mip_map_mode == EmberMipMapMode::Linear {
        filter |= D3D12_FILTER_MIP_LINEAR;
    }
    filter
}

impl EmberIndexType {
    pub fn dx12_index_format(self) -> DXGI_FORMAT {
        match self {
            EmberIndexType::Uint32 => DXGI_FORMAT_R32_UINT,
            EmberIndexType::Uint16 => DXGI_FORMAT_R16_UINT,
        }
    }
}

impl EmberVertexAttributeRate {
    pub fn dx12_input_classification(self) -> D3D12_INPUT_CLASSIFICATION {
        match self {
            EmberVertexAttributeRate::Vertex => D3D12_INPUT_CLASSIFICATION_PER_VERTEX_DATA,
            EmberVertexAttributeRate::Instance => D3D12_INPUT_CLASSIFICATION_PER_INSTANCE_DATA,
        }
    }
}

impl EmberResourceState {
    /// PRESENT and COMMON are both zero in D3D12. The resolve states sit in different bits.
    pub fn dx12_resource_states(self) -> D3D12_RESOURCE_STATES {
        let shared_bits = EmberResourceState::VERTEX_AND_CONSTANT_BUFFER
            | EmberResourceState::INDEX_BUFFER
            | EmberResourceState::RENDER_TARGET
            | EmberResourceState::UNORDERED_ACCESS
            | EmberResourceState::DEPTH_WRITE
            | EmberResourceState::DEPTH_READ
            | EmberResourceState::SHADER_RESOURCE
            | EmberResourceState::STREAM_OUT
            | EmberResourceState::INDIRECT_ARGUMENT
            | EmberResourceState::COPY_DST
            | EmberResourceState::COPY_SRC;

        let mut states = (self & shared_bits).bits();
        if self.contains(EmberResourceState::RESOLVE_DST) {
            states |= D3D12_RESOURCE_STATE_RESOLVE_DEST;
        }
        if self.contains(EmberResourceState::RESOLVE_SRC) {
            states |= D3D12_RESOURCE_STATE_RESOLVE_SOURCE;
        }
        states
    }
}

impl From<&EmberRasterizerState> for D3D12_RASTERIZER_DESC {
    fn from(rasterizer_state: &EmberRasterizerState) -> Self {
        D3D12_RASTERIZER_DESC {
            FillMode: rasterizer_state.fill_mode.dx12_fill_mode(),
            CullMode: rasterizer_state.cull_mode.dx12_cull_mode(),
            FrontCounterClockwise: rasterizer_state.front_face
                == EmberFrontFace::CounterClockwise,
            DepthBias: rasterizer_state.depth_bias,
            DepthBiasClamp: 0.0,
            SlopeScaledDepthBias: rasterizer_state.depth_bias_slope_scaled,
            DepthClipEnable: rasterizer_state.depth_clip_enable,
        }
    }
}

impl From<&EmberDepthState> for D3D12_DEPTH_STENCIL_DESC {
    fn from(depth_state: &EmberDepthState) -> Self {
        D3D12_DEPTH_STENCIL_DESC {
            DepthEnable: depth_state.depth_test_enable,
            DepthWriteMask: if depth_state.depth_write_enable {
                D3D12_DEPTH_WRITE_MASK_ALL
            } else {
                D3D12_DEPTH_WRITE_MASK_ZERO
            },
            DepthFunc: depth_state.depth_compare_op.dx12_comparison_func(),
            StencilEnable: depth_state.stencil_test_enable,
            StencilReadMask: depth_state.stencil_read_mask,
            StencilWriteMask: depth_state.stencil_write_mask,
            FrontFace: D3D12_DEPTH_STENCILOP_DESC {
                StencilFailOp: depth_state.front_stencil_fail_op.dx12_stencil_op(),
                StencilDepthFailOp: depth_state.front_depth_fail_op.dx12_stencil_op(),
                StencilPassOp: depth_state.front_stencil_pass_op.dx12_stencil_op(),
                StencilFunc: depth_state.front_stencil_compare_op.dx12_comparison_func(),
            },
            BackFace: D3D12_DEPTH_STENCILOP_DESC {
                StencilFailOp: depth_state.back_stencil_fail_op.dx12_stencil_op(),
                StencilDepthFailOp: depth_state.back_depth_fail_op.dx12_stencil_op(),
                StencilPassOp: depth_state.back_stencil_pass_op.dx12_stencil_op(),
                StencilFunc: depth_state.back_stencil_compare_op.dx12_comparison_func(),
            },
        }
    }
}

pub(crate) fn dx12_blend_desc(
    blend_state: &EmberBlendState,
    color_attachment_count: usize,
) -> D3D12_BLEND_DESC {
    let mut blend_desc = D3D12_BLEND_DESC {
        AlphaToCoverageEnable: false,
        IndependentBlendEnable: blend_state.independent_blend,
        ..Default::default()
    };

    for (attachment_index, render_target) in blend_desc
        .RenderTarget
        .iter_mut()
        .enumerate()
        .take(color_attachment_count)
    {
        let target = blend_state.blend_state_for_attachment(attachment_index);
        *render_target = D3D12_RENDER_TARGET_BLEND_DESC {
            BlendEnable: target.blend_enabled(),
            SrcBlend: target.src_factor.dx12_blend(),
            DestBlend: target.dst_factor.dx12_blend(),
            BlendOp: target.blend_op.dx12_blend_op(),
            SrcBlendAlpha: target.src_factor_alpha.dx12_blend(),
            DestBlendAlpha: target.dst_factor_alpha.dx12_blend(),
            BlendOpAlpha: target.blend_op_alpha.dx12_blend_op(),
            RenderTargetWriteMask: (target.masks & EmberColorFlags::ALL).bits(),
        };
    }

    blend_desc
}

impl From<&EmberSamplerDef> for D3D12_SAMPLER_DESC {
    fn from(sampler_def: &EmberSamplerDef) -> Self {
        D3D12_SAMPLER_DESC {
            Filter: dx12_filter(
                sampler_def.min_filter,
                sampler_def.mag_filter,
                sampler_def.mip_map_mode,
            ),
            AddressU: sampler_def.address_mode_u.dx12_address_mode(),
            AddressV: sampler_def.address_mode_v.dx12_address_mode(),
            AddressW: D3D12_TEXTURE_ADDRESS_MODE_CLAMP,
            MipLODBias: sampler_def.mip_lod_bias,
            MaxAnisotropy: 1,
            ComparisonFunc: D3D12_COMPARISON_FUNC_NEVER,
            BorderColor: sampler_def.border_color,
            MinLOD: 0.0,
            MaxLOD: f32::MAX,
        }
    }
}

impl From<&EmberViewport> for D3D12_VIEWPORT {
    fn from(viewport: &EmberViewport) -> Self {
        D3D12_VIEWPORT {
            TopLeftX: viewport.x,
            TopLeftY: viewport.y,
            Width: viewport.width,
            Height: viewport.height,
            MinDepth: viewport.min_depth,
            MaxDepth: viewport.max_depth,
        }
    }
}

impl From<&EmberScissor> for D3D12_RECT {
    fn from(scissor: &EmberScissor) -> Self {
        D3D12_RECT {
            left: scissor.x,
            top: scissor.y,
            right: scissor.x + scissor.width as i32,
            bottom: scissor.y + scissor.height as i32,
        }
    }
}
