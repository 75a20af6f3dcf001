use crate::gl::gl43::{self, GLenum};
use crate::{
    EmberAddressMode, EmberBlendFactor, EmberBlendOp, EmberBlendState, EmberColorFlags,
    EmberCompareOp, EmberCullMode, EmberDepthState, EmberFillMode, EmberFilterType, EmberFormat,
    EmberFrontFace, EmberIndexType, EmberMipMapMode, EmberPrimitiveTopology,
    EmberRasterizerState, EmberResourceType, EmberStencilOp,
};

impl EmberCompareOp {
    pub fn gl_compare_op(self) -> GLenum {
        match self {
            EmberCompareOp::Never => gl43::NEVER,
            EmberCompareOp::Less => gl43::LESS,
            EmberCompareOp::Equal => gl43::EQUAL,
            EmberCompareOp::LessOrEqual => gl43::LEQUAL,
            EmberCompareOp::Greater => gl43::GREATER,
            EmberCompareOp::NotEqual => gl43::NOTEQUAL,
            EmberCompareOp::GreaterOrEqual => gl43::GEQUAL,
            EmberCompareOp::Always => gl43::ALWAYS,
        }
    }
}

impl EmberStencilOp {
    pub fn gl_stencil_op(self) -> GLenum {
        match self {
            EmberStencilOp::Keep => gl43::KEEP,
            EmberStencilOp::Zero => gl43::ZERO,
            EmberStencilOp::Replace => gl43::REPLACE,
            EmberStencilOp::IncrementAndClamp => gl43::INCR,
            EmberStencilOp::DecrementAndClamp => gl43::DECR,
            EmberStencilOp::Invert => gl43::INVERT,
            EmberStencilOp::IncrementAndWrap => gl43::INCR_WRAP,
            EmberStencilOp::DecrementAndWrap => gl43::DECR_WRAP,
        }
    }
}

impl EmberBlendFactor {
    pub fn gl_blend_factor(self) -> GLenum {
        match self {
            EmberBlendFactor::Zero => gl43::ZERO,
            EmberBlendFactor::One => gl43::ONE,
            EmberBlendFactor::SrcColor => gl43::SRC_COLOR,
            EmberBlendFactor::OneMinusSrcColor => gl43::ONE_MINUS_SRC_COLOR,
            EmberBlendFactor::DstColor => gl43::DST_COLOR,
            EmberBlendFactor::OneMinusDstColor => gl43::ONE_MINUS_DST_COLOR,
            EmberBlendFactor::SrcAlpha => gl43::SRC_ALPHA,
            EmberBlendFactor::OneMinusSrcAlpha => gl43::ONE_MINUS_SRC_ALPHA,
            EmberBlendFactor::DstAlpha => gl43::DST_ALPHA,
            EmberBlendFactor::OneMinusDstAlpha => gl43::ONE_MINUS_DST_ALPHA,
            EmberBlendFactor::SrcAlphaSaturate => gl43::SRC_ALPHA_SATURATE,
            EmberBlendFactor::ConstantColor => gl43::CONSTANT_COLOR,
            EmberBlendFactor::OneMinusConstantColor => gl43::ONE_MINUS_CONSTANT_COLOR,
        }
    }
}

impl EmberBlendOp {
    pub fn gl_blend_op(self) -> GLenum {
        match self {
            EmberBlendOp::Add => gl43::FUNC_ADD,
            EmberBlendOp::Subtract => gl43::FUNC_SUBTRACT,
            EmberBlendOp::ReverseSubtract => gl43::FUNC_REVERSE_SUBTRACT,
            EmberBlendOp::Min => gl43::MIN,
            EmberBlendOp::Max => gl43::MAX,
        }
    }
}

impl EmberPrimitiveTopology {
    pub fn gl_topology(self) -> GLenum {
        match self {
            EmberPrimitiveTopology::PointList => gl43::POINTS,
            EmberPrimitiveTopology::LineList => gl43::LINES,
            EmberPrimitiveTopology::LineStrip => gl43::LINE_STRIP,
            EmberPrimitiveTopology::TriangleList => gl43::TRIANGLES,
            EmberPrimitiveTopology::TriangleStrip => gl43::TRIANGLE_STRIP,
        }
    }
}

impl EmberCullMode {
    pub fn gl_cull_mode(self) -> GLenum {
        match self {
            EmberCullMode::None => gl43::NONE,
            EmberCullMode::Back => gl43::BACK,
            EmberCullMode::Front => gl43::FRONT,
        }
    }
}

impl EmberFrontFace {
    pub fn gl_front_face(self) -> GLenum {
        match self {
            EmberFrontFace::CounterClockwise => gl43::CCW,
            EmberFrontFace::Clockwise => gl43::CW,
        }
    }
}

impl EmberFillMode {
    pub fn gl_fill_mode(self) -> GLenum {
        match self {
            EmberFillMode::Solid => gl43::FILL,
            EmberFillMode::Wireframe => gl43::LINE,
        }
    }
}

impl EmberFilterType {
    pub fn gl_mag_filter(self) -> GLenum {
        match self {
            EmberFilterType::Nearest => gl43::NEAREST,
            EmberFilterType::Linear => gl43::LINEAR,
        }
    }

    pub fn gl_min_filter(
        self,
        mip_map_mode: EmberMipMapMode,
    ) -> GLenum {
        match (self, mip_map_mode) {
            (EmberFilterType::Nearest, EmberMipMapMode::Nearest) => gl43::NEAREST_MIPMAP_NEAREST,
            (EmberFilterType::Nearest, EmberMipMapMode::Linear) => gl43::NEAREST_MIPMAP_LINEAR,
            (EmberFilterType::Linear, EmberMipMapMode::Nearest) => gl43::LINEAR_MIPMAP_NEAREST,
            (EmberFilterType::Linear, EmberMipMapMode::Linear) => gl43::LINEAR_MIPMAP_LINEAR,
        }
    }
}

impl EmberAddressMode {
    pub fn gl_wrap_mode(self) -> GLenum {
        match self {
            EmberAddressMode::Mirror => gl43::MIRRORED_REPEAT,
            EmberAddressMode::Repeat => gl43::REPEAT,
            EmberAddressMode::ClampToEdge => gl43::CLAMP_TO_EDGE,
            EmberAddressMode::ClampToBorder => gl43::CLAMP_TO_BORDER,
        }
    }
}

impl EmberIndexType {
    pub fn gl_index_type(self) -> GLenum {
        match self {
            EmberIndexType::Uint32 => gl43::UNSIGNED_INT,
            EmberIndexType::Uint16 => gl43::UNSIGNED_SHORT,
        }
    }
}

impl EmberResourceType {
    /// The bind target used when uploading to a buffer of this type
    pub fn gl_buffer_target(self) -> Option<GLenum> {
        if self.contains(EmberResourceType::VERTEX_BUFFER) {
            Some(gl43::ARRAY_BUFFER)
        } else if self.contains(EmberResourceType::INDEX_BUFFER) {
            Some(gl43::ELEMENT_ARRAY_BUFFER)
        } else if self.contains(EmberResourceType::UNIFORM_BUFFER) {
            Some(gl43::UNIFORM_BUFFER)
        } else {
            None
        }
    }
}

/// Arguments of glVertexAttribPointer for a vertex format
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GlAttributeFormat {
    pub size: i32,
    pub gl_type: GLenum,
    pub is_normalized: bool,
}

impl EmberFormat {
    pub fn gl_attribute_format(self) -> Option<GlAttributeFormat> {
        let (size, gl_type, is_normalized) = match self {
            EmberFormat::R32_SFLOAT => (1, gl43::FLOAT, false),
            EmberFormat::R32G32_SFLOAT => (2, gl43::FLOAT, false),
            EmberFormat::R32G32B32_SFLOAT => (3, gl43::FLOAT, false),
            EmberFormat::R32G32B32A32_SFLOAT => (4, gl43::FLOAT, false),
            EmberFormat::R8G8B8A8_UNORM => (4, gl43::UNSIGNED_BYTE, true),
            // GL_BGRA is accepted as the size of normalized unsigned byte attributes
            EmberFormat::B8G8R8A8_UNORM => (gl43::BGRA as i32, gl43::UNSIGNED_BYTE, true),
            _ => return None,
        };

        Some(GlAttributeFormat {
            size,
            gl_type,
            is_normalized,
        })
    }
}

#[derive(Copy, Clone, Debug)]
pub struct GlRasterizerState {
    pub cull_enabled: bool,
    pub cull_mode: GLenum,
    pub front_face: GLenum,
    pub fill_mode: GLenum,
    pub offset_enabled: bool,
    pub offset_factor: f32,
    pub offset_units: f32,
    pub depth_clamp_enabled: bool,
}

impl From<&EmberRasterizerState> for GlRasterizerState {
    fn from(rasterizer_state: &EmberRasterizerState) -> Self {
        GlRasterizerState {
            cull_enabled: rasterizer_state.cull_mode != EmberCullMode::None,
            cull_mode: rasterizer_state.cull_mode.gl_cull_mode(),
            front_face: rasterizer_state.front_face.gl_front_face(),
            fill_mode: rasterizer_state.fill_mode.gl_fill_mode(),
            offset_enabled: rasterizer_state.depth_bias != 0
                || rasterizer_state.depth_bias_slope_scaled != 0.0,
            offset_factor: rasterizer_state.depth_bias_slope_scaled,
            offset_units: rasterizer_state.depth_bias as f32,
            depth_clamp_enabled: !rasterizer_state.depth_clip_enable,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct GlStencilFaceState {
    pub compare_op: GLenum,
    pub fail_op: GLenum,
    pub depth_fail_op: GLenum,
    pub pass_op: GLenum,
}

#[derive(Copy, Clone, Debug)]
pub struct GlDepthStencilState {
    pub depth_test_enabled: bool,
    pub depth_write_enabled: bool,
    pub depth_compare_op: GLenum,
    pub stencil_test_enabled: bool,
    pub stencil_read_mask: u32,
    pub stencil_write_mask: u32,
    pub front: GlStencilFaceState,
    pub back: GlStencilFaceState,
}

impl From<&EmberDepthState> for GlDepthStencilState {
    fn from(depth_state: &EmberDepthState) -> Self {
        GlDepthStencilState {
            depth_test_enabled: depth_state.depth_test_enable,
            depth_write_enabled: depth_state.depth_write_enable,
            depth_compare_op: depth_state.depth_compare_op.gl_compare_op(),
            stencil_test_enabled: depth_state.stencil_test_enable,
            stencil_read_mask: depth_state.stencil_read_mask as u32,
            stencil_write_mask: depth_state.stencil_write_mask as u32,
            front: GlStencilFaceState {
                compare_op: depth_state.front_stencil_compare_op.gl_compare_op(),
                fail_op: depth_state.front_stencil_fail_op.gl_stencil_op(),
                depth_fail_op: depth_state.front_depth_fail_op.gl_stencil_op(),
                pass_op: depth_state.front_stencil_pass_op.gl_stencil_op(),
            },
            back: GlStencilFaceState {
                compare_op: depth_state.back_stencil_compare_op.gl_compare_op(),
                fail_op: depth_state.back_stencil_fail_op.gl_stencil_op(),
                depth_fail_op: depth_state.back_depth_fail_op.gl_stencil_op(),
                pass_op: depth_state.back_stencil_pass_op.gl_stencil_op(),
            },
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct GlBlendTargetState {
    pub enabled: bool,
    pub src_factor: GLenum,
    pub dst_factor: GLenum,
    pub src_factor_alpha: GLenum,
    pub dst_factor_alpha: GLenum,
    pub blend_op: GLenum,
    pub blend_op_alpha: GLenum,
    pub color_mask: [bool; 4],
}

/// One entry per color attachment of the pipeline
#[derive(Clone, Debug)]
pub struct GlBlendState {
    pub targets: Vec<GlBlendTargetState>,
}

impl GlBlendState {
    pub fn new(
        blend_state: &EmberBlendState,
        color_attachment_count: usize,
    ) -> Self {
        let targets = (0..color_attachment_count)
            .map(|attachment_index| {
                let target = blend_state.blend_state_for_attachment(attachment_index);
                GlBlendTargetState {
                    enabled: target.blend_enabled(),
                    src_factor: target.src_factor.gl_blend_factor(),
                    dst_factor: target.dst_factor.gl_blend_factor(),
                    src_factor_alpha: target.src_factor_alpha.gl_blend_factor(),
                    dst_factor_alpha: target.dst_factor_alpha.gl_blend_factor(),
                    blend_op: target.blend_op.gl_blend_op(),
                    blend_op_alpha: target.blend_op_alpha.gl_blend_op(),
                    color_mask: [
                        target.masks.contains(EmberColorFlags::RED),
                        target.masks.contains(EmberColorFlags::GREEN),
                        target.masks.contains(EmberColorFlags::BLUE),
                        target.masks.contains(EmberColorFlags::ALPHA),
                    ],
                }
            })
            .collect();

        GlBlendState { targets }
    }
}
