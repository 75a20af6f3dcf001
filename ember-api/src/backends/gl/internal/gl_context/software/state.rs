use super::gl43::{self, GLenum};
use super::glsl::GlslUniformKind;
use super::*;
use crate::internal_shared::SoftwareImage;
use fnv::{FnvHashMap, FnvHashSet};

pub(super) const MAX_VERTEX_ATTRIBS: usize = 16;
pub(super) const MAX_DRAW_BUFFERS: usize = 8;
pub(super) const MAX_TEXTURE_UNITS: usize = 16;
pub(super) const MAX_UNIFORM_BUFFER_BINDINGS: usize = 16;
pub(super) const MAX_COLOR_TEXTURE_SAMPLES: u32 = 8;
pub(super) const MAX_DEBUG_GROUP_STACK_DEPTH: usize = 64;
pub(super) const MAX_TEXTURE_SIZE: u32 = 16384;
pub(super) const UNIFORM_BUFFER_OFFSET_ALIGNMENT: u32 = 256;

#[derive(Debug, Default)]
pub(super) struct GlBufferObject {
    pub data: Vec<u8>,
}

#[derive(Debug)]
pub(super) struct GlTextureObject {
    /// Set by the first bind
    pub target: GLenum,
    pub internal_format: GLenum,
    /// Empty until storage is allocated. Row 0 of every level is the bottom row.
    pub levels: Vec<SoftwareImage>,
}

#[derive(Debug, Clone)]
pub(super) struct GlSamplerObject {
    pub min_filter: GLenum,
    pub mag_filter: GLenum,
    pub wrap_s: GLenum,
    pub wrap_t: GLenum,
    pub lod_bias: f32,
    pub border_color: [f32; 4],
}

impl Default for GlSamplerObject {
    fn default() -> Self {
        GlSamplerObject {
            min_filter: gl43::NEAREST_MIPMAP_LINEAR,
            mag_filter: gl43::LINEAR,
            wrap_s: gl43::REPEAT,
            wrap_t: gl43::REPEAT,
            lod_bias: 0.0,
            border_color: [0.0; 4],
        }
    }
}

#[derive(Debug)]
pub(super) struct GlShaderObject {
    pub shader_type: GLenum,
    pub source: String,
    pub compiled: bool,
    pub info_log: String,
}

#[derive(Debug)]
pub(super) struct GlLinkedUniform {
    pub name: String,
    pub kind: GlslUniformKind,
    pub value: i32,
}

#[derive(Debug)]
pub(super) struct GlLinkedBlock {
    pub name: String,
    pub binding: u32,
}

#[derive(Debug, Default)]
pub(super) struct GlLinkedProgram {
    /// Attribute location to attribute name
    pub attributes: FnvHashMap<u32, String>,
    pub uniforms: Vec<GlLinkedUniform>,
    pub blocks: Vec<GlLinkedBlock>,
}

#[derive(Debug, Default)]
pub(super) struct GlProgramObject {
    pub attached_shaders: Vec<ShaderId>,
    pub attrib_bindings: FnvHashMap<String, u32>,
    pub linked: Option<GlLinkedProgram>,
    pub info_log: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) struct GlAttachment {
    pub texture: TextureId,
    pub level: u32,
}

#[derive(Debug)]
pub(super) struct GlFramebufferObject {
    pub color_attachments: FnvHashMap<u32, GlAttachment>,
    pub depth_stencil_attachment: Option<GlAttachment>,
    pub draw_buffers: Vec<GLenum>,
    pub read_buffer: GLenum,
}

impl Default for GlFramebufferObject {
    fn default() -> Self {
        GlFramebufferObject {
            color_attachments: Default::default(),
            depth_stencil_attachment: None,
            draw_buffers: vec![gl43::COLOR_ATTACHMENT0],
            read_buffer: gl43::COLOR_ATTACHMENT0,
        }
    }
}

#[derive(Debug, Default)]
pub(super) struct GlQueryObject {
    pub timestamp_ns: Option<u64>,
}

/// The default framebuffer of one window
#[derive(Debug)]
pub(super) struct GlSurface {
    pub color: SoftwareImage,
    pub depth_stencil: Option<SoftwareImage>,
    pub presented_frames: u64,
}

#[derive(Copy, Clone, Debug)]
pub(super) struct GlVertexAttrib {
    pub enabled: bool,
    pub buffer: BufferId,
    pub size: i32,
    pub attrib_type: GLenum,
    pub normalized: bool,
    pub stride: i32,
    pub offset: u64,
    pub divisor: u32,
}

impl Default for GlVertexAttrib {
    fn default() -> Self {
        GlVertexAttrib {
            enabled: false,
            buffer: NONE_BUFFER,
            size: 4,
            attrib_type: gl43::FLOAT,
            normalized: false,
            stride: 0,
            offset: 0,
            divisor: 0,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub(super) struct GlTextureUnit {
    pub texture_2d: TextureId,
    pub texture_2d_multisample: TextureId,
    pub sampler: SamplerId,
}

impl Default for GlTextureUnit {
    fn default() -> Self {
        GlTextureUnit {
            texture_2d: NONE_TEXTURE,
            texture_2d_multisample: NONE_TEXTURE,
            sampler: NONE_SAMPLER,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub(super) struct GlBufferRange {
    pub buffer: BufferId,
    pub offset: u64,
    pub size: u64,
}

#[derive(Copy, Clone, Debug)]
pub(super) struct GlBlendTarget {
    pub enabled: bool,
    pub src_rgb: GLenum,
    pub dst_rgb: GLenum,
    pub src_alpha: GLenum,
    pub dst_alpha: GLenum,
    pub equation_rgb: GLenum,
    pub equation_alpha: GLenum,
    pub color_mask: [bool; 4],
}

impl Default for GlBlendTarget {
    fn default() -> Self {
        GlBlendTarget {
            enabled: false,
            src_rgb: gl43::ONE,
            dst_rgb: gl43::ZERO,
            src_alpha: gl43::ONE,
            dst_alpha: gl43::ZERO,
            equation_rgb: gl43::FUNC_ADD,
            equation_alpha: gl43::FUNC_ADD,
            color_mask: [true; 4],
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub(super) struct GlStencilFace {
    pub func: GLenum,
    pub reference: i32,
    pub value_mask: u32,
    pub write_mask: u32,
    pub stencil_fail: GLenum,
    pub depth_fail: GLenum,
    pub depth_pass: GLenum,
}

impl Default for GlStencilFace {
    fn default() -> Self {
        GlStencilFace {
            func: gl43::ALWAYS,
            reference: 0,
            value_mask: !0,
            write_mask: !0,
            stencil_fail: gl43::KEEP,
            depth_fail: gl43::KEEP,
            depth_pass: gl43::KEEP,
        }
    }
}

/// Every object and every piece of ambient state of one context
#[derive(Debug)]
pub(super) struct GlState {
    pub error: GLenum,
    pub next_name: u32,

    pub buffers: FnvHashMap<u32, GlBufferObject>,
    pub textures: FnvHashMap<u32, GlTextureObject>,
    pub samplers: FnvHashMap<u32, GlSamplerObject>,
    pub shaders: FnvHashMap<u32, GlShaderObject>,
    pub programs: FnvHashMap<u32, GlProgramObject>,
    pub framebuffers: FnvHashMap<u32, GlFramebufferObject>,
    pub queries: FnvHashMap<u32, GlQueryObject>,
    pub surfaces: FnvHashMap<WindowHash, GlSurface>,
    pub current_surface: Option<WindowHash>,

    pub array_buffer: BufferId,
    pub element_array_buffer: BufferId,
    pub uniform_buffer: BufferId,
    pub uniform_buffer_ranges: Vec<Option<GlBufferRange>>,

    pub active_texture_unit: usize,
    pub texture_units: Vec<GlTextureUnit>,

    pub current_program: ProgramId,
    pub draw_framebuffer: FramebufferId,
    pub read_framebuffer: FramebufferId,
    pub default_draw_buffer: GLenum,
    pub default_read_buffer: GLenum,

    pub viewport: [i32; 4],
    pub viewport_initialized: bool,
    pub depth_range: [f32; 2],
    pub scissor_box: [i32; 4],

    pub enabled_caps: FnvHashSet<GLenum>,
    pub cull_face: GLenum,
    pub front_face: GLenum,
    pub polygon_mode: GLenum,
    pub polygon_offset_factor: f32,
    pub polygon_offset_units: f32,
    pub depth_func: GLenum,
    pub depth_mask: bool,
    pub stencil_front: GlStencilFace,
    pub stencil_back: GlStencilFace,
    pub blend_targets: Vec<GlBlendTarget>,
    pub blend_color: [f32; 4],

    pub vertex_attribs: Vec<GlVertexAttrib>,
    pub debug_groups: Vec<String>,
}

impl Default for GlState {
    fn default() -> Self {
        GlState {
            error: gl43::NO_ERROR,
            next_name: 1,
            buffers: Default::default(),
            textures: Default::default(),
            samplers: Default::default(),
            shaders: Default::default(),
            programs: Default::default(),
            framebuffers: Default::default(),
            queries: Default::default(),
            surfaces: Default::default(),
            current_surface: None,
            array_buffer: NONE_BUFFER,
            element_array_buffer: NONE_BUFFER,
            uniform_buffer: NONE_BUFFER,
            uniform_buffer_ranges: vec![None; MAX_UNIFORM_BUFFER_BINDINGS],
            active_texture_unit: 0,
            texture_units: vec![GlTextureUnit::default(); MAX_TEXTURE_UNITS],
            current_program: NONE_PROGRAM,
            draw_framebuffer: NONE_FRAMEBUFFER,
            read_framebuffer: NONE_FRAMEBUFFER,
            default_draw_buffer: gl43::BACK_LEFT,
            default_read_buffer: gl43::BACK_LEFT,
            viewport: [0; 4],
            viewport_initialized: false,
            depth_range: [0.0, 1.0],
            scissor_box: [0; 4],
            enabled_caps: Default::default(),
            cull_face: gl43::BACK,
            front_face: gl43::CCW,
            polygon_mode: gl43::FILL,
            polygon_offset_factor: 0.0,
            polygon_offset_units: 0.0,
            depth_func: gl43::LESS,
            depth_mask: true,
            stencil_front: GlStencilFace::default(),
            stencil_back: GlStencilFace::default(),
            blend_targets: vec![GlBlendTarget::default(); MAX_DRAW_BUFFERS],
            blend_color: [0.0; 4],
            vertex_attribs: vec![GlVertexAttrib::default(); MAX_VERTEX_ATTRIBS],
            debug_groups: Vec::new(),
        }
    }
}

impl GlState {
    pub fn is_enabled(
        &self,
        cap: GLenum,
    ) -> bool {
        self.enabled_caps.contains(&cap)
    }

    pub fn allocate_name(&mut self) -> u32 {
        let name = self.next_name;
        self.next_name += 1;
        name
    }
}
