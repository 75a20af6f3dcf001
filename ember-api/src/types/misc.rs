#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use ember_base::DecimalF32;
use std::hash::{Hash, Hasher};
use std::time::Duration;

/// Controls if validation is enabled or not. The requirements/behaviors of validation is
/// API-specific.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EmberValidationMode {
    /// Do not run native-layer validation
    Disabled,

    /// Validate native calls (resource states on dx12, object ids on gl) and log failures
    Enabled,
}

impl Default for EmberValidationMode {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        let validation_mode = EmberValidationMode::Enabled;
        #[cfg(not(debug_assertions))]
        let validation_mode = EmberValidationMode::Disabled;

        validation_mode
    }
}

/// Which native API a device is driving
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EmberApiType {
    Gl,
    Dx12,
}

/// Information about the device, mostly limits and requirements (like memory alignment)
#[derive(Clone, Debug)]
pub struct EmberDeviceInfo {
    pub api_type: EmberApiType,
    pub min_uniform_buffer_offset_alignment: u32,
    pub max_vertex_attribute_count: u32,
    pub max_color_attachments: u32,
    /// Ticks per second of the values written by timing queries
    pub timestamp_frequency: u64,
    pub renderer_name: String,
}

/// Optional features the calling code must branch on rather than assume
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EmberGraphicsCapabilities {
    pub supports_multisampled_textures: bool,
    pub supports_lod_bias: bool,
    pub supports_instance_offset: bool,
    pub supports_multiple_swapchains: bool,
    pub supports_independent_blend: bool,
}

/// Configuration shared by all backends
#[derive(Clone, Debug)]
pub struct EmberApiDef {
    pub validation_mode: EmberValidationMode,
    /// Upper bound on any wait for GPU completion. Exceeding it is fatal for the device.
    pub fence_timeout: Duration,
    /// Block until the GPU is idle after every submission. Only meaningful for backends that
    /// execute asynchronously.
    pub wait_for_idle_after_submit: bool,
}

impl Default for EmberApiDef {
    fn default() -> Self {
        EmberApiDef {
            validation_mode: Default::default(),
            fence_timeout: Duration::from_secs(5),
            wait_for_idle_after_submit: true,
        }
    }
}

bitflags::bitflags! {
    /// The current state of a resource. When an operation is performed that references a resource,
    /// it must be in the correct state. Resources are moved between state using barriers.
    ///
    /// Only the dx12 backend tracks these. gl transitions implicitly.
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
    pub struct EmberResourceState: u32 {
        const UNDEFINED = 0;
        const VERTEX_AND_CONSTANT_BUFFER = 0x1;
        const INDEX_BUFFER = 0x2;
        const RENDER_TARGET = 0x4;
        const UNORDERED_ACCESS = 0x8;
        const DEPTH_WRITE = 0x10;
        const DEPTH_READ = 0x20;
        const NON_PIXEL_SHADER_RESOURCE = 0x40;
        const PIXEL_SHADER_RESOURCE = 0x80;
        const SHADER_RESOURCE = 0x40 | 0x80;
        const STREAM_OUT = 0x100;
        const INDIRECT_ARGUMENT = 0x200;
        const COPY_DST = 0x400;
        const COPY_SRC = 0x800;
        const GENERIC_READ = (((((0x1 | 0x2) | 0x40) | 0x80) | 0x200) | 0x800);
        const PRESENT = 0x1000;
        const COMMON = 0x2000;
        const RESOLVE_DST = 0x4000;
        const RESOLVE_SRC = 0x8000;
    }
}

bitflags::bitflags! {
    /// What a buffer or texture may be used for
    #[derive(Default)]
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
    pub struct EmberResourceType: u32 {
        const UNDEFINED = 0;
        const SAMPLER = 1<<0;
        const TEXTURE = 1<<1;
        const UNIFORM_BUFFER = 1<<2;
        const VERTEX_BUFFER = 1<<3;
        const INDEX_BUFFER = 1<<4;
        const RENDER_TARGET_COLOR = 1<<5;
        const RENDER_TARGET_DEPTH_STENCIL = 1<<6;
    }
}

impl EmberResourceType {
    pub fn is_uniform_buffer(self) -> bool {
        self.intersects(EmberResourceType::UNIFORM_BUFFER)
    }

    pub fn is_render_target(self) -> bool {
        self.intersects(
            EmberResourceType::RENDER_TARGET_COLOR | EmberResourceType::RENDER_TARGET_DEPTH_STENCIL,
        )
    }

    pub fn is_texture(self) -> bool {
        self.intersects(EmberResourceType::TEXTURE)
    }
}

bitflags::bitflags! {
    /// Which color channels a pipeline writes
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
    pub struct EmberColorFlags: u8 {
        const RED = 1;
        const GREEN = 2;
        const BLUE = 4;
        const ALPHA = 8;
        const ALL = 0x0F;
    }
}

impl Default for EmberColorFlags {
    fn default() -> Self {
        EmberColorFlags::ALL
    }
}

bitflags::bitflags! {
    /// Indicates a particular stage of a shader, or set of stages in a shader. Similar to
    /// VkShaderStageFlagBits
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
    pub struct EmberShaderStageFlags : u32 {
        const NONE = 0;
        const VERTEX = 1;
        const FRAGMENT = 2;
        const ALL_GRAPHICS = 0x03;
    }
}

/// A 2d size for windows, textures, etc.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberExtents2D {
    pub width: u32,
    pub height: u32,
}

/// Number of MSAA samples to use. 1xMSAA and 4xMSAA are most broadly supported
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum EmberSampleCount {
    SampleCount1,
    SampleCount2,
    SampleCount4,
    SampleCount8,
}

impl Default for EmberSampleCount {
    fn default() -> Self {
        EmberSampleCount::SampleCount1
    }
}

impl EmberSampleCount {
    pub fn as_u32(self) -> u32 {
        match self {
            EmberSampleCount::SampleCount1 => 1,
            EmberSampleCount::SampleCount2 => 2,
            EmberSampleCount::SampleCount4 => 4,
            EmberSampleCount::SampleCount8 => 8,
        }
    }

    pub fn from_u32(samples: u32) -> Option<Self> {
        match samples {
            1 => Some(EmberSampleCount::SampleCount1),
            2 => Some(EmberSampleCount::SampleCount2),
            4 => Some(EmberSampleCount::SampleCount4),
            8 => Some(EmberSampleCount::SampleCount8),
            _ => None,
        }
    }
}

/// The status of a fence
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EmberFenceStatus {
    /// The fence was submitted to the command buffer and signaled as completed by the GPU
    Complete,
    /// The fence will be signaled as complete later by the GPU
    Incomplete,
    /// The fence was never submitted, or was submitted and already returned complete once, putting
    /// it back into the unsubmitted state
    Unsubmitted,
}

/// Indicates how a vertex buffer advances through its data
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum EmberVertexAttributeRate {
    Vertex,
    Instance,
}

impl Default for EmberVertexAttributeRate {
    fn default() -> Self {
        EmberVertexAttributeRate::Vertex
    }
}

/// How to intepret vertex data into a form of geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum EmberPrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
}

impl Default for EmberPrimitiveTopology {
    fn default() -> Self {
        EmberPrimitiveTopology::TriangleList
    }
}

/// The size of index buffer elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum EmberIndexType {
    Uint32,
    Uint16,
}

impl Default for EmberIndexType {
    fn default() -> Self {
        EmberIndexType::Uint16
    }
}

impl EmberIndexType {
    pub fn size_in_bytes(self) -> u32 {
        match self {
            EmberIndexType::Uint32 => 4,
            EmberIndexType::Uint16 => 2,
        }
    }
}

/// Affects blending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum EmberBlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    SrcAlphaSaturate,
    ConstantColor,
    OneMinusConstantColor,
}

impl Default for EmberBlendFactor {
    fn default() -> Self {
        EmberBlendFactor::Zero
    }
}

/// Affects blending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum EmberBlendOp {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

impl Default for EmberBlendOp {
    fn default() -> Self {
        EmberBlendOp::Add
    }
}

/// Affects depth testing and sampling
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum EmberCompareOp {
    Never,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

impl Default for EmberCompareOp {
    fn default() -> Self {
        EmberCompareOp::Never
    }
}

impl EmberCompareOp {
    pub fn compare<T: PartialOrd>(
        self,
        incoming: T,
        stored: T,
    ) -> bool {
        match self {
            EmberCompareOp::Never => false,
            EmberCompareOp::Less => incoming < stored,
            EmberCompareOp::Equal => incoming == stored,
            EmberCompareOp::LessOrEqual => incoming <= stored,
            EmberCompareOp::Greater => incoming > stored,
            EmberCompareOp::NotEqual => incoming != stored,
            EmberCompareOp::GreaterOrEqual => incoming >= stored,
            EmberCompareOp::Always => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum EmberStencilOp {
    Keep,
    Zero,
    Replace,
    IncrementAndClamp,
    DecrementAndClamp,
    Invert,
    IncrementAndWrap,
    DecrementAndWrap,
}

impl Default for EmberStencilOp {
    fn default() -> Self {
        EmberStencilOp::Keep
    }
}

impl EmberStencilOp {
    pub fn apply(
        self,
        stored: u8,
        reference: u8,
    ) -> u8 {
        match self {
            EmberStencilOp::Keep => stored,
            EmberStencilOp::Zero => 0,
            EmberStencilOp::Replace => reference,
            EmberStencilOp::IncrementAndClamp => stored.saturating_add(1),
            EmberStencilOp::DecrementAndClamp => stored.saturating_sub(1),
            EmberStencilOp::Invert => !stored,
            EmberStencilOp::IncrementAndWrap => stored.wrapping_add(1),
            EmberStencilOp::DecrementAndWrap => stored.wrapping_sub(1),
        }
    }
}

/// Determines if we cull polygons that are front-facing or back-facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum EmberCullMode {
    None,
    Back,
    Front,
}

impl Default for EmberCullMode {
    fn default() -> Self {
        EmberCullMode::Back
    }
}

/// Determines what winding order is considerered the front face of a polygon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum EmberFrontFace {
    CounterClockwise,
    Clockwise,
}

impl Default for EmberFrontFace {
    fn default() -> Self {
        EmberFrontFace::Clockwise
    }
}

/// Whether to fill in polygons or not
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum EmberFillMode {
    Solid,
    Wireframe,
}

impl Default for EmberFillMode {
    fn default() -> Self {
        EmberFillMode::Solid
    }
}

/// Filtering method when sampling
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum EmberFilterType {
    Nearest,
    Linear,
}

impl Default for EmberFilterType {
    fn default() -> Self {
        EmberFilterType::Nearest
    }
}

/// Affects image sampling, particularly for UV coordinates outside the [0, 1] range
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum EmberAddressMode {
    Mirror,
    Repeat,
    ClampToEdge,
    ClampToBorder,
}

impl Default for EmberAddressMode {
    fn default() -> Self {
        EmberAddressMode::Repeat
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum EmberMipMapMode {
    Nearest,
    Linear,
}

impl Default for EmberMipMapMode {
    fn default() -> Self {
        EmberMipMapMode::Nearest
    }
}

/// A clear value for color attachments
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberColorClearValue(pub [f32; 4]);

impl Default for EmberColorClearValue {
    fn default() -> Self {
        EmberColorClearValue([1.0, 1.0, 1.0, 1.0])
    }
}

impl Hash for EmberColorClearValue {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        DecimalF32::hash_slice(&self.0, state);
    }
}

/// A clear values for depth/stencil attachments. One or both values may be used depending on the
/// format of the attached image
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberDepthStencilClearValue {
    pub depth: f32,
    pub stencil: u8,
}

impl Default for EmberDepthStencilClearValue {
    fn default() -> Self {
        EmberDepthStencilClearValue {
            depth: 1.0,
            stencil: 0,
        }
    }
}

impl Hash for EmberDepthStencilClearValue {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        DecimalF32(self.depth).hash(state);
        self.stencil.hash(state);
    }
}

/// A viewport in pixels. The origin is the top-left corner of the render target and Y grows down.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberViewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl EmberViewport {
    pub fn covering(extents: EmberExtents2D) -> Self {
        EmberViewport {
            x: 0.0,
            y: 0.0,
            width: extents.width as f32,
            height: extents.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// A rectangle in pixels. The origin is the top-left corner of the render target and Y grows
/// down. Used for scissors and clear rects.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberScissor {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl EmberScissor {
    pub fn covering(extents: EmberExtents2D) -> Self {
        EmberScissor {
            x: 0,
            y: 0,
            width: extents.width,
            height: extents.height,
        }
    }
}

pub type EmberClearRect = EmberScissor;
