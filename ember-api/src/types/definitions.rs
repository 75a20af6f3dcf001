#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::*;
use ember_base::DecimalF32;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Used to create a `EmberBuffer`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberBufferDef {
    pub size: u64,
    pub resource_type: EmberResourceType,
    /// Only used by index buffers
    pub index_type: EmberIndexType,
}

impl Default for EmberBufferDef {
    fn default() -> Self {
        EmberBufferDef {
            size: 0,
            resource_type: EmberResourceType::UNDEFINED,
            index_type: EmberIndexType::Uint16,
        }
    }
}

impl EmberBufferDef {
    pub fn verify(&self) -> EmberResult<()> {
        if self.size == 0 {
            Err("Buffers must have a non-zero size")?;
        }

        let buffer_types = EmberResourceType::VERTEX_BUFFER
            | EmberResourceType::INDEX_BUFFER
            | EmberResourceType::UNIFORM_BUFFER;
        if !self.resource_type.intersects(buffer_types) {
            Err(format!(
                "Buffer resource type {:?} has no buffer usage",
                self.resource_type
            ))?;
        }

        Ok(())
    }

    pub fn for_vertex_buffer(size: u64) -> EmberBufferDef {
        EmberBufferDef {
            size,
            resource_type: EmberResourceType::VERTEX_BUFFER,
            ..Default::default()
        }
    }

    pub fn for_vertex_buffer_data<T: Copy>(data: &[T]) -> EmberBufferDef {
        Self::for_vertex_buffer(ember_base::memory::slice_size_in_bytes(data) as u64)
    }

    pub fn for_index_buffer(
        size: u64,
        index_type: EmberIndexType,
    ) -> EmberBufferDef {
        EmberBufferDef {
            size,
            resource_type: EmberResourceType::INDEX_BUFFER,
            index_type,
        }
    }

    pub fn for_uniform_buffer(size: u64) -> EmberBufferDef {
        EmberBufferDef {
            size,
            resource_type: EmberResourceType::UNIFORM_BUFFER,
            ..Default::default()
        }
    }

    pub fn for_uniform_buffer_data<T: Copy>(data: &[T]) -> EmberBufferDef {
        Self::for_uniform_buffer(ember_base::memory::slice_size_in_bytes(data) as u64)
    }
}

/// Used to create a `EmberTexture`. Textures are two dimensional.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberTextureDef {
    pub extents: EmberExtents2D,
    pub mip_count: u32,
    pub sample_count: EmberSampleCount,
    pub format: EmberFormat,
    pub resource_type: EmberResourceType,
}

impl Default for EmberTextureDef {
    fn default() -> Self {
        EmberTextureDef {
            extents: EmberExtents2D {
                width: 0,
                height: 0,
            },
            mip_count: 1,
            sample_count: EmberSampleCount::SampleCount1,
            format: EmberFormat::UNDEFINED,
            resource_type: EmberResourceType::TEXTURE,
        }
    }
}

impl EmberTextureDef {
    pub fn verify(&self) -> EmberResult<()> {
        if self.extents.width == 0 || self.extents.height == 0 {
            Err(format!(
                "Texture extents must be non-zero, got {:?}",
                self.extents
            ))?;
        }

        if self.mip_count == 0 {
            Err("Textures must have at least one mip level")?;
        }

        if self.mip_count > Self::max_mip_count(self.extents) {
            Err(format!(
                "Texture with extents {:?} cannot have {} mip levels",
                self.extents, self.mip_count
            ))?;
        }

        // Surfaces the undefined format as a construction-time error
        self.format.size_in_bytes()?;

        if self.sample_count != EmberSampleCount::SampleCount1 && self.mip_count != 1 {
            Err("Multisampled textures cannot have mip levels")?;
        }

        if self
            .resource_type
            .contains(EmberResourceType::RENDER_TARGET_DEPTH_STENCIL)
            && !self.format.is_depth()
        {
            Err(format!(
                "Depth/stencil render targets require a depth format, got {:?}",
                self.format
            ))?;
        }

        if self
            .resource_type
            .contains(EmberResourceType::RENDER_TARGET_COLOR)
            && !self.format.is_color_renderable()
        {
            Err(format!(
                "Format {:?} cannot be used as a color render target",
                self.format
            ))?;
        }

        Ok(())
    }

    pub fn max_mip_count(extents: EmberExtents2D) -> u32 {
        let largest = extents.width.max(extents.height).max(1);
        32 - largest.leading_zeros()
    }

    pub fn mip_extents(
        &self,
        mip_level: u32,
    ) -> EmberExtents2D {
        EmberExtents2D {
            width: (self.extents.width >> mip_level).max(1),
            height: (self.extents.height >> mip_level).max(1),
        }
    }
}

/// Used to create a `EmberSampler`
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberSamplerDef {
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub min_filter: EmberFilterType,
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub mag_filter: EmberFilterType,
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub mip_map_mode: EmberMipMapMode,
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub address_mode_u: EmberAddressMode,
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub address_mode_v: EmberAddressMode,
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub mip_lod_bias: f32,
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub border_color: [f32; 4],
    //NOTE: Custom hash impl, don't forget to add changes there too!
}

impl Eq for EmberSamplerDef {}

impl Hash for EmberSamplerDef {
    fn hash<H: Hasher>(
        &self,
        mut state: &mut H,
    ) {
        self.min_filter.hash(&mut state);
        self.mag_filter.hash(&mut state);
        self.mip_map_mode.hash(&mut state);
        self.address_mode_u.hash(&mut state);
        self.address_mode_v.hash(&mut state);
        DecimalF32(self.mip_lod_bias).hash(&mut state);
        DecimalF32::hash_slice(&self.border_color, &mut state);
    }
}

/// Shader code for every backend that may consume it. A backend picks the form it understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberShaderPackage {
    pub stage: EmberShaderStageFlags,
    pub entry_point: String,
    /// GLSL source, compiled by the GL driver when the module is created
    pub gl: Option<String>,
    /// Compiled DXIL container
    pub dx12: Option<Vec<u8>>,
}

impl Default for EmberShaderStageFlags {
    fn default() -> Self {
        EmberShaderStageFlags::NONE
    }
}

/// Describes an attribute within a EmberVertexLayout
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberVertexLayoutAttribute {
    /// Format of the attribute
    pub format: EmberFormat,
    /// Which buffer the attribute is contained in
    pub buffer_index: u32,
    /// Affects what input variable within the shader the attribute is assigned
    pub location: u32,
    /// The byte offset of the attribute within the buffer
    pub byte_offset: u32,
    /// Attribute name in GL shaders, semantic name for dx12 input layouts
    pub name: String,
}

/// Describes a buffer that provides vertex attribute data (See EmberVertexLayout)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberVertexLayoutBuffer {
    pub stride: u32,
    pub rate: EmberVertexAttributeRate,
}

/// Describes how vertex attributes are laid out within one or more buffers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberVertexLayout {
    pub attributes: Vec<EmberVertexLayoutAttribute>,
    pub buffers: Vec<EmberVertexLayoutBuffer>,
}

impl EmberVertexLayout {
    pub fn verify(
        &self,
        max_vertex_attribute_count: u32,
    ) -> EmberResult<()> {
        if self.attributes.len() > max_vertex_attribute_count as usize {
            Err(format!(
                "Vertex layout has {} attributes but the device supports {}",
                self.attributes.len(),
                max_vertex_attribute_count
            ))?;
        }

        for attribute in &self.attributes {
            if attribute.buffer_index as usize >= self.buffers.len() {
                Err(format!(
                    "Vertex attribute {} references buffer {} but the layout has {} buffers",
                    attribute.name,
                    attribute.buffer_index,
                    self.buffers.len()
                ))?;
            }

            let size = attribute.format.size_in_bytes()?;
            let stride = self.buffers[attribute.buffer_index as usize].stride;
            if attribute.byte_offset + size > stride {
                Err(format!(
                    "Vertex attribute {} (offset {}, size {}) does not fit in stride {}",
                    attribute.name, attribute.byte_offset, size, stride
                ))?;
            }

            let duplicate_location = self
                .attributes
                .iter()
                .filter(|other| other.location == attribute.location)
                .count()
                > 1;
            if duplicate_location {
                Err(format!(
                    "Vertex attribute location {} is used more than once",
                    attribute.location
                ))?;
            }
        }

        Ok(())
    }
}

/// Affects depth testing and stencil usage. Commonly used to enable "Z-buffering".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberDepthState {
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
    pub depth_compare_op: EmberCompareOp,
    pub stencil_test_enable: bool,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
    pub front_depth_fail_op: EmberStencilOp,
    pub front_stencil_compare_op: EmberCompareOp,
    pub front_stencil_fail_op: EmberStencilOp,
    pub front_stencil_pass_op: EmberStencilOp,
    pub back_depth_fail_op: EmberStencilOp,
    pub back_stencil_compare_op: EmberCompareOp,
    pub back_stencil_fail_op: EmberStencilOp,
    pub back_stencil_pass_op: EmberStencilOp,
}

impl Default for EmberDepthState {
    fn default() -> Self {
        EmberDepthState {
            depth_test_enable: false,
            depth_write_enable: false,
            depth_compare_op: EmberCompareOp::LessOrEqual,
            stencil_test_enable: false,
            stencil_read_mask: 0xFF,
            stencil_write_mask: 0xFF,
            front_depth_fail_op: Default::default(),
            front_stencil_compare_op: EmberCompareOp::Always,
            front_stencil_fail_op: Default::default(),
            front_stencil_pass_op: Default::default(),
            back_depth_fail_op: Default::default(),
            back_stencil_compare_op: EmberCompareOp::Always,
            back_stencil_fail_op: Default::default(),
            back_stencil_pass_op: Default::default(),
        }
    }
}

/// Affects rasterization, commonly used to enable backface culling or wireframe rendering
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberRasterizerState {
    pub cull_mode: EmberCullMode,
    pub front_face: EmberFrontFace,
    pub fill_mode: EmberFillMode,
    pub depth_bias: i32,
    pub depth_bias_slope_scaled: f32,
    pub depth_clip_enable: bool,
    // Hash implemented manually below, don't forget to update it!
}

impl Eq for EmberRasterizerState {}

impl Hash for EmberRasterizerState {
    fn hash<H: Hasher>(
        &self,
        mut state: &mut H,
    ) {
        self.cull_mode.hash(&mut state);
        self.front_face.hash(&mut state);
        self.fill_mode.hash(&mut state);
        self.depth_bias.hash(&mut state);
        DecimalF32(self.depth_bias_slope_scaled).hash(&mut state);
        self.depth_clip_enable.hash(&mut state);
    }
}

impl Default for EmberRasterizerState {
    fn default() -> Self {
        EmberRasterizerState {
            cull_mode: EmberCullMode::Back,
            front_face: EmberFrontFace::Clockwise,
            fill_mode: EmberFillMode::Solid,
            depth_bias: 0,
            depth_bias_slope_scaled: 0.0,
            depth_clip_enable: false,
        }
    }
}

/// Configures blend state for a particular render target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberBlendStateRenderTarget {
    pub src_factor: EmberBlendFactor,
    pub dst_factor: EmberBlendFactor,
    pub src_factor_alpha: EmberBlendFactor,
    pub dst_factor_alpha: EmberBlendFactor,
    pub blend_op: EmberBlendOp,
    pub blend_op_alpha: EmberBlendOp,
    pub masks: EmberColorFlags,
}

impl Default for EmberBlendStateRenderTarget {
    fn default() -> Self {
        EmberBlendStateRenderTarget {
            blend_op: EmberBlendOp::Add,
            blend_op_alpha: EmberBlendOp::Add,
            src_factor: EmberBlendFactor::One,
            src_factor_alpha: EmberBlendFactor::One,
            dst_factor: EmberBlendFactor::Zero,
            dst_factor_alpha: EmberBlendFactor::Zero,
            masks: EmberColorFlags::ALL,
        }
    }
}

impl EmberBlendStateRenderTarget {
    pub fn default_alpha_disabled() -> Self {
        Default::default()
    }

    pub fn default_alpha_enabled() -> Self {
        EmberBlendStateRenderTarget {
            src_factor: EmberBlendFactor::SrcAlpha,
            dst_factor: EmberBlendFactor::OneMinusSrcAlpha,
            src_factor_alpha: EmberBlendFactor::One,
            dst_factor_alpha: EmberBlendFactor::Zero,
            blend_op: EmberBlendOp::Add,
            blend_op_alpha: EmberBlendOp::Add,
            masks: EmberColorFlags::ALL,
        }
    }

    pub fn blend_enabled(&self) -> bool {
        self.src_factor != EmberBlendFactor::One
            || self.src_factor_alpha != EmberBlendFactor::One
            || self.dst_factor != EmberBlendFactor::Zero
            || self.dst_factor_alpha != EmberBlendFactor::Zero
            || self.blend_op != EmberBlendOp::Add
            || self.blend_op_alpha != EmberBlendOp::Add
    }
}

/// Affects the way the result of a pixel shader is blended with a value it will overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberBlendState {
    /// Individual blend states for blend targets
    pub render_target_blend_states: Vec<EmberBlendStateRenderTarget>,

    /// If false, `render_target_blend_states[0]` will apply to all render targets. If true, we
    /// index into `render_target_blend_states` based on the render target's index.
    pub independent_blend: bool,
}

impl EmberBlendState {
    pub fn default_alpha_disabled() -> Self {
        EmberBlendState {
            render_target_blend_states: vec![EmberBlendStateRenderTarget::default_alpha_disabled()],
            independent_blend: false,
        }
    }

    pub fn default_alpha_enabled() -> Self {
        EmberBlendState {
            render_target_blend_states: vec![EmberBlendStateRenderTarget::default_alpha_enabled()],
            independent_blend: false,
        }
    }

    pub fn verify(
        &self,
        color_attachment_count: usize,
    ) -> EmberResult<()> {
        if !self.independent_blend {
            if self.render_target_blend_states.len() != 1 {
                Err("If EmberBlendState::independent_blend is false, EmberBlendState::render_target_blend_states must be 1")?;
            }
        } else if self.render_target_blend_states.len() != color_attachment_count {
            Err("If EmberBlendState::independent_blend is true, EmberBlendState::render_target_blend_states length must match color attachment count")?;
        }

        Ok(())
    }

    /// The blend state that applies to the given color attachment
    pub fn blend_state_for_attachment(
        &self,
        attachment_index: usize,
    ) -> EmberBlendStateRenderTarget {
        let state = if self.independent_blend {
            self.render_target_blend_states.get(attachment_index)
        } else {
            self.render_target_blend_states.first()
        };

        state.cloned().unwrap_or_default()
    }
}

impl Default for EmberBlendState {
    fn default() -> Self {
        Self::default_alpha_disabled()
    }
}

/// The kind of resource a binding accepts
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum EmberResourceBindingType {
    /// A texture and sampler pair, sampled by the shader
    CombinedImageSampler,
    UniformBuffer,
}

/// A single named binding of a resource set
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberResourceBinding {
    pub name: String,
    pub set: u32,
    pub binding: u32,
    pub binding_type: EmberResourceBindingType,
}

/// Describes the resources a pipeline consumes. Used to create a `EmberResourceSet`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberResourceSetDef {
    pub bindings: Vec<EmberResourceBinding>,
}

/// Used to create a `EmberPipeline` for graphics operations
#[derive(Clone, Debug)]
pub struct EmberPipelineDef {
    pub vertex_shader: Arc<EmberShaderModule>,
    pub fragment_shader: Arc<EmberShaderModule>,
    pub vertex_layout: EmberVertexLayout,
    pub blend_state: EmberBlendState,
    pub depth_state: EmberDepthState,
    pub rasterizer_state: EmberRasterizerState,
    pub primitive_topology: EmberPrimitiveTopology,
    pub color_formats: Vec<EmberFormat>,
    pub depth_stencil_format: Option<EmberFormat>,
    pub sample_count: EmberSampleCount,
    pub resource_set_def: EmberResourceSetDef,
    /// When set, binding the pipeline also binds this render target
    pub render_target: Option<EmberRenderTarget>,
}

impl EmberPipelineDef {
    pub fn verify(
        &self,
        device_info: &EmberDeviceInfo,
    ) -> EmberResult<()> {
        if !self
            .vertex_shader
            .shader_package()
            .stage
            .contains(EmberShaderStageFlags::VERTEX)
        {
            Err("EmberPipelineDef::vertex_shader is not a vertex shader")?;
        }

        if !self
            .fragment_shader
            .shader_package()
            .stage
            .contains(EmberShaderStageFlags::FRAGMENT)
        {
            Err("EmberPipelineDef::fragment_shader is not a fragment shader")?;
        }

        if self.color_formats.len() > device_info.max_color_attachments as usize {
            Err(format!(
                "Pipeline has {} color formats, the device supports {}",
                self.color_formats.len(),
                device_info.max_color_attachments
            ))?;
        }

        for &format in &self.color_formats {
            if !format.is_color_renderable() {
                Err(format!("Format {:?} is not color renderable", format))?;
            }
        }

        if let Some(depth_format) = self.depth_stencil_format {
            if !depth_format.is_depth() {
                Err(format!("Format {:?} is not a depth format", depth_format))?;
            }
        }

        self.vertex_layout
            .verify(device_info.max_vertex_attribute_count)?;
        self.blend_state.verify(self.color_formats.len())?;

        Ok(())
    }
}

/// Describes one color attachment of a framebuffer
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberFramebufferAttachmentDef {
    pub format: EmberFormat,
}

/// Used to create a `EmberFramebuffer`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberFramebufferDef {
    pub extents: EmberExtents2D,
    pub color_attachments: Vec<EmberFramebufferAttachmentDef>,
    pub depth_stencil_format: Option<EmberFormat>,
    pub sample_count: EmberSampleCount,
}

impl Default for EmberFramebufferDef {
    fn default() -> Self {
        EmberFramebufferDef {
            extents: Default::default(),
            color_attachments: vec![],
            depth_stencil_format: None,
            sample_count: EmberSampleCount::SampleCount1,
        }
    }
}

impl EmberFramebufferDef {
    pub fn verify(&self) -> EmberResult<()> {
        if self.color_attachments.is_empty() && self.depth_stencil_format.is_none() {
            Err("A framebuffer needs at least one attachment")?;
        }

        for attachment in &self.color_attachments {
            if !attachment.format.is_color_renderable() {
                Err(format!(
                    "Format {:?} cannot be used as a color attachment",
                    attachment.format
                ))?;
            }
        }

        if let Some(depth_format) = self.depth_stencil_format {
            if !depth_format.is_depth() {
                Err(format!(
                    "Format {:?} cannot be used as a depth attachment",
                    depth_format
                ))?;
            }
        }

        Ok(())
    }

    pub(crate) fn color_attachment_texture_def(
        &self,
        attachment_index: usize,
    ) -> EmberTextureDef {
        EmberTextureDef {
            extents: self.extents,
            mip_count: 1,
            sample_count: self.sample_count,
            format: self.color_attachments[attachment_index].format,
            resource_type: EmberResourceType::TEXTURE | EmberResourceType::RENDER_TARGET_COLOR,
        }
    }

    pub(crate) fn depth_attachment_texture_def(
        &self,
        format: EmberFormat,
    ) -> EmberTextureDef {
        EmberTextureDef {
            extents: self.extents,
            mip_count: 1,
            sample_count: self.sample_count,
            format,
            resource_type: EmberResourceType::RENDER_TARGET_DEPTH_STENCIL,
        }
    }
}

/// Used to create a `EmberSwapchain`
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EmberSwapchainDef {
    pub width: u32,
    pub height: u32,
    pub format: EmberFormat,
    pub depth_stencil_format: Option<EmberFormat>,
    pub sample_count: EmberSampleCount,
    /// Number of back buffers. Only used by backends with explicit back buffers.
    pub image_count: u32,
    pub enable_vsync: bool,
}

impl Default for EmberSwapchainDef {
    fn default() -> Self {
        EmberSwapchainDef {
            width: 0,
            height: 0,
            format: EmberFormat::R8G8B8A8_UNORM,
            depth_stencil_format: Some(EmberFormat::D24_UNORM_S8_UINT),
            sample_count: EmberSampleCount::SampleCount1,
            image_count: 2,
            enable_vsync: true,
        }
    }
}

impl EmberSwapchainDef {
    pub fn verify(&self) -> EmberResult<()> {
        if self.width == 0 || self.height == 0 {
            Err("Swapchain dimensions must be non-zero")?;
        }

        if !self.format.is_color_renderable() {
            Err(format!(
                "Format {:?} cannot be used for a swapchain",
                self.format
            ))?;
        }

        if let Some(depth_format) = self.depth_stencil_format {
            if !depth_format.is_depth() {
                Err(format!(
                    "Format {:?} cannot be used as a depth buffer",
                    depth_format
                ))?;
            }
        }

        if self.image_count < 2 {
            Err("Swapchains need at least two images")?;
        }

        Ok(())
    }

    pub(crate) fn multisampled_framebuffer_def(&self) -> EmberFramebufferDef {
        EmberFramebufferDef {
            extents: EmberExtents2D {
                width: self.width,
                height: self.height,
            },
            color_attachments: vec![EmberFramebufferAttachmentDef {
                format: self.format,
            }],
            depth_stencil_format: self.depth_stencil_format,
            sample_count: self.sample_count,
        }
    }
}
