use crate::gl::{
    EmberDeviceContextGl, GlAttributeFormat, GlBlendState, GlDeferredDestroy,
    GlDepthStencilState, GlRasterizerState, ProgramId,
};
use crate::{EmberPipelineDef, EmberResult, EmberVertexAttributeRate};

use crate::gl::gl43;
use crate::gl::gl43::GLenum;

/// Everything glVertexAttribPointer and glVertexAttribDivisor need for one attribute. The buffer
/// is bound at draw time.
#[derive(Clone, Debug)]
pub(crate) struct GlAttribute {
    pub(crate) buffer_index: u32,
    pub(crate) location: u32,
    pub(crate) format: GlAttributeFormat,
    pub(crate) stride: u32,
    pub(crate) divisor: u32,
    pub(crate) byte_offset: u32,
}

#[derive(Debug)]
pub struct EmberPipelineGl {
    device_context: EmberDeviceContextGl,
    pipeline_def: EmberPipelineDef,
    program_id: ProgramId,
    gl_attributes: Vec<GlAttribute>,
    gl_rasterizer_state: GlRasterizerState,
    gl_depth_stencil_state: GlDepthStencilState,
    gl_blend_state: GlBlendState,
    gl_topology: GLenum,
}

impl Drop for EmberPipelineGl {
    fn drop(&mut self) {
        self.device_context
            .destroy_later(GlDeferredDestroy::Program(self.program_id));
    }
}

impl EmberPipelineGl {
    pub fn pipeline_def(&self) -> &EmberPipelineDef {
        &self.pipeline_def
    }

    pub fn gl_program_id(&self) -> ProgramId {
        self.program_id
    }

    pub(crate) fn gl_attributes(&self) -> &[GlAttribute] {
        &self.gl_attributes
    }

    pub(crate) fn gl_rasterizer_state(&self) -> &GlRasterizerState {
        &self.gl_rasterizer_state
    }

    pub(crate) fn gl_depth_stencil_state(&self) -> &GlDepthStencilState {
        &self.gl_depth_stencil_state
    }

    pub(crate) fn gl_blend_state(&self) -> &GlBlendState {
        &self.gl_blend_state
    }

    pub fn gl_topology(&self) -> GLenum {
        self.gl_topology
    }

    pub fn new(
        device_context: &EmberDeviceContextGl,
        pipeline_def: &EmberPipelineDef,
    ) -> EmberResult<Self> {
        let vertex_shader = pipeline_def
            .vertex_shader
            .gl_shader_module()
            .ok_or("The vertex shader was not created by the gl backend")?;
        let fragment_shader = pipeline_def
            .fragment_shader
            .gl_shader_module()
            .ok_or("The fragment shader was not created by the gl backend")?;

        let vertex_layout = &pipeline_def.vertex_layout;
        let mut gl_attributes = Vec::with_capacity(vertex_layout.attributes.len());
        for attribute in &vertex_layout.attributes {
            let format = attribute.format.gl_attribute_format().ok_or_else(|| {
                format!(
                    "Vertex attribute {} uses format {:?} which gl cannot fetch",
                    attribute.name, attribute.format
                )
            })?;

            let buffer = &vertex_layout.buffers[attribute.buffer_index as usize];
            let divisor = match buffer.rate {
                EmberVertexAttributeRate::Vertex => 0,
                EmberVertexAttributeRate::Instance => 1,
            };

            gl_attributes.push(GlAttribute {
                buffer_index: attribute.buffer_index,
                location: attribute.location,
                format,
                stride: buffer.stride,
                divisor,
                byte_offset: attribute.byte_offset,
            });
        }

        let attrib_bindings: Vec<_> = vertex_layout
            .attributes
            .iter()
            .map(|attribute| (attribute.location, attribute.name.as_str()))
            .collect();

        let program_id = device_context.gl_context().link_shader_program(
            vertex_shader.gl_shader_id(),
            fragment_shader.gl_shader_id(),
            &attrib_bindings,
        )?;

        log::trace!(
            "Linked program {:?} with {} attributes",
            program_id,
            gl_attributes.len()
        );

        Ok(EmberPipelineGl {
            device_context: device_context.clone(),
            pipeline_def: pipeline_def.clone(),
            program_id,
            gl_attributes,
            gl_rasterizer_state: (&pipeline_def.rasterizer_state).into(),
            gl_depth_stencil_state: (&pipeline_def.depth_state).into(),
            gl_blend_state: GlBlendState::new(
                &pipeline_def.blend_state,
                pipeline_def.color_formats.len(),
            ),
            gl_topology: pipeline_def.primitive_topology.gl_topology(),
        })
    }
}
