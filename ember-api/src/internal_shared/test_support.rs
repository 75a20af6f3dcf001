// Helpers shared by the backend tests
use crate::*;
use raw_window_handle::{
    HasRawDisplayHandle, HasRawWindowHandle, RawDisplayHandle, RawWindowHandle,
    WebDisplayHandle, WebWindowHandle,
};
use std::sync::Arc;

/// A window that only exists as a handle. The test devices key surfaces by handle.
pub struct TestWindow(pub u32);

/// Window the test devices are created against
pub const DEVICE_WINDOW: TestWindow = TestWindow(0);

unsafe impl HasRawDisplayHandle for TestWindow {
    fn raw_display_handle(&self) -> RawDisplayHandle {
        RawDisplayHandle::Web(WebDisplayHandle::empty())
    }
}

unsafe impl HasRawWindowHandle for TestWindow {
    fn raw_window_handle(&self) -> RawWindowHandle {
        let mut handle = WebWindowHandle::empty();
        handle.id = self.0;
        RawWindowHandle::Web(handle)
    }
}

const VERTEX_SOURCE: &str = r#"
    #version 430
    layout(location = 0) in vec2 POSITION;
    layout(location = 1) in vec4 COLOR;
    out vec4 color;
    layout(std140) uniform Tint {
        vec4 tint;
    };
    void main() {
        color = COLOR * tint;
        gl_Position = vec4(POSITION, 0.0, 1.0);
    }
"#;

const FRAGMENT_SOURCE: &str = r#"
    #version 430
    in vec4 color;
    out vec4 out_color;
    void main() {
        out_color = color;
    }
"#;

fn dxbc_container(stage: &str) -> Vec<u8> {
    let mut container = b"DXBC".to_vec();
    container.extend_from_slice(stage.as_bytes());
    container
}

/// Shader packages carrying a form for every backend
pub fn vertex_color_shader_packages() -> (EmberShaderPackage, EmberShaderPackage) {
    (
        EmberShaderPackage {
            stage: EmberShaderStageFlags::VERTEX,
            entry_point: "main".to_string(),
            gl: Some(VERTEX_SOURCE.to_string()),
            dx12: Some(dxbc_container("vs_5_0")),
        },
        EmberShaderPackage {
            stage: EmberShaderStageFlags::FRAGMENT,
            entry_point: "main".to_string(),
            gl: Some(FRAGMENT_SOURCE.to_string()),
            dx12: Some(dxbc_container("ps_5_0")),
        },
    )
}

pub fn vertex_color_resource_set_def() -> EmberResourceSetDef {
    EmberResourceSetDef {
        bindings: vec![EmberResourceBinding {
            name: "Tint".to_string(),
            set: 0,
            binding: 0,
            binding_type: EmberResourceBindingType::UniformBuffer,
        }],
    }
}

/// POSITION (2 floats) followed by COLOR (4 floats)
pub fn vertex_color_layout() -> EmberVertexLayout {
    EmberVertexLayout {
        attributes: vec![
            EmberVertexLayoutAttribute {
                format: EmberFormat::R32G32_SFLOAT,
                buffer_index: 0,
                location: 0,
                byte_offset: 0,
                name: "POSITION".to_string(),
            },
            EmberVertexLayoutAttribute {
                format: EmberFormat::R32G32B32A32_SFLOAT,
                buffer_index: 0,
                location: 1,
                byte_offset: 8,
                name: "COLOR".to_string(),
            },
        ],
        buffers: vec![EmberVertexLayoutBuffer {
            stride: 24,
            rate: EmberVertexAttributeRate::Vertex,
        }],
    }
}

pub fn create_vertex_color_pipeline(
    device_context: &EmberDeviceContext,
    color_format: EmberFormat,
    depth_stencil_format: Option<EmberFormat>,
    sample_count: EmberSampleCount,
) -> EmberResult<Arc<EmberPipeline>> {
    let (vertex, fragment) = vertex_color_shader_packages();
    device_context.create_pipeline(&EmberPipelineDef {
        vertex_shader: device_context.create_shader_module(&vertex)?,
        fragment_shader: device_context.create_shader_module(&fragment)?,
        vertex_layout: vertex_color_layout(),
        blend_state: EmberBlendState::default_alpha_disabled(),
        depth_state: Default::default(),
        rasterizer_state: EmberRasterizerState {
            cull_mode: EmberCullMode::None,
            ..Default::default()
        },
        primitive_topology: EmberPrimitiveTopology::TriangleList,
        color_formats: vec![color_format],
        depth_stencil_format,
        sample_count,
        resource_set_def: vertex_color_resource_set_def(),
        render_target: None,
    })
}

/// One triangle covering the whole target in a single color
pub fn covering_triangle(color: [f32; 4]) -> Vec<f32> {
    let mut vertices = Vec::with_capacity(18);
    for position in &[[-1.0, -1.0], [3.0, -1.0], [-1.0, 3.0]] {
        vertices.extend_from_slice(position);
        vertices.extend_from_slice(&color);
    }
    vertices
}

/// A triangle covering only the top-left corner of the target, in normalized device
/// coordinates with Y up
pub fn top_left_triangle(color: [f32; 4]) -> Vec<f32> {
    let mut vertices = Vec::with_capacity(18);
    for position in &[[-1.0, 1.0], [-0.5, 1.0], [-1.0, 0.5]] {
        vertices.extend_from_slice(position);
        vertices.extend_from_slice(&color);
    }
    vertices
}

/// A tint of 1.0 in every channel
pub fn create_identity_tint(device_context: &EmberDeviceContext) -> EmberResult<Arc<EmberBuffer>> {
    let tint = [1.0f32; 4];
    device_context.create_uniform_buffer(
        &EmberBufferDef::for_uniform_buffer_data(&tint),
        Some(ember_base::memory::slice_as_bytes(&tint)),
    )
}

/// Every backend compiled into the crate
pub fn create_test_apis() -> Vec<EmberApi> {
    let mut apis = Vec::new();
    #[cfg(any(feature = "ember-gl", test))]
    apis.push(
        EmberApi::new_gl(
            &DEVICE_WINDOW,
            &DEVICE_WINDOW,
            &Default::default(),
            &Default::default(),
        )
        .unwrap(),
    );
    #[cfg(any(feature = "ember-dx12", test))]
    apis.push(EmberApi::new_dx12(&Default::default(), &Default::default()).unwrap());
    apis
}

pub const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
pub const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
pub const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

/// A color as R8G8B8A8_UNORM texels
pub fn rgba8(color: [f32; 4]) -> Vec<u8> {
    color.iter().map(|c| (c * 255.0).round() as u8).collect()
}

pub struct TriangleScene {
    pub pipeline: Arc<EmberPipeline>,
    pub vertex_buffer: Arc<EmberBuffer>,
    pub resource_set: Arc<EmberResourceSet>,
}

/// A vertex color pipeline drawing into R8G8B8A8_UNORM with the given vertices and an identity
/// tint
pub fn create_triangle_scene(
    device_context: &EmberDeviceContext,
    vertices: &[f32],
) -> TriangleScene {
    let pipeline = create_vertex_color_pipeline(
        device_context,
        EmberFormat::R8G8B8A8_UNORM,
        None,
        EmberSampleCount::SampleCount1,
    )
    .unwrap();
    let vertex_buffer = device_context
        .create_vertex_buffer(
            &EmberBufferDef::for_vertex_buffer_data(vertices),
            Some(ember_base::memory::slice_as_bytes(vertices)),
        )
        .unwrap();
    let tint = create_identity_tint(device_context).unwrap();
    let resource_set = device_context
        .create_resource_set_for_pipeline(&pipeline)
        .unwrap();
    resource_set.write_uniform_buffer(&tint, "Tint").unwrap();

    TriangleScene {
        pipeline,
        vertex_buffer,
        resource_set,
    }
}

pub fn rgba8_framebuffer_def(
    width: u32,
    height: u32,
) -> EmberFramebufferDef {
    EmberFramebufferDef {
        extents: EmberExtents2D { width, height },
        color_attachments: vec![EmberFramebufferAttachmentDef {
            format: EmberFormat::R8G8B8A8_UNORM,
        }],
        depth_stencil_format: None,
        sample_count: EmberSampleCount::SampleCount1,
    }
}
