use crate::gl::{EmberDeviceContextGl, GlDeferredDestroy, ShaderId};
use crate::{EmberResult, EmberShaderPackage, EmberShaderStageFlags};

use crate::gl::gl43;

/// A compiled GLSL shader object
#[derive(Debug)]
pub struct EmberShaderModuleGl {
    device_context: EmberDeviceContextGl,
    shader_package: EmberShaderPackage,
    shader_id: ShaderId,
}

impl Drop for EmberShaderModuleGl {
    fn drop(&mut self) {
        self.device_context
            .destroy_later(GlDeferredDestroy::Shader(self.shader_id));
    }
}

impl EmberShaderModuleGl {
    pub fn shader_package(&self) -> &EmberShaderPackage {
        &self.shader_package
    }

    pub fn gl_shader_id(&self) -> ShaderId {
        self.shader_id
    }

    pub fn new(
        device_context: &EmberDeviceContextGl,
        shader_package: &EmberShaderPackage,
    ) -> EmberResult<Self> {
        let source = shader_package
            .gl
            .as_ref()
            .ok_or("The shader package has no GLSL source for the gl backend")?;

        let shader_type = if shader_package.stage == EmberShaderStageFlags::VERTEX {
            gl43::VERTEX_SHADER
        } else if shader_package.stage == EmberShaderStageFlags::FRAGMENT {
            gl43::FRAGMENT_SHADER
        } else {
            return Err(format!(
                "A gl shader module has exactly one stage, got {:?}",
                shader_package.stage
            ))?;
        };

        if shader_package.entry_point != "main" && !shader_package.entry_point.is_empty() {
            log::warn!(
                "GLSL entry points are always main, ignoring {}",
                shader_package.entry_point
            );
        }

        let shader_id = device_context
            .gl_context()
            .compile_shader(shader_type, source)?;

        Ok(EmberShaderModuleGl {
            device_context: device_context.clone(),
            shader_package: shader_package.clone(),
            shader_id,
        })
    }
}
