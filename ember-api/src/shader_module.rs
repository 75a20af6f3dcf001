#[cfg(any(feature = "ember-dx12", test))]
use crate::dx12::EmberShaderModuleDx12;
#[cfg(any(feature = "ember-gl", test))]
use crate::gl::EmberShaderModuleGl;
use crate::EmberShaderPackage;

/// Compiled shader code for one stage. Created from an `EmberShaderPackage`, of which each
/// backend consumes the form it understands: GLSL source for gl, a DXBC/DXIL container for dx12.
#[derive(Debug)]
pub enum EmberShaderModule {
    #[cfg(any(feature = "ember-gl", test))]
    Gl(EmberShaderModuleGl),
    #[cfg(any(feature = "ember-dx12", test))]
    Dx12(EmberShaderModuleDx12),
}

impl EmberShaderModule {
    pub fn shader_package(&self) -> &EmberShaderPackage {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberShaderModule::Gl(inner) => inner.shader_package(),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberShaderModule::Dx12(inner) => inner.shader_package(),
        }
    }

    #[cfg(any(feature = "ember-gl", test))]
    pub fn gl_shader_module(&self) -> Option<&EmberShaderModuleGl> {
        match self {
            EmberShaderModule::Gl(inner) => Some(inner),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberShaderModule::Dx12(_) => None,
        }
    }

    #[cfg(any(feature = "ember-dx12", test))]
    pub fn dx12_shader_module(&self) -> Option<&EmberShaderModuleDx12> {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberShaderModule::Gl(_) => None,
            EmberShaderModule::Dx12(inner) => Some(inner),
        }
    }
}
