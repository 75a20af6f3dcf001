#[cfg(any(feature = "ember-dx12", test))]
use crate::dx12::EmberSamplerDx12;
#[cfg(any(feature = "ember-gl", test))]
use crate::gl::EmberSamplerGl;
use crate::EmberSamplerDef;

/// Configures how images will be sampled by the GPU
#[derive(Debug)]
pub enum EmberSampler {
    #[cfg(any(feature = "ember-gl", test))]
    Gl(EmberSamplerGl),
    #[cfg(any(feature = "ember-dx12", test))]
    Dx12(EmberSamplerDx12),
}

impl EmberSampler {
    pub fn sampler_def(&self) -> &EmberSamplerDef {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberSampler::Gl(inner) => inner.sampler_def(),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberSampler::Dx12(inner) => inner.sampler_def(),
        }
    }

    #[cfg(any(feature = "ember-gl", test))]
    pub fn gl_sampler(&self) -> Option<&EmberSamplerGl> {
        match self {
            EmberSampler::Gl(inner) => Some(inner),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberSampler::Dx12(_) => None,
        }
    }

    #[cfg(any(feature = "ember-dx12", test))]
    pub fn dx12_sampler(&self) -> Option<&EmberSamplerDx12> {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberSampler::Gl(_) => None,
            EmberSampler::Dx12(inner) => Some(inner),
        }
    }
}
