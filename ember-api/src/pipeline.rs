#[cfg(any(feature = "ember-dx12", test))]
use crate::dx12::EmberPipelineDx12;
#[cfg(any(feature = "ember-gl", test))]
use crate::gl::EmberPipelineGl;
use crate::EmberPipelineDef;

/// Immutable bundle of shader modules, fixed-function state, vertex layout and resource binding
/// layout. Backends translate the definition into native objects when the pipeline is
/// created.
#[derive(Debug)]
pub enum EmberPipeline {
    #[cfg(any(feature = "ember-gl", test))]
    Gl(EmberPipelineGl),
    #[cfg(any(feature = "ember-dx12", test))]
    Dx12(EmberPipelineDx12),
}

impl EmberPipeline {
    pub fn pipeline_def(&self) -> &EmberPipelineDef {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberPipeline::Gl(inner) => inner.pipeline_def(),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberPipeline::Dx12(inner) => inner.pipeline_def(),
        }
    }

    #[cfg(any(feature = "ember-gl", test))]
    pub fn gl_pipeline(&self) -> Option<&EmberPipelineGl> {
        match self {
            EmberPipeline::Gl(inner) => Some(inner),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberPipeline::Dx12(_) => None,
        }
    }

    #[cfg(any(feature = "ember-dx12", test))]
    pub fn dx12_pipeline(&self) -> Option<&EmberPipelineDx12> {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberPipeline::Gl(_) => None,
            EmberPipeline::Dx12(inner) => Some(inner),
        }
    }
}
