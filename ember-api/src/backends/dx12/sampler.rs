use crate::dx12::d3d12;
use crate::dx12::EmberDeviceContextDx12;
use crate::{EmberResult, EmberSamplerDef};

/// Samplers are descriptors in d3d12. The description is kept here and written into the sampler
/// heap by each resource set the sampler is bound to.
#[derive(Debug)]
pub struct EmberSamplerDx12 {
    sampler_def: EmberSamplerDef,
    sampler_desc: d3d12::D3D12_SAMPLER_DESC,
}

impl EmberSamplerDx12 {
    pub fn sampler_def(&self) -> &EmberSamplerDef {
        &self.sampler_def
    }

    pub fn dx12_sampler_desc(&self) -> &d3d12::D3D12_SAMPLER_DESC {
        &self.sampler_desc
    }

    pub fn new(
        _device_context: &EmberDeviceContextDx12,
        sampler_def: &EmberSamplerDef,
    ) -> EmberResult<EmberSamplerDx12> {
        Ok(EmberSamplerDx12 {
            sampler_def: sampler_def.clone(),
            sampler_desc: sampler_def.into(),
        })
    }
}
