use crate::gl::EmberDeviceContextGl;
use crate::resource_set::EmberLinearBindingTable;
use crate::{
    EmberBuffer, EmberResourceBindingType, EmberResourceSetDef, EmberResult, EmberSampler,
    EmberTexture,
};
use std::sync::{Arc, Mutex, MutexGuard};

/// A resource written to a binding. The set holds a reference until the binding is overwritten.
#[derive(Clone, Debug)]
pub(crate) enum GlBoundResource {
    UniformBuffer(Arc<EmberBuffer>),
    CombinedImageSampler {
        texture: Arc<EmberTexture>,
        sampler: Arc<EmberSampler>,
    },
}

/// GL has no descriptor objects. Written resources are kept per resource index and bound by
/// binding name (uniform block or sampler uniform) when a draw is replayed.
#[derive(Debug)]
pub struct EmberResourceSetGl {
    device_context: EmberDeviceContextGl,
    resource_set_def: EmberResourceSetDef,
    binding_table: EmberLinearBindingTable,
    resources: Mutex<Vec<Option<GlBoundResource>>>,
}

impl EmberResourceSetGl {
    pub fn resource_set_def(&self) -> &EmberResourceSetDef {
        &self.resource_set_def
    }

    pub(crate) fn binding_table(&self) -> &EmberLinearBindingTable {
        &self.binding_table
    }

    pub(crate) fn bound_resources(&self) -> MutexGuard<Vec<Option<GlBoundResource>>> {
        self.resources.lock().unwrap()
    }

    pub fn new(
        device_context: &EmberDeviceContextGl,
        resource_set_def: &EmberResourceSetDef,
    ) -> EmberResult<Self> {
        let binding_table = EmberLinearBindingTable::new(resource_set_def)?;
        let resources = vec![None; binding_table.bindings().len()];

        Ok(EmberResourceSetGl {
            device_context: device_context.clone(),
            resource_set_def: resource_set_def.clone(),
            binding_table,
            resources: Mutex::new(resources),
        })
    }

    pub fn write_uniform_buffer(
        &self,
        buffer: &Arc<EmberBuffer>,
        name: &str,
    ) -> EmberResult<()> {
        let binding = self
            .binding_table
            .find(name, EmberResourceBindingType::UniformBuffer)?;

        if buffer.gl_buffer().is_none() {
            Err("Only buffers created by the gl backend can be written to a gl resource set")?;
        }

        self.resources.lock().unwrap()[binding.resource_index as usize] =
            Some(GlBoundResource::UniformBuffer(buffer.clone()));
        Ok(())
    }

    pub fn write_combined_image_sampler(
        &self,
        texture: &Arc<EmberTexture>,
        sampler: &Arc<EmberSampler>,
        name: &str,
    ) -> EmberResult<()> {
        let binding = self
            .binding_table
            .find(name, EmberResourceBindingType::CombinedImageSampler)?;

        if texture.gl_texture().is_none() || sampler.gl_sampler().is_none() {
            Err("Only textures and samplers created by the gl backend can be written to a gl resource set")?;
        }

        self.resources.lock().unwrap()[binding.resource_index as usize] =
            Some(GlBoundResource::CombinedImageSampler {
                texture: texture.clone(),
                sampler: sampler.clone(),
            });
        Ok(())
    }
}
