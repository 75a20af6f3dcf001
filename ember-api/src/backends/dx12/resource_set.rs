use crate::dx12::d3d12;
use crate::dx12::{Dx12DescriptorAllocation, EmberDeviceContextDx12};
use crate::resource_set::EmberLinearBindingTable;
use crate::{
    EmberBuffer, EmberResourceBindingType, EmberResourceSetDef, EmberResult, EmberSampler,
    EmberTexture,
};
use std::sync::{Arc, Mutex, MutexGuard};

/// A resource written to a binding. Descriptors do not keep resources alive, so the set holds a
/// reference until the binding is overwritten.
#[derive(Clone, Debug)]
pub(crate) enum Dx12BoundResource {
    UniformBuffer(Arc<EmberBuffer>),
    CombinedImageSampler {
        texture: Arc<EmberTexture>,
        sampler: Arc<EmberSampler>,
    },
}

/// Descriptors live in the shader visible heaps. The CBV/SRV table holds one descriptor per
/// binding at its resource index, and the sampler table holds one per combined image sampler.
/// The layout matches the root signature of any pipeline built from the same definition.
#[derive(Debug)]
pub struct EmberResourceSetDx12 {
    device_context: EmberDeviceContextDx12,
    resource_set_def: EmberResourceSetDef,
    binding_table: EmberLinearBindingTable,
    cbv_srv_descriptors: Option<Dx12DescriptorAllocation>,
    sampler_descriptors: Option<Dx12DescriptorAllocation>,
    // Offset into the sampler table, per binding
    sampler_offsets: Vec<Option<u32>>,
    resources: Mutex<Vec<Option<Dx12BoundResource>>>,
}

impl EmberResourceSetDx12 {
    pub fn resource_set_def(&self) -> &EmberResourceSetDef {
        &self.resource_set_def
    }

    pub(crate) fn binding_table(&self) -> &EmberLinearBindingTable {
        &self.binding_table
    }

    pub(crate) fn bound_resources(&self) -> MutexGuard<Vec<Option<Dx12BoundResource>>> {
        self.resources.lock().unwrap()
    }

    pub fn cbv_srv_table(&self) -> Option<d3d12::D3D12_GPU_DESCRIPTOR_HANDLE> {
        self.cbv_srv_descriptors
            .as_ref()
            .and_then(|descriptors| descriptors.gpu_handle())
    }

    pub fn sampler_table(&self) -> Option<d3d12::D3D12_GPU_DESCRIPTOR_HANDLE> {
        self.sampler_descriptors
            .as_ref()
            .and_then(|descriptors| descriptors.gpu_handle())
    }

    pub fn new(
        device_context: &EmberDeviceContextDx12,
        resource_set_def: &EmberResourceSetDef,
    ) -> EmberResult<Self> {
        let binding_table = EmberLinearBindingTable::new(resource_set_def)?;

        let mut sampler_count = 0;
        let mut sampler_offsets = Vec::with_capacity(binding_table.bindings().len());
        for binding in binding_table.bindings() {
            if binding.binding_type == EmberResourceBindingType::CombinedImageSampler {
                sampler_offsets.push(Some(sampler_count));
                sampler_count += 1;
            } else {
                sampler_offsets.push(None);
            }
        }

        let descriptor_heaps = device_context.descriptor_heaps();
        let binding_count = binding_table.bindings().len() as u32;
        let cbv_srv_descriptors = if binding_count > 0 {
            Some(
                descriptor_heaps
                    .gpu_cbv_srv_uav_heap
                    .allocate(binding_count)?,
            )
        } else {
            None
        };
        let sampler_descriptors = if sampler_count > 0 {
            Some(descriptor_heaps.gpu_sampler_heap.allocate(sampler_count)?)
        } else {
            None
        };

        log::trace!(
            "Created dx12 resource set with {} bindings and {} samplers",
            binding_count,
            sampler_count
        );

        let resources = vec![None; binding_table.bindings().len()];
        Ok(EmberResourceSetDx12 {
            device_context: device_context.clone(),
            resource_set_def: resource_set_def.clone(),
            binding_table,
            cbv_srv_descriptors,
            sampler_descriptors,
            sampler_offsets,
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

        let dx12_buffer = buffer.dx12_buffer().ok_or(
            "Only buffers created by the dx12 backend can be written to a dx12 resource set",
        )?;

        // A binding exists, so the table was allocated
        if let Some(descriptors) = &self.cbv_srv_descriptors {
            self.device_context.dx12_device().create_constant_buffer_view(
                &d3d12::D3D12_CONSTANT_BUFFER_VIEW_DESC {
                    BufferLocation: dx12_buffer.gpu_address(),
                    SizeInBytes: dx12_buffer.allocation_size() as u32,
                },
                descriptors.cpu_handle(binding.resource_index),
            );
        }

        self.resources.lock().unwrap()[binding.resource_index as usize] =
            Some(Dx12BoundResource::UniformBuffer(buffer.clone()));
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

        let (dx12_texture, dx12_sampler) = match (texture.dx12_texture(), sampler.dx12_sampler()) {
            (Some(dx12_texture), Some(dx12_sampler)) => (dx12_texture, dx12_sampler),
            _ => Err("Only textures and samplers created by the dx12 backend can be written to a dx12 resource set")?,
        };

        let device = self.device_context.dx12_device();
        if let Some(descriptors) = &self.cbv_srv_descriptors {
            device.create_shader_resource_view(
                dx12_texture.dx12_resource(),
                &d3d12::D3D12_SHADER_RESOURCE_VIEW_DESC {
                    Format: dx12_texture.dxgi_format(),
                    MostDetailedMip: 0,
                    MipLevels: u32::MAX,
                },
                descriptors.cpu_handle(binding.resource_index),
            );
        }

        let binding_index = binding.resource_index as usize;
        if let (Some(descriptors), Some(sampler_offset)) =
            (&self.sampler_descriptors, self.sampler_offsets[binding_index])
        {
            device.create_sampler(
                dx12_sampler.dx12_sampler_desc(),
                descriptors.cpu_handle(sampler_offset),
            );
        }

        self.resources.lock().unwrap()[binding_index] =
            Some(Dx12BoundResource::CombinedImageSampler {
                texture: texture.clone(),
                sampler: sampler.clone(),
            });
        Ok(())
    }
}
