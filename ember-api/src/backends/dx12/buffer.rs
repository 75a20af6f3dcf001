use crate::dx12::d3d12;
use crate::dx12::EmberDeviceContextDx12;
use crate::{EmberBufferDef, EmberResult};

/// Buffers live in an upload heap, readable by the GPU and writable from the CPU at any time
#[derive(Debug)]
pub struct EmberBufferDx12 {
    device_context: EmberDeviceContextDx12,
    buffer_def: EmberBufferDef,
    resource: d3d12::Dx12Resource,
    // Constant buffer views cover whole 256-byte blocks
    allocation_size: u64,
}

impl EmberBufferDx12 {
    pub fn buffer_def(&self) -> &EmberBufferDef {
        &self.buffer_def
    }

    pub fn dx12_resource(&self) -> &d3d12::Dx12Resource {
        &self.resource
    }

    pub fn gpu_address(&self) -> d3d12::D3D12_GPU_VIRTUAL_ADDRESS {
        self.resource.gpu_virtual_address()
    }

    pub(crate) fn allocation_size(&self) -> u64 {
        self.allocation_size
    }

    pub fn copy_to_buffer(
        &self,
        buffer_byte_offset: u64,
        data: &[u8],
    ) -> EmberResult<()> {
        let end = buffer_byte_offset + data.len() as u64;
        if end > self.buffer_def.size {
            Err(format!(
                "Cannot copy {} bytes at offset {} into a buffer of {} bytes",
                data.len(),
                buffer_byte_offset,
                self.buffer_def.size
            ))?;
        }

        let mut mapped = self.resource.map()?;
        mapped[buffer_byte_offset as usize..end as usize].copy_from_slice(data);
        Ok(())
    }

    pub fn new(
        device_context: &EmberDeviceContextDx12,
        buffer_def: &EmberBufferDef,
    ) -> EmberResult<Self> {
        buffer_def.verify()?;

        let mut allocation_size = buffer_def.size;
        if buffer_def.resource_type.is_uniform_buffer() {
            allocation_size = ember_base::memory::round_size_up_to_alignment_u64(
                buffer_def.size,
                device_context
                    .device_info()
                    .min_uniform_buffer_offset_alignment as u64,
            );
        }

        let resource = device_context.dx12_device().create_committed_resource(
            d3d12::D3D12_HEAP_TYPE_UPLOAD,
            &d3d12::D3D12_RESOURCE_DESC::buffer(allocation_size),
            d3d12::D3D12_RESOURCE_STATE_GENERIC_READ,
        )?;
        resource.set_name(&format!("Buffer {:?}", buffer_def.resource_type));

        log::trace!(
            "Created dx12 buffer {:?} of {} bytes for {:?}",
            resource,
            allocation_size,
            buffer_def.resource_type
        );

        Ok(EmberBufferDx12 {
            device_context: device_context.clone(),
            buffer_def: buffer_def.clone(),
            resource,
            allocation_size,
        })
    }
}
