use super::descriptor_heap::{
    Descriptor, WeakDescriptorHeap, DESCRIPTOR_HANDLE_INCREMENT, HEAP_HANDLE_SPACE_BITS,
};
use super::resource::WeakResource;
use super::*;
use fnv::FnvHashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// Dead registry entries are pruned every time this many objects have been created
const REGISTRY_PRUNE_INTERVAL: u64 = 64;

const CONSTANT_BUFFER_VIEW_ALIGNMENT: u32 = 256;

struct Dx12DeviceInner {
    debug_layer: bool,
    next_resource_id: AtomicU64,
    // Heap 0 would own handle 0, which is reserved for null handles
    next_heap_index: AtomicUsize,
    resources: Mutex<FnvHashMap<u64, WeakResource>>,
    heaps: Mutex<FnvHashMap<usize, WeakDescriptorHeap>>,
    stored_messages: AtomicU64,
}

#[derive(Clone)]
pub struct Dx12Device {
    inner: Arc<Dx12DeviceInner>,
}

impl std::fmt::Debug for Dx12Device {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        f.debug_struct("Dx12Device")
            .field("debug_layer", &self.inner.debug_layer)
            .finish()
    }
}

/// Create a device. The debug layer validates resource states as work executes.
pub fn create_device(debug_layer: bool) -> D3dResult<Dx12Device> {
    Ok(Dx12Device {
        inner: Arc::new(Dx12DeviceInner {
            debug_layer,
            next_resource_id: AtomicU64::new(1),
            next_heap_index: AtomicUsize::new(1),
            resources: Default::default(),
            heaps: Default::default(),
            stored_messages: AtomicU64::new(0),
        }),
    })
}

fn is_valid_shader_bytecode(bytecode: &[u8]) -> bool {
    bytecode.len() > 4 && &bytecode[0..4] == b"DXBC"
}

impl Dx12Device {
    pub fn create_committed_resource(
        &self,
        heap_type: D3D12_HEAP_TYPE,
        desc: &D3D12_RESOURCE_DESC,
        initial_state: D3D12_RESOURCE_STATES,
    ) -> D3dResult<Dx12Resource> {
        let id = self.inner.next_resource_id.fetch_add(1, Ordering::Relaxed);
        let resource = Dx12Resource::new(id, heap_type, desc, initial_state)?;

        let mut resources = self.inner.resources.lock().unwrap();
        if id % REGISTRY_PRUNE_INTERVAL == 0 {
            resources.retain(|_, resource| resource.upgrade().is_some());
        }
        resources.insert(id, resource.downgrade());
        Ok(resource)
    }

    pub fn create_descriptor_heap(
        &self,
        desc: &D3D12_DESCRIPTOR_HEAP_DESC,
    ) -> D3dResult<Dx12DescriptorHeap> {
        let heap_index = self.inner.next_heap_index.fetch_add(1, Ordering::Relaxed);
        if heap_index >= (usize::MAX >> HEAP_HANDLE_SPACE_BITS) {
            return Err(E_OUTOFMEMORY);
        }

        let heap = Dx12DescriptorHeap::new(heap_index, desc)?;
        let mut heaps = self.inner.heaps.lock().unwrap();
        if heap_index as u64 % REGISTRY_PRUNE_INTERVAL == 0 {
            heaps.retain(|_, heap| heap.upgrade().is_some());
        }
        heaps.insert(heap.base(), heap.downgrade());
        Ok(heap)
    }

    pub fn descriptor_handle_increment_size(
        &self,
        _heap_type: D3D12_DESCRIPTOR_HEAP_TYPE,
    ) -> u32 {
        DESCRIPTOR_HANDLE_INCREMENT
    }

    pub fn create_constant_buffer_view(
        &self,
        desc: &D3D12_CONSTANT_BUFFER_VIEW_DESC,
        dest: D3D12_CPU_DESCRIPTOR_HANDLE,
    ) {
        if desc.SizeInBytes % CONSTANT_BUFFER_VIEW_ALIGNMENT != 0
            || desc.BufferLocation % CONSTANT_BUFFER_VIEW_ALIGNMENT as u64 != 0
        {
            self.report(&format!(
                "CreateConstantBufferView: size {} and location 0x{:X} must be multiples of {}",
                desc.SizeInBytes, desc.BufferLocation, CONSTANT_BUFFER_VIEW_ALIGNMENT
            ));
            return;
        }

        self.write_descriptor(dest, Some(Descriptor::ConstantBufferView(*desc)));
    }

    pub fn create_shader_resource_view(
        &self,
        resource: &Dx12Resource,
        desc: &D3D12_SHADER_RESOURCE_VIEW_DESC,
        dest: D3D12_CPU_DESCRIPTOR_HANDLE,
    ) {
        let resource_desc = resource.desc();
        if resource_desc.Dimension != D3D12_RESOURCE_DIMENSION_TEXTURE2D
            || desc.MostDetailedMip >= resource_desc.MipLevels as u32
        {
            self.report("CreateShaderResourceView: only 2D texture mips can be viewed");
            return;
        }

        self.write_descriptor(
            dest,
            Some(Descriptor::ShaderResourceView {
                resource: resource.downgrade(),
                desc: *desc,
            }),
        );
    }

    pub fn create_sampler(
        &self,
        desc: &D3D12_SAMPLER_DESC,
        dest: D3D12_CPU_DESCRIPTOR_HANDLE,
    ) {
        self.write_descriptor(dest, Some(Descriptor::Sampler(*desc)));
    }

    pub fn create_render_target_view(
        &self,
        resource: &Dx12Resource,
        desc: &D3D12_RENDER_TARGET_VIEW_DESC,
        dest: D3D12_CPU_DESCRIPTOR_HANDLE,
    ) {
        let resource_desc = resource.desc();
        if resource_desc.Flags & D3D12_RESOURCE_FLAG_ALLOW_RENDER_TARGET == 0
            || desc.MipSlice >= resource_desc.subresource_count()
        {
            self.report(&format!(
                "CreateRenderTargetView: {:?} does not allow render targets",
                resource
            ));
            return;
        }

        self.write_descriptor(
            dest,
            Some(Descriptor::RenderTargetView {
                resource: resource.downgrade(),
                desc: *desc,
            }),
        );
    }

    pub fn create_depth_stencil_view(
        &self,
        resource: &Dx12Resource,
        desc: &D3D12_DEPTH_STENCIL_VIEW_DESC,
        dest: D3D12_CPU_DESCRIPTOR_HANDLE,
    ) {
        let resource_desc = resource.desc();
        if resource_desc.Flags & D3D12_RESOURCE_FLAG_ALLOW_DEPTH_STENCIL == 0
            || desc.MipSlice >= resource_desc.subresource_count()
        {
            self.report(&format!(
                "CreateDepthStencilView: {:?} does not allow depth stencil",
                resource
            ));
            return;
        }

        self.write_descriptor(
            dest,
            Some(Descriptor::DepthStencilView {
                resource: resource.downgrade(),
                desc: *desc,
            }),
        );
    }

    pub fn copy_descriptors_simple(
        &self,
        num_descriptors: u32,
        dest_start: D3D12_CPU_DESCRIPTOR_HANDLE,
        src_start: D3D12_CPU_DESCRIPTOR_HANDLE,
        heap_type: D3D12_DESCRIPTOR_HEAP_TYPE,
    ) {
        for i in 0..num_descriptors as usize {
            let offset = i * DESCRIPTOR_HANDLE_INCREMENT as usize;
            let src = D3D12_CPU_DESCRIPTOR_HANDLE {
                ptr: src_start.ptr + offset,
            };
            let dest = D3D12_CPU_DESCRIPTOR_HANDLE {
                ptr: dest_start.ptr + offset,
            };

            let descriptor = self.resolve_cpu_descriptor(src);
            if let Some(descriptor) = &descriptor {
                if descriptor.heap_type() != heap_type {
                    self.report("CopyDescriptorsSimple: descriptor heap type mismatch");
                    return;
                }
            }
            self.write_descriptor(dest, descriptor);
        }
    }

    /// A descriptor table may not mix samplers with other descriptors
    pub fn create_root_signature(
        &self,
        desc: &Dx12RootSignatureDesc,
    ) -> D3dResult<Dx12RootSignature> {
        for parameter in &desc.Parameters {
            let sampler_ranges = parameter
                .DescriptorRanges
                .iter()
                .filter(|range| range.RangeType == D3D12_DESCRIPTOR_RANGE_TYPE_SAMPLER)
                .count();
            if sampler_ranges != 0 && sampler_ranges != parameter.DescriptorRanges.len() {
                return Err(E_INVALIDARG);
            }

            if parameter
                .DescriptorRanges
                .iter()
                .any(|range| range.NumDescriptors == 0)
            {
                return Err(E_INVALIDARG);
            }
        }

        Ok(Dx12RootSignature::new(desc.clone()))
    }

    pub fn create_graphics_pipeline_state(
        &self,
        desc: &Dx12GraphicsPipelineDesc,
    ) -> D3dResult<Dx12PipelineState> {
        if desc.pRootSignature.is_none() {
            return Err(E_INVALIDARG);
        }

        if !is_valid_shader_bytecode(&desc.VS) || !is_valid_shader_bytecode(&desc.PS) {
            return Err(E_INVALIDARG);
        }

        if desc.NumRenderTargets as usize > D3D12_SIMULTANEOUS_RENDER_TARGET_COUNT {
            return Err(E_INVALIDARG);
        }

        for format in &desc.RTVFormats[0..desc.NumRenderTargets as usize] {
            match dxgi_texel_format(*format) {
                Some(texel_format) if !texel_format.is_depth() => {}
                _ => return Err(E_INVALIDARG),
            }
        }

        if desc.DSVFormat != DXGI_FORMAT_UNKNOWN {
            match dxgi_texel_format(desc.DSVFormat) {
                Some(texel_format) if texel_format.is_depth() => {}
                _ => return Err(E_INVALIDARG),
            }
        }

        for element in &desc.InputLayout {
            if dxgi_texel_format(element.Format).is_none() {
                return Err(E_INVALIDARG);
            }
        }

        Ok(Dx12PipelineState::new(desc.clone()))
    }

    pub fn create_command_queue(&self) -> D3dResult<Dx12CommandQueue> {
        Dx12CommandQueue::new(self.clone())
    }

    pub fn create_command_list(&self) -> D3dResult<Dx12CommandList> {
        Ok(Dx12CommandList::new(self.clone()))
    }

    pub fn create_fence(
        &self,
        initial_value: u64,
    ) -> D3dResult<Dx12Fence> {
        Ok(Dx12Fence::new(initial_value))
    }

    pub fn create_query_heap(
        &self,
        desc: &D3D12_QUERY_HEAP_DESC,
    ) -> D3dResult<Dx12QueryHeap> {
        Dx12QueryHeap::new(desc)
    }

    /// Layout of texture subresources copied into a buffer. Rows are padded to
    /// D3D12_TEXTURE_DATA_PITCH_ALIGNMENT and subresources placed at
    /// D3D12_TEXTURE_DATA_PLACEMENT_ALIGNMENT. Returns the footprints and the total size.
    pub fn copyable_footprints(
        &self,
        desc: &D3D12_RESOURCE_DESC,
        first_subresource: u32,
        num_subresources: u32,
        base_offset: u64,
    ) -> D3dResult<(Vec<D3D12_PLACED_SUBRESOURCE_FOOTPRINT>, u64)> {
        let texel_format = dxgi_texel_format(desc.Format).ok_or(E_INVALIDARG)?;
        let texel_size = texel_format.size_in_bytes().map_err(|_| E_INVALIDARG)?;
        if first_subresource + num_subresources > desc.subresource_count() {
            return Err(E_INVALIDARG);
        }

        let mut footprints = Vec::with_capacity(num_subresources as usize);
        let mut offset = base_offset;
        for subresource in first_subresource..first_subresource + num_subresources {
            offset = ember_base::memory::round_size_up_to_alignment_u64(
                offset,
                D3D12_TEXTURE_DATA_PLACEMENT_ALIGNMENT,
            );
            let width = ((desc.Width >> subresource) as u32).max(1);
            let height = (desc.Height >> subresource).max(1);
            let row_pitch = ember_base::memory::round_size_up_to_alignment_u32(
                width * texel_size,
                D3D12_TEXTURE_DATA_PITCH_ALIGNMENT,
            );

            footprints.push(D3D12_PLACED_SUBRESOURCE_FOOTPRINT {
                Offset: offset,
                Footprint: D3D12_SUBRESOURCE_FOOTPRINT {
                    Format: desc.Format,
                    Width: width,
                    Height: height,
                    RowPitch: row_pitch,
                },
            });
            offset += row_pitch as u64 * height as u64;
        }

        Ok((footprints, offset - base_offset))
    }

    pub fn adapter_name(&self) -> String {
        "Ember D3D12 software device".to_string()
    }

    /// Number of messages the debug layer has reported
    pub fn stored_message_count(&self) -> u64 {
        self.inner.stored_messages.load(Ordering::Relaxed)
    }

    pub(super) fn debug_layer_enabled(&self) -> bool {
        self.inner.debug_layer
    }

    pub(super) fn report(
        &self,
        message: &str,
    ) {
        log::error!("D3D12 ERROR: {}", message);
        self.inner.stored_messages.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn resolve_descriptor_heap(
        &self,
        ptr: usize,
    ) -> Option<(Dx12DescriptorHeap, usize)> {
        let base = (ptr >> HEAP_HANDLE_SPACE_BITS) << HEAP_HANDLE_SPACE_BITS;
        let heap = self.inner.heaps.lock().unwrap().get(&base)?.upgrade()?;
        let index = heap.index_of(ptr)?;
        Some((heap, index))
    }

    pub(super) fn resolve_cpu_descriptor(
        &self,
        handle: D3D12_CPU_DESCRIPTOR_HANDLE,
    ) -> Option<Descriptor> {
        let (heap, index) = self.resolve_descriptor_heap(handle.ptr)?;
        heap.read(index)
    }

    /// The buffer an address points into and the offset within it
    pub(super) fn resolve_gpu_address(
        &self,
        address: D3D12_GPU_VIRTUAL_ADDRESS,
    ) -> Option<(Dx12Resource, u64)> {
        let id = address >> 32;
        let resource = self.inner.resources.lock().unwrap().get(&id)?.upgrade()?;
        Some((resource, address & 0xffff_ffff))
    }

    fn write_descriptor(
        &self,
        dest: D3D12_CPU_DESCRIPTOR_HANDLE,
        descriptor: Option<Descriptor>,
    ) {
        let result = match self.resolve_descriptor_heap(dest.ptr) {
            Some((heap, index)) => heap.write(index, descriptor),
            None => Err(E_INVALIDARG),
        };

        if result.is_err() {
            self.report(&format!(
                "Descriptor handle 0x{:X} is not a valid destination",
                dest.ptr
            ));
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_copyable_footprints_are_aligned() {
        let device = create_device(true).unwrap();
        let desc = D3D12_RESOURCE_DESC {
            Dimension: D3D12_RESOURCE_DIMENSION_TEXTURE2D,
            Width: 3,
            Height: 2,
            MipLevels: 2,
            Format: DXGI_FORMAT_R8G8B8A8_UNORM,
            SampleDesc: Default::default(),
            Flags: D3D12_RESOURCE_FLAG_NONE,
        };

        let (footprints, total) = device.copyable_footprints(&desc, 0, 2, 0).unwrap();
        assert_eq!(footprints[0].Offset, 0);
        assert_eq!(footprints[0].Footprint.RowPitch, 256);
        assert_eq!(footprints[1].Offset, 512);
        assert_eq!(footprints[1].Footprint.Width, 1);
        assert_eq!(total, 512 + 256);
    }

    #[test]
    fn test_root_signature_rejects_mixed_sampler_tables() {
        let device = create_device(true).unwrap();
        let range = |range_type| D3D12_DESCRIPTOR_RANGE {
            RangeType: range_type,
            NumDescriptors: 1,
            BaseShaderRegister: 0,
            RegisterSpace: 0,
            OffsetInDescriptorsFromTableStart: D3D12_DESCRIPTOR_RANGE_OFFSET_APPEND,
        };

        let mixed = Dx12RootSignatureDesc {
            Parameters: vec![Dx12RootParameter {
                DescriptorRanges: vec![
                    range(D3D12_DESCRIPTOR_RANGE_TYPE_CBV),
                    range(D3D12_DESCRIPTOR_RANGE_TYPE_SAMPLER),
                ],
                ShaderVisibility: D3D12_SHADER_VISIBILITY_ALL,
            }],
            Flags: D3D12_ROOT_SIGNATURE_FLAG_ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT,
        };
        assert_eq!(device.create_root_signature(&mixed).err(), Some(E_INVALIDARG));
    }

    #[test]
    fn test_views_resolve_through_handles() {
        let device = create_device(true).unwrap();
        let heap = device
            .create_descriptor_heap(&D3D12_DESCRIPTOR_HEAP_DESC {
                Type: D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV,
                NumDescriptors: 2,
                Flags: D3D12_DESCRIPTOR_HEAP_FLAG_SHADER_VISIBLE,
            })
            .unwrap();
        let buffer = device
            .create_committed_resource(
                D3D12_HEAP_TYPE_UPLOAD,
                &D3D12_RESOURCE_DESC::buffer(256),
                D3D12_RESOURCE_STATE_GENERIC_READ,
            )
            .unwrap();

        let start = heap.cpu_handle_for_heap_start();
        let increment =
            device.descriptor_handle_increment_size(D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV);
        let second = D3D12_CPU_DESCRIPTOR_HANDLE {
            ptr: start.ptr + increment as usize,
        };
        device.create_constant_buffer_view(
            &D3D12_CONSTANT_BUFFER_VIEW_DESC {
                BufferLocation: buffer.gpu_virtual_address(),
                SizeInBytes: 256,
            },
            second,
        );
        assert_eq!(device.stored_message_count(), 0);
        assert!(device.resolve_cpu_descriptor(start).is_none());
        assert!(matches!(
            device.resolve_cpu_descriptor(second),
            Some(Descriptor::ConstantBufferView(_))
        ));

        let (resolved, offset) = device
            .resolve_gpu_address(buffer.gpu_virtual_address() + 16)
            .unwrap();
        assert_eq!(resolved, buffer);
        assert_eq!(offset, 16);

        // Unaligned views are reported and not written
        device.create_constant_buffer_view(
            &D3D12_CONSTANT_BUFFER_VIEW_DESC {
                BufferLocation: buffer.gpu_virtual_address(),
                SizeInBytes: 16,
            },
            start,
        );
        assert_eq!(device.stored_message_count(), 1);
        assert!(device.resolve_cpu_descriptor(start).is_none());
    }
}
