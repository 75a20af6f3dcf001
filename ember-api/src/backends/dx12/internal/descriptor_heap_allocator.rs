use crate::dx12::d3d12;
use crate::EmberResult;
use std::sync::{Arc, Mutex};

// Resource sets write straight into the shader visible heaps, so these bound the number of
// descriptors alive at once
const CBV_SRV_UAV_DESCRIPTOR_COUNT: u32 = 4096;
const SAMPLER_DESCRIPTOR_COUNT: u32 = 2048;
const RTV_DESCRIPTOR_COUNT: u32 = 512;
const DSV_DESCRIPTOR_COUNT: u32 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dx12DescriptorId(pub u32);

impl Dx12DescriptorId {
    pub fn add_offset(
        self,
        offset: u32,
    ) -> Dx12DescriptorId {
        Dx12DescriptorId(self.0 + offset)
    }
}

struct Dx12DescriptorHeapInner {
    heap: d3d12::Dx12DescriptorHeap,
    heap_type: d3d12::D3D12_DESCRIPTOR_HEAP_TYPE,
    stride: u32,
    cpu_first_handle: d3d12::D3D12_CPU_DESCRIPTOR_HANDLE,
    gpu_first_handle: Option<d3d12::D3D12_GPU_DESCRIPTOR_HANDLE>,
    allocated_descriptors: Mutex<Vec<bool>>,
}

/// A fixed-size descriptor heap handing out contiguous ranges, first fit
#[derive(Clone)]
pub struct Dx12DescriptorHeap {
    inner: Arc<Dx12DescriptorHeapInner>,
}

impl std::fmt::Debug for Dx12DescriptorHeap {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        f.debug_struct("Dx12DescriptorHeap")
            .field("heap_type", &self.inner.heap_type)
            .field("shader_visible", &self.inner.gpu_first_handle.is_some())
            .finish()
    }
}

fn find_free_range(
    allocated_descriptors: &[bool],
    count: u32,
) -> Option<u32> {
    let mut free_count = 0;
    let mut free_range_begin = 0;
    for (i, allocated) in allocated_descriptors.iter().enumerate() {
        if *allocated {
            free_count = 0;
            free_range_begin = i as u32 + 1;
        } else {
            free_count += 1;
            if free_count >= count {
                return Some(free_range_begin);
            }
        }
    }

    None
}

impl Dx12DescriptorHeap {
    pub fn new(
        device: &d3d12::Dx12Device,
        heap_type: d3d12::D3D12_DESCRIPTOR_HEAP_TYPE,
        descriptor_count: u32,
        shader_visible: bool,
    ) -> EmberResult<Self> {
        let mut heap_desc = d3d12::D3D12_DESCRIPTOR_HEAP_DESC {
            Type: heap_type,
            NumDescriptors: descriptor_count,
            Flags: d3d12::D3D12_DESCRIPTOR_HEAP_FLAG_NONE,
        };

        if shader_visible {
            heap_desc.Flags |= d3d12::D3D12_DESCRIPTOR_HEAP_FLAG_SHADER_VISIBLE;
        }

        let heap = device.create_descriptor_heap(&heap_desc)?;
        let cpu_first_handle = heap.cpu_handle_for_heap_start();
        let gpu_first_handle = if shader_visible {
            Some(heap.gpu_handle_for_heap_start())
        } else {
            None
        };

        log::trace!(
            "Created descriptor heap {:?} shader_visible: {}",
            heap_desc,
            shader_visible
        );

        Ok(Dx12DescriptorHeap {
            inner: Arc::new(Dx12DescriptorHeapInner {
                stride: device.descriptor_handle_increment_size(heap_type),
                heap,
                heap_type,
                cpu_first_handle,
                gpu_first_handle,
                allocated_descriptors: Mutex::new(vec![false; descriptor_count as usize]),
            }),
        })
    }

    pub fn heap_type(&self) -> d3d12::D3D12_DESCRIPTOR_HEAP_TYPE {
        self.inner.heap_type
    }

    pub fn dx12_heap(&self) -> &d3d12::Dx12DescriptorHeap {
        &self.inner.heap
    }

    /// Reserve `count` consecutive descriptors. They are released when the allocation drops.
    pub fn allocate(
        &self,
        count: u32,
    ) -> EmberResult<Dx12DescriptorAllocation> {
        if count == 0 {
            Err("Cannot allocate zero descriptors")?;
        }

        let mut allocated_descriptors = self.inner.allocated_descriptors.lock().unwrap();
        let first = find_free_range(&allocated_descriptors, count).ok_or_else(|| {
            format!(
                "Descriptor heap of type {} has no room for {} more descriptors",
                self.inner.heap_type, count
            )
        })?;

        for allocated in &mut allocated_descriptors[first as usize..(first + count) as usize] {
            *allocated = true;
        }

        Ok(Dx12DescriptorAllocation {
            heap: self.clone(),
            first: Dx12DescriptorId(first),
            count,
        })
    }

    fn free(
        &self,
        first_descriptor: Dx12DescriptorId,
        count: u32,
    ) {
        let mut allocated_descriptors = self.inner.allocated_descriptors.lock().unwrap();
        for i in first_descriptor.0..(first_descriptor.0 + count) {
            debug_assert!(allocated_descriptors[i as usize]);
            allocated_descriptors[i as usize] = false;
        }
    }

    pub fn id_to_cpu_handle(
        &self,
        id: Dx12DescriptorId,
    ) -> d3d12::D3D12_CPU_DESCRIPTOR_HANDLE {
        d3d12::D3D12_CPU_DESCRIPTOR_HANDLE {
            ptr: self.inner.cpu_first_handle.ptr + (id.0 * self.inner.stride) as usize,
        }
    }

    /// None for heaps that are not shader visible
    pub fn id_to_gpu_handle(
        &self,
        id: Dx12DescriptorId,
    ) -> Option<d3d12::D3D12_GPU_DESCRIPTOR_HANDLE> {
        self.inner
            .gpu_first_handle
            .map(|gpu_first_handle| d3d12::D3D12_GPU_DESCRIPTOR_HANDLE {
                ptr: gpu_first_handle.ptr + (id.0 * self.inner.stride) as u64,
            })
    }
}

/// A contiguous run of descriptors, freed on drop
#[derive(Debug)]
pub struct Dx12DescriptorAllocation {
    heap: Dx12DescriptorHeap,
    first: Dx12DescriptorId,
    count: u32,
}

impl Drop for Dx12DescriptorAllocation {
    fn drop(&mut self) {
        self.heap.free(self.first, self.count);
    }
}

impl Dx12DescriptorAllocation {
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn cpu_handle(
        &self,
        index: u32,
    ) -> d3d12::D3D12_CPU_DESCRIPTOR_HANDLE {
        debug_assert!(index < self.count);
        self.heap.id_to_cpu_handle(self.first.add_offset(index))
    }

    /// The handle of the first descriptor, used as the base of a descriptor table
    pub fn gpu_handle(&self) -> Option<d3d12::D3D12_GPU_DESCRIPTOR_HANDLE> {
        self.heap.id_to_gpu_handle(self.first)
    }
}

/// Every heap the device allocates from. Only the CBV/SRV/UAV and sampler heaps are bound to
/// command lists.
#[derive(Debug)]
pub struct Dx12DescriptorHeapSet {
    pub gpu_cbv_srv_uav_heap: Dx12DescriptorHeap,
    pub gpu_sampler_heap: Dx12DescriptorHeap,
    // render target view
    pub rtv_heap: Dx12DescriptorHeap,
    // depth stencil view
    pub dsv_heap: Dx12DescriptorHeap,
}

impl Dx12DescriptorHeapSet {
    pub fn new(device: &d3d12::Dx12Device) -> EmberResult<Self> {
        let gpu_cbv_srv_uav_heap = Dx12DescriptorHeap::new(
            device,
            d3d12::D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV,
            CBV_SRV_UAV_DESCRIPTOR_COUNT,
            true,
        )?;
        let gpu_sampler_heap = Dx12DescriptorHeap::new(
            device,
            d3d12::D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER,
            SAMPLER_DESCRIPTOR_COUNT,
            true,
        )?;
        let rtv_heap = Dx12DescriptorHeap::new(
            device,
            d3d12::D3D12_DESCRIPTOR_HEAP_TYPE_RTV,
            RTV_DESCRIPTOR_COUNT,
            false,
        )?;
        let dsv_heap = Dx12DescriptorHeap::new(
            device,
            d3d12::D3D12_DESCRIPTOR_HEAP_TYPE_DSV,
            DSV_DESCRIPTOR_COUNT,
            false,
        )?;

        Ok(Dx12DescriptorHeapSet {
            gpu_cbv_srv_uav_heap,
            gpu_sampler_heap,
            rtv_heap,
            dsv_heap,
        })
    }
}
