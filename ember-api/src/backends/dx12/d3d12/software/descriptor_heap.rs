use super::resource::WeakResource;
use super::*;
use std::sync::{Arc, Mutex, Weak};

/// Distance between two handles of a heap
pub const DESCRIPTOR_HANDLE_INCREMENT: u32 = 32;

// Every heap owns a disjoint range of handle space starting at its index shifted by this much
pub(super) const HEAP_HANDLE_SPACE_BITS: u32 = 24;
pub(super) const MAX_DESCRIPTORS_PER_HEAP: u32 =
    (1 << HEAP_HANDLE_SPACE_BITS) / DESCRIPTOR_HANDLE_INCREMENT;

/// A view written into a descriptor heap
#[derive(Clone, Debug)]
pub(super) enum Descriptor {
    ConstantBufferView(D3D12_CONSTANT_BUFFER_VIEW_DESC),
    ShaderResourceView {
        resource: WeakResource,
        desc: D3D12_SHADER_RESOURCE_VIEW_DESC,
    },
    Sampler(D3D12_SAMPLER_DESC),
    RenderTargetView {
        resource: WeakResource,
        desc: D3D12_RENDER_TARGET_VIEW_DESC,
    },
    DepthStencilView {
        resource: WeakResource,
        desc: D3D12_DEPTH_STENCIL_VIEW_DESC,
    },
}

impl Descriptor {
    pub fn heap_type(&self) -> D3D12_DESCRIPTOR_HEAP_TYPE {
        match self {
            Descriptor::ConstantBufferView(_) | Descriptor::ShaderResourceView { .. } => {
                D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV
            }
            Descriptor::Sampler(_) => D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER,
            Descriptor::RenderTargetView { .. } => D3D12_DESCRIPTOR_HEAP_TYPE_RTV,
            Descriptor::DepthStencilView { .. } => D3D12_DESCRIPTOR_HEAP_TYPE_DSV,
        }
    }
}

struct Dx12DescriptorHeapInner {
    desc: D3D12_DESCRIPTOR_HEAP_DESC,
    base: usize,
    descriptors: Mutex<Vec<Option<Descriptor>>>,
}

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
            .field("desc", &self.inner.desc)
            .field("base", &self.inner.base)
            .finish()
    }
}

impl PartialEq for Dx12DescriptorHeap {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

pub(super) struct WeakDescriptorHeap(Weak<Dx12DescriptorHeapInner>);

impl WeakDescriptorHeap {
    pub fn upgrade(&self) -> Option<Dx12DescriptorHeap> {
        self.0.upgrade().map(|inner| Dx12DescriptorHeap { inner })
    }
}

impl Dx12DescriptorHeap {
    pub(super) fn new(
        heap_index: usize,
        desc: &D3D12_DESCRIPTOR_HEAP_DESC,
    ) -> D3dResult<Self> {
        if desc.NumDescriptors == 0 || desc.NumDescriptors > MAX_DESCRIPTORS_PER_HEAP {
            return Err(E_INVALIDARG);
        }

        // RTV and DSV heaps are never visible to shaders
        let shader_visible = desc.Flags & D3D12_DESCRIPTOR_HEAP_FLAG_SHADER_VISIBLE != 0;
        if shader_visible
            && (desc.Type == D3D12_DESCRIPTOR_HEAP_TYPE_RTV
                || desc.Type == D3D12_DESCRIPTOR_HEAP_TYPE_DSV)
        {
            return Err(E_INVALIDARG);
        }

        Ok(Dx12DescriptorHeap {
            inner: Arc::new(Dx12DescriptorHeapInner {
                desc: *desc,
                base: heap_index << HEAP_HANDLE_SPACE_BITS,
                descriptors: Mutex::new(vec![None; desc.NumDescriptors as usize]),
            }),
        })
    }

    pub fn desc(&self) -> D3D12_DESCRIPTOR_HEAP_DESC {
        self.inner.desc
    }

    pub fn cpu_handle_for_heap_start(&self) -> D3D12_CPU_DESCRIPTOR_HANDLE {
        D3D12_CPU_DESCRIPTOR_HANDLE {
            ptr: self.inner.base,
        }
    }

    /// Null for heaps that are not shader visible
    pub fn gpu_handle_for_heap_start(&self) -> D3D12_GPU_DESCRIPTOR_HANDLE {
        if self.inner.desc.Flags & D3D12_DESCRIPTOR_HEAP_FLAG_SHADER_VISIBLE == 0 {
            return D3D12_GPU_DESCRIPTOR_HANDLE { ptr: 0 };
        }

        D3D12_GPU_DESCRIPTOR_HANDLE {
            ptr: self.inner.base as u64,
        }
    }

    pub(super) fn downgrade(&self) -> WeakDescriptorHeap {
        WeakDescriptorHeap(Arc::downgrade(&self.inner))
    }

    pub(super) fn base(&self) -> usize {
        self.inner.base
    }

    /// The slot a handle points at, if it belongs to this heap
    pub(super) fn index_of(
        &self,
        ptr: usize,
    ) -> Option<usize> {
        if ptr < self.inner.base {
            return None;
        }

        let offset = ptr - self.inner.base;
        let index = offset / DESCRIPTOR_HANDLE_INCREMENT as usize;
        if offset % DESCRIPTOR_HANDLE_INCREMENT as usize != 0
            || index >= self.inner.desc.NumDescriptors as usize
        {
            return None;
        }

        Some(index)
    }

    pub(super) fn write(
        &self,
        index: usize,
        descriptor: Option<Descriptor>,
    ) -> D3dResult<()> {
        if let Some(descriptor) = &descriptor {
            if descriptor.heap_type() != self.inner.desc.Type {
                return Err(E_INVALIDARG);
            }
        }

        let mut descriptors = self.inner.descriptors.lock().unwrap();
        let slot = descriptors.get_mut(index).ok_or(E_INVALIDARG)?;
        *slot = descriptor;
        Ok(())
    }

    pub(super) fn read(
        &self,
        index: usize,
    ) -> Option<Descriptor> {
        self.inner
            .descriptors
            .lock()
            .unwrap()
            .get(index)
            .cloned()
            .flatten()
    }

    pub(super) fn read_range(
        &self,
        first: usize,
        count: usize,
    ) -> Vec<Option<Descriptor>> {
        let descriptors = self.inner.descriptors.lock().unwrap();
        (first..first + count)
            .map(|index| descriptors.get(index).cloned().flatten())
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_handles_map_to_slots() {
        let heap = Dx12DescriptorHeap::new(
            3,
            &D3D12_DESCRIPTOR_HEAP_DESC {
                Type: D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER,
                NumDescriptors: 4,
                Flags: D3D12_DESCRIPTOR_HEAP_FLAG_NONE,
            },
        )
        .unwrap();

        let start = heap.cpu_handle_for_heap_start().ptr;
        assert_eq!(start, 3 << HEAP_HANDLE_SPACE_BITS);
        assert_eq!(heap.gpu_handle_for_heap_start().ptr, 0);
        assert_eq!(heap.index_of(start + 2 * 32), Some(2));
        assert_eq!(heap.index_of(start + 4 * 32), None);
        assert_eq!(heap.index_of(start + 1), None);

        let cbv = Descriptor::ConstantBufferView(D3D12_CONSTANT_BUFFER_VIEW_DESC {
            BufferLocation: 0,
            SizeInBytes: 256,
        });
        assert_eq!(heap.write(0, Some(cbv)), Err(E_INVALIDARG));
    }

    #[test]
    fn test_render_target_heaps_are_not_shader_visible() {
        assert!(Dx12DescriptorHeap::new(
            1,
            &D3D12_DESCRIPTOR_HEAP_DESC {
                Type: D3D12_DESCRIPTOR_HEAP_TYPE_RTV,
                NumDescriptors: 1,
                Flags: D3D12_DESCRIPTOR_HEAP_FLAG_SHADER_VISIBLE,
            },
        )
        .is_err());
    }
}
