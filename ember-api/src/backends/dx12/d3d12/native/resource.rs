use super::*;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

struct Dx12ResourceInner {
    resource: d3d12::ID3D12Resource,
    desc: D3D12_RESOURCE_DESC,
}

#[derive(Clone)]
pub struct Dx12Resource {
    inner: Arc<Dx12ResourceInner>,
}

// Resources are free-threaded. Ember serializes mapping per buffer.
unsafe impl Send for Dx12Resource {}
unsafe impl Sync for Dx12Resource {}

impl std::fmt::Debug for Dx12Resource {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        f.debug_struct("Dx12Resource")
            .field("desc", &self.inner.desc)
            .finish()
    }
}

impl PartialEq for Dx12Resource {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Dx12Resource {}

impl Dx12Resource {
    pub(super) fn new(
        resource: d3d12::ID3D12Resource,
        desc: D3D12_RESOURCE_DESC,
    ) -> Self {
        Dx12Resource {
            inner: Arc::new(Dx12ResourceInner { resource, desc }),
        }
    }

    pub fn desc(&self) -> D3D12_RESOURCE_DESC {
        self.inner.desc
    }

    /// Zero for textures
    pub fn gpu_virtual_address(&self) -> D3D12_GPU_VIRTUAL_ADDRESS {
        match self.inner.desc.Dimension {
            D3D12_RESOURCE_DIMENSION_BUFFER => unsafe { self.inner.resource.GetGPUVirtualAddress() },
            _ => 0,
        }
    }

    pub fn set_name(
        &self,
        name: &str,
    ) {
        let name = utf16_null_terminated(name);
        let result = unsafe {
            self.inner
                .resource
                .SetName(windows::core::PCWSTR::from_raw(name.as_ptr()))
        };
        if let Err(e) = result {
            log::warn!("Failed to name D3D12 resource: {:?}", e);
        }
    }

    /// Only buffers on upload and readback heaps can be mapped. The buffer is unmapped when the
    /// returned range drops.
    pub fn map(&self) -> D3dResult<Dx12MappedRange> {
        if self.inner.desc.Dimension != D3D12_RESOURCE_DIMENSION_BUFFER {
            return Err(E_INVALIDARG);
        }

        let mut mapped_ptr = std::ptr::null_mut();
        unsafe { self.inner.resource.Map(0, None, Some(&mut mapped_ptr)) }?;
        if mapped_ptr.is_null() {
            return Err(E_FAIL);
        }

        Ok(Dx12MappedRange {
            resource: self,
            data: mapped_ptr as *mut u8,
            size: self.inner.desc.Width as usize,
        })
    }

    pub(super) fn dx12_resource(&self) -> &d3d12::ID3D12Resource {
        &self.inner.resource
    }
}

/// CPU access to a mapped buffer
pub struct Dx12MappedRange<'a> {
    resource: &'a Dx12Resource,
    data: *mut u8,
    size: usize,
}

impl<'a> Deref for Dx12MappedRange<'a> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.data, self.size) }
    }
}

impl<'a> DerefMut for Dx12MappedRange<'a> {
    fn deref_mut(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.data, self.size) }
    }
}

impl<'a> Drop for Dx12MappedRange<'a> {
    fn drop(&mut self) {
        unsafe {
            self.resource.inner.resource.Unmap(0, None);
        }
    }
}

#[derive(Clone, Debug)]
pub struct Dx12DescriptorHeap {
    heap: d3d12::ID3D12DescriptorHeap,
    desc: D3D12_DESCRIPTOR_HEAP_DESC,
}

unsafe impl Send for Dx12DescriptorHeap {}
unsafe impl Sync for Dx12DescriptorHeap {}

impl PartialEq for Dx12DescriptorHeap {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.heap == other.heap
    }
}

impl Dx12DescriptorHeap {
    pub(super) fn new(
        heap: d3d12::ID3D12DescriptorHeap,
        desc: D3D12_DESCRIPTOR_HEAP_DESC,
    ) -> Self {
        Dx12DescriptorHeap { heap, desc }
    }

    pub fn desc(&self) -> D3D12_DESCRIPTOR_HEAP_DESC {
        self.desc
    }

    pub fn cpu_handle_for_heap_start(&self) -> D3D12_CPU_DESCRIPTOR_HANDLE {
        let handle = unsafe { self.heap.GetCPUDescriptorHandleForHeapStart() };
        D3D12_CPU_DESCRIPTOR_HANDLE { ptr: handle.ptr }
    }

    /// Null for heaps that are not shader visible
    pub fn gpu_handle_for_heap_start(&self) -> D3D12_GPU_DESCRIPTOR_HANDLE {
        if self.desc.Flags & D3D12_DESCRIPTOR_HEAP_FLAG_SHADER_VISIBLE == 0 {
            return D3D12_GPU_DESCRIPTOR_HANDLE { ptr: 0 };
        }

        let handle = unsafe { self.heap.GetGPUDescriptorHandleForHeapStart() };
        D3D12_GPU_DESCRIPTOR_HANDLE { ptr: handle.ptr }
    }

    pub(super) fn dx12_heap(&self) -> d3d12::ID3D12DescriptorHeap {
        self.heap.clone()
    }
}

struct Dx12RootSignatureInner {
    root_signature: d3d12::ID3D12RootSignature,
    desc: Dx12RootSignatureDesc,
}

#[derive(Clone)]
pub struct Dx12RootSignature {
    inner: Arc<Dx12RootSignatureInner>,
}

unsafe impl Send for Dx12RootSignature {}
unsafe impl Sync for Dx12RootSignature {}

impl std::fmt::Debug for Dx12RootSignature {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        f.debug_struct("Dx12RootSignature")
            .field("desc", &self.inner.desc)
            .finish()
    }
}

impl PartialEq for Dx12RootSignature {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Dx12RootSignature {
    pub(super) fn new(
        root_signature: d3d12::ID3D12RootSignature,
        desc: Dx12RootSignatureDesc,
    ) -> Self {
        Dx12RootSignature {
            inner: Arc::new(Dx12RootSignatureInner {
                root_signature,
                desc,
            }),
        }
    }

    pub fn desc(&self) -> &Dx12RootSignatureDesc {
        &self.inner.desc
    }

    pub(super) fn dx12_root_signature(&self) -> &d3d12::ID3D12RootSignature {
        &self.inner.root_signature
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dx12PipelineState {
    pipeline_state: d3d12::ID3D12PipelineState,
}

unsafe impl Send for Dx12PipelineState {}
unsafe impl Sync for Dx12PipelineState {}

impl Dx12PipelineState {
    pub(super) fn new(pipeline_state: d3d12::ID3D12PipelineState) -> Self {
        Dx12PipelineState { pipeline_state }
    }

    pub(super) fn dx12_pipeline_state(&self) -> &d3d12::ID3D12PipelineState {
        &self.pipeline_state
    }
}

#[derive(Clone, Debug)]
pub struct Dx12QueryHeap {
    heap: d3d12::ID3D12QueryHeap,
    desc: D3D12_QUERY_HEAP_DESC,
}

unsafe impl Send for Dx12QueryHeap {}
unsafe impl Sync for Dx12QueryHeap {}

impl Dx12QueryHeap {
    pub(super) fn new(
        heap: d3d12::ID3D12QueryHeap,
        desc: D3D12_QUERY_HEAP_DESC,
    ) -> Self {
        Dx12QueryHeap { heap, desc }
    }

    pub fn desc(&self) -> D3D12_QUERY_HEAP_DESC {
        self.desc
    }

    pub(super) fn dx12_query_heap(&self) -> &d3d12::ID3D12QueryHeap {
        &self.heap
    }
}

#[derive(Clone, Debug)]
pub struct Dx12Fence {
    fence: d3d12::ID3D12Fence,
}

unsafe impl Send for Dx12Fence {}
unsafe impl Sync for Dx12Fence {}

impl Dx12Fence {
    pub(super) fn new(fence: d3d12::ID3D12Fence) -> Self {
        Dx12Fence { fence }
    }

    pub fn completed_value(&self) -> u64 {
        unsafe { self.fence.GetCompletedValue() }
    }

    /// Set the fence from the CPU
    pub fn signal(
        &self,
        value: u64,
    ) -> D3dResult<()> {
        unsafe { self.fence.Signal(value) }?;
        Ok(())
    }

    /// The event is set as soon as the completed value reaches `value`
    pub fn set_event_on_completion(
        &self,
        value: u64,
        event: &Dx12Event,
    ) -> D3dResult<()> {
        unsafe { self.fence.SetEventOnCompletion(value, event.handle()) }?;
        Ok(())
    }

    pub(super) fn dx12_fence(&self) -> &d3d12::ID3D12Fence {
        &self.fence
    }
}
