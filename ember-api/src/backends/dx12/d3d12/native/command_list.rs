use super::*;
use windows::core::Interface;
use windows::Win32::Graphics::Direct3D as d3d;

// PIX reads event names as UTF-16 when the metadata is zero
const PIX_EVENT_UNICODE_VERSION: u32 = 0;

pub struct Dx12CommandList {
    allocator: d3d12::ID3D12CommandAllocator,
    command_list: d3d12::ID3D12GraphicsCommandList,
    command_list_base: d3d12::ID3D12CommandList,
    // First invalid call since the last reset, returned by close
    error: Option<HRESULT>,
}

// A list is only ever recorded from one thread at a time
unsafe impl Send for Dx12CommandList {}
unsafe impl Sync for Dx12CommandList {}

impl std::fmt::Debug for Dx12CommandList {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        f.debug_struct("Dx12CommandList")
            .field("error", &self.error)
            .finish()
    }
}

fn transition_barrier(
    resource: &d3d12::ID3D12Resource,
    subresource: u32,
    state_before: D3D12_RESOURCE_STATES,
    state_after: D3D12_RESOURCE_STATES,
) -> d3d12::D3D12_RESOURCE_BARRIER {
    d3d12::D3D12_RESOURCE_BARRIER {
        Type: d3d12::D3D12_RESOURCE_BARRIER_TYPE_TRANSITION,
        Flags: d3d12::D3D12_RESOURCE_BARRIER_FLAG_NONE,
        Anonymous: d3d12::D3D12_RESOURCE_BARRIER_0 {
            Transition: std::mem::ManuallyDrop::new(d3d12::D3D12_RESOURCE_TRANSITION_BARRIER {
                pResource: ::windows::core::ManuallyDrop::new(resource),
                Subresource: subresource,
                StateBefore: resource_states(state_before),
                StateAfter: resource_states(state_after),
            }),
        },
    }
}

fn copy_location(location: &Dx12CopyLocation) -> d3d12::D3D12_TEXTURE_COPY_LOCATION {
    match location {
        Dx12CopyLocation::Subresource { resource, index } => d3d12::D3D12_TEXTURE_COPY_LOCATION {
            pResource: ::windows::core::ManuallyDrop::new(resource.dx12_resource()),
            Type: d3d12::D3D12_TEXTURE_COPY_TYPE_SUBRESOURCE_INDEX,
            Anonymous: d3d12::D3D12_TEXTURE_COPY_LOCATION_0 {
                SubresourceIndex: *index,
            },
        },
        Dx12CopyLocation::PlacedFootprint {
            resource,
            footprint,
        } => d3d12::D3D12_TEXTURE_COPY_LOCATION {
            pResource: ::windows::core::ManuallyDrop::new(resource.dx12_resource()),
            Type: d3d12::D3D12_TEXTURE_COPY_TYPE_PLACED_FOOTPRINT,
            Anonymous: d3d12::D3D12_TEXTURE_COPY_LOCATION_0 {
                PlacedFootprint: placed_footprint(footprint),
            },
        },
    }
}

impl Dx12CommandList {
    pub(super) fn new(
        allocator: d3d12::ID3D12CommandAllocator,
        command_list: d3d12::ID3D12GraphicsCommandList,
    ) -> D3dResult<Self> {
        let command_list_base = command_list.cast::<d3d12::ID3D12CommandList>()?;
        Ok(Dx12CommandList {
            allocator,
            command_list,
            command_list_base,
            error: None,
        })
    }

    fn fail(
        &mut self,
        error: HRESULT,
        message: &str,
    ) {
        log::error!("{}", message);
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// A run of subresources becomes one barrier per subresource
    pub fn resource_barrier(
        &mut self,
        barriers: &[Dx12TransitionBarrier],
    ) {
        let mut native_barriers = Vec::with_capacity(barriers.len());
        for barrier in barriers {
            let resource = barrier.resource.dx12_resource();
            if barrier.subresource == D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES {
                native_barriers.push(transition_barrier(
                    resource,
                    barrier.subresource,
                    barrier.state_before,
                    barrier.state_after,
                ));
            } else {
                for subresource in barrier.subresources() {
                    native_barriers.push(transition_barrier(
                        resource,
                        subresource,
                        barrier.state_before,
                        barrier.state_after,
                    ));
                }
            }
        }

        if native_barriers.is_empty() {
            return;
        }

        unsafe {
            self.command_list.ResourceBarrier(&native_barriers);
        }
    }

    pub fn set_descriptor_heaps(
        &mut self,
        heaps: &[&Dx12DescriptorHeap],
    ) {
        let heaps: Vec<Option<d3d12::ID3D12DescriptorHeap>> =
            heaps.iter().map(|heap| Some(heap.dx12_heap())).collect();
        unsafe {
            self.command_list.SetDescriptorHeaps(&heaps);
        }
    }

    pub fn set_graphics_root_signature(
        &mut self,
        root_signature: &Dx12RootSignature,
    ) {
        unsafe {
            self.command_list
                .SetGraphicsRootSignature(root_signature.dx12_root_signature());
        }
    }

    pub fn set_pipeline_state(
        &mut self,
        pipeline_state: &Dx12PipelineState,
    ) {
        unsafe {
            self.command_list
                .SetPipelineState(pipeline_state.dx12_pipeline_state());
        }
    }

    pub fn set_graphics_root_descriptor_table(
        &mut self,
        root_parameter_index: u32,
        base_descriptor: D3D12_GPU_DESCRIPTOR_HANDLE,
    ) {
        unsafe {
            self.command_list.SetGraphicsRootDescriptorTable(
                root_parameter_index,
                gpu_descriptor_handle(base_descriptor),
            );
        }
    }

    pub fn ia_set_primitive_topology(
        &mut self,
        topology: D3D_PRIMITIVE_TOPOLOGY,
    ) {
        unsafe {
            self.command_list
                .IASetPrimitiveTopology(d3d::D3D_PRIMITIVE_TOPOLOGY(topology as _));
        }
    }

    pub fn ia_set_vertex_buffers(
        &mut self,
        start_slot: u32,
        views: &[D3D12_VERTEX_BUFFER_VIEW],
    ) {
        let views: Vec<d3d12::D3D12_VERTEX_BUFFER_VIEW> = views
            .iter()
            .map(|view| d3d12::D3D12_VERTEX_BUFFER_VIEW {
                BufferLocation: view.BufferLocation,
                SizeInBytes: view.SizeInBytes,
                StrideInBytes: view.StrideInBytes,
            })
            .collect();
        unsafe {
            self.command_list
                .IASetVertexBuffers(start_slot, Some(&views));
        }
    }

    pub fn ia_set_index_buffer(
        &mut self,
        view: Option<&D3D12_INDEX_BUFFER_VIEW>,
    ) {
        let view = view.map(|view| d3d12::D3D12_INDEX_BUFFER_VIEW {
            BufferLocation: view.BufferLocation,
            SizeInBytes: view.SizeInBytes,
            Format: dxgi_format(view.Format),
        });
        unsafe {
            self.command_list.IASetIndexBuffer(view.as_ref().map(|view| view as *const _));
        }
    }

    pub fn rs_set_viewports(
        &mut self,
        viewports: &[D3D12_VIEWPORT],
    ) {
        let viewports: Vec<d3d12::D3D12_VIEWPORT> = viewports
            .iter()
            .map(|viewport| d3d12::D3D12_VIEWPORT {
                TopLeftX: viewport.TopLeftX,
                TopLeftY: viewport.TopLeftY,
                Width: viewport.Width,
                Height: viewport.Height,
                MinDepth: viewport.MinDepth,
                MaxDepth: viewport.MaxDepth,
            })
            .collect();
        unsafe {
            self.command_list.RSSetViewports(&viewports);
        }
    }

    pub fn rs_set_scissor_rects(
        &mut self,
        rects: &[D3D12_RECT],
    ) {
        let rects: Vec<_> = rects.iter().map(rect).collect();
        unsafe {
            self.command_list.RSSetScissorRects(&rects);
        }
    }

    pub fn om_set_render_targets(
        &mut self,
        render_target_descriptors: &[D3D12_CPU_DESCRIPTOR_HANDLE],
        depth_stencil_descriptor: Option<&D3D12_CPU_DESCRIPTOR_HANDLE>,
    ) {
        if render_target_descriptors.len() > D3D12_SIMULTANEOUS_RENDER_TARGET_COUNT {
            self.fail(E_INVALIDARG, "Too many render targets");
            return;
        }

        // The handles are read through pointers, they must stay alive through the call
        let rtvs: Vec<_> = render_target_descriptors
            .iter()
            .map(|handle| cpu_descriptor_handle(*handle))
            .collect();
        let dsv = depth_stencil_descriptor.map(|handle| cpu_descriptor_handle(*handle));
        let dsv_ptr = dsv
            .as_ref()
            .map(|dsv| dsv as *const d3d12::D3D12_CPU_DESCRIPTOR_HANDLE);

        unsafe {
            self.command_list.OMSetRenderTargets(
                rtvs.len() as u32,
                Some(rtvs.as_ptr()),
                false,
                dsv_ptr,
            );
        }
    }

    pub fn om_set_blend_factor(
        &mut self,
        blend_factor: [f32; 4],
    ) {
        unsafe {
            self.command_list.OMSetBlendFactor(Some(&blend_factor));
        }
    }

    pub fn om_set_stencil_ref(
        &mut self,
        stencil_ref: u32,
    ) {
        unsafe {
            self.command_list.OMSetStencilRef(stencil_ref);
        }
    }

    pub fn clear_render_target_view(
        &mut self,
        render_target_view: D3D12_CPU_DESCRIPTOR_HANDLE,
        color: [f32; 4],
        rects: &[D3D12_RECT],
    ) {
        let rects: Vec<_> = rects.iter().map(rect).collect();
        unsafe {
            self.command_list.ClearRenderTargetView(
                cpu_descriptor_handle(render_target_view),
                color.as_ptr(),
                &rects,
            );
        }
    }

    pub fn clear_depth_stencil_view(
        &mut self,
        depth_stencil_view: D3D12_CPU_DESCRIPTOR_HANDLE,
        flags: D3D12_CLEAR_FLAGS,
        depth: f32,
        stencil: u8,
        rects: &[D3D12_RECT],
    ) {
        if !(0.0..=1.0).contains(&depth) {
            self.fail(E_INVALIDARG, "Depth clear values must be within [0, 1]");
            return;
        }

        let rects: Vec<_> = rects.iter().map(rect).collect();
        unsafe {
            self.command_list.ClearDepthStencilView(
                cpu_descriptor_handle(depth_stencil_view),
                d3d12::D3D12_CLEAR_FLAGS(flags as _),
                depth,
                stencil,
                &rects,
            );
        }
    }

    pub fn draw_instanced(
        &mut self,
        vertex_count_per_instance: u32,
        instance_count: u32,
        start_vertex_location: u32,
        start_instance_location: u32,
    ) {
        unsafe {
            self.command_list.DrawInstanced(
                vertex_count_per_instance,
                instance_count,
                start_vertex_location,
                start_instance_location,
            );
        }
    }

    pub fn draw_indexed_instanced(
        &mut self,
        index_count_per_instance: u32,
        instance_count: u32,
        start_index_location: u32,
        base_vertex_location: i32,
        start_instance_location: u32,
    ) {
        unsafe {
            self.command_list.DrawIndexedInstanced(
                index_count_per_instance,
                instance_count,
                start_index_location,
                base_vertex_location,
                start_instance_location,
            );
        }
    }

    /// Needs ID3D12GraphicsCommandList1, available since the Windows 10 Creators Update
    #[allow(clippy::too_many_arguments)]
    pub fn resolve_subresource_region(
        &mut self,
        dst: &Dx12Resource,
        dst_subresource: u32,
        dst_x: u32,
        dst_y: u32,
        src: &Dx12Resource,
        src_subresource: u32,
        src_rect: Option<&D3D12_RECT>,
        format: DXGI_FORMAT,
    ) {
        let command_list1 = match self
            .command_list
            .cast::<d3d12::ID3D12GraphicsCommandList1>()
        {
            Ok(command_list1) => command_list1,
            Err(e) => {
                self.fail(e.into(), "ResolveSubresourceRegion is not supported");
                return;
            }
        };

        let src_rect = src_rect.map(rect);
        unsafe {
            command_list1.ResolveSubresourceRegion(
                dst.dx12_resource(),
                dst_subresource,
                dst_x,
                dst_y,
                src.dx12_resource(),
                src_subresource,
                src_rect.as_ref().map(|rect| rect as *const _),
                dxgi_format(format),
                d3d12::D3D12_RESOLVE_MODE_AVERAGE,
            );
        }
    }

    pub fn copy_texture_region(
        &mut self,
        dst: &Dx12CopyLocation,
        dst_x: u32,
        dst_y: u32,
        src: &Dx12CopyLocation,
    ) {
        let dst = copy_location(dst);
        let src = copy_location(src);
        unsafe {
            self.command_list
                .CopyTextureRegion(&dst, dst_x, dst_y, 0, &src, None);
        }
    }

    pub fn end_query(
        &mut self,
        query_heap: &Dx12QueryHeap,
        query_type: D3D12_QUERY_TYPE,
        index: u32,
    ) {
        if index >= query_heap.desc().Count {
            self.fail(E_INVALIDARG, "Query index is outside the heap");
            return;
        }

        unsafe {
            self.command_list.EndQuery(
                query_heap.dx12_query_heap(),
                d3d12::D3D12_QUERY_TYPE(query_type as _),
                index,
            );
        }
    }

    pub fn resolve_query_data(
        &mut self,
        query_heap: &Dx12QueryHeap,
        query_type: D3D12_QUERY_TYPE,
        start_index: u32,
        num_queries: u32,
        destination: &Dx12Resource,
        aligned_destination_offset: u64,
    ) {
        if start_index + num_queries > query_heap.desc().Count
            || aligned_destination_offset % 8 != 0
        {
            self.fail(E_INVALIDARG, "Invalid query resolve");
            return;
        }

        unsafe {
            self.command_list.ResolveQueryData(
                query_heap.dx12_query_heap(),
                d3d12::D3D12_QUERY_TYPE(query_type as _),
                start_index,
                num_queries,
                destination.dx12_resource(),
                aligned_destination_offset,
            );
        }
    }

    pub fn begin_event(
        &mut self,
        name: &str,
    ) {
        let name = utf16_null_terminated(name);
        unsafe {
            self.command_list.BeginEvent(
                PIX_EVENT_UNICODE_VERSION,
                Some(name.as_ptr() as *const std::ffi::c_void),
                (name.len() * std::mem::size_of::<u16>()) as u32,
            );
        }
    }

    pub fn end_event(&mut self) {
        unsafe {
            self.command_list.EndEvent();
        }
    }

    pub fn set_marker(
        &mut self,
        name: &str,
    ) {
        let name = utf16_null_terminated(name);
        unsafe {
            self.command_list.SetMarker(
                PIX_EVENT_UNICODE_VERSION,
                Some(name.as_ptr() as *const std::ffi::c_void),
                (name.len() * std::mem::size_of::<u16>()) as u32,
            );
        }
    }

    /// Fails with the first error hit while recording
    pub fn close(&mut self) -> D3dResult<()> {
        unsafe { self.command_list.Close() }?;
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// The allocator is reset too, so all work recorded before must have finished executing
    pub fn reset(&mut self) -> D3dResult<()> {
        self.error = None;
        unsafe {
            self.allocator.Reset()?;
            self.command_list.Reset(&self.allocator, None)?;
        }
        Ok(())
    }

    pub(super) fn dx12_command_list(&self) -> d3d12::ID3D12CommandList {
        self.command_list_base.clone()
    }

    pub(super) fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct Dx12CommandQueue {
    queue: d3d12::ID3D12CommandQueue,
}

unsafe impl Send for Dx12CommandQueue {}
unsafe impl Sync for Dx12CommandQueue {}

impl Dx12CommandQueue {
    pub(super) fn new(queue: d3d12::ID3D12CommandQueue) -> Self {
        Dx12CommandQueue { queue }
    }

    /// Lists that failed to record are not executed
    pub fn execute_command_lists(
        &self,
        command_lists: &[&Dx12CommandList],
    ) {
        if command_lists.iter().any(|command_list| command_list.has_error()) {
            log::error!("ExecuteCommandLists: a command list failed to record, nothing was submitted");
            return;
        }

        let command_lists: Vec<Option<d3d12::ID3D12CommandList>> = command_lists
            .iter()
            .map(|command_list| Some(command_list.dx12_command_list()))
            .collect();
        unsafe {
            self.queue.ExecuteCommandLists(&command_lists);
        }
    }

    /// Set the fence to `value` once previously submitted work has executed
    pub fn signal(
        &self,
        fence: &Dx12Fence,
        value: u64,
    ) -> D3dResult<()> {
        unsafe { self.queue.Signal(fence.dx12_fence(), value) }?;
        Ok(())
    }

    /// Hold back later work until the fence reaches `value`
    pub fn wait(
        &self,
        fence: &Dx12Fence,
        value: u64,
    ) -> D3dResult<()> {
        unsafe { self.queue.Wait(fence.dx12_fence(), value) }?;
        Ok(())
    }

    pub fn timestamp_frequency(&self) -> D3dResult<u64> {
        Ok(unsafe { self.queue.GetTimestampFrequency() }?)
    }

    pub(super) fn dx12_queue(&self) -> &d3d12::ID3D12CommandQueue {
        &self.queue
    }
}
