use super::descriptor_heap::Descriptor;
use super::*;
use std::sync::Arc;

/// A render target or depth stencil view, resolved when it is recorded
#[derive(Clone, Debug)]
pub(super) struct BoundView {
    pub resource: Dx12Resource,
    pub subresource: u32,
    pub format: DXGI_FORMAT,
}

#[derive(Clone, Debug)]
pub(super) enum RecordedCommand {
    ResourceBarrier(Vec<Dx12TransitionBarrier>),
    SetDescriptorHeaps(Vec<Dx12DescriptorHeap>),
    SetGraphicsRootSignature(Dx12RootSignature),
    SetPipelineState(Dx12PipelineState),
    SetGraphicsRootDescriptorTable {
        root_parameter_index: u32,
        base_descriptor: D3D12_GPU_DESCRIPTOR_HANDLE,
    },
    IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY),
    IASetVertexBuffers {
        start_slot: u32,
        views: Vec<D3D12_VERTEX_BUFFER_VIEW>,
    },
    IASetIndexBuffer(Option<D3D12_INDEX_BUFFER_VIEW>),
    RSSetViewports(Vec<D3D12_VIEWPORT>),
    RSSetScissorRects(Vec<D3D12_RECT>),
    OMSetRenderTargets {
        render_targets: Vec<BoundView>,
        depth_stencil: Option<BoundView>,
    },
    OMSetBlendFactor([f32; 4]),
    OMSetStencilRef(u32),
    ClearRenderTargetView {
        view: BoundView,
        color: [f32; 4],
        rects: Vec<D3D12_RECT>,
    },
    ClearDepthStencilView {
        view: BoundView,
        flags: D3D12_CLEAR_FLAGS,
        depth: f32,
        stencil: u8,
        rects: Vec<D3D12_RECT>,
    },
    DrawInstanced {
        vertex_count_per_instance: u32,
        instance_count: u32,
        start_vertex_location: u32,
        start_instance_location: u32,
    },
    DrawIndexedInstanced {
        index_count_per_instance: u32,
        instance_count: u32,
        start_index_location: u32,
        base_vertex_location: i32,
        start_instance_location: u32,
    },
    ResolveSubresourceRegion {
        dst: Dx12Resource,
        dst_subresource: u32,
        dst_x: u32,
        dst_y: u32,
        src: Dx12Resource,
        src_subresource: u32,
        src_rect: Option<D3D12_RECT>,
        format: DXGI_FORMAT,
    },
    CopyTextureRegion {
        dst: Dx12CopyLocation,
        dst_x: u32,
        dst_y: u32,
        src: Dx12CopyLocation,
    },
    EndQuery {
        query_heap: Dx12QueryHeap,
        index: u32,
    },
    ResolveQueryData {
        query_heap: Dx12QueryHeap,
        start_index: u32,
        num_queries: u32,
        destination: Dx12Resource,
        aligned_destination_offset: u64,
    },
    BeginEvent(String),
    EndEvent,
    SetMarker(String),
}

/// Records commands for a command queue to execute. The list must be closed before it can be
/// executed, and reset before it records again.
pub struct Dx12CommandList {
    device: Dx12Device,
    recorded: Vec<RecordedCommand>,
    closed: Option<Arc<Vec<RecordedCommand>>>,
    error: Option<HRESULT>,
}

impl std::fmt::Debug for Dx12CommandList {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        f.debug_struct("Dx12CommandList")
            .field("recorded", &self.recorded.len())
            .field("closed", &self.closed.is_some())
            .field("error", &self.error)
            .finish()
    }
}

impl Dx12CommandList {
    pub(super) fn new(device: Dx12Device) -> Self {
        Dx12CommandList {
            device,
            recorded: Vec::default(),
            closed: None,
            error: None,
        }
    }

    fn record(
        &mut self,
        command: RecordedCommand,
    ) {
        if self.closed.is_some() {
            self.fail(E_FAIL, "Commands cannot be recorded into a closed command list");
            return;
        }

        self.recorded.push(command);
    }

    // Recording errors surface when the list is closed
    fn fail(
        &mut self,
        error: HRESULT,
        message: &str,
    ) {
        self.device.report(message);
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn resolve_view(
        &mut self,
        handle: D3D12_CPU_DESCRIPTOR_HANDLE,
        depth_stencil: bool,
    ) -> Option<BoundView> {
        let view = match self.device.resolve_cpu_descriptor(handle) {
            Some(Descriptor::RenderTargetView { resource, desc }) if !depth_stencil => {
                resource.upgrade().map(|resource| BoundView {
                    resource,
                    subresource: desc.MipSlice,
                    format: desc.Format,
                })
            }
            Some(Descriptor::DepthStencilView { resource, desc }) if depth_stencil => {
                resource.upgrade().map(|resource| BoundView {
                    resource,
                    subresource: desc.MipSlice,
                    format: desc.Format,
                })
            }
            _ => None,
        };

        if view.is_none() {
            let kind = if depth_stencil { "DSV" } else { "RTV" };
            self.fail(
                E_INVALIDARG,
                &format!(
                    "Descriptor handle 0x{:X} does not refer to a live {}",
                    handle.ptr, kind
                ),
            );
        }

        view
    }

    pub fn resource_barrier(
        &mut self,
        barriers: &[Dx12TransitionBarrier],
    ) {
        if barriers.is_empty() {
            return;
        }

        self.record(RecordedCommand::ResourceBarrier(barriers.to_vec()));
    }

    pub fn set_descriptor_heaps(
        &mut self,
        heaps: &[&Dx12DescriptorHeap],
    ) {
        let mut seen_types = Vec::with_capacity(heaps.len());
        for heap in heaps {
            let desc = heap.desc();
            if desc.Flags & D3D12_DESCRIPTOR_HEAP_FLAG_SHADER_VISIBLE == 0
                || seen_types.contains(&desc.Type)
            {
                self.fail(
                    E_INVALIDARG,
                    "SetDescriptorHeaps takes at most one shader visible heap of each type",
                );
                return;
            }
            seen_types.push(desc.Type);
        }

        self.record(RecordedCommand::SetDescriptorHeaps(
            heaps.iter().map(|heap| (*heap).clone()).collect(),
        ));
    }

    pub fn set_graphics_root_signature(
        &mut self,
        root_signature: &Dx12RootSignature,
    ) {
        self.record(RecordedCommand::SetGraphicsRootSignature(
            root_signature.clone(),
        ));
    }

    pub fn set_pipeline_state(
        &mut self,
        pipeline_state: &Dx12PipelineState,
    ) {
        self.record(RecordedCommand::SetPipelineState(pipeline_state.clone()));
    }

    pub fn set_graphics_root_descriptor_table(
        &mut self,
        root_parameter_index: u32,
        base_descriptor: D3D12_GPU_DESCRIPTOR_HANDLE,
    ) {
        self.record(RecordedCommand::SetGraphicsRootDescriptorTable {
            root_parameter_index,
            base_descriptor,
        });
    }

    pub fn ia_set_primitive_topology(
        &mut self,
        topology: D3D_PRIMITIVE_TOPOLOGY,
    ) {
        self.record(RecordedCommand::IASetPrimitiveTopology(topology));
    }

    pub fn ia_set_vertex_buffers(
        &mut self,
        start_slot: u32,
        views: &[D3D12_VERTEX_BUFFER_VIEW],
    ) {
        self.record(RecordedCommand::IASetVertexBuffers {
            start_slot,
            views: views.to_vec(),
        });
    }

    pub fn ia_set_index_buffer(
        &mut self,
        view: Option<&D3D12_INDEX_BUFFER_VIEW>,
    ) {
        if let Some(view) = view {
            if view.Format != DXGI_FORMAT_R16_UINT && view.Format != DXGI_FORMAT_R32_UINT {
                self.fail(E_INVALIDARG, "Index buffers must be R16_UINT or R32_UINT");
                return;
            }
        }

        self.record(RecordedCommand::IASetIndexBuffer(view.copied()));
    }

    pub fn rs_set_viewports(
        &mut self,
        viewports: &[D3D12_VIEWPORT],
    ) {
        self.record(RecordedCommand::RSSetViewports(viewports.to_vec()));
    }

    pub fn rs_set_scissor_rects(
        &mut self,
        rects: &[D3D12_RECT],
    ) {
        self.record(RecordedCommand::RSSetScissorRects(rects.to_vec()));
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

        let mut render_targets = Vec::with_capacity(render_target_descriptors.len());
        for handle in render_target_descriptors {
            match self.resolve_view(*handle, false) {
                Some(view) => render_targets.push(view),
                None => return,
            }
        }

        let depth_stencil = match depth_stencil_descriptor {
            Some(handle) => match self.resolve_view(*handle, true) {
                Some(view) => Some(view),
                None => return,
            },
            None => None,
        };

        self.record(RecordedCommand::OMSetRenderTargets {
            render_targets,
            depth_stencil,
        });
    }

    pub fn om_set_blend_factor(
        &mut self,
        blend_factor: [f32; 4],
    ) {
        self.record(RecordedCommand::OMSetBlendFactor(blend_factor));
    }

    pub fn om_set_stencil_ref(
        &mut self,
        stencil_ref: u32,
    ) {
        self.record(RecordedCommand::OMSetStencilRef(stencil_ref));
    }

    pub fn clear_render_target_view(
        &mut self,
        render_target_view: D3D12_CPU_DESCRIPTOR_HANDLE,
        color: [f32; 4],
        rects: &[D3D12_RECT],
    ) {
        if let Some(view) = self.resolve_view(render_target_view, false) {
            self.record(RecordedCommand::ClearRenderTargetView {
                view,
                color,
                rects: rects.to_vec(),
            });
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

        if let Some(view) = self.resolve_view(depth_stencil_view, true) {
            self.record(RecordedCommand::ClearDepthStencilView {
                view,
                flags,
                depth,
                stencil,
                rects: rects.to_vec(),
            });
        }
    }

    pub fn draw_instanced(
        &mut self,
        vertex_count_per_instance: u32,
        instance_count: u32,
        start_vertex_location: u32,
        start_instance_location: u32,
    ) {
        self.record(RecordedCommand::DrawInstanced {
            vertex_count_per_instance,
            instance_count,
            start_vertex_location,
            start_instance_location,
        });
    }

    pub fn draw_indexed_instanced(
        &mut self,
        index_count_per_instance: u32,
        instance_count: u32,
        start_index_location: u32,
        base_vertex_location: i32,
        start_instance_location: u32,
    ) {
        self.record(RecordedCommand::DrawIndexedInstanced {
            index_count_per_instance,
            instance_count,
            start_index_location,
            base_vertex_location,
            start_instance_location,
        });
    }

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
        self.record(RecordedCommand::ResolveSubresourceRegion {
            dst: dst.clone(),
            dst_subresource,
            dst_x,
            dst_y,
            src: src.clone(),
            src_subresource,
            src_rect: src_rect.copied(),
            format,
        });
    }

    pub fn copy_texture_region(
        &mut self,
        dst: &Dx12CopyLocation,
        dst_x: u32,
        dst_y: u32,
        src: &Dx12CopyLocation,
    ) {
        self.record(RecordedCommand::CopyTextureRegion {
            dst: dst.clone(),
            dst_x,
            dst_y,
            src: src.clone(),
        });
    }

    pub fn end_query(
        &mut self,
        query_heap: &Dx12QueryHeap,
        query_type: D3D12_QUERY_TYPE,
        index: u32,
    ) {
        if query_type != D3D12_QUERY_TYPE_TIMESTAMP || index >= query_heap.desc().Count {
            self.fail(E_INVALIDARG, "Only timestamp queries inside the heap can be ended");
            return;
        }

        self.record(RecordedCommand::EndQuery {
            query_heap: query_heap.clone(),
            index,
        });
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
        if query_type != D3D12_QUERY_TYPE_TIMESTAMP
            || start_index + num_queries > query_heap.desc().Count
            || aligned_destination_offset % 8 != 0
        {
            self.fail(E_INVALIDARG, "Invalid query resolve");
            return;
        }

        self.record(RecordedCommand::ResolveQueryData {
            query_heap: query_heap.clone(),
            start_index,
            num_queries,
            destination: destination.clone(),
            aligned_destination_offset,
        });
    }

    pub fn begin_event(
        &mut self,
        name: &str,
    ) {
        self.record(RecordedCommand::BeginEvent(name.to_string()));
    }

    pub fn end_event(&mut self) {
        self.record(RecordedCommand::EndEvent);
    }

    pub fn set_marker(
        &mut self,
        name: &str,
    ) {
        self.record(RecordedCommand::SetMarker(name.to_string()));
    }

    /// Fails with the first error hit while recording
    pub fn close(&mut self) -> D3dResult<()> {
        if self.closed.is_some() {
            return Err(E_FAIL);
        }

        self.closed = Some(Arc::new(std::mem::take(&mut self.recorded)));
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    pub fn reset(&mut self) -> D3dResult<()> {
        self.recorded.clear();
        self.closed = None;
        self.error = None;
        Ok(())
    }

    /// The commands of a closed list that recorded without errors
    pub(super) fn closed_commands(&self) -> Option<Arc<Vec<RecordedCommand>>> {
        match self.error {
            Some(_) => None,
            None => self.closed.clone(),
        }
    }

    #[cfg(test)]
    pub(super) fn recorded_commands(&self) -> &[RecordedCommand] {
        &self.recorded
    }
}
