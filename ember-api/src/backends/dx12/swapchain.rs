use crate::dx12::d3d12;
use crate::dx12::texture::unpitch_rows;
use crate::dx12::{Dx12DescriptorAllocation, Dx12TrackedResource, EmberDeviceContextDx12};
use crate::{
    EmberDeviceContext, EmberExtents2D, EmberFramebuffer, EmberResourceType, EmberResult,
    EmberSampleCount, EmberSwapchainDef, EmberTexture, EmberTextureDef,
};
use raw_window_handle::HasRawWindowHandle;
use std::sync::{Arc, Mutex};

/// One image of the swap chain with its render target view. Back buffers rest in the present
/// state between command lists.
#[derive(Debug)]
pub(crate) struct Dx12BackBuffer {
    tracked: Dx12TrackedResource,
    render_target_view: Dx12DescriptorAllocation,
}

impl Dx12BackBuffer {
    pub(crate) fn tracked(&self) -> &Dx12TrackedResource {
        &self.tracked
    }

    pub(crate) fn render_target_view(&self) -> d3d12::D3D12_CPU_DESCRIPTOR_HANDLE {
        self.render_target_view.cpu_handle(0)
    }
}

// Everything recreated on resize
#[derive(Debug)]
struct SwapchainDx12State {
    swapchain_def: EmberSwapchainDef,
    back_buffers: Vec<Arc<Dx12BackBuffer>>,
    depth_stencil: Option<Arc<EmberTexture>>,
    multisampled_framebuffer: Option<Arc<EmberFramebuffer>>,
}

/// A DXGI swap chain. Multisampled swapchains draw into an offscreen framebuffer that owns the
/// depth buffer and is resolved into the back buffer when the swapchain is unbound.
#[derive(Debug)]
pub struct EmberSwapchainDx12 {
    device_context: EmberDeviceContextDx12,
    swap_chain: d3d12::Dx12SwapChain,
    dxgi_format: d3d12::DXGI_FORMAT,
    state: Mutex<SwapchainDx12State>,
}

impl EmberSwapchainDx12 {
    pub fn swapchain_def(&self) -> EmberSwapchainDef {
        self.state.lock().unwrap().swapchain_def.clone()
    }

    pub fn dx12_swap_chain(&self) -> &d3d12::Dx12SwapChain {
        &self.swap_chain
    }

    pub fn multisampled_framebuffer(&self) -> Option<Arc<EmberFramebuffer>> {
        self.state.lock().unwrap().multisampled_framebuffer.clone()
    }

    pub(crate) fn current_back_buffer(&self) -> EmberResult<Arc<Dx12BackBuffer>> {
        let index = self.swap_chain.current_back_buffer_index();
        self.state
            .lock()
            .unwrap()
            .back_buffers
            .get(index as usize)
            .cloned()
            .ok_or_else(|| format!("Swap chain has no back buffer {}", index).into())
    }

    /// The depth buffer drawn to along with the back buffer. Multisampled swapchains keep theirs
    /// in the multisampled framebuffer.
    pub(crate) fn depth_stencil(&self) -> Option<Arc<EmberTexture>> {
        self.state.lock().unwrap().depth_stencil.clone()
    }

    pub fn new(
        device_context: &EmberDeviceContextDx12,
        raw_window_handle: &dyn HasRawWindowHandle,
        swapchain_def: &EmberSwapchainDef,
    ) -> EmberResult<Self> {
        let dxgi_format = d3d12::dxgi_format_for_texels(swapchain_def.format).ok_or_else(|| {
            format!(
                "Format {:?} is not supported by the dx12 backend",
                swapchain_def.format
            )
        })?;

        let swap_chain = device_context.dxgi_factory().create_swap_chain(
            device_context.dx12_queue(),
            raw_window_handle,
            &d3d12::DXGI_SWAP_CHAIN_DESC1 {
                Width: swapchain_def.width,
                Height: swapchain_def.height,
                Format: dxgi_format,
                BufferCount: swapchain_def.image_count,
            },
        )?;

        let state = Self::create_state(device_context, &swap_chain, dxgi_format, swapchain_def)?;

        log::debug!(
            "Created dx12 swapchain {}x{} {:?} {:?} with {} images",
            swapchain_def.width,
            swapchain_def.height,
            swapchain_def.format,
            swapchain_def.sample_count,
            swapchain_def.image_count
        );

        Ok(EmberSwapchainDx12 {
            device_context: device_context.clone(),
            swap_chain,
            dxgi_format,
            state: Mutex::new(state),
        })
    }

    fn create_state(
        device_context: &EmberDeviceContextDx12,
        swap_chain: &d3d12::Dx12SwapChain,
        dxgi_format: d3d12::DXGI_FORMAT,
        swapchain_def: &EmberSwapchainDef,
    ) -> EmberResult<SwapchainDx12State> {
        let device = device_context.dx12_device();
        let mut back_buffers = Vec::with_capacity(swapchain_def.image_count as usize);
        for index in 0..swapchain_def.image_count {
            let resource = swap_chain.buffer(index)?;
            let render_target_view = device_context.descriptor_heaps().rtv_heap.allocate(1)?;
            device.create_render_target_view(
                &resource,
                &d3d12::D3D12_RENDER_TARGET_VIEW_DESC {
                    Format: dxgi_format,
                    MipSlice: 0,
                },
                render_target_view.cpu_handle(0),
            );

            let tracked = device_context
                .resource_state_arena()
                .track(resource, d3d12::D3D12_RESOURCE_STATE_PRESENT);
            back_buffers.push(Arc::new(Dx12BackBuffer {
                tracked,
                render_target_view,
            }));
        }

        let ember_device_context = EmberDeviceContext::Dx12(device_context.clone());
        let multisampled = swapchain_def.sample_count != EmberSampleCount::SampleCount1;

        let multisampled_framebuffer = if multisampled {
            Some(ember_device_context.create_framebuffer(&swapchain_def.multisampled_framebuffer_def())?)
        } else {
            None
        };

        let depth_stencil = match swapchain_def.depth_stencil_format {
            Some(format) if !multisampled => Some(ember_device_context.create_texture(
                &EmberTextureDef {
                    extents: EmberExtents2D {
                        width: swapchain_def.width,
                        height: swapchain_def.height,
                    },
                    mip_count: 1,
                    sample_count: EmberSampleCount::SampleCount1,
                    format,
                    resource_type: EmberResourceType::RENDER_TARGET_DEPTH_STENCIL,
                },
                None,
            )?),
            _ => None,
        };

        Ok(SwapchainDx12State {
            swapchain_def: swapchain_def.clone(),
            back_buffers,
            depth_stencil,
            multisampled_framebuffer,
        })
    }

    pub fn present(&self) -> EmberResult<()> {
        let sync_interval = if self.swapchain_def().enable_vsync { 1 } else { 0 };
        self.swap_chain.present(sync_interval, 0)?;
        Ok(())
    }

    pub fn resize(
        &self,
        swapchain_def: &EmberSwapchainDef,
    ) -> EmberResult<()> {
        // Back buffers cannot be resized while queued work still references them
        self.device_context.wait_for_idle()?;

        let mut state = self.state.lock().unwrap();
        state.back_buffers.clear();
        self.swap_chain.resize_buffers(
            swapchain_def.image_count,
            swapchain_def.width,
            swapchain_def.height,
            self.dxgi_format,
        )?;

        *state = Self::create_state(
            &self.device_context,
            &self.swap_chain,
            self.dxgi_format,
            swapchain_def,
        )?;

        log::debug!(
            "Resized dx12 swapchain to {}x{}",
            swapchain_def.width,
            swapchain_def.height
        );
        Ok(())
    }

    pub fn read_back_buffer(&self) -> EmberResult<Vec<u8>> {
        let swapchain_def = self.swapchain_def();
        let back_buffer = self.current_back_buffer()?;
        let resource = back_buffer.tracked().dx12_resource();

        let device = self.device_context.dx12_device();
        let (footprints, total_size) = device.copyable_footprints(&resource.desc(), 0, 1, 0)?;
        let footprint = footprints[0];
        let readback_buffer = device.create_committed_resource(
            d3d12::D3D12_HEAP_TYPE_READBACK,
            &d3d12::D3D12_RESOURCE_DESC::buffer(total_size),
            d3d12::D3D12_RESOURCE_STATE_COPY_DEST,
        )?;

        self.device_context.execute_immediate(|command_list| {
            back_buffer
                .tracked()
                .transition_all(command_list, d3d12::D3D12_RESOURCE_STATE_COPY_SOURCE);
            command_list.copy_texture_region(
                &d3d12::Dx12CopyLocation::PlacedFootprint {
                    resource: readback_buffer.clone(),
                    footprint: footprint,
                },
                0,
                0,
                &d3d12::Dx12CopyLocation::Subresource {
                    resource: resource.clone(),
                    index: 0,
                },
            );
            back_buffer
                .tracked()
                .transition_all(command_list, d3d12::D3D12_RESOURCE_STATE_PRESENT);
            Ok(())
        })?;

        let texel_size = swapchain_def.format.size_in_bytes()? as usize;
        let texels = unpitch_rows(&readback_buffer.map()?, &footprint, texel_size);
        Ok(texels)
    }
}
