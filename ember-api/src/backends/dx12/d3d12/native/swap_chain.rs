use super::*;
use raw_window_handle::{HasRawWindowHandle, RawWindowHandle};
use std::sync::Mutex;
use windows::core::Interface;
use windows::Win32::Foundation::HWND;

#[derive(Clone, Debug)]
pub struct Dx12Factory {
    factory: dxgi::IDXGIFactory4,
}

unsafe impl Send for Dx12Factory {}
unsafe impl Sync for Dx12Factory {}

pub fn create_factory(debug: bool) -> D3dResult<Dx12Factory> {
    let flags = if debug {
        dxgi::DXGI_CREATE_FACTORY_DEBUG
    } else {
        0
    };

    let factory: dxgi::IDXGIFactory4 = unsafe { dxgi::CreateDXGIFactory2(flags) }?;
    Ok(Dx12Factory { factory })
}

fn native_swap_chain_desc(desc: &DXGI_SWAP_CHAIN_DESC1) -> dxgi::DXGI_SWAP_CHAIN_DESC1 {
    dxgi::DXGI_SWAP_CHAIN_DESC1 {
        Width: desc.Width,
        Height: desc.Height,
        Format: dxgi_format(swap_chain_buffer_format(desc.Format)),
        Stereo: false.into(),
        SampleDesc: dxgi::Common::DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        BufferUsage: dxgi::DXGI_USAGE_RENDER_TARGET_OUTPUT,
        BufferCount: desc.BufferCount,
        Scaling: dxgi::DXGI_SCALING_STRETCH,
        SwapEffect: dxgi::DXGI_SWAP_EFFECT_FLIP_DISCARD,
        AlphaMode: dxgi::Common::DXGI_ALPHA_MODE_UNSPECIFIED,
        Flags: 0,
    }
}

impl Dx12Factory {
    /// Only Win32 windows are supported
    pub fn create_swap_chain(
        &self,
        queue: &Dx12CommandQueue,
        window: &dyn HasRawWindowHandle,
        desc: &DXGI_SWAP_CHAIN_DESC1,
    ) -> D3dResult<Dx12SwapChain> {
        let hwnd = match window.raw_window_handle() {
            RawWindowHandle::Win32(handle) => HWND(handle.hwnd as isize),
            _ => {
                log::error!("DXGI swap chains can only be created for Win32 windows");
                return Err(DXGI_ERROR_INVALID_CALL);
            }
        };

        let native_desc = native_swap_chain_desc(desc);
        let swap_chain: dxgi::IDXGISwapChain3 = unsafe {
            self.factory.CreateSwapChainForHwnd(
                queue.dx12_queue(),
                hwnd,
                &native_desc,
                None,
                None,
            )
        }?
        .cast()?;

        unsafe {
            self.factory
                .MakeWindowAssociation(hwnd, dxgi::DXGI_MWA_NO_ALT_ENTER)
        }?;

        Ok(Dx12SwapChain {
            swap_chain,
            desc: Mutex::new(*desc),
        })
    }
}

pub struct Dx12SwapChain {
    swap_chain: dxgi::IDXGISwapChain3,
    // The requested desc. The buffers may store the non-sRGB variant of its format.
    desc: Mutex<DXGI_SWAP_CHAIN_DESC1>,
}

unsafe impl Send for Dx12SwapChain {}
unsafe impl Sync for Dx12SwapChain {}

impl std::fmt::Debug for Dx12SwapChain {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        f.debug_struct("Dx12SwapChain")
            .field("desc", &*self.desc.lock().unwrap())
            .finish()
    }
}

impl Dx12SwapChain {
    pub fn desc(&self) -> D3dResult<DXGI_SWAP_CHAIN_DESC1> {
        Ok(*self.desc.lock().unwrap())
    }

    pub fn buffer(
        &self,
        index: u32,
    ) -> D3dResult<Dx12Resource> {
        let desc = *self.desc.lock().unwrap();
        let resource: d3d12::ID3D12Resource = unsafe { self.swap_chain.GetBuffer(index) }?;
        let resource_desc = D3D12_RESOURCE_DESC {
            Dimension: D3D12_RESOURCE_DIMENSION_TEXTURE2D,
            Width: desc.Width as u64,
            Height: desc.Height,
            MipLevels: 1,
            Format: desc.Format,
            SampleDesc: Default::default(),
            Flags: D3D12_RESOURCE_FLAG_ALLOW_RENDER_TARGET,
        };

        Ok(Dx12Resource::new(resource, resource_desc))
    }

    pub fn current_back_buffer_index(&self) -> u32 {
        unsafe { self.swap_chain.GetCurrentBackBufferIndex() }
    }

    pub fn present(
        &self,
        sync_interval: u32,
        flags: u32,
    ) -> D3dResult<()> {
        unsafe { self.swap_chain.Present(sync_interval, flags) }.ok()?;
        Ok(())
    }

    /// Fails while any back buffer is still referenced outside the swap chain
    pub fn resize_buffers(
        &self,
        buffer_count: u32,
        width: u32,
        height: u32,
        format: DXGI_FORMAT,
    ) -> D3dResult<()> {
        unsafe {
            self.swap_chain.ResizeBuffers(
                buffer_count,
                width,
                height,
                dxgi_format(swap_chain_buffer_format(format)),
                0,
            )
        }?;

        *self.desc.lock().unwrap() = DXGI_SWAP_CHAIN_DESC1 {
            Width: width,
            Height: height,
            Format: format,
            BufferCount: buffer_count,
        };
        Ok(())
    }
}
