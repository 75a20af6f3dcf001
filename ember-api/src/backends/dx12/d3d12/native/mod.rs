//! Direct3D 12 and DXGI through the `windows` crate.
//!
//! The objects here translate the descriptions in `types` into the native structs and forward
//! them to the driver. Every native call happens inside an `unsafe` block. Errors come back as the
//! HRESULT the driver returned.
use super::types::*;
use windows::Win32::Graphics::Direct3D12 as d3d12;
use windows::Win32::Graphics::Dxgi as dxgi;

mod device;
pub use device::*;

mod resource;
pub use resource::*;

mod command_list;
pub use command_list::*;

mod swap_chain;
pub use swap_chain::*;

pub const INFINITE: u32 = u32::MAX;

impl From<windows::core::Error> for HRESULT {
    fn from(error: windows::core::Error) -> Self {
        HRESULT(error.code().0)
    }
}

/// An auto-reset event
#[derive(Debug)]
pub struct Dx12Event {
    handle: windows::Win32::Foundation::HANDLE,
}

// The event handle may be waited on from any thread
unsafe impl Send for Dx12Event {}
unsafe impl Sync for Dx12Event {}

impl Dx12Event {
    pub fn new() -> D3dResult<Self> {
        let handle =
            unsafe { windows::Win32::System::Threading::CreateEventW(None, false, false, None) }?;
        Ok(Dx12Event { handle })
    }

    /// True once the event is signaled, resetting it. False if the timeout elapses first.
    pub fn wait(
        &self,
        milliseconds: u32,
    ) -> bool {
        let result = unsafe {
            windows::Win32::System::Threading::WaitForSingleObject(self.handle, milliseconds)
        };
        result == windows::Win32::Foundation::WAIT_OBJECT_0
    }

    pub(super) fn handle(&self) -> windows::Win32::Foundation::HANDLE {
        self.handle
    }
}

impl Drop for Dx12Event {
    fn drop(&mut self) {
        unsafe {
            windows::Win32::Foundation::CloseHandle(self.handle);
        }
    }
}

//
// Conversions from the plain descriptions to the native structs
//

fn wchar_to_string(s: &[u16]) -> String {
    let wchar = s.split(|&v| v == 0).next().unwrap_or(&[]);
    String::from_utf16_lossy(wchar)
}

fn utf16_null_terminated(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn dxgi_format(format: DXGI_FORMAT) -> dxgi::Common::DXGI_FORMAT {
    dxgi::Common::DXGI_FORMAT(format as _)
}

fn sample_desc(desc: DXGI_SAMPLE_DESC) -> dxgi::Common::DXGI_SAMPLE_DESC {
    dxgi::Common::DXGI_SAMPLE_DESC {
        Count: desc.Count,
        Quality: desc.Quality,
    }
}

fn resource_states(states: D3D12_RESOURCE_STATES) -> d3d12::D3D12_RESOURCE_STATES {
    d3d12::D3D12_RESOURCE_STATES(states as _)
}

fn resource_desc(desc: &D3D12_RESOURCE_DESC) -> d3d12::D3D12_RESOURCE_DESC {
    let layout = if desc.Dimension == D3D12_RESOURCE_DIMENSION_BUFFER {
        d3d12::D3D12_TEXTURE_LAYOUT_ROW_MAJOR
    } else {
        d3d12::D3D12_TEXTURE_LAYOUT_UNKNOWN
    };

    d3d12::D3D12_RESOURCE_DESC {
        Dimension: d3d12::D3D12_RESOURCE_DIMENSION(desc.Dimension as _),
        Alignment: 0,
        Width: desc.Width,
        Height: desc.Height,
        DepthOrArraySize: 1,
        MipLevels: desc.MipLevels,
        Format: dxgi_format(desc.Format),
        SampleDesc: sample_desc(desc.SampleDesc),
        Layout: layout,
        Flags: d3d12::D3D12_RESOURCE_FLAGS(desc.Flags as _),
    }
}

fn cpu_descriptor_handle(
    handle: D3D12_CPU_DESCRIPTOR_HANDLE
) -> d3d12::D3D12_CPU_DESCRIPTOR_HANDLE {
    d3d12::D3D12_CPU_DESCRIPTOR_HANDLE { ptr: handle.ptr }
}

fn gpu_descriptor_handle(
    handle: D3D12_GPU_DESCRIPTOR_HANDLE
) -> d3d12::D3D12_GPU_DESCRIPTOR_HANDLE {
    d3d12::D3D12_GPU_DESCRIPTOR_HANDLE { ptr: handle.ptr }
}

fn rect(rect: &D3D12_RECT) -> windows::Win32::Foundation::RECT {
    windows::Win32::Foundation::RECT {
        left: rect.left,
        top: rect.top,
        right: rect.right,
        bottom: rect.bottom,
    }
}

fn sampler_desc(desc: &D3D12_SAMPLER_DESC) -> d3d12::D3D12_SAMPLER_DESC {
    d3d12::D3D12_SAMPLER_DESC {
        Filter: d3d12::D3D12_FILTER(desc.Filter as _),
        AddressU: d3d12::D3D12_TEXTURE_ADDRESS_MODE(desc.AddressU as _),
        AddressV: d3d12::D3D12_TEXTURE_ADDRESS_MODE(desc.AddressV as _),
        AddressW: d3d12::D3D12_TEXTURE_ADDRESS_MODE(desc.AddressW as _),
        MipLODBias: desc.MipLODBias,
        MaxAnisotropy: desc.MaxAnisotropy,
        ComparisonFunc: d3d12::D3D12_COMPARISON_FUNC(desc.ComparisonFunc as _),
        BorderColor: desc.BorderColor,
        MinLOD: desc.MinLOD,
        MaxLOD: desc.MaxLOD,
    }
}

fn blend_desc(desc: &D3D12_BLEND_DESC) -> d3d12::D3D12_BLEND_DESC {
    let mut blend_desc = d3d12::D3D12_BLEND_DESC::default();
    blend_desc.AlphaToCoverageEnable = desc.AlphaToCoverageEnable.into();
    blend_desc.IndependentBlendEnable = desc.IndependentBlendEnable.into();
    for (native, target) in blend_desc.RenderTarget.iter_mut().zip(&desc.RenderTarget) {
        native.BlendEnable = target.BlendEnable.into();
        native.LogicOpEnable = false.into();
        native.SrcBlend = d3d12::D3D12_BLEND(target.SrcBlend as _);
        native.DestBlend = d3d12::D3D12_BLEND(target.DestBlend as _);
        native.BlendOp = d3d12::D3D12_BLEND_OP(target.BlendOp as _);
        native.SrcBlendAlpha = d3d12::D3D12_BLEND(target.SrcBlendAlpha as _);
        native.DestBlendAlpha = d3d12::D3D12_BLEND(target.DestBlendAlpha as _);
        native.BlendOpAlpha = d3d12::D3D12_BLEND_OP(target.BlendOpAlpha as _);
        native.LogicOp = d3d12::D3D12_LOGIC_OP_NOOP;
        native.RenderTargetWriteMask = target.RenderTargetWriteMask;
    }

    blend_desc
}

fn rasterizer_desc(
    desc: &D3D12_RASTERIZER_DESC,
    multisample: bool,
) -> d3d12::D3D12_RASTERIZER_DESC {
    d3d12::D3D12_RASTERIZER_DESC {
        FillMode: d3d12::D3D12_FILL_MODE(desc.FillMode as _),
        CullMode: d3d12::D3D12_CULL_MODE(desc.CullMode as _),
        FrontCounterClockwise: desc.FrontCounterClockwise.into(),
        DepthBias: desc.DepthBias,
        DepthBiasClamp: desc.DepthBiasClamp,
        SlopeScaledDepthBias: desc.SlopeScaledDepthBias,
        DepthClipEnable: desc.DepthClipEnable.into(),
        MultisampleEnable: multisample.into(),
        AntialiasedLineEnable: false.into(),
        ForcedSampleCount: 0,
        ConservativeRaster: d3d12::D3D12_CONSERVATIVE_RASTERIZATION_MODE_OFF,
    }
}

fn depth_stencilop_desc(desc: &D3D12_DEPTH_STENCILOP_DESC) -> d3d12::D3D12_DEPTH_STENCILOP_DESC {
    d3d12::D3D12_DEPTH_STENCILOP_DESC {
        StencilFailOp: d3d12::D3D12_STENCIL_OP(desc.StencilFailOp as _),
        StencilDepthFailOp: d3d12::D3D12_STENCIL_OP(desc.StencilDepthFailOp as _),
        StencilPassOp: d3d12::D3D12_STENCIL_OP(desc.StencilPassOp as _),
        StencilFunc: d3d12::D3D12_COMPARISON_FUNC(desc.StencilFunc as _),
    }
}

fn depth_stencil_desc(desc: &D3D12_DEPTH_STENCIL_DESC) -> d3d12::D3D12_DEPTH_STENCIL_DESC {
    d3d12::D3D12_DEPTH_STENCIL_DESC {
        DepthEnable: desc.DepthEnable.into(),
        DepthWriteMask: d3d12::D3D12_DEPTH_WRITE_MASK(desc.DepthWriteMask as _),
        DepthFunc: d3d12::D3D12_COMPARISON_FUNC(desc.DepthFunc as _),
        StencilEnable: desc.StencilEnable.into(),
        StencilReadMask: desc.StencilReadMask,
        StencilWriteMask: desc.StencilWriteMask,
        FrontFace: depth_stencilop_desc(&desc.FrontFace),
        BackFace: depth_stencilop_desc(&desc.BackFace),
    }
}

fn placed_footprint(
    footprint: &D3D12_PLACED_SUBRESOURCE_FOOTPRINT
) -> d3d12::D3D12_PLACED_SUBRESOURCE_FOOTPRINT {
    d3d12::D3D12_PLACED_SUBRESOURCE_FOOTPRINT {
        Offset: footprint.Offset,
        Footprint: d3d12::D3D12_SUBRESOURCE_FOOTPRINT {
            Format: dxgi_format(footprint.Footprint.Format),
            Width: footprint.Footprint.Width,
            Height: footprint.Footprint.Height,
            Depth: 1,
            RowPitch: footprint.Footprint.RowPitch,
        },
    }
}

// Flip model swap chains cannot store sRGB formats. Their render target views still can.
fn swap_chain_buffer_format(format: DXGI_FORMAT) -> DXGI_FORMAT {
    match format {
        DXGI_FORMAT_R8G8B8A8_UNORM_SRGB => DXGI_FORMAT_R8G8B8A8_UNORM,
        DXGI_FORMAT_B8G8R8A8_UNORM_SRGB => DXGI_FORMAT_B8G8R8A8_UNORM,
        format => format,
    }
}

