use crate::EmberFormat;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HRESULT(pub i32);

impl HRESULT {
    pub fn is_ok(self) -> bool {
        self.0 >= 0
    }
}

impl std::fmt::Display for HRESULT {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

pub const S_OK: HRESULT = HRESULT(0);
pub const E_FAIL: HRESULT = HRESULT(0x80004005u32 as i32);
pub const E_INVALIDARG: HRESULT = HRESULT(0x80070057u32 as i32);
pub const E_OUTOFMEMORY: HRESULT = HRESULT(0x8007000Eu32 as i32);
pub const DXGI_ERROR_INVALID_CALL: HRESULT = HRESULT(0x887A0001u32 as i32);
pub const DXGI_ERROR_DEVICE_REMOVED: HRESULT = HRESULT(0x887A0005u32 as i32);
pub const DXGI_ERROR_WAIT_TIMEOUT: HRESULT = HRESULT(0x887A0027u32 as i32);

pub type D3dResult<T> = Result<T, HRESULT>;

//
// Formats
//

pub type DXGI_FORMAT = u32;
pub const DXGI_FORMAT_UNKNOWN: DXGI_FORMAT = 0;
pub const DXGI_FORMAT_R32G32B32A32_FLOAT: DXGI_FORMAT = 2;
pub const DXGI_FORMAT_R32G32B32_FLOAT: DXGI_FORMAT = 6;
pub const DXGI_FORMAT_R32G32_FLOAT: DXGI_FORMAT = 16;
pub const DXGI_FORMAT_D32_FLOAT_S8X24_UINT: DXGI_FORMAT = 20;
pub const DXGI_FORMAT_R8G8B8A8_UNORM: DXGI_FORMAT = 28;
pub const DXGI_FORMAT_R8G8B8A8_UNORM_SRGB: DXGI_FORMAT = 29;
pub const DXGI_FORMAT_D32_FLOAT: DXGI_FORMAT = 40;
pub const DXGI_FORMAT_R32_FLOAT: DXGI_FORMAT = 41;
pub const DXGI_FORMAT_R32_UINT: DXGI_FORMAT = 42;
pub const DXGI_FORMAT_D24_UNORM_S8_UINT: DXGI_FORMAT = 45;
pub const DXGI_FORMAT_R8G8_UNORM: DXGI_FORMAT = 49;
pub const DXGI_FORMAT_R16_UINT: DXGI_FORMAT = 57;
pub const DXGI_FORMAT_R8_UNORM: DXGI_FORMAT = 61;
pub const DXGI_FORMAT_B8G8R8A8_UNORM: DXGI_FORMAT = 87;
pub const DXGI_FORMAT_B8G8R8A8_UNORM_SRGB: DXGI_FORMAT = 91;

// Every format the device can store, paired with the texel layout it is stored with
const DXGI_TEXEL_FORMATS: [(DXGI_FORMAT, EmberFormat); 15] = [
    (DXGI_FORMAT_R32G32B32A32_FLOAT, EmberFormat::R32G32B32A32_SFLOAT),
    (DXGI_FORMAT_R32G32B32_FLOAT, EmberFormat::R32G32B32_SFLOAT),
    (DXGI_FORMAT_R32G32_FLOAT, EmberFormat::R32G32_SFLOAT),
    (DXGI_FORMAT_D32_FLOAT_S8X24_UINT, EmberFormat::D32_SFLOAT_S8_UINT),
    (DXGI_FORMAT_R8G8B8A8_UNORM, EmberFormat::R8G8B8A8_UNORM),
    (DXGI_FORMAT_R8G8B8A8_UNORM_SRGB, EmberFormat::R8G8B8A8_SRGB),
    (DXGI_FORMAT_D32_FLOAT, EmberFormat::D32_SFLOAT),
    (DXGI_FORMAT_R32_FLOAT, EmberFormat::R32_SFLOAT),
    (DXGI_FORMAT_R32_UINT, EmberFormat::R32_UINT),
    (DXGI_FORMAT_D24_UNORM_S8_UINT, EmberFormat::D24_UNORM_S8_UINT),
    (DXGI_FORMAT_R8G8_UNORM, EmberFormat::R8G8_UNORM),
    (DXGI_FORMAT_R16_UINT, EmberFormat::R16_UINT),
    (DXGI_FORMAT_R8_UNORM, EmberFormat::R8_UNORM),
    (DXGI_FORMAT_B8G8R8A8_UNORM, EmberFormat::B8G8R8A8_UNORM),
    (DXGI_FORMAT_B8G8R8A8_UNORM_SRGB, EmberFormat::B8G8R8A8_SRGB),
];

/// The texel layout a DXGI format is stored with. None for formats the device cannot store.
pub(crate) fn dxgi_texel_format(format: DXGI_FORMAT) -> Option<EmberFormat> {
    DXGI_TEXEL_FORMATS
        .iter()
        .find(|(dxgi_format, _)| *dxgi_format == format)
        .map(|(_, texel_format)| *texel_format)
}

pub(crate) fn dxgi_format_for_texels(format: EmberFormat) -> Option<DXGI_FORMAT> {
    DXGI_TEXEL_FORMATS
        .iter()
        .find(|(_, texel_format)| *texel_format == format)
        .map(|(dxgi_format, _)| *dxgi_format)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DXGI_SAMPLE_DESC {
    pub Count: u32,
    pub Quality: u32,
}

impl Default for DXGI_SAMPLE_DESC {
    fn default() -> Self {
        DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        }
    }
}

//
// Resources
//

pub type D3D12_RESOURCE_STATES = u32;
pub const D3D12_RESOURCE_STATE_COMMON: D3D12_RESOURCE_STATES = 0;
pub const D3D12_RESOURCE_STATE_VERTEX_AND_CONSTANT_BUFFER: D3D12_RESOURCE_STATES = 0x1;
pub const D3D12_RESOURCE_STATE_INDEX_BUFFER: D3D12_RESOURCE_STATES = 0x2;
pub const D3D12_RESOURCE_STATE_RENDER_TARGET: D3D12_RESOURCE_STATES = 0x4;
pub const D3D12_RESOURCE_STATE_UNORDERED_ACCESS: D3D12_RESOURCE_STATES = 0x8;
pub const D3D12_RESOURCE_STATE_DEPTH_WRITE: D3D12_RESOURCE_STATES = 0x10;
pub const D3D12_RESOURCE_STATE_DEPTH_READ: D3D12_RESOURCE_STATES = 0x20;
pub const D3D12_RESOURCE_STATE_NON_PIXEL_SHADER_RESOURCE: D3D12_RESOURCE_STATES = 0x40;
pub const D3D12_RESOURCE_STATE_PIXEL_SHADER_RESOURCE: D3D12_RESOURCE_STATES = 0x80;
pub const D3D12_RESOURCE_STATE_STREAM_OUT: D3D12_RESOURCE_STATES = 0x100;
pub const D3D12_RESOURCE_STATE_INDIRECT_ARGUMENT: D3D12_RESOURCE_STATES = 0x200;
pub const D3D12_RESOURCE_STATE_COPY_DEST: D3D12_RESOURCE_STATES = 0x400;
pub const D3D12_RESOURCE_STATE_COPY_SOURCE: D3D12_RESOURCE_STATES = 0x800;
pub const D3D12_RESOURCE_STATE_RESOLVE_DEST: D3D12_RESOURCE_STATES = 0x1000;
pub const D3D12_RESOURCE_STATE_RESOLVE_SOURCE: D3D12_RESOURCE_STATES = 0x2000;
pub const D3D12_RESOURCE_STATE_GENERIC_READ: D3D12_RESOURCE_STATES = 0xAC3;
pub const D3D12_RESOURCE_STATE_PRESENT: D3D12_RESOURCE_STATES = 0;

pub const D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES: u32 = 0xffff_ffff;

pub type D3D12_HEAP_TYPE = u32;
pub const D3D12_HEAP_TYPE_DEFAULT: D3D12_HEAP_TYPE = 1;
pub const D3D12_HEAP_TYPE_UPLOAD: D3D12_HEAP_TYPE = 2;
pub const D3D12_HEAP_TYPE_READBACK: D3D12_HEAP_TYPE = 3;

pub type D3D12_RESOURCE_DIMENSION = u32;
pub const D3D12_RESOURCE_DIMENSION_BUFFER: D3D12_RESOURCE_DIMENSION = 1;
pub const D3D12_RESOURCE_DIMENSION_TEXTURE2D: D3D12_RESOURCE_DIMENSION = 3;

pub type D3D12_RESOURCE_FLAGS = u32;
pub const D3D12_RESOURCE_FLAG_NONE: D3D12_RESOURCE_FLAGS = 0;
pub const D3D12_RESOURCE_FLAG_ALLOW_RENDER_TARGET: D3D12_RESOURCE_FLAGS = 0x1;
pub const D3D12_RESOURCE_FLAG_ALLOW_DEPTH_STENCIL: D3D12_RESOURCE_FLAGS = 0x2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct D3D12_RESOURCE_DESC {
    pub Dimension: D3D12_RESOURCE_DIMENSION,
    /// Bytes for buffers, texels for textures
    pub Width: u64,
    pub Height: u32,
    pub MipLevels: u16,
    pub Format: DXGI_FORMAT,
    pub SampleDesc: DXGI_SAMPLE_DESC,
    pub Flags: D3D12_RESOURCE_FLAGS,
}

impl D3D12_RESOURCE_DESC {
    pub fn buffer(size: u64) -> Self {
        D3D12_RESOURCE_DESC {
            Dimension: D3D12_RESOURCE_DIMENSION_BUFFER,
            Width: size,
            Height: 1,
            MipLevels: 1,
            Format: DXGI_FORMAT_UNKNOWN,
            SampleDesc: Default::default(),
            Flags: D3D12_RESOURCE_FLAG_NONE,
        }
    }

    pub fn subresource_count(&self) -> u32 {
        match self.Dimension {
            D3D12_RESOURCE_DIMENSION_TEXTURE2D => self.MipLevels as u32,
            _ => 1,
        }
    }
}

pub type D3D12_GPU_VIRTUAL_ADDRESS = u64;

//
// Descriptors
//

pub type D3D12_DESCRIPTOR_HEAP_TYPE = u32;
pub const D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV: D3D12_DESCRIPTOR_HEAP_TYPE = 0;
pub const D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER: D3D12_DESCRIPTOR_HEAP_TYPE = 1;
pub const D3D12_DESCRIPTOR_HEAP_TYPE_RTV: D3D12_DESCRIPTOR_HEAP_TYPE = 2;
pub const D3D12_DESCRIPTOR_HEAP_TYPE_DSV: D3D12_DESCRIPTOR_HEAP_TYPE = 3;

pub type D3D12_DESCRIPTOR_HEAP_FLAGS = u32;
pub const D3D12_DESCRIPTOR_HEAP_FLAG_NONE: D3D12_DESCRIPTOR_HEAP_FLAGS = 0;
pub const D3D12_DESCRIPTOR_HEAP_FLAG_SHADER_VISIBLE: D3D12_DESCRIPTOR_HEAP_FLAGS = 0x1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct D3D12_DESCRIPTOR_HEAP_DESC {
    pub Type: D3D12_DESCRIPTOR_HEAP_TYPE,
    pub NumDescriptors: u32,
    pub Flags: D3D12_DESCRIPTOR_HEAP_FLAGS,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct D3D12_CPU_DESCRIPTOR_HANDLE {
    pub ptr: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct D3D12_GPU_DESCRIPTOR_HANDLE {
    pub ptr: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct D3D12_CONSTANT_BUFFER_VIEW_DESC {
    pub BufferLocation: D3D12_GPU_VIRTUAL_ADDRESS,
    pub SizeInBytes: u32,
}

/// Only 2D texture views are supported
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct D3D12_SHADER_RESOURCE_VIEW_DESC {
    pub Format: DXGI_FORMAT,
    pub MostDetailedMip: u32,
    pub MipLevels: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct D3D12_RENDER_TARGET_VIEW_DESC {
    pub Format: DXGI_FORMAT,
    pub MipSlice: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct D3D12_DEPTH_STENCIL_VIEW_DESC {
    pub Format: DXGI_FORMAT,
    pub MipSlice: u32,
}

pub type D3D12_FILTER = u32;
pub const D3D12_FILTER_MIP_LINEAR: D3D12_FILTER = 0x1;
pub const D3D12_FILTER_MAG_LINEAR: D3D12_FILTER = 0x4;
pub const D3D12_FILTER_MIN_LINEAR: D3D12_FILTER = 0x10;
pub const D3D12_FILTER_MIN_MAG_MIP_POINT: D3D12_FILTER = 0;

pub type D3D12_TEXTURE_ADDRESS_MODE = u32;
pub const D3D12_TEXTURE_ADDRESS_MODE_WRAP: D3D12_TEXTURE_ADDRESS_MODE = 1;
pub const D3D12_TEXTURE_ADDRESS_MODE_MIRROR: D3D12_TEXTURE_ADDRESS_MODE = 2;
pub const D3D12_TEXTURE_ADDRESS_MODE_CLAMP: D3D12_TEXTURE_ADDRESS_MODE = 3;
pub const D3D12_TEXTURE_ADDRESS_MODE_BORDER: D3D12_TEXTURE_ADDRESS_MODE = 4;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct D3D12_SAMPLER_DESC {
    pub Filter: D3D12_FILTER,
    pub AddressU: D3D12_TEXTURE_ADDRESS_MODE,
    pub AddressV: D3D12_TEXTURE_ADDRESS_MODE,
    pub AddressW: D3D12_TEXTURE_ADDRESS_MODE,
    pub MipLODBias: f32,
    pub MaxAnisotropy: u32,
    pub ComparisonFunc: D3D12_COMPARISON_FUNC,
    pub BorderColor: [f32; 4],
    pub MinLOD: f32,
    pub MaxLOD: f32,
}

//
// Root signatures
//

pub type D3D12_DESCRIPTOR_RANGE_TYPE = u32;
pub const D3D12_DESCRIPTOR_RANGE_TYPE_SRV: D3D12_DESCRIPTOR_RANGE_TYPE = 0;
pub const D3D12_DESCRIPTOR_RANGE_TYPE_UAV: D3D12_DESCRIPTOR_RANGE_TYPE = 1;
pub const D3D12_DESCRIPTOR_RANGE_TYPE_CBV: D3D12_DESCRIPTOR_RANGE_TYPE = 2;
pub const D3D12_DESCRIPTOR_RANGE_TYPE_SAMPLER: D3D12_DESCRIPTOR_RANGE_TYPE = 3;

pub const D3D12_DESCRIPTOR_RANGE_OFFSET_APPEND: u32 = 0xffff_ffff;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct D3D12_DESCRIPTOR_RANGE {
    pub RangeType: D3D12_DESCRIPTOR_RANGE_TYPE,
    pub NumDescriptors: u32,
    pub BaseShaderRegister: u32,
    pub RegisterSpace: u32,
    pub OffsetInDescriptorsFromTableStart: u32,
}

pub type D3D12_SHADER_VISIBILITY = u32;
pub const D3D12_SHADER_VISIBILITY_ALL: D3D12_SHADER_VISIBILITY = 0;
pub const D3D12_SHADER_VISIBILITY_VERTEX: D3D12_SHADER_VISIBILITY = 1;
pub const D3D12_SHADER_VISIBILITY_PIXEL: D3D12_SHADER_VISIBILITY = 5;

/// Only descriptor table parameters are supported
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dx12RootParameter {
    pub DescriptorRanges: Vec<D3D12_DESCRIPTOR_RANGE>,
    pub ShaderVisibility: D3D12_SHADER_VISIBILITY,
}

pub type D3D12_ROOT_SIGNATURE_FLAGS = u32;
pub const D3D12_ROOT_SIGNATURE_FLAG_NONE: D3D12_ROOT_SIGNATURE_FLAGS = 0;
pub const D3D12_ROOT_SIGNATURE_FLAG_ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT: D3D12_ROOT_SIGNATURE_FLAGS =
    0x1;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Dx12RootSignatureDesc {
    pub Parameters: Vec<Dx12RootParameter>,
    pub Flags: D3D12_ROOT_SIGNATURE_FLAGS,
}

//
// Pipeline state
//

pub type D3D12_BLEND = u32;
pub const D3D12_BLEND_ZERO: D3D12_BLEND = 1;
pub const D3D12_BLEND_ONE: D3D12_BLEND = 2;
pub const D3D12_BLEND_SRC_COLOR: D3D12_BLEND = 3;
pub const D3D12_BLEND_INV_SRC_COLOR: D3D12_BLEND = 4;
pub const D3D12_BLEND_SRC_ALPHA: D3D12_BLEND = 5;
pub const D3D12_BLEND_INV_SRC_ALPHA: D3D12_BLEND = 6;
pub const D3D12_BLEND_DEST_ALPHA: D3D12_BLEND = 7;
pub const D3D12_BLEND_INV_DEST_ALPHA: D3D12_BLEND = 8;
pub const D3D12_BLEND_DEST_COLOR: D3D12_BLEND = 9;
pub const D3D12_BLEND_INV_DEST_COLOR: D3D12_BLEND = 10;
pub const D3D12_BLEND_SRC_ALPHA_SAT: D3D12_BLEND = 11;
pub const D3D12_BLEND_BLEND_FACTOR: D3D12_BLEND = 14;
pub const D3D12_BLEND_INV_BLEND_FACTOR: D3D12_BLEND = 15;

pub type D3D12_BLEND_OP = u32;
pub const D3D12_BLEND_OP_ADD: D3D12_BLEND_OP = 1;
pub const D3D12_BLEND_OP_SUBTRACT: D3D12_BLEND_OP = 2;
pub const D3D12_BLEND_OP_REV_SUBTRACT: D3D12_BLEND_OP = 3;
pub const D3D12_BLEND_OP_MIN: D3D12_BLEND_OP = 4;
pub const D3D12_BLEND_OP_MAX: D3D12_BLEND_OP = 5;

pub type D3D12_COMPARISON_FUNC = u32;
pub const D3D12_COMPARISON_FUNC_NEVER: D3D12_COMPARISON_FUNC = 1;
pub const D3D12_COMPARISON_FUNC_LESS: D3D12_COMPARISON_FUNC = 2;
pub const D3D12_COMPARISON_FUNC_EQUAL: D3D12_COMPARISON_FUNC = 3;
pub const D3D12_COMPARISON_FUNC_LESS_EQUAL: D3D12_COMPARISON_FUNC = 4;
pub const D3D12_COMPARISON_FUNC_GREATER: D3D12_COMPARISON_FUNC = 5;
pub const D3D12_COMPARISON_FUNC_NOT_EQUAL: D3D12_COMPARISON_FUNC = 6;
pub const D3D12_COMPARISON_FUNC_GREATER_EQUAL: D3D12_COMPARISON_FUNC = 7;
pub const D3D12_COMPARISON_FUNC_ALWAYS: D3D12_COMPARISON_FUNC = 8;

pub type D3D12_STENCIL_OP = u32;
pub const D3D12_STENCIL_OP_KEEP: D3D12_STENCIL_OP = 1;
pub const D3D12_STENCIL_OP_ZERO: D3D12_STENCIL_OP = 2;
pub const D3D12_STENCIL_OP_REPLACE: D3D12_STENCIL_OP = 3;
pub const D3D12_STENCIL_OP_INCR_SAT: D3D12_STENCIL_OP = 4;
pub const D3D12_STENCIL_OP_DECR_SAT: D3D12_STENCIL_OP = 5;
pub const D3D12_STENCIL_OP_INVERT: D3D12_STENCIL_OP = 6;
pub const D3D12_STENCIL_OP_INCR: D3D12_STENCIL_OP = 7;
pub const D3D12_STENCIL_OP_DECR: D3D12_STENCIL_OP = 8;

pub type D3D12_CULL_MODE = u32;
pub const D3D12_CULL_MODE_NONE: D3D12_CULL_MODE = 1;
pub const D3D12_CULL_MODE_FRONT: D3D12_CULL_MODE = 2;
pub const D3D12_CULL_MODE_BACK: D3D12_CULL_MODE = 3;

pub type D3D12_FILL_MODE = u32;
pub const D3D12_FILL_MODE_WIREFRAME: D3D12_FILL_MODE = 2;
pub const D3D12_FILL_MODE_SOLID: D3D12_FILL_MODE = 3;

pub type D3D12_DEPTH_WRITE_MASK = u32;
pub const D3D12_DEPTH_WRITE_MASK_ZERO: D3D12_DEPTH_WRITE_MASK = 0;
pub const D3D12_DEPTH_WRITE_MASK_ALL: D3D12_DEPTH_WRITE_MASK = 1;

pub const D3D12_COLOR_WRITE_ENABLE_ALL: u8 = 0xF;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct D3D12_RENDER_TARGET_BLEND_DESC {
    pub BlendEnable: bool,
    pub SrcBlend: D3D12_BLEND,
    pub DestBlend: D3D12_BLEND,
    pub BlendOp: D3D12_BLEND_OP,
    pub SrcBlendAlpha: D3D12_BLEND,
    pub DestBlendAlpha: D3D12_BLEND,
    pub BlendOpAlpha: D3D12_BLEND_OP,
    pub RenderTargetWriteMask: u8,
}

impl Default for D3D12_RENDER_TARGET_BLEND_DESC {
    fn default() -> Self {
        D3D12_RENDER_TARGET_BLEND_DESC {
            BlendEnable: false,
            SrcBlend: D3D12_BLEND_ONE,
            DestBlend: D3D12_BLEND_ZERO,
            BlendOp: D3D12_BLEND_OP_ADD,
            SrcBlendAlpha: D3D12_BLEND_ONE,
            DestBlendAlpha: D3D12_BLEND_ZERO,
            BlendOpAlpha: D3D12_BLEND_OP_ADD,
            RenderTargetWriteMask: D3D12_COLOR_WRITE_ENABLE_ALL,
        }
    }
}

pub const D3D12_SIMULTANEOUS_RENDER_TARGET_COUNT: usize = 8;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct D3D12_BLEND_DESC {
    pub AlphaToCoverageEnable: bool,
    pub IndependentBlendEnable: bool,
    pub RenderTarget: [D3D12_RENDER_TARGET_BLEND_DESC; D3D12_SIMULTANEOUS_RENDER_TARGET_COUNT],
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct D3D12_RASTERIZER_DESC {
    pub FillMode: D3D12_FILL_MODE,
    pub CullMode: D3D12_CULL_MODE,
    pub FrontCounterClockwise: bool,
    pub DepthBias: i32,
    pub DepthBiasClamp: f32,
    pub SlopeScaledDepthBias: f32,
    pub DepthClipEnable: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct D3D12_DEPTH_STENCILOP_DESC {
    pub StencilFailOp: D3D12_STENCIL_OP,
    pub StencilDepthFailOp: D3D12_STENCIL_OP,
    pub StencilPassOp: D3D12_STENCIL_OP,
    pub StencilFunc: D3D12_COMPARISON_FUNC,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct D3D12_DEPTH_STENCIL_DESC {
    pub DepthEnable: bool,
    pub DepthWriteMask: D3D12_DEPTH_WRITE_MASK,
    pub DepthFunc: D3D12_COMPARISON_FUNC,
    pub StencilEnable: bool,
    pub StencilReadMask: u8,
    pub StencilWriteMask: u8,
    pub FrontFace: D3D12_DEPTH_STENCILOP_DESC,
    pub BackFace: D3D12_DEPTH_STENCILOP_DESC,
}

pub type D3D12_INPUT_CLASSIFICATION = u32;
pub const D3D12_INPUT_CLASSIFICATION_PER_VERTEX_DATA: D3D12_INPUT_CLASSIFICATION = 0;
pub const D3D12_INPUT_CLASSIFICATION_PER_INSTANCE_DATA: D3D12_INPUT_CLASSIFICATION = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dx12InputElement {
    pub SemanticName: String,
    pub SemanticIndex: u32,
    pub Format: DXGI_FORMAT,
    pub InputSlot: u32,
    pub AlignedByteOffset: u32,
    pub InputSlotClass: D3D12_INPUT_CLASSIFICATION,
    pub InstanceDataStepRate: u32,
}

pub type D3D12_PRIMITIVE_TOPOLOGY_TYPE = u32;
pub const D3D12_PRIMITIVE_TOPOLOGY_TYPE_POINT: D3D12_PRIMITIVE_TOPOLOGY_TYPE = 1;
pub const D3D12_PRIMITIVE_TOPOLOGY_TYPE_LINE: D3D12_PRIMITIVE_TOPOLOGY_TYPE = 2;
pub const D3D12_PRIMITIVE_TOPOLOGY_TYPE_TRIANGLE: D3D12_PRIMITIVE_TOPOLOGY_TYPE = 3;

pub type D3D_PRIMITIVE_TOPOLOGY = u32;
pub const D3D_PRIMITIVE_TOPOLOGY_UNDEFINED: D3D_PRIMITIVE_TOPOLOGY = 0;
pub const D3D_PRIMITIVE_TOPOLOGY_POINTLIST: D3D_PRIMITIVE_TOPOLOGY = 1;
pub const D3D_PRIMITIVE_TOPOLOGY_LINELIST: D3D_PRIMITIVE_TOPOLOGY = 2;
pub const D3D_PRIMITIVE_TOPOLOGY_LINESTRIP: D3D_PRIMITIVE_TOPOLOGY = 3;
pub const D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST: D3D_PRIMITIVE_TOPOLOGY = 4;
pub const D3D_PRIMITIVE_TOPOLOGY_TRIANGLESTRIP: D3D_PRIMITIVE_TOPOLOGY = 5;

#[derive(Clone, Debug)]
pub struct Dx12GraphicsPipelineDesc {
    pub pRootSignature: Option<super::Dx12RootSignature>,
    /// Compiled vertex shader bytecode
    pub VS: Vec<u8>,
    /// Compiled pixel shader bytecode
    pub PS: Vec<u8>,
    pub BlendState: D3D12_BLEND_DESC,
    pub SampleMask: u32,
    pub RasterizerState: D3D12_RASTERIZER_DESC,
    pub DepthStencilState: D3D12_DEPTH_STENCIL_DESC,
    pub InputLayout: Vec<Dx12InputElement>,
    pub PrimitiveTopologyType: D3D12_PRIMITIVE_TOPOLOGY_TYPE,
    pub NumRenderTargets: u32,
    pub RTVFormats: [DXGI_FORMAT; D3D12_SIMULTANEOUS_RENDER_TARGET_COUNT],
    pub DSVFormat: DXGI_FORMAT,
    pub SampleDesc: DXGI_SAMPLE_DESC,
}

//
// Command list parameters
//

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct D3D12_VERTEX_BUFFER_VIEW {
    pub BufferLocation: D3D12_GPU_VIRTUAL_ADDRESS,
    pub SizeInBytes: u32,
    pub StrideInBytes: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct D3D12_INDEX_BUFFER_VIEW {
    pub BufferLocation: D3D12_GPU_VIRTUAL_ADDRESS,
    pub SizeInBytes: u32,
    /// DXGI_FORMAT_R16_UINT or DXGI_FORMAT_R32_UINT
    pub Format: DXGI_FORMAT,
}

#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct D3D12_VIEWPORT {
    pub TopLeftX: f32,
    pub TopLeftY: f32,
    pub Width: f32,
    pub Height: f32,
    pub MinDepth: f32,
    pub MaxDepth: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct D3D12_RECT {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

pub type D3D12_CLEAR_FLAGS = u32;
pub const D3D12_CLEAR_FLAG_DEPTH: D3D12_CLEAR_FLAGS = 0x1;
pub const D3D12_CLEAR_FLAG_STENCIL: D3D12_CLEAR_FLAGS = 0x2;

/// A transition of one subresource, a run of consecutive subresources, or the whole resource
#[derive(Clone, Debug)]
pub struct Dx12TransitionBarrier {
    pub resource: super::Dx12Resource,
    /// First subresource, or D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES
    pub subresource: u32,
    /// Ignored when every subresource transitions
    pub subresource_count: u32,
    pub state_before: D3D12_RESOURCE_STATES,
    pub state_after: D3D12_RESOURCE_STATES,
}

impl Dx12TransitionBarrier {
    pub(crate) fn subresources(&self) -> std::ops::Range<u32> {
        if self.subresource == D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES {
            0..self.resource.desc().subresource_count()
        } else {
            self.subresource..self.subresource + self.subresource_count.max(1)
        }
    }
}

pub const D3D12_TEXTURE_DATA_PITCH_ALIGNMENT: u32 = 256;
pub const D3D12_TEXTURE_DATA_PLACEMENT_ALIGNMENT: u64 = 512;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct D3D12_SUBRESOURCE_FOOTPRINT {
    pub Format: DXGI_FORMAT,
    pub Width: u32,
    pub Height: u32,
    pub RowPitch: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct D3D12_PLACED_SUBRESOURCE_FOOTPRINT {
    pub Offset: u64,
    pub Footprint: D3D12_SUBRESOURCE_FOOTPRINT,
}

#[derive(Clone, Debug)]
pub enum Dx12CopyLocation {
    Subresource {
        resource: super::Dx12Resource,
        index: u32,
    },
    PlacedFootprint {
        resource: super::Dx12Resource,
        footprint: D3D12_PLACED_SUBRESOURCE_FOOTPRINT,
    },
}

impl Dx12CopyLocation {
    pub(crate) fn resource(&self) -> &super::Dx12Resource {
        match self {
            Dx12CopyLocation::Subresource { resource, .. } => resource,
            Dx12CopyLocation::PlacedFootprint { resource, .. } => resource,
        }
    }
}

//
// Queries
//

pub type D3D12_QUERY_HEAP_TYPE = u32;
pub const D3D12_QUERY_HEAP_TYPE_TIMESTAMP: D3D12_QUERY_HEAP_TYPE = 1;

pub type D3D12_QUERY_TYPE = u32;
pub const D3D12_QUERY_TYPE_TIMESTAMP: D3D12_QUERY_TYPE = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct D3D12_QUERY_HEAP_DESC {
    pub Type: D3D12_QUERY_HEAP_TYPE,
    pub Count: u32,
}

//
// Swap chains
//

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DXGI_SWAP_CHAIN_DESC1 {
    pub Width: u32,
    pub Height: u32,
    pub Format: DXGI_FORMAT,
    pub BufferCount: u32,
}

pub const DXGI_PRESENT_DO_NOT_WAIT: u32 = 0x8;
