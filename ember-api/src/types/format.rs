#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::EmberResult;

/// Pixel and vertex attribute formats. The subset supported by every backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
#[allow(non_camel_case_types)]
pub enum EmberFormat {
    UNDEFINED,
    R8_UNORM,
    R8G8_UNORM,
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    B8G8R8A8_UNORM,
    B8G8R8A8_SRGB,
    R16_UINT,
    R32_UINT,
    R32_SFLOAT,
    R32G32_SFLOAT,
    R32G32B32_SFLOAT,
    R32G32B32A32_SFLOAT,
    D32_SFLOAT,
    D24_UNORM_S8_UINT,
    D32_SFLOAT_S8_UINT,
}

impl Default for EmberFormat {
    fn default() -> Self {
        EmberFormat::UNDEFINED
    }
}

/// How the bits of a format are interpreted
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EmberFormatKind {
    Unorm,
    Srgb,
    Uint,
    Float,
    DepthStencil,
}

impl EmberFormat {
    /// Size of a single pixel (or vertex attribute) in bytes. Undefined formats have no size.
    pub fn size_in_bytes(self) -> EmberResult<u32> {
        let size = match self {
            EmberFormat::UNDEFINED => {
                return Err("Cannot query the size of EmberFormat::UNDEFINED")?;
            }
            EmberFormat::R8_UNORM => 1,
            EmberFormat::R8G8_UNORM => 2,
            EmberFormat::R8G8B8A8_UNORM
            | EmberFormat::R8G8B8A8_SRGB
            | EmberFormat::B8G8R8A8_UNORM
            | EmberFormat::B8G8R8A8_SRGB => 4,
            EmberFormat::R16_UINT => 2,
            EmberFormat::R32_UINT | EmberFormat::R32_SFLOAT => 4,
            EmberFormat::R32G32_SFLOAT => 8,
            EmberFormat::R32G32B32_SFLOAT => 12,
            EmberFormat::R32G32B32A32_SFLOAT => 16,
            EmberFormat::D32_SFLOAT => 4,
            EmberFormat::D24_UNORM_S8_UINT => 4,
            EmberFormat::D32_SFLOAT_S8_UINT => 8,
        };

        Ok(size)
    }

    /// Number of channels. Depth/stencil formats count depth and stencil separately.
    pub fn channel_count(self) -> EmberResult<u32> {
        let count = match self {
            EmberFormat::UNDEFINED => {
                return Err("Cannot query the channel count of EmberFormat::UNDEFINED")?;
            }
            EmberFormat::R8_UNORM
            | EmberFormat::R16_UINT
            | EmberFormat::R32_UINT
            | EmberFormat::R32_SFLOAT
            | EmberFormat::D32_SFLOAT => 1,
            EmberFormat::R8G8_UNORM
            | EmberFormat::R32G32_SFLOAT
            | EmberFormat::D24_UNORM_S8_UINT
            | EmberFormat::D32_SFLOAT_S8_UINT => 2,
            EmberFormat::R32G32B32_SFLOAT => 3,
            EmberFormat::R8G8B8A8_UNORM
            | EmberFormat::R8G8B8A8_SRGB
            | EmberFormat::B8G8R8A8_UNORM
            | EmberFormat::B8G8R8A8_SRGB
            | EmberFormat::R32G32B32A32_SFLOAT => 4,
        };

        Ok(count)
    }

    pub fn kind(self) -> EmberResult<EmberFormatKind> {
        let kind = match self {
            EmberFormat::UNDEFINED => {
                return Err("Cannot query the kind of EmberFormat::UNDEFINED")?;
            }
            EmberFormat::R8_UNORM
            | EmberFormat::R8G8_UNORM
            | EmberFormat::R8G8B8A8_UNORM
            | EmberFormat::B8G8R8A8_UNORM => EmberFormatKind::Unorm,
            EmberFormat::R8G8B8A8_SRGB | EmberFormat::B8G8R8A8_SRGB => EmberFormatKind::Srgb,
            EmberFormat::R16_UINT | EmberFormat::R32_UINT => EmberFormatKind::Uint,
            EmberFormat::R32_SFLOAT
            | EmberFormat::R32G32_SFLOAT
            | EmberFormat::R32G32B32_SFLOAT
            | EmberFormat::R32G32B32A32_SFLOAT => EmberFormatKind::Float,
            EmberFormat::D32_SFLOAT
            | EmberFormat::D24_UNORM_S8_UINT
            | EmberFormat::D32_SFLOAT_S8_UINT => EmberFormatKind::DepthStencil,
        };

        Ok(kind)
    }

    pub fn is_depth(self) -> bool {
        match self {
            EmberFormat::D32_SFLOAT
            | EmberFormat::D24_UNORM_S8_UINT
            | EmberFormat::D32_SFLOAT_S8_UINT => true,
            _ => false,
        }
    }

    pub fn has_stencil(self) -> bool {
        match self {
            EmberFormat::D24_UNORM_S8_UINT | EmberFormat::D32_SFLOAT_S8_UINT => true,
            _ => false,
        }
    }

    pub fn is_srgb(self) -> bool {
        match self {
            EmberFormat::R8G8B8A8_SRGB | EmberFormat::B8G8R8A8_SRGB => true,
            _ => false,
        }
    }

    /// True for formats that can be used as a color attachment
    pub fn is_color_renderable(self) -> bool {
        match self {
            EmberFormat::R8_UNORM
            | EmberFormat::R8G8_UNORM
            | EmberFormat::R8G8B8A8_UNORM
            | EmberFormat::R8G8B8A8_SRGB
            | EmberFormat::B8G8R8A8_UNORM
            | EmberFormat::B8G8R8A8_SRGB
            | EmberFormat::R32_SFLOAT
            | EmberFormat::R32G32_SFLOAT
            | EmberFormat::R32G32B32A32_SFLOAT => true,
            _ => false,
        }
    }
}
