pub mod gl43;

#[cfg(not(test))]
mod native;
#[cfg(not(test))]
pub use native::*;

#[cfg(test)]
pub use software::*;

use crate::EmberFormat;
use fnv::FnvHasher;
use gl43::{GLenum, GLuint};
use raw_window_handle::HasRawWindowHandle;
use std::hash::{Hash, Hasher};

pub fn calculate_window_hash(window: &dyn HasRawWindowHandle) -> WindowHash {
    let mut hasher = FnvHasher::default();
    window.raw_window_handle().hash(&mut hasher);
    WindowHash(hasher.finish())
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct WindowHash(u64);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub GLuint);
pub const NONE_BUFFER: BufferId = BufferId(gl43::NONE);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub GLuint);
pub const NONE_TEXTURE: TextureId = TextureId(gl43::NONE);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SamplerId(pub GLuint);
pub const NONE_SAMPLER: SamplerId = SamplerId(gl43::NONE);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShaderId(pub GLuint);
pub const NONE_SHADER: ShaderId = ShaderId(gl43::NONE);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProgramId(pub GLuint);
pub const NONE_PROGRAM: ProgramId = ProgramId(gl43::NONE);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FramebufferId(pub GLuint);
pub const NONE_FRAMEBUFFER: FramebufferId = FramebufferId(gl43::NONE);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryId(pub GLuint);
pub const NONE_QUERY: QueryId = QueryId(gl43::NONE);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocationId(pub i32);

/// How an `EmberFormat` is allocated and transferred in GL
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GlFormatInfo {
    pub format: EmberFormat,
    pub internal_format: GLenum,
    pub pixel_format: GLenum,
    pub pixel_type: GLenum,
}

const fn format_info(
    format: EmberFormat,
    internal_format: GLenum,
    pixel_format: GLenum,
    pixel_type: GLenum,
) -> GlFormatInfo {
    GlFormatInfo {
        format,
        internal_format,
        pixel_format,
        pixel_type,
    }
}

// B8G8R8A8_SRGB has no sized internal format in core GL
const GL_FORMATS: [GlFormatInfo; 14] = [
    format_info(EmberFormat::R8_UNORM, gl43::R8, gl43::RED, gl43::UNSIGNED_BYTE),
    format_info(EmberFormat::R8G8_UNORM, gl43::RG8, gl43::RG, gl43::UNSIGNED_BYTE),
    format_info(EmberFormat::R8G8B8A8_UNORM, gl43::RGBA8, gl43::RGBA, gl43::UNSIGNED_BYTE),
    format_info(EmberFormat::R8G8B8A8_SRGB, gl43::SRGB8_ALPHA8, gl43::RGBA, gl43::UNSIGNED_BYTE),
    format_info(EmberFormat::B8G8R8A8_UNORM, gl43::BGRA8_EXT, gl43::BGRA, gl43::UNSIGNED_BYTE),
    format_info(EmberFormat::R16_UINT, gl43::R16UI, gl43::RED_INTEGER, gl43::UNSIGNED_SHORT),
    format_info(EmberFormat::R32_UINT, gl43::R32UI, gl43::RED_INTEGER, gl43::UNSIGNED_INT),
    format_info(EmberFormat::R32_SFLOAT, gl43::R32F, gl43::RED, gl43::FLOAT),
    format_info(EmberFormat::R32G32_SFLOAT, gl43::RG32F, gl43::RG, gl43::FLOAT),
    format_info(EmberFormat::R32G32B32_SFLOAT, gl43::RGB32F, gl43::RGB, gl43::FLOAT),
    format_info(EmberFormat::R32G32B32A32_SFLOAT, gl43::RGBA32F, gl43::RGBA, gl43::FLOAT),
    format_info(EmberFormat::D32_SFLOAT, gl43::DEPTH_COMPONENT32F, gl43::DEPTH_COMPONENT, gl43::FLOAT),
    format_info(
        EmberFormat::D24_UNORM_S8_UINT,
        gl43::DEPTH24_STENCIL8,
        gl43::DEPTH_STENCIL,
        gl43::UNSIGNED_INT_24_8,
    ),
    format_info(
        EmberFormat::D32_SFLOAT_S8_UINT,
        gl43::DEPTH32F_STENCIL8,
        gl43::DEPTH_STENCIL,
        gl43::FLOAT_32_UNSIGNED_INT_24_8_REV,
    ),
];

pub fn gl_format_info(format: EmberFormat) -> Option<GlFormatInfo> {
    GL_FORMATS.iter().find(|info| info.format == format).copied()
}

pub fn gl_format_info_for_internal_format(internal_format: GLenum) -> Option<GlFormatInfo> {
    GL_FORMATS
        .iter()
        .find(|info| info.internal_format == internal_format)
        .copied()
}
