#[cfg(any(feature = "ember-dx12", test))]
use crate::dx12::EmberTextureDx12;
#[cfg(any(feature = "ember-gl", test))]
use crate::gl::EmberTextureGl;
use crate::{EmberResult, EmberTextureDef};

/// An image that can be used by the GPU.
///
/// Textures must not be dropped if they are in use by the GPU.
#[derive(Debug)]
pub enum EmberTexture {
    #[cfg(any(feature = "ember-gl", test))]
    Gl(EmberTextureGl),
    #[cfg(any(feature = "ember-dx12", test))]
    Dx12(EmberTextureDx12),
}

impl EmberTexture {
    /// Return the definition used to create the texture
    pub fn texture_def(&self) -> &EmberTextureDef {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberTexture::Gl(inner) => inner.texture_def(),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberTexture::Dx12(inner) => inner.texture_def(),
        }
    }

    /// Read back one mip level. Rows are tightly packed, top row first, on every backend.
    /// Multisampled textures cannot be read back directly; resolve them first.
    ///
    /// This waits for the GPU to finish any work already submitted.
    pub fn read_texels(
        &self,
        mip_level: u32,
    ) -> EmberResult<Vec<u8>> {
        let texture_def = self.texture_def();
        if mip_level >= texture_def.mip_count {
            Err(format!(
                "Mip level {} does not exist, the texture has {} mip levels",
                mip_level, texture_def.mip_count
            ))?;
        }

        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberTexture::Gl(inner) => inner.read_texels(mip_level),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberTexture::Dx12(inner) => inner.read_texels(mip_level),
        }
    }

    /// Get the underlying gl API object. This provides access to any internally created
    /// gl objects.
    #[cfg(any(feature = "ember-gl", test))]
    pub fn gl_texture(&self) -> Option<&EmberTextureGl> {
        match self {
            EmberTexture::Gl(inner) => Some(inner),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberTexture::Dx12(_) => None,
        }
    }

    /// Get the underlying dx12 API object. This provides access to any internally created
    /// dx12 objects.
    #[cfg(any(feature = "ember-dx12", test))]
    pub fn dx12_texture(&self) -> Option<&EmberTextureDx12> {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberTexture::Gl(_) => None,
            EmberTexture::Dx12(inner) => Some(inner),
        }
    }
}
