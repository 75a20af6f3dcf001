#[cfg(any(feature = "ember-dx12", test))]
use crate::dx12::EmberFramebufferDx12;
#[cfg(any(feature = "ember-gl", test))]
use crate::gl::EmberFramebufferGl;
use crate::*;
use std::sync::Arc;

/// An offscreen render target owning its color and depth attachment textures.
///
/// Framebuffers must not be dropped or resized while in use by the GPU.
#[derive(Debug)]
pub enum EmberFramebuffer {
    #[cfg(any(feature = "ember-gl", test))]
    Gl(EmberFramebufferGl),
    #[cfg(any(feature = "ember-dx12", test))]
    Dx12(EmberFramebufferDx12),
}

impl EmberFramebuffer {
    /// The current definition, including the size set by the latest `resize`
    pub fn framebuffer_def(&self) -> EmberFramebufferDef {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberFramebuffer::Gl(inner) => inner.framebuffer_def(),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberFramebuffer::Dx12(inner) => inner.framebuffer_def(),
        }
    }

    pub fn extents(&self) -> EmberExtents2D {
        self.framebuffer_def().extents
    }

    pub fn color_attachment(
        &self,
        attachment_index: u32,
    ) -> Option<Arc<EmberTexture>> {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberFramebuffer::Gl(inner) => inner.color_attachment(attachment_index),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberFramebuffer::Dx12(inner) => inner.color_attachment(attachment_index),
        }
    }

    pub fn depth_attachment(&self) -> Option<Arc<EmberTexture>> {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberFramebuffer::Gl(inner) => inner.depth_attachment(),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberFramebuffer::Dx12(inner) => inner.depth_attachment(),
        }
    }

    /// Recreate every attachment with the same definition at the new size. Resizing to the
    /// current size does nothing.
    pub fn resize(
        &self,
        width: u32,
        height: u32,
    ) -> EmberResult<()> {
        let extents = EmberExtents2D { width, height };
        if extents == self.extents() {
            return Ok(());
        }

        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberFramebuffer::Gl(inner) => inner.resize(extents),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberFramebuffer::Dx12(inner) => inner.resize(extents),
        }
    }

    #[cfg(any(feature = "ember-gl", test))]
    pub fn gl_framebuffer(&self) -> Option<&EmberFramebufferGl> {
        match self {
            EmberFramebuffer::Gl(inner) => Some(inner),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberFramebuffer::Dx12(_) => None,
        }
    }

    #[cfg(any(feature = "ember-dx12", test))]
    pub fn dx12_framebuffer(&self) -> Option<&EmberFramebufferDx12> {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberFramebuffer::Gl(_) => None,
            EmberFramebuffer::Dx12(inner) => Some(inner),
        }
    }
}

/// The attachment textures of a framebuffer, created from its definition
#[derive(Debug, Clone)]
pub(crate) struct EmberFramebufferAttachments {
    pub framebuffer_def: EmberFramebufferDef,
    pub color: Vec<Arc<EmberTexture>>,
    pub depth_stencil: Option<Arc<EmberTexture>>,
}

impl EmberFramebufferAttachments {
    pub fn new(
        device_context: &EmberDeviceContext,
        framebuffer_def: &EmberFramebufferDef,
    ) -> EmberResult<Self> {
        framebuffer_def.verify()?;

        let mut color = Vec::with_capacity(framebuffer_def.color_attachments.len());
        for attachment_index in 0..framebuffer_def.color_attachments.len() {
            let texture_def = framebuffer_def.color_attachment_texture_def(attachment_index);
            color.push(device_context.create_texture(&texture_def, None)?);
        }

        let depth_stencil = match framebuffer_def.depth_stencil_format {
            Some(format) => {
                let texture_def = framebuffer_def.depth_attachment_texture_def(format);
                Some(device_context.create_texture(&texture_def, None)?)
            }
            None => None,
        };

        log::debug!(
            "Created framebuffer attachments {:?} with {} color attachments",
            framebuffer_def.extents,
            color.len()
        );

        Ok(EmberFramebufferAttachments {
            framebuffer_def: framebuffer_def.clone(),
            color,
            depth_stencil,
        })
    }

    /// Same attachment definitions at a different size
    pub fn resized(
        &self,
        device_context: &EmberDeviceContext,
        extents: EmberExtents2D,
    ) -> EmberResult<Self> {
        let framebuffer_def = EmberFramebufferDef {
            extents,
            ..self.framebuffer_def.clone()
        };
        Self::new(device_context, &framebuffer_def)
    }
}
