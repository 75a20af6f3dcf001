use crate::dx12::EmberDeviceContextDx12;
use crate::framebuffer::EmberFramebufferAttachments;
use crate::{EmberDeviceContext, EmberExtents2D, EmberFramebufferDef, EmberResult, EmberTexture};
use std::sync::{Arc, Mutex};

/// D3D12 has no framebuffer object. The attachment textures own their render target and depth
/// stencil views, which are bound together when the framebuffer becomes the render target.
#[derive(Debug)]
pub struct EmberFramebufferDx12 {
    device_context: EmberDeviceContextDx12,
    attachments: Mutex<EmberFramebufferAttachments>,
}

impl EmberFramebufferDx12 {
    pub fn framebuffer_def(&self) -> EmberFramebufferDef {
        self.attachments.lock().unwrap().framebuffer_def.clone()
    }

    pub fn color_attachment(
        &self,
        attachment_index: u32,
    ) -> Option<Arc<EmberTexture>> {
        self.attachments
            .lock()
            .unwrap()
            .color
            .get(attachment_index as usize)
            .cloned()
    }

    pub fn depth_attachment(&self) -> Option<Arc<EmberTexture>> {
        self.attachments.lock().unwrap().depth_stencil.clone()
    }

    /// A snapshot of the current attachments, kept alive while they are bound
    pub(crate) fn attachments(&self) -> EmberFramebufferAttachments {
        self.attachments.lock().unwrap().clone()
    }

    pub fn new(
        device_context: &EmberDeviceContextDx12,
        framebuffer_def: &EmberFramebufferDef,
    ) -> EmberResult<Self> {
        let attachments = EmberFramebufferAttachments::new(
            &EmberDeviceContext::Dx12(device_context.clone()),
            framebuffer_def,
        )?;

        Ok(EmberFramebufferDx12 {
            device_context: device_context.clone(),
            attachments: Mutex::new(attachments),
        })
    }

    pub fn resize(
        &self,
        extents: EmberExtents2D,
    ) -> EmberResult<()> {
        let current = self.attachments.lock().unwrap().clone();
        let resized = current.resized(
            &EmberDeviceContext::Dx12(self.device_context.clone()),
            extents,
        )?;

        log::debug!("Resized dx12 framebuffer to {:?}", extents);

        *self.attachments.lock().unwrap() = resized;
        Ok(())
    }
}
