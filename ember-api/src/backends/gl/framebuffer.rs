use crate::framebuffer::EmberFramebufferAttachments;
use crate::gl::{EmberDeviceContextGl, FramebufferId, GlContext, GlDeferredDestroy, NONE_FRAMEBUFFER};
use crate::{EmberDeviceContext, EmberExtents2D, EmberFramebufferDef, EmberResult, EmberTexture};
use std::sync::{Arc, Mutex};

use crate::gl::gl43;

/// A framebuffer object with textures attached to it
#[derive(Debug)]
pub struct EmberFramebufferGl {
    device_context: EmberDeviceContextGl,
    attachments: Mutex<EmberFramebufferAttachments>,
    framebuffer_id: FramebufferId,
}

impl Drop for EmberFramebufferGl {
    fn drop(&mut self) {
        self.device_context
            .destroy_later(GlDeferredDestroy::Framebuffer(self.framebuffer_id));
    }
}

impl EmberFramebufferGl {
    pub fn framebuffer_def(&self) -> EmberFramebufferDef {
        self.attachments.lock().unwrap().framebuffer_def.clone()
    }

    pub fn gl_framebuffer_id(&self) -> FramebufferId {
        self.framebuffer_id
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

    pub fn new(
        device_context: &EmberDeviceContextGl,
        framebuffer_def: &EmberFramebufferDef,
    ) -> EmberResult<Self> {
        let attachments = EmberFramebufferAttachments::new(
            &EmberDeviceContext::Gl(device_context.clone()),
            framebuffer_def,
        )?;

        let framebuffer_id = {
            let mut gl_context = device_context.gl_context();
            let framebuffer_id = gl_context.gl_create_framebuffer()?;
            if let Err(e) = Self::attach(&mut gl_context, framebuffer_id, &attachments) {
                gl_context.gl_destroy_framebuffer(framebuffer_id)?;
                return Err(e);
            }
            framebuffer_id
        };

        Ok(EmberFramebufferGl {
            device_context: device_context.clone(),
            attachments: Mutex::new(attachments),
            framebuffer_id,
        })
    }

    pub fn resize(
        &self,
        extents: EmberExtents2D,
    ) -> EmberResult<()> {
        let current = self.attachments.lock().unwrap().clone();
        let resized = current.resized(
            &EmberDeviceContext::Gl(self.device_context.clone()),
            extents,
        )?;

        Self::attach(
            &mut self.device_context.gl_context(),
            self.framebuffer_id,
            &resized,
        )?;

        log::debug!(
            "Resized framebuffer {:?} to {:?}",
            self.framebuffer_id,
            extents
        );

        // The old textures are released here and destroyed the next time the context is locked
        *self.attachments.lock().unwrap() = resized;
        Ok(())
    }

    fn attach(
        gl_context: &mut GlContext,
        framebuffer_id: FramebufferId,
        attachments: &EmberFramebufferAttachments,
    ) -> EmberResult<()> {
        gl_context.gl_bind_framebuffer(gl43::FRAMEBUFFER, framebuffer_id)?;

        let mut draw_buffers = Vec::with_capacity(attachments.color.len());
        for (attachment_index, texture) in attachments.color.iter().enumerate() {
            let gl_texture = texture
                .gl_texture()
                .ok_or("Framebuffer attachment was not created by the gl backend")?;
            let attachment = gl43::COLOR_ATTACHMENT0 + attachment_index as u32;
            gl_context.gl_framebuffer_texture_2d(
                gl43::FRAMEBUFFER,
                attachment,
                gl_texture.gl_target(),
                gl_texture.gl_texture_id(),
                0,
            )?;
            draw_buffers.push(attachment);
        }

        if let Some(texture) = &attachments.depth_stencil {
            let gl_texture = texture
                .gl_texture()
                .ok_or("Framebuffer attachment was not created by the gl backend")?;
            let attachment = if texture.texture_def().format.has_stencil() {
                gl43::DEPTH_STENCIL_ATTACHMENT
            } else {
                gl43::DEPTH_ATTACHMENT
            };
            gl_context.gl_framebuffer_texture_2d(
                gl43::FRAMEBUFFER,
                attachment,
                gl_texture.gl_target(),
                gl_texture.gl_texture_id(),
                0,
            )?;
        }

        if draw_buffers.is_empty() {
            gl_context.gl_draw_buffers(&[gl43::NONE])?;
            gl_context.gl_read_buffer(gl43::NONE)?;
        } else {
            gl_context.gl_draw_buffers(&draw_buffers)?;
            gl_context.gl_read_buffer(gl43::COLOR_ATTACHMENT0)?;
        }

        let status = gl_context.gl_check_framebuffer_status(gl43::FRAMEBUFFER)?;
        gl_context.gl_bind_framebuffer(gl43::FRAMEBUFFER, NONE_FRAMEBUFFER)?;
        if status != gl43::FRAMEBUFFER_COMPLETE {
            Err(format!("Framebuffer is incomplete, status {:#x}", status))?;
        }

        Ok(())
    }
}
