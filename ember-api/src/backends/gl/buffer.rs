use crate::gl::{BufferId, EmberDeviceContextGl, GlDeferredDestroy};
use crate::{EmberBufferDef, EmberResult};

use crate::gl::gl43;
use crate::gl::gl43::GLenum;

#[derive(Debug)]
pub struct EmberBufferGl {
    device_context: EmberDeviceContextGl,
    buffer_def: EmberBufferDef,
    buffer_id: BufferId,
    target: GLenum,
}

impl Drop for EmberBufferGl {
    fn drop(&mut self) {
        self.device_context
            .destroy_later(GlDeferredDestroy::Buffer(self.buffer_id));
    }
}

impl EmberBufferGl {
    pub fn buffer_def(&self) -> &EmberBufferDef {
        &self.buffer_def
    }

    pub fn gl_buffer_id(&self) -> BufferId {
        self.buffer_id
    }

    pub fn gl_target(&self) -> GLenum {
        self.target
    }

    pub fn copy_to_buffer(
        &self,
        buffer_byte_offset: u64,
        data: &[u8],
    ) -> EmberResult<()> {
        let end = buffer_byte_offset + data.len() as u64;
        if end > self.buffer_def.size {
            Err(format!(
                "Cannot copy {} bytes at offset {} into a buffer of {} bytes",
                data.len(),
                buffer_byte_offset,
                self.buffer_def.size
            ))?;
        }

        let mut gl_context = self.device_context.gl_context();
        gl_context.gl_bind_buffer(self.target, self.buffer_id)?;
        gl_context.gl_buffer_sub_data(self.target, buffer_byte_offset, data)?;
        Ok(())
    }

    pub fn new(
        device_context: &EmberDeviceContextGl,
        buffer_def: &EmberBufferDef,
    ) -> EmberResult<Self> {
        buffer_def.verify()?;
        let target = buffer_def
            .resource_type
            .gl_buffer_target()
            .ok_or("Buffer has no vertex, index or uniform usage")?;

        let mut gl_context = device_context.gl_context();
        let buffer_id = gl_context.gl_create_buffer()?;
        gl_context.gl_bind_buffer(target, buffer_id)?;
        gl_context.gl_buffer_data(target, buffer_def.size, None, gl43::DYNAMIC_DRAW)?;

        log::trace!(
            "Created gl buffer {:?} of {} bytes for {:?}",
            buffer_id,
            buffer_def.size,
            buffer_def.resource_type
        );

        Ok(EmberBufferGl {
            device_context: device_context.clone(),
            buffer_def: buffer_def.clone(),
            buffer_id,
            target,
        })
    }
}
