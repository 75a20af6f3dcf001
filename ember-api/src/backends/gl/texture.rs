use crate::gl::{
    gl_format_info, EmberDeviceContextGl, GlDeferredDestroy, GlFormatInfo, TextureId,
    NONE_TEXTURE,
};
use crate::{EmberResult, EmberSampleCount, EmberTextureDef};

use crate::gl::gl43;
use crate::gl::gl43::GLenum;

/// GL rows run bottom to top. Converts between that and top-row-first data.
pub(crate) fn flip_rows(
    data: &[u8],
    row_pitch: usize,
) -> Vec<u8> {
    if row_pitch == 0 {
        return data.to_vec();
    }

    let mut flipped = Vec::with_capacity(data.len());
    for row in data.chunks(row_pitch).rev() {
        flipped.extend_from_slice(row);
    }
    flipped
}

#[derive(Debug)]
pub struct EmberTextureGl {
    device_context: EmberDeviceContextGl,
    texture_def: EmberTextureDef,
    texture_id: TextureId,
    gl_target: GLenum,
    format_info: GlFormatInfo,
}

impl Drop for EmberTextureGl {
    fn drop(&mut self) {
        self.device_context
            .destroy_later(GlDeferredDestroy::Texture(self.texture_id));
    }
}

impl EmberTextureGl {
    pub fn texture_def(&self) -> &EmberTextureDef {
        &self.texture_def
    }

    pub fn gl_texture_id(&self) -> TextureId {
        self.texture_id
    }

    /// TEXTURE_2D, or TEXTURE_2D_MULTISAMPLE for multisampled textures
    pub fn gl_target(&self) -> GLenum {
        self.gl_target
    }

    pub fn gl_format_info(&self) -> GlFormatInfo {
        self.format_info
    }

    pub fn new(
        device_context: &EmberDeviceContextGl,
        texture_def: &EmberTextureDef,
        data: Option<&[u8]>,
    ) -> EmberResult<EmberTextureGl> {
        texture_def.verify()?;
        let format_info = gl_format_info(texture_def.format).ok_or_else(|| {
            format!(
                "Format {:?} is not supported by the gl backend",
                texture_def.format
            )
        })?;

        let mip_data = match data {
            Some(data) => Some(crate::split_mip_data(texture_def, data)?),
            None => None,
        };

        let texel_size = texture_def.format.size_in_bytes()? as usize;
        let extents = texture_def.extents;
        let is_multisampled = texture_def.sample_count != EmberSampleCount::SampleCount1;
        let gl_target = if is_multisampled {
            gl43::TEXTURE_2D_MULTISAMPLE
        } else {
            gl43::TEXTURE_2D
        };

        let mut gl_context = device_context.gl_context();
        let texture_id = gl_context.gl_create_texture()?;
        gl_context.gl_bind_texture(gl_target, texture_id)?;
        if is_multisampled {
            gl_context.gl_tex_storage_2d_multisample(
                gl_target,
                texture_def.sample_count.as_u32(),
                format_info.internal_format,
                extents.width,
                extents.height,
            )?;
        } else {
            gl_context.gl_tex_storage_2d(
                gl_target,
                texture_def.mip_count,
                format_info.internal_format,
                extents.width,
                extents.height,
            )?;
        }

        if let Some(mip_data) = mip_data {
            for (mip_level, data) in mip_data.into_iter().enumerate() {
                let mip_extents = texture_def.mip_extents(mip_level as u32);
                let rows = flip_rows(data, mip_extents.width as usize * texel_size);
                gl_context.gl_tex_sub_image_2d(
                    gl_target,
                    mip_level as u32,
                    0,
                    0,
                    mip_extents.width,
                    mip_extents.height,
                    format_info.pixel_format,
                    format_info.pixel_type,
                    &rows,
                )?;
            }
        }

        gl_context.gl_bind_texture(gl_target, NONE_TEXTURE)?;

        log::trace!(
            "Created gl texture {:?} {:?} {:?} with {} mips",
            texture_id,
            texture_def.format,
            extents,
            texture_def.mip_count
        );

        Ok(EmberTextureGl {
            device_context: device_context.clone(),
            texture_def: texture_def.clone(),
            texture_id,
            gl_target,
            format_info,
        })
    }

    pub fn read_texels(
        &self,
        mip_level: u32,
    ) -> EmberResult<Vec<u8>> {
        if self.gl_target != gl43::TEXTURE_2D {
            Err("Multisampled textures cannot be read back, resolve them first")?;
        }

        let rows = {
            let mut gl_context = self.device_context.gl_context();
            gl_context.gl_bind_texture(gl43::TEXTURE_2D, self.texture_id)?;
            let rows = gl_context.gl_get_tex_image(
                gl43::TEXTURE_2D,
                mip_level,
                self.format_info.pixel_format,
                self.format_info.pixel_type,
            );
            gl_context.gl_bind_texture(gl43::TEXTURE_2D, NONE_TEXTURE)?;
            rows?
        };

        let texel_size = self.texture_def.format.size_in_bytes()? as usize;
        let mip_extents = self.texture_def.mip_extents(mip_level);
        Ok(flip_rows(&rows, mip_extents.width as usize * texel_size))
    }
}
