use crate::gl::{EmberDeviceContextGl, GlDeferredDestroy, SamplerId};
use crate::{EmberResult, EmberSamplerDef};

use crate::gl::gl43;

#[derive(Debug)]
pub struct EmberSamplerGl {
    device_context: EmberDeviceContextGl,
    sampler_def: EmberSamplerDef,
    sampler_id: SamplerId,
}

impl Drop for EmberSamplerGl {
    fn drop(&mut self) {
        self.device_context
            .destroy_later(GlDeferredDestroy::Sampler(self.sampler_id));
    }
}

impl EmberSamplerGl {
    pub fn sampler_def(&self) -> &EmberSamplerDef {
        &self.sampler_def
    }

    pub fn gl_sampler_id(&self) -> SamplerId {
        self.sampler_id
    }

    pub fn new(
        device_context: &EmberDeviceContextGl,
        sampler_def: &EmberSamplerDef,
    ) -> EmberResult<EmberSamplerGl> {
        let min_filter = sampler_def
            .min_filter
            .gl_min_filter(sampler_def.mip_map_mode);
        let mag_filter = sampler_def.mag_filter.gl_mag_filter();
        let wrap_s = sampler_def.address_mode_u.gl_wrap_mode();
        let wrap_t = sampler_def.address_mode_v.gl_wrap_mode();

        let mut gl_context = device_context.gl_context();
        let sampler_id = gl_context.gl_create_sampler()?;
        gl_context.gl_sampler_parameteri(
            sampler_id,
            gl43::TEXTURE_MIN_FILTER,
            min_filter as i32,
        )?;
        gl_context.gl_sampler_parameteri(
            sampler_id,
            gl43::TEXTURE_MAG_FILTER,
            mag_filter as i32,
        )?;
        gl_context.gl_sampler_parameteri(sampler_id, gl43::TEXTURE_WRAP_S, wrap_s as i32)?;
        gl_context.gl_sampler_parameteri(sampler_id, gl43::TEXTURE_WRAP_T, wrap_t as i32)?;
        gl_context.gl_sampler_parameterf(
            sampler_id,
            gl43::TEXTURE_LOD_BIAS,
            sampler_def.mip_lod_bias,
        )?;
        gl_context.gl_sampler_parameterfv(
            sampler_id,
            gl43::TEXTURE_BORDER_COLOR,
            &sampler_def.border_color,
        )?;

        Ok(EmberSamplerGl {
            device_context: device_context.clone(),
            sampler_def: sampler_def.clone(),
            sampler_id,
        })
    }
}
