use super::gl43::{self, GLbitfield, GLboolean, GLenum, GLint, GLuint, Gl43};
use super::*;
use crate::internal_shared::gl_window::{self, GlConfig};
use crate::{EmberError, EmberFormat, EmberResult};
use fnv::FnvHashMap;
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};
use std::ffi::CString;
use std::os::raw::c_void;

#[derive(Debug)]
struct GlSurfaceState {
    width: u32,
    height: u32,
    srgb: bool,
    presented_frames: u64,
}

/// A GL 4.3 core context owned by the platform window layer.
///
/// The context is created against the device's window and draws to any window given a surface.
/// It is only current on a thread between `acquire_thread` and `release_thread`.
pub struct GlContext {
    gl: Gl43,
    surfaces: FnvHashMap<WindowHash, GlSurfaceState>,
    // Includes the device window, which keeps its drawable after its surface is destroyed
    drawables: FnvHashMap<WindowHash, gl_window::GlSurface>,
    device_window: WindowHash,
    current_drawable: WindowHash,
    vertex_array: GLuint,
    debug_group_depth: usize,
    context: gl_window::GlContext,
}

// Only used while locked and current on the locking thread
unsafe impl Send for GlContext {}

impl std::fmt::Debug for GlContext {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        f.debug_struct("GlContext")
            .field("surfaces", &self.surfaces)
            .field("current_drawable", &self.current_drawable)
            .finish()
    }
}

fn gl_bool(value: bool) -> GLboolean {
    value as GLboolean
}

fn c_string(value: &str) -> EmberResult<CString> {
    Ok(CString::new(value).map_err(|_| format!("{:?} contains a nul byte", value))?)
}

// Bytes per pixel of client memory for a format/type pair
fn pixel_size(
    format: GLenum,
    pixel_type: GLenum,
) -> EmberResult<usize> {
    match pixel_type {
        gl43::UNSIGNED_INT_24_8 => return Ok(4),
        gl43::FLOAT_32_UNSIGNED_INT_24_8_REV => return Ok(8),
        _ => {}
    }

    let components = match format {
        gl43::RED | gl43::RED_INTEGER | gl43::DEPTH_COMPONENT => 1,
        gl43::RG => 2,
        gl43::RGB => 3,
        gl43::RGBA | gl43::BGRA => 4,
        _ => Err(EmberError::GlError(gl43::INVALID_ENUM))?,
    };

    let component_size = match pixel_type {
        gl43::BYTE | gl43::UNSIGNED_BYTE => 1,
        gl43::UNSIGNED_SHORT => 2,
        gl43::UNSIGNED_INT | gl43::FLOAT => 4,
        _ => Err(EmberError::GlError(gl43::INVALID_ENUM))?,
    };

    Ok(components * component_size)
}

impl GlContext {
    pub fn create(
        display: &dyn HasRawDisplayHandle,
        window: &dyn HasRawWindowHandle,
    ) -> EmberResult<Self> {
        let device_window = calculate_window_hash(window);
        let (context, drawable) = gl_window::GlContext::create(
            display.raw_display_handle(),
            window.raw_window_handle(),
            &GlConfig::default(),
        )?;

        context.make_current(&drawable)?;
        let gl = Gl43::load_with(|symbol| context.get_proc_address(symbol));
        let missing_functions = gl.missing_functions();
        if !missing_functions.is_empty() {
            context.make_not_current();
            Err(format!(
                "The GL driver does not provide {}",
                missing_functions.join(", ")
            ))?;
        }

        // Core profiles draw nothing without a bound vertex array
        let mut vertex_array = 0;
        unsafe {
            gl.GenVertexArrays(1, &mut vertex_array);
            gl.BindVertexArray(vertex_array);
            gl.PixelStorei(gl43::PACK_ALIGNMENT, 1);
            gl.PixelStorei(gl43::UNPACK_ALIGNMENT, 1);
        }

        let mut drawables = FnvHashMap::default();
        drawables.insert(device_window, drawable);

        let mut gl_context = GlContext {
            gl,
            surfaces: Default::default(),
            drawables,
            device_window,
            current_drawable: device_window,
            vertex_array,
            debug_group_depth: 0,
            context,
        };

        let result = gl_context.check_for_error();
        gl_context.release_thread();
        result?;
        Ok(gl_context)
    }

    /// Make the context current on the calling thread
    pub fn acquire_thread(&mut self) {
        if let Err(e) = self.make_drawable_current(self.current_drawable) {
            log::error!("Failed to make the GL context current: {}", e);
        }
    }

    pub fn release_thread(&mut self) {
        self.context.make_not_current();
    }

    fn make_drawable_current(
        &mut self,
        window_hash: WindowHash,
    ) -> EmberResult<()> {
        let drawable = match self.drawables.get(&window_hash) {
            Some(drawable) => drawable,
            None => self
                .drawables
                .get(&self.device_window)
                .ok_or("The device window has no GL drawable")?,
        };

        self.context.make_current(drawable)?;
        self.current_drawable = window_hash;
        Ok(())
    }

    pub fn gl_get_error(&mut self) -> GLenum {
        unsafe { self.gl.GetError() }
    }

    pub fn check_for_error(&mut self) -> EmberResult<()> {
        let result = self.gl_get_error();
        if result != gl43::NO_ERROR {
            Err(EmberError::GlError(result))
        } else {
            Ok(())
        }
    }

    pub fn gl_get_integerv(
        &mut self,
        pname: GLenum,
    ) -> EmberResult<i32> {
        let mut value = 0;
        unsafe {
            self.gl.GetIntegerv(pname, &mut value);
        }

        self.check_for_error()?;
        Ok(value)
    }

    pub fn gl_get_string(
        &mut self,
        pname: GLenum,
    ) -> EmberResult<String> {
        let value = unsafe {
            let string = self.gl.GetString(pname);
            if string.is_null() {
                String::new()
            } else {
                std::ffi::CStr::from_ptr(string as *const _)
                    .to_string_lossy()
                    .into_owned()
            }
        };

        self.check_for_error()?;
        Ok(value)
    }

    pub fn gl_finish(&mut self) -> EmberResult<()> {
        unsafe {
            self.gl.Finish();
        }
        self.check_for_error()
    }

    //
    // Window surfaces
    //

    pub fn create_surface(
        &mut self,
        window_hash: WindowHash,
        window: &dyn HasRawWindowHandle,
        width: u32,
        height: u32,
        format: EmberFormat,
        depth_stencil_format: Option<EmberFormat>,
    ) -> EmberResult<()> {
        if self.surfaces.contains_key(&window_hash) {
            Err("A GL surface already exists for this window")?;
        }

        // The pixel format is chosen once for the context
        match format {
            EmberFormat::R8G8B8A8_UNORM
            | EmberFormat::R8G8B8A8_SRGB
            | EmberFormat::B8G8R8A8_UNORM
            | EmberFormat::B8G8R8A8_SRGB => {}
            _ => Err(format!("GL windows cannot present {:?}", format))?,
        }

        if let Some(depth_stencil_format) = depth_stencil_format {
            if depth_stencil_format != EmberFormat::D24_UNORM_S8_UINT {
                log::debug!(
                    "GL windows always use D24_UNORM_S8_UINT depth, {:?} was requested",
                    depth_stencil_format
                );
            }
        }

        if !self.drawables.contains_key(&window_hash) {
            let drawable = self.context.create_surface(window.raw_window_handle())?;
            self.drawables.insert(window_hash, drawable);
        }

        self.surfaces.insert(
            window_hash,
            GlSurfaceState {
                width,
                height,
                srgb: format.is_srgb(),
                presented_frames: 0,
            },
        );
        Ok(())
    }

    pub fn resize_surface(
        &mut self,
        window_hash: WindowHash,
        width: u32,
        height: u32,
    ) -> EmberResult<()> {
        let surface = self
            .surfaces
            .get_mut(&window_hash)
            .ok_or("No GL surface exists for this window")?;
        surface.width = width;
        surface.height = height;

        if let Some(drawable) = self.drawables.get(&window_hash) {
            self.context.update_surface(drawable);
        }

        Ok(())
    }

    pub fn destroy_surface(
        &mut self,
        window_hash: WindowHash,
    ) {
        self.surfaces.remove(&window_hash);
        if self.current_drawable == window_hash {
            let device_window = self.device_window;
            if let Err(e) = self.make_drawable_current(device_window) {
                log::error!("Failed to make the GL context current: {}", e);
            }
        }

        if window_hash != self.device_window {
            self.drawables.remove(&window_hash);
        }
    }

    pub fn make_current(
        &mut self,
        window_hash: WindowHash,
    ) -> EmberResult<()> {
        if !self.surfaces.contains_key(&window_hash) {
            Err("No GL surface exists for this window")?;
        }

        self.make_drawable_current(window_hash)
    }

    pub fn swap_buffers(
        &mut self,
        window_hash: WindowHash,
    ) -> EmberResult<()> {
        let surface = self
            .surfaces
            .get_mut(&window_hash)
            .ok_or("No GL surface exists for this window")?;
        let drawable = self
            .drawables
            .get(&window_hash)
            .ok_or("No GL surface exists for this window")?;

        self.context.swap_buffers(drawable);
        surface.presented_frames += 1;
        self.check_for_error()
    }

    pub fn presented_frame_count(
        &self,
        window_hash: WindowHash,
    ) -> u64 {
        self.surfaces
            .get(&window_hash)
            .map(|surface| surface.presented_frames)
            .unwrap_or(0)
    }

    //
    // Capabilities and fixed-function state
    //

    pub fn gl_enable(
        &mut self,
        cap: GLenum,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.Enable(cap);
        }
        self.check_for_error()
    }

    pub fn gl_disable(
        &mut self,
        cap: GLenum,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.Disable(cap);
        }
        self.check_for_error()
    }

    pub fn gl_enablei(
        &mut self,
        cap: GLenum,
        index: u32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.Enablei(cap, index);
        }
        self.check_for_error()
    }

    pub fn gl_disablei(
        &mut self,
        cap: GLenum,
        index: u32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.Disablei(cap, index);
        }
        self.check_for_error()
    }

    pub fn gl_is_enabled(
        &self,
        cap: GLenum,
    ) -> bool {
        unsafe { self.gl.IsEnabled(cap) != 0 }
    }

    pub fn gl_cull_face(
        &mut self,
        mode: GLenum,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.CullFace(mode);
        }
        self.check_for_error()
    }

    pub fn gl_front_face(
        &mut self,
        mode: GLenum,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.FrontFace(mode);
        }
        self.check_for_error()
    }

    pub fn gl_polygon_mode(
        &mut self,
        face: GLenum,
        mode: GLenum,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.PolygonMode(face, mode);
        }
        self.check_for_error()
    }

    pub fn gl_polygon_offset(
        &mut self,
        factor: f32,
        units: f32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.PolygonOffset(factor, units);
        }
        self.check_for_error()
    }

    pub fn gl_depth_func(
        &mut self,
        func: GLenum,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.DepthFunc(func);
        }
        self.check_for_error()
    }

    pub fn gl_depth_mask(
        &mut self,
        flag: bool,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.DepthMask(gl_bool(flag));
        }
        self.check_for_error()
    }

    pub fn gl_stencil_func_separate(
        &mut self,
        face: GLenum,
        func: GLenum,
        reference: GLint,
        mask: u32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.StencilFuncSeparate(face, func, reference, mask);
        }
        self.check_for_error()
    }

    pub fn gl_stencil_op_separate(
        &mut self,
        face: GLenum,
        stencil_fail: GLenum,
        depth_fail: GLenum,
        depth_pass: GLenum,
    ) -> EmberResult<()> {
        unsafe {
            self.gl
                .StencilOpSeparate(face, stencil_fail, depth_fail, depth_pass);
        }
        self.check_for_error()
    }

    pub fn gl_stencil_mask_separate(
        &mut self,
        face: GLenum,
        mask: u32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.StencilMaskSeparate(face, mask);
        }
        self.check_for_error()
    }

    pub fn gl_blend_func_separatei(
        &mut self,
        buffer: u32,
        src_rgb: GLenum,
        dst_rgb: GLenum,
        src_alpha: GLenum,
        dst_alpha: GLenum,
    ) -> EmberResult<()> {
        unsafe {
            self.gl
                .BlendFuncSeparatei(buffer, src_rgb, dst_rgb, src_alpha, dst_alpha);
        }
        self.check_for_error()
    }

    pub fn gl_blend_equation_separatei(
        &mut self,
        buffer: u32,
        mode_rgb: GLenum,
        mode_alpha: GLenum,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.BlendEquationSeparatei(buffer, mode_rgb, mode_alpha);
        }
        self.check_for_error()
    }

    pub fn gl_color_maski(
        &mut self,
        buffer: u32,
        red: bool,
        green: bool,
        blue: bool,
        alpha: bool,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.ColorMaski(
                buffer,
                gl_bool(red),
                gl_bool(green),
                gl_bool(blue),
                gl_bool(alpha),
            );
        }
        self.check_for_error()
    }

    pub fn gl_blend_color(
        &mut self,
        red: f32,
        green: f32,
        blue: f32,
        alpha: f32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.BlendColor(red, green, blue, alpha);
        }
        self.check_for_error()
    }

    pub fn gl_viewport(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.Viewport(x, y, width, height);
        }
        self.check_for_error()
    }

    pub fn gl_depth_rangef(
        &mut self,
        near: f32,
        far: f32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.DepthRangef(near, far);
        }
        self.check_for_error()
    }

    pub fn gl_scissor(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.Scissor(x, y, width, height);
        }
        self.check_for_error()
    }

    pub fn gl_get_viewport(&self) -> [i32; 4] {
        let mut viewport = [0; 4];
        unsafe {
            self.gl.GetIntegerv(gl43::VIEWPORT, viewport.as_mut_ptr());
        }
        viewport
    }

    pub fn gl_get_scissor_box(&self) -> [i32; 4] {
        let mut scissor_box = [0; 4];
        unsafe {
            self.gl
                .GetIntegerv(gl43::SCISSOR_BOX, scissor_box.as_mut_ptr());
        }
        scissor_box
    }

    //
    // Buffers
    //

    pub fn gl_create_buffer(&mut self) -> EmberResult<BufferId> {
        let mut buffer = 0;
        unsafe {
            self.gl.GenBuffers(1, &mut buffer);
        }
        self.check_for_error()?;
        Ok(BufferId(buffer))
    }

    pub fn gl_destroy_buffer(
        &mut self,
        buffer_id: BufferId,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.DeleteBuffers(1, &buffer_id.0);
        }
        self.check_for_error()
    }

    pub fn gl_bind_buffer(
        &mut self,
        target: GLenum,
        buffer_id: BufferId,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.BindBuffer(target, buffer_id.0);
        }
        self.check_for_error()
    }

    pub fn gl_bind_buffer_range(
        &mut self,
        target: GLenum,
        index: u32,
        buffer_id: BufferId,
        offset: u64,
        size: u64,
    ) -> EmberResult<()> {
        unsafe {
            self.gl
                .BindBufferRange(target, index, buffer_id.0, offset as _, size as _);
        }
        self.check_for_error()
    }

    pub fn gl_buffer_data(
        &mut self,
        target: GLenum,
        size: u64,
        data: Option<&[u8]>,
        usage: GLenum,
    ) -> EmberResult<()> {
        let data = match data {
            Some(data) if (data.len() as u64) < size => {
                Err(EmberError::GlError(gl43::INVALID_VALUE))?
            }
            Some(data) => data.as_ptr() as *const c_void,
            None => std::ptr::null(),
        };

        unsafe {
            self.gl.BufferData(target, size as _, data, usage);
        }
        self.check_for_error()
    }

    pub fn gl_buffer_sub_data(
        &mut self,
        target: GLenum,
        offset: u64,
        data: &[u8],
    ) -> EmberResult<()> {
        unsafe {
            self.gl.BufferSubData(
                target,
                offset as _,
                data.len() as _,
                data.as_ptr() as *const c_void,
            );
        }
        self.check_for_error()
    }

    pub fn gl_get_buffer_sub_data(
        &mut self,
        target: GLenum,
        offset: u64,
        size: u64,
    ) -> EmberResult<Vec<u8>> {
        let mut data = vec![0u8; size as usize];
        unsafe {
            self.gl.GetBufferSubData(
                target,
                offset as _,
                size as _,
                data.as_mut_ptr() as *mut c_void,
            );
        }
        self.check_for_error()?;
        Ok(data)
    }

    //
    // Textures
    //

    pub fn gl_create_texture(&mut self) -> EmberResult<TextureId> {
        let mut texture = 0;
        unsafe {
            self.gl.GenTextures(1, &mut texture);
        }
        self.check_for_error()?;
        Ok(TextureId(texture))
    }

    pub fn gl_destroy_texture(
        &mut self,
        texture_id: TextureId,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.DeleteTextures(1, &texture_id.0);
        }
        self.check_for_error()
    }

    pub fn gl_active_texture(
        &mut self,
        texture: GLenum,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.ActiveTexture(texture);
        }
        self.check_for_error()
    }

    pub fn gl_bind_texture(
        &mut self,
        target: GLenum,
        texture_id: TextureId,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.BindTexture(target, texture_id.0);
        }
        self.check_for_error()
    }

    pub fn gl_tex_storage_2d(
        &mut self,
        target: GLenum,
        levels: u32,
        internal_format: GLenum,
        width: u32,
        height: u32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.TexStorage2D(
                target,
                levels as _,
                internal_format,
                width as _,
                height as _,
            );
        }
        self.check_for_error()
    }

    pub fn gl_tex_storage_2d_multisample(
        &mut self,
        target: GLenum,
        samples: u32,
        internal_format: GLenum,
        width: u32,
        height: u32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.TexStorage2DMultisample(
                target,
                samples as _,
                internal_format,
                width as _,
                height as _,
                gl_bool(true),
            );
        }
        self.check_for_error()
    }

    pub fn gl_tex_sub_image_2d(
        &mut self,
        target: GLenum,
        level: u32,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        format: GLenum,
        pixel_type: GLenum,
        data: &[u8],
    ) -> EmberResult<()> {
        let required_size = width as usize * height as usize * pixel_size(format, pixel_type)?;
        if data.len() < required_size {
            Err(EmberError::GlError(gl43::INVALID_VALUE))?;
        }

        unsafe {
            self.gl.TexSubImage2D(
                target,
                level as _,
                x as _,
                y as _,
                width as _,
                height as _,
                format,
                pixel_type,
                data.as_ptr() as *const c_void,
            );
        }
        self.check_for_error()
    }

    pub fn gl_get_tex_image(
        &mut self,
        target: GLenum,
        level: u32,
        format: GLenum,
        pixel_type: GLenum,
    ) -> EmberResult<Vec<u8>> {
        let mut width = 0;
        let mut height = 0;
        unsafe {
            self.gl
                .GetTexLevelParameteriv(target, level as _, gl43::TEXTURE_WIDTH, &mut width);
            self.gl
                .GetTexLevelParameteriv(target, level as _, gl43::TEXTURE_HEIGHT, &mut height);
        }
        self.check_for_error()?;

        let size = width.max(0) as usize * height.max(0) as usize * pixel_size(format, pixel_type)?;
        let mut data = vec![0u8; size];
        unsafe {
            self.gl.GetTexImage(
                target,
                level as _,
                format,
                pixel_type,
                data.as_mut_ptr() as *mut c_void,
            );
        }
        self.check_for_error()?;
        Ok(data)
    }

    //
    // Samplers
    //

    pub fn gl_create_sampler(&mut self) -> EmberResult<SamplerId> {
        let mut sampler = 0;
        unsafe {
            self.gl.GenSamplers(1, &mut sampler);
        }
        self.check_for_error()?;
        Ok(SamplerId(sampler))
    }

    pub fn gl_destroy_sampler(
        &mut self,
        sampler_id: SamplerId,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.DeleteSamplers(1, &sampler_id.0);
        }
        self.check_for_error()
    }

    pub fn gl_sampler_parameteri(
        &mut self,
        sampler_id: SamplerId,
        pname: GLenum,
        param: GLint,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.SamplerParameteri(sampler_id.0, pname, param);
        }
        self.check_for_error()
    }

    pub fn gl_sampler_parameterf(
        &mut self,
        sampler_id: SamplerId,
        pname: GLenum,
        param: f32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.SamplerParameterf(sampler_id.0, pname, param);
        }
        self.check_for_error()
    }

    pub fn gl_sampler_parameterfv(
        &mut self,
        sampler_id: SamplerId,
        pname: GLenum,
        params: &[f32; 4],
    ) -> EmberResult<()> {
        unsafe {
            self.gl
                .SamplerParameterfv(sampler_id.0, pname, params.as_ptr());
        }
        self.check_for_error()
    }

    pub fn gl_bind_sampler(
        &mut self,
        unit: u32,
        sampler_id: SamplerId,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.BindSampler(unit, sampler_id.0);
        }
        self.check_for_error()
    }

    //
    // Shaders and programs
    //

    pub fn gl_create_shader(
        &mut self,
        shader_type: GLenum,
    ) -> EmberResult<ShaderId> {
        let shader = unsafe { self.gl.CreateShader(shader_type) };
        self.check_for_error()?;
        Ok(ShaderId(shader))
    }

    pub fn gl_destroy_shader(
        &mut self,
        shader_id: ShaderId,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.DeleteShader(shader_id.0);
        }
        self.check_for_error()
    }

    pub fn gl_shader_source(
        &mut self,
        shader_id: ShaderId,
        code: &str,
    ) -> EmberResult<()> {
        let code = c_string(code)?;
        let code_ptr = code.as_ptr();
        unsafe {
            self.gl
                .ShaderSource(shader_id.0, 1, &code_ptr, std::ptr::null());
        }
        self.check_for_error()
    }

    pub fn gl_compile_shader(
        &mut self,
        shader_id: ShaderId,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.CompileShader(shader_id.0);
        }
        self.check_for_error()
    }

    pub fn gl_get_shaderiv(
        &mut self,
        shader_id: ShaderId,
        pname: GLenum,
    ) -> EmberResult<i32> {
        let mut value = 0;
        unsafe {
            self.gl.GetShaderiv(shader_id.0, pname, &mut value);
        }
        self.check_for_error()?;
        Ok(value)
    }

    pub fn gl_get_shader_info_log(
        &mut self,
        shader_id: ShaderId,
    ) -> EmberResult<String> {
        let length = self.gl_get_shaderiv(shader_id, gl43::INFO_LOG_LENGTH)?;
        let mut log = vec![0u8; length.max(0) as usize];
        let mut written = 0;
        unsafe {
            self.gl.GetShaderInfoLog(
                shader_id.0,
                log.len() as _,
                &mut written,
                log.as_mut_ptr() as *mut _,
            );
        }
        self.check_for_error()?;

        log.truncate(written.max(0) as usize);
        Ok(String::from_utf8_lossy(&log).into_owned())
    }

    pub fn gl_create_program(&mut self) -> EmberResult<ProgramId> {
        let program = unsafe { self.gl.CreateProgram() };
        self.check_for_error()?;
        Ok(ProgramId(program))
    }

    pub fn gl_destroy_program(
        &mut self,
        program_id: ProgramId,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.DeleteProgram(program_id.0);
        }
        self.check_for_error()
    }

    pub fn gl_attach_shader(
        &mut self,
        program_id: ProgramId,
        shader_id: ShaderId,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.AttachShader(program_id.0, shader_id.0);
        }
        self.check_for_error()
    }

    pub fn gl_bind_attrib_location(
        &mut self,
        program_id: ProgramId,
        index: u32,
        name: &str,
    ) -> EmberResult<()> {
        let name = c_string(name)?;
        unsafe {
            self.gl
                .BindAttribLocation(program_id.0, index, name.as_ptr());
        }
        self.check_for_error()
    }

    pub fn gl_link_program(
        &mut self,
        program_id: ProgramId,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.LinkProgram(program_id.0);
        }
        self.check_for_error()
    }

    pub fn gl_get_programiv(
        &mut self,
        program_id: ProgramId,
        pname: GLenum,
    ) -> EmberResult<i32> {
        let mut value = 0;
        unsafe {
            self.gl.GetProgramiv(program_id.0, pname, &mut value);
        }
        self.check_for_error()?;
        Ok(value)
    }

    pub fn gl_get_program_info_log(
        &mut self,
        program_id: ProgramId,
    ) -> EmberResult<String> {
        let length = self.gl_get_programiv(program_id, gl43::INFO_LOG_LENGTH)?;
        let mut log = vec![0u8; length.max(0) as usize];
        let mut written = 0;
        unsafe {
            self.gl.GetProgramInfoLog(
                program_id.0,
                log.len() as _,
                &mut written,
                log.as_mut_ptr() as *mut _,
            );
        }
        self.check_for_error()?;

        log.truncate(written.max(0) as usize);
        Ok(String::from_utf8_lossy(&log).into_owned())
    }

    pub fn gl_use_program(
        &mut self,
        program_id: ProgramId,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.UseProgram(program_id.0);
        }
        self.check_for_error()
    }

    pub fn gl_get_uniform_location(
        &mut self,
        program_id: ProgramId,
        name: &str,
    ) -> EmberResult<Option<LocationId>> {
        let name = c_string(name)?;
        let location = unsafe { self.gl.GetUniformLocation(program_id.0, name.as_ptr()) };
        self.check_for_error()?;

        if location < 0 {
            Ok(None)
        } else {
            Ok(Some(LocationId(location)))
        }
    }

    /// Sets a sampler (or int) uniform of the current program
    pub fn gl_uniform_1i(
        &mut self,
        location: LocationId,
        value: i32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.Uniform1i(location.0, value);
        }
        self.check_for_error()
    }

    /// `gl43::INVALID_INDEX` if the program has no such block
    pub fn gl_get_uniform_block_index(
        &mut self,
        program_id: ProgramId,
        name: &str,
    ) -> EmberResult<u32> {
        let name = c_string(name)?;
        let index = unsafe { self.gl.GetUniformBlockIndex(program_id.0, name.as_ptr()) };
        self.check_for_error()?;
        Ok(index)
    }

    pub fn gl_uniform_block_binding(
        &mut self,
        program_id: ProgramId,
        block_index: u32,
        binding: u32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl
                .UniformBlockBinding(program_id.0, block_index, binding);
        }
        self.check_for_error()
    }

    pub fn compile_shader(
        &mut self,
        shader_type: GLenum,
        code: &str,
    ) -> EmberResult<ShaderId> {
        let shader_id = self.gl_create_shader(shader_type)?;
        self.gl_shader_source(shader_id, code)?;
        self.gl_compile_shader(shader_id)?;
        if self.gl_get_shaderiv(shader_id, gl43::COMPILE_STATUS)? == 0 {
            let error = self.gl_get_shader_info_log(shader_id)?;
            log::error!("Error compiling shader: {}", error);
            self.gl_destroy_shader(shader_id)?;
            Err(format!("Error compiling shader: {}", error))?;
        }

        Ok(shader_id)
    }

    /// Link a vertex and fragment shader with fixed attribute locations
    pub fn link_shader_program(
        &mut self,
        vertex_shader: ShaderId,
        fragment_shader: ShaderId,
        attrib_bindings: &[(u32, &str)],
    ) -> EmberResult<ProgramId> {
        let program_id = self.gl_create_program()?;
        self.gl_attach_shader(program_id, vertex_shader)?;
        self.gl_attach_shader(program_id, fragment_shader)?;
        for (location, name) in attrib_bindings {
            self.gl_bind_attrib_location(program_id, *location, name)?;
        }

        self.gl_link_program(program_id)?;
        if self.gl_get_programiv(program_id, gl43::LINK_STATUS)? == 0 {
            let error = self.gl_get_program_info_log(program_id)?;
            log::error!("Error linking program: {}", error);
            self.gl_destroy_program(program_id)?;
            Err(format!("Error linking program: {}", error))?;
        }

        Ok(program_id)
    }

    //
    // Framebuffers
    //

    pub fn gl_create_framebuffer(&mut self) -> EmberResult<FramebufferId> {
        let mut framebuffer = 0;
        unsafe {
            self.gl.GenFramebuffers(1, &mut framebuffer);
        }
        self.check_for_error()?;
        Ok(FramebufferId(framebuffer))
    }

    pub fn gl_destroy_framebuffer(
        &mut self,
        framebuffer_id: FramebufferId,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.DeleteFramebuffers(1, &framebuffer_id.0);
        }
        self.check_for_error()
    }

    /// Writes to the window are only sRGB encoded when its surface has an sRGB format. Writes to
    /// textures follow the texture's format.
    pub fn gl_bind_framebuffer(
        &mut self,
        target: GLenum,
        framebuffer_id: FramebufferId,
    ) -> EmberResult<()> {
        let encode_srgb = if framebuffer_id == NONE_FRAMEBUFFER {
            self.surfaces
                .get(&self.current_drawable)
                .map(|surface| surface.srgb)
                .unwrap_or(false)
        } else {
            true
        };

        unsafe {
            self.gl.BindFramebuffer(target, framebuffer_id.0);
            if target != gl43::READ_FRAMEBUFFER {
                if encode_srgb {
                    self.gl.Enable(gl43::FRAMEBUFFER_SRGB);
                } else {
                    self.gl.Disable(gl43::FRAMEBUFFER_SRGB);
                }
            }
        }
        self.check_for_error()
    }

    pub fn gl_framebuffer_texture_2d(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        texture_target: GLenum,
        texture_id: TextureId,
        level: u32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.FramebufferTexture2D(
                target,
                attachment,
                texture_target,
                texture_id.0,
                level as _,
            );
        }
        self.check_for_error()
    }

    pub fn gl_draw_buffers(
        &mut self,
        buffers: &[GLenum],
    ) -> EmberResult<()> {
        unsafe {
            self.gl.DrawBuffers(buffers.len() as _, buffers.as_ptr());
        }
        self.check_for_error()
    }

    pub fn gl_read_buffer(
        &mut self,
        buffer: GLenum,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.ReadBuffer(buffer);
        }
        self.check_for_error()
    }

    pub fn gl_check_framebuffer_status(
        &mut self,
        target: GLenum,
    ) -> EmberResult<GLenum> {
        let status = unsafe { self.gl.CheckFramebufferStatus(target) };
        self.check_for_error()?;
        Ok(status)
    }

    //
    // Vertex attributes. They live in the context's single vertex array.
    //

    pub fn gl_enable_vertex_attrib_array(
        &mut self,
        index: u32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.EnableVertexAttribArray(index);
        }
        self.check_for_error()
    }

    pub fn gl_disable_vertex_attrib_array(
        &mut self,
        index: u32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.DisableVertexAttribArray(index);
        }
        self.check_for_error()
    }

    pub fn gl_vertex_attrib_pointer(
        &mut self,
        index: u32,
        size: i32,
        attrib_type: GLenum,
        normalized: bool,
        stride: i32,
        offset: u64,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.VertexAttribPointer(
                index,
                size,
                attrib_type,
                gl_bool(normalized),
                stride,
                offset as usize as *const c_void,
            );
        }
        self.check_for_error()
    }

    pub fn gl_vertex_attrib_divisor(
        &mut self,
        index: u32,
        divisor: u32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.VertexAttribDivisor(index, divisor);
        }
        self.check_for_error()
    }

    //
    // Queries
    //

    pub fn gl_create_query(&mut self) -> EmberResult<QueryId> {
        let mut query = 0;
        unsafe {
            self.gl.GenQueries(1, &mut query);
        }
        self.check_for_error()?;
        Ok(QueryId(query))
    }

    pub fn gl_destroy_query(
        &mut self,
        query_id: QueryId,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.DeleteQueries(1, &query_id.0);
        }
        self.check_for_error()
    }

    pub fn gl_query_counter(
        &mut self,
        query_id: QueryId,
        target: GLenum,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.QueryCounter(query_id.0, target);
        }
        self.check_for_error()
    }

    pub fn gl_get_query_object_u64(
        &mut self,
        query_id: QueryId,
        pname: GLenum,
    ) -> EmberResult<u64> {
        let mut value = 0;
        unsafe {
            self.gl.GetQueryObjectui64v(query_id.0, pname, &mut value);
        }
        self.check_for_error()?;
        Ok(value)
    }

    //
    // Debug output
    //

    pub fn gl_push_debug_group(
        &mut self,
        source: GLenum,
        id: u32,
        message: &str,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.PushDebugGroup(
                source,
                id,
                message.len() as _,
                message.as_ptr() as *const _,
            );
        }
        self.check_for_error()?;
        self.debug_group_depth += 1;
        Ok(())
    }

    pub fn gl_pop_debug_group(&mut self) -> EmberResult<()> {
        unsafe {
            self.gl.PopDebugGroup();
        }
        self.check_for_error()?;
        self.debug_group_depth = self.debug_group_depth.saturating_sub(1);
        Ok(())
    }

    pub fn gl_debug_message_insert(
        &mut self,
        source: GLenum,
        message_type: GLenum,
        id: u32,
        severity: GLenum,
        message: &str,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.DebugMessageInsert(
                source,
                message_type,
                id,
                severity,
                message.len() as _,
                message.as_ptr() as *const _,
            );
        }
        self.check_for_error()
    }

    pub fn debug_group_depth(&self) -> usize {
        self.debug_group_depth
    }

    //
    // Draws, clears and transfers
    //

    pub fn gl_draw_arrays_instanced_base_instance(
        &mut self,
        mode: GLenum,
        first: i32,
        count: i32,
        instance_count: i32,
        base_instance: u32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl
                .DrawArraysInstancedBaseInstance(mode, first, count, instance_count, base_instance);
        }
        self.check_for_error()
    }

    pub fn gl_draw_elements_instanced_base_vertex_base_instance(
        &mut self,
        mode: GLenum,
        count: i32,
        index_type: GLenum,
        offset: u64,
        instance_count: i32,
        base_vertex: i32,
        base_instance: u32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.DrawElementsInstancedBaseVertexBaseInstance(
                mode,
                count,
                index_type,
                offset as usize as *const c_void,
                instance_count,
                base_vertex,
                base_instance,
            );
        }
        self.check_for_error()
    }

    pub fn gl_clear_buffer_fv(
        &mut self,
        buffer: GLenum,
        draw_buffer: u32,
        value: &[f32],
    ) -> EmberResult<()> {
        let required_len = if buffer == gl43::COLOR { 4 } else { 1 };
        if value.len() < required_len {
            Err(EmberError::GlError(gl43::INVALID_VALUE))?;
        }

        unsafe {
            self.gl
                .ClearBufferfv(buffer, draw_buffer as _, value.as_ptr());
        }
        self.check_for_error()
    }

    pub fn gl_clear_buffer_iv(
        &mut self,
        buffer: GLenum,
        draw_buffer: u32,
        value: i32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.ClearBufferiv(buffer, draw_buffer as _, &value);
        }
        self.check_for_error()
    }

    pub fn gl_clear_buffer_fi(
        &mut self,
        buffer: GLenum,
        draw_buffer: u32,
        depth: f32,
        stencil: i32,
    ) -> EmberResult<()> {
        unsafe {
            self.gl
                .ClearBufferfi(buffer, draw_buffer as _, depth, stencil);
        }
        self.check_for_error()
    }

    pub fn gl_blit_framebuffer(
        &mut self,
        src_x0: i32,
        src_y0: i32,
        src_x1: i32,
        src_y1: i32,
        dst_x0: i32,
        dst_y0: i32,
        dst_x1: i32,
        dst_y1: i32,
        mask: GLbitfield,
        filter: GLenum,
    ) -> EmberResult<()> {
        unsafe {
            self.gl.BlitFramebuffer(
                src_x0, src_y0, src_x1, src_y1, dst_x0, dst_y0, dst_x1, dst_y1, mask, filter,
            );
        }
        self.check_for_error()
    }

    pub fn gl_read_pixels(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: GLenum,
        pixel_type: GLenum,
    ) -> EmberResult<Vec<u8>> {
        let size =
            width.max(0) as usize * height.max(0) as usize * pixel_size(format, pixel_type)?;
        let mut data = vec![0u8; size];
        unsafe {
            self.gl.ReadPixels(
                x,
                y,
                width,
                height,
                format,
                pixel_type,
                data.as_mut_ptr() as *mut c_void,
            );
        }
        self.check_for_error()?;
        Ok(data)
    }
}

impl Drop for GlContext {
    fn drop(&mut self) {
        if self.make_drawable_current(self.device_window).is_ok() {
            unsafe {
                self.gl.DeleteVertexArrays(1, &self.vertex_array);
            }
        }

        self.context.make_not_current();
    }
}
