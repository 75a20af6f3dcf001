use super::gl43::{self, GLenum, GLint};
use super::glsl::{self, GlslUniformKind};
use super::state::*;
use super::*;
use crate::internal_shared::{RasterOrigin, SoftwareImage};
use crate::{EmberError, EmberFormat, EmberResult};
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};
use std::thread::ThreadId;
use std::time::Instant;

/// A GL 4.3 core context kept in CPU memory. Objects and ambient state are owned by the context
/// and addressed by name. Every `gl_*` call reports the first error it raises through
/// `check_for_error`.
///
/// Draws go through the shared software rasterizer with GL's lower-left origin and [-1, 1] clip
/// depth. Window handles only serve as keys.
#[derive(Debug)]
pub struct GlContext {
    pub(super) state: GlState,
    created_at: Instant,
    current_thread: Option<ThreadId>,
}

impl Default for GlContext {
    fn default() -> Self {
        GlContext::new()
    }
}

impl GlContext {
    pub fn new() -> Self {
        GlContext {
            state: GlState::default(),
            created_at: Instant::now(),
            current_thread: None,
        }
    }

    pub fn create(
        _display: &dyn HasRawDisplayHandle,
        _window: &dyn HasRawWindowHandle,
    ) -> EmberResult<Self> {
        Ok(GlContext::new())
    }

    /// Only records the thread. Calls are accepted from any thread.
    pub fn acquire_thread(&mut self) {
        self.current_thread = Some(std::thread::current().id());
    }

    pub fn release_thread(&mut self) {
        self.current_thread = None;
    }

    pub fn current_thread(&self) -> Option<ThreadId> {
        self.current_thread
    }

    pub(super) fn record_error(
        &mut self,
        error: GLenum,
    ) {
        if self.state.error == gl43::NO_ERROR {
            if self.state.is_enabled(gl43::DEBUG_OUTPUT) {
                log::debug!("GL error 0x{:04X} raised", error);
            }
            self.state.error = error;
        }
    }

    pub fn gl_get_error(&mut self) -> GLenum {
        std::mem::replace(&mut self.state.error, gl43::NO_ERROR)
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
        let value = match pname {
            gl43::MAX_VERTEX_ATTRIBS => MAX_VERTEX_ATTRIBS as i32,
            gl43::MAX_DRAW_BUFFERS | gl43::MAX_COLOR_ATTACHMENTS => MAX_DRAW_BUFFERS as i32,
            gl43::MAX_COLOR_TEXTURE_SAMPLES => MAX_COLOR_TEXTURE_SAMPLES as i32,
            gl43::MAX_COMBINED_TEXTURE_IMAGE_UNITS => MAX_TEXTURE_UNITS as i32,
            gl43::MAX_UNIFORM_BUFFER_BINDINGS => MAX_UNIFORM_BUFFER_BINDINGS as i32,
            gl43::UNIFORM_BUFFER_OFFSET_ALIGNMENT => UNIFORM_BUFFER_OFFSET_ALIGNMENT as i32,
            gl43::MAX_DEBUG_GROUP_STACK_DEPTH => MAX_DEBUG_GROUP_STACK_DEPTH as i32,
            gl43::MAX_TEXTURE_SIZE => MAX_TEXTURE_SIZE as i32,
            gl43::PACK_ALIGNMENT | gl43::UNPACK_ALIGNMENT => 1,
            _ => {
                self.record_error(gl43::INVALID_ENUM);
                0
            }
        };

        self.check_for_error()?;
        Ok(value)
    }

    pub fn gl_get_string(
        &mut self,
        pname: GLenum,
    ) -> EmberResult<String> {
        let value = match pname {
            gl43::VENDOR => "ember",
            gl43::RENDERER => "ember software rasterizer (GL 4.3 core)",
            gl43::VERSION => "4.3.0 Core Profile",
            gl43::SHADING_LANGUAGE_VERSION => "4.30",
            _ => {
                self.record_error(gl43::INVALID_ENUM);
                ""
            }
        };

        self.check_for_error()?;
        Ok(value.to_string())
    }

    pub fn gl_finish(&mut self) -> EmberResult<()> {
        // Every call completes before it returns
        self.check_for_error()
    }

    //
    // Window surfaces. These stand in for the platform's context/drawable API.
    //

    pub fn create_surface(
        &mut self,
        window_hash: WindowHash,
        _window: &dyn HasRawWindowHandle,
        width: u32,
        height: u32,
        format: EmberFormat,
        depth_stencil_format: Option<EmberFormat>,
    ) -> EmberResult<()> {
        if self.state.surfaces.contains_key(&window_hash) {
            Err("A GL surface already exists for this window")?;
        }

        let surface = Self::allocate_surface(width, height, format, depth_stencil_format)?;
        self.state.surfaces.insert(window_hash, surface);
        Ok(())
    }

    fn allocate_surface(
        width: u32,
        height: u32,
        format: EmberFormat,
        depth_stencil_format: Option<EmberFormat>,
    ) -> EmberResult<GlSurface> {
        let color = SoftwareImage::new(width, height, format, 1, RasterOrigin::LowerLeft)?;
        let depth_stencil = match depth_stencil_format {
            Some(format) => Some(SoftwareImage::new(
                width,
                height,
                format,
                1,
                RasterOrigin::LowerLeft,
            )?),
            None => None,
        };

        Ok(GlSurface {
            color,
            depth_stencil,
            presented_frames: 0,
        })
    }

    pub fn resize_surface(
        &mut self,
        window_hash: WindowHash,
        width: u32,
        height: u32,
    ) -> EmberResult<()> {
        let surface = self
            .state
            .surfaces
            .get(&window_hash)
            .ok_or("No GL surface exists for this window")?;
        let format = surface.color.format;
        let depth_stencil_format = surface.depth_stencil.as_ref().map(|image| image.format);
        let presented_frames = surface.presented_frames;

        let mut surface = Self::allocate_surface(width, height, format, depth_stencil_format)?;
        surface.presented_frames = presented_frames;
        self.state.surfaces.insert(window_hash, surface);
        Ok(())
    }

    pub fn destroy_surface(
        &mut self,
        window_hash: WindowHash,
    ) {
        self.state.surfaces.remove(&window_hash);
        if self.state.current_surface == Some(window_hash) {
            self.state.current_surface = None;
        }
    }

    pub fn make_current(
        &mut self,
        window_hash: WindowHash,
    ) -> EmberResult<()> {
        let surface = self
            .state
            .surfaces
            .get(&window_hash)
            .ok_or("No GL surface exists for this window")?;

        // The first drawable made current initializes the viewport and scissor
        if !self.state.viewport_initialized {
            let extents = [0, 0, surface.color.width as i32, surface.color.height as i32];
            self.state.viewport = extents;
            self.state.scissor_box = extents;
            self.state.viewport_initialized = true;
        }

        self.state.current_surface = Some(window_hash);
        Ok(())
    }

    pub fn swap_buffers(
        &mut self,
        window_hash: WindowHash,
    ) -> EmberResult<()> {
        let surface = self
            .state
            .surfaces
            .get_mut(&window_hash)
            .ok_or("No GL surface exists for this window")?;
        surface.presented_frames += 1;
        Ok(())
    }

    pub fn presented_frame_count(
        &self,
        window_hash: WindowHash,
    ) -> u64 {
        self.state
            .surfaces
            .get(&window_hash)
            .map(|surface| surface.presented_frames)
            .unwrap_or(0)
    }

    //
    // Capabilities and fixed-function state
    //

    fn is_valid_cap(cap: GLenum) -> bool {
        matches!(
            cap,
            gl43::CULL_FACE
                | gl43::DEPTH_TEST
                | gl43::STENCIL_TEST
                | gl43::BLEND
                | gl43::SCISSOR_TEST
                | gl43::POLYGON_OFFSET_FILL
                | gl43::POLYGON_OFFSET_LINE
                | gl43::DEPTH_CLAMP
                | gl43::DEBUG_OUTPUT
        )
    }

    pub fn gl_enable(
        &mut self,
        cap: GLenum,
    ) -> EmberResult<()> {
        if !Self::is_valid_cap(cap) {
            self.record_error(gl43::INVALID_ENUM);
        } else if cap == gl43::BLEND {
            for target in &mut self.state.blend_targets {
                target.enabled = true;
            }
        } else {
            self.state.enabled_caps.insert(cap);
        }

        self.check_for_error()
    }

    pub fn gl_disable(
        &mut self,
        cap: GLenum,
    ) -> EmberResult<()> {
        if !Self::is_valid_cap(cap) {
            self.record_error(gl43::INVALID_ENUM);
        } else if cap == gl43::BLEND {
            for target in &mut self.state.blend_targets {
                target.enabled = false;
            }
        } else {
            self.state.enabled_caps.remove(&cap);
        }

        self.check_for_error()
    }

    fn set_blend_enabled(
        &mut self,
        cap: GLenum,
        index: u32,
        enabled: bool,
    ) -> EmberResult<()> {
        if cap != gl43::BLEND {
            self.record_error(gl43::INVALID_ENUM);
        } else if let Some(target) = self.state.blend_targets.get_mut(index as usize) {
            target.enabled = enabled;
        } else {
            self.record_error(gl43::INVALID_VALUE);
        }

        self.check_for_error()
    }

    pub fn gl_enablei(
        &mut self,
        cap: GLenum,
        index: u32,
    ) -> EmberResult<()> {
        self.set_blend_enabled(cap, index, true)
    }

    pub fn gl_disablei(
        &mut self,
        cap: GLenum,
        index: u32,
    ) -> EmberResult<()> {
        self.set_blend_enabled(cap, index, false)
    }

    pub fn gl_is_enabled(
        &self,
        cap: GLenum,
    ) -> bool {
        if cap == gl43::BLEND {
            self.state.blend_targets[0].enabled
        } else {
            self.state.is_enabled(cap)
        }
    }

    pub fn gl_cull_face(
        &mut self,
        mode: GLenum,
    ) -> EmberResult<()> {
        match mode {
            gl43::FRONT | gl43::BACK | gl43::FRONT_AND_BACK => self.state.cull_face = mode,
            _ => self.record_error(gl43::INVALID_ENUM),
        }

        self.check_for_error()
    }

    pub fn gl_front_face(
        &mut self,
        mode: GLenum,
    ) -> EmberResult<()> {
        match mode {
            gl43::CW | gl43::CCW => self.state.front_face = mode,
            _ => self.record_error(gl43::INVALID_ENUM),
        }

        self.check_for_error()
    }

    pub fn gl_polygon_mode(
        &mut self,
        face: GLenum,
        mode: GLenum,
    ) -> EmberResult<()> {
        if face != gl43::FRONT_AND_BACK {
            self.record_error(gl43::INVALID_ENUM);
        } else {
            match mode {
                gl43::POINT | gl43::LINE | gl43::FILL => self.state.polygon_mode = mode,
                _ => self.record_error(gl43::INVALID_ENUM),
            }
        }

        self.check_for_error()
    }

    pub fn gl_polygon_offset(
        &mut self,
        factor: f32,
        units: f32,
    ) -> EmberResult<()> {
        self.state.polygon_offset_factor = factor;
        self.state.polygon_offset_units = units;
        self.check_for_error()
    }

    fn is_valid_compare_func(func: GLenum) -> bool {
        (gl43::NEVER..=gl43::ALWAYS).contains(&func)
    }

    pub fn gl_depth_func(
        &mut self,
        func: GLenum,
    ) -> EmberResult<()> {
        if Self::is_valid_compare_func(func) {
            self.state.depth_func = func;
        } else {
            self.record_error(gl43::INVALID_ENUM);
        }

        self.check_for_error()
    }

    pub fn gl_depth_mask(
        &mut self,
        flag: bool,
    ) -> EmberResult<()> {
        self.state.depth_mask = flag;
        self.check_for_error()
    }

    /// Returns false if `face` is not a valid face selector
    fn update_stencil_faces<F: FnMut(&mut GlStencilFace)>(
        &mut self,
        face: GLenum,
        mut f: F,
    ) -> bool {
        match face {
            gl43::FRONT => f(&mut self.state.stencil_front),
            gl43::BACK => f(&mut self.state.stencil_back),
            gl43::FRONT_AND_BACK => {
                f(&mut self.state.stencil_front);
                f(&mut self.state.stencil_back);
            }
            _ => return false,
        }

        true
    }

    pub fn gl_stencil_func_separate(
        &mut self,
        face: GLenum,
        func: GLenum,
        reference: GLint,
        mask: u32,
    ) -> EmberResult<()> {
        let updated = Self::is_valid_compare_func(func)
            && self.update_stencil_faces(face, |stencil| {
                stencil.func = func;
                stencil.reference = reference;
                stencil.value_mask = mask;
            });
        if !updated {
            self.record_error(gl43::INVALID_ENUM);
        }

        self.check_for_error()
    }

    fn is_valid_stencil_op(op: GLenum) -> bool {
        matches!(
            op,
            gl43::KEEP
                | gl43::ZERO
                | gl43::REPLACE
                | gl43::INCR
                | gl43::DECR
                | gl43::INVERT
                | gl43::INCR_WRAP
                | gl43::DECR_WRAP
        )
    }

    pub fn gl_stencil_op_separate(
        &mut self,
        face: GLenum,
        stencil_fail: GLenum,
        depth_fail: GLenum,
        depth_pass: GLenum,
    ) -> EmberResult<()> {
        let updated = [stencil_fail, depth_fail, depth_pass]
            .iter()
            .all(|&op| Self::is_valid_stencil_op(op))
            && self.update_stencil_faces(face, |stencil| {
                stencil.stencil_fail = stencil_fail;
                stencil.depth_fail = depth_fail;
                stencil.depth_pass = depth_pass;
            });
        if !updated {
            self.record_error(gl43::INVALID_ENUM);
        }

        self.check_for_error()
    }

    pub fn gl_stencil_mask_separate(
        &mut self,
        face: GLenum,
        mask: u32,
    ) -> EmberResult<()> {
        if !self.update_stencil_faces(face, |stencil| stencil.write_mask = mask) {
            self.record_error(gl43::INVALID_ENUM);
        }

        self.check_for_error()
    }

    fn is_valid_blend_factor(factor: GLenum) -> bool {
        matches!(
            factor,
            gl43::ZERO
                | gl43::ONE
                | gl43::SRC_COLOR
                | gl43::ONE_MINUS_SRC_COLOR
                | gl43::SRC_ALPHA
                | gl43::ONE_MINUS_SRC_ALPHA
                | gl43::DST_ALPHA
                | gl43::ONE_MINUS_DST_ALPHA
                | gl43::DST_COLOR
                | gl43::ONE_MINUS_DST_COLOR
                | gl43::SRC_ALPHA_SATURATE
                | gl43::CONSTANT_COLOR
                | gl43::ONE_MINUS_CONSTANT_COLOR
        )
    }

    pub fn gl_blend_func_separatei(
        &mut self,
        buffer: u32,
        src_rgb: GLenum,
        dst_rgb: GLenum,
        src_alpha: GLenum,
        dst_alpha: GLenum,
    ) -> EmberResult<()> {
        if ![src_rgb, dst_rgb, src_alpha, dst_alpha]
            .iter()
            .all(|&factor| Self::is_valid_blend_factor(factor))
        {
            self.record_error(gl43::INVALID_ENUM);
        } else if let Some(target) = self.state.blend_targets.get_mut(buffer as usize) {
            target.src_rgb = src_rgb;
            target.dst_rgb = dst_rgb;
            target.src_alpha = src_alpha;
            target.dst_alpha = dst_alpha;
        } else {
            self.record_error(gl43::INVALID_VALUE);
        }

        self.check_for_error()
    }

    pub fn gl_blend_equation_separatei(
        &mut self,
        buffer: u32,
        mode_rgb: GLenum,
        mode_alpha: GLenum,
    ) -> EmberResult<()> {
        let is_valid = |mode: GLenum| {
            matches!(
                mode,
                gl43::FUNC_ADD
                    | gl43::FUNC_SUBTRACT
                    | gl43::FUNC_REVERSE_SUBTRACT
                    | gl43::MIN
                    | gl43::MAX
            )
        };

        if !is_valid(mode_rgb) || !is_valid(mode_alpha) {
            self.record_error(gl43::INVALID_ENUM);
        } else if let Some(target) = self.state.blend_targets.get_mut(buffer as usize) {
            target.equation_rgb = mode_rgb;
            target.equation_alpha = mode_alpha;
        } else {
            self.record_error(gl43::INVALID_VALUE);
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
        if let Some(target) = self.state.blend_targets.get_mut(buffer as usize) {
            target.color_mask = [red, green, blue, alpha];
        } else {
            self.record_error(gl43::INVALID_VALUE);
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
        self.state.blend_color = [red, green, blue, alpha];
        self.check_for_error()
    }

    pub fn gl_viewport(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> EmberResult<()> {
        if width < 0 || height < 0 {
            self.record_error(gl43::INVALID_VALUE);
        } else {
            self.state.viewport = [x, y, width, height];
            self.state.viewport_initialized = true;
        }

        self.check_for_error()
    }

    pub fn gl_depth_rangef(
        &mut self,
        near: f32,
        far: f32,
    ) -> EmberResult<()> {
        self.state.depth_range = [near.max(0.0).min(1.0), far.max(0.0).min(1.0)];
        self.check_for_error()
    }

    pub fn gl_scissor(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> EmberResult<()> {
        if width < 0 || height < 0 {
            self.record_error(gl43::INVALID_VALUE);
        } else {
            self.state.scissor_box = [x, y, width, height];
        }

        self.check_for_error()
    }

    pub fn gl_get_viewport(&self) -> [i32; 4] {
        self.state.viewport
    }

    pub fn gl_get_scissor_box(&self) -> [i32; 4] {
        self.state.scissor_box
    }

    //
    // Buffers
    //

    pub fn gl_create_buffer(&mut self) -> EmberResult<BufferId> {
        let name = self.state.allocate_name();
        self.state.buffers.insert(name, GlBufferObject::default());
        self.check_for_error()?;
        Ok(BufferId(name))
    }

    pub fn gl_destroy_buffer(
        &mut self,
        buffer_id: BufferId,
    ) -> EmberResult<()> {
        let state = &mut self.state;
        if state.buffers.remove(&buffer_id.0).is_some() {
            // Deleting a bound buffer unbinds it
            for binding in [
                &mut state.array_buffer,
                &mut state.element_array_buffer,
                &mut state.uniform_buffer,
            ] {
                if *binding == buffer_id {
                    *binding = NONE_BUFFER;
                }
            }
            for range in &mut state.uniform_buffer_ranges {
                if range.map(|range| range.buffer) == Some(buffer_id) {
                    *range = None;
                }
            }
        }

        self.check_for_error()
    }

    fn buffer_binding_mut(
        &mut self,
        target: GLenum,
    ) -> Option<&mut BufferId> {
        match target {
            gl43::ARRAY_BUFFER => Some(&mut self.state.array_buffer),
            gl43::ELEMENT_ARRAY_BUFFER => Some(&mut self.state.element_array_buffer),
            gl43::UNIFORM_BUFFER => Some(&mut self.state.uniform_buffer),
            _ => None,
        }
    }

    pub fn gl_bind_buffer(
        &mut self,
        target: GLenum,
        buffer_id: BufferId,
    ) -> EmberResult<()> {
        let exists = buffer_id == NONE_BUFFER || self.state.buffers.contains_key(&buffer_id.0);
        if !exists {
            self.record_error(gl43::INVALID_OPERATION);
        } else if let Some(binding) = self.buffer_binding_mut(target) {
            *binding = buffer_id;
        } else {
            self.record_error(gl43::INVALID_ENUM);
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
        if target != gl43::UNIFORM_BUFFER {
            self.record_error(gl43::INVALID_ENUM);
        } else if index as usize >= MAX_UNIFORM_BUFFER_BINDINGS
            || offset % UNIFORM_BUFFER_OFFSET_ALIGNMENT as u64 != 0
        {
            self.record_error(gl43::INVALID_VALUE);
        } else if buffer_id == NONE_BUFFER {
            self.state.uniform_buffer_ranges[index as usize] = None;
        } else if !self.state.buffers.contains_key(&buffer_id.0) {
            self.record_error(gl43::INVALID_OPERATION);
        } else if size == 0 {
            self.record_error(gl43::INVALID_VALUE);
        } else {
            self.state.uniform_buffer_ranges[index as usize] = Some(GlBufferRange {
                buffer: buffer_id,
                offset,
                size,
            });
            self.state.uniform_buffer = buffer_id;
        }

        self.check_for_error()
    }

    fn bound_buffer_mut(
        &mut self,
        target: GLenum,
    ) -> Result<&mut GlBufferObject, GLenum> {
        let buffer_id = match target {
            gl43::ARRAY_BUFFER => self.state.array_buffer,
            gl43::ELEMENT_ARRAY_BUFFER => self.state.element_array_buffer,
            gl43::UNIFORM_BUFFER => self.state.uniform_buffer,
            _ => return Err(gl43::INVALID_ENUM),
        };

        self.state
            .buffers
            .get_mut(&buffer_id.0)
            .ok_or(gl43::INVALID_OPERATION)
    }

    pub fn gl_buffer_data(
        &mut self,
        target: GLenum,
        size: u64,
        data: Option<&[u8]>,
        usage: GLenum,
    ) -> EmberResult<()> {
        if usage != gl43::STATIC_DRAW && usage != gl43::DYNAMIC_DRAW {
            self.record_error(gl43::INVALID_ENUM);
            return self.check_for_error();
        }

        if data.map(|data| data.len() as u64 != size).unwrap_or(false) {
            self.record_error(gl43::INVALID_VALUE);
            return self.check_for_error();
        }

        match self.bound_buffer_mut(target) {
            Ok(buffer) => {
                buffer.data = match data {
                    Some(data) => data.to_vec(),
                    None => vec![0; size as usize],
                };
            }
            Err(error) => self.record_error(error),
        }

        self.check_for_error()
    }

    pub fn gl_buffer_sub_data(
        &mut self,
        target: GLenum,
        offset: u64,
        data: &[u8],
    ) -> EmberResult<()> {
        match self.bound_buffer_mut(target) {
            Ok(buffer) => {
                let end = offset as usize + data.len();
                if end > buffer.data.len() {
                    self.record_error(gl43::INVALID_VALUE);
                } else {
                    buffer.data[offset as usize..end].copy_from_slice(data);
                }
            }
            Err(error) => self.record_error(error),
        }

        self.check_for_error()
    }

    pub fn gl_get_buffer_sub_data(
        &mut self,
        target: GLenum,
        offset: u64,
        size: u64,
    ) -> EmberResult<Vec<u8>> {
        let mut result = Vec::new();
        match self.bound_buffer_mut(target) {
            Ok(buffer) => {
                let end = (offset + size) as usize;
                if end > buffer.data.len() {
                    self.record_error(gl43::INVALID_VALUE);
                } else {
                    result = buffer.data[offset as usize..end].to_vec();
                }
            }
            Err(error) => self.record_error(error),
        }

        self.check_for_error()?;
        Ok(result)
    }

    //
    // Textures
    //

    pub fn gl_create_texture(&mut self) -> EmberResult<TextureId> {
        let name = self.state.allocate_name();
        self.state.textures.insert(
            name,
            GlTextureObject {
                target: gl43::NONE,
                internal_format: gl43::NONE,
                levels: Vec::new(),
            },
        );
        self.check_for_error()?;
        Ok(TextureId(name))
    }

    pub fn gl_destroy_texture(
        &mut self,
        texture_id: TextureId,
    ) -> EmberResult<()> {
        if self.state.textures.remove(&texture_id.0).is_some() {
            for unit in &mut self.state.texture_units {
                if unit.texture_2d == texture_id {
                    unit.texture_2d = NONE_TEXTURE;
                }
                if unit.texture_2d_multisample == texture_id {
                    unit.texture_2d_multisample = NONE_TEXTURE;
                }
            }

            // Deleting an attached texture detaches it from the bound framebuffers
            let bound_framebuffers = [self.state.draw_framebuffer, self.state.read_framebuffer];
            for framebuffer_id in bound_framebuffers.iter() {
                if let Some(framebuffer) = self.state.framebuffers.get_mut(&framebuffer_id.0) {
                    framebuffer
                        .color_attachments
                        .retain(|_, attachment| attachment.texture != texture_id);
                    if framebuffer.depth_stencil_attachment.map(|a| a.texture) == Some(texture_id)
                    {
                        framebuffer.depth_stencil_attachment = None;
                    }
                }
            }
        }

        self.check_for_error()
    }

    pub fn gl_active_texture(
        &mut self,
        texture: GLenum,
    ) -> EmberResult<()> {
        let unit = texture.wrapping_sub(gl43::TEXTURE0) as usize;
        if unit < MAX_TEXTURE_UNITS {
            self.state.active_texture_unit = unit;
        } else {
            self.record_error(gl43::INVALID_ENUM);
        }

        self.check_for_error()
    }

    pub fn gl_bind_texture(
        &mut self,
        target: GLenum,
        texture_id: TextureId,
    ) -> EmberResult<()> {
        if target != gl43::TEXTURE_2D && target != gl43::TEXTURE_2D_MULTISAMPLE {
            self.record_error(gl43::INVALID_ENUM);
            return self.check_for_error();
        }

        if texture_id != NONE_TEXTURE {
            match self.state.textures.get_mut(&texture_id.0) {
                Some(texture) if texture.target == gl43::NONE => texture.target = target,
                Some(texture) if texture.target == target => {}
                _ => {
                    self.record_error(gl43::INVALID_OPERATION);
                    return self.check_for_error();
                }
            }
        }

        let unit = &mut self.state.texture_units[self.state.active_texture_unit];
        if target == gl43::TEXTURE_2D {
            unit.texture_2d = texture_id;
        } else {
            unit.texture_2d_multisample = texture_id;
        }

        self.check_for_error()
    }

    fn bound_texture_mut(
        &mut self,
        target: GLenum,
    ) -> Result<&mut GlTextureObject, GLenum> {
        let unit = &self.state.texture_units[self.state.active_texture_unit];
        let texture_id = match target {
            gl43::TEXTURE_2D => unit.texture_2d,
            gl43::TEXTURE_2D_MULTISAMPLE => unit.texture_2d_multisample,
            _ => return Err(gl43::INVALID_ENUM),
        };

        self.state
            .textures
            .get_mut(&texture_id.0)
            .ok_or(gl43::INVALID_OPERATION)
    }

    fn allocate_texture_storage(
        &mut self,
        target: GLenum,
        levels: u32,
        samples: u32,
        internal_format: GLenum,
        width: u32,
        height: u32,
    ) -> Result<(), GLenum> {
        let format_info =
            gl_format_info_for_internal_format(internal_format).ok_or(gl43::INVALID_ENUM)?;
        if width == 0 || height == 0 || width > MAX_TEXTURE_SIZE || height > MAX_TEXTURE_SIZE {
            return Err(gl43::INVALID_VALUE);
        }

        let max_levels = 32 - width.max(height).leading_zeros();
        if levels == 0 || levels > max_levels {
            return Err(gl43::INVALID_OPERATION);
        }

        let texture = self.bound_texture_mut(target)?;
        if !texture.levels.is_empty() {
            // Immutable storage
            return Err(gl43::INVALID_OPERATION);
        }

        let mut images = Vec::with_capacity(levels as usize);
        for level in 0..levels {
            let image = SoftwareImage::new(
                (width >> level).max(1),
                (height >> level).max(1),
                format_info.format,
                samples,
                RasterOrigin::LowerLeft,
            )
            .map_err(|_| gl43::INVALID_ENUM)?;
            images.push(image);
        }

        texture.internal_format = internal_format;
        texture.levels = images;
        Ok(())
    }

    pub fn gl_tex_storage_2d(
        &mut self,
        target: GLenum,
        levels: u32,
        internal_format: GLenum,
        width: u32,
        height: u32,
    ) -> EmberResult<()> {
        if target != gl43::TEXTURE_2D {
            self.record_error(gl43::INVALID_ENUM);
        } else if let Err(error) =
            self.allocate_texture_storage(target, levels, 1, internal_format, width, height)
        {
            self.record_error(error);
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
        if target != gl43::TEXTURE_2D_MULTISAMPLE {
            self.record_error(gl43::INVALID_ENUM);
        } else if samples == 0 || samples > MAX_COLOR_TEXTURE_SAMPLES {
            self.record_error(gl43::INVALID_OPERATION);
        } else if let Err(error) =
            self.allocate_texture_storage(target, 1, samples, internal_format, width, height)
        {
            self.record_error(error);
        }

        self.check_for_error()
    }

    /// Upload a region of one level. Rows are tightly packed, bottom row first.
    #[allow(clippy::too_many_arguments)]
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
        if let Err(error) = self.tex_sub_image_2d(
            target, level, x, y, width, height, format, pixel_type, data,
        ) {
            self.record_error(error);
        }

        self.check_for_error()
    }

    #[allow(clippy::too_many_arguments)]
    fn tex_sub_image_2d(
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
    ) -> Result<(), GLenum> {
        if target != gl43::TEXTURE_2D {
            return Err(gl43::INVALID_ENUM);
        }

        let texture = self.bound_texture_mut(target)?;
        let format_info = gl_format_info_for_internal_format(texture.internal_format)
            .ok_or(gl43::INVALID_OPERATION)?;
        if format_info.pixel_format != format || format_info.pixel_type != pixel_type {
            return Err(gl43::INVALID_OPERATION);
        }

        let image = texture
            .levels
            .get_mut(level as usize)
            .ok_or(gl43::INVALID_VALUE)?;
        if x + width > image.width || y + height > image.height {
            return Err(gl43::INVALID_VALUE);
        }

        let texel_size = image.row_pitch() / image.width as usize;
        let region_pitch = texel_size * width as usize;
        if data.len() != region_pitch * height as usize {
            return Err(gl43::INVALID_VALUE);
        }

        let mut rows = image.read_rows().map_err(|_| gl43::INVALID_OPERATION)?;
        let row_pitch = image.row_pitch();
        for row in 0..height as usize {
            let dst_begin = (y as usize + row) * row_pitch + x as usize * texel_size;
            let src_begin = row * region_pitch;
            rows[dst_begin..dst_begin + region_pitch]
                .copy_from_slice(&data[src_begin..src_begin + region_pitch]);
        }

        image
            .write_rows(&rows)
            .map_err(|_| gl43::INVALID_OPERATION)
    }

    /// Read back a whole level. Rows are tightly packed, bottom row first.
    pub fn gl_get_tex_image(
        &mut self,
        target: GLenum,
        level: u32,
        format: GLenum,
        pixel_type: GLenum,
    ) -> EmberResult<Vec<u8>> {
        let result = (|| {
            if target != gl43::TEXTURE_2D {
                return Err(gl43::INVALID_ENUM);
            }

            let texture = self.bound_texture_mut(target)?;
            let format_info = gl_format_info_for_internal_format(texture.internal_format)
                .ok_or(gl43::INVALID_OPERATION)?;
            if format_info.pixel_format != format || format_info.pixel_type != pixel_type {
                return Err(gl43::INVALID_OPERATION);
            }

            texture
                .levels
                .get(level as usize)
                .ok_or(gl43::INVALID_VALUE)?
                .read_rows()
                .map_err(|_| gl43::INVALID_OPERATION)
        })();

        match result {
            Ok(rows) => {
                self.check_for_error()?;
                Ok(rows)
            }
            Err(error) => {
                self.record_error(error);
                self.check_for_error()?;
                Ok(Vec::new())
            }
        }
    }

    //
    // Samplers
    //

    pub fn gl_create_sampler(&mut self) -> EmberResult<SamplerId> {
        let name = self.state.allocate_name();
        self.state
            .samplers
            .insert(name, GlSamplerObject::default());
        self.check_for_error()?;
        Ok(SamplerId(name))
    }

    pub fn gl_destroy_sampler(
        &mut self,
        sampler_id: SamplerId,
    ) -> EmberResult<()> {
        if self.state.samplers.remove(&sampler_id.0).is_some() {
            for unit in &mut self.state.texture_units {
                if unit.sampler == sampler_id {
                    unit.sampler = NONE_SAMPLER;
                }
            }
        }

        self.check_for_error()
    }

    pub fn gl_sampler_parameteri(
        &mut self,
        sampler_id: SamplerId,
        pname: GLenum,
        param: GLint,
    ) -> EmberResult<()> {
        let param = param as GLenum;
        let is_filter = |value: GLenum| value == gl43::NEAREST || value == gl43::LINEAR;
        let is_min_filter = |value: GLenum| {
            is_filter(value) || (gl43::NEAREST_MIPMAP_NEAREST..=gl43::LINEAR_MIPMAP_LINEAR).contains(&value)
        };
        let is_wrap = |value: GLenum| {
            matches!(
                value,
                gl43::REPEAT | gl43::MIRRORED_REPEAT | gl43::CLAMP_TO_EDGE | gl43::CLAMP_TO_BORDER
            )
        };

        let error = match self.state.samplers.get_mut(&sampler_id.0) {
            None => Some(gl43::INVALID_OPERATION),
            Some(sampler) => match pname {
                gl43::TEXTURE_MIN_FILTER if is_min_filter(param) => {
                    sampler.min_filter = param;
                    None
                }
                gl43::TEXTURE_MAG_FILTER if is_filter(param) => {
                    sampler.mag_filter = param;
                    None
                }
                gl43::TEXTURE_WRAP_S if is_wrap(param) => {
                    sampler.wrap_s = param;
                    None
                }
                gl43::TEXTURE_WRAP_T if is_wrap(param) => {
                    sampler.wrap_t = param;
                    None
                }
                _ => Some(gl43::INVALID_ENUM),
            },
        };

        if let Some(error) = error {
            self.record_error(error);
        }

        self.check_for_error()
    }

    pub fn gl_sampler_parameterf(
        &mut self,
        sampler_id: SamplerId,
        pname: GLenum,
        param: f32,
    ) -> EmberResult<()> {
        match self.state.samplers.get_mut(&sampler_id.0) {
            None => self.record_error(gl43::INVALID_OPERATION),
            Some(sampler) if pname == gl43::TEXTURE_LOD_BIAS => sampler.lod_bias = param,
            Some(_) => self.record_error(gl43::INVALID_ENUM),
        }

        self.check_for_error()
    }

    pub fn gl_sampler_parameterfv(
        &mut self,
        sampler_id: SamplerId,
        pname: GLenum,
        params: &[f32; 4],
    ) -> EmberResult<()> {
        match self.state.samplers.get_mut(&sampler_id.0) {
            None => self.record_error(gl43::INVALID_OPERATION),
            Some(sampler) if pname == gl43::TEXTURE_BORDER_COLOR => sampler.border_color = *params,
            Some(_) => self.record_error(gl43::INVALID_ENUM),
        }

        self.check_for_error()
    }

    pub fn gl_bind_sampler(
        &mut self,
        unit: u32,
        sampler_id: SamplerId,
    ) -> EmberResult<()> {
        if unit as usize >= MAX_TEXTURE_UNITS {
            self.record_error(gl43::INVALID_VALUE);
        } else if sampler_id != NONE_SAMPLER && !self.state.samplers.contains_key(&sampler_id.0) {
            self.record_error(gl43::INVALID_OPERATION);
        } else {
            self.state.texture_units[unit as usize].sampler = sampler_id;
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
        if shader_type != gl43::VERTEX_SHADER && shader_type != gl43::FRAGMENT_SHADER {
            self.record_error(gl43::INVALID_ENUM);
            self.check_for_error()?;
        }

        let name = self.state.allocate_name();
        self.state.shaders.insert(
            name,
            GlShaderObject {
                shader_type,
                source: String::new(),
                compiled: false,
                info_log: String::new(),
            },
        );
        self.check_for_error()?;
        Ok(ShaderId(name))
    }

    pub fn gl_destroy_shader(
        &mut self,
        shader_id: ShaderId,
    ) -> EmberResult<()> {
        self.state.shaders.remove(&shader_id.0);
        self.check_for_error()
    }

    pub fn gl_shader_source(
        &mut self,
        shader_id: ShaderId,
        code: &str,
    ) -> EmberResult<()> {
        match self.state.shaders.get_mut(&shader_id.0) {
            Some(shader) => shader.source = code.to_string(),
            None => self.record_error(gl43::INVALID_VALUE),
        }

        self.check_for_error()
    }

    pub fn gl_compile_shader(
        &mut self,
        shader_id: ShaderId,
    ) -> EmberResult<()> {
        match self.state.shaders.get_mut(&shader_id.0) {
            Some(shader) => match glsl::compile_check(&shader.source) {
                Ok(()) => {
                    shader.compiled = true;
                    shader.info_log.clear();
                }
                Err(message) => {
                    shader.compiled = false;
                    shader.info_log = message;
                }
            },
            None => self.record_error(gl43::INVALID_VALUE),
        }

        self.check_for_error()
    }

    pub fn gl_get_shaderiv(
        &mut self,
        shader_id: ShaderId,
        pname: GLenum,
    ) -> EmberResult<i32> {
        let value = match self.state.shaders.get(&shader_id.0) {
            Some(shader) => match pname {
                gl43::COMPILE_STATUS => shader.compiled as i32,
                gl43::INFO_LOG_LENGTH => shader.info_log.len() as i32,
                _ => {
                    self.record_error(gl43::INVALID_ENUM);
                    0
                }
            },
            None => {
                self.record_error(gl43::INVALID_VALUE);
                0
            }
        };

        self.check_for_error()?;
        Ok(value)
    }

    pub fn gl_get_shader_info_log(
        &mut self,
        shader_id: ShaderId,
    ) -> EmberResult<String> {
        let log = match self.state.shaders.get(&shader_id.0) {
            Some(shader) => shader.info_log.clone(),
            None => {
                self.record_error(gl43::INVALID_VALUE);
                String::new()
            }
        };

        self.check_for_error()?;
        Ok(log)
    }

    pub fn gl_create_program(&mut self) -> EmberResult<ProgramId> {
        let name = self.state.allocate_name();
        self.state
            .programs
            .insert(name, GlProgramObject::default());
        self.check_for_error()?;
        Ok(ProgramId(name))
    }

    pub fn gl_destroy_program(
        &mut self,
        program_id: ProgramId,
    ) -> EmberResult<()> {
        self.state.programs.remove(&program_id.0);
        if self.state.current_program == program_id {
            self.state.current_program = NONE_PROGRAM;
        }

        self.check_for_error()
    }

    pub fn gl_attach_shader(
        &mut self,
        program_id: ProgramId,
        shader_id: ShaderId,
    ) -> EmberResult<()> {
        if !self.state.shaders.contains_key(&shader_id.0) {
            self.record_error(gl43::INVALID_VALUE);
        } else {
            match self.state.programs.get_mut(&program_id.0) {
                Some(program) if program.attached_shaders.contains(&shader_id) => {
                    self.record_error(gl43::INVALID_OPERATION)
                }
                Some(program) => program.attached_shaders.push(shader_id),
                None => self.record_error(gl43::INVALID_VALUE),
            }
        }

        self.check_for_error()
    }

    pub fn gl_bind_attrib_location(
        &mut self,
        program_id: ProgramId,
        index: u32,
        name: &str,
    ) -> EmberResult<()> {
        if index as usize >= MAX_VERTEX_ATTRIBS {
            self.record_error(gl43::INVALID_VALUE);
        } else if name.starts_with("gl_") {
            self.record_error(gl43::INVALID_OPERATION);
        } else {
            match self.state.programs.get_mut(&program_id.0) {
                Some(program) => {
                    program.attrib_bindings.insert(name.to_string(), index);
                }
                None => self.record_error(gl43::INVALID_VALUE),
            }
        }

        self.check_for_error()
    }

    fn link(
        shaders: &[&GlShaderObject],
        attrib_bindings: &fnv::FnvHashMap<String, u32>,
    ) -> Result<GlLinkedProgram, String> {
        let stage = |shader_type: GLenum| {
            shaders
                .iter()
                .find(|shader| shader.shader_type == shader_type)
                .copied()
        };

        let vertex = stage(gl43::VERTEX_SHADER).ok_or("error: no vertex shader attached")?;
        let fragment = stage(gl43::FRAGMENT_SHADER).ok_or("error: no fragment shader attached")?;
        for shader in shaders {
            if !shader.compiled {
                return Err("error: an attached shader is not compiled".to_string());
            }
        }

        let mut linked = GlLinkedProgram::default();
        for input in glsl::scan_inputs(&vertex.source) {
            if let Some(&location) = attrib_bindings.get(&input) {
                if linked.attributes.contains_key(&location) {
                    return Err(format!(
                        "error: attribute '{}' aliases location {}",
                        input, location
                    ));
                }
                linked.attributes.insert(location, input);
            }
        }

        for source in [&vertex.source, &fragment.source] {
            for uniform in glsl::scan_uniforms(source) {
                if uniform.kind == GlslUniformKind::Block {
                    if linked.blocks.iter().all(|block| block.name != uniform.name) {
                        linked.blocks.push(GlLinkedBlock {
                            name: uniform.name,
                            binding: 0,
                        });
                    }
                } else if linked.uniforms.iter().all(|u| u.name != uniform.name) {
                    linked.uniforms.push(GlLinkedUniform {
                        name: uniform.name,
                        kind: uniform.kind,
                        value: 0,
                    });
                }
            }
        }

        Ok(linked)
    }

    pub fn gl_link_program(
        &mut self,
        program_id: ProgramId,
    ) -> EmberResult<()> {
        let program = match self.state.programs.get(&program_id.0) {
            Some(program) => program,
            None => {
                self.record_error(gl43::INVALID_VALUE);
                return self.check_for_error();
            }
        };

        let shaders: Option<Vec<_>> = program
            .attached_shaders
            .iter()
            .map(|shader_id| self.state.shaders.get(&shader_id.0))
            .collect();
        let result = match shaders {
            Some(shaders) => Self::link(&shaders, &program.attrib_bindings),
            None => Err("error: an attached shader was deleted".to_string()),
        };

        if let Some(program) = self.state.programs.get_mut(&program_id.0) {
            match result {
                Ok(linked) => {
                    program.linked = Some(linked);
                    program.info_log.clear();
                }
                Err(message) => {
                    program.linked = None;
                    program.info_log = message;
                }
            }
        }

        self.check_for_error()
    }

    pub fn gl_get_programiv(
        &mut self,
        program_id: ProgramId,
        pname: GLenum,
    ) -> EmberResult<i32> {
        let value = match self.state.programs.get(&program_id.0) {
            Some(program) => match pname {
                gl43::LINK_STATUS => program.linked.is_some() as i32,
                gl43::INFO_LOG_LENGTH => program.info_log.len() as i32,
                gl43::ACTIVE_UNIFORMS => program
                    .linked
                    .as_ref()
                    .map(|linked| linked.uniforms.len() as i32)
                    .unwrap_or(0),
                gl43::ACTIVE_UNIFORM_BLOCKS => program
                    .linked
                    .as_ref()
                    .map(|linked| linked.blocks.len() as i32)
                    .unwrap_or(0),
                _ => {
                    self.record_error(gl43::INVALID_ENUM);
                    0
                }
            },
            None => {
                self.record_error(gl43::INVALID_VALUE);
                0
            }
        };

        self.check_for_error()?;
        Ok(value)
    }

    pub fn gl_get_program_info_log(
        &mut self,
        program_id: ProgramId,
    ) -> EmberResult<String> {
        let log = match self.state.programs.get(&program_id.0) {
            Some(program) => program.info_log.clone(),
            None => {
                self.record_error(gl43::INVALID_VALUE);
                String::new()
            }
        };

        self.check_for_error()?;
        Ok(log)
    }

    pub fn gl_use_program(
        &mut self,
        program_id: ProgramId,
    ) -> EmberResult<()> {
        let is_linked = self
            .state
            .programs
            .get(&program_id.0)
            .map(|program| program.linked.is_some());
        match is_linked {
            _ if program_id == NONE_PROGRAM => self.state.current_program = NONE_PROGRAM,
            Some(true) => self.state.current_program = program_id,
            Some(false) => self.record_error(gl43::INVALID_OPERATION),
            None => self.record_error(gl43::INVALID_VALUE),
        }

        self.check_for_error()
    }

    fn linked_program(
        &mut self,
        program_id: ProgramId,
    ) -> Result<&mut GlLinkedProgram, GLenum> {
        match self.state.programs.get_mut(&program_id.0) {
            Some(program) => program.linked.as_mut().ok_or(gl43::INVALID_OPERATION),
            None => Err(gl43::INVALID_VALUE),
        }
    }

    /// Returns `None` where GL returns -1: the name is not an active uniform
    pub fn gl_get_uniform_location(
        &mut self,
        program_id: ProgramId,
        name: &str,
    ) -> EmberResult<Option<LocationId>> {
        let location = match self.linked_program(program_id) {
            Ok(linked) => linked
                .uniforms
                .iter()
                .position(|uniform| uniform.name == name)
                .map(|index| LocationId(index as i32)),
            Err(error) => {
                self.record_error(error);
                None
            }
        };

        self.check_for_error()?;
        Ok(location)
    }

    /// Sets a sampler (or int) uniform of the current program
    pub fn gl_uniform_1i(
        &mut self,
        location: LocationId,
        value: i32,
    ) -> EmberResult<()> {
        let current_program = self.state.current_program;
        match self.linked_program(current_program) {
            Ok(linked) => match linked.uniforms.get_mut(location.0 as usize) {
                Some(uniform) => {
                    if uniform.kind == GlslUniformKind::Sampler2D
                        && (value < 0 || value as usize >= MAX_TEXTURE_UNITS)
                    {
                        self.record_error(gl43::INVALID_VALUE);
                    } else {
                        uniform.value = value;
                    }
                }
                None => self.record_error(gl43::INVALID_OPERATION),
            },
            Err(_) => self.record_error(gl43::INVALID_OPERATION),
        }

        self.check_for_error()
    }

    /// Returns `gl43::INVALID_INDEX` if the program has no block with that name
    pub fn gl_get_uniform_block_index(
        &mut self,
        program_id: ProgramId,
        name: &str,
    ) -> EmberResult<u32> {
        let index = match self.linked_program(program_id) {
            Ok(linked) => linked
                .blocks
                .iter()
                .position(|block| block.name == name)
                .map(|index| index as u32)
                .unwrap_or(gl43::INVALID_INDEX),
            Err(error) => {
                self.record_error(error);
                gl43::INVALID_INDEX
            }
        };

        self.check_for_error()?;
        Ok(index)
    }

    pub fn gl_uniform_block_binding(
        &mut self,
        program_id: ProgramId,
        block_index: u32,
        binding: u32,
    ) -> EmberResult<()> {
        if binding as usize >= MAX_UNIFORM_BUFFER_BINDINGS {
            self.record_error(gl43::INVALID_VALUE);
            return self.check_for_error();
        }

        match self.linked_program(program_id) {
            Ok(linked) => match linked.blocks.get_mut(block_index as usize) {
                Some(block) => block.binding = binding,
                None => self.record_error(gl43::INVALID_VALUE),
            },
            Err(error) => self.record_error(error),
        }

        self.check_for_error()
    }

    /// Create and compile a shader, returning the compile log as an error on failure
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
        let name = self.state.allocate_name();
        self.state
            .framebuffers
            .insert(name, GlFramebufferObject::default());
        self.check_for_error()?;
        Ok(FramebufferId(name))
    }

    pub fn gl_destroy_framebuffer(
        &mut self,
        framebuffer_id: FramebufferId,
    ) -> EmberResult<()> {
        if framebuffer_id != NONE_FRAMEBUFFER
            && self.state.framebuffers.remove(&framebuffer_id.0).is_some()
        {
            if self.state.draw_framebuffer == framebuffer_id {
                self.state.draw_framebuffer = NONE_FRAMEBUFFER;
            }
            if self.state.read_framebuffer == framebuffer_id {
                self.state.read_framebuffer = NONE_FRAMEBUFFER;
            }
        }

        self.check_for_error()
    }

    pub fn gl_bind_framebuffer(
        &mut self,
        target: GLenum,
        framebuffer_id: FramebufferId,
    ) -> EmberResult<()> {
        if framebuffer_id != NONE_FRAMEBUFFER
            && !self.state.framebuffers.contains_key(&framebuffer_id.0)
        {
            self.record_error(gl43::INVALID_OPERATION);
            return self.check_for_error();
        }

        match target {
            gl43::FRAMEBUFFER => {
                self.state.draw_framebuffer = framebuffer_id;
                self.state.read_framebuffer = framebuffer_id;
            }
            gl43::DRAW_FRAMEBUFFER => self.state.draw_framebuffer = framebuffer_id,
            gl43::READ_FRAMEBUFFER => self.state.read_framebuffer = framebuffer_id,
            _ => self.record_error(gl43::INVALID_ENUM),
        }

        self.check_for_error()
    }

    fn bound_framebuffer_id(
        &self,
        target: GLenum,
    ) -> Option<FramebufferId> {
        match target {
            gl43::FRAMEBUFFER | gl43::DRAW_FRAMEBUFFER => Some(self.state.draw_framebuffer),
            gl43::READ_FRAMEBUFFER => Some(self.state.read_framebuffer),
            _ => None,
        }
    }

    pub fn gl_framebuffer_texture_2d(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        texture_target: GLenum,
        texture_id: TextureId,
        level: u32,
    ) -> EmberResult<()> {
        if let Err(error) =
            self.framebuffer_texture_2d(target, attachment, texture_target, texture_id, level)
        {
            self.record_error(error);
        }

        self.check_for_error()
    }

    fn framebuffer_texture_2d(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        texture_target: GLenum,
        texture_id: TextureId,
        level: u32,
    ) -> Result<(), GLenum> {
        let framebuffer_id = self.bound_framebuffer_id(target).ok_or(gl43::INVALID_ENUM)?;
        if framebuffer_id == NONE_FRAMEBUFFER {
            return Err(gl43::INVALID_OPERATION);
        }

        let new_attachment = if texture_id == NONE_TEXTURE {
            None
        } else {
            let texture = self
                .state
                .textures
                .get(&texture_id.0)
                .ok_or(gl43::INVALID_OPERATION)?;
            if texture.target != texture_target {
                return Err(gl43::INVALID_OPERATION);
            }
            if texture_target == gl43::TEXTURE_2D_MULTISAMPLE && level != 0 {
                return Err(gl43::INVALID_VALUE);
            }
            Some(GlAttachment {
                texture: texture_id,
                level,
            })
        };

        let framebuffer = self
            .state
            .framebuffers
            .get_mut(&framebuffer_id.0)
            .ok_or(gl43::INVALID_OPERATION)?;

        match attachment {
            gl43::DEPTH_ATTACHMENT | gl43::STENCIL_ATTACHMENT | gl43::DEPTH_STENCIL_ATTACHMENT => {
                framebuffer.depth_stencil_attachment = new_attachment;
            }
            _ => {
                let index = attachment.wrapping_sub(gl43::COLOR_ATTACHMENT0);
                if index as usize >= MAX_DRAW_BUFFERS {
                    return Err(gl43::INVALID_ENUM);
                }
                match new_attachment {
                    Some(new_attachment) => {
                        framebuffer.color_attachments.insert(index, new_attachment);
                    }
                    None => {
                        framebuffer.color_attachments.remove(&index);
                    }
                }
            }
        }

        Ok(())
    }

    fn is_valid_buffer_selector(
        framebuffer_id: FramebufferId,
        buffer: GLenum,
    ) -> bool {
        if buffer == gl43::NONE {
            return true;
        }

        if framebuffer_id == NONE_FRAMEBUFFER {
            buffer == gl43::BACK_LEFT
        } else {
            (buffer.wrapping_sub(gl43::COLOR_ATTACHMENT0) as usize) < MAX_DRAW_BUFFERS
        }
    }

    pub fn gl_draw_buffers(
        &mut self,
        buffers: &[GLenum],
    ) -> EmberResult<()> {
        let framebuffer_id = self.state.draw_framebuffer;
        if buffers.len() > MAX_DRAW_BUFFERS
            || !buffers
                .iter()
                .all(|&buffer| Self::is_valid_buffer_selector(framebuffer_id, buffer))
        {
            self.record_error(gl43::INVALID_OPERATION);
        } else if framebuffer_id == NONE_FRAMEBUFFER {
            if buffers.len() != 1 {
                self.record_error(gl43::INVALID_OPERATION);
            } else {
                self.state.default_draw_buffer = buffers[0];
            }
        } else if let Some(framebuffer) = self.state.framebuffers.get_mut(&framebuffer_id.0) {
            framebuffer.draw_buffers = buffers.to_vec();
        }

        self.check_for_error()
    }

    pub fn gl_read_buffer(
        &mut self,
        buffer: GLenum,
    ) -> EmberResult<()> {
        let framebuffer_id = self.state.read_framebuffer;
        if !Self::is_valid_buffer_selector(framebuffer_id, buffer) {
            self.record_error(gl43::INVALID_OPERATION);
        } else if framebuffer_id == NONE_FRAMEBUFFER {
            self.state.default_read_buffer = buffer;
        } else if let Some(framebuffer) = self.state.framebuffers.get_mut(&framebuffer_id.0) {
            framebuffer.read_buffer = buffer;
        }

        self.check_for_error()
    }

    pub fn gl_check_framebuffer_status(
        &mut self,
        target: GLenum,
    ) -> EmberResult<GLenum> {
        let status = match self.bound_framebuffer_id(target) {
            Some(framebuffer_id) => self.framebuffer_status(framebuffer_id),
            None => {
                self.record_error(gl43::INVALID_ENUM);
                0
            }
        };

        self.check_for_error()?;
        Ok(status)
    }

    //
    // Vertex attributes
    //

    pub fn gl_enable_vertex_attrib_array(
        &mut self,
        index: u32,
    ) -> EmberResult<()> {
        match self.state.vertex_attribs.get_mut(index as usize) {
            Some(attrib) => attrib.enabled = true,
            None => self.record_error(gl43::INVALID_VALUE),
        }

        self.check_for_error()
    }

    pub fn gl_disable_vertex_attrib_array(
        &mut self,
        index: u32,
    ) -> EmberResult<()> {
        match self.state.vertex_attribs.get_mut(index as usize) {
            Some(attrib) => attrib.enabled = false,
            None => self.record_error(gl43::INVALID_VALUE),
        }

        self.check_for_error()
    }

    /// Reads from the buffer bound to ARRAY_BUFFER at the time of the call
    pub fn gl_vertex_attrib_pointer(
        &mut self,
        index: u32,
        size: i32,
        attrib_type: GLenum,
        normalized: bool,
        stride: i32,
        offset: u64,
    ) -> EmberResult<()> {
        let array_buffer = self.state.array_buffer;
        if index as usize >= MAX_VERTEX_ATTRIBS || stride < 0 {
            self.record_error(gl43::INVALID_VALUE);
        } else if !matches!(size, 1..=4) && size as GLenum != gl43::BGRA {
            self.record_error(gl43::INVALID_VALUE);
        } else if attrib_type != gl43::FLOAT && attrib_type != gl43::UNSIGNED_BYTE {
            self.record_error(gl43::INVALID_ENUM);
        } else if size as GLenum == gl43::BGRA
            && (attrib_type != gl43::UNSIGNED_BYTE || !normalized)
        {
            self.record_error(gl43::INVALID_OPERATION);
        } else if array_buffer == NONE_BUFFER {
            self.record_error(gl43::INVALID_OPERATION);
        } else {
            let attrib = &mut self.state.vertex_attribs[index as usize];
            attrib.buffer = array_buffer;
            attrib.size = size;
            attrib.attrib_type = attrib_type;
            attrib.normalized = normalized;
            attrib.stride = stride;
            attrib.offset = offset;
        }

        self.check_for_error()
    }

    pub fn gl_vertex_attrib_divisor(
        &mut self,
        index: u32,
        divisor: u32,
    ) -> EmberResult<()> {
        match self.state.vertex_attribs.get_mut(index as usize) {
            Some(attrib) => attrib.divisor = divisor,
            None => self.record_error(gl43::INVALID_VALUE),
        }

        self.check_for_error()
    }

    //
    // Queries
    //

    pub fn gl_create_query(&mut self) -> EmberResult<QueryId> {
        let name = self.state.allocate_name();
        self.state.queries.insert(name, GlQueryObject::default());
        self.check_for_error()?;
        Ok(QueryId(name))
    }

    pub fn gl_destroy_query(
        &mut self,
        query_id: QueryId,
    ) -> EmberResult<()> {
        self.state.queries.remove(&query_id.0);
        self.check_for_error()
    }

    /// Records the GPU time in nanoseconds once all previous commands have completed
    pub fn gl_query_counter(
        &mut self,
        query_id: QueryId,
        target: GLenum,
    ) -> EmberResult<()> {
        let now = self.created_at.elapsed().as_nanos() as u64;
        if target != gl43::TIMESTAMP {
            self.record_error(gl43::INVALID_ENUM);
        } else {
            match self.state.queries.get_mut(&query_id.0) {
                Some(query) => query.timestamp_ns = Some(now),
                None => self.record_error(gl43::INVALID_OPERATION),
            }
        }

        self.check_for_error()
    }

    pub fn gl_get_query_object_u64(
        &mut self,
        query_id: QueryId,
        pname: GLenum,
    ) -> EmberResult<u64> {
        let value = match self.state.queries.get(&query_id.0) {
            Some(query) => match pname {
                gl43::QUERY_RESULT => query.timestamp_ns.unwrap_or(0),
                gl43::QUERY_RESULT_AVAILABLE => query.timestamp_ns.is_some() as u64,
                _ => {
                    self.record_error(gl43::INVALID_ENUM);
                    0
                }
            },
            None => {
                self.record_error(gl43::INVALID_OPERATION);
                0
            }
        };

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
        if source != gl43::DEBUG_SOURCE_APPLICATION {
            self.record_error(gl43::INVALID_ENUM);
        } else if self.state.debug_groups.len() >= MAX_DEBUG_GROUP_STACK_DEPTH {
            self.record_error(gl43::STACK_OVERFLOW);
        } else {
            if self.state.is_enabled(gl43::DEBUG_OUTPUT) {
                log::debug!("[GL] push debug group {} ({})", message, id);
            }
            self.state.debug_groups.push(message.to_string());
        }

        self.check_for_error()
    }

    pub fn gl_pop_debug_group(&mut self) -> EmberResult<()> {
        match self.state.debug_groups.pop() {
            Some(message) => {
                if self.state.is_enabled(gl43::DEBUG_OUTPUT) {
                    log::debug!("[GL] pop debug group {}", message);
                }
            }
            None => self.record_error(gl43::STACK_UNDERFLOW),
        }

        self.check_for_error()
    }

    pub fn gl_debug_message_insert(
        &mut self,
        source: GLenum,
        message_type: GLenum,
        id: u32,
        severity: GLenum,
        message: &str,
    ) -> EmberResult<()> {
        if source != gl43::DEBUG_SOURCE_APPLICATION {
            self.record_error(gl43::INVALID_ENUM);
        } else if self.state.is_enabled(gl43::DEBUG_OUTPUT) {
            log::debug!(
                "[GL] marker {} (type 0x{:04X}, id {}, severity 0x{:04X})",
                message,
                message_type,
                id,
                severity
            );
        }

        self.check_for_error()
    }

    pub fn debug_group_depth(&self) -> usize {
        self.state.debug_groups.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const VERTEX: &str = "in vec2 in_pos; in vec4 in_color; void main() { gl_Position = vec4(in_pos, 0.0, 1.0); }";
    const FRAGMENT: &str = "uniform sampler2D tex; uniform Tint { vec4 tint; }; out vec4 color; void main() { color = tint; }";

    #[test]
    fn test_errors_are_sticky_until_read() {
        let mut context = GlContext::new();
        context.record_error(gl43::INVALID_VALUE);
        context.record_error(gl43::INVALID_ENUM);
        assert_eq!(context.gl_get_error(), gl43::INVALID_VALUE);
        assert_eq!(context.gl_get_error(), gl43::NO_ERROR);

        match context.gl_enable(0x1234) {
            Err(EmberError::GlError(code)) => assert_eq!(code, gl43::INVALID_ENUM),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_buffer_upload() {
        let mut context = GlContext::new();
        let buffer = context.gl_create_buffer().unwrap();
        assert!(context
            .gl_buffer_data(gl43::ARRAY_BUFFER, 4, None, gl43::STATIC_DRAW)
            .is_err());

        context.gl_bind_buffer(gl43::ARRAY_BUFFER, buffer).unwrap();
        context
            .gl_buffer_data(gl43::ARRAY_BUFFER, 4, None, gl43::STATIC_DRAW)
            .unwrap();
        context
            .gl_buffer_sub_data(gl43::ARRAY_BUFFER, 2, &[7, 8])
            .unwrap();
        assert_eq!(
            context
                .gl_get_buffer_sub_data(gl43::ARRAY_BUFFER, 0, 4)
                .unwrap(),
            vec![0, 0, 7, 8]
        );
        assert!(context
            .gl_buffer_sub_data(gl43::ARRAY_BUFFER, 3, &[1, 2])
            .is_err());
    }

    #[test]
    fn test_texture_storage_is_immutable() {
        let mut context = GlContext::new();
        let texture = context.gl_create_texture().unwrap();
        context.gl_bind_texture(gl43::TEXTURE_2D, texture).unwrap();
        context
            .gl_tex_storage_2d(gl43::TEXTURE_2D, 2, gl43::RGBA8, 4, 4)
            .unwrap();
        assert!(context
            .gl_tex_storage_2d(gl43::TEXTURE_2D, 1, gl43::RGBA8, 4, 4)
            .is_err());
        assert!(context
            .gl_bind_texture(gl43::TEXTURE_2D_MULTISAMPLE, texture)
            .is_err());

        let level_1 = vec![9u8; 2 * 2 * 4];
        context
            .gl_tex_sub_image_2d(
                gl43::TEXTURE_2D,
                1,
                0,
                0,
                2,
                2,
                gl43::RGBA,
                gl43::UNSIGNED_BYTE,
                &level_1,
            )
            .unwrap();
        assert_eq!(
            context
                .gl_get_tex_image(gl43::TEXTURE_2D, 1, gl43::RGBA, gl43::UNSIGNED_BYTE)
                .unwrap(),
            level_1
        );
        assert!(context
            .gl_get_tex_image(gl43::TEXTURE_2D, 0, gl43::RGBA, gl43::FLOAT)
            .is_err());
    }

    #[test]
    fn test_link_reflects_declarations() {
        let mut context = GlContext::new();
        let vertex = context
            .compile_shader(gl43::VERTEX_SHADER, VERTEX)
            .unwrap();
        let fragment = context
            .compile_shader(gl43::FRAGMENT_SHADER, FRAGMENT)
            .unwrap();
        let program = context
            .link_shader_program(vertex, fragment, &[(0, "in_pos"), (1, "in_color")])
            .unwrap();

        assert_eq!(
            context
                .gl_get_uniform_location(program, "tex")
                .unwrap(),
            Some(LocationId(0))
        );
        assert_eq!(
            context
                .gl_get_uniform_location(program, "missing")
                .unwrap(),
            None
        );
        assert_eq!(
            context
                .gl_get_uniform_block_index(program, "Tint")
                .unwrap(),
            0
        );
        assert_eq!(
            context
                .gl_get_uniform_block_index(program, "Missing")
                .unwrap(),
            gl43::INVALID_INDEX
        );

        // Uniform values apply to the current program
        assert!(context.gl_uniform_1i(LocationId(0), 3).is_err());
        context.gl_use_program(program).unwrap();
        context.gl_uniform_1i(LocationId(0), 3).unwrap();
        assert!(context
            .gl_uniform_1i(LocationId(0), MAX_TEXTURE_UNITS as i32)
            .is_err());
    }

    #[test]
    fn test_compile_failure_is_reported() {
        let mut context = GlContext::new();
        assert!(context
            .compile_shader(gl43::VERTEX_SHADER, "void not_main() {}")
            .is_err());
    }

    #[test]
    fn test_debug_group_stack() {
        let mut context = GlContext::new();
        context
            .gl_push_debug_group(gl43::DEBUG_SOURCE_APPLICATION, 0, "frame")
            .unwrap();
        assert_eq!(context.debug_group_depth(), 1);
        context.gl_pop_debug_group().unwrap();
        match context.gl_pop_debug_group() {
            Err(EmberError::GlError(code)) => assert_eq!(code, gl43::STACK_UNDERFLOW),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_timestamps_are_monotonic() {
        let mut context = GlContext::new();
        let first = context.gl_create_query().unwrap();
        let second = context.gl_create_query().unwrap();
        assert_eq!(
            context
                .gl_get_query_object_u64(first, gl43::QUERY_RESULT_AVAILABLE)
                .unwrap(),
            0
        );
        context.gl_query_counter(first, gl43::TIMESTAMP).unwrap();
        context.gl_query_counter(second, gl43::TIMESTAMP).unwrap();
        let begin = context
            .gl_get_query_object_u64(first, gl43::QUERY_RESULT)
            .unwrap();
        let end = context
            .gl_get_query_object_u64(second, gl43::QUERY_RESULT)
            .unwrap();
        assert!(end >= begin);
    }
}
