//! GL 4.3 core enums, types and function pointers used by the backend. Values match the Khronos
//! registry.
#![allow(dead_code)]

use std::os::raw::{c_char, c_void};

pub type GLenum = u32;
pub type GLbitfield = u32;
pub type GLint = i32;
pub type GLuint = u32;
pub type GLboolean = u8;
pub type GLsizei = i32;
pub type GLchar = c_char;
pub type GLubyte = u8;
pub type GLfloat = f32;
pub type GLintptr = isize;
pub type GLsizeiptr = isize;
pub type GLuint64 = u64;

pub const NONE: GLuint = 0;
pub const FALSE: GLint = 0;
pub const TRUE: GLint = 1;

// Errors
pub const NO_ERROR: GLenum = 0;
pub const INVALID_ENUM: GLenum = 0x0500;
pub const INVALID_VALUE: GLenum = 0x0501;
pub const INVALID_OPERATION: GLenum = 0x0502;
pub const STACK_OVERFLOW: GLenum = 0x0503;
pub const STACK_UNDERFLOW: GLenum = 0x0504;
pub const OUT_OF_MEMORY: GLenum = 0x0505;
pub const INVALID_FRAMEBUFFER_OPERATION: GLenum = 0x0506;

// Strings and limits
pub const VENDOR: GLenum = 0x1F00;
pub const RENDERER: GLenum = 0x1F01;
pub const VERSION: GLenum = 0x1F02;
pub const SHADING_LANGUAGE_VERSION: GLenum = 0x8B8C;
pub const MAX_VERTEX_ATTRIBS: GLenum = 0x8869;
pub const MAX_DRAW_BUFFERS: GLenum = 0x8824;
pub const MAX_COLOR_ATTACHMENTS: GLenum = 0x8CDF;
pub const MAX_COLOR_TEXTURE_SAMPLES: GLenum = 0x910E;
pub const MAX_COMBINED_TEXTURE_IMAGE_UNITS: GLenum = 0x8B4D;
pub const MAX_UNIFORM_BUFFER_BINDINGS: GLenum = 0x8A2F;
pub const UNIFORM_BUFFER_OFFSET_ALIGNMENT: GLenum = 0x8A34;
pub const PACK_ALIGNMENT: GLenum = 0x0D05;
pub const UNPACK_ALIGNMENT: GLenum = 0x0CF5;
pub const MAX_DEBUG_GROUP_STACK_DEPTH: GLenum = 0x826C;
pub const MAX_TEXTURE_SIZE: GLenum = 0x0D33;
pub const VIEWPORT: GLenum = 0x0BA2;
pub const SCISSOR_BOX: GLenum = 0x0C10;

// Capabilities
pub const CULL_FACE: GLenum = 0x0B44;
pub const DEPTH_TEST: GLenum = 0x0B71;
pub const STENCIL_TEST: GLenum = 0x0B90;
pub const BLEND: GLenum = 0x0BE2;
pub const SCISSOR_TEST: GLenum = 0x0C11;
pub const POLYGON_OFFSET_FILL: GLenum = 0x8037;
pub const POLYGON_OFFSET_LINE: GLenum = 0x2A02;
pub const DEPTH_CLAMP: GLenum = 0x864F;
pub const DEBUG_OUTPUT: GLenum = 0x92E0;
pub const FRAMEBUFFER_SRGB: GLenum = 0x8DB9;

// Faces and winding
pub const FRONT: GLenum = 0x0404;
pub const BACK: GLenum = 0x0405;
pub const FRONT_AND_BACK: GLenum = 0x0408;
pub const CW: GLenum = 0x0900;
pub const CCW: GLenum = 0x0901;
pub const POINT: GLenum = 0x1B00;
pub const LINE: GLenum = 0x1B01;
pub const FILL: GLenum = 0x1B02;

// Comparison functions
pub const NEVER: GLenum = 0x0200;
pub const LESS: GLenum = 0x0201;
pub const EQUAL: GLenum = 0x0202;
pub const LEQUAL: GLenum = 0x0203;
pub const GREATER: GLenum = 0x0204;
pub const NOTEQUAL: GLenum = 0x0205;
pub const GEQUAL: GLenum = 0x0206;
pub const ALWAYS: GLenum = 0x0207;

// Stencil operations
pub const ZERO: GLenum = 0;
pub const ONE: GLenum = 1;
pub const KEEP: GLenum = 0x1E00;
pub const REPLACE: GLenum = 0x1E01;
pub const INCR: GLenum = 0x1E02;
pub const DECR: GLenum = 0x1E03;
pub const INVERT: GLenum = 0x150A;
pub const INCR_WRAP: GLenum = 0x8507;
pub const DECR_WRAP: GLenum = 0x8508;

// Blend factors and equations
pub const SRC_COLOR: GLenum = 0x0300;
pub const ONE_MINUS_SRC_COLOR: GLenum = 0x0301;
pub const SRC_ALPHA: GLenum = 0x0302;
pub const ONE_MINUS_SRC_ALPHA: GLenum = 0x0303;
pub const DST_ALPHA: GLenum = 0x0304;
pub const ONE_MINUS_DST_ALPHA: GLenum = 0x0305;
pub const DST_COLOR: GLenum = 0x0306;
pub const ONE_MINUS_DST_COLOR: GLenum = 0x0307;
pub const SRC_ALPHA_SATURATE: GLenum = 0x0308;
pub const CONSTANT_COLOR: GLenum = 0x8001;
pub const ONE_MINUS_CONSTANT_COLOR: GLenum = 0x8002;
pub const FUNC_ADD: GLenum = 0x8006;
pub const MIN: GLenum = 0x8007;
pub const MAX: GLenum = 0x8008;
pub const FUNC_SUBTRACT: GLenum = 0x800A;
pub const FUNC_REVERSE_SUBTRACT: GLenum = 0x800B;

// Primitives
pub const POINTS: GLenum = 0x0000;
pub const LINES: GLenum = 0x0001;
pub const LINE_STRIP: GLenum = 0x0003;
pub const TRIANGLES: GLenum = 0x0004;
pub const TRIANGLE_STRIP: GLenum = 0x0005;

// Data types
pub const BYTE: GLenum = 0x1400;
pub const UNSIGNED_BYTE: GLenum = 0x1401;
pub const UNSIGNED_SHORT: GLenum = 0x1403;
pub const UNSIGNED_INT: GLenum = 0x1405;
pub const FLOAT: GLenum = 0x1406;
pub const UNSIGNED_INT_24_8: GLenum = 0x84FA;
pub const FLOAT_32_UNSIGNED_INT_24_8_REV: GLenum = 0x8DAD;

// Buffers
pub const ARRAY_BUFFER: GLenum = 0x8892;
pub const ELEMENT_ARRAY_BUFFER: GLenum = 0x8893;
pub const UNIFORM_BUFFER: GLenum = 0x8A11;
pub const STATIC_DRAW: GLenum = 0x88E4;
pub const DYNAMIC_DRAW: GLenum = 0x88E8;

// Textures
pub const TEXTURE_2D: GLenum = 0x0DE1;
pub const TEXTURE_2D_MULTISAMPLE: GLenum = 0x9100;
pub const TEXTURE0: GLenum = 0x84C0;
pub const TEXTURE_MAG_FILTER: GLenum = 0x2800;
pub const TEXTURE_MIN_FILTER: GLenum = 0x2801;
pub const TEXTURE_WRAP_S: GLenum = 0x2802;
pub const TEXTURE_WRAP_T: GLenum = 0x2803;
pub const TEXTURE_BORDER_COLOR: GLenum = 0x1004;
pub const TEXTURE_LOD_BIAS: GLenum = 0x8501;
pub const NEAREST: GLenum = 0x2600;
pub const LINEAR: GLenum = 0x2601;
pub const NEAREST_MIPMAP_NEAREST: GLenum = 0x2700;
pub const LINEAR_MIPMAP_NEAREST: GLenum = 0x2701;
pub const NEAREST_MIPMAP_LINEAR: GLenum = 0x2702;
pub const LINEAR_MIPMAP_LINEAR: GLenum = 0x2703;
pub const REPEAT: GLenum = 0x2901;
pub const MIRRORED_REPEAT: GLenum = 0x8370;
pub const CLAMP_TO_EDGE: GLenum = 0x812F;
pub const CLAMP_TO_BORDER: GLenum = 0x812D;
pub const TEXTURE_WIDTH: GLenum = 0x1000;
pub const TEXTURE_HEIGHT: GLenum = 0x1001;

// Pixel formats
pub const RED: GLenum = 0x1903;
pub const RG: GLenum = 0x8227;
pub const RGB: GLenum = 0x1907;
pub const RGBA: GLenum = 0x1908;
pub const BGRA: GLenum = 0x80E1;
pub const RED_INTEGER: GLenum = 0x8D94;
pub const DEPTH_COMPONENT: GLenum = 0x1902;
pub const DEPTH_STENCIL: GLenum = 0x84F9;

// Sized internal formats
pub const R8: GLenum = 0x8229;
pub const RG8: GLenum = 0x822B;
pub const RGBA8: GLenum = 0x8058;
pub const SRGB8_ALPHA8: GLenum = 0x8C43;
pub const BGRA8_EXT: GLenum = 0x93A1;
pub const R16UI: GLenum = 0x8234;
pub const R32UI: GLenum = 0x8236;
pub const R32F: GLenum = 0x822E;
pub const RG32F: GLenum = 0x8230;
pub const RGB32F: GLenum = 0x8815;
pub const RGBA32F: GLenum = 0x8814;
pub const DEPTH_COMPONENT32F: GLenum = 0x8CAC;
pub const DEPTH24_STENCIL8: GLenum = 0x88F0;
pub const DEPTH32F_STENCIL8: GLenum = 0x8CAD;

// Framebuffers
pub const FRAMEBUFFER: GLenum = 0x8D40;
pub const READ_FRAMEBUFFER: GLenum = 0x8CA8;
pub const DRAW_FRAMEBUFFER: GLenum = 0x8CA9;
pub const COLOR_ATTACHMENT0: GLenum = 0x8CE0;
pub const DEPTH_ATTACHMENT: GLenum = 0x8D00;
pub const STENCIL_ATTACHMENT: GLenum = 0x8D20;
pub const DEPTH_STENCIL_ATTACHMENT: GLenum = 0x821A;
pub const FRAMEBUFFER_COMPLETE: GLenum = 0x8CD5;
pub const FRAMEBUFFER_INCOMPLETE_ATTACHMENT: GLenum = 0x8CD6;
pub const FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT: GLenum = 0x8CD7;
pub const FRAMEBUFFER_INCOMPLETE_MULTISAMPLE: GLenum = 0x8D56;
pub const BACK_LEFT: GLenum = 0x0402;
pub const COLOR: GLenum = 0x1800;
pub const DEPTH: GLenum = 0x1801;
pub const STENCIL: GLenum = 0x1802;
pub const COLOR_BUFFER_BIT: GLbitfield = 0x4000;
pub const DEPTH_BUFFER_BIT: GLbitfield = 0x0100;
pub const STENCIL_BUFFER_BIT: GLbitfield = 0x0400;

// Shaders and programs
pub const FRAGMENT_SHADER: GLenum = 0x8B30;
pub const VERTEX_SHADER: GLenum = 0x8B31;
pub const COMPILE_STATUS: GLenum = 0x8B81;
pub const LINK_STATUS: GLenum = 0x8B82;
pub const INFO_LOG_LENGTH: GLenum = 0x8B84;
pub const ACTIVE_UNIFORMS: GLenum = 0x8B86;
pub const ACTIVE_UNIFORM_BLOCKS: GLenum = 0x8A36;
pub const INVALID_INDEX: GLuint = 0xFFFF_FFFF;

// Queries
pub const TIMESTAMP: GLenum = 0x8E28;
pub const QUERY_RESULT: GLenum = 0x8866;
pub const QUERY_RESULT_AVAILABLE: GLenum = 0x8867;

// Debug output
pub const DEBUG_SOURCE_APPLICATION: GLenum = 0x824A;
pub const DEBUG_TYPE_MARKER: GLenum = 0x8268;
pub const DEBUG_SEVERITY_NOTIFICATION: GLenum = 0x826B;

//
// Function pointers, resolved against the current context
//

#[derive(Clone)]
pub struct FnPtr {
    f: *const c_void,
    is_loaded: bool,
}

impl FnPtr {
    fn new(ptr: *const c_void) -> FnPtr {
        if ptr.is_null() {
            FnPtr {
                f: missing_fn_panic as *const c_void,
                is_loaded: false,
            }
        } else {
            FnPtr {
                f: ptr,
                is_loaded: true,
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.is_loaded
    }
}

#[inline(never)]
fn missing_fn_panic() -> ! {
    panic!("gl43 function was not loaded")
}

macro_rules! gl_functions {
    ($($name:ident: $symbol:literal fn($($arg:ident: $ty:ty),*) $(-> $ret:ty)?;)*) => {
        #[allow(non_snake_case)]
        #[derive(Clone)]
        pub struct Gl43 {
            $(pub $name: FnPtr,)*
        }

        impl Gl43 {
            /// Load each symbol with the platform loader. Functions that fail to load panic when
            /// called, so check `missing_functions` first.
            pub fn load_with<F>(mut loadfn: F) -> Gl43
            where
                F: FnMut(&'static str) -> *const c_void,
            {
                Gl43 {
                    $($name: FnPtr::new(loadfn($symbol)),)*
                }
            }

            pub fn missing_functions(&self) -> Vec<&'static str> {
                let mut missing = Vec::new();
                $(
                    if !self.$name.is_loaded() {
                        missing.push($symbol);
                    }
                )*
                missing
            }

            $(
                #[allow(non_snake_case, clippy::too_many_arguments)]
                #[inline]
                pub unsafe fn $name(&self, $($arg: $ty),*) $(-> $ret)? {
                    std::mem::transmute::<_, extern "system" fn($($ty),*) $(-> $ret)?>(self.$name.f)($($arg),*)
                }
            )*
        }
    };
}

gl_functions! {
    GetError: "glGetError" fn() -> GLenum;
    GetIntegerv: "glGetIntegerv" fn(pname: GLenum, data: *mut GLint);
    GetString: "glGetString" fn(name: GLenum) -> *const GLubyte;
    Finish: "glFinish" fn();
    PixelStorei: "glPixelStorei" fn(pname: GLenum, param: GLint);

    Enable: "glEnable" fn(cap: GLenum);
    Disable: "glDisable" fn(cap: GLenum);
    Enablei: "glEnablei" fn(target: GLenum, index: GLuint);
    Disablei: "glDisablei" fn(target: GLenum, index: GLuint);
    IsEnabled: "glIsEnabled" fn(cap: GLenum) -> GLboolean;
    CullFace: "glCullFace" fn(mode: GLenum);
    FrontFace: "glFrontFace" fn(mode: GLenum);
    PolygonMode: "glPolygonMode" fn(face: GLenum, mode: GLenum);
    PolygonOffset: "glPolygonOffset" fn(factor: GLfloat, units: GLfloat);
    DepthFunc: "glDepthFunc" fn(func: GLenum);
    DepthMask: "glDepthMask" fn(flag: GLboolean);
    StencilFuncSeparate: "glStencilFuncSeparate" fn(face: GLenum, func: GLenum, reference: GLint, mask: GLuint);
    StencilOpSeparate: "glStencilOpSeparate" fn(face: GLenum, sfail: GLenum, dpfail: GLenum, dppass: GLenum);
    StencilMaskSeparate: "glStencilMaskSeparate" fn(face: GLenum, mask: GLuint);
    BlendFuncSeparatei: "glBlendFuncSeparatei" fn(buf: GLuint, src_rgb: GLenum, dst_rgb: GLenum, src_alpha: GLenum, dst_alpha: GLenum);
    BlendEquationSeparatei: "glBlendEquationSeparatei" fn(buf: GLuint, mode_rgb: GLenum, mode_alpha: GLenum);
    ColorMaski: "glColorMaski" fn(index: GLuint, r: GLboolean, g: GLboolean, b: GLboolean, a: GLboolean);
    BlendColor: "glBlendColor" fn(red: GLfloat, green: GLfloat, blue: GLfloat, alpha: GLfloat);
    Viewport: "glViewport" fn(x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    DepthRangef: "glDepthRangef" fn(n: GLfloat, f: GLfloat);
    Scissor: "glScissor" fn(x: GLint, y: GLint, width: GLsizei, height: GLsizei);

    GenBuffers: "glGenBuffers" fn(n: GLsizei, buffers: *mut GLuint);
    DeleteBuffers: "glDeleteBuffers" fn(n: GLsizei, buffers: *const GLuint);
    BindBuffer: "glBindBuffer" fn(target: GLenum, buffer: GLuint);
    BindBufferRange: "glBindBufferRange" fn(target: GLenum, index: GLuint, buffer: GLuint, offset: GLintptr, size: GLsizeiptr);
    BufferData: "glBufferData" fn(target: GLenum, size: GLsizeiptr, data: *const c_void, usage: GLenum);
    BufferSubData: "glBufferSubData" fn(target: GLenum, offset: GLintptr, size: GLsizeiptr, data: *const c_void);
    GetBufferSubData: "glGetBufferSubData" fn(target: GLenum, offset: GLintptr, size: GLsizeiptr, data: *mut c_void);

    GenTextures: "glGenTextures" fn(n: GLsizei, textures: *mut GLuint);
    DeleteTextures: "glDeleteTextures" fn(n: GLsizei, textures: *const GLuint);
    ActiveTexture: "glActiveTexture" fn(texture: GLenum);
    BindTexture: "glBindTexture" fn(target: GLenum, texture: GLuint);
    TexStorage2D: "glTexStorage2D" fn(target: GLenum, levels: GLsizei, internal_format: GLenum, width: GLsizei, height: GLsizei);
    TexStorage2DMultisample: "glTexStorage2DMultisample" fn(target: GLenum, samples: GLsizei, internal_format: GLenum, width: GLsizei, height: GLsizei, fixed_sample_locations: GLboolean);
    TexSubImage2D: "glTexSubImage2D" fn(target: GLenum, level: GLint, xoffset: GLint, yoffset: GLint, width: GLsizei, height: GLsizei, format: GLenum, pixel_type: GLenum, pixels: *const c_void);
    GetTexImage: "glGetTexImage" fn(target: GLenum, level: GLint, format: GLenum, pixel_type: GLenum, pixels: *mut c_void);
    GetTexLevelParameteriv: "glGetTexLevelParameteriv" fn(target: GLenum, level: GLint, pname: GLenum, params: *mut GLint);

    GenSamplers: "glGenSamplers" fn(count: GLsizei, samplers: *mut GLuint);
    DeleteSamplers: "glDeleteSamplers" fn(count: GLsizei, samplers: *const GLuint);
    SamplerParameteri: "glSamplerParameteri" fn(sampler: GLuint, pname: GLenum, param: GLint);
    SamplerParameterf: "glSamplerParameterf" fn(sampler: GLuint, pname: GLenum, param: GLfloat);
    SamplerParameterfv: "glSamplerParameterfv" fn(sampler: GLuint, pname: GLenum, params: *const GLfloat);
    BindSampler: "glBindSampler" fn(unit: GLuint, sampler: GLuint);

    CreateShader: "glCreateShader" fn(shader_type: GLenum) -> GLuint;
    DeleteShader: "glDeleteShader" fn(shader: GLuint);
    ShaderSource: "glShaderSource" fn(shader: GLuint, count: GLsizei, string: *const *const GLchar, length: *const GLint);
    CompileShader: "glCompileShader" fn(shader: GLuint);
    GetShaderiv: "glGetShaderiv" fn(shader: GLuint, pname: GLenum, params: *mut GLint);
    GetShaderInfoLog: "glGetShaderInfoLog" fn(shader: GLuint, buf_size: GLsizei, length: *mut GLsizei, info_log: *mut GLchar);
    CreateProgram: "glCreateProgram" fn() -> GLuint;
    DeleteProgram: "glDeleteProgram" fn(program: GLuint);
    AttachShader: "glAttachShader" fn(program: GLuint, shader: GLuint);
    BindAttribLocation: "glBindAttribLocation" fn(program: GLuint, index: GLuint, name: *const GLchar);
    LinkProgram: "glLinkProgram" fn(program: GLuint);
    GetProgramiv: "glGetProgramiv" fn(program: GLuint, pname: GLenum, params: *mut GLint);
    GetProgramInfoLog: "glGetProgramInfoLog" fn(program: GLuint, buf_size: GLsizei, length: *mut GLsizei, info_log: *mut GLchar);
    UseProgram: "glUseProgram" fn(program: GLuint);
    GetUniformLocation: "glGetUniformLocation" fn(program: GLuint, name: *const GLchar) -> GLint;
    Uniform1i: "glUniform1i" fn(location: GLint, v0: GLint);
    GetUniformBlockIndex: "glGetUniformBlockIndex" fn(program: GLuint, name: *const GLchar) -> GLuint;
    UniformBlockBinding: "glUniformBlockBinding" fn(program: GLuint, block_index: GLuint, binding: GLuint);

    GenFramebuffers: "glGenFramebuffers" fn(n: GLsizei, framebuffers: *mut GLuint);
    DeleteFramebuffers: "glDeleteFramebuffers" fn(n: GLsizei, framebuffers: *const GLuint);
    BindFramebuffer: "glBindFramebuffer" fn(target: GLenum, framebuffer: GLuint);
    FramebufferTexture2D: "glFramebufferTexture2D" fn(target: GLenum, attachment: GLenum, texture_target: GLenum, texture: GLuint, level: GLint);
    DrawBuffers: "glDrawBuffers" fn(n: GLsizei, bufs: *const GLenum);
    ReadBuffer: "glReadBuffer" fn(src: GLenum);
    CheckFramebufferStatus: "glCheckFramebufferStatus" fn(target: GLenum) -> GLenum;

    GenVertexArrays: "glGenVertexArrays" fn(n: GLsizei, arrays: *mut GLuint);
    DeleteVertexArrays: "glDeleteVertexArrays" fn(n: GLsizei, arrays: *const GLuint);
    BindVertexArray: "glBindVertexArray" fn(array: GLuint);
    EnableVertexAttribArray: "glEnableVertexAttribArray" fn(index: GLuint);
    DisableVertexAttribArray: "glDisableVertexAttribArray" fn(index: GLuint);
    VertexAttribPointer: "glVertexAttribPointer" fn(index: GLuint, size: GLint, attrib_type: GLenum, normalized: GLboolean, stride: GLsizei, pointer: *const c_void);
    VertexAttribDivisor: "glVertexAttribDivisor" fn(index: GLuint, divisor: GLuint);

    GenQueries: "glGenQueries" fn(n: GLsizei, ids: *mut GLuint);
    DeleteQueries: "glDeleteQueries" fn(n: GLsizei, ids: *const GLuint);
    QueryCounter: "glQueryCounter" fn(id: GLuint, target: GLenum);
    GetQueryObjectui64v: "glGetQueryObjectui64v" fn(id: GLuint, pname: GLenum, params: *mut GLuint64);

    PushDebugGroup: "glPushDebugGroup" fn(source: GLenum, id: GLuint, length: GLsizei, message: *const GLchar);
    PopDebugGroup: "glPopDebugGroup" fn();
    DebugMessageInsert: "glDebugMessageInsert" fn(source: GLenum, message_type: GLenum, id: GLuint, severity: GLenum, length: GLsizei, buf: *const GLchar);

    DrawArraysInstancedBaseInstance: "glDrawArraysInstancedBaseInstance" fn(mode: GLenum, first: GLint, count: GLsizei, instance_count: GLsizei, base_instance: GLuint);
    DrawElementsInstancedBaseVertexBaseInstance: "glDrawElementsInstancedBaseVertexBaseInstance" fn(mode: GLenum, count: GLsizei, index_type: GLenum, indices: *const c_void, instance_count: GLsizei, base_vertex: GLint, base_instance: GLuint);
    ClearBufferfv: "glClearBufferfv" fn(buffer: GLenum, draw_buffer: GLint, value: *const GLfloat);
    ClearBufferiv: "glClearBufferiv" fn(buffer: GLenum, draw_buffer: GLint, value: *const GLint);
    ClearBufferfi: "glClearBufferfi" fn(buffer: GLenum, draw_buffer: GLint, depth: GLfloat, stencil: GLint);
    BlitFramebuffer: "glBlitFramebuffer" fn(src_x0: GLint, src_y0: GLint, src_x1: GLint, src_y1: GLint, dst_x0: GLint, dst_y0: GLint, dst_x1: GLint, dst_y1: GLint, mask: GLbitfield, filter: GLenum);
    ReadPixels: "glReadPixels" fn(x: GLint, y: GLint, width: GLsizei, height: GLsizei, format: GLenum, pixel_type: GLenum, pixels: *mut c_void);
}
