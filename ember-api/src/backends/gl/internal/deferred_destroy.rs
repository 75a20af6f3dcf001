use super::gl_context::*;

/// A GL object whose owner was dropped. Owners can be dropped while the context is locked by a
/// submission, so the object is queued and destroyed the next time the context is locked.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GlDeferredDestroy {
    Buffer(BufferId),
    Texture(TextureId),
    Sampler(SamplerId),
    Shader(ShaderId),
    Program(ProgramId),
    Framebuffer(FramebufferId),
    Query(QueryId),
    Surface(WindowHash),
}

impl GlDeferredDestroy {
    pub fn destroy(
        self,
        gl_context: &mut GlContext,
    ) {
        let result = match self {
            GlDeferredDestroy::Buffer(id) => gl_context.gl_destroy_buffer(id),
            GlDeferredDestroy::Texture(id) => gl_context.gl_destroy_texture(id),
            GlDeferredDestroy::Sampler(id) => gl_context.gl_destroy_sampler(id),
            GlDeferredDestroy::Shader(id) => gl_context.gl_destroy_shader(id),
            GlDeferredDestroy::Program(id) => gl_context.gl_destroy_program(id),
            GlDeferredDestroy::Framebuffer(id) => gl_context.gl_destroy_framebuffer(id),
            GlDeferredDestroy::Query(id) => gl_context.gl_destroy_query(id),
            GlDeferredDestroy::Surface(window_hash) => {
                gl_context.destroy_surface(window_hash);
                Ok(())
            }
        };

        if let Err(e) = result {
            log::error!("Failed to destroy {:?}: {}", self, e);
        }
    }
}
