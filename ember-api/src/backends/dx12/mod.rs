pub mod d3d12;

mod api;
pub use api::*;

mod device_context;
pub use device_context::*;

mod swapchain;
pub use swapchain::*;

mod framebuffer;
pub use framebuffer::*;

mod shader_module;
pub use shader_module::*;

mod fence;
pub use fence::*;

mod texture;
pub use texture::*;

mod buffer;
pub use buffer::*;

mod pipeline;
pub use pipeline::*;

mod sampler;
pub use sampler::*;

mod resource_set;
pub use resource_set::*;

mod timing_query;
pub use timing_query::*;

mod command_executor;
pub use command_executor::*;

mod internal;
pub(crate) use internal::*;
