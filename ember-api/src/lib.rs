//! Backend-agnostic command recording and execution.
//!
//! Record rendering work once with an `EmberCommandList`, then submit it through an
//! `EmberDeviceContext`. The backend selected when creating the `EmberApi` replays the recorded
//! commands against its native API:
//!
//! * `gl` (feature `ember-gl`): implicit, context-owned state. Bindings are resolved by name
//!   against the linked program.
//! * `dx12` (feature `ember-dx12`): explicit per-subresource states changed through barriers,
//!   descriptor tables and asynchronous queue execution observed through fences.
//!
//! Commands hold weak references. A resource dropped before its command is replayed causes that
//! command to be logged and skipped.

#[cfg(not(any(feature = "ember-gl", feature = "ember-dx12", test)))]
compile_error!("ember-api requires at least one backend feature: ember-gl, ember-dx12");

pub use api::*;
pub use buffer::*;
pub use command::*;
pub use command_executor::*;
pub use command_list::*;
pub use command_recorder::*;
pub use device_context::*;
pub use error::*;
pub use fence::*;
pub use framebuffer::*;
pub use pipeline::*;
pub use render_target::*;
pub use resource_set::*;
pub use sampler::*;
pub use shader_module::*;
pub use swapchain::*;
pub use texture::*;
pub use timing_query::*;
pub use types::*;

mod backends;
#[cfg(any(feature = "ember-dx12", test))]
pub use backends::dx12;
#[cfg(any(feature = "ember-gl", test))]
pub use backends::gl;

pub(crate) mod internal_shared;

mod api;
mod buffer;
mod command;
mod command_executor;
mod command_list;
mod command_recorder;
mod device_context;
mod error;
mod fence;
mod framebuffer;
mod pipeline;
mod render_target;
mod resource_set;
mod sampler;
mod shader_module;
mod swapchain;
mod texture;
mod timing_query;
mod types;


/// Bindings of one descriptor set occupy this many linear slots
pub const SLOTS_PER_SET: u32 = 64;
