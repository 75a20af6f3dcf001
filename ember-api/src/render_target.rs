use crate::*;
use std::sync::{Arc, Weak};

/// Which kind of target an `EmberRenderTarget` holds
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EmberRenderTargetType {
    None,
    Swapchain,
    Framebuffer,
}

/// The color/depth destination of draws: a presentable swapchain or an offscreen framebuffer.
///
/// The default value is `None`. It can be recorded but binding it is skipped at replay, and its
/// queries return an error.
#[derive(Clone, Debug)]
pub enum EmberRenderTarget {
    None,
    Swapchain(Arc<EmberSwapchain>),
    Framebuffer(Arc<EmberFramebuffer>),
}

impl Default for EmberRenderTarget {
    fn default() -> Self {
        EmberRenderTarget::None
    }
}

// Equal when both refer to the same target object
impl PartialEq for EmberRenderTarget {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        match (self, other) {
            (EmberRenderTarget::None, EmberRenderTarget::None) => true,
            (EmberRenderTarget::Swapchain(a), EmberRenderTarget::Swapchain(b)) => {
                Arc::ptr_eq(a, b)
            }
            (EmberRenderTarget::Framebuffer(a), EmberRenderTarget::Framebuffer(b)) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}

impl Eq for EmberRenderTarget {}

impl From<Arc<EmberSwapchain>> for EmberRenderTarget {
    fn from(swapchain: Arc<EmberSwapchain>) -> Self {
        EmberRenderTarget::Swapchain(swapchain)
    }
}

impl From<Arc<EmberFramebuffer>> for EmberRenderTarget {
    fn from(framebuffer: Arc<EmberFramebuffer>) -> Self {
        EmberRenderTarget::Framebuffer(framebuffer)
    }
}

impl EmberRenderTarget {
    pub fn target_type(&self) -> EmberRenderTargetType {
        match self {
            EmberRenderTarget::None => EmberRenderTargetType::None,
            EmberRenderTarget::Swapchain(_) => EmberRenderTargetType::Swapchain,
            EmberRenderTarget::Framebuffer(_) => EmberRenderTargetType::Framebuffer,
        }
    }

    fn none_error() -> EmberError {
        "The render target is None".into()
    }

    pub fn extents(&self) -> EmberResult<EmberExtents2D> {
        match self {
            EmberRenderTarget::None => Err(Self::none_error()),
            EmberRenderTarget::Swapchain(swapchain) => Ok(swapchain.extents()),
            EmberRenderTarget::Framebuffer(framebuffer) => Ok(framebuffer.extents()),
        }
    }

    pub fn color_attachment_count(&self) -> EmberResult<u32> {
        match self {
            EmberRenderTarget::None => Err(Self::none_error()),
            EmberRenderTarget::Swapchain(_) => Ok(1),
            EmberRenderTarget::Framebuffer(framebuffer) => {
                Ok(framebuffer.framebuffer_def().color_attachments.len() as u32)
            }
        }
    }

    pub fn has_depth_attachment(&self) -> EmberResult<bool> {
        match self {
            EmberRenderTarget::None => Err(Self::none_error()),
            EmberRenderTarget::Swapchain(swapchain) => {
                Ok(swapchain.swapchain_def().depth_stencil_format.is_some())
            }
            EmberRenderTarget::Framebuffer(framebuffer) => {
                Ok(framebuffer.framebuffer_def().depth_stencil_format.is_some())
            }
        }
    }

    pub fn sample_count(&self) -> EmberResult<EmberSampleCount> {
        match self {
            EmberRenderTarget::None => Err(Self::none_error()),
            EmberRenderTarget::Swapchain(swapchain) => Ok(swapchain.sample_count()),
            EmberRenderTarget::Framebuffer(framebuffer) => {
                Ok(framebuffer.framebuffer_def().sample_count)
            }
        }
    }

    pub fn color_format(
        &self,
        attachment_index: u32,
    ) -> EmberResult<EmberFormat> {
        match self {
            EmberRenderTarget::None => Err(Self::none_error()),
            EmberRenderTarget::Swapchain(swapchain) if attachment_index == 0 => {
                Ok(swapchain.format())
            }
            EmberRenderTarget::Swapchain(_) => {
                Err(format!("Swapchains have no color attachment {}", attachment_index))?
            }
            EmberRenderTarget::Framebuffer(framebuffer) => framebuffer
                .framebuffer_def()
                .color_attachments
                .get(attachment_index as usize)
                .map(|attachment| attachment.format)
                .ok_or_else(|| {
                    format!("Framebuffer has no color attachment {}", attachment_index).into()
                }),
        }
    }

    pub(crate) fn downgrade(&self) -> EmberRenderTargetRef {
        match self {
            EmberRenderTarget::None => EmberRenderTargetRef::None,
            EmberRenderTarget::Swapchain(swapchain) => {
                EmberRenderTargetRef::Swapchain(Arc::downgrade(swapchain))
            }
            EmberRenderTarget::Framebuffer(framebuffer) => {
                EmberRenderTargetRef::Framebuffer(Arc::downgrade(framebuffer))
            }
        }
    }
}

/// Non-owning form of `EmberRenderTarget` stored in recorded commands
#[derive(Clone, Debug)]
pub enum EmberRenderTargetRef {
    None,
    Swapchain(Weak<EmberSwapchain>),
    Framebuffer(Weak<EmberFramebuffer>),
}

impl EmberRenderTargetRef {
    /// Returns `None` if the referenced target was dropped
    pub fn upgrade(&self) -> Option<EmberRenderTarget> {
        match self {
            EmberRenderTargetRef::None => Some(EmberRenderTarget::None),
            EmberRenderTargetRef::Swapchain(swapchain) => {
                swapchain.upgrade().map(EmberRenderTarget::Swapchain)
            }
            EmberRenderTargetRef::Framebuffer(framebuffer) => {
                framebuffer.upgrade().map(EmberRenderTarget::Framebuffer)
            }
        }
    }
}
