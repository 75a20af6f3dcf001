#[cfg(any(feature = "ember-dx12", test))]
use crate::dx12::EmberSwapchainDx12;
#[cfg(any(feature = "ember-gl", test))]
use crate::gl::EmberSwapchainGl;
use crate::*;
use std::sync::Arc;

/// A set of presentable images attached to a window.
///
/// Swapchains with a sample count above 1 render into an internal multisampled framebuffer that
/// is resolved into the back buffer when the swapchain stops being the bound render target.
#[derive(Debug)]
pub enum EmberSwapchain {
    #[cfg(any(feature = "ember-gl", test))]
    Gl(EmberSwapchainGl),
    #[cfg(any(feature = "ember-dx12", test))]
    Dx12(EmberSwapchainDx12),
}

impl EmberSwapchain {
    /// The current definition, including the size set by the latest `resize`
    pub fn swapchain_def(&self) -> EmberSwapchainDef {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberSwapchain::Gl(inner) => inner.swapchain_def(),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberSwapchain::Dx12(inner) => inner.swapchain_def(),
        }
    }

    pub fn extents(&self) -> EmberExtents2D {
        let swapchain_def = self.swapchain_def();
        EmberExtents2D {
            width: swapchain_def.width,
            height: swapchain_def.height,
        }
    }

    pub fn format(&self) -> EmberFormat {
        self.swapchain_def().format
    }

    pub fn sample_count(&self) -> EmberSampleCount {
        self.swapchain_def().sample_count
    }

    pub fn image_count(&self) -> u32 {
        self.swapchain_def().image_count
    }

    /// The framebuffer draws go to when the swapchain is multisampled
    pub fn multisampled_framebuffer(&self) -> Option<Arc<EmberFramebuffer>> {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberSwapchain::Gl(inner) => inner.multisampled_framebuffer(),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberSwapchain::Dx12(inner) => inner.multisampled_framebuffer(),
        }
    }

    /// Show the current back buffer and move on to the next one. Waits for submitted work.
    pub fn present(&self) -> EmberResult<()> {
        profiling::scope!("present");
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberSwapchain::Gl(inner) => inner.present(),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberSwapchain::Dx12(inner) => inner.present(),
        }
    }

    /// Recreate the back buffers, the depth buffer and the multisampled framebuffer at a new size.
    /// Resizing to the current size does nothing. Waits for submitted work.
    pub fn resize(
        &self,
        width: u32,
        height: u32,
    ) -> EmberResult<()> {
        let swapchain_def = EmberSwapchainDef {
            width,
            height,
            ..self.swapchain_def()
        };
        swapchain_def.verify()?;

        if self.extents() == (EmberExtents2D { width, height }) {
            return Ok(());
        }

        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberSwapchain::Gl(inner) => inner.resize(&swapchain_def),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberSwapchain::Dx12(inner) => inner.resize(&swapchain_def),
        }
    }

    /// Read the current back buffer. Rows are tightly packed, top row first. Waits for submitted
    /// work.
    pub fn read_back_buffer(&self) -> EmberResult<Vec<u8>> {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberSwapchain::Gl(inner) => inner.read_back_buffer(),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberSwapchain::Dx12(inner) => inner.read_back_buffer(),
        }
    }

    #[cfg(any(feature = "ember-gl", test))]
    pub fn gl_swapchain(&self) -> Option<&EmberSwapchainGl> {
        match self {
            EmberSwapchain::Gl(inner) => Some(inner),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberSwapchain::Dx12(_) => None,
        }
    }

    #[cfg(any(feature = "ember-dx12", test))]
    pub fn dx12_swapchain(&self) -> Option<&EmberSwapchainDx12> {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberSwapchain::Gl(_) => None,
            EmberSwapchain::Dx12(inner) => Some(inner),
        }
    }
}
