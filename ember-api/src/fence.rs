#[cfg(any(feature = "ember-dx12", test))]
use crate::dx12::EmberFenceDx12;
#[cfg(any(feature = "ember-gl", test))]
use crate::gl::EmberFenceGl;
use crate::{EmberFenceStatus, EmberResult};

/// A GPU -> CPU synchronization mechanism.
///
/// A fence can be in the following states:
///  * Unsubmitted - Initial state when created
///  * Incomplete - Once a command list is submitted, the fence is marked as incomplete
///  * Complete - The GPU can mark a fence as complete to signal completion of work.
///
/// The status of the fence returns to Unsubmitted when get_fence_status() is called while in a
/// completed state. In other words, the Complete status can only be returned one time unless the
/// fence is submitted again.
///
/// Fences must not be dropped if they are in use by the GPU.
#[derive(Debug)]
pub enum EmberFence {
    #[cfg(any(feature = "ember-gl", test))]
    Gl(EmberFenceGl),
    #[cfg(any(feature = "ember-dx12", test))]
    Dx12(EmberFenceDx12),
}

impl EmberFence {
    /// Get the status of the fence. See `EmberFenceStatus`
    pub fn get_fence_status(&self) -> EmberResult<EmberFenceStatus> {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberFence::Gl(inner) => inner.get_fence_status(),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberFence::Dx12(inner) => inner.get_fence_status(),
        }
    }

    /// Wait for the fence to be signaled as complete by the GPU. Waiting longer than the
    /// device's fence timeout fails with `EmberError::SubmissionTimeout`.
    pub fn wait(&self) -> EmberResult<()> {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberFence::Gl(inner) => inner.wait(),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberFence::Dx12(inner) => inner.wait(),
        }
    }

    /// Wait for all the given fences. Unsubmitted fences are ignored.
    pub fn wait_for_fences(fences: &[&EmberFence]) -> EmberResult<()> {
        for fence in fences {
            if fence.get_fence_status()? == EmberFenceStatus::Incomplete {
                fence.wait()?;
            }
        }

        Ok(())
    }

    #[cfg(any(feature = "ember-gl", test))]
    pub fn gl_fence(&self) -> Option<&EmberFenceGl> {
        match self {
            EmberFence::Gl(inner) => Some(inner),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberFence::Dx12(_) => None,
        }
    }

    #[cfg(any(feature = "ember-dx12", test))]
    pub fn dx12_fence(&self) -> Option<&EmberFenceDx12> {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberFence::Gl(_) => None,
            EmberFence::Dx12(inner) => Some(inner),
        }
    }
}
