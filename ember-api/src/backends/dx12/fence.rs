use crate::dx12::d3d12;
use crate::dx12::EmberDeviceContextDx12;
use crate::{EmberFenceStatus, EmberResult};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// A native fence signaled by the queue once the submission it was passed to has executed
#[derive(Debug)]
pub struct EmberFenceDx12 {
    device_context: EmberDeviceContextDx12,
    fence: d3d12::Dx12Fence,
    // The value the queue was last asked to signal
    fence_value: AtomicU64,
    // Set to true when a submission is scheduled to signal this fence
    submitted: AtomicBool,
}

impl EmberFenceDx12 {
    pub fn new(device_context: &EmberDeviceContextDx12) -> EmberResult<EmberFenceDx12> {
        let fence = device_context.dx12_device().create_fence(0)?;

        Ok(EmberFenceDx12 {
            device_context: device_context.clone(),
            fence,
            fence_value: AtomicU64::new(0),
            submitted: AtomicBool::new(false),
        })
    }

    pub fn dx12_fence(&self) -> &d3d12::Dx12Fence {
        &self.fence
    }

    pub(crate) fn submitted(&self) -> bool {
        self.submitted.load(Ordering::Relaxed)
    }

    pub(crate) fn set_submitted(
        &self,
        available: bool,
    ) {
        self.submitted.store(available, Ordering::Relaxed);
    }

    /// Queue a signal behind everything executed so far. Must be called with the device's
    /// command list locked.
    pub(crate) fn signal_on_queue(
        &self,
        queue: &d3d12::Dx12CommandQueue,
    ) -> EmberResult<()> {
        let value = self.fence_value.fetch_add(1, Ordering::AcqRel) + 1;
        queue.signal(&self.fence, value)?;
        self.set_submitted(true);
        Ok(())
    }

    pub fn wait(&self) -> EmberResult<()> {
        if self.submitted() {
            self.device_context
                .wait_for_fence_value(&self.fence, self.fence_value.load(Ordering::Acquire))?;
        }

        self.set_submitted(false);
        Ok(())
    }

    pub fn get_fence_status(&self) -> EmberResult<EmberFenceStatus> {
        if !self.submitted() {
            Ok(EmberFenceStatus::Unsubmitted)
        } else if self.fence.completed_value() >= self.fence_value.load(Ordering::Acquire) {
            self.set_submitted(false);
            Ok(EmberFenceStatus::Complete)
        } else {
            Ok(EmberFenceStatus::Incomplete)
        }
    }
}
