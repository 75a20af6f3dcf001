use crate::gl::EmberDeviceContextGl;
use crate::{EmberFenceStatus, EmberResult};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// GL executes a submission before `submit_command_list` returns, so a fence only tracks whether
/// the device finished since the fence was submitted.
#[derive(Debug)]
pub struct EmberFenceGl {
    device_context: EmberDeviceContextGl,
    // Set to true when a submission is scheduled to signal this fence
    submitted: AtomicBool,
    gl_finish_call_count: AtomicU64,
}

impl EmberFenceGl {
    pub fn new(device_context: &EmberDeviceContextGl) -> EmberResult<EmberFenceGl> {
        Ok(EmberFenceGl {
            device_context: device_context.clone(),
            submitted: AtomicBool::new(false),
            gl_finish_call_count: AtomicU64::new(0),
        })
    }

    pub(crate) fn submitted(&self) -> bool {
        self.submitted.load(Ordering::Relaxed)
    }

    pub fn wait(&self) -> EmberResult<()> {
        if self.submitted() {
            self.device_context.gl_finish()?;
        }

        self.set_submitted(false);
        Ok(())
    }

    pub(crate) fn set_submitted(
        &self,
        available: bool,
    ) {
        if available {
            // Once the device count moves past the cached count, finish was called after this
            // fence was submitted
            self.gl_finish_call_count.store(
                self.device_context
                    .inner
                    .gl_finish_call_count
                    .load(Ordering::Relaxed),
                Ordering::Relaxed,
            );
        }
        self.submitted.store(available, Ordering::Relaxed);
    }

    pub fn get_fence_status(&self) -> EmberResult<EmberFenceStatus> {
        if !self.submitted() {
            Ok(EmberFenceStatus::Unsubmitted)
        } else if self.gl_finish_call_count.load(Ordering::Relaxed)
            < self
                .device_context
                .inner
                .gl_finish_call_count
                .load(Ordering::Relaxed)
        {
            self.set_submitted(false);
            Ok(EmberFenceStatus::Complete)
        } else {
            Ok(EmberFenceStatus::Incomplete)
        }
    }
}
