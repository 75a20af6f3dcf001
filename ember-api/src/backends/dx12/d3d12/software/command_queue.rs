use super::command_list::RecordedCommand;
use super::*;
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

/// Timestamps tick at 10MHz
pub const TIMESTAMP_FREQUENCY: u64 = 10_000_000;

// How often a queue blocked on a fence checks whether it is being torn down
const FENCE_WAIT_POLL_MS: u32 = 10;

enum QueueWork {
    Execute(Vec<Arc<Vec<RecordedCommand>>>),
    Signal(Dx12Fence, u64),
    Wait(Dx12Fence, u64),
}

pub(super) struct QueueClock {
    created: Instant,
}

impl Default for QueueClock {
    fn default() -> Self {
        QueueClock {
            created: Instant::now(),
        }
    }
}

impl QueueClock {
    pub fn timestamp(&self) -> u64 {
        let elapsed = self.created.elapsed();
        (elapsed.as_nanos() / (1_000_000_000 / TIMESTAMP_FREQUENCY as u128)) as u64
    }
}

struct QueueShared {
    device: Dx12Device,
    shutting_down: AtomicBool,
    clock: QueueClock,
}

struct Dx12CommandQueueInner {
    shared: Arc<QueueShared>,
    sender: Option<Sender<QueueWork>>,
    thread: Option<JoinHandle<()>>,
}

impl Drop for Dx12CommandQueueInner {
    fn drop(&mut self) {
        self.shared.shutting_down.store(true, Ordering::Release);
        // Closing the channel ends the thread once queued work is done
        self.sender = None;
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("D3D12 command queue thread panicked");
            }
        }
    }
}

/// Executes command lists in submission order on a dedicated thread
#[derive(Clone)]
pub struct Dx12CommandQueue {
    inner: Arc<Dx12CommandQueueInner>,
}

impl std::fmt::Debug for Dx12CommandQueue {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        f.debug_struct("Dx12CommandQueue").finish()
    }
}

fn run_queue(
    shared: Arc<QueueShared>,
    receiver: Receiver<QueueWork>,
) {
    for work in receiver.iter() {
        match work {
            QueueWork::Execute(command_lists) => {
                for commands in command_lists {
                    profiling::scope!("ExecuteCommandList");
                    super::execute::execute_command_list(&shared.device, &shared.clock, &commands);
                }
            }
            QueueWork::Signal(fence, value) => {
                let _ = fence.signal(value);
            }
            QueueWork::Wait(fence, value) => {
                let event = Dx12Event::default();
                let _ = fence.set_event_on_completion(value, &event);
                while !event.wait(FENCE_WAIT_POLL_MS) {
                    if shared.shutting_down.load(Ordering::Acquire) {
                        log::warn!(
                            "D3D12 command queue torn down while waiting for fence value {}",
                            value
                        );
                        break;
                    }
                }
            }
        }
    }
}

impl Dx12CommandQueue {
    pub(super) fn new(device: Dx12Device) -> D3dResult<Self> {
        let shared = Arc::new(QueueShared {
            device,
            shutting_down: AtomicBool::new(false),
            clock: QueueClock::default(),
        });

        let (sender, receiver) = crossbeam_channel::unbounded();
        let thread_shared = shared.clone();
        let thread = std::thread::Builder::new()
            .name("d3d12-command-queue".to_string())
            .spawn(move || run_queue(thread_shared, receiver))
            .map_err(|_| E_OUTOFMEMORY)?;

        Ok(Dx12CommandQueue {
            inner: Arc::new(Dx12CommandQueueInner {
                shared,
                sender: Some(sender),
                thread: Some(thread),
            }),
        })
    }

    fn send(
        &self,
        work: QueueWork,
    ) -> D3dResult<()> {
        self.inner
            .sender
            .as_ref()
            .ok_or(DXGI_ERROR_DEVICE_REMOVED)?
            .send(work)
            .map_err(|_| DXGI_ERROR_DEVICE_REMOVED)
    }

    /// Lists that are still open or that failed to record are not executed
    pub fn execute_command_lists(
        &self,
        command_lists: &[&Dx12CommandList],
    ) {
        let mut closed = Vec::with_capacity(command_lists.len());
        for command_list in command_lists {
            match command_list.closed_commands() {
                Some(commands) => closed.push(commands),
                None => {
                    self.inner.shared.device.report(
                        "ExecuteCommandLists: command list is not closed or failed to record",
                    );
                    return;
                }
            }
        }

        if self.send(QueueWork::Execute(closed)).is_err() {
            log::error!("D3D12 command queue is gone, command lists were dropped");
        }
    }

    /// Set the fence to `value` once previously submitted work has executed
    pub fn signal(
        &self,
        fence: &Dx12Fence,
        value: u64,
    ) -> D3dResult<()> {
        self.send(QueueWork::Signal(fence.clone(), value))
    }

    /// Hold back later work until the fence reaches `value`
    pub fn wait(
        &self,
        fence: &Dx12Fence,
        value: u64,
    ) -> D3dResult<()> {
        self.send(QueueWork::Wait(fence.clone(), value))
    }

    pub fn timestamp_frequency(&self) -> D3dResult<u64> {
        Ok(TIMESTAMP_FREQUENCY)
    }

    pub(super) fn device(&self) -> &Dx12Device {
        &self.inner.shared.device
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_signal_follows_submission_order() {
        let device = create_device(true).unwrap();
        let queue = device.create_command_queue().unwrap();
        let gate = device.create_fence(0).unwrap();
        let done = device.create_fence(0).unwrap();

        queue.wait(&gate, 1).unwrap();
        queue.signal(&done, 5).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert_eq!(done.completed_value(), 0);

        gate.signal(1).unwrap();
        let event = Dx12Event::new().unwrap();
        done.set_event_on_completion(5, &event).unwrap();
        assert!(event.wait(5000));
    }

    #[test]
    fn test_drop_while_waiting_does_not_hang() {
        let device = create_device(false).unwrap();
        let queue = device.create_command_queue().unwrap();
        let never = device.create_fence(0).unwrap();
        queue.wait(&never, 1).unwrap();
        drop(queue);
    }
}
