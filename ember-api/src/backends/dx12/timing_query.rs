use crate::dx12::d3d12;
use crate::dx12::EmberDeviceContextDx12;
use crate::EmberResult;
use std::sync::atomic::{AtomicU64, Ordering};

pub(crate) const START_QUERY_INDEX: u32 = 0;
pub(crate) const STOP_QUERY_INDEX: u32 = 1;

/// Two timestamps in a query heap. Stopping the query resolves both into a readback buffer, which
/// is readable once the submission that stopped it has executed.
#[derive(Debug)]
pub struct EmberTimingQueryDx12 {
    device_context: EmberDeviceContextDx12,
    query_heap: d3d12::Dx12QueryHeap,
    readback_buffer: d3d12::Dx12Resource,
    // Idle fence value of the submission that resolved the queries, zero until then
    submitted_fence_value: AtomicU64,
}

impl EmberTimingQueryDx12 {
    pub fn new(device_context: &EmberDeviceContextDx12) -> EmberResult<Self> {
        let device = device_context.dx12_device();
        let query_heap = device.create_query_heap(&d3d12::D3D12_QUERY_HEAP_DESC {
            Type: d3d12::D3D12_QUERY_HEAP_TYPE_TIMESTAMP,
            Count: 2,
        })?;
        let readback_buffer = device.create_committed_resource(
            d3d12::D3D12_HEAP_TYPE_READBACK,
            &d3d12::D3D12_RESOURCE_DESC::buffer(2 * std::mem::size_of::<u64>() as u64),
            d3d12::D3D12_RESOURCE_STATE_COPY_DEST,
        )?;
        readback_buffer.set_name("Timing query readback");

        Ok(EmberTimingQueryDx12 {
            device_context: device_context.clone(),
            query_heap,
            readback_buffer,
            submitted_fence_value: AtomicU64::new(0),
        })
    }

    pub(crate) fn dx12_query_heap(&self) -> &d3d12::Dx12QueryHeap {
        &self.query_heap
    }

    pub(crate) fn dx12_readback_buffer(&self) -> &d3d12::Dx12Resource {
        &self.readback_buffer
    }

    pub(crate) fn set_submitted(
        &self,
        fence_value: u64,
    ) {
        self.submitted_fence_value
            .store(fence_value, Ordering::Release);
    }

    /// (start, stop, ticks per second)
    pub fn timestamps(&self) -> EmberResult<(u64, u64, u64)> {
        let fence_value = self.submitted_fence_value.load(Ordering::Acquire);
        if fence_value == 0 || !self.device_context.is_idle_fence_value_complete(fence_value) {
            Err("The timing query has not been started and stopped by a submitted command list")?;
        }

        let mapped = self.readback_buffer.map()?;
        let read_u64 = |offset: usize| {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&mapped[offset..offset + 8]);
            u64::from_le_bytes(bytes)
        };

        Ok((
            read_u64(START_QUERY_INDEX as usize * 8),
            read_u64(STOP_QUERY_INDEX as usize * 8),
            self.device_context.device_info().timestamp_frequency,
        ))
    }
}
