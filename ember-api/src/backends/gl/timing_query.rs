use crate::gl::{EmberDeviceContextGl, GlDeferredDestroy, QueryId};
use crate::EmberResult;

use crate::gl::gl43;

#[derive(Debug)]
pub struct EmberTimingQueryGl {
    device_context: EmberDeviceContextGl,
    start_query: QueryId,
    stop_query: QueryId,
}

impl Drop for EmberTimingQueryGl {
    fn drop(&mut self) {
        self.device_context
            .destroy_later(GlDeferredDestroy::Query(self.start_query));
        self.device_context
            .destroy_later(GlDeferredDestroy::Query(self.stop_query));
    }
}

impl EmberTimingQueryGl {
    pub fn new(device_context: &EmberDeviceContextGl) -> EmberResult<Self> {
        let mut gl_context = device_context.gl_context();
        let start_query = gl_context.gl_create_query()?;
        let stop_query = gl_context.gl_create_query()?;

        Ok(EmberTimingQueryGl {
            device_context: device_context.clone(),
            start_query,
            stop_query,
        })
    }

    pub(crate) fn gl_start_query(&self) -> QueryId {
        self.start_query
    }

    pub(crate) fn gl_stop_query(&self) -> QueryId {
        self.stop_query
    }

    /// (start, stop, ticks per second)
    pub fn timestamps(&self) -> EmberResult<(u64, u64, u64)> {
        let mut gl_context = self.device_context.gl_context();
        for query in [self.start_query, self.stop_query].iter() {
            if gl_context.gl_get_query_object_u64(*query, gl43::QUERY_RESULT_AVAILABLE)? == 0 {
                Err("The timing query has not been started and stopped by a submitted command list")?;
            }
        }

        let start = gl_context.gl_get_query_object_u64(self.start_query, gl43::QUERY_RESULT)?;
        let stop = gl_context.gl_get_query_object_u64(self.stop_query, gl43::QUERY_RESULT)?;
        Ok((
            start,
            stop,
            self.device_context.device_info().timestamp_frequency,
        ))
    }
}
