#[cfg(any(feature = "ember-dx12", test))]
use crate::dx12::EmberTimingQueryDx12;
#[cfg(any(feature = "ember-gl", test))]
use crate::gl::EmberTimingQueryGl;
use crate::EmberResult;

/// Measures GPU time between a `start_timing_query` and a `stop_timing_query` command.
///
/// Timestamps are written during replay. Reading the elapsed time is a separate step, valid once
/// the submission that wrote both timestamps has completed.
#[derive(Debug)]
pub enum EmberTimingQuery {
    #[cfg(any(feature = "ember-gl", test))]
    Gl(EmberTimingQueryGl),
    #[cfg(any(feature = "ember-dx12", test))]
    Dx12(EmberTimingQueryDx12),
}

impl EmberTimingQuery {
    /// Time between the start and stop timestamps, in seconds
    pub fn elapsed_seconds(&self) -> EmberResult<f64> {
        let (start, stop, frequency) = match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberTimingQuery::Gl(inner) => inner.timestamps()?,
            #[cfg(any(feature = "ember-dx12", test))]
            EmberTimingQuery::Dx12(inner) => inner.timestamps()?,
        };

        if stop < start {
            Err(format!(
                "Timing query stop timestamp {} is earlier than start timestamp {}",
                stop, start
            ))?;
        }

        Ok((stop - start) as f64 / frequency as f64)
    }

    pub fn elapsed_ms(&self) -> EmberResult<f64> {
        Ok(self.elapsed_seconds()? * 1000.0)
    }

    #[cfg(any(feature = "ember-gl", test))]
    pub fn gl_timing_query(&self) -> Option<&EmberTimingQueryGl> {
        match self {
            EmberTimingQuery::Gl(inner) => Some(inner),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberTimingQuery::Dx12(_) => None,
        }
    }

    #[cfg(any(feature = "ember-dx12", test))]
    pub fn dx12_timing_query(&self) -> Option<&EmberTimingQueryDx12> {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberTimingQuery::Gl(_) => None,
            EmberTimingQuery::Dx12(inner) => Some(inner),
        }
    }
}
