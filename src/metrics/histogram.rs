use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use hdrhistogram::Histogram;
use hdrhistogram::serialization::{Serializer, V2Serializer};

use crate::error::MetricsError;

/// Response-time histogram in milliseconds, three significant digits.
#[derive(Debug, Clone)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create an empty histogram.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        let hist = Histogram::<u64>::new(3).map_err(|err| MetricsError::Histogram {
            context: "create",
            source: err.to_string().into(),
        })?;
        Ok(Self { hist })
    }

    /// Record a latency value in milliseconds. Sub-millisecond responses
    /// are recorded as 1ms.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be recorded.
    pub fn record(&mut self, latency_ms: u64) -> Result<(), MetricsError> {
        let value = latency_ms.max(1);
        self.hist.record(value).map_err(|err| MetricsError::Histogram {
            context: "record",
            source: err.to_string().into(),
        })
    }

    /// Value at `percentile` (0-100). Zero when empty.
    #[must_use]
    pub fn percentile(&self, percentile: u8) -> u64 {
        if self.count() == 0 {
            return 0;
        }
        self.hist.value_at_percentile(f64::from(percentile.min(100)))
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }

    /// Encode the histogram as base64.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be serialized.
    pub fn encode_base64(&self) -> Result<String, MetricsError> {
        let mut buffer = Vec::new();
        V2Serializer::new()
            .serialize(&self.hist, &mut buffer)
            .map_err(|err| MetricsError::Histogram {
                context: "serialize",
                source: err.to_string().into(),
            })?;
        Ok(B64.encode(buffer))
    }
}
