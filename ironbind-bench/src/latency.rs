//! Latency measurement utilities.

use hdrhistogram::{CreationError, Histogram};
use std::time::{Duration, Instant};

/// Highest latency the collector tracks: one minute.
const MAX_TRACKABLE_NANOS: u64 = 60_000_000_000;

/// Latency statistics.
#[derive(Debug, Clone)]
pub struct LatencyStats {
    /// Minimum latency.
    pub min: Duration,
    /// Maximum latency.
    pub max: Duration,
    /// Mean latency.
    pub mean: Duration,
    /// Median latency (p50).
    pub median: Duration,
    /// 99th percentile latency.
    pub p99: Duration,
    /// 99.9th percentile latency.
    pub p999: Duration,
    /// Sample count.
    pub count: u64,
}

/// Collects latency samples in a histogram with three significant digits.
pub struct LatencyCollector {
    histogram: Histogram<u64>,
}

impl LatencyCollector {
    /// Creates a new latency collector.
    ///
    /// # Errors
    /// Returns `CreationError` if the histogram cannot be allocated.
    pub fn new() -> Result<Self, CreationError> {
        Ok(Self {
            histogram: Histogram::new_with_bounds(1, MAX_TRACKABLE_NANOS, 3)?,
        })
    }

    /// Records a latency sample, saturating at the tracked maximum.
    pub fn record(&mut self, latency: Duration) {
        let nanos = u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX);
        self.histogram.saturating_record(nanos.max(1));
    }

    /// Measures the latency of a function.
    pub fn measure<F, T>(&mut self, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        let start = Instant::now();
        let result = f();
        self.record(start.elapsed());
        result
    }

    /// Computes statistics from collected samples.
    #[must_use]
    pub fn stats(&self) -> Option<LatencyStats> {
        if self.histogram.is_empty() {
            return None;
        }

        let h = &self.histogram;
        Some(LatencyStats {
            min: Duration::from_nanos(h.min()),
            max: Duration::from_nanos(h.max()),
            mean: Duration::from_nanos(h.mean() as u64),
            median: Duration::from_nanos(h.value_at_quantile(0.5)),
            p99: Duration::from_nanos(h.value_at_quantile(0.99)),
            p999: Duration::from_nanos(h.value_at_quantile(0.999)),
            count: h.len(),
        })
    }

    /// Clears all samples.
    pub fn clear(&mut self) {
        self.histogram.reset();
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.histogram.len()
    }

    /// Returns true if no samples have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{htd_document, keyresponse_codec};

    #[test]
    fn test_latency_stats() {
        let mut collector = LatencyCollector::new().unwrap();

        for i in 1..=100 {
            collector.record(Duration::from_micros(i));
        }

        let stats = collector.stats().unwrap();
        assert_eq!(stats.count, 100);
        assert_eq!(stats.min, Duration::from_micros(1));
        // Histogram buckets keep three significant digits.
        assert!(stats.max >= Duration::from_micros(100));
        assert!(stats.max < Duration::from_micros(101));
        assert!(stats.median >= Duration::from_micros(50));
        assert!(stats.median <= Duration::from_micros(51));
    }

    #[test]
    fn test_measure_decode() {
        let codec = keyresponse_codec().unwrap();
        let bytes = codec.encode(&htd_document(5, 2, 1)).unwrap();
        let mut collector = LatencyCollector::new().unwrap();

        let document = collector.measure(|| codec.decode(&bytes)).unwrap();
        assert_eq!(document.root, "HTDResponseOrderData");
        assert_eq!(collector.len(), 1);

        collector.clear();
        assert!(collector.is_empty());
        assert!(collector.stats().is_none());
    }
}
