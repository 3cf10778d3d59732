use std::sync::Mutex;

/// Counts evaluated and failed calculations. Shared by reference across
/// sweep workers.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub evaluated: usize,
    pub failed: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_evaluated(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.evaluated += 1;
        }
    }

    pub fn record_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.evaluated += 1;
            metrics.failed += 1;
        }
    }

    pub fn snapshot(&self) -> Metrics {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_count_as_evaluated() {
        let recorder = MetricsRecorder::new();
        recorder.record_evaluated();
        recorder.record_failure();
        assert_eq!(
            recorder.snapshot(),
            Metrics {
                evaluated: 2,
                failed: 1
            }
        );
    }
}
