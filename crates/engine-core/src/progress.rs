use std::time::{Duration, Instant};
use tracing::info;

/// How often a progress line is logged, in documents.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1000;

/// Counts processed documents and logs a line every `interval` of them.
#[derive(Debug)]
pub struct ProgressTracker {
    verb: &'static str,
    interval: u64,
    count: u64,
    started: Instant,
}

impl ProgressTracker {
    /// `verb` names the work in log lines, e.g. "Wrote" or "Indexed".
    pub fn new(verb: &'static str) -> Self {
        ProgressTracker {
            verb,
            interval: DEFAULT_PROGRESS_INTERVAL,
            count: 0,
            started: Instant::now(),
        }
    }

    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Counts one document; returns the running total.
    pub fn record(&mut self) -> u64 {
        self.count += 1;
        if self.count % self.interval == 0 {
            info!(
                elapsed_ms = self.started.elapsed().as_millis() as u64,
                "{} {} docs", self.verb, self.count
            );
        }
        self.count
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Logs the final total.
    pub fn finish(&self) {
        let secs = self.elapsed().as_secs_f64();
        let rate = if secs > 0.0 {
            self.count as f64 / secs
        } else {
            0.0
        };
        info!(
            docs_per_sec = %format!("{:.2}", rate),
            "{} {} docs", self.verb, self.count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_logs_every_interval() {
        let mut progress = ProgressTracker::new("Wrote").with_interval(2);
        for _ in 0..5 {
            progress.record();
        }

        assert_eq!(progress.count(), 5);
        assert!(logs_contain("Wrote 2 docs"));
        assert!(logs_contain("Wrote 4 docs"));
        assert!(!logs_contain("Wrote 3 docs"));
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let mut progress = ProgressTracker::new("Indexed").with_interval(0);
        assert_eq!(progress.record(), 1);
    }
}
