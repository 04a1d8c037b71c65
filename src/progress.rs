//! Progress reporting capability
//!
//! The pipeline reports fractional progress through a [`ProgressSink`] passed
//! into the generation call. The contract for callers:
//!
//! - values are integer percentages, 0..=100
//! - the observed sequence is monotonically non-decreasing
//! - on success the final call is exactly 100, delivered once
//! - on failure the 100 call never happens; earlier values are not retracted
//!
//! Monotonicity is enforced here, not at every call site: the pipeline wraps
//! its sink in [`Monotone`], so interpolated per-row checkpoints can be
//! computed with integer division without worrying about ties going backwards.

/// Receiver for progress percentages. Implemented by the CLI over an
/// indicatif bar; tests use a recording sink.
pub trait ProgressSink {
    fn report(&mut self, percent: u8);
}

/// Sink that discards every report.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&mut self, _percent: u8) {}
}

/// Clamps reports to 0..=100 and drops any value below the last one seen.
pub struct Monotone<'a> {
    inner: &'a mut dyn ProgressSink,
    last: u8,
}

impl<'a> Monotone<'a> {
    pub fn new(inner: &'a mut dyn ProgressSink) -> Self {
        Self { inner, last: 0 }
    }

    pub fn report(&mut self, percent: u8) {
        let percent = percent.min(100);
        if percent > self.last {
            self.last = percent;
            self.inner.report(percent);
        }
    }

    /// Linear interpolation between two checkpoints: `done` of `total` units
    /// mapped into `from..=to`.
    pub fn report_span(&mut self, from: u8, to: u8, done: usize, total: usize) {
        if total == 0 {
            return;
        }
        let width = (to - from) as usize;
        self.report(from + (done * width / total) as u8);
    }
}

impl<F: FnMut(u8)> ProgressSink for F {
    fn report(&mut self, percent: u8) {
        self(percent)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::ProgressSink;

    /// Records every reported value, for asserting the contract in tests.
    #[derive(Default)]
    pub struct Recorder {
        pub values: Vec<u8>,
    }

    impl ProgressSink for Recorder {
        fn report(&mut self, percent: u8) {
            self.values.push(percent);
        }
    }
}
