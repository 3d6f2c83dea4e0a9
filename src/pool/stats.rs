use serde::Serialize;

/// Counters for the instances of one component type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Instances constructed so far.
    pub created: u64,
    /// Instances waiting for a checkout.
    pub idle: usize,
    /// Instances currently held by callers.
    pub checked_out: usize,
    /// Highest `checked_out` observed.
    pub peak_checked_out: usize,
    /// Instances dropped after a corrupting failure.
    pub discarded: u64,
    /// Instances released through `dispose`.
    pub disposed: u64,
}

impl PoolStats {
    pub(crate) fn record_checkout(&mut self) {
        self.checked_out += 1;
        self.peak_checked_out = self.peak_checked_out.max(self.checked_out);
    }

    pub(crate) fn record_release(&mut self) {
        self.checked_out = self.checked_out.saturating_sub(1);
    }

    /// Instances alive right now, idle or checked out.
    pub fn live(&self) -> usize {
        self.idle + self.checked_out
    }
}
