//! Journal offset commits for dropped messages

/// Receives the journal offset of every message dropped by a rule.
///
/// Called on the processing thread, once per dropped message, so
/// implementations must not block for long.
pub trait Journal: Send + Sync {
    fn mark_offset_committed(&self, offset: u64);
}

/// Journal that discards commits
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopJournal;

impl Journal for NoopJournal {
    fn mark_offset_committed(&self, _offset: u64) {}
}
