//! Byte-exact change detection.
//!
//! Keeps the content of the most recently archived state and compares new
//! reads against it with plain byte equality. No hashing, no partial
//! comparison, no text decoding: a trailing newline counts as a change,
//! and binary targets compare correctly.

/// Tracks the last archived content of the target file.
///
/// The baseline starts out unset, which is distinct from any real file
/// content including empty, so the very first read is always reported as a
/// change. The baseline advances only through [`commit`], which callers
/// invoke after a snapshot was successfully written.
///
/// [`commit`]: ChangeDetector::commit
#[derive(Debug, Default)]
pub struct ChangeDetector {
    baseline: Option<Vec<u8>>,
}

impl ChangeDetector {
    /// Create a detector with no baseline
    pub fn new() -> Self {
        Self::default()
    }

    /// Does `current` differ from the last committed content?
    pub fn is_changed(&self, current: &[u8]) -> bool {
        match &self.baseline {
            None => true,
            Some(previous) => previous.as_slice() != current,
        }
    }

    /// Advance the baseline to `content`
    pub fn commit(&mut self, content: Vec<u8>) {
        self.baseline = Some(content);
    }

    /// The last committed content, if any
    pub fn baseline(&self) -> Option<&[u8]> {
        self.baseline.as_deref()
    }
}
