//! Revert stack — bounded LIFO of pre-empted modes.
//!
//! An entry is pushed when a higher-priority request starts and popped when
//! it ends, so the engine can restore exactly the mode that was in effect
//! before the pre-emption. Backed by an explicit fixed array plus length so
//! entries stay inspectable and prunable; the oldest entry is dropped when
//! the stack overflows.

use breeze_domain::mode::Mode;

/// Maximum nesting depth tracked. Deeper nesting drops the oldest entry.
pub const REVERT_STACK_CAPACITY: usize = 8;

/// One pre-empted mode and the priority it held when it was pre-empted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevertEntry {
    /// The mode to restore.
    pub mode: Mode,
    /// The arbitration priority that mode was winning with.
    pub priority: u8,
}

/// Bounded LIFO keyed by priority.
#[derive(Debug, Default)]
pub struct RevertStack {
    entries: [Option<RevertEntry>; REVERT_STACK_CAPACITY],
    len: usize,
}

impl RevertStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the stack holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entry that would be popped next, if any.
    #[must_use]
    pub fn top(&self) -> Option<RevertEntry> {
        self.len.checked_sub(1).and_then(|i| self.entries[i])
    }

    /// Push a pre-empted mode.
    ///
    /// A push whose priority equals the current top is coalesced into it
    /// (the top is replaced) so overlapping events of the same priority
    /// class never double-stack. Returns `false` when coalesced.
    pub fn push(&mut self, entry: RevertEntry) -> bool {
        if let Some(top) = self.top() {
            if top.priority == entry.priority {
                self.entries[self.len - 1] = Some(entry);
                return false;
            }
        }
        if self.len == REVERT_STACK_CAPACITY {
            // Overflow: drop the oldest entry.
            self.entries.rotate_left(1);
            self.len -= 1;
        }
        self.entries[self.len] = Some(entry);
        self.len += 1;
        true
    }

    /// Remove and return the most recent entry.
    pub fn pop(&mut self) -> Option<RevertEntry> {
        let index = self.len.checked_sub(1)?;
        self.len = index;
        self.entries[index].take()
    }

    /// Splice out the topmost entry equal to `entry`, shifting everything
    /// above it down one slot. Returns whether an entry was removed.
    pub fn remove(&mut self, entry: RevertEntry) -> bool {
        let Some(index) = (0..self.len).rev().find(|&i| self.entries[i] == Some(entry)) else {
            return false;
        };
        for i in index..self.len - 1 {
            self.entries[i] = self.entries[i + 1];
        }
        self.len -= 1;
        self.entries[self.len] = None;
        true
    }

    /// Iterate entries oldest first, for inspection.
    pub fn iter(&self) -> impl Iterator<Item = RevertEntry> + '_ {
        self.entries[..self.len].iter().filter_map(|e| *e)
    }

    /// Drop every entry. Teardown calls this synchronously so no revert
    /// entry survives the engine.
    pub fn clear(&mut self) {
        self.entries = [None; REVERT_STACK_CAPACITY];
        self.len = 0;
    }
}
