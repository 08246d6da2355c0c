//! Held-key tracking for live input.
//!
//! A key is identified by its (output channel, note) pair, so the same pitch
//! held on two different output channels stays distinguishable. The tracker
//! is the debounce for UIs that re-fire press events while a button remains
//! clicked: one note-on per press, one note-off per release, never more.

use std::collections::BTreeSet;

#[derive(Debug, Default)]
pub struct HeldNotes {
    down: BTreeSet<(u8, u8)>,
}

impl HeldNotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the key held. Returns true if it was already held, in which
    /// case the caller must not emit a duplicate note-on.
    pub fn press(&mut self, channel: u8, note: u8) -> bool {
        !self.down.insert((channel, note))
    }

    /// Clears the mark. Returns true if the key was held, in which case the
    /// caller emits the matching note-off.
    pub fn release(&mut self, channel: u8, note: u8) -> bool {
        self.down.remove(&(channel, note))
    }

    pub fn is_held(&self, channel: u8, note: u8) -> bool {
        self.down.contains(&(channel, note))
    }

    /// Drains every held key; the caller emits note-off for each.
    /// Used on Stop and on shutdown.
    pub fn flush_all(&mut self) -> Vec<(u8, u8)> {
        let drained: Vec<_> = self.down.iter().copied().collect();
        self.down.clear();
        drained
    }

    /// Drains the held keys of a single output channel. Used when a channel
    /// is removed so its output cannot be left with stuck keys.
    pub fn drain_channel(&mut self, channel: u8) -> Vec<(u8, u8)> {
        let drained: Vec<_> = self
            .down
            .iter()
            .copied()
            .filter(|&(ch, _)| ch == channel)
            .collect();
        for key in &drained {
            self.down.remove(key);
        }
        drained
    }

    pub fn len(&self) -> usize {
        self.down.len()
    }

    pub fn is_empty(&self) -> bool {
        self.down.is_empty()
    }
}
