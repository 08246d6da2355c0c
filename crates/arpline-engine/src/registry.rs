//! Channel registry: ordered collection with unique names and deferred removal.
//!
//! Rendering and scheduling iterate the same list that user actions mutate,
//! all within one tick. Removal is therefore two-phase: `remove` only marks
//! the id, and `apply_pending_removals` compacts the list once per tick
//! after every consumer has finished iterating, so indices and iterators
//! stay valid mid-pass.

use crate::channel::{ArpChannel, ChannelId};
use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: Vec<ArpChannel>,
    pending_removals: Vec<ChannelId>,
    next_id: u32,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a channel with documented defaults. The name must be unique
    /// (case-sensitive); the output channel is the lowest free slot in 0-15,
    /// or 0 when all sixteen are taken.
    pub fn add(&mut self, name: impl Into<String>) -> Result<ChannelId> {
        let name = name.into();
        if self.channels.iter().any(|ch| ch.name() == name) {
            return Err(Error::NameConflict(name));
        }

        let id = ChannelId(self.next_id);
        self.next_id += 1;
        let output = self.next_free_output();
        self.channels.push(ArpChannel::new(id, name, output));
        Ok(id)
    }

    /// Renames a channel, enforcing the same uniqueness rule. The channel
    /// being renamed is excluded from the conflict check.
    pub fn rename(&mut self, id: ChannelId, new_name: impl Into<String>) -> Result<()> {
        let new_name = new_name.into();
        if self
            .channels
            .iter()
            .any(|ch| ch.id() != id && ch.name() == new_name)
        {
            return Err(Error::NameConflict(new_name));
        }
        let channel = self.get_mut(id).ok_or(Error::UnknownChannel(id))?;
        channel.set_name(new_name);
        Ok(())
    }

    /// Marks a channel for removal. The actual erase happens in
    /// `apply_pending_removals`.
    pub fn remove(&mut self, id: ChannelId) {
        if self.get(id).is_some() && !self.pending_removals.contains(&id) {
            self.pending_removals.push(id);
        }
    }

    /// Erases every channel marked for removal and returns them, so the
    /// caller can release whatever they were still sounding.
    pub fn apply_pending_removals(&mut self) -> Vec<ArpChannel> {
        if self.pending_removals.is_empty() {
            return Vec::new();
        }
        let pending = std::mem::take(&mut self.pending_removals);
        let mut removed = Vec::with_capacity(pending.len());
        let mut kept = Vec::with_capacity(self.channels.len());
        for channel in self.channels.drain(..) {
            if pending.contains(&channel.id()) {
                removed.push(channel);
            } else {
                kept.push(channel);
            }
        }
        self.channels = kept;
        removed
    }

    pub fn get(&self, id: ChannelId) -> Option<&ArpChannel> {
        self.channels.iter().find(|ch| ch.id() == id)
    }

    pub fn get_mut(&mut self, id: ChannelId) -> Option<&mut ArpChannel> {
        self.channels.iter_mut().find(|ch| ch.id() == id)
    }

    /// Channels in stable insertion order, for deterministic listing and
    /// scheduling order.
    pub fn channels(&self) -> impl Iterator<Item = &ArpChannel> {
        self.channels.iter()
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut ArpChannel> {
        self.channels.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    fn next_free_output(&self) -> u8 {
        (0..16u8)
            .find(|slot| {
                !self
                    .channels
                    .iter()
                    .any(|ch| ch.output_channel() == *slot)
            })
            .unwrap_or(0)
    }
}
