//! Tag index for bulk commands
//!
//! Tags group tweeners so they can be played, paused, stopped or completed
//! together. The index is bidirectional (tag to members, member to tag) and
//! holds ids only: it never keeps a tweener alive.

use crate::tweener::TweenerId;
use indexmap::IndexSet;
use rustc_hash::FxHashMap;

/// Opaque group key for bulk tween control
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(u64);

impl Tag {
    /// Bit set on every tag handed out by [`Tweenie::new_tag`](crate::Tweenie::new_tag)
    pub(crate) const ALLOCATED: u64 = 1 << 63;

    /// Create a tag from a caller-chosen key
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for Tag {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

#[derive(Default)]
pub(crate) struct TagIndex {
    members: FxHashMap<Tag, IndexSet<TweenerId>>,
    owners: FxHashMap<TweenerId, Tag>,
}

impl TagIndex {
    /// Move `id` to `tag`, or out of any group when `tag` is `None`.
    ///
    /// Returns the previous tag.
    pub fn update(&mut self, id: TweenerId, tag: Option<Tag>) -> Option<Tag> {
        let previous = self.owners.remove(&id);
        if let Some(old) = previous {
            if let Some(set) = self.members.get_mut(&old) {
                set.shift_remove(&id);
                if set.is_empty() {
                    self.members.remove(&old);
                }
            }
        }
        if let Some(tag) = tag {
            self.members.entry(tag).or_default().insert(id);
            self.owners.insert(id, tag);
        }
        previous
    }

    /// Drop the group entry for `tag`, returning its former members
    pub fn remove_tag(&mut self, tag: Tag) -> Vec<TweenerId> {
        let members: Vec<TweenerId> = self
            .members
            .remove(&tag)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default();
        for id in &members {
            self.owners.remove(id);
        }
        members
    }

    pub fn members(&self, tag: Tag) -> Vec<TweenerId> {
        self.members
            .get(&tag)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn tag_of(&self, id: TweenerId) -> Option<Tag> {
        self.owners.get(&id).copied()
    }

    /// Forget members for which `keep` returns false
    pub fn retain(&mut self, mut keep: impl FnMut(TweenerId) -> bool) {
        let dead: Vec<TweenerId> = self.owners.keys().copied().filter(|id| !keep(*id)).collect();
        for id in dead {
            self.update(id, None);
        }
    }

    pub fn tag_count(&self) -> usize {
        self.members.len()
    }
}
