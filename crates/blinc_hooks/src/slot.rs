//! Slot list and cursor
//!
//! Each hook call claims the next slot in a singly-linked list. A slot has no
//! name or key: its position in the call sequence is its identity. The list is
//! stored in a [`SlotMap`] arena and linked through [`SlotId`] handles, so a
//! replay pass can walk it again from the head without reallocating anything.
//!
//! The cursor distinguishes the two ways of arriving at a slot:
//!
//! | cursor          | successor      | result                         |
//! |-----------------|----------------|--------------------------------|
//! | before the head | list empty     | create head, first pass        |
//! | before the head | head exists    | reuse head, replay             |
//! | on a slot       | none           | append, first pass             |
//! | on a slot       | exists         | advance, replay                |
//!
//! Appending during a replay pass is a rules-of-hooks violation.

use slotmap::{new_key_type, SlotMap};
use std::any::Any;

use crate::error::{HookError, Result};
use crate::update::QueueId;

new_key_type! {
    /// Handle to a slot record in the arena
    pub struct SlotId;
}

/// A single slot record
pub(crate) struct Slot {
    /// Value stored by the hook that owns this position
    pub memoized: Option<Box<dyn Any>>,
    /// Update queue, only for reducer/state slots
    pub queue: Option<QueueId>,
    /// Next slot in call order
    pub next: Option<SlotId>,
    /// Zero-based call position
    pub index: usize,
}

/// Where the cursor landed for the current hook call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotVisit {
    pub id: SlotId,
    pub index: usize,
    /// The slot already existed from an earlier pass of this render
    pub is_re_render: bool,
}

/// Ordered slots of one component's render, plus the cursor walking them
pub struct SlotList {
    slots: SlotMap<SlotId, Slot>,
    head: Option<SlotId>,
    cursor: Option<SlotId>,
}

impl SlotList {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            head: None,
            cursor: None,
        }
    }

    /// Advance the cursor to the slot for the next hook call
    ///
    /// `allow_append` is false on replay passes, where the list length was
    /// fixed by the first pass.
    pub fn next_slot(&mut self, allow_append: bool) -> Result<SlotVisit> {
        let existing = match self.cursor {
            None => self.head,
            Some(current) => self.slots[current].next,
        };

        if let Some(id) = existing {
            self.cursor = Some(id);
            return Ok(SlotVisit {
                id,
                index: self.slots[id].index,
                is_re_render: true,
            });
        }

        let index = self.len();
        if !allow_append {
            return Err(HookError::MoreHooksThanPreviousRender { index });
        }

        let id = self.slots.insert(Slot {
            memoized: None,
            queue: None,
            next: None,
            index,
        });
        match self.cursor {
            None => self.head = Some(id),
            Some(current) => self.slots[current].next = Some(id),
        }
        self.cursor = Some(id);

        tracing::trace!(index, "created hook slot");

        Ok(SlotVisit {
            id,
            index,
            is_re_render: false,
        })
    }

    /// Move the cursor back before the head, keeping every slot record
    pub fn rewind(&mut self) {
        self.cursor = None;
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn head(&self) -> Option<SlotId> {
        self.head
    }

    /// Slots in call order
    pub fn iter(&self) -> impl Iterator<Item = SlotId> + '_ {
        std::iter::successors(self.head, move |id| self.slots[*id].next)
    }

    /// Slot record for a visit returned by [`SlotList::next_slot`]
    pub(crate) fn slot_mut(&mut self, visit: &SlotVisit) -> &mut Slot {
        &mut self.slots[visit.id]
    }
}

impl Default for SlotList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_pass_appends() {
        let mut list = SlotList::new();

        let a = list.next_slot(true).unwrap();
        let b = list.next_slot(true).unwrap();
        let c = list.next_slot(true).unwrap();

        assert!(!a.is_re_render && !b.is_re_render && !c.is_re_render);
        assert_eq!((a.index, b.index, c.index), (0, 1, 2));
        assert_eq!(list.len(), 3);
        assert_eq!(list.head(), Some(a.id));
    }

    #[test]
    fn test_replay_reuses_positions() {
        let mut list = SlotList::new();
        let first: Vec<_> = (0..3).map(|_| list.next_slot(true).unwrap().id).collect();

        list.rewind();
        let second: Vec<_> = (0..3)
            .map(|_| list.next_slot(false).unwrap())
            .inspect(|visit| assert!(visit.is_re_render))
            .map(|visit| visit.id)
            .collect();

        assert_eq!(first, second);
        assert_eq!(list.iter().collect::<Vec<_>>(), first);
    }

    #[test]
    fn test_replay_cannot_append() {
        let mut list = SlotList::new();
        list.next_slot(true).unwrap();

        list.rewind();
        list.next_slot(false).unwrap();
        let err = list.next_slot(false).unwrap_err();

        assert!(matches!(
            err,
            HookError::MoreHooksThanPreviousRender { index: 1 }
        ));
        assert_eq!(list.len(), 1);
    }
}
