//! Update queues and render-phase updates
//!
//! Reducer and state slots own an update queue. Actions dispatched while the
//! owning component is still rendering are stashed in a lazily created map of
//! queue -> linked list of updates, and drained in FIFO order when the slot is
//! visited on the next replay pass.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use std::any::Any;

use crate::slot::SlotId;

new_key_type! {
    /// Identity of a slot's update queue
    pub struct QueueId;
    /// Handle to a pending update node
    pub struct UpdateId;
}

/// The update queue of one reducer/state slot
pub(crate) struct UpdateQueue {
    /// Slot owning this queue
    pub slot: SlotId,
}

/// A dispatched action waiting to be folded through the reducer
struct Update {
    action: Box<dyn Any>,
    next: Option<UpdateId>,
}

/// Linked list of pending updates for one queue
#[derive(Clone, Copy)]
struct PendingUpdates {
    first: UpdateId,
    last: UpdateId,
}

/// All update queues of a render session
pub(crate) struct UpdateQueues {
    queues: SlotMap<QueueId, UpdateQueue>,
    updates: SlotMap<UpdateId, Update>,
    /// Created on the first render-phase dispatch
    render_phase: Option<FxHashMap<QueueId, PendingUpdates>>,
}

impl UpdateQueues {
    pub fn new() -> Self {
        Self {
            queues: SlotMap::with_key(),
            updates: SlotMap::with_key(),
            render_phase: None,
        }
    }

    /// Create an empty queue for a reducer slot
    pub fn create_queue(&mut self, slot: SlotId) -> QueueId {
        self.queues.insert(UpdateQueue { slot })
    }

    pub fn queue(&self, queue: QueueId) -> Option<&UpdateQueue> {
        self.queues.get(queue)
    }

    /// Append an action to the end of a queue's render-phase list
    pub fn enqueue(&mut self, queue: QueueId, action: Box<dyn Any>) {
        let id = self.updates.insert(Update { action, next: None });
        let pending = self.render_phase.get_or_insert_with(FxHashMap::default);

        match pending.get_mut(&queue) {
            Some(list) => {
                self.updates[list.last].next = Some(id);
                list.last = id;
            }
            None => {
                pending.insert(
                    queue,
                    PendingUpdates {
                        first: id,
                        last: id,
                    },
                );
            }
        }
    }

    /// Remove and return a queue's pending actions in dispatch order
    pub fn drain(&mut self, queue: QueueId) -> Vec<Box<dyn Any>> {
        let Some(list) = self
            .render_phase
            .as_mut()
            .and_then(|pending| pending.remove(&queue))
        else {
            return Vec::new();
        };

        let mut actions = Vec::new();
        let mut cursor = Some(list.first);
        while let Some(id) = cursor {
            match self.updates.remove(id) {
                Some(update) => {
                    cursor = update.next;
                    actions.push(update.action);
                }
                None => break,
            }
        }
        actions
    }

    /// Number of actions waiting across all queues
    pub fn pending_len(&self) -> usize {
        self.updates.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::SlotList;

    fn queue_fixture() -> (UpdateQueues, QueueId, QueueId) {
        let mut slots = SlotList::new();
        let a = slots.next_slot(true).unwrap().id;
        let b = slots.next_slot(true).unwrap().id;

        let mut queues = UpdateQueues::new();
        let qa = queues.create_queue(a);
        let qb = queues.create_queue(b);
        (queues, qa, qb)
    }

    fn as_i32(actions: Vec<Box<dyn Any>>) -> Vec<i32> {
        actions
            .into_iter()
            .map(|a| *a.downcast::<i32>().unwrap())
            .collect()
    }

    #[test]
    fn test_drain_is_fifo() {
        let (mut queues, qa, _) = queue_fixture();

        queues.enqueue(qa, Box::new(1i32));
        queues.enqueue(qa, Box::new(2i32));
        queues.enqueue(qa, Box::new(3i32));

        assert_eq!(queues.pending_len(), 3);
        assert_eq!(as_i32(queues.drain(qa)), vec![1, 2, 3]);
        assert_eq!(queues.pending_len(), 0);
    }

    #[test]
    fn test_queues_are_independent() {
        let (mut queues, qa, qb) = queue_fixture();

        queues.enqueue(qa, Box::new(1i32));
        queues.enqueue(qb, Box::new(10i32));
        queues.enqueue(qa, Box::new(2i32));

        assert_eq!(as_i32(queues.drain(qb)), vec![10]);
        assert_eq!(as_i32(queues.drain(qa)), vec![1, 2]);
    }

    #[test]
    fn test_drain_removes_entry() {
        let (mut queues, qa, _) = queue_fixture();

        queues.enqueue(qa, Box::new(1i32));
        queues.drain(qa);

        assert!(queues.drain(qa).is_empty());
        queues.enqueue(qa, Box::new(7i32));
        assert_eq!(as_i32(queues.drain(qa)), vec![7]);
    }

    #[test]
    fn test_drain_without_updates() {
        let (mut queues, qa, _) = queue_fixture();
        assert!(queues.drain(qa).is_empty());
    }
}
