// crates/sync-engine/src/sequencer.rs
//! Per-item ordering of remote operations

use crate::types::PlaylistTarget;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

struct Tail {
    seq: u64,
    done: oneshot::Receiver<()>,
}

#[derive(Default)]
struct Queues {
    next_seq: u64,
    tails: HashMap<PlaylistTarget, Tail>,
}

/// Orders work touching the same (bucket, item) pair
///
/// Tickets are issued in the order events are scheduled. A ticket becomes
/// ready once every earlier ticket sharing one of its targets has been
/// dropped. Work on unrelated targets is never held back.
#[derive(Clone, Default)]
pub struct ItemSequencer {
    queues: Arc<Mutex<Queues>>,
}

impl ItemSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a place in line behind earlier work on any of `targets`
    pub fn enqueue(&self, targets: &[PlaylistTarget]) -> SequenceTicket {
        let mut queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        let seq = queues.next_seq;
        queues.next_seq += 1;

        let mut held = Vec::with_capacity(targets.len());
        let mut predecessors = Vec::new();

        for target in targets {
            if held.iter().any(|(t, _): &(PlaylistTarget, _)| t == target) {
                continue;
            }

            let (tx, rx) = oneshot::channel();
            if let Some(previous) = queues.tails.insert(target.clone(), Tail { seq, done: rx }) {
                predecessors.push(previous.done);
            }
            held.push((target.clone(), tx));
        }

        SequenceTicket {
            seq,
            held,
            predecessors,
            queues: Arc::clone(&self.queues),
        }
    }

    /// Number of targets with work in flight
    pub fn pending(&self) -> usize {
        self.queues
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .tails
            .len()
    }
}

/// A place in line for one or more targets
///
/// Dropping the ticket releases the next holder.
pub struct SequenceTicket {
    seq: u64,
    held: Vec<(PlaylistTarget, oneshot::Sender<()>)>,
    predecessors: Vec<oneshot::Receiver<()>>,
    queues: Arc<Mutex<Queues>>,
}

impl SequenceTicket {
    /// Waits until all earlier work on the same targets has finished
    ///
    /// Cancel safe: an interrupted wait can be resumed by calling again.
    pub async fn ready(&mut self) {
        while let Some(predecessor) = self.predecessors.last_mut() {
            // A dropped sender also means the predecessor is gone
            let _ = predecessor.await;
            self.predecessors.pop();
        }
    }
}

impl Drop for SequenceTicket {
    fn drop(&mut self) {
        let mut queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        for (target, done) in self.held.drain(..) {
            let _ = done.send(());
            if queues
                .tails
                .get(&target)
                .is_some_and(|tail| tail.seq == self.seq)
            {
                queues.tails.remove(&target);
            }
        }
    }
}
