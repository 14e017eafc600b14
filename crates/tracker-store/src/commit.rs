//! Orders metadata-log commits by identifier.

use parking_lot::{Condvar, Mutex, MutexGuard};

/// Hands out commit turns in identifier order.
///
/// Recovery maps the k-th metadata entry to identifier k, so entries must
/// reach the metadata log in identifier order even when payload appends
/// finish out of order. Every assigned identifier must take its turn exactly
/// once, or later identifiers wait forever.
#[derive(Debug)]
pub(crate) struct CommitSequencer {
    next: Mutex<u64>,
    turn: Condvar,
}

impl CommitSequencer {
    /// Creates a sequencer whose first turn belongs to `next`.
    pub(crate) fn new(next: u64) -> Self {
        Self {
            next: Mutex::new(next),
            turn: Condvar::new(),
        }
    }

    /// Blocks until `id` is next to commit.
    ///
    /// The turn passes to `id + 1` when the returned guard is dropped.
    pub(crate) fn wait_turn(&self, id: u64) -> CommitTurn<'_> {
        let mut next = self.next.lock();
        while *next != id {
            self.turn.wait(&mut next);
        }
        CommitTurn {
            next,
            turn: &self.turn,
        }
    }
}

/// Exclusive right to append the metadata entry of one identifier.
pub(crate) struct CommitTurn<'a> {
    next: MutexGuard<'a, u64>,
    turn: &'a Condvar,
}

impl Drop for CommitTurn<'_> {
    fn drop(&mut self) {
        *self.next += 1;
        self.turn.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn turns_follow_identifier_order() {
        let sequencer = CommitSequencer::new(0);
        let order = Mutex::new(Vec::new());

        thread::scope(|scope| {
            for id in (0..16u64).rev() {
                let sequencer = &sequencer;
                let order = &order;
                scope.spawn(move || {
                    let _turn = sequencer.wait_turn(id);
                    order.lock().push(id);
                });
            }
        });

        assert_eq!(order.into_inner(), (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn starts_at_recovered_position() {
        let sequencer = CommitSequencer::new(5);
        drop(sequencer.wait_turn(5));
        drop(sequencer.wait_turn(6));
        assert_eq!(*sequencer.next.lock(), 7);
    }
}
