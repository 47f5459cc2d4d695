//! Per-destination-PE message arbitration: reorders arrivals back into
//! round order and synthesizes exactly one barrier once every source PE has
//! delivered its advertised count.
//!
//! Grounded on `sim/core/progcaster.{h,cpp}`'s per-source counters plus a
//! consolidated broadcast, adapted to the fabric's Barrier-Message contract
//! (`dest_id` carries the advertised non-barrier count, not a vertex id).

use std::collections::HashMap;

use crate::message::Message;
use gasfab_comm::{Pull, Push, Queue};

#[derive(Default)]
struct SourceState {
    advertised: Option<u64>,
    received: u64,
    barrier_seen: bool,
}

/// Buffers arrivals from every source PE and releases them in round order,
/// synthesizing one barrier message per round once all sources agree it has
/// closed.
pub struct Arbiter<P> {
    num_sources: usize,
    num_channels: usize,
    current_round: usize,
    sources: Vec<SourceState>,
    deferred: HashMap<usize, Queue<Message<P>>>,
    ready: Queue<Message<P>>,
    barrier_pending: bool,
    watermark: usize,
}

impl<P> Arbiter<P> {
    pub fn new(num_sources: usize, num_channels: usize) -> Self {
        Arbiter {
            num_sources,
            num_channels,
            current_round: 0,
            sources: (0..num_sources).map(|_| SourceState::default()).collect(),
            deferred: (0..num_sources).map(|s| (s, Queue::new())).collect(),
            ready: Queue::new(),
            barrier_pending: false,
            watermark: 0,
        }
    }

    fn current_channel(&self) -> usize {
        self.current_round % self.num_channels
    }

    /// Accepts one message from `source`. Barrier messages record the
    /// sender's advertised count for this round; non-barrier messages whose
    /// channel matches the current round are released immediately,
    /// others are deferred.
    pub fn put_message(&mut self, source: usize, message: Message<P>) {
        if message.barrier {
            self.sources[source].advertised = Some(message.dest_id);
            self.sources[source].barrier_seen = true;
            self.try_close_round();
            return;
        }

        if message.roundpar == self.current_channel() {
            self.sources[source].received += 1;
            self.ready.push(message);
        } else {
            self.deferred.get_mut(&source).expect("source index in range").push(message);
        }
        self.try_close_round();
    }

    fn try_close_round(&mut self) {
        let all_advertised = self.sources.iter().all(|s| s.barrier_seen);
        if !all_advertised {
            return;
        }
        let satisfied = self
            .sources
            .iter()
            .all(|s| s.advertised == Some(s.received));
        if satisfied {
            self.barrier_pending = true;
        }
    }

    /// Drains at most one deferred message per source (a "watermark"
    /// rotation) so messages that arrived for a future round before the
    /// current one closed are not starved.
    fn drain_deferred(&mut self) {
        for _ in 0..self.num_sources {
            let source = self.watermark;
            self.watermark = (self.watermark + 1) % self.num_sources.max(1);
            if let Some(queue) = self.deferred.get_mut(&source) {
                if let Some(front) = queue.front() {
                    if front.roundpar == self.current_channel() {
                        let message = queue.pull().expect("front just peeked");
                        self.sources[source].received += 1;
                        self.ready.push(message);
                    }
                }
            }
        }
        self.try_close_round();
    }

    /// Returns the next message in round order: buffered non-barrier
    /// messages first, then a synthesized barrier once the round has closed.
    pub fn get_message(&mut self) -> Option<Message<P>> {
        self.drain_deferred();

        if let Some(message) = self.ready.pull() {
            return Some(message);
        }

        if self.barrier_pending {
            self.barrier_pending = false;
            let closing_round = self.current_round;
            self.current_round += 1;
            for source in &mut self.sources {
                source.advertised = None;
                source.received = 0;
                source.barrier_seen = false;
            }
            return Some(Message {
                sender: 0,
                dest_id: 0,
                dest_pe: 0,
                dest_fpga: 0,
                roundpar: closing_round,
                barrier: true,
                timestamp: 0,
                payload: None,
            });
        }

        None
    }

    pub fn is_idle(&self) -> bool {
        !self.barrier_pending && self.ready.is_empty() && self.deferred.values().all(|q| q.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releases_messages_before_synthesizing_barrier() {
        let mut arbiter: Arbiter<u8> = Arbiter::new(2, 4);
        let msg = |roundpar: usize| Message { sender: 1, dest_id: 0, dest_pe: 0, dest_fpga: 0, roundpar, barrier: false, timestamp: 0, payload: Some(7) };

        arbiter.put_message(0, msg(0));
        arbiter.put_message(1, msg(0));
        arbiter.put_message(0, Message { sender: 0, dest_id: 1, dest_pe: 0, dest_fpga: 0, roundpar: 0, barrier: true, timestamp: 0, payload: None });
        arbiter.put_message(1, Message { sender: 0, dest_id: 1, dest_pe: 0, dest_fpga: 0, roundpar: 0, barrier: true, timestamp: 0, payload: None });

        assert!(!arbiter.get_message().unwrap().barrier);
        assert!(!arbiter.get_message().unwrap().barrier);
        let barrier = arbiter.get_message().unwrap();
        assert!(barrier.barrier);
        assert_eq!(barrier.roundpar, 0);
        assert!(arbiter.get_message().is_none());
    }

    #[test]
    fn out_of_round_messages_are_deferred_until_their_round() {
        let mut arbiter: Arbiter<u8> = Arbiter::new(1, 4);
        let msg = |roundpar: usize| Message { sender: 1, dest_id: 0, dest_pe: 0, dest_fpga: 0, roundpar, barrier: false, timestamp: 0, payload: Some(1) };

        arbiter.put_message(0, msg(1));
        assert!(arbiter.get_message().is_none());

        arbiter.put_message(0, Message { sender: 0, dest_id: 0, dest_pe: 0, dest_fpga: 0, roundpar: 0, barrier: true, timestamp: 0, payload: None });
        let barrier = arbiter.get_message().unwrap();
        assert!(barrier.barrier);

        arbiter.put_message(0, Message { sender: 0, dest_id: 1, dest_pe: 0, dest_fpga: 0, roundpar: 1, barrier: true, timestamp: 0, payload: None });
        let deferred = arbiter.get_message().unwrap();
        assert_eq!(deferred.roundpar, 1);
        assert!(!deferred.barrier);
    }
}
