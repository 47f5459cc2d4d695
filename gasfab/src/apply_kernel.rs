//! The per-PE vertex-state store: streaming gather, barrier-triggered apply.
//!
//! Grounded on `sim/core/baseapplykernel.cpp` (the software-model base class)
//! and `sim/applykernel.cpp` (the hardware-pipelined variant with
//! `timestamp_in`/`timestamp_out`/`latency` bookkeeping). The reference keeps
//! check-out and writeback as two separately-clocked pipeline stages when
//! running the hardware model; here that separation is one small FIFO of
//! in-flight checkouts rather than a Verilator-driven register file, per the
//! design notes' "hardware co-simulation hooks" guidance (no gate-level
//! timing is in scope, only the analytic latency contract).

use crate::config::LatencyModel;
use crate::logging::SimEvent;
use crate::message::{Message, Update, VertexEntry};
use crate::vertex_program::VertexProgram;
use gasfab_comm::{Pull, Push, Queue};
use gasfab_logging::Logger;

struct ApplyInput<P: VertexProgram> {
    message: Message<P::MessagePayload>,
    local: usize,
    level: usize,
}

struct GatherSlot {
    local: usize,
    due: u64,
}

/// Streaming-gather, barrier-triggered-apply vertex store for one PE.
pub struct ApplyKernel<P: VertexProgram> {
    vertices: Vec<VertexEntry<P::VertexData>>,
    last_msg_time: Vec<u64>,
    input_queue: Queue<ApplyInput<P>>,
    gather_inflight: Queue<GatherSlot>,
    sweep: Queue<usize>,
    pending_barrier: Option<Update<P::UpdatePayload>>,
    output_queue: Queue<Update<P::UpdatePayload>>,
    update_roundpar: usize,
    /// Monotonically increasing superstep counter, distinct from
    /// `update_roundpar` (which cycles mod `num_channels`): the `level`
    /// algorithms see in `gather`/`apply`/`gather_apply_fused`.
    level: usize,
    latency: LatencyModel,
    clock: u64,
    pe_id: usize,
    logger: Option<Logger<SimEvent>>,
}

impl<P: VertexProgram> ApplyKernel<P> {
    pub fn new(pe_id: usize, vertices: Vec<VertexEntry<P::VertexData>>, latency: LatencyModel, logger: Option<Logger<SimEvent>>) -> Self {
        let last_msg_time = vec![0; vertices.len()];
        ApplyKernel {
            vertices,
            last_msg_time,
            input_queue: Queue::new(),
            gather_inflight: Queue::new(),
            sweep: Queue::new(),
            pending_barrier: None,
            output_queue: Queue::new(),
            update_roundpar: 0,
            level: 0,
            latency,
            clock: 0,
            pe_id,
            logger,
        }
    }

    pub fn vertex(&self, local: usize) -> &VertexEntry<P::VertexData> {
        &self.vertices[local]
    }

    /// Pushes a message into the gather pipeline, then runs one gather tick.
    pub fn queue_input(&mut self, message: Message<P::MessagePayload>, local: usize, level: usize) {
        self.input_queue.push(ApplyInput { message, local, level });
        self.gather_tick();
    }

    /// Runs one gather tick and one apply tick, then pops at most one Update.
    pub fn get_update(&mut self) -> Option<Update<P::UpdatePayload>> {
        self.gather_tick();
        self.apply_tick();
        self.output_queue.pull()
    }

    fn gather_tick(&mut self) {
        self.clock += 1;

        if let Some(slot) = self.gather_inflight.front() {
            if slot.due <= self.clock {
                let slot = self.gather_inflight.pull().expect("front just peeked");
                if !self.vertices[slot.local].in_use {
                    self.log(SimEvent::KernelAnomaly {
                        pe: self.pe_id,
                        detail: format!("gather writeback to vertex {} not in use", slot.local),
                    });
                }
                self.vertices[slot.local].in_use = false;
            }
        }

        let stalled = match self.input_queue.front() {
            Some(input) => self.vertices[input.local].in_use,
            None => return,
        };
        if stalled {
            return;
        }

        let input = self.input_queue.pull().expect("front just peeked");
        self.vertices[input.local].in_use = true;
        self.last_msg_time[input.local] = input.message.timestamp;

        let produced = if P::FUSED_GATHER_APPLY {
            P::gather_apply_fused(&input.message, &mut self.vertices[input.local], input.level)
        } else {
            P::gather(&input.message, &mut self.vertices[input.local], input.level);
            None
        };

        let latency = self.latency.apply_latency();
        if latency == 0 {
            self.vertices[input.local].in_use = false;
        } else {
            self.gather_inflight.push(GatherSlot { local: input.local, due: self.clock + latency });
        }

        if let Some(payload) = produced {
            let timestamp = self.timestamp_for(input.local);
            self.output_queue.push(Update {
                sender: self.vertices[input.local].global_id,
                roundpar: input.message.roundpar,
                barrier: false,
                timestamp,
                payload: Some(payload),
            });
        }
    }

    fn apply_tick(&mut self) {
        if let Some(local) = self.sweep.pull() {
            if self.vertices[local].in_use {
                self.log(SimEvent::KernelAnomaly {
                    pe: self.pe_id,
                    detail: format!("barrier sweep found vertex {local} still in use"),
                });
            }
            let global_id = self.vertices[local].global_id;
            let timestamp = self.timestamp_for(local);
            let produced = if P::FUSED_GATHER_APPLY {
                let trigger = Message {
                    sender: global_id,
                    dest_id: 0,
                    dest_pe: 0,
                    dest_fpga: 0,
                    roundpar: self.update_roundpar,
                    barrier: true,
                    timestamp,
                    payload: None,
                };
                P::gather_apply_fused(&trigger, &mut self.vertices[local], self.level)
            } else {
                P::apply(&mut self.vertices[local], self.level)
            };
            if let Some(payload) = produced {
                self.output_queue.push(Update {
                    sender: global_id,
                    roundpar: self.update_roundpar,
                    barrier: false,
                    timestamp,
                    payload: Some(payload),
                });
            }
        } else if let Some(barrier) = self.pending_barrier.take() {
            self.output_queue.push(barrier);
        }
    }

    fn timestamp_for(&self, local: usize) -> u64 {
        self.last_msg_time[local] + self.latency.apply_latency()
    }

    /// Drains in-flight gathers, sweeps every currently-active vertex through
    /// apply in local-id order, then appends a synthetic apply-barrier — all
    /// synchronously, so the resulting Updates simply wait in `output_queue`
    /// for subsequent `get_update` calls to drain one at a time.
    pub fn barrier(&mut self, bm_roundpar: usize, num_channels: usize) {
        while !self.input_queue.is_empty() || !self.gather_inflight.is_empty() {
            self.gather_tick();
        }

        self.sweep = self
            .vertices
            .iter()
            .enumerate()
            .filter(|(_, e)| e.active)
            .map(|(i, _)| i)
            .collect();
        for &local in &self.sweep {
            self.vertices[local].active = false;
        }

        self.update_roundpar = (bm_roundpar + 1) % num_channels;
        self.level += 1;
        self.pending_barrier = Some(Update {
            sender: 0,
            roundpar: self.update_roundpar,
            barrier: true,
            timestamp: 0,
            payload: None,
        });

        while !self.sweep.is_empty() {
            self.apply_tick();
        }
        self.apply_tick();
    }

    pub fn is_idle(&self) -> bool {
        self.input_queue.is_empty() && self.gather_inflight.is_empty() && self.sweep.is_empty() && self.pending_barrier.is_none() && self.output_queue.is_empty()
    }

    fn log(&self, event: SimEvent) {
        if let Some(logger) = &self.logger {
            logger.log(event);
        }
    }
}
