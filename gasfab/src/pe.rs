//! The per-PE wrapper that couples ApplyKernel and ScatterKernel, and
//! enforces the protocol invariants each incoming Message and outgoing
//! Update must satisfy.
//!
//! Grounded on `sim/core/apply.cpp` (`verifyIncomingMessage`/`receiveMessage`)
//! and `sim/core/pe.cpp` (the tick/getSentMessage/putMessageToReceive shape).

use crate::apply_kernel::ApplyKernel;
use crate::config::FabricConfig;
use crate::error::SimError;
use crate::graph::{Graph, Partition};
use crate::logging::SimEvent;
use crate::message::{Message, Update, VertexEntry};
use crate::scatter_kernel::ScatterWrapper;
use crate::vertex_program::VertexProgram;
use gasfab_comm::{Pull, Push, Queue};
use gasfab_logging::Logger;

/// Wraps [`ApplyKernel`] with the two counters and the protocol checks the
/// reference's `Apply` class performs: every incoming non-barrier message's
/// round must match the PE's current level, the gap between received and
/// emitted barriers never exceeds one, and every emitted Update's round must
/// match the emitted-barrier count.
struct ApplyWrapper<P: VertexProgram> {
    kernel: ApplyKernel<P>,
    level: usize,
    update_level: usize,
    pe_id: usize,
}

impl<P: VertexProgram> ApplyWrapper<P> {
    fn receive_message(
        &mut self,
        message: Option<Message<P::MessagePayload>>,
        partition: &Partition,
        config: &FabricConfig,
    ) -> Result<Option<Update<P::UpdatePayload>>, SimError> {
        if let Some(message) = message {
            self.verify_incoming(&message, partition, config)?;
            if message.barrier {
                self.kernel.barrier(message.roundpar, config.num_channels);
                self.level += 1;
            } else {
                let local = partition.local_id(message.dest_id) as usize;
                self.kernel.queue_input(message, local, self.level);
            }
        }

        let update = self.kernel.get_update();
        if let Some(update) = &update {
            if update.barrier {
                self.update_level += 1;
                if self.update_level > self.level {
                    return Err(SimError::Protocol {
                        pe: self.pe_id,
                        detail: "surplus apply-barrier: update_level exceeds level".into(),
                    });
                }
            } else if update.roundpar != self.update_level % config.num_channels {
                return Err(SimError::Protocol {
                    pe: self.pe_id,
                    detail: format!(
                        "update round {} does not match expected round {}",
                        update.roundpar,
                        self.update_level % config.num_channels
                    ),
                });
            }
        }
        Ok(update)
    }

    fn verify_incoming(&self, message: &Message<P::MessagePayload>, partition: &Partition, config: &FabricConfig) -> Result<(), SimError> {
        if message.barrier {
            return Ok(());
        }
        if partition.local_id(message.dest_id) >= config.max_vertices_per_pe {
            return Err(SimError::Protocol {
                pe: self.pe_id,
                detail: format!("message addressed to nonexistent vertex {}", message.dest_id),
            });
        }
        let expected = (self.level + config.num_channels - 1) % config.num_channels;
        if message.roundpar != expected {
            return Err(SimError::Protocol {
                pe: self.pe_id,
                detail: format!("message round {} does not match expected round {expected}", message.roundpar),
            });
        }
        Ok(())
    }
}

/// One Processing Element: input/output Message queues around an
/// [`ApplyWrapper`] and a [`ScatterWrapper`].
pub struct PE<P: VertexProgram> {
    pub id: usize,
    input_queue: Queue<Message<P::MessagePayload>>,
    output_queue: Queue<Message<P::MessagePayload>>,
    apply: ApplyWrapper<P>,
    scatter: ScatterWrapper<P>,
    updates_this_superstep: u64,
    messages_this_superstep: u64,
    max_timestamp: u64,
}

impl<P: VertexProgram> PE<P> {
    pub fn new(id: usize, vertices: Vec<VertexEntry<P::VertexData>>, config: &FabricConfig, logger: Option<Logger<SimEvent>>) -> Self {
        let kernel = ApplyKernel::new(id, vertices, config.latency_model, logger);
        PE {
            id,
            input_queue: Queue::new(),
            output_queue: Queue::new(),
            apply: ApplyWrapper { kernel, level: 0, update_level: 0, pe_id: id },
            scatter: ScatterWrapper::new(id, config.num_pe, config.latency_model.scatter_latency()),
            updates_this_superstep: 0,
            messages_this_superstep: 0,
            max_timestamp: 0,
        }
    }

    /// Pops one inbound Message (if any), routes it through Apply, forwards
    /// any resulting Update to Scatter, and enqueues any resulting Message.
    pub fn tick(&mut self, partition: &Partition, graph: &Graph<P::EdgeData>, config: &FabricConfig) -> Result<(), SimError> {
        let message = self.input_queue.pull();
        let update = self.apply.receive_message(message, partition, config)?;
        if let Some(update) = &update {
            if !update.barrier {
                self.updates_this_superstep += 1;
            }
        }

        let outgoing = self.scatter.receive_update(update, partition, graph, config)?;
        if let Some(message) = outgoing {
            if !message.barrier {
                self.messages_this_superstep += 1;
                self.max_timestamp = self.max_timestamp.max(message.timestamp);
            }
            self.output_queue.push(message);
        }
        Ok(())
    }

    /// Pops the head of the output queue, if any.
    pub fn get_sent_message(&mut self) -> Option<Message<P::MessagePayload>> {
        self.output_queue.pull()
    }

    pub fn put_message_to_receive(&mut self, message: Message<P::MessagePayload>) {
        self.input_queue.push(message);
    }

    /// Returns and resets this superstep's (non-barrier update, non-barrier
    /// message) counts, for the driver's per-superstep diagnostics.
    pub fn take_superstep_counts(&mut self) -> (u64, u64) {
        let counts = (self.updates_this_superstep, self.messages_this_superstep);
        self.updates_this_superstep = 0;
        self.messages_this_superstep = 0;
        counts
    }

    pub fn max_timestamp(&self) -> u64 {
        self.max_timestamp
    }

    pub fn vertex_data(&self, local: usize) -> &P::VertexData {
        &self.apply.kernel.vertex(local).data
    }

    pub fn is_idle(&self) -> bool {
        self.input_queue.is_empty() && self.output_queue.is_empty() && self.apply.kernel.is_idle() && self.scatter.is_idle()
    }
}
