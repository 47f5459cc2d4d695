//! Converts each Update into one Message per out-edge, and fans a barrier
//! Update out into one barrier Message per destination PE.
//!
//! Grounded on `sim/core/basescatterkernel.{h,cpp}` (the `ScatterKernelInput`
//! queue shape and one-entry-per-tick draining) and `sim/core/scatter.{h,cpp}`
//! (the per-update edge enumeration and `in_level`/`out_level` superstep-order
//! checks, wrapped around the raw kernel the same way the Apply wrapper sits
//! around the raw ApplyKernel).

use std::rc::Rc;

use crate::config::FabricConfig;
use crate::error::SimError;
use crate::graph::{Graph, Partition};
use crate::message::{Message, Update};
use crate::vertex_program::VertexProgram;
use gasfab_comm::{Pull, Push, Queue};

enum Destination<E> {
    Edge { dest: u64, data: E, num_neighbors: usize },
    Pe { dest_pe: usize, advertised: u64 },
}

struct ScatterInput<P: VertexProgram> {
    update: Rc<Update<P::UpdatePayload>>,
    destination: Destination<P::EdgeData>,
    last: bool,
}

/// The raw per-edge fan-out stage: one `(Update, destination)` tuple in, at
/// most one `Message` out, one input consumed per `tick`. Returns whether
/// the consumed input was the last of its group (last out-edge, or last
/// destination PE of a barrier broadcast), so the wrapper can tell a
/// completed broadcast from a partial one.
pub struct ScatterKernel<P: VertexProgram> {
    input_queue: Queue<ScatterInput<P>>,
    latency: u64,
}

impl<P: VertexProgram> ScatterKernel<P> {
    pub fn new(latency: u64) -> Self {
        ScatterKernel { input_queue: Queue::new(), latency }
    }

    fn queue_edge(&mut self, update: Rc<Update<P::UpdatePayload>>, dest: u64, data: P::EdgeData, num_neighbors: usize, last: bool) {
        self.input_queue.push(ScatterInput { update, destination: Destination::Edge { dest, data, num_neighbors }, last });
    }

    fn queue_barrier_to(&mut self, update: Rc<Update<P::UpdatePayload>>, dest_pe: usize, advertised: u64, last: bool) {
        self.input_queue.push(ScatterInput { update, destination: Destination::Pe { dest_pe, advertised }, last });
    }

    pub fn tick(&mut self, partition: &Partition, config: &FabricConfig) -> Option<(Message<P::MessagePayload>, bool)> {
        let input = self.input_queue.pull()?;
        let last = input.last;

        match input.destination {
            Destination::Pe { dest_pe, advertised } => Some((
                Message {
                    sender: 0,
                    dest_id: advertised,
                    dest_pe,
                    dest_fpga: dest_pe % config.num_fpga,
                    roundpar: input.update.roundpar,
                    barrier: true,
                    timestamp: input.update.timestamp,
                    payload: None,
                },
                last,
            )),
            Destination::Edge { dest, data, num_neighbors } => {
                let payload = P::scatter(&input.update, &data, num_neighbors)?;
                let dest_pe = partition.pe_id(dest);
                Some((
                    Message {
                        sender: input.update.sender,
                        dest_id: dest,
                        dest_pe,
                        dest_fpga: dest_pe % config.num_fpga,
                        roundpar: input.update.roundpar,
                        barrier: false,
                        timestamp: input.update.timestamp + self.latency,
                        payload: Some(payload),
                    },
                    last,
                ))
            }
        }
    }
}

/// Wraps [`ScatterKernel`] with per-update edge enumeration and the
/// `in_level`/`out_level` superstep-order checks the reference's `Scatter`
/// class performs around its raw kernel.
pub struct ScatterWrapper<P: VertexProgram> {
    kernel: ScatterKernel<P>,
    in_level: usize,
    out_level: usize,
    pe_id: usize,
    num_pe: usize,
    /// Non-barrier messages sent to each destination PE so far this round;
    /// snapshotted into the barrier broadcast's `dest_id` (advertised count)
    /// and reset when the round closes.
    sent_to: Vec<u64>,
}

impl<P: VertexProgram> ScatterWrapper<P> {
    pub fn new(pe_id: usize, num_pe: usize, latency: u64) -> Self {
        ScatterWrapper { kernel: ScatterKernel::new(latency), in_level: 0, out_level: 0, pe_id, num_pe, sent_to: vec![0; num_pe] }
    }

    pub fn receive_update(
        &mut self,
        update: Option<Update<P::UpdatePayload>>,
        partition: &Partition,
        graph: &Graph<P::EdgeData>,
        config: &FabricConfig,
    ) -> Result<Option<Message<P::MessagePayload>>, SimError> {
        if let Some(update) = update {
            if update.barrier {
                let advertised = std::mem::replace(&mut self.sent_to, vec![0; self.num_pe]);
                let rc = Rc::new(update);
                for dest_pe in 0..self.num_pe {
                    self.kernel.queue_barrier_to(Rc::clone(&rc), dest_pe, advertised[dest_pe], dest_pe + 1 == self.num_pe);
                }
                self.in_level += 1;
            } else {
                let origin = partition.origin_of(update.sender);
                let neighbors = graph.neighbors(origin);
                let n = neighbors.len();
                if n > 0 {
                    let rc = Rc::new(update);
                    for (i, (dest_origin, edge_data)) in neighbors.iter().enumerate() {
                        let dest_global = partition.placement(*dest_origin);
                        let last = i + 1 == n;
                        self.kernel.queue_edge(Rc::clone(&rc), dest_global, edge_data.clone(), n, last);
                    }
                }
                // n == 0: this update has no out-edges to scatter along, and is
                // simply dropped (no ScatterKernelInput queued for it).
            }
        }

        let ticked = self.kernel.tick(partition, config);
        let message = match ticked {
            None => return Ok(None),
            Some((message, last)) => {
                if message.barrier {
                    if last {
                        self.out_level += 1;
                        if self.out_level != self.in_level {
                            return Err(SimError::Protocol {
                                pe: self.pe_id,
                                detail: "superstep order not respected in scatter".into(),
                            });
                        }
                    }
                } else if message.roundpar != self.out_level % config.num_channels {
                    return Err(SimError::Protocol {
                        pe: self.pe_id,
                        detail: format!(
                            "scattered message round {} does not match expected round {}",
                            message.roundpar,
                            self.out_level % config.num_channels
                        ),
                    });
                } else {
                    self.sent_to[message.dest_pe] += 1;
                }
                message
            }
        };
        Ok(Some(message))
    }

    pub fn is_idle(&self) -> bool {
        self.kernel.input_queue.is_empty()
    }
}
