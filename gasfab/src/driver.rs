//! The main simulation loop: one outer iteration per simulated cycle, fixed
//! PE-id visitation order, cooperative (not threaded) concurrency.
//!
//! Grounded on `sim/sim_main.cpp`'s top-level `while` loop (tick every PE,
//! drain the network, feed every arbiter, repeat) and its end-of-run summary
//! printout, recast as a library entry point returning a [`SimulationReport`]
//! instead of writing straight to stdout.

use std::collections::HashMap;

use gasfab_logging::{Logger, Registry};

use crate::arbiter::Arbiter;
use crate::config::FabricConfig;
use crate::error::SimError;
use crate::graph::{Graph, Partition};
use crate::logging::{self, SimEvent};
use crate::message::{Message, VertexEntry, VertexId};
use crate::network::Network;
use crate::pe::PE;
use crate::vertex_program::VertexProgram;

/// Final counters reported once the fabric has gone fully quiescent.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub supersteps: usize,
    pub cycles: u64,
    pub num_messages_sent: u64,
    pub inter_fpga_transports: u64,
    pub max_timestamp: u64,
}

pub struct SimulationDriver<P: VertexProgram> {
    config: FabricConfig,
    partition: Partition,
    graph: Graph<P::EdgeData>,
    pes: Vec<PE<P>>,
    arbiters: Vec<Arbiter<P::MessagePayload>>,
    network: Network<P::MessagePayload>,
    cycle: u64,
    superstep: usize,
    barriers_closed: Vec<usize>,
    pending_summary: HashMap<usize, Vec<(usize, u64, u64)>>,
    done: bool,
    logger: Option<Logger<SimEvent>>,
}

impl<P: VertexProgram> SimulationDriver<P> {
    /// Builds one PE per fabric slot, initializes every vertex it owns via
    /// [`VertexProgram::init_vertex`], seeds `source`'s initial messages
    /// directly into their destination PEs' input queues (bypassing the
    /// arbiter, exactly as the reference's host-side injection does), and
    /// primes every PE with an initial barrier so the first superstep can
    /// close.
    pub fn new(graph: Graph<P::EdgeData>, config: FabricConfig, source: VertexId, registry: &mut Registry) -> Result<Self, SimError> {
        let partition = Partition::new(config.num_pe, config.max_vertices_per_pe);
        let logger = if config.report {
            Some(logging::install_stderr_subscriber(registry))
        } else {
            None
        };

        let mut pes = Vec::with_capacity(config.num_pe);
        for pe_id in 0..config.num_pe {
            let mut vertices = vec![VertexEntry::new(0); config.max_vertices_per_pe as usize];
            for origin in 0..graph.num_vertices() as VertexId {
                let global = partition.placement(origin);
                if partition.pe_id(global) != pe_id {
                    continue;
                }
                let local = partition.local_id(global) as usize;
                if local >= vertices.len() {
                    return Err(SimError::GraphShape(format!(
                        "vertex {origin} needs local slot {local}, exceeds max_vertices_per_pe={}",
                        config.max_vertices_per_pe
                    )));
                }
                let mut entry = VertexEntry::new(global);
                P::init_vertex(&mut entry, origin, &graph);
                vertices[local] = entry;
            }
            pes.push(PE::new(pe_id, vertices, &config, logger.clone()));
        }

        let arbiters = (0..config.num_pe).map(|_| Arbiter::new(config.num_pe, config.num_channels)).collect();
        let network = Network::new(config.num_pe, config.num_fpga);
        let barriers_closed = vec![0; config.num_pe];

        let mut driver = SimulationDriver {
            config,
            partition,
            graph,
            pes,
            arbiters,
            network,
            cycle: 0,
            superstep: 0,
            barriers_closed,
            pending_summary: HashMap::new(),
            done: false,
            logger,
        };
        driver.seed(source)?;
        Ok(driver)
    }

    fn seed(&mut self, source: VertexId) -> Result<(), SimError> {
        // Level 0's only valid incoming round is num_channels - 1 (pe.rs's
        // verify_incoming expects `(level + num_channels - 1) % num_channels`,
        // and ApplyKernel::barrier advances update_roundpar by one per
        // barrier), so superstep-0's injected messages and closing barrier
        // must carry that round for their Updates to land on round 0.
        let init_roundpar = self.config.num_channels - 1;
        for (dest_origin, payload) in P::send_init_messages(&self.graph, &self.partition, source) {
            let dest_global = self.partition.placement(dest_origin);
            let dest_pe = self.partition.pe_id(dest_global);
            let message = Message {
                sender: self.partition.placement(source),
                dest_id: dest_global,
                dest_pe,
                dest_fpga: dest_pe % self.config.num_fpga,
                roundpar: init_roundpar,
                barrier: false,
                timestamp: 0,
                payload: Some(payload),
            };
            self.pes[dest_pe].put_message_to_receive(message);
        }
        for pe in &mut self.pes {
            pe.put_message_to_receive(Message {
                sender: 0,
                dest_id: 0,
                dest_pe: 0,
                dest_fpga: 0,
                roundpar: init_roundpar,
                barrier: true,
                timestamp: 0,
                payload: None,
            });
        }
        Ok(())
    }

    /// Records one PE's just-closed superstep counts, and once every PE has
    /// reported in for the same round, logs a consolidated summary.
    fn close_superstep_for(&mut self, pe_id: usize) {
        let (updates, messages) = self.pes[pe_id].take_superstep_counts();
        let round = self.barriers_closed[pe_id];
        self.barriers_closed[pe_id] += 1;

        let entry = self.pending_summary.entry(round).or_default();
        entry.push((pe_id, updates, messages));
        if entry.len() != self.config.num_pe {
            return;
        }
        let entry = self.pending_summary.remove(&round).expect("just matched len");

        let mut per_pe_updates = vec![0u64; self.config.num_pe];
        let mut per_pe_messages = vec![0u64; self.config.num_pe];
        for (pid, u, m) in entry {
            per_pe_updates[pid] = u;
            per_pe_messages[pid] = m;
        }
        let total_messages: u64 = per_pe_messages.iter().sum();
        let total_updates: u64 = per_pe_updates.iter().sum();
        let max_m = *per_pe_messages.iter().max().unwrap_or(&0) as f64;
        let min_m = *per_pe_messages.iter().min().unwrap_or(&0) as f64;
        let imbalance_percent = if max_m > 0.0 { (max_m - min_m) / max_m * 100.0 } else { 0.0 };

        self.superstep = self.superstep.max(round + 1);
        // No update anywhere produced a message this round: the fabric has
        // converged and every subsequent round would be identically empty,
        // so this is the last barrier the driver will feed back to any PE.
        if total_updates == 0 && total_messages == 0 {
            self.done = true;
        }
        if let Some(logger) = &self.logger {
            logger.log(SimEvent::SuperstepSummary {
                superstep: round,
                total_messages,
                per_pe_updates,
                per_pe_messages,
                imbalance_percent,
            });
        }
    }

    fn quiescent(&self) -> bool {
        self.pes.iter().all(|pe| pe.is_idle()) && self.network.is_idle() && self.arbiters.iter().all(|a| a.is_idle())
    }

    /// Runs the fabric to quiescence: tick every PE in id order, route each
    /// PE's emitted message through the network, pump the network one hop,
    /// deliver arrived messages into the destination's arbiter, then feed
    /// each PE the next arbiter-ordered message (or barrier) for its next
    /// tick.
    pub fn run(&mut self) -> Result<SimulationReport, SimError> {
        loop {
            self.cycle += 1;

            for pe_id in 0..self.config.num_pe {
                self.pes[pe_id].tick(&self.partition, &self.graph, &self.config)?;
            }

            for pe_id in 0..self.config.num_pe {
                while let Some(message) = self.pes[pe_id].get_sent_message() {
                    self.network.put_message_at(pe_id, message);
                }
            }

            self.network.tick();

            for pe_id in 0..self.config.num_pe {
                while let Some((source_pe, message)) = self.network.get_message_at(pe_id) {
                    self.arbiters[pe_id].put_message(source_pe, message);
                }
            }

            for pe_id in 0..self.config.num_pe {
                while let Some(message) = self.arbiters[pe_id].get_message() {
                    let closed_barrier = message.barrier;
                    self.pes[pe_id].put_message_to_receive(message);
                    if closed_barrier {
                        self.close_superstep_for(pe_id);
                    }
                }
            }

            if self.done || self.quiescent() {
                break;
            }
        }

        self.log_termination();
        Ok(SimulationReport {
            supersteps: self.superstep,
            cycles: self.cycle,
            num_messages_sent: self.network.num_messages_sent(),
            inter_fpga_transports: self.network.inter_fpga_transports(),
            max_timestamp: self.pes.iter().map(|pe| pe.max_timestamp()).max().unwrap_or(0),
        })
    }

    fn log_termination(&self) {
        if let Some(logger) = &self.logger {
            logger.log(SimEvent::Termination {
                supersteps: self.superstep,
                cycles: self.cycle,
                num_messages_sent: self.network.num_messages_sent(),
                inter_fpga_transports: self.network.inter_fpga_transports(),
                max_timestamp: self.pes.iter().map(|pe| pe.max_timestamp()).max().unwrap_or(0),
            });
            logger.flush();
        }
    }

    pub fn vertex_data(&self, origin: VertexId) -> Option<&P::VertexData> {
        let global = self.partition.placement(origin);
        let pe_id = self.partition.pe_id(global);
        let local = self.partition.local_id(global) as usize;
        self.pes.get(pe_id).map(|pe| pe.vertex_data(local))
    }
}
