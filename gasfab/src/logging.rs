//! The typed events this simulator logs, and a stderr subscriber for them.
//!
//! Grounded on the teacher's `logging::Logger`/`Registry` pattern
//! (`logging/src/lib.rs`) and the reference's per-superstep `printf`
//! diagnostics (`sim/sim_main.cpp`), recast as structured events instead of
//! ad hoc formatted strings.

use gasfab_logging::{Logger, Registry};

#[derive(Debug, Clone)]
pub enum SimEvent {
    SuperstepSummary {
        superstep: usize,
        total_messages: u64,
        per_pe_updates: Vec<u64>,
        per_pe_messages: Vec<u64>,
        imbalance_percent: f64,
    },
    KernelAnomaly {
        pe: usize,
        detail: String,
    },
    ProtocolViolation {
        pe: usize,
        detail: String,
    },
    Termination {
        supersteps: usize,
        cycles: u64,
        num_messages_sent: u64,
        inter_fpga_transports: u64,
        max_timestamp: u64,
    },
}

/// Registers a stream named `"sim"` that formats each event to stderr, and
/// hands back a `Logger` handle for it.
pub fn install_stderr_subscriber(registry: &mut Registry) -> Logger<SimEvent> {
    registry.insert::<SimEvent>("sim", |_elapsed, events| {
        for (_, event) in events {
            match event {
                SimEvent::SuperstepSummary { superstep, total_messages, per_pe_updates, per_pe_messages, imbalance_percent } => {
                    eprintln!(
                        "superstep {superstep}: {total_messages} messages, updates={per_pe_updates:?}, messages={per_pe_messages:?}, imbalance={imbalance_percent:.1}%"
                    );
                }
                SimEvent::KernelAnomaly { pe, detail } => {
                    eprintln!("kernel anomaly at pe {pe}: {detail}");
                }
                SimEvent::ProtocolViolation { pe, detail } => {
                    eprintln!("protocol violation at pe {pe}: {detail}");
                }
                SimEvent::Termination { supersteps, cycles, num_messages_sent, inter_fpga_transports, max_timestamp } => {
                    eprintln!(
                        "done: {supersteps} supersteps, {cycles} cycles, {num_messages_sent} messages sent, {inter_fpga_transports} inter-FPGA transports, max timestamp {max_timestamp}"
                    );
                }
            }
        }
    });
    registry.get::<SimEvent>("sim").expect("just inserted")
}
