//! Deterministic single-threaded host running an event source and a
//! synchronizer against in-memory channels.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use twin_core::config::SyncConfig;
use twin_core::constants::VERSION;
use twin_core::tracing_setup::{init_json_tracing, init_tracing};
use twin_core::traits::{Channel, Clock};
use twin_core::{SimTime, SituationId, TwinConfig, TwinResult, VirtualOperation};
use twin_evolution::{SituationArranger, SituationReasoner};
use twin_graph::SituationGraph;

use crate::channel::{DelayedChannel, ManualClock};
use crate::message::OccurrenceMessage;
use crate::reconciler::FidelityReport;
use crate::source::EventSource;
use crate::synchronizer::Synchronizer;

/// Timed callbacks. At equal times generation runs before the slice, and
/// the slice before expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Timer {
    Generate,
    Slice,
    Check,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub end_time: SimTime,
    pub generation_ticks: u64,
    pub slices: u64,
    pub total_operations: u64,
    pub total_situations: u64,
    pub actual_counters: BTreeMap<SituationId, u32>,
    pub twin_counters: BTreeMap<SituationId, u32>,
    pub virtual_operations: Vec<VirtualOperation>,
    pub fidelity: FidelityReport,
}

pub struct SimulationHost {
    source: EventSource,
    synchronizer: Synchronizer,
    clock: ManualClock,
    occurrences: DelayedChannel<OccurrenceMessage>,
    virtuals: DelayedChannel<VirtualOperation>,
    timers: BinaryHeap<Reverse<(SimTime, Timer)>>,
    sync: SyncConfig,
}

impl SimulationHost {
    /// Zero cycles are raised to 1 ms so timers always advance.
    pub fn new(source: EventSource, synchronizer: Synchronizer, mut sync: SyncConfig) -> Self {
        sync.event_cycle_ms = sync.event_cycle_ms.max(1);
        sync.slice_cycle_ms = sync.slice_cycle_ms.max(1);
        sync.check_cycle_ms = sync.check_cycle_ms.max(1);
        let mut timers = BinaryHeap::new();
        timers.push(Reverse((sync.event_cycle_ms, Timer::Generate)));
        timers.push(Reverse((sync.slice_cycle_ms, Timer::Slice)));
        timers.push(Reverse((sync.check_cycle_ms, Timer::Check)));
        Self {
            source,
            synchronizer,
            clock: ManualClock::new(),
            occurrences: DelayedChannel::new(sync.channel_latency_ms),
            virtuals: DelayedChannel::new(sync.channel_latency_ms),
            timers,
            sync,
        }
    }

    /// Build both engines over `graph` from the configuration. Installs the
    /// tracing subscriber at the configured level and format if none is
    /// installed yet.
    pub fn from_config(graph: Arc<SituationGraph>, config: &TwinConfig) -> TwinResult<Self> {
        if config.observability.json {
            init_json_tracing(&config.observability.log_level);
        } else {
            init_tracing(&config.observability.log_level);
        }
        let arranger = SituationArranger::new(Arc::clone(&graph), &config.arranger);
        let reasoner = SituationReasoner::new(graph, &config.reasoner)?;
        Ok(Self::new(
            EventSource::new(arranger),
            Synchronizer::new(reasoner, config.sync.slice_cycle_ms),
            config.sync.clone(),
        ))
    }

    pub fn source(&self) -> &EventSource {
        &self.source
    }

    pub fn synchronizer(&self) -> &Synchronizer {
        &self.synchronizer
    }

    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    /// Run until the configured end time and report.
    pub fn run(&mut self) -> TwinResult<RunReport> {
        let until = self.sync.run_until_ms;
        let mut generation_ticks = 0;
        let mut slices = 0;
        let mut virtual_operations = Vec::new();
        info!(
            version = VERSION,
            until,
            latency = self.occurrences.latency(),
            "simulation started"
        );

        loop {
            let next_timer = self.timers.peek().map(|Reverse((t, _))| *t);
            let next_delivery = self.occurrences.next_delivery();

            // Deliveries first when they are due no later than the next timer.
            if let Some(due) = next_delivery.filter(|d| next_timer.map_or(true, |t| *d <= t)) {
                if due > until {
                    break;
                }
                self.clock.advance_to(due);
                for message in self.occurrences.receive_due(due) {
                    self.synchronizer.receive(&message);
                }
                continue;
            }

            let Some(Reverse((time, timer))) = self.timers.pop() else {
                break;
            };
            if time > until {
                break;
            }
            self.clock.advance_to(time);

            match timer {
                Timer::Generate => {
                    self.source.generate(time, &mut self.occurrences);
                    generation_ticks += 1;
                    self.schedule(time + self.sync.event_cycle_ms, Timer::Generate);
                }
                Timer::Slice => {
                    for operation in self.synchronizer.on_slice(time)? {
                        self.virtuals.send(time, operation);
                    }
                    slices += 1;
                    self.schedule(time + self.sync.slice_cycle_ms, Timer::Slice);
                }
                Timer::Check => {
                    self.synchronizer.on_check(time);
                    self.schedule(time + self.sync.check_cycle_ms, Timer::Check);
                }
            }
            virtual_operations.extend(self.virtuals.receive_due(time));
        }

        let end_time = self.clock.now();
        virtual_operations.extend(self.virtuals.receive_due(until));

        let report = RunReport {
            end_time,
            generation_ticks,
            slices,
            total_operations: self.source.total_operations(),
            total_situations: self.source.total_situations(),
            actual_counters: self.source.arranger().state().counters(),
            twin_counters: self.synchronizer.reasoner().state().counters(),
            virtual_operations,
            fidelity: self.synchronizer.report(self.source.consistent_count()),
        };
        info!(
            end_time,
            generation_ticks,
            slices,
            operations = report.total_operations,
            situations = report.total_situations,
            occurrence_fidelity = report.fidelity.occurrence_fidelity,
            alignment_fidelity = report.fidelity.alignment_fidelity,
            "simulation finished"
        );
        Ok(report)
    }

    fn schedule(&mut self, time: SimTime, timer: Timer) {
        self.timers.push(Reverse((time, timer)));
    }
}

impl std::fmt::Debug for SimulationHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationHost")
            .field("now", &self.clock.now())
            .field("pending_timers", &self.timers.len())
            .field("in_flight", &self.occurrences.len())
            .finish_non_exhaustive()
    }
}
