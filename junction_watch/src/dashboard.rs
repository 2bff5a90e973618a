// THEORY:
// The `dashboard` module is the top-level, synchronous API of the engine. It
// owns every piece of display state (junctions, violation log, chat
// transcript) and exposes the handful of operations the view can trigger.
// Nothing in here sleeps or spawns; timing is the monitor's job. The delayed
// actions are therefore split into a "begin" half that runs immediately and a
// "complete" half the monitor calls once the delay has elapsed.
//
// Operations:
// 1.  **Refresh**: redraw every junction's live attributes, then maybe record
//     one violation.
// 2.  **Optimize signals**: begin (mark busy, reject a second request), then
//     complete (everything green, `Optimized`, 60 seconds).
// 3.  **Emergency override**: first junction green, all others red, zero wait.
// 4.  **Chat**: submit the operator's text now, generate the reply later.
// 5.  **Snapshot**: a serializable copy of everything for clients.

use crate::clock::{Clock, SystemClock};
use crate::config::DashboardConfig;
use crate::core_modules::chat::{ChatMessage, ChatTranscript, ReplyContext};
use crate::core_modules::junction::{Density, Junction, Signal, WaitTime, default_roster};
use crate::core_modules::violation::{Violation, ViolationLog};
use crate::error::{JunctionWatchError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

const OPTIMIZED_WAIT: WaitTime = WaitTime(60);
const EMERGENCY_WAIT: WaitTime = WaitTime(0);

/// Aggregates shown in the statistics panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub junctions: usize,
    pub total_vehicles: u32,
    pub average_wait_secs: f64,
    pub green_signals: usize,
    pub yellow_signals: usize,
    pub red_signals: usize,
    /// Violations currently on screen.
    pub violations_shown: usize,
    /// Violations recorded since startup.
    pub violations_total: u64,
    pub refresh_ticks: u64,
}

/// A serializable copy of the whole dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Bumped on every mutation; clients can skip snapshots they have seen.
    pub revision: u64,
    pub optimizing: bool,
    pub junctions: Vec<Junction>,
    pub violations: Vec<Violation>,
    pub chat: Vec<ChatMessage>,
    pub stats: Stats,
}

/// What a refresh tick changed.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshOutcome {
    pub tick: u64,
    pub violation: Option<Violation>,
}

pub struct Dashboard {
    config: DashboardConfig,
    junctions: Vec<Junction>,
    violations: ViolationLog,
    chat: ChatTranscript,
    rng: StdRng,
    clock: Arc<dyn Clock>,
    optimizing: bool,
    ticks: u64,
    revision: u64,
}

impl Dashboard {
    /// A dashboard over the default roster using local wall-clock time.
    pub fn new(config: DashboardConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: DashboardConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_junctions(config, clock, default_roster())
    }

    /// Invalid config fields fall back to their defaults with a warning.
    pub fn with_junctions(config: DashboardConfig, clock: Arc<dyn Clock>, junctions: Vec<Junction>) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                warn!(error = %err, "using defaults for invalid dashboard settings");
                config.repaired()
            }
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let chat = ChatTranscript::with_greeting(clock.time_label());
        let violations = ViolationLog::new(config.violation_capacity);
        Self { config, junctions, violations, chat, rng, clock, optimizing: false, ticks: 0, revision: 0 }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }

    pub fn junction(&self, id: &str) -> Result<&Junction> {
        self.junctions
            .iter()
            .find(|j| j.id == id)
            .ok_or_else(|| JunctionWatchError::UnknownJunction(id.to_string()))
    }

    pub fn violations(&self) -> &ViolationLog {
        &self.violations
    }

    pub fn chat(&self) -> &ChatTranscript {
        &self.chat
    }

    pub fn is_optimizing(&self) -> bool {
        self.optimizing
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// One timer tick: new readings for every junction, then maybe a violation.
    pub fn refresh(&mut self) -> RefreshOutcome {
        self.refresh_junctions();
        let violation = self.maybe_record_violation();
        self.ticks += 1;
        debug!(
            tick = self.ticks,
            total_vehicles = self.stats().total_vehicles,
            violation = violation.as_ref().map(|v| v.kind.label()),
            "dashboard refreshed"
        );
        RefreshOutcome { tick: self.ticks, violation }
    }

    /// Replaces density, signal, vehicle count and wait time on every junction.
    pub fn refresh_junctions(&mut self) {
        let hour = self.clock.hour();
        let strategy = self.config.strategy;
        for junction in &mut self.junctions {
            strategy.draw(junction, hour, &mut self.rng).apply_to(junction);
        }
        self.touch();
    }

    /// Records a synthetic violation. The chance comes from the refresh strategy.
    pub fn maybe_record_violation(&mut self) -> Option<Violation> {
        let hour = self.clock.hour();
        let probability = self.config.strategy.violation_probability(self.config.violation_probability, hour);
        if !self.rng.gen_bool(probability) {
            return None;
        }
        let names: Vec<&str> = self.junctions.iter().map(|j| j.name.as_str()).collect();
        let violation = Violation::synthesize(&mut self.rng, &names, self.clock.time_label())?;
        self.violations.record(violation.clone());
        self.touch();
        Some(violation)
    }

    /// Marks an optimization as running. Fails if one already is.
    pub fn begin_optimization(&mut self) -> Result<()> {
        if self.optimizing {
            return Err(JunctionWatchError::OptimizationInProgress);
        }
        self.optimizing = true;
        self.touch();
        info!("signal optimization started");
        Ok(())
    }

    /// Finishes an optimization: every signal green, density `Optimized`.
    pub fn complete_optimization(&mut self) {
        for junction in &mut self.junctions {
            junction.signal = Signal::Green;
            junction.density = Density::Optimized;
            junction.wait_time = OPTIMIZED_WAIT;
        }
        self.optimizing = false;
        self.touch();
        info!(junctions = self.junctions.len(), "signal optimization complete");
    }

    /// Gives the first junction right of way and holds every other one.
    pub fn emergency_override(&mut self) {
        for (i, junction) in self.junctions.iter_mut().enumerate() {
            junction.signal = if i == 0 { Signal::Green } else { Signal::Red };
            junction.density = Density::Emergency;
            junction.wait_time = EMERGENCY_WAIT;
        }
        self.touch();
        info!(priority = self.junctions.first().map(|j| j.name.as_str()), "emergency override applied");
    }

    /// Appends an operator message; blank input is ignored.
    pub fn submit_chat(&mut self, text: &str) -> Option<ChatMessage> {
        let timestamp = self.clock.time_label();
        let message = self.chat.submit(text, timestamp)?.clone();
        self.touch();
        Some(message)
    }

    /// Appends the assistant's answer to `prompt`.
    pub fn generate_reply(&mut self, prompt: &str) -> ChatMessage {
        let context = ReplyContext {
            junction_names: self.junctions.iter().map(|j| j.name.clone()).collect(),
            violation_count: self.violations.len(),
        };
        let text = self.config.replies.compose(prompt, &context, &mut self.rng);
        let timestamp = self.clock.time_label();
        let message = self.chat.reply(text, timestamp).clone();
        self.touch();
        message
    }

    pub fn stats(&self) -> Stats {
        let count = |signal: Signal| self.junctions.iter().filter(|j| j.signal == signal).count();
        let total_wait: u32 = self.junctions.iter().map(|j| j.wait_time.seconds()).sum();
        Stats {
            junctions: self.junctions.len(),
            total_vehicles: self.junctions.iter().map(|j| j.vehicles).sum(),
            average_wait_secs: if self.junctions.is_empty() {
                0.0
            } else {
                total_wait as f64 / self.junctions.len() as f64
            },
            green_signals: count(Signal::Green),
            yellow_signals: count(Signal::Yellow),
            red_signals: count(Signal::Red),
            violations_shown: self.violations.len(),
            violations_total: self.violations.total_recorded(),
            refresh_ticks: self.ticks,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            revision: self.revision,
            optimizing: self.optimizing,
            junctions: self.junctions.clone(),
            violations: self.violations.to_vec(),
            chat: self.chat.messages().to_vec(),
            stats: self.stats(),
        }
    }

    pub fn time_label(&self) -> String {
        self.clock.time_label()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }
}
