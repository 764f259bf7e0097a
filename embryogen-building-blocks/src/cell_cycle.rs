//! Concrete bookkeeping for the eight-phase cell cycle (§4.4): samples a
//! Gaussian-jittered duration per phase and drives an agent's
//! `start`/`run`/`close` hooks as simulated time passes the next
//! scheduled change.

use embryogen_concepts::cycle::{Cycle, CyclePhase, DivisionEvent};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Relative standard deviation applied to every phase's nominal duration
/// (§4.4: `Gauss(nominal, 0.06*nominal)`).
pub const DURATION_JITTER_FRACTION: f64 = 0.06;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellCycle {
    pub full_cycle_length: f64,
    pub current_phase: CyclePhase,
    pub phase_started_at: f64,
    pub next_change_at: f64,
}

/// An inert placeholder cycle, used only as the momentary hole left by
/// [`std::mem::take`] while an agent's own cycle is being advanced (see
/// e.g. `Nucleus::advance_cycle`) — never observed by any hook.
impl Default for CellCycle {
    fn default() -> Self {
        CellCycle {
            full_cycle_length: 0.0,
            current_phase: CyclePhase::G1,
            phase_started_at: 0.0,
            next_change_at: 0.0,
        }
    }
}

impl CellCycle {
    /// Constructs a cycle already in `G1`, with the entry hook not yet
    /// invoked — callers typically call `C::on_phase_start` themselves
    /// right after construction to mirror the agent's own init.
    pub fn new(full_cycle_length: f64, rng: &mut ChaCha8Rng) -> Self {
        let duration = sample_phase_duration(full_cycle_length, CyclePhase::G1, rng);
        CellCycle {
            full_cycle_length,
            current_phase: CyclePhase::G1,
            phase_started_at: 0.0,
            next_change_at: duration,
        }
    }

    /// Advances the cycle to simulated time `t`, firing `close`/`start`
    /// hooks for every phase boundary crossed (there can be more than one
    /// if `dt` is large relative to a phase's duration) and finally the
    /// `run` hook for the phase now current. Returns `Some(DivisionEvent)`
    /// if `Cytokinesis` was just closed.
    ///
    /// Callers whose agent type embeds its own `CellCycle` field must
    /// `std::mem::take` it out into `self` before calling this (see e.g.
    /// `Nucleus::advance_cycle`) so that `self` and `agent` never alias.
    pub fn advance<A, C: Cycle<A>>(&mut self, agent: &mut A, rng: &mut ChaCha8Rng, t: f64) -> Option<DivisionEvent> {
        let mut division = None;
        while t > self.next_change_at {
            C::on_phase_close(agent, self.current_phase);
            if self.current_phase == CyclePhase::Cytokinesis {
                division = Some(DivisionEvent);
            }
            self.current_phase = self.current_phase.next();
            let duration = sample_phase_duration(self.full_cycle_length, self.current_phase, rng);
            self.phase_started_at = self.next_change_at;
            self.next_change_at += duration;
            C::on_phase_start(agent, self.current_phase, duration);
        }

        let span = self.next_change_at - self.phase_started_at;
        let progress = if span > 0.0 {
            ((t - self.phase_started_at) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        C::on_phase_run(agent, self.current_phase, progress);
        division
    }
}

fn sample_phase_duration(full_cycle_length: f64, phase: CyclePhase, rng: &mut ChaCha8Rng) -> f64 {
    let nominal = full_cycle_length * phase.default_fraction();
    let std_dev = DURATION_JITTER_FRACTION * nominal;
    if std_dev <= 0.0 {
        return nominal;
    }
    let dist = Normal::new(nominal, std_dev).expect("nominal duration is always positive");
    dist.sample(rng).max(nominal * 0.1)
}

/// Convenience for scenarios that just want "a plausible starting jitter"
/// without driving the full state machine (used by test fixtures).
pub fn jittered_duration(nominal: f64, rng: &mut ChaCha8Rng) -> f64 {
    let std_dev = DURATION_JITTER_FRACTION * nominal;
    rng.gen_range((nominal - std_dev)..=(nominal + std_dev)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    struct NullAgent;
    struct NullHooks;
    impl Cycle<NullAgent> for NullHooks {
        fn on_phase_start(_agent: &mut NullAgent, _phase: CyclePhase, _phase_duration: f64) {}
        fn on_phase_run(_agent: &mut NullAgent, _phase: CyclePhase, _progress: f64) {}
        fn on_phase_close(_agent: &mut NullAgent, _phase: CyclePhase) {}
    }

    #[test]
    fn advancing_past_every_phase_reaches_cytokinesis_then_wraps() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut cycle = CellCycle::new(3.0, &mut rng);
        let mut agent = NullAgent;
        let mut divisions = 0;
        let mut t = 0.0;
        for _ in 0..2000 {
            t += 0.01;
            if cycle
                .advance::<NullAgent, NullHooks>(&mut agent, &mut rng, t)
                .is_some()
            {
                divisions += 1;
            }
        }
        assert!(divisions >= 1, "a 3-minute cycle over 20 sim-minutes should divide at least once");
    }
}
