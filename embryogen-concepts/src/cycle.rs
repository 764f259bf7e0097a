//! The eight-phase cell-cycle state machine (§4.4).
//!
//! Mirrors the teacher's `Cycle<Self, Float>` trait shape (a trait generic
//! over the owning agent type, implemented by the agent on itself) but
//! specialised to embryogen's fixed eight-phase order rather than an
//! open-ended set of cycle events.

use serde::{Deserialize, Serialize};

/// One of the eight fixed phases a nucleus cycles through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CyclePhase {
    G1,
    S,
    G2,
    Prophase,
    Metaphase,
    Anaphase,
    Telophase,
    Cytokinesis,
}

impl CyclePhase {
    pub const ALL_IN_ORDER: [CyclePhase; 8] = [
        CyclePhase::G1,
        CyclePhase::S,
        CyclePhase::G2,
        CyclePhase::Prophase,
        CyclePhase::Metaphase,
        CyclePhase::Anaphase,
        CyclePhase::Telophase,
        CyclePhase::Cytokinesis,
    ];

    /// Default fraction of the full cycle length this phase nominally
    /// occupies (§4.4's table).
    pub fn default_fraction(&self) -> f64 {
        match self {
            CyclePhase::G1 => 0.50,
            CyclePhase::S => 0.30,
            CyclePhase::G2 => 0.15,
            CyclePhase::Prophase => 0.0125,
            CyclePhase::Metaphase => 0.0285,
            CyclePhase::Anaphase => 0.0025,
            CyclePhase::Telophase => 0.00325,
            CyclePhase::Cytokinesis => 0.00325,
        }
    }

    pub fn next(&self) -> CyclePhase {
        let idx = CyclePhase::ALL_IN_ORDER
            .iter()
            .position(|p| p == self)
            .unwrap();
        CyclePhase::ALL_IN_ORDER[(idx + 1) % CyclePhase::ALL_IN_ORDER.len()]
    }

    /// Phases at or beyond `Prophase` count as "in mitosis" for the
    /// stability-guard exemption in §4.2.2.
    pub fn is_mitotic(&self) -> bool {
        !matches!(self, CyclePhase::G1 | CyclePhase::S | CyclePhase::G2)
    }
}

/// A division-worthy event raised by [`Cycle::advance`]: the cycle just
/// closed out `Cytokinesis` and the owning agent must be split into two
/// daughters by the caller (the cycle itself has no authority to mutate
/// the agent population).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivisionEvent;

/// Implemented by the owning agent type `A` to receive the start/run/close
/// hooks of each phase as the cycle advances. `A` is almost always `Self`
/// on the concrete agent, matching the teacher's `Cycle<Self, Float>`
/// pattern — kept as a separate type parameter so tests can exercise the
/// state machine against a bare mock agent.
pub trait Cycle<A> {
    /// `phase_duration` is the freshly-sampled duration of the phase just
    /// entered, handed to the hook directly rather than read back off the
    /// agent's own (possibly not-yet-written) `CellCycle` field.
    fn on_phase_start(agent: &mut A, phase: CyclePhase, phase_duration: f64);
    /// `progress` is the normalised `(t - lastChange) / (nextChange - lastChange)`.
    fn on_phase_run(agent: &mut A, phase: CyclePhase, progress: f64);
    fn on_phase_close(agent: &mut A, phase: CyclePhase);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_order_is_cyclic_and_fixed() {
        assert_eq!(CyclePhase::G1.next(), CyclePhase::S);
        assert_eq!(CyclePhase::Cytokinesis.next(), CyclePhase::G1);
    }

    #[test]
    fn fractions_sum_to_one() {
        let total: f64 = CyclePhase::ALL_IN_ORDER.iter().map(|p| p.default_fraction()).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn mitotic_phases_start_at_prophase() {
        assert!(!CyclePhase::G2.is_mitotic());
        assert!(CyclePhase::Prophase.is_mitotic());
        assert!(CyclePhase::Cytokinesis.is_mitotic());
    }
}
