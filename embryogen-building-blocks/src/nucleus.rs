//! `NucleusAgent` / `NucleusNSAgent` / `Nucleus4SAgent`: the sphere-chain
//! physics integrator (§4.2, §4.3).
//!
//! A single `Nucleus` struct parameterised by [`NucleusVariant`] plays all
//! three roles from the original: a plain chain of N spheres restores its
//! full pairwise canonical-distance matrix (`ChainN`), while the 4-sphere
//! specialisation additionally rectifies its two outer spheres against a
//! virtual axis through the inner pair.

use embryogen_concepts::aabb::ProximityPair;
use embryogen_concepts::agent::{Agent as AgentTrait, AgentIdentity};
use embryogen_concepts::cycle::{Cycle, CyclePhase};
use embryogen_concepts::errors::CalcError;
use embryogen_concepts::force::{magnitudes, ForceKind, ForceVector3d};
use embryogen_concepts::geometry::{spheres::Spheres, Geometry};
use embryogen_concepts::interaction::Interaction;
use embryogen_concepts::mechanics::Mechanics;
use embryogen_concepts::vector::Vector3d;
use serde::{Deserialize, Serialize};

use crate::cell_cycle::CellCycle;

/// Squared-distance tolerance below which a chain mismatch is not worth
/// correcting (§4.2 step 1: "exceeds a small tolerance (0.01 µm²)").
pub const CHAIN_TOLERANCE_SQ: f64 = 0.01;

/// Distance below which a non-penetrating neighbour pair is still close
/// enough to warrant a repulsive social force (§4.2 step 3).
pub const SOCIAL_FORCE_RANGE: f64 = 1.0;

/// Fraction of the full cycle length a nucleus may spend under excessive
/// force (outside mitosis) before flagging itself for removal (§4.2.2).
pub const MAX_EXCESS_FORCE_FRACTION: f64 = 0.05;
pub const EXCESS_FORCE_THRESHOLD: f64 = 0.3;
pub const BOUNDARY_AXIAL_CLIP: f64 = 3.0;
pub const BOUNDARY_DEATH_THRESHOLD: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NucleusVariant {
    /// a chain of N >= 2 spheres restoring the full canonical pairwise
    /// distance matrix
    ChainN,
    /// exactly 4 spheres, with the outer two additionally rectified
    /// against the inner pair's virtual axis
    FourSphere,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nucleus {
    pub identity: AgentIdentity,
    /// physics-truth geometry: no cytoplasm inflation
    raw: Spheres,
    /// integration scratch written by `adjust_geometry_by_*_forces`
    future: Spheres,
    velocities: Vec<Vector3d>,
    weights: Vec<f64>,
    pub desired_velocity: Vector3d,
    pub persistence_time: f64,
    pub cytoplasm_half_width: f64,
    ignore_distance: f64,
    forces: Vec<ForceVector3d>,
    /// full N x N canonical distance matrix, row-major
    canonical_distances: Vec<f64>,
    pub variant: NucleusVariant,
    pub cycle: CellCycle,
    excess_force_time: f64,
    exposed: Geometry,
}

impl Nucleus {
    pub fn new(
        identity: AgentIdentity,
        raw: Spheres,
        variant: NucleusVariant,
        cycle: CellCycle,
        cytoplasm_half_width: f64,
    ) -> Self {
        let n = raw.no_of_spheres();
        let mut canonical_distances = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                canonical_distances[i * n + j] = (raw.centre(i) - raw.centre(j)).len();
            }
        }
        let mut nucleus = Nucleus {
            identity,
            future: raw.clone(),
            velocities: vec![Vector3d::ZERO; n],
            weights: vec![1.0; n],
            desired_velocity: Vector3d::ZERO,
            persistence_time: 2.0,
            cytoplasm_half_width,
            ignore_distance: 10.0,
            forces: Vec::new(),
            canonical_distances,
            variant,
            cycle,
            excess_force_time: 0.0,
            exposed: Geometry::Spheres(raw.clone()),
            raw,
        };
        nucleus.publish_geometry();
        nucleus
    }

    fn canonical(&self, i: usize, j: usize) -> f64 {
        let n = self.raw.no_of_spheres();
        self.canonical_distances[i * n + j]
    }

    pub fn no_of_spheres(&self) -> usize {
        self.raw.no_of_spheres()
    }

    pub fn raw_geometry(&self) -> &Spheres {
        &self.raw
    }

    /// Scales every canonical distance and sphere radius by `factor`,
    /// keeping the restoring forces in equilibrium with the grown target
    /// geometry (§4.3, growth-under-restraint).
    pub fn grow(&mut self, radius_delta: f64) {
        let n = self.no_of_spheres();
        for i in 0..n {
            let r = self.raw.radius(i) + radius_delta;
            self.raw.update_radius(i, r);
            self.future.update_radius(i, r);
        }
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    self.canonical_distances[i * n + j] *= 1.0 + 1.8 * radius_delta / self.canonical(i, j).max(1e-9);
                }
            }
        }
    }

    /// §4.2 step 1: clears the force list, then emits chain-restoring
    /// forces and the autonomous drive/friction couple. Cell-cycle hooks
    /// are driven by the caller via [`CellCycle::advance`] since they need
    /// `&mut self` access this method's `&self` borrow of `self.forces`
    /// would otherwise conflict with.
    pub fn advance_and_build_int_forces(&mut self) {
        self.forces.clear();
        self.push_chain_restoring_forces();
        self.push_drive_friction_forces();
    }

    fn push_chain_restoring_forces(&mut self) {
        let n = self.no_of_spheres();
        match self.variant {
            NucleusVariant::ChainN => {
                for i in 0..n {
                    for j in (i + 1)..n {
                        self.push_restoring_pair(i, j);
                    }
                }
            }
            NucleusVariant::FourSphere => {
                debug_assert_eq!(n, 4);
                for (i, j) in [(0, 1), (1, 2), (2, 3)] {
                    self.push_restoring_pair(i, j);
                }
                self.push_four_sphere_axis_rectification();
            }
        }
    }

    fn push_restoring_pair(&mut self, i: usize, j: usize) {
        let c_i = self.raw.centre(i);
        let c_j = self.raw.centre(j);
        let delta = c_j - c_i;
        let actual = delta.len();
        let canonical = self.canonical(i, j);
        let mismatch = actual - canonical;
        if mismatch * mismatch <= CHAIN_TOLERANCE_SQ {
            return;
        }
        let dir = delta.normalized_or_zero();
        let correction = dir * (mismatch * magnitudes::BODY_SCALE);
        self.forces.push(ForceVector3d::with_hint(correction, c_i, i as i64, ForceKind::SphereToSphere));
        self.forces.push(ForceVector3d::with_hint(correction * -1.0, c_j, j as i64, ForceKind::SphereToSphere));
    }

    /// §4.2 step 1, 4S specialisation: rectify spheres 0 and 3 against the
    /// virtual axis running through the midpoint of spheres 1-2.
    fn push_four_sphere_axis_rectification(&mut self) {
        let mid = (self.raw.centre(1) + self.raw.centre(2)) * 0.5;
        let axis = (self.raw.centre(2) - self.raw.centre(1)).normalized_or_zero();

        for (outer, anchor, sign) in [(0usize, 1usize, -1.0_f64), (3usize, 2usize, 1.0_f64)] {
            let expected = mid + axis * (sign * self.canonical(anchor, outer));
            let actual = self.raw.centre(outer);
            let delta = expected - actual;
            if delta.len2() <= CHAIN_TOLERANCE_SQ {
                continue;
            }
            let force = delta * magnitudes::BODY_SCALE;
            self.forces.push(ForceVector3d::with_hint(force, actual, outer as i64, ForceKind::SphereToSphere));
            self.forces.push(ForceVector3d::with_hint(force * -0.5, self.raw.centre(anchor), anchor as i64, ForceKind::SphereToSphere));
        }
    }

    fn push_drive_friction_forces(&mut self) {
        for i in 0..self.no_of_spheres() {
            let w = self.weights[i];
            let c = self.raw.centre(i);
            let drive = self.desired_velocity * (w / self.persistence_time);
            let friction = self.velocities[i] * (-w / self.persistence_time);
            self.forces.push(ForceVector3d::with_hint(drive, c, i as i64, ForceKind::Drive));
            self.forces.push(ForceVector3d::with_hint(friction, c, i as i64, ForceKind::Friction));
        }
    }

    /// §4.2 step 3: appends one externally-sourced force (body, slide,
    /// repulsive, or a clipped boundary force) to this round's force
    /// list, to be consumed by the next [`Nucleus::integrate`] call.
    pub fn add_external_force(&mut self, force: ForceVector3d) {
        self.forces.push(force);
    }

    /// §4.2 step 2 / step 4: integrates the current force list and writes
    /// the result into `future`.
    pub fn integrate(&mut self, dt: f64) -> Result<(), CalcError> {
        let (positions, velocities) = Mechanics::calculate_increment(self, &self.forces, dt)?;
        for i in 0..self.no_of_spheres() {
            self.future.update_centre(i, positions[i]);
        }
        self.velocities = velocities;
        self.apply_stability_guards(dt);
        self.raw = self.future.clone();
        Ok(())
    }

    fn apply_stability_guards(&mut self, dt: f64) {
        let mitotic = self.cycle.current_phase.is_mitotic();
        let peak = self
            .forces
            .iter()
            .map(|f| f.vector.len())
            .fold(0.0_f64, f64::max);
        if peak > EXCESS_FORCE_THRESHOLD && !mitotic {
            self.excess_force_time += dt;
            if self.excess_force_time > MAX_EXCESS_FORCE_FRACTION * self.cycle.full_cycle_length {
                self.identity.should_die = true;
            }
        }
    }

    /// Applies the boundary stability guard (§4.2.2) to a force coming
    /// from domain containment: clips the axial component at ±3N and
    /// flags the agent for death if either x or y exceeds 4N.
    pub fn clip_boundary_force(&mut self, mut force: Vector3d) -> Vector3d {
        if force.x.abs() > BOUNDARY_DEATH_THRESHOLD || force.y.abs() > BOUNDARY_DEATH_THRESHOLD {
            self.identity.should_die = true;
        }
        force.x = force.x.clamp(-BOUNDARY_AXIAL_CLIP, BOUNDARY_AXIAL_CLIP);
        force.y = force.y.clamp(-BOUNDARY_AXIAL_CLIP, BOUNDARY_AXIAL_CLIP);
        force.z = force.z.clamp(-BOUNDARY_AXIAL_CLIP, BOUNDARY_AXIAL_CLIP);
        force
    }

    /// Advances this nucleus's own cell cycle to time `t`, extracting
    /// `self.cycle` first so [`CellCycle::advance`]'s `agent: &mut Self`
    /// borrow never aliases the cycle it is driving.
    pub fn advance_cycle(&mut self, rng: &mut rand_chacha::ChaCha8Rng, t: f64) -> Option<embryogen_concepts::cycle::DivisionEvent> {
        let mut cycle = std::mem::take(&mut self.cycle);
        let division = cycle.advance::<Nucleus, NucleusCycleHooks>(self, rng, t);
        self.cycle = cycle;
        division
    }

    /// §4.2 step 5: copies `future` into the exposed geometry, inflating
    /// every radius by the cytoplasm half-width.
    pub fn publish_geometry(&mut self) {
        let mut exposed = self.future.clone();
        for i in 0..exposed.no_of_spheres() {
            let r = exposed.radius(i);
            exposed.update_radius(i, r + self.cytoplasm_half_width);
        }
        exposed.update_own_aabb();
        self.exposed = Geometry::Spheres(exposed);
    }
}

impl Mechanics for Nucleus {
    fn positions(&self) -> &[Vector3d] {
        self.raw.centres()
    }

    fn velocities(&self) -> &[Vector3d] {
        &self.velocities
    }

    fn set_positions(&mut self, positions: &[Vector3d]) {
        for (i, p) in positions.iter().enumerate() {
            self.raw.update_centre(i, *p);
        }
    }

    fn set_velocities(&mut self, velocities: &[Vector3d]) {
        self.velocities = velocities.to_vec();
    }

    fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl Interaction for Nucleus {
    fn exposed_geometry(&self) -> &Geometry {
        &self.exposed
    }

    fn ignore_distance(&self) -> f64 {
        self.ignore_distance
    }

    /// §4.2 step 3: a penetrating proximity pair becomes a body-repulsion
    /// force plus a sliding-friction term; a merely nearby pair (handled
    /// by [`Nucleus::repulsive_force_for_pair`]) becomes a social
    /// repulsion term instead.
    fn forces_from_proximity_pair(
        &self,
        pair: &ProximityPair,
        own_velocity_at_hint: Vector3d,
        other_velocity_at_hint: Vector3d,
    ) -> Result<Vec<ForceVector3d>, CalcError> {
        let mut out = Vec::new();
        let normal = (pair.other_pos - pair.local_pos).normalized_or_zero();

        if pair.distance < 0.0 {
            let overlap = (-pair.distance - magnitudes::OVERLAP_DEPTH).max(0.0);
            let body_mag = magnitudes::OVERLAP_SCALE * overlap + magnitudes::OVERLAP_LEVEL;
            let body = normal * (-body_mag);
            out.push(ForceVector3d::with_hint(body, pair.local_pos, pair.local_hint, ForceKind::Body));

            let rel_vel = own_velocity_at_hint - other_velocity_at_hint;
            let tangential = rel_vel - normal * rel_vel.dot(&normal);
            let slide = tangential * (-magnitudes::SLIDE_SCALE);
            out.push(ForceVector3d::with_hint(slide, pair.local_pos, pair.local_hint, ForceKind::Slide));
        } else if pair.distance < SOCIAL_FORCE_RANGE {
            let mag = magnitudes::OVERLAP_LEVEL * (-pair.distance / magnitudes::REP_SCALE).exp();
            let repulsive = normal * (-mag);
            out.push(ForceVector3d::with_hint(repulsive, pair.local_pos, pair.local_hint, ForceKind::Repulsive));
        }

        Ok(out)
    }
}

impl AgentTrait for Nucleus {
    fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    fn identity_mut(&mut self) -> &mut AgentIdentity {
        &mut self.identity
    }
}

/// Drives the cell-cycle hooks for a [`Nucleus`]: growth during G1,
/// shortened persistence during mitosis, nothing else — the richer
/// phase programme (elongation, furrow contraction) belongs to the
/// legacy 2-D boundary-point agent (§4.4), since sphere-chain nuclei in
/// the sources do not themselves reshape during mitosis beyond slowing
/// down.
pub struct NucleusCycleHooks;

impl Cycle<Nucleus> for NucleusCycleHooks {
    fn on_phase_start(agent: &mut Nucleus, phase: CyclePhase, phase_duration: f64) {
        if phase.is_mitotic() {
            agent.persistence_time = phase_duration.max(1e-3);
            agent.desired_velocity = Vector3d::ZERO;
        }
    }

    fn on_phase_run(_agent: &mut Nucleus, _phase: CyclePhase, _progress: f64) {}

    fn on_phase_close(_agent: &mut Nucleus, _phase: CyclePhase) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use embryogen_concepts::agent::AgentIdentity as Identity;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn two_sphere_chain() -> Nucleus {
        let mut raw = Spheres::new(2);
        raw.update_centre(0, Vector3d::new(0.0, 0.0, 0.0));
        raw.update_radius(0, 3.0);
        raw.update_centre(1, Vector3d::new(10.0, 0.0, 0.0));
        raw.update_radius(1, 3.0);
        raw.update_own_aabb();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let cycle = CellCycle::new(24.0 * 60.0, &mut rng);
        Nucleus::new(Identity::new(1, "nucleus", 0.1), raw, NucleusVariant::ChainN, cycle, 2.0)
    }

    #[test]
    fn equilibrium_chain_produces_no_restoring_force() {
        let mut n = two_sphere_chain();
        n.advance_and_build_int_forces();
        let restoring: Vec<_> = n
            .forces
            .iter()
            .filter(|f| f.kind == ForceKind::SphereToSphere)
            .collect();
        assert!(restoring.is_empty());
    }

    #[test]
    fn stretched_chain_pulls_spheres_back_together() {
        let mut n = two_sphere_chain();
        n.raw.update_centre(1, Vector3d::new(15.0, 0.0, 0.0));
        n.advance_and_build_int_forces();
        let f0 = n.forces.iter().find(|f| f.hint == 0 && f.kind == ForceKind::SphereToSphere).unwrap();
        assert!(f0.vector.x > 0.0, "sphere 0 should be pulled toward sphere 1");
    }

    #[test]
    fn publish_geometry_inflates_by_cytoplasm_width() {
        let mut n = two_sphere_chain();
        n.publish_geometry();
        if let Geometry::Spheres(s) = n.exposed_geometry() {
            assert_eq!(s.radius(0), 3.0 + 2.0);
        } else {
            panic!("expected spheres geometry");
        }
    }

    #[test]
    fn boundary_force_clips_axially_and_flags_death_past_threshold() {
        let mut n = two_sphere_chain();
        let clipped = n.clip_boundary_force(Vector3d::new(5.0, 0.0, 0.0));
        assert_eq!(clipped.x, 3.0);
        assert!(n.identity.should_die);
    }

    /// §8 scenario S3: growth under restraint. 30 steps of `dR = 0.05`
    /// should grow both radii by 1.5 µm total and scale the canonical
    /// distance between the two spheres by the same `1.8 * dR` factor
    /// each step, keeping the restoring force small since geometry and
    /// target both grow together.
    #[test]
    fn growth_under_restraint_scales_radii_and_canonical_distances_together() {
        let mut n = two_sphere_chain();
        let initial_radius = n.raw_geometry().radius(0);
        let initial_canonical = n.canonical(0, 1);
        let dr = 0.05;
        for _ in 0..30 {
            n.grow(dr);
        }
        assert!((n.raw_geometry().radius(0) - (initial_radius + 1.5)).abs() < 1e-9);

        let expected_canonical = (0..30).fold(initial_canonical, |d, _| d * (1.0 + 1.8 * dr / d));
        assert!((n.canonical(0, 1) - expected_canonical).abs() < 1e-6);

        n.advance_and_build_int_forces();
        let peak = n
            .forces
            .iter()
            .filter(|f| f.kind == ForceKind::SphereToSphere)
            .map(|f| f.vector.len())
            .fold(0.0_f64, f64::max);
        assert!(peak < EXCESS_FORCE_THRESHOLD, "restoring force should stay small under restrained growth, got {peak}");
    }
}
