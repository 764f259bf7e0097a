//! The `Mechanics` concept: how an agent turns a list of forces acting on
//! its spheres into an updated position and velocity.

use crate::errors::CalcError;
use crate::force::ForceVector3d;
use crate::vector::Vector3d;

/// Implemented by every agent whose geometry is driven by a semi-implicit
/// Euler integrator over per-sphere centres (§4.2.1).
///
/// Mirrors the teacher's `Mechanics<Pos, Vel, For, Float>` trait, but
/// specialised to embryogen's concrete sphere-chain representation rather
/// than kept generic over position/velocity/force types — there is only
/// ever one geometry representation driving the integrator in this crate.
pub trait Mechanics {
    /// Current centre of every sphere in the chain.
    fn positions(&self) -> &[Vector3d];

    /// Current velocity of every sphere in the chain.
    fn velocities(&self) -> &[Vector3d];

    fn set_positions(&mut self, positions: &[Vector3d]);

    fn set_velocities(&mut self, velocities: &[Vector3d]);

    /// Per-sphere integration weight (mass-like scaling factor, default 1).
    fn weights(&self) -> &[f64];

    /// Integrates one semi-implicit Euler step given the forces currently
    /// acting on each sphere (grouped by sphere index), returning the new
    /// `(positions, velocities)` without mutating `self`.
    fn calculate_increment(
        &self,
        forces: &[ForceVector3d],
        dt: f64,
    ) -> Result<(Vec<Vector3d>, Vec<Vector3d>), CalcError> {
        let n = self.positions().len();
        let mut accel = vec![Vector3d::ZERO; n];
        for f in forces {
            let hint = f.hint;
            if hint < 0 || hint as usize >= n {
                return Err(CalcError::new(format!(
                    "force hint {hint} out of range for {n} spheres"
                )));
            }
            accel[hint as usize] += f.vector;
        }

        let weights = self.weights();
        let mut new_vel = self.velocities().to_vec();
        let mut new_pos = self.positions().to_vec();
        for i in 0..n {
            let a = accel[i] / weights[i];
            new_vel[i] += a * dt;
            new_pos[i] += new_vel[i] * dt;
        }
        Ok((new_pos, new_vel))
    }
}
