pub mod boundary_expulsion;
pub mod single_cell_division;
pub mod two_cell_contact;

/// Common round-driving helpers shared by the single-FO scenarios below —
/// every scenario here runs all its agents in one process, skipping the
/// Director/FrontOfficer message-passing machinery in `embryogen-core`,
/// since a one-FO simulation has nothing to exchange.
pub(crate) mod single_fo_round {
    use embryogen_building_blocks::nucleus::Nucleus;
    use embryogen_concepts::agent::Agent;
    use embryogen_concepts::errors::SimulationError;
    use embryogen_concepts::interaction::Interaction;
    use embryogen_concepts::vector::Vector3d;

    /// Runs one full round (§4.2) over `agents`: internal forces, the
    /// pairwise external-force exchange, integration, then republishing
    /// geometry. Bubbles the first `CalcError` hit during integration,
    /// per §7's "invalid geometry construction is fatal".
    pub fn run_round(agents: &mut [Nucleus], dt: f64) -> Result<(), SimulationError> {
        for a in agents.iter_mut() {
            a.advance_and_build_int_forces();
        }

        let n = agents.len();
        let mut all_external: Vec<Vec<embryogen_concepts::force::ForceVector3d>> = vec![Vec::new(); n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let mut pairs = Vec::new();
                agents[i]
                    .exposed_geometry_ref()
                    .get_distance(agents[j].exposed_geometry_ref(), &mut pairs);
                for pair in pairs {
                    let forces = agents[i].forces_from_proximity_pair(&pair, Vector3d::ZERO, Vector3d::ZERO)?;
                    all_external[i].extend(forces);
                }
            }
        }

        for (a, external) in agents.iter_mut().zip(all_external.into_iter()) {
            for f in external {
                a.add_external_force(f);
            }
            a.integrate(dt)?;
            a.publish_geometry();
        }
        Ok(())
    }
}
