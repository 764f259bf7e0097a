//! One nucleus driven straight at the domain wall until the boundary
//! stability guard flags it for removal (§8 scenario S5). There is no
//! neighbouring agent here, only a hand-rolled containment force — the
//! production `FrontOfficer` would source this from a `Domain`
//! implementation, which this crate does not carry (out of scope per
//! the spec's Non-goals), so the scenario supplies the minimal
//! penetration-depth force itself and feeds it through
//! `Nucleus::clip_boundary_force` exactly as the real pipeline would.

use embryogen_building_blocks::cell_cycle::CellCycle;
use embryogen_building_blocks::nucleus::{Nucleus, NucleusVariant};
use embryogen_concepts::agent::{Agent, AgentIdentity};
use embryogen_concepts::errors::SimulationError;
use embryogen_concepts::geometry::spheres::Spheres;
use embryogen_concepts::vector::Vector3d;
use embryogen_core::LineageRecorder;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::interactive::{prompt_after_snapshot, InteractiveState, PromptOutcome};
use crate::scenario::{Scenario, ScenarioParams};

pub struct BoundaryExpulsion;

/// How close to a wall (in µm) the containment force starts pushing back.
const WALL_MARGIN: f64 = 10.0;
/// Penetration-depth stiffness: force grows linearly with how far the
/// sphere's centre has crossed into the margin.
const WALL_STIFFNESS: f64 = 2.0;

fn domain_containment_force(centre: Vector3d, domain_size: Vector3d) -> Vector3d {
    let mut f = Vector3d::ZERO;
    if centre.x < WALL_MARGIN {
        f.x += WALL_STIFFNESS * (WALL_MARGIN - centre.x);
    }
    if centre.x > domain_size.x - WALL_MARGIN {
        f.x -= WALL_STIFFNESS * (WALL_MARGIN - (domain_size.x - centre.x));
    }
    if centre.y < WALL_MARGIN {
        f.y += WALL_STIFFNESS * (WALL_MARGIN - centre.y);
    }
    if centre.y > domain_size.y - WALL_MARGIN {
        f.y -= WALL_STIFFNESS * (WALL_MARGIN - (domain_size.y - centre.y));
    }
    f
}

/// Runs the simulation and returns the frame the stability guard flagged
/// the agent for removal on, or `None` if it ran out the clock without
/// ever being expelled.
fn run_simulation(params: &ScenarioParams, lineage: &mut LineageRecorder) -> Result<Option<usize>, SimulationError> {
    let domain_size = Vector3d::new(480.0, 30.0, 30.0);
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);

    let mut raw = Spheres::new(1);
    raw.update_centre(0, Vector3d::new(479.0, 15.0, 15.0));
    raw.update_radius(0, 3.0);
    raw.update_own_aabb();
    let cycle = CellCycle::new(24.0 * 60.0, &mut rng);
    let mut nucleus = Nucleus::new(
        AgentIdentity::new(1, "nucleus", params.time_step),
        raw,
        NucleusVariant::ChainN,
        cycle,
        0.5,
    );
    nucleus.desired_velocity = Vector3d::new(1.0, 0.0, 0.0);

    lineage.start_new_track(1, 0);

    let mut expelled_at: Option<usize> = None;

    let mut interactive = InteractiveState::new(params.interactive, params.non_interactive_delay_millis);
    let mut stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    for frame in 0..params.rounds.min(20) {
        nucleus.advance_and_build_int_forces();
        let centre = nucleus.raw_geometry().centre(0);
        let raw_force = domain_containment_force(centre, domain_size);
        let clipped = nucleus.clip_boundary_force(raw_force);
        nucleus.add_external_force(embryogen_concepts::force::ForceVector3d::with_hint(
            clipped,
            centre,
            0,
            embryogen_concepts::force::ForceKind::Boundary,
        ));
        nucleus.integrate(params.time_step)?;
        nucleus.publish_geometry();

        if nucleus.should_die() {
            expelled_at = Some(frame);
            info!(frame, "boundary stability guard flagged agent for removal");
            break;
        }

        if prompt_after_snapshot(&mut interactive, &mut stdin, &mut stdout)? == PromptOutcome::Quit {
            break;
        }
    }

    match expelled_at {
        Some(frame) => {
            let previous_frame = frame.saturating_sub(1) as i64;
            lineage.close_track(1, previous_frame);
        }
        None => {
            tracing::warn!("boundary-expulsion scenario completed without triggering expulsion");
            lineage.close_all_open_tracks(params.rounds.min(20) as i64);
        }
    }

    Ok(expelled_at)
}

impl Scenario for BoundaryExpulsion {
    fn name(&self) -> &'static str {
        "boundary-expulsion"
    }

    fn describe(&self) -> &'static str {
        "one nucleus driven into a wall until the boundary stability guard kills it"
    }

    fn run(&self, params: &ScenarioParams) -> Result<(), SimulationError> {
        let mut lineage = LineageRecorder::new();
        run_simulation(params, &mut lineage)?;

        let path = params.output_dir.join("tracks.txt");
        std::fs::create_dir_all(&params.output_dir)?;
        lineage.export_all(&path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_is_expelled_within_twenty_rounds() {
        let params = ScenarioParams {
            seed: 1,
            time_step: 0.1,
            rounds: 20,
            interactive: false,
            non_interactive_delay_millis: 0,
            output_dir: std::env::temp_dir().join("embryogen-boundary-expulsion-test"),
        };
        let mut lineage = LineageRecorder::new();
        let expelled_at = run_simulation(&params, &mut lineage).expect("scenario runs to completion");
        assert!(expelled_at.is_some(), "agent should have been expelled within 20 rounds");

        let path = params.output_dir.join("tracks.txt");
        std::fs::create_dir_all(&params.output_dir).unwrap();
        lineage.export_all(&path).unwrap();
        let tracks = std::fs::read_to_string(&path).unwrap();
        let body_lines = tracks.lines().count();
        assert_eq!(body_lines, 1, "exactly one track, closed before the agent was culled");
    }
}
