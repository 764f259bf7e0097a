//! One 4-sphere nucleus cycling through mitosis and dividing exactly once
//! (§8 scenario S2), with the lineage recorder producing mother + two
//! daughter tracks with matching parental links.

use embryogen_building_blocks::cell_cycle::CellCycle;
use embryogen_building_blocks::nucleus::{Nucleus, NucleusVariant};
use embryogen_concepts::agent::AgentIdentity;
use embryogen_concepts::errors::SimulationError;
use embryogen_concepts::geometry::spheres::Spheres;
use embryogen_concepts::vector::Vector3d;
use embryogen_core::LineageRecorder;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::interactive::{prompt_after_snapshot, InteractiveState, PromptOutcome};
use crate::scenario::{Scenario, ScenarioParams};

pub struct SingleCellDivision;

fn four_sphere_nucleus(id: i64, centre: Vector3d, rng: &mut ChaCha8Rng, full_cycle_length: f64, time_step: f64) -> Nucleus {
    let spacing = 4.0;
    let mut raw = Spheres::new(4);
    for i in 0..4 {
        raw.update_centre(i, centre + Vector3d::new(spacing * (i as f64 - 1.5), 0.0, 0.0));
        raw.update_radius(i, 3.0);
    }
    raw.update_own_aabb();
    let cycle = CellCycle::new(full_cycle_length, rng);
    Nucleus::new(AgentIdentity::new(id, "nucleus", time_step), raw, NucleusVariant::FourSphere, cycle, 0.5)
}

/// Splits a 4-sphere nucleus into two 4-sphere daughters along its long
/// axis, each daughter keeping two of the four spheres and recentred on
/// their own centre of geometry.
fn split_four_sphere(parent: &Nucleus, daughter_a_id: i64, daughter_b_id: i64, rng: &mut ChaCha8Rng, full_cycle_length: f64, time_step: f64) -> (Nucleus, Nucleus) {
    let raw = parent.raw_geometry();
    let centre_a = (raw.centre(0) + raw.centre(1)) * 0.5;
    let centre_b = (raw.centre(2) + raw.centre(3)) * 0.5;
    let a = four_sphere_nucleus(daughter_a_id, centre_a, rng, full_cycle_length, time_step);
    let b = four_sphere_nucleus(daughter_b_id, centre_b, rng, full_cycle_length, time_step);
    (a, b)
}

impl Scenario for SingleCellDivision {
    fn name(&self) -> &'static str {
        "single-cell-division"
    }

    fn describe(&self) -> &'static str {
        "one 4-sphere nucleus divides exactly once under a short cell cycle"
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

/// Runs the division simulation and returns the frame the mother divided
/// on, or `None` if no division happened within `params.rounds`.
fn run_simulation(params: &ScenarioParams, lineage: &mut LineageRecorder) -> Result<Option<i64>, SimulationError> {
    let full_cycle_length = 3.0;
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let mut nucleus = four_sphere_nucleus(1, Vector3d::new(60.0, 60.0, 60.0), &mut rng, full_cycle_length, params.time_step);

    lineage.start_new_track(1, 0);

    let mut t = 0.0;
    let next_id = 2;
    let mut divided_at: Option<i64> = None;

    let mut interactive = InteractiveState::new(params.interactive, params.non_interactive_delay_millis);
    let mut stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    for frame in 0..params.rounds {
        t += params.time_step;
        nucleus.advance_and_build_int_forces();
        nucleus.integrate(params.time_step)?;
        nucleus.publish_geometry();

        let division = nucleus.advance_cycle(&mut rng, t);

        if division.is_some() {
            let (a, b) = split_four_sphere(&nucleus, next_id, next_id + 1, &mut rng, full_cycle_length, params.time_step);
            lineage.report_new_born_daughters(1, next_id, next_id + 1, frame as i64);
            info!(mother = 1, daughter_a = next_id, daughter_b = next_id + 1, "cytokinesis");
            divided_at = Some(frame as i64);
            let _ = (a, b);
            break;
        }

        if prompt_after_snapshot(&mut interactive, &mut stdin, &mut stdout)? == PromptOutcome::Quit {
            break;
        }
    }

    match divided_at {
        Some(frame) => lineage.close_all_open_tracks(frame + 1),
        None => {
            tracing::warn!("single-cell-division scenario completed without a division event");
            lineage.close_all_open_tracks(params.rounds as i64);
        }
    }

    Ok(divided_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_produces_mother_and_two_daughter_tracks() {
        let params = ScenarioParams {
            seed: 1,
            time_step: 0.1,
            rounds: 500,
            interactive: false,
            non_interactive_delay_millis: 0,
            output_dir: std::env::temp_dir().join("embryogen-single-cell-division-test"),
        };
        let mut lineage = LineageRecorder::new();
        let divided_at = run_simulation(&params, &mut lineage).expect("scenario runs to completion");
        assert!(divided_at.is_some(), "mother should have divided within 500 rounds");

        let path = params.output_dir.join("tracks.txt");
        std::fs::create_dir_all(&params.output_dir).unwrap();
        lineage.export_all(&path).unwrap();
        let tracks = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = tracks.lines().collect();
        assert_eq!(lines.len(), 3, "mother + two daughters");

        let mother: Vec<&str> = lines[0].split(' ').collect();
        assert_eq!(mother[0], "1");
        assert_eq!(mother[3], "0", "mother has no parent");

        for daughter in &lines[1..] {
            let fields: Vec<&str> = daughter.split(' ').collect();
            assert_eq!(fields[3], "1", "both daughters point back at the mother");
        }
    }
}
