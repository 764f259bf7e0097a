//! Two one-sphere nuclei placed in contact, pushed apart by body/slide
//! repulsion (§8 scenario S1). No division, no boundary, no rendering —
//! the smallest scenario that still exercises the full force pipeline.

use embryogen_building_blocks::cell_cycle::CellCycle;
use embryogen_building_blocks::nucleus::{Nucleus, NucleusVariant};
use embryogen_concepts::agent::AgentIdentity;
use embryogen_concepts::errors::SimulationError;
use embryogen_concepts::geometry::spheres::Spheres;
use embryogen_concepts::vector::Vector3d;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::interactive::{prompt_after_snapshot, InteractiveState, PromptOutcome};
use crate::scenario::{Scenario, ScenarioParams};
use crate::scenarios::single_fo_round::run_round;

pub struct TwoCellContact;

fn one_sphere_nucleus(id: i64, centre: Vector3d, rng: &mut ChaCha8Rng, time_step: f64) -> Nucleus {
    let mut raw = Spheres::new(1);
    raw.update_centre(0, centre);
    raw.update_radius(0, 3.0);
    raw.update_own_aabb();
    let cycle = CellCycle::new(24.0 * 60.0, rng);
    Nucleus::new(AgentIdentity::new(id, "nucleus", time_step), raw, NucleusVariant::ChainN, cycle, 3.0)
}

impl Scenario for TwoCellContact {
    fn name(&self) -> &'static str {
        "two-cell-contact"
    }

    fn describe(&self) -> &'static str {
        "two single-sphere nuclei in symmetric contact, pushed apart by body repulsion"
    }

    fn run(&self, params: &ScenarioParams) -> Result<(), SimulationError> {
        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
        let mut agents = vec![
            one_sphere_nucleus(1, Vector3d::new(10.0, 15.0, 15.0), &mut rng, params.time_step),
            one_sphere_nucleus(2, Vector3d::new(19.0, 15.0, 15.0), &mut rng, params.time_step),
        ];

        let mut interactive = InteractiveState::new(params.interactive, params.non_interactive_delay_millis);
        let mut stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        for round in 0..params.rounds {
            run_round(&mut agents, params.time_step)?;
            info!(round, sep = (agents[1].raw_geometry().centre(0) - agents[0].raw_geometry().centre(0)).len(), "round complete");

            if prompt_after_snapshot(&mut interactive, &mut stdin, &mut stdout)? == PromptOutcome::Quit {
                break;
            }
        }

        Ok(())
    }
}
