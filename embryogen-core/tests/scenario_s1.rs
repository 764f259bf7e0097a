//! S1 from §8: two one-sphere nuclei initialised 9 µm apart (radius 3 µm,
//! so overlapping by 3 µm of surface distance) get pushed apart purely by
//! body/slide repulsion, with no scheduler threads involved — this test
//! drives one FO's internal pipeline directly.

use embryogen_building_blocks::nucleus::{Nucleus, NucleusVariant};
use embryogen_concepts::agent::{Agent, AgentIdentity};
use embryogen_concepts::errors::SimulationError;
use embryogen_concepts::geometry::spheres::Spheres;
use embryogen_concepts::interaction::Interaction;
use embryogen_concepts::vector::Vector3d;
use embryogen_building_blocks::cell_cycle::CellCycle;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn one_sphere_nucleus(id: i64, centre: Vector3d, rng: &mut ChaCha8Rng) -> Nucleus {
    let mut raw = Spheres::new(1);
    raw.update_centre(0, centre);
    raw.update_radius(0, 3.0);
    raw.update_own_aabb();
    let cycle = CellCycle::new(24.0 * 60.0, rng);
    // a nonzero cytoplasm half-width so the *exposed* (published) spheres
    // actually overlap at the scenario's starting 9 µm separation, giving
    // the body/slide repulsion something to act on
    Nucleus::new(AgentIdentity::new(id, "nucleus", 0.1), raw, NucleusVariant::ChainN, cycle, 3.0)
}

fn run_round(agents: &mut [Nucleus], dt: f64) -> Result<(), SimulationError> {
    for a in agents.iter_mut() {
        a.advance_and_build_int_forces();
    }

    let n = agents.len();
    for i in 0..n {
        let mut external = Vec::new();
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
                external.extend(forces);
            }
        }
        for f in external {
            agents[i].add_external_force(f);
        }
    }

    for a in agents.iter_mut() {
        a.integrate(dt)?;
        a.publish_geometry();
    }
    Ok(())
}

#[test]
fn two_cell_symmetric_contact_pushes_cells_apart() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut agents = vec![
        one_sphere_nucleus(1, Vector3d::new(10.0, 15.0, 15.0), &mut rng),
        one_sphere_nucleus(2, Vector3d::new(19.0, 15.0, 15.0), &mut rng),
    ];

    for _ in 0..5 {
        run_round(&mut agents, 0.1).unwrap();
    }

    let sep = (agents[1].raw_geometry().centre(0) - agents[0].raw_geometry().centre(0)).len();
    assert!(sep > 6.0, "expected separation > 6 µm, got {sep}");
    assert!(sep > 9.0, "repulsion should have grown the initial 9 µm separation, got {sep}");
    assert!(!agents[0].should_die());
    assert!(!agents[1].should_die());
}
