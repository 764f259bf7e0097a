//! The scenario registry: CLI names map to a `Scenario` implementation
//! the way the original's `Scenarios/common/Scenario.h` registry maps a
//! name string to a concrete subclass.

use embryogen_concepts::errors::SimulationError;

/// Parameters shared by every scenario, threaded through from the CLI.
#[derive(Debug, Clone)]
pub struct ScenarioParams {
    pub seed: u64,
    pub time_step: f64,
    pub rounds: usize,
    pub interactive: bool,
    pub non_interactive_delay_millis: u64,
    pub output_dir: std::path::PathBuf,
}

pub trait Scenario {
    fn name(&self) -> &'static str;
    fn describe(&self) -> &'static str;
    fn run(&self, params: &ScenarioParams) -> Result<(), SimulationError>;
}

/// Every scenario known to this binary, in registration order — matched
/// case-sensitively against the CLI's scenario-name argument (§6).
pub fn all_scenarios() -> Vec<Box<dyn Scenario>> {
    vec![
        Box::new(crate::scenarios::two_cell_contact::TwoCellContact),
        Box::new(crate::scenarios::single_cell_division::SingleCellDivision),
        Box::new(crate::scenarios::boundary_expulsion::BoundaryExpulsion),
    ]
}

pub fn find_scenario(name: &str) -> Option<Box<dyn Scenario>> {
    all_scenarios().into_iter().find(|s| s.name() == name)
}

/// §6: "unknown names print the list and exit non-zero."
pub fn print_scenario_list() {
    eprintln!("Available scenarios:");
    for s in all_scenarios() {
        eprintln!("  {:<24} {}", s.name(), s.describe());
    }
}
