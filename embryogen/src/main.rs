//! embryogen — agent-based cell-population simulator producing synthetic
//! microscopy time-lapse frames and ground-truth lineage records.
//!
//! ```text
//! embryogen <scenario-name> [scenario-specific args...]
//! ```
//!
//! Exit codes: 0 on normal completion, non-zero on any uncaught exception
//! or unknown scenario name (§6).

mod interactive;
mod scenario;
mod scenarios;

use clap::Parser;

/// embryogen — agent-based cell-population simulator
#[derive(Parser, Debug)]
#[command(
    name = "embryogen",
    version,
    about = "Synthetic microscopy time-lapse simulator with ground-truth lineage",
    after_help = "EXAMPLES:\n  \
                  embryogen two-cell-contact\n  \
                  embryogen single-cell-division --rounds 200 --seed 7\n  \
                  embryogen boundary-expulsion --output-dir ./out"
)]
struct Cli {
    /// Registered scenario name; pass an unknown name to see the list.
    scenario: String,

    /// RNG seed for this run's FrontOfficer stream.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Simulated minutes advanced per round.
    #[arg(long, default_value_t = 0.1)]
    time_step: f64,

    /// Number of rounds to run before stopping.
    #[arg(long, default_value_t = 100)]
    rounds: usize,

    /// Enable the post-snapshot keyboard prompt.
    #[arg(long)]
    interactive: bool,

    /// Delay between snapshots once not interactive, in milliseconds.
    #[arg(long, default_value_t = 0)]
    delay_millis: u64,

    /// Directory written with tracks.txt and any per-frame image stacks.
    #[arg(long, default_value = "./out")]
    output_dir: std::path::PathBuf,
}

fn main() {
    let format = tracing_subscriber::fmt::format().with_target(false).compact();
    tracing_subscriber::fmt().event_format(format).init();

    let cli = Cli::parse();

    let Some(found) = scenario::find_scenario(&cli.scenario) else {
        eprintln!("unknown scenario: {}", cli.scenario);
        scenario::print_scenario_list();
        std::process::exit(1);
    };

    let params = scenario::ScenarioParams {
        seed: cli.seed,
        time_step: cli.time_step,
        rounds: cli.rounds,
        interactive: cli.interactive,
        non_interactive_delay_millis: cli.delay_millis,
        output_dir: cli.output_dir,
    };

    if let Err(err) = found.run(&params) {
        tracing::error!(scenario = found.name(), %err, "scenario failed");
        eprintln!("{} failed: {err}", found.name());
        std::process::exit(1);
    }
}
