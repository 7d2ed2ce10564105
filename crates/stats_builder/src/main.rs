//! Stats Builder CLI
//!
//! Match-detail JSON → player stats report (JSON/CSV)

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "stats_builder")]
#[command(about = "Build cricket player stats from ball-by-ball match data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Standard,
    Classic,
}

#[cfg(feature = "cli")]
impl Preset {
    fn name(self) -> &'static str {
        match self {
            Preset::Standard => "standard",
            Preset::Classic => "classic",
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Process match files and write reports
    Build {
        /// Match file or directory of *.json files (repeatable)
        #[arg(long = "input", required = true)]
        inputs: Vec<PathBuf>,

        /// Output JSON report path
        #[arg(long)]
        json: Option<PathBuf>,

        /// Output CSV path
        #[arg(long)]
        csv: Option<PathBuf>,

        /// State snapshot to resume from and update
        #[arg(long)]
        state: Option<PathBuf>,

        /// Scoring config JSON (overrides CRICKET_SCORING_CONFIG)
        #[arg(long)]
        scoring_config: Option<PathBuf>,

        /// Built-in scoring preset
        #[arg(long, value_enum)]
        preset: Option<Preset>,
    },

    /// Print the top players of a JSON report
    Leaderboard {
        /// JSON report written by `build`
        #[arg(long)]
        report: PathBuf,

        #[arg(long, default_value = "10")]
        top: usize,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            inputs,
            json,
            csv,
            state,
            scoring_config,
            preset,
        } => {
            let config = stats_builder::resolve_config(
                scoring_config.as_deref(),
                preset.map(Preset::name),
            )?;
            let options = stats_builder::BuildOptions {
                inputs,
                json_out: json,
                csv_out: csv,
                state,
                config,
            };

            println!("🏏 Building player stats...");
            for input in &options.inputs {
                println!("   Input:  {}", input.display());
            }

            let outcome = stats_builder::run_build(&options)?;
            print_outcome(&outcome, &options);
        }

        Commands::Leaderboard { report, top } => {
            let report = stats_builder::output::read_json(&report)?;
            print_leaderboard(&report, top);
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_outcome(outcome: &stats_builder::BuildOutcome, options: &stats_builder::BuildOptions) {
    let load = &outcome.load;
    let run = &outcome.run;

    println!("\n✅ Run complete");
    println!("   Files:             {} ({} failed)", load.files, load.failed);
    println!("   Documents:         {}", load.documents);
    println!("   Matches scored:    {}", run.scored);
    println!("   No ball data:      {}", run.no_data);
    println!("   Already processed: {}", run.already_processed);
    println!("   Skipped balls:     {}", run.skipped_balls);
    println!("   Players:           {}", outcome.report.metadata.player_count);

    if let Some(path) = &options.json_out {
        println!("\n📄 JSON report: {}", path.display());
    }
    if let Some(path) = &options.csv_out {
        println!("📄 CSV report:  {}", path.display());
    }
    if let Some(meta) = &outcome.snapshot {
        println!("💾 State saved: {} matches, checksum {}", meta.matches_processed, meta.checksum);
    }
}

#[cfg(feature = "cli")]
fn print_leaderboard(report: &cricket_core::StatsReport, top: usize) {
    println!(
        "Top {} of {} players ({} matches, generated {})",
        top.min(report.players.len()),
        report.metadata.player_count,
        report.metadata.matches_processed,
        report.metadata.generated_at
    );
    for (rank, (id, player)) in report.leaderboard(top).into_iter().enumerate() {
        println!(
            "{:>3}. {:<28} {:<20} {:>4} m {:>9.2}  [{}]",
            rank + 1,
            player.player_name,
            player.team,
            player.matches,
            player.total_score,
            id
        );
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("stats_builder CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
