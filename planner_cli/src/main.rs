mod display;
mod input;
mod menu;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use input::{coerce_params, parse_key_value};
use menu::Menu;
use planner_core::*;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pfotbal")]
#[command(about = "Football training planner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data file location
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive menu (default)
    Menu,

    /// List players with their pending plans
    Players,

    /// Add a player to the roster
    AddPlayer {
        #[arg(long)]
        name: String,

        #[arg(long)]
        position: String,
    },

    /// Define a new exercise type
    DefineType {
        /// Unique code (stored upper case)
        #[arg(long)]
        code: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Parameters as 'name:type, name2:type2' (types: int, float, string)
        #[arg(long, default_value = "")]
        params: String,
    },

    /// Create an empty training plan for a player
    CreatePlan {
        #[arg(long)]
        player: u32,

        /// Target completion date (YYYY-MM-DD)
        #[arg(long)]
        target: Option<NaiveDate>,
    },

    /// Add an exercise unit to a plan
    AddUnit {
        #[arg(long)]
        plan: u32,

        /// Exercise type code
        #[arg(long)]
        code: String,

        /// Parameter value as key=value (repeatable)
        #[arg(long = "param")]
        params: Vec<String>,
    },

    /// Mark a unit in a plan as completed
    Complete {
        #[arg(long)]
        plan: u32,

        #[arg(long)]
        unit: u32,
    },

    /// Show a plan with its completion summary
    Summary {
        #[arg(long)]
        plan: u32,
    },

    /// Export all plans to CSV, one row per unit
    Export {
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    planner_core::logging::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load()?;
    let data_file = DataFile::new(config.resolve_data_file(cli.data_file));
    tracing::debug!("Using data file {:?}", data_file.path());

    // Corrupted data is fatal; nothing is written back
    let data = match data_file.ensure_initialized().and_then(|_| data_file.load()) {
        Ok(data) => data,
        Err(e) => {
            tracing::error!("Load of {:?} failed: {}", data_file.path(), e);
            eprintln!("ERROR: Failed to load system data. {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let writer = BackgroundWriter::spawn(data_file, config.writer.queue_capacity)?;
    let mut planner = Planner::new(data, writer);

    let result = match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => {
            let stdin = io::stdin();
            Menu::new(&mut planner, stdin.lock(), io::stdout()).run()
        }
        Commands::Players => cmd_players(&planner),
        Commands::AddPlayer { name, position } => cmd_add_player(&mut planner, &name, &position),
        Commands::DefineType {
            code,
            description,
            params,
        } => cmd_define_type(&mut planner, &code, &description, &params),
        Commands::CreatePlan { player, target } => cmd_create_plan(&mut planner, player, target),
        Commands::AddUnit { plan, code, params } => cmd_add_unit(&mut planner, plan, &code, &params),
        Commands::Complete { plan, unit } => cmd_complete(&mut planner, plan, unit),
        Commands::Summary { plan } => cmd_summary(&planner, plan),
        Commands::Export { output } => cmd_export(&planner, &output),
    };

    // Wait for queued saves before exiting
    let (_, writer) = planner.into_parts();
    let saved = writer.shutdown();

    let code = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_validation() => {
            eprintln!("ERROR: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => return Err(e),
    };
    saved?;
    Ok(code)
}

fn not_found(what: &str) -> Error {
    Error::Validation(format!("{} not found.", what))
}

fn cmd_players<S: SnapshotSink>(planner: &Planner<S>) -> Result<()> {
    display::write_roster(&mut io::stdout(), planner.data())?;
    Ok(())
}

fn cmd_add_player<S: SnapshotSink>(planner: &mut Planner<S>, name: &str, position: &str) -> Result<()> {
    let player = planner.add_player(name, position)?;
    println!("Player '{}' (ID {}) successfully added.", player.name, player.id);
    Ok(())
}

fn cmd_define_type<S: SnapshotSink>(
    planner: &mut Planner<S>,
    code: &str,
    description: &str,
    params: &str,
) -> Result<()> {
    let parameters = parse_parameter_spec(params)?;
    let exercise_type = planner.define_exercise_type(code, description, parameters)?;
    println!("New exercise type '{}' successfully defined.", exercise_type.code);
    Ok(())
}

fn cmd_create_plan<S: SnapshotSink>(
    planner: &mut Planner<S>,
    player_id: u32,
    target: Option<NaiveDate>,
) -> Result<()> {
    let plan = planner
        .create_training_plan(player_id, target)?
        .ok_or_else(|| not_found("Player"))?;
    println!("Plan ID {} created for player {}.", plan.id, player_id);
    Ok(())
}

fn cmd_add_unit<S: SnapshotSink>(
    planner: &mut Planner<S>,
    plan_id: u32,
    code: &str,
    raw_params: &[String],
) -> Result<()> {
    let exercise_type = planner
        .find_exercise_type(code)
        .cloned()
        .ok_or_else(|| not_found("Exercise type"))?;

    let raw = raw_params
        .iter()
        .map(|p| parse_key_value(p))
        .collect::<Result<Vec<_>>>()?;
    let params = coerce_params(&exercise_type, &raw)?;

    let unit = planner
        .add_exercise_to_plan(plan_id, &exercise_type.code, params)?
        .ok_or_else(|| not_found("Plan"))?;
    println!(
        "Exercise '{}' added to Plan {} as unit {}.",
        unit.type_code, plan_id, unit.id
    );
    Ok(())
}

fn cmd_complete<S: SnapshotSink>(planner: &mut Planner<S>, plan_id: u32, unit_id: u32) -> Result<()> {
    if !planner.mark_exercise_completed(plan_id, unit_id) {
        return Err(not_found("Plan or unit"));
    }
    println!("Unit ID {} in Plan {} marked as COMPLETED.", unit_id, plan_id);
    if let Some(summary) = planner.plan_summary(plan_id) {
        println!("Plan {}: {}", plan_id, summary);
    }
    Ok(())
}

fn cmd_summary<S: SnapshotSink>(planner: &Planner<S>, plan_id: u32) -> Result<()> {
    let plan = planner.find_plan(plan_id).ok_or_else(|| not_found("Plan"))?;
    display::write_plan_detail(&mut io::stdout(), planner.data(), plan)?;
    Ok(())
}

fn cmd_export<S: SnapshotSink>(planner: &Planner<S>, output: &std::path::Path) -> Result<()> {
    let rows = export_plans_csv(planner.data(), output)?;
    println!("✓ Exported {} rows to {}", rows, output.display());
    Ok(())
}
