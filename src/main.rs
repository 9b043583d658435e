use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::warn;

use gridlogic::error::PuzzleError;
use gridlogic::loader::PuzzleDefinition;

#[derive(Parser, Debug)]
#[command(name = "gridlogic", about = "Solve grid logic puzzles by constraint propagation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Solve a puzzle definition and print the solution
    Solve {
        /// Puzzle definition (YAML, or JSON with a .json extension)
        path: PathBuf,

        /// Override the number of solve iterations (0 for no cap)
        #[arg(long)]
        max_solve_attempts: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a puzzle definition and list its rules
    Check {
        /// Puzzle definition (YAML, or JSON with a .json extension)
        path: PathBuf,
    },
}

fn init_logging() {
    env_logger::init();
}

fn load(path: &Path) -> Result<PuzzleDefinition> {
    PuzzleDefinition::from_path(path)
        .with_context(|| format!("Failed to load puzzle from {}", path.display()))
}

fn solve(path: PathBuf, max_solve_attempts: Option<usize>, json: bool) -> Result<()> {
    let mut definition = load(&path)?;
    if let Some(max_solve_attempts) = max_solve_attempts {
        definition.settings.max_solve_attempts = max_solve_attempts;
    }
    let mut puzzle = definition
        .into_puzzle()
        .map_err(|err| anyhow!("Invalid puzzle definition: {}", err))?;

    match puzzle.solve() {
        Ok(solution) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&solution)?);
            } else {
                print!("{}", solution);
            }
            Ok(())
        }
        Err(err) => {
            if let PuzzleError::Convergence { table, .. } = &err {
                warn!("Remaining possibilities:{:?}", table);
            }
            Err(anyhow!("{}", err))
        }
    }
}

fn check(path: PathBuf) -> Result<()> {
    let puzzle = load(&path)?
        .into_puzzle()
        .map_err(|err| anyhow!("Invalid puzzle definition: {}", err))?;
    println!(
        "{} categories, {} rows, {} rules",
        puzzle.categories().len(),
        puzzle.table().len(),
        puzzle.rules().len()
    );
    for (idx, rule) in puzzle.rules().iter().enumerate() {
        println!("{:>3}. {}", idx + 1, rule);
    }
    Ok(())
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    match cli.command {
        Commands::Solve {
            path,
            max_solve_attempts,
            json,
        } => solve(path, max_solve_attempts, json),
        Commands::Check { path } => check(path),
    }
}
