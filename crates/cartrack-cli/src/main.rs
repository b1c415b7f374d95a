//! `cartrack` — command-line surface for the car-tracker lifecycle engine.
//!
//! # Usage
//!
//! ```
//! cartrack generate --count 150
//! cartrack import --file data/cars-mock.csv --clear
//! cartrack import --dry-run
//! cartrack stats --json
//! cartrack transition --plate ABC-1234 --to CHECKED_IN
//! cartrack history --plate ABC-1234
//! ```
//!
//! Database paths come from `cartrack.toml` (or `--config`), overridable via
//! `CARTRACK_`-prefixed environment variables; `--remote` targets the remote
//! database path instead of the local one. Exits non-zero on any validation
//! or storage failure, with a summary of every problem on stderr.

use std::path::PathBuf;

use anyhow::{bail, Context as _};
use cartrack_core::{
  stats::FleetStats,
  status::CarStatus,
  store::CarStore,
};
use cartrack_import::{
  generate_cars, import_batch, read_rows, write_roster, ImportOptions,
};
use cartrack_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "cartrack", about = "Car tracker import and status tooling")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "cartrack.toml")]
  config: PathBuf,

  /// Target the remote database path from the config instead of the local
  /// one.
  #[arg(long, global = true)]
  remote: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Import a roster CSV into the database.
  Import {
    /// Path to the roster CSV (`id,make,model,color,licensePlate`).
    #[arg(long, default_value = "data/cars-mock.csv")]
    file: PathBuf,

    /// Clear existing cars and history before importing. Irreversible.
    #[arg(long)]
    clear: bool,

    /// Validate and deduplicate without writing anything.
    #[arg(long)]
    dry_run: bool,

    /// Skip invalid rows instead of rejecting the whole roster.
    #[arg(long)]
    best_effort: bool,

    /// Rows per atomic storage batch (overrides the config file).
    #[arg(long)]
    batch_size: Option<usize>,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
  },

  /// Write a fresh mock roster CSV in the import format.
  Generate {
    /// Number of cars to generate.
    #[arg(long, default_value_t = 150)]
    count: usize,

    /// Output path. Overwritten if present.
    #[arg(long, default_value = "data/cars-mock.csv")]
    out: PathBuf,
  },

  /// Show fleet counts by status and by make.
  Stats {
    #[arg(long)]
    json: bool,
  },

  /// Move one car to a new status.
  Transition {
    /// License plate of the car (case-insensitive).
    #[arg(long)]
    plate: String,

    /// Requested status, e.g. CHECKED_IN.
    #[arg(long)]
    to: String,

    /// Required when resetting to PRE_ARRIVAL.
    #[arg(long)]
    reason: Option<String>,
  },

  /// Print a car's full status ledger.
  History {
    #[arg(long)]
    plate: String,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

fn default_local_db() -> String { "data/cartrack.db".to_owned() }

/// Shape of `cartrack.toml`. Every field has a default so the file itself is
/// optional.
#[derive(Debug, Deserialize)]
struct Settings {
  #[serde(default = "default_local_db")]
  local_db:   String,
  #[serde(default)]
  remote_db:  Option<String>,
  #[serde(default = "default_batch_size")]
  batch_size: usize,
}

fn default_batch_size() -> usize { cartrack_import::pipeline::DEFAULT_BATCH_SIZE }

fn load_settings(path: &PathBuf) -> anyhow::Result<Settings> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path.clone()).required(false))
    .add_source(config::Environment::with_prefix("CARTRACK"))
    .build()
    .context("failed to read configuration")?;

  settings
    .try_deserialize()
    .context("failed to deserialise configuration")
}

async fn open_store(settings: &Settings, remote: bool) -> anyhow::Result<SqliteStore> {
  let path = if remote {
    settings
      .remote_db
      .as_deref()
      .context("--remote given but no remote_db configured")?
  } else {
    settings.local_db.as_str()
  };

  if let Some(parent) = std::path::Path::new(path).parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("creating database directory {parent:?}"))?;
  }

  SqliteStore::open(path)
    .await
    .with_context(|| format!("failed to open database at {path:?}"))
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = load_settings(&cli.config)?;
  tracing::debug!(?settings, "loaded configuration");

  match cli.command {
    Command::Import { file, clear, dry_run, best_effort, batch_size, json } => {
      let store = open_store(&settings, cli.remote).await?;
      let rows = read_rows(&file)
        .with_context(|| format!("reading roster {}", file.display()))?;

      let options = ImportOptions {
        clear,
        dry_run,
        best_effort,
        batch_size: batch_size.unwrap_or(settings.batch_size),
      };

      match import_batch(&store, rows, &options).await {
        Ok(report) => {
          if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
          } else if report.dry_run {
            println!(
              "dry run: {} of {} row(s) importable ({} skipped)",
              report.valid_rows, report.total_rows, report.skipped_rows
            );
          } else {
            println!(
              "imported {} car(s) in {} batch(es){}{}",
              report.committed,
              report.batches,
              if report.cleared { " after clearing existing data" } else { "" },
              if report.skipped_rows > 0 {
                format!(", skipped {} invalid row(s)", report.skipped_rows)
              } else {
                String::new()
              },
            );
          }
        }
        Err(err) => {
          let mut summary = String::new();
          err.write_summary(&mut summary).ok();
          eprint!("{summary}");
          bail!("import failed: {err}");
        }
      }
    }

    Command::Generate { count, out } => {
      if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
      {
        std::fs::create_dir_all(parent)
          .with_context(|| format!("creating roster directory {parent:?}"))?;
      }

      let cars = generate_cars(count, &mut rand::thread_rng());
      write_roster(&out, &cars)
        .with_context(|| format!("writing roster {}", out.display()))?;
      println!("generated {} car(s) to {}", cars.len(), out.display());
    }

    Command::Stats { json } => {
      let store = open_store(&settings, cli.remote).await?;
      let stats = FleetStats::gather(&store).await?;
      if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
      } else {
        println!("total cars: {}", stats.total);
        println!("by status:");
        for (status, count) in &stats.by_status {
          println!("  {status:<17} {count}");
        }
        println!("by make:");
        for (make, count) in &stats.by_make {
          println!("  {make:<17} {count}");
        }
      }
    }

    Command::Transition { plate, to, reason } => {
      let requested = CarStatus::parse(&to)
        .with_context(|| format!("valid statuses: {}", status_names()))?;

      let store = open_store(&settings, cli.remote).await?;
      let car = store
        .find_car_by_plate(&plate)
        .await?
        .with_context(|| format!("no car with plate {plate:?}"))?;

      let entry = store.transition(car.id, requested, reason).await?;
      println!(
        "{} ({}): {} -> {}",
        car.license_plate, car.id, car.current_status, entry.status
      );
    }

    Command::History { plate } => {
      let store = open_store(&settings, cli.remote).await?;
      let car = store
        .find_car_by_plate(&plate)
        .await?
        .with_context(|| format!("no car with plate {plate:?}"))?;

      println!(
        "{} {} {} (plate {})",
        car.color, car.make, car.model, car.license_plate
      );
      for entry in store.history(car.id).await? {
        match &entry.reason {
          Some(reason) => println!(
            "  {}  {}  (reason: {reason})",
            entry.recorded_at.to_rfc3339(),
            entry.status
          ),
          None => {
            println!("  {}  {}", entry.recorded_at.to_rfc3339(), entry.status)
          }
        }
      }
    }
  }

  Ok(())
}

fn status_names() -> String {
  CarStatus::ALL
    .iter()
    .map(|s| s.as_str())
    .collect::<Vec<_>>()
    .join(", ")
}
