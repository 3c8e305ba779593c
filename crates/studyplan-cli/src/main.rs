mod config;
mod plan_cmd;
mod serve_cmd;
mod timetable_cmd;

#[cfg(test)]
mod test_util;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use config::StudyPlanConfig;

#[derive(Parser)]
#[command(name = "studyplan", about = "Exam-driven study plan generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a studyplan config file
    Init {
        /// Address the server binds to
        #[arg(long, default_value = config::DEFAULT_BIND)]
        bind: String,
        /// Port the server listens on
        #[arg(long, default_value_t = config::DEFAULT_PORT)]
        port: u16,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Run the HTTP server (POST /study-plan, POST /timetable)
    Serve {
        /// Bind address (overrides STUDYPLAN_BIND env var)
        #[arg(long)]
        bind: Option<String>,
        /// Port (overrides STUDYPLAN_PORT env var)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate a study plan from a request JSON file
    Plan {
        /// Path to the request JSON file ("-" for stdin)
        file: String,
        /// Date to plan from, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Output file path (defaults to stdout)
        #[arg(long)]
        output: Option<String>,
    },
    /// Print the per-day timetable for a request JSON file
    Timetable {
        /// Path to the request JSON file ("-" for stdin)
        file: String,
        /// Date to plan from, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

/// Execute the `studyplan init` command: write config file.
fn cmd_init(bind: &str, port: u16, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        server: config::ServerSection {
            bind: bind.to_string(),
            port,
        },
        planner: config::PlannerSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  server.bind = {bind}");
    println!("  server.port = {port}");
    println!();
    println!("Next: run `studyplan serve` to start the server.");

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { bind, port, force } => {
            cmd_init(&bind, port, force)?;
        }
        Commands::Serve { bind, port } => {
            let resolved = StudyPlanConfig::resolve(bind.as_deref(), port)?;
            serve_cmd::run_serve(&resolved).await?;
        }
        Commands::Plan {
            file,
            today,
            output,
        } => {
            let resolved = StudyPlanConfig::resolve(None, None)?;
            plan_cmd::run_plan(
                &file,
                resolved.today(today),
                resolved.policy,
                output.as_deref(),
            )?;
        }
        Commands::Timetable { file, today } => {
            let resolved = StudyPlanConfig::resolve(None, None)?;
            timetable_cmd::run_timetable(&file, resolved.today(today), resolved.policy)?;
        }
    }

    Ok(())
}
