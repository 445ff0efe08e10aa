//! ArCircuit CLI - replay recorded marker-tracking sessions from the command line.

use anyhow::Context;
use arcircuit::{
    CircuitConfig, ComponentState, FrameDiagnostic, FrameOutput, Session, Simulation,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arcircuit")]
#[command(about = "AR circuit power simulation: replay marker-tracking sessions", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded tracking session and print component states per frame
    Simulate {
        /// Path to a session JSON file
        #[arg(value_name = "SESSION")]
        session: PathBuf,

        /// Circuit config JSON (defaults to the built-in kit)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Override the proximity threshold
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// List the registered circuit components
    Components {
        /// Circuit config JSON (defaults to the built-in kit)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output, one document for the whole session
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = match cli.command {
        Commands::Simulate {
            session,
            config,
            threshold,
            format,
        } => handle_simulate(&session, config.as_deref(), threshold, &format),
        Commands::Components { config } => handle_components(config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("arcircuit={level},arcircuit_cli={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CircuitConfig> {
    match path {
        Some(path) => CircuitConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(CircuitConfig::builtin()?),
    }
}

fn handle_simulate(
    session_path: &Path,
    config: Option<&Path>,
    threshold: Option<f32>,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let mut config = load_config(config)?;
    if let Some(threshold) = threshold {
        config = config.with_threshold(threshold);
    }
    let session = Session::from_file(session_path)
        .with_context(|| format!("loading session {}", session_path.display()))?;
    tracing::info!(frames = session.len(), "Replaying session");

    let mut sim = Simulation::from_config(config)?;
    let outputs = sim.replay(&session)?;

    match format {
        OutputFormat::Human => output_human(&outputs),
        OutputFormat::Json => output_json(&outputs)?,
    }
    Ok(())
}

fn output_human(outputs: &[FrameOutput]) {
    for output in outputs {
        println!("\nFrame {}", output.frame);
        println!("{}", "─".repeat(60));

        if output.components.is_empty() {
            println!("  No components tracked");
        }
        for state in &output.components {
            println!("  {}", format_state(state));
        }

        if !output.report.connections.is_empty() {
            println!("\n  Connections:");
            for (a, b) in &output.report.connections {
                println!("    {} <-> {}", a, b);
            }
        }

        if !output.report.diagnostics.is_empty() {
            println!("\n  Notes:");
            for diagnostic in &output.report.diagnostics {
                println!("    - {}", format_diagnostic(diagnostic));
            }
        }
    }

    if let Some(last) = outputs.last() {
        let enabled = last.components.iter().filter(|c| c.enabled).count();
        println!("\n  Summary:");
        println!("    Frames:  {}", outputs.len());
        println!("    Live:    {}", last.components.len());
        println!("    Enabled: {}", enabled);
    }
}

fn format_state(state: &ComponentState) -> String {
    let p = state.pose.position;
    format!(
        "{:<10} {:<10} {:<4} {:<9} {:<7} ({:.3}, {:.3}, {:.3})",
        state.name,
        state.role.to_string(),
        if state.enabled { "ON" } else { "off" },
        if state.powered { "powered" } else { "unpowered" },
        if state.visible { "shown" } else { "hidden" },
        p.x,
        p.y,
        p.z
    )
}

fn format_diagnostic(diagnostic: &FrameDiagnostic) -> String {
    match diagnostic {
        FrameDiagnostic::StaleEventReference { name, event } => {
            format!("{:?} event for {} ignored (not live)", event, name)
        }
        FrameDiagnostic::AlreadyLive { name } => {
            format!("{} added twice; existing component kept", name)
        }
        FrameDiagnostic::MissingTrackingData { name, status } => {
            format!("{} hidden ({:?}), skipped in power sweep", name, status)
        }
    }
}

fn output_json(outputs: &[FrameOutput]) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "frames": outputs,
        "summary": {
            "total_frames": outputs.len(),
            "enabled": outputs
                .last()
                .map(|o| o.components.iter().filter(|c| c.enabled).map(|c| c.name.clone()).collect::<Vec<_>>())
                .unwrap_or_default(),
        }
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn handle_components(config: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let registry = config.registry()?;

    println!("Registered components (threshold {}):\n", config.proximity_threshold);
    for entry in registry.entries() {
        println!("  {}", entry.name);
        println!("    role: {}", entry.role);
        println!(
            "    templates: {} / {}",
            entry.on_template,
            entry.off_template()
        );
        println!();
    }
    Ok(())
}
