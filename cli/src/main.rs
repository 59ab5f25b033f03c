//! `dm-build`: compile or launch a DreamMaker project from the terminal.
//!
//! Streams the build's output to stdout as it happens, or as JSON event
//! lines with `--json`. Ctrl-C cancels the run and takes the whole process
//! tree down with it.

mod panel;

use std::path::{Path, PathBuf};
use std::process::exit;

use clap::{Parser, ValueEnum};
use futures::StreamExt;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dm_build_sdk::{
    BuildController, LaunchMode, PreparedCommand, SettingsResolver, Sink, prepare_command,
};
use panel::PanelSink;

#[derive(Parser)]
#[command(name = "dm-build", version, about = "Compile or launch a DreamMaker project")]
struct Cli {
    /// Project directory searched for build files.
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,

    /// Launch the compiled project in a host instead of compiling.
    #[arg(long, value_enum)]
    launch: Option<LaunchTarget>,

    /// JSON settings file layered over the built-in defaults.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Emit build events as JSON lines instead of plain output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LaunchTarget {
    /// The windowed client.
    Seeker,
    /// The headless server.
    Daemon,
}

impl From<LaunchTarget> for LaunchMode {
    fn from(target: LaunchTarget) -> Self {
        match target {
            LaunchTarget::Seeker => LaunchMode::Seeker,
            LaunchTarget::Daemon => LaunchMode::Daemon,
        }
    }
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays clean for build output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dm_build_cli=info,dm_build_sdk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{}", e);
        exit(1);
    }
}

async fn run(cli: Cli) -> dm_build_sdk::Result<()> {
    let settings = SettingsResolver::load(cli.settings.as_deref())?;
    let launch = cli.launch.map(LaunchMode::from).unwrap_or_default();
    let prepared = prepare_command(&settings, &cli.project_dir, launch)?;

    let mut controller = match settings.get("encoding") {
        Some(label) => BuildController::with_encoding_label(&label)?,
        None => BuildController::new(),
    };

    if cli.json {
        run_json(&mut controller, prepared, &cli.project_dir).await
    } else {
        run_panel(&mut controller, prepared, &cli.project_dir).await
    }
}

/// Plain mode: the panel sink relays chunks to stdout, Ctrl-C cancels.
async fn run_panel(
    controller: &mut BuildController,
    prepared: PreparedCommand,
    project_dir: &Path,
) -> dm_build_sdk::Result<()> {
    let mut sink = PanelSink::new();
    if let Some(notice) = &prepared.notice {
        sink.append(&format!("{notice}\n")).await;
    }
    controller.start(prepared.argv, project_dir, Box::new(sink))?;

    let Some(mut writer) = controller.writer_handle() else {
        return Ok(());
    };

    let mut cancelled = false;
    let outcome = tokio::select! {
        result = &mut writer => result.unwrap_or(None),
        _ = tokio::signal::ctrl_c() => {
            cancelled = true;
            None
        }
    };
    let outcome = if cancelled {
        info!("cancellation requested");
        controller.kill()?;
        // The writer still delivers the closing chunk before resolving.
        writer.await.unwrap_or(None)
    } else {
        outcome
    };

    if let Some(outcome) = outcome {
        if !outcome.killed {
            info!("Build finished");
        }
    }
    Ok(())
}

/// JSON mode: one event per line on stdout.
async fn run_json(
    controller: &mut BuildController,
    prepared: PreparedCommand,
    project_dir: &Path,
) -> dm_build_sdk::Result<()> {
    if let Some(notice) = &prepared.notice {
        info!("{}", notice);
    }
    let mut events = controller.start_with_events(prepared.argv, project_dir)?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("cancellation requested");
                controller.kill()?;
            }
            event = events.next() => match event {
                Some(event) => println!("{}", serde_json::to_string(&event)?),
                None => break,
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_launch_target_maps_to_mode() {
        assert_eq!(LaunchMode::from(LaunchTarget::Seeker), LaunchMode::Seeker);
        assert_eq!(LaunchMode::from(LaunchTarget::Daemon), LaunchMode::Daemon);
    }

    #[test]
    fn test_default_invocation_compiles_current_directory() {
        let cli = Cli::parse_from(["dm-build"]);
        assert_eq!(cli.project_dir, PathBuf::from("."));
        assert!(cli.launch.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_full_invocation_parses() {
        let cli = Cli::parse_from([
            "dm-build",
            "--project-dir",
            "/tmp/proj",
            "--launch",
            "seeker",
            "--json",
        ]);
        assert_eq!(cli.project_dir, PathBuf::from("/tmp/proj"));
        assert!(matches!(cli.launch, Some(LaunchTarget::Seeker)));
        assert!(cli.json);
    }
}
