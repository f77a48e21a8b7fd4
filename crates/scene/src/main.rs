use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use lure_scene::blender::{BlenderHost, DEFAULT_EXECUTABLE};
use lure_scene::kernel::KernelHost;
use lure_scene::smoke::run_headless_smoke_test;
use lure_scene::SceneHost;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HostKind {
    /// Blender subprocess in background mode
    Blender,
    /// In-process vcad kernel
    Kernel,
}

/// Check that a 3D scene host can create and rename objects headlessly
#[derive(Debug, Parser)]
#[command(name = "scene-smoke", version)]
struct Cli {
    #[arg(long, value_enum, default_value_t = HostKind::Blender)]
    host: HostKind,

    /// Blender executable
    #[arg(long, env = "BLENDER_PATH", default_value = DEFAULT_EXECUTABLE)]
    blender: PathBuf,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "lure_scene=debug" } else { "lure_scene=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let host: Box<dyn SceneHost> = match cli.host {
        HostKind::Blender => {
            let host = BlenderHost::new(cli.blender);
            tracing::info!("Using Blender at {}", host.executable().display());
            Box::new(host)
        }
        HostKind::Kernel => Box::new(KernelHost::new()),
    };

    if run_headless_smoke_test(host.as_ref(), &mut std::io::stdout()) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
