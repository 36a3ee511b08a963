use anyhow::Context;
use brick_interact::{ClickOutcome, Controller, SandboxConfig};
use brick_protocol::{InputMsg, SceneFrame};
use clap::Parser;
use std::{
    fs,
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Replay a JSON-lines script of input events through the brick sandbox")]
struct Cli {
    /// Event script, one JSON message per line. Reads stdin when omitted.
    script: Option<PathBuf>,
    /// Sandbox config (JSON). Missing fields use defaults.
    #[arg(short, long, env = "BRICK_SANDBOX_CONFIG")]
    config: Option<PathBuf>,
    /// Print a frame after every event instead of only at the end.
    #[arg(long)]
    every_event: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SandboxConfig::default(),
    };

    let reader: Box<dyn BufRead> = match &cli.script {
        Some(path) => Box::new(BufReader::new(
            fs::File::open(path).with_context(|| format!("opening script {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut controller = Controller::new(&config);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut events = 0usize;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.context("reading script")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let msg = match serde_json::from_str::<InputMsg>(line) {
            Ok(msg) => msg,
            Err(err) => {
                warn!(line = lineno + 1, %err, "skipping unrecognized event");
                continue;
            }
        };
        events += 1;
        match controller.apply(&msg) {
            Some(ClickOutcome::Ignored) => debug!(line = lineno + 1, "click ignored"),
            Some(outcome) => debug!(line = lineno + 1, ?outcome, "click applied"),
            None => {}
        }
        if cli.every_event {
            write_frame(&mut out, &controller.frame())?;
        }
    }

    if !cli.every_event {
        write_frame(&mut out, &controller.frame())?;
    }
    info!(events, bricks = controller.scene().len(), "replay finished");
    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<SandboxConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn write_frame(out: &mut impl Write, frame: &SceneFrame) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, frame)?;
    writeln!(out)?;
    Ok(())
}
