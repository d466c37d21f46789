mod runner;

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use fete_engine::{AssetCatalog, EngineConfig, Experience, LoadProgress, PlaybackPolicy, Stage, StageEvent};
use runner::{LineAction, PlayerRunner};

#[derive(Parser, Debug)]
#[command(name = "fete-player", about = "Terminal runner for the fete presentation engine")]
struct Args {
    /// Directory containing the audio assets (music/, sounds/)
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// JSON catalog overriding the built-in asset list
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// JSON playback policy overriding the shipped intervals/volumes
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Jump past the loading screen immediately
    #[arg(long)]
    skip_loading: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let catalog = match &args.catalog {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading catalog {}", path.display()))?;
            AssetCatalog::from_json(&json)?
        }
        None => AssetCatalog::builtin(),
    };

    let policy = match &args.policy {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading policy {}", path.display()))?;
            serde_json::from_str::<PlaybackPolicy>(&json)
                .with_context(|| format!("parsing policy {}", path.display()))?
        }
        None => PlaybackPolicy::default(),
    };

    let config = EngineConfig {
        asset_root: args.assets.clone(),
        policy,
        ..EngineConfig::default()
    };
    let experience = Experience::new(config, catalog, fete_engine::default_output());
    let mut runner = PlayerRunner::new(experience);

    println!("fete: press Enter to advance, r to restart, q to quit");

    let mut progress = runner.start_preload();
    if args.skip_loading {
        runner.skip_loading();
        announce(runner.poll_events());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut loading = runner.current_stage() == Stage::Preloader;

    loop {
        tokio::select! {
            changed = progress.changed(), if loading => {
                if changed.is_err() {
                    loading = false;
                    continue;
                }
                let snapshot = progress.borrow_and_update().clone();
                render_progress(&snapshot);
                if snapshot.is_complete {
                    loading = false;
                    if snapshot.has_error {
                        println!("some files couldn't load, continuing anyway");
                    }
                    // Brief hold on the finished loading screen.
                    tokio::time::sleep(Duration::from_millis(1000)).await;
                    runner.finish_loading();
                    announce(runner.poll_events());
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                if runner.handle_line(&line) == LineAction::Quit {
                    break;
                }
                if runner.current_stage() != Stage::Preloader {
                    loading = false;
                }
                announce(runner.poll_events());
            }
        }
    }

    runner.shutdown();
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn render_progress(progress: &LoadProgress) {
    let filled = (progress.fraction() * 20.0).round() as usize;
    print!(
        "\r[{}{}] {}/{} {}          ",
        "#".repeat(filled),
        "-".repeat(20 - filled),
        progress.loaded_count,
        progress.total_count,
        if progress.current_key.is_empty() {
            "done"
        } else {
            progress.current_key.as_str()
        }
    );
    let _ = std::io::stdout().flush();
    if progress.is_complete {
        println!();
    }
}

fn announce(events: Vec<StageEvent>) {
    for event in events {
        match event {
            StageEvent::Entered { stage, .. } => {
                println!("== {} ==", stage.name());
            }
            StageEvent::Reset { epoch } => {
                println!("(restarted, take {epoch})");
            }
        }
    }
}
