//=========================================================================
// Aetheric Scenes Demo Driver
//=========================================================================
//
// Runs a game on a background logic thread and feeds it a script of
// driver commands, one step at a time.
//
//   aetheric_scenes start pause pause game_over quit
//   aetheric_scenes --config game.toml --step-ms 250 start:Level2 quit
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::PathBuf;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;

//=== Internal Dependencies ===============================================

use aetheric_scenes::prelude::*;

//=== Defaults ============================================================

const DEFAULT_CONFIG: &str = r#"
[info]
title = "Aetheric Demo"
description = "Walks through menus and levels"

[runtime]
tps = 60.0
channel_capacity = 128
load_latency_ms = 40

[scenes]
levels = ["level_1", "level_2", "level_3"]

[scenes.names]
main_menu = "MainMenu"
pause_menu = "PauseMenu"
options_menu = "OptionsMenu"
hud = "Hud"
game_over = "GameOver"
level_1 = "Level1"
level_2 = "Level2"
level_3 = "Level3"
"#;

//=== CLI =================================================================

#[derive(Parser)]
#[command(name = "aetheric_scenes")]
#[command(about = "Drive the scene lifecycle demo with a script of steps", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML config file (built-in demo config if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Delay between script steps in milliseconds
    #[arg(long, default_value = "200")]
    step_ms: u64,

    /// Steps: start, start:<level>, pause, quit, or a state name
    #[arg(default_value = "start")]
    script: Vec<Step>,
}

//=== Script Steps ========================================================

#[derive(Debug, Clone)]
struct Step(GameCommand);

impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let command = match s {
            "" => return Err(anyhow!("empty step")),
            "start" => GameCommand::StartLevel(None),
            "pause" => GameCommand::TogglePause,
            "quit" => GameCommand::ChangeState(ApplicationState::QuitGame),
            _ => match s.strip_prefix("start:") {
                Some(level) if !level.is_empty() => {
                    GameCommand::StartLevel(Some(level.to_string()))
                }
                Some(_) => return Err(anyhow!("missing level name in '{}'", s)),
                None => GameCommand::ChangeStateNamed(s.to_string()),
            },
        };
        Ok(Step(command))
    }
}

//=== Entry Point =========================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::from_toml_str(DEFAULT_CONFIG).context("built-in config")?,
    };

    let loader =
        ThreadedLoader::new(config.scenes.scene_ids()).with_latency(config.runtime.load_latency());
    let game = GameBuilder::new().with_config(config).build(loader);

    let commands = game.commands();
    let handle = game.spawn().context("spawning logic thread")?;
    let step_delay = Duration::from_millis(cli.step_ms);

    for Step(command) in cli.script {
        thread::sleep(step_delay);
        info!("Script step: {:?}", command);
        if commands.send(command).is_err() {
            info!("Logic loop already stopped, skipping remaining steps");
            break;
        }
    }

    thread::sleep(step_delay);
    // The loop may already have exited on QuitGame
    let _ = commands.send(GameCommand::Shutdown);
    drop(commands);

    let machine = handle
        .join()
        .map_err(|_| anyhow!("logic thread panicked"))?;

    let loaded: Vec<&str> = machine
        .scenes()
        .loaded_scenes()
        .into_iter()
        .map(SceneId::as_str)
        .collect();

    info!(
        "'{}' finished in state {} (level {:?}, loaded: [{}])",
        machine.info().title,
        machine.state(),
        machine.current_level_index(),
        loaded.join(", ")
    );

    Ok(())
}

//=========================================================================
// Unit Tests
//=========================================================================
