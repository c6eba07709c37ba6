//! Shipyard: headless session inspector
//!
//! Loads an editor configuration and a session file, prints the stacks the
//! session contains and optionally docks nearby ports and writes the session
//! back out.
//!
//! ```text
//! shipyard <config> <session> [--dock] [--resave <out>]
//! ```
//!
//! A config ending in `.cfg` is read as a legacy `StackEditor.cfg`,
//! anything else as TOML or RON.

use std::path::{Path, PathBuf};

use log::LevelFilter;
use stack_engine::core::config::{ConfigError, EditorConfig};
use stack_engine::foundation::logging;
use stack_engine::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
enum AppError {
    #[error("usage: shipyard <config> <session> [--dock] [--resave <out>] ({0})")]
    Usage(String),

    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Editor(#[from] EditorError),
}

struct Args {
    config: PathBuf,
    session: PathBuf,
    dock: bool,
    resave: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, AppError> {
        let mut positional = Vec::new();
        let mut dock = false;
        let mut resave = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--dock" => dock = true,
                "--resave" => {
                    let out = args.next().ok_or_else(|| AppError::Usage("--resave needs a path".to_string()))?;
                    resave = Some(PathBuf::from(out));
                }
                flag if flag.starts_with("--") => return Err(AppError::Usage(format!("unknown flag {flag}"))),
                _ => positional.push(PathBuf::from(arg)),
            }
        }

        let [config, session]: [PathBuf; 2] = positional
            .try_into()
            .map_err(|_| AppError::Usage("expected a config and a session path".to_string()))?;
        Ok(Self { config, session, dock, resave })
    }
}

fn load_config(path: &Path) -> Result<EditorConfig, AppError> {
    if path.extension().and_then(|ext| ext.to_str()) == Some("cfg") {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Ok(EditorConfig::from_legacy_cfg(&text))
    } else {
        Ok(EditorConfig::load_validated(path)?)
    }
}

fn dock_everything(session: &mut EditorSession) -> Result<usize, AppError> {
    let mut docked = 0;
    for key in session.registry().keys().to_vec() {
        if !session.registry().contains(key) {
            continue;
        }
        session.select(key)?;
        if let SnapOutcome::Docked(pairs) = session.snap_selection(true)? {
            docked += pairs.len();
        }
    }
    session.clear_selection();
    Ok(docked)
}

fn report(session: &EditorSession) {
    let registry = session.registry();
    let stacks = session.stacks();
    println!("{} vessel(s) in {} stack(s)", registry.len(), stacks.len());

    for (index, stack) in stacks.iter().enumerate() {
        println!("stack {}: {} vessel(s)", index + 1, stack.num_vessels());
        for key in stack.members() {
            let Some(vessel) = registry.vessel(*key) else {
                continue;
            };
            let position = registry.position(*key);
            let rotation = registry.rotation_degrees(*key);
            let docked = vessel
                .ports()
                .iter()
                .filter(|port| registry.ports()[**port].is_occupied())
                .count();
            println!(
                "  #{:<4} {:<24} pos ({:.3}, {:.3}, {:.3}) rot ({:.2}, {:.2}, {:.2}) ports {}/{} docked",
                vessel.uid(),
                vessel.class_name(),
                position.x,
                position.y,
                position.z,
                rotation.x,
                rotation.y,
                rotation.z,
                docked,
                vessel.ports().len()
            );
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let config = load_config(&args.config)?;
    let level = logging::parse_level(&config.log_level).unwrap_or(LevelFilter::Warn);
    log::set_max_level(level);

    // No mesh loader here: every part gets a two-unit cube for its bounds.
    let meshes = MeshLibrary::with_fallback(AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(1.0)));
    let mut session = EditorSession::new(config, Box::new(meshes));
    session.load_session(&args.session)?;

    if args.dock {
        let docked = dock_everything(&mut session)?;
        log::info!("Docked {} port pair(s)", docked);
    }

    report(&session);

    if let Some(out) = &args.resave {
        session.save_session(out)?;
    }
    Ok(())
}

fn main() {
    // Config decides the final level; until it is read, only warnings pass.
    if let Err(err) = logging::init_with_level(LevelFilter::Trace) {
        eprintln!("logger already set: {err}");
    }
    log::set_max_level(LevelFilter::Warn);

    let result = Args::parse(std::env::args().skip(1)).and_then(run);
    if let Err(err) = result {
        log::error!("shipyard failed: {}", err);
        eprintln!("{err}");
        std::process::exit(1);
    }
}
