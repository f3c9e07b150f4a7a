use std::env;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::data::champion::{Category, Mode};
use crate::data::game_data::{load_game_data, StaticGameData, DEFAULT_GAME_DATA_PATH};
use crate::data::roster::{FileRoster, DEFAULT_ROSTER_PATH};
use crate::optimizer::weights::{DuplicatePreset, EffectPreset, RangePreset};
use crate::optimizer::combination;
use crate::session::{
    Orchestrator, OrchestratorOptions, Presentation, TeamResult, TeamSession,
    DEFAULT_SESSION_PATH,
};

/// Environment variable naming the directory holding roster, game data and session files.
pub const DATA_DIR_ENV: &str = "SYNERGIST_DATA_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Build,
    Estimate,
    Configure,
    Presets,
    Import,
    Export,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("build") => Some(Command::Build),
        Some("estimate") => Some(Command::Estimate),
        Some("configure") => Some(Command::Configure),
        Some("presets") => Some(Command::Presets),
        Some("import") => Some(Command::Import),
        Some("export") => Some(Command::Export),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let paths = DataPaths::from_env();
    match parse_command(args) {
        Some(Command::Build) => handle_build(args, &paths),
        Some(Command::Estimate) => handle_estimate(args, &paths),
        Some(Command::Configure) => handle_configure(args, &paths),
        Some(Command::Presets) => handle_presets(),
        Some(Command::Import) => handle_import(args, &paths),
        Some(Command::Export) => handle_export(&paths),
        None => {
            eprintln!("usage: synergist <build|estimate|configure|presets|import|export>");
            2
        }
    }
}

/// Files the CLI works on, all under one data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub roster: PathBuf,
    pub game_data: PathBuf,
    pub session: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            roster: PathBuf::from(DEFAULT_ROSTER_PATH),
            game_data: PathBuf::from(DEFAULT_GAME_DATA_PATH),
            session: PathBuf::from(DEFAULT_SESSION_PATH),
        }
    }
}

impl DataPaths {
    /// Default paths, moved to `$SYNERGIST_DATA_DIR` when it is set.
    pub fn from_env() -> Self {
        match env::var_os(DATA_DIR_ENV) {
            Some(dir) => Self::in_dir(dir),
            None => Self::default(),
        }
    }

    /// Default file names placed under `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let defaults = Self::default();
        Self {
            roster: relocate(dir, &defaults.roster),
            game_data: relocate(dir, &defaults.game_data),
            session: relocate(dir, &defaults.session),
        }
    }
}

fn relocate(dir: &Path, default_path: &Path) -> PathBuf {
    match default_path.file_name() {
        Some(name) => dir.join(name),
        None => dir.to_path_buf(),
    }
}

/// Logs build progress in tenths.
#[derive(Debug, Default)]
struct LogPresentation {
    last_tenth: Option<u32>,
}

impl Presentation for LogPresentation {
    fn progress(&mut self, fraction: f64) {
        if fraction <= 0.0 {
            self.last_tenth = None;
            return;
        }
        let tenth = (fraction * 10.0).floor() as u32;
        if self.last_tenth != Some(tenth) {
            self.last_tenth = Some(tenth);
            tracing::info!(percent = tenth * 10, "building team");
        }
    }

    fn team_built(&mut self, mode: Mode, result: &TeamResult) {
        tracing::info!(%mode, teams = result.counts.teams, "team built");
    }
}

type CliOrchestrator = Orchestrator<FileRoster, StaticGameData, LogPresentation>;

/// Session changes are written back only when `persist` is set.
fn open_orchestrator(paths: &DataPaths, persist: bool) -> Result<CliOrchestrator, String> {
    let game_data = load_game_data(&paths.game_data).map_err(|err| err.to_string())?;
    let roster = FileRoster::load(&paths.roster).map_err(|err| err.to_string())?;
    let session = TeamSession::load(&paths.session).map_err(|err| err.to_string())?;
    Ok(Orchestrator::new(
        roster,
        game_data,
        LogPresentation::default(),
        session,
        OrchestratorOptions {
            progress_hold: Duration::ZERO,
            session_path: persist.then(|| paths.session.clone()),
        },
    ))
}

/// Apply `[mode] [size]` overrides from the command line.
fn session_overrides(args: &[String], session: &TeamSession) -> Result<Option<TeamSession>, String> {
    let mut updated = session.clone();
    if let Some(mode) = args.get(2) {
        updated = updated.with_mode(mode.parse::<Mode>()?);
    }
    if let Some(size) = args.get(3) {
        let size = size
            .parse::<usize>()
            .map_err(|_| format!("invalid team size '{size}'"))?;
        updated = updated.with_size(size);
    }
    Ok((updated != *session).then_some(updated))
}

fn handle_build(args: &[String], paths: &DataPaths) -> i32 {
    let mut orchestrator = match open_orchestrator(paths, true) {
        Ok(orchestrator) => orchestrator,
        Err(err) => {
            eprintln!("build failed: {err}");
            return 1;
        }
    };
    match session_overrides(args, orchestrator.session()) {
        Ok(Some(session)) => {
            if let Err(err) = orchestrator.set_session(session) {
                eprintln!("failed to save session: {err}");
                return 1;
            }
        }
        Ok(None) => {}
        Err(err) => {
            eprintln!("usage: synergist build [mode] [size] ({err})");
            return 2;
        }
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start runtime: {err}");
            return 1;
        }
    };

    let mode = orchestrator.session().mode();
    let size = orchestrator.session().size();
    let built = runtime.block_on(orchestrator.build_team());
    let result = match built {
        Ok(result) => result.cloned(),
        Err(err) => {
            eprintln!("build failed: {err}");
            return 1;
        }
    };

    let payload = serde_json::json!({
        "mode": mode,
        "size": size,
        "built_at": orchestrator.last_built().map(|at| at.to_rfc3339()),
        "result": result,
    });
    print_json(&payload)
}

fn handle_estimate(args: &[String], paths: &DataPaths) -> i32 {
    let mut orchestrator = match open_orchestrator(paths, false) {
        Ok(orchestrator) => orchestrator,
        Err(err) => {
            eprintln!("estimate failed: {err}");
            return 1;
        }
    };
    match session_overrides(args, orchestrator.session()) {
        Ok(Some(session)) => {
            if let Err(err) = orchestrator.set_session(session) {
                eprintln!("estimate failed: {err}");
                return 1;
            }
        }
        Ok(None) => {}
        Err(err) => {
            eprintln!("usage: synergist estimate [mode] [size] ({err})");
            return 2;
        }
    }
    let candidates = orchestrator.eligible_champions().len();
    let size = orchestrator.session().size();
    print_json(&serde_json::json!({
        "mode": orchestrator.session().mode(),
        "candidates": candidates,
        "team_size": size,
        "teams": combination(candidates, size),
    }))
}

fn handle_configure(args: &[String], paths: &DataPaths) -> i32 {
    const USAGE: &str = "usage: synergist configure <mode|size|effects|duplicates|range|star|type> <value> [on|off]";
    let session = match TeamSession::load(&paths.session) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("configure failed: {err}");
            return 1;
        }
    };
    let (Some(setting), Some(value)) = (args.get(2), args.get(3)) else {
        eprintln!("{USAGE}");
        return 2;
    };
    let enabled = args.get(4).map(String::as_str) != Some("off");

    let updated = match setting.as_str() {
        "mode" => value.parse::<Mode>().map(|mode| session.with_mode(mode)),
        "size" => value
            .parse::<usize>()
            .map(|size| session.with_size(size))
            .map_err(|_| format!("invalid team size '{value}'")),
        "effects" => value
            .parse::<EffectPreset>()
            .map(|preset| session.with_effect_preset(preset)),
        "duplicates" => value
            .parse::<DuplicatePreset>()
            .map(|preset| session.with_duplicate_preset(preset)),
        "range" => value
            .parse::<RangePreset>()
            .map(|preset| session.with_range_preset(preset)),
        "star" => value
            .parse::<u8>()
            .map(|stars| session.with_star(stars, enabled))
            .map_err(|_| format!("invalid star level '{value}'")),
        "type" => value
            .parse::<Category>()
            .map(|category| session.with_category(category, enabled)),
        _ => Err(format!("unknown setting '{setting}'")),
    };

    let updated = match updated {
        Ok(updated) => updated,
        Err(err) => {
            eprintln!("{USAGE} ({err})");
            return 2;
        }
    };
    if let Err(err) = updated.save(&paths.session) {
        eprintln!("configure failed: {err}");
        return 1;
    }
    print_json(&updated)
}

fn handle_presets() -> i32 {
    let effects: serde_json::Map<String, serde_json::Value> = EffectPreset::ALL
        .iter()
        .map(|preset| (preset.to_string(), serde_json::json!(preset.weights())))
        .collect();
    let duplicates: serde_json::Map<String, serde_json::Value> = DuplicatePreset::ALL
        .iter()
        .map(|preset| (preset.to_string(), serde_json::json!(preset.weights())))
        .collect();
    let ranges: serde_json::Map<String, serde_json::Value> = RangePreset::ALL
        .iter()
        .map(|preset| {
            let range = preset.apply(Default::default());
            (preset.to_string(), serde_json::json!(range))
        })
        .collect();
    print_json(&serde_json::json!({
        "effects": effects,
        "duplicates": duplicates,
        "range": ranges,
    }))
}

fn handle_import(args: &[String], paths: &DataPaths) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: synergist import <roster.csv>");
        return 2;
    };

    let game_data = match load_game_data(&paths.game_data) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("import failed: {err}");
            return 1;
        }
    };
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("import failed: cannot open {path}: {err}");
            return 1;
        }
    };
    let imported = FileRoster::load(&paths.roster)
        .and_then(|mut roster| roster.import_csv(file, &game_data));
    match imported {
        Ok(report) => {
            println!(
                "import complete: imported={}, skipped={}",
                report.imported,
                report.skipped.len()
            );
            for skipped in report.skipped {
                eprintln!("- {skipped}");
            }
            0
        }
        Err(err) => {
            eprintln!("import failed: {err}");
            1
        }
    }
}

fn handle_export(paths: &DataPaths) -> i32 {
    let exported = FileRoster::load(&paths.roster).and_then(|roster| roster.export_csv(io::stdout()));
    match exported {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("export failed: {err}");
            1
        }
    }
}

fn print_json<T: serde::Serialize>(payload: &T) -> i32 {
    match serde_json::to_string_pretty(payload) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize output: {err}");
            1
        }
    }
}
