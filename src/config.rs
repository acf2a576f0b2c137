/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Last-resort pad gap when the tier table is empty.
pub const DEFAULT_PACE_MS: u64 = 300;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub gamepad: GamepadConfig,
    pub record_path: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    pub prepare_ms: u64,       // round start → length reveal
    pub lead_in_ms: u64,       // length reveal → first pad
    pub pace_tiers_ms: Vec<u64>,
    pub pace_tier_span: usize, // moves per pacing tier
    pub flash_ms: u64,         // pad highlight on press / playback
}

impl TimingConfig {
    pub fn prepare(&self) -> Duration { Duration::from_millis(self.prepare_ms) }
    pub fn lead_in(&self) -> Duration { Duration::from_millis(self.lead_in_ms) }
    pub fn flash(&self) -> Duration { Duration::from_millis(self.flash_ms) }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            prepare_ms: default_prepare(),
            lead_in_ms: default_lead_in(),
            pace_tiers_ms: default_pace_tiers(),
            pace_tier_span: default_pace_span(),
            flash_ms: default_flash(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub blue: Vec<String>,
    pub red: Vec<String>,
    pub green: Vec<String>,
    pub yellow: Vec<String>,
    pub start: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_prepare")]
    prepare_ms: u64,
    #[serde(default = "default_lead_in")]
    lead_in_ms: u64,
    #[serde(default = "default_pace_tiers")]
    pace_tiers_ms: Vec<u64>,
    #[serde(default = "default_pace_span")]
    pace_tier_span: usize,
    #[serde(default = "default_flash")]
    flash_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_blue")]
    blue: Vec<String>,
    #[serde(default = "default_red")]
    red: Vec<String>,
    #[serde(default = "default_green")]
    green: Vec<String>,
    #[serde(default = "default_yellow")]
    yellow: Vec<String>,
    #[serde(default = "default_start")]
    start: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_record_file")]
    record_file: String,
}

// ── Defaults ──

fn default_prepare() -> u64 { 500 }
fn default_lead_in() -> u64 { 600 }
fn default_pace_tiers() -> Vec<u64> { vec![600, 500, 400, 300] }
fn default_pace_span() -> usize { 5 }
fn default_flash() -> u64 { 150 }

// Face buttons follow the usual controller colors.
fn default_blue() -> Vec<String> { vec!["X".into()] }
fn default_red() -> Vec<String> { vec!["B".into()] }
fn default_green() -> Vec<String> { vec!["A".into()] }
fn default_yellow() -> Vec<String> { vec!["Y".into()] }
fn default_start() -> Vec<String> { vec!["Start".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_record_file() -> String { "saved_record.txt".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            prepare_ms: default_prepare(),
            lead_in_ms: default_lead_in(),
            pace_tiers_ms: default_pace_tiers(),
            pace_tier_span: default_pace_span(),
            flash_ms: default_flash(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            blue: default_blue(),
            red: default_red(),
            green: default_green(),
            yellow: default_yellow(),
            start: default_start(),
            quit: default_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            record_file: default_record_file(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) ~/.local/share/tapecho.
    /// Missing file or missing keys gracefully fall back to defaults.
    /// A relative `record_file` is resolved against `data_dir`.
    pub fn load(data_dir: &Path) -> Self {
        Self::load_from(&candidate_dirs(), data_dir)
    }

    fn load_from(search_dirs: &[PathBuf], data_dir: &Path) -> Self {
        Self::from_toml(load_toml(search_dirs), data_dir)
    }

    fn from_toml(toml_cfg: TomlConfig, data_dir: &Path) -> Self {
        let mut tiers = toml_cfg.timing.pace_tiers_ms;
        if tiers.is_empty() {
            log::warn!("config.toml: pace_tiers_ms is empty, using defaults");
            tiers = default_pace_tiers();
        }
        if toml_cfg.timing.pace_tier_span == 0 {
            log::warn!("config.toml: pace_tier_span must be at least 1");
        }

        let record_file = PathBuf::from(&toml_cfg.general.record_file);
        let record_path = if record_file.is_absolute() {
            record_file
        } else {
            data_dir.join(record_file)
        };

        GameConfig {
            timing: TimingConfig {
                prepare_ms: toml_cfg.timing.prepare_ms,
                lead_in_ms: toml_cfg.timing.lead_in_ms,
                pace_tiers_ms: tiers,
                pace_tier_span: toml_cfg.timing.pace_tier_span.max(1),
                flash_ms: toml_cfg.timing.flash_ms,
            },
            gamepad: GamepadConfig {
                blue: toml_cfg.gamepad.blue,
                red: toml_cfg.gamepad.red,
                green: toml_cfg.gamepad.green,
                yellow: toml_cfg.gamepad.yellow,
                start: toml_cfg.gamepad.start,
                quit: toml_cfg.gamepad.quit,
            },
            record_path,
        }
    }
}

/// Where the record and log files live.
pub fn data_dir() -> PathBuf {
    // 1. Try exe directory (works for local/portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            // Check if writable (system installs like /usr/games/ won't be)
            let test_path = parent.join(".write_test_tapecho");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home (~/.local/share/tapecho) for system installs
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/tapecho");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. Fallback to CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/tapecho)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/tapecho");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => return parse_toml(&text),
                Err(e) => {
                    log::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!("config.toml parse error, using default settings: {e}");
            TomlConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(text: &str) -> GameConfig {
        GameConfig::from_toml(parse_toml(text), Path::new("data"))
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = config_from("");
        assert_eq!(cfg.timing, TimingConfig::default());
        assert_eq!(cfg.record_path, Path::new("data").join("saved_record.txt"));
        assert_eq!(cfg.gamepad.green, vec!["A".to_string()]);
    }

    #[test]
    fn partial_timing_keeps_other_defaults() {
        let cfg = config_from("[timing]\nprepare_ms = 250\n");
        assert_eq!(cfg.timing.prepare_ms, 250);
        assert_eq!(cfg.timing.lead_in_ms, 600);
        assert_eq!(cfg.timing.pace_tiers_ms, vec![600, 500, 400, 300]);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let cfg = config_from("[timing\nprepare_ms = ");
        assert_eq!(cfg.timing, TimingConfig::default());
    }

    #[test]
    fn empty_tier_table_and_zero_span_are_repaired() {
        let cfg = config_from("[timing]\npace_tiers_ms = []\npace_tier_span = 0\n");
        assert_eq!(cfg.timing.pace_tiers_ms, vec![600, 500, 400, 300]);
        assert_eq!(cfg.timing.pace_tier_span, 1);
    }

    #[test]
    fn record_file_lands_in_the_given_data_dir() {
        let search = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();
        std::fs::write(
            search.path().join("config.toml"),
            "[general]\nrecord_file = \"best.txt\"\n",
        ).unwrap();

        let cfg = GameConfig::load_from(&[search.path().to_path_buf()], data.path());
        assert_eq!(cfg.record_path, data.path().join("best.txt"));
        // Resolving the path must not touch the data dir.
        assert_eq!(std::fs::read_dir(data.path()).unwrap().count(), 0);
    }

    #[test]
    #[cfg(unix)]
    fn absolute_record_file_is_kept() {
        let cfg = config_from("[general]\nrecord_file = \"/tmp/best.txt\"\n");
        assert_eq!(cfg.record_path, PathBuf::from("/tmp/best.txt"));
    }
}
