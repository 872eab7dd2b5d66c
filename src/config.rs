/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to defaults if the file is missing or incomplete.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::GameError;

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub game: LoopConfig,
    pub keys: KeyConfig,
    pub gamepad: GamepadConfig,
    pub log: LogConfig,
    /// Problems found while loading. Logged once the subscriber is up,
    /// since the log file location itself comes from this config.
    pub warnings: Vec<String>,
}

/// Everything the game loop is constructed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoopConfig {
    pub frame_rate: u32,
    pub tick_wrap: u32,
    pub input_period: u32,
    pub enemy_move_period: u32,
    pub spawn_period: u32,
    pub death_check_period: u32,
    pub max_enemies: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyConfig {
    pub up: Vec<char>,
    pub down: Vec<char>,
    pub left: Vec<char>,
    pub right: Vec<char>,
    pub quit: Vec<char>,
    pub place: Vec<char>,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub place: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub file: PathBuf,
    pub level: String,
}

impl LoopConfig {
    /// Wall-clock budget of one frame.
    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        let checks = [
            ("frame_rate", self.frame_rate),
            ("tick_wrap", self.tick_wrap),
            ("input_period", self.input_period),
            ("enemy_move_period", self.enemy_move_period),
            ("spawn_period", self.spawn_period),
            ("death_check_period", self.death_check_period),
        ];
        for (name, value) in checks {
            if value == 0 {
                return Err(GameError::Config(format!("{name} must be at least 1")));
            }
        }
        Ok(())
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        LoopConfig {
            frame_rate: default_frame_rate(),
            tick_wrap: default_tick_wrap(),
            input_period: default_input_period(),
            enemy_move_period: default_enemy_move_period(),
            spawn_period: default_spawn_period(),
            death_check_period: default_death_check_period(),
            max_enemies: default_max_enemies(),
        }
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default, rename = "loop")]
    game_loop: TomlLoop,
    #[serde(default)]
    tickers: TomlTickers,
    #[serde(default)]
    enemies: TomlEnemies,
    #[serde(default)]
    keys: TomlKeys,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlLoop {
    #[serde(default = "default_frame_rate")]
    frame_rate: u32,
    #[serde(default = "default_tick_wrap")]
    tick_wrap: u32,
}

#[derive(Deserialize, Debug)]
struct TomlTickers {
    #[serde(default = "default_input_period")]
    input_period: u32,
    #[serde(default = "default_enemy_move_period")]
    enemy_move_period: u32,
    #[serde(default = "default_spawn_period")]
    spawn_period: u32,
    #[serde(default = "default_death_check_period")]
    death_check_period: u32,
}

#[derive(Deserialize, Debug)]
struct TomlEnemies {
    #[serde(default = "default_max_enemies")]
    max_enemies: usize,
}

#[derive(Deserialize, Debug)]
struct TomlKeys {
    #[serde(default = "default_keys_up")]
    up: Vec<String>,
    #[serde(default = "default_keys_down")]
    down: Vec<String>,
    #[serde(default = "default_keys_left")]
    left: Vec<String>,
    #[serde(default = "default_keys_right")]
    right: Vec<String>,
    #[serde(default = "default_keys_quit")]
    quit: Vec<String>,
    #[serde(default = "default_keys_place")]
    place: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_place")]
    place: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_level")]
    level: String,
}

// ── Defaults ──

fn default_frame_rate() -> u32 { 60 }
fn default_tick_wrap() -> u32 { 60 }
fn default_input_period() -> u32 { 1 }
fn default_enemy_move_period() -> u32 { 20 } // 3 decisions per second
fn default_spawn_period() -> u32 { 60 }      // one spawn per second
fn default_death_check_period() -> u32 { 1 }
fn default_max_enemies() -> usize { 8 }

fn default_keys_up() -> Vec<String> { vec!["k".into(), "w".into()] }
fn default_keys_down() -> Vec<String> { vec!["j".into(), "s".into()] }
fn default_keys_left() -> Vec<String> { vec!["h".into(), "a".into()] }
fn default_keys_right() -> Vec<String> { vec!["l".into(), "d".into()] }
fn default_keys_quit() -> Vec<String> { vec!["q".into()] }
fn default_keys_place() -> Vec<String> { vec![" ".into(), "b".into()] }

fn default_pad_place() -> Vec<String> { vec!["A".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }

fn default_log_file() -> String { "threadless.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlLoop {
    fn default() -> Self {
        TomlLoop {
            frame_rate: default_frame_rate(),
            tick_wrap: default_tick_wrap(),
        }
    }
}

impl Default for TomlTickers {
    fn default() -> Self {
        TomlTickers {
            input_period: default_input_period(),
            enemy_move_period: default_enemy_move_period(),
            spawn_period: default_spawn_period(),
            death_check_period: default_death_check_period(),
        }
    }
}

impl Default for TomlEnemies {
    fn default() -> Self {
        TomlEnemies { max_enemies: default_max_enemies() }
    }
}

impl Default for TomlKeys {
    fn default() -> Self {
        TomlKeys {
            up: default_keys_up(),
            down: default_keys_down(),
            left: default_keys_left(),
            right: default_keys_right(),
            quit: default_keys_quit(),
            place: default_keys_place(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            place: default_pad_place(),
            quit: default_pad_quit(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog {
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut warnings = Vec::new();
        let toml_cfg = load_toml(&search_dirs, &mut warnings);
        Self::from_schema(toml_cfg, warnings)
    }

    /// Parse a config document directly. Used by tests and by `load`.
    pub fn from_toml_str(text: &str) -> Result<Self, GameError> {
        let cfg = toml::from_str::<TomlConfig>(text)
            .map_err(|e| GameError::Config(e.to_string()))?;
        Ok(Self::from_schema(cfg, Vec::new()))
    }

    fn from_schema(cfg: TomlConfig, mut warnings: Vec<String>) -> Self {
        let keys = KeyConfig {
            up: parse_chars("up", &cfg.keys.up, &mut warnings),
            down: parse_chars("down", &cfg.keys.down, &mut warnings),
            left: parse_chars("left", &cfg.keys.left, &mut warnings),
            right: parse_chars("right", &cfg.keys.right, &mut warnings),
            quit: parse_chars("quit", &cfg.keys.quit, &mut warnings),
            place: parse_chars("place", &cfg.keys.place, &mut warnings),
        };
        shared_bindings(&keys, &mut warnings);

        let game = LoopConfig {
            frame_rate: cfg.game_loop.frame_rate,
            tick_wrap: cfg.game_loop.tick_wrap,
            input_period: cfg.tickers.input_period,
            enemy_move_period: cfg.tickers.enemy_move_period,
            spawn_period: cfg.tickers.spawn_period,
            death_check_period: cfg.tickers.death_check_period,
            max_enemies: cfg.enemies.max_enemies,
        };
        uneven_periods(&game, &mut warnings);

        GameConfig {
            game,
            keys,
            gamepad: GamepadConfig {
                place: cfg.gamepad.place,
                quit: cfg.gamepad.quit,
            },
            log: LogConfig {
                file: PathBuf::from(cfg.log.file),
                level: cfg.log.level,
            },
            warnings,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_schema(TomlConfig::default(), Vec::new())
    }
}

/// Each binding must be exactly one character.
fn parse_chars(name: &str, raw: &[String], warnings: &mut Vec<String>) -> Vec<char> {
    let mut out = Vec::with_capacity(raw.len());
    for s in raw {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => out.push(c),
            _ => warnings.push(format!("keys.{name}: ignoring binding {s:?} (not a single character)")),
        }
    }
    out
}

/// A character listed under several keys ends up bound to the last group
/// (order: up, down, left, right, quit, place).
fn shared_bindings(keys: &KeyConfig, warnings: &mut Vec<String>) {
    let groups = [
        ("up", &keys.up),
        ("down", &keys.down),
        ("left", &keys.left),
        ("right", &keys.right),
        ("quit", &keys.quit),
        ("place", &keys.place),
    ];
    let mut owner: Vec<(char, &str)> = Vec::new();
    for (name, list) in groups {
        for &c in list.iter() {
            match owner.iter_mut().find(|(seen, _)| *seen == c) {
                Some(slot) if slot.1 != name => {
                    warnings.push(format!(
                        "keys.{name}: {c:?} is also bound under keys.{}; keys.{name} wins",
                        slot.1
                    ));
                    slot.1 = name;
                }
                Some(_) => {}
                None => owner.push((c, name)),
            }
        }
    }
}

/// A period that does not divide the wrap fires unevenly: the counter
/// resets to 0 before the gap completes.
fn uneven_periods(game: &LoopConfig, warnings: &mut Vec<String>) {
    if game.tick_wrap == 0 {
        return;
    }
    let periods = [
        ("input_period", game.input_period),
        ("enemy_move_period", game.enemy_move_period),
        ("spawn_period", game.spawn_period),
        ("death_check_period", game.death_check_period),
    ];
    for (name, period) in periods {
        if period != 0 && game.tick_wrap % period != 0 {
            warnings.push(format!(
                "tickers.{name} = {period} does not divide loop.tick_wrap = {}; it will fire unevenly",
                game.tick_wrap
            ));
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        warnings.push(format!("{}: parse error, using defaults: {e}", path.display()));
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warnings.push(format!("could not read {}: {e}", path.display()));
                }
            }
        }
    }
    TomlConfig::default()
}
