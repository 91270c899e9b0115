/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub lives: u32,
    pub theme: ThemeConfig,
    pub gamepad: GamepadConfig,
}

/// Physics tuning, all in logical pixels and seconds.
#[derive(Clone, Debug)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub jump_force: f32,
    pub walk_speed: f32,
    pub climb_speed: f32,
    pub terminal_velocity: f32,
    pub max_frame_delta: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            gravity: default_gravity(),
            jump_force: default_jump_force(),
            walk_speed: default_walk_speed(),
            climb_speed: default_climb_speed(),
            terminal_velocity: default_terminal_velocity(),
            max_frame_delta: default_max_frame_delta(),
        }
    }
}

/// One display glyph per tile/entity kind. The terminal analog of a
/// sprite sheet: a bad or empty entry falls back to the built-in glyph.
#[derive(Clone, Debug)]
pub struct ThemeConfig {
    pub ground: char,
    pub wall: char,
    pub ladder: char,
    pub spikes: char,
    pub door: char,
    pub locked_door: char,
    pub coin: char,
    pub trophy: char,
    pub gem: char,
    pub key: char,
    pub princess: char,
    pub platform: char,
    pub enemy: char,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub action: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub pause: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    game: TomlGame,
    #[serde(default)]
    theme: TomlTheme,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_jump_force")]
    jump_force: f32,
    #[serde(default = "default_walk_speed")]
    walk_speed: f32,
    #[serde(default = "default_climb_speed")]
    climb_speed: f32,
    #[serde(default = "default_terminal_velocity")]
    terminal_velocity: f32,
    #[serde(default = "default_max_frame_delta")]
    max_frame_delta: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGame {
    #[serde(default = "default_lives")]
    lives: u32,
}

#[derive(Deserialize, Debug, Default)]
struct TomlTheme {
    #[serde(default)]
    ground: String,
    #[serde(default)]
    wall: String,
    #[serde(default)]
    ladder: String,
    #[serde(default)]
    spikes: String,
    #[serde(default)]
    door: String,
    #[serde(default)]
    locked_door: String,
    #[serde(default)]
    coin: String,
    #[serde(default)]
    trophy: String,
    #[serde(default)]
    gem: String,
    #[serde(default)]
    key: String,
    #[serde(default)]
    princess: String,
    #[serde(default)]
    platform: String,
    #[serde(default)]
    enemy: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_jump")]
    jump: Vec<String>,
    #[serde(default = "default_pad_action")]
    action: Vec<String>,
    #[serde(default = "default_pad_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_pad_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_pad_pause")]
    pause: Vec<String>,
}

// ── Defaults ──

fn default_gravity() -> f32 { 320.0 }
fn default_jump_force() -> f32 { 320.0 }
fn default_walk_speed() -> f32 { 150.0 }
fn default_climb_speed() -> f32 { 80.0 }
fn default_terminal_velocity() -> f32 { 600.0 }
fn default_max_frame_delta() -> f32 { 1.0 / 30.0 }
fn default_lives() -> u32 { 3 }

fn default_pad_jump() -> Vec<String> { vec!["A".into(), "X".into()] }
fn default_pad_action() -> Vec<String> { vec!["B".into(), "Y".into()] }
fn default_pad_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_pad_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_pad_pause() -> Vec<String> { vec!["Start".into()] }

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            jump_force: default_jump_force(),
            walk_speed: default_walk_speed(),
            climb_speed: default_climb_speed(),
            terminal_velocity: default_terminal_velocity(),
            max_frame_delta: default_max_frame_delta(),
        }
    }
}

impl Default for TomlGame {
    fn default() -> Self {
        TomlGame { lives: default_lives() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_pad_jump(),
            action: default_pad_action(),
            confirm: default_pad_confirm(),
            cancel: default_pad_cancel(),
            pause: default_pad_pause(),
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        ThemeConfig {
            ground: '█',
            wall: '▓',
            ladder: '╫',
            spikes: '▲',
            door: 'Π',
            locked_door: '◫',
            coin: 'o',
            trophy: '♛',
            gem: '◆',
            key: 'k',
            princess: '♀',
            platform: '═',
            enemy: 'Ω',
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) XDG/system data dirs. Missing file or missing keys gracefully
    /// fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        GameConfig {
            physics: PhysicsConfig {
                gravity: toml_cfg.physics.gravity,
                jump_force: toml_cfg.physics.jump_force,
                walk_speed: toml_cfg.physics.walk_speed,
                climb_speed: toml_cfg.physics.climb_speed,
                terminal_velocity: toml_cfg.physics.terminal_velocity,
                max_frame_delta: toml_cfg.physics.max_frame_delta,
            },
            lives: toml_cfg.game.lives,
            theme: resolve_theme(&toml_cfg.theme),
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump,
                action: toml_cfg.gamepad.action,
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
                pause: toml_cfg.gamepad.pause,
            },
        }
    }
}

/// First char of the configured glyph, or the built-in fallback.
/// Bad entries are logged once at load, never at render time.
fn glyph_or(name: &str, configured: &str, fallback: char) -> char {
    if configured.is_empty() {
        return fallback;
    }
    match configured.chars().next() {
        Some(c) => {
            if configured.chars().count() > 1 {
                eprintln!("Warning: theme.{name} has more than one char; using '{c}'");
            }
            c
        }
        None => fallback,
    }
}

fn resolve_theme(t: &TomlTheme) -> ThemeConfig {
    let d = ThemeConfig::default();
    ThemeConfig {
        ground: glyph_or("ground", &t.ground, d.ground),
        wall: glyph_or("wall", &t.wall, d.wall),
        ladder: glyph_or("ladder", &t.ladder, d.ladder),
        spikes: glyph_or("spikes", &t.spikes, d.spikes),
        door: glyph_or("door", &t.door, d.door),
        locked_door: glyph_or("locked_door", &t.locked_door, d.locked_door),
        coin: glyph_or("coin", &t.coin, d.coin),
        trophy: glyph_or("trophy", &t.trophy, d.trophy),
        gem: glyph_or("gem", &t.gem, d.gem),
        key: glyph_or("key", &t.key, d.key),
        princess: glyph_or("princess", &t.princess, d.princess),
        platform: glyph_or("platform", &t.platform, d.platform),
        enemy: glyph_or("enemy", &t.enemy, d.enemy),
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a packaged binary still finds data next to
        // the real file.
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

    // 3. XDG data home (~/.local/share/gemrunner)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/gemrunner");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory (/usr/share/gemrunner)
    let sys = PathBuf::from("/usr/share/gemrunner");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    // 5. Fallback
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
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
