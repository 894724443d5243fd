//! Game configuration.
//!
//! Settings are loaded from an INI file. Anything missing keeps its default so
//! a partial (or absent) file still yields a playable setup.
//!
//! # Configuration File Format
//!
//! ```ini
//! [game]
//! title = Mineshaft
//! start_scene = level1
//! start_paused = false
//!
//! [health]
//! start = 100
//! max = 100
//! decay_interval_ms = 2000
//!
//! [frame]
//! target_fps = 60
//! frames = 600
//!
//! [audio]
//! enabled = true
//! pickup_follow_up_cue = PlayerForeman line2
//! defeat_cue = Breathing2
//! victory_cue =
//!
//! [level]
//! path = assets/levels/level1.json
//! extra_pickups = 0
//! seed = 42
//! ```

use std::path::{Path, PathBuf};

use configparser::ini::Ini;
use log::info;

use crate::error::EngineError;

const DEFAULT_TITLE: &str = "Mineshaft";
const DEFAULT_START_SCENE: &str = "level1";
const DEFAULT_HEALTH_START: i32 = 100;
const DEFAULT_HEALTH_MAX: i32 = 100;
const DEFAULT_DECAY_INTERVAL_MS: u64 = 2000;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_FRAMES: u64 = 600;
const DEFAULT_LEVEL_PATH: &str = "assets/levels/level1.json";
const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub title: String,
    /// Name of the scene loaded at startup.
    pub start_scene: String,
    /// Start with the menu shown and gameplay paused.
    pub start_paused: bool,
    pub health_start: i32,
    pub health_max: i32,
    pub decay_interval_ms: u64,
    pub target_fps: u32,
    /// Frames simulated by the headless runner.
    pub frames: u64,
    /// Spawn the background audio thread. When false, audio commands are
    /// captured for inspection instead.
    pub audio_enabled: bool,
    pub pickup_follow_up_cue: Option<String>,
    pub defeat_cue: Option<String>,
    pub victory_cue: Option<String>,
    pub level_path: PathBuf,
    /// Additional pickups scattered around the level.
    pub extra_pickups: u32,
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            start_scene: DEFAULT_START_SCENE.to_string(),
            start_paused: false,
            health_start: DEFAULT_HEALTH_START,
            health_max: DEFAULT_HEALTH_MAX,
            decay_interval_ms: DEFAULT_DECAY_INTERVAL_MS,
            target_fps: DEFAULT_TARGET_FPS,
            frames: DEFAULT_FRAMES,
            audio_enabled: true,
            pickup_follow_up_cue: Some("PlayerForeman line2".to_string()),
            defeat_cue: None,
            victory_cue: None,
            level_path: PathBuf::from(DEFAULT_LEVEL_PATH),
            extra_pickups: 0,
            seed: DEFAULT_SEED,
        }
    }

    /// Load configuration from an INI file on disk.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let mut ini = Ini::new();
        ini.load(path).map_err(|reason| EngineError::Config {
            path: path.to_path_buf(),
            reason,
        })?;
        let config = Self::from_ini(&ini);
        info!("Loaded config {:?}: {}", path, config.summary());
        Ok(config)
    }

    /// Parse configuration from INI text.
    pub fn load_from_str(text: &str) -> Result<Self, EngineError> {
        let mut ini = Ini::new();
        ini.read(text.to_string())
            .map_err(|reason| EngineError::Config {
                path: PathBuf::from("<string>"),
                reason,
            })?;
        Ok(Self::from_ini(&ini))
    }

    fn from_ini(ini: &Ini) -> Self {
        let mut config = Self::new();

        // [game]
        if let Some(title) = ini.get("game", "title") {
            config.title = title;
        }
        if let Some(scene) = ini.get("game", "start_scene") {
            config.start_scene = scene;
        }
        if let Some(paused) = ini.getbool("game", "start_paused").ok().flatten() {
            config.start_paused = paused;
        }

        // [health]
        if let Some(start) = ini.getint("health", "start").ok().flatten() {
            config.health_start = start as i32;
        }
        if let Some(max) = ini.getint("health", "max").ok().flatten() {
            config.health_max = max as i32;
        }
        if let Some(interval) = ini.getuint("health", "decay_interval_ms").ok().flatten() {
            config.decay_interval_ms = interval;
        }

        // [frame]
        if let Some(fps) = ini.getuint("frame", "target_fps").ok().flatten() {
            config.target_fps = (fps as u32).max(1);
        }
        if let Some(frames) = ini.getuint("frame", "frames").ok().flatten() {
            config.frames = frames;
        }

        // [audio]
        if let Some(enabled) = ini.getbool("audio", "enabled").ok().flatten() {
            config.audio_enabled = enabled;
        }
        if ini.get("audio", "pickup_follow_up_cue").is_some() {
            config.pickup_follow_up_cue = non_empty(ini.get("audio", "pickup_follow_up_cue"));
        }
        config.defeat_cue = non_empty(ini.get("audio", "defeat_cue"));
        config.victory_cue = non_empty(ini.get("audio", "victory_cue"));

        // [level]
        if let Some(path) = ini.get("level", "path") {
            config.level_path = PathBuf::from(path);
        }
        if let Some(extra) = ini.getuint("level", "extra_pickups").ok().flatten() {
            config.extra_pickups = extra as u32;
        }
        if let Some(seed) = ini.getuint("level", "seed").ok().flatten() {
            config.seed = seed;
        }

        config
    }

    /// Save configuration to an INI file, creating it if needed.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let path = path.as_ref();
        let mut ini = Ini::new();

        ini.set("game", "title", Some(self.title.clone()));
        ini.set("game", "start_scene", Some(self.start_scene.clone()));
        ini.set("game", "start_paused", Some(self.start_paused.to_string()));

        ini.set("health", "start", Some(self.health_start.to_string()));
        ini.set("health", "max", Some(self.health_max.to_string()));
        ini.set(
            "health",
            "decay_interval_ms",
            Some(self.decay_interval_ms.to_string()),
        );

        ini.set("frame", "target_fps", Some(self.target_fps.to_string()));
        ini.set("frame", "frames", Some(self.frames.to_string()));

        ini.set("audio", "enabled", Some(self.audio_enabled.to_string()));
        ini.set(
            "audio",
            "pickup_follow_up_cue",
            Some(self.pickup_follow_up_cue.clone().unwrap_or_default()),
        );
        ini.set(
            "audio",
            "defeat_cue",
            Some(self.defeat_cue.clone().unwrap_or_default()),
        );
        ini.set(
            "audio",
            "victory_cue",
            Some(self.victory_cue.clone().unwrap_or_default()),
        );

        ini.set(
            "level",
            "path",
            Some(self.level_path.to_string_lossy().into_owned()),
        );
        ini.set("level", "extra_pickups", Some(self.extra_pickups.to_string()));
        ini.set("level", "seed", Some(self.seed.to_string()));

        ini.write(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Milliseconds per frame at the configured target rate.
    pub fn frame_ms(&self) -> u64 {
        (1000 / u64::from(self.target_fps.max(1))).max(1)
    }

    fn summary(&self) -> String {
        format!(
            "scene={}, paused={}, health={}/{} decay={}ms, fps={}, frames={}, audio={}",
            self.start_scene,
            self.start_paused,
            self.health_start,
            self.health_max,
            self.decay_interval_ms,
            self.target_fps,
            self.frames,
            self.audio_enabled
        )
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
