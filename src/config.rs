use std::path::PathBuf;

use serde::Deserialize;

use crate::keys::{Key, DEGREES};
use crate::metronome::clamp_tempo;
use crate::theme::Accent;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    defaults: DefaultsConfig,
}

#[derive(Deserialize, Default)]
struct DefaultsConfig {
    key: Option<String>,
    tempo: Option<u32>,
    volume: Option<f32>,
    accent: Option<String>,
    disabled: Option<Vec<usize>>,
}

/// Startup defaults: the embedded `config.toml` overlaid with the user's file.
/// Read once at launch and never written back.
pub struct Config {
    defaults: DefaultsConfig,
}

impl Config {
    pub fn load() -> Self {
        let mut base = Self::embedded();
        if let Some(path) = user_config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => {
                            log::info!(target: "config", "loaded {}", path.display());
                            merge_defaults(&mut base.defaults, user.defaults);
                        }
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }
        base
    }

    fn embedded() -> Self {
        let file: ConfigFile = toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|e| {
            log::error!(target: "config", "embedded config.toml is invalid: {}", e);
            ConfigFile::default()
        });
        Config { defaults: file.defaults }
    }

    #[cfg(test)]
    fn from_toml(user: &str) -> Result<Self, toml::de::Error> {
        let mut base = Self::embedded();
        let user: ConfigFile = toml::from_str(user)?;
        merge_defaults(&mut base.defaults, user.defaults);
        Ok(base)
    }

    pub fn key(&self) -> Key {
        match self.defaults.key.as_deref().map(str::parse::<Key>) {
            Some(Ok(key)) => key,
            Some(Err(e)) => {
                log::warn!(target: "config", "{}; using C", e);
                Key::C
            }
            None => Key::C,
        }
    }

    pub fn tempo(&self) -> u32 {
        clamp_tempo(self.defaults.tempo.unwrap_or(80))
    }

    pub fn volume(&self) -> f32 {
        self.defaults.volume.unwrap_or(0.7).clamp(0.0, 1.0)
    }

    pub fn accent(&self) -> Accent {
        match self.defaults.accent.as_deref() {
            Some(s) => Accent::find(s).unwrap_or_else(|| {
                log::warn!(target: "config", "unknown accent colour {:?}", s);
                Accent::default()
            }),
            None => Accent::default(),
        }
    }

    /// Degrees listed 1-based in the file, as a disabled mask.
    pub fn disabled(&self) -> [bool; DEGREES] {
        let mut mask = [false; DEGREES];
        for &d in self.defaults.disabled.as_deref().unwrap_or(&[]) {
            match d.checked_sub(1).filter(|i| *i < DEGREES) {
                Some(i) => mask[i] = true,
                None => log::warn!(target: "config", "ignoring disabled degree {} (expected 1-7)", d),
            }
        }
        mask
    }
}

fn merge_defaults(base: &mut DefaultsConfig, user: DefaultsConfig) {
    if user.key.is_some()      { base.key = user.key; }
    if user.tempo.is_some()    { base.tempo = user.tempo; }
    if user.volume.is_some()   { base.volume = user.volume; }
    if user.accent.is_some()   { base.accent = user.accent; }
    if user.disabled.is_some() { base.disabled = user.disabled; }
}

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("chordtrainer"))
}

fn user_config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}
