//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_SCREEN_HEIGHT, DEFAULT_SCREEN_WIDTH};
use crate::projection::Geometry;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for nestlist.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Fixed column count of the drawing area.
    pub screen_width: usize,
    /// Screen lines available to the outline.
    pub screen_height: usize,
    /// Document opened when no path is given.
    pub default_file: Option<PathBuf>,
    /// Use ASCII bullet glyphs instead of Unicode ones.
    pub ascii_bullets: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            screen_width: DEFAULT_SCREEN_WIDTH,
            screen_height: DEFAULT_SCREEN_HEIGHT,
            default_file: None,
            ascii_bullets: false,
        }
    }
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows USERPROFILE
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    None
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_usize(name: &str) -> Option<usize> {
    env::var(name).ok().and_then(|value| value.trim().parse().ok())
}

fn terminal_width() -> usize {
    env_usize("COLUMNS")
        .filter(|columns| *columns > 0)
        .unwrap_or(DEFAULT_SCREEN_WIDTH)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `NESTLIST_WIDTH=0` turns off the fixed column count and uses the terminal width.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        let screen_width = match env_usize("NESTLIST_WIDTH") {
            Some(0) => terminal_width(),
            Some(width) => width,
            None => DEFAULT_SCREEN_WIDTH,
        };
        let screen_height = env_usize("NESTLIST_HEIGHT")
            .or_else(|| env_usize("LINES"))
            .filter(|lines| *lines > 0)
            .unwrap_or(DEFAULT_SCREEN_HEIGHT);
        Self {
            screen_width,
            screen_height,
            default_file: env::var("NESTLIST_FILE")
                .ok()
                .filter(|path| !path.trim().is_empty())
                .map(expand_tilde),
            ascii_bullets: env_flag_enabled("NESTLIST_ASCII_BULLETS"),
        }
    }

    /// Screen geometry for a projection, with optional overrides.
    pub fn geometry(&self, width: Option<usize>, height: Option<usize>) -> Geometry {
        Geometry::new(
            width.unwrap_or(self.screen_width),
            height.unwrap_or(self.screen_height),
        )
    }
}
