use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use tagsight_core::remote::HttpEntityDirectory;
use tagsight_core::scan::LoopTuning;
use tagsight_model::{CaptureConstraints, FacingMode};

/// Source that produced the console configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConsoleConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

/// Where the remote asset directory lives.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the directory API.
    pub base_url: String,
    /// Path under the base where the asset collection lives. May contain
    /// multiple segments, e.g. `v1/assets`.
    pub assets_path: String,
    /// Trailing segment used when attaching an image artifact to an asset.
    pub artifact_segment: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/api".to_owned(),
            assets_path: "assets".to_owned(),
            artifact_segment: "artifact".to_owned(),
        }
    }
}

impl RemoteConfig {
    /// Build the HTTP directory client these settings describe.
    pub fn directory(&self) -> anyhow::Result<HttpEntityDirectory> {
        HttpEntityDirectory::new(
            &self.base_url,
            &self.assets_path,
            &self.artifact_segment,
        )
        .context("remote settings do not form a usable directory endpoint")
    }
}

/// Camera constraints the console requests when a scan starts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Preferred capture width in pixels.
    pub ideal_width: u32,
    /// Preferred capture height in pixels.
    pub ideal_height: u32,
    /// Which camera to prefer on multi-camera devices.
    pub facing: FacingMode,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            ideal_width: 1280,
            ideal_height: 720,
            facing: FacingMode::Environment,
        }
    }
}

impl CaptureSettings {
    pub fn constraints(&self) -> CaptureConstraints {
        CaptureConstraints {
            ideal_width: self.ideal_width,
            ideal_height: self.ideal_height,
            facing: self.facing,
        }
    }
}

/// Live decode loop tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Pause between frame decode attempts, in milliseconds. Lower samples
    /// more frames per second at higher decode cost.
    pub frame_interval_ms: u64,
    /// Buffered capacity of the scan event channel. Slow subscribers lose
    /// the oldest events once this fills.
    pub event_capacity: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            frame_interval_ms: 200,
            event_capacity: 32,
        }
    }
}

impl ScanSettings {
    pub fn tuning(&self) -> LoopTuning {
        LoopTuning {
            frame_interval: Duration::from_millis(self.frame_interval_ms),
            // The loop's event channel cannot be zero-capacity.
            event_capacity: self.event_capacity.max(1),
        }
    }
}

/// Top-level console settings: where the asset directory lives, what the
/// camera is asked for, and how eagerly the live loop samples frames. Every
/// field has a default that works against a local directory.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Remote asset directory endpoints.
    pub remote: RemoteConfig,
    /// Camera constraints requested when a scan starts.
    pub capture: CaptureSettings,
    /// Live decode loop tuning.
    pub scan: ScanSettings,
}

impl ConsoleConfig {
    /// Load console configuration overrides using environment variables.
    /// Evaluation order:
    /// 1) `$TAGSIGHT_CONFIG_PATH` (TOML or JSON file),
    /// 2) `$TAGSIGHT_CONFIG_JSON` (inline JSON),
    /// 3) the first default file found next to the working directory,
    /// 4) defaults if none is set.
    pub fn load_from_env() -> anyhow::Result<(Self, ConsoleConfigSource)> {
        if let Ok(path_str) = env::var("TAGSIGHT_CONFIG_PATH")
            && !path_str.trim().is_empty()
        {
            let path = PathBuf::from(path_str);
            let config = Self::load_from_file(&path)?;
            return Ok((config, ConsoleConfigSource::EnvPath(path)));
        }

        if let Ok(raw) = env::var("TAGSIGHT_CONFIG_JSON")
            && !raw.trim().is_empty()
        {
            let parsed = Self::parse_json(&raw)
                .context("failed to parse TAGSIGHT_CONFIG_JSON")?;
            return Ok((parsed, ConsoleConfigSource::EnvInline));
        }

        if let Some(path) = Self::find_default_file() {
            let config = Self::load_from_file(&path)?;
            return Ok((config, ConsoleConfigSource::File(path)));
        }

        Ok((Self::default(), ConsoleConfigSource::Default))
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("failed to read console config from {}", path.display())
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&contents).with_context(|| {
                format!("invalid console config {}", path.display())
            }),
            Some("toml") | Some("tml") => {
                toml::from_str(&contents).map_err(|err| {
                    anyhow!(
                        "invalid console config {}: {}",
                        path.display(),
                        err
                    )
                })
            }
            _ => Self::parse_from_str(&contents, &path.display().to_string()),
        }
    }

    pub fn parse_from_str(
        contents: &str,
        origin: &str,
    ) -> anyhow::Result<Self> {
        // Try TOML first, then JSON for convenience.
        toml::from_str(contents).or_else(|toml_err| {
            serde_json::from_str(contents).map_err(|json_err| {
                anyhow!(
                    "failed to parse console config {}: toml error: {}; json error: {}",
                    origin,
                    toml_err,
                    json_err
                )
            })
        })
    }

    pub fn parse_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw)
            .map_err(|err| anyhow!("invalid console config json: {err}"))
    }

    /// Render the configuration as a TOML document, for writing a starter
    /// config file.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self)
            .context("failed to render console config as TOML")
    }

    fn find_default_file() -> Option<PathBuf> {
        const CANDIDATES: &[&str] = &[
            "tagsight.toml",
            "tagsight.json",
            "config/tagsight.toml",
            "config/tagsight.json",
        ];

        CANDIDATES
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(|path| path.to_path_buf())
    }
}
