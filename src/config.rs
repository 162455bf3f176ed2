use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{FusionError, Result};
use crate::tracker::{SelectionMode, DEFAULT_ROI_GAIN};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub recorder: RecorderConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// カラー解像度 (640x480 または 1280x960)
    #[serde(default = "default_color_width")]
    pub color_width: u32,
    #[serde(default = "default_color_height")]
    pub color_height: u32,
    /// 深度解像度 (80x60, 320x240, 640x480)
    #[serde(default = "default_depth_width")]
    pub depth_width: u32,
    #[serde(default = "default_depth_height")]
    pub depth_height: u32,
    /// 顔中心平滑化のゲイン
    #[serde(default = "default_roi_gain")]
    pub roi_gain: f32,
    #[serde(default)]
    pub selection: SelectionMode,
    /// デバイスなしのときに表示する静止画
    #[serde(default)]
    pub fallback_image: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecorderConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_recorder_path")]
    pub path: PathBuf,
}

/// デモループの設定
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
    /// "synthetic" または "none"
    #[serde(default = "default_device")]
    pub device: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// tracing のフィルタ指定 (RUST_LOG が優先)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_color_width() -> u32 { 640 }
fn default_color_height() -> u32 { 480 }
fn default_depth_width() -> u32 { 320 }
fn default_depth_height() -> u32 { 240 }
fn default_roi_gain() -> f32 { DEFAULT_ROI_GAIN }
fn default_recorder_path() -> PathBuf { PathBuf::from("face_recording.txt") }
fn default_target_fps() -> u32 { 30 }
fn default_duration_secs() -> u64 { 10 }
fn default_device() -> String { "synthetic".to_string() }
fn default_log_level() -> String { "info".to_string() }

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            color_width: default_color_width(),
            color_height: default_color_height(),
            depth_width: default_depth_width(),
            depth_height: default_depth_height(),
            roi_gain: default_roi_gain(),
            selection: SelectionMode::default(),
            fallback_image: None,
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_recorder_path(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target_fps: default_target_fps(),
            duration_secs: default_duration_secs(),
            device: default_device(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl SessionConfig {
    pub fn color_resolution(&self) -> (u32, u32) {
        (self.color_width, self.color_height)
    }

    pub fn depth_resolution(&self) -> (u32, u32) {
        (self.depth_width, self.depth_height)
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| FusionError::Config(e.to_string()))?;
        if !(config.session.roi_gain > 0.0 && config.session.roi_gain <= 1.0) {
            return Err(FusionError::Config(format!(
                "roi_gain must be in (0, 1], got {}",
                config.session.roi_gain
            )));
        }
        Ok(config)
    }

    /// 読み込みに失敗したらデフォルト設定
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "using default configuration");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let c = Config::default();
        assert_eq!(c.session.color_resolution(), (640, 480));
        assert_eq!(c.session.depth_resolution(), (320, 240));
        assert_eq!(c.session.roi_gain, 0.02);
        assert_eq!(c.session.selection, SelectionMode::Auto);
        assert!(!c.recorder.enabled);
        assert_eq!(c.app.target_fps, 30);
        assert_eq!(c.log.level, "info");
    }

    #[test]
    fn test_parse_partial() {
        let c = Config::parse(
            r#"
            [session]
            color_width = 1280
            color_height = 960
            selection = "nearest"

            [recorder]
            enabled = true
            "#,
        )
        .unwrap();
        assert_eq!(c.session.color_resolution(), (1280, 960));
        assert_eq!(c.session.depth_resolution(), (320, 240));
        assert_eq!(c.session.selection, SelectionMode::Nearest);
        assert!(c.recorder.enabled);
        assert_eq!(c.recorder.path, PathBuf::from("face_recording.txt"));
    }

    #[test]
    fn test_parse_rejects_bad_gain() {
        let err = Config::parse("[session]\nroi_gain = 1.5\n").unwrap_err();
        assert!(matches!(err, FusionError::Config(_)));
    }

    #[test]
    fn test_parse_rejects_unknown_selection() {
        assert!(Config::parse("[session]\nselection = \"random\"\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[app]\ntarget_fps = 15\ndevice = \"none\"").unwrap();
        let c = Config::load(file.path()).unwrap();
        assert_eq!(c.app.target_fps, 15);
        assert_eq!(c.app.device, "none");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let c = Config::load_or_default("/nonexistent/face_fusion.toml");
        assert_eq!(c.app.duration_secs, 10);
    }
}
