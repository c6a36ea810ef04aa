use crate::picking::Camera3D;
use crate::time::FrameClock;
use crate::wiggle::RigConfig;
use anyhow::{Context, Result};
use glam::{Vec2, Vec3};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct ClockConfig {
    #[serde(default = "ClockConfig::default_max_delta")]
    pub max_delta: f32,
    #[serde(default = "ClockConfig::default_fixed_delta")]
    pub fixed_delta: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "DemoConfig::default_frames")]
    pub frames: u32,
    #[serde(default = "DemoConfig::default_floor_height")]
    pub floor_height: f32,
    #[serde(default = "DemoConfig::default_hover_height")]
    pub hover_height: f32,
    #[serde(default = "DemoConfig::default_spin_per_frame")]
    pub spin_per_frame: f32,
    /// Virtual window size in pixels the scripted cursor moves across.
    #[serde(default = "DemoConfig::default_viewport")]
    pub viewport: Vec2,
    #[serde(default = "DemoConfig::default_report_every")]
    pub report_every: u32,
    #[serde(default = "DemoConfig::default_camera")]
    pub camera: Camera3D,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub rig: RigConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfigOverrides {
    pub frames: Option<u32>,
    pub fixed_delta: Option<f32>,
    pub max_delta: Option<f32>,
    pub gravity: Option<bool>,
}

impl ClockConfig {
    const fn default_max_delta() -> f32 {
        FrameClock::DEFAULT_MAX_DELTA
    }

    const fn default_fixed_delta() -> f32 {
        1.0 / 60.0
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { max_delta: Self::default_max_delta(), fixed_delta: Self::default_fixed_delta() }
    }
}

impl DemoConfig {
    pub fn aspect(&self) -> f32 {
        if self.viewport.y > 0.0 {
            self.viewport.x / self.viewport.y
        } else {
            1.0
        }
    }

    const fn default_frames() -> u32 {
        240
    }

    const fn default_floor_height() -> f32 {
        -1.0
    }

    const fn default_hover_height() -> f32 {
        1.0
    }

    const fn default_spin_per_frame() -> f32 {
        0.01
    }

    const fn default_viewport() -> Vec2 {
        Vec2::new(1280.0, 720.0)
    }

    const fn default_report_every() -> u32 {
        30
    }

    fn default_camera() -> Camera3D {
        Camera3D::new(Vec3::new(18.0, 36.0, 18.0), Vec3::ZERO, 20.0_f32.to_radians(), 0.1, 100.0)
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frames: Self::default_frames(),
            floor_height: Self::default_floor_height(),
            hover_height: Self::default_hover_height(),
            spin_per_frame: Self::default_spin_per_frame(),
            viewport: Self::default_viewport(),
            report_every: Self::default_report_every(),
            camera: Self::default_camera(),
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("[config] {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &AppConfigOverrides) {
        if let Some(frames) = overrides.frames {
            self.demo.frames = frames;
        }
        if let Some(fixed_delta) = overrides.fixed_delta {
            self.clock.fixed_delta = fixed_delta;
        }
        if let Some(max_delta) = overrides.max_delta {
            self.clock.max_delta = max_delta;
        }
        if let Some(gravity) = overrides.gravity {
            for bone in &mut self.rig.bones {
                bone.settings.gravity_enabled = gravity;
            }
        }
    }
}

impl AppConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.frames.is_none() && self.fixed_delta.is_none() && self.max_delta.is_none() && self.gravity.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.frames.is_some() {
            fields.push("frames");
        }
        if self.fixed_delta.is_some() {
            fields.push("dt");
        }
        if self.max_delta.is_some() {
            fields.push("max_delta");
        }
        if self.gravity.is_some() {
            fields.push("gravity");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_sections_use_defaults() {
        let cfg: AppConfig = serde_json::from_str("{}").expect("parse empty config");
        assert_eq!(cfg.clock.max_delta, 0.1);
        assert_eq!(cfg.demo.frames, 240);
        assert_eq!(cfg.rig.bones.len(), 5);
        assert!((cfg.demo.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn loads_rig_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{ "clock": {{ "max_delta": 0.05 }}, "rig": {{ "bones": [ {{ "bone": "Tine_0", "bounce_factor": 25.0 }} ] }} }}"#
        )
        .expect("write config");
        let cfg = AppConfig::load(file.path()).expect("load config");
        assert_eq!(cfg.clock.max_delta, 0.05);
        assert_eq!(cfg.clock.fixed_delta, 1.0 / 60.0);
        assert_eq!(cfg.rig.bones.len(), 1);
        assert_eq!(cfg.rig.bones[0].bone, "Tine_0");
        assert_eq!(cfg.rig.bones[0].settings.bounce_factor, 25.0);
    }

    #[test]
    fn unreadable_file_falls_back() {
        let cfg = AppConfig::load_or_default("does/not/exist.json");
        assert_eq!(cfg.demo.report_every, 30);
        let err = AppConfig::load("does/not/exist.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn overrides_apply_to_every_bone() {
        let mut cfg = AppConfig::default();
        let overrides = AppConfigOverrides { frames: Some(10), gravity: Some(true), ..Default::default() };
        assert_eq!(overrides.applied_fields(), vec!["frames", "gravity"]);
        cfg.apply_overrides(&overrides);
        assert_eq!(cfg.demo.frames, 10);
        assert!(cfg.rig.bones.iter().all(|bone| bone.settings.gravity_enabled));
        assert!(AppConfigOverrides::default().is_empty());
    }
}
