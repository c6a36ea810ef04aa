use crate::error::WiggleError;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// How the simulated tip is written back into the bone's local transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WiggleMode {
    /// The tip is the bone origin; the result lands in the local translation.
    #[default]
    Translate,
    /// The tip sits at `tip_offset` in bone space; the bone is re-aimed at it.
    Rotate,
}

impl WiggleMode {
    pub fn label(self) -> &'static str {
        match self {
            WiggleMode::Translate => "translate",
            WiggleMode::Rotate => "rotate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WiggleSettings {
    #[serde(default = "WiggleSettings::default_bounce_factor")]
    pub bounce_factor: f32,
    #[serde(default = "WiggleSettings::default_max_stretch")]
    pub max_stretch: f32,
    #[serde(default)]
    pub gravity_enabled: bool,
    #[serde(default = "WiggleSettings::default_gravity")]
    pub gravity: Vec3,
    /// Velocity damping. `None` resolves to critical damping for the configured stiffness.
    #[serde(default)]
    pub damping: Option<f32>,
    #[serde(default)]
    pub mode: WiggleMode,
    #[serde(default)]
    pub tip_offset: Option<Vec3>,
}

impl WiggleSettings {
    const fn default_bounce_factor() -> f32 {
        10.0
    }

    const fn default_max_stretch() -> f32 {
        1.0
    }

    const fn default_gravity() -> Vec3 {
        Vec3::new(0.0, -9.81, 0.0)
    }

    pub fn new(bounce_factor: f32, max_stretch: f32) -> Self {
        Self { bounce_factor, max_stretch, ..Self::default() }
    }

    pub fn with_gravity(mut self, enabled: bool) -> Self {
        self.gravity_enabled = enabled;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = Some(damping);
        self
    }

    pub fn with_mode(mut self, mode: WiggleMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_tip_offset(mut self, offset: Vec3) -> Self {
        self.tip_offset = Some(offset);
        self
    }

    pub fn validate(&self) -> Result<(), WiggleError> {
        if !self.bounce_factor.is_finite() || self.bounce_factor <= 0.0 {
            return Err(WiggleError::InvalidBounceFactor(self.bounce_factor));
        }
        if !self.max_stretch.is_finite() || self.max_stretch < 0.0 {
            return Err(WiggleError::InvalidMaxStretch(self.max_stretch));
        }
        if let Some(damping) = self.damping {
            if !damping.is_finite() || damping < 0.0 {
                return Err(WiggleError::InvalidDamping(damping));
            }
        }
        Ok(())
    }

    pub fn resolved_damping(&self) -> f32 {
        self.damping.unwrap_or_else(|| 2.0 * self.bounce_factor.max(0.0).sqrt())
    }

    pub fn resolved_tip_offset(&self) -> Vec3 {
        self.tip_offset.unwrap_or(Vec3::Y)
    }

    pub fn gravity_acceleration(&self) -> Vec3 {
        if self.gravity_enabled {
            self.gravity
        } else {
            Vec3::ZERO
        }
    }
}

impl Default for WiggleSettings {
    fn default() -> Self {
        Self {
            bounce_factor: Self::default_bounce_factor(),
            max_stretch: Self::default_max_stretch(),
            gravity_enabled: false,
            gravity: Self::default_gravity(),
            damping: None,
            mode: WiggleMode::default(),
            tip_offset: None,
        }
    }
}
