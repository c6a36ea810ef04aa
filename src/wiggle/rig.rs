use super::bone::WiggleBone;
use super::hierarchy::{BoneHierarchy, BoneLookup};
use super::settings::WiggleSettings;
use super::spring::WiggleStep;
use crate::error::WiggleError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigBoneConfig {
    /// Exact bone name in the hierarchy.
    pub bone: String,
    #[serde(flatten)]
    pub settings: WiggleSettings,
}

impl RigBoneConfig {
    pub fn new(bone: impl Into<String>, settings: WiggleSettings) -> Self {
        Self { bone: bone.into(), settings }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigConfig {
    #[serde(default)]
    pub bones: Vec<RigBoneConfig>,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self::mascot()
    }
}

impl RigConfig {
    pub const MASCOT_HEAD: &'static str = "Head";
    pub const MASCOT_LEGS: [&'static str; 4] = ["Leg_FL", "Leg_FR", "Leg_BL", "Leg_BR"];

    /// Head and four legs of the demo mascot, all with the same springy tuning.
    pub fn mascot() -> Self {
        let tuning = WiggleSettings::new(10.0, 1.0);
        let mut bones = vec![RigBoneConfig::new(Self::MASCOT_HEAD, tuning)];
        bones.extend(Self::MASCOT_LEGS.iter().map(|name| RigBoneConfig::new(*name, tuning)));
        Self { bones }
    }
}

/// Per-frame counters for a rig update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RigFrameStats {
    pub updated: u32,
    pub clamped: u32,
    pub degenerate: u32,
    pub skipped_writes: u32,
}

impl RigFrameStats {
    pub(crate) fn record(&mut self, step: &WiggleStep) {
        self.updated += 1;
        if step.clamped {
            self.clamped += 1;
        }
        if step.degenerate {
            self.degenerate += 1;
        }
        if step.pose.is_none() {
            self.skipped_writes += 1;
        }
    }
}

/// A set of wiggle bones configured together for one character.
#[derive(Debug, Clone)]
pub struct WiggleRig<B> {
    entries: Vec<(Arc<str>, WiggleBone<B>)>,
}

impl<B: Copy + Eq + std::fmt::Debug> WiggleRig<B> {
    pub fn from_config<H>(hierarchy: &H, config: &RigConfig) -> Result<Self, WiggleError>
    where
        H: BoneLookup<Bone = B> + ?Sized,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(config.bones.len());
        for entry in &config.bones {
            if !seen.insert(entry.bone.as_str()) {
                return Err(WiggleError::DuplicateBone(entry.bone.clone()));
            }
            let bone = hierarchy
                .find_bone(&entry.bone)
                .ok_or_else(|| WiggleError::UnknownBoneName(entry.bone.clone()))?;
            let wiggle = WiggleBone::new(hierarchy, bone, entry.settings)?;
            log::debug!(
                "[wiggle] '{}' bound in {} mode (bounce {}, stretch {})",
                entry.bone,
                entry.settings.mode.label(),
                entry.settings.bounce_factor,
                entry.settings.max_stretch
            );
            entries.push((Arc::<str>::from(entry.bone.as_str()), wiggle));
        }
        log::info!("[wiggle] rig ready with {} bone(s)", entries.len());
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn bone(&self, name: &str) -> Option<&WiggleBone<B>> {
        self.entries.iter().find(|(entry_name, _)| entry_name.as_ref() == name).map(|(_, bone)| bone)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WiggleBone<B>)> {
        self.entries.iter().map(|(name, bone)| (name.as_ref(), bone))
    }

    pub fn reset(&mut self) {
        for (_, bone) in &mut self.entries {
            bone.spring_mut().reset();
        }
    }

    /// Updates every bone in config order.
    pub fn update_all<H>(&mut self, hierarchy: &mut H, dt: f32) -> RigFrameStats
    where
        H: BoneHierarchy<Bone = B> + ?Sized,
    {
        let mut stats = RigFrameStats::default();
        for (_, bone) in &mut self.entries {
            let step = bone.update(hierarchy, dt);
            stats.record(&step);
        }
        stats
    }
}
