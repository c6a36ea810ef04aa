use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Local transform of a bone relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonePose {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for BonePose {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}

impl BonePose {
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::default() }
    }

    pub fn from_translation_rotation(translation: Vec3, rotation: Quat) -> Self {
        Self { translation, rotation, ..Self::default() }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Capabilities a skeletal hierarchy has to expose for wiggle bones to drive it.
///
/// Wiggle bones only ever write the local pose of their own bone. Ancestors are read
/// through [`BoneHierarchy::world_matrix`], which must reflect the current frame.
pub trait BoneHierarchy {
    type Bone: Copy + Eq + fmt::Debug;

    fn contains(&self, bone: Self::Bone) -> bool;

    fn parent(&self, bone: Self::Bone) -> Option<Self::Bone>;

    fn local_pose(&self, bone: Self::Bone) -> Option<BonePose>;

    /// World matrix of `bone` composed from the current local poses of the whole chain.
    fn world_matrix(&self, bone: Self::Bone) -> Mat4;

    fn set_local_pose(&mut self, bone: Self::Bone, pose: BonePose);

    /// Human readable identifier used in errors and log lines.
    fn bone_label(&self, bone: Self::Bone) -> String {
        format!("{bone:?}")
    }
}

/// Name based lookup, used when rigs are described in config files.
pub trait BoneLookup: BoneHierarchy {
    fn find_bone(&self, name: &str) -> Option<Self::Bone>;
}
