use super::hierarchy::BoneHierarchy;
use super::settings::WiggleSettings;
use super::spring::{WiggleSpring, WiggleStep};
use crate::error::WiggleError;
use glam::Vec3;

/// A wiggle spring bound to one bone of a [`BoneHierarchy`].
///
/// The hierarchy owns the bone; this only keeps its handle. The rest pose is captured
/// from the bone's local pose at construction time.
#[derive(Debug, Clone)]
pub struct WiggleBone<B> {
    bone: B,
    spring: WiggleSpring,
}

impl<B: Copy + Eq + std::fmt::Debug> WiggleBone<B> {
    pub fn new<H>(hierarchy: &H, bone: B, settings: WiggleSettings) -> Result<Self, WiggleError>
    where
        H: BoneHierarchy<Bone = B> + ?Sized,
    {
        if !hierarchy.contains(bone) {
            return Err(WiggleError::UnknownBone(format!("{bone:?}")));
        }
        if hierarchy.parent(bone).is_none() {
            return Err(WiggleError::MissingParent(hierarchy.bone_label(bone)));
        }
        let rest = hierarchy.local_pose(bone).ok_or_else(|| WiggleError::UnknownBone(format!("{bone:?}")))?;
        let spring = WiggleSpring::new(rest, settings)?;
        Ok(Self { bone, spring })
    }

    pub fn bone(&self) -> B {
        self.bone
    }

    pub fn spring(&self) -> &WiggleSpring {
        &self.spring
    }

    pub fn spring_mut(&mut self) -> &mut WiggleSpring {
        &mut self.spring
    }

    pub fn tip_position(&self) -> Vec3 {
        self.spring.tip_position()
    }

    pub fn tip_velocity(&self) -> Vec3 {
        self.spring.tip_velocity()
    }

    /// Advances the simulation by `dt` seconds and writes the bone's new local pose.
    ///
    /// Callers should clamp `dt` (see [`crate::time::FrameClock`]); a stall of several
    /// seconds fed straight in will fling the tip to the stretch limit.
    pub fn update<H>(&mut self, hierarchy: &mut H, dt: f32) -> WiggleStep
    where
        H: BoneHierarchy<Bone = B> + ?Sized,
    {
        let Some(parent) = hierarchy.parent(self.bone) else {
            // Reparented to the root after construction; nothing sensible to wiggle around.
            let anchor = self.spring.tip_position();
            return WiggleStep { pose: None, anchor, clamped: false, degenerate: true };
        };
        let parent_world = hierarchy.world_matrix(parent);
        let current = hierarchy.local_pose(self.bone).unwrap_or_else(|| self.spring.rest());
        let step = self.spring.step(parent_world, current, dt);
        if let Some(pose) = step.pose {
            hierarchy.set_local_pose(self.bone, pose);
        }
        step
    }
}
