use super::hierarchy::BonePose;
use super::settings::{WiggleMode, WiggleSettings};
use crate::error::WiggleError;
use glam::{Mat4, Quat, Vec3};

const LENGTH_EPSILON: f32 = 1e-6;
const DETERMINANT_EPSILON: f32 = 1e-12;

/// Result of advancing one spring by one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WiggleStep {
    /// New local pose for the bone, `None` when the parent transform could not be inverted.
    pub pose: Option<BonePose>,
    pub anchor: Vec3,
    pub clamped: bool,
    /// The bone has no length, so the stretch clamp was skipped.
    pub degenerate: bool,
}

/// Secondary-motion state for a single bone, independent of any hierarchy type.
///
/// The tip is a point mass in world space pulled towards the anchor (where the tip would
/// be if the bone sat at its rest pose under the current parent transform). Each step
/// integrates the spring with semi-implicit Euler, clamps the tip to
/// `max_stretch * bone_length` around the anchor and converts it back to a local pose.
/// The bone length is measured in world space every step, so scaled ancestors shrink
/// the stretch limit along with the bone.
#[derive(Debug, Clone)]
pub struct WiggleSpring {
    rest: BonePose,
    settings: WiggleSettings,
    damping: f32,
    rest_length: f32,
    bone_length: f32,
    tip_position: Vec3,
    tip_velocity: Vec3,
    instantiated: bool,
    degenerate_reported: bool,
}

impl WiggleSpring {
    pub fn new(rest: BonePose, settings: WiggleSettings) -> Result<Self, WiggleError> {
        settings.validate()?;
        let rest_length = match settings.mode {
            WiggleMode::Translate => rest.translation.length(),
            WiggleMode::Rotate => (rest.scale * settings.resolved_tip_offset()).length(),
        };
        Ok(Self {
            rest,
            damping: settings.resolved_damping(),
            settings,
            rest_length,
            bone_length: rest_length,
            tip_position: Vec3::ZERO,
            tip_velocity: Vec3::ZERO,
            instantiated: false,
            degenerate_reported: false,
        })
    }

    pub fn rest(&self) -> BonePose {
        self.rest
    }

    pub fn settings(&self) -> &WiggleSettings {
        &self.settings
    }

    /// Bone length in the parent's local units, from the rest pose.
    pub fn rest_length(&self) -> f32 {
        self.rest_length
    }

    /// World-space bone length measured by the last step; the rest length before the
    /// first step.
    pub fn bone_length(&self) -> f32 {
        self.bone_length
    }

    /// Largest distance the tip may drift from the anchor, as of the last step.
    pub fn stretch_limit(&self) -> f32 {
        self.settings.max_stretch * self.bone_length
    }

    /// World-space length of the rest-pose bone under `parent_world`.
    pub fn bone_length_in(&self, parent_world: Mat4) -> f32 {
        match self.settings.mode {
            WiggleMode::Translate => parent_world.transform_vector3(self.rest.translation).length(),
            WiggleMode::Rotate => {
                (parent_world * self.rest.matrix()).transform_vector3(self.settings.resolved_tip_offset()).length()
            }
        }
    }

    pub fn stretch_limit_in(&self, parent_world: Mat4) -> f32 {
        self.settings.max_stretch * self.bone_length_in(parent_world)
    }

    pub fn tip_position(&self) -> Vec3 {
        self.tip_position
    }

    pub fn tip_velocity(&self) -> Vec3 {
        self.tip_velocity
    }

    pub fn is_instantiated(&self) -> bool {
        self.instantiated
    }

    /// Forgets the simulated tip; the next step re-captures it from the live pose.
    pub fn reset(&mut self) {
        self.instantiated = false;
        self.tip_position = Vec3::ZERO;
        self.tip_velocity = Vec3::ZERO;
    }

    fn local_tip(&self) -> Vec3 {
        match self.settings.mode {
            WiggleMode::Translate => Vec3::ZERO,
            WiggleMode::Rotate => self.settings.resolved_tip_offset(),
        }
    }

    pub fn anchor(&self, parent_world: Mat4) -> Vec3 {
        parent_world.transform_point3(self.rest.matrix().transform_point3(self.local_tip()))
    }

    pub fn step(&mut self, parent_world: Mat4, current_local: BonePose, dt: f32) -> WiggleStep {
        if !parent_world.is_finite() {
            log::debug!("[wiggle] parent transform is not finite; skipping frame");
            return WiggleStep { pose: None, anchor: self.tip_position, clamped: false, degenerate: true };
        }
        let dt = sanitize_delta(dt);
        if !self.instantiated {
            let live = parent_world * current_local.matrix();
            self.tip_position = live.transform_point3(self.local_tip());
            self.tip_velocity = Vec3::ZERO;
            self.instantiated = true;
        }

        let anchor = self.anchor(parent_world);
        self.bone_length = self.bone_length_in(parent_world);
        if dt > 0.0 {
            let acceleration = (anchor - self.tip_position) * self.settings.bounce_factor
                - self.tip_velocity * self.damping
                + self.settings.gravity_acceleration();
            self.tip_velocity += acceleration * dt;
            self.tip_position += self.tip_velocity * dt;
        }

        let (clamped, degenerate) = self.clamp_to_anchor(anchor);
        let pose = self.pose_for_tip(parent_world);
        WiggleStep { pose, anchor, clamped, degenerate }
    }

    fn clamp_to_anchor(&mut self, anchor: Vec3) -> (bool, bool) {
        if self.bone_length <= LENGTH_EPSILON {
            if !self.degenerate_reported {
                log::debug!("[wiggle] zero-length bone; stretch clamp disabled");
                self.degenerate_reported = true;
            }
            return (false, true);
        }
        let limit = self.stretch_limit();
        let offset = self.tip_position - anchor;
        let distance = offset.length();
        if distance > limit {
            self.tip_position = anchor + offset * (limit / distance);
            return (true, false);
        }
        (false, false)
    }

    fn pose_for_tip(&self, parent_world: Mat4) -> Option<BonePose> {
        let determinant = parent_world.determinant();
        if !determinant.is_finite() || determinant.abs() <= DETERMINANT_EPSILON {
            return None;
        }
        let tip_in_parent = parent_world.inverse().transform_point3(self.tip_position);
        let mut pose = self.rest;
        match self.settings.mode {
            WiggleMode::Translate => pose.translation = tip_in_parent,
            WiggleMode::Rotate => {
                let rest_dir = self.rest.rotation * (self.rest.scale * self.local_tip());
                let tip_dir = tip_in_parent - self.rest.translation;
                pose.rotation = aim_rotation(rest_dir, tip_dir) * self.rest.rotation;
            }
        }
        Some(pose)
    }
}

fn aim_rotation(from: Vec3, to: Vec3) -> Quat {
    if from.length_squared() <= LENGTH_EPSILON * LENGTH_EPSILON
        || to.length_squared() <= LENGTH_EPSILON * LENGTH_EPSILON
    {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_arc(from.normalize(), to.normalize())
}

fn sanitize_delta(dt: f32) -> f32 {
    if dt.is_finite() && dt >= 0.0 {
        dt
    } else {
        log::debug!("[wiggle] ignoring invalid frame delta {dt}");
        0.0
    }
}
