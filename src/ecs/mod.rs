mod systems;
mod transform;
mod world;

pub use systems::*;
pub use transform::*;
pub use world::WiggleWorld;

use crate::wiggle::{BonePose, WiggleSpring};
use bevy_ecs::prelude::*;
use glam::{Mat4, Quat, Vec3};
use std::sync::Arc;

// ---------- Components ----------
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Transform3D {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}
impl Default for Transform3D {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}
impl Transform3D {
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::default() }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}
impl From<BonePose> for Transform3D {
    fn from(pose: BonePose) -> Self {
        Self { translation: pose.translation, rotation: pose.rotation, scale: pose.scale }
    }
}
impl From<Transform3D> for BonePose {
    fn from(transform: Transform3D) -> Self {
        BonePose { translation: transform.translation, rotation: transform.rotation, scale: transform.scale }
    }
}
#[derive(Component, Clone, Copy, Default, Debug)]
pub struct WorldTransform3D(pub Mat4);
#[derive(Component, Clone, Copy)]
pub struct Parent(pub Entity);
#[derive(Component, Default)]
pub struct Children(pub Vec<Entity>);
#[derive(Component, Clone)]
pub struct BoneName(pub Arc<str>);

/// Secondary motion attached to a bone entity. Requires `Parent` and `Transform3D`.
#[derive(Component, Clone, Debug)]
pub struct Wiggle(pub WiggleSpring);

#[derive(Resource, Clone, Copy)]
pub struct TimeDelta(pub f32);
