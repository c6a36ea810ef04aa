//! Headless version of the mascot scene: the cursor is scripted, the root bone follows
//! the floor point under it and spins, and the head/leg bones wiggle behind.

use crate::config::AppConfig;
use crate::picking::{cursor_to_ndc, pick_floor};
use crate::skeleton::{BoneId, Skeleton};
use crate::time::FrameClock;
use crate::wiggle::{BoneHierarchy, BonePose, RigConfig, RigFrameStats, WiggleRig};
use anyhow::{Context, Result};
use glam::{Quat, Vec2, Vec3};

pub const ROOT_BONE: &str = "Root";
pub const BODY_BONE: &str = "Body";

/// Root → Body → {Head, four legs}. Legs hang below the body so their wiggle reads as
/// floppy feet; the head sits on top.
pub fn build_mascot_skeleton() -> Result<Skeleton> {
    let mut skeleton = Skeleton::new("mascot");
    let root = skeleton.add_root(ROOT_BONE, BonePose::default())?;
    let body = skeleton.add_child(root, BODY_BONE, BonePose::from_translation(Vec3::new(0.0, 0.6, 0.0)))?;
    skeleton.add_child(body, RigConfig::MASCOT_HEAD, BonePose::from_translation(Vec3::new(0.0, 0.8, 0.0)))?;
    let leg_offsets = [
        Vec3::new(0.35, -0.5, 0.35),
        Vec3::new(-0.35, -0.5, 0.35),
        Vec3::new(0.35, -0.5, -0.35),
        Vec3::new(-0.35, -0.5, -0.35),
    ];
    for (name, offset) in RigConfig::MASCOT_LEGS.iter().zip(leg_offsets) {
        skeleton.add_child(body, name, BonePose::from_translation(offset))?;
    }
    Ok(skeleton)
}

/// Scripted cursor in window pixels: a slow ellipse around the window centre with a
/// sudden flick to the opposite side halfway through, held for half a second.
pub fn scripted_cursor(frame: u32, total_frames: u32, viewport: Vec2) -> Vec2 {
    let total = total_frames.max(1) as f32;
    let angle = frame as f32 / total * std::f32::consts::TAU;
    let centre = viewport * 0.5;
    let offset = Vec2::new(0.25 * viewport.x * angle.cos(), 0.2 * viewport.y * angle.sin());
    let flick_start = total_frames / 2;
    if (flick_start..flick_start + 30).contains(&frame) {
        centre - offset
    } else {
        centre + offset
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FrameReport {
    pub frame: u32,
    pub dt: f32,
    pub target: Option<Vec3>,
    pub stats: RigFrameStats,
    /// Largest tip-to-anchor distance as a fraction of that bone's stretch limit.
    pub max_stretch_ratio: f32,
}

pub struct MascotScene {
    pub config: AppConfig,
    pub skeleton: Skeleton,
    pub rig: WiggleRig<BoneId>,
    pub clock: FrameClock,
    root: BoneId,
    frame: u32,
}

impl MascotScene {
    pub fn new(config: AppConfig) -> Result<Self> {
        let skeleton = build_mascot_skeleton()?;
        let root = skeleton.find(ROOT_BONE).context("Mascot skeleton is missing its root bone")?;
        let rig = WiggleRig::from_config(&skeleton, &config.rig).context("Failed to build wiggle rig")?;
        let clock = FrameClock::new(config.clock.max_delta);
        Ok(Self { config, skeleton, rig, clock, root, frame: 0 })
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Advances one frame with the cursor at `cursor` (pixels, origin top-left).
    pub fn step(&mut self, cursor: Vec2, raw_delta: f32) -> FrameReport {
        let dt = self.clock.advance(raw_delta);
        let demo = &self.config.demo;
        let target = cursor_to_ndc(cursor, demo.viewport)
            .and_then(|ndc| pick_floor(&demo.camera, ndc, demo.aspect(), demo.floor_height));
        let spin = Quat::from_rotation_y(demo.spin_per_frame);
        let hover = Vec3::Y * demo.hover_height;
        if let Some(root) = self.skeleton.local_mut(self.root) {
            if let Some(target) = target {
                root.translation = target + hover;
            }
            root.rotation = (spin * root.rotation).normalize();
        }

        let stats = self.rig.update_all(&mut self.skeleton, dt);
        let report = FrameReport { frame: self.frame, dt, target, stats, max_stretch_ratio: self.max_stretch_ratio() };
        self.frame += 1;
        report
    }

    pub fn max_stretch_ratio(&self) -> f32 {
        let mut worst = 0.0_f32;
        for (_, bone) in self.rig.iter() {
            let Some(parent) = self.skeleton.parent(bone.bone()) else {
                continue;
            };
            let spring = bone.spring();
            let parent_world = self.skeleton.world_matrix(parent);
            let limit = spring.stretch_limit_in(parent_world);
            if limit <= f32::EPSILON {
                continue;
            }
            let anchor = spring.anchor(parent_world);
            worst = worst.max(spring.tip_position().distance(anchor) / limit);
        }
        worst
    }

    /// Runs the configured number of frames with the scripted cursor.
    pub fn run_scripted(&mut self, mut on_frame: impl FnMut(&FrameReport)) -> Vec<FrameReport> {
        let frames = self.config.demo.frames;
        let viewport = self.config.demo.viewport;
        let dt = self.config.clock.fixed_delta;
        let mut reports = Vec::with_capacity(frames as usize);
        for frame in 0..frames {
            let report = self.step(scripted_cursor(frame, frames, viewport), dt);
            on_frame(&report);
            reports.push(report);
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mascot_skeleton_has_rig_bones() {
        let skeleton = build_mascot_skeleton().expect("skeleton");
        assert_eq!(skeleton.len(), 7);
        for entry in RigConfig::mascot().bones {
            assert!(skeleton.find(&entry.bone).is_some(), "missing {}", entry.bone);
        }
    }

    #[test]
    fn degenerate_viewport_leaves_root_in_place() {
        let mut config = AppConfig::default();
        config.demo.viewport = Vec2::ZERO;
        let mut scene = MascotScene::new(config).expect("scene");
        let report = scene.step(Vec2::new(10.0, 10.0), 1.0 / 60.0);
        assert!(report.target.is_none());
        assert_eq!(report.stats.updated, 5);
        let root = scene.skeleton.find(ROOT_BONE).expect("root");
        assert_eq!(scene.skeleton.local(root).expect("root pose").translation, Vec3::ZERO);
    }

    #[test]
    fn cursor_flicks_halfway() {
        let viewport = Vec2::new(1280.0, 720.0);
        let before = scripted_cursor(119, 240, viewport);
        let during = scripted_cursor(120, 240, viewport);
        assert!(before.distance(during) > 300.0);
        assert_eq!(scripted_cursor(150, 240, viewport), scripted_cursor(150, 240, viewport));
        let start = scripted_cursor(0, 240, viewport);
        assert_eq!(start, Vec2::new(960.0, 360.0));
    }
}
