//! Secondary motion for skeletal bones: springy lag and overshoot layered on top of
//! whatever primary animation moves the bone's ancestors.

mod bone;
mod hierarchy;
mod rig;
mod settings;
mod spring;

pub use bone::WiggleBone;
pub use hierarchy::{BoneHierarchy, BoneLookup, BonePose};
pub use rig::{RigBoneConfig, RigConfig, RigFrameStats, WiggleRig};
pub use settings::{WiggleMode, WiggleSettings};
pub use spring::{WiggleSpring, WiggleStep};
