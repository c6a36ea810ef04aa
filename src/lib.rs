pub mod cli;
pub mod config;
pub mod demo;
pub mod ecs;
pub mod error;
pub mod picking;
pub mod skeleton;
pub mod time;
pub mod wiggle;

pub use error::WiggleError;
pub use skeleton::{BoneId, Skeleton};
pub use wiggle::{BoneHierarchy, BonePose, WiggleBone, WiggleRig, WiggleSettings};
