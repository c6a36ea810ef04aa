use thiserror::Error;

/// Setup-time failures. Per-frame updates never produce these; a wiggle bone that
/// constructed successfully keeps running even when its geometry degenerates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WiggleError {
    #[error("bone {0} does not exist in the hierarchy")]
    UnknownBone(String),
    #[error("no bone named '{0}' in the hierarchy")]
    UnknownBoneName(String),
    #[error("bone '{0}' has no parent; wiggle bones need a parent to wiggle around")]
    MissingParent(String),
    #[error("bone '{0}' is configured more than once")]
    DuplicateBone(String),
    #[error("bounce_factor must be a positive finite number (got {0})")]
    InvalidBounceFactor(f32),
    #[error("max_stretch must be a non-negative finite number (got {0})")]
    InvalidMaxStretch(f32),
    #[error("damping must be a non-negative finite number (got {0})")]
    InvalidDamping(f32),
}
