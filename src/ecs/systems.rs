use super::{Parent, TimeDelta, Transform3D, Wiggle, WorldTransform3D};
use crate::wiggle::{RigFrameStats, WiggleStep};
use bevy_ecs::prelude::*;

#[derive(Resource, Clone, Copy, Default, Debug)]
pub struct WiggleStats {
    pub last_frame: RigFrameStats,
    pub frames: u64,
}

/// Steps every `Wiggle` against its parent's world matrix from the preceding propagation
/// pass and writes the result into the bone's local transform.
///
/// Each entity only writes its own `Transform3D`, so bone order does not matter. A wiggle
/// bone whose parent also wiggles sees the parent's pose from before this pass.
pub fn sys_update_wiggle_bones(
    dt: Res<TimeDelta>,
    mut stats: ResMut<WiggleStats>,
    mut bones: Query<(&mut Wiggle, &Parent, &mut Transform3D)>,
    worlds: Query<&WorldTransform3D>,
) {
    let mut frame = RigFrameStats::default();
    for (mut wiggle, parent, mut transform) in bones.iter_mut() {
        let Ok(parent_world) = worlds.get(parent.0) else {
            frame.record(&WiggleStep {
                pose: None,
                anchor: wiggle.0.tip_position(),
                clamped: false,
                degenerate: true,
            });
            continue;
        };
        let step = wiggle.0.step(parent_world.0, (*transform).into(), dt.0);
        if let Some(pose) = step.pose {
            *transform = pose.into();
        }
        frame.record(&step);
    }
    stats.last_frame = frame;
    stats.frames += 1;
}
