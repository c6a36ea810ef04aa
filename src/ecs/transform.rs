use super::{Children, Parent, Transform3D, WorldTransform3D};
use bevy_ecs::entity::EntityHashSet;
use bevy_ecs::prelude::*;
use glam::Mat4;
use smallvec::SmallVec;

/// Work queue reused across frames: (bone, parent world matrix, depth below its root).
#[derive(Resource, Default)]
pub struct PoseScratch {
    pending: SmallVec<[(Entity, Mat4, u32); 64]>,
    posed: EntityHashSet,
}

#[derive(Resource, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct PosePropagationStats {
    pub roots: u32,
    pub posed_bones: u32,
    /// Bones with a `Parent` that no root reaches; they are posed from their local transform.
    pub detached_bones: u32,
    pub deepest_chain: u32,
}

fn queue_children(
    pending: &mut SmallVec<[(Entity, Mat4, u32); 64]>,
    children: Option<&Children>,
    world: Mat4,
    depth: u32,
) {
    if let Some(children) = children {
        pending.extend(children.0.iter().rev().map(|&child| (child, world, depth + 1)));
    }
}

/// Composes every bone's world matrix from its parent chain, roots first.
pub fn sys_propagate_transforms(
    mut bones: Query<(Entity, &Transform3D, Option<&Children>, &mut WorldTransform3D)>,
    roots: Query<Entity, (With<WorldTransform3D>, Without<Parent>)>,
    mut scratch: ResMut<PoseScratch>,
    mut stats: ResMut<PosePropagationStats>,
) {
    let PoseScratch { pending, posed } = &mut *scratch;
    pending.clear();
    posed.clear();
    let mut frame = PosePropagationStats::default();

    for root in roots.iter() {
        let Ok((entity, local, children, mut world)) = bones.get_mut(root) else {
            continue;
        };
        world.0 = local.matrix();
        posed.insert(entity);
        frame.roots += 1;
        queue_children(pending, children, world.0, 0);
    }

    while let Some((entity, parent_world, depth)) = pending.pop() {
        let Ok((entity, local, children, mut world)) = bones.get_mut(entity) else {
            continue;
        };
        // A bone listed under two parents keeps the first pose it received.
        if !posed.insert(entity) {
            continue;
        }
        world.0 = parent_world * local.matrix();
        frame.deepest_chain = frame.deepest_chain.max(depth);
        queue_children(pending, children, world.0, depth);
    }

    for (entity, local, _, mut world) in bones.iter_mut() {
        if !posed.contains(&entity) {
            world.0 = local.matrix();
            frame.detached_bones += 1;
        }
    }
    frame.posed_bones = posed.len() as u32;
    *stats = frame;
}
