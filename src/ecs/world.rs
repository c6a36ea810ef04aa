use super::{
    sys_propagate_transforms, sys_update_wiggle_bones, BoneName, Children, Parent, TimeDelta, Transform3D,
    PoseScratch, PosePropagationStats, Wiggle, WiggleStats, WorldTransform3D,
};
use crate::error::WiggleError;
use crate::wiggle::{RigFrameStats, WiggleSettings, WiggleSpring};
use anyhow::{anyhow, Result};
use bevy_ecs::prelude::{Entity, IntoSystemConfigs, Schedule, World};
use glam::{Mat4, Vec3};
use std::sync::Arc;

pub struct WiggleWorld {
    pub world: World,
    schedule_pose: Schedule,
    schedule_wiggle: Schedule,
}

impl WiggleWorld {
    pub fn new() -> Self {
        let mut world = World::new();
        world.insert_resource(TimeDelta(0.0));
        world.insert_resource(PoseScratch::default());
        world.insert_resource(PosePropagationStats::default());
        world.insert_resource(WiggleStats::default());

        let mut schedule_pose = Schedule::default();
        schedule_pose.add_systems(sys_propagate_transforms);

        let mut schedule_wiggle = Schedule::default();
        schedule_wiggle.add_systems((sys_update_wiggle_bones, sys_propagate_transforms).chain());

        Self { world, schedule_pose, schedule_wiggle }
    }

    /// Runs one frame: propagate the primary pose, step wiggle bones, propagate again so
    /// readers see the wiggled hierarchy.
    pub fn update(&mut self, dt: f32) -> RigFrameStats {
        self.world.resource_mut::<TimeDelta>().0 = dt;
        self.schedule_pose.run(&mut self.world);
        self.schedule_wiggle.run(&mut self.world);
        self.world.resource::<WiggleStats>().last_frame
    }

    pub fn spawn_bone(&mut self, name: &str, transform: Transform3D, parent: Option<Entity>) -> Result<Entity> {
        if let Some(parent) = parent {
            if self.world.get::<Transform3D>(parent).is_none() {
                return Err(anyhow!("Parent entity {parent:?} is not a bone"));
            }
        }
        let entity = self
            .world
            .spawn((BoneName(Arc::from(name)), transform, WorldTransform3D(transform.matrix())))
            .id();
        if let Some(parent) = parent {
            self.world.entity_mut(entity).insert(Parent(parent));
            if let Some(mut children) = self.world.get_mut::<Children>(parent) {
                children.0.push(entity);
            } else {
                self.world.entity_mut(parent).insert(Children(vec![entity]));
            }
        }
        Ok(entity)
    }

    /// Attaches a wiggle spring using the entity's current local transform as rest pose.
    pub fn attach_wiggle(&mut self, entity: Entity, settings: WiggleSettings) -> Result<(), WiggleError> {
        let label = self.bone_label(entity);
        let Some(transform) = self.world.get::<Transform3D>(entity).copied() else {
            return Err(WiggleError::UnknownBone(label));
        };
        if self.world.get::<Parent>(entity).is_none() {
            return Err(WiggleError::MissingParent(label));
        }
        let spring = WiggleSpring::new(transform.into(), settings)?;
        self.world.entity_mut(entity).insert(Wiggle(spring));
        Ok(())
    }

    pub fn find_bone(&mut self, name: &str) -> Option<Entity> {
        let mut query = self.world.query::<(Entity, &BoneName)>();
        query.iter(&self.world).find(|(_, bone)| bone.0.as_ref() == name).map(|(entity, _)| entity)
    }

    fn bone_label(&self, entity: Entity) -> String {
        self.world
            .get::<BoneName>(entity)
            .map(|name| name.0.to_string())
            .unwrap_or_else(|| format!("entity_{}", entity.index()))
    }

    pub fn set_transform(&mut self, entity: Entity, transform: Transform3D) -> bool {
        match self.world.get_mut::<Transform3D>(entity) {
            Some(mut current) => {
                *current = transform;
                true
            }
            None => false,
        }
    }

    pub fn transform(&self, entity: Entity) -> Option<Transform3D> {
        self.world.get::<Transform3D>(entity).copied()
    }

    pub fn world_matrix(&self, entity: Entity) -> Option<Mat4> {
        self.world.get::<WorldTransform3D>(entity).map(|world| world.0)
    }

    pub fn world_position(&self, entity: Entity) -> Option<Vec3> {
        self.world_matrix(entity).map(|world| world.transform_point3(Vec3::ZERO))
    }

    pub fn wiggle(&self, entity: Entity) -> Option<&WiggleSpring> {
        self.world.get::<Wiggle>(entity).map(|wiggle| &wiggle.0)
    }

    pub fn propagation_stats(&self) -> PosePropagationStats {
        *self.world.resource::<PosePropagationStats>()
    }

    pub fn wiggle_stats(&self) -> WiggleStats {
        *self.world.resource::<WiggleStats>()
    }
}

impl Default for WiggleWorld {
    fn default() -> Self {
        Self::new()
    }
}
