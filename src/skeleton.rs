use crate::wiggle::{BoneHierarchy, BoneLookup, BonePose};
use anyhow::{anyhow, Result};
use glam::{Mat4, Vec3};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoneId(pub u32);

impl BoneId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct SkeletonJoint {
    pub name: Arc<str>,
    pub parent: Option<BoneId>,
    pub children: SmallVec<[BoneId; 4]>,
    pub rest: BonePose,
    pub local: BonePose,
}

/// Arena-backed bone hierarchy. Bones are appended in parent-before-child order, so a
/// `BoneId` doubles as an index into [`Skeleton::propagate`] output.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub name: Arc<str>,
    joints: Vec<SkeletonJoint>,
    roots: SmallVec<[BoneId; 2]>,
    by_name: HashMap<Arc<str>, BoneId>,
    root_transform: Mat4,
}

impl Skeleton {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            joints: Vec::new(),
            roots: SmallVec::new(),
            by_name: HashMap::new(),
            root_transform: Mat4::IDENTITY,
        }
    }

    pub fn add_root(&mut self, name: &str, pose: BonePose) -> Result<BoneId> {
        let id = self.push_joint(name, None, pose)?;
        self.roots.push(id);
        Ok(id)
    }

    pub fn add_child(&mut self, parent: BoneId, name: &str, pose: BonePose) -> Result<BoneId> {
        if parent.index() >= self.joints.len() {
            return Err(anyhow!("Parent bone {:?} does not exist in skeleton '{}'", parent, self.name));
        }
        let id = self.push_joint(name, Some(parent), pose)?;
        self.joints[parent.index()].children.push(id);
        Ok(id)
    }

    fn push_joint(&mut self, name: &str, parent: Option<BoneId>, pose: BonePose) -> Result<BoneId> {
        if self.by_name.contains_key(name) {
            return Err(anyhow!("Skeleton '{}' already has a bone named '{}'", self.name, name));
        }
        let id = BoneId(self.joints.len() as u32);
        let name: Arc<str> = Arc::from(name);
        self.by_name.insert(Arc::clone(&name), id);
        self.joints.push(SkeletonJoint { name, parent, children: SmallVec::new(), rest: pose, local: pose });
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn joint(&self, bone: BoneId) -> Option<&SkeletonJoint> {
        self.joints.get(bone.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (BoneId, &SkeletonJoint)> {
        self.joints.iter().enumerate().map(|(index, joint)| (BoneId(index as u32), joint))
    }

    pub fn find(&self, name: &str) -> Option<BoneId> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, bone: BoneId) -> Option<&str> {
        self.joint(bone).map(|joint| joint.name.as_ref())
    }

    pub fn children(&self, bone: BoneId) -> &[BoneId] {
        self.joint(bone).map(|joint| joint.children.as_slice()).unwrap_or(&[])
    }

    pub fn local(&self, bone: BoneId) -> Option<BonePose> {
        self.joint(bone).map(|joint| joint.local)
    }

    pub fn rest(&self, bone: BoneId) -> Option<BonePose> {
        self.joint(bone).map(|joint| joint.rest)
    }

    pub fn set_local(&mut self, bone: BoneId, pose: BonePose) -> bool {
        match self.joints.get_mut(bone.index()) {
            Some(joint) => {
                joint.local = pose;
                true
            }
            None => false,
        }
    }

    /// Mutable access for primary animation (e.g. steering the root).
    pub fn local_mut(&mut self, bone: BoneId) -> Option<&mut BonePose> {
        self.joints.get_mut(bone.index()).map(|joint| &mut joint.local)
    }

    pub fn reset_to_rest(&mut self) {
        for joint in &mut self.joints {
            joint.local = joint.rest;
        }
    }

    /// Places the whole skeleton in the world (the mesh/object the skeleton is bound to).
    pub fn set_root_transform(&mut self, transform: Mat4) {
        self.root_transform = transform;
    }

    /// Walks up the ancestor chain composing current local poses.
    pub fn world_matrix(&self, bone: BoneId) -> Mat4 {
        let mut chain: SmallVec<[BoneId; 16]> = SmallVec::new();
        let mut cursor = Some(bone);
        while let Some(current) = cursor {
            let Some(joint) = self.joint(current) else {
                break;
            };
            chain.push(current);
            cursor = joint.parent;
        }
        let mut world = self.root_transform;
        for id in chain.iter().rev() {
            world *= self.joints[id.index()].local.matrix();
        }
        world
    }

    pub fn world_position(&self, bone: BoneId) -> Vec3 {
        self.world_matrix(bone).transform_point3(Vec3::ZERO)
    }

    /// Computes every bone's world matrix in one pre-order pass; `out[id.index()]` is the
    /// world matrix of `id`.
    pub fn propagate(&self, out: &mut Vec<Mat4>) {
        out.clear();
        out.resize(self.joints.len(), Mat4::IDENTITY);
        let mut stack: SmallVec<[(BoneId, Mat4); 32]> = SmallVec::new();
        for &root in self.roots.iter().rev() {
            stack.push((root, self.root_transform));
        }
        while let Some((bone, parent_world)) = stack.pop() {
            let joint = &self.joints[bone.index()];
            let world = parent_world * joint.local.matrix();
            out[bone.index()] = world;
            for &child in joint.children.iter().rev() {
                stack.push((child, world));
            }
        }
    }
}

impl BoneHierarchy for Skeleton {
    type Bone = BoneId;

    fn contains(&self, bone: BoneId) -> bool {
        bone.index() < self.joints.len()
    }

    fn parent(&self, bone: BoneId) -> Option<BoneId> {
        self.joint(bone).and_then(|joint| joint.parent)
    }

    fn local_pose(&self, bone: BoneId) -> Option<BonePose> {
        self.local(bone)
    }

    fn world_matrix(&self, bone: BoneId) -> Mat4 {
        Skeleton::world_matrix(self, bone)
    }

    fn set_local_pose(&mut self, bone: BoneId, pose: BonePose) {
        self.set_local(bone, pose);
    }

    fn bone_label(&self, bone: BoneId) -> String {
        self.name_of(bone).map(str::to_string).unwrap_or_else(|| format!("bone_{}", bone.0))
    }
}

impl BoneLookup for Skeleton {
    fn find_bone(&self, name: &str) -> Option<BoneId> {
        self.find(name)
    }
}
