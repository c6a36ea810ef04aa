use glam::{Quat, Vec3};
use kestrel_wiggle::ecs::{Transform3D, WiggleWorld};
use kestrel_wiggle::skeleton::Skeleton;
use kestrel_wiggle::wiggle::{BonePose, WiggleBone, WiggleSettings};

const TEST_DT: f32 = 1.0 / 60.0;
const TEST_STEPS: usize = 240;

fn root_pose(frame: usize) -> (Vec3, Quat) {
    let t = frame as f32 * TEST_DT;
    let translation = Vec3::new((t * 3.0).sin() * 2.0, 0.0, (t * 2.0).cos());
    (translation, Quat::from_rotation_y(t * 0.7))
}

fn assert_vec3_near(actual: Vec3, expected: Vec3, epsilon: f32) {
    assert!((actual - expected).length() <= epsilon, "expected {expected:?}, got {actual:?}");
}

#[test]
fn ecs_wiggle_matches_skeleton_path() {
    let settings = WiggleSettings::new(12.0, 0.7).with_gravity(true);
    let offset = Vec3::new(0.2, 1.0, 0.0);

    let mut skeleton = Skeleton::new("reference");
    let root = skeleton.add_root("Root", BonePose::default()).expect("root");
    let ear = skeleton.add_child(root, "Ear", BonePose::from_translation(offset)).expect("ear");
    let mut reference = WiggleBone::new(&skeleton, ear, settings).expect("reference wiggle");

    let mut world = WiggleWorld::new();
    let root_entity = world.spawn_bone("Root", Transform3D::default(), None).expect("root entity");
    let ear_entity =
        world.spawn_bone("Ear", Transform3D::from_translation(offset), Some(root_entity)).expect("ear entity");
    world.attach_wiggle(ear_entity, settings).expect("attach wiggle");

    for frame in 0..TEST_STEPS {
        let (translation, rotation) = root_pose(frame);
        let pose = skeleton.local_mut(root).expect("root pose");
        pose.translation = translation;
        pose.rotation = rotation;
        reference.update(&mut skeleton, TEST_DT);

        world.set_transform(root_entity, Transform3D { translation, rotation, scale: Vec3::ONE });
        let stats = world.update(TEST_DT);
        assert_eq!(stats.updated, 1);

        let ecs_position = world.world_position(ear_entity).expect("ear world position");
        assert_vec3_near(ecs_position, skeleton.world_position(ear), 1e-4);
    }

    let spring = world.wiggle(ear_entity).expect("ear spring");
    assert_vec3_near(spring.tip_position(), reference.tip_position(), 1e-4);
    assert_vec3_near(spring.tip_velocity(), reference.tip_velocity(), 1e-3);
    assert_eq!(world.wiggle_stats().frames, TEST_STEPS as u64);
}

#[test]
fn ecs_wiggle_respects_stretch_limit() {
    let mut world = WiggleWorld::new();
    let root = world.spawn_bone("Root", Transform3D::default(), None).expect("root");
    let body = world.spawn_bone("Body", Transform3D::from_translation(Vec3::Y), Some(root)).expect("body");
    let head = world.spawn_bone("Head", Transform3D::from_translation(Vec3::Y), Some(body)).expect("head");
    world.attach_wiggle(head, WiggleSettings::new(10.0, 0.5)).expect("attach wiggle");
    world.update(TEST_DT);

    world.set_transform(root, Transform3D::from_translation(Vec3::new(6.0, 0.0, 0.0)));
    let stats = world.update(TEST_DT);
    assert_eq!(stats.clamped, 1);

    let anchor = world.world_matrix(body).expect("body world").transform_point3(Vec3::Y);
    let tip = world.wiggle(head).expect("head spring").tip_position();
    assert!(tip.distance(anchor) <= 0.5 + 1e-5);
    assert_vec3_near(world.world_position(head).expect("head world"), tip, 1e-4);
    assert_eq!(world.transform(body), Some(Transform3D::from_translation(Vec3::Y)));
}
