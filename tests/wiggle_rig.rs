use glam::Vec3;
use kestrel_wiggle::config::AppConfig;
use kestrel_wiggle::demo::{build_mascot_skeleton, scripted_cursor, MascotScene};
use kestrel_wiggle::skeleton::Skeleton;
use kestrel_wiggle::wiggle::{BonePose, RigBoneConfig, RigConfig, WiggleRig, WiggleSettings};
use kestrel_wiggle::WiggleError;

const FRAME: f32 = 1.0 / 60.0;

#[test]
fn mascot_rig_binds_head_and_legs() {
    let skeleton = build_mascot_skeleton().expect("mascot skeleton");
    let rig = WiggleRig::from_config(&skeleton, &RigConfig::mascot()).expect("mascot rig");
    assert_eq!(rig.len(), 5);
    let head = rig.bone("Head").expect("head wiggle");
    assert_eq!(head.bone(), skeleton.find("Head").expect("head bone"));
    assert!((head.spring().bone_length() - 0.8).abs() < 1e-6);
    let names: Vec<&str> = rig.iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["Head", "Leg_FL", "Leg_FR", "Leg_BL", "Leg_BR"]);
}

#[test]
fn rig_rejects_unknown_and_duplicate_bones() {
    let skeleton = build_mascot_skeleton().expect("mascot skeleton");
    let tuning = WiggleSettings::default();

    let unknown = RigConfig { bones: vec![RigBoneConfig::new("Tail", tuning)] };
    let err = WiggleRig::from_config(&skeleton, &unknown).unwrap_err();
    assert_eq!(err, WiggleError::UnknownBoneName("Tail".to_string()));

    let duplicate = RigConfig { bones: vec![RigBoneConfig::new("Head", tuning), RigBoneConfig::new("Head", tuning)] };
    let err = WiggleRig::from_config(&skeleton, &duplicate).unwrap_err();
    assert_eq!(err, WiggleError::DuplicateBone("Head".to_string()));

    let root = RigConfig { bones: vec![RigBoneConfig::new("Root", tuning)] };
    let err = WiggleRig::from_config(&skeleton, &root).unwrap_err();
    assert_eq!(err, WiggleError::MissingParent("Root".to_string()));
}

#[test]
fn rig_update_reports_clamped_bones() {
    let mut skeleton = build_mascot_skeleton().expect("mascot skeleton");
    let mut rig = WiggleRig::from_config(&skeleton, &RigConfig::mascot()).expect("mascot rig");
    let root = skeleton.find("Root").expect("root");

    let stats = rig.update_all(&mut skeleton, FRAME);
    assert_eq!(stats.updated, 5);
    assert_eq!(stats.clamped, 0);

    skeleton.local_mut(root).expect("root pose").translation = Vec3::new(10.0, 0.0, 0.0);
    let stats = rig.update_all(&mut skeleton, FRAME);
    assert_eq!(stats.updated, 5);
    assert_eq!(stats.clamped, 5, "a 10 unit jump should hit every stretch limit");
    assert_eq!(stats.skipped_writes, 0);
}

#[test]
fn rig_reset_snaps_back_to_live_pose() {
    let mut skeleton = build_mascot_skeleton().expect("mascot skeleton");
    let mut rig = WiggleRig::from_config(&skeleton, &RigConfig::mascot()).expect("mascot rig");
    let root = skeleton.find("Root").expect("root");
    let head = skeleton.find("Head").expect("head");

    rig.update_all(&mut skeleton, FRAME);
    skeleton.local_mut(root).expect("root pose").translation = Vec3::new(2.0, 0.0, 0.0);
    rig.update_all(&mut skeleton, FRAME);
    assert_ne!(skeleton.local(head), skeleton.rest(head));

    skeleton.reset_to_rest();
    rig.reset();
    rig.update_all(&mut skeleton, FRAME);
    let body = skeleton.find("Body").expect("body");
    let expected = skeleton.world_matrix(body).transform_point3(Vec3::new(0.0, 0.8, 0.0));
    assert!((skeleton.world_position(head) - expected).length() < 1e-5);
    assert!(rig.iter().all(|(_, bone)| bone.spring().is_instantiated()));
}

#[test]
fn rig_works_on_custom_skeleton() {
    let mut skeleton = Skeleton::new("antler");
    let root = skeleton.add_root("Root", BonePose::default()).expect("root");
    let mut parent = root;
    for index in 0..3 {
        parent = skeleton
            .add_child(parent, &format!("Tine_{index}"), BonePose::from_translation(Vec3::new(0.0, 0.5, 0.0)))
            .expect("tine");
    }
    let config: RigConfig = serde_json::from_str(
        r#"{ "bones": [
            { "bone": "Tine_0", "bounce_factor": 40.0, "max_stretch": 0.3 },
            { "bone": "Tine_2", "bounce_factor": 5.0, "mode": "rotate" }
        ] }"#,
    )
    .expect("parse rig");
    let mut rig = WiggleRig::from_config(&skeleton, &config).expect("antler rig");
    assert_eq!(rig.len(), 2);

    for frame in 0..120 {
        let x = (frame as f32 * 0.2).sin();
        skeleton.local_mut(root).expect("root pose").translation = Vec3::new(x, 0.0, 0.0);
        rig.update_all(&mut skeleton, FRAME);
    }
    for (_, bone) in rig.iter() {
        let parent = skeleton.joint(bone.bone()).and_then(|joint| joint.parent).expect("parent");
        let anchor = bone.spring().anchor(skeleton.world_matrix(parent));
        assert!(bone.tip_position().distance(anchor) <= bone.spring().stretch_limit() + 1e-5);
    }
}

#[test]
fn scripted_mascot_run_stays_within_stretch() {
    let mut config = AppConfig::default();
    config.demo.frames = 240;
    let mut scene = MascotScene::new(config).expect("mascot scene");
    let mut worst = 0.0_f32;
    let reports = scene.run_scripted(|report| worst = worst.max(report.max_stretch_ratio));

    assert_eq!(reports.len(), 240);
    assert_eq!(scene.frame(), 240);
    assert!(worst <= 1.0 + 1e-4, "stretch ratio exceeded: {worst}");
    assert!(reports.iter().all(|report| report.stats.updated == 5));
    assert!(reports.iter().all(|report| report.target.is_some()), "floor should always be under the cursor");
    assert!(worst > 0.0, "the cursor flick should make the bones lag");
}

#[test]
fn mascot_scene_clamps_stalled_frames() {
    let mut scene = MascotScene::new(AppConfig::default()).expect("mascot scene");
    let viewport = scene.config.demo.viewport;
    scene.step(scripted_cursor(0, 240, viewport), FRAME);
    let report = scene.step(scripted_cursor(10, 240, viewport), 5.0);
    assert!((report.dt - 0.1).abs() < 1e-6);
    assert_eq!(scene.clock.clamped_frames(), 1);
    assert!(report.max_stretch_ratio <= 1.0 + 1e-4);
}

#[test]
fn bundled_config_matches_mascot_defaults() {
    let config = AppConfig::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config/wiggle.json")).expect("bundled config");
    assert_eq!(config.rig, RigConfig::mascot());
    assert_eq!(config.demo.frames, 240);
    assert!((config.demo.aspect() - 16.0 / 9.0).abs() < 1e-6);
}
