use anyhow::Result;
use kestrel_wiggle::cli::CliOverrides;
use kestrel_wiggle::config::AppConfig;
use kestrel_wiggle::demo::MascotScene;

const DEFAULT_CONFIG_PATH: &str = "config/wiggle.json";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = match CliOverrides::parse_from_env() {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("[cli] {err}");
            std::process::exit(2);
        }
    };
    if let Err(err) = run(cli) {
        eprintln!("Application error: {err:?}");
        std::process::exit(1);
    }
}

fn run(cli: CliOverrides) -> Result<()> {
    let mut config = match cli.config_path() {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_or_default(DEFAULT_CONFIG_PATH),
    };
    let overrides = cli.into_config_overrides();
    if !overrides.is_empty() {
        log::info!("[cli] overriding {}", overrides.applied_fields().join(", "));
    }
    config.apply_overrides(&overrides);

    let report_every = config.demo.report_every.max(1);
    let mut scene = MascotScene::new(config)?;
    let reports = scene.run_scripted(|report| {
        if report.frame % report_every == 0 {
            let target = report
                .target
                .map(|t| format!("({:.2}, {:.2}, {:.2})", t.x, t.y, t.z))
                .unwrap_or_else(|| "none".to_string());
            println!(
                "frame {:>4} dt={:.4} target={} clamped={} degenerate={} stretch={:.2}",
                report.frame,
                report.dt,
                target,
                report.stats.clamped,
                report.stats.degenerate,
                report.max_stretch_ratio
            );
        }
    });

    let clamped_frames = reports.iter().filter(|report| report.stats.clamped > 0).count();
    let worst = reports.iter().map(|report| report.max_stretch_ratio).fold(0.0_f32, f32::max);
    println!(
        "{} frames ({:.2}s simulated), {} with clamped bones, worst stretch ratio {:.3}, {} long frame(s) clamped",
        reports.len(),
        scene.clock.elapsed_seconds(),
        clamped_frames,
        worst,
        scene.clock.clamped_frames()
    );
    for (name, bone) in scene.rig.iter() {
        let tip = bone.tip_position();
        println!("  {name:<8} tip=({:.3}, {:.3}, {:.3})", tip.x, tip.y, tip.z);
    }
    Ok(())
}
