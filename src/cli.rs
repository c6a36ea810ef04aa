use crate::config::AppConfigOverrides;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CliOverrides {
    config: Option<PathBuf>,
    frames: Option<u32>,
    dt: Option<f32>,
    max_delta: Option<f32>,
    gravity: Option<bool>,
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = CliOverrides::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            let Some(key) = flag.strip_prefix("--") else {
                bail!("Unexpected argument '{flag}'. Use --config/--frames/--dt/--max-delta/--gravity with values.");
            };
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "config" => overrides.config = Some(PathBuf::from(value)),
                "frames" => {
                    overrides.frames =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid frame count '{value}'"))?);
                }
                "dt" => overrides.dt = Some(parse_seconds("dt", &value)?),
                "max-delta" => overrides.max_delta = Some(parse_seconds("max-delta", &value)?),
                "gravity" => overrides.gravity = Some(parse_bool_flag("gravity", &value)?),
                _ => bail!("Unknown flag '{flag}'. Supported flags: --config, --frames, --dt, --max-delta, --gravity."),
            }
        }
        Ok(overrides)
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config.as_deref()
    }

    pub fn into_config_overrides(self) -> AppConfigOverrides {
        AppConfigOverrides {
            frames: self.frames,
            fixed_delta: self.dt,
            max_delta: self.max_delta,
            gravity: self.gravity,
        }
    }
}

fn parse_seconds(flag: &str, value: &str) -> Result<f32> {
    let seconds = value.parse::<f32>().with_context(|| format!("Invalid {flag} '{value}'"))?;
    if !seconds.is_finite() || seconds <= 0.0 {
        bail!("Invalid {flag} '{value}'. Expected a positive number of seconds.");
    }
    Ok(seconds)
}

fn parse_bool_flag(flag: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => bail!("Invalid {flag} value '{other}'. Use on/off or true/false."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let args =
            ["app", "--config", "rig.json", "--frames", "90", "--dt", "0.02", "--max-delta", "0.2", "--gravity", "on"];
        let overrides = CliOverrides::parse(args).expect("parse overrides");
        assert_eq!(overrides.config_path(), Some(Path::new("rig.json")));
        let config = overrides.into_config_overrides();
        assert_eq!(config.frames, Some(90));
        assert_eq!(config.fixed_delta, Some(0.02));
        assert_eq!(config.max_delta, Some(0.2));
        assert_eq!(config.gravity, Some(true));
    }

    #[test]
    fn latest_flag_wins() {
        let args = ["app", "--frames", "10", "--frames", "20", "--gravity", "on", "--gravity", "off"];
        let overrides = CliOverrides::parse(args).expect("parse overrides").into_config_overrides();
        assert_eq!(overrides.frames, Some(20));
        assert_eq!(overrides.gravity, Some(false));
        assert_eq!(overrides.fixed_delta, None);
    }

    #[test]
    fn missing_value_errors() {
        let err = CliOverrides::parse(["app", "--frames"]).unwrap_err();
        assert!(err.to_string().contains("Expected a value"), "error should mention missing value");
    }

    #[test]
    fn rejects_unknown_flags_and_bad_seconds() {
        let err = CliOverrides::parse(["app", "--foo", "bar"]).unwrap_err();
        assert!(err.to_string().contains("Unknown flag"), "unknown flags should error");
        let err = CliOverrides::parse(["app", "--dt", "-1"]).unwrap_err();
        assert!(err.to_string().contains("positive"), "negative dt should error");
        assert!(CliOverrides::parse(["app", "positional"]).is_err());
    }
}
