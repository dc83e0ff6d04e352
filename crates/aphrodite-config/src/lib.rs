//! Engine configuration for the aphrodite chart engine.
//!
//! Settings come from built-in defaults, then an optional `configs/aphrodite.toml`
//! (`[engine]` table), then environment overrides.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "APHRODITE_CONFIG";
pub const EPHEMERIS_PATH_ENV: &str = "SWISS_EPHEMERIS_PATH";
pub const NATAL_TTL_ENV: &str = "APHRODITE_NATAL_TTL_SECS";
pub const TRANSIT_TTL_ENV: &str = "APHRODITE_TRANSIT_TTL_SECS";

/// House system name -> Swiss Ephemeris house system letter.
pub const HOUSE_SYSTEMS: &[(&str, u8)] = &[
    ("placidus", b'P'),
    ("whole_sign", b'W'),
    ("koch", b'K'),
    ("equal", b'E'),
    ("regiomontanus", b'R'),
    ("campanus", b'C'),
    ("alcabitius", b'A'),
    ("morinus", b'M'),
];

/// Look up the Swiss Ephemeris letter for a house system name.
pub fn house_system_code(name: &str) -> Option<u8> {
    let name = name.to_lowercase();
    HOUSE_SYSTEMS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, code)| *code)
}

/// Location used when a birth record carries no coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ReferenceLocation {
    pub lat: f64,
    pub lon: f64,
}

impl Default for ReferenceLocation {
    fn default() -> Self {
        // Royal Observatory, Greenwich
        Self { lat: 51.4779, lon: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Directory holding Swiss Ephemeris data files. `None` starts the engine
    /// on the mean-motion fallback provider.
    pub ephemeris_path: Option<PathBuf>,
    pub natal_ttl: Duration,
    pub transit_ttl: Duration,
    pub default_location: ReferenceLocation,
    pub house_system: String,
    /// Tolerance in degrees for returns/oppositions/squares in cycle scans.
    pub cycle_orb: f64,
    pub max_cycle_events: usize,
    /// Number of tightest aspects kept in compact summaries.
    pub summary_aspects: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ephemeris_path: None,
            natal_ttl: Duration::from_secs(24 * 60 * 60),
            transit_ttl: Duration::from_secs(12 * 60 * 60),
            default_location: ReferenceLocation::default(),
            house_system: "placidus".to_string(),
            cycle_orb: 3.0,
            max_cycle_events: 24,
            summary_aspects: 5,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.natal_ttl.is_zero() {
            anyhow::bail!("natal cache TTL must be greater than zero");
        }
        if self.transit_ttl.is_zero() {
            anyhow::bail!("transit cache TTL must be greater than zero");
        }
        let loc = self.default_location;
        if !(-90.0..=90.0).contains(&loc.lat) || !(-180.0..=180.0).contains(&loc.lon) {
            anyhow::bail!(
                "default_location out of range: lat {} lon {} (expected lat in [-90, 90], lon in [-180, 180])",
                loc.lat,
                loc.lon
            );
        }
        if house_system_code(&self.house_system).is_none() {
            anyhow::bail!(
                "unknown house_system {:?}; valid systems: {:?}",
                self.house_system,
                HOUSE_SYSTEMS.iter().map(|(n, _)| *n).collect::<Vec<_>>()
            );
        }
        if !(self.cycle_orb > 0.0 && self.cycle_orb < 45.0) {
            anyhow::bail!("cycle_orb must be in (0, 45), got {}", self.cycle_orb);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EngineToml {
    #[serde(default)]
    ephemeris_path: Option<PathBuf>,
    #[serde(default)]
    natal_ttl_secs: Option<u64>,
    #[serde(default)]
    transit_ttl_secs: Option<u64>,
    #[serde(default)]
    default_location: Option<ReferenceLocation>,
    #[serde(default)]
    house_system: Option<String>,
    #[serde(default)]
    cycle_orb: Option<f64>,
    #[serde(default)]
    max_cycle_events: Option<usize>,
    #[serde(default)]
    summary_aspects: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
struct RootConfigToml {
    #[serde(default)]
    engine: Option<EngineToml>,
}

/// Try `APHRODITE_CONFIG`, then the usual relative `configs/aphrodite.toml` paths.
/// A missing file is not an error; an unreadable one named by the env var is.
pub fn read_config_toml_text() -> anyhow::Result<Option<(PathBuf, String)>> {
    if let Ok(explicit) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(explicit);
        let text = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read {} ({}): {e}", path.display(), CONFIG_PATH_ENV)
        })?;
        return Ok(Some((path, text)));
    }
    let paths = ["configs/aphrodite.toml", "../../configs/aphrodite.toml"];
    for p in &paths {
        if let Ok(text) = fs::read_to_string(p) {
            return Ok(Some((PathBuf::from(p), text)));
        }
    }
    Ok(None)
}

/// Parse the `[engine]` table on top of the defaults. Does not consult the environment.
pub fn parse_engine_config(text: &str) -> anyhow::Result<EngineConfig> {
    let root: RootConfigToml = toml::from_str(text)
        .map_err(|e| anyhow::anyhow!("Failed to parse engine config: {e}"))?;
    let mut cfg = EngineConfig::default();
    let Some(engine) = root.engine else {
        return Ok(cfg);
    };
    let EngineToml {
        ephemeris_path,
        natal_ttl_secs,
        transit_ttl_secs,
        default_location,
        house_system,
        cycle_orb,
        max_cycle_events,
        summary_aspects,
    } = engine;
    if ephemeris_path.is_some() {
        cfg.ephemeris_path = ephemeris_path;
    }
    if let Some(secs) = natal_ttl_secs {
        cfg.natal_ttl = Duration::from_secs(secs);
    }
    if let Some(secs) = transit_ttl_secs {
        cfg.transit_ttl = Duration::from_secs(secs);
    }
    if let Some(loc) = default_location {
        cfg.default_location = loc;
    }
    if let Some(hs) = house_system {
        cfg.house_system = hs;
    }
    if let Some(orb) = cycle_orb {
        cfg.cycle_orb = orb;
    }
    if let Some(n) = max_cycle_events {
        cfg.max_cycle_events = n;
    }
    if let Some(n) = summary_aspects {
        cfg.summary_aspects = n;
    }
    Ok(cfg)
}

/// Apply environment-style overrides. `lookup` is `std::env::var` in production.
pub fn apply_overrides<F>(cfg: &mut EngineConfig, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(EPHEMERIS_PATH_ENV) {
        let path = path.trim();
        cfg.ephemeris_path = if path.is_empty() {
            None
        } else {
            Some(PathBuf::from(path))
        };
    }
    if let Some(raw) = lookup(NATAL_TTL_ENV) {
        cfg.natal_ttl = parse_secs(NATAL_TTL_ENV, &raw)?;
    }
    if let Some(raw) = lookup(TRANSIT_TTL_ENV) {
        cfg.transit_ttl = parse_secs(TRANSIT_TTL_ENV, &raw)?;
    }
    Ok(())
}

fn parse_secs(var: &str, raw: &str) -> anyhow::Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("{var} must be a whole number of seconds, got {raw:?}: {e}"))?;
    Ok(Duration::from_secs(secs))
}

pub fn load_engine_config_from(path: &Path) -> anyhow::Result<EngineConfig> {
    let text = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let mut cfg = parse_engine_config(&text)?;
    apply_overrides(&mut cfg, |k| env::var(k).ok())?;
    cfg.validate()?;
    Ok(cfg)
}

/// Defaults, then the config file if one is found, then environment overrides.
pub fn load_engine_config() -> anyhow::Result<EngineConfig> {
    let mut cfg = match read_config_toml_text()? {
        Some((path, text)) => {
            log::info!("Loading engine config from {}", path.display());
            parse_engine_config(&text)?
        }
        None => {
            log::info!("No engine config file found, using defaults");
            EngineConfig::default()
        }
    };
    apply_overrides(&mut cfg, |k| env::var(k).ok())?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
        assert!(cfg.ephemeris_path.is_none());
        assert_eq!(cfg.house_system, "placidus");
    }

    #[test]
    fn test_parse_engine_table() {
        let text = r#"
            [engine]
            ephemeris_path = "/opt/ephe"
            natal_ttl_secs = 60
            transit_ttl_secs = 30
            house_system = "koch"

            [engine.default_location]
            lat = 31.23
            lon = 121.47
        "#;
        let cfg = parse_engine_config(text).unwrap();
        assert_eq!(cfg.ephemeris_path, Some(PathBuf::from("/opt/ephe")));
        assert_eq!(cfg.natal_ttl, Duration::from_secs(60));
        assert_eq!(cfg.transit_ttl, Duration::from_secs(30));
        assert_eq!(cfg.house_system, "koch");
        assert_eq!(cfg.default_location, ReferenceLocation { lat: 31.23, lon: 121.47 });
        // untouched fields keep defaults
        assert_eq!(cfg.summary_aspects, 5);
    }

    #[test]
    fn test_missing_engine_table_gives_defaults() {
        let cfg = parse_engine_config("").unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn test_env_overrides_win() {
        let mut cfg = parse_engine_config("[engine]\nnatal_ttl_secs = 60\n").unwrap();
        let env: HashMap<&str, &str> = HashMap::from([
            (NATAL_TTL_ENV, "120"),
            (EPHEMERIS_PATH_ENV, "/data/ephe"),
        ]);
        apply_overrides(&mut cfg, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.natal_ttl, Duration::from_secs(120));
        assert_eq!(cfg.ephemeris_path, Some(PathBuf::from("/data/ephe")));
    }

    #[test]
    fn test_blank_ephemeris_override_forces_fallback() {
        let mut cfg = EngineConfig {
            ephemeris_path: Some(PathBuf::from("/opt/ephe")),
            ..EngineConfig::default()
        };
        apply_overrides(&mut cfg, |k| (k == EPHEMERIS_PATH_ENV).then(|| " ".to_string())).unwrap();
        assert!(cfg.ephemeris_path.is_none());
    }

    #[test]
    fn test_bad_ttl_override_is_rejected() {
        let mut cfg = EngineConfig::default();
        let err = apply_overrides(&mut cfg, |k| (k == TRANSIT_TTL_ENV).then(|| "soon".to_string()));
        assert!(err.is_err());
    }

    #[test]
    fn test_zero_ttl_fails_validation() {
        let cfg = EngineConfig {
            natal_ttl: Duration::ZERO,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_unknown_house_system_fails_validation() {
        let cfg = EngineConfig {
            house_system: "topocentric-ish".to_string(),
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_house_system_code_lookup() {
        assert_eq!(house_system_code("Placidus"), Some(b'P'));
        assert_eq!(house_system_code("whole_sign"), Some(b'W'));
        assert_eq!(house_system_code("nope"), None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[engine]\ntransit_ttl_secs = 90\ncycle_orb = 2.5").unwrap();
        let text = fs::read_to_string(file.path()).unwrap();
        let cfg = parse_engine_config(&text).unwrap();
        assert_eq!(cfg.transit_ttl, Duration::from_secs(90));
        assert_eq!(cfg.cycle_orb, 2.5);
        assert!(cfg.validate().is_ok());
    }
}
