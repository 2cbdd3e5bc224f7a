//! Loading pipeline: reads data files, resolves resource names, builds the
//! catalog and queue configuration.
//!
//! A data directory holds:
//! - `resources.{ron,toml,json}` (required)
//! - `jobs.{ron,toml,json}` (required)
//! - `queue.{ron,toml,json}` (optional, `QueueConfig` defaults if absent)

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bastion_core::catalog::{Catalog, CatalogBuilder, CatalogError};
use bastion_core::config::{ConfigError, QueueConfig};
use bastion_core::cost::Cost;
use bastion_core::fixed::checked_f64_to_seconds;
use bastion_core::id::{JobKindId, ResourceId};
use serde::de::DeserializeOwned;

use crate::schema::{JobData, ResourceData};

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// The files parsed but describe an invalid catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("invalid queue config: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Look for `{base_name}.ron`, `.toml`, or `.json` in `dir`. More than one
/// match is a `ConflictingFormats` error.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, e: impl std::fmt::Display) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: e.to_string(),
    }
}

/// Read a file and deserialize it according to its extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list. TOML files hold the array under `toml_key`; RON and
/// JSON files are a bare list.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    match detect_format(path)? {
        Format::Ron | Format::Json => deserialize_file(path),
        Format::Toml => {
            let mut table: toml::Table = deserialize_file(path)?;
            let array = table
                .remove(toml_key)
                .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?;
            array
                .try_into()
                .map_err(|e: toml::de::Error| parse_error(path, e))
        }
    }
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

// ===========================================================================
// Pipeline
// ===========================================================================

/// Everything a host needs to construct a `QueueEngine`.
#[derive(Debug)]
pub struct GameData {
    pub catalog: Catalog,
    pub config: QueueConfig,
}

/// Load resources and jobs from `dir` into an immutable catalog.
pub fn load_catalog(dir: &Path) -> Result<Catalog, DataLoadError> {
    let mut builder = CatalogBuilder::new();

    let resources_path = require_data_file(dir, "resources")?;
    let resources: Vec<ResourceData> = deserialize_list(&resources_path, "resources")?;
    let mut resource_ids: HashMap<String, ResourceId> = HashMap::new();
    for resource in &resources {
        check_duplicate(&resource_ids, &resource.name, &resources_path)?;
        let id = builder.register_resource(&resource.name);
        resource_ids.insert(resource.name.clone(), id);
    }

    let jobs_path = require_data_file(dir, "jobs")?;
    let jobs: Vec<JobData> = deserialize_list(&jobs_path, "jobs")?;
    let mut job_ids: HashMap<String, JobKindId> = HashMap::new();
    for job in jobs {
        check_duplicate(&job_ids, &job.name, &jobs_path)?;
        let mut cost = Cost::new();
        for (resource, amount) in &job.cost {
            let id = resolve_name(&resource_ids, resource, &jobs_path, "resource")?;
            cost.add(*id, *amount);
        }
        let duration = checked_f64_to_seconds(job.duration).ok_or_else(|| {
            parse_error(
                &jobs_path,
                format!("job '{}' has out-of-range duration {}", job.name, job.duration),
            )
        })?;
        let kind = builder.register_job(
            &job.name,
            duration,
            cost,
            job.effect.into(),
        )?;
        job_ids.insert(job.name, kind);
    }

    let catalog = builder.build()?;
    tracing::info!(
        target: "bastion.data",
        dir = %dir.display(),
        resources = catalog.resource_count(),
        jobs = catalog.job_count(),
        "catalog loaded"
    );
    Ok(catalog)
}

/// Load `queue.*` from `dir`, or defaults if there is none.
pub fn load_config(dir: &Path) -> Result<QueueConfig, DataLoadError> {
    let config = match find_data_file(dir, "queue")? {
        Some(path) => {
            tracing::debug!(target: "bastion.data", file = %path.display(), "loading queue config");
            deserialize_file::<QueueConfig>(&path)?
        }
        None => {
            tracing::debug!(target: "bastion.data", dir = %dir.display(), "no queue config, using defaults");
            QueueConfig::default()
        }
    };
    config.validate()?;
    Ok(config)
}

pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    Ok(GameData {
        catalog: load_catalog(dir)?,
        config: load_config(dir)?,
    })
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::catalog::Effect;
    use bastion_core::config::OvershootPolicy;
    use bastion_core::fixed::secs;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "bastion_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    const RESOURCES_RON: &str = r#"[(name: "gold"), (name: "stone")]"#;

    const JOBS_RON: &str = r#"[
        (name: "infantry", duration: 10.0, cost: {"gold": 50, "stone": 20}, effect: Train(unit: "infantry")),
        (name: "wall_upgrade", duration: 300.0, cost: {"stone": 200}, effect: Upgrade(building: "wall")),
    ]"#;

    // -----------------------------------------------------------------------
    // detect_format / find_data_file
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("jobs.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("jobs.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("jobs.json")).unwrap(), Format::Json);
        assert!(matches!(
            detect_format(Path::new("jobs.yaml")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            detect_format(Path::new("jobs")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn find_data_file_conflict() {
        let dir = make_test_dir("find_conflict");
        fs::write(dir.join("jobs.ron"), "[]").unwrap();
        fs::write(dir.join("jobs.json"), "[]").unwrap();

        let result = find_data_file(&dir, "jobs");
        assert!(matches!(
            result,
            Err(DataLoadError::ConflictingFormats { .. })
        ));

        cleanup(&dir);
    }

    #[test]
    fn require_data_file_missing() {
        let dir = make_test_dir("require_missing");

        let result = require_data_file(&dir, "jobs");
        assert!(matches!(
            result,
            Err(DataLoadError::MissingRequired { ref file, .. }) if file == "jobs"
        ));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // load_catalog
    // -----------------------------------------------------------------------

    #[test]
    fn load_catalog_ron() {
        let dir = make_test_dir("catalog_ron");
        fs::write(dir.join("resources.ron"), RESOURCES_RON).unwrap();
        fs::write(dir.join("jobs.ron"), JOBS_RON).unwrap();

        let catalog = load_catalog(&dir).unwrap();
        assert_eq!(catalog.resource_count(), 2);
        assert_eq!(catalog.job_count(), 2);

        let gold = catalog.resource_id("gold").unwrap();
        let infantry = catalog.get_job(catalog.job_id("infantry").unwrap()).unwrap();
        assert_eq!(infantry.duration, secs(10));
        assert_eq!(infantry.cost.get(gold), 50);

        let wall = catalog.get_job(catalog.job_id("wall_upgrade").unwrap()).unwrap();
        assert!(wall.effect.is_upgrade());

        cleanup(&dir);
    }

    #[test]
    fn load_catalog_toml() {
        let dir = make_test_dir("catalog_toml");
        fs::write(
            dir.join("resources.toml"),
            r#"
[[resources]]
name = "gold"
"#,
        )
        .unwrap();
        fs::write(
            dir.join("jobs.toml"),
            r#"
[[jobs]]
name = "archer"
duration = 12
cost = { gold = 75 }
effect = { Train = { unit = "archer", count = 2 } }
"#,
        )
        .unwrap();

        let catalog = load_catalog(&dir).unwrap();
        let archer = catalog.get_job(catalog.job_id("archer").unwrap()).unwrap();
        assert_eq!(
            archer.effect,
            Effect::Train {
                unit: "archer".into(),
                count: 2
            }
        );

        cleanup(&dir);
    }

    #[test]
    fn load_catalog_unresolved_resource() {
        let dir = make_test_dir("catalog_unresolved");
        fs::write(dir.join("resources.json"), r#"[{"name": "gold"}]"#).unwrap();
        fs::write(
            dir.join("jobs.json"),
            r#"[{"name": "knight", "duration": 20, "cost": {"iron": 5}, "effect": {"Train": {"unit": "knight"}}}]"#,
        )
        .unwrap();

        let result = load_catalog(&dir);
        assert!(matches!(
            result,
            Err(DataLoadError::UnresolvedRef { ref name, .. }) if name == "iron"
        ));

        cleanup(&dir);
    }

    #[test]
    fn load_catalog_duplicate_job() {
        let dir = make_test_dir("catalog_duplicate");
        fs::write(dir.join("resources.ron"), RESOURCES_RON).unwrap();
        fs::write(
            dir.join("jobs.ron"),
            r#"[
                (name: "scout", duration: 5.0, effect: Custom("reveal")),
                (name: "scout", duration: 6.0, effect: Custom("reveal")),
            ]"#,
        )
        .unwrap();

        let result = load_catalog(&dir);
        assert!(matches!(result, Err(DataLoadError::DuplicateName { .. })));

        cleanup(&dir);
    }

    #[test]
    fn load_catalog_zero_duration() {
        let dir = make_test_dir("catalog_zero_duration");
        fs::write(dir.join("resources.ron"), RESOURCES_RON).unwrap();
        fs::write(
            dir.join("jobs.ron"),
            r#"[(name: "instant", duration: 0.0, effect: Custom("noop"))]"#,
        )
        .unwrap();

        let result = load_catalog(&dir);
        assert!(matches!(
            result,
            Err(DataLoadError::Catalog(CatalogError::NonPositiveDuration(_)))
        ));

        cleanup(&dir);
    }

    #[test]
    fn load_catalog_out_of_range_duration() {
        let dir = make_test_dir("catalog_huge_duration");
        fs::write(dir.join("resources.ron"), RESOURCES_RON).unwrap();
        fs::write(
            dir.join("jobs.ron"),
            r#"[(name: "wonder", duration: 1e12, effect: Custom("win"))]"#,
        )
        .unwrap();

        let result = load_catalog(&dir);
        assert!(matches!(
            result,
            Err(DataLoadError::Parse { ref detail, .. }) if detail.contains("wonder")
        ));

        cleanup(&dir);
    }

    #[test]
    fn load_catalog_parse_error() {
        let dir = make_test_dir("catalog_parse");
        fs::write(dir.join("resources.ron"), "[(name: ").unwrap();

        let result = load_catalog(&dir);
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // load_config / load_game_data
    // -----------------------------------------------------------------------

    #[test]
    fn load_config_defaults_when_absent() {
        let dir = make_test_dir("config_absent");
        assert_eq!(load_config(&dir).unwrap(), QueueConfig::default());
        cleanup(&dir);
    }

    #[test]
    fn load_config_partial_toml() {
        let dir = make_test_dir("config_toml");
        fs::write(
            dir.join("queue.toml"),
            "slot_count = 2\nslot_policy = \"idle_only\"\novershoot = \"cascade\"\n",
        )
        .unwrap();

        let config = load_config(&dir).unwrap();
        assert_eq!(config.slot_count, 2);
        assert_eq!(config.overshoot, OvershootPolicy::Cascade);
        assert_eq!(config.max_queue_size, 20);

        cleanup(&dir);
    }

    #[test]
    fn load_config_rejects_invalid() {
        let dir = make_test_dir("config_invalid");
        fs::write(dir.join("queue.json"), r#"{"refund_percent": 150}"#).unwrap();

        let result = load_config(&dir);
        assert!(matches!(
            result,
            Err(DataLoadError::Config(ConfigError::RefundOutOfRange(150)))
        ));

        cleanup(&dir);
    }

    #[test]
    fn load_game_data_ron() {
        let dir = make_test_dir("game_data");
        fs::write(dir.join("resources.ron"), RESOURCES_RON).unwrap();
        fs::write(dir.join("jobs.ron"), JOBS_RON).unwrap();
        fs::write(dir.join("queue.ron"), "(max_queue_size: 5)").unwrap();

        let data = load_game_data(&dir).unwrap();
        assert_eq!(data.catalog.job_count(), 2);
        assert_eq!(data.config.max_queue_size, 5);

        cleanup(&dir);
    }
}
