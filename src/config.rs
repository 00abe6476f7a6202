use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, ValueKind};

use crate::error::ExportResult;
use crate::parallel_call::ConcurrencyLimit;

/// Fallback when no usable concurrency override is configured
pub const DEFAULT_CONCURRENCY: usize = 10;
const DEFAULT_LIMIT: NonZeroUsize = match NonZeroUsize::new(DEFAULT_CONCURRENCY) {
    Some(limit) => limit,
    None => panic!("default concurrency must be positive"),
};
/// Upper bound applied to any configured concurrency override
pub const MAX_CONCURRENCY: usize = 100;
pub const DEFAULT_LOCALE: &str = "en";
/// Series directory whose sets are exported, relative to the repository root
pub const DEFAULT_DATA_SUBDIR: &str = "data/Pokemon TCG Pocket";
pub const DEFAULT_FILE_EXTENSION: &str = "json";
pub const DEFAULT_REPO_PATH: &str = "cards-database";
pub const DEFAULT_OUTPUT_DIR: &str = "generated";

pub const CONFIG_FILE_NAME: &str = "cardset-export.toml";
pub const ENV_PREFIX: &str = "CARDSET_EXPORT";

/// A concurrency override as it arrives from configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawLimit<'a> {
    Text(&'a str),
    Number(f64),
}

impl<'a> RawLimit<'a> {
    /// Interpret a configuration value; tables, arrays and booleans are not limits
    pub fn from_value_kind(kind: &'a ValueKind) -> Option<Self> {
        match kind {
            ValueKind::String(s) => Some(Self::Text(s)),
            ValueKind::I64(n) => Some(Self::Number(*n as f64)),
            ValueKind::I128(n) => Some(Self::Number(*n as f64)),
            ValueKind::U64(n) => Some(Self::Number(*n as f64)),
            ValueKind::U128(n) => Some(Self::Number(*n as f64)),
            ValueKind::Float(n) => Some(Self::Number(*n)),
            _ => None,
        }
    }
}

/// Leading base-10 integer of `text`, ignoring surrounding whitespace and any trailing junk
fn parse_leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return None;
    }
    // Overlong digit runs saturate so they still clamp to the cap
    Some(sign * digits.parse::<i64>().unwrap_or(i64::MAX))
}

/// Resolve a raw concurrency override into a usable positive limit.
///
/// Unparseable, non-finite and non-positive values fall back to `default`;
/// values above `max` are clamped to `max`. Never fails.
pub fn resolve_concurrency(raw: Option<RawLimit<'_>>, default: usize, max: usize) -> usize {
    let candidate = match raw {
        None => None,
        Some(RawLimit::Text(text)) => parse_leading_integer(text).map(|n| n as f64),
        Some(RawLimit::Number(n)) => Some(n),
    };

    match candidate {
        Some(n) if n.is_finite() && n >= 1.0 => {
            let n = n.floor();
            if n > max as f64 {
                max
            } else {
                n as usize
            }
        }
        _ => default,
    }
}

/// Runtime configuration for one export run
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Host project directory; the source repository must live inside it
    pub project_dir: PathBuf,
    /// Unvalidated source repository reference, resolved by `RepositoryRoot::resolve`
    pub repo_path: String,
    pub output_dir: PathBuf,
    pub concurrency: ConcurrencyLimit,
    pub default_locale: String,
    pub data_subdir: String,
    pub file_extension: String,
}

impl ExportConfig {
    /// Defaults for everything but the two directories
    pub fn new(project_dir: impl Into<PathBuf>, repo_path: impl Into<String>) -> Self {
        let project_dir = project_dir.into();
        Self {
            output_dir: project_dir.join(DEFAULT_OUTPUT_DIR),
            project_dir,
            repo_path: repo_path.into(),
            concurrency: ConcurrencyLimit::from_nonzero(DEFAULT_LIMIT),
            default_locale: DEFAULT_LOCALE.to_string(),
            data_subdir: DEFAULT_DATA_SUBDIR.to_string(),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
        }
    }

    /// Layer `cardset-export.toml` (optional) and `CARDSET_EXPORT_*` variables
    pub fn load(project_dir: impl Into<PathBuf>) -> ExportResult<Self> {
        let project_dir = project_dir.into();
        let settings = Config::builder()
            .add_source(File::from(project_dir.join(CONFIG_FILE_NAME)).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;
        Self::from_settings(project_dir, &settings)
    }

    pub fn from_settings(project_dir: PathBuf, settings: &Config) -> ExportResult<Self> {
        let mut config = Self::new(
            project_dir,
            optional_string(settings, "repo_path")?.unwrap_or_else(|| DEFAULT_REPO_PATH.to_string()),
        );

        if let Some(output_dir) = optional_string(settings, "output_dir")? {
            config.output_dir = resolve_against(&config.project_dir, &output_dir);
        }

        let raw_concurrency = match settings.get::<config::Value>("concurrency") {
            Ok(value) => Some(value),
            Err(ConfigError::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        };
        let resolved = resolve_concurrency(
            raw_concurrency
                .as_ref()
                .and_then(|value| RawLimit::from_value_kind(&value.kind)),
            DEFAULT_CONCURRENCY,
            MAX_CONCURRENCY,
        );
        config.concurrency = ConcurrencyLimit::new(resolved)?;

        if let Some(locale) = optional_string(settings, "default_locale")? {
            config.default_locale = locale;
        }
        if let Some(subdir) = optional_string(settings, "data_subdir")? {
            config.data_subdir = subdir;
        }
        if let Some(extension) = optional_string(settings, "file_extension")? {
            config.file_extension = extension.trim_start_matches('.').to_string();
        }

        log::debug!("Loaded export configuration: {:?}", config);
        Ok(config)
    }
}

fn optional_string(settings: &Config, key: &str) -> ExportResult<Option<String>> {
    match settings.get_string(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn resolve_against(base: &Path, value: &str) -> PathBuf {
    let path = Path::new(value);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
