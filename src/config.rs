//! Configuration for consequence annotation.
//!
//! [`AnnotationConfig`] carries the tunable windows and limits used while
//! classifying a variant. It can be built in code or loaded from a
//! `.ferro.toml` file shared with the rest of the ferro tools.
//!
//! # Example Configuration
//!
//! ```toml
//! [annotation]
//! upstream_distance = 1000
//! splice_region_exon_range = 3
//! splice_region_intron_range = 8
//! realign_indels = true
//! max_protein_extension_codons = 1000
//! ```
//!
//! # Config File Locations
//!
//! Configuration is searched in this order (first found wins):
//! 1. `.ferro.toml` in current directory
//! 2. `~/.config/ferro/config.toml`

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Windows and limits used by the classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Bases 5' of a transcript still reported as upstream-gene variants
    pub upstream_distance: u64,
    /// Exonic bases either side of an internal exon boundary in the splice region
    pub splice_region_exon_range: u64,
    /// Intronic bases either side of an internal exon boundary in the splice region
    pub splice_region_intron_range: u64,
    /// Right-realign indels that arrive without a realigned representation
    pub realign_indels: bool,
    /// Codons scanned past the variant when extending a frameshift or a shifted
    /// in-frame indel
    pub max_protein_extension_codons: u64,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            upstream_distance: 1000,
            splice_region_exon_range: 3,
            splice_region_intron_range: 8,
            realign_indels: true,
            max_protein_extension_codons: 1000,
        }
    }
}

impl AnnotationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the upstream promoter distance
    pub fn with_upstream_distance(mut self, distance: u64) -> Self {
        self.upstream_distance = distance;
        self
    }

    /// Enable or disable indel right-realignment
    pub fn with_realign_indels(mut self, realign: bool) -> Self {
        self.realign_indels = realign;
        self
    }
}

/// Parsed configuration from a .ferro.toml file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FerroConfig {
    /// `[annotation]` section.
    pub annotation: AnnotationConfig,
}

impl FerroConfig {
    /// Load configuration from the default locations.
    ///
    /// Searches for config in:
    /// 1. `.ferro.toml` in current directory
    /// 2. `~/.config/ferro/config.toml`
    ///
    /// Unreadable or invalid files are skipped with a warning.
    pub fn load() -> Option<Self> {
        let mut candidates = vec![PathBuf::from(".ferro.toml")];
        if let Some(home) = dirs_home() {
            candidates.push(home.join(".config").join("ferro").join("config.toml"));
        }

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_path(path) {
                Ok(config) => {
                    log::debug!("loaded configuration from {}", path.display());
                    return Some(config);
                }
                Err(e) => log::warn!("ignoring {}: {}", path.display(), e),
            }
        }

        None
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML content.
    ///
    /// Only flat `key = value` lines are understood. Unknown sections and keys
    /// are ignored.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config = FerroConfig::default();
        let mut in_annotation = false;

        for raw in content.lines() {
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with('[') {
                if !line.ends_with(']') {
                    return Err(ConfigError::Parse(format!(
                        "unterminated section header: {}",
                        line
                    )));
                }
                in_annotation = &line[1..line.len() - 1] == "annotation";
                continue;
            }

            if !in_annotation {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::Parse(format!("expected key = value: {}", line)));
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');

            let annotation = &mut config.annotation;
            match key {
                "upstream_distance" => annotation.upstream_distance = parse_number(key, value)?,
                "splice_region_exon_range" => {
                    annotation.splice_region_exon_range = parse_number(key, value)?
                }
                "splice_region_intron_range" => {
                    annotation.splice_region_intron_range = parse_number(key, value)?
                }
                "max_protein_extension_codons" => {
                    annotation.max_protein_extension_codons = parse_number(key, value)?
                }
                "realign_indels" => annotation.realign_indels = parse_bool(key, value)?,
                _ => {}
            }
        }

        Ok(config)
    }
}

/// Configuration loading error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(String),
    /// Parse error in config file.
    Parse(String),
    /// A known key with a value of the wrong type.
    InvalidValue { key: String, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config IO error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {}: {}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(i) => &line[..i],
        None => line,
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .replace('_', "")
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Get the user's home directory.
fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
