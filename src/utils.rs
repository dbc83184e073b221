use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filtration::{Filtration, Vertex};

/// Whether to compute absolute cohomology, or cohomology relative to the base of the cone on the
/// filtration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Absolute,
    Relative,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid mode {0:?}, expected \"absolute\" or \"relative\"")]
pub struct ParseModeError(String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "absolute" => Ok(Self::Absolute),
            "relative" => Ok(Self::Relative),
            _ => Err(ParseModeError(s.to_owned())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Absolute => write!(f, "absolute"),
            Self::Relative => write!(f, "relative"),
        }
    }
}

/// Options for a barcode computation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The exponent of the Steenrod square.
    pub k: usize,
    pub mode: Mode,
    /// Also report bars in units of filtration values. The filtration must carry values.
    pub return_filtration_values: bool,
    /// Log per stage summaries at `info` rather than `debug` level.
    pub verbose: bool,
    /// Abort the computation after this many milliseconds.
    pub timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            k: 1,
            mode: Mode::Absolute,
            return_filtration_values: false,
            verbose: false,
            timeout_ms: None,
        }
    }
}

impl Config {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Self::default()
        }
    }

    pub fn absolute(&self) -> bool {
        self.mode == Mode::Absolute
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }
}

/// The JSON description of a filtration, e.g.
/// `{"simplices": [[0], [1], [0, 1]], "values": [0.0, 0.0, 1.0]}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FiltrationSpec {
    pub simplices: Vec<Vec<Vertex>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f64>>,
}

impl FiltrationSpec {
    pub fn build(self) -> Result<Filtration> {
        Filtration::from_parts(self.simplices, self.values)
    }
}

pub fn parse_filtration_json(json: &str) -> anyhow::Result<Filtration> {
    let spec: FiltrationSpec = serde_json::from_str(json).context("Invalid filtration json")?;
    Ok(spec.build()?)
}

pub fn load_filtration_json(path: impl AsRef<Path>) -> anyhow::Result<Filtration> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read filtration {}", path.display()))?;
    parse_filtration_json(&contents).with_context(|| format!("Loading {}", path.display()))
}

/// Install a `tracing` subscriber printing to stderr. The level is read from `RUST_LOG` and
/// defaults to `info` when `verbose` is set and `warn` otherwise.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}
