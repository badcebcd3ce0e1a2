use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::GenericError;

const DEFAULT_PARAMS: &str = "inp-params.txt";
const DEFAULT_OUTPUT: &str = "out.txt";

/// The snapshot algorithm exercised by a simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Algorithm {
    ObstructionFree,
    #[default]
    WaitFree,
}

impl FromStr for Algorithm {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "obstruction-free" | "ofs" => Ok(Self::ObstructionFree),
            "wait-free" | "wfs" => Ok(Self::WaitFree),
            other => Err(ParamsError::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ObstructionFree => write!(f, "obstruction-free"),
            Self::WaitFree => write!(f, "wait-free"),
        }
    }
}

/// Parameters of a simulated workload.
///
/// Sleep times are exponentially distributed, with `lambda_w` and
/// `lambda_s` as their rates per millisecond.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Params {
    /// Number of writer threads.
    pub nw: usize,
    /// Number of snapshot threads.
    pub ns: usize,
    /// Number of locations in the snapshot object.
    #[serde(rename = "M")]
    pub m: usize,
    pub lambda_w: f64,
    pub lambda_s: f64,
    /// Number of snapshots taken by each snapshot thread.
    pub k: usize,
}

impl Params {
    /// Loads parameters from a file, as JSON if its extension is `json` and
    /// as whitespace-separated values otherwise.
    pub fn load(path: &Path) -> Result<Self, GenericError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("could not read parameters from {}: {e}", path.display()))?;
        let params = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str::<Params>(&contents)?.validate()?,
            _ => contents.parse::<Params>()?,
        };
        Ok(params)
    }

    fn validate(self) -> Result<Self, ParamsError> {
        if self.m == 0 {
            return Err(ParamsError::Invalid("M must be positive"));
        }
        if !(self.lambda_w > 0.0 && self.lambda_s > 0.0) {
            return Err(ParamsError::Invalid("sleep rates must be positive"));
        }
        Ok(self)
    }
}

impl FromStr for Params {
    type Err = ParamsError;

    /// Parses `nw ns M lambda_w lambda_s k`, separated by any whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split_whitespace();
        let mut next = |name: &'static str| fields.next().ok_or(ParamsError::Missing(name));

        fn parse<T: FromStr>(name: &'static str, field: &str) -> Result<T, ParamsError> {
            field.parse().map_err(|_| ParamsError::Malformed {
                name,
                field: field.to_string(),
            })
        }

        let params = Params {
            nw: parse("nw", next("nw")?)?,
            ns: parse("ns", next("ns")?)?,
            m: parse("M", next("M")?)?,
            lambda_w: parse("lambda_w", next("lambda_w")?)?,
            lambda_s: parse("lambda_s", next("lambda_s")?)?,
            k: parse("k", next("k")?)?,
        };
        params.validate()
    }
}

/// An error from reading simulation parameters.
#[derive(Debug, PartialEq)]
pub enum ParamsError {
    Missing(&'static str),
    Malformed { name: &'static str, field: String },
    Invalid(&'static str),
    UnknownAlgorithm(String),
}

impl fmt::Display for ParamsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "missing parameter {name}"),
            Self::Malformed { name, field } => {
                write!(f, "could not parse {field:?} as parameter {name}")
            }
            Self::Invalid(reason) => write!(f, "invalid parameters: {reason}"),
            Self::UnknownAlgorithm(name) => write!(
                f,
                "unknown algorithm {name:?}, expected wait-free or obstruction-free"
            ),
        }
    }
}

impl Error for ParamsError {}

/// Where a simulation reads its parameters from and writes its log to.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub algorithm: Algorithm,
    pub params: PathBuf,
    pub output: PathBuf,
}

impl Config {
    /// Reads the configuration from `MRMW_ALGORITHM`, `MRMW_PARAMS` and
    /// `MRMW_OUTPUT`.
    pub fn from_env() -> Result<Self, ParamsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ParamsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let algorithm = match lookup("MRMW_ALGORITHM") {
            Some(name) => name.parse()?,
            None => Algorithm::default(),
        };
        Ok(Self {
            algorithm,
            params: lookup("MRMW_PARAMS")
                .unwrap_or_else(|| DEFAULT_PARAMS.to_string())
                .into(),
            output: lookup("MRMW_OUTPUT")
                .unwrap_or_else(|| DEFAULT_OUTPUT.to_string())
                .into(),
        })
    }
}
