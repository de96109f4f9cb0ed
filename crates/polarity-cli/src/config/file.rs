use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FilePathsConfig {
    #[serde(rename = "input-dir")]
    pub input_dir: Option<PathBuf>,
    #[serde(rename = "output-dir")]
    pub output_dir: Option<PathBuf>,
    #[serde(rename = "scratch-dir")]
    pub scratch_dir: Option<PathBuf>,
    #[serde(rename = "aggregate-file")]
    pub aggregate_file: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileToolCommand {
    pub program: Option<String>,
    #[serde(rename = "extra-args")]
    pub extra_args: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileToolsConfig {
    #[serde(rename = "geometry-converter")]
    pub geometry_converter: Option<FileToolCommand>,
    #[serde(rename = "quantum-chemistry")]
    pub quantum_chemistry: Option<FileToolCommand>,
    #[serde(rename = "surface-mesher")]
    pub surface_mesher: Option<FileToolCommand>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FilePsi4Config {
    pub method: Option<String>,
    pub basis: Option<String>,
    pub charge: Option<i32>,
    pub multiplicity: Option<u32>,
    pub memory: Option<String>,
    #[serde(rename = "grid-spacing")]
    pub grid_spacing: Option<f64>,
    #[serde(rename = "grid-overage")]
    pub grid_overage: Option<f64>,
    #[serde(rename = "optimized-xyz")]
    pub optimized_xyz: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileMeshConfig {
    #[serde(rename = "probe-radius")]
    pub probe_radius: Option<f64>,
    pub density: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub molecules: Option<Vec<String>>,
    #[serde(rename = "failure-policy")]
    pub failure_policy: Option<String>,
    pub paths: Option<FilePathsConfig>,
    pub tools: Option<FileToolsConfig>,
    pub psi4: Option<FilePsi4Config>,
    pub mesh: Option<FileMeshConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
