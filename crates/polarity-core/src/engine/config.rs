use crate::core::io::psi4::Psi4Job;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// What the batch runner does after a molecule fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the batch at the first failure; no aggregate is written.
    #[default]
    Halt,
    /// Record the failure and move on; the aggregate holds the successes.
    Continue,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::Halt => "halt",
            FailurePolicy::Continue => "continue",
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "halt" => Ok(FailurePolicy::Halt),
            "continue" => Ok(FailurePolicy::Continue),
            other => Err(ConfigError::InvalidParameter {
                name: "failure-policy",
                reason: format!("expected 'halt' or 'continue', got '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathsConfig {
    /// Directory holding `<name>.sdf` inputs.
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub scratch_dir: PathBuf,
    /// File name of the aggregate dataset inside `output_dir`.
    pub aggregate_file: String,
}

/// An external program plus extra arguments placed before the pipeline's own arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub extra_args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolsConfig {
    pub geometry_converter: ToolCommand,
    pub quantum_chemistry: ToolCommand,
    pub surface_mesher: ToolCommand,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            geometry_converter: ToolCommand::new("obabel"),
            quantum_chemistry: ToolCommand::new("psi4"),
            surface_mesher: ToolCommand::new("msms"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshConfig {
    /// Solvent probe radius (Å).
    pub probe_radius: f64,
    /// Surface vertex density (vertices per Å²).
    pub density: f64,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            probe_radius: 1.4,
            density: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub tools: ToolsConfig,
    pub psi4: Psi4Job,
    pub mesh: MeshConfig,
    pub molecules: Vec<String>,
    pub failure_policy: FailurePolicy,
}

pub const DEFAULT_AGGREGATE_FILE: &str = "molecule-data.json";

#[derive(Default)]
pub struct PipelineConfigBuilder {
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    scratch_dir: Option<PathBuf>,
    aggregate_file: Option<String>,
    tools: Option<ToolsConfig>,
    psi4: Option<Psi4Job>,
    mesh: Option<MeshConfig>,
    molecules: Option<Vec<String>>,
    failure_policy: Option<FailurePolicy>,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_dir(mut self, path: PathBuf) -> Self {
        self.input_dir = Some(path);
        self
    }
    pub fn output_dir(mut self, path: PathBuf) -> Self {
        self.output_dir = Some(path);
        self
    }
    pub fn scratch_dir(mut self, path: PathBuf) -> Self {
        self.scratch_dir = Some(path);
        self
    }
    pub fn aggregate_file(mut self, name: impl Into<String>) -> Self {
        self.aggregate_file = Some(name.into());
        self
    }
    pub fn tools(mut self, tools: ToolsConfig) -> Self {
        self.tools = Some(tools);
        self
    }
    pub fn psi4(mut self, job: Psi4Job) -> Self {
        self.psi4 = Some(job);
        self
    }
    pub fn mesh(mut self, mesh: MeshConfig) -> Self {
        self.mesh = Some(mesh);
        self
    }
    pub fn molecules<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.molecules = Some(names.into_iter().map(Into::into).collect());
        self
    }
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = Some(policy);
        self
    }

    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let paths = PathsConfig {
            input_dir: self
                .input_dir
                .ok_or(ConfigError::MissingParameter("input_dir"))?,
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output_dir"))?,
            scratch_dir: self
                .scratch_dir
                .ok_or(ConfigError::MissingParameter("scratch_dir"))?,
            aggregate_file: self
                .aggregate_file
                .unwrap_or_else(|| DEFAULT_AGGREGATE_FILE.to_string()),
        };
        let config = PipelineConfig {
            paths,
            tools: self.tools.unwrap_or_default(),
            psi4: self.psi4.unwrap_or_default(),
            mesh: self.mesh.unwrap_or_default(),
            molecules: self
                .molecules
                .ok_or(ConfigError::MissingParameter("molecules"))?,
            failure_policy: self.failure_policy.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |name: &'static str, reason: String| ConfigError::InvalidParameter { name, reason };

        let scratch = lexical_absolute(&self.paths.scratch_dir);
        for (role, dir) in [
            ("input", &self.paths.input_dir),
            ("output", &self.paths.output_dir),
        ] {
            if lexical_absolute(dir).starts_with(&scratch) {
                return Err(invalid(
                    "paths.scratch_dir",
                    format!(
                        "'{}' is emptied for every molecule and must not be or contain the {} directory '{}'",
                        self.paths.scratch_dir.display(),
                        role,
                        dir.display()
                    ),
                ));
            }
        }
        if self.paths.aggregate_file.trim().is_empty() {
            return Err(invalid("aggregate_file", "must not be empty".into()));
        }
        for (name, tool) in [
            ("tools.geometry_converter", &self.tools.geometry_converter),
            ("tools.quantum_chemistry", &self.tools.quantum_chemistry),
            ("tools.surface_mesher", &self.tools.surface_mesher),
        ] {
            if tool.program.trim().is_empty() {
                return Err(invalid(name, "program must not be empty".into()));
            }
        }
        for (name, value) in [
            ("psi4.grid_spacing", self.psi4.grid_spacing),
            ("mesh.probe_radius", self.mesh.probe_radius),
            ("mesh.density", self.mesh.density),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(name, format!("must be a positive number, got {}", value)));
            }
        }
        if !(self.psi4.grid_overage.is_finite() && self.psi4.grid_overage >= 0.0) {
            return Err(invalid(
                "psi4.grid_overage",
                format!("must be non-negative, got {}", self.psi4.grid_overage),
            ));
        }
        if self.psi4.multiplicity == 0 {
            return Err(invalid("psi4.multiplicity", "must be at least 1".into()));
        }
        if self.molecules.is_empty() {
            return Err(invalid("molecules", "the worklist is empty".into()));
        }
        for (i, name) in self.molecules.iter().enumerate() {
            if name.trim().is_empty() || name.contains(['/', '\\']) {
                return Err(invalid("molecules", format!("'{}' is not a usable molecule name", name)));
            }
            if self.molecules[..i].contains(name) {
                return Err(invalid("molecules", format!("'{}' is listed twice", name)));
            }
        }
        Ok(())
    }
}

/// Resolves `path` against the working directory and folds `.` and `..` lexically. The
/// path need not exist.
fn lexical_absolute(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
