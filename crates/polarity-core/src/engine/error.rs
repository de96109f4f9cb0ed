use thiserror::Error;

use super::config::ConfigError;
use super::stage::Stage;
use super::tools::ToolError;
use crate::core::io::error::{ParseError, ReadError, WriteError};
use crate::core::physics::dipoles::DipoleError;
use crate::core::physics::radii::UnknownElementError;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error on '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("External tool failed: {0}")]
    Tool(#[from] ToolError),

    #[error("Bond dipole calculation failed: {0}")]
    Dipole(#[from] DipoleError),

    #[error(transparent)]
    UnknownElement(#[from] UnknownElementError),

    #[error("Mesh face {face} {indices:?} references a vertex beyond the {vertices} parsed vertices")]
    DanglingFace {
        face: usize,
        indices: [usize; 3],
        vertices: usize,
    },

    #[error(
        "{field} sample at mesh vertex {vertex} ({x:.4}, {y:.4}, {z:.4} Angstrom) lies outside the cube grid",
        x = position[0], y = position[1], z = position[2]
    )]
    SampleOutsideGrid {
        field: &'static str,
        vertex: usize,
        position: [f64; 3],
    },

    #[error("Molecule '{molecule}' failed during stage '{stage}': {source}")]
    Molecule {
        molecule: String,
        stage: Stage,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wraps an error with the molecule and stage it occurred in.
    pub fn in_stage(self, molecule: &str, stage: Stage) -> Self {
        Self::Molecule {
            molecule: molecule.to_string(),
            stage,
            source: Box::new(self),
        }
    }

    /// The stage a molecule-level error occurred in, if known.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Molecule { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
