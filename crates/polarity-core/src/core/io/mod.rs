//! Readers and writers for every text format the pipeline touches.
//!
//! All parsers are pure functions over `&str`. The [`traits::TextFormat`] trait adds the
//! path-based conveniences used by the workflows, wrapping failures with the offending path.

pub mod cube;
pub mod error;
pub mod json;
pub mod msms;
pub mod psi4;
pub mod sdf;
pub mod traits;
pub mod xyz;

use std::fmt;

/// The file formats understood by this module, used to label parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Xyz,
    Sdf,
    Psi4Output,
    Cube,
    MsmsVertices,
    MsmsFaces,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Xyz => "XYZ",
            Self::Sdf => "SDF",
            Self::Psi4Output => "Psi4 output",
            Self::Cube => "Gaussian cube",
            Self::MsmsVertices => "MSMS vertex",
            Self::MsmsFaces => "MSMS face",
        };
        f.write_str(name)
    }
}
