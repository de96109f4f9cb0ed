use std::fmt;

/// The strictly sequential stages a molecule passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Prepare,
    ConvertGeometry,
    Optimize,
    BuildRadii,
    Mesh,
    SampleFields,
    Assemble,
    Cleanup,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::Prepare,
        Stage::ConvertGeometry,
        Stage::Optimize,
        Stage::BuildRadii,
        Stage::Mesh,
        Stage::SampleFields,
        Stage::Assemble,
        Stage::Cleanup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Prepare => "prepare",
            Stage::ConvertGeometry => "convert-geometry",
            Stage::Optimize => "optimize",
            Stage::BuildRadii => "build-radii",
            Stage::Mesh => "mesh",
            Stage::SampleFields => "sample-fields",
            Stage::Assemble => "assemble",
            Stage::Cleanup => "cleanup",
        }
    }

    /// 1-based position in the stage sequence.
    pub fn ordinal(&self) -> usize {
        Stage::ALL
            .iter()
            .position(|s| s == self)
            .map_or(0, |i| i + 1)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
