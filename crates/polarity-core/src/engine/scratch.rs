use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File names used inside the scratch directory.
pub mod files {
    pub const INPUT_SDF: &str = "molecule.sdf";
    pub const INITIAL_XYZ: &str = "initial.xyz";
    pub const PSI4_INPUT: &str = "input.dat";
    pub const PSI4_OUTPUT: &str = "output.dat";
    pub const XYZR: &str = "molecule.xyzr";
    pub const MESH_BASENAME: &str = "mesh";
    pub const MESH_VERTICES: &str = "mesh.vert";
    pub const MESH_FACES: &str = "mesh.face";
    pub const ESP_CUBE: &str = "ESP.cube";
    pub const DENSITY_CUBE: &str = "Dt.cube";
}

/// A working directory owned by one molecule run.
///
/// The directory is created if needed and emptied when acquired. Its contents are removed
/// again when the guard is dropped, on success and failure alike. The directory itself is
/// kept.
#[derive(Debug)]
pub struct ScratchSpace {
    path: PathBuf,
}

impl ScratchSpace {
    /// # Errors
    ///
    /// Returns the I/O error if the directory cannot be created or emptied.
    pub fn acquire(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        fs::create_dir_all(&path)?;
        clear_dir(&path)?;
        debug!(path = %path.display(), "Acquired scratch directory.");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for ScratchSpace {
    fn drop(&mut self) {
        match clear_dir(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Released scratch directory."),
            Err(e) => warn!(
                path = %self.path.display(),
                "Failed to empty scratch directory: {}", e
            ),
        }
    }
}

fn clear_dir(path: &Path) -> io::Result<()> {
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entries(path: &Path) -> usize {
        fs::read_dir(path).unwrap().count()
    }

    #[test]
    fn acquire_creates_missing_directory() {
        let root = tempdir().unwrap();
        let path = root.path().join("nested").join("scratch");
        let scratch = ScratchSpace::acquire(&path).unwrap();
        assert!(path.is_dir());
        assert_eq!(scratch.path(), path.as_path());
        assert_eq!(scratch.join("a.txt"), path.join("a.txt"));
    }

    #[test]
    fn acquire_empties_leftovers_from_a_previous_run() {
        let root = tempdir().unwrap();
        fs::write(root.path().join("stale.cube"), "old").unwrap();
        fs::create_dir(root.path().join("sub")).unwrap();
        fs::write(root.path().join("sub").join("x"), "old").unwrap();

        let _scratch = ScratchSpace::acquire(root.path()).unwrap();
        assert_eq!(entries(root.path()), 0);
    }

    #[test]
    fn drop_empties_the_directory_but_keeps_it() {
        let root = tempdir().unwrap();
        {
            let scratch = ScratchSpace::acquire(root.path()).unwrap();
            fs::write(scratch.join(files::ESP_CUBE), "data").unwrap();
            assert_eq!(entries(root.path()), 1);
        }
        assert!(root.path().is_dir());
        assert_eq!(entries(root.path()), 0);
    }

    #[test]
    fn directory_is_emptied_when_a_run_unwinds_with_an_error() {
        let root = tempdir().unwrap();
        let run = || -> io::Result<()> {
            let scratch = ScratchSpace::acquire(root.path())?;
            fs::write(scratch.join(files::XYZR), "partial")?;
            Err(io::Error::other("tool failed"))
        };
        assert!(run().is_err());
        assert_eq!(entries(root.path()), 0);
    }
}
