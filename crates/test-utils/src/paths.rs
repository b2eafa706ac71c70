//! Locating test data files and scratch directories.

use std::path::PathBuf;

/// Workspace root, two levels above this crate's manifest.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// `crates/{crate_name}/testdata/`
pub fn crate_testdata_dir(crate_name: &str) -> PathBuf {
    workspace_root().join("crates").join(crate_name).join("testdata")
}

/// `services/{service_name}/testdata/`
pub fn service_testdata_dir(service_name: &str) -> PathBuf {
    workspace_root().join("services").join(service_name).join("testdata")
}

/// Search for a test file.
///
/// Locations, in order:
/// 1. `$TEST_DATA_DIR`
/// 2. `crates/netcdf-io/testdata/`
/// 3. `crates/bufr/testdata/`
/// 4. `services/obs-diag/testdata/`
/// 5. `testdata/` at the workspace root
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(dir) = std::env::var("TEST_DATA_DIR") {
        candidates.push(PathBuf::from(dir).join(name));
    }
    let root = workspace_root();
    candidates.extend([
        crate_testdata_dir("netcdf-io").join(name),
        crate_testdata_dir("bufr").join(name),
        service_testdata_dir("obs-diag").join(name),
        root.join("testdata").join(name),
    ]);
    candidates.into_iter().find(|p| p.exists())
}

/// Scratch directory removed on drop.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

pub fn temp_test_dir_with_prefix(prefix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create temporary test directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_is_valid() {
        let root = workspace_root();
        assert!(root.join("Cargo.toml").exists(), "no Cargo.toml under {:?}", root);
    }

    #[test]
    fn test_testdata_dirs() {
        let dir = crate_testdata_dir("netcdf-io");
        assert!(dir.ends_with("crates/netcdf-io/testdata"));
        assert!(service_testdata_dir("obs-diag").ends_with("services/obs-diag/testdata"));
    }

    #[test]
    fn test_missing_file() {
        assert!(find_test_file("definitely_not_here.nc4").is_none());
    }

    #[test]
    fn test_temp_dir_prefix() {
        let dir = temp_test_dir_with_prefix("emcpy_test_");
        assert!(dir.path().to_string_lossy().contains("emcpy_test_"));
    }
}
