use std::{
    env,
    path::{Path, PathBuf},
};

/// Root of the cargo workspace, resolved from the compiling crate's manifest
/// directory. Only correct for crates that sit directly under the workspace
/// root.
pub fn workspace_dir() -> PathBuf {
    Path::new(&env::var("CARGO_MANIFEST_DIR").unwrap())
        .parent()
        .unwrap()
        .to_path_buf()
}
