//! `.env` loading
//!
//! Priority order (highest to lowest):
//! 1. Environment variables already set
//! 2. ./.env
//! 3. ~/.artifactctl/.env
//!
//! dotenvy never overwrites variables that are already set, so loading the
//! local file first gives it precedence over the global one.
//!
//! Loading happens before argument parsing, which is before tracing is set
//! up, so outcomes are returned and logged by the caller.

use std::path::{Path, PathBuf};

use artifactctl_core::config::config_dir;
use tracing::debug;

#[derive(Debug)]
pub enum DotenvLoad {
    Loaded(PathBuf),
    Failed(PathBuf, dotenvy::Error),
}

pub fn load_dotenv() -> Vec<DotenvLoad> {
    let mut candidates = vec![PathBuf::from(".env")];
    if let Some(dir) = config_dir() {
        candidates.push(dir.join(".env"));
    }
    load_files(&candidates)
}

fn load_files(candidates: &[PathBuf]) -> Vec<DotenvLoad> {
    candidates
        .iter()
        .filter(|path| path.is_file())
        .map(|path| load_file(path))
        .collect()
}

fn load_file(path: &Path) -> DotenvLoad {
    match dotenvy::from_path(path) {
        Ok(()) => DotenvLoad::Loaded(path.to_path_buf()),
        Err(e) => DotenvLoad::Failed(path.to_path_buf(), e),
    }
}

pub fn log_loads(loads: &[DotenvLoad]) {
    for load in loads {
        match load {
            DotenvLoad::Loaded(path) => debug!("Loaded .env from {}", path.display()),
            DotenvLoad::Failed(path, e) => debug!("Failed to load {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_existing_files_and_skips_missing_ones() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join(".env");
        fs::write(&env_file, "ARTIFACTCTL_ENV_TEST_LOADED=yes\n").unwrap();
        let missing = dir.path().join("missing.env");

        let loads = load_files(&[env_file.clone(), missing]);

        assert_eq!(loads.len(), 1);
        assert!(matches!(&loads[0], DotenvLoad::Loaded(path) if *path == env_file));
        assert_eq!(std::env::var("ARTIFACTCTL_ENV_TEST_LOADED").as_deref(), Ok("yes"));
    }

    #[test]
    fn earlier_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("local.env");
        let global = dir.path().join("global.env");
        fs::write(&local, "ARTIFACTCTL_ENV_TEST_ORDER=local\n").unwrap();
        fs::write(&global, "ARTIFACTCTL_ENV_TEST_ORDER=global\n").unwrap();

        load_files(&[local, global]);

        assert_eq!(std::env::var("ARTIFACTCTL_ENV_TEST_ORDER").as_deref(), Ok("local"));
    }
}
