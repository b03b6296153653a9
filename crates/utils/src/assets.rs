use std::path::PathBuf;

use directories::ProjectDirs;

const PROJECT_ROOT: &str = env!("CARGO_MANIFEST_DIR");

/// Directory holding the database and log files.
///
/// Debug builds keep everything under `dev_assets/` at the workspace root so
/// a development database never collides with an installed one.
pub fn asset_dir() -> PathBuf {
    let path = if cfg!(debug_assertions) {
        PathBuf::from(PROJECT_ROOT).join("../../dev_assets")
    } else {
        ProjectDirs::from("dev", "brainmint", "brainmint")
            .expect("OS didn't give us a home directory")
            .data_dir()
            .to_path_buf()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).expect("Failed to create asset directory");
    }

    path
}

/// Database file path, overridable via `BRAINMINT_DATABASE_PATH`.
pub fn database_path() -> PathBuf {
    if let Ok(path) = std::env::var("BRAINMINT_DATABASE_PATH") {
        return PathBuf::from(path);
    }
    asset_dir().join("db.sqlite")
}

/// Log directory, overridable via `BRAINMINT_LOG_DIR`.
pub fn log_dir() -> PathBuf {
    if let Ok(path) = std::env::var("BRAINMINT_LOG_DIR") {
        return PathBuf::from(path);
    }
    asset_dir().join("logs")
}
