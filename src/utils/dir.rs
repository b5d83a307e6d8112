use std::{env, io, path::PathBuf};

use anyhow::{anyhow, Result};

/// Environment variable that overrides the default notes location.
pub const RIVER_HOME_VAR: &str = "RIVER_HOME";

/// Resolves the default notes directory: `$RIVER_HOME`, otherwise `$HOME/river/notes`
/// (`%USERPROFILE%` on Windows). The directory is created if needed.
///
/// This is the only place river consults the environment for paths. Everything downstream
/// receives the resolved directory through [RiverConfig](crate::config::RiverConfig).
pub fn create_notes_default_path() -> Result<PathBuf> {
    let path = match env::var(RIVER_HOME_VAR) {
        Ok(v) if !v.is_empty() => PathBuf::from(v),
        _ => {
            #[cfg(windows)]
            let home = env::var("USERPROFILE");
            #[cfg(not(windows))]
            let home = env::var("HOME");

            let mut path = home
                .map(PathBuf::from)
                .map_err(|_| anyhow!("Couldn't find neither {RIVER_HOME_VAR} nor HOME"))?;
            path.push("river");
            path.push("notes");
            path
        }
    };

    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}
