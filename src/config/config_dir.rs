use std::{fs::File, io::Read, path::Path, path::PathBuf};

use tracing::debug;

use super::error::{ConfigError, ConfigResult};

fn home_dir() -> Option<PathBuf> {
    #[cfg(unix)]
    let path = std::env::var_os("HOME");
    #[cfg(windows)]
    let path = std::env::var_os("APPDATA");
    #[cfg(not(any(unix, windows)))]
    let path: Option<std::ffi::OsString> = None;

    path.map(PathBuf::from)
}

pub fn find_config_file(use_local: bool) -> PathBuf {
    find_config_file_in(use_local, home_dir())
}

/// `./config.toml` unless a per-user config exists under `home`.
pub fn find_config_file_in(use_local: bool, home: Option<PathBuf>) -> PathBuf {
    let app_name = crate::APPLICATION_NAME;

    if use_local {
        return PathBuf::from("./config.toml");
    }

    if let Some(mut path) = home {
        if cfg!(unix) {
            path = path.join(".config");
        }

        path = path.join(app_name).join("config.toml");

        if path.exists() {
            return path;
        }
    }

    PathBuf::from("./config.toml")
}

pub fn read_config(use_local: bool) -> ConfigResult<Vec<u8>> {
    read_config_at(&find_config_file(use_local))
}

pub fn read_config_at(filename: &Path) -> ConfigResult<Vec<u8>> {
    tracing::trace!("looking for config at: {}", filename.display());
    if !filename.exists() {
        return Err(ConfigError::ConfigNotFound);
    }

    let filename = filename.canonicalize()?;
    debug!("using {} as configuration file", filename.display());

    let mut fd = File::open(filename)?;
    let mut buf = Vec::new();
    fd.read_to_end(&mut buf)?;

    Ok(buf)
}
