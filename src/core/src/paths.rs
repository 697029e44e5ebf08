use std::path::PathBuf;

use directories::BaseDirs;

fn env_home_dir() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os("HOME") {
        if !home.is_empty() {
            return Some(PathBuf::from(home));
        }
    }
    if let Some(profile) = std::env::var_os("USERPROFILE") {
        if !profile.is_empty() {
            return Some(PathBuf::from(profile));
        }
    }
    None
}

pub fn user_home_dir() -> Option<PathBuf> {
    if let Some(base) = BaseDirs::new() {
        return Some(base.home_dir().to_path_buf());
    }
    env_home_dir()
}

/// `~/.border0`, or `BORDER0_HOME` when set. The directory is not created.
pub fn border0_home_dir() -> Result<PathBuf, String> {
    if let Some(override_dir) = std::env::var_os("BORDER0_HOME") {
        let path = PathBuf::from(override_dir);
        if path.is_relative() {
            return Err("BORDER0_HOME must be an absolute path".to_string());
        }
        return Ok(path);
    }
    let home = user_home_dir().ok_or_else(|| {
        "failed to resolve user home; set BORDER0_HOME or HOME/USERPROFILE".to_string()
    })?;
    Ok(home.join(".border0"))
}

/// Token file written by `border0 login`.
pub fn border0_token_path() -> Result<PathBuf, String> {
    Ok(border0_home_dir()?.join("token"))
}

pub fn examples_config_path() -> Result<PathBuf, String> {
    if let Some(path) = std::env::var_os("BORDER0_EXAMPLES_CONFIG") {
        return Ok(PathBuf::from(path));
    }
    Ok(border0_home_dir()?.join("examples.toml"))
}
