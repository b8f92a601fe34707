use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

/// Resolve the server home directory.
///
/// - `Some(path)`: a leading `~` expands to the user's home; relative paths are
///   made absolute against the current directory.
/// - `None`: `<platform home>/<default_subdir>` (`%APPDATA%` on Windows).
///
/// With `create`, the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let path = match configured {
        Some(raw) => expand_tilde(raw.trim())?,
        None => platform_base()?.join(default_subdir),
    };

    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .context("cannot read current directory")?
            .join(path)
    };

    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("cannot create home dir {}", path.display()))?;
    }
    Ok(path)
}

fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return user_home();
    }
    match raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        Some(rest) => Ok(user_home()?.join(rest)),
        None => Ok(Path::new(raw).to_path_buf()),
    }
}

fn user_home() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| anyhow!("cannot determine user home directory"))
}

#[cfg(target_os = "windows")]
fn platform_base() -> Result<PathBuf> {
    dirs::config_dir().ok_or_else(|| anyhow!("cannot determine %APPDATA%"))
}

#[cfg(not(target_os = "windows"))]
fn platform_base() -> Result<PathBuf> {
    user_home()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absolute_path_is_kept_and_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("a").join("b");
        let out = resolve_home_dir(Some(target.to_string_lossy().into()), ".x", true).unwrap();
        assert_eq!(out, target);
        assert!(target.is_dir());
    }

    #[test]
    fn tilde_expands_to_user_home() {
        let out = resolve_home_dir(Some("~/.catalog_tilde_test".into()), ".x", false).unwrap();
        assert!(out.is_absolute());
        assert!(out.ends_with(".catalog_tilde_test"));
        assert!(!out.to_string_lossy().contains('~'));
    }

    #[test]
    fn relative_path_is_made_absolute() {
        let out = resolve_home_dir(Some("relative/home".into()), ".x", false).unwrap();
        assert!(out.is_absolute());
        assert!(out.ends_with("relative/home"));
    }
}
