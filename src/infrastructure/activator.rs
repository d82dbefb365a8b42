use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ActivatorError {
    #[error("Failed to create enable link {link}: {primary}{}", fallback_note(.fallback))]
    LinkFailed {
        link: PathBuf,
        primary: io::Error,
        fallback: Option<String>,
    },

    #[error("Failed to remove enable link {link}: {source}")]
    UnlinkFailed { link: PathBuf, source: io::Error },
}

fn fallback_note(fallback: &Option<String>) -> String {
    match fallback {
        Some(reason) => format!(" (fallback also failed: {})", reason),
        None => String::new(),
    }
}

/// How an `enable` call left the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Created,
    AlreadyEnabled,
    /// The link pointed elsewhere and was recreated.
    Replaced,
    /// Direct creation failed; the external link command succeeded.
    CreatedViaFallback,
}

/// Manages the "enabled" symlinks that make the server load a site file.
pub struct SiteActivator {
    enabled_dir: PathBuf,
    /// argv prefix run as `<prefix> <target> <link>` when `symlink` fails.
    link_fallback: Vec<String>,
}

impl SiteActivator {
    pub fn new(enabled_dir: PathBuf, link_fallback: Vec<String>) -> Self {
        Self {
            enabled_dir,
            link_fallback,
        }
    }

    pub fn link_path(&self, site_name: &str) -> PathBuf {
        self.enabled_dir.join(site_name)
    }

    /// True when a link (dangling or not) exists for `site_name`.
    pub fn is_enabled(&self, site_name: &str) -> bool {
        fs::symlink_metadata(self.link_path(site_name)).is_ok()
    }

    /// Where the enable link for `site_name` points, if it is a symlink.
    pub fn link_target(&self, site_name: &str) -> Option<PathBuf> {
        fs::read_link(self.link_path(site_name)).ok()
    }

    pub fn enable(&self, source: &Path, site_name: &str) -> Result<LinkOutcome, ActivatorError> {
        let link = self.link_path(site_name);

        let mut replaced = false;
        if fs::symlink_metadata(&link).is_ok() {
            if fs::read_link(&link).ok().as_deref() == Some(source) {
                debug!(link = %link.display(), "site already enabled");
                return Ok(LinkOutcome::AlreadyEnabled);
            }
            remove_link(&link)?;
            replaced = true;
        }

        match create_symlink(source, &link) {
            Ok(()) => {
                info!(link = %link.display(), target = %source.display(), "site enabled");
                Ok(if replaced {
                    LinkOutcome::Replaced
                } else {
                    LinkOutcome::Created
                })
            }
            Err(primary) => {
                warn!(link = %link.display(), error = %primary, "symlink failed, trying fallback");
                match self.run_fallback(source, &link) {
                    Ok(()) => Ok(LinkOutcome::CreatedViaFallback),
                    Err(reason) => Err(ActivatorError::LinkFailed {
                        link,
                        primary,
                        fallback: reason,
                    }),
                }
            }
        }
    }

    /// Remove the enable link. Returns whether a link was present.
    pub fn disable(&self, site_name: &str) -> Result<bool, ActivatorError> {
        let link = self.link_path(site_name);
        if fs::symlink_metadata(&link).is_err() {
            debug!(link = %link.display(), "site already disabled");
            return Ok(false);
        }

        remove_link(&link)?;
        info!(link = %link.display(), "site disabled");
        Ok(true)
    }

    /// `Err(None)` means no fallback is configured.
    fn run_fallback(&self, source: &Path, link: &Path) -> Result<(), Option<String>> {
        let (program, args) = self.link_fallback.split_first().ok_or(None)?;

        let output = Command::new(program)
            .args(args)
            .arg(source)
            .arg(link)
            .output()
            .map_err(|e| Some(format!("failed to run {}: {}", program, e)))?;

        if output.status.success() {
            info!(link = %link.display(), "site enabled via fallback command");
            Ok(())
        } else {
            Err(Some(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))
        }
    }
}

fn remove_link(link: &Path) -> Result<(), ActivatorError> {
    match fs::remove_file(link) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ActivatorError::UnlinkFailed {
            link: link.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(unix)]
fn create_symlink(source: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, link)
}

#[cfg(not(unix))]
fn create_symlink(_source: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are only supported on unix",
    ))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SiteActivator, PathBuf) {
        let dir = TempDir::new().unwrap();
        let available = dir.path().join("sites-available");
        let enabled = dir.path().join("sites-enabled");
        fs::create_dir_all(&available).unwrap();
        fs::create_dir_all(&enabled).unwrap();

        let source = available.join("svc.test");
        fs::write(&source, "server {}\n").unwrap();

        (dir, SiteActivator::new(enabled, Vec::new()), source)
    }

    #[test]
    fn test_enable_twice_is_idempotent() {
        let (_dir, activator, source) = setup();

        assert_eq!(
            activator.enable(&source, "svc.test").unwrap(),
            LinkOutcome::Created
        );
        assert_eq!(
            activator.enable(&source, "svc.test").unwrap(),
            LinkOutcome::AlreadyEnabled
        );

        assert_eq!(activator.link_target("svc.test"), Some(source));
        let entries = fs::read_dir(activator.link_path("svc.test").parent().unwrap())
            .unwrap()
            .count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_enable_replaces_stale_link() {
        let (dir, activator, source) = setup();
        let other = dir.path().join("elsewhere");
        create_symlink(&other, &activator.link_path("svc.test")).unwrap();

        assert_eq!(
            activator.enable(&source, "svc.test").unwrap(),
            LinkOutcome::Replaced
        );
        assert_eq!(activator.link_target("svc.test"), Some(source));
    }

    #[test]
    fn test_disable_is_idempotent() {
        let (_dir, activator, source) = setup();
        activator.enable(&source, "svc.test").unwrap();

        assert!(activator.disable("svc.test").unwrap());
        assert!(!activator.is_enabled("svc.test"));
        assert!(!activator.disable("svc.test").unwrap());
    }

    #[test]
    fn test_failure_without_fallback() {
        let dir = TempDir::new().unwrap();
        let activator = SiteActivator::new(dir.path().join("missing-dir"), Vec::new());

        let err = activator
            .enable(Path::new("/nowhere/svc.test"), "svc.test")
            .unwrap_err();
        assert!(matches!(
            err,
            ActivatorError::LinkFailed { fallback: None, .. }
        ));
    }

    #[test]
    fn test_fallback_command_reports_failure() {
        let dir = TempDir::new().unwrap();
        let activator =
            SiteActivator::new(dir.path().join("missing-dir"), vec!["false".to_string()]);

        let err = activator
            .enable(Path::new("/nowhere/svc.test"), "svc.test")
            .unwrap_err();
        assert!(matches!(
            err,
            ActivatorError::LinkFailed {
                fallback: Some(_),
                ..
            }
        ));
    }
}
