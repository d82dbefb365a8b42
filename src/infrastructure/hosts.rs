//! Alias lines in the system hosts file.
//!
//! Lines written here look like `<ip>\t<names>\t# <marker>`. Lines carrying
//! the marker are owned by sitectl; a plain `ip name` line for the domain
//! being renamed is adopted as well.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::SiteDomain;
use crate::infrastructure::fs::write_atomic;

#[derive(Debug, Error)]
pub enum HostsError {
    #[error("Failed to read hosts file {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },

    #[error("Failed to write hosts file {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostsChange {
    /// An existing line (1-based) was rewritten.
    Updated { line_number: usize },
    Added,
    /// Another line already maps the new name; nothing was written.
    AlreadyPresent { line_number: usize },
    /// The matching line already had the desired content.
    Unchanged,
}

pub struct HostsSync {
    path: PathBuf,
    marker: String,
}

impl HostsSync {
    pub fn new(path: PathBuf, marker: impl Into<String>) -> Self {
        Self {
            path,
            marker: marker.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry_line(&self, ip: &str, domain: &SiteDomain) -> String {
        format!("{}\t{}\t# {}", ip, domain, self.marker)
    }

    /// Text telling the user what to add when the file cannot be written.
    pub fn manual_instruction(&self, ip: &str, domain: &SiteDomain) -> String {
        format!(
            "Add this line to {} manually:\n  {}",
            self.path.display(),
            self.entry_line(ip, domain)
        )
    }

    /// Point the alias for `old` at `new`, or add one for `new`.
    pub fn upsert(
        &self,
        old: &SiteDomain,
        new: &SiteDomain,
        ip: &str,
    ) -> Result<HostsChange, HostsError> {
        let content = self.read()?;
        let mut lines = split_lines(&content);
        let entry = self.entry_line(ip, new);

        let found = self
            .find_line(&lines, old.primary(), true)
            .or_else(|| self.find_line(&lines, old.primary(), false));

        let change = match found {
            Some(i) if body(&lines[i]) == entry => HostsChange::Unchanged,
            Some(i) => {
                info!(line = i + 1, old = %old, new = %new, "rewriting hosts alias");
                let terminator = ending(&lines[i]).to_string();
                lines[i] = entry + &terminator;
                HostsChange::Updated { line_number: i + 1 }
            }
            None => match self.find_line(&lines, new.primary(), false) {
                Some(i) => {
                    warn!(line = i + 1, domain = %new, "hosts file already maps domain");
                    HostsChange::AlreadyPresent { line_number: i + 1 }
                }
                None => {
                    info!(domain = %new, ip, "adding hosts alias");
                    let newline = newline_of(&content);
                    if let Some(last) = lines.last_mut()
                        && ending(last).is_empty()
                    {
                        last.push_str(newline);
                    }
                    lines.push(entry + newline);
                    HostsChange::Added
                }
            },
        };

        if matches!(change, HostsChange::Updated { .. } | HostsChange::Added) {
            self.write(&lines)?;
        }

        Ok(change)
    }

    /// Delete every owned line for `domain`. Returns how many were removed.
    pub fn remove(&self, domain: &SiteDomain) -> Result<usize, HostsError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(HostsError::ReadError {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        let suffix = format!("\t{}\t# {}", domain, self.marker);
        let lines = split_lines(&content);
        let before = lines.len();
        let kept: Vec<String> = lines
            .into_iter()
            .filter(|line| !line.trim_end().ends_with(&suffix))
            .collect();

        let removed = before - kept.len();
        if removed > 0 {
            info!(domain = %domain, removed, "removing hosts alias");
            self.write(&kept)?;
        } else {
            debug!(domain = %domain, "no hosts alias to remove");
        }
        Ok(removed)
    }

    /// Index of the first line mapping `name`; `owned` restricts the search
    /// to lines carrying the marker.
    fn find_line(&self, lines: &[String], name: &str, owned: bool) -> Option<usize> {
        lines.iter().position(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return false;
            }

            let (entry, comment) = trimmed.split_once('#').unwrap_or((trimmed, ""));
            if owned && comment.trim() != self.marker {
                return false;
            }

            entry
                .split_whitespace()
                .skip(1)
                .any(|host| host.eq_ignore_ascii_case(name))
        })
    }

    fn read(&self) -> Result<String, HostsError> {
        fs::read_to_string(&self.path).map_err(|e| HostsError::ReadError {
            path: self.path.clone(),
            source: e,
        })
    }

    /// `lines` carry their own terminators.
    fn write(&self, lines: &[String]) -> Result<(), HostsError> {
        let content = lines.concat();
        write_atomic(&self.path, content.as_bytes()).map_err(|e| HostsError::WriteError {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// Lines with their terminators, so rewrites keep `\r\n` files intact.
fn split_lines(content: &str) -> Vec<String> {
    content.split_inclusive('\n').map(str::to_string).collect()
}

fn ending(line: &str) -> &str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

fn body(line: &str) -> &str {
    &line[..line.len() - ending(line).len()]
}

/// Terminator for appended lines: whatever the file already uses.
fn newline_of(content: &str) -> &'static str {
    if content.contains("\r\n") { "\r\n" } else { "\n" }
}
