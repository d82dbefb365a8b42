use std::path::{Path, PathBuf};

use super::{Port, SiteDomain, SiteStatus, SiteType};

/// Address used for hosts aliases and backends when none is given.
pub const LOOPBACK: &str = "127.0.0.1";

/// One registered proxy site, as persisted in the registry index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRecord {
    pub domain: SiteDomain,
    pub port: Port,
    /// Backend address; `None` means loopback and is not written to the index.
    pub host: Option<String>,
    pub site_type: SiteType,
    pub ip: String,
    pub path: PathBuf,
    pub status: SiteStatus,
    pub created: u64,
    /// Keys this version does not model, kept in their original order.
    pub extra: Vec<(String, String)>,
    pub spelling: Spelling,
}

/// `type` and `status` values as they were written in the index, when that
/// differs from the lowercase form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Spelling {
    pub site_type: Option<String>,
    pub status: Option<String>,
}

impl Spelling {
    /// The written form of `canonical`, if one was recorded for that value.
    pub fn resolve<'a>(written: Option<&'a str>, canonical: &'a str) -> &'a str {
        match written {
            Some(w) if w.eq_ignore_ascii_case(canonical) => w,
            _ => canonical,
        }
    }
}

impl SiteRecord {
    pub fn new(domain: SiteDomain, port: Port, path: PathBuf, created: u64) -> Self {
        Self {
            domain,
            port,
            host: None,
            site_type: SiteType::Proxy,
            ip: LOOPBACK.to_string(),
            path,
            status: SiteStatus::Active,
            created,
            extra: Vec::new(),
            spelling: Spelling::default(),
        }
    }

    pub fn backend_host(&self) -> &str {
        self.host.as_deref().unwrap_or(LOOPBACK)
    }

    /// Name of the site file, which is also the name of its enable link.
    pub fn site_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_else(|| self.domain.primary())
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Directory holding the site file.
    pub fn site_dir(&self) -> Option<&Path> {
        self.path.parent()
    }
}
