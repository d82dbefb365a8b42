#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use sitectl::application::{RegistryOrchestrator, SiteContext};
use sitectl::infrastructure::paths::SitePaths;
use sitectl::infrastructure::service::{CheckReport, ServiceController, ServiceError};

pub const MARKER: &str = "Added by sitectl";
pub const BASE_HOSTS: &str = "127.0.0.1\tlocalhost\n::1\tlocalhost ip6-localhost\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Check,
    Reload,
    Status,
    Ports,
}

/// Service double that records every call instead of touching a server.
pub struct RecordingController {
    check_ok: Cell<bool>,
    reload_ok: Cell<bool>,
    diagnostics: RefCell<String>,
    calls: RefCell<Vec<Call>>,
}

impl RecordingController {
    pub fn passing() -> Self {
        Self {
            check_ok: Cell::new(true),
            reload_ok: Cell::new(true),
            diagnostics: RefCell::new("syntax is ok".into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(diagnostics: &str) -> Self {
        let ctl = Self::passing();
        ctl.fail_with(diagnostics);
        ctl
    }

    pub fn fail_with(&self, diagnostics: &str) {
        self.check_ok.set(false);
        *self.diagnostics.borrow_mut() = diagnostics.to_string();
    }

    pub fn fail_reload(&self) {
        self.reload_ok.set(false);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn reset(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn reloads(&self) -> usize {
        self.calls.borrow().iter().filter(|c| **c == Call::Reload).count()
    }
}

impl ServiceController for RecordingController {
    fn check(&self) -> Result<CheckReport, ServiceError> {
        self.calls.borrow_mut().push(Call::Check);
        Ok(CheckReport {
            ok: self.check_ok.get(),
            diagnostics: self.diagnostics.borrow().clone(),
        })
    }

    fn reload(&self) -> Result<(), ServiceError> {
        self.calls.borrow_mut().push(Call::Reload);
        if self.reload_ok.get() {
            Ok(())
        } else {
            Err(ServiceError::CommandFailed {
                command: "systemctl reload nginx".into(),
                status: "exit status: 1".into(),
                output: "Job for nginx.service failed".into(),
            })
        }
    }

    fn query_status(&self) -> Result<bool, ServiceError> {
        self.calls.borrow_mut().push(Call::Status);
        Ok(true)
    }

    fn list_listening_ports(&self) -> Result<String, ServiceError> {
        self.calls.borrow_mut().push(Call::Ports);
        Ok("LISTEN 0 511 0.0.0.0:80 0.0.0.0:*\n".into())
    }
}

/// Throwaway server tree: available/enabled dirs, hosts file, data dir.
pub struct Sandbox {
    pub dir: TempDir,
    pub ctx: SiteContext,
}

impl Sandbox {
    pub fn new() -> Self {
        Self::with_link_fallback(Vec::new())
    }

    pub fn with_link_fallback(link_fallback: Vec<String>) -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        let paths = SitePaths {
            data_dir: root.join("data"),
            index_file: root.join("data").join("config_index"),
            journal_file: root.join("data").join("rename.journal"),
            sites_available: root.join("sites-available"),
            sites_enabled: root.join("sites-enabled"),
            hosts_file: root.join("hosts"),
        };
        fs::create_dir_all(&paths.data_dir).unwrap();
        fs::create_dir_all(&paths.sites_available).unwrap();
        fs::create_dir_all(&paths.sites_enabled).unwrap();
        fs::write(&paths.hosts_file, BASE_HOSTS).unwrap();

        Self {
            ctx: SiteContext::new(paths, MARKER, link_fallback),
            dir,
        }
    }

    pub fn orchestrator<'a>(&'a self, ctl: &'a RecordingController) -> RegistryOrchestrator<'a> {
        RegistryOrchestrator::new(&self.ctx, ctl)
    }

    pub fn available(&self, name: &str) -> PathBuf {
        self.ctx.paths.sites_available.join(name)
    }

    pub fn link(&self, name: &str) -> PathBuf {
        self.ctx.paths.sites_enabled.join(name)
    }

    pub fn link_target(&self, name: &str) -> Option<PathBuf> {
        fs::read_link(self.link(name)).ok()
    }

    pub fn hosts(&self) -> String {
        fs::read_to_string(&self.ctx.paths.hosts_file).unwrap()
    }

    pub fn index(&self) -> String {
        fs::read_to_string(&self.ctx.paths.index_file).unwrap_or_default()
    }

    pub fn hosts_line(&self, ip: &str, domain: &str) -> String {
        format!("{}\t{}\t# {}", ip, domain, MARKER)
    }
}
