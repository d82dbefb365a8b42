use crate::infrastructure::service::{CheckReport, ServiceController};

pub struct DiagnosticReport {
    pub service_online: Result<bool, String>,
    pub syntax: Result<CheckReport, String>,
    pub listening_ports: Result<String, String>,
}

/// Use case: report service status, syntax validity and open ports.
/// Read-only; never reloads.
pub struct Diagnose<'a> {
    controller: &'a dyn ServiceController,
}

impl<'a> Diagnose<'a> {
    pub fn new(controller: &'a dyn ServiceController) -> Self {
        Self { controller }
    }

    pub fn execute(&self) -> DiagnosticReport {
        DiagnosticReport {
            service_online: self.controller.query_status().map_err(|e| e.to_string()),
            syntax: self.controller.check().map_err(|e| e.to_string()),
            listening_ports: self
                .controller
                .list_listening_ports()
                .map_err(|e| e.to_string()),
        }
    }
}
