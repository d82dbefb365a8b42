use tracing::{info, warn};

use super::service::ServiceController;

/// Decision taken by [`ValidationGate::validate_and_activate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// The check passed and the service was reloaded.
    Activated,
    /// The check failed or could not run. Nothing was reloaded.
    Rejected { diagnostics: String },
    /// The check passed but the reload command failed.
    ReloadFailed { message: String },
}

/// Check-then-reload: a configuration that fails the syntax check is never
/// handed to the running service.
pub struct ValidationGate<'a> {
    controller: &'a dyn ServiceController,
}

impl<'a> ValidationGate<'a> {
    pub fn new(controller: &'a dyn ServiceController) -> Self {
        Self { controller }
    }

    pub fn validate_and_activate(&self) -> GateOutcome {
        let report = match self.controller.check() {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "syntax check could not run");
                return GateOutcome::Rejected {
                    diagnostics: e.to_string(),
                };
            }
        };

        if !report.ok {
            warn!("syntax check rejected configuration");
            return GateOutcome::Rejected {
                diagnostics: report.diagnostics,
            };
        }

        match self.controller.reload() {
            Ok(()) => {
                info!("configuration validated and activated");
                GateOutcome::Activated
            }
            Err(e) => GateOutcome::ReloadFailed {
                message: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::infrastructure::service::{CheckReport, ServiceError};

    struct FakeController {
        check_ok: bool,
        spawn_error: bool,
        calls: RefCell<Vec<&'static str>>,
    }

    impl FakeController {
        fn new(check_ok: bool) -> Self {
            Self {
                check_ok,
                spawn_error: false,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ServiceController for FakeController {
        fn check(&self) -> Result<CheckReport, ServiceError> {
            self.calls.borrow_mut().push("check");
            if self.spawn_error {
                return Err(ServiceError::NotConfigured("check"));
            }
            Ok(CheckReport {
                ok: self.check_ok,
                diagnostics: "line 3: unknown directive".into(),
            })
        }

        fn reload(&self) -> Result<(), ServiceError> {
            self.calls.borrow_mut().push("reload");
            Ok(())
        }

        fn query_status(&self) -> Result<bool, ServiceError> {
            Ok(true)
        }

        fn list_listening_ports(&self) -> Result<String, ServiceError> {
            Ok(String::new())
        }
    }

    #[test]
    fn test_activates_on_success() {
        let ctl = FakeController::new(true);
        let outcome = ValidationGate::new(&ctl).validate_and_activate();
        assert_eq!(outcome, GateOutcome::Activated);
        assert_eq!(*ctl.calls.borrow(), vec!["check", "reload"]);
    }

    #[test]
    fn test_never_reloads_on_rejection() {
        let ctl = FakeController::new(false);
        let outcome = ValidationGate::new(&ctl).validate_and_activate();
        assert_eq!(
            outcome,
            GateOutcome::Rejected {
                diagnostics: "line 3: unknown directive".into()
            }
        );
        assert_eq!(*ctl.calls.borrow(), vec!["check"]);
    }

    #[test]
    fn test_rejects_when_check_cannot_run() {
        let mut ctl = FakeController::new(true);
        ctl.spawn_error = true;
        let outcome = ValidationGate::new(&ctl).validate_and_activate();
        assert!(matches!(outcome, GateOutcome::Rejected { .. }));
        assert_eq!(*ctl.calls.borrow(), vec!["check"]);
    }
}
