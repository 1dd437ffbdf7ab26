//! Toasts rendered as log lines.

use folio_domain::Severity;
use folio_ports::outbound::NotificationPort;

#[derive(Debug, Clone, Default)]
pub struct TracingNotifications;

impl TracingNotifications {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationPort for TracingNotifications {
    fn show_toast(&self, message: &str, severity: Severity) {
        if severity.score() >= 4 {
            tracing::error!(target: "folio::toast", severity = severity.score(), "{}", message);
        } else {
            tracing::warn!(target: "folio::toast", severity = severity.score(), "{}", message);
        }
    }
}
