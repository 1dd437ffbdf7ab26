//! Central error handler
//!
//! Normalizes anything reported by the runtime into an [`ErrorRecord`],
//! classifies it, keeps a bounded in-memory history, mirrors the most recent
//! records to persistent storage and raises a toast for the serious ones.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use folio_domain::{
    AppEvent, ErrorCategory, ErrorId, ErrorLimits, ErrorRecord, ErrorSource, Severity,
};
use folio_ports::outbound::{storage_keys, CapturedError, NotificationPort, StorageProvider};

use crate::application::messaging::EventBus;

/// Input to [`ErrorHandler::report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub name: Option<String>,
    pub message: String,
    pub source: ErrorSource,
    pub context: Option<String>,
    /// Overrides the category's default severity
    pub severity: Option<Severity>,
    /// Marks a failure the page cannot work without (raises network errors)
    pub critical: bool,
}

impl ErrorReport {
    pub fn new(source: ErrorSource, message: impl Into<String>) -> Self {
        Self {
            name: None,
            message: message.into(),
            source,
            context: None,
            severity: None,
            critical: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }
}

impl From<CapturedError> for ErrorReport {
    fn from(captured: CapturedError) -> Self {
        Self {
            name: captured.name,
            message: captured.message,
            source: ErrorSource::Global,
            context: captured.location,
            severity: None,
            critical: false,
        }
    }
}

pub struct ErrorHandler {
    records: Mutex<VecDeque<ErrorRecord>>,
    limits: ErrorLimits,
    storage: Arc<dyn StorageProvider>,
    notifications: Arc<dyn NotificationPort>,
    bus: Option<Arc<EventBus>>,
}

impl ErrorHandler {
    pub fn new(
        limits: ErrorLimits,
        storage: Arc<dyn StorageProvider>,
        notifications: Arc<dyn NotificationPort>,
        bus: Option<Arc<EventBus>>,
    ) -> Self {
        Self {
            records: Mutex::new(VecDeque::with_capacity(limits.max_records)),
            limits,
            storage,
            notifications,
            bus,
        }
    }

    pub fn report(&self, report: ErrorReport) -> ErrorRecord {
        let category = ErrorCategory::classify(report.name.as_deref(), &report.message);
        let severity = report
            .severity
            .unwrap_or_else(|| Self::severity_for(category, &report));

        let record = ErrorRecord {
            id: ErrorId::new(),
            category,
            severity,
            name: report.name,
            message: report.message,
            source: report.source,
            context: report.context,
            timestamp: Utc::now(),
        };

        self.retain(record.clone());
        self.log(&record);

        if record.is_user_visible(Severity::new(self.limits.toast_min_severity)) {
            if let Some(message) = toast_message(&record) {
                self.notifications.show_toast(message, record.severity);
            }
        }

        if let Some(bus) = &self.bus {
            bus.publish(AppEvent::ErrorReported {
                category: record.category,
                severity: record.severity,
                message: record.message.clone(),
            });
        }

        record
    }

    /// Report any error value.
    pub fn capture(
        &self,
        error: &(dyn std::error::Error + 'static),
        source: ErrorSource,
    ) -> ErrorRecord {
        self.report(ErrorReport::new(source, error.to_string()))
    }

    /// Report an uncaught error delivered by a global listener.
    pub fn capture_uncaught(&self, captured: CapturedError) -> ErrorRecord {
        self.report(captured.into())
    }

    /// In-memory history, oldest first.
    pub fn records(&self) -> Vec<ErrorRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Records mirrored to persistent storage by this or an earlier session.
    pub fn persisted(&self) -> Vec<ErrorRecord> {
        let Some(raw) = self.storage.load(storage_keys::ERROR_LOG) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable persisted error log");
                Vec::new()
            }
        }
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.storage.remove(storage_keys::ERROR_LOG);
    }

    fn severity_for(category: ErrorCategory, report: &ErrorReport) -> Severity {
        if report.source == ErrorSource::Global {
            return Severity::MAX;
        }
        if category == ErrorCategory::Network && report.critical {
            return Severity::new(4);
        }
        category.default_severity()
    }

    fn retain(&self, record: ErrorRecord) {
        let recent: Vec<ErrorRecord> = {
            let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
            records.push_back(record);
            while records.len() > self.limits.max_records {
                records.pop_front();
            }
            let skip = records.len().saturating_sub(self.limits.persisted_records);
            records.iter().skip(skip).cloned().collect()
        };

        match serde_json::to_string(&recent) {
            Ok(json) => self.storage.save(storage_keys::ERROR_LOG, &json),
            Err(e) => tracing::warn!(error = %e, "Failed to serialize error log"),
        }
    }

    fn log(&self, record: &ErrorRecord) {
        let score = record.severity.score();
        if score >= 4 {
            tracing::error!(
                id = %record.id,
                category = %record.category,
                severity = score,
                source = ?record.source,
                context = record.context.as_deref().unwrap_or(""),
                "{}",
                record.message
            );
        } else if score >= 3 {
            tracing::warn!(
                id = %record.id,
                category = %record.category,
                severity = score,
                source = ?record.source,
                "{}",
                record.message
            );
        } else {
            tracing::info!(
                id = %record.id,
                category = %record.category,
                severity = score,
                "{}",
                record.message
            );
        }
    }
}

fn toast_message(record: &ErrorRecord) -> Option<&'static str> {
    match record.category {
        ErrorCategory::Network => {
            Some("Connection lost. Some features may be unavailable.")
        }
        ErrorCategory::Media => Some("Some images are not available."),
        ErrorCategory::Permission => Some("Permission denied. Check your browser settings."),
        ErrorCategory::Runtime | ErrorCategory::Unknown if record.severity.score() >= 4 => {
            Some("Something went wrong. Please reload the page.")
        }
        ErrorCategory::Runtime | ErrorCategory::Unknown => None,
    }
}
