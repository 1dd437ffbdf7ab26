//! Folio adapters
//!
//! Implementations of the host ports for running the site runtime outside a
//! browser: files instead of fetch and localStorage, a simulated media element,
//! and tracing in place of toasts.

pub mod infrastructure;
