//! Folio application layer.
//!
//! Services are constructed explicitly and passed to their consumers; there is
//! no ambient global registry.

pub mod application;
