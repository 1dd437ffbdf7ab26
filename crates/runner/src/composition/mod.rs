//! Composition Root Module
//!
//! Creates the adapters, wires them to the ports and assembles the services
//! one page boot needs. Nothing here is global: every consumer receives the
//! services it uses explicitly.

mod site;

pub use site::{build_site, HeroVideo, Site};
