//! Raws Apparel search library
//!
//! Multi-source fashion image search with a provider fallback chain, plus the
//! style catalog contracts the storefront builds on.

pub mod catalog;
pub mod config;
pub mod logging;
pub mod search;
