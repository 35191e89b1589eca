//! Infrastructure adapters. Implement ports.
//!
//! Question catalog, storage backends, terminal UI. Map errors to DomainError.

pub mod catalog;
pub mod persistence;
pub mod ui;
