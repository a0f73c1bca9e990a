//! Collaborator contracts for the domain layer.
//!
//! The real catalog search, persistence and account subsystems live in other
//! parts of the platform. This module only defines the traits the HTML
//! clients call, the item types they exchange and the error taxonomy, plus
//! in-memory implementations for the preview CLI and the tests.

pub mod controller;
pub mod error;
pub mod types;
