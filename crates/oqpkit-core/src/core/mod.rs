//! # Core Module
//!
//! Stateless building blocks shared by the job engine and the workflows.
//!
//! - **Data Models** ([`models`]) - Atoms, element lookup, geometry and orbital documents
//! - **File I/O** ([`io`]) - Readers and writers for the text formats produced and consumed
//!   around an OpenQP run
//!
//! Everything in this module is pure: parsers take text and return owned documents, so
//! they can be called concurrently on different inputs without coordination.

pub mod io;
pub mod models;
