//! # Workflows Module
//!
//! High-level entry points that combine the job supervisor in [`crate::engine`] with the
//! parsers in [`crate::core::io`].
//!
//! ## Overview
//!
//! Each workflow covers one user-facing task end to end, including progress reporting and
//! logging, so front ends (the CLI, or any other observer) only deal with paths, a
//! [`ProgressReporter`](crate::engine::progress::ProgressReporter) and the result.
//!
//! ## Architecture
//!
//! - **Job Workflow** ([`run`]) - Start a job, relay its output on the configured drain
//!   cadence, honor an external cancellation signal, and return the terminal outcome.
//! - **Geometry Workflow** ([`extract`]) - Pull the last optimized geometry out of a job
//!   log and save it as `<job>_opt_geo.<ext>`.
//! - **Orbital Workflow** ([`orbitals`]) - Load a Molden file and select individual
//!   molecular orbitals by position.

pub mod extract;
pub mod orbitals;
pub mod run;
