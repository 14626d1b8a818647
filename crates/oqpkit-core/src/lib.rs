//! # OQPKit Core Library
//!
//! Supervision of a single OpenQP computation and extraction of structured data from
//! the files it leaves behind.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`AtomRecord`, `GeometryDocument`,
//!   `MoldenDocument`), the element table, and pure text parsers for optimization logs,
//!   XYZ documents and Molden files.
//!
//! - **[`engine`]: The Job Supervisor.** The stateful layer that launches the external
//!   process, relays its output through an ordered event sink, and tracks the job's
//!   lifecycle until a terminal state is reached.
//!
//! - **[`workflows`]: The Public API.** High-level entry points that tie `engine` and `core`
//!   together: run a job to completion, extract and save an optimized geometry, load the
//!   orbitals of a Molden file.

pub mod core;
pub mod engine;
pub mod workflows;
