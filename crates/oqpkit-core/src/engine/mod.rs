//! # Engine Module
//!
//! The job supervisor: launches one external OpenQP process, relays its output as an
//! ordered stream of [`sink::LogEvent`]s, and tracks the job's lifecycle.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - How the external program is launched and where its log lives
//! - **Invocation** ([`command`]) - Translation of a configuration and an input artifact into a command line
//! - **Job State** ([`job`]) - The `Pending → Running → {Succeeded, Failed, Cancelled}` lifecycle
//! - **Event Relay** ([`sink`]) - The thread-safe ordered sink and the consumer-side stream
//! - **Supervision** ([`runner`]) - `JobRunner` and the per-job `JobHandle`
//! - **Progress Monitoring** ([`progress`]) - Callback-based reporting used by the workflows
//! - **Error Handling** ([`error`]) - Job-level error types
//!
//! ## Concurrency
//!
//! Each job runs one supervisor task and two reader tasks (stdout and stderr) on the Tokio
//! runtime. Readers push into a single sink that assigns sequence numbers at insertion, so
//! consumers observe one total order across both streams. Consumers pull from the stream
//! at their own cadence; the sink is unbounded and never blocks producers.

pub mod command;
pub mod config;
pub mod error;
pub mod job;
pub mod progress;
pub mod runner;
pub mod sink;
