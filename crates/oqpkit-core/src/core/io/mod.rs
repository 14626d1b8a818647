//! Provides input/output functionality for the text formats around an OpenQP run.
//!
//! This module contains a reader for OpenQP optimization logs, a reader and writer for
//! XYZ coordinate documents, and a reader for Molden orbital files. All readers share a
//! trait-based interface and the same text decoding policy (UTF-8 with a single-byte
//! Latin-1 fallback).

pub mod molden;
pub mod optlog;
pub mod text;
pub mod traits;
pub mod xyz;
