//! Data models for atoms, geometries and molecular orbitals.

pub mod atom;
pub mod element;
pub mod geometry;
pub mod orbitals;
