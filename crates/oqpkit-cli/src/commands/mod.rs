pub mod geometry;
pub mod orbitals;
pub mod run;
