use super::traits::TextFormat;
use crate::core::models::atom::AtomRecord;
use crate::core::models::orbitals::{MoBlock, MoldenDocument};
use nalgebra::Point3;
use std::io;
use thiserror::Error;

const ATOMS_SECTION_HEADER: &str = "[atoms]";
const ORBITALS_SECTION_HEADER: &str = "[mo]";
const MIN_ATOM_FIELDS: usize = 5;

#[derive(Debug, Error)]
pub enum MoldenError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed [Atoms] row on line {line}: {message}")]
    Format { line: usize, message: String },
    #[error("Orbital index {index} is out of range ({len} orbitals available)")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Atoms,
    Orbitals,
}

/// Reader for Molden files: `[Atoms]` coordinates and `[MO]` orbital data.
///
/// Sections end implicitly at a blank line or at the next bracketed header. Inside
/// `[Atoms]`, rows with at least five fields contribute `symbol = field[0]` and
/// `x, y, z = fields[2..5]`; shorter rows are skipped. Inside `[MO]`, every line is
/// captured verbatim (trimmed). Unit tags on the `[Atoms]` header are not interpreted;
/// coordinates are returned exactly as written.
pub struct MoldenFile;

impl TextFormat for MoldenFile {
    type Document = MoldenDocument;
    type Error = MoldenError;

    fn parse(text: &str) -> Result<Self::Document, Self::Error> {
        let mut atoms = Vec::new();
        let mut orbital_lines = Vec::new();
        let mut section = Section::None;

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            let lowered = line.to_ascii_lowercase();

            if lowered.contains(ATOMS_SECTION_HEADER) {
                section = Section::Atoms;
                continue;
            }
            if lowered.contains(ORBITALS_SECTION_HEADER) {
                section = Section::Orbitals;
                continue;
            }
            if line.is_empty() || line.starts_with('[') {
                section = Section::None;
                continue;
            }

            match section {
                Section::Atoms => {
                    if let Some(atom) = parse_atom_row(idx + 1, line)? {
                        atoms.push(atom);
                    }
                }
                Section::Orbitals => orbital_lines.push(line.to_string()),
                Section::None => {}
            }
        }

        Ok(MoldenDocument::new(atoms, orbital_lines))
    }
}

impl MoldenDocument {
    /// Returns the orbital at zero-based `index`, in file order.
    ///
    /// # Errors
    ///
    /// Returns [`MoldenError::IndexOutOfRange`] if `index` is not smaller than the number of
    /// orbitals in the document.
    pub fn get_orbital(&self, index: usize) -> Result<&MoBlock, MoldenError> {
        self.orbitals()
            .get(index)
            .ok_or(MoldenError::IndexOutOfRange {
                index,
                len: self.orbital_count(),
            })
    }
}

fn parse_atom_row(line_num: usize, line: &str) -> Result<Option<AtomRecord>, MoldenError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_ATOM_FIELDS {
        return Ok(None);
    }

    let mut coords = [0.0; 3];
    for (slot, value) in coords.iter_mut().zip(&fields[2..5]) {
        *slot = value.parse::<f64>().map_err(|_| MoldenError::Format {
            line: line_num,
            message: format!("invalid coordinate '{}'", value),
        })?;
    }

    Ok(Some(AtomRecord::new(
        fields[0],
        Point3::new(coords[0], coords[1], coords[2]),
    )))
}
