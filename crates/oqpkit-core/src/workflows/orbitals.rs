use crate::core::io::molden::{MoldenError, MoldenFile};
use crate::core::io::traits::TextFormat;
use crate::core::models::orbitals::{MoBlock, MoldenDocument};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Parses a Molden file, with the same encoding fallback as every other reader.
#[instrument(skip_all, name = "orbitals_workflow", fields(path = %path.display()))]
pub fn load_orbitals(path: &Path) -> Result<MoldenDocument, MoldenError> {
    let document = MoldenFile::read_from_path(path)?;
    info!(
        "Loaded {} atom(s) and {} orbital(s) ({} captured [MO] lines).",
        document.atoms.len(),
        document.orbital_count(),
        document.orbital_lines().len()
    );
    Ok(document)
}

/// Loads a Molden file and returns a copy of the orbital at zero-based `index`.
pub fn select_orbital(path: &Path, index: usize) -> Result<MoBlock, MoldenError> {
    let document = load_orbitals(path)?;
    let orbital = document.get_orbital(index)?;
    debug!("Selected orbital {} with {} line(s).", index, orbital.len());
    Ok(orbital.clone())
}
