use crate::core::io::optlog::{ExtractError, extract_optimized_geometry_from_path};
use crate::core::io::traits::TextFormatWriter;
use crate::core::io::xyz::{XyzError, XyzFile};
use crate::core::models::geometry::GeometryDocument;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub const GEOMETRY_FILE_SUFFIX: &str = "_opt_geo";
pub const DEFAULT_GEOMETRY_EXTENSION: &str = "xyz";

#[derive(Debug, Clone)]
pub struct SavedGeometry {
    pub path: PathBuf,
    pub document: GeometryDocument,
}

/// `<output_dir>/<job_name>_opt_geo.<extension>`.
pub fn geometry_output_path(output_dir: &Path, job_name: &str, extension: &str) -> PathBuf {
    let extension = extension.trim_start_matches('.');
    output_dir.join(format!("{}{}.{}", job_name, GEOMETRY_FILE_SUFFIX, extension))
}

/// Extracts the last optimized geometry from `log_path` and writes it as an XYZ document.
///
/// Nothing is written when extraction fails.
///
/// # Errors
///
/// Returns [`ExtractError::NotFound`] if the log holds no optimization step with a
/// coordinate block, [`ExtractError::Format`] for malformed coordinate rows, and
/// [`ExtractError::Io`] if the log cannot be read or the output cannot be written.
#[instrument(skip_all, name = "extract_workflow", fields(log = %log_path.display()))]
pub fn save_optimized_geometry(
    log_path: &Path,
    job_name: &str,
    output_dir: &Path,
    extension: &str,
) -> Result<SavedGeometry, ExtractError> {
    let document = extract_optimized_geometry_from_path(log_path)?;
    let path = geometry_output_path(output_dir, job_name, extension);

    XyzFile::write_to_path(&document, &path).map_err(|e| match e {
        XyzError::Io(e) => ExtractError::Io(e),
        other => ExtractError::Io(io::Error::other(other)),
    })?;

    info!(
        "Saved optimized geometry ({} atoms) to {:?}",
        document.atom_count(),
        path
    );
    Ok(SavedGeometry { path, document })
}
