use super::traits::TextFormat;
use crate::core::models::atom::AtomRecord;
use crate::core::models::element::element_symbol_for_field;
use crate::core::models::geometry::GeometryDocument;
use nalgebra::Point3;
use std::io;
use thiserror::Error;

/// Marker line that opens each geometry optimization step in an OpenQP log.
pub const OPTIMIZATION_STEP_MARKER: &str = "PyOQP: Geometry Optimization Step";
/// Header that precedes the Cartesian coordinate table of a step.
pub const COORDINATE_SECTION_HEADER: &str = "Cartesian Coordinate in Angstrom";
/// Comment line written into extracted geometry documents.
pub const OPTIMIZED_GEOMETRY_COMMENT: &str = "Optimized Geometry";

// The coordinate header is followed by one column-label line before the atom rows.
const COORDINATE_HEADER_SKIP: usize = 1;
const COLUMN_LABELS: [&str; 2] = ["ATOM", "ZNUC"];
const MIN_ATOM_FIELDS: usize = 5;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Optimized geometry not found in log: {0}")]
    NotFound(String),
    #[error("Malformed coordinate row on line {line}: {message}")]
    Format { line: usize, message: String },
}

/// Reader for OpenQP optimization logs, producing the final optimized geometry.
pub struct OptimizationLog;

impl TextFormat for OptimizationLog {
    type Document = GeometryDocument;
    type Error = ExtractError;

    fn parse(text: &str) -> Result<Self::Document, Self::Error> {
        extract_optimized_geometry(text)
    }
}

/// Recovers the coordinates of the last optimization step in a log.
///
/// The log is scanned from the end for the last step marker, so the converged geometry
/// wins over intermediate ones. From that marker the first Cartesian coordinate table is
/// read until a blank line or the end of the input.
///
/// # Errors
///
/// Returns [`ExtractError::NotFound`] if there is no step marker, no coordinate table after
/// the last marker, or the table has no atom rows, and [`ExtractError::Format`] if an atom
/// row carries a non-numeric field. No partial document is ever returned.
pub fn extract_optimized_geometry(log_text: &str) -> Result<GeometryDocument, ExtractError> {
    let lines: Vec<&str> = log_text.lines().collect();

    let marker_idx = lines
        .iter()
        .rposition(|line| line.contains(OPTIMIZATION_STEP_MARKER))
        .ok_or_else(|| {
            ExtractError::NotFound(format!("no '{}' marker", OPTIMIZATION_STEP_MARKER))
        })?;

    let header_idx = lines[marker_idx..]
        .iter()
        .position(|line| line.contains(COORDINATE_SECTION_HEADER))
        .map(|offset| marker_idx + offset)
        .ok_or_else(|| {
            ExtractError::NotFound(format!(
                "no '{}' section after the last optimization step (line {})",
                COORDINATE_SECTION_HEADER,
                marker_idx + 1
            ))
        })?;

    let first_row = header_idx + 1 + COORDINATE_HEADER_SKIP;
    let mut document = GeometryDocument::new(OPTIMIZED_GEOMETRY_COMMENT, Vec::new());

    for (idx, line) in lines.iter().enumerate().skip(first_row) {
        if line.trim().is_empty() {
            break;
        }
        if COLUMN_LABELS.iter().any(|label| line.contains(label)) {
            continue;
        }
        if let Some(atom) = parse_atom_row(idx + 1, line)? {
            document.push(atom);
        }
    }

    if document.is_empty() {
        return Err(ExtractError::NotFound(format!(
            "coordinate section on line {} contains no atom rows",
            header_idx + 1
        )));
    }
    Ok(document)
}

/// Reads a log file (with the Latin-1 fallback) and extracts its optimized geometry.
pub fn extract_optimized_geometry_from_path<P: AsRef<std::path::Path>>(
    path: P,
) -> Result<GeometryDocument, ExtractError> {
    OptimizationLog::read_from_path(path)
}

fn parse_atom_row(line_num: usize, line: &str) -> Result<Option<AtomRecord>, ExtractError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_ATOM_FIELDS {
        return Ok(None);
    }

    let parse_field = |name: &str, value: &str| -> Result<f64, ExtractError> {
        value.parse::<f64>().map_err(|_| ExtractError::Format {
            line: line_num,
            message: format!("invalid {} '{}'", name, value),
        })
    };

    let atomic_number = parse_field("atomic number", fields[1])?;
    let x = parse_field("x coordinate", fields[2])?;
    let y = parse_field("y coordinate", fields[3])?;
    let z = parse_field("z coordinate", fields[4])?;

    Ok(Some(AtomRecord::new(
        element_symbol_for_field(atomic_number),
        Point3::new(x, y, z),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_STEP_LOG: &str = "\
 PyOQP: Geometry Optimization Step    1

         Cartesian Coordinate in Angstrom
    ATOM    ZNUC       X             Y             Z
      O      8.0    0.0000000000  0.0000000000  0.1200000000
      H      1.0    0.0000000000  0.7600000000 -0.4800000000
      H      1.0    0.0000000000 -0.7600000000 -0.4800000000

 Energy: -75.98

 PyOQP: Geometry Optimization Step    2

         Cartesian Coordinate in Angstrom
    ATOM    ZNUC       X             Y             Z
      O      8.0    0.0000000000  0.0000000000  0.1174890000
      H      1.0    0.0000000000  0.7572150000 -0.4699570000
      H      1.0    0.0000000000 -0.7572150000 -0.4699570000

 Energy: -75.99
";

    #[test]
    fn extract_returns_coordinates_of_last_step() {
        let doc = extract_optimized_geometry(TWO_STEP_LOG).unwrap();

        assert_eq!(doc.comment, OPTIMIZED_GEOMETRY_COMMENT);
        assert_eq!(doc.atom_count(), 3);
        let symbols: Vec<_> = doc.atoms().iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["O", "H", "H"]);
        assert_eq!(doc.atoms()[0].position, Point3::new(0.0, 0.0, 0.117489));
        assert_eq!(doc.atoms()[1].position, Point3::new(0.0, 0.757215, -0.469957));
        assert_eq!(doc.atoms()[2].position, Point3::new(0.0, -0.757215, -0.469957));
    }

    #[test]
    fn extract_fails_without_marker() {
        let log = "SCF converged\n Cartesian Coordinate in Angstrom\n\n";
        let err = extract_optimized_geometry(log).unwrap_err();
        assert!(matches!(err, ExtractError::NotFound(_)));
    }

    #[test]
    fn extract_fails_when_last_step_has_no_coordinate_section() {
        let log = format!("{}\n PyOQP: Geometry Optimization Step    3\n Energy: -1.0\n", TWO_STEP_LOG);
        let err = extract_optimized_geometry(&log).unwrap_err();
        assert!(matches!(err, ExtractError::NotFound(_)));
    }

    #[test]
    fn extract_fails_on_empty_coordinate_table() {
        let log = " PyOQP: Geometry Optimization Step 1\n Cartesian Coordinate in Angstrom\n  labels\n\n";
        let err = extract_optimized_geometry(log).unwrap_err();
        assert!(matches!(err, ExtractError::NotFound(_)));
    }

    #[test]
    fn extract_skips_short_rows_and_stops_at_blank_line() {
        let log = "\
 PyOQP: Geometry Optimization Step 1
 Cartesian Coordinate in Angstrom
 ---------------------------------
 ---------------------------------
   C   6.0   0.0   0.0   0.0
   stray label
   O   8.0   1.2   0.0   0.0

   H   1.0   9.9   9.9   9.9
";
        let doc = extract_optimized_geometry(log).unwrap();
        assert_eq!(doc.atom_count(), 2);
        assert_eq!(doc.atoms()[0].symbol, "C");
        assert_eq!(doc.atoms()[1].symbol, "O");
        assert_eq!(doc.atoms()[1].position, Point3::new(1.2, 0.0, 0.0));
    }

    #[test]
    fn extract_maps_unknown_atomic_numbers_to_placeholder() {
        let log = "\
 PyOQP: Geometry Optimization Step 1
 Cartesian Coordinate in Angstrom
    ATOM    ZNUC       X             Y             Z
   Q   999.0   0.0   0.0   0.0
";
        let doc = extract_optimized_geometry(log).unwrap();
        assert_eq!(doc.atoms()[0].symbol, "X");
    }

    #[test]
    fn extract_reports_malformed_numeric_field() {
        let log = "\
 PyOQP: Geometry Optimization Step 1
 Cartesian Coordinate in Angstrom
    ATOM    ZNUC       X             Y             Z
   O   8.0   0.0   oops   0.0
";
        let err = extract_optimized_geometry(log).unwrap_err();
        assert!(matches!(err, ExtractError::Format { line: 4, .. }));
    }

    #[test]
    fn extract_from_path_decodes_latin1_logs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.log");
        let mut bytes = b"Run by J\xF6rg\n".to_vec();
        bytes.extend_from_slice(TWO_STEP_LOG.as_bytes());
        std::fs::write(&path, bytes).unwrap();

        let doc = extract_optimized_geometry_from_path(&path).unwrap();
        assert_eq!(doc.atom_count(), 3);
    }

    #[test]
    fn extract_from_path_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_optimized_geometry_from_path(dir.path().join("none.log")).unwrap_err();
        assert!(matches!(err, ExtractError::Io(_)));
    }
}
