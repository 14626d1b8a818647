use super::traits::{TextFormat, TextFormatWriter};
use crate::core::models::atom::AtomRecord;
use crate::core::models::geometry::GeometryDocument;
use nalgebra::Point3;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: XyzParseErrorKind },
    #[error("Header declares {declared} atoms but {found} atom lines were found")]
    CountMismatch { declared: usize, found: usize },
}

#[derive(Debug, Error)]
pub enum XyzParseErrorKind {
    #[error("Missing atom count header")]
    MissingCount,
    #[error("Invalid atom count '{0}'")]
    InvalidCount(String),
    #[error("Atom line needs a symbol and three coordinates")]
    TooFewFields,
    #[error("Invalid {axis} coordinate '{value}'")]
    InvalidCoordinate { axis: char, value: String },
}

/// The XYZ coordinate format: atom count, comment line, then `symbol x y z` per atom.
///
/// Written coordinates use six decimal places right-aligned to width 10, and the symbol
/// is left-aligned to width 2. Lines are joined with `\n` without a trailing newline.
pub struct XyzFile;

impl TextFormat for XyzFile {
    type Document = GeometryDocument;
    type Error = XyzError;

    fn parse(text: &str) -> Result<Self::Document, Self::Error> {
        let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));

        let (count_line, count_str) = lines.next().ok_or(XyzError::Parse {
            line: 1,
            kind: XyzParseErrorKind::MissingCount,
        })?;
        let count_str = count_str.trim();
        if count_str.is_empty() {
            return Err(XyzError::Parse {
                line: count_line,
                kind: XyzParseErrorKind::MissingCount,
            });
        }
        let declared: usize = count_str.parse().map_err(|_| XyzError::Parse {
            line: count_line,
            kind: XyzParseErrorKind::InvalidCount(count_str.into()),
        })?;

        let comment = lines.next().map(|(_, l)| l.trim()).unwrap_or("");
        let mut document = GeometryDocument::new(comment, Vec::with_capacity(declared));

        for (line_num, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            if document.atom_count() == declared {
                return Err(XyzError::CountMismatch {
                    declared,
                    found: declared + 1,
                });
            }
            document.push(parse_atom_line(line_num, line)?);
        }

        if document.atom_count() != declared {
            return Err(XyzError::CountMismatch {
                declared,
                found: document.atom_count(),
            });
        }
        Ok(document)
    }
}

impl TextFormatWriter for XyzFile {
    fn write_to(document: &Self::Document, writer: &mut impl Write) -> Result<(), Self::Error> {
        write!(writer, "{}\n{}", document.atom_count(), document.comment)?;
        for atom in document.atoms() {
            write!(
                writer,
                "\n{:<2} {:>10.6} {:>10.6} {:>10.6}",
                atom.symbol, atom.position.x, atom.position.y, atom.position.z
            )?;
        }
        Ok(())
    }
}

fn parse_atom_line(line_num: usize, line: &str) -> Result<AtomRecord, XyzError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(XyzError::Parse {
            line: line_num,
            kind: XyzParseErrorKind::TooFewFields,
        });
    }

    let mut coords = [0.0; 3];
    let axes = ['x', 'y', 'z'];
    for (i, value) in fields[1..4].iter().enumerate() {
        let axis = axes[i];
        coords[i] = value.parse().map_err(|_| XyzError::Parse {
            line: line_num,
            kind: XyzParseErrorKind::InvalidCoordinate {
                axis,
                value: value.to_string(),
            },
        })?;
    }

    Ok(AtomRecord::new(
        fields[0],
        Point3::new(coords[0], coords[1], coords[2]),
    ))
}
