use super::text;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Defines the interface for reading a text document format.
///
/// Implementors only provide [`TextFormat::parse`]; reading from a reader or a path goes
/// through the shared decoding policy in [`super::text`], so every format recovers from
/// Latin-1 encoded input the same way.
pub trait TextFormat {
    /// The document produced by parsing.
    type Document;

    /// The error type for parsing and I/O operations.
    type Error: Error + From<io::Error>;

    /// Parses a document from already decoded text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is structurally malformed for this format.
    fn parse(text: &str) -> Result<Self::Document, Self::Error>;

    /// Reads and parses a document from a reader.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the content cannot be parsed.
    fn read_from(reader: &mut impl Read) -> Result<Self::Document, Self::Error> {
        let content = text::read_text(reader)?;
        Self::parse(&content)
    }

    /// Reads and parses a document from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self::Document, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}

/// Defines the interface for writing a text document format.
pub trait TextFormatWriter: TextFormat {
    /// Writes a document to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(document: &Self::Document, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Renders a document to a string.
    fn to_string(document: &Self::Document) -> Result<String, Self::Error> {
        let mut buffer = Vec::new();
        Self::write_to(document, &mut buffer)?;
        Ok(text::decode_text(buffer))
    }

    /// Writes a document to a file path, creating or truncating the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        document: &Self::Document,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(document, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
