use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// Decodes bytes as UTF-8, falling back to ISO-8859-1 when the input is not valid UTF-8.
///
/// Every byte sequence is valid Latin-1, so decoding never fails. The fallback is applied
/// to the whole input, never mixed per line.
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            debug!(
                "Input is not valid UTF-8 (at byte {}); decoding as Latin-1.",
                err.utf8_error().valid_up_to()
            );
            err.into_bytes().into_iter().map(char::from).collect()
        }
    }
}

/// Reads a reader to the end and decodes it with [`decode_text`].
pub fn read_text(reader: &mut impl Read) -> io::Result<String> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(decode_text(bytes))
}

/// Reads a whole file and decodes it with [`decode_text`].
pub fn read_text_file<P: AsRef<Path>>(path: P) -> io::Result<String> {
    fs::read(path).map(decode_text)
}

/// Removes a trailing `\n` or `\r\n` from a line read with `read_until`.
pub fn strip_line_ending(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}
