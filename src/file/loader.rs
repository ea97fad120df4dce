//! YAML file loading functionality.
//!
//! This module provides functions to load YAML documents from files or stdin,
//! parsing them into [`Document`] trees that path queries can walk. Gzipped
//! input is detected by a `.gz` extension for files and by the gzip magic
//! bytes for stdin.

use crate::document::tree::Document;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Loads and parses a YAML file from the filesystem.
///
/// Only the first document of a multi-document stream is loaded.
///
/// # Examples
///
/// ```no_run
/// use ypath::file::loader::load_yaml_file;
///
/// let doc = load_yaml_file("config.yaml").unwrap();
/// let found = ypath::ypath::query(&doc, "/server/port").unwrap();
/// ```
///
/// # Errors
///
/// This function will return an error if:
/// - The file path does not exist
/// - The file cannot be read (permissions, etc.)
/// - A `.gz` file is not valid gzip
/// - The file contents are not valid YAML
pub fn load_yaml_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path_ref = path.as_ref();

    // Check if file is gzipped
    let is_gzipped = path_ref
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    // Read content (decompress if needed)
    let content = if is_gzipped {
        read_gzipped_file(path_ref)?
    } else {
        fs::read_to_string(path_ref)
            .with_context(|| format!("Failed to read file {}", path_ref.display()))?
    };

    log::debug!("loaded {} bytes from {}", content.len(), path_ref.display());
    parse_yaml_content(&content)
}

/// Loads and parses YAML from standard input.
///
/// This function reads from stdin until EOF. Gzip-compressed input is
/// decompressed transparently.
///
/// # Examples
///
/// ```no_run
/// use ypath::file::loader::load_yaml_from_stdin;
///
/// // Usage: cat config.yaml | ypath /server/port
/// let doc = load_yaml_from_stdin().unwrap();
/// ```
///
/// # Errors
///
/// This function will return an error if:
/// - Reading from stdin fails
/// - The input is not valid UTF-8 or not valid YAML
pub fn load_yaml_from_stdin() -> Result<Document> {
    use std::io::{self, Read};

    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .context("Failed to read from stdin")?;

    let content = decode_input(buffer)?;
    parse_yaml_content(&content).context("Failed to parse YAML from stdin")
}

/// Parses YAML text into a document.
pub fn parse_yaml_content(content: &str) -> Result<Document> {
    Document::parse_str(content).context("Failed to parse YAML")
}

/// Turns raw input bytes into text, decompressing gzip data (magic bytes
/// `0x1f 0x8b`).
pub fn decode_input(bytes: Vec<u8>) -> Result<String> {
    if bytes.starts_with(&[0x1f, 0x8b]) {
        decompress_gzip_bytes(&bytes)
    } else {
        String::from_utf8(bytes).context("Invalid UTF-8 in input")
    }
}

/// Reads and decompresses a gzipped file.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be opened
/// - The file is not valid gzip format (corrupted)
/// - The decompressed content is not valid UTF-8
fn read_gzipped_file<P: AsRef<Path>>(path: P) -> Result<String> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let file = fs::File::open(path).context("Failed to open gzipped file")?;
    let mut decoder = GzDecoder::new(file);
    let mut content = String::new();
    decoder
        .read_to_string(&mut content)
        .context("Failed to decompress gzipped file - file may be corrupted")?;
    Ok(content)
}

/// Decompresses gzip-encoded bytes to a UTF-8 string.
fn decompress_gzip_bytes(bytes: &[u8]) -> Result<String> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let mut decoder = GzDecoder::new(bytes);
    let mut content = String::new();
    decoder
        .read_to_string(&mut content)
        .context("Failed to decompress gzipped input")?;
    Ok(content)
}
