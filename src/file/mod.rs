//! File I/O operations for YAML documents.
//!
//! This module provides functionality to load YAML files from disk or stdin,
//! with transparent gzip decompression.

pub mod loader;
