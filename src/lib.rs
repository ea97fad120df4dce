//! ypath - path queries over YAML documents.
//!
//! The [`ypath`] module holds the path language: lexer, precedence parser,
//! expression trees and the executor. [`document`] provides the YAML tree the
//! queries walk, [`file`] loads documents from disk or stdin and [`config`]
//! holds user settings for the command line tool.

pub mod config;
pub mod document;
pub mod file;
pub mod ypath;
