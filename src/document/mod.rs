//! YAML document model.
//!
//! This module holds the read-only tree that path expressions are evaluated
//! against: an arena of scalar, sequence, mapping and alias nodes with parent
//! links and an anchor registry, the yaml-rust2 based loader that builds it,
//! and conversions used to print matched nodes.

pub mod emit;
pub mod node;
pub mod parser;
pub mod tree;
