//! # deprec-scan
//!
//! Detects usage of deprecated core APIs inside plugin archives by decoding
//! class files and resolving symbolic references through each plugin's own
//! inheritance graph.
//!
//! ## Architecture
//!
//! - **classfile**: Class file decoder producing constant-pool-resolved
//!   class metadata, declared members and bytecode reference sites
//! - **catalog**: Signature keys and the deprecated-API catalog built from a
//!   core archive
//! - **hierarchy**: Per-artifact direct-parent index, platform types pruned
//! - **resolve**: Reference-to-catalog matching with recursive ancestor walk
//! - **usage**: Artifact identity and the per-artifact usage record
//! - **archive**: Restartable class-entry streaming out of zip containers,
//!   including one level of nested jars
//! - **analyze**: Two-pass per-artifact orchestration and the parallel
//!   artifact fan-out
//! - **scan**: Plugin archive discovery and identity derivation
//! - **report**: By-plugin / by-API / unused-API report assembly
//! - **config**: Per-run engine configuration (namespace filter, deny list,
//!   ignore list, recursion bound)
//! - **error**: Artifact-local error kinds

pub mod analyze;
pub mod archive;
pub mod catalog;
pub mod classfile;
pub mod cli;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod report;
pub mod resolve;
pub mod scan;
pub mod usage;
