//! Core library for the cellmerge command line application.
//!
//! The library merges many single-record spreadsheets into one table, driven by
//! a named header → cell mapping. Mapping records are persisted by
//! [`cellmerge::tools::mapping`], spreadsheet IO adapters live under
//! [`cellmerge::tools::io`], data representations inside
//! [`cellmerge::tools::model`], and the extraction/merge orchestration under
//! [`cellmerge::tools::merge`].

pub mod cellmerge;

pub use cellmerge::tools::{
    Result, ToolError, address, error, io, logging, mapping, merge, model,
};
