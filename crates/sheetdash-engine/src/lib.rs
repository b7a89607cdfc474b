//! sheetdash_engine - A1 range resolution and single-cell extraction over CSV grids.
//!
//! Everything here is pure and total: malformed references and missing cells
//! degrade to `0` instead of failing.

pub mod engine;
