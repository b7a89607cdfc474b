//! Storage module: turning CSV export text into grids

mod csv;

pub use csv::{CsvDialect, read_grid, split_rows};
