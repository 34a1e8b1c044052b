//! Shared helpers: mailto parsing, CSV table I/O, and URL handling.

pub mod mailto;
pub mod table;
pub mod urls;
