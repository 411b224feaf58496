//! HTTP protocol layer module
//!
//! Range parsing, content type detection and response builders, kept free of
//! request routing.

pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use range::{parse_range_header, ByteRange, RangeParseResult};
pub use response::{build_error_response, build_file_response, build_probe_response, ServeBody};
