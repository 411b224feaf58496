//! HTTP Range request parsing module
//!
//! Parses the single-range `bytes=<start>-<end?>` form used by media players
//! and resumable download clients.

use regex::Regex;
use std::sync::OnceLock;

/// Prefix match, trailing input after the first range is ignored
const RANGE_PATTERN: &str = r"^bytes=([0-9]+)-([0-9]*)";

static RANGE_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

/// Compiled pattern; `None` only if the constant fails to compile, which the
/// tests rule out
fn range_pattern() -> Option<&'static Regex> {
    RANGE_REGEX
        .get_or_init(|| Regex::new(RANGE_PATTERN).ok())
        .as_ref()
}

/// Inclusive byte interval within a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte position
    pub start: u64,
    /// Last byte position, always below the file size
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered
    #[inline]
    pub const fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value, e.g. `bytes 2-5/10`
    pub fn content_range(&self, file_size: u64) -> String {
        format!("bytes {}-{}/{file_size}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Satisfiable range, end already clamped to the file
    Valid(ByteRange),
    /// Well-formed but starts past the end of file or ends before it starts - 416
    NotSatisfiable,
    /// Does not match `bytes=<start>-<end?>` - 400
    Malformed,
}

/// Parse a `Range` header value against a file of `file_size` bytes
///
/// `end` defaults to the last byte and is clamped to it when the client asks
/// for more. Positions too large for `u64` behave like any other position past
/// the end of the file.
///
/// # Examples
/// ```
/// use debug_file_server::http::range::{parse_range_header, ByteRange, RangeParseResult};
///
/// let result = parse_range_header("bytes=2-5", 10);
/// assert_eq!(result, RangeParseResult::Valid(ByteRange { start: 2, end: 5 }));
///
/// let result = parse_range_header("items=0-1", 10);
/// assert_eq!(result, RangeParseResult::Malformed);
/// ```
pub fn parse_range_header(header: &str, file_size: u64) -> RangeParseResult {
    let Some(captures) = range_pattern().and_then(|re| re.captures(header)) else {
        return RangeParseResult::Malformed;
    };

    let start = captures[1].parse::<u64>().unwrap_or(u64::MAX);
    if start >= file_size {
        return RangeParseResult::NotSatisfiable;
    }

    let last = file_size - 1;
    let end = match captures.get(2).map(|m| m.as_str()) {
        Some(end) if !end.is_empty() => end.parse::<u64>().map_or(last, |e| e.min(last)),
        _ => last,
    };

    if start > end {
        return RangeParseResult::NotSatisfiable;
    }

    RangeParseResult::Valid(ByteRange { start, end })
}
