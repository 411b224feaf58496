//! Static file serving module
//!
//! Resolves a request path to a file in the root directory by base name and
//! streams the whole file or the requested byte range.

use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::router::RequestContext;
use crate::http::response::{self, ServeBody};
use crate::http::{mime, parse_range_header, ByteRange, RangeParseResult};
use hyper::Response;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncSeekExt;

/// Serve a file from the root directory
pub async fn serve_file(
    ctx: &RequestContext<'_>,
    state: &AppState,
) -> Result<Response<ServeBody>, ServeError> {
    let not_found = || ServeError::NotFound(ctx.path.to_string());

    let file_path = resolve_path(&state.root_dir, ctx.path).ok_or_else(not_found)?;
    let file_size = match fs::metadata(&file_path).await {
        Ok(metadata) if metadata.is_file() => metadata.len(),
        _ => return Err(not_found()),
    };

    let range = match ctx.range_header {
        None => None,
        Some(header) => Some(select_range(header, file_size)?),
    };

    let (start, content_length) =
        range.map_or((0, file_size), |r| (r.start, r.content_length()));

    let body = if ctx.is_head {
        response::empty_body()
    } else {
        open_span(&file_path, start, content_length).await?
    };

    Ok(response::build_file_response(
        body,
        mime::content_type_for(&file_path),
        content_length,
        range.map(|r| (r, file_size)),
    ))
}

/// Join the base name of `request_path` to `root`
///
/// Directory components are discarded so nothing outside `root` and nothing
/// in its subdirectories can be named. Empty names, `.` and `..` resolve to
/// nothing.
pub fn resolve_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let base_name = request_path.rsplit(['/', '\\']).next()?;
    let file_name = Path::new(base_name).file_name()?;
    Some(root.join(file_name))
}

fn select_range(header: &str, file_size: u64) -> Result<ByteRange, ServeError> {
    match parse_range_header(header, file_size) {
        RangeParseResult::Valid(range) => Ok(range),
        RangeParseResult::NotSatisfiable => Err(ServeError::RangeNotSatisfiable { file_size }),
        RangeParseResult::Malformed => Err(ServeError::BadRequest(header.to_string())),
    }
}

/// Open the file positioned at `start`, limited to `length` bytes
async fn open_span(path: &Path, start: u64, length: u64) -> Result<ServeBody, ServeError> {
    let mut file = File::open(path).await?;
    if start > 0 {
        file.seek(SeekFrom::Start(start)).await?;
    }
    Ok(response::file_body(file, length))
}
