//! MIME type detection module
//!
//! Guesses the `Content-Type` of a served file from its extension.

use std::path::Path;

/// Served when the extension is missing or unknown
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Get MIME Content-Type for a file path
///
/// Extensions compare case-insensitively.
///
/// # Examples
/// ```
/// use debug_file_server::http::mime::content_type_for;
/// use std::path::Path;
///
/// assert_eq!(content_type_for(Path::new("clip.MP4")), "video/mp4");
/// assert_eq!(content_type_for(Path::new("blob")), "application/octet-stream");
/// ```
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    get_content_type(extension.as_deref())
}

/// Get MIME Content-Type based on a lowercase file extension
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        // Text
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("txt" | "log" | "md") => "text/plain",
        Some("csv") => "text/csv",
        Some("xml") => "application/xml",
        Some("js" | "mjs") => "text/javascript",
        Some("json") => "application/json",
        Some("wasm") => "application/wasm",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/vnd.microsoft.icon",
        Some("webp") => "image/webp",

        // Video and streaming playlists
        Some("mp4" | "m4v") => "video/mp4",
        Some("webm") => "video/webm",
        Some("ogv") => "video/ogg",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("flv") => "video/x-flv",
        Some("ts") => "video/mp2t",
        Some("m3u8") => "application/vnd.apple.mpegurl",
        Some("mpd") => "application/dash+xml",

        // Audio
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/x-wav",
        Some("flac") => "audio/flac",
        Some("m4a") => "audio/mp4",
        Some("ogg" | "oga") => "audio/ogg",
        Some("aac") => "audio/aac",

        // Archives, documents and installers
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz" | "tgz") => "application/gzip",
        Some("tar") => "application/x-tar",
        Some("7z") => "application/x-7z-compressed",
        Some("exe" | "dll" | "msi") => "application/x-msdownload",
        Some("dmg") => "application/x-apple-diskimage",

        _ => FALLBACK_CONTENT_TYPE,
    }
}
