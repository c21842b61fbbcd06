//! Guessing a media type from a file name

use mime::{self, Mime};

use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Checked in order; the first suffix that matches wins.
const SUFFIXES: &[(&str, &str)] = &[
    (".html", "text/html"),
    (".gif", "image/gif"),
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".mp4", "video/mp4")
];

/// The media type for `path`, falling back to `text/plain`
pub fn infer(path: &Path) -> Mime {
    let name = path.as_os_str().as_bytes();

    SUFFIXES.iter()
        .find(|&&(suffix, _)| name.ends_with(suffix.as_bytes()))
        .and_then(|&(_, media_type)| media_type.parse().ok())
        .unwrap_or(mime::TEXT_PLAIN)
}
