//! Handlers for static file service

use super::{Response, Status};
use super::content_type;
use crate::errors::*;

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Reads all of `path` into a ready-to-send 200 response.
///
/// `size` is what `stat` reported; the file is read in one go and the body
/// length comes from the bytes actually read, so a file that changes size
/// between the stat and the read still gets an honest `Content-length`.
/// Nothing is written to the client here: a failed read leaves the caller
/// free to send an error page instead.
pub fn serve_file(path: &Path, size: u64, max_body: u64, server_name: &str)
                  -> Result<Response> {
    if size > max_body {
        return Err(Error::FileTooLarge(size));
    }

    let body = {
        let file = File::open(path)?;
        let mut body = Vec::with_capacity(size as usize);

        // One byte past the limit tells us the file grew too far.
        file.take(max_body.saturating_add(1)).read_to_end(&mut body)?;
        body
    };

    if body.len() as u64 > max_body {
        return Err(Error::FileTooLarge(body.len() as u64));
    }

    if body.len() as u64 != size {
        debug!("{} changed size from {} to {} bytes while being served",
               path.display(), size, body.len());
    }

    let mut res = Response::new(Status::OK, server_name);
    res.headers_mut().insert("Connection", "close");
    res.set_body(body);
    res.headers_mut().insert("Content-type",
                             &content_type::infer(path).to_string());
    Ok(res)
}
