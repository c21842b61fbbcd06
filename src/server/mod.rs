//! Server functionality
//!
//! One connection is one transaction: read the request line, skip the
//! headers, work out which file the target names, check it, and answer with
//! the file, a CGI program's output, or an error page. The connection is
//! closed afterwards no matter what.

mod content_type;
mod error_messages;
mod resolver;
mod static_files;

#[cfg(test)]
pub mod test_util;

use crate::cgi::{self, Invocation, Invoker, ProcessInvoker};
use crate::config::{Config, Limits};
use crate::errors::{Error, Result};
use crate::filesystem::FileMetadata;
use crate::log_util::{ascii_escape, escape_line};
use crate::server::error_messages::*;
use crate::server::resolver::{resolve, Classification};

use std::fs;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::os::fd::OwnedFd;
use std::os::unix::net::UnixStream;
use std::process::Stdio;
use std::sync::Arc;
use std::thread;

/// Binds the configured port and serves the webroot until killed.
///
/// Connections are handled one at a time unless `config.concurrent` is set,
/// in which case each gets its own thread. Either way a failed transaction
/// is logged and the loop moves on.
pub fn serve(config: Config) -> Result<()> {
    if !fs::metadata(&config.stat.webroot)?.is_dir() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("webroot {} is not a directory",
                    config.stat.webroot.display()))));
    }

    let listener = TcpListener::bind(("0.0.0.0", config.port))?;
    info!("Serving {} on port {}", config.stat.webroot.display(), config.port);

    let config = Arc::new(config);

    for stream in listener.incoming() {
        let stream = match stream {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed connection: {}", e);
                continue;
            }
        };

        if let Err(e) = stream.set_read_timeout(config.timeout)
            .and_then(|_| stream.set_write_timeout(config.timeout)) {
            warn!("Couldn't set connection timeouts: {}", e);
            continue;
        }

        if config.concurrent {
            let config = config.clone();
            let spawned = thread::Builder::new()
                .name(String::from("transaction"))
                .spawn(move || transaction(stream, &config));

            if let Err(e) = spawned {
                error!("Couldn't start a thread for a connection: {}", e);
            }
        }
        else {
            transaction(stream, &config);
        }
    }

    Ok(())
}

/// Runs one transaction and logs how it went.
fn transaction(stream: TcpStream, config: &Config) {
    let peer = match stream.peer_addr() {
        Ok(addr) => addr.to_string(),
        Err(_) => String::from("unknown peer")
    };
    info!("Accepted connection from {}", peer);

    match handle_client(stream, config, &ProcessInvoker) {
        Ok(status) => info!("{}: {} {}", peer, status.code, status.reason),
        Err(Error::ConnectionClosed) =>
            debug!("{} closed without sending a request", peer),
        Err(e) => warn!("Error serving {}: {}", peer, e)
    }
}

/// Values which can carry a transaction
///
/// Besides reading and writing, a connection must be able to hand a copy of
/// itself to a child process as its standard output.
pub trait Connection: Read + Write + Sized {
    fn try_clone(&self) -> io::Result<Self>;

    fn child_stdout(&self) -> io::Result<Stdio>;
}

macro_rules! socket_connection {
    ($socket:ty) => {
        impl Connection for $socket {
            fn try_clone(&self) -> io::Result<Self> {
                <$socket>::try_clone(self)
            }

            fn child_stdout(&self) -> io::Result<Stdio> {
                let fd: OwnedFd = <$socket>::try_clone(self)?.into();
                Ok(Stdio::from(fd))
            }
        }
    }
}

socket_connection!(TcpStream);
socket_connection!(UnixStream);

/// Serves exactly one request on `conn`.
///
/// Returns the status sent. Errors come back only when no response could be
/// sent at all, or when the connection already carries a partial one.
///
/// Error pages for a bad request line, too many headers or an unsupported
/// method go out without draining the rest of the request. Over TCP, closing
/// with unread input sends a reset, so a client that sent more than a buffer
/// beyond what was read may lose the page.
pub fn handle_client<C, I>(mut conn: C, config: &Config, invoker: &I)
                           -> Result<Status>
    where C: Connection, I: Invoker + ?Sized
{
    let server_name = config.server_name.as_str();
    let mut reader = BufReader::new(conn.try_clone()?);

    let request = match Request::read(&mut reader, &config.limits) {
        Ok(r) => r,
        Err(e @ Error::Io(_)) | Err(e @ Error::ConnectionClosed) =>
            return Err(e),
        Err(e) => return send(&mut conn, error_400(&e.to_string(), server_name))
    };

    info!("{} {} {}", request.method, request.target, request.version);

    if !request.method.eq_ignore_ascii_case("GET") {
        return send(&mut conn, error_501(&request.method, server_name));
    }

    match skip_headers(&mut reader, &config.limits) {
        Ok(()) => (),
        Err(e @ Error::Io(_)) => return Err(e),
        Err(e) => return send(&mut conn, error_400(&e.to_string(), server_name))
    }

    let resource = resolve(&request.target, config);
    let cause = resource.path.to_string_lossy().into_owned();
    let forbidden: fn(&str, &str) -> Response =
        match resource.classification {
            Classification::Static => error_403_static,
            Classification::Dynamic => error_403_dynamic
        };

    if resource.escapes_root() {
        return send(&mut conn, forbidden(&cause, server_name));
    }

    let meta = match FileMetadata::query(&resource.path) {
        Ok(m) => m,
        Err(e) => {
            debug!("stat {}: {}", cause, e);
            return send(&mut conn, error_404(&cause, server_name));
        }
    };

    match resource.classification {
        Classification::Static => {
            if !meta.is_regular || !meta.owner_readable() {
                return send(&mut conn, forbidden(&cause, server_name));
            }

            match static_files::serve_file(&resource.path, meta.size,
                                           config.limits.max_body,
                                           server_name) {
                Ok(res) => send(&mut conn, res),
                Err(e) => {
                    error!("Couldn't serve {}: {}", cause, e);
                    send(&mut conn, error_500(&cause, server_name))
                }
            }
        },
        Classification::Dynamic => {
            if !meta.is_regular || !meta.owner_executable() {
                return send(&mut conn, forbidden(&cause, server_name));
            }

            let invocation = Invocation {
                program: &resource.path,
                query_variable: &config.cgi.query_variable,
                query: &resource.args
            };

            cgi::serve_dynamic(&mut conn, invoker, &invocation, server_name)?;
            Ok(Status::OK)
        }
    }
}

fn send<W: Write>(conn: &mut W, res: Response) -> Result<Status> {
    res.write_to(conn)?;
    Ok(res.status())
}

/// A parsed request line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub target: String,
    /// Kept for logging; never checked
    pub version: String
}

impl Request {
    /// Reads and parses the request line, and nothing more.
    pub fn read<R: BufRead>(reader: &mut R, limits: &Limits) -> Result<Request> {
        let line = read_line(reader, limits.max_line)?;
        if line.is_empty() {
            return Err(Error::ConnectionClosed);
        }

        Request::parse(&line)
    }

    /// Splits a request line on whitespace into method, target and version.
    ///
    /// Anything past the third field is ignored.
    pub fn parse(line: &[u8]) -> Result<Request> {
        let line = std::str::from_utf8(line)
            .map_err(|_| Error::MalformedRequestLine)?;
        let mut fields = line.split_whitespace();

        match (fields.next(), fields.next(), fields.next()) {
            (Some(method), Some(target), Some(version)) => Ok(Request {
                method: String::from(method),
                target: String::from(target),
                version: String::from(version)
            }),
            _ => Err(Error::MalformedRequestLine)
        }
    }
}

/// Reads header lines up to and including the blank line, and drops them.
///
/// The end of the stream also ends the header block.
fn skip_headers<R: BufRead>(reader: &mut R, limits: &Limits) -> Result<()> {
    let mut block = Vec::new();
    let mut count = 0;

    loop {
        let line = read_line(reader, limits.max_line)?;
        if line.is_empty() || line == b"\r\n" || line == b"\n" {
            break;
        }

        count += 1;
        if count > limits.max_headers {
            return Err(Error::TooManyHeaders);
        }

        if log_enabled!(log::Level::Debug) {
            block.extend_from_slice(&line);
        }
    }

    if !block.is_empty() {
        log_headers(&block, count);
    }

    Ok(())
}

/// Logs a header block at debug level. Unparseable blocks are logged raw.
fn log_headers(block: &[u8], count: usize) {
    let mut block = block.to_vec();
    block.extend_from_slice(b"\r\n");

    let mut headers = vec![httparse::EMPTY_HEADER; count];
    match httparse::parse_headers(&block, &mut headers) {
        Ok(httparse::Status::Complete((_, parsed))) => {
            for header in parsed {
                debug!("  {}: {}", header.name, ascii_escape(header.value));
            }
        },
        Ok(httparse::Status::Partial) | Err(_) => {
            for line in block.split(|&b| b == b'\n').filter(|l| l.len() > 1) {
                debug!("  {}", escape_line(line));
            }
        }
    }
}

/// Reads one line, terminator included. Empty means end of stream.
fn read_line<R: BufRead>(reader: &mut R, max: usize) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    reader.by_ref().take(max as u64).read_until(b'\n', &mut line)?;

    if line.len() == max && !line.ends_with(b"\n") {
        return Err(Error::LineTooLong);
    }

    Ok(line)
}

/// A response status code and reason phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub code: u16,
    pub reason: &'static str
}

impl Status {
    pub const OK: Status = Status { code: 200, reason: "OK" };
    pub const BAD_REQUEST: Status = Status { code: 400, reason: "Bad request" };
    pub const FORBIDDEN: Status = Status { code: 403, reason: "Forbidden" };
    pub const NOT_FOUND: Status = Status { code: 404, reason: "Not found" };
    pub const INTERNAL_ERROR: Status =
        Status { code: 500, reason: "Internal error" };
    pub const NOT_IMPLEMENTED: Status =
        Status { code: 501, reason: "Not implemented" };
}

/// An ordered list of HTTP headers
///
/// Names keep the case they were inserted with and go out in insertion
/// order. Lookups ignore case.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    entries: Vec<(String, String)>
}

impl Headers {
    pub fn new() -> Headers {
        Headers { entries: Vec::new() }
    }

    /// Sets `name`, replacing any existing value in place.
    pub fn insert(&mut self, name: &str, value: &str) {
        match self.entries.iter_mut()
            .find(|entry| entry.0.eq_ignore_ascii_case(name)) {
            Some(entry) => entry.1 = String::from(value),
            None => self.entries.push((String::from(name), String::from(value)))
        }
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter()
            .find(|&&(ref n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, ref v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|&(ref n, ref v)| (n.as_str(), v.as_str()))
    }
}

/// A response built in memory before any of it is sent
#[derive(Debug, Clone)]
pub struct Response {
    status: Status,
    headers: Headers,
    body: Vec<u8>
}

impl Response {
    /// A body-less response carrying only a `Server` header
    pub fn new(status: Status, server_name: &str) -> Response {
        let mut headers = Headers::new();
        headers.insert("Server", server_name);

        Response {
            status: status,
            headers: headers,
            body: Vec::new()
        }
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    #[cfg(test)]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    #[inline]
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    #[cfg(test)]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Sets the body along with a matching `Content-length`.
    pub fn set_body(&mut self, body: Vec<u8>) {
        self.headers.insert("Content-length", &body.len().to_string());
        self.body = body;
    }

    fn head(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.0 {} {}\r\n",
                               self.status.code, self.status.reason);
        for (name, value) in self.headers.iter() {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.into_bytes()
    }

    /// Writes the status line and headers, but not the blank line after them.
    pub fn write_prefix<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        sink.write_all(&self.head())
    }

    /// Writes the whole response in one go.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        let mut out = self.head();
        out.reserve(2 + self.body.len());
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);

        sink.write_all(&out)?;
        sink.flush()
    }
}
