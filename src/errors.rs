//! Error handling for the http server

use std::error;
use std::fmt;
use std::io;

/// A Result for internal operations.
pub type Result<T> = ::std::result::Result<T, Error>;

/// All errors which might arise within a transaction
#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    /// The request line or a header line ran past the configured limit
    LineTooLong,
    /// More header lines than the configured limit
    TooManyHeaders,
    /// The request line didn't split into method, target and version
    MalformedRequestLine,
    /// The client hung up before sending a request line
    ConnectionClosed,
    /// A static file exceeded the in-memory body limit
    FileTooLarge(u64),
    /// The CGI program couldn't be started
    Spawn(io::Error)
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::Io(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref e) => write!(f, "I/O error: {}", e),
            Error::LineTooLong => f.write_str("request or header line too long"),
            Error::TooManyHeaders => f.write_str("too many header lines"),
            Error::MalformedRequestLine => f.write_str("malformed request line"),
            Error::ConnectionClosed =>
                f.write_str("connection closed before a request was sent"),
            Error::FileTooLarge(size) =>
                write!(f, "file of {} bytes exceeds the body limit", size),
            Error::Spawn(ref e) => write!(f, "couldn't start CGI program: {}", e)
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref e) | Error::Spawn(ref e) => Some(e),
            _ => None
        }
    }
}

#[test]
fn io_errors_convert() {
    let e = Error::from(io::Error::new(io::ErrorKind::Other, "boom"));
    match e {
        Error::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::Other),
        other => panic!("{:?}", other)
    }
}

#[test]
fn display_names_the_size() {
    assert_eq!(format!("{}", Error::FileTooLarge(12)),
               "file of 12 bytes exceeds the body limit");
}
