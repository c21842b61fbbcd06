use super::*;
use toml::{Table, Value};

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

pub fn parse_file<P: AsRef<Path>>(conf: P) -> Result<Config, Error> {
    let mut toml = String::new();
    {
        let mut f = File::open(conf)?;
        f.read_to_string(&mut toml)?;
    }

    parse_str(&toml)
}

pub fn parse_str(toml: &str) -> Result<Config, Error> {
    match toml.parse::<Table>() {
        Ok(table) => config_from_table(&table),
        Err(e) => Err(Error::Parse(vec![message_from_error(toml, &e)]))
    }
}

/// Walks a dotted key like `"listen.port"` down through nested tables
fn lookup<'a>(table: &'a Table, key: &str) -> Option<&'a Value> {
    let mut parts = key.split('.');
    let mut current = table.get(parts.next()?)?;

    for part in parts {
        current = current.as_table()?.get(part)?;
    }

    Some(current)
}

fn port(table: &Table, key: &str) -> Result<Option<u16>, Error> {
    match lookup(table, key) {
        Some(&Value::Integer(p)) if p <= u16::MAX as i64 && p > 0 =>
            Ok(Some(p as u16)),
        Some(&Value::Integer(p)) => Err(Error::Validation(
            format!("The port {} given for {} is out of range", p, key)
        )),
        Some(val) => Err(Error::Validation(
            format!("Expected {} to be an integer, got a {}",
                    key, val.type_str())
        )),
        None => Ok(None)
    }
}

fn count(table: &Table, key: &str) -> Result<Option<u64>, Error> {
    match lookup(table, key) {
        Some(&Value::Integer(n)) if n >= 0 => Ok(Some(n as u64)),
        Some(&Value::Integer(n)) => Err(Error::Validation(
            format!("Expected {} to be non-negative, got {}", key, n)
        )),
        Some(val) => Err(Error::Validation(
            format!("Expected {} to be an integer, got a {}",
                    key, val.type_str())
        )),
        None => Ok(None)
    }
}

fn string(table: &Table, key: &str) -> Result<Option<String>, Error> {
    match lookup(table, key) {
        Some(&Value::String(ref s)) if !s.is_empty() => Ok(Some(s.clone())),
        Some(&Value::String(_)) => Err(Error::Validation(
            format!("Expected {} to be a non-empty string", key)
        )),
        Some(val) => Err(Error::Validation(
            format!("Expected {} to be a string, got a {}",
                    key, val.type_str())
        )),
        None => Ok(None)
    }
}

fn boolean(table: &Table, key: &str) -> Result<Option<bool>, Error> {
    match lookup(table, key) {
        Some(&Value::Boolean(b)) => Ok(Some(b)),
        Some(val) => Err(Error::Validation(
            format!("Expected {} to be a boolean, got a {}",
                    key, val.type_str())
        )),
        None => Ok(None)
    }
}

fn config_from_table(table: &Table) -> Result<Config, Error> {
    let mut config: Config = Default::default();

    if let Some(p) = port(table, "listen.port")? {
        config.port = p;
    }

    if let Some(c) = boolean(table, "listen.concurrent")? {
        config.concurrent = c;
    }

    match count(table, "listen.timeout_secs")? {
        Some(0) | None => (),
        Some(secs) => config.timeout = Some(Duration::from_secs(secs))
    }

    if let Some(path) = string(table, "static.webroot")? {
        config.stat.webroot = PathBuf::from(path);
    }

    if let Some(doc) = string(table, "static.default_document")? {
        if doc.contains('/') {
            return Err(Error::Validation(
                format!("The default document {:?} must be a bare file name",
                        doc)
            ));
        }
        config.stat.default_document = doc;
    }

    if let Some(marker) = string(table, "cgi.marker")? {
        config.cgi.marker = marker;
    }

    if let Some(var) = string(table, "cgi.query_variable")? {
        if var.contains('=') {
            return Err(Error::Validation(
                format!("The query variable {:?} can't contain '='", var)
            ));
        }
        config.cgi.query_variable = var;
    }

    if let Some(n) = count(table, "limits.max_line")? {
        // Has to fit at least "GET / HTTP/1.0\r\n"
        if n < 16 {
            return Err(Error::Validation(
                format!("limits.max_line of {} is too small", n)
            ));
        }
        config.limits.max_line = n as usize;
    }

    if let Some(n) = count(table, "limits.max_headers")? {
        config.limits.max_headers = n as usize;
    }

    if let Some(n) = count(table, "limits.max_body")? {
        config.limits.max_body = n;
    }

    if let Some(name) = string(table, "server.name")? {
        config.server_name = name;
    }

    Ok(config)
}

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Parse(Vec<ErrorMessage>),
    Validation(String)
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::Io(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref e) => write!(f, "{}", e),
            Error::Parse(ref errors) => {
                for error in errors {
                    write!(f, "line {} column {}: {}",
                           error.line, error.column, error.desc)?;
                }
                Ok(())
            },
            Error::Validation(ref message) => f.write_str(message)
        }
    }
}

/// An owned, rendered version of a TOML parse error
#[derive(Debug, Clone)]
pub struct ErrorMessage {
    pub desc: String,
    pub line: usize,
    pub column: usize
}

/// Convert a `toml::de::Error` into an `ErrorMessage`, with 1-based positions
fn message_from_error(source: &str, error: &toml::de::Error) -> ErrorMessage {
    let offset = error.span().map(|span| span.start).unwrap_or(0);
    let before = &source[.. offset.min(source.len())];

    let line = before.matches('\n').count() + 1;
    let column = before.len() - before.rfind('\n').map(|i| i + 1).unwrap_or(0)
        + 1;

    ErrorMessage {
        desc: error.message().to_owned(),
        line: line,
        column: column
    }
}
