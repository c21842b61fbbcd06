pub mod parser;

use std::path::PathBuf;
use std::time::Duration;

/// A holder for app configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Port number to listen on
    pub port: u16,
    /// Run each connection on its own thread instead of one at a time
    pub concurrent: bool,
    /// Read and write timeout applied to client connections
    pub timeout: Option<Duration>,
    pub stat: StaticFilesConfig,
    pub cgi: CgiConfig,
    pub limits: Limits,
    /// Goes in the `Server` header and the error page signature
    pub server_name: String
}

impl Default for Config {
    fn default() -> Config {
        Config {
            port: 8000,
            concurrent: false,
            timeout: None,
            stat: Default::default(),
            cgi: Default::default(),
            limits: Default::default(),
            server_name: String::from("Tiny Web Server")
        }
    }
}

#[derive(Debug, Clone)]
pub struct StaticFilesConfig {
    /// Prefix glued onto every request target
    pub webroot: PathBuf,
    /// Served for targets ending in `/`
    pub default_document: String
}

impl Default for StaticFilesConfig {
    fn default() -> StaticFilesConfig {
        StaticFilesConfig {
            webroot: PathBuf::from("."),
            default_document: String::from("home.html")
        }
    }
}

#[derive(Debug, Clone)]
pub struct CgiConfig {
    /// Any target containing this is dynamic content
    pub marker: String,
    /// Environment variable carrying the query string to the program
    pub query_variable: String
}

impl Default for CgiConfig {
    fn default() -> CgiConfig {
        CgiConfig {
            marker: String::from("cgi-bin"),
            query_variable: String::from("QUERY_STRING")
        }
    }
}

/// Buffer limits for a single transaction
#[derive(Debug, Clone)]
pub struct Limits {
    /// Longest request or header line accepted, terminator included
    pub max_line: usize,
    /// Most header lines read before giving up on the client
    pub max_headers: usize,
    /// Largest static file read into memory
    pub max_body: u64
}

impl Default for Limits {
    fn default() -> Limits {
        Limits {
            max_line: 8192,
            max_headers: 100,
            max_body: 64 * 1024 * 1024
        }
    }
}
