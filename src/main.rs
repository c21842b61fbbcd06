//! A tiny HTTP/1.0 Web server for static and CGI content.
//!
//! Call it like this:
//!
//!     tiny-server 8000
//!     tiny-server 8000 -f config.toml
//!
//! Requests are served from the current directory. A target containing
//! `cgi-bin` names a program to run, with everything after the `?` passed in
//! `QUERY_STRING`; anything else names a file to send back as-is. A target
//! ending in `/` gets `home.html`.
//!
//! The optional config file is in the [TOML format][toml]. Every key is
//! optional; these are the defaults:
//!
//! ```toml
//! [listen]
//! port = 8000
//! concurrent = false
//! timeout_secs = 0
//!
//! [static]
//! webroot = "."
//! default_document = "home.html"
//!
//! [cgi]
//! marker = "cgi-bin"
//! query_variable = "QUERY_STRING"
//!
//! [limits]
//! max_line = 8192
//! max_headers = 100
//! max_body = 67108864
//!
//! [server]
//! name = "Tiny Web Server"
//! ```
//!
//! The port on the command line always wins over the one in the file. If a
//! key is of the wrong type, the server will bail, so don’t do that.
//!
//! Only `GET` is understood, one request per connection, and the connection
//! is closed after every response.
//!
//! [toml]: https://github.com/toml-lang/toml

#[macro_use] extern crate log;

mod cgi;
mod config;
mod errors;
mod filesystem;
mod log_util;
mod server;

use config::Config;
use config::parser::{self, parse_file};
use server::serve;

use clap::{value_parser, Arg, Command};

use std::env;
use std::path::PathBuf;
use std::process::exit;

fn main() {
    let mut log_builder = env_logger::Builder::new();
    log_builder.filter_level(log::LevelFilter::Info);

    if let Ok(var) = env::var("SERVER_LOG") {
        log_builder.parse_filters(&var);
    }

    if let Err(e) = log_builder.try_init() {
        eprintln!("tiny-server: Error when initializing logging: {}", e);
        exit(1);
    }

    let matches = Command::new("tiny-server")
        .version("0.3")
        .author("Alex Hill <alexander.d.hill.89@gmail.com>")
        .about("A tiny HTTP/1.0 server for static files and CGI programs")
        .arg(Arg::new("port")
             .value_name("PORT")
             .help("The port to listen on")
             .required(true)
             .value_parser(value_parser!(u16).range(1..)))
        .arg(Arg::new("config_file")
             .short('f')
             .value_name("FILE")
             .help("The TOML file with server configuration")
             .value_parser(value_parser!(PathBuf)))
        .get_matches();

    let mut config = match matches.get_one::<PathBuf>("config_file") {
        Some(config_file) => match parse_file(config_file) {
            Ok(c) => c,
            Err(parser::Error::Parse(errors)) => {
                error!("Errors parsing config file {:?}", config_file);
                for error in errors {
                    error!("Config file error at line {} column {}: {}",
                           error.line, error.column, error.desc);
                }
                exit(1);
            },
            Err(e) => {
                error!("Error in config file {:?}: {}", config_file, e);
                exit(1);
            }
        },
        None => Config::default()
    };

    if let Some(&port) = matches.get_one::<u16>("port") {
        config.port = port;
    }

    info!("Starting server on port {}", config.port);
    if let Err(e) = serve(config) {
        error!("Server stopped: {}", e);
        exit(1);
    }
}
