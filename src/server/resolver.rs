//! Maps request targets onto the filesystem
//!
//! Targets are used nearly verbatim: no percent-decoding and no `..`
//! normalization. The webroot is glued onto the front as a plain string
//! prefix, so `/etc/passwd` lands at `<webroot>/etc/passwd` rather than being
//! treated as absolute.

use crate::config::Config;

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Whether a target is served from disk or produced by a program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Static,
    Dynamic
}

/// Where a request target lives and how to serve it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    pub path: PathBuf,
    pub classification: Classification,
    /// Everything after the first `?`; always empty for static content
    pub args: String
}

impl ResolvedResource {
    /// `true` if some segment of the path is `..`
    pub fn escapes_root(&self) -> bool {
        self.path.components().any(|c| c == Component::ParentDir)
    }
}

pub fn resolve(target: &str, config: &Config) -> ResolvedResource {
    if target.contains(config.cgi.marker.as_str()) {
        let (path, args) = match target.find('?') {
            Some(i) => (&target[.. i], &target[i + 1 ..]),
            None => (target, "")
        };

        ResolvedResource {
            path: prefixed(&config.stat.webroot, path),
            classification: Classification::Dynamic,
            args: String::from(args)
        }
    }
    else {
        let mut path = prefixed(&config.stat.webroot, target);
        if target.ends_with('/') {
            path.push(&config.stat.default_document);
        }

        ResolvedResource {
            path: path,
            classification: Classification::Static,
            args: String::new()
        }
    }
}

fn prefixed(webroot: &Path, target: &str) -> PathBuf {
    let mut path = OsString::from(webroot.as_os_str());
    path.push(target);
    PathBuf::from(path)
}
