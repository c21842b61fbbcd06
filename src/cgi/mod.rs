//! Dynamic content, CGI style
//!
//! The server sends the status line and a `Server` header, then hands the
//! connection to the program as its standard output. The program owns the
//! rest of the response, its own headers included.

pub mod process;

use crate::errors::Result;
use crate::server::{Connection, Response, Status};

use std::path::Path;
use std::process::{ExitStatus, Stdio};

pub use self::process::ProcessInvoker;

/// One run of a CGI program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub program: &'a Path,
    /// Name of the environment variable carrying `query`
    pub query_variable: &'a str,
    pub query: &'a str
}

/// Values which can run CGI programs
///
/// Implementations start `invocation.program` with no arguments, its
/// environment extended by exactly the query variable, its standard output
/// attached to `stdout`, and block until it exits.
pub trait Invoker {
    fn invoke(&self, invocation: &Invocation, stdout: Stdio)
              -> Result<ExitStatus>;
}

/// Sends the response prefix, then lets the program write the rest.
pub fn serve_dynamic<C, I>(conn: &mut C, invoker: &I, invocation: &Invocation,
                           server_name: &str) -> Result<()>
    where C: Connection, I: Invoker + ?Sized
{
    Response::new(Status::OK, server_name).write_prefix(conn)?;
    // The program writes straight to the socket, so our bytes go first
    conn.flush()?;

    let stdout = conn.child_stdout()?;
    let status = invoker.invoke(invocation, stdout)?;

    if status.success() {
        debug!("{} exited cleanly", invocation.program.display());
    }
    else {
        warn!("{} exited with {}", invocation.program.display(), status);
    }

    Ok(())
}
