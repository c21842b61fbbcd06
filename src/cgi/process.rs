//! Running CGI programs as child processes

use super::{Invocation, Invoker};
use crate::errors::{Error, Result};

use std::process::{Command, ExitStatus, Stdio};

/// Runs each invocation as a fresh child process.
///
/// The query variable is set on the child's `Command`, never on this
/// process, so concurrent invocations can't see each other's queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessInvoker;

impl Invoker for ProcessInvoker {
    fn invoke(&self, invocation: &Invocation, stdout: Stdio)
              -> Result<ExitStatus> {
        let mut child = Command::new(invocation.program)
            .env(invocation.query_variable, invocation.query)
            .stdin(Stdio::null())
            .stdout(stdout)
            .spawn()
            .map_err(Error::Spawn)?;

        Ok(child.wait()?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::server::test_util::{exec_lock, Scratch};

    use std::fs::{self, File};
    use std::path::Path;

    #[test]
    fn exposes_query_and_redirects_stdout() {
        let scratch = Scratch::new();
        let program = scratch.file(
            "echo-query",
            b"#!/bin/sh\nprintf 'query=%s' \"$QUERY_STRING\"\n",
            0o755);
        let out_path = scratch.path("out");
        let out = File::create(&out_path).unwrap();

        let _guard = exec_lock();
        let status = ProcessInvoker.invoke(&Invocation {
            program: &program,
            query_variable: "QUERY_STRING",
            query: "15&20"
        }, Stdio::from(out)).unwrap();

        assert!(status.success());
        assert_eq!(fs::read_to_string(&out_path).unwrap(), "query=15&20");
    }

    #[test]
    fn exit_status_is_reported() {
        let scratch = Scratch::new();
        let program = scratch.file("fail", b"#!/bin/sh\nexit 4\n", 0o755);

        let _guard = exec_lock();
        let status = ProcessInvoker.invoke(&Invocation {
            program: &program,
            query_variable: "QUERY_STRING",
            query: ""
        }, Stdio::null()).unwrap();

        assert_eq!(status.code(), Some(4));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let _guard = exec_lock();
        let result = ProcessInvoker.invoke(&Invocation {
            program: Path::new("./definitely/not/here"),
            query_variable: "QUERY_STRING",
            query: ""
        }, Stdio::null());

        match result {
            Err(Error::Spawn(_)) => (),
            other => panic!("{:?}", other)
        }
    }
}
