// src/invocation.rs

//! Construction of the argument vector for one external process run.

use std::ffi::{OsStr, OsString};

use crate::errors::{ExtprocError, Result};

/// One request to run an external program and collect its output.
///
/// Holds the ordered argument vector: program name first, then its
/// arguments. The vector is handed to the OS verbatim, no shell sits in
/// between, so metacharacters are plain bytes; the program itself is
/// resolved through the caller's PATH. The argv is never empty, both
/// constructors guarantee that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    argv: Vec<OsString>,
}

impl Invocation {
    /// Start an invocation of `program`.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            argv: vec![program.into()],
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.argv.push(arg.into());
        self
    }

    /// Append several arguments, in order.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.argv.extend(args.into_iter().map(Into::into));
        self
    }

    /// Build from a complete argument vector, program name first.
    ///
    /// Fails with [`ExtprocError::EmptyArgv`] when the vector is empty.
    pub fn from_argv<I, S>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
        if argv.is_empty() {
            return Err(ExtprocError::EmptyArgv);
        }
        Ok(Self { argv })
    }

    /// The program to run.
    pub fn program(&self) -> &OsStr {
        &self.argv[0]
    }

    /// The arguments following the program name, in order.
    pub fn arguments(&self) -> impl Iterator<Item = &OsStr> {
        self.argv[1..].iter().map(OsString::as_os_str)
    }
}
