use extproc::Invocation;

/// Builder for small `sh -c` scripts acting as scripted child processes.
///
/// Integration tests need children with precisely known behaviour: print
/// these bytes, wait this long, exit with that code. Building the behaviour
/// as a shell script keeps the test on a real process with real pipes while
/// the observable output stays fully scripted.
pub struct ChildScript {
    script: String,
}

impl ChildScript {
    pub fn new() -> Self {
        Self {
            script: String::new(),
        }
    }

    /// Print `text` to stdout, byte for byte (no escape interpretation, no
    /// trailing newline).
    pub fn print(mut self, text: &str) -> Self {
        self.push(&format!("printf '%s' {}", shell_quote(text)));
        self
    }

    /// Print to stdout using `format` as the printf format string, so
    /// backslash escapes like `\t` and `\n` are interpreted.
    pub fn printf(mut self, format: &str) -> Self {
        self.push(&format!("printf {}", shell_quote(format)));
        self
    }

    /// Print `text` to stderr, byte for byte.
    pub fn print_stderr(mut self, text: &str) -> Self {
        self.push(&format!("printf '%s' {} >&2", shell_quote(text)));
        self
    }

    /// Print `text` to stdout `n` times in a row.
    pub fn print_repeated(mut self, text: &str, n: usize) -> Self {
        self.push(&format!(
            "i=0; while [ $i -lt {n} ]; do printf '%s' {}; i=$((i+1)); done",
            shell_quote(text)
        ));
        self
    }

    /// Dump the contents of `path` to stdout.
    pub fn cat(mut self, path: &std::path::Path) -> Self {
        self.push(&format!("cat {}", shell_quote(&path.to_string_lossy())));
        self
    }

    /// Sleep for `ms` milliseconds before the next step.
    pub fn sleep_ms(mut self, ms: u64) -> Self {
        self.push(&format!("sleep {}", ms as f64 / 1000.0));
        self
    }

    /// Exit with `code` instead of the default 0.
    pub fn exit_with(mut self, code: i32) -> Self {
        self.push(&format!("exit {code}"));
        self
    }

    /// Terminate the script by sending `signal` to itself.
    pub fn kill_self(mut self, signal: &str) -> Self {
        self.push(&format!("kill -{signal} $$"));
        self
    }

    /// Finish the script as an `sh -c` invocation.
    pub fn into_invocation(self) -> Invocation {
        Invocation::new("sh").arg("-c").arg(self.script)
    }

    fn push(&mut self, fragment: &str) {
        if !self.script.is_empty() {
            self.script.push_str("; ");
        }
        self.script.push_str(fragment);
    }
}

impl Default for ChildScript {
    fn default() -> Self {
        Self::new()
    }
}

/// Quote `text` for safe inclusion in an `sh -c` script.
fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}
