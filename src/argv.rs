//! Per-row argument vector construction.

use std::fmt;

/// Full argument list for one child invocation, command first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentVector(Vec<String>);

/// Row arity did not match the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArityMismatch {
    pub expected: usize,
    pub found: usize,
}

impl fmt::Display for ArityMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row has {} values but header names {} parameters",
            self.found, self.expected
        )
    }
}

/// Build `[command] ++ fixed_args ++ [names[0], row[0], names[1], row[1], ...]`.
///
/// Refuses rows whose length differs from `names`, so a mismatched row can
/// never index out of range or produce a half-paired vector.
pub fn build(
    command: &str,
    fixed_args: &[String],
    names: &[String],
    row: &[String],
) -> Result<ArgumentVector, ArityMismatch> {
    if row.len() != names.len() {
        return Err(ArityMismatch {
            expected: names.len(),
            found: row.len(),
        });
    }

    let mut argv = Vec::with_capacity(1 + fixed_args.len() + 2 * row.len());
    argv.push(command.to_string());
    argv.extend(fixed_args.iter().cloned());
    for (name, value) in names.iter().zip(row) {
        argv.push(name.clone());
        argv.push(value.clone());
    }

    Ok(ArgumentVector(argv))
}

impl ArgumentVector {
    /// The program to launch (argv[0]).
    pub fn program(&self) -> &str {
        &self.0[0]
    }

    /// Everything after argv[0].
    pub fn args(&self) -> &[String] {
        &self.0[1..]
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Comma-joined form used as the prefix of every result line.
    pub fn joined(&self) -> String {
        self.as_slice().join(", ")
    }

    /// Shell-quoted form, suitable for copy-pasting a dry-run line.
    pub fn to_shell_string(&self) -> String {
        shell_words::join(self.as_slice())
    }
}
