//! Required-program probing and package install command assembly.
use crate::distro::DistroSpec;
use crate::exec::Executor;

/// Tools the deployed configuration cannot work without.
pub const REQUIRED_PROGRAMS: &[&str] = &["git", "zsh", "tmux", "vim"];

/// The subset of `programs` not found on PATH, in input order.
#[must_use]
pub fn missing_programs<'a>(programs: &[&'a str], executor: &dyn Executor) -> Vec<&'a str> {
    programs
        .iter()
        .copied()
        .filter(|p| !executor.which(p))
        .collect()
}

/// Render the probe result as a colored status list (green = present,
/// red = missing).
#[must_use]
pub fn format_program_status(programs: &[&str], missing: &[&str]) -> String {
    let mut parts: Vec<String> = programs
        .iter()
        .map(|p| {
            if missing.contains(p) {
                format!("\x1b[91m{p}\x1b[0m")
            } else {
                format!("\x1b[92m{p}\x1b[0m")
            }
        })
        .collect();
    parts.sort();
    parts.join(", ")
}

/// The shell-quoted install command line for the missing tools.
///
/// Only used for display; the actual invocation passes the argument vector
/// directly without a shell.
#[must_use]
pub fn install_command_line(spec: &DistroSpec, tools: &[&str]) -> String {
    spec.install_command(tools)
        .iter()
        .map(|arg| shell_quote(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quote `arg` for display in a `sh`-compatible command line.
fn shell_quote(arg: &str) -> String {
    let safe = arg
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_./=+:@%".contains(c));
    if safe && !arg.is_empty() {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
