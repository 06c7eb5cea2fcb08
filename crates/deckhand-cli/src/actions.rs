//! GitHub Actions workflow commands.
//!
//! Workflow commands are plain lines on stdout; logs go to stderr so the two
//! never interleave.

/// Escape a command payload so it stays on one line.
pub fn escape_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn command(name: &str, data: &str) -> String {
    format!("::{}::{}", name, escape_data(data))
}

/// Fail the step with a message shown in the workflow summary.
pub fn error(message: &str) {
    println!("{}", command("error", message));
}

/// Keep a value out of every subsequent log line.
pub fn add_mask(value: &str) {
    for line in mask_commands(value) {
        println!("{}", line);
    }
}

// The runner matches masks line by line, so multi-line values are masked per line.
fn mask_commands(value: &str) -> Vec<String> {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| command("add-mask", line))
        .collect()
}
