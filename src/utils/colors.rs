//! ANSI colour helpers for console log lines.

const RESET: &str = "\x1b[0m";

fn paint(
    code: &str,
    data: &str,
) -> String {
    format!("\x1b[{code}m{data}{RESET}")
}

pub fn cyan(data: &str) -> String {
    paint("36", data)
}

pub fn yellow(data: &str) -> String {
    paint("33", data)
}

pub fn bold(data: &str) -> String {
    paint("1", data)
}

/// Bold red, used for failures
pub fn bred(data: &str) -> String {
    paint("31;1", data)
}

pub fn gray(data: &str) -> String {
    paint("30;1", data)
}

/// Gray on light background
pub fn lgray(data: &str) -> String {
    paint("30;47", data)
}

pub fn blue(data: &str) -> String {
    paint("34", data)
}

pub fn green(data: &str) -> String {
    paint("32", data)
}
