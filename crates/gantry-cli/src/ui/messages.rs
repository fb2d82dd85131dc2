//! Status lines printed to stderr, leaving stdout for data output.

use console::Emoji;
use owo_colors::OwoColorize;

static CHECK: Emoji<'_, '_> = Emoji("✓", "+");
static INFO: Emoji<'_, '_> = Emoji("ℹ", "i");
static WARN: Emoji<'_, '_> = Emoji("⚠", "!");
static CROSS: Emoji<'_, '_> = Emoji("✗", "x");

pub fn success(message: &str) {
    eprintln!("{} {message}", CHECK.to_string().green().bold());
}

pub fn info(message: &str) {
    eprintln!("{} {message}", INFO.to_string().blue());
}

pub fn warn(message: &str) {
    eprintln!("{} {message}", WARN.to_string().yellow().bold());
}

pub fn error(message: &str) {
    eprintln!("{} {message}", CROSS.to_string().red().bold());
}
