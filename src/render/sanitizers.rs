//! Text sanitizers for generated source

use once_cell::sync::Lazy;
use regex::Regex;

static TYPOGRAPHIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{2018}\u{2019}\u{201C}\u{201D}\u{2013}\u{2014}]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Sanitizes free-form documentation text for a one-line docstring or comment
///
/// This function:
/// - Replaces smart quotes with plain quotes and long dashes with `-`
/// - Joins all lines and collapses whitespace
/// - Escapes backslashes and double quotes
///
/// # Examples
/// ```
/// use clientgen::render::sanitizers::sanitize_docstring;
///
/// let input = "Finds pets\n\n  by \u{201C}status\u{201D}";
/// assert_eq!(sanitize_docstring(input), "Finds pets by \\\"status\\\"");
/// ```
pub fn sanitize_docstring(input: &str) -> String {
    let plain = TYPOGRAPHIC.replace_all(input, |caps: &regex::Captures| match &caps[0] {
        "\u{2018}" | "\u{2019}" => "'",
        "\u{201C}" | "\u{201D}" => "\"",
        _ => "-",
    });
    let collapsed = WHITESPACE.replace_all(plain.trim(), " ");
    collapsed.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Tidy rendered source: trailing whitespace is stripped, runs of blank lines
/// are capped at `max_blank` and the text ends with exactly one newline.
pub fn normalize_blank_lines(source: &str, max_blank: usize) -> String {
    let mut out = String::with_capacity(source.len());
    let mut blank_run = 0;
    let mut started = false;

    for line in source.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            continue;
        }
        if started {
            for _ in 0..blank_run.min(max_blank) {
                out.push('\n');
            }
        }
        blank_run = 0;
        started = true;
        out.push_str(line);
        out.push('\n');
    }

    out
}
