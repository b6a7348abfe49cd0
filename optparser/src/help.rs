//! Aligned help text.
//!
//! Every option renders as a left column (indent, tokens, placeholder) padded
//! to a shared width, followed by its description and value hints.

use crate::option::{Kind, OptionRecord, Policy};
use crate::registry::OptionRegistry;

const INDENT: usize = 2;
/// Gap between the left column and the text in an error hint.
const HINT_GAP: usize = 2;

fn left_column(option: &OptionRecord) -> String {
    let mut line = " ".repeat(INDENT);
    let param = option.param();

    if let Some(abbr) = option.abbr() {
        line.push_str(abbr);
    }

    if let Some(full) = option.full() {
        if option.abbr().is_some() {
            line.push_str(", ");
        }
        match param.kind {
            Kind::Bool => {
                line.push_str("--[no-]");
                line.push_str(full.strip_prefix("--").unwrap_or(full));
            }
            _ => line.push_str(full),
        }
        if let Some(placeholder) = param.placeholder() {
            line.push(' ');
            line.push_str(&placeholder);
        }
    }

    line
}

/// `(options: "a|b", default: "x")`, or nothing for flags.
fn hints(option: &OptionRecord) -> Option<String> {
    let param = option.param();
    if param.policy == Policy::Unasked {
        return None;
    }

    let mut hints = Vec::new();
    if let Kind::Choice(ref values) = param.kind {
        hints.push(format!("options: \"{}\"", values.join("|")));
    }
    if let Some(default) = param.policy.default_value() {
        hints.push(format!("default: \"{}\"", default));
    }

    if hints.is_empty() {
        None
    } else {
        Some(format!("({})", hints.join(", ")))
    }
}

/// Render one option, starting its text at column `desc_offset`, or
/// `desc_offset` spaces after the left column when that is already wider.
pub fn format_option(option: &OptionRecord, desc_offset: usize) -> String {
    let mut line = left_column(option);
    let width = line.chars().count();
    let pad = if desc_offset >= width {
        desc_offset - width
    } else {
        desc_offset
    };
    line.push_str(&" ".repeat(pad));

    let text: Vec<String> = option
        .description()
        .map(str::to_string)
        .into_iter()
        .chain(hints(option))
        .collect();
    line.push_str(&text.join(" "));

    line.truncate(line.trim_end().len());
    line
}

/// The one-line usage hint attached to a resolution error.
pub fn hint(option: &OptionRecord) -> String {
    format_option(option, HINT_GAP)
}

/// Banner followed by one aligned line per distinct option.
pub fn render(banner: Option<&str>, registry: &OptionRegistry) -> String {
    let max_width = registry
        .records()
        .map(|option| left_column(option).chars().count())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<String> = banner.map(str::to_string).into_iter().collect();
    for option in registry.records() {
        lines.push(format_option(option, max_width + 2));
    }
    lines.join("\n")
}
