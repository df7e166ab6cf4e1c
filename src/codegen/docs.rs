//! codegen::docs
//!
//! Documentation regions regenerated inside a template.
//!
//! # Markers
//!
//! A region opens with a comment line carrying
//! `@configstart{<method>, ...}` and closes at the next line containing
//! `@configend`. A method without options uses a single
//! `@configempty{<method>, ...}` line instead. Everything between the
//! markers is owned by the generator; every other line passes through
//! untouched.
//!
//! A marker naming an unknown method is reported and left as it is.
//!
//! # Records
//!
//! Each documented option becomes one `@config{name, description, type}`
//! record, wrapped to fit the line after the comment prefix. Category
//! sub-options are indented with `&nbsp;` runs and closed by a
//! `@config{<indent> ),,}` record.

use regex::Regex;
use tracing::warn;

use super::wrap::{display_width, Breaks, Wrapper, NBSP};
use super::{CompileError, EmitOptions};
use crate::core::schema::{OptionDef, OptionKind, Schema};

const MARKER_PATTERN: &str = r"^(\s*\*\s*)@config(?:empty|start)\{(.*?),.*\}";

/// Indent markers added per nesting level.
const INDENT_STEP: usize = 4;

/// A regenerated template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocOutput {
    pub text: String,
    /// Methods named by markers but absent from the schema, in template order.
    pub missing: Vec<String>,
    /// Number of regions regenerated.
    pub regions: usize,
}

/// Regenerate every documentation region in `template`.
///
/// # Errors
///
/// Returns [`CompileError::UnterminatedRegion`] if a `@configstart` region
/// never reaches `@configend`.
pub fn emit(
    schema: &Schema,
    options: &EmitOptions,
    template: &str,
) -> Result<DocOutput, CompileError> {
    let marker = Regex::new(MARKER_PATTERN)?;
    let mut output = DocOutput {
        text: String::with_capacity(template.len()),
        missing: Vec::new(),
        regions: 0,
    };
    let mut open_region: Option<(String, usize)> = None;

    for (index, line) in template.split_inclusive('\n').enumerate() {
        if open_region.is_some() {
            if line.contains("@configend") {
                open_region = None;
            }
            continue;
        }

        let content = line.trim_end_matches(['\n', '\r']);
        let Some(captures) = marker.captures(content) else {
            output.text.push_str(line);
            continue;
        };
        let prefix = &captures[1];
        let name = &captures[2];

        let Some(method) = schema.method(name) else {
            warn!(method = name, line = index + 1, "missing configuration for method");
            output.missing.push(name.to_string());
            output.text.push_str(line);
            continue;
        };

        if content.contains("@configstart") {
            open_region = Some((name.to_string(), index + 1));
        }
        output.regions += 1;

        if method.options.is_empty() {
            output.text.push_str(&format!(
                "{prefix}@configempty{{{name}, see {}}}\n",
                options.schema_note
            ));
            continue;
        }

        output.text.push_str(&format!(
            "{prefix}@configstart{{{name}, see {}}}\n",
            options.schema_note
        ));
        let width = options.doc_width.saturating_sub(display_width(prefix));
        let wrapper = Wrapper::new(width, Breaks::Words);
        for option in method.options.iter().filter(|o| o.is_documented()) {
            for record in records(option, "") {
                for wrapped in wrapper.wrap(&record) {
                    output.text.push_str(prefix);
                    output.text.push_str(&wrapped);
                    output.text.push('\n');
                }
            }
        }
        output.text.push_str(prefix);
        output.text.push_str("@configend\n");
    }

    if let Some((method, line)) = open_region {
        return Err(CompileError::UnterminatedRegion { method, line });
    }
    Ok(output)
}

/// The doc records of one option and, for categories, its sub-options.
pub fn records(option: &OptionDef, indent: &str) -> Vec<String> {
    let mut name = format!("{indent}{}", option.name);
    let mut type_desc = type_description(option);
    if option.kind.is_category() {
        name.push_str(" = (");
    } else {
        // Ints always get a code span, even with no default.
        let default = match (&option.default, &option.kind) {
            (Some(value), _) => format!("\\c {value}"),
            (None, OptionKind::Int) => "\\c ".to_string(),
            (None, _) => "empty".to_string(),
        };
        type_desc.push_str("; default ");
        type_desc.push_str(&default);
    }
    type_desc.push('.');

    let mut out = vec![format!(
        "@config{{{name}, {}, {}}}",
        description(&option.description),
        escape_commas(&type_desc)
    )];

    if option.kind.is_category() {
        let nested = format!("{indent}{}", NBSP.repeat(INDENT_STEP));
        for sub in option.sorted_subconfig() {
            if sub.is_documented() {
                out.extend(records(sub, &nested));
            }
        }
        out.push(format!("@config{{{indent} ),,}}"));
    }
    out
}

/// Whitespace collapsed, one trailing period, commas escaped.
fn description(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_matches('.');
    escape_commas(&format!("{trimmed}."))
}

fn escape_commas(text: &str) -> String {
    text.replace(',', "\\,")
}

/// The phrase describing what values an option accepts.
pub fn type_description(option: &OptionDef) -> String {
    let constraints = &option.constraints;
    let mut desc = match option.kind {
        OptionKind::Boolean => "a boolean flag",
        OptionKind::Format => "a format string",
        OptionKind::Int => "an integer",
        OptionKind::List => "a list",
        OptionKind::Category(_) => "a set of related configuration options defined as follows",
        OptionKind::String => "a string",
    }
    .to_string();

    match (&constraints.min, &constraints.max) {
        (Some(min), Some(max)) => desc.push_str(&format!(
            " between \\c {} and \\c {}",
            min.literal(),
            max.literal()
        )),
        (Some(min), None) => {
            desc.push_str(&format!(" greater than or equal to \\c {}", min.literal()))
        }
        (None, Some(max)) => desc.push_str(&format!(" no more than \\c {}", max.literal())),
        (None, None) => {}
    }

    let is_list = matches!(option.kind, OptionKind::List);
    if !constraints.choices.is_empty() {
        desc.push_str(if is_list {
            ", with values chosen from the following options: "
        } else {
            ", chosen from the following options: "
        });
        let quoted: Vec<_> = constraints
            .choices
            .iter()
            .map(|choice| format!("\\c \"{choice}\""))
            .collect();
        desc.push_str(&quoted.join(", "));
    } else if is_list {
        desc.push_str(" of strings");
    }
    desc
}
