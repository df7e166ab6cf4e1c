//! codegen::tables
//!
//! The validation-table source file.
//!
//! # Layout
//!
//! 1. "Do not edit" banner and include
//! 2. Choice arrays and record tables, in [`TablePlan`] order
//! 3. The method entry table, one entry per method in slot order
//! 4. Mode-dependent accessors
//!
//! Every array ends with an all-null entry so the runtime can iterate
//! without a length.
//!
//! [`TablePlan`]: super::plan::TablePlan

use std::fmt::Write as _;

use super::choices::ChoiceArray;
use super::plan::{category_table_name, method_table_name, RecordTable, Step};
use super::wrap::{display_width, Breaks, Wrapper};
use super::{Compilation, CompileError};
use crate::core::naming::c_escape;
use crate::core::schema::{Method, OptionDef, OptionKind};
use crate::core::types::Mode;

/// Continuation indent inside a record.
const RECORD_INDENT: &str = "\t    ";

/// Continuation indent inside a method entry.
const ENTRY_INDENT: &str = "\t  ";

const NULL_RECORD: &str = "\t{ NULL, NULL, NULL, NULL, NULL, 0, 0, 0, 0, 0, NULL }";

const NULL_ENTRY: &str = "\t{ NULL, NULL, NULL, 0, 0, false }";

/// Accessors for the library's configuration surface.
const PRIMARY_TRAILER: &[&str] = &[
    "int",
    "__wt_conn_config_init(WT_SESSION_IMPL *session)",
    "{",
    "\tWT_CONNECTION_IMPL *conn;",
    "\tconst WT_CONFIG_ENTRY *ep, **epp;",
    "",
    "\tconn = S2C(session);",
    "",
    "\t/* Build a list of pointers to the configuration information. */",
    "\tWT_RET(__wt_calloc_def(session, WT_ELEMENTS(config_entries), &epp));",
    "\tconn->config_entries = epp;",
    "",
    "\t/* Fill in the list to reference the default information. */",
    "\tfor (ep = config_entries;;) {",
    "\t\t*epp++ = ep++;",
    "\t\tif (ep->method == NULL)",
    "\t\t\tbreak;",
    "\t}",
    "\treturn (0);",
    "}",
    "",
    "void",
    "__wt_conn_config_discard(WT_SESSION_IMPL *session)",
    "{",
    "\tWT_CONNECTION_IMPL *conn;",
    "",
    "\tconn = S2C(session);",
    "",
    "\t__wt_free(session, conn->config_entries);",
    "}",
    "",
    "/*",
    " * __wt_conn_config_match --",
    " *\tReturn the static configuration entry for a method.",
    " */",
    "const WT_CONFIG_ENTRY *",
    "__wt_conn_config_match(const char *method)",
    "{",
    "\tconst WT_CONFIG_ENTRY *ep;",
    "",
    "\tfor (ep = config_entries; ep->method != NULL; ++ep)",
    "\t\tif (strcmp(method, ep->method) == 0)",
    "\t\t\treturn (ep);",
    "\treturn (NULL);",
    "}",
];

/// Accessor for the test suite's configuration surface.
const TEST_TRAILER: &[&str] = &[
    "/*",
    " * __wt_test_config_match --",
    " *\tReturn the static configuration entry for a test.",
    " */",
    "const WT_CONFIG_ENTRY *",
    "__wt_test_config_match(const char *test_name)",
    "{",
    "\tconst WT_CONFIG_ENTRY *ep;",
    "",
    "\tfor (ep = config_entries; ep->method != NULL; ++ep)",
    "\t\tif (strcmp(test_name, ep->method) == 0)",
    "\t\t\treturn (ep);",
    "\treturn (NULL);",
    "}",
];

/// Emit the validation-table source.
pub fn emit(compilation: &Compilation<'_>, mode: Mode) -> Result<String, CompileError> {
    let options = compilation.options();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "/* DO NOT EDIT: automatically built by {}. */",
        options.generator
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "#include \"{}\"", options.include);

    for step in compilation.plan().steps() {
        match step {
            Step::Choices { table, option } => {
                let symbol = compilation
                    .choices()
                    .symbol_for(table, &option.name)
                    .ok_or_else(|| CompileError::Unplanned(format!("choices of {}", option.name)))?;
                let array = ChoiceArray {
                    symbol: symbol.to_string(),
                    choices: &option.constraints.choices,
                };
                write_choices(&mut out, &array, options.table_width);
            }
            Step::Table(table) => write_table(&mut out, compilation, table)?,
        }
    }

    write_entries(&mut out, compilation)?;

    let trailer = match mode {
        Mode::Primary => PRIMARY_TRAILER,
        Mode::Test => TEST_TRAILER,
    };
    let _ = writeln!(out);
    for line in trailer {
        let _ = writeln!(out, "{}", with_prefix(line, &options.prefix));
    }

    Ok(out)
}

/// Rename the `WT_` and `__wt_` symbols of a template line.
fn with_prefix(line: &str, prefix: &str) -> String {
    line.replace("WT_", &format!("{prefix}_"))
        .replace("__wt_", &format!("__{}_", prefix.to_ascii_lowercase()))
}

/// An array declaration, broken before the symbol if it is too wide.
///
/// `ty` carries its own trailing space or `*`.
fn declaration(ty: &str, symbol: &str, width: usize) -> String {
    let line = format!("static const {ty}{symbol}[] = {{");
    if display_width(&line) <= width {
        line
    } else {
        format!("static const {}\n    {symbol}[] = {{", ty.trim_end())
    }
}

fn write_choices(out: &mut String, array: &ChoiceArray<'_>, width: usize) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", declaration("char *", &array.symbol, width));
    for choice in array.choices {
        let _ = writeln!(out, "\t\"{}\",", c_escape(choice));
    }
    let _ = writeln!(out, "\tNULL");
    let _ = writeln!(out, "}};");
}

fn write_table(
    out: &mut String,
    compilation: &Compilation<'_>,
    table: &RecordTable<'_>,
) -> Result<(), CompileError> {
    let prefix = &compilation.options().prefix;
    let ty = format!("{prefix}_CONFIG_CHECK ");

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{}",
        declaration(&ty, &table.name, compilation.options().table_width)
    );
    for option in &table.options {
        let _ = writeln!(out, "{}", record(compilation, table, option)?);
    }
    let _ = writeln!(out, "{NULL_RECORD}");
    let _ = writeln!(out, "}};");
    Ok(())
}

/// The constraint string checked by the runtime parser, if any.
///
/// Clauses apply in the order `min`, `max`, `choices`.
pub fn check_string(option: &OptionDef) -> Option<String> {
    let constraints = &option.constraints;
    let mut clauses = Vec::new();
    if let Some(min) = &constraints.min {
        clauses.push(format!("min={}", min.literal()));
    }
    if let Some(max) = &constraints.max {
        clauses.push(format!("max={}", max.literal()));
    }
    if !constraints.choices.is_empty() {
        let quoted: Vec<_> = constraints
            .choices
            .iter()
            .map(|choice| format!("\\\"{choice}\\\""))
            .collect();
        clauses.push(format!("choices=[{}]", quoted.join(",")));
    }
    (!clauses.is_empty()).then(|| clauses.join(","))
}

/// One validation record, possibly spread over several lines.
fn record(
    compilation: &Compilation<'_>,
    table: &RecordTable<'_>,
    option: &OptionDef,
) -> Result<String, CompileError> {
    let options = compilation.options();
    let prefix = &options.prefix;
    let width = options.table_width;

    let func = option
        .constraints
        .validator
        .as_deref()
        .unwrap_or("NULL");
    let checks = check_string(option);

    let (subtable, count) = match &option.kind {
        OptionKind::Category(_) => {
            let symbol = category_table_name(table.method, option);
            let count = compilation
                .plan()
                .table_len(&symbol)
                .ok_or_else(|| CompileError::Unplanned(symbol.clone()))?;
            (symbol, count)
        }
        _ => ("NULL".to_string(), 0),
    };
    let choices = if option.constraints.choices.is_empty() {
        "NULL".to_string()
    } else {
        compilation
            .choices()
            .symbol_for(&table.name, &option.name)
            .ok_or_else(|| CompileError::Unplanned(format!("choices of {}", option.name)))?
            .to_string()
    };
    let min = option
        .constraints
        .min
        .as_ref()
        .map(|bound| bound.c_expr(prefix))
        .unwrap_or_else(|| "INT64_MIN".to_string());
    let max = option
        .constraints
        .max
        .as_ref()
        .map(|bound| bound.c_expr(prefix))
        .unwrap_or_else(|| "INT64_MAX".to_string());

    let head = format!("{{ \"{}\", \"{}\", {},", option.name, option.kind.tag(), func);
    let tail = format!(
        "{}, {}, {}_CONFIG_COMPILED_TYPE_{}, {}, {}, {}, {} }},",
        subtable,
        count,
        prefix,
        option.kind.tag().to_ascii_uppercase(),
        compilation.keys().id_of(option)?,
        min,
        max,
        choices
    );
    let checks_literal = checks
        .as_ref()
        .map(|checks| format!("\"{checks}\""))
        .unwrap_or_else(|| "NULL".to_string());

    let single = format!("\t{head} {checks_literal}, {tail}");
    if display_width(&single) <= width {
        return Ok(single);
    }

    let inner = width.saturating_sub(display_width(RECORD_INDENT));
    let mut lines = vec![format!("\t{head}")];
    match &checks {
        Some(checks) => {
            // Adjacent literals; commas are the only break points.
            let pieces = Wrapper::new(inner.saturating_sub(3), Breaks::Commas).wrap(checks);
            let last = pieces.len().saturating_sub(1);
            for (i, piece) in pieces.iter().enumerate() {
                let end = if i == last { "," } else { "" };
                lines.push(format!("{RECORD_INDENT}\"{piece}\"{end}"));
            }
        }
        None => lines.push(format!("{RECORD_INDENT}NULL,")),
    }
    for line in Wrapper::new(inner, Breaks::Words).wrap(&tail) {
        lines.push(format!("{RECORD_INDENT}{line}"));
    }
    Ok(lines.join("\n"))
}

/// The default configuration string of a method.
///
/// # Example
///
/// With `x` an int defaulting to `5` and `log` a category holding a
/// boolean `enabled` defaulting to `false`, the base config reads
/// `x=5,log=(enabled=false)`.
pub fn base_config(method: &Method) -> String {
    method
        .options
        .iter()
        .map(|option| format!("{}={}", option.name, default_value(option)))
        .collect::<Vec<_>>()
        .join(",")
}

fn default_value(option: &OptionDef) -> String {
    let default = option.default_str();
    match (&option.kind, default) {
        (_, "false") => "false".to_string(),
        (_, "true") => "true".to_string(),
        (OptionKind::String, "none") if option.constraints.choices.is_empty() => String::new(),
        (OptionKind::Category(_), _) => {
            let inner: Vec<_> = option
                .sorted_subconfig()
                .into_iter()
                .map(|sub| format!("{}={}", sub.name, default_value(sub)))
                .collect();
            format!("({})", inner.join(","))
        }
        _ => default.to_string(),
    }
}

fn write_entries(out: &mut String, compilation: &Compilation<'_>) -> Result<(), CompileError> {
    let options = compilation.options();
    let base_width = options
        .table_width
        .saturating_sub(display_width(ENTRY_INDENT) + 2);

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "static const {}_CONFIG_ENTRY config_entries[] = {{",
        options.prefix
    );

    for (slot, method) in compilation.schema().slots() {
        let _ = writeln!(out, "\t{{ \"{}\",", method.name);

        let config = c_escape(&base_config(method));
        let mut lines = Wrapper::new(base_width, Breaks::Commas).wrap(&config);
        if lines.is_empty() {
            lines.push(String::new());
        }
        let quoted: Vec<_> = lines
            .iter()
            .map(|line| format!("{ENTRY_INDENT}\"{line}\""))
            .collect();
        let _ = writeln!(out, "{},", quoted.join("\n"));

        let checks = if method.options.is_empty() {
            "NULL, 0".to_string()
        } else {
            let symbol = method_table_name(&method.name);
            let count = compilation
                .plan()
                .table_len(&symbol)
                .ok_or_else(|| CompileError::Unplanned(symbol.clone()))?;
            format!("{symbol}, {count}")
        };
        let _ = writeln!(
            out,
            "{ENTRY_INDENT}{checks}, {slot}, {}",
            method.compilable
        );
        let _ = writeln!(out, "\t}},");
    }

    let _ = writeln!(out, "{NULL_ENTRY}");
    let _ = writeln!(out, "}};");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::EmitOptions;
    use crate::core::schema::{Bound, Constraints, Schema};
    use crate::core::types::{MethodName, OptionName};

    fn opt(name: &str, kind: OptionKind) -> OptionDef {
        OptionDef {
            name: OptionName::new(name).unwrap(),
            description: String::new(),
            default: None,
            kind,
            constraints: Constraints::default(),
        }
    }

    fn with_default(mut option: OptionDef, default: &str) -> OptionDef {
        option.default = Some(default.to_string());
        option
    }

    fn method(name: &str, options: Vec<OptionDef>) -> Method {
        Method {
            name: MethodName::new(name).unwrap(),
            options,
            compilable: false,
        }
    }

    fn compile(schema: &Schema) -> String {
        Compilation::new(schema, EmitOptions::default())
            .unwrap()
            .tables(Mode::Primary)
            .unwrap()
    }

    #[test]
    fn check_string_clauses() {
        let mut option = opt("x", OptionKind::Int);
        assert_eq!(check_string(&option), None);

        option.constraints.min = Bound::parse("0");
        option.constraints.max = Bound::parse("10MB");
        assert_eq!(check_string(&option).as_deref(), Some("min=0,max=10MB"));

        option.constraints.choices = vec!["a".into(), "b".into()];
        assert_eq!(
            check_string(&option).as_deref(),
            Some(r#"min=0,max=10MB,choices=[\"a\",\"b\"]"#)
        );
    }

    #[test]
    fn base_config_defaults() {
        let m = method(
            "m",
            vec![
                with_default(opt("flag", OptionKind::Boolean), "true"),
                with_default(opt("name", OptionKind::String), "none"),
                opt("size", OptionKind::Int),
                with_default(opt("size2", OptionKind::Int), "4KB"),
                opt(
                    "log",
                    OptionKind::Category(vec![
                        with_default(opt("path", OptionKind::String), "\"."),
                        with_default(opt("enabled", OptionKind::Boolean), "false"),
                    ]),
                ),
            ],
        );
        assert_eq!(
            base_config(&m),
            "flag=true,name=,size=,size2=4KB,log=(enabled=false,path=\".)"
        );
    }

    #[test]
    fn none_kept_when_choices_exist() {
        let mut option = with_default(opt("mode", OptionKind::String), "none");
        option.constraints.choices = vec!["none".into(), "all".into()];
        assert_eq!(base_config(&method("m", vec![option])), "mode=none");
    }

    #[test]
    fn prefix_renames_symbols() {
        assert_eq!(
            with_prefix("WT_RET(__wt_calloc_def(session, WT_ELEMENTS(x), &epp));", "XX"),
            "XX_RET(__xx_calloc_def(session, XX_ELEMENTS(x), &epp));"
        );
    }

    #[test]
    fn record_layout() {
        let mut x = opt("x", OptionKind::Int);
        x.constraints.min = Bound::parse("0");
        x.constraints.max = Bound::parse("10");
        let schema = Schema::new(vec![method("m", vec![x])]).unwrap();
        let out = compile(&schema);

        assert!(out.starts_with(
            "/* DO NOT EDIT: automatically built by apiconf. */\n\n#include \"wt_internal.h\"\n"
        ));
        let expected = "\nstatic const WT_CONFIG_CHECK confchk_m[] = {\n\
                        \t{ \"x\", \"int\", NULL,\n\
                        \t    \"min=0,max=10\",\n\
                        \t    NULL, 0, WT_CONFIG_COMPILED_TYPE_INT, 0, 0, 10, NULL },\n\
                        \t{ NULL, NULL, NULL, NULL, NULL, 0, 0, 0, 0, 0, NULL }\n\
                        };\n";
        assert!(out.contains(expected), "{out}");
    }

    #[test]
    fn wide_table_fits_on_one_line() {
        let schema = Schema::new(vec![method("m", vec![opt("x", OptionKind::Boolean)])]).unwrap();
        let options = EmitOptions {
            table_width: 120,
            ..EmitOptions::default()
        };
        let out = Compilation::new(&schema, options)
            .unwrap()
            .tables(Mode::Primary)
            .unwrap();
        assert!(out.contains(
            "\t{ \"x\", \"boolean\", NULL, NULL, NULL, 0, WT_CONFIG_COMPILED_TYPE_BOOLEAN, 0, INT64_MIN, INT64_MAX, NULL },\n"
        ));
    }

    #[test]
    fn records_stay_within_width() {
        let mut x = opt("allocation_size", OptionKind::Int);
        x.constraints.min = Bound::parse("512B");
        x.constraints.max = Bound::parse("128MB");
        x.constraints.validator = Some("__wt_checksum_validate".into());
        let schema = Schema::new(vec![method("WT_SESSION.create", vec![x])]).unwrap();
        let out = compile(&schema);

        assert!(out.contains("128LL * WT_MEGABYTE"));
        for line in out.lines() {
            if line.starts_with("\t{ \"allocation_size\"") || line.starts_with(RECORD_INDENT) {
                assert!(display_width(line) <= 80, "too wide: {line:?}");
            }
        }
    }

    #[test]
    fn entry_table() {
        let mut open = method("open", vec![with_default(opt("x", OptionKind::Int), "5")]);
        open.compilable = true;
        let schema = Schema::new(vec![open, method("close", vec![])]).unwrap();
        let out = compile(&schema);

        let expected = "\nstatic const WT_CONFIG_ENTRY config_entries[] = {\n\
                        \t{ \"close\",\n\
                        \t  \"\",\n\
                        \t  NULL, 0, 0, false\n\
                        \t},\n\
                        \t{ \"open\",\n\
                        \t  \"x=5\",\n\
                        \t  confchk_open, 1, 1, true\n\
                        \t},\n\
                        \t{ NULL, NULL, NULL, 0, 0, false }\n\
                        };\n";
        assert!(out.contains(expected), "{out}");
    }

    #[test]
    fn trailers_per_mode() {
        let schema = Schema::new(vec![method("m", vec![])]).unwrap();
        let compilation = Compilation::new(&schema, EmitOptions::default()).unwrap();

        let primary = compilation.tables(Mode::Primary).unwrap();
        assert!(primary.contains("__wt_conn_config_init(WT_SESSION_IMPL *session)"));
        assert!(primary.contains("__wt_conn_config_match(const char *method)"));
        assert!(!primary.contains("__wt_test_config_match"));

        let test = compilation.tables(Mode::Test).unwrap();
        assert!(test.contains("__wt_test_config_match(const char *test_name)"));
        assert!(!test.contains("__wt_conn_config_init"));
    }

    #[test]
    fn choices_precede_their_table() {
        let mut mode = opt("mode", OptionKind::String);
        mode.constraints.choices = vec!["fast".into(), "safe".into()];
        let schema = Schema::new(vec![method("m", vec![mode])]).unwrap();
        let out = compile(&schema);

        let choices = out.find("static const char *confchk_mode_choices[] = {").unwrap();
        let table = out.find("static const WT_CONFIG_CHECK confchk_m[] = {").unwrap();
        assert!(choices < table);
        assert!(out.contains("\t\"fast\",\n\t\"safe\",\n\tNULL\n};"));
    }
}
