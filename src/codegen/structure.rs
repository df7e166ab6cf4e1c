//! codegen::structure
//!
//! Header fragments: method slots, key numbers, and the key structure.
//!
//! The key structure mirrors the merged [`KeyTree`]. Its declaration and
//! its initializer come out of one recursive walk, one line per node in
//! each, so line `i` of the declaration always pairs with line `i` of the
//! initializer.

use std::fmt::Write as _;

use super::keys::{lane_shifts, KeyNode, KeyRegistry, KeyTree};
use super::CompileError;
use crate::core::schema::{Schema, MAX_NESTING_DEPTH};
use crate::core::types::KeyIdentity;

const TOP_INDENT: &str = "    ";
const NESTED_INDENT: &str = "  ";

/// `#define <P>_CONFIG_ENTRY_<method> <slot>` for every method.
pub fn slot_defines(schema: &Schema, prefix: &str) -> String {
    let mut out = String::new();
    for (slot, method) in schema.slots() {
        let _ = writeln!(
            out,
            "#define {prefix}_CONFIG_ENTRY_{} {slot}",
            method.name.c_ident()
        );
    }
    out
}

/// `#define <P>_CONF_KEY_<identity> <id>ULL` in identity order, then the count.
pub fn key_defines(registry: &KeyRegistry, prefix: &str) -> String {
    let mut out = String::new();
    for entry in registry.iter() {
        let _ = writeln!(
            out,
            "#define {prefix}_CONF_KEY_{} {}ULL",
            entry.identity, entry.id
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "#define {prefix}_CONF_KEY_COUNT {}", registry.len());
    out
}

/// The initializer of one leaf: each level's key in its own 16-bit lane.
///
/// # Example
///
/// ```
/// use apiconf::codegen::structure::composite_expr;
/// use apiconf::core::types::{KeyIdentity, OptionName};
///
/// let log = KeyIdentity::category(&OptionName::new("log").unwrap());
/// let path = KeyIdentity::leaf(&OptionName::new("path").unwrap());
/// assert_eq!(
///     composite_expr(&[&log, &path], "WT").unwrap(),
///     "WT_CONF_KEY_Log | (WT_CONF_KEY_path << 16)"
/// );
/// ```
pub fn composite_expr(path: &[&KeyIdentity], prefix: &str) -> Result<String, CompileError> {
    let shifts = lane_shifts(path.len()).ok_or_else(|| CompileError::KeyTooDeep {
        path: path
            .iter()
            .map(|identity| identity.as_str())
            .collect::<Vec<_>>()
            .join("."),
        depth: path.len(),
        max: MAX_NESTING_DEPTH,
    })?;
    let parts: Vec<_> = shifts
        .zip(path)
        .map(|(shift, identity)| {
            if shift == 0 {
                format!("{prefix}_CONF_KEY_{identity}")
            } else {
                format!("({prefix}_CONF_KEY_{identity} << {shift})")
            }
        })
        .collect();
    Ok(parts.join(" | "))
}

/// The key structure declaration with its initializer.
pub fn key_structure(tree: &KeyTree, prefix: &str) -> Result<String, CompileError> {
    let (declaration, initializer) = declare(tree, prefix)?;
    let mut out = String::new();
    let _ = writeln!(out, "static const struct {{");
    out.push_str(&declaration);
    let _ = writeln!(out, "}} {prefix}_CONF_KEY_STRUCTURE = {{");
    out.push_str(&initializer);
    let _ = writeln!(out, "}};");
    Ok(out)
}

/// Field declarations and initializers for a whole tree, in lock-step.
pub fn declare(tree: &KeyTree, prefix: &str) -> Result<(String, String), CompileError> {
    let mut fields = String::new();
    let mut inits = String::new();
    declare_level(tree, prefix, TOP_INDENT, &mut Vec::new(), &mut fields, &mut inits)?;
    Ok((fields, inits))
}

fn declare_level<'t>(
    tree: &'t KeyTree,
    prefix: &str,
    indent: &str,
    path: &mut Vec<&'t KeyIdentity>,
    fields: &mut String,
    inits: &mut String,
) -> Result<(), CompileError> {
    for (identity, node) in tree.children() {
        path.push(identity);
        match node {
            KeyNode::Leaf => {
                let _ = writeln!(fields, "{indent}uint64_t {identity};");
                let _ = writeln!(inits, "{indent}{},", composite_expr(path, prefix)?);
            }
            KeyNode::Category(sub) => {
                let _ = writeln!(fields, "{indent}struct {{");
                let _ = writeln!(inits, "{indent}{{");
                let nested = format!("{indent}{NESTED_INDENT}");
                declare_level(sub, prefix, &nested, path, fields, inits)?;
                let _ = writeln!(fields, "{indent}}} {identity};");
                let _ = writeln!(inits, "{indent}}},");
            }
        }
        path.pop();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::keys::pack_composite;
    use crate::core::schema::{Constraints, Method, OptionDef, OptionKind};
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

    fn schema(methods: Vec<(&str, Vec<OptionDef>)>) -> Schema {
        Schema::new(methods.into_iter().map(|(name, options)| Method {
            name: MethodName::new(name).unwrap(),
            options,
            compilable: false,
        }))
        .unwrap()
    }

    fn id(name: &str) -> KeyIdentity {
        KeyIdentity::leaf(&OptionName::new(name).unwrap())
    }

    #[test]
    fn slots_follow_sorted_names() {
        let schema = schema(vec![("WT_SESSION.open", vec![]), ("WT_CURSOR.close", vec![])]);
        assert_eq!(
            slot_defines(&schema, "WT"),
            "#define WT_CONFIG_ENTRY_WT_CURSOR_close 0\n#define WT_CONFIG_ENTRY_WT_SESSION_open 1\n"
        );
    }

    #[test]
    fn key_defines_sorted_with_count() {
        let schema = schema(vec![(
            "m",
            vec![
                opt("zeta", OptionKind::Int),
                opt("log", OptionKind::Category(vec![opt("alpha", OptionKind::Int)])),
            ],
        )]);
        let registry = KeyRegistry::build(&schema).unwrap();
        insta::assert_snapshot!(key_defines(&registry, "WT"), @r###"
        #define WT_CONF_KEY_Log 1ULL
        #define WT_CONF_KEY_alpha 2ULL
        #define WT_CONF_KEY_zeta 0ULL

        #define WT_CONF_KEY_COUNT 3
        "###);
    }

    #[test]
    fn structure_and_initializer() {
        let schema = schema(vec![
            ("a", vec![opt("verbose", OptionKind::List)]),
            (
                "b",
                vec![opt(
                    "log",
                    OptionKind::Category(vec![
                        opt("path", OptionKind::String),
                        opt("enabled", OptionKind::Boolean),
                    ]),
                )],
            ),
        ]);
        let tree = KeyTree::build(&schema).unwrap();
        insta::assert_snapshot!(key_structure(&tree, "WT").unwrap(), @r###"
        static const struct {
            struct {
              uint64_t enabled;
              uint64_t path;
            } Log;
            uint64_t verbose;
        } WT_CONF_KEY_STRUCTURE = {
            {
              WT_CONF_KEY_Log | (WT_CONF_KEY_enabled << 16),
              WT_CONF_KEY_Log | (WT_CONF_KEY_path << 16),
            },
            WT_CONF_KEY_verbose,
        };
        "###);
    }

    #[test]
    fn declaration_pairs_with_initializer() {
        let schema = schema(vec![(
            "m",
            vec![
                opt("x", OptionKind::Int),
                opt(
                    "a",
                    OptionKind::Category(vec![opt(
                        "b",
                        OptionKind::Category(vec![opt("c", OptionKind::Int)]),
                    )]),
                ),
            ],
        )]);
        let tree = KeyTree::build(&schema).unwrap();
        let (fields, inits) = declare(&tree, "WT").unwrap();
        let fields: Vec<_> = fields.lines().collect();
        let inits: Vec<_> = inits.lines().collect();
        assert_eq!(fields.len(), inits.len());

        for (field, init) in fields.iter().zip(&inits) {
            let field_indent = field.len() - field.trim_start().len();
            let init_indent = init.len() - init.trim_start().len();
            assert_eq!(field_indent, init_indent);
            if let Some(name) = field.trim().strip_prefix("uint64_t ") {
                let name = name.trim_end_matches(';');
                assert!(init.contains(&format!("WT_CONF_KEY_{name}")));
            }
        }
        assert!(inits
            .iter()
            .any(|l| l.trim() == "WT_CONF_KEY_A | (WT_CONF_KEY_B << 16) | (WT_CONF_KEY_c << 32),"));
    }

    /// Evaluate an initializer expression against registry IDs.
    fn evaluate(expr: &str, registry: &KeyRegistry) -> u64 {
        expr.split(" | ")
            .map(|term| {
                let term = term.trim_matches(|c| c == '(' || c == ')');
                let (name, shift) = match term.split_once(" << ") {
                    Some((name, shift)) => (name, shift.parse::<u32>().unwrap()),
                    None => (term, 0),
                };
                let identity = name.strip_prefix("WT_CONF_KEY_").unwrap();
                let entry = registry
                    .iter()
                    .find(|e| e.identity.as_str() == identity)
                    .unwrap();
                u64::from(entry.id) << shift
            })
            .fold(0, |key, lane| key | lane)
    }

    #[test]
    fn initializers_match_packed_keys() {
        let schema = schema(vec![(
            "m",
            vec![
                opt("x", OptionKind::Int),
                opt(
                    "a",
                    OptionKind::Category(vec![
                        opt("y", OptionKind::Int),
                        opt(
                            "b",
                            OptionKind::Category(vec![opt(
                                "c",
                                OptionKind::Category(vec![opt("z", OptionKind::Int)]),
                            )]),
                        ),
                    ]),
                ),
            ],
        )]);
        let registry = KeyRegistry::build(&schema).unwrap();
        let tree = KeyTree::build(&schema).unwrap();

        let paths = tree.leaf_paths();
        assert_eq!(paths.len(), 3);
        for path in paths {
            let ids: Vec<u16> = path.iter().map(|i| registry.id(i).unwrap()).collect();
            let expr = composite_expr(&path, "WT").unwrap();
            assert_eq!(Some(evaluate(&expr, &registry)), pack_composite(&ids), "{expr}");
        }
    }

    #[test]
    fn too_deep_path_rejected() {
        let ids: Vec<_> = ["a", "b", "c", "d", "e"].iter().map(|n| id(n)).collect();
        let path: Vec<_> = ids.iter().collect();
        assert!(matches!(
            composite_expr(&path, "WT"),
            Err(CompileError::KeyTooDeep { depth: 5, .. })
        ));
        assert!(composite_expr(&path[..4], "WT").is_ok());
    }
}
