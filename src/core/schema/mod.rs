//! core::schema
//!
//! The in-memory schema model: methods and their option trees.
//!
//! # Overview
//!
//! A [`Schema`] is a set of [`Method`]s keyed by [`MethodName`]. Each method
//! owns an ordered list of [`OptionDef`]s. An option's [`OptionKind`] is a
//! closed set; only [`OptionKind::Category`] carries a nested option list.
//!
//! # Invariants
//!
//! Enforced by [`Schema::new`], so every emitter can rely on them:
//! - Option names are unique within their immediate parent
//! - Method names map to distinct C identifiers
//! - Every category holds at least one option
//! - Nesting never exceeds [`MAX_NESTING_DEPTH`] levels
//! - Methods iterate in byte-wise name order
//!
//! The schema is read-only once built.

mod source;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

use thiserror::Error;

use super::types::{KeyIdentity, MethodName, OptionName, TypeError};

/// Deepest option nesting a schema may use.
///
/// Composite keys pack one 16-bit registry ID per level into a `u64`.
pub const MAX_NESTING_DEPTH: usize = 4;

/// Errors from loading or validating a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse schema '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("duplicate method '{0}'")]
    DuplicateMethod(String),

    #[error("methods '{first}' and '{second}' both map to the C name '{symbol}'")]
    MethodSymbolClash {
        first: String,
        second: String,
        symbol: String,
    },

    #[error("category '{path}' has no options")]
    EmptyCategory { path: String },

    #[error("duplicate option '{name}' in {scope}")]
    DuplicateOption { scope: String, name: String },

    #[error("option '{path}': unknown type '{kind}'")]
    UnknownKind { path: String, kind: String },

    #[error("option '{path}': subconfig is only allowed on categories")]
    SubconfigOnLeaf { path: String },

    #[error("option '{path}': invalid {which} bound '{literal}'")]
    InvalidBound {
        path: String,
        which: &'static str,
        literal: String,
    },

    #[error("option '{path}': choice {choice:?} cannot contain quotes or backslashes")]
    InvalidChoice { path: String, choice: String },

    #[error("option '{path}' nests {depth} levels deep, composite keys hold at most {max}")]
    NestingTooDeep {
        path: String,
        depth: usize,
        max: usize,
    },
}

/// A validated schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    methods: BTreeMap<MethodName, Method>,
}

impl Schema {
    /// Build a schema, checking structural invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] for duplicate methods, methods whose C
    /// names collide, duplicate options within one scope, empty categories,
    /// or nesting deeper than [`MAX_NESTING_DEPTH`].
    pub fn new(methods: impl IntoIterator<Item = Method>) -> Result<Self, SchemaError> {
        let mut map = BTreeMap::new();
        let mut symbols: HashMap<String, MethodName> = HashMap::new();
        for method in methods {
            validate_scope(method.name.as_str(), &method.options, 1)?;
            if map.contains_key(&method.name) {
                return Err(SchemaError::DuplicateMethod(method.name.to_string()));
            }
            let symbol = method.name.c_ident();
            if let Some(first) = symbols.get(&symbol) {
                return Err(SchemaError::MethodSymbolClash {
                    first: first.to_string(),
                    second: method.name.to_string(),
                    symbol,
                });
            }
            symbols.insert(symbol, method.name.clone());
            map.insert(method.name.clone(), method);
        }
        Ok(Self { methods: map })
    }

    /// Methods in sorted name order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.values()
    }

    /// Methods with their slots. Every emitter numbers methods from here.
    pub fn slots(&self) -> impl Iterator<Item = (usize, &Method)> {
        self.methods.values().enumerate()
    }

    /// Look up a method by name.
    pub fn method(&self, name: &str) -> Option<&Method> {
        MethodName::new(name)
            .ok()
            .and_then(|name| self.methods.get(&name))
    }

    /// Slot of a method: its rank in sorted name order.
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.slots()
            .find(|(_, method)| method.name.as_str() == name)
            .map(|(slot, _)| slot)
    }

    /// Number of methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether the schema has no methods.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

fn validate_scope(scope: &str, options: &[OptionDef], depth: usize) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for option in options {
        if !seen.insert(option.name.as_str()) {
            return Err(SchemaError::DuplicateOption {
                scope: scope.to_string(),
                name: option.name.to_string(),
            });
        }
        let path = format!("{scope}.{}", option.name);
        if depth > MAX_NESTING_DEPTH {
            return Err(SchemaError::NestingTooDeep {
                path,
                depth,
                max: MAX_NESTING_DEPTH,
            });
        }
        if let OptionKind::Category(subconfig) = &option.kind {
            if subconfig.is_empty() {
                return Err(SchemaError::EmptyCategory { path });
            }
            validate_scope(&path, subconfig, depth + 1)?;
        }
    }
    Ok(())
}

/// One API method and the options it accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: MethodName,
    /// Top-level options in declaration order.
    pub options: Vec<OptionDef>,
    /// Whether the runtime may precompile this method's configuration.
    pub compilable: bool,
}

/// One configuration option or category.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDef {
    pub name: OptionName,
    pub description: String,
    /// Default literal; `None` when the schema gives none (or an empty one).
    pub default: Option<String>,
    pub kind: OptionKind,
    pub constraints: Constraints,
}

impl OptionDef {
    /// The identity this option is numbered under.
    pub fn identity(&self) -> KeyIdentity {
        if self.kind.is_category() {
            KeyIdentity::category(&self.name)
        } else {
            KeyIdentity::leaf(&self.name)
        }
    }

    /// Nested options in declaration order; empty for leaves.
    pub fn subconfig(&self) -> &[OptionDef] {
        match &self.kind {
            OptionKind::Category(subconfig) => subconfig,
            _ => &[],
        }
    }

    /// Nested options sorted by name.
    pub fn sorted_subconfig(&self) -> Vec<&OptionDef> {
        let mut sorted: Vec<_> = self.subconfig().iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        sorted
    }

    /// Whether the option appears in generated documentation.
    pub fn is_documented(&self) -> bool {
        !self.constraints.undocumented
    }

    /// The default literal, or `""`.
    pub fn default_str(&self) -> &str {
        self.default.as_deref().unwrap_or("")
    }
}

/// The closed set of option kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionKind {
    Boolean,
    Int,
    String,
    List,
    Format,
    /// A named group of options.
    Category(Vec<OptionDef>),
}

impl OptionKind {
    /// Schema spelling of the kind (`"int"`, `"category"`, ...).
    pub fn tag(&self) -> &'static str {
        match self {
            OptionKind::Boolean => "boolean",
            OptionKind::Int => "int",
            OptionKind::String => "string",
            OptionKind::List => "list",
            OptionKind::Format => "format",
            OptionKind::Category(_) => "category",
        }
    }

    /// Whether this is a category.
    pub fn is_category(&self) -> bool {
        matches!(self, OptionKind::Category(_))
    }
}

/// Validation constraints attached to an option.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub min: Option<Bound>,
    pub max: Option<Bound>,
    /// Allowed values, in schema order.
    pub choices: Vec<String>,
    /// Name of an external validator function.
    pub validator: Option<String>,
    /// Suppresses the option from generated documentation.
    pub undocumented: bool,
}

/// Byte-magnitude multipliers accepted on numeric bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteUnit {
    Kilo,
    Mega,
    Giga,
    Tera,
    Peta,
}

impl ByteUnit {
    /// Suffix of the named unit constant (`KILOBYTE`, ...).
    pub fn constant(&self) -> &'static str {
        match self {
            ByteUnit::Kilo => "KILOBYTE",
            ByteUnit::Mega => "MEGABYTE",
            ByteUnit::Giga => "GIGABYTE",
            ByteUnit::Tera => "TERABYTE",
            ByteUnit::Peta => "PETABYTE",
        }
    }

    /// Value of the unit constant.
    pub fn multiplier(&self) -> i64 {
        match self {
            ByteUnit::Kilo => 1 << 10,
            ByteUnit::Mega => 1 << 20,
            ByteUnit::Giga => 1 << 30,
            ByteUnit::Tera => 1 << 40,
            ByteUnit::Peta => 1 << 50,
        }
    }
}

/// Magnitudes above this get a wide literal suffix.
const WIDE_LITERAL_THRESHOLD: u64 = 1_000_000;

/// A numeric min/max literal, possibly with byte-unit suffixes (`"10MB"`).
///
/// The literal text is kept for check strings and documentation; the C
/// expression multiplies against unit constants instead of pre-computing.
///
/// # Example
///
/// ```
/// use apiconf::core::schema::Bound;
///
/// let bound = Bound::parse("512MB").unwrap();
/// assert_eq!(bound.literal(), "512MB");
/// assert_eq!(bound.c_expr("WT"), "512LL * WT_MEGABYTE");
///
/// assert_eq!(Bound::parse("10").unwrap().c_expr("WT"), "10");
/// assert_eq!(Bound::parse("2000000").unwrap().c_expr("WT"), "2000000LL");
/// assert!(Bound::parse("lots").is_none());
/// assert!(Bound::parse("10000000000000000000").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    literal: String,
    negative: bool,
    magnitude: u64,
    units: Vec<ByteUnit>,
}

impl Bound {
    /// Parse a bound literal: optional `-`, digits, then unit letters
    /// (`b`, `k`, `m`, `g`, `t`, `p` in any case; `b` is a no-op).
    ///
    /// Returns `None` unless the value, units applied, fits in an `int64_t`
    /// without relying on `INT64_MIN`.
    pub fn parse(literal: &str) -> Option<Self> {
        let text = literal.trim();
        let (negative, rest) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (digits, suffix) = rest.split_at(digits_end);
        if digits.is_empty() {
            return None;
        }
        let magnitude = digits.parse::<u64>().ok()?;

        let mut units = Vec::new();
        for c in suffix.chars() {
            match c.to_ascii_lowercase() {
                'b' => {}
                'k' => units.push(ByteUnit::Kilo),
                'm' => units.push(ByteUnit::Mega),
                'g' => units.push(ByteUnit::Giga),
                't' => units.push(ByteUnit::Tera),
                'p' => units.push(ByteUnit::Peta),
                _ => return None,
            }
        }

        let bound = Self {
            literal: text.to_string(),
            negative,
            magnitude,
            units,
        };
        bound.fits().then_some(bound)
    }

    /// A bound from an integer literal; `None` for `i64::MIN`.
    pub fn from_int(value: i64) -> Option<Self> {
        let bound = Self {
            literal: value.to_string(),
            negative: value < 0,
            magnitude: value.unsigned_abs(),
            units: Vec::new(),
        };
        bound.fits().then_some(bound)
    }

    /// Whether the magnitude times every unit stays within `i64::MAX`.
    fn fits(&self) -> bool {
        let Ok(magnitude) = i64::try_from(self.magnitude) else {
            return false;
        };
        self.units
            .iter()
            .try_fold(magnitude, |value, unit| value.checked_mul(unit.multiplier()))
            .is_some()
    }

    /// The literal as written in the schema.
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// Unit multipliers in the order written.
    pub fn units(&self) -> &[ByteUnit] {
        &self.units
    }

    /// C expression for the bound, e.g. `4LL * WT_KILOBYTE`.
    pub fn c_expr(&self, prefix: &str) -> String {
        let mut expr = String::new();
        if self.negative {
            expr.push('-');
        }
        expr.push_str(&self.magnitude.to_string());
        if self.magnitude > WIDE_LITERAL_THRESHOLD || !self.units.is_empty() {
            expr.push_str("LL");
        }
        for unit in &self.units {
            expr.push_str(&format!(" * {prefix}_{}", unit.constant()));
        }
        expr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, kind: OptionKind) -> OptionDef {
        OptionDef {
            name: OptionName::new(name).unwrap(),
            description: String::new(),
            default: None,
            kind,
            constraints: Constraints::default(),
        }
    }

    fn method(name: &str, options: Vec<OptionDef>) -> Method {
        Method {
            name: MethodName::new(name).unwrap(),
            options,
            compilable: false,
        }
    }

    mod bounds {
        use super::*;

        #[test]
        fn plain_number() {
            let bound = Bound::parse("100").unwrap();
            assert_eq!(bound.c_expr("WT"), "100");
            assert!(bound.units().is_empty());
        }

        #[test]
        fn negative_number() {
            assert_eq!(Bound::parse("-1").unwrap().c_expr("WT"), "-1");
        }

        #[test]
        fn large_number_is_wide() {
            assert_eq!(Bound::parse("1000001").unwrap().c_expr("WT"), "1000001LL");
            assert_eq!(Bound::parse("1000000").unwrap().c_expr("WT"), "1000000");
        }

        #[test]
        fn byte_suffix_is_noop() {
            assert_eq!(Bound::parse("10B").unwrap().c_expr("WT"), "10");
        }

        #[test]
        fn unit_suffixes() {
            assert_eq!(Bound::parse("4KB").unwrap().c_expr("WT"), "4LL * WT_KILOBYTE");
            assert_eq!(Bound::parse("10GB").unwrap().c_expr("X"), "10LL * X_GIGABYTE");
            assert_eq!(Bound::parse("1t").unwrap().c_expr("WT"), "1LL * WT_TERABYTE");
            assert_eq!(Bound::parse("2P").unwrap().c_expr("WT"), "2LL * WT_PETABYTE");
        }

        #[test]
        fn rejects_garbage() {
            assert!(Bound::parse("").is_none());
            assert!(Bound::parse("MB").is_none());
            assert!(Bound::parse("10XB").is_none());
            assert!(Bound::parse("-").is_none());
        }

        #[test]
        fn from_int_keeps_literal() {
            let bound = Bound::from_int(-20).unwrap();
            assert_eq!(bound.literal(), "-20");
            assert_eq!(bound.c_expr("WT"), "-20");
        }

        #[test]
        fn out_of_range_rejected() {
            assert!(Bound::parse("10000000000000000000").is_none());
            assert!(Bound::parse("-9223372036854775808").is_none());
            assert!(Bound::parse("9223372036854775807").is_some());
            assert!(Bound::parse("-9223372036854775807").is_some());
            assert!(Bound::from_int(i64::MIN).is_none());
            assert!(Bound::from_int(i64::MAX).is_some());
        }

        #[test]
        fn unit_overflow_rejected() {
            assert!(Bound::parse("8191PB").is_some());
            assert!(Bound::parse("8192PB").is_none());
            assert!(Bound::parse("1PPP").is_none());
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn duplicate_option_rejected() {
            let result = Schema::new(vec![method(
                "m",
                vec![leaf("x", OptionKind::Int), leaf("x", OptionKind::String)],
            )]);
            assert!(matches!(result, Err(SchemaError::DuplicateOption { .. })));
        }

        #[test]
        fn same_name_in_different_scopes_allowed() {
            let category = leaf("c", OptionKind::Category(vec![leaf("x", OptionKind::Int)]));
            let result = Schema::new(vec![method("m", vec![leaf("x", OptionKind::Int), category])]);
            assert!(result.is_ok());
        }

        #[test]
        fn empty_category_rejected() {
            let result = Schema::new(vec![method(
                "m",
                vec![leaf("log", OptionKind::Category(vec![]))],
            )]);
            match result {
                Err(SchemaError::EmptyCategory { path }) => assert_eq!(path, "m.log"),
                other => panic!("expected empty category, got {other:?}"),
            }
        }

        #[test]
        fn nested_empty_category_rejected() {
            let outer = leaf(
                "outer",
                OptionKind::Category(vec![leaf("inner", OptionKind::Category(vec![]))]),
            );
            let result = Schema::new(vec![method("m", vec![outer])]);
            assert!(matches!(
                result,
                Err(SchemaError::EmptyCategory { path }) if path == "m.outer.inner"
            ));
        }

        #[test]
        fn clashing_method_symbols_rejected() {
            let result = Schema::new(vec![method("a.b", vec![]), method("a_b", vec![])]);
            match result {
                Err(SchemaError::MethodSymbolClash { first, second, symbol }) => {
                    assert_eq!((first.as_str(), second.as_str()), ("a.b", "a_b"));
                    assert_eq!(symbol, "a_b");
                }
                other => panic!("expected symbol clash, got {other:?}"),
            }
        }

        #[test]
        fn duplicate_method_rejected() {
            let result = Schema::new(vec![method("m", vec![]), method("m", vec![])]);
            assert!(matches!(result, Err(SchemaError::DuplicateMethod(_))));
        }

        #[test]
        fn nesting_limit() {
            let mut option = leaf("x", OptionKind::Int);
            for depth in 0..MAX_NESTING_DEPTH - 1 {
                option = leaf(&format!("c{depth}"), OptionKind::Category(vec![option]));
            }
            assert!(Schema::new(vec![method("m", vec![option.clone()])]).is_ok());

            let too_deep = leaf("outer", OptionKind::Category(vec![option]));
            let result = Schema::new(vec![method("m", vec![too_deep])]);
            assert!(matches!(
                result,
                Err(SchemaError::NestingTooDeep { depth: 5, .. })
            ));
        }

        #[test]
        fn methods_sorted_and_slotted() {
            let schema = Schema::new(vec![
                method("b", vec![]),
                method("a.z", vec![]),
                method("a", vec![]),
            ])
            .unwrap();
            let names: Vec<_> = schema.methods().map(|m| m.name.as_str()).collect();
            assert_eq!(names, vec!["a", "a.z", "b"]);
            assert_eq!(schema.slot_of("a.z"), Some(1));
            assert_eq!(schema.slot_of("missing"), None);
            let slots: Vec<_> = schema.slots().map(|(slot, m)| (slot, m.name.as_str())).collect();
            assert_eq!(slots, vec![(0, "a"), (1, "a.z"), (2, "b")]);
        }
    }

    #[test]
    fn identity_depends_on_kind() {
        let category = leaf("log", OptionKind::Category(vec![]));
        assert_eq!(category.identity().as_str(), "Log");
        assert_eq!(leaf("log", OptionKind::Boolean).identity().as_str(), "log");
    }

    #[test]
    fn sorted_subconfig_orders_by_name() {
        let category = leaf(
            "c",
            OptionKind::Category(vec![
                leaf("zeta", OptionKind::Int),
                leaf("alpha", OptionKind::Int),
            ]),
        );
        let names: Vec<_> = category
            .sorted_subconfig()
            .iter()
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(category.subconfig()[0].name.as_str(), "zeta");
    }
}
