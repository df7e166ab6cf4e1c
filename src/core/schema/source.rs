//! core::schema::source
//!
//! Loading a [`Schema`] from TOML or JSON.
//!
//! # Example
//!
//! ```toml
//! [methods."WT_SESSION.create"]
//! compilable = true
//!
//! [[methods."WT_SESSION.create".config]]
//! name = "allocation_size"
//! desc = "the file unit allocation size"
//! default = "4KB"
//! min = "512B"
//! max = "128MB"
//!
//! [[methods."WT_SESSION.create".config]]
//! name = "log"
//! type = "category"
//! desc = "the transaction log configuration"
//!
//! [[methods."WT_SESSION.create".config.subconfig]]
//! name = "enabled"
//! type = "boolean"
//! default = true
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{Bound, Constraints, Method, OptionDef, OptionKind, Schema, SchemaError};
use crate::core::types::{MethodName, OptionName};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawSchema {
    methods: BTreeMap<String, RawMethod>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawMethod {
    compilable: bool,
    config: Vec<RawOption>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOption {
    name: String,
    #[serde(default)]
    desc: String,
    #[serde(default)]
    default: Option<RawScalar>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    min: Option<RawScalar>,
    #[serde(default)]
    max: Option<RawScalar>,
    #[serde(default)]
    choices: Vec<String>,
    #[serde(default)]
    func: Option<String>,
    #[serde(default)]
    undoc: bool,
    #[serde(default)]
    subconfig: Vec<RawOption>,
}

/// A schema literal: defaults and bounds may be written as any scalar.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl RawScalar {
    fn into_text(self) -> String {
        match self {
            RawScalar::Bool(value) => value.to_string(),
            RawScalar::Int(value) => value.to_string(),
            RawScalar::Text(value) => value,
        }
    }

    fn into_bound(self, path: &str, which: &'static str) -> Result<Bound, SchemaError> {
        match self {
            RawScalar::Int(value) => Bound::from_int(value).ok_or(SchemaError::InvalidBound {
                path: path.to_string(),
                which,
                literal: value.to_string(),
            }),
            RawScalar::Text(text) => Bound::parse(&text).ok_or(SchemaError::InvalidBound {
                path: path.to_string(),
                which,
                literal: text,
            }),
            RawScalar::Bool(value) => Err(SchemaError::InvalidBound {
                path: path.to_string(),
                which,
                literal: value.to_string(),
            }),
        }
    }
}

impl RawOption {
    fn into_option(self, scope: &str) -> Result<OptionDef, SchemaError> {
        let name = OptionName::new(self.name)?;
        let path = format!("{scope}.{name}");

        let min = self.min.map(|m| m.into_bound(&path, "min")).transpose()?;
        let max = self.max.map(|m| m.into_bound(&path, "max")).transpose()?;

        if let Some(choice) = self
            .choices
            .iter()
            .find(|c| c.contains('"') || c.contains('\\'))
        {
            return Err(SchemaError::InvalidChoice {
                path,
                choice: choice.clone(),
            });
        }

        let has_subconfig = !self.subconfig.is_empty();

        // Only the fixed taxonomy: bounds imply int, anything else is a string.
        let kind_tag = match self.kind.as_deref() {
            Some(tag) => tag,
            None if min.is_some() || max.is_some() => "int",
            None => "string",
        };
        let kind = match kind_tag {
            "boolean" => OptionKind::Boolean,
            "int" => OptionKind::Int,
            "string" => OptionKind::String,
            "list" => OptionKind::List,
            "format" => OptionKind::Format,
            "category" => OptionKind::Category(
                self.subconfig
                    .into_iter()
                    .map(|sub| sub.into_option(&path))
                    .collect::<Result<_, _>>()?,
            ),
            other => {
                return Err(SchemaError::UnknownKind {
                    path,
                    kind: other.to_string(),
                })
            }
        };
        if !kind.is_category() && has_subconfig {
            return Err(SchemaError::SubconfigOnLeaf { path });
        }

        let default = self
            .default
            .map(RawScalar::into_text)
            .filter(|text| !text.is_empty());

        Ok(OptionDef {
            name,
            description: self.desc,
            default,
            kind,
            constraints: Constraints {
                min,
                max,
                choices: self.choices,
                validator: self.func.filter(|f| !f.is_empty()),
                undocumented: self.undoc,
            },
        })
    }
}

impl RawSchema {
    fn into_schema(self) -> Result<Schema, SchemaError> {
        let mut methods = Vec::with_capacity(self.methods.len());
        for (name, raw) in self.methods {
            let name = MethodName::new(name)?;
            let options = raw
                .config
                .into_iter()
                .map(|option| option.into_option(name.as_str()))
                .collect::<Result<_, _>>()?;
            methods.push(Method {
                name,
                options,
                compilable: raw.compilable,
            });
        }
        Schema::new(methods)
    }
}

impl Schema {
    /// Load a schema file. `.json` files are read as JSON, anything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Read`] or [`SchemaError::Parse`] for I/O and
    /// syntax problems, and the structural errors of [`Schema::new`].
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let raw: RawSchema = if is_json {
            serde_json::from_str(&content).map_err(|e| SchemaError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        } else {
            toml::from_str(&content).map_err(|e| SchemaError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };
        raw.into_schema()
    }

    /// Parse a schema from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, SchemaError> {
        let raw: RawSchema = toml::from_str(content).map_err(|e| SchemaError::Parse {
            path: "<inline>".into(),
            message: e.to_string(),
        })?;
        raw.into_schema()
    }

    /// Parse a schema from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self, SchemaError> {
        let raw: RawSchema = serde_json::from_str(content).map_err(|e| SchemaError::Parse {
            path: "<inline>".into(),
            message: e.to_string(),
        })?;
        raw.into_schema()
    }
}
