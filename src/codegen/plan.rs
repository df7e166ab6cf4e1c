//! codegen::plan
//!
//! The order validation tables and choice arrays are emitted in.
//!
//! A record that references another array must come after it, so the walk
//! is post-order: while laying out a table, each category option first
//! plans its own sub-table, then the option's choice array, and only after
//! every option is visited does the enclosing table itself follow.
//!
//! Category tables are keyed by their derived name
//! (`confchk_<method>_<category>_subconfigs`). The first category to claim a
//! name is planned; later categories with the same derived name reuse that
//! table even if their options differ.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::core::schema::{Method, OptionDef, Schema};
use crate::core::types::MethodName;

/// What a record table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Top-level options of a method, in declaration order.
    Method,
    /// Sub-options of a category, sorted by name.
    Category,
}

/// One array of validation records.
#[derive(Debug, Clone)]
pub struct RecordTable<'s> {
    /// C symbol of the array.
    pub name: String,
    pub kind: TableKind,
    /// Method the table was first planned under.
    pub method: &'s MethodName,
    pub options: Vec<&'s OptionDef>,
}

/// One emission step.
#[derive(Debug, Clone)]
pub enum Step<'s> {
    /// A choice array for `option`, whose record lives in `table`.
    Choices { table: String, option: &'s OptionDef },
    /// A record table.
    Table(RecordTable<'s>),
}

/// The full, ordered emission plan for a schema.
#[derive(Debug, Clone, Default)]
pub struct TablePlan<'s> {
    steps: Vec<Step<'s>>,
    /// Table symbol to step index.
    tables: BTreeMap<String, usize>,
}

/// C symbol of a method's record table.
pub fn method_table_name(method: &MethodName) -> String {
    format!("confchk_{}", method.c_ident())
}

/// C symbol of a category's record table.
pub fn category_table_name(method: &MethodName, category: &OptionDef) -> String {
    format!("confchk_{}_{}_subconfigs", method.c_ident(), category.name)
}

impl<'s> TablePlan<'s> {
    /// Plan every table of a schema.
    pub fn build(schema: &'s Schema) -> Self {
        let mut plan = Self::default();
        let mut planned = HashSet::new();

        for method in schema.methods() {
            if method.options.is_empty() {
                continue;
            }
            let name = method_table_name(&method.name);
            let options: Vec<_> = method.options.iter().collect();
            plan.visit(method, &name, &options, &mut planned);
            plan.push_table(RecordTable {
                name,
                kind: TableKind::Method,
                method: &method.name,
                options,
            });
        }

        debug!(steps = plan.steps.len(), tables = plan.tables.len(), "planned tables");
        plan
    }

    fn visit(
        &mut self,
        method: &'s Method,
        table: &str,
        options: &[&'s OptionDef],
        planned: &mut HashSet<String>,
    ) {
        for &option in options {
            if option.kind.is_category() {
                let name = category_table_name(&method.name, option);
                if planned.insert(name.clone()) {
                    let sub = option.sorted_subconfig();
                    self.visit(method, &name, &sub, planned);
                    self.push_table(RecordTable {
                        name,
                        kind: TableKind::Category,
                        method: &method.name,
                        options: sub,
                    });
                }
            }
            if !option.constraints.choices.is_empty() {
                self.steps.push(Step::Choices {
                    table: table.to_string(),
                    option,
                });
            }
        }
    }

    fn push_table(&mut self, table: RecordTable<'s>) {
        self.tables.insert(table.name.clone(), self.steps.len());
        self.steps.push(Step::Table(table));
    }

    /// Steps in emission order.
    pub fn steps(&self) -> &[Step<'s>] {
        &self.steps
    }

    /// Look up a planned table by symbol.
    pub fn table(&self, name: &str) -> Option<&RecordTable<'s>> {
        match self.tables.get(name).map(|&index| &self.steps[index]) {
            Some(Step::Table(table)) => Some(table),
            _ => None,
        }
    }

    /// Record count of a planned table.
    pub fn table_len(&self, name: &str) -> Option<usize> {
        self.table(name).map(|table| table.options.len())
    }

    /// Record tables in emission order.
    pub fn tables(&self) -> impl Iterator<Item = &RecordTable<'s>> {
        self.steps.iter().filter_map(|step| match step {
            Step::Table(table) => Some(table),
            Step::Choices { .. } => None,
        })
    }
}
