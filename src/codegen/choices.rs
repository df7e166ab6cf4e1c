//! codegen::choices
//!
//! Names for the arrays backing `choices` constraints.
//!
//! An option's array is named after the option. When that name is taken,
//! the smallest unused numeric suffix from 2 upwards is appended, in plan
//! order, so `format` in two methods yields `confchk_format_choices` and
//! `confchk_format2_choices`.

use std::collections::{BTreeMap, HashSet};

use super::plan::{Step, TablePlan};
use crate::core::schema::OptionDef;
use crate::core::types::OptionName;

/// One choice array to emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceArray<'s> {
    /// C symbol of the array.
    pub symbol: String,
    pub choices: &'s [String],
}

/// Every choice array of a plan, named once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ChoiceRegistry<'s> {
    arrays: Vec<ChoiceArray<'s>>,
    /// (record table, option name) to array index.
    uses: BTreeMap<(String, String), usize>,
}

impl<'s> ChoiceRegistry<'s> {
    /// Name every choice array in plan order.
    pub fn from_plan(plan: &TablePlan<'s>) -> Self {
        let mut registry = Self::default();
        let mut used = HashSet::new();

        for step in plan.steps() {
            if let Step::Choices { table, option } = step {
                let option: &'s OptionDef = *option;
                let stem = claim(&mut used, option.name.as_str());
                registry.uses.insert(
                    (table.clone(), option.name.as_str().to_string()),
                    registry.arrays.len(),
                );
                registry.arrays.push(ChoiceArray {
                    symbol: format!("confchk_{stem}_choices"),
                    choices: &option.constraints.choices,
                });
            }
        }
        registry
    }

    /// Symbol of the array for an option's record in `table`.
    pub fn symbol_for(&self, table: &str, option: &OptionName) -> Option<&str> {
        self.uses
            .get(&(table.to_string(), option.as_str().to_string()))
            .map(|&index| self.arrays[index].symbol.as_str())
    }

    /// Arrays in emission order.
    pub fn arrays(&self) -> &[ChoiceArray<'s>] {
        &self.arrays
    }

    /// Number of arrays.
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    /// Whether there are no arrays.
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }
}

fn claim(used: &mut HashSet<String>, stem: &str) -> String {
    if used.insert(stem.to_string()) {
        return stem.to_string();
    }
    let mut suffix = 2usize;
    loop {
        let candidate = format!("{stem}{suffix}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        suffix += 1;
    }
}
