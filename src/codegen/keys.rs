//! codegen::keys
//!
//! Global key numbering and the merged key tree.
//!
//! # Numbering
//!
//! [`KeyRegistry::build`] visits methods in sorted name order and each
//! option tree depth-first in declaration order. The first time a
//! [`KeyIdentity`] is seen it gets the next integer; later sightings reuse
//! it. A leaf named `x` in two methods shares one ID; a leaf `x` and a
//! category `x` do not, because their identities differ (`x` vs `X`).
//!
//! # Composite keys
//!
//! A nested option path packs one ID per level into a `u64`, 16 bits per
//! level. The outermost category sits in the lowest lane and the leaf in the
//! highest used lane:
//!
//! ```
//! use apiconf::codegen::keys::pack_composite;
//!
//! assert_eq!(pack_composite(&[3]), Some(3));
//! assert_eq!(pack_composite(&[3, 7]), Some(3 | (7 << 16)));
//! assert_eq!(pack_composite(&[1, 2, 3, 4, 5]), None);
//! ```

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::CompileError;
use crate::core::schema::{OptionDef, Schema, MAX_NESTING_DEPTH};
use crate::core::types::KeyIdentity;

/// Bits per composite-key lane.
pub const LANE_BITS: u32 = 16;

/// Most IDs one lane can carry.
pub const MAX_KEYS: usize = 1 << LANE_BITS;

/// Structural role of a numbered identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyRole {
    Leaf,
    Category,
}

impl KeyRole {
    fn of(option: &OptionDef) -> Self {
        if option.kind.is_category() {
            KeyRole::Category
        } else {
            KeyRole::Leaf
        }
    }
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRole::Leaf => write!(f, "leaf"),
            KeyRole::Category => write!(f, "category"),
        }
    }
}

/// One numbered identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyEntry {
    pub identity: KeyIdentity,
    pub id: u16,
    pub role: KeyRole,
}

/// Bijection from key identity to ID, fixed once built.
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    /// Entries in allocation order, so `entries[id].id == id`.
    entries: Vec<KeyEntry>,
    index: BTreeMap<KeyIdentity, usize>,
}

impl KeyRegistry {
    /// Number every option identity in the schema.
    ///
    /// # Errors
    ///
    /// - [`CompileError::KeyKindConflict`] if one identity is used both as a
    ///   leaf and as a category (a leaf `Log` and a category `log`)
    /// - [`CompileError::KeyOverflow`] if the schema has more identities
    ///   than one composite-key lane can number
    pub fn build(schema: &Schema) -> Result<Self, CompileError> {
        let mut registry = Self::default();
        for method in schema.methods() {
            registry.add_all(&method.options)?;
        }
        debug!(keys = registry.len(), "built key registry");
        Ok(registry)
    }

    fn add_all(&mut self, options: &[OptionDef]) -> Result<(), CompileError> {
        for option in options {
            self.add(option)?;
            self.add_all(option.subconfig())?;
        }
        Ok(())
    }

    fn add(&mut self, option: &OptionDef) -> Result<(), CompileError> {
        let identity = option.identity();
        let role = KeyRole::of(option);

        if let Some(&index) = self.index.get(&identity) {
            let existing = self.entries[index].role;
            if existing != role {
                return Err(CompileError::KeyKindConflict {
                    identity: identity.to_string(),
                    existing,
                    found: role,
                });
            }
            return Ok(());
        }

        let id = u16::try_from(self.entries.len())
            .map_err(|_| CompileError::KeyOverflow { max: MAX_KEYS })?;
        self.index.insert(identity.clone(), self.entries.len());
        self.entries.push(KeyEntry { identity, id, role });
        Ok(())
    }

    /// ID of an identity.
    pub fn id(&self, identity: &KeyIdentity) -> Option<u16> {
        self.index.get(identity).map(|&index| self.entries[index].id)
    }

    /// ID of an option's identity.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::MissingKey`] if the option was not part of
    /// the schema the registry was built from.
    pub fn id_of(&self, option: &OptionDef) -> Result<u16, CompileError> {
        let identity = option.identity();
        self.id(&identity)
            .ok_or_else(|| CompileError::MissingKey(identity.to_string()))
    }

    /// Entries sorted by identity.
    pub fn iter(&self) -> impl Iterator<Item = &KeyEntry> {
        self.index.values().map(|&index| &self.entries[index])
    }

    /// Entries in ID order.
    pub fn by_id(&self) -> &[KeyEntry] {
        &self.entries
    }

    /// Number of identities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no identity was registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bit offsets of each level's lane, outermost first.
///
/// Returns `None` for more than [`MAX_NESTING_DEPTH`] levels. Both
/// [`pack_composite`] and the emitted key initializers lay keys out from
/// here.
pub fn lane_shifts(depth: usize) -> Option<impl Iterator<Item = u32>> {
    (depth <= MAX_NESTING_DEPTH).then(|| (0..depth as u32).map(|lane| lane * LANE_BITS))
}

/// Pack a chain of IDs, outermost first, into one composite key.
///
/// Returns `None` for more than [`MAX_NESTING_DEPTH`] levels.
pub fn pack_composite(ids: &[u16]) -> Option<u64> {
    Some(
        lane_shifts(ids.len())?
            .zip(ids)
            .fold(0u64, |key, (shift, &id)| key | (u64::from(id) << shift)),
    )
}

/// Split a composite key back into `depth` IDs, outermost first.
pub fn unpack_composite(key: u64, depth: usize) -> Vec<u16> {
    lane_shifts(depth.min(MAX_NESTING_DEPTH))
        .into_iter()
        .flatten()
        .map(|shift| ((key >> shift) & 0xffff) as u16)
        .collect()
}

/// A node of the merged key tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyNode {
    Leaf,
    Category(KeyTree),
}

/// Union of every method's option tree, merged by key identity.
///
/// Children iterate in identity order, which is the order both the key
/// structure declaration and its initializer are emitted in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyTree {
    children: BTreeMap<KeyIdentity, KeyNode>,
}

impl KeyTree {
    /// Merge every method's options into one tree.
    ///
    /// Categories sharing an identity contribute the union of their
    /// sub-options.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::KeyKindConflict`] when an identity is a leaf
    /// in one place and a category in another.
    pub fn build(schema: &Schema) -> Result<Self, CompileError> {
        let mut tree = Self::default();
        for method in schema.methods() {
            tree.merge(&method.options)?;
        }
        Ok(tree)
    }

    fn merge(&mut self, options: &[OptionDef]) -> Result<(), CompileError> {
        for option in options {
            let identity = option.identity();
            let conflict = |existing: KeyRole, found: KeyRole| CompileError::KeyKindConflict {
                identity: option.identity().to_string(),
                existing,
                found,
            };

            match self.children.entry(identity) {
                Entry::Vacant(slot) => {
                    if option.kind.is_category() {
                        let mut sub = KeyTree::default();
                        sub.merge(option.subconfig())?;
                        slot.insert(KeyNode::Category(sub));
                    } else {
                        slot.insert(KeyNode::Leaf);
                    }
                }
                Entry::Occupied(mut slot) => match (slot.get_mut(), option.kind.is_category()) {
                    (KeyNode::Category(sub), true) => sub.merge(option.subconfig())?,
                    (KeyNode::Leaf, false) => {}
                    (KeyNode::Category(_), false) => {
                        return Err(conflict(KeyRole::Category, KeyRole::Leaf))
                    }
                    (KeyNode::Leaf, true) => {
                        return Err(conflict(KeyRole::Leaf, KeyRole::Category))
                    }
                },
            }
        }
        Ok(())
    }

    /// Children in identity order.
    pub fn children(&self) -> impl Iterator<Item = (&KeyIdentity, &KeyNode)> {
        self.children.iter()
    }

    /// Whether the tree has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Every leaf path, outermost identity first, in emission order.
    pub fn leaf_paths(&self) -> Vec<Vec<&KeyIdentity>> {
        let mut paths = Vec::new();
        self.collect_paths(&mut Vec::new(), &mut paths);
        paths
    }

    fn collect_paths<'a>(
        &'a self,
        prefix: &mut Vec<&'a KeyIdentity>,
        out: &mut Vec<Vec<&'a KeyIdentity>>,
    ) {
        for (identity, node) in &self.children {
            prefix.push(identity);
            match node {
                KeyNode::Leaf => out.push(prefix.clone()),
                KeyNode::Category(sub) => sub.collect_paths(prefix, out),
            }
            prefix.pop();
        }
    }
}
