//! Block registry: maps dense [`BlockStateId`] values to rich [`Block`] descriptors.
//!
//! Every distinct `(block type, variant states)` pair gets its own id, assigned
//! in registration order. The registry is built once at startup and passed by
//! reference to whatever needs to resolve ids; chunks only ever store the ids.
//! Air is always id 0 so that a freshly created chunk represents empty space.

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Dense identifier of one resolved (block type, variant) pair.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BlockStateId(pub u32);

impl BlockStateId {
    /// The empty block every registry starts with.
    pub const AIR: Self = Self(0);

    /// Returns the id as a `usize` index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockStateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Variant properties of a block state, e.g. `axis=y` or `facing=north`.
///
/// Sorted so that two maps with the same pairs compare and hash equal.
pub type BlockStates = BTreeMap<String, String>;

/// Transparency mode for a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transparency {
    /// Fully blocks light and visibility.
    Opaque,
    /// Partially transparent (e.g. water, leaves).
    SemiTransparent,
    /// Completely transparent (e.g. air).
    FullyTransparent,
}

/// Per-variant properties that may be overridden after registration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockProperties {
    /// Name shown to players.
    pub display_name: String,
    /// Whether entities collide with this block.
    pub solid: bool,
    /// Transparency mode.
    pub transparency: Transparency,
    /// Whether the block reacts to player interaction.
    pub interactive: bool,
}

impl Default for BlockProperties {
    fn default() -> Self {
        Self {
            display_name: String::new(),
            solid: true,
            transparency: Transparency::Opaque,
            interactive: false,
        }
    }
}

/// Full descriptor for one block state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Id assigned by the registry.
    pub id: BlockStateId,
    /// Block type name (e.g. "stone", "log").
    pub block_type: String,
    /// Variant properties distinguishing this state from its siblings.
    pub states: BlockStates,
    /// Overridable properties.
    pub properties: BlockProperties,
}

impl Block {
    /// Returns `true` if every pair in `filter` is present in this block's states.
    pub fn matches(&self, filter: &BlockStates) -> bool {
        filter
            .iter()
            .all(|(key, value)| self.states.get(key) == Some(value))
    }
}

/// Errors that can occur during block registration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// This exact block type and variant combination is already registered.
    #[error("duplicate block state: {block_type} {states:?}")]
    DuplicateState {
        /// Block type name.
        block_type: String,
        /// Variant properties.
        states: BlockStates,
    },
    /// The registry has reached its configured state limit.
    #[error("block registry is full (max {0} states)")]
    RegistryFull(usize),
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps [`BlockStateId`] → [`Block`] with O(1) lookup by id and by
/// `(type, states)`.
#[derive(Debug)]
pub struct BlockRegistry {
    /// Dense array where `index == BlockStateId.0`.
    blocks: Vec<Block>,
    /// Reverse lookup: `(type, states)` → id.
    by_key: FxHashMap<(String, BlockStates), BlockStateId>,
    /// Ids of every variant of a type, in registration order.
    by_type: FxHashMap<String, Vec<BlockStateId>>,
    /// Maximum number of states, including air.
    limit: usize,
}

impl BlockRegistry {
    /// Upper bound on the number of states a registry may hold.
    pub const MAX_STATES: usize = u32::MAX as usize;

    /// Creates a new registry with Air pre-registered as id 0.
    pub fn new() -> Self {
        Self::with_limit(Self::MAX_STATES)
    }

    /// Creates a registry that refuses to grow beyond `limit` states.
    pub fn with_limit(limit: usize) -> Self {
        let mut registry = Self {
            blocks: Vec::new(),
            by_key: FxHashMap::default(),
            by_type: FxHashMap::default(),
            limit: limit.clamp(1, Self::MAX_STATES),
        };
        let air = BlockProperties {
            display_name: "Air".to_string(),
            solid: false,
            transparency: Transparency::FullyTransparent,
            interactive: false,
        };
        registry.insert("air", BlockStates::new(), air);
        registry
    }

    /// Registers one variant of `block_type` and returns its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateState`] if this exact variant already
    /// exists, or [`RegistryError::RegistryFull`] if the state limit is reached.
    pub fn register(
        &mut self,
        block_type: &str,
        states: BlockStates,
        properties: BlockProperties,
    ) -> Result<BlockStateId, RegistryError> {
        if self
            .by_key
            .contains_key(&(block_type.to_string(), states.clone()))
        {
            return Err(RegistryError::DuplicateState {
                block_type: block_type.to_string(),
                states,
            });
        }
        if self.blocks.len() >= self.limit {
            return Err(RegistryError::RegistryFull(self.limit));
        }
        Ok(self.insert(block_type, states, properties))
    }

    fn insert(
        &mut self,
        block_type: &str,
        states: BlockStates,
        properties: BlockProperties,
    ) -> BlockStateId {
        let id = BlockStateId(self.blocks.len() as u32);
        self.by_key
            .insert((block_type.to_string(), states.clone()), id);
        self.by_type
            .entry(block_type.to_string())
            .or_default()
            .push(id);
        self.blocks.push(Block {
            id,
            block_type: block_type.to_string(),
            states,
            properties,
        });
        id
    }

    /// Returns the number of registered states. Valid ids are `0..state_count()`.
    pub fn state_count(&self) -> u32 {
        self.blocks.len() as u32
    }

    /// Returns the block for `id`, or `None` if it was never registered.
    pub fn get(&self, id: BlockStateId) -> Option<&Block> {
        self.blocks.get(id.index())
    }

    /// Returns the block for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range. Ids stored in chunks are validated
    /// against [`state_count`](Self::state_count) on write, so this only fires
    /// when a chunk is resolved against the wrong registry.
    pub fn block(&self, id: BlockStateId) -> &Block {
        &self.blocks[id.index()]
    }

    /// Returns the id of an exact variant.
    pub fn lookup(&self, block_type: &str, states: &BlockStates) -> Option<BlockStateId> {
        self.by_key
            .get(&(block_type.to_string(), states.clone()))
            .copied()
    }

    /// Returns the first registered variant of `block_type`.
    pub fn default_state(&self, block_type: &str) -> Option<BlockStateId> {
        self.by_type
            .get(block_type)
            .and_then(|ids| ids.first())
            .copied()
    }

    /// Returns every variant of `block_type` whose states contain all pairs in
    /// `filter`. An empty filter matches every variant.
    pub fn query(&self, block_type: &str, filter: &BlockStates) -> Vec<BlockStateId> {
        self.by_type
            .get(block_type)
            .map(|ids| {
                ids.iter()
                    .copied()
                    .filter(|id| self.blocks[id.index()].matches(filter))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Applies `apply` to the properties of every variant matched by
    /// [`query`](Self::query) and returns how many were touched.
    ///
    /// ```
    /// use cybrion_voxel::{BlockProperties, BlockRegistry, BlockStates};
    ///
    /// let mut registry = BlockRegistry::new();
    /// for axis in ["x", "y", "z"] {
    ///     let states = BlockStates::from([("axis".to_string(), axis.to_string())]);
    ///     registry.register("log", states, BlockProperties::default()).unwrap();
    /// }
    /// let touched = registry.override_matching("log", &BlockStates::new(), |props| {
    ///     props.display_name = "Oak Log".to_string();
    /// });
    /// assert_eq!(touched, 3);
    /// ```
    pub fn override_matching(
        &mut self,
        block_type: &str,
        filter: &BlockStates,
        mut apply: impl FnMut(&mut BlockProperties),
    ) -> usize {
        let matched = self.query(block_type, filter);
        for id in &matched {
            apply(&mut self.blocks[id.index()].properties);
        }
        tracing::trace!(block_type, count = matched.len(), "overrode block properties");
        matched.len()
    }

    /// Iterates over every registered block in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// Returns `true` if the given block state is air (id 0).
    pub fn is_air(&self, id: BlockStateId) -> bool {
        id == BlockStateId::AIR
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
