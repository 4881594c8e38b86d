//! Handler registry
//!
//! The registry lives on the work queue and is the only writer of the shared
//! [`Routing`] tables. Boolean keys fan out to every registered handler;
//! vector keys resolve to exactly one handler per tier slot.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use enum_map::EnumMap;
use tracing::{debug, warn};

use super::tier::{PriorityTier, TIER_CAPACITY, TierTables};
use crate::action::ActionId;
use crate::input::{Direction, LogicalKey};

/// How a boolean event reaches its action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolRoute {
    Press,
    Direction(Direction),
}

/// How a vector event reaches its action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorRoute {
    /// Relative drag of a held draggable button
    Drag,
    /// Camera look swipe
    Look,
    /// Camera pinch
    Scale,
    /// Continuous joystick integration
    Joystick,
    /// Scroll-drag swipe
    Scroll,
    /// Absolute fake-mouse pointer position
    Pointer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoolHandler {
    pub action: ActionId,
    pub route: BoolRoute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorHandler {
    pub action: ActionId,
    pub key: LogicalKey,
    pub route: VectorRoute,
}

/// Routing state shared with producer threads
#[derive(Debug, Default)]
pub struct Routing {
    tables: TierTables,
    bound: RwLock<HashSet<LogicalKey>>,
}

impl Routing {
    /// Returns true if any boolean handler listens to `key`
    pub fn is_bound(&self, key: LogicalKey) -> bool {
        self.bound
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&key)
    }

    pub fn lookup(&self, key: LogicalKey) -> Option<(PriorityTier, usize)> {
        self.tables.lookup(key)
    }

    pub fn priority(&self, key: LogicalKey) -> Option<PriorityTier> {
        self.tables.priority(key)
    }

    pub fn occupancy(&self, tier: PriorityTier) -> usize {
        self.tables.occupancy(tier)
    }
}

/// Worker-owned handler storage
#[derive(Debug)]
pub struct Registry {
    routing: Arc<Routing>,
    boolean: HashMap<LogicalKey, Vec<BoolHandler>>,
    vector: EnumMap<PriorityTier, [Option<VectorHandler>; TIER_CAPACITY]>,
}

impl Registry {
    pub fn new(routing: Arc<Routing>) -> Self {
        Self {
            routing,
            boolean: HashMap::new(),
            vector: EnumMap::default(),
        }
    }

    pub fn routing(&self) -> &Arc<Routing> {
        &self.routing
    }

    /// Adds a boolean listener; every listener of a key is invoked
    pub fn register_boolean(&mut self, key: LogicalKey, handler: BoolHandler) {
        self.boolean.entry(key).or_default().push(handler);
        self.routing
            .bound
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key);
    }

    /// Binds a vector handler into a tier slot
    ///
    /// Re-registering a key already bound in the tier replaces its handler.
    /// A full tier drops the binding and returns false.
    pub fn register_vector(&mut self, tier: PriorityTier, handler: VectorHandler) -> bool {
        match self.routing.tables.claim(tier, handler.key) {
            Some(index) => {
                self.vector[tier][index] = Some(handler);
                debug!(?tier, index, key = %handler.key, "vector handler registered");
                true
            }
            None => {
                warn!(
                    ?tier,
                    key = %handler.key,
                    capacity = TIER_CAPACITY,
                    "tier capacity exhausted, binding dropped"
                );
                false
            }
        }
    }

    /// Releases `key` from `tier` if `owner` still holds it
    pub fn unregister_vector(&mut self, tier: PriorityTier, key: LogicalKey, owner: ActionId) {
        let owned = self.vector[tier]
            .iter()
            .flatten()
            .any(|handler| handler.key == key && handler.action == owner);
        if !owned {
            return;
        }
        if let Some(index) = self.routing.tables.release(tier, key) {
            self.vector[tier][index] = None;
            debug!(?tier, index, %key, "vector handler released");
        }
    }

    /// Handlers listening to `key`
    pub fn boolean_handlers(&self, key: LogicalKey) -> Vec<BoolHandler> {
        self.boolean.get(&key).cloned().unwrap_or_default()
    }

    /// Handler in a slot resolved by a producer, if the slot still holds `key`
    pub fn vector_handler(
        &self,
        tier: PriorityTier,
        index: usize,
        key: LogicalKey,
    ) -> Option<VectorHandler> {
        if !self.routing.tables.holds(tier, index, key) {
            return None;
        }
        self.vector[tier]
            .get(index)
            .copied()
            .flatten()
            .filter(|handler| handler.key == key)
    }

    /// Highest-priority handler currently bound to `key`
    pub fn resolve(&self, key: LogicalKey) -> Option<VectorHandler> {
        let (tier, index) = self.routing.tables.lookup(key)?;
        self.vector_handler(tier, index, key)
    }

    /// Drops every handler
    pub fn clear(&mut self) {
        self.boolean.clear();
        self.vector = EnumMap::default();
        self.routing.tables.clear();
        self.routing
            .bound
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
