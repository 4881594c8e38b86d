//! Action dispatch
//!
//! [`ActionDispatcher`] is the cheap, cloneable producer handle used by input
//! adapters on any thread. It answers routing questions from the shared
//! [`Routing`] tables and forwards the actual work to the [`Engine`] running on
//! the serial work queue.

mod engine;
mod registry;
mod tier;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::input::LogicalKey;
use crate::keymap::{Keymap, KeymapError};
use crate::runtime::{Job, WorkQueue};
use crate::touch::ScreenBounds;

pub use engine::Engine;
pub use registry::{BoolHandler, BoolRoute, Registry, Routing, VectorHandler, VectorRoute};
pub use tier::{PriorityTier, SlotTable, TIER_CAPACITY, TierTables};

#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    routing: Arc<Routing>,
    queue: WorkQueue,
}

impl ActionDispatcher {
    pub fn new(routing: Arc<Routing>, queue: WorkQueue) -> Self {
        Self { routing, queue }
    }

    /// Replaces the live action set with one built from `keymap`
    ///
    /// A keymap from a newer format is rejected; the current set is still
    /// torn down so nothing keeps running against stale bindings.
    pub fn build(&self, keymap: Keymap) -> Result<(), KeymapError> {
        match keymap.check_version() {
            Ok(_) => {
                self.queue.send(Job::Build(Box::new(keymap)));
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "keymap rejected");
                self.queue.send(Job::Clear);
                Err(err)
            }
        }
    }

    /// Drops every action
    pub fn clear(&self) {
        self.queue.send(Job::Clear);
    }

    /// Rebuilds the last keymap against new screen bounds
    pub fn resize(&self, screen: ScreenBounds) {
        self.queue.send(Job::Resize(screen));
    }

    /// Returns whether any action listens to `key`
    pub fn is_bound(&self, key: LogicalKey) -> bool {
        self.routing.is_bound(key)
    }

    /// Routes a key edge; returns whether any action listens to `key`
    pub fn dispatch_key(&self, key: LogicalKey, pressed: bool) -> bool {
        if !self.routing.is_bound(key) {
            return false;
        }
        self.queue.send(Job::Key { key, pressed })
    }

    /// Routes a vector to the highest-priority handler bound to `key`
    pub fn dispatch_vector(&self, key: LogicalKey, x: f32, y: f32) -> bool {
        let Some((tier, index)) = self.routing.lookup(key) else {
            return false;
        };
        self.queue.send(Job::Vector {
            tier,
            index,
            key,
            x,
            y,
        })
    }

    /// Feeds an absolute analog stick position into the stick poller
    pub fn dispatch_stick(&self, key: LogicalKey, x: f32, y: f32) -> bool {
        if self.routing.priority(key).is_none() {
            debug!(%key, "stick event for unbound key dropped");
            return false;
        }
        self.queue.send(Job::Stick { key, x, y })
    }

    /// Highest-priority tier with a handler for `key`
    pub fn priority(&self, key: LogicalKey) -> Option<PriorityTier> {
        self.routing.priority(key)
    }

    pub fn invalidate_all(&self) {
        self.queue.send(Job::InvalidateAll);
    }

    /// Invalidates everything except plain buttons and digital joysticks
    pub fn invalidate_non_button(&self) {
        self.queue.send(Job::InvalidateNonButton);
    }

    /// Occupied slots in `tier`
    pub fn occupancy(&self, tier: PriorityTier) -> usize {
        self.routing.occupancy(tier)
    }
}
