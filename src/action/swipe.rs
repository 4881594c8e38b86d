//! Swipe gestures: camera look, pinch and scroll-drag
//!
//! A gesture plays relative motion as a stream of small touch moves. Early in
//! a gesture, deltas are shrunk so that the remaining minimum number of moves
//! cannot carry the touch off screen. A move that still leaves the screen is
//! clamped and arms an edge reset, and the next update lifts the touch.
//!
//! Idle gestures are lifted by a watchdog after a few stale ticks, and a short
//! cooldown separates one gesture's end from the next one's start.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::time::Instant;

use super::{ActionCtx, ActionId, ActionTimer};
use crate::dispatch::{PriorityTier, Registry, VectorHandler, VectorRoute};
use crate::input::LogicalKey;
use crate::touch::{Point, ScreenBounds, TouchPhase, TouchSlot};

/// Vertical distance of each pinch finger from the anchor
const PINCH_OFFSET: f32 = 100.0;

/// Scales `delta` so that `location + delta * remaining` stays on screen
///
/// Each axis gets its own factor and the smaller one wins. Deltas are never
/// enlarged.
pub fn scaled_delta(location: Point, delta: [f32; 2], remaining: u32, screen: &ScreenBounds) -> [f32; 2] {
    let remaining = remaining as f32;
    let axis = |position: f32, delta: f32, limit: f32| -> f32 {
        let travel = delta * remaining;
        if travel > 0.0 {
            (limit - position) / travel
        } else if travel < 0.0 {
            position / -travel
        } else {
            1.0
        }
    };

    let factor = axis(location[0], delta[0], screen.width)
        .min(axis(location[1], delta[1], screen.height))
        .clamp(0.0, 1.0);
    [delta[0] * factor, delta[1] * factor]
}

/// One swipe touch and its watchdog state
#[derive(Debug, Default)]
struct SwipeGesture {
    slot: TouchSlot,
    location: Point,
    events: u32,
    stale: u32,
    moved: bool,
    pending_edge_reset: bool,
    cooldown_until: Option<Instant>,
    epoch: u32,
    watchdog: Option<Arc<AtomicBool>>,
}

impl SwipeGesture {
    fn is_active(&self) -> bool {
        self.slot.is_active()
    }

    /// Moves the gesture by `delta`, starting it at `anchor` when idle
    fn update(&mut self, ctx: &mut ActionCtx<'_>, gesture: u8, anchor: Point, delta: [f32; 2]) {
        if self.pending_edge_reset {
            self.end(ctx);
            return;
        }

        if !self.is_active() && !self.begin(ctx, gesture, anchor) {
            return;
        }

        self.events += 1;
        let min_events = ctx.tuning.swipe_min_events;
        let delta = if self.events < min_events {
            scaled_delta(self.location, delta, min_events - self.events, &ctx.screen)
        } else {
            delta
        };

        let next = [self.location[0] + delta[0], self.location[1] + delta[1]];
        if !ctx.screen.contains(next) {
            self.pending_edge_reset = true;
        }
        self.location = ctx.screen.clamp(next);
        self.moved = true;
        ctx.touch(&mut self.slot, self.location, TouchPhase::Moved);
        if !self.is_active() {
            // The sink dropped the identifier
            self.disarm();
        }
    }

    fn begin(&mut self, ctx: &mut ActionCtx<'_>, gesture: u8, anchor: Point) -> bool {
        if let Some(until) = self.cooldown_until
            && ctx.now < until
        {
            return false;
        }

        self.disarm();
        self.location = ctx.screen.clamp(anchor);
        self.events = 0;
        self.stale = 0;
        self.moved = false;
        ctx.touch(&mut self.slot, self.location, TouchPhase::Began);
        if !self.is_active() {
            return false;
        }

        self.epoch = self.epoch.wrapping_add(1);
        let alive = Arc::new(AtomicBool::new(true));
        ctx.every(
            ctx.tuning.swipe_watchdog(),
            ActionTimer::Watchdog {
                gesture,
                epoch: self.epoch,
            },
            Arc::clone(&alive),
        );
        self.watchdog = Some(alive);
        true
    }

    fn tick(&mut self, ctx: &mut ActionCtx<'_>, epoch: u32) {
        if epoch != self.epoch {
            return;
        }
        if !self.is_active() {
            self.disarm();
            return;
        }
        if self.moved {
            self.moved = false;
            self.stale = 0;
            return;
        }
        self.stale += 1;
        if self.stale >= ctx.tuning.swipe_stale_ticks {
            self.end(ctx);
        }
    }

    /// Stops the watchdog and forgets a pending edge reset
    fn disarm(&mut self) {
        if let Some(alive) = self.watchdog.take() {
            alive.store(false, Ordering::Release);
        }
        self.pending_edge_reset = false;
    }

    fn end(&mut self, ctx: &mut ActionCtx<'_>) {
        self.disarm();
        if !self.is_active() {
            return;
        }
        ctx.touch(&mut self.slot, self.location, TouchPhase::Ended);
        self.epoch = self.epoch.wrapping_add(1);
        self.cooldown_until = Some(ctx.now + ctx.tuning.swipe_cooldown());
    }
}

/// Scroll wheel played as a drag under the cursor
#[derive(Debug)]
pub struct SwipeAction {
    key: LogicalKey,
    gain: f32,
    gesture: SwipeGesture,
}

impl SwipeAction {
    pub fn new(key: LogicalKey, gain: f32) -> Self {
        Self {
            key,
            gain,
            gesture: SwipeGesture::default(),
        }
    }

    pub fn register(&self, id: ActionId, registry: &mut Registry) {
        registry.register_vector(
            PriorityTier::Camera,
            VectorHandler {
                action: id,
                key: self.key,
                route: VectorRoute::Scroll,
            },
        );
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_active()
    }

    pub fn update(&mut self, ctx: &mut ActionCtx<'_>, dx: f32, dy: f32) {
        let anchor = ctx.cursor.location().unwrap_or_else(|| ctx.screen.center());
        self.gesture
            .update(ctx, 0, anchor, [dx * self.gain, dy * self.gain]);
    }

    pub fn tick(&mut self, ctx: &mut ActionCtx<'_>, epoch: u32) {
        self.gesture.tick(ctx, epoch);
    }

    pub fn invalidate(&mut self, ctx: &mut ActionCtx<'_>) {
        self.gesture.end(ctx);
    }
}

const LOOK: u8 = 0;
const PINCH_UPPER: u8 = 1;
const PINCH_LOWER: u8 = 2;

/// Camera area: look swipe plus a two-finger pinch
#[derive(Debug)]
pub struct CameraAction {
    key: LogicalKey,
    anchor: Point,
    sensitivity: f32,
    look: SwipeGesture,
    pinch: [SwipeGesture; 2],
}

impl CameraAction {
    pub fn new(key: LogicalKey, anchor: Point, sensitivity: f32) -> Self {
        Self {
            key,
            anchor,
            sensitivity,
            look: SwipeGesture::default(),
            pinch: Default::default(),
        }
    }

    pub fn register(&self, id: ActionId, registry: &mut Registry) {
        registry.register_vector(
            PriorityTier::Camera,
            VectorHandler {
                action: id,
                key: self.key,
                route: VectorRoute::Look,
            },
        );
        registry.register_vector(
            PriorityTier::Camera,
            VectorHandler {
                action: id,
                key: LogicalKey::SCROLL_SCALE,
                route: VectorRoute::Scale,
            },
        );
    }

    pub fn is_looking(&self) -> bool {
        self.look.is_active()
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.iter().any(SwipeGesture::is_active)
    }

    pub fn look(&mut self, ctx: &mut ActionCtx<'_>, dx: f32, dy: f32) {
        let sensitivity = self.sensitivity;
        self.look
            .update(ctx, LOOK, self.anchor, [dx * sensitivity, dy * sensitivity]);
    }

    /// Scroll up spreads the fingers apart, scroll down pinches them together
    pub fn scale(&mut self, ctx: &mut ActionCtx<'_>, _dx: f32, dy: f32) {
        let [x, y] = self.anchor;
        let [upper, lower] = &mut self.pinch;
        upper.update(ctx, PINCH_UPPER, [x, y - PINCH_OFFSET], [0.0, -dy]);
        lower.update(ctx, PINCH_LOWER, [x, y + PINCH_OFFSET], [0.0, dy]);
    }

    pub fn tick(&mut self, ctx: &mut ActionCtx<'_>, gesture: u8, epoch: u32) {
        match gesture {
            LOOK => self.look.tick(ctx, epoch),
            PINCH_UPPER => self.pinch[0].tick(ctx, epoch),
            PINCH_LOWER => self.pinch[1].tick(ctx, epoch),
            _ => {}
        }
    }

    pub fn invalidate(&mut self, ctx: &mut ActionCtx<'_>) {
        self.look.end(ctx);
        for finger in &mut self.pinch {
            finger.end(ctx);
        }
    }
}
