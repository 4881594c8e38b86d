//! Digital and continuous joystick actions

use super::{ActionCtx, ActionId, ActionTimer};
use crate::dispatch::{BoolHandler, BoolRoute, PriorityTier, Registry, VectorHandler, VectorRoute};
use crate::input::{Direction, Directions, LogicalKey};
use crate::touch::{Point, TouchPhase, TouchSlot};

fn manhattan(a: Point, b: Point) -> f32 {
    (a[0] - b[0]).abs() + (a[1] - b[1]).abs()
}

/// Four-key joystick
///
/// Small joysticks run in fixed mode and touch down directly on the target.
/// Large ones run in free mode: the touch lands on the center first and slides
/// to the target after a short delay, like a floating stick.
#[derive(Debug)]
pub struct JoystickAction {
    keys: [LogicalKey; 4],
    center: Point,
    magnitude: f32,
    free: bool,
    /// Keys physically held
    held: Directions,
    /// Held keys after the later of two opposite presses has won its axis
    effective: Directions,
    slot: TouchSlot,
    last: Point,
    settled: bool,
    epoch: u32,
}

impl JoystickAction {
    /// `radius` is half the joystick's on-screen size
    pub fn new(
        keys: [LogicalKey; 4],
        center: Point,
        radius: f32,
        free_threshold: f32,
        free_travel: f32,
    ) -> Self {
        let free = radius > free_threshold;
        Self {
            keys,
            center,
            magnitude: if free { free_travel } else { radius },
            free,
            held: Directions::empty(),
            effective: Directions::empty(),
            slot: TouchSlot::new(),
            last: center,
            settled: false,
            epoch: 0,
        }
    }

    pub fn is_free(&self) -> bool {
        self.free
    }

    pub fn register(&self, id: ActionId, registry: &mut Registry) {
        for direction in Direction::ALL {
            registry.register_boolean(
                self.keys[direction.index()],
                BoolHandler {
                    action: id,
                    route: BoolRoute::Direction(direction),
                },
            );
        }
    }

    /// Target point for the current key state
    pub fn target(&self) -> Point {
        let [x, y] = self.effective.axis_offset();
        [
            self.center[0] + x * self.magnitude,
            self.center[1] + y * self.magnitude,
        ]
    }

    fn set_key(&mut self, direction: Direction, pressed: bool) {
        let flag = direction.flag();
        let opposite = direction.opposite().flag();
        self.held.set(flag, pressed);
        if pressed {
            self.effective.remove(opposite);
            self.effective.insert(flag);
        } else {
            self.effective.remove(flag);
            if self.held.contains(opposite) {
                self.effective.insert(opposite);
            }
        }
    }

    pub fn update(&mut self, ctx: &mut ActionCtx<'_>, direction: Direction, pressed: bool) {
        self.set_key(direction, pressed);
        self.refresh(ctx);
    }

    fn refresh(&mut self, ctx: &mut ActionCtx<'_>) {
        let target = self.target();
        if manhattan(target, self.center) < ctx.tuning.joystick_deadzone {
            self.end(ctx);
            return;
        }

        if !self.slot.is_active() {
            if self.free {
                self.begin(ctx, self.center);
                if self.slot.is_active() {
                    self.settled = false;
                    ctx.after(
                        ctx.tuning.free_joystick_delay(),
                        ActionTimer::Settle { epoch: self.epoch },
                    );
                }
            } else {
                self.begin(ctx, target);
            }
            return;
        }

        // A free joystick waiting to settle picks up the latest target then
        if self.free && !self.settled {
            return;
        }
        self.last = target;
        ctx.touch(&mut self.slot, target, TouchPhase::Moved);
    }

    fn begin(&mut self, ctx: &mut ActionCtx<'_>, point: Point) {
        self.epoch = self.epoch.wrapping_add(1);
        self.last = point;
        ctx.touch(&mut self.slot, point, TouchPhase::Began);
    }

    pub fn settle(&mut self, ctx: &mut ActionCtx<'_>, epoch: u32) {
        if epoch != self.epoch || !self.slot.is_active() || self.settled {
            return;
        }
        self.settled = true;
        self.last = self.target();
        ctx.touch(&mut self.slot, self.last, TouchPhase::Moved);
    }

    fn end(&mut self, ctx: &mut ActionCtx<'_>) {
        if !self.slot.is_active() {
            return;
        }
        ctx.touch(&mut self.slot, self.last, TouchPhase::Ended);
        self.epoch = self.epoch.wrapping_add(1);
        self.settled = false;
    }

    pub fn invalidate(&mut self, ctx: &mut ActionCtx<'_>) {
        self.held = Directions::empty();
        self.effective = Directions::empty();
        self.end(ctx);
    }
}

/// Joystick driven by a stream of relative vectors
#[derive(Debug)]
pub struct ContinuousJoystickAction {
    key: LogicalKey,
    center: Point,
    position: Point,
    sensitivity: f32,
    slot: TouchSlot,
}

impl ContinuousJoystickAction {
    pub fn new(key: LogicalKey, center: Point, sensitivity: f32) -> Self {
        Self {
            key,
            center,
            position: center,
            sensitivity,
            slot: TouchSlot::new(),
        }
    }

    pub fn register(&self, id: ActionId, registry: &mut Registry) {
        registry.register_vector(
            PriorityTier::Default,
            VectorHandler {
                action: id,
                key: self.key,
                route: VectorRoute::Joystick,
            },
        );
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn update(&mut self, ctx: &mut ActionCtx<'_>, dx: f32, dy: f32) {
        self.position = ctx.screen.clamp([
            self.position[0] + dx * self.sensitivity,
            self.position[1] + dy * self.sensitivity,
        ]);

        let phase = if manhattan(self.position, self.center) < ctx.tuning.continuous_deadzone {
            TouchPhase::Ended
        } else if self.slot.is_active() {
            TouchPhase::Moved
        } else {
            TouchPhase::Began
        };
        ctx.touch(&mut self.slot, self.position, phase);
    }

    pub fn invalidate(&mut self, ctx: &mut ActionCtx<'_>) {
        ctx.touch(&mut self.slot, self.position, TouchPhase::Ended);
        self.position = self.center;
    }
}
