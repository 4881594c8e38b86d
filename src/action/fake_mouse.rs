//! Touchscreen-emulation mouse: left button held becomes a one-finger drag

use super::{ActionCtx, ActionId};
use crate::dispatch::{BoolHandler, BoolRoute, PriorityTier, Registry, VectorHandler, VectorRoute};
use crate::input::LogicalKey;
use crate::touch::{Point, TouchPhase, TouchSlot};

#[derive(Debug, Default)]
pub struct FakeMouseAction {
    slot: TouchSlot,
    location: Point,
}

impl FakeMouseAction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: ActionId, registry: &mut Registry) {
        registry.register_boolean(
            LogicalKey::FAKE_MOUSE,
            BoolHandler {
                action: id,
                route: BoolRoute::Press,
            },
        );
    }

    pub fn update(&mut self, ctx: &mut ActionCtx<'_>, pressed: bool) {
        if pressed {
            self.press(ctx);
        } else {
            self.release(ctx);
        }
    }

    fn press(&mut self, ctx: &mut ActionCtx<'_>) {
        if self.slot.is_active() {
            return;
        }
        let point = ctx.cursor.location().unwrap_or_else(|| ctx.screen.center());
        self.location = ctx.screen.clamp(point);
        ctx.touch(&mut self.slot, self.location, TouchPhase::Began);
        if self.slot.is_active() {
            ctx.registry.register_vector(
                PriorityTier::Draggable,
                VectorHandler {
                    action: ctx.id,
                    key: LogicalKey::FAKE_MOUSE,
                    route: VectorRoute::Pointer,
                },
            );
        }
    }

    /// Follows the absolute pointer position while pressed
    pub fn moved(&mut self, ctx: &mut ActionCtx<'_>, x: f32, y: f32) {
        if !self.slot.is_active() {
            return;
        }
        self.location = ctx.screen.clamp([x, y]);
        ctx.touch(&mut self.slot, self.location, TouchPhase::Moved);
    }

    fn release(&mut self, ctx: &mut ActionCtx<'_>) {
        ctx.touch(&mut self.slot, self.location, TouchPhase::Ended);
        if !self.slot.is_active() {
            ctx.registry
                .unregister_vector(PriorityTier::Draggable, LogicalKey::FAKE_MOUSE, ctx.id);
        }
    }

    pub fn invalidate(&mut self, ctx: &mut ActionCtx<'_>) {
        self.release(ctx);
    }
}
