//! Touch identifier lifecycle

use tracing::{trace, warn};

use super::{Delivery, Point, SurfaceId, TouchEvent, TouchId, TouchPhase, TouchSink};

/// Largest identifier pool the allocator supports (one bit per identifier)
pub const MAX_TOUCHES: u32 = 64;

/// An identifier bound to the surface it was hit-tested against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveTouch {
    id: TouchId,
    target: SurfaceId,
}

/// Per-binding touch storage; empty means no active touch
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TouchSlot(Option<ActiveTouch>);

impl TouchSlot {
    /// Creates an empty slot
    pub fn new() -> Self {
        Self(None)
    }

    /// Returns true while the slot holds a live identifier
    pub fn is_active(&self) -> bool {
        self.0.is_some()
    }

    /// Identifier currently held, if any
    pub fn id(&self) -> Option<TouchId> {
        self.0.map(|touch| touch.id)
    }
}

/// Owns the identifier pool and drives slots through their phases
#[derive(Debug)]
pub struct TouchAllocator {
    /// Bit `n` set means identifier `n + 1` is live
    live: u64,
    capacity: u32,
}

impl TouchAllocator {
    /// Creates an allocator handing out at most `capacity` concurrent identifiers
    pub fn new(capacity: u32) -> Self {
        Self {
            live: 0,
            capacity: capacity.clamp(1, MAX_TOUCHES),
        }
    }

    /// Number of identifiers currently live
    pub fn live_count(&self) -> u32 {
        self.live.count_ones()
    }

    /// Begin, continue or end the touch held in `slot`
    ///
    /// `Began` on an active slot is ignored, as is any other phase on an empty
    /// slot. Terminal phases, and a sink reporting the identifier as unknown,
    /// retire the identifier and empty the slot.
    pub fn touch(&mut self, sink: &dyn TouchSink, slot: &mut TouchSlot, point: Point, phase: TouchPhase) {
        if phase == TouchPhase::Began {
            if slot.is_active() {
                return;
            }
            let target = sink.hit_test(point);
            let Some(id) = self.allocate() else {
                warn!(capacity = self.capacity, "touch identifier pool exhausted");
                return;
            };
            slot.0 = Some(ActiveTouch { id, target });
        }

        let Some(active) = slot.0 else {
            return;
        };

        trace!(target: "touch", id = active.id.0, ?phase, x = point[0], y = point[1]);
        let delivery = sink.deliver(TouchEvent {
            id: active.id,
            phase,
            point,
            target: active.target,
        });

        if phase.is_terminal() || delivery == Delivery::Invalidated {
            self.release(active.id);
            slot.0 = None;
        }
    }

    fn allocate(&mut self) -> Option<TouchId> {
        let free = !self.live;
        let bit = free.trailing_zeros();
        if bit >= self.capacity {
            return None;
        }
        self.live |= 1 << bit;
        Some(TouchId(bit + 1))
    }

    fn release(&mut self, id: TouchId) {
        if let Some(bit) = id.0.checked_sub(1).filter(|bit| *bit < MAX_TOUCHES) {
            self.live &= !(1u64 << bit);
        }
    }
}
