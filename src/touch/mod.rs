//! Synthetic touch model and the consumer-facing touch sink contract

mod allocator;

pub use allocator::{MAX_TOUCHES, TouchAllocator, TouchSlot};

/// Screen-space point in logical pixels
pub type Point = [f32; 2];

/// Identifier of a live synthetic touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TouchId(pub u32);

/// Delivery target remembered from the hit test at `began`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Touch lifecycle stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    Began,
    Moved,
    Stationary,
    Ended,
    Cancelled,
}

impl TouchPhase {
    /// Returns true for phases that retire the identifier
    pub fn is_terminal(self) -> bool {
        matches!(self, TouchPhase::Ended | TouchPhase::Cancelled)
    }
}

/// One synthesized touch event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub id: TouchId,
    pub phase: TouchPhase,
    pub point: Point,
    pub target: SurfaceId,
}

/// Sink outcome for a delivered event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The consumer accepted the event
    Accepted,
    /// The consumer no longer knows this identifier
    Invalidated,
}

/// Consumer of synthesized touches
///
/// Implementations are called from the work queue only, synchronously, and are
/// expected not to fail.
pub trait TouchSink: Send + Sync {
    /// Resolves the surface that should receive a touch starting at `point`
    fn hit_test(&self, point: Point) -> SurfaceId;

    /// Delivers one touch event to its remembered target
    fn deliver(&self, event: TouchEvent) -> Delivery;
}

/// Live screen bounds, `[0, width] × [0, height]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenBounds {
    pub width: f32,
    pub height: f32,
}

impl ScreenBounds {
    /// Create new screen bounds
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Check if a point is inside the bounds (edges included)
    pub fn contains(&self, point: Point) -> bool {
        (0.0..=self.width).contains(&point[0]) && (0.0..=self.height).contains(&point[1])
    }

    /// Clamp a point into the bounds
    pub fn clamp(&self, point: Point) -> Point {
        [
            point[0].clamp(0.0, self.width),
            point[1].clamp(0.0, self.height),
        ]
    }

    /// Get the center point of the screen
    pub fn center(&self) -> Point {
        [self.width / 2.0, self.height / 2.0]
    }

    /// Convert a normalized (0..1) point to screen space
    pub fn denormalize(&self, x: f32, y: f32) -> Point {
        [x * self.width, y * self.height]
    }
}
