//! Touch-generating actions
//!
//! Each keymap binding becomes one [`Action`]. Actions own their touch slots and
//! run exclusively on the work queue, reached through the handlers they
//! register with the [`Registry`].

mod button;
mod fake_mouse;
mod joystick;
mod swipe;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::TuningConfig;
use crate::dispatch::{BoolRoute, Registry, VectorRoute};
use crate::mode::CursorControl;
use crate::runtime::Scheduler;
use crate::touch::{Point, ScreenBounds, TouchAllocator, TouchPhase, TouchSink, TouchSlot};

pub use button::{ButtonAction, DraggableButtonAction};
pub use fake_mouse::FakeMouseAction;
pub use joystick::{ContinuousJoystickAction, JoystickAction};
pub use swipe::{CameraAction, SwipeAction, scaled_delta};

/// Index of an action in the live set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub usize);

/// Timer callbacks an action can arm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionTimer {
    /// Swipe inactivity watchdog for one gesture of the action
    Watchdog { gesture: u8, epoch: u32 },
    /// Free joystick moving off its center
    Settle { epoch: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Button,
    DraggableButton,
    Joystick,
    ContinuousJoystick,
    Camera,
    Swipe,
    FakeMouse,
}

/// Everything an action may touch while it runs
pub struct ActionCtx<'a> {
    pub id: ActionId,
    pub sink: &'a dyn TouchSink,
    pub allocator: &'a mut TouchAllocator,
    pub registry: &'a mut Registry,
    pub cursor: &'a dyn CursorControl,
    pub scheduler: &'a Scheduler,
    pub tuning: &'a TuningConfig,
    pub screen: ScreenBounds,
    pub now: Instant,
}

impl ActionCtx<'_> {
    /// Drives `slot` through `phase` at `point`
    pub fn touch(&mut self, slot: &mut TouchSlot, point: Point, phase: TouchPhase) {
        self.allocator.touch(self.sink, slot, point, phase);
    }

    pub fn after(&self, delay: Duration, timer: ActionTimer) {
        self.scheduler
            .after(delay, self.scheduler.action_timer(self.id, timer));
    }

    pub fn every(&self, period: Duration, timer: ActionTimer, alive: Arc<AtomicBool>) {
        self.scheduler
            .every(period, self.scheduler.action_timer(self.id, timer), alive);
    }
}

/// A live binding
#[derive(Debug)]
pub enum Action {
    Button(ButtonAction),
    DraggableButton(DraggableButtonAction),
    Joystick(JoystickAction),
    ContinuousJoystick(ContinuousJoystickAction),
    Camera(CameraAction),
    Swipe(SwipeAction),
    FakeMouse(FakeMouseAction),
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Button(_) => ActionKind::Button,
            Action::DraggableButton(_) => ActionKind::DraggableButton,
            Action::Joystick(_) => ActionKind::Joystick,
            Action::ContinuousJoystick(_) => ActionKind::ContinuousJoystick,
            Action::Camera(_) => ActionKind::Camera,
            Action::Swipe(_) => ActionKind::Swipe,
            Action::FakeMouse(_) => ActionKind::FakeMouse,
        }
    }

    /// Actions that keep their touch across a mode change
    pub fn survives_mode_change(&self) -> bool {
        matches!(self, Action::Button(_) | Action::Joystick(_))
    }

    /// Installs the action's permanent handlers
    pub fn register(&self, id: ActionId, registry: &mut Registry) {
        match self {
            Action::Button(action) => action.register(id, registry),
            Action::DraggableButton(action) => action.register(id, registry),
            Action::Joystick(action) => action.register(id, registry),
            Action::ContinuousJoystick(action) => action.register(id, registry),
            Action::Camera(action) => action.register(id, registry),
            Action::Swipe(action) => action.register(id, registry),
            Action::FakeMouse(action) => action.register(id, registry),
        }
    }

    pub fn on_key(&mut self, ctx: &mut ActionCtx<'_>, route: BoolRoute, pressed: bool) {
        match (self, route) {
            (Action::Button(action), BoolRoute::Press) => action.update(ctx, pressed),
            (Action::DraggableButton(action), BoolRoute::Press) => action.update(ctx, pressed),
            (Action::FakeMouse(action), BoolRoute::Press) => action.update(ctx, pressed),
            (Action::Joystick(action), BoolRoute::Direction(direction)) => {
                action.update(ctx, direction, pressed)
            }
            (action, route) => {
                tracing::debug!(kind = ?action.kind(), ?route, "boolean route ignored");
            }
        }
    }

    pub fn on_vector(&mut self, ctx: &mut ActionCtx<'_>, route: VectorRoute, x: f32, y: f32) {
        match (self, route) {
            (Action::DraggableButton(action), VectorRoute::Drag) => action.drag(ctx, x, y),
            (Action::ContinuousJoystick(action), VectorRoute::Joystick) => action.update(ctx, x, y),
            (Action::Camera(action), VectorRoute::Look) => action.look(ctx, x, y),
            (Action::Camera(action), VectorRoute::Scale) => action.scale(ctx, x, y),
            (Action::Swipe(action), VectorRoute::Scroll) => action.update(ctx, x, y),
            (Action::FakeMouse(action), VectorRoute::Pointer) => action.moved(ctx, x, y),
            (action, route) => {
                tracing::debug!(kind = ?action.kind(), ?route, "vector route ignored");
            }
        }
    }

    pub fn on_timer(&mut self, ctx: &mut ActionCtx<'_>, timer: ActionTimer) {
        match (self, timer) {
            (Action::Joystick(action), ActionTimer::Settle { epoch }) => action.settle(ctx, epoch),
            (Action::Camera(action), ActionTimer::Watchdog { gesture, epoch }) => {
                action.tick(ctx, gesture, epoch)
            }
            (Action::Swipe(action), ActionTimer::Watchdog { epoch, .. }) => action.tick(ctx, epoch),
            _ => {}
        }
    }

    /// Forces every owned touch to end; a no-op when idle
    pub fn invalidate(&mut self, ctx: &mut ActionCtx<'_>) {
        match self {
            Action::Button(action) => action.invalidate(ctx),
            Action::DraggableButton(action) => action.invalidate(ctx),
            Action::Joystick(action) => action.invalidate(ctx),
            Action::ContinuousJoystick(action) => action.invalidate(ctx),
            Action::Camera(action) => action.invalidate(ctx),
            Action::Swipe(action) => action.invalidate(ctx),
            Action::FakeMouse(action) => action.invalidate(ctx),
        }
    }
}

#[cfg(test)]
pub(crate) mod harness {
    //! Drives single actions without a worker task

    use std::sync::atomic::Ordering;
    use std::sync::{Arc, Mutex};

    use tokio::sync::mpsc;

    use super::*;
    use crate::dispatch::Routing;
    use crate::runtime::{Job, TimerJob, WorkQueue};
    use crate::touch::{Delivery, SurfaceId, TouchEvent};

    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub events: Mutex<Vec<TouchEvent>>,
        /// Answers moves with `Delivery::Invalidated` while set
        pub drop_on_move: AtomicBool,
    }

    impl TouchSink for RecordingSink {
        fn hit_test(&self, _point: Point) -> SurfaceId {
            SurfaceId(1)
        }

        fn deliver(&self, event: TouchEvent) -> Delivery {
            let phase = event.phase;
            self.events.lock().unwrap().push(event);
            if phase == TouchPhase::Moved && self.drop_on_move.load(Ordering::SeqCst) {
                Delivery::Invalidated
            } else {
                Delivery::Accepted
            }
        }
    }

    #[derive(Debug, Default)]
    pub struct FakeCursor {
        pub hidden: AtomicBool,
        pub location: Mutex<Option<Point>>,
    }

    impl CursorControl for FakeCursor {
        fn hide(&self) {
            self.hidden.store(true, Ordering::SeqCst);
        }

        fn unhide(&self) {
            self.hidden.store(false, Ordering::SeqCst);
        }

        fn is_hidden(&self) -> bool {
            self.hidden.load(Ordering::SeqCst)
        }

        fn location(&self) -> Option<Point> {
            *self.location.lock().unwrap()
        }
    }

    pub struct Harness {
        pub sink: RecordingSink,
        pub cursor: FakeCursor,
        pub allocator: TouchAllocator,
        pub registry: Registry,
        pub scheduler: Scheduler,
        pub jobs: mpsc::UnboundedReceiver<Job>,
        pub tuning: TuningConfig,
        pub screen: ScreenBounds,
    }

    impl Harness {
        pub fn new(width: f32, height: f32) -> Self {
            let (queue, jobs) = WorkQueue::new();
            Self {
                sink: RecordingSink::default(),
                cursor: FakeCursor::default(),
                allocator: TouchAllocator::new(20),
                registry: Registry::new(Arc::new(Routing::default())),
                scheduler: Scheduler::new(queue),
                jobs,
                tuning: TuningConfig::default(),
                screen: ScreenBounds::new(width, height),
            }
        }

        pub fn ctx(&mut self) -> ActionCtx<'_> {
            ActionCtx {
                id: ActionId(0),
                sink: &self.sink,
                allocator: &mut self.allocator,
                registry: &mut self.registry,
                cursor: &self.cursor,
                scheduler: &self.scheduler,
                tuning: &self.tuning,
                screen: self.screen,
                now: Instant::now(),
            }
        }

        pub fn key(&mut self, action: &mut Action, route: BoolRoute, pressed: bool) {
            action.on_key(&mut self.ctx(), route, pressed);
        }

        pub fn vector(&mut self, action: &mut Action, route: VectorRoute, x: f32, y: f32) {
            action.on_vector(&mut self.ctx(), route, x, y);
        }

        pub fn invalidate(&mut self, action: &mut Action) {
            action.invalidate(&mut self.ctx());
        }

        /// Runs every timer job queued so far against `action`
        pub fn fire_timers(&mut self, action: &mut Action) -> usize {
            let mut fired = 0;
            while let Ok(job) = self.jobs.try_recv() {
                if let Job::Timer(TimerJob::Action { timer, .. }) = job {
                    action.on_timer(&mut self.ctx(), timer);
                    fired += 1;
                }
            }
            fired
        }

        pub fn events(&self) -> Vec<(TouchPhase, Point)> {
            self.sink
                .events
                .lock()
                .unwrap()
                .iter()
                .map(|event| (event.phase, event.point))
                .collect()
        }

        pub fn phases(&self) -> Vec<TouchPhase> {
            self.events().into_iter().map(|(phase, _)| phase).collect()
        }

        pub fn take_events(&self) -> Vec<(TouchPhase, Point)> {
            let events = self.events();
            self.sink.events.lock().unwrap().clear();
            events
        }
    }
}
