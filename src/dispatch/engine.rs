//! Worker side of the dispatcher
//!
//! The engine owns the live action set and processes one [`Job`] at a time.
//! It is only ever driven by the work queue task.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::registry::{Registry, Routing, VectorHandler};
use crate::action::{
    Action, ActionCtx, ActionId, ButtonAction, CameraAction, ContinuousJoystickAction,
    DraggableButtonAction, FakeMouseAction, JoystickAction, SwipeAction,
};
use crate::config::TuningConfig;
use crate::input::LogicalKey;
use crate::keymap::{JoystickShape, Keymap};
use crate::mode::CursorControl;
use crate::runtime::{Job, Scheduler, TimerJob};
use crate::touch::{ScreenBounds, TouchAllocator, TouchSink};

/// Poll state of a camera-bound analog stick
#[derive(Debug, Default)]
struct StickState {
    value: [f32; 2],
    epoch: u32,
    polling: Option<Arc<AtomicBool>>,
}

impl StickState {
    fn stop(&mut self) {
        if let Some(alive) = self.polling.take() {
            alive.store(false, Ordering::Release);
            self.epoch = self.epoch.wrapping_add(1);
        }
    }
}

pub struct Engine {
    registry: Registry,
    actions: Vec<Action>,
    allocator: TouchAllocator,
    sink: Arc<dyn TouchSink>,
    cursor: Arc<dyn CursorControl>,
    scheduler: Scheduler,
    tuning: TuningConfig,
    screen: ScreenBounds,
    sticks: HashMap<LogicalKey, StickState>,
    keymap: Option<Box<Keymap>>,
    generation: u64,
}

impl Engine {
    pub fn new(
        routing: Arc<Routing>,
        sink: Arc<dyn TouchSink>,
        cursor: Arc<dyn CursorControl>,
        scheduler: Scheduler,
        tuning: TuningConfig,
        screen: ScreenBounds,
    ) -> Self {
        Self {
            registry: Registry::new(routing),
            actions: Vec::new(),
            allocator: TouchAllocator::new(tuning.max_touches),
            sink,
            cursor,
            scheduler,
            tuning,
            screen,
            sticks: HashMap::new(),
            keymap: None,
            generation: 0,
        }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn live_touches(&self) -> u32 {
        self.allocator.live_count()
    }

    pub fn handle(&mut self, job: Job) {
        match job {
            Job::Build(keymap) => self.build(keymap),
            Job::Clear => {
                self.reset();
                self.keymap = None;
                info!("keymap cleared");
            }
            Job::Resize(screen) => {
                self.screen = screen;
                if let Some(keymap) = self.keymap.take() {
                    self.build(keymap);
                }
            }
            Job::Key { key, pressed } => self.key(key, pressed),
            Job::Vector {
                tier,
                index,
                key,
                x,
                y,
            } => {
                // The slot may have been rebound since the producer resolved it
                let handler = self
                    .registry
                    .vector_handler(tier, index, key)
                    .or_else(|| self.registry.resolve(key));
                match handler {
                    Some(handler) => self.vector(handler, x, y),
                    None => debug!(%key, "vector event for unbound key dropped"),
                }
            }
            Job::Stick { key, x, y } => self.stick(key, x, y),
            Job::InvalidateAll => self.invalidate_all(),
            Job::InvalidateNonButton => self.invalidate_non_button(),
            Job::Timer(timer) => self.timer(timer),
            Job::Barrier(done) => {
                let _ = done.send(());
            }
            Job::Shutdown => self.invalidate_all(),
        }
    }

    fn build(&mut self, keymap: Box<Keymap>) {
        self.reset();

        let screen = self.screen;
        let tuning = &self.tuning;
        let mut actions = vec![
            Action::FakeMouse(FakeMouseAction::new()),
            Action::Swipe(SwipeAction::new(LogicalKey::SCROLL_DRAG, tuning.scroll_drag_gain)),
        ];
        actions.extend(keymap.buttons.iter().map(|button| {
            Action::Button(ButtonAction::new(button.key, button.transform.point(&screen)))
        }));
        actions.extend(keymap.draggable_buttons.iter().map(|button| {
            Action::DraggableButton(DraggableButtonAction::new(
                button.key,
                button.transform.point(&screen),
            ))
        }));
        actions.extend(keymap.mouse_areas.iter().map(|area| {
            Action::Camera(CameraAction::new(
                area.key,
                area.transform.point(&screen),
                tuning.camera_sensitivity,
            ))
        }));
        for joystick in &keymap.joysticks {
            let center = joystick.transform.point(&screen);
            match joystick.shape() {
                Some(JoystickShape::Digital(keys)) => {
                    actions.push(Action::Joystick(JoystickAction::new(
                        keys.as_array(),
                        center,
                        joystick.transform.absolute_size(&screen) / 2.0,
                        tuning.free_joystick_threshold,
                        tuning.free_joystick_travel,
                    )));
                }
                Some(JoystickShape::Analog(key)) => {
                    actions.push(Action::ContinuousJoystick(ContinuousJoystickAction::new(
                        key,
                        center,
                        tuning.joystick_sensitivity,
                    )));
                }
                None => warn!("joystick binding without keys skipped"),
            }
        }

        for (index, action) in actions.iter().enumerate() {
            action.register(ActionId(index), &mut self.registry);
        }
        self.actions = actions;

        info!(
            version = %keymap.version,
            actions = self.actions.len(),
            width = screen.width,
            height = screen.height,
            "keymap built"
        );
        self.keymap = Some(keymap);
    }

    /// Ends every touch and drops the live set
    fn reset(&mut self) {
        self.invalidate_all();
        self.registry.clear();
        self.actions.clear();
        self.sticks.clear();
        self.generation += 1;
        self.scheduler.set_generation(self.generation);
    }

    fn key(&mut self, key: LogicalKey, pressed: bool) {
        for handler in self.registry.boolean_handlers(key) {
            self.with_action(handler.action, |action, ctx| {
                action.on_key(ctx, handler.route, pressed)
            });
        }
    }

    fn vector(&mut self, handler: VectorHandler, x: f32, y: f32) {
        self.with_action(handler.action, |action, ctx| {
            action.on_vector(ctx, handler.route, x, y)
        });
    }

    fn stick(&mut self, key: LogicalKey, x: f32, y: f32) {
        let threshold = self.tuning.stick_threshold;
        let state = self.sticks.entry(key).or_default();
        state.value = [x, y];
        if x.hypot(y) < threshold {
            state.stop();
            return;
        }

        if state.polling.is_none() {
            state.epoch = state.epoch.wrapping_add(1);
            let alive = Arc::new(AtomicBool::new(true));
            self.scheduler.every(
                self.tuning.stick_poll(),
                TimerJob::StickPoll {
                    key,
                    epoch: state.epoch,
                },
                Arc::clone(&alive),
            );
            state.polling = Some(alive);
        }
        self.stick_step(key, [x, y]);
    }

    fn stick_step(&mut self, key: LogicalKey, [x, y]: [f32; 2]) {
        let speed = self.tuning.stick_camera_speed;
        match self.registry.resolve(key) {
            Some(handler) => self.vector(handler, x * speed, -y * speed),
            None => {
                if let Some(state) = self.sticks.get_mut(&key) {
                    state.stop();
                }
            }
        }
    }

    fn timer(&mut self, timer: TimerJob) {
        match timer {
            TimerJob::Action {
                generation,
                action,
                timer,
            } => {
                if generation != self.generation {
                    return;
                }
                self.with_action(action, |action, ctx| action.on_timer(ctx, timer));
            }
            TimerJob::StickPoll { key, epoch } => {
                let threshold = self.tuning.stick_threshold;
                let Some(state) = self.sticks.get_mut(&key) else {
                    return;
                };
                if state.epoch != epoch || state.polling.is_none() {
                    return;
                }
                let value = state.value;
                if value[0].hypot(value[1]) < threshold {
                    state.stop();
                    return;
                }
                self.stick_step(key, value);
            }
        }
    }

    pub fn invalidate_all(&mut self) {
        self.stop_sticks();
        for index in 0..self.actions.len() {
            self.with_action(ActionId(index), |action, ctx| action.invalidate(ctx));
        }
        debug!(live = self.allocator.live_count(), "all actions invalidated");
    }

    pub fn invalidate_non_button(&mut self) {
        self.stop_sticks();
        for index in 0..self.actions.len() {
            if self.actions[index].survives_mode_change() {
                continue;
            }
            self.with_action(ActionId(index), |action, ctx| action.invalidate(ctx));
        }
    }

    fn stop_sticks(&mut self) {
        for state in self.sticks.values_mut() {
            state.stop();
        }
    }

    fn with_action(&mut self, id: ActionId, f: impl FnOnce(&mut Action, &mut ActionCtx<'_>)) {
        let Self {
            registry,
            actions,
            allocator,
            sink,
            cursor,
            scheduler,
            tuning,
            screen,
            ..
        } = self;
        let Some(action) = actions.get_mut(id.0) else {
            return;
        };
        let mut ctx = ActionCtx {
            id,
            sink: &**sink,
            allocator,
            registry,
            cursor: &**cursor,
            scheduler,
            tuning,
            screen: *screen,
            now: Instant::now(),
        };
        f(action, &mut ctx);
    }
}
