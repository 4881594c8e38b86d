//! Mode-aware input router

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::info;

use super::adapters::{AdapterCtx, AdapterSet};
use super::{ControlMode, CursorControl, EditorSink, ModeObserver, ModeTrigger, next_mode};
use crate::config::{ControlsConfig, TuningConfig};
use crate::dispatch::ActionDispatcher;
use crate::input::{KeyCode, RawInput};
use crate::keymap::{Keymap, KeymapError};
use crate::touch::ScreenBounds;

/// Host-level keys the router reacts to in every mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlKeys {
    pub capture_toggle: Option<KeyCode>,
    pub keymapping_toggle: Option<KeyCode>,
}

impl From<&ControlsConfig> for ControlKeys {
    fn from(config: &ControlsConfig) -> Self {
        Self {
            capture_toggle: config.capture_toggle_key(),
            keymapping_toggle: config.keymapping_toggle_key(),
        }
    }
}

#[derive(Debug)]
struct RouterState {
    mode: ControlMode,
    adapters: AdapterSet,
    resume: Option<ControlMode>,
    keymap_loaded: bool,
}

/// Routes raw input through the adapters of the current mode
///
/// Routing and mode changes share one lock, so an event is always handled by
/// a complete adapter set and the invalidations of a mode change are queued
/// ahead of any input routed by the new mode.
pub struct InputRouter {
    state: Mutex<RouterState>,
    dispatcher: ActionDispatcher,
    cursor: Arc<dyn CursorControl>,
    editor: Option<Arc<dyn EditorSink>>,
    observers: Vec<Arc<dyn ModeObserver>>,
    keys: ControlKeys,
    stick_range: f32,
}

impl InputRouter {
    pub fn new(
        dispatcher: ActionDispatcher,
        cursor: Arc<dyn CursorControl>,
        editor: Option<Arc<dyn EditorSink>>,
        observers: Vec<Arc<dyn ModeObserver>>,
        keys: ControlKeys,
        tuning: &TuningConfig,
    ) -> Self {
        Self {
            state: Mutex::new(RouterState {
                mode: ControlMode::Off,
                adapters: AdapterSet::for_mode(ControlMode::Off),
                resume: None,
                keymap_loaded: false,
            }),
            dispatcher,
            cursor,
            editor,
            observers,
            keys,
            stick_range: tuning.stick_joystick_range,
        }
    }

    fn lock(&self) -> MutexGuard<'_, RouterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn mode(&self) -> ControlMode {
        self.lock().mode
    }

    /// Whether the current mode wants the host cursor hidden
    pub fn cursor_hidden(&self) -> bool {
        self.lock().adapters.cursor_hidden()
    }

    pub fn keymap_loaded(&self) -> bool {
        self.lock().keymap_loaded
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    /// Routes one raw event; returns true if the host should drop it
    pub fn handle(&self, input: RawInput) -> bool {
        let mut state = self.lock();

        if let RawInput::Key {
            code,
            pressed,
            repeat,
        } = input
            && Some(code) == self.keys.keymapping_toggle
            && !matches!(state.mode, ControlMode::TextInput | ControlMode::Editor)
        {
            if pressed && !repeat {
                self.apply(&mut state, ModeTrigger::ToggleKeymapping);
            }
            return state.keymap_loaded;
        }

        let ctx = self.adapter_ctx();
        let route = state.adapters.route(&ctx, &input);
        if let Some(trigger) = route.trigger {
            self.apply(&mut state, trigger);
        }
        route.consumed
    }

    /// Feeds an external mode trigger
    pub fn trigger(&self, trigger: ModeTrigger) {
        let mut state = self.lock();
        self.apply(&mut state, trigger);
    }

    /// Forces a mode
    pub fn set_mode(&self, mode: ControlMode) {
        let mut state = self.lock();
        state.resume = None;
        self.transition(&mut state, mode, "requested");
    }

    /// Builds `keymap` and enables keymapping, or disables it on rejection
    pub fn load_keymap(&self, keymap: Keymap) -> Result<(), KeymapError> {
        let mut state = self.lock();
        match self.dispatcher.build(keymap) {
            Ok(()) => {
                state.keymap_loaded = true;
                state.adapters.controller.rest_sticks();
                if state.mode == ControlMode::Off {
                    self.transition(&mut state, ControlMode::ArbitraryClick, "keymap loaded");
                }
                Ok(())
            }
            Err(err) => {
                state.keymap_loaded = false;
                state.resume = None;
                self.transition(&mut state, ControlMode::Off, "keymap rejected");
                Err(err)
            }
        }
    }

    /// Rebuilds the live bindings for a new screen size
    pub fn resize(&self, screen: ScreenBounds) {
        let mut state = self.lock();
        self.dispatcher.resize(screen);
        state.adapters.controller.rest_sticks();
    }

    /// Drops the keymap and turns keymapping off
    pub fn clear_keymap(&self) {
        let mut state = self.lock();
        state.keymap_loaded = false;
        state.resume = None;
        self.transition(&mut state, ControlMode::Off, "keymap cleared");
        self.dispatcher.clear();
    }

    fn adapter_ctx(&self) -> AdapterCtx<'_> {
        AdapterCtx {
            dispatcher: &self.dispatcher,
            cursor: &*self.cursor,
            editor: self.editor.as_deref(),
            capture_toggle: self.keys.capture_toggle,
            stick_range: self.stick_range,
        }
    }

    fn apply(&self, state: &mut RouterState, trigger: ModeTrigger) {
        if trigger == ModeTrigger::ControllerDisconnected {
            let ctx = self.adapter_ctx();
            state.adapters.controller.release_all(&ctx);
        }

        let next = next_mode(state.mode, trigger, state.keymap_loaded, state.resume);
        state.resume = next.resume;
        self.transition(state, next.to, trigger.reason());
    }

    fn transition(&self, state: &mut RouterState, to: ControlMode, reason: &str) {
        let from = state.mode;
        if from == to {
            return;
        }

        let mut adapters = AdapterSet::for_mode(to);
        let hidden = adapters.cursor_hidden();
        let visibility_changed = hidden != state.adapters.cursor_hidden();
        let ctx = self.adapter_ctx();
        adapters.controller.take_over(
            &mut state.adapters.controller,
            &ctx,
            visibility_changed || to.clears_all(),
        );

        if visibility_changed {
            for observer in &self.observers {
                observer.cursor_will_change(hidden);
            }
            if hidden {
                self.cursor.hide();
            } else {
                self.cursor.unhide();
            }
            if to.clears_all() {
                self.dispatcher.invalidate_all();
            } else {
                self.dispatcher.invalidate_non_button();
            }
        } else if to.clears_all() {
            self.dispatcher.invalidate_all();
        }

        info!(target: "controls", ?from, ?to, reason, "control mode changed");
        state.mode = to;
        state.adapters = adapters;

        for observer in &self.observers {
            observer.mode_changed(from, to);
        }
    }
}
