//! Shared fixtures for session-level tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use keytouch::config::EngineConfig;
use keytouch::input::{KeyCode, LogicalKey};
use keytouch::keymap::{ButtonBinding, Keymap, MouseAreaBinding, Transform};
use keytouch::mode::CursorControl;
use keytouch::runtime::{Collaborators, Session};
use keytouch::touch::{Delivery, Point, SurfaceId, TouchEvent, TouchId, TouchPhase, TouchSink};

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<TouchEvent>>,
    invalidating: AtomicBool,
}

impl RecordingSink {
    /// Answers moves with `Delivery::Invalidated` while `on`
    pub fn invalidate_moves(&self, on: bool) {
        self.invalidating.store(on, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<TouchEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<TouchEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    pub fn phases(&self) -> Vec<TouchPhase> {
        self.events().iter().map(|event| event.phase).collect()
    }

    /// Touches that began and have not ended yet
    pub fn open_touches(&self) -> Vec<TouchId> {
        let mut open = Vec::new();
        for event in self.events() {
            match event.phase {
                TouchPhase::Began => open.push(event.id),
                TouchPhase::Ended | TouchPhase::Cancelled => open.retain(|id| *id != event.id),
                _ => {}
            }
        }
        open
    }
}

impl TouchSink for RecordingSink {
    fn hit_test(&self, _point: Point) -> SurfaceId {
        SurfaceId(1)
    }

    fn deliver(&self, event: TouchEvent) -> Delivery {
        let phase = event.phase;
        self.events.lock().unwrap().push(event);
        if phase == TouchPhase::Moved && self.invalidating.load(Ordering::SeqCst) {
            Delivery::Invalidated
        } else {
            Delivery::Accepted
        }
    }
}

#[derive(Default)]
pub struct FakeCursor {
    hidden: AtomicBool,
    location: Mutex<Option<Point>>,
}

impl FakeCursor {
    pub fn at(location: Point) -> Self {
        Self {
            hidden: AtomicBool::new(false),
            location: Mutex::new(Some(location)),
        }
    }

    pub fn move_to(&self, location: Point) {
        *self.location.lock().unwrap() = Some(location);
    }
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

pub struct Fixture {
    pub session: Session,
    pub sink: Arc<RecordingSink>,
    pub cursor: Arc<FakeCursor>,
}

impl Fixture {
    /// A session on a `width` × `height` screen with the cursor at its center
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_config(width, height, |_| {})
    }

    pub fn with_config(width: f32, height: f32, tweak: impl FnOnce(&mut EngineConfig)) -> Self {
        let mut config = EngineConfig::builtin("test");
        config.screen.width = width;
        config.screen.height = height;
        config.tuning.camera_sensitivity = 1.0;
        tweak(&mut config);

        let sink = Arc::new(RecordingSink::default());
        let cursor = Arc::new(FakeCursor::at([width / 2.0, height / 2.0]));
        let session = Session::start(
            &config,
            Collaborators::new(sink.clone(), cursor.clone()),
        );
        Self {
            session,
            sink,
            cursor,
        }
    }

    pub async fn load(&self, keymap: Keymap) {
        self.session.load_keymap(keymap).unwrap();
        self.flush().await;
    }

    pub async fn flush(&self) {
        self.session.flush().await.unwrap();
    }
}

pub fn key(code: KeyCode) -> LogicalKey {
    LogicalKey::Key(code)
}

pub fn at(x: f32, y: f32, size: f32) -> Transform {
    Transform { x, y, size }
}

pub fn button(code: KeyCode, x: f32, y: f32) -> ButtonBinding {
    ButtonBinding {
        key: key(code),
        transform: at(x, y, 0.05),
    }
}

pub fn mouse_area(key: LogicalKey, x: f32, y: f32) -> MouseAreaBinding {
    MouseAreaBinding {
        key,
        transform: at(x, y, 0.3),
    }
}

pub fn near(a: Point, b: Point) -> bool {
    (a[0] - b[0]).abs() < 1e-3 && (a[1] - b[1]).abs() < 1e-3
}
