//! Session context object
//!
//! A session wires one work queue, one dispatcher and one router together for
//! the lifetime of an app. There is no global state; hosts keep the session
//! and hand out its dispatcher and router.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

use super::{Job, Scheduler, WorkQueue, run_worker};
use crate::config::EngineConfig;
use crate::dispatch::{ActionDispatcher, Engine, Routing};
use crate::keymap::{Keymap, KeymapError};
use crate::mode::{ControlKeys, CursorControl, EditorSink, InputRouter, ModeObserver};
use crate::touch::{ScreenBounds, TouchSink};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("work queue has shut down")]
    QueueClosed,

    #[error("work queue task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// External collaborators of a session
pub struct Collaborators {
    pub sink: Arc<dyn TouchSink>,
    pub cursor: Arc<dyn CursorControl>,
    pub editor: Option<Arc<dyn EditorSink>>,
    pub observers: Vec<Arc<dyn ModeObserver>>,
}

impl Collaborators {
    pub fn new(sink: Arc<dyn TouchSink>, cursor: Arc<dyn CursorControl>) -> Self {
        Self {
            sink,
            cursor,
            editor: None,
            observers: Vec::new(),
        }
    }

    pub fn with_editor(mut self, editor: Arc<dyn EditorSink>) -> Self {
        self.editor = Some(editor);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ModeObserver>) -> Self {
        self.observers.push(observer);
        self
    }
}

pub struct Session {
    queue: WorkQueue,
    dispatcher: ActionDispatcher,
    router: Arc<InputRouter>,
    worker: JoinHandle<()>,
}

impl Session {
    /// Starts the work queue on the current tokio runtime
    pub fn start(config: &EngineConfig, collaborators: Collaborators) -> Self {
        let (queue, jobs) = WorkQueue::new();
        let routing = Arc::new(Routing::default());
        let screen = config.screen.bounds();

        let engine = Engine::new(
            Arc::clone(&routing),
            collaborators.sink,
            Arc::clone(&collaborators.cursor),
            Scheduler::new(queue.clone()),
            config.tuning.clone(),
            screen,
        );
        let worker = tokio::spawn(run_worker(engine, jobs));

        let dispatcher = ActionDispatcher::new(routing, queue.clone());
        let router = Arc::new(InputRouter::new(
            dispatcher.clone(),
            collaborators.cursor,
            collaborators.editor,
            collaborators.observers,
            ControlKeys::from(&config.controls),
            &config.tuning,
        ));

        info!(
            profile = %config.profile,
            width = screen.width,
            height = screen.height,
            "session started"
        );

        Self {
            queue,
            dispatcher,
            router,
            worker,
        }
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    pub fn router(&self) -> &Arc<InputRouter> {
        &self.router
    }

    /// Builds `keymap` and turns keymapping on
    pub fn load_keymap(&self, keymap: Keymap) -> Result<(), KeymapError> {
        self.router.load_keymap(keymap)
    }

    /// Rebuilds the live bindings for a new screen size
    pub fn resize(&self, width: f32, height: f32) {
        self.router.resize(ScreenBounds::new(width, height));
    }

    /// Waits until every job queued so far has run
    pub async fn flush(&self) -> Result<(), SessionError> {
        let (done, finished) = oneshot::channel();
        if !self.queue.send(Job::Barrier(done)) {
            return Err(SessionError::QueueClosed);
        }
        finished.await.map_err(|_| SessionError::QueueClosed)
    }

    /// Ends every touch and stops the work queue
    pub async fn shutdown(self) -> Result<(), SessionError> {
        self.queue.send(Job::Shutdown);
        self.worker.await?;
        info!("session stopped");
        Ok(())
    }
}
