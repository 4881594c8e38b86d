//! Work queue self-test
//!
//! Starts a throwaway session on a private runtime, taps one button and checks
//! that the touch arrives complete.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::config::EngineConfig;
use crate::health::check::{CheckResult, SystemCheck};
use crate::input::{KeyCode, LogicalKey};
use crate::keymap::{ButtonBinding, Keymap, Transform};
use crate::mode::CursorControl;
use crate::runtime::{Collaborators, Session};
use crate::touch::{Delivery, Point, SurfaceId, TouchEvent, TouchPhase, TouchSink};

const PROBE_KEY: LogicalKey = LogicalKey::Key(KeyCode::Space);
const TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Default)]
struct ProbeSink {
    phases: Mutex<Vec<TouchPhase>>,
}

impl TouchSink for ProbeSink {
    fn hit_test(&self, _point: Point) -> SurfaceId {
        SurfaceId(0)
    }

    fn deliver(&self, event: TouchEvent) -> Delivery {
        self.phases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.phase);
        Delivery::Accepted
    }
}

struct HeadlessCursor;

impl CursorControl for HeadlessCursor {
    fn hide(&self) {}
    fn unhide(&self) {}
    fn is_hidden(&self) -> bool {
        false
    }
    fn location(&self) -> Option<Point> {
        None
    }
}

/// Checks that a session starts, delivers a tap and shuts down
#[derive(Default)]
pub struct WorkQueueCheck;

impl WorkQueueCheck {
    pub fn new() -> Self {
        Self
    }

    async fn probe(sink: Arc<ProbeSink>) -> Result<Vec<TouchPhase>, String> {
        let config = EngineConfig::builtin("probe");
        let session = Session::start(
            &config,
            Collaborators::new(sink.clone(), Arc::new(HeadlessCursor)),
        );

        let mut keymap = Keymap::new();
        keymap.buttons.push(ButtonBinding {
            key: PROBE_KEY,
            transform: Transform {
                x: 0.5,
                y: 0.5,
                size: 0.05,
            },
        });
        session.load_keymap(keymap).map_err(|e| e.to_string())?;

        let dispatcher = session.dispatcher();
        session.flush().await.map_err(|e| e.to_string())?;
        if !dispatcher.dispatch_key(PROBE_KEY, true) || !dispatcher.dispatch_key(PROBE_KEY, false)
        {
            return Err("probe key was not routed".to_string());
        }
        session.flush().await.map_err(|e| e.to_string())?;
        session.shutdown().await.map_err(|e| e.to_string())?;

        Ok(sink
            .phases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

impl SystemCheck for WorkQueueCheck {
    fn name(&self) -> &'static str {
        "Work Queue"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Starts a session and delivers one tap end to end")
    }

    fn check(&self) -> CheckResult {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => return CheckResult::fail(format!("Runtime unavailable: {}", e)),
        };

        let sink = Arc::new(ProbeSink::default());
        let outcome = runtime.block_on(async {
            tokio::time::timeout(TIMEOUT, Self::probe(sink))
                .await
                .map_err(|_| "probe timed out".to_string())?
        });

        match outcome {
            Ok(phases) if phases == [TouchPhase::Began, TouchPhase::Ended] => {
                CheckResult::pass("Tap delivered").with_details(["  Began, Ended".to_string()])
            }
            Ok(phases) => CheckResult::fail("Tap delivered incompletely")
                .with_details([format!("  Received: {:?}", phases)]),
            Err(e) => CheckResult::fail("Session probe failed").with_details([format!("  ✗ {}", e)]),
        }
    }
}
