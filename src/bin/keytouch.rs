//! Keytouch host
//!
//! `keytouch check` validates config profiles (and optionally a keymap).
//! `keytouch run --keymap FILE` opens a window, captures its input and logs
//! the touches the keymap produces.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{CursorGrabMode, Window, WindowId};

use keytouch::build_info;
use keytouch::config::EngineConfig;
use keytouch::health;
use keytouch::input::InputCollector;
use keytouch::keymap::{FileKeymapStore, KeymapStore};
use keytouch::mode::{ControlMode, CursorControl, ModeObserver};
use keytouch::runtime::{Collaborators, Session};
use keytouch::touch::{Delivery, Point, SurfaceId, TouchEvent, TouchSink};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration profile (defaults to KEYTOUCH_PROFILE, then "release")
    #[arg(short, long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run health checks and exit
    Check {
        /// Also validate this keymap
        #[arg(short, long)]
        keymap: Option<PathBuf>,
    },
    /// Open a capture window and synthesize touches from its input
    Run {
        /// Keymap to load
        #[arg(short, long)]
        keymap: PathBuf,
    },
}

/// Touch sink that logs every synthesized event
struct LogSink;

impl TouchSink for LogSink {
    fn hit_test(&self, _point: Point) -> SurfaceId {
        SurfaceId(0)
    }

    fn deliver(&self, event: TouchEvent) -> Delivery {
        info!(
            target: "touches",
            id = event.id.0,
            phase = ?event.phase,
            x = event.point[0],
            y = event.point[1],
            "touch"
        );
        Delivery::Accepted
    }
}

/// Cursor backed by the capture window once it exists
#[derive(Default)]
struct WindowCursor {
    window: OnceLock<Arc<Window>>,
    hidden: AtomicBool,
    location: Mutex<Option<Point>>,
}

impl WindowCursor {
    fn attach(&self, window: Arc<Window>) {
        if self.window.set(window).is_err() {
            warn!("capture window attached twice");
        }
        self.apply(self.hidden.load(Ordering::Acquire));
    }

    fn set_location(&self, location: Option<Point>) {
        *self.location.lock().unwrap_or_else(PoisonError::into_inner) = location;
    }

    fn apply(&self, hidden: bool) {
        let Some(window) = self.window.get() else {
            return;
        };
        window.set_cursor_visible(!hidden);
        let grab = if hidden {
            window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(e) = grab {
            warn!(error = %e, hidden, "cursor grab not supported");
        }
    }
}

impl CursorControl for WindowCursor {
    fn hide(&self) {
        self.hidden.store(true, Ordering::Release);
        self.apply(true);
    }

    fn unhide(&self) {
        self.hidden.store(false, Ordering::Release);
        self.apply(false);
    }

    fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::Acquire)
    }

    fn location(&self) -> Option<Point> {
        *self.location.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct ModeLog;

impl ModeObserver for ModeLog {
    fn cursor_will_change(&self, hidden: bool) {
        debug!(hidden, "cursor visibility changing");
    }

    fn mode_changed(&self, from: ControlMode, to: ControlMode) {
        debug!(?from, ?to, "mode observer notified");
    }
}

struct App {
    config: EngineConfig,
    session: Session,
    cursor: Arc<WindowCursor>,
    collector: InputCollector,
    window: Option<Arc<Window>>,
}

impl App {
    fn route(&self, input: Option<keytouch::input::RawInput>) {
        if let Some(input) = input {
            let consumed = self.session.router().handle(input);
            debug!(?input, consumed, "input routed");
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(format!("keytouch {}", build_info::PKG_VERSION))
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.screen.width as f64,
                self.config.screen.height as f64,
            ));

        match event_loop.create_window(attributes) {
            Ok(window) => {
                let window = Arc::new(window);
                self.collector.set_scale_factor(window.scale_factor() as f32);
                self.cursor.attach(Arc::clone(&window));
                self.window = Some(window);
                info!("capture window created");
            }
            Err(e) => {
                error!(error = %e, "failed to create window");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let input = self.collector.handle_window_event(&event);
        self.cursor.set_location(self.collector.cursor_pos());
        self.route(input);

        match event {
            WindowEvent::CloseRequested => {
                info!("close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.collector.set_scale_factor(scale_factor as f32);
            }
            WindowEvent::Resized(size) => {
                if let Some(window) = &self.window {
                    let logical = size.to_logical::<f32>(window.scale_factor());
                    self.session.resize(logical.width, logical.height);
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let input = self.collector.handle_device_event(&event);
        self.route(input);
    }
}

fn init_tracing() {
    let filter = "keytouch=info,controls=info,touches=info";
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_config(profile: Option<&str>) -> EngineConfig {
    let loaded = match profile {
        Some(profile) => EngineConfig::load(profile),
        None => EngineConfig::load_from_env(),
    };
    loaded.unwrap_or_else(|e| {
        warn!(error = %e, "failed to load config, using built-in defaults");
        EngineConfig::builtin(profile.unwrap_or("release"))
    })
}

fn check(keymap: Option<PathBuf>) -> i32 {
    let report = match keymap {
        Some(path) => health::run_all_checks_with_keymap(path),
        None => health::run_all_checks(),
    };
    health::print_report(&report);
    report.exit_code()
}

fn run(config: EngineConfig, keymap: PathBuf) -> anyhow::Result<()> {
    let keymap = FileKeymapStore::new(&keymap)
        .load_bindings()
        .with_context(|| format!("loading keymap {}", keymap.display()))?;

    let runtime = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    let guard = runtime.enter();

    let cursor = Arc::new(WindowCursor::default());
    let session = Session::start(
        &config,
        Collaborators::new(Arc::new(LogSink), cursor.clone()).with_observer(Arc::new(ModeLog)),
    );
    session.load_keymap(keymap).context("keymap rejected")?;

    let event_loop = EventLoop::new().context("creating event loop")?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App {
        config,
        session,
        cursor,
        collector: InputCollector::new(),
        window: None,
    };
    event_loop.run_app(&mut app).context("running event loop")?;

    drop(guard);
    runtime.block_on(app.session.shutdown())?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();
    info!(version = %build_info::version_string(), "keytouch starting");

    match args.command {
        Command::Check { keymap } => std::process::exit(check(keymap)),
        Command::Run { keymap } => run(load_config(args.profile.as_deref()), keymap),
    }
}
