//! End-to-end dispatch through a running session

mod common;

use std::time::Duration;

use common::{Fixture, at, button, key, mouse_area, near};
use keytouch::dispatch::PriorityTier;
use keytouch::input::{ControllerElement, KeyCode, LogicalKey};
use keytouch::keymap::{ButtonBinding, DirectionKeys, JoystickBinding, Keymap};
use keytouch::touch::TouchPhase;

const LEFT_STICK: LogicalKey = LogicalKey::Controller(ControllerElement::LeftThumbstick);

fn analog_joystick(x: f32, y: f32) -> JoystickBinding {
    JoystickBinding {
        key: Some(LEFT_STICK),
        keys: None,
        transform: at(x, y, 0.1),
    }
}

#[tokio::test(start_paused = true)]
async fn test_button_tap_at_fixed_point() {
    let fx = Fixture::new(1000.0, 1000.0);
    let mut keymap = Keymap::new();
    keymap.buttons.push(button(KeyCode::A, 0.1, 0.1));
    fx.load(keymap).await;

    let dispatcher = fx.session.dispatcher();
    assert!(dispatcher.dispatch_key(key(KeyCode::A), true));
    fx.flush().await;
    let began = fx.sink.events();
    assert_eq!(began.len(), 1);
    assert_eq!(began[0].phase, TouchPhase::Began);
    assert!(near(began[0].point, [100.0, 100.0]));

    assert!(dispatcher.dispatch_key(key(KeyCode::A), false));
    fx.flush().await;
    let events = fx.sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].phase, TouchPhase::Ended);
    assert_eq!(events[1].id, began[0].id);
    assert!(near(events[1].point, [100.0, 100.0]));
}

#[tokio::test(start_paused = true)]
async fn test_unbound_key_is_not_consumed() {
    let fx = Fixture::new(1000.0, 1000.0);
    let mut keymap = Keymap::new();
    keymap.buttons.push(button(KeyCode::A, 0.1, 0.1));
    fx.load(keymap).await;

    assert!(!fx.session.dispatcher().dispatch_key(key(KeyCode::B), true));
    assert!(!fx.session.dispatcher().dispatch_vector(LEFT_STICK, 1.0, 1.0));
    fx.flush().await;
    assert!(fx.sink.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_continuous_joystick_begins_past_deadzone() {
    let fx = Fixture::new(1000.0, 1000.0);
    let mut keymap = Keymap::new();
    keymap.joysticks.push(analog_joystick(0.05, 0.05));
    fx.load(keymap).await;

    let dispatcher = fx.session.dispatcher();
    assert_eq!(dispatcher.priority(LEFT_STICK), Some(PriorityTier::Default));
    for _ in 0..3 {
        assert!(dispatcher.dispatch_vector(LEFT_STICK, 10.0, 0.0));
    }
    fx.flush().await;

    let events = fx.sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].phase, TouchPhase::Began);
    assert!(near(events[0].point, [70.0, 50.0]));
    assert_eq!(events[1].phase, TouchPhase::Moved);
    assert!(events[1].point[0] > events[0].point[0]);
}

#[tokio::test(start_paused = true)]
async fn test_continuous_joystick_ends_once_inside_deadzone() {
    let fx = Fixture::new(1000.0, 1000.0);
    let mut keymap = Keymap::new();
    keymap.joysticks.push(analog_joystick(0.5, 0.5));
    fx.load(keymap).await;

    let dispatcher = fx.session.dispatcher();
    dispatcher.dispatch_vector(LEFT_STICK, 20.0, 0.0);
    dispatcher.dispatch_vector(LEFT_STICK, -20.0, 0.0);
    for _ in 0..5 {
        dispatcher.dispatch_vector(LEFT_STICK, 1.0, 0.0);
        dispatcher.dispatch_vector(LEFT_STICK, -1.0, 0.0);
    }
    fx.flush().await;

    assert_eq!(fx.sink.phases(), [TouchPhase::Began, TouchPhase::Ended]);
}

#[tokio::test(start_paused = true)]
async fn test_oversized_swipe_stays_on_screen_then_lifts() {
    let fx = Fixture::new(1000.0, 1000.0);
    let mut keymap = Keymap::new();
    keymap.mouse_areas.push(mouse_area(LogicalKey::POINTER, 0.5, 0.5));
    fx.load(keymap).await;

    let dispatcher = fx.session.dispatcher();
    dispatcher.dispatch_vector(LogicalKey::POINTER, 2000.0, 0.0);
    fx.flush().await;

    let first = fx.sink.events();
    assert_eq!(first[0].phase, TouchPhase::Began);
    assert!(near(first[0].point, [500.0, 500.0]));
    assert_eq!(first[1].phase, TouchPhase::Moved);
    assert!(first[1].point[0] > 500.0 && first[1].point[0] <= 1000.0);

    let mut updates = 1;
    while !fx.sink.phases().contains(&TouchPhase::Ended) {
        assert!(updates < 40, "swipe never lifted");
        dispatcher.dispatch_vector(LogicalKey::POINTER, 2000.0, 0.0);
        fx.flush().await;
        updates += 1;
    }

    let events = fx.sink.events();
    for event in &events {
        assert!((0.0..=1000.0).contains(&event.point[0]), "{event:?}");
        assert!((0.0..=1000.0).contains(&event.point[1]), "{event:?}");
    }

    // The update that lifts the touch does not move it first
    let [.., last_move, ended] = events.as_slice() else {
        panic!("too few events");
    };
    assert_eq!(last_move.phase, TouchPhase::Moved);
    assert!(near(last_move.point, [1000.0, 500.0]));
    assert_eq!(ended.phase, TouchPhase::Ended);
    assert!(near(ended.point, [1000.0, 500.0]));
}

#[tokio::test(start_paused = true)]
async fn test_wild_swipe_deltas_never_leave_screen() {
    let fx = Fixture::new(800.0, 600.0);
    let mut keymap = Keymap::new();
    keymap.mouse_areas.push(mouse_area(LogicalKey::POINTER, 0.25, 0.75));
    fx.load(keymap).await;

    let deltas = [
        (5000.0, -5000.0),
        (-300.0, 20.0),
        (0.0, 900.0),
        (-7000.0, 0.0),
        (40.0, 40.0),
    ];
    for round in 0..6 {
        for (dx, dy) in deltas {
            fx.session.dispatcher().dispatch_vector(LogicalKey::POINTER, dx, dy);
        }
        fx.flush().await;
        // Let the cooldown pass so the next round begins a fresh swipe
        tokio::time::sleep(Duration::from_millis(25 + round)).await;
    }

    let events = fx.sink.events();
    assert!(events.iter().filter(|e| e.phase == TouchPhase::Began).count() > 1);
    for event in events {
        assert!((0.0..=800.0).contains(&event.point[0]), "{event:?}");
        assert!((0.0..=600.0).contains(&event.point[1]), "{event:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_lifts_idle_swipe() {
    let fx = Fixture::new(1000.0, 1000.0);
    let mut keymap = Keymap::new();
    keymap.mouse_areas.push(mouse_area(LogicalKey::POINTER, 0.5, 0.5));
    fx.load(keymap).await;

    fx.session.dispatcher().dispatch_vector(LogicalKey::POINTER, 10.0, 0.0);
    fx.flush().await;
    assert_eq!(fx.sink.phases(), [TouchPhase::Began, TouchPhase::Moved]);

    // First tick sees the move, the next three are stale
    tokio::time::sleep(Duration::from_millis(350)).await;
    fx.flush().await;
    assert!(!fx.sink.phases().contains(&TouchPhase::Ended));

    tokio::time::sleep(Duration::from_millis(300)).await;
    fx.flush().await;
    assert_eq!(fx.sink.phases().last(), Some(&TouchPhase::Ended));
    assert!(fx.sink.open_touches().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_swipe_restarts_after_sink_drops_identifier() {
    let fx = Fixture::new(1000.0, 1000.0);
    let mut keymap = Keymap::new();
    keymap.mouse_areas.push(mouse_area(LogicalKey::POINTER, 0.5, 0.5));
    fx.load(keymap).await;
    let dispatcher = fx.session.dispatcher();

    fx.sink.invalidate_moves(true);
    dispatcher.dispatch_vector(LogicalKey::POINTER, 10.0, 0.0);
    fx.flush().await;
    assert_eq!(fx.sink.phases(), [TouchPhase::Began, TouchPhase::Moved]);

    // Nothing is left to lift
    tokio::time::sleep(Duration::from_secs(1)).await;
    fx.flush().await;
    assert_eq!(fx.sink.events().len(), 2);

    fx.sink.invalidate_moves(false);
    dispatcher.dispatch_vector(LogicalKey::POINTER, 10.0, 0.0);
    tokio::time::sleep(Duration::from_secs(1)).await;
    fx.flush().await;

    let events = fx.sink.events();
    assert_eq!(
        events.iter().map(|e| e.phase).collect::<Vec<_>>(),
        [
            TouchPhase::Began,
            TouchPhase::Moved,
            TouchPhase::Began,
            TouchPhase::Moved,
            TouchPhase::Ended,
        ]
    );
    assert_eq!(events[4].id, events[2].id);
}

#[tokio::test(start_paused = true)]
async fn test_cooldown_rejects_immediate_restart() {
    let fx = Fixture::new(1000.0, 1000.0);
    let mut keymap = Keymap::new();
    keymap.mouse_areas.push(mouse_area(LogicalKey::POINTER, 0.5, 0.5));
    fx.load(keymap).await;
    let dispatcher = fx.session.dispatcher();

    dispatcher.dispatch_vector(LogicalKey::POINTER, 10.0, 0.0);
    dispatcher.invalidate_non_button();
    dispatcher.dispatch_vector(LogicalKey::POINTER, 10.0, 0.0);
    fx.flush().await;
    assert_eq!(
        fx.sink.phases(),
        [TouchPhase::Began, TouchPhase::Moved, TouchPhase::Ended]
    );

    tokio::time::sleep(Duration::from_millis(25)).await;
    dispatcher.dispatch_vector(LogicalKey::POINTER, 10.0, 0.0);
    fx.flush().await;
    let phases = fx.sink.phases();
    assert_eq!(phases[3..], [TouchPhase::Began, TouchPhase::Moved]);
}

#[tokio::test(start_paused = true)]
async fn test_invalidate_non_button_keeps_held_button() {
    let fx = Fixture::new(1000.0, 1000.0);
    let mut keymap = Keymap::new();
    keymap.buttons.push(button(KeyCode::Space, 0.9, 0.9));
    keymap.mouse_areas.push(mouse_area(LogicalKey::POINTER, 0.5, 0.5));
    fx.load(keymap).await;
    let dispatcher = fx.session.dispatcher();

    dispatcher.dispatch_key(key(KeyCode::Space), true);
    dispatcher.dispatch_vector(LogicalKey::POINTER, 10.0, 5.0);
    fx.flush().await;
    let before = fx.sink.take();
    let button_id = before[0].id;
    let swipe_id = before[1].id;
    assert_ne!(button_id, swipe_id);

    dispatcher.invalidate_non_button();
    fx.flush().await;
    let after = fx.sink.events();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].phase, TouchPhase::Ended);
    assert_eq!(after[0].id, swipe_id);
}

#[tokio::test(start_paused = true)]
async fn test_invalidate_all_leaves_no_open_touch() {
    let fx = Fixture::new(1000.0, 1000.0);
    let mut keymap = Keymap::new();
    keymap.buttons.push(button(KeyCode::Space, 0.9, 0.9));
    keymap.draggable_buttons.push(button(KeyCode::Q, 0.3, 0.3));
    keymap.joysticks.push(analog_joystick(0.2, 0.7));
    keymap.mouse_areas.push(mouse_area(LogicalKey::POINTER, 0.5, 0.5));
    fx.load(keymap).await;
    let dispatcher = fx.session.dispatcher();

    dispatcher.dispatch_key(key(KeyCode::Space), true);
    dispatcher.dispatch_key(key(KeyCode::Q), true);
    dispatcher.dispatch_vector(LEFT_STICK, 40.0, 0.0);
    dispatcher.dispatch_vector(LogicalKey::SCROLL_DRAG, 0.0, 3.0);
    fx.flush().await;
    assert_eq!(fx.sink.open_touches().len(), 4);

    dispatcher.invalidate_all();
    fx.flush().await;
    assert!(fx.sink.open_touches().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_digital_joystick_later_press_wins_axis() {
    let fx = Fixture::new(1000.0, 1000.0);
    let mut keymap = Keymap::new();
    keymap.joysticks.push(JoystickBinding {
        key: None,
        keys: Some(DirectionKeys {
            up: key(KeyCode::W),
            down: key(KeyCode::S),
            left: key(KeyCode::A),
            right: key(KeyCode::D),
        }),
        transform: at(0.5, 0.5, 0.1),
    });
    fx.load(keymap).await;
    let dispatcher = fx.session.dispatcher();

    dispatcher.dispatch_key(key(KeyCode::W), true);
    dispatcher.dispatch_key(key(KeyCode::S), true);
    fx.flush().await;
    let both = fx.sink.take();
    assert_eq!(both[0].phase, TouchPhase::Began);
    assert_eq!(both[1].phase, TouchPhase::Moved);
    let up_target = both[0].point;
    let down_while_up_held = both[1].point;

    // Releasing the winner hands the axis back to the key still held
    dispatcher.dispatch_key(key(KeyCode::S), false);
    dispatcher.dispatch_key(key(KeyCode::W), false);
    fx.flush().await;
    let released = fx.sink.take();
    assert!(near(released[0].point, up_target));
    assert_eq!(released.last().map(|e| e.phase), Some(TouchPhase::Ended));

    dispatcher.dispatch_key(key(KeyCode::S), true);
    fx.flush().await;
    let down_only = fx.sink.take();
    assert_eq!(down_only[0].phase, TouchPhase::Began);
    assert!(near(down_only[0].point, down_while_up_held));
}

#[tokio::test(start_paused = true)]
async fn test_draggable_button_routes_pointer_while_held() {
    let fx = Fixture::new(1000.0, 1000.0);
    let mut keymap = Keymap::new();
    keymap.draggable_buttons.push(button(KeyCode::Q, 0.5, 0.5));
    fx.load(keymap).await;
    let dispatcher = fx.session.dispatcher();

    assert_eq!(dispatcher.priority(LogicalKey::POINTER), None);
    dispatcher.dispatch_key(key(KeyCode::Q), true);
    fx.flush().await;
    assert_eq!(
        dispatcher.priority(LogicalKey::POINTER),
        Some(PriorityTier::Draggable)
    );

    assert!(dispatcher.dispatch_vector(LogicalKey::POINTER, 10.0, 0.0));
    dispatcher.dispatch_key(key(KeyCode::Q), false);
    fx.flush().await;

    let events = fx.sink.events();
    assert_eq!(
        events.iter().map(|e| e.phase).collect::<Vec<_>>(),
        [TouchPhase::Began, TouchPhase::Moved, TouchPhase::Ended]
    );
    assert!(near(events[0].point, [500.0, 500.0]));
    assert!(near(events[1].point, [510.0, 500.0]));
    assert_eq!(dispatcher.priority(LogicalKey::POINTER), None);
    assert_eq!(dispatcher.occupancy(PriorityTier::Draggable), 0);
}

#[tokio::test(start_paused = true)]
async fn test_shared_vector_key_binds_one_slot() {
    let fx = Fixture::new(1000.0, 1000.0);
    let mut keymap = Keymap::new();
    keymap.mouse_areas.push(mouse_area(LogicalKey::POINTER, 0.3, 0.3));
    keymap.mouse_areas.push(mouse_area(LogicalKey::POINTER, 0.7, 0.7));
    fx.load(keymap).await;

    // Scroll drag, pointer and scroll scale
    assert_eq!(fx.session.dispatcher().occupancy(PriorityTier::Camera), 3);

    // The later mouse area owns the key
    fx.session.dispatcher().dispatch_vector(LogicalKey::POINTER, 1.0, 0.0);
    fx.flush().await;
    assert!(near(fx.sink.events()[0].point, [700.0, 700.0]));
}

#[tokio::test(start_paused = true)]
async fn test_full_tier_drops_extra_bindings() {
    let fx = Fixture::new(1000.0, 1000.0);
    let codes = [
        KeyCode::A,
        KeyCode::B,
        KeyCode::C,
        KeyCode::D,
        KeyCode::E,
        KeyCode::F,
        KeyCode::G,
        KeyCode::H,
        KeyCode::I,
    ];
    let mut keymap = Keymap::new();
    for code in codes {
        keymap.mouse_areas.push(mouse_area(key(code), 0.5, 0.5));
    }
    fx.load(keymap).await;

    let dispatcher = fx.session.dispatcher();
    assert_eq!(dispatcher.occupancy(PriorityTier::Camera), 8);
    assert_eq!(dispatcher.priority(key(KeyCode::A)), Some(PriorityTier::Camera));
    assert_eq!(dispatcher.priority(key(KeyCode::I)), None);
}

#[tokio::test(start_paused = true)]
async fn test_resize_rebuilds_at_new_geometry() {
    let fx = Fixture::new(1000.0, 1000.0);
    let mut keymap = Keymap::new();
    keymap.buttons.push(ButtonBinding {
        key: key(KeyCode::A),
        transform: at(0.1, 0.1, 0.05),
    });
    fx.load(keymap).await;

    fx.session.resize(2000.0, 1000.0);
    fx.session.dispatcher().dispatch_key(key(KeyCode::A), true);
    fx.flush().await;

    let events = fx.sink.events();
    assert_eq!(events.len(), 1);
    assert!(near(events[0].point, [200.0, 100.0]));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_ends_held_touches() {
    let fx = Fixture::new(1000.0, 1000.0);
    let mut keymap = Keymap::new();
    keymap.buttons.push(button(KeyCode::Space, 0.5, 0.5));
    fx.load(keymap).await;

    fx.session.dispatcher().dispatch_key(key(KeyCode::Space), true);
    let dispatcher = fx.session.dispatcher().clone();
    let sink = fx.sink.clone();
    fx.session.shutdown().await.unwrap();

    assert_eq!(sink.phases(), [TouchPhase::Began, TouchPhase::Ended]);
    assert!(!dispatcher.dispatch_key(key(KeyCode::Space), true));
}
