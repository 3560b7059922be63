//! Integration tests for the tween scheduler
//!
//! These tests drive a [`Tweenie`] the way a host frame loop would and verify:
//! - Loop counting through the update/late-update phases
//! - Commands issued from callbacks land on the next frame
//! - Tag-based bulk control
//! - Tweeners whose target disappears are discarded without disturbing others

use glam::Vec3;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tweenie::{bind, Color, Easing, Interpolate, LoopMode, TweenStatus, Tweenie, TweenieConfig};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn lerp(a: &f32, b: &f32, t: f32) -> f32 {
    <f32 as Interpolate>::lerp(a, b, t)
}

/// Create an f32 tween whose setter records every value
fn recorded(
    tweenie: &Tweenie,
    from: f32,
    to: f32,
    duration: f32,
) -> (tweenie::Tween<f32>, Rc<RefCell<Vec<f32>>>) {
    let values = Rc::new(RefCell::new(Vec::new()));
    let sink = values.clone();
    let tween = tweenie.to(move |v| sink.borrow_mut().push(v), from, to, duration, lerp);
    (tween, values)
}

fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
    let count = Rc::new(Cell::new(0));
    let inner = count.clone();
    (count, move || inner.set(inner.get() + 1))
}

// ============================================================================
// Looping
// ============================================================================

#[test]
fn test_default_loop_plays_extra_legs() {
    init_tracing();
    let tweenie = Tweenie::new();
    let (tween, values) = recorded(&tweenie, 0.0, 1.0, 1.0);
    let (steps, on_step) = counter();
    let (completes, on_complete) = counter();
    let tween = tween
        .set_loops(LoopMode::Default, 2)
        .on_step_complete(on_step)
        .on_complete(on_complete);

    tweenie.advance(1.0);
    tweenie.advance(1.0);
    assert_eq!(tween.status(), TweenStatus::Playing);
    assert_eq!(tween.loop_count(), 0);

    tweenie.advance(1.0);
    assert_eq!(steps.get(), 2);
    assert_eq!(completes.get(), 1);
    assert_eq!(tween.status(), TweenStatus::Completed);
    assert_eq!(*values.borrow(), vec![1.0, 1.0, 1.0, 1.0]);

    // Reset restores the configured loops for the next play
    assert_eq!(tween.loop_count(), 2);
}

#[test]
fn test_ping_pong_single_round_trip() {
    let tweenie = Tweenie::new();
    let (tween, values) = recorded(&tweenie, 0.0, 10.0, 1.0);
    let tween = tween.set_loops(LoopMode::PingPong, 1);

    tweenie.advance(1.0);
    assert!(tween.is_reverse());
    tweenie.advance(0.5);
    assert!((values.borrow()[1] - 5.0).abs() < 1e-5);
    tweenie.advance(0.5);
    assert!(!tween.is_reverse());
    assert_eq!(tween.loop_count(), 0);

    tweenie.advance(1.0);
    assert_eq!(tween.status(), TweenStatus::Completed);
    assert_eq!(*values.borrow(), vec![10.0, 5.0, 0.0, 10.0, 10.0]);
}

#[test]
fn test_zero_duration_completes_on_first_tick() {
    let tweenie = Tweenie::new();
    let (tween, values) = recorded(&tweenie, 0.0, 3.0, 0.0);

    tweenie.advance(0.0);
    assert_eq!(tween.status(), TweenStatus::Completed);
    assert_eq!(values.borrow().first().copied(), Some(3.0));
}

// ============================================================================
// Step-complete flags
// ============================================================================

#[test]
fn test_stop_after_step_complete() {
    let tweenie = Tweenie::new();
    let (tween, values) = recorded(&tweenie, 0.0, 1.0, 1.0);
    let (stops, on_stop) = counter();
    let tween = tween.set_loop(LoopMode::Default).on_stop(on_stop);

    tweenie.advance(0.5);
    tween.stop_after_step_complete();
    tweenie.advance(0.5);

    assert_eq!(tween.status(), TweenStatus::Stopped);
    assert_eq!(stops.get(), 1);
    assert_eq!(*values.borrow(), vec![0.5, 1.0, 0.0]);
    assert_eq!(tweenie.active_count(), 0);
}

#[test]
fn test_pause_after_step_resumes_on_next_leg() {
    let tweenie = Tweenie::new();
    let (tween, values) = recorded(&tweenie, 0.0, 10.0, 1.0);
    let tween = tween.set_loop(LoopMode::Default).pause_after_step_complete();

    tweenie.advance(1.0);
    assert_eq!(tween.status(), TweenStatus::Paused);
    assert!(tween.is_step_completed());

    tweenie.advance(1.0);
    assert_eq!(values.borrow().len(), 1);

    tween.play();
    tweenie.advance(0.5);
    assert_eq!(tween.status(), TweenStatus::Playing);
    assert!(!tween.is_step_completed());
    assert_eq!(*values.borrow(), vec![10.0, 5.0]);
}

#[test]
fn test_pause_lands_at_end_of_frame() {
    let tweenie = Tweenie::new();
    let (tween, values) = recorded(&tweenie, 0.0, 10.0, 1.0);

    tweenie.advance(0.5);
    tween.pause();
    tweenie.advance(0.25);
    assert_eq!(tween.status(), TweenStatus::Paused);
    assert!((values.borrow()[1] - 7.5).abs() < 1e-5);

    tweenie.advance(1.0);
    assert_eq!(values.borrow().len(), 2);

    tween.play();
    tweenie.advance(0.25);
    assert_eq!(tween.status(), TweenStatus::Completed);
    assert_eq!(values.borrow().last().copied(), Some(10.0));
}

// ============================================================================
// Re-entrancy
// ============================================================================

#[test]
fn test_on_complete_chains_next_tween() {
    let tweenie = Tweenie::new();
    let (first, _) = recorded(&tweenie, 0.0, 1.0, 1.0);
    let (second, second_values) = recorded(&tweenie, 0.0, 1.0, 1.0);
    let second = second.stop();

    let handle = tweenie.handle();
    let next = second.id();
    first.on_complete(move || {
        handle.play(next);
    });

    tweenie.advance(1.0);
    assert_eq!(first.status(), TweenStatus::Completed);
    assert_eq!(second.status(), TweenStatus::Pending);
    assert!(second_values.borrow().is_empty());

    tweenie.advance(0.5);
    assert_eq!(second.status(), TweenStatus::Playing);
    assert_eq!(*second_values.borrow(), vec![0.5]);
}

#[test]
fn test_replay_from_own_complete_callback() {
    let tweenie = Tweenie::new();
    let (tween, values) = recorded(&tweenie, 0.0, 1.0, 1.0);
    let (completes, mut on_complete) = counter();

    let handle = tweenie.handle();
    let id = tween.id();
    tween.on_complete(move || {
        on_complete();
        handle.play(id);
    });

    tweenie.advance(1.0);
    assert_eq!(completes.get(), 1);
    assert_eq!(tween.status(), TweenStatus::Pending);
    assert_eq!(tweenie.pending_count(), 1);

    tweenie.advance(0.25);
    assert_eq!(tween.status(), TweenStatus::Playing);
    assert_eq!(values.borrow().last().copied(), Some(0.25));
}

#[test]
fn test_callbacks_fire_in_lifecycle_order() {
    let tweenie = Tweenie::new();
    let events = Rc::new(RefCell::new(Vec::new()));
    let log = |name: &'static str| {
        let events = events.clone();
        move || events.borrow_mut().push(name)
    };
    tweenie
        .tween(|_: f32| {}, 0.0, 1.0, 1.0)
        .on_start(log("start"))
        .on_play(log("play"))
        .on_complete(log("complete"));

    tweenie.advance(0.5);
    tweenie.advance(0.5);
    assert_eq!(*events.borrow(), vec!["start", "play", "play", "complete"]);
}

// ============================================================================
// Tags
// ============================================================================

#[test]
fn test_tag_bulk_commands() {
    let tweenie = Tweenie::new();
    let (red, blue) = (tweenie.new_tag(), tweenie.new_tag());
    let reds: Vec<_> = (0..3)
        .map(|_| tweenie.tween_tagged(|_: f32| {}, 0.0, 1.0, 10.0, red))
        .collect();
    let other = tweenie.tween_tagged(|_: f32| {}, 0.0, 1.0, 10.0, blue);

    tweenie.advance(0.1);
    assert_eq!(tweenie.active_count(), 4);

    assert_eq!(tweenie.pause_tag(red), 3);
    tweenie.advance(0.1);
    assert!(reds.iter().all(|t| t.status() == TweenStatus::Paused));
    assert_eq!(other.status(), TweenStatus::Playing);
    assert_eq!(tweenie.active_count(), 1);

    assert_eq!(tweenie.play_tag(red), 3);
    tweenie.advance(0.1);
    assert_eq!(tweenie.active_count(), 4);

    assert_eq!(tweenie.stop_tag(red), 3);
    assert_eq!(tweenie.complete_tag(blue), 1);
    tweenie.late_update();
    assert!(reds.iter().all(|t| t.status() == TweenStatus::Stopped));
    assert_eq!(other.status(), TweenStatus::Completed);
    assert_eq!(tweenie.active_count(), 0);
}

#[test]
fn test_remove_and_update_tag() {
    let tweenie = Tweenie::new();
    let red = tweenie.new_tag();
    let a = tweenie.tween_tagged(|_: f32| {}, 0.0, 1.0, 10.0, red);
    let b = tweenie.tween_tagged(|_: f32| {}, 0.0, 1.0, 10.0, red);

    tweenie.update_tag(a.id(), None);
    assert_eq!(tweenie.tweeners_for_tag(red), vec![b.id()]);
    assert_eq!(a.tag(), None);

    tweenie.remove_tag(red);
    assert_eq!(tweenie.play_tag(red), 0);
    assert_eq!(b.tag(), None);

    // Untagged tweeners keep running
    tweenie.advance(0.1);
    assert_eq!(tweenie.active_count(), 2);
}

#[test]
fn test_tag_command_from_callback() {
    let tweenie = Tweenie::new();
    let group = tweenie.new_tag();
    let followers: Vec<_> = (0..2)
        .map(|_| tweenie.tween_tagged(|_: f32| {}, 0.0, 1.0, 1.0, group).stop())
        .collect();

    let handle = tweenie.handle();
    tweenie
        .tween(|_: f32| {}, 0.0, 1.0, 0.5)
        .on_complete(move || {
            handle.play_tag(group);
        });

    tweenie.advance(0.5);
    assert!(followers.iter().all(|t| t.status() == TweenStatus::Pending));
    tweenie.advance(0.5);
    assert!(followers.iter().all(|t| t.status() == TweenStatus::Playing));
}

// ============================================================================
// Target lifetime and failures
// ============================================================================

#[derive(Default)]
struct Sprite {
    x: f32,
}

#[test]
fn test_dropped_target_discards_tweener() {
    init_tracing();
    let tweenie = Tweenie::new();
    let sprite = Rc::new(RefCell::new(Sprite::default()));
    let tween = tweenie.try_to(
        bind(&sprite, |s: &mut Sprite, x: f32| s.x = x),
        0.0,
        100.0,
        1.0,
        lerp,
    );
    let (_other, other_values) = recorded(&tweenie, 0.0, 1.0, 1.0);

    tweenie.advance(0.25);
    assert!((sprite.borrow().x - 25.0).abs() < 1e-4);

    drop(sprite);
    tweenie.advance(0.25);
    assert_eq!(tween.status(), TweenStatus::Killed);
    assert_eq!(tweenie.status(tween.id()), None);
    assert_eq!(tweenie.active_count(), 1);
    assert_eq!(other_values.borrow().len(), 2);

    // Commands on a discarded tweener are ignored
    tween.play();
    tweenie.advance(0.25);
    assert_eq!(tween.status(), TweenStatus::Killed);
}

#[test]
fn test_handles_outlive_scheduler() {
    let tween = {
        let tweenie = Tweenie::new();
        let tween = tweenie.tween(|_: f32| {}, 0.0, 1.0, 1.0);
        tweenie.advance(0.5);
        tween
    };

    assert!(!tween.scheduler().is_alive());
    let tween = tween.pause().stop();
    assert_eq!(tween.status(), TweenStatus::Playing);
}

// ============================================================================
// Value types and configuration
// ============================================================================

#[test]
fn test_vector_and_color_tweens() {
    let tweenie = Tweenie::new();
    let position = Rc::new(Cell::new(Vec3::ZERO));
    let tint = Rc::new(Cell::new(Color::BLACK));
    let (p, c) = (position.clone(), tint.clone());

    tweenie.tween(move |v| p.set(v), Vec3::ZERO, Vec3::new(2.0, 4.0, 6.0), 2.0);
    tweenie.tween(move |v| c.set(v), Color::BLACK, Color::WHITE.with_alpha(0.0), 1.0);

    tweenie.advance(1.0);
    assert!(position.get().abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-5));
    assert!(tint.get().approx_eq(&Color::rgba(1.0, 1.0, 1.0, 0.0), 1e-5));
}

#[test]
fn test_eased_tween_hits_endpoints() {
    let tweenie = Tweenie::new();
    let (tween, values) = recorded(&tweenie, 0.0, 1.0, 1.0);
    tween.set_ease(Easing::CubicBezier(0.42, 0.0, 0.58, 1.0));

    tweenie.advance(0.25);
    let early = values.borrow()[0];
    assert!(early > 0.0 && early < 0.25);

    tweenie.advance(0.75);
    assert_eq!(values.borrow().last().copied(), Some(1.0));
}

#[test]
fn test_config_change_between_frames() {
    let tweenie = Tweenie::new();
    let (_tween, values) = recorded(&tweenie, 0.0, 10.0, 4.0);

    tweenie.advance(1.0);
    tweenie.set_config(TweenieConfig::new().time_scale(2.0));
    tweenie.advance(1.0);
    assert!((values.borrow()[1] - 7.5).abs() < 1e-5);
}
