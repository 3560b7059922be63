//! Fluent tween handle
//!
//! [`Tween`] is what the creation calls on [`Tweenie`](crate::Tweenie) return.
//! Every configuration and control method returns a clone of the handle, so
//! calls chain naturally and the handle can be stored for later control:
//!
//! ```
//! use tweenie::{Easing, LoopMode, Tweenie};
//!
//! let tweenie = Tweenie::new();
//! let spin = tweenie
//!     .tween(|_angle: f32| {}, 0.0, 360.0, 1.0)
//!     .set_ease(Easing::EaseInOut)
//!     .set_loop(LoopMode::PingPong);
//!
//! tweenie.advance(0.5);
//! spin.pause();
//! ```
//!
//! Control methods (`play`, `pause`, `stop`, `complete`) only queue a command;
//! the scheduler applies it at its next frame phase.

use crate::easing::{Easing, EasingCurve};
use crate::scheduler::TweenieHandle;
use crate::tags::Tag;
use crate::tweener::{AnyTweener, LoopMode, TweenEvent, TweenStatus, Tweener, TweenerId};
use std::rc::Rc;

/// Handle to a single tweener
pub struct Tween<T> {
    tweener: Rc<Tweener<T>>,
    scheduler: TweenieHandle,
}

impl<T> Clone for Tween<T> {
    fn clone(&self) -> Self {
        Self {
            tweener: Rc::clone(&self.tweener),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T: Clone + 'static> Tween<T> {
    pub(crate) fn new(tweener: Rc<Tweener<T>>, scheduler: TweenieHandle) -> Self {
        Self { tweener, scheduler }
    }

    pub fn id(&self) -> TweenerId {
        self.tweener.id()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Use a built-in easing, timed against the current duration
    pub fn set_ease(&self, easing: Easing) -> Self {
        self.tweener.set_easing(EasingCurve::Builtin(easing));
        self.clone()
    }

    /// Use a custom curve mapping elapsed seconds in the current leg to progress
    ///
    /// The result is clamped to `[0, 1]`; a leg ends when it reaches 1.
    pub fn set_ease_curve(&self, curve: impl Fn(f32) -> f32 + 'static) -> Self {
        self.tweener.set_easing(EasingCurve::Custom(Rc::new(curve)));
        self.clone()
    }

    /// Loop forever in the given mode
    pub fn set_loop(&self, mode: LoopMode) -> Self {
        self.set_loops(mode, -1)
    }

    /// Loop `count` more times (-1 for infinite, 0 for no loop)
    ///
    /// In [`LoopMode::PingPong`] one loop is a full round trip.
    pub fn set_loops(&self, mode: LoopMode, count: i32) -> Self {
        self.tweener.set_loop(mode, count);
        self.clone()
    }

    pub fn set_loop_count(&self, count: i32) -> Self {
        self.tweener.set_loop_count(count);
        self.clone()
    }

    /// Move this tween to another group, or out of any group with `None`
    pub fn set_tag(&self, tag: Option<Tag>) -> Self {
        self.scheduler.update_tag(self.id(), tag);
        self.clone()
    }

    // =========================================================================
    // Control
    // =========================================================================

    pub fn play(&self) -> Self {
        self.scheduler.play(self.id());
        self.clone()
    }

    pub fn pause(&self) -> Self {
        self.scheduler.pause(self.id());
        self.clone()
    }

    pub fn stop(&self) -> Self {
        self.scheduler.stop(self.id());
        self.clone()
    }

    pub fn complete(&self) -> Self {
        self.scheduler.complete(self.id());
        self.clone()
    }

    /// Stop once the current leg finishes, instead of looping
    pub fn stop_after_step_complete(&self) -> Self {
        self.scheduler.stop_after_step_complete(self.id());
        self.clone()
    }

    /// Pause once the current leg finishes; `play` resumes with the next leg
    pub fn pause_after_step_complete(&self) -> Self {
        self.scheduler.pause_after_step_complete(self.id());
        self.clone()
    }

    // =========================================================================
    // Callbacks
    // =========================================================================

    /// Called each time the tween is activated
    pub fn on_start(&self, callback: impl FnMut() + 'static) -> Self {
        self.on(TweenEvent::Start, callback)
    }

    /// Called on every tick, before the new value is applied
    pub fn on_play(&self, callback: impl FnMut() + 'static) -> Self {
        self.on(TweenEvent::Play, callback)
    }

    pub fn on_pause(&self, callback: impl FnMut() + 'static) -> Self {
        self.on(TweenEvent::Pause, callback)
    }

    pub fn on_stop(&self, callback: impl FnMut() + 'static) -> Self {
        self.on(TweenEvent::Stop, callback)
    }

    pub fn on_complete(&self, callback: impl FnMut() + 'static) -> Self {
        self.on(TweenEvent::Complete, callback)
    }

    /// Called whenever a leg finishes and looping continues
    pub fn on_step_complete(&self, callback: impl FnMut() + 'static) -> Self {
        self.on(TweenEvent::StepComplete, callback)
    }

    /// Replace the callback for `event`; each event holds one callback
    pub fn on(&self, event: TweenEvent, callback: impl FnMut() + 'static) -> Self {
        self.tweener.set_callback(event, Box::new(callback));
        self.clone()
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn status(&self) -> TweenStatus {
        self.tweener.status()
    }

    pub fn is_playing(&self) -> bool {
        self.status() == TweenStatus::Playing
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.tweener.loop_mode()
    }

    /// Remaining loops (-1 for infinite)
    pub fn loop_count(&self) -> i32 {
        self.tweener.loop_count()
    }

    /// Whether the tween is on the return leg of a ping-pong loop
    pub fn is_reverse(&self) -> bool {
        self.tweener.is_reverse()
    }

    pub fn is_completed(&self) -> bool {
        self.tweener.is_completed()
    }

    pub fn is_step_completed(&self) -> bool {
        self.tweener.is_step_completed()
    }

    /// Eased progress of the current leg (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        self.tweener.progress()
    }

    pub fn duration(&self) -> f32 {
        self.tweener.duration()
    }

    pub fn tag(&self) -> Option<Tag> {
        self.scheduler.tag_of(self.id())
    }

    /// The scheduler this tween belongs to
    pub fn scheduler(&self) -> &TweenieHandle {
        &self.scheduler
    }
}
