//! Tweener state machine
//!
//! A tweener owns the math and the callbacks of a single animation: its timer,
//! loop policy, direction and one-shot flags. It never decides *when* it moves
//! between states. The scheduler drives every transition and calls back into
//! the tweener through [`AnyTweener`].

use crate::easing::EasingCurve;
use crate::error::{ParseError, Result};
use crate::setter::BoxedSetter;
use slotmap::new_key_type;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::str::FromStr;

new_key_type! {
    /// Handle to a tweener registered with a [`Tweenie`](crate::Tweenie)
    pub struct TweenerId;
}

/// Interpolation function `(from, to, progress) -> value`
pub type Interpolator<T> = Rc<dyn Fn(&T, &T, f32) -> T>;

/// Event callback stored in a tweener's slot
pub type Callback = Box<dyn FnMut()>;

/// What happens when a leg finishes and loops remain
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoopMode {
    /// Jump back to `from` and play forward again
    #[default]
    Default,
    /// Alternate direction every leg; one loop is a full round trip
    PingPong,
}

impl LoopMode {
    /// Resolve a loop mode by name, falling back to [`LoopMode::Default`]
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|err: ParseError| {
            tracing::warn!("{err}, falling back to default loop mode");
            LoopMode::Default
        })
    }
}

impl FromStr for LoopMode {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "default" | "restart" => Ok(LoopMode::Default),
            "pingpong" | "yoyo" => Ok(LoopMode::PingPong),
            _ => Err(ParseError::UnknownLoopMode(s.to_string())),
        }
    }
}

/// Lifecycle of a tweener as seen by its scheduler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenStatus {
    /// Queued for activation on the next update
    Pending,
    Playing,
    Paused,
    Stopped,
    Completed,
    /// Torn down after its setter failed; ignores further commands
    Killed,
}

/// Events a tweener can notify about
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenEvent {
    Start,
    /// Fired on every tick
    Play,
    Pause,
    Stop,
    Complete,
    StepComplete,
}

/// Result of a single tick
#[derive(Debug, PartialEq)]
pub(crate) enum TickOutcome {
    Running,
    StepCompleted,
    Completed,
    Failed(crate::error::SetterError),
}

/// What the scheduler should do after a step completed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StepAction {
    Stop,
    Pause,
    Continue,
}

// ============================================================================
// Callback slots
// ============================================================================

/// A single-handler slot, last writer wins
///
/// The handler is taken out while it runs, so it may freely call back into
/// its own tweener, including replacing itself.
#[derive(Default)]
struct CallbackSlot {
    callback: RefCell<Option<Callback>>,
    generation: Cell<u32>,
}

impl CallbackSlot {
    fn set(&self, callback: Callback) {
        *self.callback.borrow_mut() = Some(callback);
        self.generation.set(self.generation.get().wrapping_add(1));
    }

    fn fire(&self) {
        let taken = self.callback.borrow_mut().take();
        if let Some(mut callback) = taken {
            let generation = self.generation.get();
            callback();
            // Keep a replacement installed while we were running
            if self.generation.get() == generation {
                *self.callback.borrow_mut() = Some(callback);
            }
        }
    }
}

#[derive(Default)]
struct Callbacks {
    start: CallbackSlot,
    play: CallbackSlot,
    pause: CallbackSlot,
    stop: CallbackSlot,
    complete: CallbackSlot,
    step_complete: CallbackSlot,
}

impl Callbacks {
    fn slot(&self, event: TweenEvent) -> &CallbackSlot {
        match event {
            TweenEvent::Start => &self.start,
            TweenEvent::Play => &self.play,
            TweenEvent::Pause => &self.pause,
            TweenEvent::Stop => &self.stop,
            TweenEvent::Complete => &self.complete,
            TweenEvent::StepComplete => &self.step_complete,
        }
    }
}

// ============================================================================
// Tweener
// ============================================================================

struct TweenState<T> {
    from: T,
    to: T,
    duration: f32,
    interpolate: Interpolator<T>,
    easing: EasingCurve,
    loop_mode: LoopMode,
    /// -1 infinite, 0 no further loops, n remaining
    loop_count: i32,
    /// Value restored into `loop_count` on reset
    configured_loops: i32,
    timer: f32,
    progress: f32,
    is_reverse: bool,
    is_completed: bool,
    is_step_completed: bool,
    stop_after_step: bool,
    pause_after_step: bool,
    /// Whether the target may hold something other than `from`
    displaced: bool,
    status: TweenStatus,
}

impl<T> TweenState<T> {
    fn evaluate(&self) -> T {
        if self.is_reverse {
            (self.interpolate)(&self.to, &self.from, self.progress)
        } else {
            (self.interpolate)(&self.from, &self.to, self.progress)
        }
    }

    fn reset(&mut self, status: TweenStatus) {
        self.timer = 0.0;
        self.progress = 0.0;
        self.is_reverse = false;
        self.is_completed = false;
        self.is_step_completed = false;
        self.stop_after_step = false;
        self.pause_after_step = false;
        self.displaced = false;
        self.loop_count = self.configured_loops;
        self.status = status;
    }
}

/// One animation driving a single value of type `T`
pub(crate) struct Tweener<T> {
    id: Cell<TweenerId>,
    state: RefCell<TweenState<T>>,
    setter: RefCell<Option<BoxedSetter<T>>>,
    callbacks: Callbacks,
}

impl<T: Clone + 'static> Tweener<T> {
    pub fn new(
        setter: BoxedSetter<T>,
        from: T,
        to: T,
        duration: f32,
        interpolate: Interpolator<T>,
    ) -> Self {
        Self {
            id: Cell::new(TweenerId::default()),
            state: RefCell::new(TweenState {
                from,
                to,
                duration: duration.max(0.0),
                interpolate,
                easing: EasingCurve::default(),
                loop_mode: LoopMode::Default,
                loop_count: 0,
                configured_loops: 0,
                timer: 0.0,
                progress: 0.0,
                is_reverse: false,
                is_completed: false,
                is_step_completed: false,
                stop_after_step: false,
                pause_after_step: false,
                displaced: false,
                status: TweenStatus::Pending,
            }),
            setter: RefCell::new(Some(setter)),
            callbacks: Callbacks::default(),
        }
    }

    pub fn set_id(&self, id: TweenerId) {
        self.id.set(id);
    }

    pub fn set_easing(&self, easing: EasingCurve) {
        self.state.borrow_mut().easing = easing;
    }

    pub fn set_loop(&self, mode: LoopMode, count: i32) {
        let mut state = self.state.borrow_mut();
        state.loop_mode = mode;
        Self::store_loop_count(&mut state, count);
    }

    pub fn set_loop_count(&self, count: i32) {
        Self::store_loop_count(&mut self.state.borrow_mut(), count);
    }

    fn store_loop_count(state: &mut TweenState<T>, count: i32) {
        let count = count.max(-1);
        state.loop_count = count;
        state.configured_loops = count;
    }

    pub fn set_callback(&self, event: TweenEvent, callback: Callback) {
        self.callbacks.slot(event).set(callback);
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.state.borrow().loop_mode
    }

    pub fn loop_count(&self) -> i32 {
        self.state.borrow().loop_count
    }

    pub fn is_reverse(&self) -> bool {
        self.state.borrow().is_reverse
    }

    pub fn is_completed(&self) -> bool {
        self.state.borrow().is_completed
    }

    pub fn is_step_completed(&self) -> bool {
        self.state.borrow().is_step_completed
    }

    pub fn progress(&self) -> f32 {
        self.state.borrow().progress
    }

    pub fn duration(&self) -> f32 {
        self.state.borrow().duration
    }

    /// Push a value through the setter.
    ///
    /// A re-entrant write from inside the setter itself is dropped.
    fn apply(&self, value: T) -> Result<()> {
        let taken = self.setter.borrow_mut().take();
        match taken {
            Some(mut setter) => {
                let result = setter(value);
                *self.setter.borrow_mut() = Some(setter);
                result
            }
            None => Ok(()),
        }
    }
}

/// Type-erased view the scheduler works with
pub(crate) trait AnyTweener {
    fn id(&self) -> TweenerId;
    fn status(&self) -> TweenStatus;
    /// Advance by `delta` seconds and emit the new value
    fn tick(&self, delta: f32) -> TickOutcome;
    fn fire(&self, event: TweenEvent);
    /// Flags consulted after the step-complete callback ran
    fn after_step(&self) -> StepAction;
    /// Start the next leg after a step completed
    fn continue_loop(&self);
    /// Clear one-shot flags and wait for activation
    fn prepare_play(&self);
    fn set_stop_after_step(&self);
    fn set_pause_after_step(&self);
    fn activate(&self);
    fn finish_pause(&self);
    /// Snap back to `from` and reset
    fn finish_stop(&self) -> Result<()>;
    /// Snap to the end of the current direction and reset
    fn finish_complete(&self) -> Result<()>;
    fn kill(&self);
}

impl<T: Clone + 'static> AnyTweener for Tweener<T> {
    fn id(&self) -> TweenerId {
        self.id.get()
    }

    fn status(&self) -> TweenStatus {
        self.state.borrow().status
    }

    fn tick(&self, delta: f32) -> TickOutcome {
        self.callbacks.play.fire();

        let value = {
            let mut state = self.state.borrow_mut();
            state.timer += delta;
            state.progress = state.easing.progress(state.timer, state.duration);
            state.evaluate()
        };

        if let Err(err) = self.apply(value) {
            return TickOutcome::Failed(err);
        }

        let mut state = self.state.borrow_mut();
        state.displaced = true;
        if state.progress < 1.0 {
            return TickOutcome::Running;
        }
        if state.loop_count == 0 {
            state.is_completed = true;
            TickOutcome::Completed
        } else {
            state.is_step_completed = true;
            TickOutcome::StepCompleted
        }
    }

    fn fire(&self, event: TweenEvent) {
        self.callbacks.slot(event).fire();
    }

    fn after_step(&self) -> StepAction {
        let state = self.state.borrow();
        if state.stop_after_step {
            StepAction::Stop
        } else if state.pause_after_step {
            StepAction::Pause
        } else {
            StepAction::Continue
        }
    }

    fn continue_loop(&self) {
        let mut state = self.state.borrow_mut();
        if !state.is_step_completed {
            return;
        }
        state.is_step_completed = false;
        state.timer = 0.0;
        state.progress = 0.0;

        let finished_loop = match state.loop_mode {
            LoopMode::Default => true,
            LoopMode::PingPong => {
                state.is_reverse = !state.is_reverse;
                // Only the return leg closes a round trip
                !state.is_reverse
            }
        };
        if finished_loop && state.loop_count > 0 {
            state.loop_count -= 1;
        }
        if state.loop_count < 0 {
            state.loop_count = -1;
        }
    }

    fn prepare_play(&self) {
        let mut state = self.state.borrow_mut();
        state.stop_after_step = false;
        state.pause_after_step = false;
        if state.status != TweenStatus::Playing {
            state.status = TweenStatus::Pending;
        }
    }

    fn set_stop_after_step(&self) {
        self.state.borrow_mut().stop_after_step = true;
    }

    fn set_pause_after_step(&self) {
        self.state.borrow_mut().pause_after_step = true;
    }

    fn activate(&self) {
        self.state.borrow_mut().status = TweenStatus::Playing;
        // Paused right after a step: resume on the next leg
        self.continue_loop();
    }

    fn finish_pause(&self) {
        self.state.borrow_mut().status = TweenStatus::Paused;
    }

    fn finish_stop(&self) -> Result<()> {
        let restore = {
            let state = self.state.borrow();
            state.displaced.then(|| state.from.clone())
        };
        let result = match restore {
            Some(from) => self.apply(from),
            None => Ok(()),
        };
        self.state.borrow_mut().reset(TweenStatus::Stopped);
        result
    }

    fn finish_complete(&self) -> Result<()> {
        let end = {
            let state = self.state.borrow();
            if state.loop_mode == LoopMode::PingPong && state.is_reverse {
                state.from.clone()
            } else {
                state.to.clone()
            }
        };
        let result = self.apply(end);
        let mut state = self.state.borrow_mut();
        state.reset(TweenStatus::Completed);
        // The target now holds the end value
        state.displaced = true;
        result
    }

    fn kill(&self) {
        self.state.borrow_mut().reset(TweenStatus::Killed);
    }
}
