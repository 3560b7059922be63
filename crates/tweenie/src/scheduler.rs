//! Tween scheduler
//!
//! Owns every active tweener and drives them once per frame in two phases:
//!
//! - [`Tweenie::update`] activates queued tweeners, ticks the active set and
//!   queues completions, stops and pauses triggered by step completion.
//! - [`Tweenie::late_update`] applies queued stop, pause and complete commands.
//!
//! Commands never touch the active set directly. They land in deferred
//! queues, so a callback fired mid-frame (for example a completion handler
//! that plays another tween) cannot disturb the set being iterated; it is
//! picked up by the next phase that drains its queue.

use crate::config::TweenieConfig;
use crate::error::SetterError;
use crate::setter::{infallible, BoxedSetter};
use crate::tags::{Tag, TagIndex};
use crate::tween::Tween;
use crate::tweener::{
    AnyTweener, Interpolator, StepAction, TickOutcome, TweenEvent, TweenStatus, Tweener, TweenerId,
};
use crate::values::Interpolate;
use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Deferred command sets, each drained by exactly one phase
#[derive(Default)]
struct CommandQueues {
    add: IndexSet<TweenerId>,
    pause: IndexSet<TweenerId>,
    stop: IndexSet<TweenerId>,
    complete: IndexSet<TweenerId>,
}

impl CommandQueues {
    fn forget(&mut self, id: TweenerId) {
        self.add.shift_remove(&id);
        self.pause.shift_remove(&id);
        self.stop.shift_remove(&id);
        self.complete.shift_remove(&id);
    }
}

struct SchedulerState {
    /// Every known tweener, weakly
    registry: SlotMap<TweenerId, Weak<dyn AnyTweener>>,
    /// Strong references for tweeners in flight (pending, playing, paused)
    retained: FxHashMap<TweenerId, Rc<dyn AnyTweener>>,
    active: IndexSet<TweenerId>,
    queues: CommandQueues,
    tags: TagIndex,
}

impl SchedulerState {
    fn resolve(&self, id: TweenerId) -> Option<Rc<dyn AnyTweener>> {
        self.registry.get(id).and_then(Weak::upgrade)
    }

    /// Resolve a tweener that still accepts commands
    fn resolve_live(&self, id: TweenerId) -> Option<Rc<dyn AnyTweener>> {
        self.resolve(id)
            .filter(|tweener| tweener.status() != TweenStatus::Killed)
    }
}

struct TweenieInner {
    state: RefCell<SchedulerState>,
    config: Cell<TweenieConfig>,
    next_tag: Cell<u64>,
}

/// The tween scheduler
///
/// Owned by the host application, which calls [`update`](Self::update) and
/// [`late_update`](Self::late_update) once per frame (or
/// [`advance`](Self::advance) for both). Callbacks that need to issue
/// commands should capture a [`TweenieHandle`] from [`handle`](Self::handle).
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use tweenie::Tweenie;
///
/// let tweenie = Tweenie::new();
/// let x = Rc::new(Cell::new(0.0_f32));
/// let sink = x.clone();
///
/// tweenie.tween(move |v| sink.set(v), 0.0, 10.0, 2.0);
///
/// tweenie.advance(1.0);
/// assert!((x.get() - 5.0).abs() < 1e-5);
///
/// tweenie.advance(1.0);
/// assert_eq!(x.get(), 10.0);
/// ```
pub struct Tweenie {
    inner: Rc<TweenieInner>,
}

impl Tweenie {
    pub fn new() -> Self {
        Self::with_config(TweenieConfig::default())
    }

    pub fn with_config(config: TweenieConfig) -> Self {
        Self {
            inner: Rc::new(TweenieInner {
                state: RefCell::new(SchedulerState {
                    registry: SlotMap::with_key(),
                    retained: FxHashMap::default(),
                    active: IndexSet::new(),
                    queues: CommandQueues::default(),
                    tags: TagIndex::default(),
                }),
                config: Cell::new(config),
                next_tag: Cell::new(0),
            }),
        }
    }

    pub fn config(&self) -> TweenieConfig {
        self.inner.config.get()
    }

    pub fn set_config(&self, config: TweenieConfig) {
        self.inner.config.set(config);
    }

    /// Get a weak handle for use inside callbacks
    pub fn handle(&self) -> TweenieHandle {
        TweenieHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Tween a value with a custom interpolator
    ///
    /// The tweener is queued and starts ticking on the next
    /// [`update`](Self::update); configure it through the returned handle
    /// before then.
    pub fn to<T, S, I>(&self, setter: S, from: T, to: T, duration: f32, interpolate: I) -> Tween<T>
    where
        T: Clone + 'static,
        S: FnMut(T) + 'static,
        I: Fn(&T, &T, f32) -> T + 'static,
    {
        self.create(infallible(setter), from, to, duration, Rc::new(interpolate), None)
    }

    /// Like [`to`](Self::to), grouped under `tag`
    pub fn to_tagged<T, S, I>(
        &self,
        setter: S,
        from: T,
        to: T,
        duration: f32,
        interpolate: I,
        tag: Tag,
    ) -> Tween<T>
    where
        T: Clone + 'static,
        S: FnMut(T) + 'static,
        I: Fn(&T, &T, f32) -> T + 'static,
    {
        self.create(infallible(setter), from, to, duration, Rc::new(interpolate), Some(tag))
    }

    /// Like [`to`](Self::to) with a setter that can report a vanished or
    /// faulty target
    pub fn try_to<T, S, I>(
        &self,
        setter: S,
        from: T,
        to: T,
        duration: f32,
        interpolate: I,
    ) -> Tween<T>
    where
        T: Clone + 'static,
        S: FnMut(T) -> crate::error::Result<()> + 'static,
        I: Fn(&T, &T, f32) -> T + 'static,
    {
        self.create(Box::new(setter), from, to, duration, Rc::new(interpolate), None)
    }

    /// Like [`try_to`](Self::try_to), grouped under `tag`
    pub fn try_to_tagged<T, S, I>(
        &self,
        setter: S,
        from: T,
        to: T,
        duration: f32,
        interpolate: I,
        tag: Tag,
    ) -> Tween<T>
    where
        T: Clone + 'static,
        S: FnMut(T) -> crate::error::Result<()> + 'static,
        I: Fn(&T, &T, f32) -> T + 'static,
    {
        self.create(Box::new(setter), from, to, duration, Rc::new(interpolate), Some(tag))
    }

    /// Tween any [`Interpolate`] value with its own `lerp`
    pub fn tween<T, S>(&self, setter: S, from: T, to: T, duration: f32) -> Tween<T>
    where
        T: Interpolate + 'static,
        S: FnMut(T) + 'static,
    {
        self.to(setter, from, to, duration, T::lerp)
    }

    /// Like [`tween`](Self::tween), grouped under `tag`
    pub fn tween_tagged<T, S>(&self, setter: S, from: T, to: T, duration: f32, tag: Tag) -> Tween<T>
    where
        T: Interpolate + 'static,
        S: FnMut(T) + 'static,
    {
        self.to_tagged(setter, from, to, duration, T::lerp, tag)
    }

    fn create<T: Clone + 'static>(
        &self,
        setter: BoxedSetter<T>,
        from: T,
        to: T,
        duration: f32,
        interpolate: Interpolator<T>,
        tag: Option<Tag>,
    ) -> Tween<T> {
        let tweener = Rc::new(Tweener::new(setter, from, to, duration, interpolate));
        let erased: Rc<dyn AnyTweener> = tweener.clone();

        let mut state = self.inner.state.borrow_mut();
        let id = state.registry.insert(Rc::downgrade(&erased));
        tweener.set_id(id);
        state.retained.insert(id, erased);
        state.queues.add.insert(id);
        if tag.is_some() {
            state.tags.update(id, tag);
        }
        drop(state);

        tracing::trace!(?id, ?tag, duration, "tweener created");
        Tween::new(tweener, self.handle())
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Queue a tweener for (re)activation on the next update
    pub fn play(&self, id: TweenerId) -> bool {
        self.inner.play(id)
    }

    /// Pause at the current value at the end of this frame
    pub fn pause(&self, id: TweenerId) -> bool {
        self.inner.pause(id)
    }

    /// Jump back to the start value at the end of this frame
    pub fn stop(&self, id: TweenerId) -> bool {
        self.inner.stop(id)
    }

    /// Jump to the end value at the end of this frame
    pub fn complete(&self, id: TweenerId) -> bool {
        self.inner.complete(id)
    }

    pub fn stop_after_step_complete(&self, id: TweenerId) -> bool {
        self.inner.stop_after_step_complete(id)
    }

    pub fn pause_after_step_complete(&self, id: TweenerId) -> bool {
        self.inner.pause_after_step_complete(id)
    }

    pub fn status(&self, id: TweenerId) -> Option<TweenStatus> {
        self.inner.status(id)
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Allocate a tag that no other caller of this scheduler has been given
    pub fn new_tag(&self) -> Tag {
        let next = self.inner.next_tag.get();
        self.inner.next_tag.set(next + 1);
        Tag::new(next | Tag::ALLOCATED)
    }

    pub fn play_tag(&self, tag: Tag) -> usize {
        self.inner.play_tag(tag)
    }

    pub fn pause_tag(&self, tag: Tag) -> usize {
        self.inner.pause_tag(tag)
    }

    pub fn stop_tag(&self, tag: Tag) -> usize {
        self.inner.stop_tag(tag)
    }

    pub fn complete_tag(&self, tag: Tag) -> usize {
        self.inner.complete_tag(tag)
    }

    /// Forget the group; its tweeners keep running untagged
    pub fn remove_tag(&self, tag: Tag) {
        self.inner.remove_tag(tag)
    }

    /// Move a tweener to another group, or out of any group with `None`
    pub fn update_tag(&self, id: TweenerId, tag: Option<Tag>) {
        self.inner.update_tag(id, tag)
    }

    pub fn tag_of(&self, id: TweenerId) -> Option<Tag> {
        self.inner.tag_of(id)
    }

    pub fn tweeners_for_tag(&self, tag: Tag) -> Vec<TweenerId> {
        self.inner.tweeners_for_tag(tag)
    }

    // =========================================================================
    // Frame phases
    // =========================================================================

    /// Update phase: activate queued tweeners and tick the active set
    pub fn update(&self, delta_seconds: f32) {
        let delta = self.inner.config.get().scale_delta(delta_seconds);
        self.inner.activate_pending();
        self.inner.tick_active(delta);
    }

    /// Late phase: apply queued stop, pause and complete commands
    pub fn late_update(&self) {
        self.inner.apply_commands();
        self.inner.prune();
    }

    /// Run both phases of one frame
    pub fn advance(&self, delta_seconds: f32) {
        self.update(delta_seconds);
        self.late_update();
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Number of tweeners ticking this frame
    pub fn active_count(&self) -> usize {
        self.inner.state.borrow().active.len()
    }

    /// Number of tweeners waiting for activation
    pub fn pending_count(&self) -> usize {
        self.inner.state.borrow().queues.add.len()
    }

    /// Number of tweeners still alive and known to the scheduler
    pub fn tracked_count(&self) -> usize {
        self.inner.state.borrow().registry.len()
    }

    /// Check if anything will move on the next update
    pub fn has_active_tweens(&self) -> bool {
        let state = self.inner.state.borrow();
        !state.active.is_empty() || !state.queues.add.is_empty()
    }
}

impl Default for Tweenie {
    fn default() -> Self {
        Self::new()
    }
}

impl TweenieInner {
    fn play(&self, id: TweenerId) -> bool {
        let resolved = self.state.borrow().resolve_live(id);
        let Some(tweener) = resolved else {
            return false;
        };
        tweener.prepare_play();

        let mut state = self.state.borrow_mut();
        state.retained.insert(id, tweener);
        state.queues.add.insert(id);
        true
    }

    fn pause(&self, id: TweenerId) -> bool {
        self.enqueue(id, |queues| &mut queues.pause)
    }

    fn stop(&self, id: TweenerId) -> bool {
        self.enqueue(id, |queues| &mut queues.stop)
    }

    fn complete(&self, id: TweenerId) -> bool {
        self.enqueue(id, |queues| &mut queues.complete)
    }

    fn enqueue(
        &self,
        id: TweenerId,
        queue: impl FnOnce(&mut CommandQueues) -> &mut IndexSet<TweenerId>,
    ) -> bool {
        let mut state = self.state.borrow_mut();
        if state.resolve_live(id).is_none() {
            return false;
        }
        queue(&mut state.queues).insert(id);
        true
    }

    fn stop_after_step_complete(&self, id: TweenerId) -> bool {
        let resolved = self.state.borrow().resolve_live(id);
        match resolved {
            Some(tweener) => {
                tweener.set_stop_after_step();
                true
            }
            None => false,
        }
    }

    fn pause_after_step_complete(&self, id: TweenerId) -> bool {
        let resolved = self.state.borrow().resolve_live(id);
        match resolved {
            Some(tweener) => {
                tweener.set_pause_after_step();
                true
            }
            None => false,
        }
    }

    fn status(&self, id: TweenerId) -> Option<TweenStatus> {
        self.state.borrow().resolve(id).map(|t| t.status())
    }

    fn members(&self, tag: Tag) -> Vec<TweenerId> {
        self.state.borrow().tags.members(tag)
    }

    fn play_tag(&self, tag: Tag) -> usize {
        let count = self.members(tag).into_iter().filter(|id| self.play(*id)).count();
        tracing::debug!(?tag, count, "play tag");
        count
    }

    fn pause_tag(&self, tag: Tag) -> usize {
        let count = self.members(tag).into_iter().filter(|id| self.pause(*id)).count();
        tracing::debug!(?tag, count, "pause tag");
        count
    }

    fn stop_tag(&self, tag: Tag) -> usize {
        let count = self.members(tag).into_iter().filter(|id| self.stop(*id)).count();
        tracing::debug!(?tag, count, "stop tag");
        count
    }

    fn complete_tag(&self, tag: Tag) -> usize {
        let count = self.members(tag).into_iter().filter(|id| self.complete(*id)).count();
        tracing::debug!(?tag, count, "complete tag");
        count
    }

    fn remove_tag(&self, tag: Tag) {
        let members = self.state.borrow_mut().tags.remove_tag(tag);
        tracing::debug!(?tag, members = members.len(), "tag removed");
    }

    fn update_tag(&self, id: TweenerId, tag: Option<Tag>) {
        let mut state = self.state.borrow_mut();
        if state.resolve(id).is_some() {
            state.tags.update(id, tag);
        }
    }

    fn tag_of(&self, id: TweenerId) -> Option<Tag> {
        self.state.borrow().tags.tag_of(id)
    }

    fn tweeners_for_tag(&self, tag: Tag) -> Vec<TweenerId> {
        let state = self.state.borrow();
        state
            .tags
            .members(tag)
            .into_iter()
            .filter(|id| state.resolve(*id).is_some())
            .collect()
    }

    /// Update steps 1-3: move queued tweeners into the active set
    fn activate_pending(&self) {
        let queued = std::mem::take(&mut self.state.borrow_mut().queues.add);

        for id in queued {
            let tweener = {
                let state = self.state.borrow();
                if state.active.contains(&id) {
                    continue;
                }
                state.resolve_live(id)
            };
            let Some(tweener) = tweener else {
                continue;
            };

            tweener.activate();
            tweener.fire(TweenEvent::Start);
            self.state.borrow_mut().active.insert(id);
            tracing::debug!(?id, "tweener activated");
        }

        // A stop queued before the first tick wins: started, never ticked
        let mut state = self.state.borrow_mut();
        let SchedulerState { active, queues, .. } = &mut *state;
        active.retain(|id| !queues.stop.contains(id));
    }

    /// Update step 4: tick every active tweener
    fn tick_active(&self, delta: f32) {
        let ticking: SmallVec<[TweenerId; 16]> =
            self.state.borrow().active.iter().copied().collect();

        for id in ticking {
            let resolved = self.state.borrow().resolve(id);
            let Some(tweener) = resolved else {
                self.state.borrow_mut().active.shift_remove(&id);
                continue;
            };

            match tweener.tick(delta) {
                TickOutcome::Running => {}
                TickOutcome::Completed => {
                    self.state.borrow_mut().queues.complete.insert(id);
                }
                TickOutcome::StepCompleted => {
                    tweener.fire(TweenEvent::StepComplete);
                    match tweener.after_step() {
                        StepAction::Stop => {
                            self.state.borrow_mut().queues.stop.insert(id);
                        }
                        StepAction::Pause => {
                            self.state.borrow_mut().queues.pause.insert(id);
                        }
                        StepAction::Continue => tweener.continue_loop(),
                    }
                }
                TickOutcome::Failed(err) => self.kill(id, tweener.as_ref(), &err),
            }
        }

        tracing::trace!(
            active = self.state.borrow().active.len(),
            delta,
            "tween update"
        );
    }

    /// Late phase: stop, then pause, then complete
    fn apply_commands(&self) {
        let (stop, pause, complete) = {
            let mut state = self.state.borrow_mut();
            let complete = std::mem::take(&mut state.queues.complete);
            let mut stop = std::mem::take(&mut state.queues.stop);
            let mut pause = std::mem::take(&mut state.queues.pause);
            // One command per tweener per frame: complete > stop > pause
            stop.retain(|id| !complete.contains(id));
            pause.retain(|id| !complete.contains(id) && !stop.contains(id));
            (stop, pause, complete)
        };

        for id in stop {
            let Some(tweener) = self.release(id, true) else {
                continue;
            };
            match tweener.finish_stop() {
                Ok(()) => {
                    tracing::debug!(?id, "tweener stopped");
                    tweener.fire(TweenEvent::Stop);
                }
                Err(err) => self.kill(id, tweener.as_ref(), &err),
            }
        }

        for id in pause {
            let Some(tweener) = self.release(id, false) else {
                continue;
            };
            tweener.finish_pause();
            tracing::debug!(?id, "tweener paused");
            tweener.fire(TweenEvent::Pause);
        }

        for id in complete {
            let Some(tweener) = self.release(id, true) else {
                continue;
            };
            match tweener.finish_complete() {
                Ok(()) => {
                    tracing::debug!(?id, "tweener completed");
                    tweener.fire(TweenEvent::Complete);
                }
                Err(err) => self.kill(id, tweener.as_ref(), &err),
            }
        }
    }

    /// Take a tweener out of the active set, optionally dropping our strong
    /// reference to it
    fn release(&self, id: TweenerId, drop_retained: bool) -> Option<Rc<dyn AnyTweener>> {
        let mut state = self.state.borrow_mut();
        let tweener = state.resolve_live(id)?;
        state.active.shift_remove(&id);
        if drop_retained {
            state.retained.remove(&id);
        }
        Some(tweener)
    }

    /// Tear down a tweener whose setter failed
    fn kill(&self, id: TweenerId, tweener: &dyn AnyTweener, err: &SetterError) {
        match err {
            SetterError::TargetUnavailable => {
                tracing::warn!(?id, "tween target unavailable, discarding tweener");
            }
            SetterError::Fault(msg) => {
                tracing::error!(?id, %msg, "tween setter failed, discarding tweener");
            }
        }

        tweener.kill();
        let mut state = self.state.borrow_mut();
        state.active.shift_remove(&id);
        state.queues.forget(id);
        state.retained.remove(&id);
        state.registry.remove(id);
        state.tags.update(id, None);
    }

    /// Forget tweeners nobody holds anymore
    fn prune(&self) {
        let mut state = self.state.borrow_mut();
        let SchedulerState { registry, tags, .. } = &mut *state;
        registry.retain(|_, tweener| tweener.strong_count() > 0);
        tags.retain(|id| registry.contains_key(id));
    }
}

/// A weak handle to the scheduler
///
/// Safe to capture inside tween callbacks. All operations quietly do
/// nothing once the [`Tweenie`] it came from has been dropped.
#[derive(Clone)]
pub struct TweenieHandle {
    inner: Weak<TweenieInner>,
}

impl TweenieHandle {
    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn play(&self, id: TweenerId) -> bool {
        self.inner.upgrade().is_some_and(|inner| inner.play(id))
    }

    pub fn pause(&self, id: TweenerId) -> bool {
        self.inner.upgrade().is_some_and(|inner| inner.pause(id))
    }

    pub fn stop(&self, id: TweenerId) -> bool {
        self.inner.upgrade().is_some_and(|inner| inner.stop(id))
    }

    pub fn complete(&self, id: TweenerId) -> bool {
        self.inner.upgrade().is_some_and(|inner| inner.complete(id))
    }

    pub fn stop_after_step_complete(&self, id: TweenerId) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| inner.stop_after_step_complete(id))
    }

    pub fn pause_after_step_complete(&self, id: TweenerId) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| inner.pause_after_step_complete(id))
    }

    pub fn play_tag(&self, tag: Tag) -> usize {
        self.inner.upgrade().map_or(0, |inner| inner.play_tag(tag))
    }

    pub fn pause_tag(&self, tag: Tag) -> usize {
        self.inner.upgrade().map_or(0, |inner| inner.pause_tag(tag))
    }

    pub fn stop_tag(&self, tag: Tag) -> usize {
        self.inner.upgrade().map_or(0, |inner| inner.stop_tag(tag))
    }

    pub fn complete_tag(&self, tag: Tag) -> usize {
        self.inner.upgrade().map_or(0, |inner| inner.complete_tag(tag))
    }

    pub fn remove_tag(&self, tag: Tag) {
        if let Some(inner) = self.inner.upgrade() {
            inner.remove_tag(tag);
        }
    }

    pub fn update_tag(&self, id: TweenerId, tag: Option<Tag>) {
        if let Some(inner) = self.inner.upgrade() {
            inner.update_tag(id, tag);
        }
    }

    pub fn tag_of(&self, id: TweenerId) -> Option<Tag> {
        self.inner.upgrade().and_then(|inner| inner.tag_of(id))
    }

    pub fn tweeners_for_tag(&self, tag: Tag) -> Vec<TweenerId> {
        self.inner
            .upgrade()
            .map(|inner| inner.tweeners_for_tag(tag))
            .unwrap_or_default()
    }

    pub fn status(&self, id: TweenerId) -> Option<TweenStatus> {
        self.inner.upgrade().and_then(|inner| inner.status(id))
    }
}
