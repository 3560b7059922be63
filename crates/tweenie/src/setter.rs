//! Setters: where tweened values go
//!
//! A setter receives every value a tweener computes. Setters created from a
//! plain `FnMut(T)` can never fail. Fallible setters return a
//! [`SetterError`] and make the scheduler tear the tweener down instead of
//! faulting the frame.

use crate::error::{Result, SetterError};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Boxed, fallible setter as stored by a tweener
pub type BoxedSetter<T> = Box<dyn FnMut(T) -> Result<()>>;

pub(crate) fn infallible<T, F>(mut setter: F) -> BoxedSetter<T>
where
    F: FnMut(T) + 'static,
{
    Box::new(move |value| {
        setter(value);
        Ok(())
    })
}

/// Bind a setter to a shared target without keeping it alive
///
/// The returned setter holds only a weak reference. Once the target is
/// dropped it reports [`SetterError::TargetUnavailable`], and the scheduler
/// quietly discards the tween.
///
/// ```ignore
/// let sprite = Rc::new(RefCell::new(Sprite::default()));
/// tweenie.try_to(
///     setter::bind(&sprite, |s, x| s.x = x),
///     0.0, 100.0, 1.0, |a, b, t| a + (b - a) * t,
/// );
/// ```
pub fn bind<O, T, F>(target: &Rc<RefCell<O>>, mut apply: F) -> impl FnMut(T) -> Result<()>
where
    O: 'static,
    F: FnMut(&mut O, T) + 'static,
{
    let target: Weak<RefCell<O>> = Rc::downgrade(target);
    move |value| {
        let target = target.upgrade().ok_or(SetterError::TargetUnavailable)?;
        let mut target = target
            .try_borrow_mut()
            .map_err(|_| SetterError::fault("tween target is already borrowed"))?;
        apply(&mut target, value);
        Ok(())
    }
}
