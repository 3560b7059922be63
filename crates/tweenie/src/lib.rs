//! Tweenie Tweening Engine
//!
//! Frame-driven interpolation of arbitrary values toward a target over time.
//!
//! # Features
//!
//! - **Any value type**: tween through a setter closure with a custom
//!   interpolator, or use [`Interpolate`] for floats, glam vectors and [`Color`]
//! - **Easing**: built-in curves, cubic bezier, or a custom curve over time
//! - **Looping**: restart or ping-pong, finite or infinite
//! - **Deferred commands**: play, pause, stop and complete are queued and
//!   applied at well-defined frame phases, so callbacks can issue them safely
//! - **Tags**: group tweeners and control them in bulk
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use tweenie::{Easing, LoopMode, TweenStatus, Tweenie};
//!
//! let tweenie = Tweenie::new();
//! let alpha = Rc::new(Cell::new(0.0_f32));
//! let sink = alpha.clone();
//!
//! let fade = tweenie
//!     .tween(move |a| sink.set(a), 0.0, 1.0, 0.5)
//!     .set_ease(Easing::EaseOut)
//!     .set_loops(LoopMode::PingPong, 1);
//!
//! // Host frame loop
//! for _ in 0..60 {
//!     tweenie.update(1.0 / 60.0);
//!     tweenie.late_update();
//! }
//! assert!((0.0..=1.0).contains(&alpha.get()));
//! assert_eq!(fade.status(), TweenStatus::Playing);
//! ```

pub mod config;
pub mod easing;
pub mod error;
pub mod scheduler;
pub mod setter;
pub mod tags;
pub mod tween;
pub mod tweener;
pub mod values;

pub use config::TweenieConfig;
pub use easing::{Easing, EasingCurve};
pub use error::{ParseError, SetterError};
pub use scheduler::{Tweenie, TweenieHandle};
pub use setter::bind;
pub use tags::Tag;
pub use tween::Tween;
pub use tweener::{Interpolator, LoopMode, TweenEvent, TweenStatus, TweenerId};
pub use values::{Color, Interpolate};
