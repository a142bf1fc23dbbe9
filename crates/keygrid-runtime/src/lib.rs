#![forbid(unsafe_code)]

//! Runtime: configuration, effect application, and the session loop.
//!
//! # Role in keygrid
//! `keygrid-runtime` sits between the pure selector in `keygrid-core` and a
//! front end. It loads [`config::KeygridConfig`], owns the
//! [`session::Session`] that turns key events into renderer calls and a
//! delayed pointer action, and defines the [`effects::OverlayRenderer`] and
//! [`effects::PointerDispatcher`] seams a front end implements.
//!
//! # How it fits in the system
//! A front end converts its native input into [`keygrid_core::event::Event`]s,
//! passes them to [`session::Session::handle_event`], and calls
//! [`session::Session::tick`] whenever [`session::Session::next_deadline`]
//! passes. Nothing in this crate blocks or sleeps.

pub mod config;
pub mod effects;
pub mod recording;
pub mod session;
pub mod timer;

pub use config::{ConfigError, ConfigWarning, KeygridConfig};
pub use effects::{DispatchError, OverlayRenderer, PointerDispatcher};
pub use session::{Control, Session, SessionEnd, SessionError};
pub use timer::{TaskHandle, TimerQueue};
