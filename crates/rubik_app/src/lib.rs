// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rubik player front end.
//!
//! [`Session`] turns user actions into recorded, paced move batches and
//! keeps the simulated cube in step with playback. [`Settings`] holds the
//! player configuration persisted as RON.

pub mod session;
pub mod settings;

pub use session::{Action, ActionOutcome, IgnoreReason, Session, SessionError};
pub use settings::{Settings, SettingsError, SETTINGS_FILE_NAME, SETTINGS_FORMAT_VERSION};
