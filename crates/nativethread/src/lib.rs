// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Native thread primitives for the runtime.
//!
//! Wraps the three facilities the runtime builds its own locks, monitors and
//! global execution lock on: the identity of the calling platform thread, a
//! mutual-exclusion [`Lock`] and a [`Condition`] variable. The backend is
//! fixed at build time (see [`BACKEND`]); every operation delegates straight
//! to the native facility without buffering or extra locking.

mod backend;
#[cfg(feature = "capi")]
pub mod capi;
pub mod condition;
mod error;
pub mod lock;
mod raw;
pub mod thread;

pub use backend::{BACKEND, Backend};
pub use condition::{Condition, WaitTimeoutResult};
pub use error::{Error, Result};
pub use lock::{Lock, LockGuard};
pub use thread::{RawThreadId, ThreadId};
