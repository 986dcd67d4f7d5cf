// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Condition variable synchronization primitive.

use std::{
	fmt::{self, Debug, Formatter},
	process, ptr,
	sync::atomic::{AtomicPtr, Ordering},
	time::{Duration, Instant},
};

use tracing::{error, trace};

use crate::{
	BACKEND, Result,
	lock::{Lock, LockGuard},
	raw::RawCondition,
};

#[cfg(nativethread_backend = "posix")]
mod posix;
#[cfg(nativethread_backend = "windows")]
mod windows;

cfg_if::cfg_if! {
	if #[cfg(nativethread_backend = "windows")] {
		type ConditionInner = windows::WindowsCondition;
	} else {
		type ConditionInner = posix::PosixCondition;
	}
}

/// Result of a timed wait on a condition variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitTimeoutResult {
	timed_out: bool,
}

impl WaitTimeoutResult {
	/// Returns whether the wait timed out.
	///
	/// A `false` here does not mean the awaited state changed; callers still
	/// re-check their predicate.
	#[inline]
	pub fn timed_out(&self) -> bool {
		self.timed_out
	}
}

/// A condition variable for coordinating threads around a [`Lock`].
///
/// Every wait must be made while holding the lock. The first wait binds the
/// condition to its lock; waiting with any other lock afterwards panics.
/// Waits may return spuriously. Signals are not remembered: a signal with no
/// waiter is lost.
pub struct Condition {
	inner: ConditionInner,
	lock: AtomicPtr<()>,
}

impl Condition {
	/// Initializes a new condition variable, aborting the process on failure.
	pub fn new() -> Self {
		match Self::try_new() {
			Ok(cond) => cond,
			Err(err) => {
				error!(backend = %BACKEND, error = %err, "native condition initialization failed, aborting");
				process::abort();
			}
		}
	}

	/// Initializes a new condition variable.
	pub fn try_new() -> Result<Self> {
		let inner = ConditionInner::init()?;
		trace!(backend = %BACKEND, "native condition initialized");
		Ok(Self {
			inner,
			lock: AtomicPtr::new(ptr::null_mut()),
		})
	}

	/// Releases the guarded lock, blocks until woken, then re-acquires it.
	#[inline]
	pub fn wait(&self, guard: &mut LockGuard<'_>) {
		let lock = guard.lock();
		self.verify(lock);
		unsafe { self.inner.wait(&lock.inner) }
	}

	/// Like [`Condition::wait`], but gives up after `timeout_ms` milliseconds.
	///
	/// The lock is held again on return whether or not the wait timed out.
	#[inline]
	pub fn wait_timeout_ms(&self, guard: &mut LockGuard<'_>, timeout_ms: u64) -> WaitTimeoutResult {
		self.wait_for(guard, Duration::from_millis(timeout_ms))
	}

	/// Like [`Condition::wait`], but gives up after `timeout`.
	#[inline]
	pub fn wait_for(&self, guard: &mut LockGuard<'_>, timeout: Duration) -> WaitTimeoutResult {
		let lock = guard.lock();
		self.verify(lock);
		let timed_out = unsafe { self.inner.wait_timeout(&lock.inner, timeout) };
		WaitTimeoutResult {
			timed_out,
		}
	}

	/// Waits for as long as `condition` returns `true`.
	///
	/// `condition` is evaluated with the lock held, before the first wait and
	/// after every wake.
	pub fn wait_while<F>(&self, guard: &mut LockGuard<'_>, mut condition: F)
	where
		F: FnMut() -> bool,
	{
		while condition() {
			self.wait(guard);
		}
	}

	/// Waits for as long as `condition` returns `true`, up to `timeout` in
	/// total across wakes.
	///
	/// Times out only if `condition` still holds when the time is up.
	pub fn wait_timeout_while<F>(&self, guard: &mut LockGuard<'_>, timeout: Duration, mut condition: F) -> WaitTimeoutResult
	where
		F: FnMut() -> bool,
	{
		let start = Instant::now();
		while condition() {
			let remaining = match timeout.checked_sub(start.elapsed()) {
				Some(remaining) if !remaining.is_zero() => remaining,
				_ => {
					return WaitTimeoutResult {
						timed_out: true,
					};
				}
			};
			self.wait_for(guard, remaining);
		}
		WaitTimeoutResult {
			timed_out: false,
		}
	}

	/// Waits on a lock acquired through [`Lock::raw_lock`].
	///
	/// # Safety
	///
	/// The calling thread must hold `lock`. Waiting with a different lock
	/// than this condition is bound to panics, as with [`Condition::wait`].
	#[inline]
	pub unsafe fn wait_raw(&self, lock: &Lock) {
		self.verify(lock);
		unsafe { self.inner.wait(&lock.inner) }
	}

	/// Timed form of [`Condition::wait_raw`].
	///
	/// # Safety
	///
	/// Same as [`Condition::wait_raw`].
	#[inline]
	pub unsafe fn wait_timeout_raw(&self, lock: &Lock, timeout_ms: u64) -> WaitTimeoutResult {
		self.verify(lock);
		let timed_out = unsafe { self.inner.wait_timeout(&lock.inner, Duration::from_millis(timeout_ms)) };
		WaitTimeoutResult {
			timed_out,
		}
	}

	/// Binds this condition to `lock` on first use and panics on any other.
	///
	/// Keyed on the native object, which keeps its address when the handle
	/// moves.
	#[inline]
	fn verify(&self, lock: &Lock) {
		let addr = lock.inner.raw() as *mut ();
		match self.lock.compare_exchange(ptr::null_mut(), addr, Ordering::Relaxed, Ordering::Relaxed) {
			Ok(_) => {}
			Err(bound) if bound == addr => {}
			Err(_) => panic!("attempted to use a condition with two locks"),
		}
	}

	/// Wakes up one blocked thread, if any.
	#[inline]
	pub fn signal(&self) {
		self.inner.signal();
	}

	/// Wakes up all blocked threads.
	#[inline]
	pub fn broadcast(&self) {
		self.inner.broadcast();
	}
}

impl Default for Condition {
	#[inline]
	fn default() -> Self {
		Self::new()
	}
}

impl Drop for Condition {
	fn drop(&mut self) {
		trace!(backend = %BACKEND, "native condition destroyed");
	}
}

impl Debug for Condition {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Condition").field("backend", &BACKEND).finish_non_exhaustive()
	}
}
