// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Mutual-exclusion lock.
//!
//! [`Lock`] carries no data of its own; it serializes whatever state the
//! caller pairs it with. Acquisition is either scoped through [`LockGuard`]
//! or split across call sites through the `raw_*` operations, which is what
//! the global execution lock needs.

use std::{
	fmt::{self, Debug, Formatter},
	marker::PhantomData,
	process,
};

use tracing::{error, trace};

use crate::{BACKEND, Result, raw::RawLock};

#[cfg(nativethread_backend = "posix")]
pub(crate) mod posix;
#[cfg(nativethread_backend = "windows")]
pub(crate) mod windows;

cfg_if::cfg_if! {
	if #[cfg(nativethread_backend = "windows")] {
		pub(crate) type LockInner = windows::WindowsLock;
	} else {
		pub(crate) type LockInner = posix::PosixLock;
	}
}

/// A native mutual-exclusion lock.
///
/// At most one thread holds it at a time. Acquiring it makes every write the
/// previous holder made before releasing visible to the new holder. Waiters
/// are woken in whatever order the OS chooses.
///
/// Recursive acquisition from the holding thread is backend-defined: the
/// POSIX mutex does not recurse (`lock` deadlocks, `try_lock` fails) while the
/// Windows critical section does. Callers must not rely on either.
///
/// Dropping a lock that is still held leaks its native object rather than
/// destroying it.
#[repr(transparent)]
pub struct Lock {
	pub(crate) inner: LockInner,
}

impl Lock {
	/// Initializes a new native lock, aborting the process on failure.
	///
	/// Use [`Lock::try_new`] to observe the failure instead; either way the
	/// runtime cannot continue without it.
	pub fn new() -> Self {
		match Self::try_new() {
			Ok(lock) => lock,
			Err(err) => {
				error!(backend = %BACKEND, error = %err, "native lock initialization failed, aborting");
				process::abort();
			}
		}
	}

	/// Initializes a new native lock.
	pub fn try_new() -> Result<Self> {
		let inner = LockInner::init()?;
		trace!(backend = %BACKEND, "native lock initialized");
		Ok(Self {
			inner,
		})
	}

	/// Blocks until the calling thread holds the lock.
	#[inline]
	pub fn lock(&self) -> LockGuard<'_> {
		self.inner.lock();
		LockGuard::new(self)
	}

	/// Acquires the lock if it is free, without blocking.
	#[inline]
	pub fn try_lock(&self) -> Option<LockGuard<'_>> {
		if self.inner.try_lock() {
			Some(LockGuard::new(self))
		} else {
			None
		}
	}

	/// Blocks until the calling thread holds the lock, without a guard.
	///
	/// Must be balanced by exactly one [`Lock::raw_unlock`] on this thread.
	/// A lock dropped while still held this way is leaked.
	#[inline]
	pub fn raw_lock(&self) {
		self.inner.lock();
	}

	/// Attempts to acquire the lock without blocking or returning a guard.
	#[inline]
	pub fn raw_try_lock(&self) -> bool {
		self.inner.try_lock()
	}

	/// Releases the lock.
	///
	/// # Safety
	///
	/// The calling thread must hold the lock through [`Lock::raw_lock`] or a
	/// successful [`Lock::raw_try_lock`], or through a guard that was
	/// forgotten with [`std::mem::forget`].
	#[inline]
	pub unsafe fn raw_unlock(&self) {
		unsafe { self.inner.unlock() }
	}
}

impl Default for Lock {
	#[inline]
	fn default() -> Self {
		Self::new()
	}
}

impl Drop for Lock {
	fn drop(&mut self) {
		trace!(backend = %BACKEND, "native lock destroyed");
	}
}

impl Debug for Lock {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Lock").field("backend", &BACKEND).finish_non_exhaustive()
	}
}

/// Scoped ownership of a [`Lock`]; releases it on drop.
///
/// Not `Send`: the release must happen on the acquiring thread.
#[must_use = "if unused the Lock will immediately unlock"]
pub struct LockGuard<'a> {
	lock: &'a Lock,
	_not_send: PhantomData<*const ()>,
}

unsafe impl Sync for LockGuard<'_> {}

impl<'a> LockGuard<'a> {
	#[inline]
	fn new(lock: &'a Lock) -> Self {
		Self {
			lock,
			_not_send: PhantomData,
		}
	}

	/// The lock this guard holds.
	#[inline]
	pub fn lock(&self) -> &'a Lock {
		self.lock
	}
}

impl Drop for LockGuard<'_> {
	#[inline]
	fn drop(&mut self) {
		unsafe { self.lock.inner.unlock() }
	}
}

impl Debug for LockGuard<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("LockGuard").finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use std::{mem, sync::Arc, thread};

	use crossbeam_channel::bounded;

	use super::*;

	#[test]
	fn test_lock_unlock() {
		let lock = Lock::new();
		drop(lock.lock());
		drop(lock.lock());
	}

	#[test]
	fn test_try_lock_when_free() {
		let lock = Lock::new();
		let guard = lock.try_lock();
		assert!(guard.is_some());
	}

	#[test]
	fn test_try_lock_when_held_elsewhere() {
		let lock = Arc::new(Lock::new());
		let _guard = lock.lock();

		let other = lock.clone();
		let acquired = thread::spawn(move || other.try_lock().is_some()).join().unwrap();
		assert!(!acquired);
	}

	#[test]
	fn test_raw_lock_unlock() {
		let lock = Lock::new();
		lock.raw_lock();
		unsafe { lock.raw_unlock() };
		assert!(lock.raw_try_lock());
		unsafe { lock.raw_unlock() };
	}

	#[test]
	fn test_forgotten_guard_released_raw() {
		let lock = Lock::new();
		mem::forget(lock.lock());
		unsafe { lock.raw_unlock() };
		assert!(lock.try_lock().is_some());
	}

	#[test]
	fn test_guard_points_at_its_lock() {
		let lock = Lock::new();
		let guard = lock.lock();
		assert!(std::ptr::eq(guard.lock(), &lock));
	}

	#[test]
	fn test_lock_moves_after_init() {
		let lock = Lock::new();
		drop(lock.lock());

		let moved = Box::new(lock);
		drop(moved.lock());
	}

	#[test]
	fn test_drop_while_raw_held() {
		let lock = Lock::new();
		lock.raw_lock();
		drop(lock);
	}

	#[test]
	fn test_drop_with_forgotten_guard() {
		let lock = Lock::new();
		mem::forget(lock.lock());
		drop(lock);
	}

	#[test]
	fn test_drop_while_held_by_other_thread() {
		let lock = Lock::new();
		let (held_tx, held_rx) = bounded::<()>(0);
		let (done_tx, done_rx) = bounded::<()>(0);

		thread::scope(|s| {
			s.spawn(|| {
				lock.raw_lock();
				held_tx.send(()).unwrap();
				done_rx.recv().unwrap();
			});
			held_rx.recv().unwrap();
			done_tx.send(()).unwrap();
		});

		drop(lock);
	}

	#[test]
	fn test_handle_is_pointer_sized() {
		assert_eq!(mem::size_of::<Lock>(), mem::size_of::<usize>());
	}
}
