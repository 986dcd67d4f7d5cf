// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Contract every backend implements.
//!
//! Destruction is the implementor's `Drop`. Implementors own their native
//! object behind a stable heap address, so values may be moved freely after
//! `init`.

use std::time::Duration;

use crate::Result;

pub(crate) trait RawLock: Sized + Send + Sync {
	fn init() -> Result<Self>;

	fn lock(&self);

	fn try_lock(&self) -> bool;

	/// # Safety
	///
	/// The calling thread must hold the lock.
	unsafe fn unlock(&self);
}

pub(crate) trait RawCondition: Sized + Send + Sync {
	type Lock: RawLock;

	fn init() -> Result<Self>;

	/// # Safety
	///
	/// The calling thread must hold `lock`, and every concurrent waiter must
	/// use the same lock.
	unsafe fn wait(&self, lock: &Self::Lock);

	/// Returns `true` when the wait ended because `timeout` elapsed.
	///
	/// # Safety
	///
	/// Same as [`RawCondition::wait`].
	unsafe fn wait_timeout(&self, lock: &Self::Lock, timeout: Duration) -> bool;

	fn signal(&self);

	fn broadcast(&self);
}

pub(crate) trait RawThread {
	type Id: Copy;

	fn current() -> Self::Id;

	fn equal(a: Self::Id, b: Self::Id) -> bool;
}
