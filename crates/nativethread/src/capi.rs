// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! C ABI over caller-owned storage.
//!
//! Native callers reserve [`NATIVETHREAD_LOCK_SIZE`] / [`NATIVETHREAD_COND_SIZE`]
//! bytes (pointer aligned) per primitive and pair every `*_initialize` with
//! exactly one `*_destroy`. Initialization failure aborts the process.
//!
//! Locks are exposed under two names, `nativethread_lock_*` and
//! `nativethread_mutex_*`; both operate on the same storage.

use std::{
	ffi::{c_int, c_ulong},
	mem::{self, MaybeUninit},
	ptr,
};

use crate::{Condition, Lock, RawThreadId, ThreadId};

cfg_if::cfg_if! {
	if #[cfg(nativethread_backend = "windows")] {
		/// `EBUSY` from the C runtime's `errno.h`.
		pub const NATIVETHREAD_EBUSY: c_int = 16;
	} else {
		pub const NATIVETHREAD_EBUSY: c_int = libc::EBUSY;
	}
}

#[unsafe(no_mangle)]
pub static NATIVETHREAD_LOCK_SIZE: usize = mem::size_of::<Lock>();

#[unsafe(no_mangle)]
pub static NATIVETHREAD_COND_SIZE: usize = mem::size_of::<Condition>();

#[unsafe(no_mangle)]
pub extern "C" fn nativethread_self() -> RawThreadId {
	ThreadId::current().as_raw()
}

/// # Safety
///
/// `lock` must point to writable, uninitialized lock storage.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativethread_lock_initialize(lock: *mut MaybeUninit<Lock>) {
	unsafe { (*lock).write(Lock::new()) };
}

/// # Safety
///
/// `lock` must be initialized, unheld and without waiters. It is left
/// uninitialized.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativethread_lock_destroy(lock: *mut Lock) {
	unsafe { ptr::drop_in_place(lock) };
}

/// # Safety
///
/// `lock` must be initialized.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativethread_lock_lock(lock: *const Lock) {
	unsafe { (*lock).raw_lock() };
}

/// # Safety
///
/// `lock` must be initialized and held by the calling thread.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativethread_lock_unlock(lock: *const Lock) {
	unsafe { (*lock).raw_unlock() };
}

/// # Safety
///
/// See [`nativethread_lock_initialize`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativethread_mutex_initialize(lock: *mut MaybeUninit<Lock>) {
	unsafe { nativethread_lock_initialize(lock) };
}

/// # Safety
///
/// See [`nativethread_lock_destroy`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativethread_mutex_destroy(lock: *mut Lock) {
	unsafe { nativethread_lock_destroy(lock) };
}

/// # Safety
///
/// See [`nativethread_lock_lock`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativethread_mutex_lock(lock: *const Lock) {
	unsafe { nativethread_lock_lock(lock) };
}

/// Returns `0` once acquired, [`NATIVETHREAD_EBUSY`] if another holder has it.
///
/// # Safety
///
/// `lock` must be initialized.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativethread_mutex_trylock(lock: *const Lock) -> c_int {
	if unsafe { (*lock).raw_try_lock() } {
		0
	} else {
		NATIVETHREAD_EBUSY
	}
}

/// # Safety
///
/// See [`nativethread_lock_unlock`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativethread_mutex_unlock(lock: *const Lock) {
	unsafe { nativethread_lock_unlock(lock) };
}

/// # Safety
///
/// `cond` must point to writable, uninitialized condition storage.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativethread_cond_initialize(cond: *mut MaybeUninit<Condition>) {
	unsafe { (*cond).write(Condition::new()) };
}

/// # Safety
///
/// `cond` must be initialized and without waiters. It is left uninitialized.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativethread_cond_destroy(cond: *mut Condition) {
	unsafe { ptr::drop_in_place(cond) };
}

/// # Safety
///
/// `cond` must be initialized.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativethread_cond_signal(cond: *const Condition) {
	unsafe { (*cond).signal() };
}

/// # Safety
///
/// `cond` must be initialized.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativethread_cond_broadcast(cond: *const Condition) {
	unsafe { (*cond).broadcast() };
}

/// # Safety
///
/// Both must be initialized and `lock` held by the calling thread. Waiting
/// on `cond` with a different lock than its first wait used aborts.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativethread_cond_wait(cond: *const Condition, lock: *const Lock) {
	unsafe { (*cond).wait_raw(&*lock) };
}

/// Returns `true` when `msec` elapsed without a wake.
///
/// # Safety
///
/// See [`nativethread_cond_wait`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativethread_cond_timedwait(cond: *const Condition, lock: *const Lock, msec: c_ulong) -> bool {
	unsafe { (*cond).wait_timeout_raw(&*lock, u64::from(msec)).timed_out() }
}
