// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! POSIX lock backed by a `pthread_mutex_t`.

use std::{
	cell::UnsafeCell,
	io,
	mem::{ManuallyDrop, MaybeUninit},
};

use libc::c_int;

use crate::{Error, Result, raw::RawLock};

/// Boxed so the mutex keeps its address when the handle moves. The box is
/// leaked instead of freed if the mutex is still held on drop.
#[repr(transparent)]
pub(crate) struct PosixLock {
	mutex: ManuallyDrop<Box<UnsafeCell<libc::pthread_mutex_t>>>,
}

// SAFETY: pthread mutexes are designed to be shared between threads.
unsafe impl Send for PosixLock {}
unsafe impl Sync for PosixLock {}

impl PosixLock {
	#[inline]
	pub(crate) fn raw(&self) -> *mut libc::pthread_mutex_t {
		self.mutex.get()
	}
}

impl RawLock for PosixLock {
	fn init() -> Result<Self> {
		let mutex = Box::new(UnsafeCell::new(libc::PTHREAD_MUTEX_INITIALIZER));

		unsafe {
			let mut attr = MaybeUninit::<libc::pthread_mutexattr_t>::uninit();
			check(libc::pthread_mutexattr_init(attr.as_mut_ptr()))?;

			let result = check(libc::pthread_mutexattr_settype(attr.as_mut_ptr(), libc::PTHREAD_MUTEX_NORMAL))
				.and_then(|()| check(libc::pthread_mutex_init(mutex.get(), attr.as_ptr())));

			libc::pthread_mutexattr_destroy(attr.as_mut_ptr());
			result?;
		}

		Ok(Self {
			mutex: ManuallyDrop::new(mutex),
		})
	}

	#[inline]
	fn lock(&self) {
		let r = unsafe { libc::pthread_mutex_lock(self.raw()) };
		debug_assert_eq!(r, 0);
	}

	#[inline]
	fn try_lock(&self) -> bool {
		unsafe { libc::pthread_mutex_trylock(self.raw()) == 0 }
	}

	#[inline]
	unsafe fn unlock(&self) {
		let r = unsafe { libc::pthread_mutex_unlock(self.raw()) };
		debug_assert_eq!(r, 0);
	}
}

impl Drop for PosixLock {
	fn drop(&mut self) {
		// destroying a locked mutex is undefined, so a held one is leaked
		if !self.try_lock() {
			return;
		}

		unsafe {
			self.unlock();
			let r = libc::pthread_mutex_destroy(self.raw());
			debug_assert_eq!(r, 0);
			ManuallyDrop::drop(&mut self.mutex);
		}
	}
}

fn check(code: c_int) -> Result<()> {
	if code == 0 {
		Ok(())
	} else {
		Err(Error::LockInit(io::Error::from_raw_os_error(code)))
	}
}
