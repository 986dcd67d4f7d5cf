// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! POSIX condition backed by a `pthread_cond_t`.
//!
//! Timed waits take an absolute deadline, built by adding the relative
//! timeout to the condition's clock. Apple platforms cannot select the clock
//! and stay on the realtime one.

use std::{cell::UnsafeCell, io, mem, mem::MaybeUninit, time::Duration};

use libc::c_int;

use crate::{Error, Result, lock::posix::PosixLock, raw::RawCondition};

#[cfg(not(target_vendor = "apple"))]
const CLOCK: libc::clockid_t = libc::CLOCK_MONOTONIC;
#[cfg(target_vendor = "apple")]
const CLOCK: libc::clockid_t = libc::CLOCK_REALTIME;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Boxed so the condition keeps its address when the handle moves.
#[repr(transparent)]
pub(crate) struct PosixCondition {
	cond: Box<UnsafeCell<libc::pthread_cond_t>>,
}

// SAFETY: pthread condition variables are designed to be shared between threads.
unsafe impl Send for PosixCondition {}
unsafe impl Sync for PosixCondition {}

impl PosixCondition {
	#[inline]
	fn raw(&self) -> *mut libc::pthread_cond_t {
		self.cond.get()
	}
}

impl RawCondition for PosixCondition {
	type Lock = PosixLock;

	fn init() -> Result<Self> {
		let cond = Box::new(UnsafeCell::new(libc::PTHREAD_COND_INITIALIZER));

		unsafe {
			let mut attr = MaybeUninit::<libc::pthread_condattr_t>::uninit();
			check(libc::pthread_condattr_init(attr.as_mut_ptr()))?;

			#[cfg(not(target_vendor = "apple"))]
			let result = check(libc::pthread_condattr_setclock(attr.as_mut_ptr(), CLOCK))
				.and_then(|()| check(libc::pthread_cond_init(cond.get(), attr.as_ptr())));
			#[cfg(target_vendor = "apple")]
			let result = check(libc::pthread_cond_init(cond.get(), attr.as_ptr()));

			libc::pthread_condattr_destroy(attr.as_mut_ptr());
			result?;
		}

		Ok(Self {
			cond,
		})
	}

	#[inline]
	unsafe fn wait(&self, lock: &PosixLock) {
		let r = unsafe { libc::pthread_cond_wait(self.raw(), lock.raw()) };
		debug_assert_eq!(r, 0);
	}

	unsafe fn wait_timeout(&self, lock: &PosixLock, timeout: Duration) -> bool {
		let deadline = deadline_after(timeout);
		let r = unsafe { libc::pthread_cond_timedwait(self.raw(), lock.raw(), &deadline) };
		debug_assert!(r == 0 || r == libc::ETIMEDOUT);
		r == libc::ETIMEDOUT
	}

	#[inline]
	fn signal(&self) {
		let r = unsafe { libc::pthread_cond_signal(self.raw()) };
		debug_assert_eq!(r, 0);
	}

	#[inline]
	fn broadcast(&self) {
		let r = unsafe { libc::pthread_cond_broadcast(self.raw()) };
		debug_assert_eq!(r, 0);
	}
}

impl Drop for PosixCondition {
	fn drop(&mut self) {
		let r = unsafe { libc::pthread_cond_destroy(self.raw()) };
		debug_assert_eq!(r, 0);
	}
}

fn check(code: c_int) -> Result<()> {
	if code == 0 {
		Ok(())
	} else {
		Err(Error::ConditionInit(io::Error::from_raw_os_error(code)))
	}
}

fn deadline_after(timeout: Duration) -> libc::timespec {
	let mut now: libc::timespec = unsafe { mem::zeroed() };
	let r = unsafe { libc::clock_gettime(CLOCK, &mut now) };
	debug_assert_eq!(r, 0);
	add_timeout(now, timeout)
}

/// Saturates at the largest representable deadline.
fn add_timeout(now: libc::timespec, timeout: Duration) -> libc::timespec {
	let nsec = now.tv_nsec as u64 + u64::from(timeout.subsec_nanos());
	let sec = timeout
		.as_secs()
		.checked_add(nsec / NANOS_PER_SEC)
		.and_then(|s| libc::time_t::try_from(s).ok())
		.and_then(|s| now.tv_sec.checked_add(s));

	let mut deadline: libc::timespec = unsafe { mem::zeroed() };
	match sec {
		Some(sec) => {
			deadline.tv_sec = sec;
			deadline.tv_nsec = (nsec % NANOS_PER_SEC) as _;
		}
		None => {
			deadline.tv_sec = libc::time_t::MAX;
			deadline.tv_nsec = (NANOS_PER_SEC - 1) as _;
		}
	}
	deadline
}
