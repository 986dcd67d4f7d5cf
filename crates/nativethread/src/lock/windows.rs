// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Windows lock backed by a `CRITICAL_SECTION`.
//!
//! Initialization cannot fail on any supported Windows version; the only
//! allocation is the box, and running out of memory there aborts anyway.

use std::{
	cell::UnsafeCell,
	mem::{self, ManuallyDrop},
};

use windows_sys::Win32::System::Threading::{
	CRITICAL_SECTION, DeleteCriticalSection, EnterCriticalSection, InitializeCriticalSection,
	LeaveCriticalSection, TryEnterCriticalSection,
};

use crate::{Result, raw::RawLock};

/// Boxed so the critical section keeps its address when the handle moves.
/// The box is leaked instead of freed if the section is still held on drop.
#[repr(transparent)]
pub(crate) struct WindowsLock {
	section: ManuallyDrop<Box<UnsafeCell<CRITICAL_SECTION>>>,
}

// SAFETY: critical sections are designed to be shared between threads.
unsafe impl Send for WindowsLock {}
unsafe impl Sync for WindowsLock {}

impl WindowsLock {
	#[inline]
	pub(crate) fn raw(&self) -> *mut CRITICAL_SECTION {
		self.section.get()
	}
}

impl RawLock for WindowsLock {
	fn init() -> Result<Self> {
		let section: Box<UnsafeCell<CRITICAL_SECTION>> = Box::new(UnsafeCell::new(unsafe { mem::zeroed() }));
		unsafe { InitializeCriticalSection(section.get()) };
		Ok(Self {
			section: ManuallyDrop::new(section),
		})
	}

	#[inline]
	fn lock(&self) {
		unsafe { EnterCriticalSection(self.raw()) }
	}

	#[inline]
	fn try_lock(&self) -> bool {
		unsafe { TryEnterCriticalSection(self.raw()) != 0 }
	}

	#[inline]
	unsafe fn unlock(&self) {
		unsafe { LeaveCriticalSection(self.raw()) }
	}
}

impl Drop for WindowsLock {
	fn drop(&mut self) {
		// the section recurses, so trying to enter would succeed for the
		// holder; the recursion count is the only reliable held check
		if unsafe { (*self.raw()).RecursionCount } != 0 {
			return;
		}

		unsafe {
			DeleteCriticalSection(self.raw());
			ManuallyDrop::drop(&mut self.section);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_held_section_reports_recursion() {
		let lock = WindowsLock::init().unwrap();
		lock.lock();
		assert_ne!(unsafe { (*lock.raw()).RecursionCount }, 0);
		unsafe { lock.unlock() };
		assert_eq!(unsafe { (*lock.raw()).RecursionCount }, 0);
	}

	#[test]
	fn test_drop_while_held_leaks_instead_of_deleting() {
		let lock = WindowsLock::init().unwrap();
		lock.lock();
		let raw = lock.raw();
		drop(lock);

		assert_ne!(unsafe { (*raw).RecursionCount }, 0);
	}
}
