// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Windows condition backed by a `CONDITION_VARIABLE`, waiting on the
//! lock's critical section. Condition variables hold no kernel resources, so
//! there is nothing to release on drop besides the box.

use std::{cell::UnsafeCell, mem, time::Duration};

use windows_sys::Win32::{
	Foundation::{ERROR_TIMEOUT, GetLastError},
	System::Threading::{
		CONDITION_VARIABLE, INFINITE, InitializeConditionVariable, SleepConditionVariableCS,
		WakeAllConditionVariable, WakeConditionVariable,
	},
};

use crate::{Result, lock::windows::WindowsLock, raw::RawCondition};

#[repr(transparent)]
pub(crate) struct WindowsCondition {
	var: Box<UnsafeCell<CONDITION_VARIABLE>>,
}

// SAFETY: condition variables are designed to be shared between threads.
unsafe impl Send for WindowsCondition {}
unsafe impl Sync for WindowsCondition {}

impl WindowsCondition {
	#[inline]
	fn raw(&self) -> *mut CONDITION_VARIABLE {
		self.var.get()
	}
}

impl RawCondition for WindowsCondition {
	type Lock = WindowsLock;

	fn init() -> Result<Self> {
		let var: Box<UnsafeCell<CONDITION_VARIABLE>> = Box::new(UnsafeCell::new(unsafe { mem::zeroed() }));
		unsafe { InitializeConditionVariable(var.get()) };
		Ok(Self {
			var,
		})
	}

	#[inline]
	unsafe fn wait(&self, lock: &WindowsLock) {
		let r = unsafe { SleepConditionVariableCS(self.raw(), lock.raw(), INFINITE) };
		debug_assert!(r != 0);
	}

	unsafe fn wait_timeout(&self, lock: &WindowsLock, timeout: Duration) -> bool {
		let r = unsafe { SleepConditionVariableCS(self.raw(), lock.raw(), to_millis(timeout)) };
		if r != 0 {
			return false;
		}
		let err = unsafe { GetLastError() };
		debug_assert_eq!(err, ERROR_TIMEOUT);
		err == ERROR_TIMEOUT
	}

	#[inline]
	fn signal(&self) {
		unsafe { WakeConditionVariable(self.raw()) }
	}

	#[inline]
	fn broadcast(&self) {
		unsafe { WakeAllConditionVariable(self.raw()) }
	}
}

/// Rounds up to whole milliseconds and stays below `INFINITE`.
fn to_millis(timeout: Duration) -> u32 {
	let max = u64::from(INFINITE - 1);
	timeout
		.as_secs()
		.checked_mul(1000)
		.and_then(|ms| ms.checked_add(u64::from(timeout.subsec_nanos().div_ceil(1_000_000))))
		.map_or(max, |ms| ms.min(max)) as u32
}
