// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Windows thread identity.
//!
//! Uses the thread id rather than `GetCurrentThread`, whose pseudo-handle is
//! the same value in every thread and cannot tell two threads apart.

use windows_sys::Win32::System::Threading::GetCurrentThreadId;

use crate::raw::RawThread;

pub type RawThreadId = u32;

pub(crate) struct WindowsThread;

impl RawThread for WindowsThread {
	type Id = RawThreadId;

	#[inline]
	fn current() -> Self::Id {
		unsafe { GetCurrentThreadId() }
	}

	#[inline]
	fn equal(a: Self::Id, b: Self::Id) -> bool {
		a == b
	}
}
