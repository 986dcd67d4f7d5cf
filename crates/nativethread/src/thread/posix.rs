// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! POSIX thread identity backed by `pthread_self`.

use crate::raw::RawThread;

pub type RawThreadId = libc::pthread_t;

pub(crate) struct PosixThread;

impl RawThread for PosixThread {
	type Id = RawThreadId;

	#[inline]
	fn current() -> Self::Id {
		unsafe { libc::pthread_self() }
	}

	#[inline]
	fn equal(a: Self::Id, b: Self::Id) -> bool {
		unsafe { libc::pthread_equal(a, b) != 0 }
	}
}
