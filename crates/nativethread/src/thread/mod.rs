// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Identity of the calling platform thread.

use std::fmt::{self, Debug, Formatter};

use crate::raw::RawThread;

#[cfg(nativethread_backend = "posix")]
mod posix;
#[cfg(nativethread_backend = "windows")]
mod windows;

cfg_if::cfg_if! {
	if #[cfg(nativethread_backend = "windows")] {
		type ThreadInner = windows::WindowsThread;
		pub use windows::RawThreadId;
	} else {
		type ThreadInner = posix::PosixThread;
		pub use posix::RawThreadId;
	}
}

/// Snapshot of a platform thread's identity.
///
/// Not an owned resource: copying or dropping it has no effect on the thread.
#[derive(Clone, Copy)]
pub struct ThreadId {
	raw: RawThreadId,
}

// SAFETY: the identity is a plain value; it is never dereferenced.
unsafe impl Send for ThreadId {}
unsafe impl Sync for ThreadId {}

impl ThreadId {
	/// Returns the identity of the calling thread.
	#[inline]
	pub fn current() -> Self {
		Self {
			raw: ThreadInner::current(),
		}
	}

	#[inline]
	pub fn as_raw(&self) -> RawThreadId {
		self.raw
	}
}

impl PartialEq for ThreadId {
	#[inline]
	fn eq(&self, other: &Self) -> bool {
		ThreadInner::equal(self.raw, other.raw)
	}
}

impl Eq for ThreadId {}

impl Debug for ThreadId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ThreadId").field(&self.raw).finish()
	}
}
