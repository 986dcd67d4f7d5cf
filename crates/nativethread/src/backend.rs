// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Build-time backend selection.

use std::fmt::{self, Display, Formatter};

/// Native threading facility a build is compiled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
	/// `pthread_mutex_t` / `pthread_cond_t`.
	Posix,
	/// `CRITICAL_SECTION` / `CONDITION_VARIABLE`.
	Windows,
}

impl Backend {
	/// Lowercase name, as used in the `nativethread_backend` cfg.
	pub fn name(&self) -> &'static str {
		match self {
			Backend::Posix => "posix",
			Backend::Windows => "windows",
		}
	}
}

impl Display for Backend {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

cfg_if::cfg_if! {
	if #[cfg(nativethread_backend = "windows")] {
		/// Backend selected for this build.
		pub const BACKEND: Backend = Backend::Windows;
	} else {
		/// Backend selected for this build.
		pub const BACKEND: Backend = Backend::Posix;
	}
}
