// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::io;

/// Failure to allocate a native primitive.
///
/// The runtime cannot operate without its synchronization primitives, so
/// callers must treat every variant as unrecoverable rather than retry.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("failed to initialize native lock")]
	LockInit(#[source] io::Error),

	#[error("failed to initialize native condition")]
	ConditionInit(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
	use std::error::Error as _;

	use super::*;

	#[test]
	fn test_source_is_os_error() {
		let err = Error::LockInit(io::Error::from_raw_os_error(12));
		assert_eq!(err.to_string(), "failed to initialize native lock");

		let source = err.source().unwrap().downcast_ref::<io::Error>().unwrap();
		assert_eq!(source.raw_os_error(), Some(12));
	}
}
