// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::env;

fn main() {
	println!("cargo::rustc-check-cfg=cfg(nativethread_backend, values(\"posix\", \"windows\"))");
	println!("cargo::rerun-if-changed=build.rs");

	let family = env::var("CARGO_CFG_TARGET_FAMILY").unwrap_or_default();
	let has = |name: &str| family.split(',').any(|f| f == name);

	let backend = if has("windows") {
		"windows"
	} else if has("unix") {
		"posix"
	} else {
		panic!("unsupported thread type: target family `{family}` provides neither POSIX nor Windows threads");
	};

	println!("cargo::rustc-cfg=nativethread_backend=\"{backend}\"");
}
