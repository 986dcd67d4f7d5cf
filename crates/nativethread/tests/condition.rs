// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Integration tests for wait, signal, broadcast and timed waits

use std::{
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
	thread,
	time::{Duration, Instant},
};

use crossbeam_channel::unbounded;
use nativethread::{Condition, Lock};

const RECV_TIMEOUT: Duration = Duration::from_secs(10);

/// A 50ms timed wait plus scheduling slack.
const MAX_TIMEDWAIT: Duration = Duration::from_millis(50 + 250);

struct Shared {
	lock: Lock,
	cond: Condition,
	ready: AtomicBool,
	waiting: AtomicUsize,
}

impl Shared {
	fn new() -> Arc<Self> {
		Arc::new(Self {
			lock: Lock::new(),
			cond: Condition::new(),
			ready: AtomicBool::new(false),
			waiting: AtomicUsize::new(0),
		})
	}

	/// Spins until `count` threads have registered as waiting under the lock.
	fn await_waiters(&self, count: usize) {
		let start = Instant::now();
		while self.waiting.load(Ordering::SeqCst) < count {
			assert!(start.elapsed() < RECV_TIMEOUT, "waiters never arrived");
			thread::yield_now();
		}
		// a waiter bumps the counter before its wait releases the lock
		drop(self.lock.lock());
	}
}

#[test]
fn test_signal_wakes_waiter_with_lock_held() {
	let shared = Shared::new();
	let (tx, rx) = unbounded();

	let waiter = {
		let shared = shared.clone();
		thread::spawn(move || {
			let mut guard = shared.lock.lock();
			shared.waiting.fetch_add(1, Ordering::SeqCst);
			while !shared.ready.load(Ordering::SeqCst) {
				shared.cond.wait(&mut guard);
			}
			// still holding the lock: nobody else can take it
			let lock_free = thread::scope(|s| s.spawn(|| shared.lock.try_lock().is_some()).join().unwrap());
			tx.send(lock_free).unwrap();
		})
	};

	shared.await_waiters(1);
	{
		let _guard = shared.lock.lock();
		shared.ready.store(true, Ordering::SeqCst);
		shared.cond.signal();
	}

	let lock_free = rx.recv_timeout(RECV_TIMEOUT).unwrap();
	assert!(!lock_free);
	waiter.join().unwrap();
}

#[test]
fn test_broadcast_wakes_all() {
	const WAITERS: usize = 6;

	let shared = Shared::new();
	let (tx, rx) = unbounded();

	let handles: Vec<_> = (0..WAITERS)
		.map(|i| {
			let shared = shared.clone();
			let tx = tx.clone();
			thread::spawn(move || {
				let mut guard = shared.lock.lock();
				shared.waiting.fetch_add(1, Ordering::SeqCst);
				shared.cond.wait_while(&mut guard, || !shared.ready.load(Ordering::SeqCst));
				tx.send(i).unwrap();
			})
		})
		.collect();

	shared.await_waiters(WAITERS);
	{
		let _guard = shared.lock.lock();
		shared.ready.store(true, Ordering::SeqCst);
		shared.cond.broadcast();
	}

	let mut woken: Vec<usize> = (0..WAITERS).map(|_| rx.recv_timeout(RECV_TIMEOUT).unwrap()).collect();
	woken.sort();
	assert_eq!(woken, (0..WAITERS).collect::<Vec<_>>());

	for handle in handles {
		handle.join().unwrap();
	}
}

#[test]
fn test_signal_wakes_at_least_one() {
	const WAITERS: usize = 3;

	let shared = Shared::new();
	let tokens = Arc::new(AtomicUsize::new(0));
	let (tx, rx) = unbounded();

	let handles: Vec<_> = (0..WAITERS)
		.map(|_| {
			let shared = shared.clone();
			let tokens = tokens.clone();
			let tx = tx.clone();
			thread::spawn(move || {
				let mut guard = shared.lock.lock();
				shared.waiting.fetch_add(1, Ordering::SeqCst);
				shared.cond.wait_while(&mut guard, || tokens.load(Ordering::SeqCst) == 0);
				tokens.fetch_sub(1, Ordering::SeqCst);
				tx.send(()).unwrap();
			})
		})
		.collect();

	shared.await_waiters(WAITERS);
	for _ in 0..WAITERS {
		let _guard = shared.lock.lock();
		tokens.fetch_add(1, Ordering::SeqCst);
		shared.cond.signal();
	}

	for _ in 0..WAITERS {
		rx.recv_timeout(RECV_TIMEOUT).unwrap();
	}
	for handle in handles {
		handle.join().unwrap();
	}
	assert_eq!(tokens.load(Ordering::SeqCst), 0);
}

#[test]
fn test_timedwait_bound() {
	let lock = Lock::new();
	let cond = Condition::new();

	let mut guard = lock.lock();
	let start = Instant::now();
	let result = cond.wait_timeout_ms(&mut guard, 50);
	let elapsed = start.elapsed();

	assert!(result.timed_out());
	assert!(elapsed >= Duration::from_millis(40), "returned early after {elapsed:?}");
	assert!(elapsed < MAX_TIMEDWAIT, "overshot to {elapsed:?}");
}

#[test]
fn test_four_timed_waiters_then_destroy() {
	const WAITERS: usize = 4;

	let shared = Shared::new();
	let (tx, rx) = unbounded();
	let overall = Instant::now();

	let handles: Vec<_> = (0..WAITERS)
		.map(|_| {
			let shared = shared.clone();
			let tx = tx.clone();
			thread::spawn(move || {
				let mut guard = shared.lock.lock();
				let start = Instant::now();
				let result = shared.cond.wait_timeout_ms(&mut guard, 50);
				tx.send((result.timed_out(), start.elapsed())).unwrap();
			})
		})
		.collect();

	for _ in 0..WAITERS {
		let (timed_out, elapsed) = rx.recv_timeout(RECV_TIMEOUT).unwrap();
		assert!(timed_out);
		assert!(elapsed >= Duration::from_millis(40), "returned early after {elapsed:?}");
		assert!(elapsed < MAX_TIMEDWAIT, "overshot to {elapsed:?}");
	}
	// waiters release the lock while waiting, so their timeouts overlap
	let total = overall.elapsed();
	assert!(total < MAX_TIMEDWAIT, "all waiters took {total:?}");
	for handle in handles {
		handle.join().unwrap();
	}

	let shared = Arc::try_unwrap(shared).ok().expect("all waiters joined");
	drop(shared.cond);
	drop(shared.lock);
}

#[test]
fn test_timedwait_woken_before_timeout() {
	let shared = Shared::new();
	let (tx, rx) = unbounded();

	let waiter = {
		let shared = shared.clone();
		thread::spawn(move || {
			let mut guard = shared.lock.lock();
			shared.waiting.fetch_add(1, Ordering::SeqCst);
			let start = Instant::now();
			let result = shared.cond.wait_timeout_while(&mut guard, Duration::from_secs(30), || {
				!shared.ready.load(Ordering::SeqCst)
			});
			tx.send((result.timed_out(), start.elapsed())).unwrap();
		})
	};

	shared.await_waiters(1);
	{
		let _guard = shared.lock.lock();
		shared.ready.store(true, Ordering::SeqCst);
		shared.cond.signal();
	}

	let (timed_out, elapsed) = rx.recv_timeout(RECV_TIMEOUT).unwrap();
	assert!(!timed_out);
	assert!(elapsed < Duration::from_secs(30));
	waiter.join().unwrap();
}

#[test]
fn test_cancellation_flag_checked_after_bounded_waits() {
	let shared = Shared::new();
	let cancelled = Arc::new(AtomicBool::new(false));
	let (tx, rx) = unbounded();

	let worker = {
		let shared = shared.clone();
		let cancelled = cancelled.clone();
		thread::spawn(move || {
			let mut guard = shared.lock.lock();
			let mut rounds = 0usize;
			while !cancelled.load(Ordering::SeqCst) {
				shared.cond.wait_timeout_ms(&mut guard, 5);
				rounds += 1;
			}
			tx.send(rounds).unwrap();
		})
	};

	thread::sleep(Duration::from_millis(30));
	cancelled.store(true, Ordering::SeqCst);

	let rounds = rx.recv_timeout(RECV_TIMEOUT).unwrap();
	assert!(rounds >= 1);
	worker.join().unwrap();
}
