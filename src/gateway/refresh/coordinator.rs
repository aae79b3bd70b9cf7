//! Single-flight coordination primitive: one in-flight flag plus a FIFO queue of waiters.

// std
use std::mem;
// crates.io
use tokio::sync::oneshot;
// self
use crate::{_prelude::*, auth::TokenSecret, error::RefreshError};

/// Outcome shared with every participant of one refresh.
pub type RefreshResult = Result<TokenSecret, RefreshError>;

/// Tracks whether a refresh is in flight and who is waiting on it.
///
/// The flag check and the flag set happen inside one critical section with no suspension point,
/// so two callers can never both become leader. The flag is cleared in the same critical section
/// that drains the waiter queue.
#[derive(Debug, Default)]
pub struct RefreshCoordinator(Mutex<RefreshState>);
impl RefreshCoordinator {
	/// Joins the current refresh, or starts one when none is in flight.
	pub fn join(&self) -> Ticket<'_> {
		let mut state = self.0.lock();

		if state.in_flight {
			let (tx, rx) = oneshot::channel();

			state.waiters.push_back(tx);

			Ticket::Follower(PendingRefresh(rx))
		} else {
			state.in_flight = true;

			Ticket::Leader(LeaderGuard { coordinator: self, settled: false })
		}
	}

	/// Returns `true` while a leader holds the refresh.
	pub fn is_in_flight(&self) -> bool {
		self.0.lock().in_flight
	}

	/// Number of followers queued behind the current leader.
	pub fn waiting(&self) -> usize {
		self.0.lock().waiters.len()
	}

	fn settle(&self, result: &RefreshResult) -> usize {
		let waiters = {
			let mut state = self.0.lock();

			state.in_flight = false;

			mem::take(&mut state.waiters)
		};
		let count = waiters.len();

		for waiter in waiters {
			// A follower whose future was dropped no longer needs the result.
			let _ = waiter.send(result.clone());
		}

		count
	}
}

#[derive(Debug, Default)]
struct RefreshState {
	in_flight: bool,
	waiters: VecDeque<oneshot::Sender<RefreshResult>>,
}

/// Role handed out by [`RefreshCoordinator::join`].
#[derive(Debug)]
pub enum Ticket<'a> {
	/// Caller must perform the refresh and settle the guard.
	Leader(LeaderGuard<'a>),
	/// A refresh is already running; await its outcome.
	Follower(PendingRefresh),
}

/// Leadership over the in-flight refresh.
///
/// Dropping the guard without calling [`LeaderGuard::settle`] resolves every waiter with
/// [`RefreshError::Abandoned`] and returns the coordinator to idle.
#[must_use = "waiters stay suspended until the leader settles"]
#[derive(Debug)]
pub struct LeaderGuard<'a> {
	coordinator: &'a RefreshCoordinator,
	settled: bool,
}
impl LeaderGuard<'_> {
	/// Resolves every waiter (in enqueue order) with `result`, clears the in-flight flag, and
	/// returns how many waiters were resolved.
	pub fn settle(mut self, result: &RefreshResult) -> usize {
		self.settled = true;

		self.coordinator.settle(result)
	}
}
impl Drop for LeaderGuard<'_> {
	fn drop(&mut self) {
		if !self.settled {
			self.coordinator.settle(&Err(RefreshError::Abandoned));
		}
	}
}

/// A follower's suspended wait on the in-flight refresh.
#[derive(Debug)]
pub struct PendingRefresh(oneshot::Receiver<RefreshResult>);
impl PendingRefresh {
	/// Resolves once the leader settles.
	pub async fn wait(self) -> RefreshResult {
		self.0.await.unwrap_or_else(|_| Err(RefreshError::Abandoned))
	}
}
