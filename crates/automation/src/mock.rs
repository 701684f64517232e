//! In-memory automation stand-ins.
//!
//! [`MockConnector`] implements the full boundary surface without
//! spawning any processes. Every driver and engine it creates is
//! observable afterwards through [`HandleProbe`]s, and failures can be
//! injected at each step (driver creation, the nth engine launch,
//! per-kind engine close, driver close) plus kind mislabeling, to
//! exercise rollback paths that a live library would only hit under
//! rare process failures.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::bail;
use parking_lot::Mutex;

use crate::connector::DriverConnector;
use crate::handles::{Driver, Engine};
use crate::kind::EngineKind;
use crate::options::{CreateOptions, LaunchOptions};

/// Observation handle for one mock driver or engine.
///
/// Clones share state with the live handle, so a probe stays valid
/// after the handle itself has been consumed by a bundle.
#[derive(Clone, Debug)]
pub struct HandleProbe {
	kind: Option<EngineKind>,
	closed: Arc<AtomicBool>,
}

impl HandleProbe {
	/// Engine kind the handle reported, or `None` for a driver.
	pub fn kind(&self) -> Option<EngineKind> {
		self.kind
	}

	/// Whether `close` has been called on the handle.
	///
	/// True even when the close was configured to fail: a failed close
	/// still counts as attempted, and attempts are never retried.
	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::SeqCst)
	}
}

#[derive(Default)]
struct State {
	fail_driver_create: bool,
	fail_launch_at: Option<usize>,
	fail_close_of: Vec<EngineKind>,
	fail_driver_close: bool,
	mislabel: HashMap<EngineKind, EngineKind>,
	launches: usize,
	drivers: Vec<HandleProbe>,
	engines: Vec<HandleProbe>,
}

/// Shared-state mock implementation of [`DriverConnector`].
///
/// Cloning yields a connector backed by the same registry, so a test
/// can keep one clone for assertions while the factory owns another.
#[derive(Clone, Default)]
pub struct MockConnector {
	state: Arc<Mutex<State>>,
}

impl MockConnector {
	pub fn new() -> Self {
		Self::default()
	}

	/// Makes every subsequent `create_driver` call fail.
	pub fn fail_driver_create(&self) {
		self.state.lock().fail_driver_create = true;
	}

	/// Makes the `nth` (zero-based, counted across all drivers)
	/// `launch_engine` call fail.
	pub fn fail_engine_launch_at(&self, nth: usize) {
		self.state.lock().fail_launch_at = Some(nth);
	}

	/// Makes `close` fail on every engine reporting `kind`.
	pub fn fail_engine_close(&self, kind: EngineKind) {
		self.state.lock().fail_close_of.push(kind);
	}

	/// Makes `close` fail on every driver.
	pub fn fail_driver_close(&self) {
		self.state.lock().fail_driver_close = true;
	}

	/// Makes engines launched as `requested` report `reported` instead,
	/// simulating a slot/kind mix-up at the call site.
	pub fn report_kind_as(&self, requested: EngineKind, reported: EngineKind) {
		self.state.lock().mislabel.insert(requested, reported);
	}

	/// Probes for every driver created so far, in creation order.
	pub fn driver_probes(&self) -> Vec<HandleProbe> {
		self.state.lock().drivers.clone()
	}

	/// Probes for every engine launched so far, in launch order.
	pub fn engine_probes(&self) -> Vec<HandleProbe> {
		self.state.lock().engines.clone()
	}

	/// Whether every handle created so far has had `close` attempted.
	pub fn all_closed(&self) -> bool {
		let state = self.state.lock();
		state
			.drivers
			.iter()
			.chain(state.engines.iter())
			.all(HandleProbe::is_closed)
	}
}

impl DriverConnector for MockConnector {
	fn create_driver(&self, _options: &CreateOptions) -> anyhow::Result<Box<dyn Driver>> {
		let mut state = self.state.lock();
		if state.fail_driver_create {
			bail!("mock: driver startup failed");
		}

		let closed = Arc::new(AtomicBool::new(false));
		state.drivers.push(HandleProbe {
			kind: None,
			closed: Arc::clone(&closed),
		});
		Ok(Box::new(MockDriver {
			state: Arc::clone(&self.state),
			closed,
		}))
	}
}

struct MockDriver {
	state: Arc<Mutex<State>>,
	closed: Arc<AtomicBool>,
}

impl Driver for MockDriver {
	fn launch_engine(
		&mut self,
		kind: EngineKind,
		_options: &LaunchOptions,
	) -> anyhow::Result<Box<dyn Engine>> {
		let mut state = self.state.lock();
		let nth = state.launches;
		state.launches += 1;

		if state.fail_launch_at == Some(nth) {
			bail!("mock: launch of {kind} engine failed");
		}

		let reported = state.mislabel.get(&kind).copied().unwrap_or(kind);
		let closed = Arc::new(AtomicBool::new(false));
		state.engines.push(HandleProbe {
			kind: Some(reported),
			closed: Arc::clone(&closed),
		});
		Ok(Box::new(MockEngine {
			state: Arc::clone(&self.state),
			kind: reported,
			closed,
		}))
	}

	fn close(&mut self) -> anyhow::Result<()> {
		self.closed.store(true, Ordering::SeqCst);
		if self.state.lock().fail_driver_close {
			bail!("mock: driver close failed");
		}
		Ok(())
	}
}

struct MockEngine {
	state: Arc<Mutex<State>>,
	kind: EngineKind,
	closed: Arc<AtomicBool>,
}

impl Engine for MockEngine {
	fn kind(&self) -> EngineKind {
		self.kind
	}

	fn close(&mut self) -> anyhow::Result<()> {
		self.closed.store(true, Ordering::SeqCst);
		if self.state.lock().fail_close_of.contains(&self.kind) {
			bail!("mock: {} engine close failed", self.kind);
		}
		Ok(())
	}
}
