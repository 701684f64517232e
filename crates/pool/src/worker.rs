use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use pw_automation::{Driver, Engine, EngineKind};
use tracing::{debug, warn};

use crate::bundle::ResourceBundle;
use crate::error::{Error, Result};

/// Unit of work executed against a worker's resource bundle.
pub type Task = Box<dyn FnOnce(&mut ResourceBundle) -> anyhow::Result<()> + Send + 'static>;

/// Execution context owning one [`ResourceBundle`] for its entire
/// lifetime.
///
/// A worker runs its task at most once and releases the bundle on every
/// exit path: normal return, task error, or panic. `run` consumes the
/// worker, so a terminated worker cannot be restarted by construction.
/// Dropping a worker that was never run also releases the bundle.
///
/// The task is optional: a worker without one exists purely to hold
/// resources for the caller to use through the accessors.
pub struct ScopedWorker {
	bundle: Option<ResourceBundle>,
	task: Option<Task>,
}

impl std::fmt::Debug for ScopedWorker {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ScopedWorker")
			.field("bundle", &self.bundle)
			.field("has_task", &self.task.is_some())
			.finish()
	}
}

impl ScopedWorker {
	pub fn new(bundle: ResourceBundle, task: Option<Task>) -> Self {
		ScopedWorker {
			bundle: Some(bundle),
			task,
		}
	}

	/// The bundle owned by this worker.
	pub fn bundle(&self) -> &ResourceBundle {
		// Only run() and drop() vacate the slot, and both consume the worker.
		self.bundle.as_ref().expect("bundle present until run or drop")
	}

	pub fn bundle_mut(&mut self) -> &mut ResourceBundle {
		self.bundle.as_mut().expect("bundle present until run or drop")
	}

	/// This worker's driver handle. Always present.
	pub fn driver(&self) -> &dyn Driver {
		self.bundle().driver()
	}

	/// This worker's engine of the given kind.
	///
	/// # Errors
	///
	/// [`Error::EngineNotConfigured`] when the worker's acquisition
	/// strategy never populated that slot.
	pub fn engine(&self, kind: EngineKind) -> Result<&dyn Engine> {
		self.bundle().engine(kind)
	}

	pub fn chromium(&self) -> Result<&dyn Engine> {
		self.engine(EngineKind::Chromium)
	}

	pub fn firefox(&self) -> Result<&dyn Engine> {
		self.engine(EngineKind::Firefox)
	}

	pub fn webkit(&self) -> Result<&dyn Engine> {
		self.engine(EngineKind::Webkit)
	}

	/// Runs the task (if any) to completion, then releases the bundle:
	/// engines in slot order, driver last.
	///
	/// Release happens unconditionally. A task panic is caught for the
	/// duration of the release and then resumed, so a pool thread still
	/// dies with the task's own payload. When both the task and the
	/// release fail, the task error is the one returned and the release
	/// failure is logged.
	pub fn run(mut self) -> Result<()> {
		let Some(mut bundle) = self.bundle.take() else {
			return Ok(());
		};
		let task = self.task.take();

		debug!(target = "pw_pool", has_task = task.is_some(), "worker running...");
		let outcome = match task {
			Some(task) => panic::catch_unwind(AssertUnwindSafe(|| task(&mut bundle))),
			None => Ok(Ok(())),
		};

		let released = bundle.release();

		match outcome {
			Err(payload) => {
				if let Err(err) = released {
					warn!(target = "pw_pool", error = %err, "release failed after task panic");
				}
				panic::resume_unwind(payload)
			}
			Ok(Err(task_err)) => {
				if let Err(err) = released {
					warn!(target = "pw_pool", error = %err, "release failed after task error");
				}
				Err(Error::Task(task_err))
			}
			Ok(Ok(())) => {
				released?;
				Ok(())
			}
		}
	}

	/// Moves this worker onto a dedicated OS thread and runs it there.
	///
	/// The thread is named so workers are recognizable in thread dumps.
	pub fn spawn(self) -> io::Result<JoinHandle<Result<()>>> {
		thread::Builder::new()
			.name("pw-worker".into())
			.spawn(move || self.run())
	}
}

impl Drop for ScopedWorker {
	fn drop(&mut self) {
		// Reached with a live bundle only when the worker was never run.
		if let Some(bundle) = self.bundle.take() {
			bundle.close_all_logged("worker dropped without running");
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::sync::atomic::{AtomicBool, Ordering};

	use anyhow::anyhow;
	use pw_automation::mock::MockConnector;
	use pw_automation::{CreateOptions, DriverConnector, LaunchOptions};

	use super::*;

	fn single_engine_worker(
		connector: &MockConnector,
		kind: EngineKind,
		task: Option<Task>,
	) -> ScopedWorker {
		let mut driver = connector.create_driver(&CreateOptions::default()).unwrap();
		let engine = driver
			.launch_engine(kind, &LaunchOptions::default())
			.unwrap();
		let (chromium, firefox, webkit) = match kind {
			EngineKind::Chromium => (Some(engine), None, None),
			EngineKind::Firefox => (None, Some(engine), None),
			EngineKind::Webkit => (None, None, Some(engine)),
		};
		let bundle = ResourceBundle::new(driver, chromium, firefox, webkit).unwrap();
		ScopedWorker::new(bundle, task)
	}

	#[test]
	fn accessors_follow_the_configured_slots() {
		let connector = MockConnector::new();
		let worker = single_engine_worker(&connector, EngineKind::Chromium, None);

		assert_eq!(worker.chromium().unwrap().kind(), EngineKind::Chromium);
		assert!(matches!(
			worker.firefox(),
			Err(Error::EngineNotConfigured(EngineKind::Firefox))
		));
		assert!(matches!(
			worker.webkit(),
			Err(Error::EngineNotConfigured(EngineKind::Webkit))
		));
	}

	#[test]
	fn run_without_task_still_releases() {
		let connector = MockConnector::new();
		let worker = single_engine_worker(&connector, EngineKind::Webkit, None);

		worker.run().unwrap();
		assert!(connector.all_closed());
	}

	#[test]
	fn task_sees_the_bundle_and_release_follows() {
		let connector = MockConnector::new();
		let ran = Arc::new(AtomicBool::new(false));
		let ran_probe = Arc::clone(&ran);
		let task: Task = Box::new(move |bundle| {
			assert_eq!(bundle.firefox()?.kind(), EngineKind::Firefox);
			ran_probe.store(true, Ordering::SeqCst);
			Ok(())
		});
		let worker = single_engine_worker(&connector, EngineKind::Firefox, Some(task));

		worker.run().unwrap();
		assert!(ran.load(Ordering::SeqCst));
		assert!(connector.all_closed());
	}

	#[test]
	fn task_error_is_surfaced_after_release() {
		let connector = MockConnector::new();
		let task: Task = Box::new(|_| Err(anyhow!("Boom")));
		let worker = single_engine_worker(&connector, EngineKind::Chromium, Some(task));

		let err = worker.run().unwrap_err();
		assert!(connector.all_closed());
		assert!(matches!(&err, Error::Task(inner) if inner.to_string() == "Boom"));
	}

	#[test]
	fn task_error_outranks_release_error() {
		let connector = MockConnector::new();
		connector.fail_engine_close(EngineKind::Chromium);
		connector.fail_driver_close();
		let task: Task = Box::new(|_| Err(anyhow!("Boom")));
		let worker = single_engine_worker(&connector, EngineKind::Chromium, Some(task));

		let err = worker.run().unwrap_err();
		assert!(connector.all_closed());
		assert!(matches!(&err, Error::Task(inner) if inner.to_string() == "Boom"));
	}

	#[test]
	fn release_error_surfaces_when_task_succeeds() {
		let connector = MockConnector::new();
		connector.fail_engine_close(EngineKind::Webkit);
		let task: Task = Box::new(|_| Ok(()));
		let worker = single_engine_worker(&connector, EngineKind::Webkit, Some(task));

		let err = worker.run().unwrap_err();
		assert!(connector.all_closed());
		assert!(matches!(err, Error::Release(_)));
	}

	#[test]
	fn panic_in_task_releases_then_resumes() {
		let connector = MockConnector::new();
		let task: Task = Box::new(|_| panic!("Boom"));
		let worker = single_engine_worker(&connector, EngineKind::Firefox, Some(task));

		let payload = panic::catch_unwind(AssertUnwindSafe(|| worker.run())).unwrap_err();
		assert!(connector.all_closed());
		assert_eq!(payload.downcast_ref::<&str>(), Some(&"Boom"));
	}

	#[test]
	fn dropping_an_unstarted_worker_releases() {
		let connector = MockConnector::new();
		let worker = single_engine_worker(&connector, EngineKind::Chromium, None);

		drop(worker);
		assert!(connector.all_closed());
	}
}
