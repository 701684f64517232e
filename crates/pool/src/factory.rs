use std::sync::Arc;

use pw_automation::{CreateOptions, DriverConnector, EngineKind, LaunchOptions};

use crate::bundle::ResourceBundle;
use crate::error::Result;
use crate::strategy::{AcquireResources, AcquireStrategy, PresetAcquire};
use crate::worker::{ScopedWorker, Task};

/// Produces pool-ready workers from a fixed acquisition configuration.
///
/// A factory is immutable after construction and safe to share across
/// producer threads (`Clone` is a cheap handle copy). Every
/// [`new_worker`](WorkerFactory::new_worker) call acquires a fresh
/// bundle, so no two workers it produces ever share a driver or engine
/// handle.
#[derive(Clone)]
pub struct WorkerFactory {
	acquire: Arc<dyn AcquireResources>,
}

impl WorkerFactory {
	/// Factory launching one engine of every kind per worker.
	pub fn of_default(connector: Arc<dyn DriverConnector>) -> Self {
		Self::of_strategy(
			connector,
			AcquireStrategy::All,
			CreateOptions::default(),
			LaunchOptions::default(),
		)
	}

	/// Factory launching a single chromium engine per worker.
	pub fn of_chromium(connector: Arc<dyn DriverConnector>) -> Self {
		Self::of_strategy(
			connector,
			AcquireStrategy::Single(EngineKind::Chromium),
			CreateOptions::default(),
			LaunchOptions::default(),
		)
	}

	/// Factory launching a single firefox engine per worker.
	pub fn of_firefox(connector: Arc<dyn DriverConnector>) -> Self {
		Self::of_strategy(
			connector,
			AcquireStrategy::Single(EngineKind::Firefox),
			CreateOptions::default(),
			LaunchOptions::default(),
		)
	}

	/// Factory launching a single webkit engine per worker.
	pub fn of_webkit(connector: Arc<dyn DriverConnector>) -> Self {
		Self::of_strategy(
			connector,
			AcquireStrategy::Single(EngineKind::Webkit),
			CreateOptions::default(),
			LaunchOptions::default(),
		)
	}

	/// Factory for an explicit preset and explicit options. The options
	/// are stored once and forwarded verbatim to every acquisition.
	pub fn of_strategy(
		connector: Arc<dyn DriverConnector>,
		strategy: AcquireStrategy,
		create_options: CreateOptions,
		launch_options: LaunchOptions,
	) -> Self {
		WorkerFactory {
			acquire: Arc::new(PresetAcquire {
				connector,
				strategy,
				create_options,
				launch_options,
			}),
		}
	}

	/// Factory driven by a caller-supplied acquisition strategy.
	///
	/// This is the seam for plugging in custom resource acquisition
	/// without touching the factory or the worker.
	pub fn of_custom(acquire: impl AcquireResources + 'static) -> Self {
		WorkerFactory {
			acquire: Arc::new(acquire),
		}
	}

	/// Acquires a fresh bundle and pairs it with `task` into a
	/// startable worker.
	///
	/// # Errors
	///
	/// Whatever the acquisition strategy surfaces: collaborator
	/// failures or bundle-validation errors. Either way nothing
	/// acquired along the way is left open.
	pub fn new_worker(
		&self,
		task: impl FnOnce(&mut ResourceBundle) -> anyhow::Result<()> + Send + 'static,
	) -> Result<ScopedWorker> {
		let bundle = self.acquire.acquire()?;
		let task: Task = Box::new(task);
		Ok(ScopedWorker::new(bundle, Some(task)))
	}

	/// Acquires a fresh bundle into a worker with no task, for callers
	/// that drive the resources directly through the accessors.
	pub fn new_idle_worker(&self) -> Result<ScopedWorker> {
		let bundle = self.acquire.acquire()?;
		Ok(ScopedWorker::new(bundle, None))
	}
}

#[cfg(test)]
mod tests {
	use pw_automation::mock::MockConnector;

	use super::*;
	use crate::error::Error;

	#[test]
	fn workers_never_share_handles() {
		let connector = MockConnector::new();
		let factory = WorkerFactory::of_chromium(Arc::new(connector.clone()));

		let first = factory.new_idle_worker().unwrap();
		let second = factory.new_idle_worker().unwrap();

		// Two drivers and two engines exist; each worker closes only its own.
		assert_eq!(connector.driver_probes().len(), 2);
		assert_eq!(connector.engine_probes().len(), 2);

		first.run().unwrap();
		assert!(connector.driver_probes()[0].is_closed());
		assert!(!connector.driver_probes()[1].is_closed());

		second.run().unwrap();
		assert!(connector.all_closed());
	}

	#[test]
	fn custom_strategy_plugs_in_without_touching_the_worker() {
		struct FirefoxOnly {
			connector: MockConnector,
		}

		impl AcquireResources for FirefoxOnly {
			fn acquire(&self) -> Result<ResourceBundle> {
				let mut driver = self.connector.create_driver(&CreateOptions::default())?;
				let firefox =
					driver.launch_engine(EngineKind::Firefox, &LaunchOptions::default())?;
				ResourceBundle::new(driver, None, Some(firefox), None)
			}
		}

		let connector = MockConnector::new();
		let factory = WorkerFactory::of_custom(FirefoxOnly {
			connector: connector.clone(),
		});

		let worker = factory.new_idle_worker().unwrap();
		assert_eq!(worker.firefox().unwrap().kind(), EngineKind::Firefox);
		assert!(matches!(
			worker.chromium(),
			Err(Error::EngineNotConfigured(EngineKind::Chromium))
		));
		worker.run().unwrap();
		assert!(connector.all_closed());
	}

	#[test]
	fn acquisition_failure_surfaces_from_new_worker() {
		let connector = MockConnector::new();
		connector.fail_driver_create();
		let factory = WorkerFactory::of_default(Arc::new(connector));

		let err = factory.new_worker(|_| Ok(())).unwrap_err();
		assert!(matches!(err, Error::Automation(_)));
	}
}
