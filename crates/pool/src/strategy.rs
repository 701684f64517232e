use std::sync::Arc;

use pw_automation::{CreateOptions, Driver, DriverConnector, Engine, EngineKind, LaunchOptions};
use tracing::{debug, warn};

use crate::bundle::ResourceBundle;
use crate::error::Result;

/// Builds a validated [`ResourceBundle`] from launch parameters.
///
/// This is the extension seam for custom acquisition: implement it to
/// control how a worker's driver and engines come into being, then hand
/// it to [`WorkerFactory::of_custom`](crate::WorkerFactory::of_custom).
/// The built-in presets live in [`AcquireStrategy`].
///
/// `acquire` must uphold the leak-free guarantee: if it fails partway,
/// everything it already acquired has to be closed before the error
/// propagates. Going through [`ResourceBundle::new`] covers the
/// validation half of that automatically.
pub trait AcquireResources: Send + Sync {
	fn acquire(&self) -> Result<ResourceBundle>;
}

/// Built-in acquisition presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcquireStrategy {
	/// One driver plus a single engine of the given kind, placed in the
	/// matching slot.
	Single(EngineKind),
	/// One driver plus one engine of every kind.
	All,
}

impl AcquireStrategy {
	fn kinds(self) -> &'static [EngineKind] {
		match self {
			AcquireStrategy::Single(EngineKind::Chromium) => &[EngineKind::Chromium],
			AcquireStrategy::Single(EngineKind::Firefox) => &[EngineKind::Firefox],
			AcquireStrategy::Single(EngineKind::Webkit) => &[EngineKind::Webkit],
			AcquireStrategy::All => &EngineKind::ALL,
		}
	}
}

/// A built-in strategy bound to its connector and launch parameters.
pub(crate) struct PresetAcquire {
	pub connector: Arc<dyn DriverConnector>,
	pub strategy: AcquireStrategy,
	pub create_options: CreateOptions,
	pub launch_options: LaunchOptions,
}

impl AcquireResources for PresetAcquire {
	fn acquire(&self) -> Result<ResourceBundle> {
		debug!(
			target = "pw_pool",
			strategy = ?self.strategy,
			"acquiring resource bundle..."
		);
		let mut driver = self.connector.create_driver(&self.create_options)?;

		let mut slots: [Option<Box<dyn Engine>>; 3] = [None, None, None];
		for &kind in self.strategy.kinds() {
			match driver.launch_engine(kind, &self.launch_options) {
				Ok(engine) => slots[slot_index(kind)] = Some(engine),
				Err(err) => {
					// Launch failed partway through: close everything
					// acquired so far before propagating.
					rollback(driver, slots);
					return Err(err.into());
				}
			}
		}

		let [chromium, firefox, webkit] = slots;
		ResourceBundle::new(driver, chromium, firefox, webkit)
	}
}

fn slot_index(kind: EngineKind) -> usize {
	match kind {
		EngineKind::Chromium => 0,
		EngineKind::Firefox => 1,
		EngineKind::Webkit => 2,
	}
}

fn rollback(mut driver: Box<dyn Driver>, slots: [Option<Box<dyn Engine>>; 3]) {
	for mut engine in slots.into_iter().flatten() {
		if let Err(err) = engine.close() {
			warn!(target = "pw_pool", error = %err, "engine close during acquisition rollback failed");
		}
	}
	if let Err(err) = driver.close() {
		warn!(target = "pw_pool", error = %err, "driver close during acquisition rollback failed");
	}
}

#[cfg(test)]
mod tests {
	use pw_automation::mock::MockConnector;

	use super::*;
	use crate::error::Error;

	fn preset(connector: &MockConnector, strategy: AcquireStrategy) -> PresetAcquire {
		PresetAcquire {
			connector: Arc::new(connector.clone()),
			strategy,
			create_options: CreateOptions::default(),
			launch_options: LaunchOptions::default(),
		}
	}

	#[test]
	fn single_preset_populates_only_its_slot() {
		let connector = MockConnector::new();
		let bundle = preset(&connector, AcquireStrategy::Single(EngineKind::Firefox))
			.acquire()
			.unwrap();

		assert!(bundle.is_configured(EngineKind::Firefox));
		assert!(!bundle.is_configured(EngineKind::Chromium));
		assert!(!bundle.is_configured(EngineKind::Webkit));
	}

	#[test]
	fn all_preset_populates_every_slot() {
		let connector = MockConnector::new();
		let bundle = preset(&connector, AcquireStrategy::All).acquire().unwrap();

		for kind in EngineKind::ALL {
			assert_eq!(bundle.engine(kind).unwrap().kind(), kind);
		}
	}

	#[test]
	fn driver_creation_failure_propagates_unwrapped() {
		let connector = MockConnector::new();
		connector.fail_driver_create();

		let err = preset(&connector, AcquireStrategy::All).acquire().unwrap_err();
		assert!(matches!(err, Error::Automation(_)));
		assert!(err.to_string().contains("driver startup failed"));
	}

	#[test]
	fn mid_launch_failure_rolls_back_everything() {
		let connector = MockConnector::new();
		// Second of three launches fails.
		connector.fail_engine_launch_at(1);

		let err = preset(&connector, AcquireStrategy::All).acquire().unwrap_err();
		assert!(matches!(err, Error::Automation(_)));
		// The chromium engine that did launch, and the driver, are closed.
		assert_eq!(connector.engine_probes().len(), 1);
		assert!(connector.all_closed());
	}

	#[test]
	fn mislabeled_engine_fails_validation_without_leaking() {
		let connector = MockConnector::new();
		connector.report_kind_as(EngineKind::Webkit, EngineKind::Chromium);

		let err = preset(&connector, AcquireStrategy::Single(EngineKind::Webkit))
			.acquire()
			.unwrap_err();
		assert!(matches!(
			err,
			Error::KindMismatch {
				slot: EngineKind::Webkit,
				actual: EngineKind::Chromium,
			}
		));
		assert!(connector.all_closed());
	}
}
