use pw_automation::{Driver, Engine, EngineKind};
use tracing::warn;

use crate::error::{CloseFailure, Error, ReleaseError, ResourceLabel, Result};

/// Validated set of one driver handle plus the engines configured for a
/// worker.
///
/// Slots are positionally fixed (chromium, firefox, webkit) and each is
/// either empty or holds a handle of the slot's own kind; the slot set
/// never changes after construction. A bundle is released exactly once:
/// by the owning [`ScopedWorker`](crate::ScopedWorker) at the end of its
/// unit of work, or by [`ResourceBundle::new`] itself when validation
/// fails after partial acquisition.
pub struct ResourceBundle {
	driver: Box<dyn Driver>,
	chromium: Option<Box<dyn Engine>>,
	firefox: Option<Box<dyn Engine>>,
	webkit: Option<Box<dyn Engine>>,
}

impl std::fmt::Debug for ResourceBundle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ResourceBundle")
			.field("chromium", &self.chromium.is_some())
			.field("firefox", &self.firefox.is_some())
			.field("webkit", &self.webkit.is_some())
			.finish_non_exhaustive()
	}
}

impl ResourceBundle {
	/// Validates and assembles a bundle.
	///
	/// On any validation failure every handle passed in, driver
	/// included, is closed before the error returns, so a failed
	/// construction never leaks a live resource. Close failures during
	/// that rollback are logged and never outrank the validation error.
	///
	/// # Errors
	///
	/// [`Error::NoEngine`] when all three slots are empty;
	/// [`Error::KindMismatch`] when a populated slot's handle reports a
	/// different engine family.
	pub fn new(
		driver: Box<dyn Driver>,
		chromium: Option<Box<dyn Engine>>,
		firefox: Option<Box<dyn Engine>>,
		webkit: Option<Box<dyn Engine>>,
	) -> Result<Self> {
		let bundle = ResourceBundle {
			driver,
			chromium,
			firefox,
			webkit,
		};

		if let Err(err) = bundle.validate() {
			bundle.close_all_logged("failed bundle construction");
			return Err(err);
		}
		Ok(bundle)
	}

	fn validate(&self) -> Result<()> {
		if self.chromium.is_none() && self.firefox.is_none() && self.webkit.is_none() {
			return Err(Error::NoEngine);
		}

		for slot in EngineKind::ALL {
			if let Some(engine) = self.slot(slot) {
				let actual = engine.kind();
				if actual != slot {
					return Err(Error::KindMismatch { slot, actual });
				}
			}
		}
		Ok(())
	}

	/// The driver handle. Always present.
	pub fn driver(&self) -> &dyn Driver {
		self.driver.as_ref()
	}

	pub fn driver_mut(&mut self) -> &mut dyn Driver {
		self.driver.as_mut()
	}

	/// The engine configured for `kind`.
	///
	/// # Errors
	///
	/// [`Error::EngineNotConfigured`] when the slot was never populated
	/// by the acquisition strategy.
	pub fn engine(&self, kind: EngineKind) -> Result<&dyn Engine> {
		self.slot(kind).ok_or(Error::EngineNotConfigured(kind))
	}

	pub fn engine_mut(&mut self, kind: EngineKind) -> Result<&mut dyn Engine> {
		self.slot_storage_mut(kind)
			.as_deref_mut()
			.ok_or(Error::EngineNotConfigured(kind))
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

	/// Whether the slot for `kind` is populated.
	pub fn is_configured(&self, kind: EngineKind) -> bool {
		self.slot(kind).is_some()
	}

	fn slot(&self, kind: EngineKind) -> Option<&dyn Engine> {
		let storage = match kind {
			EngineKind::Chromium => &self.chromium,
			EngineKind::Firefox => &self.firefox,
			EngineKind::Webkit => &self.webkit,
		};
		storage.as_deref()
	}

	fn slot_storage_mut(&mut self, kind: EngineKind) -> &mut Option<Box<dyn Engine>> {
		match kind {
			EngineKind::Chromium => &mut self.chromium,
			EngineKind::Firefox => &mut self.firefox,
			EngineKind::Webkit => &mut self.webkit,
		}
	}

	/// Closes every held handle: engines in slot order, driver last.
	///
	/// Each close is attempted even when an earlier one fails; failures
	/// are collected into a single [`ReleaseError`]. Never retried.
	pub(crate) fn release(mut self) -> std::result::Result<(), ReleaseError> {
		let mut failures = Vec::new();

		for kind in EngineKind::ALL {
			if let Some(mut engine) = self.slot_storage_mut(kind).take() {
				if let Err(error) = engine.close() {
					failures.push(CloseFailure {
						resource: ResourceLabel::Engine(kind),
						error,
					});
				}
			}
		}
		// Driver last: it must outlive the engines it spawned.
		if let Err(error) = self.driver.close() {
			failures.push(CloseFailure {
				resource: ResourceLabel::Driver,
				error,
			});
		}

		if failures.is_empty() {
			Ok(())
		} else {
			Err(ReleaseError { failures })
		}
	}

	/// Release with failures demoted to log events, for paths where
	/// another error already owns the outcome.
	pub(crate) fn close_all_logged(self, context: &'static str) {
		if let Err(err) = self.release() {
			warn!(target = "pw_pool", error = %err, context, "best-effort release failed");
		}
	}
}
