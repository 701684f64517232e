use downcast_rs::{Downcast, impl_downcast};

use crate::kind::EngineKind;
use crate::options::LaunchOptions;

/// A live browser-engine instance spawned from a driver.
///
/// Handles are not safe for concurrent use. Each engine is exclusively
/// owned by whoever acquired it until it is closed; sharing one across
/// threads is a contract violation of the underlying library, not
/// something this layer mediates.
pub trait Engine: Downcast + Send {
	/// Engine family this handle was launched as.
	fn kind(&self) -> EngineKind;

	/// Closes the engine instance.
	///
	/// Double-close behavior is the automation library's contract; this
	/// layer calls it at most once per handle.
	fn close(&mut self) -> anyhow::Result<()>;
}
impl_downcast!(Engine);

/// A running automation driver process, root of the engines it spawns.
///
/// A driver must outlive every engine launched from it, which is why
/// bundle release always closes the driver last.
pub trait Driver: Downcast + Send {
	/// Launches a new engine of the given family.
	fn launch_engine(
		&mut self,
		kind: EngineKind,
		options: &LaunchOptions,
	) -> anyhow::Result<Box<dyn Engine>>;

	/// Shuts the driver process down.
	fn close(&mut self) -> anyhow::Result<()>;
}
impl_downcast!(Driver);
