use crate::handles::Driver;
use crate::options::CreateOptions;

/// Entry point into the automation library: creates driver processes.
///
/// Connectors are shared by worker factories across producer threads,
/// so implementations must be `Send + Sync`; the handles they hand out
/// need not be. Errors are surfaced as-is (`anyhow::Error`) and never
/// wrapped by the pool layer.
pub trait DriverConnector: Send + Sync {
	fn create_driver(&self, options: &CreateOptions) -> anyhow::Result<Box<dyn Driver>>;
}
