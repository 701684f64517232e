use pw_automation::EngineKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// Bundle construction saw every engine slot empty. Configuration
	/// bug, never retried.
	#[error("at least one engine must be configured")]
	NoEngine,

	/// A populated slot's handle reported a different engine family
	/// than the slot it was placed in.
	#[error("engine slot {slot} expected a {slot} handle but received {actual}")]
	KindMismatch { slot: EngineKind, actual: EngineKind },

	/// An accessor asked for an engine slot the acquisition strategy
	/// never populated. Caller bug, not a transient condition.
	#[error("the configuration of this worker does not use {0}")]
	EngineNotConfigured(EngineKind),

	/// Driver startup or engine launch failure from the automation
	/// library, passed through unwrapped.
	#[error(transparent)]
	Automation(#[from] anyhow::Error),

	/// The unit of work itself failed. Resources were still released;
	/// this error outranks any release failure.
	#[error("task failed: {0}")]
	Task(#[source] anyhow::Error),

	#[error(transparent)]
	Release(#[from] ReleaseError),
}

/// Aggregate of per-handle close failures from one release pass.
///
/// Release closes every handle independently, so a single pass can
/// accumulate several failures; they are reported together, in close
/// order, rather than electing one.
#[derive(Debug, Error)]
#[error("failed to close {} handle(s): {}", .failures.len(), describe(.failures))]
pub struct ReleaseError {
	pub failures: Vec<CloseFailure>,
}

/// One failed close during release.
#[derive(Debug)]
pub struct CloseFailure {
	pub resource: ResourceLabel,
	pub error: anyhow::Error,
}

/// Which handle of a bundle a close failure refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceLabel {
	Engine(EngineKind),
	Driver,
}

impl std::fmt::Display for ResourceLabel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ResourceLabel::Engine(kind) => write!(f, "{kind} engine"),
			ResourceLabel::Driver => write!(f, "driver"),
		}
	}
}

fn describe(failures: &[CloseFailure]) -> String {
	failures
		.iter()
		.map(|failure| format!("{}: {}", failure.resource, failure.error))
		.collect::<Vec<_>>()
		.join("; ")
}
