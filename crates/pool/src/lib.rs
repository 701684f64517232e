//! Thread-scoped ownership of automation driver and engine handles.
//!
//! Driver processes and the browser engines they spawn are expensive
//! and not safe for concurrent use. This crate binds one validated
//! bundle of them to one worker for that worker's entire lifetime:
//!
//! - [`ResourceBundle`] — one driver plus up to three kind-tagged
//!   engine slots, validated atomically, rolled back on failure;
//! - [`ScopedWorker`] — runs one unit of work against its bundle and
//!   releases every handle on every exit path, engines first, driver
//!   last;
//! - [`AcquireStrategy`] / [`AcquireResources`] — built-in and custom
//!   ways of bringing a bundle into being;
//! - [`WorkerFactory`] — a shareable, immutable recipe that turns tasks
//!   into pool-ready workers, one fresh bundle per call.
//!
//! The automation library itself stays behind the trait boundary in
//! [`pw_automation`]; this crate only encodes the ownership contract.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use pw_automation::EngineKind;
//! use pw_pool::WorkerFactory;
//!
//! # fn connector() -> Arc<dyn pw_automation::DriverConnector> { unimplemented!() }
//! let factory = WorkerFactory::of_chromium(connector());
//!
//! let worker = factory.new_worker(|bundle| {
//! 	let chromium = bundle.engine(EngineKind::Chromium)?;
//! 	// drive the engine...
//! 	let _ = chromium;
//! 	Ok(())
//! })?;
//!
//! let handle = worker.spawn()?;
//! handle.join().expect("worker thread panicked")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

mod bundle;
mod error;
mod factory;
mod strategy;
mod worker;

pub use bundle::ResourceBundle;
pub use error::{CloseFailure, Error, ReleaseError, ResourceLabel, Result};
pub use factory::WorkerFactory;
pub use strategy::{AcquireResources, AcquireStrategy};
pub use worker::{ScopedWorker, Task};
