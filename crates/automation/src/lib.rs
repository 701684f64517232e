//! Boundary types and traits for the automation library.
//!
//! The pool core never talks to a concrete automation library; it goes
//! through the traits defined here: a [`DriverConnector`] creates
//! [`Driver`] processes, and a driver launches [`Engine`] instances of a
//! given [`EngineKind`]. Option structs are forwarded to the connector
//! verbatim and carry no semantics of their own.
//!
//! The [`mock`] module is an in-memory implementation of the whole
//! surface, used by the pool crate's tests and usable as a template for
//! real connectors.

mod connector;
mod handles;
mod kind;
pub mod mock;
mod options;

pub use connector::DriverConnector;
pub use handles::{Driver, Engine};
pub use kind::EngineKind;
pub use options::{CreateOptions, LaunchOptions};
