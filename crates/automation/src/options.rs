use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Options forwarded verbatim to driver-process creation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOptions {
	/// Explicit driver executable location, overriding connector discovery.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub driver_path: Option<PathBuf>,
	/// Extra environment variables for the driver process.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub env: Option<HashMap<String, String>>,
	/// Driver startup timeout in milliseconds.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub timeout_ms: Option<u64>,
}

/// Options forwarded verbatim to engine launch.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOptions {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub headless: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub args: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub executable_path: Option<PathBuf>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub remote_debugging_port: Option<u16>,
	/// Per-action slowdown in milliseconds, for debugging.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub slow_mo_ms: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub timeout_ms: Option<u64>,
	/// Engine-specific preferences, passed through untyped.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub firefox_user_prefs: Option<serde_json::Value>,
}
