use serde::{Deserialize, Serialize};

/// Browser engine family an engine handle belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
	/// Chromium-based browser (Chrome, Edge)
	#[default]
	Chromium,
	/// Mozilla Firefox
	Firefox,
	/// WebKit (Safari)
	Webkit,
}

impl EngineKind {
	/// Every engine kind, in fixed slot order.
	///
	/// This order is load-bearing: bundle slots, engine launch and
	/// engine release all follow it.
	pub const ALL: [EngineKind; 3] = [EngineKind::Chromium, EngineKind::Firefox, EngineKind::Webkit];

	pub fn as_str(self) -> &'static str {
		match self {
			EngineKind::Chromium => "chromium",
			EngineKind::Firefox => "firefox",
			EngineKind::Webkit => "webkit",
		}
	}
}

impl std::fmt::Display for EngineKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for EngineKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"chromium" => Ok(EngineKind::Chromium),
			"firefox" => Ok(EngineKind::Firefox),
			"webkit" => Ok(EngineKind::Webkit),
			other => Err(format!("unknown engine kind: {other}")),
		}
	}
}
