//! Viewer and simulation settings.
//!
//! Defaults are compiled in. The page query string may override the viewer
//! settings, e.g. `/?endpoint=/api/get_graph&max_edges=500&labels=40`.

use reqwest::Url;

use crate::error::GraphError;

/// Relative path of the graph endpoint served next to the page.
pub const DEFAULT_ENDPOINT: &str = "/api/get_graph";

/// Settings for one page load.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
	/// Graph endpoint, absolute or relative to the page URL.
	pub endpoint: String,
	/// Payloads with more edges than this are rejected before layout.
	pub max_edges: usize,
	/// Draw every node label while the graph has at most this many nodes.
	pub label_threshold: usize,
	/// Layout physics.
	pub simulation: SimulationConfig,
}

impl Default for ViewerConfig {
	fn default() -> Self {
		Self {
			endpoint: DEFAULT_ENDPOINT.into(),
			max_edges: 5_000,
			label_threshold: 60,
			simulation: SimulationConfig::default(),
		}
	}
}

impl ViewerConfig {
	/// Apply overrides looked up by query key. Unparsable numbers are ignored.
	pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
		if let Some(endpoint) = lookup("endpoint").filter(|e| !e.trim().is_empty()) {
			self.endpoint = endpoint.trim().to_string();
		}
		if let Some(limit) = lookup("max_edges").and_then(|v| v.parse().ok()) {
			self.max_edges = limit;
		}
		if let Some(threshold) = lookup("labels").and_then(|v| v.parse().ok()) {
			self.label_threshold = threshold;
		}
		self
	}

	/// Resolve the endpoint against the page URL.
	pub fn resolve_endpoint(&self, base: &str) -> Result<Url, GraphError> {
		let invalid = |message: String| GraphError::InvalidEndpoint {
			endpoint: self.endpoint.clone(),
			message,
		};
		match Url::parse(&self.endpoint) {
			Ok(url) => Ok(url),
			Err(_) => Url::parse(base)
				.and_then(|base| base.join(&self.endpoint))
				.map_err(|e| invalid(e.to_string())),
		}
	}
}

/// Force simulation parameters, d3-force style.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
	/// Rest length of a link.
	pub link_distance: f64,
	/// Many-body strength; negative values repel.
	pub charge_strength: f64,
	/// Pairs closer than this are treated as this far apart.
	pub charge_distance_min: f64,
	/// Strength of the pull towards the viewport midpoint, in `[0, 1]`.
	pub center_strength: f64,
	/// The simulation stops once alpha falls below this.
	pub alpha_min: f64,
	/// Fraction of the remaining distance to `alpha_target` covered per tick.
	pub alpha_decay: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Hard cap on ticks run without user interaction.
	pub max_ticks: usize,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			link_distance: 60.0,
			charge_strength: -120.0,
			charge_distance_min: 1.0,
			center_strength: 1.0,
			alpha_min,
			// reaches alpha_min after ~300 ticks
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			velocity_decay: 0.4,
			max_ticks: 600,
		}
	}
}
