//! Route tables as static, versioned configuration.
//!
//! ```json
//! {
//!   "version": 1,
//!   "base": "/",
//!   "routes": [
//!     { "path": "/", "name": "login", "handler": "LoginView" },
//!     { "path": "/clients/:id", "handler": "ClientView" }
//!   ]
//! }
//! ```

use crate::router::{RouteTable, RouteTableError};
use serde::Deserialize;
use tracing::{debug, instrument};

/// The only configuration schema version this crate understands.
pub const ROUTE_TABLE_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("malformed route configuration")]
	Json(#[from] serde_json::Error),
	#[error("unsupported route configuration version {found} (expected {})", ROUTE_TABLE_VERSION)]
	UnsupportedVersion { found: u32 },
	#[error(transparent)]
	Table(#[from] RouteTableError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteTableConfig {
	pub version: u32,
	#[serde(default)]
	pub base: Option<String>,
	pub routes: Vec<RouteConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
	pub path: String,
	#[serde(default)]
	pub name: Option<String>,
	/// Identifies the view the host renders for this route.
	pub handler: String,
}

impl RouteTableConfig {
	/// # Errors
	///
	/// Iff `json` isn't a well-formed configuration document.
	pub fn from_json(json: &str) -> Result<Self, ConfigError> {
		Ok(serde_json::from_str(json)?)
	}

	/// Builds the table, keeping the configured route order.
	///
	/// # Errors
	///
	/// Iff the version is unsupported or the routes don't form a valid table.
	#[instrument(skip(self), fields(version = self.version, routes = self.routes.len()))]
	pub fn into_table(self) -> Result<RouteTable<String>, ConfigError> {
		if self.version != ROUTE_TABLE_VERSION {
			return Err(ConfigError::UnsupportedVersion { found: self.version });
		}

		let mut builder = RouteTable::builder();
		if let Some(base) = self.base {
			builder = builder.base(base);
		}
		for route in self.routes {
			builder = match route.name {
				Some(name) => builder.named(name, route.path, route.handler),
				None => builder.route(route.path, route.handler),
			};
		}

		let table = builder.build()?;
		debug!("Loaded route configuration.");
		Ok(table)
	}
}
