use super::pattern::{is_query_or_fragment, split_path, Params, PatternError, RoutePattern, Segment};
use core::fmt::{self, Debug, Formatter};
use hashbrown::HashSet;
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteTableError {
	#[error(transparent)]
	Pattern(#[from] PatternError),
	#[error("route name {0:?} is used more than once")]
	DuplicateName(String),
	#[error("base path {0:?} must start with '/'")]
	InvalidBase(String),
}

/// No entry of the table matched.
///
/// Hosts that want a guaranteed fallback add a last entry matching `/*rest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no route matches the path")]
pub struct NoRoute;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReverseError {
	#[error("no route is named {0:?}")]
	UnknownRoute(String),
	#[error("route {route:?} needs a value for parameter {param:?}")]
	MissingParameter { route: String, param: String },
	#[error("the value for parameter {param:?} of route {route:?} can't be spelled in its path")]
	InvalidParameter { route: String, param: String },
}

pub struct RouteEntry<H> {
	pattern: RoutePattern,
	name: Option<String>,
	handler: H,
}
impl<H> RouteEntry<H> {
	pub fn pattern(&self) -> &RoutePattern {
		&self.pattern
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn handler(&self) -> &H {
		&self.handler
	}
}
impl<H: Debug> Debug for RouteEntry<H> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteEntry")
			.field("pattern", &self.pattern.as_str())
			.field("name", &self.name)
			.field("handler", &self.handler)
			.finish()
	}
}

/// The outcome of a successful [`RouteTable::resolve`].
#[derive(Debug, PartialEq, Eq)]
pub struct RouteMatch<'a, H> {
	pub handler: &'a H,
	pub params: Params,
	pub name: Option<&'a str>,
	pub pattern: &'a RoutePattern,
}
impl<'a, H> RouteMatch<'a, H> {
	#[must_use]
	pub fn into_parts(self) -> (&'a H, Params) {
		(self.handler, self.params)
	}
}

/// An ordered, immutable list of routes. The first entry whose pattern matches a path wins.
///
/// Resolution only reads the table, so one table can be shared freely (it is [`Sync`] iff `H` is).
#[derive(Debug)]
pub struct RouteTable<H> {
	entries: Vec<RouteEntry<H>>,
	base: Option<String>,
}
impl<H> Default for RouteTable<H> {
	fn default() -> Self {
		Self { entries: Vec::new(), base: None }
	}
}
impl<H> RouteTable<H> {
	#[must_use]
	pub fn builder() -> RouteTableBuilder<H> {
		RouteTableBuilder::new()
	}

	/// Builds an unnamed table from `(pattern, handler)` pairs, keeping their order.
	///
	/// # Errors
	///
	/// Iff a pattern is malformed.
	pub fn new<P: Into<String>>(routes: impl IntoIterator<Item = (P, H)>) -> Result<Self, RouteTableError> {
		routes
			.into_iter()
			.fold(Self::builder(), |builder, (pattern, handler)| builder.route(pattern, handler))
			.build()
	}

	/// Selects the first route matching `path` and binds its parameters.
	///
	/// A query string or fragment is ignored, as is the table's [base](`RouteTableBuilder::base`).
	/// `path` must be absolute, like the patterns it is matched against.
	///
	/// # Errors
	///
	/// [`NoRoute`] iff no entry matches, including when `path` is relative or lies outside the base.
	#[instrument(skip_all)]
	pub fn resolve(&self, path: &str) -> Result<RouteMatch<'_, H>, NoRoute> {
		if !path.starts_with('/') {
			debug!("Path is not absolute.");
			return Err(NoRoute);
		}
		let path = path.find(is_query_or_fragment).map_or(path, |end| &path[..end]);
		let path = match &self.base {
			Some(base) => strip_base(base, path).ok_or_else(|| {
				debug!("Path lies outside the base.");
				NoRoute
			})?,
			None => path,
		};

		let segments = split_path(path);
		for entry in &self.entries {
			if let Some(params) = entry.pattern.match_segments(&segments) {
				if cfg!(feature = "dangerous-logging") {
					debug!(path, ?params, route = entry.pattern.as_str(), "Resolved.");
				} else {
					debug!(segments = segments.len(), route = entry.pattern.as_str(), "Resolved.");
				}
				return Ok(RouteMatch {
					handler: &entry.handler,
					params,
					name: entry.name(),
					pattern: &entry.pattern,
				});
			}
		}

		if cfg!(feature = "dangerous-logging") {
			debug!(path, "No route.");
		} else {
			debug!(segments = segments.len(), "No route.");
		}
		Err(NoRoute)
	}

	/// Builds the path for the route called `name`, including the base.
	///
	/// # Errors
	///
	/// Iff there's no such route, or a parameter it binds is missing from `params` or can't be spelled as a path.
	///
	/// A value can't be spelled if it contains `?` or `#`, or, for a `:` parameter, if it is empty or contains `/`.
	/// The result always [resolves](`RouteTable::resolve`) to the given values.
	pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Result<String, ReverseError> {
		let entry = self.route_named(name).ok_or_else(|| ReverseError::UnknownRoute(name.to_owned()))?;
		let lookup = |param: &str| {
			let value = params.iter().find(|(key, _)| *key == param).map(|(_, value)| *value).ok_or_else(|| ReverseError::MissingParameter {
				route: name.to_owned(),
				param: param.to_owned(),
			})?;
			if value.contains(is_query_or_fragment) {
				return Err(ReverseError::InvalidParameter {
					route: name.to_owned(),
					param: param.to_owned(),
				});
			}
			Ok(value)
		};

		let mut url = self.base.clone().unwrap_or_default();
		for segment in entry.pattern.segments() {
			match segment {
				Segment::Literal(literal) => {
					url.push('/');
					url.push_str(literal);
				}
				Segment::Param(param) => {
					let value = lookup(param.as_str())?;
					if value.is_empty() || value.contains('/') {
						return Err(ReverseError::InvalidParameter {
							route: name.to_owned(),
							param: param.clone(),
						});
					}
					url.push('/');
					url.push_str(value);
				}
				Segment::CatchAll(Some(param)) => {
					let value = lookup(param.as_str())?.trim_start_matches('/');
					if !value.is_empty() {
						url.push('/');
						url.push_str(value);
					}
				}
				Segment::CatchAll(None) => (),
			}
		}

		if url.is_empty() {
			url.push('/');
		}
		Ok(url)
	}

	#[must_use]
	pub fn route_named(&self, name: &str) -> Option<&RouteEntry<H>> {
		self.entries.iter().find(|entry| entry.name() == Some(name))
	}

	pub fn iter(&self) -> impl Iterator<Item = &RouteEntry<H>> {
		self.entries.iter()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// The path prefix all routes live under, without a trailing `/`.
	#[must_use]
	pub fn base(&self) -> Option<&str> {
		self.base.as_deref()
	}
}

fn strip_base<'a>(base: &str, path: &'a str) -> Option<&'a str> {
	let rest = path.strip_prefix(base)?;
	(rest.is_empty() || rest.starts_with('/')).then(|| rest)
}

/// Collects routes in priority order. Nothing is validated until [`RouteTableBuilder::build`].
pub struct RouteTableBuilder<H> {
	routes: Vec<(String, Option<String>, H)>,
	base: Option<String>,
}
impl<H> Default for RouteTableBuilder<H> {
	fn default() -> Self {
		Self::new()
	}
}
impl<H> RouteTableBuilder<H> {
	#[must_use]
	pub fn new() -> Self {
		Self { routes: Vec::new(), base: None }
	}

	#[must_use]
	pub fn route(mut self, pattern: impl Into<String>, handler: H) -> Self {
		self.routes.push((pattern.into(), None, handler));
		self
	}

	/// Like [`route`](`RouteTableBuilder::route`), but reachable through [`RouteTable::url_for`].
	#[must_use]
	pub fn named(mut self, name: impl Into<String>, pattern: impl Into<String>, handler: H) -> Self {
		self.routes.push((pattern.into(), Some(name.into()), handler));
		self
	}

	/// Serves all routes below `base`, for apps not mounted at the site root.
	#[must_use]
	pub fn base(mut self, base: impl Into<String>) -> Self {
		self.base = Some(base.into());
		self
	}

	/// # Errors
	///
	/// Iff a pattern is malformed, a route name repeats or the base isn't absolute.
	pub fn build(self) -> Result<RouteTable<H>, RouteTableError> {
		let base = match self.base {
			Some(base) if !base.starts_with('/') => return Err(RouteTableError::InvalidBase(base)),
			Some(base) => Some(base.trim_end_matches('/').to_owned()).filter(|base| !base.is_empty()),
			None => None,
		};

		let mut names = HashSet::new();
		let mut entries = Vec::with_capacity(self.routes.len());
		for (pattern, name, handler) in self.routes {
			if let Some(name) = &name {
				if !names.insert(name.clone()) {
					return Err(RouteTableError::DuplicateName(name.clone()));
				}
			}
			entries.push(RouteEntry {
				pattern: RoutePattern::parse(&pattern)?,
				name,
				handler,
			});
		}

		debug!(routes = entries.len(), "Built route table.");
		Ok(RouteTable { entries, base })
	}
}
impl<H: Debug> Debug for RouteTableBuilder<H> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteTableBuilder").field("routes", &self.routes).field("base", &self.base).finish()
	}
}
