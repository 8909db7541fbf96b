//! Route pattern parsing and structural matching.
//!
//! Patterns are absolute, `/`-separated templates. A segment is one of
//!
//! - a literal, which must equal the path segment exactly (case-sensitive),
//! - `:name`, which matches any single non-empty segment and binds it to `name`, or
//! - `*name` (or a bare `*`), which must come last and matches the whole remaining suffix,
//!   including nothing at all.
//!
//! There are no regular expressions and no type conversions: bound values are the literal path text.

use core::{
	fmt::{self, Display, Formatter},
	str::FromStr,
};
use hashbrown::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
	Literal(String),
	Param(String),
	/// Binds the remaining suffix, joined with `/`, unless unnamed.
	CatchAll(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
	#[error("route pattern {pattern:?} must start with '/'")]
	NotAbsolute { pattern: String },
	#[error("route pattern {pattern:?} contains an empty segment")]
	EmptySegment { pattern: String },
	#[error("route pattern {pattern:?} contains a parameter without a name")]
	EmptyParameterName { pattern: String },
	#[error("route pattern {pattern:?} binds parameter {name:?} more than once")]
	DuplicateParameter { pattern: String, name: String },
	#[error("route pattern {pattern:?} has a catch-all segment before its end")]
	CatchAllNotLast { pattern: String },
	#[error("route pattern {pattern:?} contains '?' or '#', which never reach the matcher")]
	QueryOrFragment { pattern: String },
}

/// A parsed route template. See the [module documentation](self) for the syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutePattern {
	source: String,
	segments: Vec<Segment>,
}
impl RoutePattern {
	/// # Errors
	///
	/// Iff `pattern` isn't absolute, has an empty interior segment or parameter name,
	/// binds a parameter name twice, has a catch-all anywhere but at its end,
	/// or contains a query or fragment delimiter.
	pub fn parse(pattern: &str) -> Result<Self, PatternError> {
		if !pattern.starts_with('/') {
			return Err(PatternError::NotAbsolute { pattern: pattern.to_owned() });
		}
		if pattern.contains(is_query_or_fragment) {
			return Err(PatternError::QueryOrFragment { pattern: pattern.to_owned() });
		}

		let parts = split_path(pattern);
		let mut segments = Vec::with_capacity(parts.len());
		let mut names = HashSet::new();
		for (i, raw) in parts.iter().copied().enumerate() {
			let segment = if raw.is_empty() {
				return Err(PatternError::EmptySegment { pattern: pattern.to_owned() });
			} else if let Some(name) = raw.strip_prefix(':') {
				if name.is_empty() {
					return Err(PatternError::EmptyParameterName { pattern: pattern.to_owned() });
				}
				Segment::Param(name.to_owned())
			} else if let Some(name) = raw.strip_prefix('*') {
				if i + 1 != parts.len() {
					return Err(PatternError::CatchAllNotLast { pattern: pattern.to_owned() });
				}
				Segment::CatchAll((!name.is_empty()).then(|| name.to_owned()))
			} else {
				Segment::Literal(raw.to_owned())
			};

			if let Segment::Param(name) | Segment::CatchAll(Some(name)) = &segment {
				if !names.insert(name.clone()) {
					return Err(PatternError::DuplicateParameter {
						pattern: pattern.to_owned(),
						name: name.clone(),
					});
				}
			}
			segments.push(segment);
		}

		Ok(Self {
			source: pattern.to_owned(),
			segments,
		})
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.source
	}

	#[must_use]
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	pub fn param_names(&self) -> impl Iterator<Item = &str> {
		self.segments.iter().filter_map(|segment| match segment {
			Segment::Param(name) | Segment::CatchAll(Some(name)) => Some(name.as_str()),
			Segment::Literal(_) | Segment::CatchAll(None) => None,
		})
	}

	#[must_use]
	pub fn has_catch_all(&self) -> bool {
		matches!(self.segments.last(), Some(Segment::CatchAll(_)))
	}

	/// Matches already split path segments against this pattern, binding parameters on success.
	#[must_use]
	pub fn match_segments(&self, path: &[&str]) -> Option<Params> {
		let mut params = Params::default();
		for (i, segment) in self.segments.iter().enumerate() {
			match segment {
				Segment::Literal(literal) => {
					if *path.get(i)? != literal.as_str() {
						return None;
					}
				}
				Segment::Param(name) => {
					let value = *path.get(i)?;
					if value.is_empty() {
						return None;
					}
					params.insert(name.clone(), value.to_owned());
				}
				Segment::CatchAll(name) => {
					let rest = path.get(i..)?;
					if let Some(name) = name {
						params.insert(name.clone(), rest.join("/"));
					}
					return Some(params);
				}
			}
		}
		(path.len() == self.segments.len()).then(|| params)
	}
}
impl FromStr for RoutePattern {
	type Err = PatternError;

	fn from_str(pattern: &str) -> Result<Self, Self::Err> {
		Self::parse(pattern)
	}
}
impl Display for RoutePattern {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(&self.source)
	}
}

/// Whether `c` starts a path's query string or fragment.
pub(crate) fn is_query_or_fragment(c: char) -> bool {
	c == '?' || c == '#'
}

/// Splits a path on `/`, ignoring one leading separator and one trailing empty segment.
///
/// `/` and the empty string both have zero segments.
#[must_use]
pub fn split_path(path: &str) -> Vec<&str> {
	let path = path.strip_prefix('/').unwrap_or(path);
	if path.is_empty() {
		return Vec::new();
	}

	let mut segments: Vec<&str> = path.split('/').collect();
	if segments.last() == Some(&"") {
		segments.pop();
	}
	segments
}

/// Parameter values bound by a match, by name. Values are always the literal path text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(HashMap<String, String>);
impl Params {
	#[must_use]
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.get(name).map(String::as_str)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
	}

	#[must_use]
	pub fn into_inner(self) -> HashMap<String, String> {
		self.0
	}

	fn insert(&mut self, name: String, value: String) {
		self.0.insert(name, value);
	}
}
impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Params {
	fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
		Self(iter.into_iter().map(|(name, value)| (name.into(), value.into())).collect())
	}
}
