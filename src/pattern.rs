//! Path expression compilation, matching and URL generation.
//!
//! A path expression is a sequence of `/`-separated segments, each a
//! literal, a required parameter `:name`, or an optional parameter
//! `:?name`:
//!
//! - `/users/:id` — literal then required parameter
//! - `/:?lang/home/:userId` — optional parameter before literals
//!
//! Optional segments make the language non-regular in shape: matching
//! backtracks over present/absent assignments of the optional parameters
//! instead of compiling to a single regex.

use crate::error::RouterError;
use crate::params::{ParamValue, RouteParams};

/// One compiled segment of a path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
	/// Fixed text that must align exactly.
	Literal(String),
	/// `:name` — consumes exactly one non-empty path segment.
	Required(String),
	/// `:?name` — consumes one path segment or nothing.
	Optional(String),
}

/// A compiled path expression: matcher, extractor and generator in one.
///
/// Immutable after construction; the compiled form is a pure function of
/// the expression string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpression {
	source: String,
	segments: Vec<Segment>,
	param_names: Vec<String>,
}

impl PathExpression {
	/// Compiles a path expression.
	///
	/// # Errors
	///
	/// Returns [`RouterError::MalformedExpression`] when the expression
	/// does not start with `/`, contains an empty segment, an empty or
	/// invalid parameter name, a duplicate parameter name, or a stray
	/// `?`/`:` inside a literal. A single trailing `/` is tolerated.
	pub fn parse(expression: &str) -> Result<Self, RouterError> {
		let malformed = |reason: &str| RouterError::MalformedExpression {
			expression: expression.to_string(),
			reason: reason.to_string(),
		};

		let Some(mut body) = expression.strip_prefix('/') else {
			return Err(malformed("expression must start with '/'"));
		};
		if let Some(stripped) = body.strip_suffix('/') {
			body = stripped;
			if body.is_empty() && expression.len() > 1 {
				return Err(malformed("empty segment"));
			}
		}

		let mut segments = Vec::new();
		let mut param_names: Vec<String> = Vec::new();
		if !body.is_empty() {
			for raw in body.split('/') {
				if raw.is_empty() {
					return Err(malformed("empty segment"));
				}
				let segment = if let Some(name) = raw.strip_prefix(":?") {
					validate_param_name(name).map_err(|reason| malformed(reason))?;
					Segment::Optional(name.to_string())
				} else if let Some(name) = raw.strip_prefix(':') {
					validate_param_name(name).map_err(|reason| malformed(reason))?;
					Segment::Required(name.to_string())
				} else {
					if raw.contains('?') {
						return Err(malformed("'?' is only valid in the ':?' marker"));
					}
					if raw.contains(':') {
						return Err(malformed("':' is only valid at the start of a parameter segment"));
					}
					Segment::Literal(raw.to_string())
				};
				if let Segment::Required(name) | Segment::Optional(name) = &segment {
					if param_names.iter().any(|existing| existing == name) {
						return Err(malformed("duplicate parameter name"));
					}
					param_names.push(name.clone());
				}
				segments.push(segment);
			}
		}

		Ok(Self {
			source: expression.to_string(),
			segments,
			param_names,
		})
	}

	/// The original expression string.
	pub fn source(&self) -> &str {
		&self.source
	}

	/// Parameter names in template order (required and optional).
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// Returns whether `name` is a parameter of this expression.
	pub fn has_param(&self, name: &str) -> bool {
		self.param_names.iter().any(|existing| existing == name)
	}

	fn is_required(&self, name: &str) -> bool {
		self.segments
			.iter()
			.any(|segment| matches!(segment, Segment::Required(required) if required == name))
	}

	/// Tests whether a concrete path matches this expression. Any
	/// `?query` or `#fragment` suffix is ignored.
	pub fn matches(&self, path: &str) -> bool {
		let (clean, _) = split_path(path);
		self.match_segments(&path_segments(clean)).is_some()
	}

	/// Extracts parameters from a concrete path.
	///
	/// Path-derived parameters come first, in template order, for the
	/// present/absent assignment the matcher found; parsed query pairs are
	/// merged afterwards and override same-named path parameters. On a
	/// non-matching path only query pairs are returned, and query keys
	/// shadowing a required parameter are dropped there so a defined
	/// required parameter always implies a match.
	pub fn extract_parameters(&self, path: &str) -> RouteParams {
		let (clean, query) = split_path(path);
		let mut params = RouteParams::new();
		let bound = self.match_segments(&path_segments(clean));
		let matched = bound.is_some();
		if let Some(bound) = bound {
			for (name, value) in bound {
				params.insert(name, value);
			}
		}
		if let Some(query) = query {
			for (name, value) in parse_query(query) {
				if !matched && self.is_required(&name) {
					continue;
				}
				params.insert(name, value);
			}
		}
		params
	}

	/// Generates a concrete path from `params`.
	///
	/// Required and optional parameters are substituted in template order.
	/// An absent optional segment is dropped entirely; an absent required
	/// parameter leaves its `:name` placeholder text so partially-specified
	/// templates remain inspectable. Every key in `params` that is not a
	/// template parameter is appended as an URL-encoded query string in
	/// insertion order, flags as bare keys.
	pub fn to_path(&self, params: &RouteParams) -> String {
		let mut parts: Vec<String> = Vec::new();
		for segment in &self.segments {
			match segment {
				Segment::Literal(literal) => parts.push(literal.clone()),
				Segment::Required(name) => match params.get(name) {
					Some(value) => parts.push(value.as_path_segment()),
					None => parts.push(format!(":{}", name)),
				},
				Segment::Optional(name) => {
					if let Some(value) = params.get(name) {
						parts.push(value.as_path_segment());
					}
				}
			}
		}

		let mut path = if parts.is_empty() {
			"/".to_string()
		} else {
			format!("/{}", parts.join("/"))
		};

		let query = build_query(params.iter().filter(|(name, _)| !self.has_param(name)));
		if !query.is_empty() {
			path.push('?');
			path.push_str(&query);
		}
		path
	}

	/// Backtracking alignment of template segments against path segments.
	/// Optional parameters try the present branch first.
	fn match_segments(&self, path_segments: &[&str]) -> Option<Vec<(String, String)>> {
		let mut bound = Vec::new();
		if backtrack(&self.segments, path_segments, &mut bound) {
			Some(bound)
		} else {
			None
		}
	}
}

fn backtrack(template: &[Segment], path: &[&str], bound: &mut Vec<(String, String)>) -> bool {
	let Some(segment) = template.first() else {
		return path.is_empty();
	};
	match segment {
		Segment::Literal(literal) => match path.first() {
			Some(candidate) if *candidate == literal.as_str() => {
				backtrack(&template[1..], &path[1..], bound)
			}
			_ => false,
		},
		Segment::Required(name) => match path.first() {
			Some(candidate) if !candidate.is_empty() => {
				bound.push((name.clone(), candidate.to_string()));
				if backtrack(&template[1..], &path[1..], bound) {
					true
				} else {
					bound.pop();
					false
				}
			}
			_ => false,
		},
		Segment::Optional(name) => {
			if let Some(candidate) = path.first() {
				bound.push((name.clone(), candidate.to_string()));
				if backtrack(&template[1..], &path[1..], bound) {
					return true;
				}
				bound.pop();
			}
			backtrack(&template[1..], path, bound)
		}
	}
}

fn validate_param_name(name: &str) -> Result<(), &'static str> {
	if name.is_empty() {
		return Err("empty parameter name");
	}
	if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
		return Err("parameter names may only contain letters, digits and '_'");
	}
	Ok(())
}

/// Splits a concrete path into its path part and optional query part,
/// dropping any `#fragment`.
pub(crate) fn split_path(path: &str) -> (&str, Option<&str>) {
	let without_fragment = match path.split_once('#') {
		Some((head, _)) => head,
		None => path,
	};
	match without_fragment.split_once('?') {
		Some((head, query)) => (head, Some(query)),
		None => (without_fragment, None),
	}
}

/// The path part of a concrete path, with query and fragment removed.
pub(crate) fn strip_query(path: &str) -> &str {
	split_path(path).0
}

fn path_segments(path: &str) -> Vec<&str> {
	path.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// Parses a query string into ordered pairs. Pairs may be separated by
/// `&` or `;`; a key without `=` becomes a boolean flag. Keys and values
/// are percent-decoded (`+` decodes to a space).
pub(crate) fn parse_query(query: &str) -> Vec<(String, ParamValue)> {
	query
		.split(['&', ';'])
		.filter(|pair| !pair.is_empty())
		.filter_map(|pair| {
			let has_value = pair.contains('=');
			let (key, value) = url::form_urlencoded::parse(pair.as_bytes()).next()?;
			let value = if has_value {
				ParamValue::Value(value.into_owned())
			} else {
				ParamValue::Flag
			};
			Some((key.into_owned(), value))
		})
		.collect()
}

fn build_query<'a>(pairs: impl Iterator<Item = (&'a String, &'a ParamValue)>) -> String {
	let mut query = String::new();
	for (name, value) in pairs {
		if !query.is_empty() {
			query.push('&');
		}
		query.push_str(&encode_component(name));
		if let ParamValue::Value(value) = value {
			query.push('=');
			query.push_str(&encode_component(value));
		}
	}
	query
}

fn encode_component(component: &str) -> String {
	url::form_urlencoded::byte_serialize(component.as_bytes()).collect()
}
