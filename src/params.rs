//! Route parameter containers.
//!
//! Parameters extracted from a path or a query string are either plain
//! string values or valueless boolean flags (`?debug` style query keys).
//! [`RouteParams`] keeps them in insertion order so that URL generation can
//! reproduce the order the caller supplied, and optionally threads a
//! [`NavigationCondition`] alongside the values — error context that travels
//! with a navigation without being thrown.

use crate::error::NavigationCondition;
use indexmap::IndexMap;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
	/// A plain string value.
	Value(String),
	/// A valueless query flag, e.g. the `debug` in `?debug&tab=2`.
	Flag,
}

impl ParamValue {
	/// Returns the string value, or `None` for a flag.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Value(value) => Some(value),
			Self::Flag => None,
		}
	}

	/// The textual form used when the value is substituted into a path
	/// segment. Flags render as `true`.
	pub(crate) fn as_path_segment(&self) -> String {
		match self {
			Self::Value(value) => value.clone(),
			Self::Flag => "true".to_string(),
		}
	}
}

impl From<&str> for ParamValue {
	fn from(value: &str) -> Self {
		Self::Value(value.to_string())
	}
}

impl From<String> for ParamValue {
	fn from(value: String) -> Self {
		Self::Value(value)
	}
}

/// Insertion-ordered parameter map for a single navigation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteParams {
	values: IndexMap<String, ParamValue>,
	condition: Option<NavigationCondition>,
}

impl RouteParams {
	/// Creates an empty parameter set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a parameter set from `(name, value)` pairs, preserving order.
	pub fn from_pairs<I, K, V>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<ParamValue>,
	{
		let mut params = Self::new();
		for (name, value) in pairs {
			params.insert(name, value);
		}
		params
	}

	/// Inserts a parameter. An existing key keeps its original position;
	/// a new key is appended.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
		self.values.insert(name.into(), value.into());
	}

	/// Inserts a valueless flag.
	pub fn insert_flag(&mut self, name: impl Into<String>) {
		self.values.insert(name.into(), ParamValue::Flag);
	}

	/// Looks up a parameter by name.
	pub fn get(&self, name: &str) -> Option<&ParamValue> {
		self.values.get(name)
	}

	/// Looks up a parameter's string value; `None` for flags and missing keys.
	pub fn get_str(&self, name: &str) -> Option<&str> {
		self.values.get(name).and_then(ParamValue::as_str)
	}

	/// Returns whether a parameter is present (value or flag).
	pub fn contains(&self, name: &str) -> bool {
		self.values.contains_key(name)
	}

	/// Iterates parameters in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
		self.values.iter()
	}

	/// Number of parameters (the threaded condition does not count).
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Returns whether there are no parameters.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// The navigation condition threaded through this parameter set, if any.
	pub fn condition(&self) -> Option<&NavigationCondition> {
		self.condition.as_ref()
	}

	/// Attaches a navigation condition to this parameter set.
	pub fn set_condition(&mut self, condition: NavigationCondition) {
		self.condition = Some(condition);
	}

	/// Removes and returns the threaded condition.
	pub fn take_condition(&mut self) -> Option<NavigationCondition> {
		self.condition.take()
	}
}
