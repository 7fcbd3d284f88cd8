//! Client environment capability surface.
//!
//! The client router never touches the host environment directly; it sees
//! it through the [`Window`] trait: current path/url, session-history
//! push/replace with structured state, scroll access, pop-state and click
//! binding, and last-resort hard redirects. Hosts implement it over the
//! real browser surface; tests implement it over an in-memory double.

use serde::{Deserialize, Serialize};

/// A scroll offset saved into a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollPosition {
	/// Horizontal offset in pixels.
	pub x: u32,
	/// Vertical offset in pixels.
	pub y: u32,
}

/// Structured state stored in a session-history entry.
///
/// Serializable because history state crosses the host boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntryState {
	/// The entry's URL.
	pub url: String,
	/// Scroll offset saved before leaving the entry, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub scroll: Option<ScrollPosition>,
}

impl HistoryEntryState {
	/// Creates state for `url` with no saved scroll offset.
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			scroll: None,
		}
	}

	/// Attaches a scroll offset.
	pub fn with_scroll(mut self, x: u32, y: u32) -> Self {
		self.scroll = Some(ScrollPosition { x, y });
		self
	}

	/// Serializes the state to its JSON wire form.
	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}

	/// Deserializes state from its JSON wire form.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}
}

/// An anchor click as observed by the host environment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnchorClick {
	/// The anchor's `href`, if present.
	pub href: Option<String>,
	/// An explicit `target` attribute, if declared.
	pub target: Option<String>,
	/// Mouse button; `0` is the primary (left) button.
	pub button: u8,
	/// Whether an earlier listener already prevented the default action.
	pub default_prevented: bool,
}

/// Handler bound to session-history pops; receives the entry state of the
/// entry being activated, when one was stored.
pub type PopStateHandler = Box<dyn Fn(Option<HistoryEntryState>) + Send + Sync>;

/// Handler bound to anchor clicks; returns `true` when the click was
/// routed internally and the host must prevent the default full-page load.
pub type ClickHandler = Box<dyn Fn(&AnchorClick) -> bool + Send + Sync>;

/// Host environment capability surface used by the client router.
pub trait Window: Send + Sync {
	/// Current path relative to the domain, including any query string.
	fn get_path(&self) -> String;

	/// Current full URL.
	fn get_url(&self) -> String;

	/// The current origin, `protocol//host`.
	fn get_domain(&self) -> String;

	/// Whether the host supports the session-history API.
	fn has_history_api(&self) -> bool;

	/// Pushes a new session-history entry.
	fn push_state(&self, state: &HistoryEntryState, title: &str, url: &str);

	/// Replaces the current session-history entry.
	fn replace_state(&self, state: &HistoryEntryState, title: &str, url: &str);

	/// State stored in the current history entry, when any.
	fn get_history_state(&self) -> Option<HistoryEntryState>;

	/// Current horizontal scroll offset.
	fn get_scroll_x(&self) -> u32;

	/// Current vertical scroll offset.
	fn get_scroll_y(&self) -> u32;

	/// Scrolls the viewport to the given offset.
	fn scroll_to(&self, x: u32, y: u32);

	/// Binds a handler to session-history pops.
	fn bind_pop_state(&self, handler: PopStateHandler);

	/// Binds a handler to anchor clicks.
	fn bind_click(&self, handler: ClickHandler);

	/// Performs an environment-level redirect (full reload). The router
	/// does not attempt to intercept anything afterward.
	fn redirect_hard(&self, url: &str);
}
