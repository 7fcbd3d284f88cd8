//! Rendering collaborator and navigation metadata.
//!
//! The router never renders anything itself: every matched navigation is
//! handed to the host's [`PageManager`], which mounts or updates the
//! controller/view pair and settles with a [`PageResponse`].

use crate::error::{NavigationCondition, RouterError};
use crate::params::RouteParams;
use crate::route::RouteOptions;
use async_trait::async_trait;

/// What triggered a navigation. Passed through opaquely to the page
/// manager and to fired events.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NavigationAction {
	/// A direct programmatic `route()` call.
	#[default]
	Programmatic,
	/// An intercepted anchor click.
	Click {
		/// The anchor's resolved target URL.
		url: String,
	},
	/// A session-history pop (back/forward).
	PopState,
	/// A router-issued redirect.
	Redirect {
		/// The redirect target URL.
		url: String,
	},
	/// Dispatch of the reserved error/not-found routes.
	Error,
}

/// Per-call overrides of [`RouteOptions`], plus an optional HTTP status
/// for degraded or redirect responses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationOptions {
	/// Status to report for this navigation, when the caller knows better
	/// than the page manager (redirects, synthesized error pages).
	pub http_status: Option<u16>,
	/// Override of [`RouteOptions::only_update`].
	pub only_update: Option<bool>,
	/// Override of [`RouteOptions::autoscroll`].
	pub autoscroll: Option<bool>,
	/// Override of [`RouteOptions::allow_spa`].
	pub allow_spa: Option<bool>,
	/// Override of [`RouteOptions::document_view`].
	pub document_view: Option<String>,
	/// Override of [`RouteOptions::managed_root_view`].
	pub managed_root_view: Option<String>,
	/// Override of [`RouteOptions::view_adapter`].
	pub view_adapter: Option<String>,
}

/// The settled result of one navigation.
///
/// Every settled navigation exposes a `{content, status}` pair even when
/// degraded; true redirections short-circuit content entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
	/// Rendered content, absent for degraded and redirect responses.
	pub content: Option<String>,
	/// HTTP-status-like result classification.
	pub status: u16,
	/// Error context that survived into the response, if any.
	pub error: Option<NavigationCondition>,
}

impl Default for PageResponse {
	fn default() -> Self {
		Self {
			content: None,
			status: 200,
			error: None,
		}
	}
}

impl PageResponse {
	/// A 200 response with rendered content.
	pub fn ok(content: impl Into<String>) -> Self {
		Self {
			content: Some(content.into()),
			status: 200,
			error: None,
		}
	}

	/// A content-less response with the given status.
	pub fn status(status: u16) -> Self {
		Self {
			content: None,
			status,
			error: None,
		}
	}

	/// Attaches error context to the response.
	pub fn with_error(mut self, error: NavigationCondition) -> Self {
		self.error = Some(error);
		self
	}
}

/// Renders a controller/view pair for one navigation.
///
/// Calls are awaited by the router; this is the router's only suspension
/// point. A rejection propagates into the router's error flow, so a
/// controller that fails with a status-bearing condition steers the
/// not-found/error/redirect handling.
#[async_trait]
pub trait PageManager: Send + Sync {
	/// Mounts or updates the page for `controller`/`view` and settles with
	/// the rendered result.
	async fn manage(
		&self,
		controller: &str,
		view: &str,
		options: &RouteOptions,
		params: &RouteParams,
		action: &NavigationAction,
	) -> Result<PageResponse, RouterError>;
}
