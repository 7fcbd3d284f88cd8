//! Router lifecycle events and the event-bus collaborator.
//!
//! The router fires exactly two events per handled navigation: one before
//! the page manager is awaited, one after its result settles. Event firing
//! is synchronous; listeners must not block.

use crate::manager::PageResponse;
use crate::params::RouteParams;
use crate::route::{Route, RouteOptions};
use std::sync::Arc;

/// Name of the event fired before a route is handled.
pub const BEFORE_HANDLE_ROUTE: &str = "before_handle_route";

/// Name of the event fired after a route's render result settled.
pub const AFTER_HANDLE_ROUTE: &str = "after_handle_route";

/// Payload of a router lifecycle event.
#[derive(Debug, Clone)]
pub enum RouterEvent {
	/// Fired before the page manager is awaited.
	BeforeHandleRoute {
		/// The matched route.
		route: Arc<Route>,
		/// Extracted parameters, query overrides applied.
		params: RouteParams,
		/// The concrete path being navigated.
		path: String,
		/// Effective options after per-call overrides.
		options: RouteOptions,
	},
	/// Fired after the page manager's result settled successfully.
	AfterHandleRoute {
		/// The matched route.
		route: Arc<Route>,
		/// Extracted parameters, query overrides applied.
		params: RouteParams,
		/// The concrete path being navigated.
		path: String,
		/// The settled response, error context merged in.
		response: PageResponse,
		/// Effective options after per-call overrides.
		options: RouteOptions,
	},
}

impl RouterEvent {
	/// The event's string name.
	pub fn name(&self) -> &'static str {
		match self {
			Self::BeforeHandleRoute { .. } => BEFORE_HANDLE_ROUTE,
			Self::AfterHandleRoute { .. } => AFTER_HANDLE_ROUTE,
		}
	}
}

/// Synchronous publish/subscribe event bus collaborator.
pub trait Dispatcher: Send + Sync {
	/// Publishes `event` to all listeners. When `allow_unhandled` is true
	/// the absence of listeners is not worth a diagnostic; implementations
	/// may warn otherwise.
	fn fire(&self, event: RouterEvent, allow_unhandled: bool);
}
