//! URL routing for isomorphic page applications.
//!
//! The crate has three layers:
//!
//! - a path expression language ([`pattern`], [`route`]): `/`-separated
//!   literal segments, `:name` required parameters and `:?name` optional
//!   parameters, with matching, parameter extraction (query string
//!   overrides included) and reverse URL generation;
//! - an environment-independent dispatch core ([`core`]): a named route
//!   registry, lifecycle events around an injected page manager, and
//!   reserved `error`/`notFound` flows;
//! - a client specialization ([`client`]): session-history integration,
//!   anchor-click interception and a graceful escalation ladder for
//!   failed navigations, all behind a [`window::Window`] capability.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use wayfinder::{
//! 	NavigationAction, NavigationOptions, RouteOptions, RouterCore,
//! };
//! # use wayfinder::{Dispatcher, PageManager, RouterEvent};
//! # fn collaborators() -> (Arc<dyn PageManager>, Arc<dyn Dispatcher>) { unimplemented!() }
//!
//! # async fn demo() -> Result<(), wayfinder::RouterError> {
//! let (page_manager, dispatcher) = collaborators();
//! let router = RouterCore::new(page_manager, dispatcher);
//! router.add("home", "/", "HomeController", "HomeView", RouteOptions::default())?;
//! router.add("detail", "/detail/:id/:?tab", "DetailController", "DetailView", RouteOptions::default())?;
//!
//! let response = router
//! 	.route("/detail/42?tab=reviews", NavigationOptions::default(), NavigationAction::default())
//! 	.await?;
//! assert_eq!(response.status, 200);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod core;
pub mod error;
pub mod events;
pub mod manager;
pub mod params;
pub mod pattern;
pub mod route;
pub mod window;

pub use client::{AddressBarMode, ClientRouter, FatalErrorHandler};
pub use self::core::{RouteInfo, RouterConfig, RouterCore, RESERVED_ERROR, RESERVED_NOT_FOUND};
pub use error::{NavigationCondition, RouterError};
pub use events::{Dispatcher, RouterEvent, AFTER_HANDLE_ROUTE, BEFORE_HANDLE_ROUTE};
pub use manager::{NavigationAction, NavigationOptions, PageManager, PageResponse};
pub use params::{ParamValue, RouteParams};
pub use pattern::PathExpression;
pub use route::{Route, RouteFactory, RouteOptions};
pub use window::{
	AnchorClick, ClickHandler, HistoryEntryState, PopStateHandler, ScrollPosition, Window,
};
