//! Shared collaborator doubles for the integration tests.
//!
//! - [`RecordingPageManager`]: renders `controller:view` markers, records
//!   every call, and can be programmed to reject for chosen controllers
//! - [`RecordingDispatcher`]: captures fired lifecycle events
//! - [`FakeWindow`]: an in-memory host environment with a real history
//!   stack, scroll state and invokable pop-state/click handlers
//! - [`FatalProbe`]: collects errors reported to the last-resort handler

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use wayfinder::{
	AnchorClick, ClickHandler, Dispatcher, HistoryEntryState, NavigationAction, PageManager,
	PageResponse, PopStateHandler, RouteOptions, RouteParams, RouterError, RouterEvent, Window,
};

/// One recorded page-manager invocation.
#[derive(Debug, Clone)]
pub struct ManageCall {
	pub controller: String,
	pub view: String,
	pub params: RouteParams,
	pub action: NavigationAction,
}

/// Page manager double rendering `controller:view` markers.
#[derive(Default)]
pub struct RecordingPageManager {
	pub calls: Mutex<Vec<ManageCall>>,
	failures: Mutex<HashMap<String, RouterError>>,
}

impl RecordingPageManager {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// Programs every call for `controller` to reject with `error`.
	pub fn fail_controller(&self, controller: &str, error: RouterError) {
		self.failures.lock().insert(controller.to_string(), error);
	}

	pub fn controllers_called(&self) -> Vec<String> {
		self.calls
			.lock()
			.iter()
			.map(|call| call.controller.clone())
			.collect()
	}

	pub fn last_call(&self) -> Option<ManageCall> {
		self.calls.lock().last().cloned()
	}
}

#[async_trait]
impl PageManager for RecordingPageManager {
	async fn manage(
		&self,
		controller: &str,
		view: &str,
		_options: &RouteOptions,
		params: &RouteParams,
		action: &NavigationAction,
	) -> Result<PageResponse, RouterError> {
		self.calls.lock().push(ManageCall {
			controller: controller.to_string(),
			view: view.to_string(),
			params: params.clone(),
			action: action.clone(),
		});
		if let Some(error) = self.failures.lock().get(controller) {
			return Err(error.clone());
		}
		Ok(PageResponse::ok(format!("{}:{}", controller, view)))
	}
}

/// Dispatcher double capturing fired events.
#[derive(Default)]
pub struct RecordingDispatcher {
	pub events: Mutex<Vec<RouterEvent>>,
}

impl RecordingDispatcher {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn event_names(&self) -> Vec<&'static str> {
		self.events.lock().iter().map(RouterEvent::name).collect()
	}
}

impl Dispatcher for RecordingDispatcher {
	fn fire(&self, event: RouterEvent, _allow_unhandled: bool) {
		self.events.lock().push(event);
	}
}

/// Collects errors reported to the router's last-resort handler.
#[derive(Default)]
pub struct FatalProbe {
	pub errors: Mutex<Vec<RouterError>>,
}

impl FatalProbe {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn handler(self: &Arc<Self>) -> Arc<dyn Fn(RouterError) + Send + Sync> {
		let probe = Arc::clone(self);
		Arc::new(move |error| probe.errors.lock().push(error))
	}
}

/// In-memory host environment with a real history stack.
pub struct FakeWindow {
	domain: String,
	has_history: bool,
	path: Mutex<String>,
	history: Mutex<Vec<HistoryEntryState>>,
	scroll: Mutex<(u32, u32)>,
	pub scrolled_to: Mutex<Vec<(u32, u32)>>,
	pub hard_redirects: Mutex<Vec<String>>,
	pop_state_handler: Mutex<Option<PopStateHandler>>,
	click_handler: Mutex<Option<ClickHandler>>,
}

impl FakeWindow {
	pub fn new(domain: &str, path: &str) -> Arc<Self> {
		Self::build(domain, path, true)
	}

	/// A window without history API support.
	pub fn without_history(domain: &str, path: &str) -> Arc<Self> {
		Self::build(domain, path, false)
	}

	fn build(domain: &str, path: &str, has_history: bool) -> Arc<Self> {
		Arc::new(Self {
			domain: domain.to_string(),
			has_history,
			path: Mutex::new(path.to_string()),
			history: Mutex::new(vec![HistoryEntryState::new(format!("{}{}", domain, path))]),
			scroll: Mutex::new((0, 0)),
			scrolled_to: Mutex::new(Vec::new()),
			hard_redirects: Mutex::new(Vec::new()),
			pop_state_handler: Mutex::new(None),
			click_handler: Mutex::new(None),
		})
	}

	pub fn set_scroll(&self, x: u32, y: u32) {
		*self.scroll.lock() = (x, y);
	}

	pub fn history_urls(&self) -> Vec<String> {
		self.history
			.lock()
			.iter()
			.map(|entry| entry.url.clone())
			.collect()
	}

	/// Simulates a back/forward pop to `path` with `state`, invoking the
	/// bound handler.
	pub fn fire_pop(&self, path: &str, state: Option<HistoryEntryState>) {
		*self.path.lock() = path.to_string();
		if let Some(handler) = &*self.pop_state_handler.lock() {
			handler(state);
		}
	}

	/// Simulates an anchor click; returns whether the bound handler
	/// claimed it.
	pub fn fire_click(&self, click: &AnchorClick) -> bool {
		match &*self.click_handler.lock() {
			Some(handler) => handler(click),
			None => false,
		}
	}

	fn path_of(&self, url: &str) -> String {
		url.strip_prefix(&self.domain).unwrap_or(url).to_string()
	}
}

impl Window for FakeWindow {
	fn get_path(&self) -> String {
		self.path.lock().clone()
	}

	fn get_url(&self) -> String {
		format!("{}{}", self.domain, self.path.lock())
	}

	fn get_domain(&self) -> String {
		self.domain.clone()
	}

	fn has_history_api(&self) -> bool {
		self.has_history
	}

	fn push_state(&self, state: &HistoryEntryState, _title: &str, url: &str) {
		*self.path.lock() = self.path_of(url);
		self.history.lock().push(state.clone());
	}

	fn replace_state(&self, state: &HistoryEntryState, _title: &str, url: &str) {
		*self.path.lock() = self.path_of(url);
		let mut history = self.history.lock();
		history.pop();
		history.push(state.clone());
	}

	fn get_history_state(&self) -> Option<HistoryEntryState> {
		self.history.lock().last().cloned()
	}

	fn get_scroll_x(&self) -> u32 {
		self.scroll.lock().0
	}

	fn get_scroll_y(&self) -> u32 {
		self.scroll.lock().1
	}

	fn scroll_to(&self, x: u32, y: u32) {
		*self.scroll.lock() = (x, y);
		self.scrolled_to.lock().push((x, y));
	}

	fn bind_pop_state(&self, handler: PopStateHandler) {
		*self.pop_state_handler.lock() = Some(handler);
	}

	fn bind_click(&self, handler: ClickHandler) {
		*self.click_handler.lock() = Some(handler);
	}

	fn redirect_hard(&self, url: &str) {
		self.hard_redirects.lock().push(url.to_string());
	}
}
