use std::cell::{Cell, RefCell};
use std::sync::Arc;

use futures::{Stream, StreamExt};
use gloo_timers::callback::Interval;
use js_sys::Promise;
use leptos::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::app::DashboardApp;
use crate::application::{DashboardSession, SnapshotLoader};
use crate::config::DashboardConfig;
use crate::domain::{
    Publication,
    dashboard::Timestamp,
    errors::DashboardError,
    logging::{LogComponent, TimeProvider, get_logger, init_logger, init_time_provider},
};
use crate::infrastructure::{
    http::DashboardHttpClient,
    services::{BrowserTimeProvider, ConsoleLogger, GlooDelay},
    websocket::DashboardWebSocketClient,
};

const COMPONENT: LogComponent = LogComponent::Presentation("WasmApi");

/// Refresh period for the "N seconds ago" labels
const AGE_TICK_MS: u32 = 1_000;

struct ActiveDashboard {
    session: DashboardSession,
    config: DashboardConfig,
    _age_ticker: Interval,
}

thread_local! {
    static PUBLICATION: RwSignal<Publication> = create_rw_signal(Publication::default());
    static NOW: RwSignal<Timestamp> = create_rw_signal(Timestamp::from_millis(0));
    static ACTIVE: RefCell<Option<ActiveDashboard>> = const { RefCell::new(None) };
    static MOUNTED: Cell<bool> = const { Cell::new(false) };
    /// Bumped on every start; forwarders from older sessions stop writing
    static GENERATION: Cell<u64> = const { Cell::new(0) };
}

fn current_generation() -> u64 {
    GENERATION.with(Cell::get)
}

fn begin_generation() -> u64 {
    GENERATION.with(|counter| {
        counter.set(counter.get() + 1);
        counter.get()
    })
}

/// Copy publications into `sink` until a newer session has started.
async fn forward_publications(
    mut updates: impl Stream<Item = Publication> + Unpin,
    generation: u64,
    mut sink: impl FnMut(Publication),
) {
    while let Some(next) = updates.next().await {
        if current_generation() != generation {
            break;
        }
        sink(next);
    }
}

#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();
    let logger = if cfg!(debug_assertions) {
        ConsoleLogger::new_development()
    } else {
        ConsoleLogger::new_production()
    };
    init_logger(Box::new(logger));
    init_time_provider(Box::new(BrowserTimeProvider::new()));

    get_logger().info(COMPONENT, "🚀 Fraud dashboard module initialized");
}

fn to_js_error(error: impl Into<DashboardError>) -> JsValue {
    let error = error.into();
    get_logger().error(COMPONENT, &format!("❌ {error}"));
    JsValue::from_str(&error.to_string())
}

fn parse_config(config_json: Option<String>) -> Result<DashboardConfig, JsValue> {
    match config_json.as_deref() {
        Some(json) => DashboardConfig::from_json(json).map_err(to_js_error),
        None => Ok(DashboardConfig::default()),
    }
}

/// Start (or restart) the dashboard. `config_json` follows `DashboardConfig`;
/// missing fields take their defaults.
#[wasm_bindgen(js_name = startDashboard)]
pub fn start_dashboard(config_json: Option<String>) -> Result<(), JsValue> {
    let config = parse_config(config_json)?;
    stop_dashboard();

    let clock = Arc::new(BrowserTimeProvider::new());
    let (session, driver) = DashboardSession::new(
        &config,
        DashboardHttpClient::from_config(&config),
        DashboardWebSocketClient::new(config.stream_url.clone()),
        GlooDelay,
        clock.clone(),
    );

    let publication = PUBLICATION.with(|signal| *signal);
    let now = NOW.with(|signal| *signal);
    now.set(Timestamp::from_millis(clock.current_timestamp()));

    let generation = begin_generation();
    let updates = session.publisher().subscribe();
    spawn_local(forward_publications(updates, generation, move |next| publication.set(next)));

    spawn_local(async move {
        let report = driver.await;
        get_logger().info(COMPONENT, &format!("Dashboard session finished: {report:?}"));
    });

    let age_ticker = Interval::new(AGE_TICK_MS, move || {
        now.set(Timestamp::from_millis(clock.current_timestamp()));
    });

    if !MOUNTED.with(|mounted| mounted.replace(true)) {
        mount_to_body(move || view! { <DashboardApp publication=publication now=now /> });
    }

    ACTIVE.with(|active| {
        *active.borrow_mut() = Some(ActiveDashboard { session, config, _age_ticker: age_ticker });
    });
    Ok(())
}

/// Close the stream and stop reconciling. The last rendered state stays on screen.
#[wasm_bindgen(js_name = stopDashboard)]
pub fn stop_dashboard() {
    if let Some(active) = ACTIVE.with(|active| active.borrow_mut().take()) {
        active.session.close();
    }
}

/// Fetch a fresh snapshot for the running dashboard.
#[wasm_bindgen(js_name = reloadSnapshot)]
pub fn reload_snapshot() -> Promise {
    let target = ACTIVE.with(|active| {
        active
            .borrow()
            .as_ref()
            .map(|active| (active.session.engine_handle(), active.config.clone()))
    });

    future_to_promise(async move {
        let Some((engine, config)) = target else {
            return Err(JsValue::from_str("dashboard is not running"));
        };
        SnapshotLoader::new(DashboardHttpClient::from_config(&config), engine)
            .load()
            .await
            .map(|_| JsValue::TRUE)
            .map_err(to_js_error)
    })
}
