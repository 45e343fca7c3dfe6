//! UI element model, shared UI state and the WebSocket bridge.
//!
//! The page is split the same way throughout the app:
//!
//! - **Rust Layer**: UI elements with an id, their data and event handlers,
//!   but no geometry or styling. All state and logic lives here.
//! - **HTML Layer**: custom elements (`<ui-button>`, `<ui-recipes>`,
//!   `<ui-plan>`, ...) placed and styled in the page layout.
//! - **JSON Protocol**: one WebSocket per page. The client sends events
//!   (`click`, `input`, `submit`, `change`, `pick`), the server sends an
//!   `init` with every element and then an `update` per change.
//!
//! # HTML Elements
//!
//! | Rust variant                | HTML element    | Client events      |
//! |-----------------------------|-----------------|--------------------|
//! | [`UiElement::Button`]       | `<ui-button>`   | `click`            |
//! | [`UiElement::Text`]         | `<ui-text>`     |                    |
//! | [`UiElement::Input`]        | `<ui-input>`    | `input`, `submit`  |
//! | [`UiElement::Select`]       | `<ui-select>`   | `change` (string)  |
//! | [`UiElement::Slider`]       | `<ui-slider>`   | `change` (number)  |
//! | [`UiElement::Radio`]        | `<ui-radio>`    | `change` (bool)    |
//! | [`UiElement::NumberInput`]  | `<ui-number>`   | `change` (number)  |
//! | [`UiElement::RecipeGrid`]   | `<ui-recipes>`  | `pick` (index)     |
//! | [`UiElement::PlanGrid`]     | `<ui-plan>`     |                    |
//! | [`UiElement::Modal`]        | `<ui-modal>`    |                    |
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use foodoscope::ui::{AppState, RouterConfig, UiElement, serve};
//!
//! #[tokio::main]
//! async fn main() {
//!     let state = AppState::new();
//!     state.add_element(UiElement::Text {
//!         id: "status".to_string(),
//!         text: "Ready".to_string(),
//!     });
//!     let status = state.clone();
//!     state.add_element(UiElement::Button {
//!         id: "search".to_string(),
//!         text: "Search".to_string(),
//!         disabled: false,
//!         on_click: Some(Arc::new(move || status.set_text("status", "Searching..."))),
//!     });
//!
//!     let html = r#"<ui-button id="search"></ui-button><ui-text id="status"></ui-text>"#;
//!     serve(RouterConfig::new(state, html), "127.0.0.1:3000").await.unwrap();
//! }
//! ```

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{Html, IntoResponse},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::plan::PlanDay;
use crate::recipe::{CalorieBadge, DetailRow, ProteinBadge, Recipe, format_amount};

/// JSON Protocol: Messages from client to server
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ClientMessage {
    Click { id: String },
    Input { id: String, value: String },
    Submit { id: String },
    Change { id: String, value: serde_json::Value },
    Pick { id: String, index: usize },
}

/// JSON Protocol: Messages from server to client
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ServerMessage {
    Init { elements: Vec<UiElement> },
    Update { id: String, element: UiElement },
}

pub type ClickCallback = Option<Arc<dyn Fn() + Send + Sync + 'static>>;
pub type TextCallback = Option<Arc<dyn Fn(&str) + Send + Sync + 'static>>;
pub type BoolCallback = Option<Arc<dyn Fn(bool) + Send + Sync + 'static>>;
pub type NumberCallback = Option<Arc<dyn Fn(f64) + Send + Sync + 'static>>;
pub type IndexCallback = Option<Arc<dyn Fn(usize) + Send + Sync + 'static>>;

/// A recipe as shown on a result card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeCard {
    pub index: usize,
    pub title: String,
    pub region: String,
    pub score: String,
    pub protein: String,
    pub calories: String,
    pub protein_badge: ProteinBadge,
    pub calorie_badge: CalorieBadge,
}

impl RecipeCard {
    pub fn new(index: usize, recipe: &Recipe) -> Self {
        Self {
            index,
            title: recipe.title.clone(),
            region: recipe.region_label().to_string(),
            score: format!("{:.1}", recipe.score()),
            protein: format_amount(recipe.protein()),
            calories: format_amount(recipe.calories()),
            protein_badge: recipe.protein_badge(),
            calorie_badge: recipe.calorie_badge(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanMealView {
    pub meal: String,
    pub title: String,
    pub protein: String,
    pub calories: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanDayView {
    pub label: String,
    pub meals: Vec<PlanMealView>,
}

impl From<&PlanDay> for PlanDayView {
    fn from(day: &PlanDay) -> Self {
        Self {
            label: day.label.clone(),
            meals: day
                .meals
                .iter()
                .map(|slot| PlanMealView {
                    meal: slot.meal.label().to_string(),
                    title: slot.recipe.title.clone(),
                    protein: format_amount(slot.recipe.protein()),
                    calories: format_amount(slot.recipe.calories()),
                })
                .collect(),
        }
    }
}

/// UI Element types that can be created in Rust and rendered in HTML.
///
/// Each element has an `id` for identification and element-specific properties.
/// Elements do not contain geometry or styling information - that is handled by HTML/CSS.
/// Handlers are never serialized.
#[derive(Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum UiElement {
    /// A clickable button. Disabled buttons ignore clicks on the page.
    Button {
        id: String,
        text: String,
        disabled: bool,
        #[serde(skip)]
        on_click: ClickCallback,
    },

    /// Read-only text display.
    Text { id: String, text: String },

    /// Text input field. `on_submit` fires when the user presses Enter.
    Input {
        id: String,
        value: String,
        placeholder: String,
        #[serde(skip)]
        on_input: TextCallback,
        #[serde(skip)]
        on_submit: ClickCallback,
    },

    /// Drop-down list of string options.
    Select {
        id: String,
        options: Vec<String>,
        value: String,
        #[serde(skip)]
        on_change: TextCallback,
    },

    /// Slider input (range).
    Slider {
        id: String,
        value: f64,
        min: f64,
        max: f64,
        step: Option<f64>,
        #[serde(skip)]
        on_change: NumberCallback,
    },

    /// Radio button; radios sharing a `name` are mutually exclusive on the page.
    Radio {
        id: String,
        name: String,
        value: String,
        checked: bool,
        #[serde(skip)]
        on_change: BoolCallback,
    },

    /// Number input field.
    #[serde(rename = "number")]
    NumberInput {
        id: String,
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
        #[serde(skip)]
        on_change: NumberCallback,
    },

    /// Grid of recipe cards. Clicking a card sends `pick` with the card index.
    #[serde(rename = "recipes")]
    RecipeGrid {
        id: String,
        cards: Vec<RecipeCard>,
        #[serde(skip)]
        on_pick: IndexCallback,
    },

    /// Day-by-day meal plan.
    #[serde(rename = "plan")]
    PlanGrid { id: String, days: Vec<PlanDayView> },

    /// Overlay with the details of one recipe.
    Modal {
        id: String,
        open: bool,
        title: String,
        rows: Vec<DetailRow>,
    },
}

impl UiElement {
    pub fn id(&self) -> &str {
        match self {
            UiElement::Button { id, .. }
            | UiElement::Text { id, .. }
            | UiElement::Input { id, .. }
            | UiElement::Select { id, .. }
            | UiElement::Slider { id, .. }
            | UiElement::Radio { id, .. }
            | UiElement::NumberInput { id, .. }
            | UiElement::RecipeGrid { id, .. }
            | UiElement::PlanGrid { id, .. }
            | UiElement::Modal { id, .. } => id,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            UiElement::Button { .. } => "Button",
            UiElement::Text { .. } => "Text",
            UiElement::Input { .. } => "Input",
            UiElement::Select { .. } => "Select",
            UiElement::Slider { .. } => "Slider",
            UiElement::Radio { .. } => "Radio",
            UiElement::NumberInput { .. } => "NumberInput",
            UiElement::RecipeGrid { .. } => "RecipeGrid",
            UiElement::PlanGrid { .. } => "PlanGrid",
            UiElement::Modal { .. } => "Modal",
        }
    }
}

impl std::fmt::Debug for UiElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Handlers are opaque; show the serialized data instead.
        let data = serde_json::to_string(self).unwrap_or_default();
        f.debug_struct(self.kind())
            .field("id", &self.id())
            .field("data", &data)
            .finish()
    }
}

/// Application state managing UI elements and event handlers.
///
/// Stores all UI elements by id and broadcasts every update to all
/// connected WebSocket clients. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct AppState {
    elements: Arc<Mutex<HashMap<String, UiElement>>>,
    update_tx: broadcast::Sender<ServerMessage>,
}

impl AppState {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(100);
        Self {
            elements: Arc::new(Mutex::new(HashMap::new())),
            update_tx: tx,
        }
    }

    fn elements(&self) -> MutexGuard<'_, HashMap<String, UiElement>> {
        self.elements.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a UI element, replacing any element with the same id.
    pub fn add_element(&self, element: UiElement) {
        self.elements().insert(element.id().to_string(), element);
    }

    /// Stores `element` under `id` and broadcasts the change to all connected clients.
    pub fn update_element(&self, id: &str, element: UiElement) {
        self.elements().insert(id.to_string(), element.clone());
        let _ = self.update_tx.send(ServerMessage::Update {
            id: id.to_string(),
            element,
        });
    }

    /// Applies `edit` to the stored element and broadcasts the result.
    /// Unknown ids are ignored.
    pub fn modify_element(&self, id: &str, edit: impl FnOnce(&mut UiElement)) {
        let updated = {
            let mut elements = self.elements();
            let Some(element) = elements.get_mut(id) else {
                tracing::debug!(id, "modify of unknown element ignored");
                return;
            };
            edit(element);
            element.clone()
        };
        let _ = self.update_tx.send(ServerMessage::Update {
            id: id.to_string(),
            element: updated,
        });
    }

    /// Replaces the text of a `Text` element.
    pub fn set_text(&self, id: &str, value: impl Into<String>) {
        let value = value.into();
        self.modify_element(id, |element| {
            if let UiElement::Text { text, .. } = element {
                *text = value;
            }
        });
    }

    pub fn element(&self, id: &str) -> Option<UiElement> {
        self.elements().get(id).cloned()
    }

    /// Gets all UI elements. Used when initializing new clients.
    pub fn get_all_elements(&self) -> Vec<UiElement> {
        self.elements().values().cloned().collect()
    }

    fn handle_click(&self, id: &str) {
        let handler = match self.elements().get(id) {
            Some(UiElement::Button {
                on_click: Some(handler),
                disabled: false,
                ..
            }) => Some(handler.clone()),
            _ => None,
        };
        if let Some(handler) = handler {
            handler();
        }
    }

    fn handle_input(&self, id: &str, value: &str) {
        let handler = {
            let mut elements = self.elements();
            match elements.get_mut(id) {
                Some(UiElement::Input {
                    value: stored,
                    on_input,
                    ..
                }) => {
                    *stored = value.to_string();
                    on_input.clone()
                }
                _ => None,
            }
        };
        if let Some(handler) = handler {
            handler(value);
        }
    }

    fn handle_submit(&self, id: &str) {
        let handler = match self.elements().get(id) {
            Some(UiElement::Input {
                on_submit: Some(handler),
                ..
            }) => Some(handler.clone()),
            _ => None,
        };
        if let Some(handler) = handler {
            handler();
        }
    }

    fn handle_change(&self, id: &str, value: serde_json::Value) {
        enum HandlerCall {
            Text(Arc<dyn Fn(&str) + Send + Sync + 'static>, String),
            Bool(Arc<dyn Fn(bool) + Send + Sync + 'static>, bool),
            Number(Arc<dyn Fn(f64) + Send + Sync + 'static>, f64),
        }

        // Store the new value first so re-renders reflect what the user chose.
        let handler_call = {
            let mut elements = self.elements();
            match elements.get_mut(id) {
                Some(UiElement::Select {
                    value: stored,
                    on_change,
                    ..
                }) => value.as_str().and_then(|v| {
                    *stored = v.to_string();
                    on_change
                        .clone()
                        .map(|handler| HandlerCall::Text(handler, v.to_string()))
                }),
                Some(UiElement::Slider {
                    value: stored,
                    on_change,
                    ..
                })
                | Some(UiElement::NumberInput {
                    value: stored,
                    on_change,
                    ..
                }) => value.as_f64().and_then(|v| {
                    *stored = v;
                    on_change.clone().map(|handler| HandlerCall::Number(handler, v))
                }),
                Some(UiElement::Radio {
                    checked, on_change, ..
                }) => value.as_bool().and_then(|v| {
                    *checked = v;
                    on_change.clone().map(|handler| HandlerCall::Bool(handler, v))
                }),
                _ => None,
            }
        };

        match handler_call {
            Some(HandlerCall::Text(handler, value)) => handler(&value),
            Some(HandlerCall::Bool(handler, value)) => handler(value),
            Some(HandlerCall::Number(handler, value)) => handler(value),
            None => {}
        }
    }

    fn handle_pick(&self, id: &str, index: usize) {
        let handler = match self.elements().get(id) {
            Some(UiElement::RecipeGrid {
                on_pick: Some(handler),
                cards,
                ..
            }) if index < cards.len() => Some(handler.clone()),
            _ => None,
        };
        if let Some(handler) = handler {
            handler(index);
        }
    }

    fn dispatch(&self, message: ClientMessage) {
        tracing::trace!(?message, "ui event");
        match message {
            ClientMessage::Click { id } => self.handle_click(&id),
            ClientMessage::Input { id, value } => self.handle_input(&id, &value),
            ClientMessage::Submit { id } => self.handle_submit(&id),
            ClientMessage::Change { id, value } => self.handle_change(&id, value),
            ClientMessage::Pick { id, index } => self.handle_pick(&id, index),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| websocket(socket, state))
}

fn encode(message: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(err) => {
            tracing::warn!(%err, "failed to encode ui message");
            None
        }
    }
}

async fn websocket(stream: WebSocket, state: AppState) {
    use futures_util::sink::SinkExt;
    use futures_util::stream::StreamExt;

    let (mut sender, mut receiver) = stream.split();
    tracing::debug!("ui client connected");

    // Subscribe before taking the snapshot so no update falls in between.
    let mut update_rx = state.update_tx.subscribe();

    let init_msg = ServerMessage::Init {
        elements: state.get_all_elements(),
    };
    let Some(init) = encode(&init_msg) else {
        return;
    };
    if sender.send(init).await.is_err() {
        return;
    }

    let mut send_task = tokio::spawn(async move {
        loop {
            match update_rx.recv().await {
                Ok(msg) => {
                    if let Some(frame) = encode(&msg)
                        && sender.send(frame).await.is_err()
                    {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "ui client lagging, updates dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let state_clone = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Text(text) = msg {
                match serde_json::from_str::<ClientMessage>(text.as_str()) {
                    Ok(client_msg) => state_clone.dispatch(client_msg),
                    Err(err) => tracing::debug!(%err, "ignoring malformed ui message"),
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }
    tracing::debug!("ui client disconnected");
}

// HTML shell wrapped around the layout
fn generate_html(title: &str, body_content: &str) -> String {
    format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="/static/foodoscope.css">
</head>
<body>
{body_content}
    <script src="/static/foodoscope.js"></script>
</body>
</html>"#, title = title, body_content = body_content)
}

/// Configuration for creating the UI router
pub struct RouterConfig {
    pub state: AppState,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// HTML page title
    pub title: String,
    /// HTML body content (the UI layout)
    pub body_html: String,
}

impl RouterConfig {
    pub fn new(state: AppState, body_html: impl Into<String>) -> Self {
        Self {
            state,
            static_dir: PathBuf::from("static"),
            title: "Foodoscope".to_string(),
            body_html: body_html.into(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }
}

/// Creates the Axum router for the UI.
///
/// - `/` serves the page with the configured layout
/// - `/ws` is the WebSocket endpoint for UI events and updates
/// - `/static` serves the element script and stylesheet
pub fn create_router(config: RouterConfig) -> Router {
    let html_content = generate_html(&config.title, &config.body_html);
    let state = config.state.clone();

    Router::new()
        .route("/", get(move || async move { Html(html_content) }))
        .route("/ws", get(websocket_handler))
        .nest_service("/static", ServeDir::new(config.static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `addr` and serves the UI until Ctrl-C.
pub async fn serve(config: RouterConfig, addr: impl AsRef<str>) -> crate::Result<()> {
    let app = create_router(config);

    let listener = tokio::net::TcpListener::bind(addr.as_ref()).await?;
    tracing::info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
