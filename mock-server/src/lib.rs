//! In-memory stand-in for the board/list/card REST API.
//!
//! Mirrors the behavior the client depends on: every input is a query
//! parameter, `key` and `token` must match, board and list names must be
//! non-empty, a card parameter that is absent is left alone while an empty
//! one clears the field, and unknown ids answer 404.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tracing::debug;
use uuid::Uuid;

pub const NOT_FOUND_BODY: &str = "The requested resource was not found.";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Board {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub closed: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: String,
    pub name: String,
    pub id_board: String,
    pub closed: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub id_list: String,
    pub id_board: String,
    pub due: Option<String>,
    pub closed: bool,
    pub badges: Badges,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Badges {
    pub description: bool,
    pub due: Option<String>,
}

impl Card {
    fn refresh_badges(&mut self) {
        self.badges = Badges {
            description: !self.desc.is_empty(),
            due: self.due.clone(),
        };
    }
}

/// Credentials the server accepts.
#[derive(Clone, Debug)]
pub struct Auth {
    pub key: String,
    pub token: String,
}

impl Auth {
    pub fn new(key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            token: token.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Store {
    pub boards: HashMap<String, Board>,
    pub lists: HashMap<String, List>,
    pub cards: HashMap<String, Card>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
struct AppState {
    auth: Arc<Auth>,
    db: Db,
}

type Params = Query<HashMap<String, String>>;

pub fn app(auth: Auth) -> Router {
    app_with_store(auth, Db::default())
}

/// Router over a caller-owned store, so tests can inspect server state.
pub fn app_with_store(auth: Auth, db: Db) -> Router {
    let state = AppState {
        auth: Arc::new(auth),
        db,
    };
    let api = Router::new()
        .route("/boards", post(create_board))
        .route("/boards/{id}", get(get_board).delete(delete_board))
        .route("/lists", post(create_list))
        .route("/lists/{id}", get(get_list).delete(delete_list))
        .route("/cards", post(create_card))
        .route("/cards/{id}", get(get_card).put(update_card).delete(delete_card));
    Router::new()
        .nest("/1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener, auth: Auth) -> Result<(), std::io::Error> {
    axum::serve(listener, app(auth)).await
}

fn reject(status: StatusCode, body: &str) -> Response {
    (status, body.to_string()).into_response()
}

fn not_found() -> Response {
    reject(StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}

fn authorize(auth: &Auth, params: &HashMap<String, String>) -> Result<(), Response> {
    if params.get("key") != Some(&auth.key) {
        return Err(reject(StatusCode::UNAUTHORIZED, "invalid key"));
    }
    if params.get("token") != Some(&auth.token) {
        return Err(reject(StatusCode::UNAUTHORIZED, "invalid token"));
    }
    Ok(())
}

fn required_name(params: &HashMap<String, String>) -> Result<String, Response> {
    match params.get("name") {
        Some(name) if !name.is_empty() => Ok(name.clone()),
        _ => Err(reject(StatusCode::BAD_REQUEST, "invalid value for name")),
    }
}

/// Empty clears the due date; anything else must be an RFC 3339 timestamp.
fn parse_due(raw: &str) -> Result<Option<String>, Response> {
    if raw.is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| Some(ts.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true)))
        .map_err(|_| reject(StatusCode::BAD_REQUEST, "invalid value for due"))
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()[..24].to_string()
}

async fn create_board(State(state): State<AppState>, Query(params): Params) -> Result<Json<Board>, Response> {
    authorize(&state.auth, &params)?;
    let board = Board {
        id: new_id(),
        name: required_name(&params)?,
        desc: params.get("desc").cloned().unwrap_or_default(),
        closed: false,
    };
    debug!(id = %board.id, "board created");
    state.db.write().await.boards.insert(board.id.clone(), board.clone());
    Ok(Json(board))
}

async fn get_board(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Params,
) -> Result<Json<Board>, Response> {
    authorize(&state.auth, &params)?;
    let store = state.db.read().await;
    store.boards.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn delete_board(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Params,
) -> Result<Json<serde_json::Value>, Response> {
    authorize(&state.auth, &params)?;
    let mut store = state.db.write().await;
    store.boards.remove(&id).ok_or_else(not_found)?;
    store.lists.retain(|_, list| list.id_board != id);
    store.cards.retain(|_, card| card.id_board != id);
    Ok(Json(json!({ "_value": null })))
}

async fn create_list(State(state): State<AppState>, Query(params): Params) -> Result<Json<List>, Response> {
    authorize(&state.auth, &params)?;
    let name = required_name(&params)?;
    let mut store = state.db.write().await;
    let board_id = params
        .get("idBoard")
        .filter(|id| store.boards.contains_key(*id))
        .cloned()
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "invalid value for idBoard"))?;
    let list = List {
        id: new_id(),
        name,
        id_board: board_id,
        closed: false,
    };
    store.lists.insert(list.id.clone(), list.clone());
    Ok(Json(list))
}

async fn get_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Params,
) -> Result<Json<List>, Response> {
    authorize(&state.auth, &params)?;
    let store = state.db.read().await;
    store.lists.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn delete_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Params,
) -> Result<Json<serde_json::Value>, Response> {
    authorize(&state.auth, &params)?;
    let mut store = state.db.write().await;
    store.lists.remove(&id).ok_or_else(not_found)?;
    store.cards.retain(|_, card| card.id_list != id);
    Ok(Json(json!({ "_value": null })))
}

async fn create_card(State(state): State<AppState>, Query(params): Params) -> Result<Json<Card>, Response> {
    authorize(&state.auth, &params)?;
    let mut store = state.db.write().await;
    let list = params
        .get("idList")
        .and_then(|id| store.lists.get(id))
        .cloned()
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "invalid value for idList"))?;
    let due = match params.get("due") {
        Some(raw) => parse_due(raw)?,
        None => None,
    };
    let mut card = Card {
        id: new_id(),
        name: params.get("name").cloned().unwrap_or_default(),
        desc: params.get("desc").cloned().unwrap_or_default(),
        id_list: list.id,
        id_board: list.id_board,
        due,
        closed: false,
        badges: Badges::default(),
    };
    card.refresh_badges();
    store.cards.insert(card.id.clone(), card.clone());
    Ok(Json(card))
}

async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Params,
) -> Result<Json<Card>, Response> {
    authorize(&state.auth, &params)?;
    let store = state.db.read().await;
    store.cards.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn update_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Params,
) -> Result<Json<Card>, Response> {
    authorize(&state.auth, &params)?;
    let due = params.get("due").map(|raw| parse_due(raw)).transpose()?;

    let mut store = state.db.write().await;
    let card = store.cards.get_mut(&id).ok_or_else(not_found)?;
    if let Some(name) = params.get("name") {
        card.name = name.clone();
    }
    if let Some(desc) = params.get("desc") {
        card.desc = desc.clone();
    }
    if let Some(due) = due {
        card.due = due;
    }
    card.refresh_badges();
    Ok(Json(card.clone()))
}

async fn delete_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Params,
) -> Result<Json<serde_json::Value>, Response> {
    authorize(&state.auth, &params)?;
    let mut store = state.db.write().await;
    store.cards.remove(&id).ok_or_else(not_found)?;
    Ok(Json(json!({ "limits": {} })))
}
