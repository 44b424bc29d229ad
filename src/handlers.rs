use crate::errors::AppError;
use crate::models::{
    CategoryQuery, DeleteForm, HistoryQuery, HistoryResponse, IndexQuery, LeaderboardMode, LeaderboardResponse,
    NewRecordRequest, Record, RecordForm, RecordId, RecordsDocument, SessionResponse,
};
use crate::ranking::{build_leaderboard, history_for_player, personal_best};
use crate::state::AppState;
use crate::ui::{HistoryView, IndexView, render_index};
use axum::{
    Form, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, Redirect},
};
use chrono::Utc;
use tracing::info;

pub async fn index(State(state): State<AppState>, Query(query): Query<IndexQuery>) -> Html<String> {
    let category = active_category(&state, query.category.as_deref());
    let store = state.store.lock().await;
    let records = store.records();

    let entries = build_leaderboard(records, &category, state.config.mode);
    let history = query
        .player
        .as_deref()
        .map(str::trim)
        .filter(|player| !player.is_empty())
        .map(|player| {
            let history = history_for_player(records, player, &category);
            HistoryView {
                player: player.to_string(),
                best_id: personal_best(&history).map(|r| r.id.clone()),
                records: history.into_iter().cloned().collect(),
            }
        });

    Html(render_index(&IndexView {
        categories: &state.config.categories,
        active_category: &category,
        mode: state.config.mode,
        entries: &entries,
        add_open: query.modal.as_deref() == Some("add"),
        history: history.as_ref(),
        share_url: state.session.share_url.as_deref(),
    }))
}

/// Invalid input is dropped without a message; the form simply stays open.
pub async fn add_record_form(State(state): State<AppState>, Form(form): Form<RecordForm>) -> Redirect {
    let category = active_category(&state, Some(form.category.as_str()));
    let count = parse_positive(&form.count);
    let duration = parse_positive(&form.duration);

    match new_record(state.config.mode, &category, count, duration, Some(form.player.as_str())) {
        Ok(record) => {
            append_and_schedule(&state, record).await;
            Redirect::to(&index_url(&category, None))
        }
        Err(_) => Redirect::to(&format!("{}&modal=add", index_url(&category, None))),
    }
}

pub async fn delete_record_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<DeleteForm>,
) -> Redirect {
    let removed = remove_and_schedule(&state, &RecordId::from(id)).await;

    let category = form
        .category
        .as_deref()
        .or(removed.as_ref().map(|r| r.category.as_str()))
        .map(|c| active_category(&state, Some(c)))
        .unwrap_or_else(|| state.config.default_category().to_string());

    let Some(player) = form.player.as_deref().map(str::trim).filter(|p| !p.is_empty()) else {
        return Redirect::to(&index_url(&category, None));
    };

    // Close the history view once the player has nothing left in this category.
    let store = state.store.lock().await;
    if history_for_player(store.records(), player, &category).is_empty() {
        Redirect::to(&index_url(&category, None))
    } else {
        Redirect::to(&index_url(&category, Some(player)))
    }
}

pub async fn list_records(State(state): State<AppState>) -> Json<RecordsDocument> {
    let store = state.store.lock().await;
    Json(store.snapshot())
}

pub async fn create_record(
    State(state): State<AppState>,
    payload: Result<Json<NewRecordRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Record>), AppError> {
    let Json(payload) = payload?;
    let category = payload.category.trim();
    if category.is_empty() {
        return Err(AppError::bad_request("category must not be empty"));
    }
    let count = Some(payload.count).filter(|c| *c != 0);
    let duration = payload.duration.filter(|d| *d != 0);

    let record = new_record(state.config.mode, category, count, duration, payload.player.as_deref())
        .map_err(AppError::bad_request)?;
    append_and_schedule(&state, record.clone()).await;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn delete_record(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, AppError> {
    match remove_and_schedule(&state, &RecordId::from(id.as_str())).await {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(AppError::not_found(format!("no record with id {id}"))),
    }
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Json<LeaderboardResponse> {
    let category = active_category(&state, query.category.as_deref());
    let store = state.store.lock().await;
    let entries = build_leaderboard(store.records(), &category, state.config.mode);
    Json(LeaderboardResponse {
        category,
        mode: state.config.mode,
        entries,
    })
}

pub async fn get_history(State(state): State<AppState>, Query(query): Query<HistoryQuery>) -> Json<HistoryResponse> {
    let store = state.store.lock().await;
    let history = history_for_player(store.records(), &query.player, &query.category);
    Json(HistoryResponse {
        personal_best: personal_best(&history).cloned(),
        records: history.into_iter().cloned().collect(),
        player: query.player,
        category: query.category,
    })
}

pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(SessionResponse {
        storage: state.storage_name().to_string(),
        bin_id: state.session.bin_id.as_ref().map(|id| id.to_string()),
        share_url: state.session.share_url.clone(),
    })
}

fn new_record(
    mode: LeaderboardMode,
    category: &str,
    count: Option<u32>,
    duration: Option<u32>,
    player: Option<&str>,
) -> Result<Record, &'static str> {
    let count = count.ok_or("count must be a positive number")?;
    let player = player.map(str::trim).filter(|p| !p.is_empty()).map(str::to_string);

    if mode == LeaderboardMode::PersonalBests {
        if player.is_none() {
            return Err("player must not be empty");
        }
        if duration.is_none() {
            return Err("duration must be a positive number of seconds");
        }
    }

    let now = Utc::now();
    Ok(Record {
        id: RecordId::generate(now),
        player,
        category: category.to_string(),
        count,
        duration,
        date: now,
    })
}

/// Snapshots are handed to the saver while the store lock is held, so the
/// writer never sees them out of order.
async fn append_and_schedule(state: &AppState, record: Record) {
    let mut store = state.store.lock().await;
    info!(id = %record.id, category = %record.category, count = record.count, "record added");
    store.append(record);
    state.saver.schedule(store.snapshot());
}

async fn remove_and_schedule(state: &AppState, id: &RecordId) -> Option<Record> {
    let mut store = state.store.lock().await;
    let removed = store.remove(id)?;
    info!(id = %removed.id, "record deleted");
    state.saver.schedule(store.snapshot());
    Some(removed)
}

/// Accepts any non-empty category, including ones no longer configured as tabs.
fn active_category(state: &AppState, requested: Option<&str>) -> String {
    requested
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| state.config.default_category())
        .to_string()
}

fn parse_positive(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|n| *n != 0)
}

pub fn index_url(category: &str, player: Option<&str>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("category", category);
    if let Some(player) = player {
        query.append_pair("player", player);
    }
    format!("/?{}", query.finish())
}
