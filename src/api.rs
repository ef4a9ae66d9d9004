use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::app::{AnswerResult, App, AppError, WordSource};
use crate::classify::{classify, matching_categories, Category, CategoryCounts, SrsFilter};
use crate::models::{Collection, NewWord, PracticeProject, ReviewOutcome, ReviewWord, WordRecord};
use crate::practice::{self, MatchingGame, QuizDirection, QuizQuestion};
use crate::srs::{preview_intervals, IntervalPreview};
use crate::stats::{daily_review_history, DailyReviewCount};
use crate::store::StoreError;

/// One lock for the whole store: every read-modify-write-persist cycle runs
/// alone, so two reviews of the same word cannot lose an update.
#[derive(Clone)]
pub struct ApiState {
    pub app: Arc<Mutex<App>>,
}

impl ApiState {
    pub fn new(app: App) -> Self {
        Self {
            app: Arc::new(Mutex::new(app)),
        }
    }
}

pub fn app_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/collections", get(list_collections).post(create_collection))
        .route(
            "/api/collections/:id",
            patch(rename_collection).delete(delete_collection),
        )
        .route("/api/collections/:id/words", post(add_word))
        .route(
            "/api/words/:id",
            get(get_word).patch(edit_word).delete(delete_word),
        )
        .route("/api/words/:id/review", post(review_word))
        .route("/api/words/:id/answer", post(answer_word))
        .route("/api/words/:id/reset", post(reset_word))
        .route("/api/reset", post(reset_all))
        .route("/api/stats", get(stats))
        .route("/api/history/daily", get(daily_history))
        .route("/api/session", post(start_session))
        .route("/api/quiz", post(start_quiz))
        .route("/api/matching", post(start_matching))
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/:id",
            patch(edit_project).delete(delete_project),
        )
        .route("/api/projects/:id/sets", post(add_project_sets))
        .route(
            "/api/review-list",
            get(get_review_list).delete(clear_review_list),
        )
        .route("/api/review-list/:word_id", delete(remove_from_review_list))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::Store(StoreError::EmptyTerms) => StatusCode::BAD_REQUEST,
            AppError::Store(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientVocabulary { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Storage(err) => {
                log::error!("Failed to persist vocabulary: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ==================== Collections ====================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCollectionRequest {
    name: String,
    #[serde(default)]
    words: Vec<NewWord>,
}

#[derive(Deserialize)]
struct RenameRequest {
    name: String,
}

async fn list_collections(State(state): State<ApiState>) -> Json<Vec<Collection>> {
    let app = state.app.lock().await;
    Json(app.store().collections().to_vec())
}

async fn create_collection(
    State(state): State<ApiState>,
    Json(payload): Json<CreateCollectionRequest>,
) -> Result<(StatusCode, Json<Collection>), ApiError> {
    let mut app = state.app.lock().await;
    let collection =
        app.mutate(|store| store.add_collection(&payload.name, payload.words).cloned())?;
    log::info!(
        "Created collection \"{}\" with {} words",
        collection.name,
        collection.words.len()
    );
    Ok((StatusCode::CREATED, Json(collection)))
}

async fn rename_collection(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(payload): Json<RenameRequest>,
) -> ApiResult<Collection> {
    let mut app = state.app.lock().await;
    let collection = app.mutate(|store| {
        store.rename_collection(&id, &payload.name)?;
        store.collection(&id).cloned()
    })?;
    Ok(Json(collection))
}

async fn delete_collection(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut app = state.app.lock().await;
    let removed = app.mutate(|store| store.remove_collection(&id))?;
    log::info!("Deleted collection \"{}\"", removed.name);
    Ok(StatusCode::NO_CONTENT)
}

async fn add_word(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(payload): Json<NewWord>,
) -> Result<(StatusCode, Json<WordRecord>), ApiError> {
    let mut app = state.app.lock().await;
    let word = app.mutate(|store| store.add_word(&id, payload).cloned())?;
    Ok((StatusCode::CREATED, Json(word)))
}

// ==================== Words ====================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WordDetail {
    word: WordRecord,
    /// Dominant label. A word matching no predicate still reads `learning`,
    /// so filters and counts follow `categories` instead.
    category: Category,
    categories: Vec<Category>,
    preview: IntervalPreview,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditWordRequest {
    term_a: String,
    term_b: String,
}

#[derive(Deserialize)]
struct ReviewRequest {
    outcome: ReviewOutcome,
}

#[derive(Deserialize)]
struct AnswerRequest {
    input: String,
    #[serde(default)]
    direction: QuizDirection,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteWordResponse {
    word: WordRecord,
    removed_empty_collection: bool,
}

async fn get_word(State(state): State<ApiState>, Path(id): Path<String>) -> ApiResult<WordDetail> {
    let app = state.app.lock().await;
    let word = app.store().word(&id)?.clone();
    let now = Utc::now();
    Ok(Json(WordDetail {
        category: classify(&word, now),
        categories: matching_categories(&word, now),
        preview: preview_intervals(&word),
        word,
    }))
}

async fn edit_word(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(payload): Json<EditWordRequest>,
) -> ApiResult<WordRecord> {
    let mut app = state.app.lock().await;
    let word = app.mutate(|store| {
        store
            .edit_word(&id, &payload.term_a, &payload.term_b)
            .cloned()
    })?;
    Ok(Json(word))
}

async fn delete_word(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<DeleteWordResponse> {
    let mut app = state.app.lock().await;
    let (word, removed_empty_collection) = app.mutate(|store| store.remove_word(&id))?;
    Ok(Json(DeleteWordResponse {
        word,
        removed_empty_collection,
    }))
}

async fn review_word(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(payload): Json<ReviewRequest>,
) -> ApiResult<WordRecord> {
    let mut app = state.app.lock().await;
    let now = Utc::now();
    let word = app.mutate(|store| store.review(&id, payload.outcome, now).cloned())?;
    Ok(Json(word))
}

async fn answer_word(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(payload): Json<AnswerRequest>,
) -> ApiResult<AnswerResult> {
    let mut app = state.app.lock().await;
    let result = app.submit_answer(&id, &payload.input, payload.direction, Utc::now())?;
    Ok(Json(result))
}

async fn reset_word(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<WordRecord> {
    let mut app = state.app.lock().await;
    let now = Utc::now();
    let word = app.mutate(|store| store.reset_progress(&id, now).cloned())?;
    Ok(Json(word))
}

async fn reset_all(State(state): State<ApiState>) -> ApiResult<serde_json::Value> {
    let mut app = state.app.lock().await;
    let now = Utc::now();
    let reset = app.mutate(|store| Ok(store.reset_all_progress(now)))?;
    Ok(Json(json!({ "reset": reset })))
}

// ==================== Statistics ====================

async fn stats(State(state): State<ApiState>) -> Json<CategoryCounts> {
    let app = state.app.lock().await;
    Json(app.store().category_counts(Utc::now()))
}

async fn daily_history(State(state): State<ApiState>) -> Json<Vec<DailyReviewCount>> {
    let app = state.app.lock().await;
    let words = app.store().all_words();
    Json(daily_review_history(&words))
}

// ==================== Practice ====================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRequest {
    collection_ids: Option<Vec<String>>,
    project_id: Option<String>,
    #[serde(default)]
    filter: SrsFilter,
    size: Option<usize>,
    #[serde(default = "default_shuffle")]
    shuffle: bool,
}

fn default_shuffle() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuizRequest {
    collection_ids: Option<Vec<String>>,
    project_id: Option<String>,
    count: usize,
    #[serde(default)]
    direction: QuizDirection,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchingRequest {
    collection_ids: Option<Vec<String>>,
    project_id: Option<String>,
    #[serde(default)]
    filter: SrsFilter,
    size: Option<usize>,
}

async fn start_session(
    State(state): State<ApiState>,
    Json(payload): Json<SessionRequest>,
) -> ApiResult<Vec<WordRecord>> {
    let app = state.app.lock().await;
    let source = WordSource {
        collection_ids: payload.collection_ids,
        project_id: payload.project_id,
    };
    let session = app.start_session(
        &source,
        payload.filter,
        payload.size,
        payload.shuffle,
        &mut rand::thread_rng(),
        Utc::now(),
    )?;
    Ok(Json(session))
}

async fn start_quiz(
    State(state): State<ApiState>,
    Json(payload): Json<QuizRequest>,
) -> ApiResult<Vec<QuizQuestion>> {
    let app = state.app.lock().await;
    let source = WordSource {
        collection_ids: payload.collection_ids,
        project_id: payload.project_id,
    };
    let questions = app.start_quiz(
        &source,
        payload.count,
        payload.direction,
        &mut rand::thread_rng(),
    )?;
    Ok(Json(questions))
}

async fn start_matching(
    State(state): State<ApiState>,
    Json(payload): Json<MatchingRequest>,
) -> ApiResult<MatchingGame> {
    let app = state.app.lock().await;
    let source = WordSource {
        collection_ids: payload.collection_ids,
        project_id: payload.project_id,
    };
    let mut rng = rand::thread_rng();
    let words = app.start_session(
        &source,
        payload.filter,
        payload.size,
        true,
        &mut rng,
        Utc::now(),
    )?;
    Ok(Json(practice::generate_matching_game(&words, &mut rng)))
}

// ==================== Projects ====================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectRequest {
    name: String,
    #[serde(default)]
    set_ids: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectSetsRequest {
    set_ids: Vec<String>,
}

async fn list_projects(State(state): State<ApiState>) -> Json<Vec<PracticeProject>> {
    let app = state.app.lock().await;
    Json(app.store().projects().to_vec())
}

async fn create_project(
    State(state): State<ApiState>,
    Json(payload): Json<ProjectRequest>,
) -> Result<(StatusCode, Json<PracticeProject>), ApiError> {
    let mut app = state.app.lock().await;
    let project =
        app.mutate(|store| Ok(store.add_project(&payload.name, payload.set_ids).clone()))?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn edit_project(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(payload): Json<ProjectRequest>,
) -> ApiResult<PracticeProject> {
    let mut app = state.app.lock().await;
    let project = app.mutate(|store| {
        store
            .edit_project(&id, &payload.name, payload.set_ids)
            .cloned()
    })?;
    Ok(Json(project))
}

async fn delete_project(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut app = state.app.lock().await;
    app.mutate(|store| store.remove_project(&id))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_project_sets(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(payload): Json<ProjectSetsRequest>,
) -> ApiResult<PracticeProject> {
    let mut app = state.app.lock().await;
    let project = app.mutate(|store| store.add_sets_to_project(&id, payload.set_ids).cloned())?;
    Ok(Json(project))
}

// ==================== Review list ====================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReviewListResponse {
    entries: Vec<ReviewWord>,
    words: Vec<WordRecord>,
}

async fn get_review_list(State(state): State<ApiState>) -> Json<ReviewListResponse> {
    let app = state.app.lock().await;
    let list = app.store().review_list();
    Json(ReviewListResponse {
        entries: list.entries().to_vec(),
        words: list.resolve(&app.store().all_words()),
    })
}

async fn clear_review_list(State(state): State<ApiState>) -> Result<StatusCode, ApiError> {
    let mut app = state.app.lock().await;
    app.mutate(|store| {
        store.review_list_mut().clear();
        Ok(())
    })?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_from_review_list(
    State(state): State<ApiState>,
    Path(word_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut app = state.app.lock().await;
    let removed = app.mutate(|store| Ok(store.review_list_mut().remove(&word_id)))?;
    Ok(if removed {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    })
}
