// src/api/handlers/member_handler.rs
use crate::api::dto::member_dto::{
    CreateLoyaltyMemberDto, CreateMemberDto, CreatePrepaidMemberDto, MemberIdResponse,
    UpdateLoyaltyMemberDto, UpdateMemberDto, UpdatePrepaidMemberDto,
};
use crate::api::AppState;
use crate::domain::member::MemberKind;
use crate::domain::{loyalty_member_model, member_model, prepaid_member_model};
use crate::error::{AppError, AppResult};
use crate::types::ApiResponse;
use crate::utils::error_helper::convert_validation_errors;
use axum::{
    extract::{Json, Path, State},
    routing::get,
    Router,
};
use tracing::info;
use validator::Validate;

fn path_id(id: &str) -> String {
    id.trim().to_ascii_uppercase()
}

fn not_found(kind: MemberKind, id: &str) -> AppError {
    AppError::NotFound(kind.not_found_message(id))
}

// --- Subscription ---

pub async fn list_members_handler(
    State(app_state): State<AppState>,
) -> AppResult<ApiResponse<Vec<member_model::Model>>> {
    let members = app_state.member_cache.subscriptions.all().await?;
    let count = members.len();
    Ok(ApiResponse::success(members).with_count(count))
}

pub async fn get_member_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<member_model::Model>> {
    let id = path_id(&id);
    let member = app_state
        .member_cache
        .subscriptions
        .get(&id)
        .await?
        .ok_or_else(|| not_found(MemberKind::Subscription, &id))?;
    Ok(ApiResponse::success(member))
}

pub async fn create_member_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateMemberDto>,
) -> AppResult<ApiResponse<MemberIdResponse>> {
    payload
        .validate()
        .map_err(|e| convert_validation_errors(e, "member_handler::create_member"))?;

    let id = app_state
        .member_cache
        .subscriptions
        .create(payload.into_model())
        .await?;

    info!(member_id = %id, "Subscription member saved");
    Ok(ApiResponse::created(MemberIdResponse { id }))
}

pub async fn update_member_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateMemberDto>,
) -> AppResult<ApiResponse<MemberIdResponse>> {
    payload
        .validate()
        .map_err(|e| convert_validation_errors(e, "member_handler::update_member"))?;

    let id = app_state
        .member_cache
        .subscriptions
        .update(&path_id(&id), payload.into())
        .await?;

    info!(member_id = %id, "Subscription member updated");
    Ok(ApiResponse::success(MemberIdResponse { id }))
}

pub async fn delete_member_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MemberIdResponse>> {
    let id = app_state
        .member_cache
        .subscriptions
        .delete(&path_id(&id))
        .await?;

    info!(member_id = %id, "Subscription member deleted");
    Ok(ApiResponse::success(MemberIdResponse { id }))
}

// --- Loyalty ---

pub async fn list_loyalty_members_handler(
    State(app_state): State<AppState>,
) -> AppResult<ApiResponse<Vec<loyalty_member_model::Model>>> {
    let members = app_state.member_cache.loyalty.all().await?;
    let count = members.len();
    Ok(ApiResponse::success(members).with_count(count))
}

pub async fn get_loyalty_member_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<loyalty_member_model::Model>> {
    let id = path_id(&id);
    let member = app_state
        .member_cache
        .loyalty
        .get(&id)
        .await?
        .ok_or_else(|| not_found(MemberKind::Loyalty, &id))?;
    Ok(ApiResponse::success(member))
}

pub async fn create_loyalty_member_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateLoyaltyMemberDto>,
) -> AppResult<ApiResponse<MemberIdResponse>> {
    payload
        .validate()
        .map_err(|e| convert_validation_errors(e, "member_handler::create_loyalty_member"))?;

    let id = app_state
        .member_cache
        .loyalty
        .create(payload.into_model())
        .await?;

    info!(member_id = %id, "Loyalty member saved");
    Ok(ApiResponse::created(MemberIdResponse { id }))
}

pub async fn update_loyalty_member_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateLoyaltyMemberDto>,
) -> AppResult<ApiResponse<MemberIdResponse>> {
    payload
        .validate()
        .map_err(|e| convert_validation_errors(e, "member_handler::update_loyalty_member"))?;

    let id = app_state
        .member_cache
        .loyalty
        .update(&path_id(&id), payload.into())
        .await?;

    info!(member_id = %id, "Loyalty member updated");
    Ok(ApiResponse::success(MemberIdResponse { id }))
}

pub async fn delete_loyalty_member_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MemberIdResponse>> {
    let id = app_state
        .member_cache
        .loyalty
        .delete(&path_id(&id))
        .await?;

    info!(member_id = %id, "Loyalty member deleted");
    Ok(ApiResponse::success(MemberIdResponse { id }))
}

// --- Prepaid ---

pub async fn list_prepaid_members_handler(
    State(app_state): State<AppState>,
) -> AppResult<ApiResponse<Vec<prepaid_member_model::Model>>> {
    let members = app_state.member_cache.prepaid.all().await?;
    let count = members.len();
    Ok(ApiResponse::success(members).with_count(count))
}

pub async fn get_prepaid_member_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<prepaid_member_model::Model>> {
    let id = path_id(&id);
    let member = app_state
        .member_cache
        .prepaid
        .get(&id)
        .await?
        .ok_or_else(|| not_found(MemberKind::Prepaid, &id))?;
    Ok(ApiResponse::success(member))
}

pub async fn create_prepaid_member_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<CreatePrepaidMemberDto>,
) -> AppResult<ApiResponse<MemberIdResponse>> {
    payload
        .validate()
        .map_err(|e| convert_validation_errors(e, "member_handler::create_prepaid_member"))?;

    let id = app_state
        .member_cache
        .prepaid
        .create(payload.into_model())
        .await?;

    info!(member_id = %id, "Prepaid member saved");
    Ok(ApiResponse::created(MemberIdResponse { id }))
}

pub async fn update_prepaid_member_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePrepaidMemberDto>,
) -> AppResult<ApiResponse<MemberIdResponse>> {
    payload
        .validate()
        .map_err(|e| convert_validation_errors(e, "member_handler::update_prepaid_member"))?;

    let id = app_state
        .member_cache
        .prepaid
        .update(&path_id(&id), payload.into())
        .await?;

    info!(member_id = %id, "Prepaid member updated");
    Ok(ApiResponse::success(MemberIdResponse { id }))
}

pub async fn delete_prepaid_member_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MemberIdResponse>> {
    let id = app_state
        .member_cache
        .prepaid
        .delete(&path_id(&id))
        .await?;

    info!(member_id = %id, "Prepaid member deleted");
    Ok(ApiResponse::success(MemberIdResponse { id }))
}

pub fn member_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/members",
            get(list_members_handler).post(create_member_handler),
        )
        .route(
            "/members/{id}",
            get(get_member_handler)
                .patch(update_member_handler)
                .delete(delete_member_handler),
        )
        .route(
            "/loyalty-members",
            get(list_loyalty_members_handler).post(create_loyalty_member_handler),
        )
        .route(
            "/loyalty-members/{id}",
            get(get_loyalty_member_handler)
                .patch(update_loyalty_member_handler)
                .delete(delete_loyalty_member_handler),
        )
        .route(
            "/prepaid-members",
            get(list_prepaid_members_handler).post(create_prepaid_member_handler),
        )
        .route(
            "/prepaid-members/{id}",
            get(get_prepaid_member_handler)
                .patch(update_prepaid_member_handler)
                .delete(delete_prepaid_member_handler),
        )
        .with_state(app_state)
}
