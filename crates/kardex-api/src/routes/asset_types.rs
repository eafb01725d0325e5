//! Asset type endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use validator::Validate;

use crate::dto::{AddFieldRequest, AssetTypeResponse, CreateAssetTypeRequest, FieldResponse};
use crate::error::ApiError;
use crate::state::AppState;
use kardex_core::db::{create_asset_type_repository, AssetTypeRepository};
use kardex_core::FieldSpec;

/// Creates asset type routes.
///
/// Each path is registered with and without a trailing slash; the catalog
/// API is historically consumed with trailing slashes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_asset_types).post(create_asset_type))
        .route("/{id}", get(get_asset_type))
        .route("/{id}/", get(get_asset_type))
        .route("/{id}/fields", get(list_fields).post(add_field))
        .route("/{id}/fields/", get(list_fields).post(add_field))
}

/// List all asset types.
#[utoipa::path(
    get,
    path = "/api/asset-types/",
    responses(
        (status = 200, description = "All asset types", body = [AssetTypeResponse]),
        (status = 401, description = "Missing or invalid API key")
    ),
    tag = "Asset Types"
)]
pub(crate) async fn list_asset_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<AssetTypeResponse>>, ApiError> {
    let repo: Box<dyn AssetTypeRepository> = create_asset_type_repository(&state.db);

    let types = repo.list().await?;
    let responses: Vec<AssetTypeResponse> =
        types.into_iter().map(AssetTypeResponse::from).collect();

    Ok(Json(responses))
}

/// Create a new asset type with its fields.
#[utoipa::path(
    post,
    path = "/api/asset-types/",
    request_body = CreateAssetTypeRequest,
    responses(
        (status = 201, description = "Asset type created", body = AssetTypeResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 409, description = "Type name already taken")
    ),
    tag = "Asset Types"
)]
pub(crate) async fn create_asset_type(
    State(state): State<AppState>,
    Json(request): Json<CreateAssetTypeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    let repo: Box<dyn AssetTypeRepository> = create_asset_type_repository(&state.db);

    let fields: Vec<FieldSpec> = request.fields.into_iter().map(FieldSpec::from).collect();
    let created = repo.create(&request.name, &fields).await?;

    Ok((StatusCode::CREATED, Json(AssetTypeResponse::from(created))))
}

/// Get a single asset type by ID.
#[utoipa::path(
    get,
    path = "/api/asset-types/{id}/",
    params(("id" = i64, Path, description = "Asset type id")),
    responses(
        (status = 200, description = "The asset type", body = AssetTypeResponse),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Unknown asset type")
    ),
    tag = "Asset Types"
)]
pub(crate) async fn get_asset_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AssetTypeResponse>, ApiError> {
    let repo: Box<dyn AssetTypeRepository> = create_asset_type_repository(&state.db);

    let ty = repo
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Asset type {} not found", id)))?;

    Ok(Json(AssetTypeResponse::from(ty)))
}

/// List the fields of an asset type.
#[utoipa::path(
    get,
    path = "/api/asset-types/{id}/fields/",
    params(("id" = i64, Path, description = "Asset type id")),
    responses(
        (status = 200, description = "Fields of the type", body = [FieldResponse]),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Unknown asset type")
    ),
    tag = "Asset Types"
)]
pub(crate) async fn list_fields(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<FieldResponse>>, ApiError> {
    let repo: Box<dyn AssetTypeRepository> = create_asset_type_repository(&state.db);

    let fields = repo.list_fields(id).await?;
    let responses: Vec<FieldResponse> = fields.into_iter().map(FieldResponse::from).collect();

    Ok(Json(responses))
}

/// Add a field to an asset type.
#[utoipa::path(
    post,
    path = "/api/asset-types/{id}/fields/",
    params(("id" = i64, Path, description = "Asset type id")),
    request_body = AddFieldRequest,
    responses(
        (status = 201, description = "Field added", body = FieldResponse),
        (status = 400, description = "Field already on the type"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Unknown asset type")
    ),
    tag = "Asset Types"
)]
pub(crate) async fn add_field(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AddFieldRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    let repo: Box<dyn AssetTypeRepository> = create_asset_type_repository(&state.db);

    let field = repo.add_field(id, &request.name, request.field_type).await?;

    Ok((StatusCode::CREATED, Json(FieldResponse::from(field))))
}
