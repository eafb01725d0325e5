//! Asset endpoints.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::dto::{AssetResponse, CreateAssetRequest, ListAssetsQuery, UpdateAssetRequest};
use crate::error::ApiError;
use crate::state::AppState;
use kardex_core::db::{
    create_asset_repository, create_asset_type_repository, AssetFilter, AssetRepository,
    AssetTypeRepository,
};
use kardex_core::{Asset, AssetType};

/// Creates asset routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_assets).post(create_asset))
        .route(
            "/{id}",
            get(get_asset).put(update_asset).delete(delete_asset),
        )
        .route(
            "/{id}/",
            get(get_asset).put(update_asset).delete(delete_asset),
        )
}

/// Loads the asset's type and builds the projected response.
async fn to_response(
    types: &dyn AssetTypeRepository,
    asset: &Asset,
) -> Result<AssetResponse, ApiError> {
    let ty = types.get(asset.asset_type_id).await?.ok_or_else(|| {
        ApiError::Internal(format!(
            "Asset {} references missing type {}",
            asset.id, asset.asset_type_id
        ))
    })?;
    Ok(AssetResponse::from_parts(asset, &ty))
}

/// List all assets, optionally filtered by type.
#[utoipa::path(
    get,
    path = "/api/assets/",
    params(ListAssetsQuery),
    responses(
        (status = 200, description = "Assets", body = [AssetResponse]),
        (status = 401, description = "Missing or invalid API key")
    ),
    tag = "Assets"
)]
pub(crate) async fn list_assets(
    State(state): State<AppState>,
    Query(query): Query<ListAssetsQuery>,
) -> Result<Json<Vec<AssetResponse>>, ApiError> {
    let assets: Box<dyn AssetRepository> = create_asset_repository(&state.db);
    let types: Box<dyn AssetTypeRepository> = create_asset_type_repository(&state.db);

    let filter = AssetFilter {
        asset_type_id: query.asset_type_id,
    };
    let listed = assets.list(&filter).await?;

    // One type lookup per distinct type across the listing.
    let mut type_cache: HashMap<i64, AssetType> = HashMap::new();
    let mut responses = Vec::with_capacity(listed.len());
    for asset in &listed {
        if !type_cache.contains_key(&asset.asset_type_id) {
            let ty = types.get(asset.asset_type_id).await?.ok_or_else(|| {
                ApiError::Internal(format!(
                    "Asset {} references missing type {}",
                    asset.id, asset.asset_type_id
                ))
            })?;
            type_cache.insert(asset.asset_type_id, ty);
        }
        let ty = &type_cache[&asset.asset_type_id];
        responses.push(AssetResponse::from_parts(asset, ty));
    }

    Ok(Json(responses))
}

/// Create a new asset with initial field values.
#[utoipa::path(
    post,
    path = "/api/assets/",
    request_body = CreateAssetRequest,
    responses(
        (status = 201, description = "Asset created", body = AssetResponse),
        (status = 400, description = "Unknown field or invalid value"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Unknown asset type")
    ),
    tag = "Assets"
)]
pub(crate) async fn create_asset(
    State(state): State<AppState>,
    Json(request): Json<CreateAssetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let assets: Box<dyn AssetRepository> = create_asset_repository(&state.db);
    let types: Box<dyn AssetTypeRepository> = create_asset_type_repository(&state.db);

    let created = assets.create(request.asset_type_id, &request.data).await?;
    let response = to_response(types.as_ref(), &created).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Get a single asset by ID.
#[utoipa::path(
    get,
    path = "/api/assets/{id}/",
    params(("id" = i64, Path, description = "Asset id")),
    responses(
        (status = 200, description = "The asset", body = AssetResponse),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Unknown asset")
    ),
    tag = "Assets"
)]
pub(crate) async fn get_asset(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AssetResponse>, ApiError> {
    let assets: Box<dyn AssetRepository> = create_asset_repository(&state.db);
    let types: Box<dyn AssetTypeRepository> = create_asset_type_repository(&state.db);

    let asset = assets
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Asset {} not found", id)))?;
    let response = to_response(types.as_ref(), &asset).await?;

    Ok(Json(response))
}

/// Update an asset's field values.
#[utoipa::path(
    put,
    path = "/api/assets/{id}/",
    params(("id" = i64, Path, description = "Asset id")),
    request_body = UpdateAssetRequest,
    responses(
        (status = 200, description = "Asset updated", body = AssetResponse),
        (status = 400, description = "Unknown field or invalid value"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Unknown asset")
    ),
    tag = "Assets"
)]
pub(crate) async fn update_asset(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateAssetRequest>,
) -> Result<Json<AssetResponse>, ApiError> {
    let assets: Box<dyn AssetRepository> = create_asset_repository(&state.db);
    let types: Box<dyn AssetTypeRepository> = create_asset_type_repository(&state.db);

    let updated = assets.update(id, &request.data).await?;
    let response = to_response(types.as_ref(), &updated).await?;

    Ok(Json(response))
}

/// Delete an asset and its values.
#[utoipa::path(
    delete,
    path = "/api/assets/{id}/",
    params(("id" = i64, Path, description = "Asset id")),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Unknown asset")
    ),
    tag = "Assets"
)]
pub(crate) async fn delete_asset(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let assets: Box<dyn AssetRepository> = create_asset_repository(&state.db);

    let deleted = assets.delete(id).await?;
    if !deleted {
        return Err(ApiError::NotFound(format!("Asset {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
