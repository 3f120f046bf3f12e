use axum::{
    extract::State,
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{ListingCreate, ListingQuery, ListingUpdate, ListingView, ListingWithAuthorView};
use super::repo_types::Listing;
use crate::{
    auth::extractors::CurrentUser,
    error::{ApiError, DomainError},
    extract::{ApiJson, ApiPath, ApiQuery},
    guards::{ensure_unique_id, verify_owner},
    listings::repo::ListingRepo,
    state::AppState,
};

pub fn listing_routes() -> Router<AppState> {
    Router::new()
        .route("/listings", get(list_listings).post(create_listing))
        .route(
            "/listings/:listing_id",
            get(get_listing).patch(update_listing).delete(delete_listing),
        )
}

async fn find_listing(listings: &dyn ListingRepo, id: Uuid) -> Result<Listing, DomainError> {
    listings.get(id).await?.ok_or(DomainError::NotFound("Listing"))
}

#[instrument(skip(state, user, payload))]
pub async fn create_listing(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(payload): ApiJson<ListingCreate>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<ListingView>), ApiError> {
    payload.validate()?;

    let listings = state.listings.as_ref();
    let mut listing = payload.into_listing(user.id);
    listing.id = ensure_unique_id(listing.id, |id| listings.exists(*id)).await?;
    listings.insert(&listing).await?;

    info!(listing_id = %listing.id, user_id = %user.id, "listing created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/listings/{}", listing.id))],
        Json(ListingView::from(listing)),
    ))
}

#[instrument(skip(state))]
pub async fn list_listings(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListingQuery>,
) -> Result<Json<Vec<ListingWithAuthorView>>, ApiError> {
    let filter = query.into_filter()?;
    let items = state
        .listings
        .list(&filter)
        .await?
        .into_iter()
        .map(ListingWithAuthorView::from)
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_listing(
    State(state): State<AppState>,
    ApiPath(listing_id): ApiPath<Uuid>,
) -> Result<Json<ListingWithAuthorView>, ApiError> {
    let listing = state
        .listings
        .get_with_author(listing_id)
        .await?
        .ok_or(DomainError::NotFound("Listing"))?;
    Ok(Json(listing.into()))
}

#[instrument(skip(state, user, payload))]
pub async fn update_listing(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(listing_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ListingUpdate>,
) -> Result<Json<ListingView>, ApiError> {
    let mut listing = find_listing(state.listings.as_ref(), listing_id).await?;
    verify_owner(listing.author_id, user.id)?;
    payload.validate()?;

    payload.apply_to(&mut listing);
    state.listings.update(&listing).await?;

    info!(%listing_id, user_id = %user.id, "listing updated");
    Ok(Json(listing.into()))
}

#[instrument(skip(state, user))]
pub async fn delete_listing(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(listing_id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    let listing = find_listing(state.listings.as_ref(), listing_id).await?;
    verify_owner(listing.author_id, user.id)?;

    state.listings.delete(listing.id).await?;

    info!(%listing_id, user_id = %user.id, "listing deleted");
    Ok(StatusCode::NO_CONTENT)
}
