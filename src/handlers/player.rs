use crate::models::*;
use crate::services::{PlayerService, PreferenceService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/players",
    tag = "players",
    request_body = CreatePlayerRequest,
    responses(
        (status = 200, description = "Player created", body = PlayerResponse),
        (status = 400, description = "Missing federation id or name"),
        (status = 409, description = "Federation id already registered")
    )
)]
pub async fn create_player(
    service: web::Data<PlayerService>,
    body: web::Json<CreatePlayerRequest>,
) -> Result<HttpResponse> {
    match service.create(&body.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/players/{id}",
    tag = "players",
    params(("id" = i64, Path, description = "Player id")),
    responses(
        (status = 200, description = "Player", body = PlayerResponse),
        (status = 404, description = "Player not found")
    )
)]
pub async fn get_player(
    service: web::Data<PlayerService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.get(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/players/{id}",
    tag = "players",
    params(("id" = i64, Path, description = "Player id")),
    responses(
        (status = 200, description = "Player and their preferences removed"),
        (status = 400, description = "Player still holds awards"),
        (status = 404, description = "Player not found")
    )
)]
pub async fn delete_player(
    service: web::Data<PlayerService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/players/{id}/preferences",
    tag = "preferences",
    params(("id" = i64, Path, description = "Player id")),
    responses(
        (status = 200, description = "Ranked preferences, most preferred first", body = [PreferenceResponse])
    )
)]
pub async fn get_preferences(
    service: web::Data<PreferenceService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.list_by_player(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/players/{id}/preferences",
    tag = "preferences",
    params(("id" = i64, Path, description = "Player id")),
    request_body = ReplacePreferencesRequest,
    responses(
        (status = 200, description = "Ranking replaced", body = [PreferenceResponse]),
        (status = 400, description = "Duplicate award in the list"),
        (status = 404, description = "Unknown award in the list")
    )
)]
/// Replace the player's whole ranking; the next recommendation pass sees
/// the new preferences.
pub async fn replace_preferences(
    service: web::Data<PreferenceService>,
    path: web::Path<i64>,
    body: web::Json<ReplacePreferencesRequest>,
) -> Result<HttpResponse> {
    let player_id = path.into_inner();
    match service
        .replace_all(player_id, &body.into_inner().award_ids)
        .await
    {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn player_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/players")
            .route("", web::post().to(create_player))
            .route("/{id}", web::get().to(get_player))
            .route("/{id}", web::delete().to(delete_player))
            .route("/{id}/preferences", web::get().to(get_preferences))
            .route("/{id}/preferences", web::put().to(replace_preferences)),
    );
}
