use crate::models::*;
use crate::services::{AllocationService, ResultService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/results",
    tag = "results",
    request_body = CreateResultRequest,
    responses(
        (status = 200, description = "Result created", body = ResultResponse),
        (status = 400, description = "Invalid winner list"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "A result already exists for the event")
    )
)]
/// Create the result aggregate for an event (winners only, no allocation)
pub async fn create_result(
    service: web::Data<ResultService>,
    body: web::Json<CreateResultRequest>,
) -> Result<HttpResponse> {
    match service.create(&body.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/results/{id}",
    tag = "results",
    params(("id" = i64, Path, description = "Result id")),
    responses(
        (status = 200, description = "Result with winners, awards and allocation state", body = ResultResponse),
        (status = 404, description = "Result not found")
    )
)]
pub async fn get_result(
    service: web::Data<ResultService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.get(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/results/{id}/winners",
    tag = "results",
    params(("id" = i64, Path, description = "Result id")),
    request_body = ReplaceWinnersRequest,
    responses(
        (status = 200, description = "Winner list replaced", body = ResultResponse),
        (status = 400, description = "Invalid winners or result already finalized"),
        (status = 404, description = "Result not found")
    )
)]
/// Replace the whole winner list (the import path)
pub async fn replace_winners(
    service: web::Data<ResultService>,
    path: web::Path<i64>,
    body: web::Json<ReplaceWinnersRequest>,
) -> Result<HttpResponse> {
    let result_id = path.into_inner();
    match service
        .replace_winners(result_id, body.into_inner().winners)
        .await
    {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/results/{id}",
    tag = "results",
    params(("id" = i64, Path, description = "Result id")),
    responses(
        (status = 200, description = "Result soft-deleted"),
        (status = 400, description = "Result is mid-allocation or finalized"),
        (status = 404, description = "Result not found")
    )
)]
pub async fn delete_result(
    service: web::Data<ResultService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/results/{id}/allocateAwards",
    tag = "allocation",
    params(("id" = i64, Path, description = "Result id")),
    responses(
        (status = 200, description = "Lock acquired, recommendations computed", body = AllocationProposalResponse),
        (status = 400, description = "Result already finalized"),
        (status = 404, description = "Result, event or winner's player missing"),
        (status = 409, description = "Another result is currently mid-allocation")
    )
)]
/// Acquire the system-wide allocation lock for this result and compute
/// award recommendations for operator review. Nothing but the lock is
/// persisted until the list is submitted back.
pub async fn allocate_awards(
    service: web::Data<AllocationService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.get_recommendations(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/results/{id}/allocateAwards",
    tag = "allocation",
    params(("id" = i64, Path, description = "Result id")),
    request_body = FinalizeAwardsRequest,
    responses(
        (status = 200, description = "Awards committed", body = ResultResponse),
        (status = 400, description = "Lock not held, already finalized, or empty award list"),
        (status = 404, description = "Result not found")
    )
)]
/// Commit the operator-reviewed award list: assign every award, snapshot
/// the list onto the result and mark it finalized. One transaction.
pub async fn finalize_awards(
    service: web::Data<AllocationService>,
    path: web::Path<i64>,
    body: web::Json<FinalizeAwardsRequest>,
) -> Result<HttpResponse> {
    let result_id = path.into_inner();
    match service.finalize(result_id, body.into_inner().awards).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/results/{id}/deallocateAwards",
    tag = "allocation",
    params(("id" = i64, Path, description = "Result id")),
    responses(
        (status = 200, description = "Awards released, lock cleared", body = AllocationProposalResponse),
        (status = 404, description = "Result not found")
    )
)]
/// Release all committed awards and clear the allocation state. Idempotent.
pub async fn deallocate_awards(
    service: web::Data<AllocationService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.deallocate(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn result_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/results")
            .route("", web::post().to(create_result))
            .route("/{id}", web::get().to(get_result))
            .route("/{id}", web::delete().to(delete_result))
            .route("/{id}/winners", web::put().to(replace_winners))
            .route("/{id}/allocateAwards", web::get().to(allocate_awards))
            .route("/{id}/allocateAwards", web::post().to(finalize_awards))
            .route("/{id}/deallocateAwards", web::get().to(deallocate_awards)),
    );
}
