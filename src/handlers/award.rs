use crate::models::*;
use crate::services::AwardService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/awards",
    tag = "awards",
    params(
        ("page" = Option<u32>, Query, description = "Page number (default 1)"),
        ("per_page" = Option<u32>, Query, description = "Page size (default 20)"),
        ("available" = Option<bool>, Query, description = "Filter by availability")
    ),
    responses(
        (status = 200, description = "Award units (paginated)", body = PaginatedResponse<AwardResponse>)
    )
)]
pub async fn list_awards(
    service: web::Data<AwardService>,
    query: web::Query<AwardQuery>,
) -> Result<HttpResponse> {
    match service.list(&query.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/awards/{id}",
    tag = "awards",
    params(("id" = i64, Path, description = "Award id")),
    responses(
        (status = 200, description = "Award deleted"),
        (status = 400, description = "Award is assigned or referenced by a finalized result"),
        (status = 404, description = "Award not found")
    )
)]
pub async fn delete_award(
    service: web::Data<AwardService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn award_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/awards")
            .route("", web::get().to(list_awards))
            .route("/{id}", web::delete().to(delete_award)),
    );
}
