use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{AllocationKind, AllocationState, ResultAward, Winner};
use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::event::create_event,
        handlers::event::get_event,
        handlers::player::create_player,
        handlers::player::get_player,
        handlers::player::delete_player,
        handlers::player::get_preferences,
        handlers::player::replace_preferences,
        handlers::prize::create_prize,
        handlers::prize::list_prizes,
        handlers::award::list_awards,
        handlers::award::delete_award,
        handlers::result::create_result,
        handlers::result::get_result,
        handlers::result::replace_winners,
        handlers::result::delete_result,
        handlers::result::allocate_awards,
        handlers::result::finalize_awards,
        handlers::result::deallocate_awards,
    ),
    components(
        schemas(
            ApiError,
            CreateEventRequest,
            EventResponse,
            CreatePlayerRequest,
            PlayerResponse,
            ReplacePreferencesRequest,
            PreferenceResponse,
            CreatePrizeRequest,
            PrizeResponse,
            AwardQuery,
            AwardResponse,
            CreateResultRequest,
            ReplaceWinnersRequest,
            FinalizeAwardsRequest,
            AllocationProposalResponse,
            ResultResponse,
            Winner,
            ResultAward,
            AllocationKind,
            AllocationState,
        )
    ),
    tags(
        (name = "events", description = "Event management API"),
        (name = "players", description = "Player registry API"),
        (name = "preferences", description = "Player award preference API"),
        (name = "prizes", description = "Prize listing API"),
        (name = "awards", description = "Award unit API"),
        (name = "results", description = "Event result API"),
        (name = "allocation", description = "Award allocation workflow API"),
    ),
    info(
        title = "Congress Backend API",
        version = "1.0.0",
        description = "Event results and award allocation REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
