use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::auth::login,
        api::auth::register,
        api::dashboard::get_dashboard,
        api::programs::list_programs,
        api::programs::browse_resources,
        api::resources::get_resource,
        api::resources::suggest_resource,
        api::ratings::add_rating,
    ),
    tags(
        (name = "portal", description = "Academic resource portal API")
    )
)]
pub struct ApiDoc;
