use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Greeting {
    pub message: String,
}

/// API greeting, handy as a reachability probe
#[utoipa::path(
    get,
    path = "/api",
    responses(
        (status = 200, description = "API is reachable", body = Greeting)
    ),
    tag = "health"
)]
pub async fn greeting() -> Json<Greeting> {
    Json(Greeting {
        message: "Hello from the Timekeeper API!".to_string(),
    })
}
