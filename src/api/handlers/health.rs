/// Liveness check
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Server is running", body = String)),
    tag = "health"
)]
pub async fn home() -> &'static str {
    "Backend is running"
}
