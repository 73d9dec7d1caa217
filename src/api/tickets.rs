use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::session::AppState;
use crate::error::AppError;
use crate::services::tickets::{self, NewTicket};

/// Required fields deserialize with defaults so a missing key yields the
/// documented 400 body rather than a framework rejection.
#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub pdf_link: String,
    pub product_id: Option<String>,
    pub other_ids: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateTicketResponse {
    pub success: bool,
    pub ticket_id: i64,
    pub message: String,
}

/// Create ticket (JSON API)
async fn create_ticket(
    State(state): State<AppState>,
    Json(req): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<CreateTicketResponse>), AppError> {
    let ticket = tickets::create_ticket(
        &state.pool,
        &state.broadcaster,
        NewTicket {
            user_id: req.user_id,
            pdf_link: req.pdf_link,
            product_id: req.product_id,
            other_ids: req.other_ids,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTicketResponse {
            success: true,
            ticket_id: ticket.id,
            message: "Ticket created successfully".to_string(),
        }),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/create_ticket", post(create_ticket))
}
