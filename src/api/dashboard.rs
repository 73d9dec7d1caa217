use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::api::middleware::flash::{push_flash, take_flashes, FlashLevel, FlashMessage};
use crate::api::middleware::session::AppState;
use crate::error::AppError;
use crate::models::Ticket;
use crate::services::tickets::{self, TicketUpdate};

// Templates

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    tickets: Vec<Ticket>,
    flashes: Vec<FlashMessage>,
}

#[derive(Template)]
#[template(path = "ticket_detail.html")]
struct TicketDetailTemplate {
    ticket: Ticket,
    flashes: Vec<FlashMessage>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTicketForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "Open".to_string()
}

// Handlers

/// Dashboard - view all tickets, newest first
async fn dashboard_page(
    State(state): State<AppState>,
    session: Session,
) -> Result<DashboardTemplate, AppError> {
    let tickets = Ticket::list_all(&state.pool).await?;
    let flashes = take_flashes(&session).await?;

    Ok(DashboardTemplate { tickets, flashes })
}

/// Individual ticket view/edit
async fn ticket_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    session: Session,
) -> Result<Response, AppError> {
    match Ticket::find_by_id(&state.pool, id).await? {
        Some(ticket) => {
            let flashes = take_flashes(&session).await?;
            Ok(TicketDetailTemplate { ticket, flashes }.into_response())
        }
        None => {
            push_flash(&session, FlashLevel::Error, "Ticket not found").await?;
            Ok(Redirect::to("/dashboard").into_response())
        }
    }
}

/// Update ticket from the edit form
async fn update_ticket_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    session: Session,
    Form(form): Form<UpdateTicketForm>,
) -> Result<Redirect, AppError> {
    let update = TicketUpdate {
        description: form.description,
        comments: form.comments,
        status: form.status,
    };

    match tickets::update_ticket(&state.pool, &state.broadcaster, id, update).await {
        Ok(_) => {
            push_flash(&session, FlashLevel::Success, "Ticket updated successfully").await?;
            Ok(Redirect::to(&format!("/ticket/{id}")))
        }
        Err(AppError::NotFound(_)) => {
            push_flash(&session, FlashLevel::Error, "Ticket not found").await?;
            Ok(Redirect::to("/dashboard"))
        }
        Err(e) => {
            push_flash(
                &session,
                FlashLevel::Error,
                format!("Error updating ticket: {e}"),
            )
            .await?;
            Ok(Redirect::to(&format!("/ticket/{id}")))
        }
    }
}

/// Update ticket status (quick action)
async fn quick_status(
    State(state): State<AppState>,
    Path((id, status)): Path<(i64, String)>,
    session: Session,
) -> Result<Redirect, AppError> {
    match tickets::set_status(&state.pool, &state.broadcaster, id, &status).await {
        Ok(ticket) => {
            push_flash(
                &session,
                FlashLevel::Success,
                format!("Ticket status updated to {}", ticket.status),
            )
            .await?;
        }
        Err(AppError::Validation(_)) => {
            push_flash(&session, FlashLevel::Error, "Invalid status").await?;
        }
        Err(AppError::NotFound(_)) => {
            push_flash(&session, FlashLevel::Error, "Ticket not found").await?;
        }
        Err(e) => {
            push_flash(
                &session,
                FlashLevel::Error,
                format!("Error updating status: {e}"),
            )
            .await?;
        }
    }

    Ok(Redirect::to("/dashboard"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/dashboard", get(dashboard_page))
        .route("/ticket/:id", get(ticket_page))
        .route("/ticket/:id/update", post(update_ticket_form))
        .route("/ticket/:id/status/:status", get(quick_status))
}
