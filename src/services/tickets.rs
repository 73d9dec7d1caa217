use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::ticket::{CreateTicketData, Ticket, TicketStatus};
use crate::realtime::Broadcaster;

/// Payload for ticket creation. `product_id` and `other_ids` default to
/// empty strings when absent.
#[derive(Debug)]
pub struct NewTicket {
    pub user_id: String,
    pub pdf_link: String,
    pub product_id: Option<String>,
    pub other_ids: Option<String>,
}

/// The three mutable fields, as submitted by the edit form. The status
/// arrives as a free-form string and is validated here.
#[derive(Debug)]
pub struct TicketUpdate {
    pub description: String,
    pub comments: String,
    pub status: String,
}

/// Validates the payload, persists the ticket, reloads the canonical row
/// and announces it to connected viewers.
pub async fn create_ticket(
    pool: &SqlitePool,
    broadcaster: &Broadcaster,
    new_ticket: NewTicket,
) -> Result<Ticket, AppError> {
    if new_ticket.user_id.trim().is_empty() || new_ticket.pdf_link.trim().is_empty() {
        return Err(AppError::Validation(
            "user_id and pdf_link are required".to_string(),
        ));
    }

    let id = Ticket::insert(
        pool,
        CreateTicketData {
            user_id: new_ticket.user_id,
            pdf_link: new_ticket.pdf_link,
            product_id: new_ticket.product_id.unwrap_or_default(),
            other_ids: new_ticket.other_ids.unwrap_or_default(),
        },
    )
    .await?;

    // Reload so the broadcast and the response carry the store-assigned
    // created_at and defaults.
    let ticket = Ticket::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("ticket {id} missing after insert")))?;

    broadcaster.broadcast_created(&ticket).await;

    tracing::info!(ticket_id = ticket.id, user_id = %ticket.user_id, "Ticket created");

    Ok(ticket)
}

/// Overwrites the mutable fields of a ticket and announces the new state.
pub async fn update_ticket(
    pool: &SqlitePool,
    broadcaster: &Broadcaster,
    id: i64,
    update: TicketUpdate,
) -> Result<Ticket, AppError> {
    let status = parse_status(&update.status)?;

    let ticket = Ticket::update_fields(pool, id, &update.description, &update.comments, status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ticket {id} not found")))?;

    broadcaster.broadcast_updated(&ticket).await;

    tracing::info!(ticket_id = ticket.id, status = %ticket.status, "Ticket updated");

    Ok(ticket)
}

/// Quick status change. The status is validated before storage is touched.
pub async fn set_status(
    pool: &SqlitePool,
    broadcaster: &Broadcaster,
    id: i64,
    status: &str,
) -> Result<Ticket, AppError> {
    let status = parse_status(status)?;

    let ticket = Ticket::update_status(pool, id, status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ticket {id} not found")))?;

    broadcaster.broadcast_updated(&ticket).await;

    tracing::info!(ticket_id = ticket.id, status = %ticket.status, "Ticket status changed");

    Ok(ticket)
}

fn parse_status(value: &str) -> Result<TicketStatus, AppError> {
    TicketStatus::parse(value)
        .ok_or_else(|| AppError::Validation(format!("Invalid status: {value}")))
}
