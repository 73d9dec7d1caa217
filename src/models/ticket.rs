use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use std::fmt;

/// Lifecycle state of a ticket. Stored as TEXT, variant names are the
/// on-disk and on-wire representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum TicketStatus {
    Open,
    Pending,
    Closed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 3] =
        [TicketStatus::Open, TicketStatus::Pending, TicketStatus::Closed];

    /// Parse a user-supplied status string. Case-sensitive, matching the
    /// stored representation exactly.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Open" => Some(TicketStatus::Open),
            "Pending" => Some(TicketStatus::Pending),
            "Closed" => Some(TicketStatus::Closed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::Pending => "Pending",
            TicketStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: i64,
    pub user_id: String,
    pub pdf_link: String,
    pub product_id: String,
    pub other_ids: String,
    pub status: TicketStatus,
    pub description: String,
    pub comments: String,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    pub fn created_label(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M UTC").to_string()
    }
}

#[derive(Debug, Clone)]
pub struct CreateTicketData {
    pub user_id: String,
    pub pdf_link: String,
    pub product_id: String,
    pub other_ids: String,
}

impl Ticket {
    /// Insert a new ticket row with defaulted status, empty mutable fields
    /// and a store-assigned creation timestamp. Returns the new id.
    pub async fn insert(pool: &SqlitePool, data: CreateTicketData) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO tickets (user_id, pdf_link, product_id, other_ids, status, description, comments, created_at)
            VALUES ($1, $2, $3, $4, $5, '', '', $6)
            "#,
        )
        .bind(data.user_id)
        .bind(data.pdf_link)
        .bind(data.product_id)
        .bind(data.other_ids)
        .bind(TicketStatus::Open)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Find ticket by id
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let ticket = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT * FROM tickets WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(ticket)
    }

    /// List every ticket, newest first
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let tickets = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT * FROM tickets
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(tickets)
    }

    /// Overwrite the three mutable fields. Returns the reloaded row, or
    /// `None` when no row matched the id.
    pub async fn update_fields(
        pool: &SqlitePool,
        id: i64,
        description: &str,
        comments: &str,
        status: TicketStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET description = $1, comments = $2, status = $3
            WHERE id = $4
            "#,
        )
        .bind(description)
        .bind(comments)
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Self::find_by_id(pool, id).await
    }

    /// Overwrite only the status. Returns the reloaded row, or `None` when
    /// no row matched the id.
    pub async fn update_status(
        pool: &SqlitePool,
        id: i64,
        status: TicketStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tickets SET status = $1 WHERE id = $2
            "#,
        )
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Self::find_by_id(pool, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("migrations");
        pool
    }

    fn sample(user_id: &str) -> CreateTicketData {
        CreateTicketData {
            user_id: user_id.to_string(),
            pdf_link: "https://example.com/manual.pdf".to_string(),
            product_id: "PROD-001".to_string(),
            other_ids: "REF-1234".to_string(),
        }
    }

    #[test]
    fn status_parses_only_enumerated_values() {
        assert_eq!(TicketStatus::parse("Open"), Some(TicketStatus::Open));
        assert_eq!(TicketStatus::parse("Pending"), Some(TicketStatus::Pending));
        assert_eq!(TicketStatus::parse("Closed"), Some(TicketStatus::Closed));
        assert_eq!(TicketStatus::parse("open"), None);
        assert_eq!(TicketStatus::parse("Bogus"), None);
        assert_eq!(TicketStatus::parse(""), None);
    }

    #[test]
    fn status_display_round_trips() {
        for status in TicketStatus::ALL {
            assert_eq!(TicketStatus::parse(status.as_str()), Some(status));
        }
    }

    #[tokio::test]
    async fn insert_applies_defaults() {
        let pool = test_pool().await;

        let id = Ticket::insert(&pool, sample("john")).await.expect("insert");
        let ticket = Ticket::find_by_id(&pool, id)
            .await
            .expect("find")
            .expect("row exists");

        assert_eq!(ticket.id, id);
        assert_eq!(ticket.user_id, "john");
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.description, "");
        assert_eq!(ticket.comments, "");
    }

    #[tokio::test]
    async fn ids_are_strictly_increasing() {
        let pool = test_pool().await;

        let mut last = 0;
        for n in 0..4 {
            let id = Ticket::insert(&pool, sample(&format!("user-{n}")))
                .await
                .expect("insert");
            assert!(id > last);
            last = id;
        }
    }

    #[tokio::test]
    async fn list_all_is_newest_first() {
        let pool = test_pool().await;

        for n in 0..3 {
            Ticket::insert(&pool, sample(&format!("user-{n}")))
                .await
                .expect("insert");
        }

        let tickets = Ticket::list_all(&pool).await.expect("list");
        assert_eq!(tickets.len(), 3);
        for pair in tickets.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
            assert!(pair[0].id > pair[1].id);
        }
    }

    #[tokio::test]
    async fn update_fields_overwrites_and_reloads() {
        let pool = test_pool().await;
        let id = Ticket::insert(&pool, sample("john")).await.expect("insert");

        let updated = Ticket::update_fields(&pool, id, "broken link", "checked", TicketStatus::Pending)
            .await
            .expect("update")
            .expect("row exists");

        assert_eq!(updated.description, "broken link");
        assert_eq!(updated.comments, "checked");
        assert_eq!(updated.status, TicketStatus::Pending);
        // immutable fields untouched
        assert_eq!(updated.user_id, "john");
        assert_eq!(updated.pdf_link, "https://example.com/manual.pdf");
    }

    #[tokio::test]
    async fn update_missing_row_returns_none() {
        let pool = test_pool().await;

        let fields = Ticket::update_fields(&pool, 99, "x", "y", TicketStatus::Closed)
            .await
            .expect("update");
        assert!(fields.is_none());

        let status = Ticket::update_status(&pool, 99, TicketStatus::Closed)
            .await
            .expect("update");
        assert!(status.is_none());
    }

    #[tokio::test]
    async fn update_status_touches_only_status() {
        let pool = test_pool().await;
        let id = Ticket::insert(&pool, sample("john")).await.expect("insert");

        let updated = Ticket::update_status(&pool, id, TicketStatus::Closed)
            .await
            .expect("update")
            .expect("row exists");

        assert_eq!(updated.status, TicketStatus::Closed);
        assert_eq!(updated.description, "");
        assert_eq!(updated.comments, "");
    }
}
