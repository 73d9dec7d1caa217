// Models module - Database entity representations

pub mod ticket;

pub use ticket::{Ticket, TicketStatus};
