// Services module - Business logic

pub mod tickets;
