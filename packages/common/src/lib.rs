pub mod mailer;
pub mod status;
pub mod storage;

pub use status::{FileCategory, MilestoneStatus, Priority, ProjectStatus, TicketStatus, TicketType};
