use serde::Serialize;

use crate::models::project::UpdatePayload;
use crate::models::ticket::TicketSummary;

/// Aggregate counters for the portal landing page. Staff see totals across
/// all clients; a client sees only their own records.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StatsResponse {
    #[schema(example = 4)]
    pub total_projects: u64,
    /// Projects currently `in_progress`.
    #[schema(example = 2)]
    pub active_projects: u64,
    #[schema(example = 3)]
    pub open_tickets: u64,
    /// Project updates written in the trailing 7 days.
    #[schema(example = 5)]
    pub recent_updates_count: u64,
}

/// Recent activity feed: the latest updates and tickets in scope.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ActivityResponse {
    pub recent_updates: Vec<UpdatePayload>,
    pub recent_tickets: Vec<TicketSummary>,
}
