use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/projects", project_routes())
        .nest("/tickets", ticket_routes())
        .nest("/files", file_routes())
        .nest("/profile", profile_routes())
        .nest("/email-preferences", preferences_routes())
        .nest("/dashboard", dashboard_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::logout))
        .routes(routes!(handlers::auth::me))
}

fn project_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::project::list_projects,
            handlers::project::create_project
        ))
        .routes(routes!(
            handlers::project::get_project,
            handlers::project::update_project,
            handlers::project::delete_project
        ))
        .routes(routes!(handlers::project::create_project_update))
        .routes(routes!(handlers::project::create_milestone))
        .routes(routes!(
            handlers::project::update_milestone,
            handlers::project::delete_milestone
        ))
}

fn ticket_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::ticket::list_tickets,
            handlers::ticket::create_ticket
        ))
        .routes(routes!(
            handlers::ticket::get_ticket,
            handlers::ticket::update_ticket
        ))
        .routes(routes!(handlers::ticket::create_comment))
        .routes(routes!(handlers::ticket::resolve_ticket))
}

fn file_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::file::list_files,
            handlers::file::upload_file
        ))
        .routes(routes!(handlers::file::delete_file))
        .routes(routes!(handlers::file::download_file))
        .layer(handlers::file::upload_body_limit())
}

fn profile_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(
        handlers::profile::get_profile,
        handlers::profile::update_profile
    ))
}

fn preferences_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(
        handlers::preferences::get_preferences,
        handlers::preferences::update_preferences
    ))
}

fn dashboard_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::dashboard::stats))
        .routes(routes!(handlers::dashboard::activity))
}
