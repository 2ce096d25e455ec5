//! Outbound notification emails.
//!
//! Every send happens after the triggering write has committed, and every
//! failure is logged and swallowed. A broken mail transport must never
//! fail an API request.

use common::mailer::OutgoingEmail;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tracing::warn;

use crate::entity::{email_preferences, project, project_update, ticket, ticket_comment, user};
use crate::state::AppState;

/// Effective toggles for a user, defaulting when no row exists yet.
async fn wants(state: &AppState, user_id: i32) -> (bool, bool) {
    match email_preferences::Entity::find()
        .filter(email_preferences::Column::UserId.eq(user_id))
        .one(&state.db)
        .await
    {
        Ok(Some(prefs)) => (prefs.project_updates, prefs.ticket_comments),
        Ok(None) => (true, true),
        Err(e) => {
            warn!("Preference lookup failed for user {user_id}: {e}");
            (true, true)
        }
    }
}

async fn dispatch(state: &AppState, mail: OutgoingEmail) {
    if mail.to.is_empty() {
        return;
    }
    if let Err(e) = state.mailer.send(mail).await {
        warn!("Failed to send notification email: {e}");
    }
}

/// Greeting sent right after registration.
pub async fn send_welcome(state: &AppState, recipient: &user::Model) {
    let email = &state.config.email;
    let mail = OutgoingEmail {
        to: recipient.email.clone(),
        subject: format!("Welcome to {} Client Portal", email.site_name),
        body: format!(
            "Hi {},\n\n\
             Your client portal account is ready. Log in at {} to follow \
             your projects, open support tickets, and download deliverables.\n\n\
             {}",
            display_name(recipient),
            email.site_url,
            email.site_name,
        ),
    };
    dispatch(state, mail).await;
}

/// New tickets always alert the admin mailbox.
pub async fn notify_ticket_created(state: &AppState, t: &ticket::Model, creator: &user::Model) {
    let email = &state.config.email;
    let mail = OutgoingEmail {
        to: email.admin_address.clone(),
        subject: format!("[New Ticket #{}] {}", t.id, t.title),
        body: format!(
            "{} opened a new {} ticket.\n\n\
             Priority: {}\n\n\
             {}\n\n\
             {}/tickets/{}",
            display_name(creator),
            t.ticket_type.as_str(),
            t.priority,
            t.description,
            email.site_url,
            t.id,
        ),
    };
    dispatch(state, mail).await;
}

/// Tell the ticket creator about a new response.
///
/// Skipped when the creator wrote the comment themselves, when the
/// comment is an internal note, or when they opted out.
pub async fn notify_ticket_comment(
    state: &AppState,
    t: &ticket::Model,
    comment: &ticket_comment::Model,
) {
    if comment.is_internal || comment.user_id == t.created_by {
        return;
    }

    let (_, ticket_responses) = wants(state, t.created_by).await;
    if !ticket_responses {
        return;
    }

    let Ok(Some(creator)) = user::Entity::find_by_id(t.created_by).one(&state.db).await else {
        return;
    };

    let email = &state.config.email;
    let mail = OutgoingEmail {
        to: creator.email.clone(),
        subject: format!("[Ticket #{}] New response: {}", t.id, t.title),
        body: format!(
            "There is a new response on your ticket.\n\n\
             {}\n\n\
             {}/tickets/{}",
            comment.comment, email.site_url, t.id,
        ),
    };
    dispatch(state, mail).await;
}

/// Tell the owning client about a new project update, unless opted out.
pub async fn notify_project_update(
    state: &AppState,
    p: &project::Model,
    update: &project_update::Model,
) {
    let (project_updates, _) = wants(state, p.client_id).await;
    if !project_updates {
        return;
    }

    let Ok(Some(client)) = user::Entity::find_by_id(p.client_id).one(&state.db).await else {
        return;
    };

    let email = &state.config.email;
    let mail = OutgoingEmail {
        to: client.email.clone(),
        subject: format!("[{}] New Update: {}", p.title, update.title),
        body: format!(
            "{}\n\n\
             {}/projects/{}",
            update.description, email.site_url, p.slug,
        ),
    };
    dispatch(state, mail).await;
}

fn display_name(u: &user::Model) -> String {
    let full = format!("{} {}", u.first_name, u.last_name);
    let full = full.trim();
    if full.is_empty() {
        u.username.clone()
    } else {
        full.to_string()
    }
}
