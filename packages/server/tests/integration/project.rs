use serde_json::json;

use crate::common::{TestApp, routes};

mod listing {
    use super::*;

    #[tokio::test]
    async fn clients_only_see_their_own_projects() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let (bob, _) = app.register_user("bob").await;
        app.create_project(&alice, "Alice Site").await;
        app.create_project(&bob, "Bob Site").await;

        let res = app.get_with_token(routes::PROJECTS, &alice).await;

        assert_eq!(res.status, 200);
        let rows = res.body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["title"], "Alice Site");
    }

    #[tokio::test]
    async fn staff_see_every_project() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let (bob, _) = app.register_user("bob").await;
        let (staff, _) = app.register_staff("support").await;
        app.create_project(&alice, "Alice Site").await;
        app.create_project(&bob, "Bob Site").await;

        let res = app.get_with_token(routes::PROJECTS, &staff).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rows_carry_open_ticket_and_file_counts() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;
        app.create_ticket(&alice, "Broken link", Some(project_id))
            .await;

        let res = app.get_with_token(routes::PROJECTS, &alice).await;

        let row = &res.body.as_array().unwrap()[0];
        assert_eq!(row["open_tickets_count"], 1);
        assert_eq!(row["files_count"], 0);
    }
}

mod creation {
    use super::*;

    #[tokio::test]
    async fn the_slug_is_derived_from_the_title() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;

        let res = app
            .post_with_token(
                routes::PROJECTS,
                &json!({"title": "Website Redesign!", "description": "x"}),
                &alice,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["slug"], "website-redesign");
    }

    #[tokio::test]
    async fn duplicate_titles_get_numbered_slugs() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        app.create_project(&alice, "Website Redesign").await;

        let res = app
            .post_with_token(
                routes::PROJECTS,
                &json!({"title": "Website Redesign"}),
                &alice,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["slug"], "website-redesign-1");
    }

    #[tokio::test]
    async fn clients_cannot_create_projects_for_other_clients() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let (_, bob_id) = app.register_user("bob").await;

        let res = app
            .post_with_token(
                routes::PROJECTS,
                &json!({"title": "Bob Site", "client_id": bob_id}),
                &alice,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn staff_can_create_projects_for_any_client() {
        let app = TestApp::spawn().await;
        let (staff, _) = app.register_staff("support").await;
        let (alice, alice_id) = app.register_user("alice").await;

        let res = app
            .post_with_token(
                routes::PROJECTS,
                &json!({"title": "Alice Site", "client_id": alice_id}),
                &staff,
            )
            .await;
        assert_eq!(res.status, 201);
        assert_eq!(res.body["client_id"], alice_id);

        let list = app.get_with_token(routes::PROJECTS, &alice).await;
        assert_eq!(list.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn progress_outside_the_percentage_range_is_rejected() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;

        let res = app
            .post_with_token(
                routes::PROJECTS,
                &json!({"title": "Site", "progress_percentage": 101}),
                &alice,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod detail {
    use super::*;

    #[tokio::test]
    async fn an_unknown_project_is_not_found() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;

        let res = app.get_with_token(&routes::project(9999), &alice).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn another_clients_project_is_forbidden() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let (bob, _) = app.register_user("bob").await;
        let project_id = app.create_project(&bob, "Bob Site").await;

        let res = app
            .get_with_token(&routes::project(project_id), &alice)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn detail_nests_updates_tickets_and_milestones() {
        let app = TestApp::spawn().await;
        let (staff, _) = app.register_staff("support").await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;
        app.create_ticket(&alice, "Broken link", Some(project_id))
            .await;
        app.post_with_token(
            &routes::project_updates(project_id),
            &json!({"title": "Kickoff done", "description": "We started."}),
            &staff,
        )
        .await;
        app.post_with_token(
            &routes::milestones(project_id),
            &json!({"title": "Design sign-off"}),
            &staff,
        )
        .await;

        let res = app
            .get_with_token(&routes::project(project_id), &alice)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["updates"].as_array().unwrap().len(), 1);
        assert_eq!(res.body["tickets"].as_array().unwrap().len(), 1);
        assert_eq!(res.body["milestones"].as_array().unwrap().len(), 1);
        assert_eq!(res.body["open_tickets_count"], 1);
    }
}

mod updates_to_projects {
    use super::*;

    #[tokio::test]
    async fn fields_can_be_patched_individually() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;

        let res = app
            .patch_with_token(
                &routes::project(project_id),
                &json!({"progress_percentage": 40, "status": "in_progress"}),
                &alice,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["progress_percentage"], 40);
        assert_eq!(res.body["status"], "in_progress");
        assert_eq!(res.body["title"], "Alice Site");
    }

    #[tokio::test]
    async fn explicit_null_clears_a_nullable_field() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;
        app.patch_with_token(
            &routes::project(project_id),
            &json!({"staging_url": "https://staging.example.com"}),
            &alice,
        )
        .await;

        let res = app
            .patch_with_token(
                &routes::project(project_id),
                &json!({"staging_url": null}),
                &alice,
            )
            .await;

        assert_eq!(res.status, 200);
        assert!(res.body["staging_url"].is_null());
    }

    #[tokio::test]
    async fn the_slug_never_changes_after_creation() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;

        let res = app
            .patch_with_token(
                &routes::project(project_id),
                &json!({"title": "Renamed Completely"}),
                &alice,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "Renamed Completely");
        assert_eq!(res.body["slug"], "alice-site");
    }
}

mod timeline {
    use super::*;

    #[tokio::test]
    async fn an_update_bumps_last_activity() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;

        let before = app
            .get_with_token(&routes::project(project_id), &alice)
            .await;
        let last_activity_before = before.body["last_activity"].as_str().unwrap().to_string();

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let res = app
            .post_with_token(
                &routes::project_updates(project_id),
                &json!({"title": "Staging live", "description": "Check it out."}),
                &alice,
            )
            .await;
        assert_eq!(res.status, 201);

        let after = app
            .get_with_token(&routes::project(project_id), &alice)
            .await;
        let last_activity_after = after.body["last_activity"].as_str().unwrap();
        assert!(last_activity_after > last_activity_before.as_str());
    }

    #[tokio::test]
    async fn the_owning_client_is_notified_of_updates() {
        let app = TestApp::spawn().await;
        let (staff, _) = app.register_staff("support").await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;
        let sent_before = app.mailer.sent().len();

        app.post_with_token(
            &routes::project_updates(project_id),
            &json!({"title": "Staging live", "description": "Check it out."}),
            &staff,
        )
        .await;

        let sent = app.mailer.sent();
        assert_eq!(sent.len(), sent_before + 1);
        let mail = sent.last().unwrap().clone();
        assert_eq!(mail.to, "alice@example.com");
        assert_eq!(mail.subject, "[Alice Site] New Update: Staging live");
    }

    #[tokio::test]
    async fn update_notifications_respect_the_opt_out() {
        let app = TestApp::spawn().await;
        let (staff, _) = app.register_staff("support").await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;
        app.patch_with_token(
            routes::PREFERENCES,
            &json!({"project_updates": false}),
            &alice,
        )
        .await;
        let sent_before = app.mailer.sent().len();

        let res = app
            .post_with_token(
                &routes::project_updates(project_id),
                &json!({"title": "Staging live", "description": "Check it out."}),
                &staff,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(app.mailer.sent().len(), sent_before);
    }
}

mod milestones {
    use super::*;

    #[tokio::test]
    async fn clients_cannot_manage_milestones() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;

        let res = app
            .post_with_token(
                &routes::milestones(project_id),
                &json!({"title": "Design sign-off"}),
                &alice,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn positions_default_to_the_end_of_the_list() {
        let app = TestApp::spawn().await;
        let (staff, _) = app.register_staff("support").await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;

        let first = app
            .post_with_token(
                &routes::milestones(project_id),
                &json!({"title": "Design sign-off"}),
                &staff,
            )
            .await;
        let second = app
            .post_with_token(
                &routes::milestones(project_id),
                &json!({"title": "Launch"}),
                &staff,
            )
            .await;

        assert_eq!(first.body["position"], 0);
        assert_eq!(second.body["position"], 1);
    }

    #[tokio::test]
    async fn completing_a_milestone_stamps_the_completed_date() {
        let app = TestApp::spawn().await;
        let (staff, _) = app.register_staff("support").await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;
        let created = app
            .post_with_token(
                &routes::milestones(project_id),
                &json!({"title": "Design sign-off"}),
                &staff,
            )
            .await;
        let mid = created.body["id"].as_i64().unwrap();

        let res = app
            .patch_with_token(
                &routes::milestone(project_id, mid),
                &json!({"status": "completed"}),
                &staff,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "completed");
        assert!(res.body["completed_date"].is_string());
    }

    #[tokio::test]
    async fn staff_can_delete_a_milestone() {
        let app = TestApp::spawn().await;
        let (staff, _) = app.register_staff("support").await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;
        let created = app
            .post_with_token(
                &routes::milestones(project_id),
                &json!({"title": "Design sign-off"}),
                &staff,
            )
            .await;
        let mid = created.body["id"].as_i64().unwrap();

        let res = app
            .delete_with_token(&routes::milestone(project_id, mid), &staff)
            .await;
        assert_eq!(res.status, 204);

        let detail = app
            .get_with_token(&routes::project(project_id), &alice)
            .await;
        assert!(detail.body["milestones"].as_array().unwrap().is_empty());
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn deleting_a_project_removes_everything_under_it() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;
        let ticket_id = app
            .create_ticket(&alice, "Broken link", Some(project_id))
            .await;

        let res = app
            .delete_with_token(&routes::project(project_id), &alice)
            .await;
        assert_eq!(res.status, 204);

        let project = app
            .get_with_token(&routes::project(project_id), &alice)
            .await;
        assert_eq!(project.status, 404);

        let ticket = app.get_with_token(&routes::ticket(ticket_id), &alice).await;
        assert_eq!(ticket.status, 404);
    }

    #[tokio::test]
    async fn clients_cannot_delete_other_clients_projects() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let (bob, _) = app.register_user("bob").await;
        let project_id = app.create_project(&bob, "Bob Site").await;

        let res = app
            .delete_with_token(&routes::project(project_id), &alice)
            .await;

        assert_eq!(res.status, 403);
    }
}
