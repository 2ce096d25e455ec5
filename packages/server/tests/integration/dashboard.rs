use serde_json::json;

use crate::common::{TestApp, routes};

mod stats {
    use super::*;

    #[tokio::test]
    async fn counters_start_at_zero() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;

        let res = app.get_with_token(routes::DASHBOARD_STATS, &alice).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["total_projects"], 0);
        assert_eq!(res.body["active_projects"], 0);
        assert_eq!(res.body["open_tickets"], 0);
        assert_eq!(res.body["recent_updates_count"], 0);
    }

    #[tokio::test]
    async fn counters_reflect_the_callers_records() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;
        app.create_project(&alice, "Alice Shop").await;
        app.patch_with_token(
            &routes::project(project_id),
            &json!({"status": "in_progress"}),
            &alice,
        )
        .await;
        app.create_ticket(&alice, "Broken link", Some(project_id))
            .await;
        app.post_with_token(
            &routes::project_updates(project_id),
            &json!({"title": "Kickoff", "description": "We started."}),
            &alice,
        )
        .await;

        let res = app.get_with_token(routes::DASHBOARD_STATS, &alice).await;

        assert_eq!(res.body["total_projects"], 2);
        assert_eq!(res.body["active_projects"], 1);
        assert_eq!(res.body["open_tickets"], 1);
        assert_eq!(res.body["recent_updates_count"], 1);
    }

    #[tokio::test]
    async fn only_in_progress_projects_count_as_active() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let site = app.create_project(&alice, "Alice Site").await;
        let shop = app.create_project(&alice, "Alice Shop").await;
        app.create_project(&alice, "Alice Blog").await;
        app.patch_with_token(
            &routes::project(site),
            &json!({"status": "in_progress"}),
            &alice,
        )
        .await;
        app.patch_with_token(&routes::project(shop), &json!({"status": "testing"}), &alice)
            .await;

        let res = app.get_with_token(routes::DASHBOARD_STATS, &alice).await;

        assert_eq!(res.body["total_projects"], 3);
        assert_eq!(res.body["active_projects"], 1);
    }

    #[tokio::test]
    async fn completed_projects_drop_out_of_the_active_count() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;
        app.patch_with_token(
            &routes::project(project_id),
            &json!({"status": "in_progress"}),
            &alice,
        )
        .await;

        let res = app.get_with_token(routes::DASHBOARD_STATS, &alice).await;
        assert_eq!(res.body["active_projects"], 1);

        app.patch_with_token(
            &routes::project(project_id),
            &json!({"status": "completed"}),
            &alice,
        )
        .await;

        let res = app.get_with_token(routes::DASHBOARD_STATS, &alice).await;

        assert_eq!(res.body["total_projects"], 1);
        assert_eq!(res.body["active_projects"], 0);
    }

    #[tokio::test]
    async fn resolved_tickets_drop_out_of_the_open_count() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let ticket_id = app.create_ticket(&alice, "Broken link", None).await;
        app.post_empty_with_token(&routes::ticket_resolve(ticket_id), &alice)
            .await;

        let res = app.get_with_token(routes::DASHBOARD_STATS, &alice).await;

        assert_eq!(res.body["open_tickets"], 0);
    }

    #[tokio::test]
    async fn clients_never_see_other_clients_in_their_totals() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let (bob, _) = app.register_user("bob").await;
        app.create_project(&bob, "Bob Site").await;
        app.create_ticket(&bob, "Bob problem", None).await;

        let res = app.get_with_token(routes::DASHBOARD_STATS, &alice).await;

        assert_eq!(res.body["total_projects"], 0);
        assert_eq!(res.body["open_tickets"], 0);
    }

    #[tokio::test]
    async fn staff_totals_span_all_clients() {
        let app = TestApp::spawn().await;
        let (staff, _) = app.register_staff("support").await;
        let (alice, _) = app.register_user("alice").await;
        let (bob, _) = app.register_user("bob").await;
        app.create_project(&alice, "Alice Site").await;
        app.create_project(&bob, "Bob Site").await;

        let res = app.get_with_token(routes::DASHBOARD_STATS, &staff).await;

        assert_eq!(res.body["total_projects"], 2);
    }
}

mod activity {
    use super::*;

    #[tokio::test]
    async fn the_feed_lists_recent_updates_and_tickets_newest_first() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;
        for title in ["First update", "Second update"] {
            app.post_with_token(
                &routes::project_updates(project_id),
                &json!({"title": title, "description": "x"}),
                &alice,
            )
            .await;
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        app.create_ticket(&alice, "Broken link", Some(project_id))
            .await;

        let res = app.get_with_token(routes::DASHBOARD_ACTIVITY, &alice).await;

        assert_eq!(res.status, 200);
        let updates = res.body["recent_updates"].as_array().unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0]["title"], "Second update");
        let tickets = res.body["recent_tickets"].as_array().unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0]["title"], "Broken link");
    }

    #[tokio::test]
    async fn each_section_is_capped_at_ten_items() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;
        for i in 0..12 {
            app.post_with_token(
                &routes::project_updates(project_id),
                &json!({"title": format!("Update {i}"), "description": "x"}),
                &alice,
            )
            .await;
        }

        let res = app.get_with_token(routes::DASHBOARD_ACTIVITY, &alice).await;

        assert_eq!(res.body["recent_updates"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn the_feed_is_scoped_to_the_caller() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let (bob, _) = app.register_user("bob").await;
        let bob_project = app.create_project(&bob, "Bob Site").await;
        app.post_with_token(
            &routes::project_updates(bob_project),
            &json!({"title": "Bob news", "description": "x"}),
            &bob,
        )
        .await;
        app.create_ticket(&bob, "Bob problem", None).await;

        let res = app.get_with_token(routes::DASHBOARD_ACTIVITY, &alice).await;

        assert!(res.body["recent_updates"].as_array().unwrap().is_empty());
        assert!(res.body["recent_tickets"].as_array().unwrap().is_empty());
    }
}
