use serde_json::json;

use crate::common::{TEST_MAX_FILE_SIZE, TestApp, routes};

mod upload {
    use super::*;

    #[tokio::test]
    async fn a_client_can_upload_to_their_own_project() {
        let app = TestApp::spawn().await;
        let (alice, alice_id) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;

        let res = app
            .upload_with_token(
                project_id,
                "notes.txt",
                b"meeting notes".to_vec(),
                &[("description", "Notes from kickoff")],
                &alice,
            )
            .await;

        assert_eq!(res.status, 201, "Upload failed: {}", res.text);
        assert_eq!(res.body["file_name"], "notes.txt");
        assert_eq!(res.body["name"], "notes.txt");
        assert_eq!(res.body["description"], "Notes from kickoff");
        assert_eq!(res.body["file_size"], 13);
        assert_eq!(res.body["file_size_display"], "13.0 B");
        assert_eq!(res.body["uploaded_by"], alice_id);
    }

    #[tokio::test]
    async fn an_explicit_name_overrides_the_file_name() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;

        let res = app
            .upload_with_token(
                project_id,
                "final_v3_REAL.pdf",
                b"pdf bytes".to_vec(),
                &[("name", "Launch checklist")],
                &alice,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["name"], "Launch checklist");
        assert_eq!(res.body["file_name"], "final_v3_REAL.pdf");
    }

    #[tokio::test]
    async fn uploads_over_the_size_cap_are_rejected() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;
        let oversized = vec![0u8; TEST_MAX_FILE_SIZE as usize + 1];

        let res = app
            .upload_with_token(project_id, "huge.bin", oversized, &[], &alice)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn cannot_upload_to_an_invisible_project() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let (bob, _) = app.register_user("bob").await;
        let project_id = app.create_project(&bob, "Bob Site").await;

        let res = app
            .upload_with_token(project_id, "sneaky.txt", b"hi".to_vec(), &[], &alice)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn an_unknown_category_is_rejected() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;

        let res = app
            .upload_with_token(
                project_id,
                "notes.txt",
                b"hi".to_vec(),
                &[("category", "homework")],
                &alice,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod download {
    use super::*;

    #[tokio::test]
    async fn uploaded_content_comes_back_byte_for_byte() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;
        let uploaded = app
            .upload_with_token(project_id, "notes.txt", b"meeting notes".to_vec(), &[], &alice)
            .await;
        let file_id = uploaded.body["id"].as_i64().unwrap();

        let res = app
            .get_with_token(&routes::file_download(file_id), &alice)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.text, "meeting notes");
    }

    #[tokio::test]
    async fn downloads_are_served_as_attachments() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;
        let uploaded = app
            .upload_with_token(project_id, "notes.txt", b"hi".to_vec(), &[], &alice)
            .await;
        let file_id = uploaded.body["id"].as_i64().unwrap();

        let res = app
            .client
            .get(format!("http://{}{}", app.addr, routes::file_download(file_id)))
            .header("Authorization", format!("Bearer {alice}"))
            .send()
            .await
            .unwrap();

        assert_eq!(res.status().as_u16(), 200);
        let disposition = res
            .headers()
            .get("Content-Disposition")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains("notes.txt"));
        assert_eq!(
            res.headers().get("Content-Type").unwrap().to_str().unwrap(),
            "text/plain"
        );
    }

    #[tokio::test]
    async fn clients_cannot_download_confidential_files() {
        let app = TestApp::spawn().await;
        let (staff, _) = app.register_staff("support").await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;
        let uploaded = app
            .upload_with_token(
                project_id,
                "credentials.txt",
                b"secrets".to_vec(),
                &[("is_confidential", "true"), ("category", "credential")],
                &staff,
            )
            .await;
        let file_id = uploaded.body["id"].as_i64().unwrap();

        let res = app
            .get_with_token(&routes::file_download(file_id), &alice)
            .await;
        assert_eq!(res.status, 403);

        let res = app
            .get_with_token(&routes::file_download(file_id), &staff)
            .await;
        assert_eq!(res.status, 200);
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn confidential_files_are_hidden_from_clients() {
        let app = TestApp::spawn().await;
        let (staff, _) = app.register_staff("support").await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;
        app.upload_with_token(project_id, "public.txt", b"hello".to_vec(), &[], &alice)
            .await;
        app.upload_with_token(
            project_id,
            "secrets.txt",
            b"shh".to_vec(),
            &[("is_confidential", "true")],
            &staff,
        )
        .await;

        let as_client = app.get_with_token(routes::FILES, &alice).await;
        let rows = as_client.body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["file_name"], "public.txt");

        let as_staff = app.get_with_token(routes::FILES, &staff).await;
        assert_eq!(as_staff.body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn the_list_can_be_scoped_to_one_project() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let first = app.create_project(&alice, "Alice Site").await;
        let second = app.create_project(&alice, "Alice Shop").await;
        app.upload_with_token(first, "site.txt", b"a".to_vec(), &[], &alice)
            .await;
        app.upload_with_token(second, "shop.txt", b"b".to_vec(), &[], &alice)
            .await;

        let res = app
            .get_with_token(&format!("{}?project={second}", routes::FILES), &alice)
            .await;

        let rows = res.body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["file_name"], "shop.txt");
    }

    #[tokio::test]
    async fn scoping_to_an_invisible_project_is_forbidden() {
        let app = TestApp::spawn().await;
        let (alice, _) = app.register_user("alice").await;
        let (bob, _) = app.register_user("bob").await;
        let project_id = app.create_project(&bob, "Bob Site").await;

        let res = app
            .get_with_token(&format!("{}?project={project_id}", routes::FILES), &alice)
            .await;

        assert_eq!(res.status, 403);
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn only_staff_can_delete_files() {
        let app = TestApp::spawn().await;
        let (staff, _) = app.register_staff("support").await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;
        let uploaded = app
            .upload_with_token(project_id, "notes.txt", b"hi".to_vec(), &[], &alice)
            .await;
        let file_id = uploaded.body["id"].as_i64().unwrap();

        let res = app.delete_with_token(&routes::file(file_id), &alice).await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");

        let res = app.delete_with_token(&routes::file(file_id), &staff).await;
        assert_eq!(res.status, 204);

        let res = app
            .get_with_token(&routes::file_download(file_id), &alice)
            .await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn shared_content_survives_deleting_one_of_two_references() {
        let app = TestApp::spawn().await;
        let (staff, _) = app.register_staff("support").await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;
        let first = app
            .upload_with_token(project_id, "copy_a.txt", b"same bytes".to_vec(), &[], &alice)
            .await;
        let second = app
            .upload_with_token(project_id, "copy_b.txt", b"same bytes".to_vec(), &[], &alice)
            .await;
        let first_id = first.body["id"].as_i64().unwrap();
        let second_id = second.body["id"].as_i64().unwrap();

        let res = app.delete_with_token(&routes::file(first_id), &staff).await;
        assert_eq!(res.status, 204);

        let res = app
            .get_with_token(&routes::file_download(second_id), &alice)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.text, "same bytes");
    }

    #[tokio::test]
    async fn deleting_a_missing_file_is_not_found() {
        let app = TestApp::spawn().await;
        let (staff, _) = app.register_staff("support").await;

        let res = app.delete_with_token(&routes::file(9999), &staff).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn content_is_gone_after_the_last_reference_is_deleted() {
        let app = TestApp::spawn().await;
        let (staff, _) = app.register_staff("support").await;
        let (alice, _) = app.register_user("alice").await;
        let project_id = app.create_project(&alice, "Alice Site").await;
        let uploaded = app
            .upload_with_token(project_id, "gone.txt", b"bye".to_vec(), &[], &alice)
            .await;
        let file_id = uploaded.body["id"].as_i64().unwrap();

        app.delete_with_token(&routes::file(file_id), &staff).await;

        let again = app
            .upload_with_token(project_id, "back.txt", b"bye".to_vec(), &[], &alice)
            .await;
        assert_eq!(again.status, 201, "Re-upload failed: {}", again.text);
        let again_id = again.body["id"].as_i64().unwrap();
        let res = app
            .get_with_token(&routes::file_download(again_id), &alice)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.text, "bye");
    }
}
