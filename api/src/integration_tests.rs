//! End-to-end tests across services and the HTTP router
//!
//! Service flows run against the in-memory ports. Router tests build the real
//! `AppState` on a disconnected database, or on a sea-orm `MockDatabase` when a
//! request needs a user row, so they cover auth, validation and configuration.
//!
//! Run with: cargo test integration_tests

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use serde_json::{json, Value};
    use uuid::Uuid;

    use crate::app::{CacheService, PostRatingService, PostService, ProfileService, UserService};
    use crate::domain::entities::{Actor, UpsertUser};
    use crate::domain::ports::{PostRepository, UserDirectory};
    use crate::entity::users;
    use crate::error::{AppError, DomainError};
    use crate::test_utils::{
        test_admin, test_config, InMemoryAiUsageRepository, InMemoryPostRatingRepository,
        InMemoryPostRepository, InMemoryUserRepository, MockAiClient, MockUserDirectory,
    };
    use crate::{router, AppState};

    // ============================================================
    // Service flows
    // ============================================================

    struct Board {
        posts: Arc<InMemoryPostRepository>,
        users: UserService<InMemoryUserRepository, dyn UserDirectory>,
        post_service: PostService<InMemoryPostRepository, MockAiClient>,
        rating_service: PostRatingService<InMemoryPostRepository, InMemoryPostRatingRepository>,
        profile_service: ProfileService<
            InMemoryUserRepository,
            InMemoryPostRepository,
            InMemoryPostRatingRepository,
            InMemoryAiUsageRepository,
        >,
    }

    fn create_board(moderator: Option<MockAiClient>) -> Board {
        let cache = Arc::new(CacheService::new(Duration::from_secs(60), 100));
        let posts = Arc::new(InMemoryPostRepository::new());
        let ratings = Arc::new(InMemoryPostRatingRepository::new().with_posts(posts.clone()));
        let users = Arc::new(InMemoryUserRepository::new());
        let usages = Arc::new(InMemoryAiUsageRepository::new());
        let directory: Arc<dyn UserDirectory> = Arc::new(MockUserDirectory::new());

        Board {
            posts: posts.clone(),
            users: UserService::new(users.clone(), directory, cache.clone()),
            post_service: PostService::new(posts.clone(), moderator.map(Arc::new), cache.clone()),
            rating_service: PostRatingService::new(posts.clone(), ratings.clone(), cache.clone()),
            profile_service: ProfileService::new(users, posts, ratings, usages, cache),
        }
    }

    fn identity(sub: &str, name: &str) -> UpsertUser {
        UpsertUser {
            external_id: sub.to_string(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            display_name: name.to_string(),
        }
    }

    async fn sign_in(board: &Board, sub: &str, name: &str) -> Actor {
        let user = board.users.ensure_user(&identity(sub, name)).await.unwrap();
        Actor {
            user_id: user.id,
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn post_like_and_profile_flow() {
        let board = create_board(None);
        let author = sign_in(&board, "auth0|ada", "Ada").await;
        let reader = sign_in(&board, "auth0|bob", "Bob").await;

        let post = board
            .post_service
            .create(&author, "Hello board", "First post here", &["news".to_string()])
            .await
            .unwrap();

        // Profile is cached before the like lands
        let before = board.profile_service.get_by_id(&author.user_id).await.unwrap();
        assert_eq!(before.stats.post_count, 1);
        assert_eq!(before.stats.rating_received, 0);

        let liked = board
            .rating_service
            .toggle(&reader, &post.id.to_string())
            .await
            .unwrap();
        assert_eq!(liked.value, 1);
        assert_eq!(liked.post_rating, 1);

        let after = board.profile_service.get_by_id(&author.user_id).await.unwrap();
        assert_eq!(after.stats.rating_received, 1);
        assert_eq!(after.recent_posts.len(), 1);

        let reader_profile = board.profile_service.get_by_id(&reader.user_id).await.unwrap();
        assert_eq!(reader_profile.stats.ratings_given, 1);

        let unliked = board
            .rating_service
            .toggle(&reader, &post.id.to_string())
            .await
            .unwrap();
        assert_eq!(unliked.value, 0);
        assert_eq!(unliked.post_rating, 0);

        let after_unlike = board.profile_service.get_by_id(&author.user_id).await.unwrap();
        assert_eq!(after_unlike.stats.rating_received, 0);
    }

    #[tokio::test]
    async fn deleted_post_disappears_from_reads_and_ratings() {
        let board = create_board(None);
        let author = sign_in(&board, "auth0|ada", "Ada").await;
        let reader = sign_in(&board, "auth0|bob", "Bob").await;

        let post = board
            .post_service
            .create(&author, "Short lived", "Gone soon", &[])
            .await
            .unwrap();
        let id = post.id.to_string();

        // Another user may not delete it
        let denied = board.post_service.delete(&reader, &id).await;
        assert!(matches!(denied, Err(AppError::Forbidden)));

        board.post_service.delete(&author, &id).await.unwrap();

        assert!(matches!(
            board.post_service.get(&id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            board.rating_service.toggle(&reader, &id).await,
            Err(AppError::NotFound(_))
        ));

        let profile = board.profile_service.get_by_id(&author.user_id).await.unwrap();
        assert_eq!(profile.stats.post_count, 0);
        assert!(profile.recent_posts.is_empty());
    }

    #[tokio::test]
    async fn deleting_a_post_drops_it_from_likers_profiles() {
        let board = create_board(None);
        let author = sign_in(&board, "auth0|ada", "Ada").await;
        let reader = sign_in(&board, "auth0|bob", "Bob").await;

        let kept = board
            .post_service
            .create(&author, "Kept", "Stays up", &[])
            .await
            .unwrap();
        let removed = board
            .post_service
            .create(&author, "Removed", "Comes down", &[])
            .await
            .unwrap();
        for post in [&kept, &removed] {
            board
                .rating_service
                .toggle(&reader, &post.id.to_string())
                .await
                .unwrap();
        }

        let before = board.profile_service.get_by_id(&reader.user_id).await.unwrap();
        assert_eq!(before.stats.ratings_given, 2);

        board
            .post_service
            .delete(&author, &removed.id.to_string())
            .await
            .unwrap();
        let after = board.profile_service.get_by_id(&reader.user_id).await.unwrap();
        assert_eq!(after.stats.ratings_given, 1);

        let author_profile = board.profile_service.get_by_id(&author.user_id).await.unwrap();
        assert_eq!(author_profile.stats.rating_received, 1);
    }

    #[tokio::test]
    async fn deactivated_user_is_locked_out() {
        let board = create_board(None);
        let actor = sign_in(&board, "auth0|eve", "Eve").await;

        board
            .users
            .deactivate(&test_admin(), &actor.user_id.to_string())
            .await
            .unwrap();

        let result = board.users.ensure_user(&identity("auth0|eve", "Eve")).await;
        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::Forbidden(_)))
        ));

        let profile = board.profile_service.get_by_id(&actor.user_id).await;
        assert!(matches!(profile, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn flagged_post_is_never_stored() {
        let moderator = MockAiClient::new()
            .with_reply(r#"{"flagged": true, "categories": ["spam"], "reason": "Looks like spam"}"#);
        let board = create_board(Some(moderator));
        let author = sign_in(&board, "auth0|ada", "Ada").await;

        let result = board
            .post_service
            .create(&author, "Buy now", "Cheap watches", &[])
            .await;

        match result {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("Looks like spam")),
            other => panic!("expected moderation rejection, got {:?}", other.map(|p| p.id)),
        }
        assert_eq!(board.posts.count_by_user(&author.user_id).await.unwrap(), 0);
    }

    // ============================================================
    // HTTP router
    // ============================================================

    const SECRET: &str = "test-secret";

    async fn app_state(db: DatabaseConnection) -> AppState {
        let config = test_config();
        let mongo = mongodb::Client::with_uri_str(&config.mongodb_uri)
            .await
            .unwrap()
            .database(&config.mongodb_database);
        AppState::build(&config, db, &mongo).unwrap()
    }

    async fn server_with(db: DatabaseConnection) -> TestServer {
        TestServer::new(router(app_state(db).await, false).unwrap()).unwrap()
    }

    async fn server() -> TestServer {
        server_with(DatabaseConnection::Disconnected).await
    }

    /// Row returned by the user upsert for an account an admin switched off
    fn deactivated_row(sub: &str) -> users::Model {
        let now = Utc::now().fixed_offset();
        users::Model {
            id: Uuid::new_v4(),
            external_id: sub.to_string(),
            email: None,
            display_name: "Eve".to_string(),
            is_active: false,
            created_at: now,
            last_seen_at: Some(now),
        }
    }

    fn assert_envelope_error(body: &Value, status: u16) {
        assert_eq!(body["IsSuccess"], json!(false));
        assert_eq!(body["StatusCode"], json!(status));
        assert!(body["Data"].is_string());
    }

    fn bearer(claims: Value) -> HeaderValue {
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
    }

    fn exp() -> i64 {
        Utc::now().timestamp() + 300
    }

    #[tokio::test]
    async fn health_reports_version_in_envelope() {
        let response = server().await.get("/health").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["IsSuccess"], json!(true));
        assert_eq!(body["StatusCode"], json!(200));
        assert_eq!(body["Data"]["status"], json!("ok"));
    }

    #[tokio::test]
    async fn configuration_is_public() {
        let response = server().await.get("/api/configuration").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["Data"]["ai_enabled"], json!(false));
        assert_eq!(body["Data"]["moderation_enabled"], json!(false));
        assert_eq!(body["Data"]["directory_enabled"], json!(false));
        assert_eq!(body["Data"]["ai_daily_limit"], json!(50));
    }

    #[tokio::test]
    async fn malformed_post_id_is_bad_request() {
        let response = server().await.get("/api/posts/not-a-guid").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["IsSuccess"], json!(false));
        assert_eq!(body["StatusCode"], json!(400));
    }

    #[tokio::test]
    async fn writes_require_a_token() {
        let server = server().await;

        let create = server
            .post("/api/posts")
            .json(&json!({"title": "Hi", "content": "There"}))
            .await;
        create.assert_status(StatusCode::UNAUTHORIZED);

        let chat = server
            .post("/api/ai/chat")
            .json(&json!({"message": "hello"}))
            .await;
        chat.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = chat.json();
        assert_eq!(body["StatusCode"], json!(401));
    }

    #[tokio::test]
    async fn cache_clear_is_admin_only() {
        let server = server().await;

        let member = server
            .delete("/api/cache")
            .add_header(
                header::AUTHORIZATION,
                bearer(json!({"sub": "auth0|member", "exp": exp()})),
            )
            .await;
        member.assert_status(StatusCode::FORBIDDEN);

        let admin = server
            .delete("/api/cache")
            .add_header(
                header::AUTHORIZATION,
                bearer(json!({"sub": "auth0|admin", "roles": ["Admin"], "exp": exp()})),
            )
            .await;
        admin.assert_status_ok();
        let body: Value = admin.json();
        assert_eq!(body["Data"]["cleared"], json!(0));
    }

    #[tokio::test]
    async fn prefix_cache_clear_reports_count() {
        let response = server()
            .await
            .delete("/api/cache")
            .add_query_param("prefix", "profile:")
            .add_header(
                header::AUTHORIZATION,
                bearer(json!({"sub": "auth0|admin", "roles": "admin", "exp": exp()})),
            )
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["Data"]["cleared"], json!(0));
    }

    #[tokio::test]
    async fn malformed_input_gets_enveloped_bad_request() {
        let server = server().await;

        let body = server
            .post("/api/posts")
            .add_header(
                header::AUTHORIZATION,
                bearer(json!({"sub": "auth0|ada", "exp": exp()})),
            )
            .text("{not json")
            .await;
        body.assert_status(StatusCode::BAD_REQUEST);
        assert_envelope_error(&body.json(), 400);

        let query = server.get("/api/posts").add_query_param("limit", "abc").await;
        query.assert_status(StatusCode::BAD_REQUEST);
        assert_envelope_error(&query.json(), 400);
    }

    #[tokio::test]
    async fn deactivated_account_cannot_use_user_lookups() {
        let sub = "auth0|eve";
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![deactivated_row(sub)], vec![deactivated_row(sub)]])
            .into_connection();
        let server = server_with(db).await;
        let token = bearer(json!({"sub": sub, "exp": exp()}));

        let search = server
            .get("/api/users/search")
            .add_query_param("q", "gr")
            .add_header(header::AUTHORIZATION, token.clone())
            .await;
        search.assert_status(StatusCode::FORBIDDEN);
        assert_envelope_error(&search.json(), 403);

        let lookup = server
            .get(&format!("/api/users/{}", Uuid::new_v4()))
            .add_header(header::AUTHORIZATION, token)
            .await;
        lookup.assert_status(StatusCode::FORBIDDEN);
        assert_envelope_error(&lookup.json(), 403);
    }

    #[tokio::test]
    async fn ai_routes_are_rate_limited_per_peer() {
        let app = router(app_state(DatabaseConnection::Disconnected).await, true).unwrap();
        let server = TestServer::builder()
            .http_transport()
            .build(app.into_make_service_with_connect_info::<SocketAddr>())
            .unwrap();

        let mut statuses = Vec::new();
        for _ in 0..6 {
            let response = server
                .post("/api/ai/chat")
                .json(&json!({"message": "hello"}))
                .await;
            statuses.push(response.status_code());
        }

        // Burst of 5 reaches the auth layer, the 6th is stopped by the governor
        assert!(statuses[..5].iter().all(|s| *s == StatusCode::UNAUTHORIZED));
        assert_eq!(statuses[5], StatusCode::TOO_MANY_REQUESTS);
    }
}
