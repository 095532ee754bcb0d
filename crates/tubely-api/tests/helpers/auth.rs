use chrono::Duration;
use tubely_api::auth::JwtService;
use uuid::Uuid;

/// A caller with a valid access token.
pub struct TestUser {
    pub user_id: Uuid,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

pub fn create_test_user(jwt: &JwtService) -> TestUser {
    let user_id = Uuid::new_v4();
    let token = jwt
        .issue(user_id, Duration::hours(1))
        .expect("Failed to issue test token");
    TestUser { user_id, token }
}

/// Token signed with a different secret.
pub fn foreign_token() -> String {
    JwtService::new("some-other-secret-that-is-also-32-chars!")
        .issue(Uuid::new_v4(), Duration::hours(1))
        .expect("Failed to issue foreign token")
}
