#[cfg(test)]
pub mod fixtures {
    use crate::{
        auth::Claims,
        models::domain::{User, UserRole},
    };

    /// Creates a standard test user
    pub fn test_user(role: UserRole) -> User {
        User::new("testuser", "test@example.com", "$argon2id$not-a-real-hash", role)
    }

    /// Creates a test user with custom username
    pub fn test_user_with_username(username: &str) -> User {
        User::new(
            username,
            &format!("{}@example.com", username),
            "$argon2id$not-a-real-hash",
            UserRole::Student,
        )
    }

    /// Session claims for a user with a fixed id.
    pub fn claims_for(user_id: &str, role: UserRole) -> Claims {
        let mut user = test_user(role);
        user.id = user_id.to_string();
        Claims::new(&user, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::models::domain::UserRole;

    #[test]
    fn test_fixtures_test_user() {
        let user = test_user(UserRole::Teacher);
        assert_eq!(user.username, "testuser");
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.role, UserRole::Teacher);
    }

    #[test]
    fn test_fixtures_test_user_with_username() {
        let user = test_user_with_username("custom");
        assert_eq!(user.username, "custom");
        assert_eq!(user.email, "custom@example.com");
    }

    #[test]
    fn test_fixtures_claims_for() {
        let claims = claims_for("user-9", UserRole::Admin);
        assert_eq!(claims.sub, "user-9");
        assert!(claims.is_admin());
    }
}
