use chrono::Utc;

use warden::models::user::{Model as User, UserResponse};

fn sample_user() -> User {
    let now = Utc::now().naive_utc();
    User {
        id: 7,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".to_string(),
        avatar: Some("3f2c.png".to_string()),
        description: Some("Rustacean".to_string()),
        refresh_token: Some("super-secret-refresh".to_string()),
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_user_serialization_hides_secrets() {
    let user = sample_user();
    let json = serde_json::to_value(&user).unwrap();

    assert_eq!(json["email"], "alice@example.com");
    assert!(json.get("password_hash").is_none());
    assert!(json.get("refresh_token").is_none());
}

#[test]
fn test_user_response_from_model() {
    let user = sample_user();
    let response = UserResponse::from(user.clone());

    assert_eq!(response.id, user.id);
    assert_eq!(response.name, user.name);
    assert_eq!(response.email, user.email);
    assert_eq!(response.avatar, user.avatar);
    assert_eq!(response.description, user.description);
}

#[test]
fn test_user_response_serialization_has_no_secret_fields() {
    let response = UserResponse::from(sample_user());
    let json = serde_json::to_value(&response).unwrap();

    let obj = json.as_object().unwrap();
    assert!(!obj.contains_key("password_hash"));
    assert!(!obj.contains_key("refresh_token"));
    assert!(obj.contains_key("id"));
    assert!(obj.contains_key("name"));
    assert!(obj.contains_key("email"));
    assert!(obj.contains_key("avatar"));
    assert!(obj.contains_key("description"));
}

#[test]
fn test_optional_fields_serialize_as_null() {
    let mut user = sample_user();
    user.avatar = None;
    user.description = None;

    let json = serde_json::to_value(UserResponse::from(user)).unwrap();
    assert!(json["avatar"].is_null());
    assert!(json["description"].is_null());
}
