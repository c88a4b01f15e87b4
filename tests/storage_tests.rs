use warden::storage::{validate_content_type, LocalStorage, StorageBackend};

fn temp_storage() -> LocalStorage {
    LocalStorage::new(format!("/tmp/warden-storage-test-{}", uuid::Uuid::new_v4()))
}

#[tokio::test]
async fn test_store_and_exists() {
    let storage = temp_storage();

    let stored = storage
        .store("avatar.png", "image/png", b"fake image data")
        .await
        .expect("store failed");

    assert_eq!(stored.filename, "avatar.png");
    assert!(stored.stored_name.ends_with(".png"));
    assert_ne!(stored.stored_name, "avatar.png");
    assert_eq!(stored.size, 15);

    assert!(storage.exists(&stored.stored_name).await.unwrap());
}

#[tokio::test]
async fn test_stored_names_do_not_collide() {
    let storage = temp_storage();

    let a = storage.store("same.png", "image/png", b"a").await.unwrap();
    let b = storage.store("same.png", "image/png", b"b").await.unwrap();

    assert_ne!(a.stored_name, b.stored_name);
}

#[tokio::test]
async fn test_delete_removes_blob() {
    let storage = temp_storage();

    let stored = storage.store("x.webp", "image/webp", b"bytes").await.unwrap();
    assert!(storage.exists(&stored.stored_name).await.unwrap());

    storage.delete(&stored.stored_name).await.unwrap();
    assert!(!storage.exists(&stored.stored_name).await.unwrap());
}

#[tokio::test]
async fn test_delete_missing_blob_is_ok() {
    let storage = temp_storage();
    // Idempotent: deleting something that never existed is not an error
    assert!(storage.delete("no-such-file.png").await.is_ok());
}

#[tokio::test]
async fn test_url_points_at_uploads() {
    let storage = temp_storage();
    let url = storage.url("abc.png").await.unwrap();
    assert_eq!(url, "/uploads/abc.png");
}

#[tokio::test]
async fn test_unknown_extension_falls_back_to_bin() {
    let storage = temp_storage();
    let stored = storage.store("noext", "image/png", b"x").await.unwrap();
    assert!(stored.stored_name.ends_with(".bin"));
}

#[test]
fn test_validate_content_type() {
    let allowed = &["image/jpeg", "image/png", "image/webp"];

    assert!(validate_content_type("image/png", allowed).is_ok());
    assert!(validate_content_type("image/jpeg", allowed).is_ok());
    assert!(validate_content_type("text/html", allowed).is_err());
    assert!(validate_content_type("application/octet-stream", allowed).is_err());
}
