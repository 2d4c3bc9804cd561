//! Integration tests for user records on disk.

use std::fs;

use crate::helpers::TestEnv;

#[test]
fn test_record_visible_to_second_handle() {
    let env = TestEnv::new(10);
    env.create_user("alice", "s3cret", &["admin", "ops"]);

    let other = env.reopen();
    let alice = other.load_user("alice").unwrap();
    assert_eq!(alice.groups(), ["admin", "ops"]);
    assert!(alice.verify_password("s3cret"));
    assert_eq!(other.user_names().unwrap(), vec!["alice"]);
}

#[test]
fn test_stored_document_shape() {
    let env = TestEnv::new(10);
    env.create_user("alice", "s3cret", &["admin"]);

    let path = env.users.layout().data_file("alice");
    let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    let mut keys: Vec<&str> = doc.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, vec!["groups", "hash", "sessions", "user"]);
    assert_eq!(doc["user"], "alice");
    assert!(doc["hash"].as_str().unwrap().starts_with("$argon2id$"));
    assert_ne!(doc["hash"], "s3cret");
}

#[test]
fn test_listing_ignores_foreign_entries() {
    let env = TestEnv::new(10);
    env.create_user("bob", "pw", &[]);
    env.create_user("alice", "pw", &[]);

    let root = env.users.layout().root().to_path_buf();
    fs::create_dir(root.join("half-created")).unwrap();
    fs::create_dir(root.join("broken")).unwrap();
    fs::write(root.join("broken/data.json"), "not json").unwrap();
    fs::write(root.join("README"), "stray file").unwrap();

    assert_eq!(env.users.user_names().unwrap(), vec!["alice", "bob"]);
    assert_eq!(env.users.user_count().unwrap(), 2);
    assert!(!env.users.user_exists("carol").unwrap());
    assert!(env.users.user_exists("half-created").unwrap_err().is_internal());
    assert!(env.users.user_exists("broken").unwrap_err().is_internal());
}

#[test]
fn test_password_change_persists() {
    let env = TestEnv::new(10);
    env.create_user("alice", "old", &[]);

    let mut alice = env.users.load_user("alice").unwrap();
    alice.set_password("new").unwrap();
    assert!(alice.write().unwrap());

    let reloaded = env.reopen().load_user("alice").unwrap();
    assert!(reloaded.verify_password("new"));
    assert!(!reloaded.verify_password("old"));
}

#[test]
fn test_remove_user_deletes_directory() {
    let env = TestEnv::new(10);
    env.create_user("alice", "pw", &[]);
    let dir = env.users.get_data_dir("alice");
    assert!(dir.is_dir());

    env.users.load_user("alice").unwrap().remove().unwrap();
    assert!(!dir.exists());
    assert!(env.users.user_names().unwrap().is_empty());
    assert!(env.users.load_user("alice").unwrap_err().is_argument());
}
