//! Integration tests for the global user quota.

use std::thread;

use crate::helpers::TestEnv;

#[test]
fn test_quota_rejects_new_users_only() {
    let env = TestEnv::new(2);
    env.create_user("alice", "pw", &[]);
    env.create_user("bob", "pw", &[]);

    assert!(env.users.create_user("carol", "pw", vec![]).unwrap().is_none());
    assert!(!env.users.get_data_dir("carol").exists());

    let mut bob = env.users.load_user("bob").unwrap();
    bob.set_groups(vec!["ops".to_string()]).unwrap();
    assert!(bob.write().unwrap());
    assert_eq!(env.users.user_count().unwrap(), 2);
}

#[test]
fn test_removal_frees_a_slot() {
    let env = TestEnv::new(1);
    env.create_user("alice", "pw", &[]);
    assert!(env.users.create_user("bob", "pw", vec![]).unwrap().is_none());

    env.users.load_user("alice").unwrap().remove().unwrap();
    assert!(env.users.create_user("bob", "pw", vec![]).unwrap().is_some());
}

#[test]
fn test_concurrent_creation_never_exceeds_quota() {
    let env = TestEnv::new(3);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let users = env.reopen();
            thread::spawn(move || {
                users
                    .create_user(&format!("user{i}"), "pw", vec![])
                    .unwrap()
                    .is_some()
            })
        })
        .collect();

    let created = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(created, 3);
    assert_eq!(env.users.user_count().unwrap(), 3);
}
