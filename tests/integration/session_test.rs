//! Integration tests for sessions across directory handles.

use chrono::{Duration, Utc};

use crate::helpers::TestEnv;

#[test]
fn test_token_verified_by_second_handle() {
    let env = TestEnv::new(10);
    env.create_user("alice", "pw", &[]);

    let mut alice = env.users.load_user("alice").unwrap();
    let created = alice.session_new("firefox", "10.0.0.1", false).unwrap();
    assert!(alice.write().unwrap());

    let mut other = env.reopen().load_user("alice").unwrap();
    let found = other.session_token_verify(&created.token).unwrap().unwrap();
    assert_eq!(found.id, created.session.id);
    assert_eq!(found.who, "firefox");
    assert_eq!(other.session_token_verify("0000").unwrap(), None);
}

#[test]
fn test_token_digest_only_on_disk() {
    let env = TestEnv::new(10);
    env.create_user("alice", "pw", &[]);

    let mut alice = env.users.load_user("alice").unwrap();
    let created = alice.session_new("w", "f", true).unwrap();
    alice.write().unwrap();

    let raw = std::fs::read_to_string(env.users.layout().data_file("alice")).unwrap();
    assert!(!raw.contains(&created.token));
    assert!(raw.contains(&created.session.token_hash));
}

#[test]
fn test_verify_writes_back_purge_without_match() {
    let env = TestEnv::new(10);
    env.create_user("alice", "pw", &[]);

    let mut alice = env.users.load_user("alice").unwrap();
    let expired = alice.session_new("w", "f", false).unwrap();
    let kept = alice.session_new("w", "f", true).unwrap();
    let mut sessions = alice.sessions().to_vec();
    sessions[0].expires_at = Some(Utc::now() - Duration::minutes(1));
    alice.set_sessions(sessions).unwrap();
    alice.write().unwrap();

    let mut verifier = env.reopen().load_user("alice").unwrap();
    assert!(verifier.session_token_verify(&expired.token).unwrap().is_none());

    let stored = env.users.load_user("alice").unwrap();
    assert!(stored.session_get(&expired.session.id).is_none());
    assert!(stored.session_get(&kept.session.id).is_some());
}

#[tokio::test]
async fn test_manager_login_logout_cycle() {
    let env = TestEnv::new(10);
    env.create_user("alice", "pw", &[]);
    env.create_user("bob", "pw", &[]);
    let manager = env.manager();

    let alice = manager.login("alice", "pw", false, "a", "x").await.unwrap();
    let bob = manager.login("bob", "pw", true, "b", "y").await.unwrap();
    assert_eq!(bob.landing, env.config.auth.permanent_landing);

    assert_eq!(manager.authenticate(&bob.token).await.unwrap().username, "bob");
    manager.logout(&alice.token).await.unwrap();
    assert!(manager.authenticate(&alice.token).await.is_err());
    assert!(manager.authenticate(&bob.token).await.is_ok());

    let stored = env.reopen().load_user("alice").unwrap();
    assert!(stored.sessions().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_logins_all_authenticate() {
    let env = TestEnv::new(10);
    env.create_user("alice", "pw", &[]);
    let managers = [env.manager(), env.reopen_manager()];

    let logins: Vec<_> = (0..8)
        .map(|i| {
            let manager = managers[i % 2].clone();
            tokio::spawn(async move {
                manager
                    .login("alice", "pw", false, &format!("client-{i}"), "x")
                    .await
            })
        })
        .collect();

    let mut tokens = Vec::new();
    for login in logins {
        tokens.push(login.await.unwrap().unwrap().token);
    }

    let stored = env.reopen().load_user("alice").unwrap();
    assert_eq!(stored.sessions().len(), tokens.len());
    for token in &tokens {
        assert_eq!(managers[0].authenticate(token).await.unwrap().username, "alice");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_logins_racing_authenticate_keep_every_token() {
    let env = TestEnv::new(10);
    env.create_user("alice", "pw", &[]);
    env.create_user("bob", "pw", &[]);
    let manager = env.manager();
    let bob = manager.login("bob", "pw", true, "b", "y").await.unwrap();

    let mut checks = Vec::new();
    let mut logins = Vec::new();
    for i in 0..6 {
        let checker = manager.clone();
        let token = bob.token.clone();
        checks.push(tokio::spawn(async move { checker.authenticate(&token).await }));

        let login = manager.clone();
        logins.push(tokio::spawn(async move {
            login.login("alice", "pw", false, &format!("client-{i}"), "x").await
        }));
    }

    for check in checks {
        assert_eq!(check.await.unwrap().unwrap().username, "bob");
    }
    let mut tokens = Vec::new();
    for login in logins {
        tokens.push(login.await.unwrap().unwrap().token);
    }

    for token in &tokens {
        assert_eq!(manager.authenticate(token).await.unwrap().username, "alice");
    }
    assert_eq!(env.reopen().load_user("alice").unwrap().sessions().len(), 6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_removed_user_stays_removed_under_authentication() {
    let env = TestEnv::new(10);
    env.create_user("alice", "pw", &[]);
    env.create_user("bob", "pw", &[]);
    let manager = env.manager();
    let alice = manager.login("alice", "pw", true, "a", "x").await.unwrap();
    let bob = manager.login("bob", "pw", true, "b", "y").await.unwrap();

    let mut checks = Vec::new();
    for i in 0..8 {
        let checker = manager.clone();
        let token = if i % 2 == 0 { alice.token.clone() } else { bob.token.clone() };
        checks.push(tokio::spawn(async move { checker.authenticate(&token).await }));
    }
    let users = env.reopen();
    let removal = tokio::task::spawn_blocking(move || users.load_user("alice")?.remove());

    removal.await.unwrap().unwrap();
    for check in checks {
        match check.await.unwrap() {
            Ok(auth) => assert!(auth.username == "alice" || auth.username == "bob"),
            Err(e) => assert!(e.is_authentication(), "unexpected error: {e}"),
        }
    }

    assert!(!env.users.get_data_dir("alice").exists());
    assert!(!env.users.user_exists("alice").unwrap());
    assert!(manager.authenticate(&alice.token).await.unwrap_err().is_authentication());
    assert_eq!(manager.authenticate(&bob.token).await.unwrap().username, "bob");
}

#[test]
fn test_stale_copy_cannot_bring_back_removed_user() {
    let env = TestEnv::new(10);
    env.create_user("alice", "pw", &[]);

    let mut stale = env.reopen().load_user("alice").unwrap();
    env.users.load_user("alice").unwrap().remove().unwrap();

    assert!(stale.session_token_verify("anything").unwrap_err().is_internal());
    stale.session_new("w", "f", true).unwrap();
    assert!(stale.write().unwrap_err().is_internal());
    assert!(!env.users.get_data_dir("alice").exists());
    assert_eq!(env.users.user_count().unwrap(), 0);
}
