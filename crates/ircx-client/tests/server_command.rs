//! `/server` command flows: host resolution, server updates, new-window
//! handling and deferred channel joins.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use ircx_client::{ConnectOptions, ServerCommandArgs};
use ircx_net::SessionCommand;
use ircx_shared::network::{NetworkConfig, ServerConfig};

fn work_network() -> NetworkConfig {
    let mut network = NetworkConfig::named("worknet");
    network
        .servers
        .push(ServerConfig::new("irc.work.example", 6667, false));
    network
}

#[tokio::test]
async fn dials_a_new_host_and_joins_immediately_when_registered() {
    let env = common::env();

    env.orchestrator
        .handle_server_connect(ServerCommandArgs {
            address: Some("irc.newhost.example".to_string()),
            ssl: true,
            join_channels: vec!["#rust".to_string()],
            ..ServerCommandArgs::default()
        })
        .await;

    {
        let calls = env.manager.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "irc.newhost.example");
        assert_eq!(calls[0].1.host, "irc.newhost.example");
        assert_eq!(calls[0].1.port, 6697);
        assert!(calls[0].1.tls);
    }

    let mut driver = env
        .manager
        .take_driver("irc.newhost.example")
        .expect("session should exist");
    match driver.commands.try_recv() {
        Ok(SessionCommand::Join(channel)) => assert_eq!(channel, "#rust"),
        other => panic!("expected a join, got {other:?}"),
    }
}

#[tokio::test]
async fn joins_are_deferred_until_the_session_registers() {
    let env = common::env();
    env.manager.auto_register.store(false, Ordering::SeqCst);

    env.orchestrator
        .handle_server_connect(ServerCommandArgs {
            address: Some("irc.newhost.example".to_string()),
            join_channels: vec!["#late".to_string()],
            ..ServerCommandArgs::default()
        })
        .await;

    let mut driver = env
        .manager
        .take_driver("irc.newhost.example")
        .expect("session should exist");

    // Nothing joined yet: the session has not registered.
    assert!(driver.commands.try_recv().is_err());

    driver.set_registered(true);

    let joined = tokio::time::timeout(Duration::from_secs(5), driver.commands.recv())
        .await
        .expect("join should arrive after registration")
        .expect("command channel open");
    match joined {
        SessionCommand::Join(channel) => assert_eq!(channel, "#late"),
        other => panic!("expected a join, got {other:?}"),
    }
}

#[tokio::test]
async fn updates_a_stored_networks_server_from_arguments() {
    let env = common::env();
    let network = work_network();
    env.db.lock().unwrap().add_network(&network).unwrap();

    env.orchestrator
        .handle_server_connect(ServerCommandArgs {
            address: Some("irc.work.example".to_string()),
            port: Some(7000),
            ssl: true,
            password: Some("sekrit".to_string()),
            ..ServerCommandArgs::default()
        })
        .await;

    {
        let calls = env.manager.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.port, 7000);
        assert!(calls[0].1.tls);
        assert_eq!(calls[0].1.password.as_deref(), Some("sekrit"));
    }

    // The update is persisted onto the stored entry.
    let db = env.db.lock().unwrap();
    let stored = db.get_network(network.id).unwrap();
    assert_eq!(stored.servers[0].port, 7000);
    assert!(stored.servers[0].tls);
    assert_eq!(stored.servers[0].password.as_deref(), Some("sekrit"));
}

#[tokio::test]
async fn server_index_dials_within_the_active_network() {
    let env = common::env();
    let mut network = work_network();
    network
        .servers
        .push(ServerConfig::new("irc.backup.example", 6697, true));
    env.db.lock().unwrap().add_network(&network).unwrap();

    // Establish the active session first.
    env.orchestrator
        .connect(ConnectOptions {
            network: Some(network.clone()),
            ..ConnectOptions::default()
        })
        .await
        .unwrap();

    env.orchestrator
        .handle_server_connect(ServerCommandArgs {
            server_index: Some(1),
            port: Some(9999),
            ..ServerCommandArgs::default()
        })
        .await;

    let calls = env.manager.calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].1.host, "irc.backup.example");
    assert_eq!(calls[1].1.port, 9999);
}

#[tokio::test]
async fn new_window_against_a_known_host_gets_a_unique_network_name() {
    let env = common::env();
    env.db.lock().unwrap().add_network(&work_network()).unwrap();

    env.orchestrator
        .handle_server_connect(ServerCommandArgs {
            address: Some("irc.work.example".to_string()),
            new_window: true,
            ..ServerCommandArgs::default()
        })
        .await;

    let calls = env.manager.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].0.starts_with("irc.work.example ("));
}

#[tokio::test]
async fn new_window_no_connect_persists_without_dialing() {
    let env = common::env();

    env.orchestrator
        .handle_server_connect(ServerCommandArgs {
            address: Some("irc.later.example".to_string()),
            ssl: true,
            new_window_no_connect: true,
            ..ServerCommandArgs::default()
        })
        .await;

    assert!(env.manager.calls.lock().unwrap().is_empty());

    let db = env.db.lock().unwrap();
    let networks = db.load_networks().unwrap();
    assert_eq!(networks.len(), 1);
    assert_eq!(networks[0].name, "irc.later.example");
    assert_eq!(networks[0].servers[0].host, "irc.later.example");
    assert!(networks[0].servers[0].tls);
}

#[tokio::test]
async fn malformed_command_surfaces_inline_on_the_active_session() {
    let env = common::env();
    let network = work_network();
    env.db.lock().unwrap().add_network(&network).unwrap();

    env.orchestrator
        .connect(ConnectOptions {
            network: Some(network.clone()),
            ..ConnectOptions::default()
        })
        .await
        .unwrap();

    // Neither an address nor a server index: unresolvable.
    env.orchestrator
        .handle_server_connect(ServerCommandArgs::default())
        .await;

    // No second dial happened, and the error landed in the server tab.
    assert_eq!(env.manager.calls.lock().unwrap().len(), 1);
    let state = env.state.lock().unwrap();
    let tab = state.server_tab(network.id).unwrap();
    assert!(tab.messages.iter().any(|m| m.text.contains("/server:")));
}
