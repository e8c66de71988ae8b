//! End-to-end tests: a real server on a loopback port, driven by admin
//! (HTTP) and viewer (WebSocket) actors through the client module.

use riskzone_core::client::{ClientError, ClientViewModel, ZoneClient, ZoneFeed, ZoneViewer};
use riskzone_core::config::Config;
use riskzone_core::server::ZoneServer;
use riskzone_core::shutdown::ShutdownCoordinator;
use riskzone_core::sync::{ServerEvent, SyncHub, SyncHubHandle};
use riskzone_core::test_utils::{candidate, square, triangle, DEFAULT_TEST_TIMEOUT, SHORT_TEST_TIMEOUT};
use riskzone_core::zones::{RiskLevel, ZoneId};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

struct TestServer {
    url: String,
    hub: SyncHubHandle,
    shutdown: Arc<ShutdownCoordinator>,
    task: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with(Config::default()).await
    }

    async fn start_with(mut config: Config) -> Self {
        config.server.bind_address = SocketAddr::from(([127, 0, 0, 1], 0));
        config.server.shutdown_timeout = Duration::from_millis(500);

        let (hub, _hub_task) = SyncHub::spawn(&config);
        let server = ZoneServer::bind(&config, hub.clone()).await.unwrap();
        let url = format!("http://{}", server.local_addr().unwrap());

        let shutdown = Arc::new(ShutdownCoordinator::new());
        let task = tokio::spawn(server.run(shutdown.clone()));

        Self {
            url,
            hub,
            shutdown,
            task,
        }
    }

    fn client(&self) -> ZoneClient {
        ZoneClient::new(&self.url).unwrap()
    }

    /// Viewer connected and holding its initial snapshot
    async fn viewer(&self) -> (ZoneFeed, ClientViewModel) {
        let mut feed = self.client().subscribe().await.unwrap();
        feed.request_snapshot().await.unwrap();

        let mut view = ClientViewModel::new();
        let event = next_event(&mut feed).await;
        assert!(matches!(event, ServerEvent::UpdateZones(_)), "got {:?}", event);
        view.apply(event);
        (feed, view)
    }

    async fn stop(self) {
        self.shutdown.shutdown().await;
        self.hub.shutdown().await;
        let _ = tokio::time::timeout(DEFAULT_TEST_TIMEOUT, self.task).await;
    }
}

async fn next_event(feed: &mut ZoneFeed) -> ServerEvent {
    tokio::time::timeout(DEFAULT_TEST_TIMEOUT, feed.next_event())
        .await
        .expect("timed out waiting for event")
        .expect("feed closed")
        .expect("undecodable event")
}

async fn assert_quiet(feed: &mut ZoneFeed) {
    if let Ok(event) = tokio::time::timeout(SHORT_TEST_TIMEOUT, feed.next_event()).await {
        panic!("unexpected event {:?}", event);
    }
}

#[tokio::test]
async fn test_high_risk_zone_reaches_viewer_with_alert() {
    let server = TestServer::start().await;
    let (mut feed, mut view) = server.viewer().await;
    assert!(view.zones().is_empty());

    let zone = server.client().submit(&candidate(&square(), "high")).await.unwrap();
    assert_eq!(zone.risk, RiskLevel::High);

    let event = next_event(&mut feed).await;
    assert_eq!(event, ServerEvent::NewZone(zone.clone()));
    view.apply(event);

    match next_event(&mut feed).await {
        ServerEvent::HighRiskAlert(alert) => assert_eq!(alert.message, "⚠️ High Risk Zone Added!"),
        other => panic!("expected alert, got {:?}", other),
    }
    assert_eq!(view.zones(), &[zone]);

    // Exactly one alert
    assert_quiet(&mut feed).await;
    server.stop().await;
}

#[tokio::test]
async fn test_medium_zone_has_no_alert() {
    let server = TestServer::start().await;
    let (mut feed, _) = server.viewer().await;

    let zone = server.client().submit(&candidate(&square(), "medium")).await.unwrap();
    assert_eq!(next_event(&mut feed).await, ServerEvent::NewZone(zone));
    assert_quiet(&mut feed).await;

    server.stop().await;
}

#[tokio::test]
async fn test_invalid_submissions_are_rejected_over_http() {
    let server = TestServer::start().await;
    let client = server.client();

    let two_points = candidate(&[(6.9, 79.9), (6.91, 79.91)], "low");
    match client.submit(&two_points).await {
        Err(ClientError::Rejected { status, reason, .. }) => {
            assert_eq!(status, 422);
            assert_eq!(reason, "malformed_geometry");
        }
        other => panic!("expected rejection, got {:?}", other),
    }

    match client.submit(&candidate(&triangle(), "extreme")).await {
        Err(ClientError::Rejected { reason, .. }) => assert_eq!(reason, "invalid_risk_level"),
        other => panic!("expected rejection, got {:?}", other),
    }

    assert!(client.fetch_snapshot().await.unwrap().is_empty());
    server.stop().await;
}

#[tokio::test]
async fn test_risk_level_is_case_insensitive() {
    let server = TestServer::start().await;

    let zone = server.client().submit(&candidate(&square(), "HIGH")).await.unwrap();
    assert_eq!(zone.risk, RiskLevel::High);

    server.stop().await;
}

#[tokio::test]
async fn test_websocket_rejection_reaches_only_origin() {
    let server = TestServer::start().await;
    let (mut origin, _) = server.viewer().await;
    let (mut other, _) = server.viewer().await;

    origin.submit(candidate(&triangle(), "extreme")).await.unwrap();

    match next_event(&mut origin).await {
        ServerEvent::ZoneRejected(notice) => assert_eq!(notice.reason, "invalid_risk_level"),
        event => panic!("expected rejection, got {:?}", event),
    }
    assert_quiet(&mut other).await;

    server.stop().await;
}

#[tokio::test]
async fn test_mistyped_websocket_submission_is_rejected() {
    let server = TestServer::start().await;
    let (mut origin, _) = server.viewer().await;
    let (mut other, _) = server.viewer().await;

    let frame = r#"{"event":"submit_zone","data":{"coordinates":[[6.9,79.9],[6.91,79.9],[6.91,79.91]],"risk":null}}"#;
    origin.send_text(frame.to_string()).await.unwrap();

    match next_event(&mut origin).await {
        ServerEvent::ZoneRejected(notice) => assert_eq!(notice.reason, "invalid_risk_level"),
        event => panic!("expected rejection, got {:?}", event),
    }
    assert_quiet(&mut other).await;
    assert!(server.client().fetch_snapshot().await.unwrap().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_websocket_submission_broadcasts_to_all() {
    let server = TestServer::start().await;
    let (mut origin, _) = server.viewer().await;
    let (mut other, _) = server.viewer().await;

    origin.submit(candidate(&square(), "low")).await.unwrap();

    let seen_by_origin = next_event(&mut origin).await;
    let seen_by_other = next_event(&mut other).await;
    assert!(matches!(seen_by_origin, ServerEvent::NewZone(_)));
    assert_eq!(seen_by_origin, seen_by_other);

    server.stop().await;
}

#[tokio::test]
async fn test_viewers_see_commit_order() {
    let server = TestServer::start().await;
    let (mut first, mut first_view) = server.viewer().await;
    let (mut second, mut second_view) = server.viewer().await;
    let client = server.client();

    for risk in ["low", "medium", "low", "medium", "low"] {
        client.submit(&candidate(&square(), risk)).await.unwrap();
    }
    for _ in 0..5 {
        first_view.apply(next_event(&mut first).await);
        second_view.apply(next_event(&mut second).await);
    }

    let committed: Vec<ZoneId> = client
        .fetch_snapshot()
        .await
        .unwrap()
        .into_iter()
        .map(|zone| zone.id)
        .collect();
    let ids = |view: &ClientViewModel| view.zones().iter().map(|z| z.id.clone()).collect::<Vec<_>>();

    assert_eq!(ids(&first_view), committed);
    assert_eq!(ids(&second_view), committed);
    server.stop().await;
}

#[tokio::test]
async fn test_reset_empties_every_viewer() {
    let server = TestServer::start().await;
    let client = server.client();
    client.submit(&candidate(&square(), "low")).await.unwrap();
    client.submit(&candidate(&triangle(), "medium")).await.unwrap();

    let (mut feed, mut view) = server.viewer().await;
    assert_eq!(view.zones().len(), 2);

    assert_eq!(client.reset().await.unwrap(), 2);

    let event = next_event(&mut feed).await;
    assert_eq!(event, ServerEvent::ResetZones);
    view.apply(event);
    assert!(view.zones().is_empty());
    assert!(client.fetch_snapshot().await.unwrap().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_closed_viewer_does_not_block_others() {
    let server = TestServer::start().await;
    let (gone, _) = server.viewer().await;
    let (mut staying, _) = server.viewer().await;

    gone.close().await.unwrap();

    let zone = server.client().submit(&candidate(&square(), "low")).await.unwrap();
    assert_eq!(next_event(&mut staying).await, ServerEvent::NewZone(zone));

    server.stop().await;
}

#[tokio::test]
async fn test_repeated_snapshots_are_identical() {
    let server = TestServer::start().await;
    let client = server.client();
    client.submit(&candidate(&square(), "high")).await.unwrap();
    client.submit(&candidate(&triangle(), "low")).await.unwrap();

    let first = client.fetch_snapshot().await.unwrap();
    let second = client.fetch_snapshot().await.unwrap();
    assert_eq!(first, second);

    server.stop().await;
}

#[tokio::test]
async fn test_viewer_resync_and_transport_failure() {
    let server = TestServer::start().await;
    server.client().submit(&candidate(&square(), "medium")).await.unwrap();

    let mut viewer = ZoneViewer::new(server.client());
    viewer.resync().await.unwrap();
    assert_eq!(viewer.view().zones().len(), 1);
    assert!(viewer.view().is_synced());

    // Nothing listens on the old address once the server is gone
    let url = server.url.clone();
    server.stop().await;

    let mut stale = ZoneViewer::new(ZoneClient::new(&url).unwrap());
    stale.view_mut().replace(viewer.view().zones().to_vec());
    let err = stale.resync().await.unwrap_err();
    assert!(err.is_transport(), "got {:?}", err);
    assert_eq!(stale.view().zones().len(), 1);
}

#[tokio::test]
async fn test_watch_applies_snapshot_then_live_zone() {
    let server = TestServer::start().await;
    let (seen_tx, mut seen_rx) = tokio::sync::mpsc::unbounded_channel();

    let mut viewer = ZoneViewer::new(server.client());
    let watcher = tokio::spawn(async move {
        let result = viewer
            .watch(|view, event| {
                let _ = seen_tx.send((event.name(), view.zones().len()));
            })
            .await;
        (viewer, result)
    });

    let first = tokio::time::timeout(DEFAULT_TEST_TIMEOUT, seen_rx.recv()).await.unwrap();
    assert_eq!(first, Some(("update_zones", 0)));

    let zone = server.client().submit(&candidate(&square(), "low")).await.unwrap();
    let second = tokio::time::timeout(DEFAULT_TEST_TIMEOUT, seen_rx.recv()).await.unwrap();
    assert_eq!(second, Some(("new_zone", 1)));

    server.stop().await;
    let (viewer, _) = tokio::time::timeout(DEFAULT_TEST_TIMEOUT, watcher)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(viewer.view().zones(), &[zone]);
}

#[tokio::test]
async fn test_connection_limit_refuses_upgrade() {
    let mut config = Config::default();
    config.server.max_connections = 1;
    let server = TestServer::start_with(config).await;

    let (_first, _) = server.viewer().await;
    assert!(server.client().subscribe().await.is_err());

    server.stop().await;
}
