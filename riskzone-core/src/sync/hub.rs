/*
   SyncHub

   Single writer for the zone store. Every mutation and every read goes through
   one bounded command queue and is processed in arrival order by one task, so
   the store needs no locks and broadcast order equals commit order.

   Callers hold a cheap, cloneable `SyncHubHandle`:

        submit(candidate)        -> Result<Zone>
        reset()                  -> Result<cleared>
        snapshot()               -> Result<Vec<Zone>>
        connect()                -> Result<Subscription>
        request_resync(conn)     -> Result<()>

    ┌──────────────┐   HubCommand    ┌──────────────────────────────────┐
    │ HTTP handler ├────────────────►│             SyncHub              │
    │ WS session   │   (mpsc, FIFO)  │  validator → store → evaluator   │
    └──────▲───────┘                 └────────────────┬─────────────────┘
           │                                          │ try_send per connection
           │        ServerEvent (mpsc per connection) │
           └──────────────────────────────────────────┘

   Delivery never blocks the hub. A connection whose buffer is full or whose
   receiver is gone is dropped; its client must reconnect and re-snapshot.
*/

use std::collections::BTreeMap;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::connection::{Connection, ConnectionId, ConnectionState};
use super::errors::{SyncError, SyncResult};
use super::events::{RejectionNotice, ServerEvent};
use crate::config::Config;
use crate::metrics::{
    record_counter, record_gauge, ALERTS_HIGH_RISK, HUB_CONNECTIONS, HUB_DELIVERY_FAILURES,
    ZONES_ADMITTED, ZONES_REJECTED, ZONES_RESETS, ZONES_STORED,
};
use crate::zones::{AlertEvaluator, RejectionReason, Zone, ZoneCandidate, ZoneStore, ZoneValidator};

/// Operations queued to the hub
#[derive(Debug)]
enum HubCommand {
    Connect {
        respond_to: oneshot::Sender<SyncResult<Subscription>>,
    },
    Disconnect {
        connection: ConnectionId,
    },
    SubmitZone {
        candidate: ZoneCandidate,
        origin: Option<ConnectionId>,
        respond_to: oneshot::Sender<Result<Zone, RejectionReason>>,
    },
    Reset {
        respond_to: oneshot::Sender<usize>,
    },
    Snapshot {
        respond_to: oneshot::Sender<Vec<Zone>>,
    },
    Resync {
        connection: ConnectionId,
    },
    Stats {
        respond_to: oneshot::Sender<HubStats>,
    },
    Shutdown,
}

/// Point-in-time hub counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubStats {
    pub zones: usize,
    pub connections: usize,
    pub synced_connections: usize,
}

/// A registered push-channel connection and its ordered event stream
#[derive(Debug)]
pub struct Subscription {
    pub id: ConnectionId,
    pub events: mpsc::Receiver<ServerEvent>,
}

impl Subscription {
    /// Next event for this connection; `None` once the hub dropped it
    pub async fn recv(&mut self) -> Option<ServerEvent> {
        self.events.recv().await
    }
}

/// Handle to interact with the sync hub
#[derive(Clone, Debug)]
pub struct SyncHubHandle {
    command_tx: mpsc::Sender<HubCommand>,
}

impl SyncHubHandle {
    /// Register a new connection in the `Connected` state. Nothing is pushed
    /// until the client asks for a snapshot.
    pub async fn connect(&self) -> SyncResult<Subscription> {
        let (respond_to, response) = oneshot::channel();
        self.command_tx.send(HubCommand::Connect { respond_to }).await?;
        response.await?
    }

    pub async fn disconnect(&self, connection: ConnectionId) {
        // Hub already gone means the connection is gone too
        let _ = self.command_tx.send(HubCommand::Disconnect { connection }).await;
    }

    /// Submit a candidate zone from the pull channel
    pub async fn submit(&self, candidate: ZoneCandidate) -> SyncResult<Zone> {
        self.submit_inner(candidate, None).await
    }

    /// Submit a candidate zone on behalf of a push-channel connection. A
    /// rejection is additionally reported on that connection alone.
    pub async fn submit_from(
        &self,
        connection: ConnectionId,
        candidate: ZoneCandidate,
    ) -> SyncResult<Zone> {
        self.submit_inner(candidate, Some(connection)).await
    }

    async fn submit_inner(
        &self,
        candidate: ZoneCandidate,
        origin: Option<ConnectionId>,
    ) -> SyncResult<Zone> {
        let (respond_to, response) = oneshot::channel();
        self.command_tx
            .send(HubCommand::SubmitZone {
                candidate,
                origin,
                respond_to,
            })
            .await?;
        Ok(response.await??)
    }

    /// Clear every zone and notify all connections. Returns the number cleared.
    pub async fn reset(&self) -> SyncResult<usize> {
        let (respond_to, response) = oneshot::channel();
        self.command_tx.send(HubCommand::Reset { respond_to }).await?;
        Ok(response.await?)
    }

    /// Current zones, in insertion order, for the caller only
    pub async fn snapshot(&self) -> SyncResult<Vec<Zone>> {
        let (respond_to, response) = oneshot::channel();
        self.command_tx.send(HubCommand::Snapshot { respond_to }).await?;
        Ok(response.await?)
    }

    /// Push the current zones as `update_zones` to one connection's stream
    pub async fn request_resync(&self, connection: ConnectionId) -> SyncResult<()> {
        self.command_tx.send(HubCommand::Resync { connection }).await?;
        Ok(())
    }

    pub async fn stats(&self) -> SyncResult<HubStats> {
        let (respond_to, response) = oneshot::channel();
        self.command_tx.send(HubCommand::Stats { respond_to }).await?;
        Ok(response.await?)
    }

    /// Stop the hub. Every connection stream ends.
    pub async fn shutdown(&self) {
        let _ = self.command_tx.send(HubCommand::Shutdown).await;
    }

    pub fn is_running(&self) -> bool {
        !self.command_tx.is_closed()
    }
}

/// The hub actor. Owns the store, the admission rules and the connection table.
pub struct SyncHub {
    command_rx: mpsc::Receiver<HubCommand>,
    store: ZoneStore,
    validator: ZoneValidator,
    evaluator: AlertEvaluator,
    connections: BTreeMap<ConnectionId, Connection>,
    next_connection_id: u64,
    connection_buffer: usize,
    max_connections: usize,
}

impl SyncHub {
    /// Build a hub and its handle without starting it
    pub fn new(config: &Config) -> (Self, SyncHubHandle) {
        // tokio channels panic on a zero capacity
        let (command_tx, command_rx) = mpsc::channel(config.hub.command_queue_capacity.max(1));

        let hub = SyncHub {
            command_rx,
            store: ZoneStore::new(),
            validator: ZoneValidator::new(config.hub.max_polygon_points),
            evaluator: AlertEvaluator::new(config.hub.alert_message.clone()),
            connections: BTreeMap::new(),
            next_connection_id: 1,
            connection_buffer: config.hub.connection_buffer.max(1),
            max_connections: config.server.max_connections,
        };

        (hub, SyncHubHandle { command_tx })
    }

    /// Create a hub and spawn its event loop
    pub fn spawn(config: &Config) -> (SyncHubHandle, JoinHandle<()>) {
        let (hub, handle) = Self::new(config);
        let task = tokio::spawn(hub.run());
        (handle, task)
    }

    /// Process commands until shutdown or until every handle is dropped
    pub async fn run(mut self) {
        info!("Sync hub started");

        while let Some(command) = self.command_rx.recv().await {
            if !self.handle_command(command) {
                break;
            }
        }

        for connection in self.connections.values_mut() {
            connection.disconnect();
        }
        self.connections.clear();
        record_gauge(HUB_CONNECTIONS, 0.0);

        info!(zones = self.store.len(), "Sync hub stopped");
    }

    /// Returns false when the hub should stop
    fn handle_command(&mut self, command: HubCommand) -> bool {
        match command {
            HubCommand::Connect { respond_to } => {
                let _ = respond_to.send(self.register());
            }
            HubCommand::Disconnect { connection } => {
                if let Some(mut conn) = self.connections.remove(&connection) {
                    conn.disconnect();
                    debug!(%connection, "Connection closed");
                    record_gauge(HUB_CONNECTIONS, self.connections.len() as f64);
                }
            }
            HubCommand::SubmitZone {
                candidate,
                origin,
                respond_to,
            } => {
                let _ = respond_to.send(self.submit(candidate, origin));
            }
            HubCommand::Reset { respond_to } => {
                let _ = respond_to.send(self.reset());
            }
            HubCommand::Snapshot { respond_to } => {
                let _ = respond_to.send(self.store.all().to_vec());
            }
            HubCommand::Resync { connection } => self.resync(connection),
            HubCommand::Stats { respond_to } => {
                let _ = respond_to.send(self.stats());
            }
            HubCommand::Shutdown => {
                info!("Sync hub shutdown requested");
                return false;
            }
        }
        true
    }

    fn register(&mut self) -> SyncResult<Subscription> {
        // Sessions that never completed their upgrade leave a dead receiver behind
        let before = self.connections.len();
        self.connections.retain(|_, connection| connection.is_open());
        if self.connections.len() != before {
            debug!(pruned = before - self.connections.len(), "Pruned closed connections");
            record_gauge(HUB_CONNECTIONS, self.connections.len() as f64);
        }

        if self.connections.len() >= self.max_connections {
            warn!(limit = self.max_connections, "Refusing connection at capacity");
            return Err(SyncError::TooManyConnections(self.max_connections));
        }

        let id = ConnectionId(self.next_connection_id);
        self.next_connection_id += 1;

        let (outbound, events) = mpsc::channel(self.connection_buffer);
        self.connections.insert(id, Connection::new(outbound));
        record_gauge(HUB_CONNECTIONS, self.connections.len() as f64);
        debug!(connection = %id, "Connection registered");

        Ok(Subscription { id, events })
    }

    fn submit(
        &mut self,
        candidate: ZoneCandidate,
        origin: Option<ConnectionId>,
    ) -> Result<Zone, RejectionReason> {
        let accepted = match self.validator.validate(&candidate) {
            Ok(accepted) => accepted,
            Err(reason) => {
                warn!(reason = reason.code(), origin = ?origin, "Zone rejected: {}", reason);
                metrics::counter!(ZONES_REJECTED, "reason" => reason.code()).increment(1);

                if let Some(origin) = origin {
                    self.send_to(origin, ServerEvent::ZoneRejected(RejectionNotice::from(&reason)));
                }
                return Err(reason);
            }
        };

        let zone = self.store.append(accepted);
        info!(zone_id = %zone.id, risk = %zone.risk, points = zone.coordinates.len(), "Zone admitted");
        record_counter(ZONES_ADMITTED, 1);
        record_gauge(ZONES_STORED, self.store.len() as f64);

        self.broadcast(ServerEvent::NewZone(zone.clone()));

        if let Some(alert) = self.evaluator.evaluate(&zone) {
            info!(zone_id = %zone.id, "Broadcasting high-risk alert");
            record_counter(ALERTS_HIGH_RISK, 1);
            self.broadcast(ServerEvent::HighRiskAlert(alert));
        }

        Ok(zone)
    }

    fn reset(&mut self) -> usize {
        let cleared = self.store.clear();
        info!(cleared, "Zone store reset");
        record_counter(ZONES_RESETS, 1);
        record_gauge(ZONES_STORED, 0.0);

        self.broadcast(ServerEvent::ResetZones);
        cleared
    }

    fn resync(&mut self, id: ConnectionId) {
        let snapshot = ServerEvent::UpdateZones(self.store.all().to_vec());

        let Some(connection) = self.connections.get_mut(&id) else {
            debug!(connection = %id, "Resync for unknown connection ignored");
            return;
        };

        if let Err(failure) = connection.deliver_snapshot(snapshot) {
            warn!(connection = %id, %failure, "Dropping connection");
            record_counter(HUB_DELIVERY_FAILURES, 1);
            self.connections.remove(&id);
            record_gauge(HUB_CONNECTIONS, self.connections.len() as f64);
        } else {
            debug!(connection = %id, zones = self.store.len(), "Snapshot queued");
        }
    }

    /// Queue an event for every live connection. Failures only affect the
    /// failing connection.
    fn broadcast(&mut self, event: ServerEvent) {
        let mut dropped = Vec::new();

        for (id, connection) in self.connections.iter_mut() {
            if let Err(failure) = connection.deliver(event.clone()) {
                warn!(connection = %id, event = event.name(), %failure, "Dropping connection");
                dropped.push(*id);
            }
        }

        if !dropped.is_empty() {
            record_counter(HUB_DELIVERY_FAILURES, dropped.len() as u64);
            for id in dropped {
                self.connections.remove(&id);
            }
            record_gauge(HUB_CONNECTIONS, self.connections.len() as f64);
        }

        debug!(event = event.name(), recipients = self.connections.len(), "Broadcast");
    }

    fn send_to(&mut self, id: ConnectionId, event: ServerEvent) {
        if let Some(connection) = self.connections.get_mut(&id) {
            if let Err(failure) = connection.deliver(event) {
                warn!(connection = %id, %failure, "Dropping connection");
                record_counter(HUB_DELIVERY_FAILURES, 1);
                self.connections.remove(&id);
                record_gauge(HUB_CONNECTIONS, self.connections.len() as f64);
            }
        }
    }

    fn stats(&self) -> HubStats {
        HubStats {
            zones: self.store.len(),
            connections: self.connections.len(),
            synced_connections: self
                .connections
                .values()
                .filter(|c| c.state() == ConnectionState::Synced)
                .count(),
        }
    }
}
