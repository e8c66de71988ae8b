//! Per-connection state machine
//!
//! `Connected -> Synced -> Disconnected`. A connection becomes `Synced` once a
//! snapshot has been queued for it; `Disconnected` is terminal and there is no
//! resume. A reconnecting client gets a fresh id.

use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::events::ServerEvent;

/// Hub-assigned connection identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Synced,
    Disconnected,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFailure {
    #[error("connection closed")]
    Closed,

    #[error("outbound buffer full")]
    Lagging,
}

/// Hub-side record of one client connection
#[derive(Debug)]
pub struct Connection {
    state: ConnectionState,
    outbound: mpsc::Sender<ServerEvent>,
}

impl Connection {
    pub fn new(outbound: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            state: ConnectionState::Connected,
            outbound,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// False once disconnected or once the receiving session is gone
    pub fn is_open(&self) -> bool {
        self.state != ConnectionState::Disconnected && !self.outbound.is_closed()
    }

    /// Queue an event without waiting. Any failure is terminal for the
    /// connection: a client that misses an event can no longer be kept
    /// consistent and must reconnect and re-snapshot.
    pub fn deliver(&mut self, event: ServerEvent) -> Result<(), DeliveryFailure> {
        if !self.is_open() {
            return Err(DeliveryFailure::Closed);
        }

        match self.outbound.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.state = ConnectionState::Disconnected;
                Err(DeliveryFailure::Lagging)
            }
            Err(TrySendError::Closed(_)) => {
                self.state = ConnectionState::Disconnected;
                Err(DeliveryFailure::Closed)
            }
        }
    }

    /// Deliver a full snapshot and advance to `Synced`
    pub fn deliver_snapshot(&mut self, event: ServerEvent) -> Result<(), DeliveryFailure> {
        self.deliver(event)?;
        if self.state == ConnectionState::Connected {
            self.state = ConnectionState::Synced;
        }
        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.state = ConnectionState::Disconnected;
    }
}
