//! Viewer: a `ClientViewModel` kept in sync with a remote server

use tracing::{debug, info, warn};

use super::errors::ClientResult;
use super::remote::ZoneClient;
use super::view_model::ClientViewModel;
use crate::sync::ServerEvent;

pub struct ZoneViewer {
    client: ZoneClient,
    view: ClientViewModel,
}

impl ZoneViewer {
    pub fn new(client: ZoneClient) -> Self {
        Self {
            client,
            view: ClientViewModel::new(),
        }
    }

    pub fn view(&self) -> &ClientViewModel {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ClientViewModel {
        &mut self.view
    }

    /// Pull a fresh snapshot. On failure the previous view stays as it was and
    /// the caller may simply try again later.
    pub async fn resync(&mut self) -> ClientResult<()> {
        match self.client.fetch_snapshot().await {
            Ok(zones) => {
                debug!(zones = zones.len(), "Snapshot applied");
                self.view.replace(zones);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Snapshot fetch failed, keeping current view");
                Err(e)
            }
        }
    }

    /// Open the push channel, request a snapshot on it and apply events until
    /// the server closes the connection. `on_event` runs after each event has
    /// been applied.
    pub async fn watch<F>(&mut self, mut on_event: F) -> ClientResult<()>
    where
        F: FnMut(&ClientViewModel, &ServerEvent),
    {
        let mut feed = self.client.subscribe().await?;
        feed.request_snapshot().await?;
        info!(server = %self.client.base_url(), "Watching zones");

        while let Some(event) = feed.next_event().await {
            let event = event?;
            self.view.apply(event.clone());
            on_event(&self.view, &event);
        }

        info!("Server closed the push channel");
        Ok(())
    }
}
