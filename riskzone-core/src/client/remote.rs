//! Remote access to a RiskZone server
//!
//! `ZoneClient` speaks the pull channel (HTTP) and opens `ZoneFeed`s on the
//! push channel (WebSocket). Transport problems surface as
//! `ClientError::Transport` and never affect server state.

use futures::{SinkExt, StreamExt};
use reqwest::{StatusCode, Url};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use super::errors::{ClientError, ClientResult};
use crate::server::types::{ErrorResponse, ResetResponse};
use crate::sync::{ClientRequest, ServerEvent};
use crate::zones::{Zone, ZoneCandidate};

/// HTTP client for the zone endpoints
#[derive(Debug, Clone)]
pub struct ZoneClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ZoneClient {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:5000`
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }

    /// GET /zones
    pub async fn fetch_snapshot(&self) -> ClientResult<Vec<Zone>> {
        let response = self.http.get(self.endpoint("zones")?).send().await?;
        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }
        Ok(response.json().await?)
    }

    /// POST /zones
    pub async fn submit(&self, candidate: &ZoneCandidate) -> ClientResult<Zone> {
        let response = self
            .http
            .post(self.endpoint("zones")?)
            .json(candidate)
            .send()
            .await?;

        if response.status() != StatusCode::CREATED {
            return Err(Self::failure(response).await);
        }
        Ok(response.json().await?)
    }

    /// DELETE /zones
    pub async fn reset(&self) -> ClientResult<usize> {
        let response = self.http.delete(self.endpoint("zones")?).send().await?;
        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }
        let body: ResetResponse = response.json().await?;
        Ok(body.cleared)
    }

    /// Open the push channel. The server sends nothing until a snapshot is
    /// requested on the returned feed.
    pub async fn subscribe(&self) -> ClientResult<ZoneFeed> {
        let mut url = self.endpoint("ws")?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|_| ClientError::InvalidUrl(format!("cannot use {} for {}", scheme, url)))?;

        let (stream, _) = connect_async(url.as_str()).await?;
        debug!(%url, "Push channel open");
        Ok(ZoneFeed { stream })
    }

    async fn failure(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return ClientError::from(e),
        };

        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(error) if status.is_client_error() => ClientError::Rejected {
                status: status.as_u16(),
                reason: error.reason,
                message: error.error,
            },
            _ => ClientError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            },
        }
    }
}

/// Live push-channel connection
pub struct ZoneFeed {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl ZoneFeed {
    /// Next hub event; `None` once the server closed the connection
    pub async fn next_event(&mut self) -> Option<ClientResult<ServerEvent>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => {
                    return Some(ServerEvent::from_json(&text).map_err(ClientError::from))
                }
                Ok(Message::Close(_)) => return None,
                Ok(_) => continue,
                Err(e) => return Some(Err(ClientError::from(e))),
            }
        }
    }

    pub async fn send(&mut self, request: &ClientRequest) -> ClientResult<()> {
        self.send_text(request.to_json()?).await
    }

    /// Send an already encoded frame as is
    pub async fn send_text(&mut self, text: String) -> ClientResult<()> {
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    /// Ask for an `update_zones` on this connection
    pub async fn request_snapshot(&mut self) -> ClientResult<()> {
        self.send(&ClientRequest::RequestSnapshot).await
    }

    pub async fn submit(&mut self, candidate: ZoneCandidate) -> ClientResult<()> {
        self.send(&ClientRequest::SubmitZone(candidate)).await
    }

    pub async fn reset(&mut self) -> ClientResult<()> {
        self.send(&ClientRequest::ResetZones).await
    }

    pub async fn close(mut self) -> ClientResult<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}
