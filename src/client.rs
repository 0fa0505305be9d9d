// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Blocking HTTP poller for the ECS REST endpoints.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::ecs::parser::{
    parse_component_registry, parse_entity_detail, parse_entity_list, parse_pipeline_stats,
    parse_world_stats,
};
use crate::ecs::types::{ComponentRegistry, EntityDetail, EntityList, SystemRegistry, WorldSnapshot};

/// Default REST base URL of the observed process
pub const DEFAULT_URL: &str = "http://localhost:27750";

/// Default request timeout in milliseconds (localhost round trips are sub-ms)
pub const DEFAULT_TIMEOUT_MS: u64 = 200;

/// Query listing every entity outside the engine's own module
pub const DEFAULT_QUERY: &str = "!ChildOf(self|up, flecs)";

/// Reachability of the REST endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
    /// Was connected once, currently failing
    Reconnecting,
}

impl ConnectionState {
    /// Next state after a request that returned `status` (None = network error)
    pub fn update(self, status: Option<StatusCode>) -> Self {
        match status {
            Some(StatusCode::OK) => ConnectionState::Connected,
            _ => match self {
                ConnectionState::Connected | ConnectionState::Reconnecting => {
                    ConnectionState::Reconnecting
                }
                ConnectionState::Disconnected => ConnectionState::Disconnected,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connected => "Connected",
            ConnectionState::Reconnecting => "Reconnecting...",
        }
    }
}

/// HTTP client bound to one base URL
pub struct EcsClient {
    http: Client,
    base_url: String,
    query: String,
    /// Connection state, updated by every request
    pub state: ConnectionState,
}

impl EcsClient {
    pub fn new(base_url: &str, query: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            query: query.to_string(),
            state: ConnectionState::Disconnected,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` and return the body of a 200 response
    fn get(&mut self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        let response = match self.http.get(&url).query(query).send() {
            Ok(response) => response,
            Err(e) => {
                self.state = self.state.update(None);
                warn!("GET {} failed: {}", url, e);
                return Err(e).with_context(|| format!("Failed to reach {}", url));
            }
        };

        let status = response.status();
        self.state = self.state.update(Some(status));
        if status != StatusCode::OK {
            warn!("GET {} returned {}", url, status);
            bail!("{} returned {}", url, status);
        }

        let body = response
            .text()
            .with_context(|| format!("Failed to read response from {}", url))?;
        debug!("GET {} ({} bytes)", url, body.len());
        Ok(body)
    }

    /// Poll `/stats/world`; also serves as the connection health check
    pub fn world_stats(&mut self) -> Result<WorldSnapshot> {
        let body = self.get("/stats/world", &[])?;
        parse_world_stats(&body)
    }

    /// Poll `/query` for the flat entity listing
    pub fn entities(&mut self) -> Result<EntityList> {
        let query = self.query.clone();
        let body = self.get(
            "/query",
            &[
                ("expr", query.as_str()),
                ("table", "true"),
                ("values", "false"),
                ("entity_id", "true"),
            ],
        )?;
        parse_entity_list(&body)
    }

    /// Poll `/components` for the component registry
    pub fn components(&mut self) -> Result<ComponentRegistry> {
        let body = self.get("/components", &[])?;
        parse_component_registry(&body)
    }

    /// Poll `/stats/pipeline` for per-system stats
    pub fn pipeline(&mut self) -> Result<SystemRegistry> {
        let body = self.get("/stats/pipeline", &[])?;
        parse_pipeline_stats(&body)
    }

    /// Fetch `/entity/<path>` with documentation
    pub fn entity_detail(&mut self, path: &str) -> Result<EntityDetail> {
        let body = self.get(&format!("/entity/{}", path), &[("doc", "true")])?;
        parse_entity_detail(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_transitions() {
        let ok = Some(StatusCode::OK);
        let not_found = Some(StatusCode::NOT_FOUND);

        let state = ConnectionState::default();
        assert_eq!(state, ConnectionState::Disconnected);
        assert_eq!(state.update(None), ConnectionState::Disconnected);
        assert_eq!(state.update(not_found), ConnectionState::Disconnected);

        let state = state.update(ok);
        assert_eq!(state, ConnectionState::Connected);

        let state = state.update(None);
        assert_eq!(state, ConnectionState::Reconnecting);
        assert_eq!(state.update(not_found), ConnectionState::Reconnecting);
        assert_eq!(state.update(ok), ConnectionState::Connected);
    }

    #[test]
    fn test_base_url_normalized() {
        let timeout = Duration::from_millis(50);
        let client = EcsClient::new("http://localhost:27750/", DEFAULT_QUERY, timeout).unwrap();
        assert_eq!(client.base_url(), "http://localhost:27750");
        assert_eq!(client.state, ConnectionState::Disconnected);
    }

    #[test]
    fn test_unreachable_host_is_an_error() {
        // Port 9 (discard) on localhost is closed on test machines
        let timeout = Duration::from_millis(50);
        let mut client = EcsClient::new("http://127.0.0.1:9", DEFAULT_QUERY, timeout).unwrap();
        assert!(client.world_stats().is_err());
        assert_eq!(client.state, ConnectionState::Disconnected);
    }
}
