//! # sunswitch-adapter-tasmota-http
//!
//! [`DeviceDriver`] for Tasmota devices, spoken to through the HTTP command
//! endpoint `/cm?cmnd=<command>`.
//!
//! Tasmota devices do not announce themselves over HTTP, so discovery probes
//! every configured host with `Status` and keeps the ones that answer. The
//! device name comes from `DeviceName`, or the first `FriendlyName`.
//!
//! ## Dependency rule
//!
//! Depends on `sunswitch-app` (port traits) and `sunswitch-domain` only.

mod command;
mod error;
mod response;

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use sunswitch_app::ports::{DeviceDriver, DeviceHandle, DeviceStatus, SetStateCommand};
use sunswitch_domain::error::SunswitchError;

pub use command::{TasmotaCommand, dim_to_percent, transition_to_speed};
pub use error::TasmotaError;
use response::{PowerResponse, StatusResponse};

/// Driver for a fixed list of Tasmota hosts.
#[derive(Debug, Clone)]
pub struct TasmotaDriver {
    client: Client,
    hosts: Vec<String>,
}

impl TasmotaDriver {
    /// Default timeout of a single command.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a driver for `hosts` (`192.168.1.20`, `http://porch.lan:8080`, …).
    ///
    /// # Errors
    ///
    /// Returns [`TasmotaError::Http`] if the HTTP client cannot be created.
    pub fn new(hosts: impl IntoIterator<Item = impl Into<String>>) -> Result<Self, TasmotaError> {
        let client = Client::builder().timeout(Self::DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            hosts: hosts.into_iter().map(|host| base_url(host.into())).collect(),
        })
    }

    #[must_use]
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    async fn send<T: DeserializeOwned>(
        &self,
        base_url: &str,
        command: TasmotaCommand,
        timeout: Option<Duration>,
    ) -> Result<T, TasmotaError> {
        let url = build_url(base_url, &command.to_string());
        tracing::debug!(url = %url, "sending Tasmota command");

        let mut request = self.client.get(&url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TasmotaError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        tracing::debug!(body = %body, "received Tasmota response");
        serde_json::from_str(&body).map_err(|_| TasmotaError::UnexpectedResponse(body))
    }

    async fn probe(&self, base_url: &str, timeout: Duration) -> Result<DeviceHandle, TasmotaError> {
        let status: StatusResponse = self.send(base_url, TasmotaCommand::Status, Some(timeout)).await?;
        let name = status
            .name()
            .ok_or_else(|| TasmotaError::UnexpectedResponse("status without device name".into()))?;
        Ok(DeviceHandle::new(name, base_url))
    }

    async fn power(&self, base_url: &str, command: TasmotaCommand) -> Result<DeviceStatus, TasmotaError> {
        let response: PowerResponse = self.send(base_url, command, None).await?;
        Ok(DeviceStatus::new(response.state()?))
    }

    async fn apply(&self, base_url: &str, command: SetStateCommand) -> Result<(), TasmotaError> {
        if let Some(dim) = command.dim {
            let fade = TasmotaCommand::fade(dim, command.transition.unwrap_or_default());
            self.send::<serde_json::Value>(base_url, fade, None).await?;
        }
        if let Some(state) = command.state {
            let status = self.power(base_url, TasmotaCommand::Power(state)).await?;
            if status.state != state {
                return Err(TasmotaError::UnexpectedResponse(format!(
                    "device reports {} after Power {state}",
                    status.state
                )));
            }
        }
        Ok(())
    }
}

fn base_url(host: String) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

fn build_url(base_url: &str, command: &str) -> String {
    format!("{base_url}/cm?cmnd={}", urlencoding::encode(command))
}

impl DeviceDriver for TasmotaDriver {
    #[tracing::instrument(skip(self), fields(hosts = self.hosts.len()))]
    async fn discover(&mut self, timeout: Duration) -> Result<Vec<DeviceHandle>, SunswitchError> {
        let mut handles = Vec::with_capacity(self.hosts.len());
        for host in &self.hosts {
            match self.probe(host, timeout).await {
                Ok(handle) => {
                    tracing::info!(host = %host, device = %handle.name, "Tasmota device found");
                    handles.push(handle);
                }
                Err(err) => tracing::warn!(host = %host, error = ?err, "Tasmota host did not answer"),
            }
        }
        if handles.is_empty() && !self.hosts.is_empty() {
            return Err(SunswitchError::Discovery(Box::new(TasmotaError::NoHostAnswered(
                self.hosts.len(),
            ))));
        }
        Ok(handles)
    }

    async fn get_state(
        &self,
        device: &DeviceHandle,
        _force_refresh: bool,
    ) -> Result<DeviceStatus, SunswitchError> {
        self.power(&device.address, TasmotaCommand::PowerQuery)
            .await
            .map_err(|err| SunswitchError::driver(&device.name, err))
    }

    async fn set_state(
        &self,
        device: &DeviceHandle,
        command: SetStateCommand,
    ) -> Result<(), SunswitchError> {
        self.apply(&device.address, command)
            .await
            .map_err(|err| SunswitchError::driver(&device.name, err))
    }
}
