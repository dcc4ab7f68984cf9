use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tokio::runtime::{Handle, RuntimeFlavor};

use crate::{error::LocationError, model::Coordinates};

use super::{Geolocator, USER_AGENT, truncate_body};

/// Asks the user whether their location may be used.
pub trait LocationConsent: Send + Sync + Debug {
    fn granted(&self) -> bool;
}

/// Consent given up front, e.g. via a `--yes` flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysGrant;

impl LocationConsent for AlwaysGrant {
    fn granted(&self) -> bool {
        true
    }
}

/// No location capability at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

#[async_trait]
impl Geolocator for Unsupported {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unsupported)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator {
    coordinates: Coordinates,
}

impl FixedGeolocator {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        Ok(self.coordinates)
    }
}

/// Approximate location from the caller's public IP address.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpLocationResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

impl IpGeolocator {
    pub fn new(url: String) -> anyhow::Result<Self> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { url, http })
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        tracing::debug!(url = %self.url, "requesting IP geolocation");

        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LocationError::Network(format!("IP geolocation request failed: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| LocationError::Network(format!("IP geolocation body unreadable: {e}")))?;

        if !status.is_success() {
            return Err(LocationError::Network(format!(
                "IP geolocation failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: IpLocationResponse = serde_json::from_str(&body)
            .map_err(|e| LocationError::Parse(format!("IP geolocation JSON invalid: {e}")))?;

        match (parsed.status.as_str(), parsed.lat, parsed.lon) {
            ("success", Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(LocationError::Network(format!(
                "IP geolocation unavailable: {}",
                parsed.message.unwrap_or(parsed.status)
            ))),
        }
    }
}

/// Wraps a geolocator so that it is only consulted after consent.
#[derive(Debug)]
pub struct ConsentGate<G, C> {
    inner: G,
    consent: C,
}

impl<G, C> ConsentGate<G, C> {
    pub fn new(inner: G, consent: C) -> Self {
        Self { inner, consent }
    }
}

#[async_trait]
impl<G, C> Geolocator for ConsentGate<G, C>
where
    G: Geolocator,
    C: LocationConsent,
{
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        if !ask(&self.consent) {
            tracing::info!("location access declined");
            return Err(LocationError::PermissionDenied);
        }
        self.inner.locate().await
    }
}

/// Consent implementations may block on user input. On a multi-thread
/// runtime the worker is handed off for the duration of the call.
fn ask<C: LocationConsent>(consent: &C) -> bool {
    match Handle::try_current().map(|h| h.runtime_flavor()) {
        Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(|| consent.granted()),
        _ => consent.granted(),
    }
}
