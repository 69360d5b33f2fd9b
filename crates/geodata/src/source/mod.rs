//! Source acquisition: IBGE API with a CSV-mirror fallback, or a Postgres
//! warehouse.

pub mod api;
pub mod mirror;
pub mod warehouse;

use std::time::Duration;

use crate::error::SourceError;
use crate::model::Snapshot;

const USER_AGENT: &str = concat!(
    "Localidades/",
    env!("CARGO_PKG_VERSION"),
    " (painel de localidades IBGE)"
);

/// Where a deployment reads its data from.
#[derive(Debug, Clone)]
pub enum SourceMode {
    /// IBGE API first, GitHub CSV mirror on any primary failure.
    Remote,
    /// Canonical tables in Postgres. No fallback: failures are fatal.
    Warehouse { db_url: String },
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub base_url: String,
    pub estados_csv_url: String,
    pub municipios_csv_url: String,
    pub mode: SourceMode,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: api::DEFAULT_BASE_URL.to_string(),
            estados_csv_url: mirror::DEFAULT_ESTADOS_URL.to_string(),
            municipios_csv_url: mirror::DEFAULT_MUNICIPIOS_URL.to_string(),
            mode: SourceMode::Remote,
        }
    }
}

/// Load one snapshot from whichever source the config selects.
///
/// In remote mode the primary error is logged with its kind and the CSV
/// mirror is tried next, whatever the failure was; a fallback failure
/// propagates to the caller. Warehouse mode has no fallback.
pub async fn load_geography(cfg: &SourceConfig) -> Result<Snapshot, SourceError> {
    match &cfg.mode {
        SourceMode::Warehouse { db_url } => warehouse::load(db_url).await,
        SourceMode::Remote => match api::load(cfg).await {
            Ok(snapshot) => Ok(snapshot),
            Err(err) => {
                log::warn!("primary source failed, trying the CSV mirror: {err}");
                mirror::load(cfg).await
            }
        },
    }
}

pub(crate) fn http_client() -> Result<reqwest::Client, SourceError> {
    Ok(reqwest::Client::builder().user_agent(USER_AGENT).build()?)
}

pub(crate) async fn fetch_text(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<String, SourceError> {
    let body = client
        .get(url)
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(body)
}
