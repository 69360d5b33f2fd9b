//! Primary source: the IBGE localities REST API.
//!
//! States arrive flat; municipalities bury their state four levels deep
//! (`microrregiao.mesorregiao.UF.regiao`). The chain is modelled with
//! `Option` at every level and one extraction point that names the dotted
//! path in its error, so a single malformed record fails the whole attempt
//! and lets the caller fall back.

use std::time::Duration;

use serde::Deserialize;

use super::{fetch_text, http_client, SourceConfig};
use crate::error::SourceError;
use crate::model::{Fonte, Municipality, Snapshot, State};

pub const DEFAULT_BASE_URL: &str = "https://servicodados.ibge.gov.br/api/v1/localidades";

const ESTADOS_TIMEOUT: Duration = Duration::from_secs(10);
const MUNICIPIOS_TIMEOUT: Duration = Duration::from_secs(30);

// Wire shapes, field names as the API spells them.

#[derive(Debug, Deserialize)]
struct ApiRegiao {
    nome: String,
}

#[derive(Debug, Deserialize)]
struct ApiEstado {
    id: i32,
    sigla: String,
    nome: String,
    regiao: ApiRegiao,
}

#[derive(Debug, Deserialize)]
struct ApiMunicipio {
    id: i32,
    nome: String,
    microrregiao: Option<ApiMicrorregiao>,
}

#[derive(Debug, Deserialize)]
struct ApiMicrorregiao {
    mesorregiao: Option<ApiMesorregiao>,
}

#[derive(Debug, Deserialize)]
struct ApiMesorregiao {
    #[serde(rename = "UF")]
    uf: Option<ApiEstado>,
}

pub async fn load(cfg: &SourceConfig) -> Result<Snapshot, SourceError> {
    let client = http_client()?;

    let url_estados = format!("{}/estados", cfg.base_url);
    let body = fetch_text(&client, &url_estados, ESTADOS_TIMEOUT).await?;
    let estados = parse_estados(&body, &url_estados)?;

    let url_municipios = format!("{}/municipios", cfg.base_url);
    let body = fetch_text(&client, &url_municipios, MUNICIPIOS_TIMEOUT).await?;
    let municipios = parse_municipios(&body, &url_municipios)?;

    log::info!(
        "IBGE API served {} estados and {} municipios",
        estados.len(),
        municipios.len()
    );
    Ok(Snapshot::new(estados, municipios, Fonte::ApiIbge))
}

fn parse_estados(body: &str, url: &str) -> Result<Vec<State>, SourceError> {
    let raw: Vec<ApiEstado> = decode(body, url)?;
    Ok(raw.into_iter().map(normalize_estado).collect())
}

fn parse_municipios(body: &str, url: &str) -> Result<Vec<Municipality>, SourceError> {
    let raw: Vec<ApiMunicipio> = decode(body, url)?;
    raw.into_iter().map(normalize_municipio).collect()
}

fn decode<T: serde::de::DeserializeOwned>(body: &str, url: &str) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|e| SourceError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

fn normalize_estado(raw: ApiEstado) -> State {
    State {
        codigo_uf: raw.id,
        uf: raw.sigla,
        estado: raw.nome,
        regiao: raw.regiao.nome,
    }
}

fn normalize_municipio(raw: ApiMunicipio) -> Result<Municipality, SourceError> {
    let ApiMunicipio {
        id,
        nome,
        microrregiao,
    } = raw;

    let uf = microrregiao
        .and_then(|mi| mi.mesorregiao)
        .and_then(|me| me.uf)
        .ok_or(SourceError::Schema {
            codigo_ibge: id,
            path: "microrregiao.mesorregiao.UF",
        })?;

    Ok(Municipality {
        codigo_ibge: id,
        municipio: nome,
        codigo_uf: uf.id,
        uf: Some(uf.sigla),
        estado: Some(uf.nome),
        regiao: Some(uf.regiao.nome),
    })
}
