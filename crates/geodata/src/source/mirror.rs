//! Fallback source: the kelvins/municipios-brasileiros CSV mirror on GitHub.
//!
//! Two flat files joined on `codigo_uf`. The mirror's `nome` column becomes
//! `estado` or `municipio` depending on the file; surplus columns (latitude,
//! longitude, capital, ...) are ignored by serde. The join is a left join:
//! municipalities whose state code is missing from the states file keep null
//! geography fields.

use std::time::Duration;

use serde::Deserialize;

use super::{fetch_text, http_client, SourceConfig};
use crate::error::SourceError;
use crate::model::{Fonte, Municipality, Snapshot, State};
use crate::normalize::attach_states;

pub const DEFAULT_ESTADOS_URL: &str =
    "https://raw.githubusercontent.com/kelvins/municipios-brasileiros/main/csv/estados.csv";
pub const DEFAULT_MUNICIPIOS_URL: &str =
    "https://raw.githubusercontent.com/kelvins/municipios-brasileiros/main/csv/municipios.csv";

const CSV_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct CsvEstado {
    codigo_uf: i32,
    uf: String,
    nome: String,
    regiao: String,
}

#[derive(Debug, Deserialize)]
struct CsvMunicipio {
    codigo_ibge: i32,
    nome: String,
    codigo_uf: i32,
}

pub async fn load(cfg: &SourceConfig) -> Result<Snapshot, SourceError> {
    let client = http_client()?;

    let body = fetch_text(&client, &cfg.estados_csv_url, CSV_TIMEOUT).await?;
    let estados = parse_estados(&body, &cfg.estados_csv_url)?;

    let body = fetch_text(&client, &cfg.municipios_csv_url, CSV_TIMEOUT).await?;
    let municipios = parse_municipios(&body, &cfg.municipios_csv_url)?;
    let municipios = attach_states(municipios, &estados);

    log::info!(
        "CSV mirror served {} estados and {} municipios",
        estados.len(),
        municipios.len()
    );
    Ok(Snapshot::new(estados, municipios, Fonte::CsvGithub))
}

fn parse_estados(body: &str, url: &str) -> Result<Vec<State>, SourceError> {
    let mut reader = reader(body);
    let mut estados = Vec::new();
    for result in reader.deserialize() {
        let row: CsvEstado = result.map_err(|e| decode_error(url, e))?;
        estados.push(State {
            codigo_uf: row.codigo_uf,
            uf: row.uf,
            estado: row.nome,
            regiao: row.regiao,
        });
    }
    Ok(estados)
}

fn parse_municipios(body: &str, url: &str) -> Result<Vec<Municipality>, SourceError> {
    let mut reader = reader(body);
    let mut municipios = Vec::new();
    for result in reader.deserialize() {
        let row: CsvMunicipio = result.map_err(|e| decode_error(url, e))?;
        municipios.push(Municipality {
            codigo_ibge: row.codigo_ibge,
            municipio: row.nome,
            codigo_uf: row.codigo_uf,
            uf: None,
            estado: None,
            regiao: None,
        });
    }
    Ok(municipios)
}

fn reader(body: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes())
}

fn decode_error(url: &str, e: csv::Error) -> SourceError {
    SourceError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    }
}
