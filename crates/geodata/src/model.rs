//! Canonical schema for Brazilian administrative geography.
//!
//! Whatever source a snapshot came from, it ends up in these two tables.
//! Field names follow the canonical column names shared with the warehouse
//! (`codigo_uf`, `uf`, `estado`, `regiao`, `codigo_ibge`, `municipio`).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display order of the five macro-regions. Charts and reports follow this
/// order regardless of counts.
pub const REGIOES: [&str; 5] = ["Norte", "Nordeste", "Centro-Oeste", "Sudeste", "Sul"];

/// One federative unit (state or federal district).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct State {
    pub codigo_uf: i32,
    pub uf: String,
    pub estado: String,
    pub regiao: String,
}

/// One municipality, with the denormalized geography of its state.
///
/// `uf`/`estado`/`regiao` are always filled on the API and warehouse paths.
/// On the CSV path they come from a left join on `codigo_uf` and stay `None`
/// when the state table has no matching row; such rows are kept, not dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Municipality {
    pub codigo_ibge: i32,
    pub municipio: String,
    pub codigo_uf: i32,
    pub uf: Option<String>,
    pub estado: Option<String>,
    pub regiao: Option<String>,
}

/// Which source actually served a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fonte {
    ApiIbge,
    CsvGithub,
    Warehouse,
}

impl Fonte {
    pub fn label(&self) -> &'static str {
        match self {
            Fonte::ApiIbge => "API IBGE",
            Fonte::CsvGithub => "CSV GitHub (fallback)",
            Fonte::Warehouse => "Data Warehouse",
        }
    }
}

impl fmt::Display for Fonte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One full load: the two canonical tables plus provenance. Immutable once
/// built; a new load produces a new snapshot.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub estados: Vec<State>,
    pub municipios: Vec<Municipality>,
    pub fonte: Fonte,
    pub carregado_em: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(estados: Vec<State>, municipios: Vec<Municipality>, fonte: Fonte) -> Self {
        Self {
            estados,
            municipios,
            fonte,
            carregado_em: Utc::now(),
        }
    }
}

/// Municipality count for one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionCount {
    pub regiao: String,
    pub municipios: i64,
}

/// Municipality count for one state, with its 1-based position in the
/// descending ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateCount {
    pub uf: String,
    pub municipios: i64,
    pub rank: usize,
}

/// Everything the presentation layer consumes: totals, the three derived
/// aggregates and the source label.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub fonte: String,
    pub carregado_em: DateTime<Utc>,
    pub total_municipios: usize,
    pub total_estados: usize,
    pub regiao_destaque: Option<String>,
    pub municipios_por_regiao: Vec<RegionCount>,
    pub top_estados: Vec<StateCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fonte_labels() {
        assert_eq!(Fonte::ApiIbge.label(), "API IBGE");
        assert_eq!(Fonte::CsvGithub.label(), "CSV GitHub (fallback)");
        assert_eq!(Fonte::Warehouse.label(), "Data Warehouse");
        assert_eq!(Fonte::ApiIbge.to_string(), "API IBGE");
    }
}
