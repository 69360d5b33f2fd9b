//! Derived tables consumed by the dashboard.
//!
//! Pure functions over the canonical municipality table. Rows whose
//! geography never resolved (CSV left-join miss) stay in the snapshot but
//! cannot be attributed to a region or state, so the counts skip them.

use std::collections::{HashMap, HashSet};

use crate::model::{Municipality, RegionCount, Snapshot, StateCount, Summary, REGIOES};

/// How many states the ranking keeps.
pub const TOP_ESTADOS: usize = 10;

/// Municipality count per region, in the fixed display order. Region names
/// outside the known five (bad upstream data) come afterwards,
/// alphabetically.
pub fn count_by_region(municipios: &[Municipality]) -> Vec<RegionCount> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for m in municipios {
        if let Some(regiao) = &m.regiao {
            *counts.entry(regiao.as_str()).or_insert(0) += 1;
        }
    }

    let mut rows = Vec::new();
    for regiao in REGIOES {
        if let Some(n) = counts.remove(regiao) {
            rows.push(RegionCount {
                regiao: regiao.to_string(),
                municipios: n,
            });
        }
    }

    let mut rest: Vec<(&str, i64)> = counts.into_iter().collect();
    rest.sort_by(|a, b| a.0.cmp(b.0));
    rows.extend(rest.into_iter().map(|(regiao, n)| RegionCount {
        regiao: regiao.to_string(),
        municipios: n,
    }));

    rows
}

/// Region with the most municipalities. Ties go to the row earliest in the
/// input, which for [`count_by_region`] output means earliest in the display
/// order.
pub fn region_with_max(rows: &[RegionCount]) -> Option<&str> {
    let mut best: Option<&RegionCount> = None;
    for row in rows {
        if best.map_or(true, |b| row.municipios > b.municipios) {
            best = Some(row);
        }
    }
    best.map(|b| b.regiao.as_str())
}

/// Municipality count per state, sorted by count descending with ties broken
/// by `uf` ascending, truncated to the top ten, ranks assigned by position.
pub fn count_by_state(municipios: &[Municipality]) -> Vec<StateCount> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for m in municipios {
        if let Some(uf) = &m.uf {
            *counts.entry(uf.as_str()).or_insert(0) += 1;
        }
    }

    let mut rows: Vec<(&str, i64)> = counts.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    rows.truncate(TOP_ESTADOS);

    rows.into_iter()
        .enumerate()
        .map(|(i, (uf, n))| StateCount {
            uf: uf.to_string(),
            municipios: n,
            rank: i + 1,
        })
        .collect()
}

/// Number of distinct states the municipality table references.
pub fn distinct_states(municipios: &[Municipality]) -> usize {
    municipios
        .iter()
        .filter_map(|m| m.uf.as_deref())
        .collect::<HashSet<_>>()
        .len()
}

/// Assemble the full output surface for one snapshot.
pub fn summarize(snapshot: &Snapshot) -> Summary {
    let municipios_por_regiao = count_by_region(&snapshot.municipios);
    let regiao_destaque = region_with_max(&municipios_por_regiao).map(str::to_string);

    Summary {
        fonte: snapshot.fonte.label().to_string(),
        carregado_em: snapshot.carregado_em,
        total_municipios: snapshot.municipios.len(),
        total_estados: distinct_states(&snapshot.municipios),
        regiao_destaque,
        municipios_por_regiao,
        top_estados: count_by_state(&snapshot.municipios),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Fonte, State};

    fn municipio(codigo_ibge: i32, codigo_uf: i32, uf: &str, regiao: &str) -> Municipality {
        Municipality {
            codigo_ibge,
            municipio: format!("Municipio {codigo_ibge}"),
            codigo_uf,
            uf: Some(uf.to_string()),
            estado: Some(format!("Estado {uf}")),
            regiao: Some(regiao.to_string()),
        }
    }

    fn repeat(n: i64, codigo_uf: i32, uf: &str, regiao: &str) -> Vec<Municipality> {
        (0..n)
            .map(|i| municipio(codigo_uf * 100_000 + i as i32, codigo_uf, uf, regiao))
            .collect()
    }

    // -------------------------------------------------------------------------
    // REGION AGGREGATION
    // -------------------------------------------------------------------------

    #[test]
    fn region_counts_sum_to_total() {
        let mut municipios = repeat(3, 11, "RO", "Norte");
        municipios.extend(repeat(5, 29, "BA", "Nordeste"));
        municipios.extend(repeat(2, 43, "RS", "Sul"));

        let rows = count_by_region(&municipios);
        let total: i64 = rows.iter().map(|r| r.municipios).sum();
        assert_eq!(total, municipios.len() as i64);
    }

    #[test]
    fn region_order_is_fixed_regardless_of_counts() {
        // Sul has the most rows but must still come last.
        let mut municipios = repeat(1, 11, "RO", "Norte");
        municipios.extend(repeat(9, 43, "RS", "Sul"));
        municipios.extend(repeat(2, 35, "SP", "Sudeste"));

        let rows = count_by_region(&municipios);
        let order: Vec<&str> = rows.iter().map(|r| r.regiao.as_str()).collect();
        assert_eq!(order, vec!["Norte", "Sudeste", "Sul"]);
    }

    #[test]
    fn unknown_region_names_come_last_alphabetically() {
        let mut municipios = repeat(1, 43, "RS", "Sul");
        municipios.extend(repeat(1, 98, "XX", "Zona Fantasma"));
        municipios.extend(repeat(1, 97, "YY", "Area Nova"));

        let rows = count_by_region(&municipios);
        let order: Vec<&str> = rows.iter().map(|r| r.regiao.as_str()).collect();
        assert_eq!(order, vec!["Sul", "Area Nova", "Zona Fantasma"]);
    }

    #[test]
    fn unresolved_rows_are_not_counted() {
        let mut municipios = repeat(2, 11, "RO", "Norte");
        municipios.push(Municipality {
            codigo_ibge: 9900001,
            municipio: "Fora do Mapa".to_string(),
            codigo_uf: 99,
            uf: None,
            estado: None,
            regiao: None,
        });

        let rows = count_by_region(&municipios);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].municipios, 2);
        assert_eq!(count_by_state(&municipios).len(), 1);
    }

    #[test]
    fn region_with_max_picks_largest() {
        let mut municipios = repeat(3, 11, "RO", "Norte");
        municipios.extend(repeat(7, 29, "BA", "Nordeste"));

        let rows = count_by_region(&municipios);
        assert_eq!(region_with_max(&rows), Some("Nordeste"));
    }

    #[test]
    fn region_with_max_tie_prefers_display_order() {
        let mut municipios = repeat(4, 43, "RS", "Sul");
        municipios.extend(repeat(4, 11, "RO", "Norte"));

        let rows = count_by_region(&municipios);
        assert_eq!(region_with_max(&rows), Some("Norte"));
    }

    #[test]
    fn region_with_max_empty_is_none() {
        assert_eq!(region_with_max(&[]), None);
    }

    // -------------------------------------------------------------------------
    // STATE RANKING
    // -------------------------------------------------------------------------

    #[test]
    fn state_ranking_hand_computed() {
        let mut municipios = repeat(5, 31, "MG", "Sudeste");
        municipios.extend(repeat(4, 35, "SP", "Sudeste"));
        municipios.extend(repeat(4, 29, "BA", "Nordeste"));
        municipios.extend(repeat(2, 43, "RS", "Sul"));

        let rows = count_by_state(&municipios);
        let expected = vec![
            StateCount { uf: "MG".to_string(), municipios: 5, rank: 1 },
            StateCount { uf: "BA".to_string(), municipios: 4, rank: 2 },
            StateCount { uf: "SP".to_string(), municipios: 4, rank: 3 },
            StateCount { uf: "RS".to_string(), municipios: 2, rank: 4 },
        ];
        assert_eq!(rows, expected);
    }

    #[test]
    fn state_ranking_truncates_to_top_ten() {
        let ufs = [
            (11, "RO"), (12, "AC"), (13, "AM"), (14, "RR"), (15, "PA"), (16, "AP"),
            (17, "TO"), (21, "MA"), (22, "PI"), (23, "CE"), (24, "RN"), (25, "PB"),
        ];
        let mut municipios = Vec::new();
        for (i, (codigo, uf)) in ufs.iter().enumerate() {
            municipios.extend(repeat(i as i64 + 1, *codigo, uf, "Norte"));
        }

        let rows = count_by_state(&municipios);
        assert_eq!(rows.len(), TOP_ESTADOS);
        assert_eq!(rows[0].uf, "PB");
        assert_eq!(rows[0].municipios, 12);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[9].rank, 10);
        // The two smallest states fall off the ranking.
        assert!(rows.iter().all(|r| r.uf != "RO" && r.uf != "AC"));
    }

    // -------------------------------------------------------------------------
    // SUMMARY
    // -------------------------------------------------------------------------

    #[test]
    fn rondonia_scenario() {
        let estados = vec![State {
            codigo_uf: 11,
            uf: "RO".to_string(),
            estado: "Rondônia".to_string(),
            regiao: "Norte".to_string(),
        }];
        let municipios = vec![Municipality {
            codigo_ibge: 1100015,
            municipio: "Alta Floresta D'Oeste".to_string(),
            codigo_uf: 11,
            uf: Some("RO".to_string()),
            estado: Some("Rondônia".to_string()),
            regiao: Some("Norte".to_string()),
        }];
        let snapshot = Snapshot::new(estados, municipios, Fonte::ApiIbge);

        let summary = summarize(&snapshot);
        assert_eq!(summary.fonte, "API IBGE");
        assert_eq!(summary.total_municipios, 1);
        assert_eq!(summary.total_estados, 1);
        assert_eq!(summary.regiao_destaque.as_deref(), Some("Norte"));
        assert_eq!(
            summary.municipios_por_regiao,
            vec![RegionCount { regiao: "Norte".to_string(), municipios: 1 }]
        );
        assert_eq!(
            summary.top_estados,
            vec![StateCount { uf: "RO".to_string(), municipios: 1, rank: 1 }]
        );
    }

    #[test]
    fn summary_serializes_documented_field_names() {
        let snapshot = Snapshot::new(vec![], vec![], Fonte::CsvGithub);
        let value = serde_json::to_value(summarize(&snapshot)).unwrap();

        assert_eq!(value["fonte"], "CSV GitHub (fallback)");
        assert_eq!(value["total_municipios"], 0);
        assert!(value["municipios_por_regiao"].is_array());
        assert!(value["top_estados"].is_array());
        assert!(value["regiao_destaque"].is_null());
    }
}
