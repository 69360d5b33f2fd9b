//! Canonical-schema normalization shared by the source paths.

use std::collections::HashMap;

use crate::model::{Municipality, State};

/// Left join: fill each municipality's denormalized geography from the state
/// table, keyed by `codigo_uf`. Fields already present are left untouched,
/// so the function is idempotent and a no-op on a canonical table. Rows
/// whose state code has no match keep `None` fields and stay in the table.
pub fn attach_states(mut municipios: Vec<Municipality>, estados: &[State]) -> Vec<Municipality> {
    let by_codigo: HashMap<i32, &State> = estados.iter().map(|e| (e.codigo_uf, e)).collect();

    let mut unmatched = 0usize;
    for m in &mut municipios {
        match by_codigo.get(&m.codigo_uf) {
            Some(e) => {
                if m.uf.is_none() {
                    m.uf = Some(e.uf.clone());
                }
                if m.estado.is_none() {
                    m.estado = Some(e.estado.clone());
                }
                if m.regiao.is_none() {
                    m.regiao = Some(e.regiao.clone());
                }
            }
            None => {
                if m.uf.is_none() {
                    unmatched += 1;
                }
            }
        }
    }

    if unmatched > 0 {
        log::warn!("{unmatched} municipios reference a codigo_uf absent from the state table");
    }

    municipios
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rondonia() -> State {
        State {
            codigo_uf: 11,
            uf: "RO".to_string(),
            estado: "Rondônia".to_string(),
            regiao: "Norte".to_string(),
        }
    }

    fn bare_municipio(codigo_ibge: i32, nome: &str, codigo_uf: i32) -> Municipality {
        Municipality {
            codigo_ibge,
            municipio: nome.to_string(),
            codigo_uf,
            uf: None,
            estado: None,
            regiao: None,
        }
    }

    #[test]
    fn fills_geography_from_state_table() {
        let municipios = vec![bare_municipio(1100015, "Alta Floresta D'Oeste", 11)];
        let joined = attach_states(municipios, &[rondonia()]);

        assert_eq!(joined[0].uf.as_deref(), Some("RO"));
        assert_eq!(joined[0].estado.as_deref(), Some("Rondônia"));
        assert_eq!(joined[0].regiao.as_deref(), Some("Norte"));
    }

    #[test]
    fn join_miss_keeps_row_with_null_geography() {
        let municipios = vec![
            bare_municipio(1100015, "Alta Floresta D'Oeste", 11),
            bare_municipio(9900001, "Fora do Mapa", 99),
        ];
        let joined = attach_states(municipios, &[rondonia()]);

        assert_eq!(joined.len(), 2, "unmatched rows must not be dropped");
        assert_eq!(joined[1].codigo_uf, 99);
        assert_eq!(joined[1].uf, None);
        assert_eq!(joined[1].estado, None);
        assert_eq!(joined[1].regiao, None);
    }

    #[test]
    fn idempotent_on_canonical_table() {
        let estados = vec![rondonia()];
        let once = attach_states(
            vec![bare_municipio(1100015, "Alta Floresta D'Oeste", 11)],
            &estados,
        );
        let twice = attach_states(once.clone(), &estados);
        assert_eq!(once, twice);
    }

    #[test]
    fn does_not_overwrite_filled_fields() {
        let mut m = bare_municipio(1100015, "Alta Floresta D'Oeste", 11);
        m.regiao = Some("Nordeste".to_string());
        let joined = attach_states(vec![m], &[rondonia()]);

        assert_eq!(joined[0].regiao.as_deref(), Some("Nordeste"));
        assert_eq!(joined[0].uf.as_deref(), Some("RO"));
    }
}
