//! Alternate deployment: canonical tables in a Postgres warehouse.
//!
//! Two read-only queries on a connection opened for the load and closed
//! right after. Postgres folds the unquoted table and column identifiers to
//! lower case, so `SELECT * FROM ESTADOS` reads the `estados` table and the
//! rows map onto the canonical structs by column name. This path has no
//! fallback: any failure is fatal to the load.

use sqlx::postgres::PgPoolOptions;

use crate::error::SourceError;
use crate::model::{Fonte, Municipality, Snapshot, State};
use crate::normalize::attach_states;

pub async fn load(db_url: &str) -> Result<Snapshot, SourceError> {
    let pool = PgPoolOptions::new().max_connections(1).connect(db_url).await?;

    let estados: Vec<State> = sqlx::query_as("SELECT * FROM ESTADOS")
        .fetch_all(&pool)
        .await?;
    let municipios: Vec<Municipality> = sqlx::query_as("SELECT * FROM MUNICIPIOS")
        .fetch_all(&pool)
        .await?;

    pool.close().await;

    // Stored tables are already canonical; the join only fills holes.
    let municipios = attach_states(municipios, &estados);

    log::info!(
        "warehouse served {} estados and {} municipios",
        estados.len(),
        municipios.len()
    );
    Ok(Snapshot::new(estados, municipios, Fonte::Warehouse))
}

/// Replace the warehouse tables with the given snapshot, creating them on
/// first use. This is the producer side of the warehouse deployment.
pub async fn seed(db_url: &str, snapshot: &Snapshot) -> Result<(), SourceError> {
    let pool = PgPoolOptions::new().max_connections(1).connect(db_url).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS estados (
            codigo_uf INT PRIMARY KEY,
            uf TEXT NOT NULL,
            estado TEXT NOT NULL,
            regiao TEXT NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS municipios (
            codigo_ibge INT PRIMARY KEY,
            municipio TEXT NOT NULL,
            codigo_uf INT NOT NULL,
            uf TEXT,
            estado TEXT,
            regiao TEXT
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query("TRUNCATE estados, municipios")
        .execute(&pool)
        .await?;

    for e in &snapshot.estados {
        sqlx::query("INSERT INTO estados (codigo_uf, uf, estado, regiao) VALUES ($1, $2, $3, $4)")
            .bind(e.codigo_uf)
            .bind(&e.uf)
            .bind(&e.estado)
            .bind(&e.regiao)
            .execute(&pool)
            .await?;
    }

    for m in &snapshot.municipios {
        sqlx::query(
            r#"
            INSERT INTO municipios (codigo_ibge, municipio, codigo_uf, uf, estado, regiao)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(m.codigo_ibge)
        .bind(&m.municipio)
        .bind(m.codigo_uf)
        .bind(&m.uf)
        .bind(&m.estado)
        .bind(&m.regiao)
        .execute(&pool)
        .await?;
    }

    pool.close().await;
    Ok(())
}
