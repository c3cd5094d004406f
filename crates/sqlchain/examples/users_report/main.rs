//! Builds a few report queries against a throwaway SQLite database.
//!
//! Run with:
//!   cargo run --example users_report -p sqlchain
//!
//! Optional: point `DB_DATABASE` at a SQLite file (and set `DB_USERNAME`) to
//! use it instead of an in-memory database.
//!   RUST_LOG=sqlchain.sql=debug cargo run --example users_report -p sqlchain

use sqlchain::monitor::{StatsHook, TracingSqlHook};
use sqlchain::{Db, DbConfig, DbResult, sqlite};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> DbResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let conn = match DbConfig::from_env() {
        Ok(config) => sqlite::open(&config)?,
        Err(err) => {
            println!("{err}; using an in-memory database");
            sqlite::open_in_memory()?
        }
    };
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY, name TEXT, country TEXT, score INTEGER);
         DELETE FROM users;
         INSERT INTO users (name, country, score) VALUES
           ('ana', 'BR', 71), ('joao', 'BR', 88), ('li', 'CN', 93), ('sam', 'US', NULL);",
    )
    .map_err(|e| sqlchain::DbError::execution(e.to_string()))?;

    let stats = Arc::new(StatsHook::new());
    let db = Db::new(conn)
        .add_hook(TracingSqlHook::new())
        .add_hook_arc(stats.clone())
        .with_tag("users_report");

    let top = db
        .table("users")
        .select(["name", "score"])
        .where_not_null("score")
        .order_by_desc("score")
        .limit(2);
    println!("{}", top.to_sql()?);
    for row in top.get(&db)? {
        println!("  {}", row.to_json());
    }

    let by_country = db
        .table("users")
        .select(["country", "COUNT(*) AS n", "AVG(score) AS avg_score"])
        .group_by(["country"])
        .having("COUNT(*)", ">=", 1)
        .order_by_asc("country");
    for row in by_country.get(&db)? {
        println!("  {}", serde_json::to_string(&row).unwrap_or_default());
    }

    println!("users: {}", db.table("users").count(&db)?);
    println!("best score: {:?}", db.table("users").max(&db, "score")?);
    println!("stats: {:?}", stats.stats());

    Ok(())
}
