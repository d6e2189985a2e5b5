//! Applies or inspects the schema migrations in `migrations/`.
//!
//! ```text
//! migrate          apply all pending migrations
//! migrate status   list migrations and whether they are applied
//! ```

use std::collections::HashSet;
use std::error::Error;

use sqlx::migrate::Migrate;
use sqlx::postgres::PgPoolOptions;

use contactbook::MIGRATOR;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let database_url = std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;

    match std::env::args().nth(1).as_deref() {
        None | Some("up") => {
            MIGRATOR.run(&pool).await?;
            log::info!("Database is at the latest revision");
        }
        Some("status") => {
            let mut conn = pool.acquire().await?;
            (&mut *conn).ensure_migrations_table().await?;
            let applied: HashSet<i64> = (&mut *conn)
                .list_applied_migrations()
                .await?
                .into_iter()
                .map(|migration| migration.version)
                .collect();

            for migration in MIGRATOR.iter() {
                let state = if applied.contains(&migration.version) {
                    "applied"
                } else {
                    "pending"
                };
                println!("{:>14}  {:<8} {}", migration.version, state, migration.description);
            }
        }
        Some(other) => {
            return Err(format!("unknown command {:?} (expected `up` or `status`)", other).into());
        }
    }

    Ok(())
}
