use sqlx::SqlitePool;

pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    // Enable WAL mode for better concurrent access
    sqlx::query("PRAGMA journal_mode=WAL").execute(pool).await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, "001_init").await? {
        let migration_sql = include_str!("../migrations/001_init.sql");
        for statement in migration_sql.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed).execute(pool).await?;
            }
        }
        mark_applied(pool, "001_init").await?;
        tracing::info!("Applied migration: 001_init");
    }

    // 002: seed the service catalog
    if !is_applied(pool, "002_seed_catalog").await? {
        sqlx::query(
            "INSERT OR IGNORE INTO services
                (name, description, price_cents, duration_min, sort_order, service_type) VALUES
             ('Dog Walk (20 min)', 'Leashed neighborhood walk. 2 dogs $25.50.',
                1700, 20, 1, 'walk'),
             ('Dog Walk (30 min)', 'A brisk 30-minute walk. 2 dogs $39.00.',
                2200, 30, 2, 'walk'),
             ('Dog Walk (60 min)', 'Full-hour walk for high-energy pups. 2 dogs $48.00.',
                3200, 60, 3, 'walk'),
             ('Drop-in (20 min)', 'Quick drop-in for fresh water, food and a potty break.',
                1500, 20, 4, 'dropin'),
             ('Drop-in (30 min)', 'Drop-in with extra time for play and care.',
                2000, 30, 5, 'dropin'),
             ('Drop-in (60 min)', 'Extended drop-in for extra attention and enrichment.',
                3000, 60, 6, 'dropin'),
             ('Boarding (overnight, our home)', 'Overnight boarding with us. Additional dogs $18 each, up to 3.',
                2500, 720, 7, 'boarding'),
             ('Sitting (overnight, pet parent''s home)', 'Overnight care in your home. Additional pets $23 each.',
                3000, 720, 8, 'sitting'),
             ('Transport', 'Local pickup or drop-off up to 10 miles (per each way).',
                700, 0, 9, 'addon'),
             ('Administration of Meds', 'Simple medication administration per visit.',
                500, 0, 10, 'addon')",
        )
        .execute(pool)
        .await?;
        mark_applied(pool, "002_seed_catalog").await?;
        tracing::info!("Applied migration: 002_seed_catalog");
    }

    // 003: backfill type tags on rows created before the column existed
    if !is_applied(pool, "003_backfill_type_tags").await? {
        for (tag, pattern) in [
            ("walk", "dog walk%"),
            ("dropin", "drop-in%"),
            ("dropin", "drop in%"),
            ("dropin", "potty break%"),
            ("boarding", "boarding%"),
            ("sitting", "sitting%"),
        ] {
            sqlx::query(
                "UPDATE services SET service_type = ?
                 WHERE service_type IS NULL AND lower(name) LIKE ?",
            )
            .bind(tag)
            .bind(pattern)
            .execute(pool)
            .await?;
        }
        mark_applied(pool, "003_backfill_type_tags").await?;
        tracing::info!("Applied migration: 003_backfill_type_tags");
    }

    tracing::info!("Database migrations up to date");
    Ok(())
}

async fn is_applied(pool: &SqlitePool, name: &str) -> anyhow::Result<bool> {
    let applied: bool = sqlx::query_scalar("SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?")
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(applied)
}

async fn mark_applied(pool: &SqlitePool, name: &str) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await?;
    Ok(())
}
