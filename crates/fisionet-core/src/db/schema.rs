//! SQLite schema definition.

/// Complete local schema.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Key-value store (persisted auth session lives under a single fixed key)
-- ============================================================================

CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Offline tables
-- ============================================================================

-- One row per remote row. `body` is the full JSON object, including `id`
-- and `created_at`; ids are assigned per table.
CREATE TABLE IF NOT EXISTS local_rows (
    table_name TEXT NOT NULL,
    id INTEGER NOT NULL,
    body TEXT NOT NULL,
    PRIMARY KEY (table_name, id)
);

-- Last id handed out per table. Survives deletes so ids are never reused.
CREATE TABLE IF NOT EXISTS row_sequences (
    table_name TEXT PRIMARY KEY,
    last_id INTEGER NOT NULL
);
"#;
