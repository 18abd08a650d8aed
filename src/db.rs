use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub async fn init_db(database_url: &str) -> SqlitePool {
    let options = SqliteConnectOptions::from_str(database_url)
        .expect("DATABASE_URL is not a valid sqlite URL")
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .expect("Failed to connect to database");

    ensure_schema(&pool)
        .await
        .expect("Failed to initialize database schema");

    pool
}

/// Creates the tables on first start. Idempotent, so every boot runs it.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS employees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            department TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'employee',
            total_leaves INTEGER NOT NULL DEFAULT 20,
            used_leaves INTEGER NOT NULL DEFAULT 0,
            CHECK (used_leaves BETWEEN 0 AND total_leaves)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS leave_requests (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id INTEGER NOT NULL REFERENCES employees(id),
            leave_type TEXT NOT NULL,
            start_date DATE NOT NULL,
            end_date DATE NOT NULL,
            days INTEGER NOT NULL,
            reason TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            applied_at TIMESTAMP NOT NULL,
            decided_by INTEGER REFERENCES employees(id),
            decided_at TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_leave_requests_employee_applied \
         ON leave_requests(employee_id, applied_at DESC)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS refresh_tokens (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id INTEGER NOT NULL REFERENCES employees(id),
            jti TEXT NOT NULL UNIQUE,
            expires_at INTEGER NOT NULL,
            revoked INTEGER NOT NULL DEFAULT 0
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Seeds a small demo directory when the employees table is empty. The used
/// counters below match the seeded approved requests exactly, so the ledger
/// starts consistent.
pub async fn seed_demo_data(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    let demo_password = crate::auth::password::hash_password("password123");

    let employees: &[(i64, &str, &str, &str, &str, i64, i64)] = &[
        (1001, "John Doe", "john.doe@acme.com", "Engineering", "employee", 20, 3),
        (1002, "Jane Smith", "jane.smith@acme.com", "Engineering", "manager", 20, 0),
        (1003, "Bob Johnson", "bob.johnson@acme.com", "HR", "employee", 20, 8),
        (1004, "Alice Williams", "alice.williams@acme.com", "Marketing", "employee", 20, 0),
        (1005, "Charlie Brown", "charlie.brown@acme.com", "Sales", "manager", 20, 0),
        (1006, "Diana Prince", "diana.prince@acme.com", "Engineering", "employee", 20, 0),
    ];

    for (id, name, email, department, role, total, used) in employees {
        sqlx::query(
            "INSERT INTO employees (id, name, email, password, department, role, total_leaves, used_leaves) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(&demo_password)
        .bind(department)
        .bind(role)
        .bind(total)
        .bind(used)
        .execute(pool)
        .await?;
    }

    // (employee, type, start, end, days, reason, status, decided_by)
    let requests: &[(i64, &str, &str, &str, i64, &str, &str, Option<i64>)] = &[
        (1001, "sick", "2025-11-15", "2025-11-17", 3, "Medical appointment", "approved", Some(1002)),
        (1003, "annual", "2025-11-01", "2025-11-08", 8, "Vacation", "approved", Some(1005)),
        (1004, "casual", "2025-11-25", "2025-11-26", 2, "Family function", "pending", None),
        (1006, "sick", "2025-12-01", "2025-12-03", 3, "Flu", "rejected", Some(1002)),
        (1006, "casual", "2025-12-15", "2025-12-17", 3, "Personal work", "pending", None),
    ];

    for (employee_id, leave_type, start, end, days, reason, status, decided_by) in requests {
        sqlx::query(
            "INSERT INTO leave_requests \
             (employee_id, leave_type, start_date, end_date, days, reason, status, applied_at, decided_by, decided_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, datetime('now'), ?, \
                     CASE WHEN ? IS NULL THEN NULL ELSE datetime('now') END)",
        )
        .bind(employee_id)
        .bind(leave_type)
        .bind(start)
        .bind(end)
        .bind(days)
        .bind(reason)
        .bind(status)
        .bind(decided_by)
        .bind(decided_by)
        .execute(pool)
        .await?;
    }

    info!("Seeded demo data; all demo accounts use password 'password123'");
    Ok(())
}
