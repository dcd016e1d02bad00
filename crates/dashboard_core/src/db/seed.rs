//! First-run example data.
//!
//! # Responsibility
//! - Populate each empty table with a fixed, deterministic row set.
//!
//! # Invariants
//! - The emptiness check is evaluated per table; populated tables are never
//!   touched, so re-running only fills tables that are still empty.
//! - Each table is seeded in its own transaction: a failure leaves that table
//!   empty and does not affect the others.

use log::{error, info};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

const CONFIG_SEED_COUNT: usize = 21;

const ALERTS: &[(&str, &str, i64)] = &[
    (
        "System uruchomiony",
        "Dashboard został uruchomiony pomyślnie",
        1,
    ),
    ("Brak danych", "Nie znaleziono danych konfiguracyjnych", 2),
    ("Backup", "Zaplanowany backup na dzisiaj 20:00", 1),
];

/// (title, description, status, priority, deadline, assigned_to, progress)
const WORKS: &[(&str, &str, &str, i64, &str, &str, i64)] = &[
    (
        "Implementacja API",
        "Stworzenie endpointów REST",
        "in_progress",
        2,
        "2024-01-15",
        "Jan Kowalski",
        75,
    ),
    (
        "Testy jednostkowe",
        "Pokrycie kodu testami",
        "pending",
        1,
        "2024-01-20",
        "Anna Nowak",
        0,
    ),
    (
        "Dokumentacja",
        "Przygotowanie dokumentacji API",
        "completed",
        1,
        "2024-01-10",
        "Piotr Wiśniewski",
        100,
    ),
];

/// (name, text, is_alert, is_planing, alert_time)
const NOTES: &[(&str, &str, bool, bool, &str)] = &[
    (
        "Spotkanie zespołu",
        "Omówienie postępów prac nad projektem",
        false,
        false,
        "",
    ),
    (
        "Pomysły na features",
        "Lista nowych funkcjonalności do implementacji",
        false,
        true,
        "",
    ),
    (
        "Notatka techniczna",
        "Informacje o architekturze systemu",
        true,
        false,
        "09:00",
    ),
];

const PLANNING: &[(&str, &str)] = &[
    (
        "Przegląd sprzętu",
        "Kwartalny przegląd urządzeń w laboratorium",
    ),
    ("Inwentaryzacja", "Spis stanów magazynowych"),
];

const WAREHOUSE: &[(&str, &str, i64, &str)] = &[
    ("Rezystor 1kΩ", "MAT/ELE/00123", 150, "Rezystory 1kΩ 0.25W"),
    (
        "Kondensator 100μF",
        "MAT/ELE/00234",
        75,
        "Kondensatory elektrolityczne",
    ),
    ("Arduino Uno", "DEV/MCU/00345", 12, "Microcontroller board"),
    ("Czujnik temperatury", "SEN/TMP/00456", 25, "DS18B20 waterproof"),
    (
        "Przewody połączeniowe",
        "ACC/CAB/00567",
        200,
        "Przewody męsko-żeńskie 20cm",
    ),
];

const USERS: &[(&str, &str, &str)] = &[
    ("admin", "admin123", "admin@devicelab.com"),
    ("jkowalski", "password123", "j.kowalski@devicelab.com"),
    ("anowak", "password123", "a.nowak@devicelab.com"),
];

/// What seeding did to one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Table was empty; this many rows were inserted.
    Seeded(usize),
    /// Table already had rows and was left alone.
    AlreadyPopulated,
    /// Seeding failed; the table was rolled back.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedTable {
    pub table: &'static str,
    pub outcome: SeedOutcome,
}

/// Per-table summary of one seeding pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub tables: Vec<SeedTable>,
}

impl SeedReport {
    /// Names of tables that received rows in this pass.
    pub fn seeded_tables(&self) -> Vec<&'static str> {
        self.tables
            .iter()
            .filter(|entry| matches!(entry.outcome, SeedOutcome::Seeded(_)))
            .map(|entry| entry.table)
            .collect()
    }

    /// Names of tables whose seeding failed.
    pub fn failed_tables(&self) -> Vec<&'static str> {
        self.tables
            .iter()
            .filter(|entry| matches!(entry.outcome, SeedOutcome::Failed(_)))
            .map(|entry| entry.table)
            .collect()
    }

    pub fn outcome(&self, table: &str) -> Option<&SeedOutcome> {
        self.tables
            .iter()
            .find(|entry| entry.table == table)
            .map(|entry| &entry.outcome)
    }
}

type SeedFn = fn(&Transaction<'_>) -> rusqlite::Result<usize>;

const SEEDERS: &[(&str, SeedFn)] = &[
    ("alerts", seed_alerts),
    ("works", seed_works),
    ("notes", seed_notes),
    ("planning", seed_planning),
    ("warehouse", seed_warehouse),
    ("users", seed_users),
    ("config", seed_config),
];

/// Seeds every empty table, independently.
pub fn seed_if_empty(conn: &mut Connection) -> SeedReport {
    let mut report = SeedReport::default();
    for &(table, seeder) in SEEDERS {
        let outcome = match seed_table(conn, table, seeder) {
            Ok(Some(rows)) => {
                info!(
                    "event=seed_table module=db status=ok table={} rows={}",
                    table, rows
                );
                SeedOutcome::Seeded(rows)
            }
            Ok(None) => SeedOutcome::AlreadyPopulated,
            Err(err) => {
                error!(
                    "event=seed_table module=db status=error table={} error={}",
                    table, err
                );
                SeedOutcome::Failed(err.to_string())
            }
        };
        report.tables.push(SeedTable { table, outcome });
    }
    report
}

fn seed_table(
    conn: &mut Connection,
    table: &str,
    seeder: SeedFn,
) -> rusqlite::Result<Option<usize>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    // `table` comes from the fixed SEEDERS list, never from callers.
    let count: i64 = tx.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })?;
    if count > 0 {
        return Ok(None);
    }

    let rows = seeder(&tx)?;
    tx.commit()?;
    Ok(Some(rows))
}

fn seed_alerts(tx: &Transaction<'_>) -> rusqlite::Result<usize> {
    let mut stmt =
        tx.prepare("INSERT INTO alerts (title, message, priority) VALUES (?1, ?2, ?3);")?;
    for (title, message, priority) in ALERTS {
        stmt.execute(params![title, message, priority])?;
    }
    Ok(ALERTS.len())
}

fn seed_works(tx: &Transaction<'_>) -> rusqlite::Result<usize> {
    let mut stmt = tx.prepare(
        "INSERT INTO works (title, description, status, priority, deadline, assigned_to, progress)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
    )?;
    for (title, description, status, priority, deadline, assigned_to, progress) in WORKS {
        stmt.execute(params![
            title,
            description,
            status,
            priority,
            deadline,
            assigned_to,
            progress
        ])?;
    }
    Ok(WORKS.len())
}

fn seed_notes(tx: &Transaction<'_>) -> rusqlite::Result<usize> {
    let mut stmt = tx.prepare(
        "INSERT INTO notes (name, text, is_alert, is_planing, alert_time)
         VALUES (?1, ?2, ?3, ?4, ?5);",
    )?;
    for (name, text, is_alert, is_planing, alert_time) in NOTES {
        stmt.execute(params![name, text, is_alert, is_planing, alert_time])?;
    }
    Ok(NOTES.len())
}

fn seed_planning(tx: &Transaction<'_>) -> rusqlite::Result<usize> {
    let mut stmt = tx.prepare("INSERT INTO planning (name, text) VALUES (?1, ?2);")?;
    for (name, text) in PLANNING {
        stmt.execute(params![name, text])?;
    }
    Ok(PLANNING.len())
}

fn seed_warehouse(tx: &Transaction<'_>) -> rusqlite::Result<usize> {
    let mut stmt = tx
        .prepare("INSERT INTO warehouse (name, code, quantity, note) VALUES (?1, ?2, ?3, ?4);")?;
    for (name, code, quantity, note) in WAREHOUSE {
        stmt.execute(params![name, code, quantity, note])?;
    }
    Ok(WAREHOUSE.len())
}

fn seed_users(tx: &Transaction<'_>) -> rusqlite::Result<usize> {
    let mut stmt = tx.prepare(
        "INSERT INTO users (username, password, email, active) VALUES (?1, ?2, ?3, 1);",
    )?;
    for (username, password, email) in USERS {
        stmt.execute(params![username, password, email])?;
    }
    Ok(USERS.len())
}

fn seed_config(tx: &Transaction<'_>) -> rusqlite::Result<usize> {
    let mut stmt = tx.prepare(
        "INSERT INTO config (config_key, config_value, description) VALUES (?1, ?2, ?3);",
    )?;
    for index in 0..CONFIG_SEED_COUNT {
        stmt.execute(params![
            format!("config{index}"),
            format!("value{index}"),
            format!("Configuration parameter {index}"),
        ])?;
    }
    Ok(CONFIG_SEED_COUNT)
}

#[cfg(test)]
mod tests {
    use super::{seed_if_empty, SeedOutcome};
    use crate::db::migrations::apply_migrations;
    use crate::db::open_connection_in_memory;

    #[test]
    fn seeding_fills_every_table_on_fresh_schema() {
        let mut conn = open_connection_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();

        let report = seed_if_empty(&mut conn);
        assert!(report.failed_tables().is_empty());
        assert_eq!(report.outcome("alerts"), Some(&SeedOutcome::Seeded(3)));
        assert_eq!(report.outcome("warehouse"), Some(&SeedOutcome::Seeded(5)));
        assert_eq!(report.outcome("config"), Some(&SeedOutcome::Seeded(21)));
    }

    #[test]
    fn missing_table_is_reported_without_blocking_others() {
        let mut conn = open_connection_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn.execute_batch("DROP TABLE planning;").unwrap();

        let report = seed_if_empty(&mut conn);
        assert_eq!(report.failed_tables(), vec!["planning"]);
        assert_eq!(report.outcome("notes"), Some(&SeedOutcome::Seeded(3)));
        assert_eq!(report.outcome("users"), Some(&SeedOutcome::Seeded(3)));
    }
}
