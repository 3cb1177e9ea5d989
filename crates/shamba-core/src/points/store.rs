//! Points persistence using SQLite

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::{Error, Result};

/// One farmer's ledger row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    pub phone: String,
    pub balance: u32,
    pub daily_accrued: u32,
    pub accrual_date: NaiveDate,
}

impl LedgerRow {
    /// Fresh row with a seeded starting balance.
    pub fn new(phone: &str, balance: u32, today: NaiveDate) -> Self {
        Self {
            phone: phone.to_string(),
            balance,
            daily_accrued: 0,
            accrual_date: today,
        }
    }
}

/// SQLite-backed ledger store
pub struct LedgerStore {
    conn: Connection,
}

impl LedgerStore {
    /// Open (or create) the ledger database at the given path.
    pub fn new(db_path: &str) -> Result<Self> {
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        let store = Self { conn };
        store.init_tables()?;
        Ok(store)
    }

    /// Create an in-memory ledger store (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS ledger (
                phone TEXT PRIMARY KEY,
                balance INTEGER NOT NULL,
                daily_accrued INTEGER NOT NULL,
                accrual_date TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Load a farmer's row, if one exists.
    pub fn load(&self, phone: &str) -> Result<Option<LedgerRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT phone, balance, daily_accrued, accrual_date FROM ledger WHERE phone = ?1",
        )?;

        let result = stmt.query_row(params![phone], |row| {
            let date_str: String = row.get(3)?;
            let accrual_date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                .map_err(|_| rusqlite::Error::InvalidQuery)?;
            Ok(LedgerRow {
                phone: row.get(0)?,
                balance: row.get::<_, i64>(1)? as u32,
                daily_accrued: row.get::<_, i64>(2)? as u32,
                accrual_date,
            })
        });

        match result {
            Ok(row) => Ok(Some(row)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::from(e)),
        }
    }

    /// Insert or replace a farmer's row.
    pub fn save(&self, row: &LedgerRow) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO ledger (phone, balance, daily_accrued, accrual_date)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                row.phone,
                row.balance as i64,
                row.daily_accrued as i64,
                row.accrual_date.format("%Y-%m-%d").to_string(),
            ],
        )?;
        Ok(())
    }
}
