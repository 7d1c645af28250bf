//! Dose-record persistence: bulk generation writes, the taken toggle,
//! and the calendar queries.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::DoseRecord;

/// Insert one record, replacing any prior record for the same
/// `(medicine, date, time)` slot.
pub fn insert_dose_record(conn: &Connection, record: &DoseRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR REPLACE INTO dose_records (id, medicine_id, date, reminder_time, is_taken, taken_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.id.to_string(),
            record.medicine_id.to_string(),
            record.date.to_string(),
            record.reminder_time,
            record.is_taken as i32,
            record.taken_at,
        ],
    )?;
    Ok(())
}

pub fn delete_records_for_medicine(
    conn: &Connection,
    medicine_id: &Uuid,
) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM dose_records WHERE medicine_id = ?1",
        params![medicine_id.to_string()],
    )?;
    Ok(deleted)
}

/// Flip the taken flag. `taken_at` must be `Some` exactly when `is_taken`
/// is true; callers pass the current instant on take and `None` on undo.
pub fn update_taken_status(
    conn: &Connection,
    id: &Uuid,
    is_taken: bool,
    taken_at: Option<i64>,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE dose_records SET is_taken = ?2, taken_at = ?3 WHERE id = ?1",
        params![id.to_string(), is_taken as i32, taken_at],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "dose_record".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn get_records_by_date(
    conn: &Connection,
    date: NaiveDate,
) -> Result<Vec<DoseRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, medicine_id, date, reminder_time, is_taken, taken_at
         FROM dose_records WHERE date = ?1 ORDER BY reminder_time",
    )?;

    let rows = stmt.query_map(params![date.to_string()], record_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn get_records_by_date_range(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DoseRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, medicine_id, date, reminder_time, is_taken, taken_at
         FROM dose_records WHERE date BETWEEN ?1 AND ?2 ORDER BY date, reminder_time",
    )?;

    let rows = stmt.query_map(params![start.to_string(), end.to_string()], record_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn get_records_by_medicine_and_date_range(
    conn: &Connection,
    medicine_id: &Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DoseRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, medicine_id, date, reminder_time, is_taken, taken_at
         FROM dose_records
         WHERE medicine_id = ?1 AND date BETWEEN ?2 AND ?3
         ORDER BY date, reminder_time",
    )?;

    let rows = stmt.query_map(
        params![medicine_id.to_string(), start.to_string(), end.to_string()],
        record_from_row,
    )?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn count_records_for_medicine(
    conn: &Connection,
    medicine_id: &Uuid,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM dose_records WHERE medicine_id = ?1",
        params![medicine_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<DoseRecord> {
    let id: String = row.get(0)?;
    let medicine_id: String = row.get(1)?;
    let date: String = row.get(2)?;

    Ok(DoseRecord {
        id: parse_uuid(&id, 0)?,
        medicine_id: parse_uuid(&medicine_id, 1)?,
        date: date.parse::<NaiveDate>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?,
        reminder_time: row.get(3)?,
        is_taken: row.get::<_, i32>(4)? != 0,
        taken_at: row.get(5)?,
    })
}

fn parse_uuid(text: &str, column: usize) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}
