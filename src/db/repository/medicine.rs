//! Medicine CRUD over a raw connection.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Medicine;

pub fn insert_medicine(conn: &Connection, med: &Medicine) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medicines (id, name, purpose, dosage, times_per_day, reminder_times,
         start_date, end_date, is_active, custom_ringtone, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            med.id.to_string(),
            med.name,
            med.purpose,
            med.dosage,
            med.times_per_day,
            med.reminder_times,
            med.start_date.to_string(),
            med.end_date.map(|d| d.to_string()),
            med.is_active as i32,
            med.custom_ringtone,
            med.created_at,
        ],
    )?;
    Ok(())
}

/// Replace every field except the identity.
pub fn update_medicine(conn: &Connection, med: &Medicine) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE medicines SET name = ?2, purpose = ?3, dosage = ?4, times_per_day = ?5,
         reminder_times = ?6, start_date = ?7, end_date = ?8, is_active = ?9,
         custom_ringtone = ?10
         WHERE id = ?1",
        params![
            med.id.to_string(),
            med.name,
            med.purpose,
            med.dosage,
            med.times_per_day,
            med.reminder_times,
            med.start_date.to_string(),
            med.end_date.map(|d| d.to_string()),
            med.is_active as i32,
            med.custom_ringtone,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "medicine".into(),
            id: med.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_medicine(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM medicines WHERE id = ?1", params![id.to_string()])?;
    Ok(())
}

pub fn get_medicine_by_id(conn: &Connection, id: &Uuid) -> Result<Option<Medicine>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, purpose, dosage, times_per_day, reminder_times,
         start_date, end_date, is_active, custom_ringtone, created_at
         FROM medicines WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], medicine_from_row);

    match result {
        Ok(med) => Ok(Some(med)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_all_medicines(conn: &Connection) -> Result<Vec<Medicine>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, purpose, dosage, times_per_day, reminder_times,
         start_date, end_date, is_active, custom_ringtone, created_at
         FROM medicines ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map([], medicine_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn get_all_active_medicines(conn: &Connection) -> Result<Vec<Medicine>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, purpose, dosage, times_per_day, reminder_times,
         start_date, end_date, is_active, custom_ringtone, created_at
         FROM medicines WHERE is_active = 1 ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map([], medicine_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn set_active_status(
    conn: &Connection,
    id: &Uuid,
    is_active: bool,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE medicines SET is_active = ?2 WHERE id = ?1",
        params![id.to_string(), is_active as i32],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "medicine".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn medicine_from_row(row: &Row<'_>) -> rusqlite::Result<Medicine> {
    let id: String = row.get(0)?;
    let start_date: String = row.get(6)?;
    let end_date: Option<String> = row.get(7)?;

    Ok(Medicine {
        id: parse_uuid(&id, 0)?,
        name: row.get(1)?,
        purpose: row.get(2)?,
        dosage: row.get(3)?,
        times_per_day: row.get(4)?,
        reminder_times: row.get(5)?,
        start_date: parse_date(&start_date, 6)?,
        end_date: end_date.as_deref().map(|d| parse_date(d, 7)).transpose()?,
        is_active: row.get::<_, i32>(8)? != 0,
        custom_ringtone: row.get(9)?,
        created_at: row.get(10)?,
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

fn parse_date(text: &str, column: usize) -> rusqlite::Result<NaiveDate> {
    text.parse::<NaiveDate>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn test_medicine(name: &str, created_at: i64) -> Medicine {
        Medicine {
            id: Uuid::new_v4(),
            name: name.into(),
            purpose: "blood sugar".into(),
            dosage: "500mg".into(),
            times_per_day: 2,
            reminder_times: "[\"08:00\",\"20:00\"]".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            is_active: true,
            custom_ringtone: None,
            created_at,
        }
    }

    #[test]
    fn insert_then_get_round_trips() {
        let conn = open_memory_database().unwrap();
        let med = test_medicine("Metformin", 1);

        insert_medicine(&conn, &med).unwrap();
        let loaded = get_medicine_by_id(&conn, &med.id).unwrap().unwrap();
        assert_eq!(loaded, med);
    }

    #[test]
    fn get_missing_returns_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_medicine_by_id(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn update_preserves_identity_and_replaces_fields() {
        let conn = open_memory_database().unwrap();
        let mut med = test_medicine("Metformin", 1);
        insert_medicine(&conn, &med).unwrap();

        med.dosage = "850mg".into();
        med.end_date = None;
        update_medicine(&conn, &med).unwrap();

        let loaded = get_medicine_by_id(&conn, &med.id).unwrap().unwrap();
        assert_eq!(loaded.dosage, "850mg");
        assert_eq!(loaded.end_date, None);
        assert_eq!(loaded.id, med.id);
    }

    #[test]
    fn update_missing_is_not_found() {
        let conn = open_memory_database().unwrap();
        let med = test_medicine("Ghost", 1);
        assert!(matches!(
            update_medicine(&conn, &med),
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn active_filter_and_newest_first_ordering() {
        let conn = open_memory_database().unwrap();
        let old = test_medicine("Old", 1);
        let mut paused = test_medicine("Paused", 2);
        paused.is_active = false;
        let new = test_medicine("New", 3);

        insert_medicine(&conn, &old).unwrap();
        insert_medicine(&conn, &paused).unwrap();
        insert_medicine(&conn, &new).unwrap();

        let all = get_all_medicines(&conn).unwrap();
        assert_eq!(
            all.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
            vec!["New", "Paused", "Old"]
        );

        let active = get_all_active_medicines(&conn).unwrap();
        assert_eq!(
            active.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
            vec!["New", "Old"]
        );
    }

    #[test]
    fn set_active_status_flips_flag() {
        let conn = open_memory_database().unwrap();
        let med = test_medicine("Metformin", 1);
        insert_medicine(&conn, &med).unwrap();

        set_active_status(&conn, &med.id, false).unwrap();
        let loaded = get_medicine_by_id(&conn, &med.id).unwrap().unwrap();
        assert!(!loaded.is_active);
    }
}
