//! Armed-trigger index.
//!
//! Trigger identities are hashes with no reverse mapping, so the set a
//! medicine currently has armed is persisted here at schedule time.
//! Cancellation reads this set back and cancels exactly those triggers
//! instead of sweeping a bounded guess-space.

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;

/// Record the trigger identities just armed for a medicine.
pub fn record_armed_triggers(
    conn: &Connection,
    medicine_id: &Uuid,
    trigger_ids: &[u32],
) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT OR REPLACE INTO armed_triggers (trigger_id, medicine_id) VALUES (?1, ?2)",
    )?;
    for trigger_id in trigger_ids {
        stmt.execute(params![trigger_id, medicine_id.to_string()])?;
    }
    Ok(())
}

/// All trigger identities currently recorded as armed for a medicine.
pub fn armed_trigger_ids(
    conn: &Connection,
    medicine_id: &Uuid,
) -> Result<Vec<u32>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT trigger_id FROM armed_triggers WHERE medicine_id = ?1 ORDER BY trigger_id",
    )?;
    let rows = stmt.query_map(params![medicine_id.to_string()], |row| row.get(0))?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn clear_armed_triggers(conn: &Connection, medicine_id: &Uuid) -> Result<usize, DatabaseError> {
    let cleared = conn.execute(
        "DELETE FROM armed_triggers WHERE medicine_id = ?1",
        params![medicine_id.to_string()],
    )?;
    Ok(cleared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::medicine::insert_medicine;
    use crate::db::sqlite::open_memory_database;
    use crate::models::Medicine;
    use chrono::NaiveDate;

    fn seed_medicine(conn: &Connection) -> Uuid {
        let med = Medicine {
            id: Uuid::new_v4(),
            name: "Metformin".into(),
            purpose: String::new(),
            dosage: "500mg".into(),
            times_per_day: 1,
            reminder_times: "08:00".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: None,
            is_active: true,
            custom_ringtone: None,
            created_at: 0,
        };
        insert_medicine(conn, &med).unwrap();
        med.id
    }

    #[test]
    fn record_then_read_back() {
        let conn = open_memory_database().unwrap();
        let med_id = seed_medicine(&conn);

        record_armed_triggers(&conn, &med_id, &[42, 7, 9001]).unwrap();
        assert_eq!(armed_trigger_ids(&conn, &med_id).unwrap(), vec![7, 42, 9001]);
    }

    #[test]
    fn clear_removes_only_that_medicine() {
        let conn = open_memory_database().unwrap();
        let first = seed_medicine(&conn);
        let second = seed_medicine(&conn);

        record_armed_triggers(&conn, &first, &[1, 2]).unwrap();
        record_armed_triggers(&conn, &second, &[3]).unwrap();

        assert_eq!(clear_armed_triggers(&conn, &first).unwrap(), 2);
        assert!(armed_trigger_ids(&conn, &first).unwrap().is_empty());
        assert_eq!(armed_trigger_ids(&conn, &second).unwrap(), vec![3]);
    }

    #[test]
    fn deleting_medicine_cascades_index() {
        let conn = open_memory_database().unwrap();
        let med_id = seed_medicine(&conn);
        record_armed_triggers(&conn, &med_id, &[1, 2, 3]).unwrap();

        conn.execute("DELETE FROM medicines WHERE id = ?1", params![med_id.to_string()])
            .unwrap();
        assert!(armed_trigger_ids(&conn, &med_id).unwrap().is_empty());
    }
}
