use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::models::UserProfile;

/// Store a profile. `password_hash` must already be hashed.
pub fn create_user(conn: &Connection, username: &str, password_hash: &str) -> Result<UserProfile> {
    conn.execute(
        "INSERT INTO user_profiles (username, password_hash) VALUES (?1, ?2)",
        params![username, password_hash],
    )?;

    Ok(UserProfile {
        id: conn.last_insert_rowid(),
        username: username.to_string(),
        password_hash: password_hash.to_string(),
    })
}

pub fn fetch_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserProfile>> {
    let user = conn
        .query_row(
            "SELECT id, username, password_hash FROM user_profiles WHERE username = ?1",
            params![username],
            |row| {
                Ok(UserProfile {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    password_hash: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}
