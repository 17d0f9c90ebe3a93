//! Structural profile cache

use crate::models::StructuralProfile;
use crate::Result;
use sqlx::{Row, SqlitePool};

/// Insert or replace the cached profile for `wine_id`
pub async fn save_profile(
    pool: &SqlitePool,
    wine_id: &str,
    profile: &StructuralProfile,
) -> Result<()> {
    let profile_json = serde_json::to_string(profile)?;

    sqlx::query(
        r#"
        INSERT INTO profile_cache (wine_id, profile_json, generated_at_ms, updated_at)
        VALUES (?, ?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(wine_id) DO UPDATE SET
            profile_json = excluded.profile_json,
            generated_at_ms = excluded.generated_at_ms,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(wine_id)
    .bind(profile_json)
    .bind(profile.generated_at.timestamp_millis())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the cached profile for `wine_id`
pub async fn load_profile(pool: &SqlitePool, wine_id: &str) -> Result<Option<StructuralProfile>> {
    let row = sqlx::query("SELECT profile_json FROM profile_cache WHERE wine_id = ?")
        .bind(wine_id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let json: String = row.get("profile_json");
            Ok(Some(serde_json::from_str(&json)?))
        }
        None => Ok(None),
    }
}
