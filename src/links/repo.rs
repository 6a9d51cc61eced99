use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "link_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Youtube,
    Website,
    Product,
}

impl Default for LinkType {
    fn default() -> Self {
        LinkType::Website
    }
}

/// Link record in the database. Links are created at upload and never
/// mutated or deleted.
#[derive(Debug, Clone, FromRow)]
pub struct Link {
    pub id: Uuid,
    pub url: String,
    pub link_type: LinkType,
    // absent for system-seeded links
    pub uploaded_by: Option<Uuid>,
    pub is_admin_pinned: bool,
    pub created_at: OffsetDateTime,
}

impl Link {
    pub async fn create(
        db: &PgPool,
        url: &str,
        link_type: LinkType,
        uploaded_by: Option<Uuid>,
    ) -> anyhow::Result<Link> {
        let link = sqlx::query_as::<_, Link>(
            r#"
            INSERT INTO links (url, link_type, uploaded_by)
            VALUES ($1, $2, $3)
            RETURNING id, url, link_type, uploaded_by, is_admin_pinned, created_at
            "#,
        )
        .bind(url)
        .bind(link_type)
        .bind(uploaded_by)
        .fetch_one(db)
        .await?;
        Ok(link)
    }

    /// One link the user has not been shown yet, with the view recorded, or
    /// None when the rotation is exhausted.
    ///
    /// Admin-pinned links are preferred regardless of uploader; otherwise the
    /// newest link the user neither saw nor uploaded. The view row is claimed
    /// with an insert-or-skip on the (user_id, link_id) unique constraint, so
    /// concurrent calls for the same user cannot both take the same link —
    /// the loser re-selects and moves on to the next candidate.
    pub async fn next_unseen(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Link>> {
        loop {
            let Some(link) = Self::pick_candidate(db, user_id).await? else {
                return Ok(None);
            };
            if claim_view(db, user_id, link.id).await? {
                return Ok(Some(link));
            }
        }
    }

    async fn pick_candidate(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Link>> {
        let pinned = sqlx::query_as::<_, Link>(
            r#"
            SELECT l.id, l.url, l.link_type, l.uploaded_by, l.is_admin_pinned, l.created_at
            FROM links l
            WHERE l.is_admin_pinned
              AND NOT EXISTS (
                  SELECT 1 FROM link_views v
                  WHERE v.user_id = $1 AND v.link_id = l.id
              )
            ORDER BY l.created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        if pinned.is_some() {
            return Ok(pinned);
        }

        let link = sqlx::query_as::<_, Link>(
            r#"
            SELECT l.id, l.url, l.link_type, l.uploaded_by, l.is_admin_pinned, l.created_at
            FROM links l
            WHERE NOT EXISTS (
                  SELECT 1 FROM link_views v
                  WHERE v.user_id = $1 AND v.link_id = l.id
              )
              AND (l.uploaded_by IS NULL OR l.uploaded_by <> $1)
            ORDER BY l.created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(link)
    }
}

/// Record that a link was served to a user. Returns false when a concurrent
/// call already recorded the same pair.
async fn claim_view(db: &PgPool, user_id: Uuid, link_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO link_views (user_id, link_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, link_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(link_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_type_defaults_to_website() {
        assert_eq!(LinkType::default(), LinkType::Website);
    }

    #[test]
    fn link_type_deserializes_wire_names() {
        assert_eq!(
            serde_json::from_str::<LinkType>("\"youtube\"").unwrap(),
            LinkType::Youtube
        );
        assert_eq!(
            serde_json::from_str::<LinkType>("\"product\"").unwrap(),
            LinkType::Product
        );
        assert!(serde_json::from_str::<LinkType>("\"podcast\"").is_err());
    }
}
