//! [`SqliteStore`]: the SQLite implementation of the Marquee storage traits.

use std::{collections::HashMap, path::Path};

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use marquee_core::{
  dashboard::{CommentStamp, KindTotals},
  event::{EngagementEvent, EventKind},
  identity::IdentityId,
  rating::{NewRating, Rating, RatingIndex, RatingStats},
  store::{
    Backend, CommentSource, EventStore, IdentityDirectory, RatingStore,
    SubjectCatalog,
  },
  subject::SubjectId,
};

use crate::{
  Result,
  encode::{RawEvent, RawRating, decode_dt, encode_dt, encode_uuid, hash_credential},
  schema::{
    EVENTS_DDL, RATINGS_DDL, RATINGS_SUBJECT_IDENTITY_UQ, RATINGS_SUBJECT_IDX,
    SCHEMA,
  },
};

// ─── Comment status ──────────────────────────────────────────────────────────

/// Moderation state of a seeded comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStatus {
  Approved,
  Pending,
  Rejected,
}

impl CommentStatus {
  fn as_str(self) -> &'static str {
    match self {
      Self::Approved => "approved",
      Self::Pending => "pending",
      Self::Rejected => "rejected",
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Marquee store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn count(&self, sql: &'static str) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(sql, [], |r| r.get(0))?))
      .await?;
    Ok(n.max(0) as u64)
  }

  // ── Seeding ───────────────────────────────────────────────────────────────
  //
  // Subjects, identities, comments and sessions are owned by the CRUD layer.
  // These helpers write the minimum those collaborators would.

  /// Insert a subject into the catalog.
  pub async fn add_subject(&self, subject_id: &SubjectId, title: &str) -> Result<()> {
    let id_str = subject_id.as_str().to_owned();
    let title  = title.to_owned();
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (subject_id, title, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, title, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert an identity with an empty favorites list.
  pub async fn add_identity(&self, identity_id: &IdentityId) -> Result<()> {
    let id_str = identity_id.as_str().to_owned();
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO identities (identity_id, created_at) VALUES (?1, ?2)",
          rusqlite::params![id_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Append `subject_id` to an identity's favorites list (no duplicates).
  pub async fn add_favorite(
    &self,
    identity_id: &IdentityId,
    subject_id:  &SubjectId,
  ) -> Result<()> {
    let identity_str = identity_id.as_str().to_owned();
    let subject_str  = subject_id.as_str().to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE identities
             SET favorites = json_insert(favorites, '$[#]', ?2)
           WHERE identity_id = ?1
             AND NOT EXISTS (
               SELECT 1 FROM json_each(identities.favorites) WHERE value = ?2
             )",
          rusqlite::params![identity_str, subject_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a comment with an explicit creation time.
  pub async fn add_comment(
    &self,
    subject_id: &SubjectId,
    status:     CommentStatus,
    deleted:    bool,
    created_at: DateTime<Utc>,
  ) -> Result<Uuid> {
    let comment_id  = Uuid::new_v4();
    let id_str      = encode_uuid(comment_id);
    let subject_str = subject_id.as_str().to_owned();
    let status_str  = status.as_str();
    let at_str      = encode_dt(created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (comment_id, subject_id, status, deleted, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, subject_str, status_str, deleted, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(comment_id)
  }

  /// Open a session for `identity_id` and return its bearer token. Only the
  /// token's digest is stored.
  pub async fn issue_session(&self, identity_id: &IdentityId) -> Result<String> {
    let token        = Uuid::new_v4().simple().to_string();
    let hash         = hash_credential(&token);
    let identity_str = identity_id.as_str().to_owned();
    let at_str       = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, identity_id, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![hash, identity_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(token)
  }
}

impl Backend for SqliteStore {
  type Error = crate::Error;
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteStore {
  async fn append_event(&self, event: EngagementEvent) -> Result<()> {
    let event_id_str    = encode_uuid(event.event_id);
    let subject_id_str  = event.subject_id.as_str().to_owned();
    let identity_id_str = event.identity_id.as_ref().map(|i| i.as_str().to_owned());
    let event_type      = event.kind().as_str();
    let value           = event.payload.value() as i64;
    let mode            = event.mode;
    let created_at_str  = encode_dt(event.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute_batch(EVENTS_DDL)?;
        conn.execute(
          "INSERT INTO engagement_events (
             event_id, subject_id, identity_id, event_type, value, mode, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            event_id_str,
            subject_id_str,
            identity_id_str,
            event_type,
            value,
            mode,
            created_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn kind_totals(&self) -> Result<KindTotals> {
    let rows: Vec<(String, i64, i64)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT event_type, COUNT(*), COALESCE(SUM(value), 0)
           FROM engagement_events
           GROUP BY event_type",
        )?;
        let rows = stmt
          .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut totals = KindTotals::default();
    for (event_type, count, sum) in rows {
      let (count, sum) = (count.max(0) as u64, sum.max(0) as u64);
      match EventKind::parse(&event_type)? {
        EventKind::View => totals.views += count,
        EventKind::Favorite => totals.likes += count,
        EventKind::Rating => totals.rating_stars += sum,
      }
    }
    Ok(totals)
  }

  async fn events_since(&self, since: DateTime<Utc>) -> Result<Vec<EngagementEvent>> {
    let since_str = encode_dt(since);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM engagement_events WHERE created_at >= ?1",
          RawEvent::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![since_str], RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn count_events(&self) -> Result<u64> {
    self.count("SELECT COUNT(*) FROM engagement_events").await
  }
}

// ─── RatingStore impl ────────────────────────────────────────────────────────

impl RatingStore for SqliteStore {
  async fn create_index(&self, index: RatingIndex) -> Result<()> {
    let ddl = match index {
      RatingIndex::SubjectIdentityUnique => RATINGS_SUBJECT_IDENTITY_UQ,
      RatingIndex::Subject => RATINGS_SUBJECT_IDX,
    };

    self
      .conn
      .call(move |conn| {
        conn.execute_batch(RATINGS_DDL)?;
        conn.execute(ddl, [])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn upsert_rating(&self, input: NewRating) -> Result<Rating> {
    let rating_id_str   = encode_uuid(Uuid::new_v4());
    let subject_id_str  = input.subject_id.as_str().to_owned();
    let identity_id_str = input.identity_id.as_str().to_owned();
    let rating          = input.rating.get();
    let at_str          = encode_dt(input.at);

    let raw: RawRating = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "INSERT INTO ratings (
             rating_id, subject_id, identity_id, rating, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)
           ON CONFLICT (subject_id, identity_id) DO UPDATE SET
             rating     = excluded.rating,
             updated_at = excluded.updated_at
           RETURNING {}",
          RawRating::COLUMNS
        );
        Ok(conn.query_row(
          &sql,
          rusqlite::params![rating_id_str, subject_id_str, identity_id_str, rating, at_str],
          RawRating::from_row,
        )?)
      })
      .await?;

    raw.into_rating()
  }

  async fn get_rating(
    &self,
    subject_id:  &SubjectId,
    identity_id: &IdentityId,
  ) -> Result<Option<Rating>> {
    let subject_id_str  = subject_id.as_str().to_owned();
    let identity_id_str = identity_id.as_str().to_owned();

    let raw: Option<RawRating> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM ratings WHERE subject_id = ?1 AND identity_id = ?2",
          RawRating::COLUMNS
        );
        Ok(conn
          .query_row(
            &sql,
            rusqlite::params![subject_id_str, identity_id_str],
            RawRating::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawRating::into_rating).transpose()
  }

  async fn rating_stats(&self, subject_id: &SubjectId) -> Result<RatingStats> {
    let subject_id_str = subject_id.as_str().to_owned();

    let (count, sum): (i64, i64) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*), COALESCE(SUM(rating), 0) FROM ratings WHERE subject_id = ?1",
          rusqlite::params![subject_id_str],
          |r| Ok((r.get(0)?, r.get(1)?)),
        )?)
      })
      .await?;

    Ok(RatingStats { count: count.max(0) as u64, sum: sum.max(0) as u64 })
  }

  async fn total_rating_stars(&self) -> Result<u64> {
    self.count("SELECT COALESCE(SUM(rating), 0) FROM ratings").await
  }
}

// ─── Collaborator impls ──────────────────────────────────────────────────────

impl SubjectCatalog for SqliteStore {
  async fn subject_exists(&self, subject_id: &SubjectId) -> Result<bool> {
    let id_str = subject_id.as_str().to_owned();

    let exists = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT 1 FROM subjects WHERE subject_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false))
      })
      .await?;
    Ok(exists)
  }

  async fn count_subjects(&self) -> Result<u64> {
    self.count("SELECT COUNT(*) FROM subjects").await
  }

  async fn titles(&self, ids: &[SubjectId]) -> Result<HashMap<SubjectId, String>> {
    if ids.is_empty() {
      return Ok(HashMap::new());
    }
    let id_strs: Vec<String> = ids.iter().map(|id| id.as_str().to_owned()).collect();

    let rows: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let placeholders = vec!["?"; id_strs.len()].join(", ");
        let sql = format!(
          "SELECT subject_id, title FROM subjects WHERE subject_id IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(id_strs.iter()), |r| {
            Ok((r.get(0)?, r.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(id, title)| Ok((SubjectId::parse(&id)?, title)))
      .collect()
  }
}

impl IdentityDirectory for SqliteStore {
  async fn count_identities(&self) -> Result<u64> {
    self.count("SELECT COUNT(*) FROM identities").await
  }

  async fn count_favorite_memberships(&self) -> Result<u64> {
    self
      .count("SELECT COALESCE(SUM(json_array_length(favorites)), 0) FROM identities")
      .await
  }

  async fn resolve_credential(&self, credential: &str) -> Result<Option<IdentityId>> {
    let hash = hash_credential(credential);

    let identity: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT identity_id FROM sessions WHERE token_hash = ?1",
            rusqlite::params![hash],
            |r| r.get(0),
          )
          .optional()?)
      })
      .await?;

    Ok(identity.map(IdentityId::new).transpose()?)
  }
}

impl CommentSource for SqliteStore {
  async fn count_comments(&self) -> Result<u64> {
    self.count("SELECT COUNT(*) FROM comments WHERE deleted = 0").await
  }

  async fn comments_since(&self, since: DateTime<Utc>) -> Result<Vec<CommentStamp>> {
    let since_str = encode_dt(since);

    let rows: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT subject_id, created_at FROM comments
           WHERE status != 'rejected' AND created_at >= ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![since_str], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(subject_id, created_at)| {
        Ok(CommentStamp {
          subject_id: SubjectId::parse(&subject_id)?,
          created_at: decode_dt(&created_at)?,
        })
      })
      .collect()
  }
}
