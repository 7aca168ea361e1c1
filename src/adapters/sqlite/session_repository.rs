//! SQLite implementation of the SessionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{BreakType, Pause, Session};
use crate::domain::ports::SessionRepository;

#[derive(Clone)]
pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn load_pauses(&self, session: &mut Session) -> DomainResult<()> {
        let rows: Vec<PauseRow> = sqlx::query_as(
            "SELECT * FROM pauses WHERE session_id = ? ORDER BY paused_at",
        )
        .bind(session.id.to_string())
        .fetch_all(&self.pool)
        .await?;

        session.pauses = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(())
    }

    async fn hydrate(&self, row: Option<SessionRow>) -> DomainResult<Option<Session>> {
        match row {
            Some(r) => {
                let mut session: Session = r.try_into()?;
                self.load_pauses(&mut session).await?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn create(&self, session: &Session) -> DomainResult<()> {
        let result = sqlx::query(
            r#"INSERT INTO sessions (id, task_id, user_id, is_break, break_type,
               duration_minutes, actual_duration_seconds, completed,
               started_at, ended_at, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(session.id.to_string())
        .bind(session.task_id.map(|id| id.to_string()))
        .bind(session.user_id.to_string())
        .bind(i32::from(session.is_break))
        .bind(session.break_type.map(|b| b.as_str()))
        .bind(i64::from(session.duration_minutes))
        .bind(session.actual_duration_seconds)
        .bind(i32::from(session.completed))
        .bind(session.started_at.to_rfc3339())
        .bind(session.ended_at.map(|t| t.to_rfc3339()))
        .bind(session.created_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // Partial unique index backstop for "one active focus per user"
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(DomainError::ActiveSessionExists(session.id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Session>> {
        let row: Option<SessionRow> = sqlx::query_as("SELECT * FROM sessions WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        self.hydrate(row).await
    }

    async fn find_active(&self, user_id: Uuid) -> DomainResult<Option<Session>> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT * FROM sessions WHERE user_id = ? AND completed = 0
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        self.hydrate(row).await
    }

    async fn find_active_for_task(
        &self,
        user_id: Uuid,
        task_id: Uuid,
    ) -> DomainResult<Option<Session>> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT * FROM sessions WHERE user_id = ? AND task_id = ? AND completed = 0
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id.to_string())
        .bind(task_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        self.hydrate(row).await
    }

    async fn list_for_task(&self, user_id: Uuid, task_id: Uuid) -> DomainResult<Vec<Session>> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            "SELECT * FROM sessions WHERE user_id = ? AND task_id = ? ORDER BY created_at",
        )
        .bind(user_id.to_string())
        .bind(task_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            let mut session: Session = row.try_into()?;
            self.load_pauses(&mut session).await?;
            sessions.push(session);
        }
        Ok(sessions)
    }

    async fn count_completed_focus(&self, task_id: Uuid) -> DomainResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sessions
             WHERE task_id = ? AND completed = 1 AND is_break = 0",
        )
        .bind(task_id.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn sum_focus_seconds(&self, task_id: Uuid) -> DomainResult<i64> {
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(actual_duration_seconds), 0) FROM sessions
             WHERE task_id = ? AND completed = 1 AND is_break = 0",
        )
        .bind(task_id.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn create_pause(&self, pause: &Pause) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO pauses (id, session_id, paused_at, resumed_at) VALUES (?, ?, ?, ?)",
        )
        .bind(pause.id.to_string())
        .bind(pause.session_id.to_string())
        .bind(pause.paused_at.to_rfc3339())
        .bind(pause.resumed_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn close_pause(&self, pause_id: Uuid, resumed_at: DateTime<Utc>) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE pauses SET resumed_at = ? WHERE id = ? AND resumed_at IS NULL",
        )
        .bind(resumed_at.to_rfc3339())
        .bind(pause_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::SessionNotFound(pause_id));
        }
        Ok(())
    }

    async fn complete(
        &self,
        session_id: Uuid,
        ended_at: DateTime<Utc>,
        actual_duration_seconds: i64,
    ) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        // No pause is ever left dangling on a completed session
        sqlx::query(
            "UPDATE pauses SET resumed_at = ? WHERE session_id = ? AND resumed_at IS NULL",
        )
        .bind(ended_at.to_rfc3339())
        .bind(session_id.to_string())
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            "UPDATE sessions SET ended_at = ?, actual_duration_seconds = ?, completed = 1
             WHERE id = ? AND completed = 0",
        )
        .bind(ended_at.to_rfc3339())
        .bind(actual_duration_seconds)
        .bind(session_id.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DomainError::AlreadyCompleted(session_id));
        }

        tx.commit().await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    task_id: Option<String>,
    user_id: String,
    is_break: i32,
    break_type: Option<String>,
    duration_minutes: i64,
    actual_duration_seconds: Option<i64>,
    completed: i32,
    started_at: String,
    ended_at: Option<String>,
    created_at: String,
}

#[derive(sqlx::FromRow)]
struct PauseRow {
    id: String,
    session_id: String,
    paused_at: String,
    resumed_at: Option<String>,
}

fn parse_uuid(s: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(s).map_err(|e| DomainError::SerializationError(e.to_string()))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DomainError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| DomainError::SerializationError(e.to_string()))
}

impl TryFrom<SessionRow> for Session {
    type Error = DomainError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let break_type = row
            .break_type
            .as_deref()
            .map(|s| {
                BreakType::from_str(s).ok_or_else(|| {
                    DomainError::SerializationError(format!("Invalid break_type: {s}"))
                })
            })
            .transpose()?;

        Ok(Session {
            id: parse_uuid(&row.id)?,
            task_id: row.task_id.as_deref().map(parse_uuid).transpose()?,
            user_id: parse_uuid(&row.user_id)?,
            is_break: row.is_break != 0,
            break_type,
            duration_minutes: u32::try_from(row.duration_minutes)
                .map_err(|e| DomainError::SerializationError(e.to_string()))?,
            actual_duration_seconds: row.actual_duration_seconds,
            completed: row.completed != 0,
            started_at: parse_timestamp(&row.started_at)?,
            ended_at: row.ended_at.as_deref().map(parse_timestamp).transpose()?,
            created_at: parse_timestamp(&row.created_at)?,
            pauses: Vec::new(), // Loaded separately
        })
    }
}

impl TryFrom<PauseRow> for Pause {
    type Error = DomainError;

    fn try_from(row: PauseRow) -> Result<Self, Self::Error> {
        Ok(Pause {
            id: parse_uuid(&row.id)?,
            session_id: parse_uuid(&row.session_id)?,
            paused_at: parse_timestamp(&row.paused_at)?,
            resumed_at: row.resumed_at.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}
