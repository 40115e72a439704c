use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::models::{Article, ArticleStatus, NewArticle, NewPodcast, Podcast};

use super::schema::SCHEMA;

/// Durable store for articles and podcasts. All access funnels through one
/// connection, so individual statements never interleave mid-write.
pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // Article operations

    pub async fn find_article_by_url(&self, url: &str) -> Result<Option<Article>> {
        let url = url.to_string();
        let article = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, url, title, content_raw, content_clean, source, status, created_at
                     FROM articles WHERE url = ?1",
                )?;
                let article = stmt
                    .query_row(params![url], |row| Ok(article_from_row(row)))
                    .optional()?;
                Ok(article)
            })
            .await?;
        Ok(article)
    }

    /// Insert an article, tolerating a concurrent insert of the same URL:
    /// the row returned is whichever one holds the URL afterwards.
    pub async fn insert_article(&self, article: NewArticle) -> Result<Article> {
        let article = self
            .conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO articles (url, title, content_raw, content_clean, source, status)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                       ON CONFLICT(url) DO NOTHING"#,
                    params![
                        article.url,
                        article.title,
                        article.content_raw,
                        article.content_clean,
                        article.source,
                        article.status.as_str(),
                    ],
                )?;
                let mut stmt = conn.prepare(
                    "SELECT id, url, title, content_raw, content_clean, source, status, created_at
                     FROM articles WHERE url = ?1",
                )?;
                let article = stmt.query_row(params![article.url], |row| Ok(article_from_row(row)))?;
                Ok(article)
            })
            .await?;
        Ok(article)
    }

    /// Articles in a given lifecycle status, in insertion order.
    pub async fn get_articles_by_status(&self, status: ArticleStatus) -> Result<Vec<Article>> {
        let articles = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, url, title, content_raw, content_clean, source, status, created_at
                     FROM articles WHERE status = ?1 ORDER BY id",
                )?;
                let articles = stmt
                    .query_map(params![status.as_str()], |row| Ok(article_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(articles)
            })
            .await?;
        Ok(articles)
    }

    /// The reading queue as shown to callers: everything not yet archived,
    /// newest first.
    pub async fn get_active_articles(&self) -> Result<Vec<Article>> {
        let articles = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, url, title, content_raw, content_clean, source, status, created_at
                     FROM articles WHERE status != 'archived'
                     ORDER BY created_at DESC, id DESC",
                )?;
                let articles = stmt
                    .query_map([], |row| Ok(article_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(articles)
            })
            .await?;
        Ok(articles)
    }

    pub async fn delete_article(&self, id: i64) -> Result<()> {
        let deleted = self
            .conn
            .call(move |conn| {
                let deleted = conn.execute("DELETE FROM articles WHERE id = ?1", params![id])?;
                Ok(deleted)
            })
            .await?;
        if deleted == 0 {
            return Err(AppError::article_not_found(id));
        }
        Ok(())
    }

    // Podcast operations

    /// Persist a generated episode and archive the articles it consumed, as
    /// one transaction. Every article must still be `processed`; if any is
    /// not, the whole transaction rolls back and nothing is written.
    pub async fn commit_episode(
        &self,
        podcast: NewPodcast,
        article_ids: Vec<i64>,
    ) -> Result<Podcast> {
        let committed = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;

                tx.execute(
                    "INSERT INTO podcasts (title, transcript, audio_path) VALUES (?1, ?2, ?3)",
                    params![podcast.title, podcast.transcript, podcast.audio_path],
                )?;
                let podcast_id = tx.last_insert_rowid();

                for id in &article_ids {
                    let flipped = tx.execute(
                        "UPDATE articles SET status = 'archived' WHERE id = ?1 AND status = 'processed'",
                        params![id],
                    )?;
                    if flipped != 1 {
                        // Snapshot went stale under us; dropping the
                        // transaction rolls everything back.
                        return Ok(None);
                    }
                }

                let mut stmt = tx.prepare(
                    "SELECT id, title, transcript, audio_path, created_at FROM podcasts WHERE id = ?1",
                )?;
                let podcast = stmt.query_row(params![podcast_id], |row| Ok(podcast_from_row(row)))?;
                drop(stmt);

                tx.commit()?;
                Ok(Some(podcast))
            })
            .await?;

        committed.ok_or_else(|| {
            AppError::Other(anyhow::anyhow!(
                "article queue changed during generation; nothing was committed"
            ))
        })
    }

    pub async fn get_all_podcasts(&self) -> Result<Vec<Podcast>> {
        let podcasts = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, title, transcript, audio_path, created_at
                     FROM podcasts ORDER BY created_at DESC, id DESC",
                )?;
                let podcasts = stmt
                    .query_map([], |row| Ok(podcast_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(podcasts)
            })
            .await?;
        Ok(podcasts)
    }

    /// Delete an episode and return the deleted row so the caller can clean
    /// up the audio artifact.
    pub async fn delete_podcast(&self, id: i64) -> Result<Podcast> {
        let podcast = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let mut stmt = tx.prepare(
                    "SELECT id, title, transcript, audio_path, created_at FROM podcasts WHERE id = ?1",
                )?;
                let podcast = stmt
                    .query_row(params![id], |row| Ok(podcast_from_row(row)))
                    .optional()?;
                drop(stmt);

                if podcast.is_some() {
                    tx.execute("DELETE FROM podcasts WHERE id = ?1", params![id])?;
                }
                tx.commit()?;
                Ok(podcast)
            })
            .await?;
        podcast.ok_or_else(|| AppError::podcast_not_found(id))
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first (e.g., "2026-01-11T12:34:56+00:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Try SQLite datetime format (e.g., "2026-01-11 12:34:56")
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn article_from_row(row: &Row) -> Article {
    Article {
        id: row.get(0).unwrap(),
        url: row.get(1).unwrap(),
        title: row.get(2).unwrap(),
        content_raw: row.get(3).unwrap(),
        content_clean: row.get(4).unwrap(),
        source: row.get(5).unwrap(),
        status: row
            .get::<_, String>(6)
            .unwrap()
            .parse()
            .unwrap_or(ArticleStatus::Pending),
        created_at: row
            .get::<_, String>(7)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
    }
}

fn podcast_from_row(row: &Row) -> Podcast {
    Podcast {
        id: row.get(0).unwrap(),
        title: row.get(1).unwrap(),
        transcript: row.get(2).unwrap(),
        audio_path: row.get(3).unwrap(),
        created_at: row
            .get::<_, String>(4)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
    }
}
