use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::ai::{ClaudeScriptwriter, ScriptSynthesizer, SourceArticle};
use crate::config::Config;
use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::{Article, ArticleStatus, NewArticle, NewPodcast, Podcast};
use crate::services::{
    unique_output_path, AudioRenderer, ContentExtractor, HttpExtractor, OpenAiTts, TranscriptFile,
};

/// Owns the store and the three collaborators; every mutation of articles
/// and podcasts goes through here.
pub struct App {
    pub repository: Repository,
    extractor: Arc<dyn ContentExtractor>,
    synthesizer: Option<Arc<dyn ScriptSynthesizer>>,
    renderer: Arc<dyn AudioRenderer>,
    audio_dir: PathBuf,
    // One generation at a time: the store cannot protect the whole
    // read-synthesize-commit window on its own.
    generation_lock: Mutex<()>,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let repository = Repository::new(&config.db_path).await?;
        let extractor: Arc<dyn ContentExtractor> = Arc::new(HttpExtractor::new());

        let synthesizer = config
            .claude_api_key
            .as_ref()
            .map(|key| Arc::new(ClaudeScriptwriter::new(key.clone())) as Arc<dyn ScriptSynthesizer>);

        let renderer: Arc<dyn AudioRenderer> = match &config.tts_api_key {
            Some(key) => Arc::new(OpenAiTts::new(key.clone(), config.tts_voice.clone())),
            None => {
                tracing::debug!("no TTS API key configured, episodes will be transcript files");
                Arc::new(TranscriptFile)
            }
        };

        Ok(Self::with_services(
            repository,
            extractor,
            synthesizer,
            renderer,
            config.audio_dir.clone(),
        ))
    }

    /// Wire an App from explicit parts. This is the seam tests use to swap
    /// in mock collaborators.
    pub fn with_services(
        repository: Repository,
        extractor: Arc<dyn ContentExtractor>,
        synthesizer: Option<Arc<dyn ScriptSynthesizer>>,
        renderer: Arc<dyn AudioRenderer>,
        audio_dir: PathBuf,
    ) -> Self {
        Self {
            repository,
            extractor,
            synthesizer,
            renderer,
            audio_dir,
            generation_lock: Mutex::new(()),
        }
    }

    /// Ingest one URL into the reading queue. Re-submitting a known URL is
    /// a no-op that returns the existing record; a failed extraction
    /// rejects the URL without writing anything.
    pub async fn ingest(&self, url: &str, source: &str) -> Result<Article> {
        if let Some(existing) = self.repository.find_article_by_url(url).await? {
            tracing::debug!("already ingested {}, returning existing record", url);
            return Ok(existing);
        }

        let extracted = self.extractor.extract(url).await?;

        let article = self
            .repository
            .insert_article(NewArticle {
                url: url.to_string(),
                title: Some(extracted.title),
                content_raw: None,
                content_clean: Some(extracted.content),
                source: source.to_string(),
                status: ArticleStatus::Processed,
            })
            .await?;

        tracing::info!("ingested article {} from {}", article.id, url);
        Ok(article)
    }

    pub async fn list_articles(&self) -> Result<Vec<Article>> {
        self.repository.get_active_articles().await
    }

    pub async fn delete_article(&self, id: i64) -> Result<()> {
        self.repository.delete_article(id).await
    }

    /// Turn the whole processed queue into one episode. Reads the queue
    /// snapshot, drafts the script, renders audio, then commits the episode
    /// and the archival of exactly that snapshot in one transaction. Any
    /// stage failure before the commit leaves the stores untouched, so a
    /// retry reprocesses the same articles.
    pub async fn generate(&self) -> Result<Podcast> {
        let _guard = self.generation_lock.lock().await;

        let snapshot = self
            .repository
            .get_articles_by_status(ArticleStatus::Processed)
            .await?;
        if snapshot.is_empty() {
            return Err(AppError::NothingToProcess);
        }

        let synthesizer = self
            .synthesizer
            .as_ref()
            .ok_or_else(|| AppError::Synthesis("no Claude API key configured".to_string()))?;

        let sources: Vec<SourceArticle> = snapshot
            .iter()
            .map(|a| SourceArticle {
                title: a.title.clone().unwrap_or_else(|| a.url.clone()),
                content: a.content_clean.clone().unwrap_or_default(),
            })
            .collect();

        tracing::info!("generating episode from {} articles", snapshot.len());
        let script = synthesizer.synthesize(&sources).await?;

        let file_name = format!(
            "episode-{}.{}",
            Utc::now().format("%Y%m%d-%H%M%S"),
            self.renderer.file_extension()
        );
        let output_path = unique_output_path(&self.audio_dir, &file_name)
            .map_err(|e| AppError::Render(e.to_string()))?;
        let audio_path = self.renderer.render(&script, &output_path).await?;

        let article_ids: Vec<i64> = snapshot.iter().map(|a| a.id).collect();
        let podcast = self
            .repository
            .commit_episode(
                NewPodcast {
                    title: format!("ReadCast Episode: {} articles", snapshot.len()),
                    transcript: script,
                    audio_path: audio_path.to_string_lossy().to_string(),
                },
                article_ids,
            )
            .await?;

        tracing::info!("generated podcast {} at {}", podcast.id, podcast.audio_path);
        Ok(podcast)
    }

    pub async fn list_podcasts(&self) -> Result<Vec<Podcast>> {
        self.repository.get_all_podcasts().await
    }

    /// Delete an episode record and its audio artifact. The record is the
    /// source of truth; a missing artifact only warrants a warning.
    pub async fn delete_podcast(&self, id: i64) -> Result<Podcast> {
        let podcast = self.repository.delete_podcast(id).await?;

        if let Err(e) = tokio::fs::remove_file(&podcast.audio_path).await {
            tracing::warn!("could not remove audio file {}: {}", podcast.audio_path, e);
        }

        Ok(podcast)
    }
}
