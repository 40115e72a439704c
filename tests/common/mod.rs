#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use readcast::ai::{ScriptSynthesizer, SourceArticle};
use readcast::db::Repository;
use readcast::error::{AppError, Result};
use readcast::services::{AudioRenderer, ContentExtractor, ExtractedContent};
use readcast::App;

/// Extractor backed by a fixed url -> page map; unknown URLs fail the way
/// a dead link would.
pub struct FakeExtractor {
    pages: HashMap<String, (String, String)>,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
        }
    }

    pub fn page(mut self, url: &str, title: &str, content: &str) -> Self {
        self.pages
            .insert(url.to_string(), (title.to_string(), content.to_string()));
        self
    }
}

#[async_trait]
impl ContentExtractor for FakeExtractor {
    async fn extract(&self, url: &str) -> Result<ExtractedContent> {
        match self.pages.get(url) {
            Some((title, content)) => Ok(ExtractedContent {
                title: title.clone(),
                content: content.clone(),
            }),
            None => Err(AppError::Extraction(format!("connection refused: {}", url))),
        }
    }
}

pub struct CannedSynthesizer {
    pub script: String,
}

#[async_trait]
impl ScriptSynthesizer for CannedSynthesizer {
    async fn synthesize(&self, _articles: &[SourceArticle]) -> Result<String> {
        Ok(self.script.clone())
    }
}

pub struct FailingSynthesizer;

#[async_trait]
impl ScriptSynthesizer for FailingSynthesizer {
    async fn synthesize(&self, _articles: &[SourceArticle]) -> Result<String> {
        Err(AppError::Synthesis("upstream model unavailable".to_string()))
    }
}

pub struct FailingRenderer;

#[async_trait]
impl AudioRenderer for FailingRenderer {
    async fn render(&self, _script: &str, _output_path: &std::path::Path) -> Result<PathBuf> {
        Err(AppError::Render("renderer down".to_string()))
    }
}

/// App wired against a throwaway database and audio directory.
pub struct TestApp {
    pub app: App,
    // Held so the temp dir outlives the App.
    pub dir: TempDir,
}

impl TestApp {
    pub fn audio_dir(&self) -> PathBuf {
        self.dir.path().join("audio")
    }
}

pub async fn app_with(
    extractor: Arc<dyn ContentExtractor>,
    synthesizer: Option<Arc<dyn ScriptSynthesizer>>,
    renderer: Arc<dyn AudioRenderer>,
) -> TestApp {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("readcast.db");
    let repository = Repository::new(db_path.to_str().unwrap()).await.unwrap();
    let audio_dir = dir.path().join("audio");

    let app = App::with_services(repository, extractor, synthesizer, renderer, audio_dir);
    TestApp { app, dir }
}
