use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::{AppError, Result};

const TTS_API_URL: &str = "https://api.openai.com/v1/audio/speech";
const TTS_MODEL: &str = "tts-1";

/// Voices a dialogue script into an audio artifact at `output_path`.
/// Failures surface as `AppError::Render`.
#[async_trait]
pub trait AudioRenderer: Send + Sync {
    async fn render(&self, script: &str, output_path: &Path) -> Result<PathBuf>;

    /// Extension of the artifacts this renderer produces.
    fn file_extension(&self) -> &'static str {
        "mp3"
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest {
    model: String,
    input: String,
    voice: String,
}

pub struct OpenAiTts {
    client: Client,
    api_key: String,
    voice: String,
}

impl OpenAiTts {
    pub fn new(api_key: String, voice: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            api_key,
            voice,
        }
    }
}

#[async_trait]
impl AudioRenderer for OpenAiTts {
    async fn render(&self, script: &str, output_path: &Path) -> Result<PathBuf> {
        let request = SpeechRequest {
            model: TTS_MODEL.to_string(),
            input: script.to_string(),
            voice: self.voice.clone(),
        };

        let response = self
            .client
            .post(TTS_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Render(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Render(format!("API error {}: {}", status, error_text)));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| AppError::Render(e.to_string()))?;

        tokio::fs::write(output_path, &audio)
            .await
            .map_err(|e| AppError::Render(format!("failed to write {}: {}", output_path.display(), e)))?;

        Ok(output_path.to_path_buf())
    }
}

/// Stand-in renderer for running without TTS credentials: writes the
/// transcript itself to the target path so the pipeline completes end to
/// end and the artifact is inspectable.
pub struct TranscriptFile;

#[async_trait]
impl AudioRenderer for TranscriptFile {
    async fn render(&self, script: &str, output_path: &Path) -> Result<PathBuf> {
        tokio::fs::write(output_path, script.as_bytes())
            .await
            .map_err(|e| AppError::Render(format!("failed to write {}: {}", output_path.display(), e)))?;
        Ok(output_path.to_path_buf())
    }

    // The artifact is plain text, and its name should say so.
    fn file_extension(&self) -> &'static str {
        "txt"
    }
}

/// Pick a path under `dir` based on `file_name` that does not exist yet,
/// suffixing `-2`, `-3`, ... before the extension on collision. A prior
/// episode is never overwritten.
pub fn unique_output_path(dir: &Path, file_name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return Ok(candidate);
    }

    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (file_name, None),
    };

    for n in 2.. {
        let name = match ext {
            Some(ext) => format!("{}-{}.{}", stem, n, ext),
            None => format!("{}-{}", stem, n),
        };
        let candidate = dir.join(name);
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
    unreachable!()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn unique_path_keeps_fresh_names() {
        let dir = TempDir::new().unwrap();
        let path = unique_output_path(dir.path(), "episode.mp3").unwrap();
        assert_eq!(path, dir.path().join("episode.mp3"));
    }

    #[test]
    fn unique_path_suffixes_on_collision() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("episode.mp3"), b"x").unwrap();
        let second = unique_output_path(dir.path(), "episode.mp3").unwrap();
        assert_eq!(second, dir.path().join("episode-2.mp3"));

        std::fs::write(&second, b"x").unwrap();
        let third = unique_output_path(dir.path(), "episode.mp3").unwrap();
        assert_eq!(third, dir.path().join("episode-3.mp3"));
    }

    #[test]
    fn renderers_declare_their_artifact_extension() {
        assert_eq!(TranscriptFile.file_extension(), "txt");
        assert_eq!(
            OpenAiTts::new("key".to_string(), "alloy".to_string()).file_extension(),
            "mp3"
        );
    }

    #[tokio::test]
    async fn transcript_renderer_writes_the_script() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("episode.mp3");
        let written = TranscriptFile.render("Alex: hi", &path).await.unwrap();
        assert_eq!(written, path);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Alex: hi");
    }
}
