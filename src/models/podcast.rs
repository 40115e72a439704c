use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A generated episode: the dialogue transcript plus the rendered audio
/// artifact it was voiced into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Podcast {
    pub id: i64,
    pub title: String,
    pub transcript: String,
    pub audio_path: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPodcast {
    pub title: String,
    pub transcript: String,
    pub audio_path: String,
}
