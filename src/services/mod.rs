mod extractor;
mod renderer;

pub use extractor::{ContentExtractor, ExtractedContent, HttpExtractor};
pub use renderer::{unique_output_path, AudioRenderer, OpenAiTts, TranscriptFile};
