mod scriptwriter;

pub use scriptwriter::{ClaudeScriptwriter, ScriptSynthesizer, SourceArticle};
