mod article;
mod podcast;

pub use article::{Article, ArticleStatus, NewArticle};
pub use podcast::{NewPodcast, Podcast};
