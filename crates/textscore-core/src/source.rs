use crate::error::FetchError;
use crate::types::FetchedArticle;

/// Trait that each article source must implement.
pub trait ArticleSource: Send + Sync {
    /// Short name for logs (e.g., "http", "cache")
    fn name(&self) -> &'static str;

    /// Retrieve the title and main text of the article at `url`.
    fn fetch(&self, url: &str) -> Result<FetchedArticle, FetchError>;
}

impl<S: ArticleSource + ?Sized> ArticleSource for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn fetch(&self, url: &str) -> Result<FetchedArticle, FetchError> {
        (**self).fetch(url)
    }
}
