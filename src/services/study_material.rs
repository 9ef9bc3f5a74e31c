use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    config::Config,
    constants::prompts,
    models::domain::{ContentType, Difficulty},
    services::{
        content_generator::ContentGenerator,
        http_helpers::{build_client, SourceError},
        text_helpers::clean_html,
    },
};

/// Extracts shorter than this are replaced by a search snippet when one exists.
const SEARCH_FALLBACK_CHARS: usize = 200;
/// An extract must reach this length to be forwarded to the model.
const USABLE_EXTRACT_CHARS: usize = 100;
const SYNTHESIS_TOKENS: u32 = 3000;

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub title: String,
    pub extract: String,
    pub url: Option<String>,
    pub origin: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EncyclopediaSource: Send + Sync {
    /// Page summary for an exact title. `None` when there is no such page.
    async fn summary(&self, title: &str) -> Result<Option<Article>, SourceError>;

    /// Best full-text search hit, with its snippet as the extract.
    async fn search(&self, query: &str) -> Result<Option<Article>, SourceError>;
}

#[derive(Debug, Default, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    title: String,
    #[serde(default)]
    extract: String,
    #[serde(default)]
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    desktop: Option<PageUrl>,
}

#[derive(Debug, Deserialize)]
struct PageUrl {
    page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    pages: Vec<SearchPage>,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    key: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    excerpt: String,
}

pub struct WikipediaClient {
    client: reqwest::Client,
    summary_url: String,
    search_url: String,
}

impl WikipediaClient {
    pub fn new(summary_url: &str, search_url: &str, timeout_secs: u64) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            summary_url: summary_url.to_string(),
            search_url: search_url.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        Self::new(
            &config.wikipedia_summary_url,
            &config.wikipedia_search_url,
            config.http_timeout_secs,
        )
    }

    /// The title becomes a single percent-encoded path segment.
    fn summary_endpoint(&self, title: &str) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.summary_url)
            .map_err(|_| SourceError::InvalidUrl(self.summary_url.clone()))?;
        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidUrl(self.summary_url.clone()))?
            .pop_if_empty()
            .push(title);
        Ok(url)
    }

    fn page_url(&self, key: &str) -> Option<String> {
        let mut url = Url::parse(&self.summary_url).ok()?;
        url.set_path("/wiki/");
        url.path_segments_mut().ok()?.pop_if_empty().push(key);
        Some(url.to_string())
    }
}

#[async_trait]
impl EncyclopediaSource for WikipediaClient {
    async fn summary(&self, title: &str) -> Result<Option<Article>, SourceError> {
        let response = self.client.get(self.summary_endpoint(title)?).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let summary: SummaryResponse = response.error_for_status()?.json().await?;
        let url = summary
            .content_urls
            .and_then(|urls| urls.desktop)
            .and_then(|desktop| desktop.page);

        Ok(Some(Article {
            title: if summary.title.is_empty() {
                title.to_string()
            } else {
                summary.title
            },
            extract: summary.extract,
            url,
            origin: "Wikipedia".to_string(),
        }))
    }

    async fn search(&self, query: &str) -> Result<Option<Article>, SourceError> {
        let response: SearchResponse = self
            .client
            .get(&self.search_url)
            .query(&[("q", query), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.pages.into_iter().next().map(|page| Article {
            url: self.page_url(&page.key),
            title: page.title,
            extract: page.excerpt,
            origin: "Wikipedia".to_string(),
        }))
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Fetches encyclopedia excerpts for a topic and has the generator synthesise
/// them into study material, falling back to plain generation.
pub struct StudyMaterialResolver {
    encyclopedia: Arc<dyn EncyclopediaSource>,
    generator: Option<Arc<ContentGenerator>>,
}

impl StudyMaterialResolver {
    pub fn new(
        encyclopedia: Arc<dyn EncyclopediaSource>,
        generator: Option<Arc<ContentGenerator>>,
    ) -> Self {
        Self {
            encyclopedia,
            generator,
        }
    }

    async fn fetch_article(&self, query: &str) -> Option<Article> {
        let mut article = match self.encyclopedia.summary(query).await {
            Ok(Some(article)) => article,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Encyclopedia summary for '{}' failed: {}", query, e);
                return None;
            }
        };
        article.extract = clean_html(&article.extract);

        if char_len(&article.extract) < SEARCH_FALLBACK_CHARS {
            match self.encyclopedia.search(query).await {
                Ok(Some(hit)) => {
                    let snippet = clean_html(&hit.extract);
                    if !snippet.is_empty() {
                        article.extract = snippet;
                        article.title = hit.title;
                    }
                }
                Ok(None) => {}
                Err(e) => log::warn!("Encyclopedia search for '{}' failed: {}", query, e),
            }
        }

        (!article.extract.is_empty()).then_some(article)
    }

    /// Usable excerpts for the topic: the exact title, else the first
    /// alternative phrasing with a long enough extract.
    pub async fn gather_sources(&self, topic: &str) -> Vec<Article> {
        if let Some(primary) = self.fetch_article(topic).await {
            if char_len(&primary.extract) >= USABLE_EXTRACT_CHARS {
                return vec![primary];
            }
        }

        let alternatives = [
            format!("{} explanation", topic),
            format!("{} definition", topic),
            format!("what is {}", topic),
        ];

        for query in alternatives {
            if let Some(article) = self.fetch_article(&query).await {
                if char_len(&article.extract) > USABLE_EXTRACT_CHARS {
                    return vec![article];
                }
            }
        }

        Vec::new()
    }

    pub async fn compile(
        &self,
        topic: &str,
        content_type: ContentType,
        difficulty: Difficulty,
        language: &str,
    ) -> Value {
        let sources = self.gather_sources(topic).await;

        let Some(generator) = &self.generator else {
            return json!({
                "type": content_type.as_str(),
                "topic": topic,
                "content": format!("Study material about {} (internet sources unavailable)", topic),
                "difficulty": difficulty,
                "sources": [],
                "generated_from_internet": false,
            });
        };

        if sources.is_empty() {
            log::info!("No usable internet sources for '{}'; generating directly", topic);
            let mut payload = generator
                .generate(topic, content_type, difficulty, language)
                .await;
            payload["sources"] = json!([]);
            payload["generated_from_internet"] = json!(false);
            return payload;
        }

        let mut prompt =
            prompts::study_material_prompt(topic, content_type, difficulty, &sources_text(&sources));
        if let Some(instruction) = prompts::language_instruction(language) {
            prompt.push_str("\n\n");
            prompt.push_str(&instruction);
        }

        let content = generator.complete_raw(&prompt, SYNTHESIS_TOKENS).await;
        let urls: Vec<&str> = sources.iter().filter_map(|s| s.url.as_deref()).collect();

        json!({
            "type": content_type.as_str(),
            "topic": topic,
            "content": content,
            "difficulty": difficulty,
            "sources": urls,
            "generated_from_internet": true,
        })
    }
}

fn sources_text(sources: &[Article]) -> String {
    let mut text = String::new();
    for source in sources {
        text.push_str(&format!("\n\nSource: {} ({})\n", source.title, source.origin));
        text.push_str(&source.extract);
        text.push('\n');
        if let Some(url) = &source.url {
            text.push_str(&format!("Reference: {}\n", url));
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::completion::MockTextCompletion;

    fn article(title: &str, extract: &str) -> Article {
        Article {
            title: title.to_string(),
            extract: extract.to_string(),
            url: Some(format!("https://en.wikipedia.org/wiki/{}", title)),
            origin: "Wikipedia".to_string(),
        }
    }

    fn long_text(prefix: &str) -> String {
        format!("{} {}", prefix, "lorem ipsum ".repeat(30))
    }

    fn echoing_generator() -> Arc<ContentGenerator> {
        let mut completion = MockTextCompletion::new();
        completion
            .expect_complete()
            .returning(|request| Ok(format!("SYNTHESIS OF: {}", request.prompt)));
        Arc::new(ContentGenerator::new(Arc::new(completion)))
    }

    #[tokio::test]
    async fn long_summary_is_synthesised_with_sources() {
        let mut encyclopedia = MockEncyclopediaSource::new();
        encyclopedia
            .expect_summary()
            .returning(|title| Ok(Some(article(title, &long_text("<b>Photosynthesis</b> converts light")))));
        encyclopedia.expect_search().never();

        let resolver = StudyMaterialResolver::new(Arc::new(encyclopedia), Some(echoing_generator()));
        let payload = resolver
            .compile("Photosynthesis", ContentType::Notes, Difficulty::Medium, "en")
            .await;

        assert_eq!(payload["generated_from_internet"], true);
        assert_eq!(payload["type"], "notes");
        assert_eq!(
            payload["sources"],
            json!(["https://en.wikipedia.org/wiki/Photosynthesis"])
        );

        let content = payload["content"].as_str().unwrap();
        assert!(content.contains("Source: Photosynthesis (Wikipedia)"));
        assert!(content.contains("Photosynthesis converts light"));
        assert!(!content.contains("<b>"));
    }

    #[tokio::test]
    async fn short_summary_is_replaced_by_search_snippet() {
        let mut encyclopedia = MockEncyclopediaSource::new();
        encyclopedia
            .expect_summary()
            .returning(|title| Ok(Some(article(title, "Too short."))));
        encyclopedia.expect_search().times(1).returning(|_| {
            Ok(Some(article(
                "Mitochondrion",
                &long_text("The <span class=\"searchmatch\">mitochondrion</span> is an organelle"),
            )))
        });

        let resolver = StudyMaterialResolver::new(Arc::new(encyclopedia), None);
        let sources = resolver.gather_sources("mitochondria").await;

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title, "Mitochondrion");
        assert!(sources[0].extract.starts_with("The mitochondrion is an organelle"));
    }

    #[tokio::test]
    async fn alternative_queries_are_tried_in_order() {
        let mut encyclopedia = MockEncyclopediaSource::new();
        encyclopedia.expect_summary().returning(|title| {
            if title == "Entropy definition" {
                Ok(Some(article(title, &long_text("Entropy measures disorder"))))
            } else {
                Ok(None)
            }
        });

        let resolver = StudyMaterialResolver::new(Arc::new(encyclopedia), None);
        let sources = resolver.gather_sources("Entropy").await;

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title, "Entropy definition");
    }

    #[tokio::test]
    async fn short_sources_everywhere_mean_no_internet_provenance() {
        let mut encyclopedia = MockEncyclopediaSource::new();
        encyclopedia
            .expect_summary()
            .times(4)
            .returning(|title| Ok(Some(article(title, "Only a stub."))));
        encyclopedia.expect_search().times(4).returning(|_| Ok(None));

        let resolver =
            StudyMaterialResolver::new(Arc::new(encyclopedia), Some(Arc::new(ContentGenerator::mock())));
        let payload = resolver
            .compile("Obscure topic", ContentType::Summary, Difficulty::Easy, "en")
            .await;

        assert_eq!(payload["generated_from_internet"], false);
        assert_eq!(payload["sources"], json!([]));
        assert_eq!(payload["type"], "summary");
        assert!(payload["content"].is_string());
    }

    #[tokio::test]
    async fn fetch_errors_fall_back_to_static_text_without_generator() {
        let mut encyclopedia = MockEncyclopediaSource::new();
        encyclopedia
            .expect_summary()
            .returning(|_| Err(SourceError::InvalidUrl("offline".to_string())));

        let resolver = StudyMaterialResolver::new(Arc::new(encyclopedia), None);
        let payload = resolver
            .compile("Tides", ContentType::Notes, Difficulty::Medium, "en")
            .await;

        assert_eq!(
            payload["content"],
            "Study material about Tides (internet sources unavailable)"
        );
        assert_eq!(payload["generated_from_internet"], false);
    }

    #[tokio::test]
    async fn language_instruction_reaches_synthesis_prompt() {
        let mut encyclopedia = MockEncyclopediaSource::new();
        encyclopedia
            .expect_summary()
            .returning(|title| Ok(Some(article(title, &long_text("Gravity attracts mass")))));

        let resolver = StudyMaterialResolver::new(Arc::new(encyclopedia), Some(echoing_generator()));
        let payload = resolver
            .compile("Gravity", ContentType::VideoScript, Difficulty::Hard, "de")
            .await;

        let content = payload["content"].as_str().unwrap();
        assert!(content.starts_with("SYNTHESIS OF: Create video script on 'Gravity'"));
        assert!(content.ends_with("Translate the content to de."));
    }

    #[test]
    fn summary_endpoint_encodes_title() {
        let client = WikipediaClient::new(
            "https://en.wikipedia.org/api/rest_v1/page/summary/",
            "https://en.wikipedia.org/w/rest.php/v1/search/page",
            10,
        )
        .unwrap();

        let url = client.summary_endpoint("what is C/C++").unwrap();
        assert_eq!(
            url.as_str(),
            "https://en.wikipedia.org/api/rest_v1/page/summary/what%20is%20C%2FC++"
        );
        assert_eq!(
            client.page_url("Rust_(programming_language)").as_deref(),
            Some("https://en.wikipedia.org/wiki/Rust_(programming_language)")
        );
    }
}
