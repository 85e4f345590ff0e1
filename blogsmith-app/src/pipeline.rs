//! Fetch → extract → prompt → generate → publish, one URL at a time.
//!
//! Every stage fails fast; nothing is retried and no partial result escapes a
//! failed run.

use blogsmith_common::BlogsmithError;
use blogsmith_config::BlogsmithConfig;
use blogsmith_llm::blog::BlogGenerator;
use blogsmith_llm::{GenerationError, build_blog_generator, build_prompt};
use blogsmith_sink::{Sink, SinkOutcome, StoreError, build_sink};
use blogsmith_web::{ExtractError, Extractor, FetchError, Fetcher, ProductInfo};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Idle,
    Fetching,
    Extracting,
    Prompting,
    Generating,
    Storing,
    Done,
    Failed,
}

impl Stage {
    /// Successor on the happy path; `None` once terminal.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Idle => Some(Stage::Fetching),
            Stage::Fetching => Some(Stage::Extracting),
            Stage::Extracting => Some(Stage::Prompting),
            Stage::Prompting => Some(Stage::Generating),
            Stage::Generating => Some(Stage::Storing),
            Stage::Storing => Some(Stage::Done),
            Stage::Done | Stage::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }

    /// Forward one step, or to `Failed` from any live stage. No way back.
    pub fn can_transition_to(self, to: Stage) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == Stage::Failed || self.next() == Some(to)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Idle => "idle",
            Stage::Fetching => "fetching",
            Stage::Extracting => "extracting",
            Stage::Prompting => "prompting",
            Stage::Generating => "generating",
            Stage::Storing => "storing",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] BlogsmithError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// Stage that was active when the run failed.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Input(_) => Stage::Idle,
            PipelineError::Fetch(_) => Stage::Fetching,
            PipelineError::Extract(_) => Stage::Extracting,
            PipelineError::Generation(_) => Stage::Generating,
            PipelineError::Store(_) => Stage::Storing,
        }
    }

    /// Short notice for the user. Causes stay in the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            PipelineError::Input(_) => "Please enter a URL.",
            PipelineError::Fetch(FetchError::InvalidUrl { .. }) => {
                "That does not look like a product URL."
            }
            PipelineError::Fetch(_) => "Could not fetch the product page.",
            PipelineError::Extract(_) => "Could not extract product info.",
            PipelineError::Generation(_) => "Blog generation failed.",
            PipelineError::Store(_) => "Could not store the blog post.",
        }
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct BlogPost {
    pub run_id: Uuid,
    pub url: String,
    pub product: ProductInfo,
    pub html: String,
    pub outcome: SinkOutcome,
}

/// Output of the dry run: what would be sent to the model.
#[derive(Debug, Clone)]
pub struct PromptPreview {
    pub product: ProductInfo,
    pub instruction: String,
}

/// Per-invocation state tracker. Owns nothing shared.
struct Run<'a> {
    id: Uuid,
    stage: Stage,
    observer: &'a mut (dyn FnMut(Stage) + Send),
}

impl<'a> Run<'a> {
    fn start(observer: &'a mut (dyn FnMut(Stage) + Send)) -> Self {
        Self {
            id: Uuid::new_v4(),
            stage: Stage::Idle,
            observer,
        }
    }

    fn advance(&mut self, to: Stage) {
        debug_assert!(
            self.stage.can_transition_to(to),
            "illegal transition {} -> {}",
            self.stage,
            to
        );
        tracing::debug!(run_id=%self.id, from=%self.stage, to=%to, "pipeline.stage");
        self.stage = to;
        (self.observer)(to);
    }

    fn fail(&mut self, err: PipelineError) -> PipelineError {
        tracing::warn!(
            run_id=%self.id,
            stage=%err.stage(),
            error=%err,
            "pipeline.failed"
        );
        self.advance(Stage::Failed);
        err
    }
}

/// Reject blank input before any stage runs.
pub fn validate_url_input(raw: &str) -> Result<&str, BlogsmithError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BlogsmithError::Input("no URL supplied".into()));
    }
    Ok(trimmed)
}

pub struct Pipeline {
    fetcher: Fetcher,
    extractor: Extractor,
    generator: BlogGenerator,
    sink: Arc<dyn Sink>,
}

impl Pipeline {
    pub fn new(
        fetcher: Fetcher,
        extractor: Extractor,
        generator: BlogGenerator,
        sink: Arc<dyn Sink>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            generator,
            sink,
        }
    }

    /// Wire every stage from the loaded configuration.
    pub fn from_config(cfg: &BlogsmithConfig) -> Result<Self, BlogsmithError> {
        let fetcher = Fetcher::new(&cfg.fetch).map_err(|e| BlogsmithError::Config(e.to_string()))?;
        let extractor = Extractor::from_config(&cfg.extract);
        let generator = build_blog_generator(&cfg.llm)?;
        let sink = build_sink(&cfg.sink)?;
        Ok(Self::new(fetcher, extractor, generator, sink))
    }

    pub fn sink_name(&self) -> &'static str {
        self.sink.name()
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    pub async fn run(&self, url: &str) -> Result<BlogPost, PipelineError> {
        self.run_with(url, &mut |_: Stage| {}).await
    }

    /// Like [`Pipeline::run`], reporting each stage entered to `observer`.
    pub async fn run_with(
        &self,
        url: &str,
        observer: &mut (dyn FnMut(Stage) + Send),
    ) -> Result<BlogPost, PipelineError> {
        let mut run = Run::start(observer);
        tracing::info!(run_id=%run.id, url=%url, sink=self.sink.name(), "pipeline.start");

        let (url, product, instruction) = match self.prepare(&mut run, url).await {
            Ok(v) => v,
            Err(e) => return Err(run.fail(e)),
        };

        run.advance(Stage::Generating);
        let html = match self.generator.generate(&instruction).await {
            Ok(html) => html,
            Err(e) => return Err(run.fail(e.into())),
        };

        run.advance(Stage::Storing);
        let doc_title = format!("Blog: {}", product.title);
        let outcome = match self.sink.publish(&doc_title, &html).await {
            Ok(outcome) => outcome,
            Err(e) => return Err(run.fail(e.into())),
        };

        run.advance(Stage::Done);
        tracing::info!(
            run_id=%run.id,
            reference=?outcome.reference(),
            html_len=html.len(),
            "pipeline.done"
        );

        Ok(BlogPost {
            run_id: run.id,
            url,
            product,
            html,
            outcome,
        })
    }

    /// Fetch, extract and build the instruction without calling the model.
    pub async fn preview(&self, url: &str) -> Result<PromptPreview, PipelineError> {
        let mut noop = |_: Stage| {};
        let mut run = Run::start(&mut noop);
        match self.prepare(&mut run, url).await {
            Ok((_, product, instruction)) => Ok(PromptPreview {
                product,
                instruction,
            }),
            Err(e) => Err(run.fail(e)),
        }
    }

    async fn prepare(
        &self,
        run: &mut Run<'_>,
        raw_url: &str,
    ) -> Result<(String, ProductInfo, String), PipelineError> {
        let url = validate_url_input(raw_url)?.to_string();

        run.advance(Stage::Fetching);
        let page = self.fetcher.fetch(&url).await?;

        run.advance(Stage::Extracting);
        let product = self
            .extractor
            .extract_with_content_type(&page.body, page.content_type.as_deref())?;
        tracing::info!(
            run_id=%run.id,
            title=%product.title,
            has_excerpt=product.body_excerpt.is_some(),
            "pipeline.extracted"
        );

        run.advance(Stage::Prompting);
        let instruction = build_prompt(&product, &url);

        Ok((url, product, instruction))
    }
}
