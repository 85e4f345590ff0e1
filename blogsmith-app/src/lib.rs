//! Blogsmith orchestration: turns one affiliate product URL into a blog post.
//!
//! The [`pipeline::Pipeline`] drives each stage in order and stops at the
//! first failure. The `blogsmith` binary wraps it in the small [`cli`].

pub mod cli;
pub mod pipeline;

pub use pipeline::{BlogPost, Pipeline, PipelineError, PromptPreview, Stage, validate_url_input};
