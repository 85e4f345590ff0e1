//! Command-line surface of the `blogsmith` binary.
//!
//! Flags only ever narrow the loaded configuration: `--sink` switches the
//! sink kind before validation, `--output` and `--no-excerpt` patch the
//! typed config afterwards.

use crate::pipeline::Stage;
use anyhow::{Result, bail};
use blogsmith_config::{BlogsmithConfig, BlogsmithConfigLoader, SinkConfig, default_config_path};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "blogsmith", version, about = "Write a blog post for an affiliate product URL")]
pub struct Cli {
    /// YAML config file. Defaults to ./blogsmith.yaml, then the user config dir.
    #[arg(long, global = true, env = "BLOGSMITH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Mirror logs to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the page, generate the post and hand it to the sink.
    Generate {
        url: String,
        #[arg(long, value_enum)]
        sink: Option<SinkKind>,
        /// Write the post to this file instead of stdout (display sink only).
        #[arg(long)]
        output: Option<PathBuf>,
        /// Leave the page paragraphs out of the instruction.
        #[arg(long)]
        no_excerpt: bool,
    },
    /// Print the instruction that would be sent to the model.
    Prompt {
        url: String,
        #[arg(long)]
        no_excerpt: bool,
    },
    /// Ask the configured model for a trivial reply.
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SinkKind {
    Display,
    Docs,
}

impl SinkKind {
    fn yaml(self) -> &'static str {
        match self {
            SinkKind::Display => "sink:\n  kind: display\n",
            SinkKind::Docs => "sink:\n  kind: docs\n",
        }
    }
}

impl Cli {
    /// `--config` if given, else the first default location that exists.
    pub fn load_config(&self) -> Result<BlogsmithConfig> {
        let mut loader = BlogsmithConfigLoader::new();
        match self.config.as_ref() {
            Some(path) => loader = loader.with_file(path),
            None => {
                if let Some(path) = default_config_path() {
                    loader = loader.with_optional_file(path);
                }
            }
        }
        self.load_with(loader)
    }

    /// Layer this invocation's flags over `loader` and load.
    pub fn load_with(&self, mut loader: BlogsmithConfigLoader) -> Result<BlogsmithConfig> {
        let (sink, output, no_excerpt) = match &self.command {
            Command::Generate {
                sink,
                output,
                no_excerpt,
                ..
            } => (*sink, output.as_ref(), *no_excerpt),
            Command::Prompt { no_excerpt, .. } => (None, None, *no_excerpt),
            Command::Check => (None, None, false),
        };

        if sink == Some(SinkKind::Docs) && output.is_some() {
            bail!("--output only applies to the display sink");
        }
        if let Some(kind) = sink {
            loader = loader.with_yaml_str(kind.yaml());
        }

        let mut cfg = loader.load()?;
        if let Some(path) = output {
            cfg.sink = SinkConfig::Display {
                output: Some(path.clone()),
            };
        }
        if no_excerpt {
            cfg.extract.body_paragraphs = 0;
        }
        Ok(cfg)
    }
}

/// Progress line shown when the pipeline enters `stage`.
pub fn stage_notice(stage: Stage, sink: &SinkConfig) -> Option<&'static str> {
    match (stage, sink) {
        (Stage::Generating, _) => Some("Generating blog content..."),
        (Stage::Storing, SinkConfig::Display { output: None }) => Some("Blog generated below:"),
        (Stage::Storing, SinkConfig::Display { output: Some(_) }) => {
            Some("Writing blog to file...")
        }
        (Stage::Storing, SinkConfig::Docs { .. }) => Some("Saving blog to Google Docs..."),
        _ => None,
    }
}
