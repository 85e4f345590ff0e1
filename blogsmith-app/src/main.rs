use blogsmith_app::{Pipeline, Stage};
use blogsmith_app::cli::{Cli, Command, stage_notice};
use blogsmith_common::observability::{LogConfig, init_logging};
use blogsmith_config::BlogsmithConfig;
use blogsmith_llm::build_llm_client;
use clap::Parser;
use std::process::ExitCode;

fn start_logging(cfg: &BlogsmithConfig, verbose: bool) {
    let log = LogConfig {
        app_name: "blogsmith",
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.stderr || verbose,
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
    };
    if let Err(e) = init_logging(log) {
        eprintln!("warning: logging disabled: {e:#}");
    }
}

async fn generate(cfg: &BlogsmithConfig, url: &str) -> ExitCode {
    let pipeline = match Pipeline::from_config(cfg) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(model = pipeline.model_name(), sink = pipeline.sink_name(), "blogsmith.ready");

    let mut notify = |stage: Stage| {
        if let Some(line) = stage_notice(stage, &cfg.sink) {
            eprintln!("{line}");
        }
    };
    match pipeline.run_with(url, &mut notify).await {
        Ok(post) => {
            if let Some(link) = post.outcome.reference() {
                println!("{link}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn preview(cfg: &BlogsmithConfig, url: &str) -> ExitCode {
    let pipeline = match Pipeline::from_config(cfg) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    match pipeline.preview(url).await {
        Ok(p) => {
            print!("{}", p.instruction);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn check(cfg: &BlogsmithConfig) -> ExitCode {
    let client = match build_llm_client(&cfg.llm) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    match client.health_check().await {
        Ok(true) => {
            println!("{}: ok", client.model_name());
            ExitCode::SUCCESS
        }
        Ok(false) => {
            eprintln!("{}: unreachable", client.model_name());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{}: {e}", client.model_name());
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Env overlay wins over the file.
    let cfg = match cli.load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    start_logging(&cfg, cli.verbose);

    match &cli.command {
        Command::Generate { url, .. } => generate(&cfg, url).await,
        Command::Prompt { url, .. } => preview(&cfg, url).await,
        Command::Check => check(&cfg).await,
    }
}
