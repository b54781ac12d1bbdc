use std::path::PathBuf;
use std::time::Duration;

use chatlens_core::application::AnalysisService;
use chatlens_core::config::{AppConfig, TranslationConfig};
use chatlens_core::domain::{ParticipantFilter, ALL_MEMBERS};
use chatlens_core::language::{TokenNormalizer, WhatlangClassifier};
use chatlens_core::ports::{ReportWriter, Translator};
use chatlens_core::{ChatError, Result};
use clap::Parser;
use file_adapter::{FileStopwordSource, FileTranscriptSource};
use markdown_adapter::MarkdownWriterAdapter;
use tracing::info;
use translate_adapter::HttpTranslator;

mod logging;

/// Analyzes an exported chat transcript and writes an insights report
#[derive(Parser, Debug)]
#[command(name = "chatlens")]
#[command(about = "Derives activity statistics and a word cloud from an exported chat transcript")]
struct Cli {
    /// Path to the exported transcript (.txt)
    #[arg(short = 'i', long = "input", required = true)]
    input: PathBuf,

    /// Folder where the report files will be written
    #[arg(short = 'o', long = "output-dir", default_value = "reports")]
    output_dir: PathBuf,

    /// Participant to analyze
    #[arg(short = 'm', long = "member", default_value = ALL_MEMBERS)]
    member: String,

    /// Print the participant list and exit
    #[arg(long = "list-members")]
    list_members: bool,

    /// Configuration file (defaults to ./chatlens.toml when present)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Transliterated stopword list, overrides the configured path
    #[arg(long = "stopwords")]
    stopwords: Option<PathBuf>,

    /// Number of words kept in the vocabulary table
    #[arg(long = "limit")]
    limit: Option<usize>,

    /// Skip translation of vocabulary tokens
    #[arg(long = "offline")]
    offline: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level")]
    log_level: Option<String>,
}

fn build_normalizer(config: &TranslationConfig) -> Result<TokenNormalizer> {
    let policy = config.policy()?;
    let translator: Option<Box<dyn Translator>> = if config.enabled {
        Some(Box::new(HttpTranslator::new(
            config.endpoint.clone(),
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )?))
    } else {
        None
    };
    Ok(TokenNormalizer::new(Box::new(WhatlangClassifier), translator, policy))
}

fn run(cli: &Cli) -> Result<()> {
    let (mut config, source) = AppConfig::load(cli.config.as_deref())?;
    if let Some(path) = &cli.stopwords {
        config.stopwords.path = path.clone();
    }
    if let Some(limit) = cli.limit {
        config.report.vocabulary_limit = limit;
    }
    if cli.offline {
        config.translation.enabled = false;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    let _guard = logging::init_logging(&config.logging)?;
    info!("Configuration loaded from {}", source);

    // Instantiate concrete implementations of secondary adapters
    let stopwords = FileStopwordSource::new(&config.stopwords.path);
    let report_writer: Box<dyn ReportWriter> =
        Box::new(MarkdownWriterAdapter::new(&cli.output_dir));

    // Instantiate the core service with dependency injection
    let service = AnalysisService::new(
        &stopwords,
        build_normalizer(&config.translation)?,
        report_writer,
        config.report.vocabulary_limit,
    )?;

    let session = service.load_session(&FileTranscriptSource::new(&cli.input))?;

    if cli.list_members {
        for participant in session.participants() {
            println!("{}", participant);
        }
        return Ok(());
    }

    let filter = ParticipantFilter::from_selection(&cli.member);
    if let ParticipantFilter::Member(name) = &filter {
        if !session.participants().contains(name) {
            return Err(ChatError::Config(format!(
                "{:?} is not a participant of this chat (try --list-members)",
                name
            )));
        }
    }

    info!("Analyzing {} messages for {}", session.len(), filter.label());
    let report = service.execute_analysis(&session, &filter)?;
    println!(
        "Analyzed {} messages for {}; report written to {}",
        report.insights.total_messages,
        report.member,
        cli.output_dir.display()
    );
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error during analysis: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["chatlens", "-i", "chat.txt"]);
        assert_eq!(cli.input, PathBuf::from("chat.txt"));
        assert_eq!(cli.output_dir, PathBuf::from("reports"));
        assert_eq!(cli.member, ALL_MEMBERS);
        assert!(!cli.offline);
        assert!(!cli.list_members);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "chatlens", "-i", "chat.txt", "-m", "Alice", "--limit", "25", "--offline",
        ]);
        assert_eq!(cli.member, "Alice");
        assert_eq!(cli.limit, Some(25));
        assert!(cli.offline);
    }

    #[test]
    fn test_build_normalizer_offline() {
        let config = TranslationConfig {
            enabled: false,
            ..TranslationConfig::default()
        };
        let normalizer = build_normalizer(&config).unwrap();
        assert_eq!(normalizer.normalize_token("شکریہ"), "شکریہ");
    }
}
