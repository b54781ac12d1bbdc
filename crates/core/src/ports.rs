use crate::domain::AnalysisReport;
pub use crate::error::Result;

/// Supplies the raw transcript text for one session.
pub trait TranscriptSource {
    fn read_transcript(&self) -> Result<String>;
}

/// Supplies the transliterated stopword list that complements the English one.
pub trait StopwordSource {
    fn load_stopwords(&self) -> Result<Vec<String>>;
}

/// External translation capability, invoked per token.
/// `source` and `target` are ISO 639-1 language codes.
pub trait Translator {
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;
}

/// Trait for writing the analysis report
/// This is a port (interface) that defines how the core communicates with output adapters
pub trait ReportWriter: Send + Sync {
    fn write(&self, report: &AnalysisReport) -> Result<()>;
}
