use std::collections::HashSet;

use tracing::{info, instrument};

use crate::aggregator::{filter_records, gather_insights, top_words};
use crate::domain::{
    AnalysisReport, EnrichedRecord, Insights, ParticipantFilter, VocabularyEntry, ALL_MEMBERS,
};
use crate::features::enrich_all;
use crate::language::TokenNormalizer;
use crate::parser::parse_transcript;
use crate::ports::{ReportWriter, Result, StopwordSource, TranscriptSource};
use crate::tokenizer::Tokenizer;

/// One parsed transcript and everything derived from it.
///
/// Owned by the caller; starting a new session leaves this one untouched, and
/// dropping it releases the records.
#[derive(Debug, Clone)]
pub struct Session {
    records: Vec<EnrichedRecord>,
    participants: Vec<String>,
}

impl Session {
    fn new(records: Vec<EnrichedRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut participants = vec![ALL_MEMBERS.to_string()];
        for record in &records {
            if seen.insert(record.author()) {
                participants.push(record.author().to_string());
            }
        }
        Self {
            records,
            participants,
        }
    }

    pub fn records(&self) -> &[EnrichedRecord] {
        &self.records
    }

    /// Distinct authors in order of first appearance, "All members" first.
    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn discard(self) {}
}

/// Application service for analysing chat transcripts
pub struct AnalysisService {
    tokenizer: Tokenizer,
    normalizer: TokenNormalizer,
    report_writer: Box<dyn ReportWriter>,
    vocabulary_limit: usize,
}

impl AnalysisService {
    /// Creates the service. Stopwords are loaded here, so a missing resource
    /// fails before any transcript is touched.
    pub fn new(
        stopwords: &dyn StopwordSource,
        normalizer: TokenNormalizer,
        report_writer: Box<dyn ReportWriter>,
        vocabulary_limit: usize,
    ) -> Result<Self> {
        Ok(Self {
            tokenizer: Tokenizer::from_source(stopwords)?,
            normalizer,
            report_writer,
            vocabulary_limit,
        })
    }

    #[instrument(skip_all)]
    pub fn start_session(&self, transcript: &str) -> Result<Session> {
        let records = enrich_all(parse_transcript(transcript)?);
        let session = Session::new(records);
        info!(
            "Session started: {} messages from {} participants",
            session.len(),
            session.participants().len() - 1
        );
        Ok(session)
    }

    pub fn load_session(&self, source: &dyn TranscriptSource) -> Result<Session> {
        let transcript = source.read_transcript()?;
        self.start_session(&transcript)
    }

    pub fn gather_insights(&self, session: &Session, filter: &ParticipantFilter) -> Insights {
        gather_insights(session.records(), filter)
    }

    /// Most frequent normalized words of the selected messages.
    #[instrument(skip(self, session))]
    pub fn vocabulary(
        &self,
        session: &Session,
        filter: &ParticipantFilter,
        limit: usize,
    ) -> Vec<VocabularyEntry> {
        let tokens: Vec<String> = filter_records(session.records(), filter)
            .into_iter()
            .flat_map(|record| self.tokenizer.tokenize(record.body()))
            .collect();
        info!("Normalizing {} tokens", tokens.len());
        let words = self.normalizer.normalize_all(tokens);
        top_words(&words, limit)
    }

    pub fn build_report(&self, session: &Session, filter: &ParticipantFilter) -> AnalysisReport {
        AnalysisReport {
            member: filter.label().to_string(),
            participants: session.participants().to_vec(),
            insights: self.gather_insights(session, filter),
            vocabulary: self.vocabulary(session, filter, self.vocabulary_limit),
        }
    }

    /// Builds the report for `filter` and hands it to the report writer.
    pub fn execute_analysis(
        &self,
        session: &Session,
        filter: &ParticipantFilter,
    ) -> Result<AnalysisReport> {
        let report = self.build_report(session, filter);
        self.report_writer.write(&report)?;
        Ok(report)
    }
}
