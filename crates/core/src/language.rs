//! Language classification and best-effort translation of vocabulary tokens.

use std::cell::Cell;
use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};
use whatlang::Lang;

use crate::error::Result;
use crate::ports::Translator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Confident(Lang),
    Unknown,
}

pub trait LanguageClassifier {
    fn classify(&self, token: &str) -> Classification;
}

/// Letters of the Urdu alphabet that Arabic and Persian do not use.
const URDU_ONLY_LETTERS: [char; 7] = ['ے', 'ں', 'ٹ', 'ڈ', 'ڑ', 'ھ', 'ہ'];

/// Trigram-based classifier backed by `whatlang`.
///
/// Single tokens give trigram detection very little to work with: common Urdu
/// words such as `بہت` or `پاکستان` come back as Arabic, and `محبت` as Persian.
/// Arabic or Persian hits that contain an Urdu-only letter are reported as
/// Urdu; the rest keep whatlang's answer and are not translated.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhatlangClassifier;

impl LanguageClassifier for WhatlangClassifier {
    fn classify(&self, token: &str) -> Classification {
        match whatlang::detect(token) {
            Some(info) => Classification::Confident(refine_urdu(info.lang(), token)),
            None => Classification::Unknown,
        }
    }
}

fn refine_urdu(lang: Lang, token: &str) -> Lang {
    match lang {
        Lang::Ara | Lang::Pes if token.contains(URDU_ONLY_LETTERS) => Lang::Urd,
        other => other,
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 250,
            max_backoff_ms: 2_000,
        }
    }
}

impl RetryPolicy {
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    fn delay(&self, attempt: u32) -> Duration {
        let exponent = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(
            self.initial_backoff_ms
                .saturating_mul(exponent)
                .min(self.max_backoff_ms),
        )
    }
}

/// Runs `op` until it succeeds or `policy.max_attempts` is used up, returning
/// the last error. `op` receives the 1-based attempt number.
pub fn retry<T, F>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Result<T>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts => {
                let delay = policy.delay(attempt);
                debug!("attempt {}/{} failed: {} (sleep {:?})", attempt, attempts, err, delay);
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Which tokens get translated, and into what.
#[derive(Debug, Clone)]
pub struct TranslationPolicy {
    pub detect: Lang,
    pub source_code: String,
    pub target_code: String,
    pub retry: RetryPolicy,
    /// Translation is switched off for the rest of the run once this many
    /// tokens in a row have exhausted their retries. Zero never switches off.
    pub max_consecutive_failures: u32,
}

impl Default for TranslationPolicy {
    fn default() -> Self {
        Self {
            detect: Lang::Urd,
            source_code: "ur".to_string(),
            target_code: "en".to_string(),
            retry: RetryPolicy::default(),
            max_consecutive_failures: 3,
        }
    }
}

pub struct TokenNormalizer {
    classifier: Box<dyn LanguageClassifier>,
    translator: Option<Box<dyn Translator>>,
    policy: TranslationPolicy,
    consecutive_failures: Cell<u32>,
}

impl TokenNormalizer {
    pub fn new(
        classifier: Box<dyn LanguageClassifier>,
        translator: Option<Box<dyn Translator>>,
        policy: TranslationPolicy,
    ) -> Self {
        Self {
            classifier,
            translator,
            policy,
            consecutive_failures: Cell::new(0),
        }
    }

    /// A normalizer that never translates.
    pub fn passthrough() -> Self {
        Self::new(Box::new(WhatlangClassifier), None, TranslationPolicy::default())
    }

    pub fn is_designated(&self, token: &str) -> bool {
        match self.classifier.classify(token) {
            Classification::Confident(lang) => lang == self.policy.detect,
            Classification::Unknown => false,
        }
    }

    /// Translates `token` when it is classified as the designated language.
    /// Falls back to the token itself when translation is off or keeps failing.
    pub fn normalize_token(&self, token: &str) -> String {
        let Some(translator) = self.translator.as_deref() else {
            return token.to_string();
        };
        if self.translation_given_up() || !self.is_designated(token) {
            return token.to_string();
        }

        let translated = retry(&self.policy.retry, |_| {
            translator.translate(token, &self.policy.source_code, &self.policy.target_code)
        });
        match translated {
            Ok(text) => {
                self.consecutive_failures.set(0);
                if text.trim().is_empty() {
                    return token.to_string();
                }
                debug!("translated {:?} -> {:?}", token, text);
                text.trim().to_string()
            }
            Err(err) => {
                warn!("keeping untranslated token {:?}: {}", token, err);
                let failures = self.consecutive_failures.get() + 1;
                self.consecutive_failures.set(failures);
                if failures == self.policy.max_consecutive_failures {
                    warn!(
                        "{} tokens in a row failed to translate, skipping translation for the rest of this run",
                        failures
                    );
                }
                token.to_string()
            }
        }
    }

    /// True once translation has been switched off after repeated failures.
    pub fn translation_given_up(&self) -> bool {
        let limit = self.policy.max_consecutive_failures;
        limit > 0 && self.consecutive_failures.get() >= limit
    }

    /// Normalizes a token stream, translating each distinct token once.
    pub fn normalize_all(&self, tokens: Vec<String>) -> Vec<String> {
        let mut memo: HashMap<String, String> = HashMap::new();
        tokens
            .into_iter()
            .map(|token| {
                memo.entry(token)
                    .or_insert_with_key(|t| self.normalize_token(t))
                    .clone()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;
    use std::rc::Rc;

    struct FixedClassifier(Vec<(&'static str, Lang)>);

    impl LanguageClassifier for FixedClassifier {
        fn classify(&self, token: &str) -> Classification {
            self.0
                .iter()
                .find(|(t, _)| *t == token)
                .map_or(Classification::Unknown, |(_, lang)| Classification::Confident(*lang))
        }
    }

    /// Fails `failures` times, then answers with `reply`.
    struct FlakyTranslator {
        failures: u32,
        reply: &'static str,
        calls: Rc<Cell<u32>>,
    }

    impl Translator for FlakyTranslator {
        fn translate(&self, _text: &str, source: &str, target: &str) -> Result<String> {
            assert_eq!((source, target), ("ur", "en"));
            let call = self.calls.get() + 1;
            self.calls.set(call);
            if call <= self.failures {
                Err(ChatError::Translation(format!("transient failure {call}")))
            } else {
                Ok(self.reply.to_string())
            }
        }
    }

    fn normalizer(failures: u32, calls: Rc<Cell<u32>>) -> TokenNormalizer {
        TokenNormalizer::new(
            Box::new(FixedClassifier(vec![("شکریہ", Lang::Urd), ("hello", Lang::Eng)])),
            Some(Box::new(FlakyTranslator {
                failures,
                reply: "thanks",
                calls,
            })),
            TranslationPolicy {
                retry: RetryPolicy::immediate(3),
                ..TranslationPolicy::default()
            },
        )
    }

    #[test]
    fn test_translation_succeeds_on_third_attempt() {
        let calls = Rc::new(Cell::new(0));
        let normalizer = normalizer(2, calls.clone());
        assert_eq!(normalizer.normalize_token("شکریہ"), "thanks");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_translation_exhausted_keeps_original() {
        let calls = Rc::new(Cell::new(0));
        let normalizer = normalizer(5, calls.clone());
        assert_eq!(normalizer.normalize_token("شکریہ"), "شکریہ");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_non_designated_token_not_translated() {
        let calls = Rc::new(Cell::new(0));
        let normalizer = normalizer(0, calls.clone());
        assert_eq!(normalizer.normalize_token("hello"), "hello");
        assert_eq!(normalizer.normalize_token("unclassified"), "unclassified");
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_normalize_all_translates_distinct_tokens_once() {
        let calls = Rc::new(Cell::new(0));
        let normalizer = normalizer(0, calls.clone());
        let tokens = vec!["شکریہ".to_string(), "hello".to_string(), "شکریہ".to_string()];
        assert_eq!(normalizer.normalize_all(tokens), vec!["thanks", "hello", "thanks"]);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_passthrough_never_translates() {
        let normalizer = TokenNormalizer::passthrough();
        assert_eq!(normalizer.normalize_token("شکریہ"), "شکریہ");
    }

    #[test]
    fn test_retry_returns_last_error() {
        let result: Result<()> = retry(&RetryPolicy::immediate(2), |attempt| {
            Err(ChatError::Translation(format!("attempt {attempt}")))
        });
        match result {
            Err(ChatError::Translation(msg)) => assert_eq!(msg, "attempt 2"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_retry_zero_attempts_still_runs_once() {
        let mut runs = 0;
        let result = retry(&RetryPolicy::immediate(0), |_| {
            runs += 1;
            Ok(runs)
        });
        assert_eq!(result.unwrap(), 1);
    }

    #[test]
    fn test_retry_delay_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(1), Duration::from_millis(250));
        assert_eq!(policy.delay(2), Duration::from_millis(500));
        assert_eq!(policy.delay(10), Duration::from_millis(2_000));
    }

    #[test]
    fn test_translation_switched_off_after_repeated_failures() {
        let calls = Rc::new(Cell::new(0));
        let normalizer = TokenNormalizer::new(
            Box::new(FixedClassifier(vec![
                ("شکریہ", Lang::Urd),
                ("بہت", Lang::Urd),
                ("اچھا", Lang::Urd),
            ])),
            Some(Box::new(FlakyTranslator {
                failures: u32::MAX,
                reply: "unused",
                calls: calls.clone(),
            })),
            TranslationPolicy {
                retry: RetryPolicy::immediate(3),
                max_consecutive_failures: 2,
                ..TranslationPolicy::default()
            },
        );
        assert_eq!(normalizer.normalize_token("شکریہ"), "شکریہ");
        assert!(!normalizer.translation_given_up());
        assert_eq!(normalizer.normalize_token("بہت"), "بہت");
        assert!(normalizer.translation_given_up());
        assert_eq!(normalizer.normalize_token("اچھا"), "اچھا");
        assert_eq!(calls.get(), 6);
    }

    #[test]
    fn test_success_resets_failure_count() {
        let calls = Rc::new(Cell::new(0));
        let normalizer = normalizer(3, calls.clone());
        assert_eq!(normalizer.normalize_token("شکریہ"), "شکریہ");
        assert_eq!(normalizer.consecutive_failures.get(), 1);
        assert_eq!(normalizer.normalize_token("شکریہ"), "thanks");
        assert_eq!(normalizer.consecutive_failures.get(), 0);
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn test_urdu_letters_override_arabic_and_persian() {
        assert_eq!(refine_urdu(Lang::Ara, "بہت"), Lang::Urd);
        assert_eq!(refine_urdu(Lang::Ara, "پاکستان"), Lang::Ara);
        assert_eq!(refine_urdu(Lang::Pes, "اچھا"), Lang::Urd);
        assert_eq!(refine_urdu(Lang::Ara, "كتاب"), Lang::Ara);
        assert_eq!(refine_urdu(Lang::Eng, "ہ"), Lang::Eng);
    }

    #[test]
    fn test_whatlang_classifier() {
        let classifier = WhatlangClassifier;
        assert_eq!(classifier.classify(""), Classification::Unknown);
        assert_eq!(
            classifier.classify("The quick brown fox jumps over the lazy dog and keeps running home"),
            Classification::Confident(Lang::Eng)
        );
    }
}
