//! HTTP client for a LibreTranslate-compatible translation service.
//!
//! Each call is a single `POST {endpoint}` bounded by the client timeout;
//! retrying is left to the caller.

use std::time::Duration;

use chatlens_core::ports::{Result, Translator};
use chatlens_core::ChatError;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
    error: Option<String>,
}

pub struct HttpTranslator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTranslator {
    pub fn new(endpoint: String, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::Translation(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

impl Translator for HttpTranslator {
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let request = TranslateRequest {
            q: text,
            source,
            target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| ChatError::Translation(e.to_string()))?;

        let status = response.status();
        let body: TranslateResponse = response
            .json()
            .map_err(|e| ChatError::Translation(format!("invalid response ({status}): {e}")))?;

        parse_response(status.is_success(), body).inspect(|translated| {
            debug!("{} -> {} {:?} => {:?}", source, target, text, translated);
        })
    }
}

fn parse_response(success: bool, body: TranslateResponse) -> Result<String> {
    match (success, body.translated_text, body.error) {
        (_, _, Some(error)) => Err(ChatError::Translation(error)),
        (true, Some(text), None) => Ok(text),
        (true, None, None) => Err(ChatError::Translation(
            "response has no translatedText".to_string(),
        )),
        (false, _, None) => Err(ChatError::Translation("translation request rejected".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> TranslateResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_response_success() {
        let text = parse_response(true, body(r#"{"translatedText": "thanks"}"#)).unwrap();
        assert_eq!(text, "thanks");
    }

    #[test]
    fn test_parse_response_error_field() {
        let err = parse_response(false, body(r#"{"error": "Too many requests"}"#)).unwrap_err();
        assert_eq!(err.to_string(), "Translation error: Too many requests");
    }

    #[test]
    fn test_parse_response_missing_text() {
        assert!(parse_response(true, body("{}")).is_err());
        assert!(parse_response(false, body(r#"{"translatedText": "x"}"#)).is_err());
    }

    #[test]
    fn test_request_omits_missing_api_key() {
        let request = TranslateRequest {
            q: "شکریہ",
            source: "ur",
            target: "en",
            format: "text",
            api_key: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["q"], "شکریہ");
        assert!(json.get("api_key").is_none());
    }

    #[test]
    fn test_unreachable_endpoint_is_translation_error() {
        let translator = HttpTranslator::new(
            "http://127.0.0.1:9/translate".to_string(),
            None,
            Duration::from_millis(200),
        )
        .unwrap();
        let err = translator.translate("شکریہ", "ur", "en").unwrap_err();
        assert!(matches!(err, ChatError::Translation(_)));
    }
}
