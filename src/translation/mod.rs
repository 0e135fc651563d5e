//! Keyword translation module
//!
//! Login keywords are written in one language; pages are written in many.
//! This module translates keyword lists into the languages a page declares,
//! using a LibreTranslate-compatible service behind the [`Translate`] trait
//! and a [`TranslationMemo`] that avoids repeated remote lookups.

mod memo;

pub use memo::TranslationMemo;

use crate::config::TranslationConfig;
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Errors from a single phrase translation
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("Translation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Translation service returned HTTP {0}")]
    Status(u16),

    #[error("Translation service returned no text")]
    EmptyResponse,
}

/// A backend able to translate a single phrase
#[async_trait]
pub trait Translate: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
        source_language: &str,
    ) -> Result<String, TranslationError>;
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: Option<String>,
}

/// Client for a LibreTranslate `/translate` endpoint
#[derive(Debug, Clone)]
pub struct LibreTranslateClient {
    client: Client,
    endpoint: String,
}

impl LibreTranslateClient {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Translate for LibreTranslateClient {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
        source_language: &str,
    ) -> Result<String, TranslationError> {
        let body = TranslateRequest {
            q: text,
            source: source_language,
            target: target_language,
            format: "text",
        };

        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::Status(status.as_u16()));
        }

        let parsed: TranslateResponse = response.json().await?;
        parsed
            .translated_text
            .filter(|text| !text.is_empty())
            .ok_or(TranslationError::EmptyResponse)
    }
}

/// Memoising front end over a translation backend
///
/// A disabled translator returns no translations at all, so keyword
/// matching falls back to the original phrases.
pub struct Translator {
    backend: Option<Arc<dyn Translate>>,
    memo: Arc<TranslationMemo>,
    source_language: String,
}

impl Translator {
    pub fn new(
        backend: Arc<dyn Translate>,
        memo: Arc<TranslationMemo>,
        source_language: impl Into<String>,
    ) -> Self {
        Self {
            backend: Some(backend),
            memo,
            source_language: source_language.into().to_lowercase(),
        }
    }

    /// A translator that never translates
    pub fn disabled() -> Self {
        Self {
            backend: None,
            memo: Arc::new(TranslationMemo::default()),
            source_language: "en".to_string(),
        }
    }

    /// Builds a translator from configuration, sharing the given HTTP client
    pub fn from_config(config: &TranslationConfig, client: Client) -> Self {
        if !config.enabled {
            return Self::disabled();
        }

        let backend = LibreTranslateClient::new(client, config.endpoint.clone());
        Self::new(
            Arc::new(backend),
            Arc::new(TranslationMemo::new(config.memo_capacity)),
            config.source_language.clone(),
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Translates one phrase into `language`
    ///
    /// The phrase and language are lowercased first. A memo hit or a target
    /// equal to the source language never reaches the backend.
    pub async fn translate_text(
        &self,
        phrase: &str,
        language: &str,
    ) -> Result<String, TranslationError> {
        let phrase = phrase.to_lowercase();
        let language = language.to_lowercase();

        if language == self.source_language {
            return Ok(phrase);
        }

        if let Some(cached) = self.memo.get(&language, &phrase) {
            tracing::trace!(language = %language, phrase = %phrase, "translation memo hit");
            return Ok(cached);
        }

        let Some(backend) = &self.backend else {
            return Ok(String::new());
        };

        let translated = backend
            .translate(&phrase, &language, &self.source_language)
            .await?
            .to_lowercase();

        if !self.memo.insert(&language, &phrase, translated.clone()) {
            tracing::debug!("translation memo full, not caching '{}' ({})", phrase, language);
        }

        Ok(translated)
    }

    /// Translates every phrase into every language
    ///
    /// Languages are handled one after another; phrases within a language are
    /// translated concurrently. A failed translation contributes an empty
    /// string in its slot and never aborts the batch.
    ///
    /// # Returns
    ///
    /// One vector per language, each holding one entry per phrase
    pub async fn translate_phrases(&self, languages: &[String], phrases: &[String]) -> Vec<Vec<String>> {
        if !self.is_enabled() {
            return Vec::new();
        }

        let mut translations = Vec::with_capacity(languages.len());
        for language in languages {
            let results = join_all(
                phrases
                    .iter()
                    .map(|phrase| self.translate_text(phrase, language)),
            )
            .await;

            let language_translations = results
                .into_iter()
                .zip(phrases)
                .map(|(result, phrase)| match result {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!("Could not translate '{}' into {}: {}", phrase, language, e);
                        String::new()
                    }
                })
                .collect();

            translations.push(language_translations);
        }

        translations
    }
}
