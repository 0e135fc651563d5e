//! Login-form detection
//!
//! Decides whether a page displays a login form using structural and lexical
//! signals only. Forms containing a password input are examined in document
//! order and the first form that yields a decision ends the search:
//!
//! | Form contents | Decision |
//! |---------------|----------|
//! | More than one password input | not a login form (search ends) |
//! | One password input, one email input | login form |
//! | One password input, a login keyword in its markup | login form |
//!
//! Keywords are the built-in list plus any elective keywords, each also
//! translated into every language the page declares.

use crate::translation::Translator;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;

/// Keywords that suggest a login form, in the translator's source language
pub const DEFAULT_LOGIN_KEYWORDS: &[&str] = &[
    "login",
    "log in",
    "sign in",
    "signin",
    "username",
    "email",
    "connexion",
    "s'authentifier",
];

/// What a single form with a password input looks like
#[derive(Debug, Clone, PartialEq, Eq)]
struct FormCandidate {
    password_inputs: usize,
    email_inputs: usize,
    /// Lowercased inner HTML of the form
    markup: String,
}

/// Owned snapshot of everything the detector needs from a document
///
/// Taking the snapshot up front lets detection await translations without
/// holding on to the parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginSignals {
    languages: Vec<String>,
    forms: Vec<FormCandidate>,
}

impl LoginSignals {
    pub fn from_document(document: &Html) -> Self {
        Self {
            languages: language_tags(document),
            forms: password_forms(document),
        }
    }

    /// Language tags declared on the page, deduplicated, `<html lang>` first
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Number of forms containing at least one password input
    pub fn form_count(&self) -> usize {
        self.forms.len()
    }
}

/// Heuristic login-form detector
pub struct LoginFormDetector {
    translator: Arc<Translator>,
}

impl LoginFormDetector {
    pub fn new(translator: Arc<Translator>) -> Self {
        Self { translator }
    }

    /// Decides whether the page described by `signals` shows a login form
    ///
    /// Keywords are only translated once a form actually needs a keyword
    /// check; pages without password forms never trigger a translation.
    pub async fn has_login_form(&self, signals: &LoginSignals, elective_keywords: &[String]) -> bool {
        let mut keywords: Option<Vec<String>> = None;

        for (index, form) in signals.forms.iter().enumerate() {
            if form.password_inputs > 1 {
                tracing::debug!(
                    "Form {} has {} password inputs, not a login form",
                    index,
                    form.password_inputs
                );
                return false;
            }

            if form.email_inputs == 1 {
                tracing::debug!("Form {} has one email and one password input", index);
                return true;
            }

            if keywords.is_none() {
                keywords = Some(
                    self.login_keywords(&signals.languages, elective_keywords)
                        .await,
                );
            }

            let matched = keywords
                .iter()
                .flatten()
                .find(|keyword| form.markup.contains(keyword.as_str()));
            if let Some(keyword) = matched {
                tracing::debug!("Form {} mentions login keyword '{}'", index, keyword);
                return true;
            }
        }

        false
    }

    /// Builds the lowercased keyword list: elective keywords, the built-in
    /// keywords, then their translations into each of `languages`
    ///
    /// Empty strings (including failed translations) are never included.
    pub async fn login_keywords(&self, languages: &[String], elective_keywords: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut keywords = Vec::new();

        let originals = elective_keywords
            .iter()
            .map(String::as_str)
            .chain(DEFAULT_LOGIN_KEYWORDS.iter().copied());
        for keyword in originals {
            push_keyword(&mut keywords, &mut seen, keyword);
        }

        let phrases = keywords.clone();
        let translations = self.translator.translate_phrases(languages, &phrases).await;
        for translated in translations.iter().flatten() {
            push_keyword(&mut keywords, &mut seen, translated);
        }

        keywords
    }
}

fn push_keyword(keywords: &mut Vec<String>, seen: &mut HashSet<String>, keyword: &str) {
    let keyword = keyword.trim().to_lowercase();
    if !keyword.is_empty() && seen.insert(keyword.clone()) {
        keywords.push(keyword);
    }
}

/// Collects `lang` attributes: the `<html>` element's first, then every other
/// element's, without duplicates
fn language_tags(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("[lang]") else {
        return Vec::new();
    };

    let root_lang = document
        .root_element()
        .value()
        .attr("lang")
        .map(str::to_string);

    let mut seen = HashSet::new();
    root_lang
        .into_iter()
        .chain(
            document
                .select(&selector)
                .filter_map(|element| element.value().attr("lang"))
                .map(str::to_string),
        )
        .map(|lang| lang.trim().to_string())
        .filter(|lang| !lang.is_empty())
        .filter(|lang| seen.insert(lang.clone()))
        .collect()
}

/// Summarises every `<form>` that contains at least one password input
fn password_forms(document: &Html) -> Vec<FormCandidate> {
    let (Ok(form_selector), Ok(input_selector)) =
        (Selector::parse("form"), Selector::parse("input"))
    else {
        return Vec::new();
    };

    document
        .select(&form_selector)
        .filter_map(|form| {
            let password_inputs = count_inputs(form, &input_selector, "password");
            if password_inputs == 0 {
                return None;
            }

            Some(FormCandidate {
                password_inputs,
                email_inputs: count_inputs(form, &input_selector, "email"),
                markup: form.inner_html().to_lowercase(),
            })
        })
        .collect()
}

fn count_inputs(form: ElementRef<'_>, input_selector: &Selector, input_type: &str) -> usize {
    form.select(input_selector)
        .filter(|input| {
            input
                .value()
                .attr("type")
                .is_some_and(|value| value.trim().eq_ignore_ascii_case(input_type))
        })
        .count()
}
