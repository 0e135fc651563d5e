//! Memo table for translated keywords
//!
//! Entries are keyed by `(target language, lowercased phrase)`. The table is
//! seeded with a few built-in translations and bounded in size; once full,
//! new translations are no longer memoised.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Built-in translations of English keywords that never require a remote
/// lookup. English itself needs no rows: a target equal to the source
/// language is answered before the memo is consulted.
const SEEDED_TRANSLATIONS: &[(&str, &str, &str)] = &[
    ("fr", "login", "se connecter"),
    ("fr", "log in", "se connecter"),
    ("fr", "signin", "se connecter"),
    ("fr", "sign in", "se connecter"),
    ("es", "login", "iniciar sesión"),
    ("es", "log in", "iniciar sesión"),
    ("es", "signin", "iniciar sesión"),
    ("es", "sign in", "iniciar sesión"),
];

/// Concurrent, bounded translation memo
#[derive(Debug)]
pub struct TranslationMemo {
    entries: DashMap<(String, String), String>,
    /// Number of learned (non-seeded) entries
    learned: AtomicUsize,
    capacity: usize,
}

impl TranslationMemo {
    /// Creates a memo holding at most `capacity` learned translations
    /// in addition to the seeded ones
    pub fn new(capacity: usize) -> Self {
        let entries = DashMap::new();
        for (language, phrase, translation) in SEEDED_TRANSLATIONS {
            entries.insert(
                (language.to_string(), phrase.to_string()),
                translation.to_string(),
            );
        }

        Self {
            entries,
            learned: AtomicUsize::new(0),
            capacity,
        }
    }

    /// Looks up a memoised translation
    pub fn get(&self, language: &str, phrase: &str) -> Option<String> {
        self.entries
            .get(&Self::key(language, phrase))
            .map(|entry| entry.value().clone())
    }

    /// Stores a translation; returns false when the memo is full
    ///
    /// Overwriting an existing key always succeeds. A new key first reserves
    /// one of the `capacity` learned slots, so concurrent inserts never grow
    /// the memo past its bound.
    pub fn insert(&self, language: &str, phrase: &str, translation: String) -> bool {
        match self.entries.entry(Self::key(language, phrase)) {
            Entry::Occupied(mut entry) => {
                entry.insert(translation);
                true
            }
            Entry::Vacant(entry) => {
                let reserved = self
                    .learned
                    .fetch_update(Ordering::AcqRel, Ordering::Acquire, |learned| {
                        (learned < self.capacity).then_some(learned + 1)
                    })
                    .is_ok();
                if reserved {
                    entry.insert(translation);
                }
                reserved
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key(language: &str, phrase: &str) -> (String, String) {
        (language.to_lowercase(), phrase.to_lowercase())
    }
}

impl Default for TranslationMemo {
    fn default() -> Self {
        Self::new(4096)
    }
}
