//! Key-Path Translation Store
//!
//! Per-editor locale dictionary. Tables are flattened on registration and
//! looked up as `"{locale}.{key}"`. Entries only accumulate; there is no
//! removal API.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use super::flatten::{flatten, unflatten, KEY_SEPARATOR};
use crate::core::{
    notify::{Subscribable, SubscriberCallback, SubscriptionId},
    CoreError, CoreResult, Locale, DEFAULT_LOCALE,
};

/// Store change notifications; the payload is the raw registered table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationEvent {
    Register,
}

/// Translation table for one editor instance
pub struct TranslationStore {
    locale: Locale,
    /// Flattened `locale.key.path -> value`
    entries: BTreeMap<String, Value>,
    notifier: Subscribable<TranslationEvent, Value>,
}

impl std::fmt::Debug for TranslationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationStore")
            .field("locale", &self.locale)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl TranslationStore {
    /// Creates an empty store using the default locale
    pub fn new() -> Self {
        Self::with_locale(DEFAULT_LOCALE)
    }

    pub fn with_locale(locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
            entries: BTreeMap::new(),
            notifier: Subscribable::new(),
        }
    }

    /// Active locale
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Switches the locale used by subsequent lookups
    pub fn set_locale(&mut self, locale: &str) {
        tracing::debug!("Translation locale: {} -> {}", self.locale, locale);
        self.locale = locale.to_string();
    }

    /// Merges a `{ locale: { nested keys } }` table into the store.
    ///
    /// Incoming keys override existing ones at the same path. Subscribers
    /// receive the table exactly as passed in.
    pub fn set_translations(&mut self, table: Value) -> CoreResult<()> {
        let Value::Object(object) = &table else {
            return Err(CoreError::InvalidTranslations(
                "expected an object keyed by locale".to_string(),
            ));
        };

        let flat = flatten(object);
        tracing::debug!("Registering {} translation entries", flat.len());
        self.entries.extend(flat);

        self.notifier.notify(TranslationEvent::Register, &table)
    }

    /// Translates `key` in the active locale.
    ///
    /// Falls back to `fallback`, then to `key` itself; never fails.
    pub fn translate(&self, key: &str, fallback: Option<&str>) -> String {
        match self.lookup(&self.locale, key) {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => {
                tracing::warn!(
                    "Missing translation for '{}' in locale '{}'",
                    key,
                    self.locale
                );
                fallback.unwrap_or(key).to_string()
            }
        }
    }

    /// Returns true if `key` has an entry in the active locale
    pub fn has_translation(&self, key: &str) -> bool {
        self.lookup(&self.locale, key).is_some()
    }

    /// Keys from `keys` that have no entry in `locale`
    pub fn missing_keys<'a, I>(&self, locale: &str, keys: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        keys.into_iter()
            .filter(|key| self.lookup(locale, key).is_none())
            .map(str::to_string)
            .collect()
    }

    /// Locales with at least one entry
    pub fn locales(&self) -> Vec<Locale> {
        self.entries
            .keys()
            .filter_map(|path| path.split(KEY_SEPARATOR).next())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Nested view of everything registered so far
    pub fn translations(&self) -> Value {
        Value::Object(unflatten(&self.entries))
    }

    /// Subscribes to newly registered tables
    pub fn subscribe(&mut self, callback: SubscriberCallback<Value>) -> SubscriptionId {
        let events = [TranslationEvent::Register];
        self.notifier.subscribe(events, callback)
    }

    /// Removes a subscription; idempotent
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Entry for `key` in `locale`; empty namespaces are not translations
    fn lookup(&self, locale: &str, key: &str) -> Option<&Value> {
        let path = format!("{}{}{}", locale, KEY_SEPARATOR, key);
        self.entries.get(&path).filter(|value| !value.is_object())
    }
}

impl Default for TranslationStore {
    fn default() -> Self {
        Self::new()
    }
}
