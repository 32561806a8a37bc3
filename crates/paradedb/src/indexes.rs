//! BM25 index definitions and CREATE INDEX emission.
//!
//! A [`Bm25Index`] is constructed once at schema-definition time and
//! consumed once when its DDL is emitted. Emitting the same statement
//! twice is the database's concern (the index already exists), not this
//! builder's.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::ModelMeta;
use crate::error::{BuildError, BuildResult};

/// Text-splitting configuration for an indexed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Tokenizer {
    /// Word splitting with a named stemmer.
    Default {
        /// The stemmer language, e.g. `English`.
        stemmer: String,
    },
    /// Character n-grams, for substring and autocomplete matching.
    Ngram {
        /// Minimum gram length.
        min_gram: u8,
        /// Maximum gram length.
        max_gram: u8,
        /// Whether grams are restricted to token prefixes.
        prefix_only: bool,
    },
}

impl Tokenizer {
    /// Word splitting with the given stemmer.
    pub fn stemmer(name: impl Into<String>) -> Self {
        Tokenizer::Default {
            stemmer: name.into(),
        }
    }

    /// The 2-3 character n-gram configuration, without a prefix-only
    /// restriction.
    pub fn ngram() -> Self {
        Tokenizer::Ngram {
            min_gram: 2,
            max_gram: 3,
            prefix_only: false,
        }
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer::stemmer("English")
    }
}

/// Storage options for one text column, serialized into `text_fields`.
#[derive(Serialize)]
struct TextFieldOptions<'a> {
    fast: bool,
    tokenizer: &'a Tokenizer,
}

/// Declarative description of a BM25-backed search index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bm25Index {
    fields: Vec<String>,
    name: Option<String>,
    key_field: Option<String>,
    tokenizer: Tokenizer,
}

impl Bm25Index {
    /// An index over `fields` with the default word-stemming tokenizer.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            name: None,
            key_field: None,
            tokenizer: Tokenizer::default(),
        }
    }

    /// An index over `fields` with the n-gram tokenizer.
    pub fn ngram<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokenizer: Tokenizer::ngram(),
            ..Self::new(fields)
        }
    }

    /// Overrides the index name. Defaults to the conventional
    /// `<table>_bm25_idx`.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Overrides the key field. Defaults to the model's primary key.
    pub fn with_key_field(mut self, key_field: impl Into<String>) -> Self {
        self.key_field = Some(key_field.into());
        self
    }

    /// Sets the stemmer of the default tokenizer.
    pub fn with_stemmer(mut self, stemmer: impl Into<String>) -> Self {
        self.tokenizer = Tokenizer::stemmer(stemmer);
        self
    }

    /// The conventional index name for a table. `boost_search` scopes its
    /// weighted-term queries to this name.
    pub fn conventional_name(table: &str) -> String {
        format!("{}_bm25_idx", table)
    }

    /// Emits the CREATE INDEX statement for `model`.
    ///
    /// The key field leads the column list even when not declared among
    /// the indexed fields, and only textual declared fields receive an
    /// entry in the `text_fields` tokenizer map.
    pub fn create_sql(&self, model: &ModelMeta) -> BuildResult<String> {
        let name = match &self.name {
            Some(name) => name.clone(),
            None => Self::conventional_name(&model.table),
        };
        if self.fields.is_empty() {
            return Err(BuildError::NoIndexFields { index: name });
        }

        let key_field = self.key_field.as_deref().unwrap_or_else(|| model.pk_name());

        let mut columns = vec![key_field.to_string()];
        for field in &self.fields {
            if field != key_field {
                columns.push(field.clone());
            }
        }
        let column_list = columns
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(", ");

        let mut text_fields = BTreeMap::new();
        for field in &model.fields {
            if field.column_type.is_textual() && self.fields.contains(&field.name) {
                text_fields.insert(
                    field.name.as_str(),
                    TextFieldOptions {
                        fast: true,
                        tokenizer: &self.tokenizer,
                    },
                );
            }
        }

        Ok(format!(
            "CREATE INDEX \"{}\" ON \"{}\" USING bm25 ({}) WITH (key_field='{}', text_fields='{}')",
            name,
            model.table,
            column_list,
            key_field,
            serde_json::to_string(&text_fields)?,
        ))
    }
}
