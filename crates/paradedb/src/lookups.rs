//! Search-mode fragment builders.
//!
//! Each ParadeDB search mode is a [`Lookup`] strategy producing the `@@@`
//! predicate fragment for one field, and the [`LookupRegistry`] maps the
//! stable mode names (`term_search`, `phrase_search`, ...) to their
//! builders so a query compiler can dispatch by name at translation time.
//!
//! ```sql
//! SELECT description, rating, category
//! FROM mock_items
//! WHERE description @@@ 'shoes'
//! LIMIT 5;
//! ```

use std::collections::HashMap;

use crate::context::QueryContext;
use crate::error::{BuildError, BuildResult};
use crate::escape::escape;
use crate::fragment::{SqlFragment, SqlParam};
use crate::indexes::Bm25Index;

/// Edit-distance tolerance of the fuzzy lookups.
const FUZZY_DISTANCE: u32 = 2;

/// Default weight applied when a boost option omits or mangles its weight.
const DEFAULT_BOOST: f64 = 1.0;

/// The right-hand side of a search predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchTerm {
    /// Plain query text.
    Text(String),
    /// Query text with a relevance weight, for `boost_search`.
    Boosted {
        /// The query text.
        text: String,
        /// The relevance weight multiplier.
        weight: f64,
    },
}

impl SearchTerm {
    /// Creates a plain text term.
    pub fn text(text: impl Into<String>) -> Self {
        SearchTerm::Text(text.into())
    }

    /// Creates a weighted term.
    pub fn boosted(text: impl Into<String>, weight: f64) -> Self {
        SearchTerm::Boosted {
            text: text.into(),
            weight,
        }
    }

    /// Interprets a loosely-typed boost option as supplied by a host ORM:
    /// `(text,)` or `(text, weight)`.
    ///
    /// A missing or unparsable weight is recovered by defaulting to 1.0;
    /// only an empty option is an error.
    pub fn boost_from_parts(parts: &[&str]) -> BuildResult<Self> {
        match parts {
            [] => Err(BuildError::InvalidBoost {
                message: "expected (text,) or (text, weight)".to_string(),
            }),
            [text] => Ok(SearchTerm::boosted(*text, DEFAULT_BOOST)),
            [text, weight, ..] => Ok(SearchTerm::boosted(
                *text,
                weight.trim().parse().unwrap_or(DEFAULT_BOOST),
            )),
        }
    }

    /// The raw query text.
    pub fn raw(&self) -> &str {
        match self {
            SearchTerm::Text(text) => text,
            SearchTerm::Boosted { text, .. } => text,
        }
    }

    fn weight(&self) -> f64 {
        match self {
            SearchTerm::Text(_) => DEFAULT_BOOST,
            SearchTerm::Boosted { weight, .. } => *weight,
        }
    }
}

/// A fragment builder for one search mode.
pub trait Lookup: Send + Sync {
    /// The stable name the mode is registered under.
    fn name(&self) -> &'static str;

    /// Builds the predicate fragment for `field` against `term`.
    fn build(
        &self,
        ctx: &QueryContext<'_>,
        field: &str,
        term: &SearchTerm,
    ) -> BuildResult<SqlFragment>;
}

/// Exact-term search: `description @@@ 'shoes'`.
pub struct TermSearch;

impl Lookup for TermSearch {
    fn name(&self) -> &'static str {
        "term_search"
    }

    fn build(
        &self,
        ctx: &QueryContext<'_>,
        field: &str,
        term: &SearchTerm,
    ) -> BuildResult<SqlFragment> {
        let resolved = ctx.resolve(field);
        let mut ph = ctx.placeholders();
        Ok(SqlFragment::with_params(
            format!("{} @@@ {}", resolved.column_ref(), ph.next()),
            vec![SqlParam::Text(escape(term.raw()))],
        ))
    }
}

/// Exact-phrase search: `description @@@ '"plastic keyboard"'`.
///
/// The double quotes that make the extension parse the value as a phrase
/// travel inside the bound parameter, never in the SQL text.
pub struct PhraseSearch;

impl Lookup for PhraseSearch {
    fn name(&self) -> &'static str {
        "phrase_search"
    }

    fn build(
        &self,
        ctx: &QueryContext<'_>,
        field: &str,
        term: &SearchTerm,
    ) -> BuildResult<SqlFragment> {
        let resolved = ctx.resolve(field);
        let mut ph = ctx.placeholders();
        Ok(SqlFragment::with_params(
            format!("{} @@@ {}", resolved.column_ref(), ph.next()),
            vec![SqlParam::Text(format!("\"{}\"", escape(term.raw())))],
        ))
    }
}

/// Phrase search whose final token is a prefix: `'"plastic keyb"*'`
/// matches `plastic keyboard`.
pub struct PhrasePrefixSearch;

impl Lookup for PhrasePrefixSearch {
    fn name(&self) -> &'static str {
        "phrase_prefix_search"
    }

    fn build(
        &self,
        ctx: &QueryContext<'_>,
        field: &str,
        term: &SearchTerm,
    ) -> BuildResult<SqlFragment> {
        let resolved = ctx.resolve(field);
        let mut ph = ctx.placeholders();
        Ok(SqlFragment::with_params(
            format!("{} @@@ {}", resolved.column_ref(), ph.next()),
            vec![SqlParam::Text(format!("\"{}\"*", escape(term.raw())))],
        ))
    }
}

/// Shared emission for the two fuzzy modes.
///
/// `paradedb.match` is a query-builder function carrying its own field
/// argument, so the predicate's left-hand side is the key column of the
/// resolved table, not the text column:
///
/// ```sql
/// SELECT description, rating, category FROM mock_items
/// WHERE id @@@ paradedb.match(field => 'description', value => 'ruining shoez');
/// ```
fn build_fuzzy(
    ctx: &QueryContext<'_>,
    field: &str,
    term: &SearchTerm,
    conjunction_mode: bool,
) -> BuildResult<SqlFragment> {
    let resolved = ctx.resolve(field);
    let mut ph = ctx.placeholders();
    let sql = format!(
        "{} @@@ paradedb.match(field => {}, value => {}, conjunction_mode => {}, distance => {})",
        resolved.pk_ref(),
        ph.next(),
        ph.next(),
        conjunction_mode,
        FUZZY_DISTANCE,
    );
    Ok(SqlFragment::with_params(
        sql,
        vec![
            SqlParam::Text(resolved.column.clone()),
            SqlParam::Text(escape(term.raw())),
        ],
    ))
}

/// Fuzzy search where any term may match, within edit distance 2.
pub struct FuzzyTermSearch;

impl Lookup for FuzzyTermSearch {
    fn name(&self) -> &'static str {
        "fuzzy_term_search"
    }

    fn build(
        &self,
        ctx: &QueryContext<'_>,
        field: &str,
        term: &SearchTerm,
    ) -> BuildResult<SqlFragment> {
        build_fuzzy(ctx, field, term, false)
    }
}

/// Fuzzy search where all terms must match, within edit distance 2.
pub struct FuzzyPhraseSearch;

impl Lookup for FuzzyPhraseSearch {
    fn name(&self) -> &'static str {
        "fuzzy_phrase_search"
    }

    fn build(
        &self,
        ctx: &QueryContext<'_>,
        field: &str,
        term: &SearchTerm,
    ) -> BuildResult<SqlFragment> {
        build_fuzzy(ctx, field, term, true)
    }
}

/// Weighted-term search scoped to the model's conventional BM25 index.
///
/// The left-hand column is cast to text so the operator applies cleanly to
/// non-text declared types.
pub struct BoostSearch;

impl Lookup for BoostSearch {
    fn name(&self) -> &'static str {
        "boost_search"
    }

    fn build(
        &self,
        ctx: &QueryContext<'_>,
        field: &str,
        term: &SearchTerm,
    ) -> BuildResult<SqlFragment> {
        let resolved = ctx.resolve(field);
        let index = Bm25Index::conventional_name(&ctx.model().table);
        let mut ph = ctx.placeholders();
        let sql = format!(
            "{}::text @@@ paradedb.with_index(index => {}, query => paradedb.boost(factor => {}, query => paradedb.term(field => {}, value => {})))",
            resolved.column_ref(),
            ph.next(),
            ph.next(),
            ph.next(),
            ph.next(),
        );
        Ok(SqlFragment::with_params(
            sql,
            vec![
                SqlParam::Text(index),
                SqlParam::Float(term.weight()),
                SqlParam::Text(resolved.column.clone()),
                SqlParam::Text(escape(term.raw())),
            ],
        ))
    }
}

/// Free-form query search accepting full pg_search query syntax, including
/// field boosts. The text is deliberately passed through unescaped; this
/// input path is for trusted callers.
pub struct QuerySearch;

impl Lookup for QuerySearch {
    fn name(&self) -> &'static str {
        "query_search"
    }

    fn build(
        &self,
        ctx: &QueryContext<'_>,
        field: &str,
        term: &SearchTerm,
    ) -> BuildResult<SqlFragment> {
        let resolved = ctx.resolve(field);
        let mut ph = ctx.placeholders();
        let sql = format!(
            "{} @@@ paradedb.parse_with_field(field => {}, query_string => {})",
            resolved.pk_ref(),
            ph.next(),
            ph.next(),
        );
        Ok(SqlFragment::with_params(
            sql,
            vec![
                SqlParam::Text(resolved.column.clone()),
                SqlParam::Text(term.raw().to_string()),
            ],
        ))
    }
}

/// Name-to-builder map consulted by the query compiler.
pub struct LookupRegistry {
    lookups: HashMap<&'static str, Box<dyn Lookup>>,
}

impl LookupRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            lookups: HashMap::new(),
        }
    }

    /// Registers a lookup under its own name, replacing any previous
    /// builder of the same name.
    pub fn register(&mut self, lookup: Box<dyn Lookup>) {
        let name = lookup.name();
        self.lookups.insert(name, lookup);
    }

    /// Looks up a builder by mode name.
    pub fn get(&self, name: &str) -> Option<&dyn Lookup> {
        self.lookups.get(name).map(|b| b.as_ref())
    }

    /// Builds a fragment for the named mode.
    pub fn build(
        &self,
        name: &str,
        ctx: &QueryContext<'_>,
        field: &str,
        term: &SearchTerm,
    ) -> BuildResult<SqlFragment> {
        self.get(name)
            .ok_or_else(|| BuildError::UnknownLookup {
                name: name.to_string(),
            })?
            .build(ctx, field, term)
    }

    /// The registered mode names.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.lookups.keys().copied()
    }
}

impl Default for LookupRegistry {
    /// A registry holding all seven built-in search modes.
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(TermSearch));
        registry.register(Box::new(PhraseSearch));
        registry.register(Box::new(PhrasePrefixSearch));
        registry.register(Box::new(FuzzyTermSearch));
        registry.register(Box::new(FuzzyPhraseSearch));
        registry.register(Box::new(BoostSearch));
        registry.register(Box::new(QuerySearch));
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ColumnType, FieldMeta, JoinAlias, ModelMeta};
    use crate::fragment::ParamStyle;

    fn item_model() -> ModelMeta {
        ModelMeta::new("mock_items")
            .with_field(FieldMeta::primary_key("id", ColumnType::BigInt))
            .with_field(FieldMeta::new("description", ColumnType::Text))
            .with_field(FieldMeta::new("rating", ColumnType::Decimal))
    }

    #[test]
    fn test_term_search_escapes_value() {
        let model = item_model();
        let ctx = QueryContext::new(&model);
        let fragment = TermSearch
            .build(&ctx, "description", &SearchTerm::text("shoes(2024)"))
            .unwrap();
        assert_eq!(fragment.sql, r#""mock_items"."description" @@@ %s"#);
        assert_eq!(fragment.params, vec![SqlParam::text(r"shoes\(2024\)")]);
    }

    #[test]
    fn test_phrase_search_quotes_inside_parameter() {
        let model = item_model();
        let ctx = QueryContext::new(&model);
        let fragment = PhraseSearch
            .build(&ctx, "description", &SearchTerm::text("plastic keyboard"))
            .unwrap();
        assert_eq!(fragment.sql, r#""mock_items"."description" @@@ %s"#);
        assert_eq!(fragment.params, vec![SqlParam::text("\"plastic keyboard\"")]);
        // The value never leaks into the SQL text.
        assert!(!fragment.sql.contains("plastic"));
    }

    #[test]
    fn test_phrase_prefix_appends_asterisk_inside_quotes() {
        let model = item_model();
        let ctx = QueryContext::new(&model);
        let fragment = PhrasePrefixSearch
            .build(&ctx, "description", &SearchTerm::text("plastic keyb"))
            .unwrap();
        assert_eq!(fragment.params, vec![SqlParam::text("\"plastic keyb\"*")]);
    }

    #[test]
    fn test_fuzzy_term_targets_key_column() {
        let model = item_model();
        let ctx = QueryContext::new(&model);
        let fragment = FuzzyTermSearch
            .build(&ctx, "description", &SearchTerm::text("ruining shoez"))
            .unwrap();
        assert_eq!(
            fragment.sql,
            r#""mock_items"."id" @@@ paradedb.match(field => %s, value => %s, conjunction_mode => false, distance => 2)"#
        );
        assert_eq!(
            fragment.params,
            vec![
                SqlParam::text("description"),
                SqlParam::text("ruining shoez")
            ]
        );
    }

    #[test]
    fn test_fuzzy_phrase_sets_conjunction_mode() {
        let model = item_model();
        let ctx = QueryContext::new(&model);
        let fragment = FuzzyPhraseSearch
            .build(&ctx, "description", &SearchTerm::text("isoate his crew"))
            .unwrap();
        assert!(fragment.sql.contains("conjunction_mode => true"));
        assert!(fragment.sql.contains("distance => 2"));
    }

    #[test]
    fn test_fuzzy_on_joined_field_targets_joined_key() {
        let model = item_model();
        let aliases = [JoinAlias::new("T3", "review")];
        let ctx = QueryContext::new(&model).with_aliases(&aliases);
        let fragment = FuzzyTermSearch
            .build(&ctx, "review__body", &SearchTerm::text("crwe"))
            .unwrap();
        assert!(fragment.sql.starts_with(r#""T3"."id" @@@ paradedb.match"#));
        assert_eq!(fragment.params[0], SqlParam::text("body"));
    }

    #[test]
    fn test_boost_search_shape() {
        let model = item_model();
        let ctx = QueryContext::new(&model);
        let fragment = BoostSearch
            .build(&ctx, "description", &SearchTerm::boosted("shoes", 2.5))
            .unwrap();
        assert_eq!(
            fragment.sql,
            r#""mock_items"."description"::text @@@ paradedb.with_index(index => %s, query => paradedb.boost(factor => %s, query => paradedb.term(field => %s, value => %s)))"#
        );
        assert_eq!(
            fragment.params,
            vec![
                SqlParam::text("mock_items_bm25_idx"),
                SqlParam::Float(2.5),
                SqlParam::text("description"),
                SqlParam::text("shoes"),
            ]
        );
    }

    #[test]
    fn test_boost_defaults_weight_for_plain_text() {
        let model = item_model();
        let ctx = QueryContext::new(&model);
        let fragment = BoostSearch
            .build(&ctx, "description", &SearchTerm::text("shoes"))
            .unwrap();
        assert_eq!(fragment.params[1], SqlParam::Float(1.0));
    }

    #[test]
    fn test_boost_from_parts() {
        assert_eq!(
            SearchTerm::boost_from_parts(&["shoes", "2.5"]).unwrap(),
            SearchTerm::boosted("shoes", 2.5)
        );
        assert_eq!(
            SearchTerm::boost_from_parts(&["shoes"]).unwrap(),
            SearchTerm::boosted("shoes", 1.0)
        );
        // Malformed weight recovers to the default.
        assert_eq!(
            SearchTerm::boost_from_parts(&["shoes", "heavy"]).unwrap(),
            SearchTerm::boosted("shoes", 1.0)
        );
        assert!(matches!(
            SearchTerm::boost_from_parts(&[]),
            Err(BuildError::InvalidBoost { .. })
        ));
    }

    #[test]
    fn test_query_search_passes_raw_text() {
        let model = item_model();
        let ctx = QueryContext::new(&model);
        let fragment = QuerySearch
            .build(&ctx, "description", &SearchTerm::text("shoes^2 OR boots"))
            .unwrap();
        assert_eq!(
            fragment.sql,
            r#""mock_items"."id" @@@ paradedb.parse_with_field(field => %s, query_string => %s)"#
        );
        // No escaping: the caret survives.
        assert_eq!(fragment.params[1], SqlParam::text("shoes^2 OR boots"));
    }

    #[test]
    fn test_registry_dispatches_by_name() {
        let model = item_model();
        let ctx = QueryContext::new(&model);
        let registry = LookupRegistry::default();
        let fragment = registry
            .build("term_search", &ctx, "description", &SearchTerm::text("a"))
            .unwrap();
        assert!(fragment.sql.contains("@@@"));

        let mut names: Vec<_> = registry.names().collect();
        names.sort_unstable();
        assert_eq!(
            names,
            vec![
                "boost_search",
                "fuzzy_phrase_search",
                "fuzzy_term_search",
                "phrase_prefix_search",
                "phrase_search",
                "query_search",
                "term_search",
            ]
        );
    }

    #[test]
    fn test_registry_unknown_name() {
        let model = item_model();
        let ctx = QueryContext::new(&model);
        let registry = LookupRegistry::default();
        let err = registry
            .build("regex_search", &ctx, "description", &SearchTerm::text("a"))
            .unwrap_err();
        assert!(matches!(err, BuildError::UnknownLookup { name } if name == "regex_search"));
    }

    #[test]
    fn test_numbered_placeholders_with_offset() {
        let model = item_model();
        let ctx = QueryContext::new(&model)
            .with_param_style(ParamStyle::Numbered)
            .with_param_offset(2);
        let fragment = FuzzyTermSearch
            .build(&ctx, "description", &SearchTerm::text("shoez"))
            .unwrap();
        assert!(fragment.sql.contains("field => $3, value => $4"));
    }
}
