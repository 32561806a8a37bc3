//! Projection builders for relevance scoring and snippet highlighting.
//!
//! ```sql
//! SELECT description, rating, paradedb.score(id)
//! FROM mock_items
//! WHERE description @@@ 'shoes'
//! ORDER BY score DESC
//! LIMIT 5;
//! ```

use crate::context::{JOIN_SEPARATOR, QueryContext, quote_ident};
use crate::fragment::{SqlFragment, SqlParam};

/// The BM25 relevance score of a matched row, usable in projections,
/// ordering, and comparisons. Numeric; carries no bound parameters.
#[derive(Debug, Clone, Default)]
pub struct Score {
    field: Option<String>,
}

impl Score {
    /// Scores rows of the query's base table.
    pub fn new() -> Self {
        Self { field: None }
    }

    /// Scores rows of the table reached through a joined field path,
    /// e.g. `review__body`. The key column name stays the base model's.
    pub fn with_field(field: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
        }
    }

    /// Builds the `paradedb.score(...)` expression.
    pub fn build(&self, ctx: &QueryContext<'_>) -> SqlFragment {
        match &self.field {
            Some(path) if path.contains(JOIN_SEPARATOR) => {
                let resolved = ctx.resolve(path);
                SqlFragment::new(format!("paradedb.score({})", resolved.pk_ref()))
            }
            _ => {
                let model = ctx.model();
                SqlFragment::new(format!(
                    "paradedb.score({}.{})",
                    quote_ident(&model.table),
                    quote_ident(model.pk_name()),
                ))
            }
        }
    }
}

/// A highlighted snippet of a matched field.
///
/// ```sql
/// SELECT id, paradedb.snippet(description, start_tag => '<i>', end_tag => '</i>')
/// FROM mock_items
/// WHERE description @@@ 'shoes'
/// LIMIT 5;
/// ```
#[derive(Debug, Clone)]
pub struct Highlight {
    field: String,
    start_tag: String,
    end_tag: String,
    max_num_chars: i64,
}

impl Highlight {
    /// Highlights matches in `field` with the default `<em>`/`</em>` tags
    /// and a 150-character snippet limit.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            start_tag: "<em>".to_string(),
            end_tag: "</em>".to_string(),
            max_num_chars: 150,
        }
    }

    /// Sets the tags wrapped around each matched term.
    pub fn with_tags(mut self, start_tag: impl Into<String>, end_tag: impl Into<String>) -> Self {
        self.start_tag = start_tag.into();
        self.end_tag = end_tag.into();
        self
    }

    /// Sets the maximum snippet length in characters.
    pub fn with_max_num_chars(mut self, max_num_chars: i64) -> Self {
        self.max_num_chars = max_num_chars;
        self
    }

    /// Builds the `paradedb.snippet(...)` expression. The start tag, end
    /// tag, and character limit are bound parameters, in that order.
    pub fn build(&self, ctx: &QueryContext<'_>) -> SqlFragment {
        let resolved = ctx.resolve(&self.field);
        let mut ph = ctx.placeholders();
        SqlFragment::with_params(
            format!(
                "paradedb.snippet({}, start_tag => {}, end_tag => {}, max_num_chars => {})",
                resolved.column_ref(),
                ph.next(),
                ph.next(),
                ph.next(),
            ),
            vec![
                SqlParam::text(&self.start_tag),
                SqlParam::text(&self.end_tag),
                SqlParam::Integer(self.max_num_chars),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ColumnType, FieldMeta, JoinAlias, ModelMeta};

    fn item_model() -> ModelMeta {
        ModelMeta::new("mock_items")
            .with_field(FieldMeta::primary_key("id", ColumnType::BigInt))
            .with_field(FieldMeta::new("description", ColumnType::Text))
    }

    #[test]
    fn test_score_base_table() {
        let model = item_model();
        let ctx = QueryContext::new(&model);
        let fragment = Score::new().build(&ctx);
        assert_eq!(fragment.sql, r#"paradedb.score("mock_items"."id")"#);
        assert!(fragment.params.is_empty());
    }

    #[test]
    fn test_score_plain_field_override_stays_on_base_table() {
        let model = item_model();
        let ctx = QueryContext::new(&model);
        let fragment = Score::with_field("description").build(&ctx);
        assert_eq!(fragment.sql, r#"paradedb.score("mock_items"."id")"#);
    }

    #[test]
    fn test_score_joined_field_override_switches_qualifier() {
        let model = item_model();
        let aliases = [JoinAlias::new("T2", "review")];
        let ctx = QueryContext::new(&model).with_aliases(&aliases);
        let fragment = Score::with_field("review__body").build(&ctx);
        // The qualifier follows the join; the key name stays `id`.
        assert_eq!(fragment.sql, r#"paradedb.score("T2"."id")"#);
    }

    #[test]
    fn test_highlight_defaults() {
        let model = item_model();
        let ctx = QueryContext::new(&model);
        let fragment = Highlight::new("description").build(&ctx);
        assert_eq!(
            fragment.sql,
            r#"paradedb.snippet("mock_items"."description", start_tag => %s, end_tag => %s, max_num_chars => %s)"#
        );
        assert_eq!(
            fragment.params,
            vec![
                SqlParam::text("<em>"),
                SqlParam::text("</em>"),
                SqlParam::Integer(150),
            ]
        );
    }

    #[test]
    fn test_highlight_custom_options() {
        let model = item_model();
        let ctx = QueryContext::new(&model);
        let fragment = Highlight::new("description")
            .with_tags("<b>", "</b>")
            .with_max_num_chars(80)
            .build(&ctx);
        assert_eq!(
            fragment.params,
            vec![
                SqlParam::text("<b>"),
                SqlParam::text("</b>"),
                SqlParam::Integer(80),
            ]
        );
    }
}
