//! SQL fragment builders for the ParadeDB `pg_search` PostgreSQL extension.
//!
//! ParadeDB adds BM25 full-text search to Postgres: the `@@@` operator,
//! query-builder functions (`paradedb.match`, `paradedb.boost`, ...),
//! relevance scoring, snippet highlighting, and `USING bm25` indexes. This
//! crate is the glue an ORM or query compiler needs to target it: typed
//! builders that turn a search predicate plus schema metadata into a SQL
//! fragment and its ordered bind parameters. It contains no search logic
//! of its own, performs no I/O, and holds no state across calls — every
//! builder is a pure function of its inputs, safe to call from any thread.
//!
//! # Search predicates
//!
//! Seven search modes are registered by name in a [`LookupRegistry`]:
//! `term_search`, `phrase_search`, `phrase_prefix_search`,
//! `fuzzy_term_search`, `fuzzy_phrase_search`, `boost_search`, and
//! `query_search`.
//!
//! ```
//! use paradedb_sql::{
//!     ColumnType, FieldMeta, LookupRegistry, ModelMeta, QueryContext, SearchTerm, SqlParam,
//! };
//!
//! let model = ModelMeta::new("mock_items")
//!     .with_field(FieldMeta::primary_key("id", ColumnType::BigInt))
//!     .with_field(FieldMeta::new("description", ColumnType::Text));
//! let ctx = QueryContext::new(&model);
//!
//! let registry = LookupRegistry::default();
//! let fragment = registry
//!     .build("term_search", &ctx, "description", &SearchTerm::text("running shoes"))
//!     .unwrap();
//!
//! assert_eq!(fragment.sql, r#""mock_items"."description" @@@ %s"#);
//! assert_eq!(fragment.params, vec![SqlParam::text("running shoes")]);
//! ```
//!
//! User text is escaped before it is bound, and only schema-derived
//! identifiers are ever interpolated into the SQL text (`query_search`,
//! whose contract is to accept full query syntax, skips the escaping).
//!
//! # Projections
//!
//! [`Score`] and [`Highlight`] build the `paradedb.score(...)` and
//! `paradedb.snippet(...)` expressions:
//!
//! ```
//! use paradedb_sql::{ColumnType, FieldMeta, Highlight, ModelMeta, QueryContext, Score};
//!
//! let model = ModelMeta::new("mock_items")
//!     .with_field(FieldMeta::primary_key("id", ColumnType::BigInt))
//!     .with_field(FieldMeta::new("description", ColumnType::Text));
//! let ctx = QueryContext::new(&model);
//!
//! assert_eq!(Score::new().build(&ctx).sql, r#"paradedb.score("mock_items"."id")"#);
//!
//! let snippet = Highlight::new("description").with_tags("<b>", "</b>").build(&ctx);
//! assert!(snippet.sql.starts_with("paradedb.snippet"));
//! ```
//!
//! # Index definitions
//!
//! [`Bm25Index`] emits the `CREATE INDEX ... USING bm25` statement with
//! its `key_field` and per-column `text_fields` tokenizer JSON:
//!
//! ```
//! use paradedb_sql::{Bm25Index, ColumnType, FieldMeta, ModelMeta};
//!
//! let model = ModelMeta::new("mock_items")
//!     .with_field(FieldMeta::primary_key("id", ColumnType::BigInt))
//!     .with_field(FieldMeta::new("description", ColumnType::Text));
//!
//! let sql = Bm25Index::new(["description"]).create_sql(&model).unwrap();
//! assert!(sql.contains("USING bm25"));
//! assert!(sql.contains("key_field='id'"));
//! ```
//!
//! # Host contract
//!
//! The caller supplies a [`QueryContext`] per compilation call: the target
//! model's [`ModelMeta`], the query's [`JoinAlias`] map as structured
//! values, and the placeholder convention ([`ParamStyle::Percent`] by
//! default, [`ParamStyle::Numbered`] for `$N` hosts). Field paths may
//! traverse a join with the `__` separator; an unresolvable joined path
//! falls back to the base table (reported via `tracing` at debug level).

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod context;
pub mod error;
pub mod escape;
pub mod fragment;
pub mod functions;
pub mod indexes;
pub mod lookups;

// Re-export commonly used types at crate root
pub use context::{ColumnType, FieldMeta, JoinAlias, ModelMeta, QueryContext, ResolvedField};
pub use error::{BuildError, BuildResult};
pub use escape::escape;
pub use fragment::{ParamStyle, Placeholders, SqlFragment, SqlParam};
pub use functions::{Highlight, Score};
pub use indexes::{Bm25Index, Tokenizer};
pub use lookups::{Lookup, LookupRegistry, SearchTerm};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
