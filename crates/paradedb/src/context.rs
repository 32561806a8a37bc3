//! Query-compilation context and identifier resolution.
//!
//! Builders never reach into hidden compiler state. The host hands every
//! call a [`QueryContext`]: a read-only snapshot of the target model's
//! schema metadata, the query's join aliases as structured values, and the
//! placeholder convention. Resolution happens per call and is never cached,
//! because alias maps vary per query.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::fragment::{ParamStyle, Placeholders};

/// Separator used in field paths that traverse a join, e.g. `review__body`.
pub const JOIN_SEPARATOR: &str = "__";

/// Underlying SQL column type of a model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// `text`
    Text,
    /// `varchar(n)`
    VarChar,
    /// `integer`
    Integer,
    /// `bigint`
    BigInt,
    /// `double precision`
    Float,
    /// `numeric`
    Decimal,
    /// `boolean`
    Boolean,
    /// `date`
    Date,
    /// `timestamptz`
    Timestamp,
    /// `jsonb`
    Json,
}

impl ColumnType {
    /// Whether this column type holds indexable text. Only textual
    /// columns receive a tokenizer entry in BM25 index storage options.
    pub fn is_textual(&self) -> bool {
        matches!(self, ColumnType::Text | ColumnType::VarChar)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Text => write!(f, "text"),
            ColumnType::VarChar => write!(f, "varchar"),
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::BigInt => write!(f, "bigint"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::Decimal => write!(f, "decimal"),
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Date => write!(f, "date"),
            ColumnType::Timestamp => write!(f, "timestamp"),
            ColumnType::Json => write!(f, "json"),
        }
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ColumnType::Text),
            "varchar" => Ok(ColumnType::VarChar),
            "integer" => Ok(ColumnType::Integer),
            "bigint" => Ok(ColumnType::BigInt),
            "float" => Ok(ColumnType::Float),
            "decimal" => Ok(ColumnType::Decimal),
            "boolean" => Ok(ColumnType::Boolean),
            "date" => Ok(ColumnType::Date),
            "timestamp" => Ok(ColumnType::Timestamp),
            "json" => Ok(ColumnType::Json),
            _ => Err(format!("unknown column type: {}", s)),
        }
    }
}

/// Metadata for a single model field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    /// The field (column) name.
    pub name: String,
    /// The underlying SQL column type.
    pub column_type: ColumnType,
    /// Whether this field is the model's primary key.
    pub primary_key: bool,
}

impl FieldMeta {
    /// Creates a non-key field.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            primary_key: false,
        }
    }

    /// Creates the primary-key field.
    pub fn primary_key(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            primary_key: true,
        }
    }
}

/// Schema metadata snapshot for the model a query targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMeta {
    /// The model's database table name.
    pub table: String,
    /// The model's fields, in declaration order.
    pub fields: Vec<FieldMeta>,
}

impl ModelMeta {
    /// Creates metadata for `table` with no fields.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field.
    pub fn with_field(mut self, field: FieldMeta) -> Self {
        self.fields.push(field);
        self
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The declared primary-key column name, defaulting to `id` when no
    /// field is flagged as the key.
    pub fn pk_name(&self) -> &str {
        self.fields
            .iter()
            .find(|f| f.primary_key)
            .map(|f| f.name.as_str())
            .unwrap_or("id")
    }
}

/// One entry of the query's alias map, as structured data.
///
/// The host supplies the SQL alias and the join relation name directly;
/// this layer never re-parses formatted SQL text to recover them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinAlias {
    /// The SQL table alias used in the compiled query.
    pub alias: String,
    /// The relation (foreign-key) name the alias was joined through.
    pub relation: String,
}

impl JoinAlias {
    /// Creates an alias-map entry.
    pub fn new(alias: impl Into<String>, relation: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            relation: relation.into(),
        }
    }
}

/// A field path resolved against a [`QueryContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// The table qualifier: a join alias, or the base table name.
    pub qualifier: String,
    /// The resolved column name.
    pub column: String,
    /// The base model's primary-key column name.
    pub pk_column: String,
}

impl ResolvedField {
    /// The quoted, qualified column reference.
    pub fn column_ref(&self) -> String {
        format!("{}.{}", quote_ident(&self.qualifier), quote_ident(&self.column))
    }

    /// The quoted, qualified primary-key reference.
    ///
    /// Note this pairs the resolved qualifier with the *base* model's key
    /// name: lookups that group by row id keep doing so against the table
    /// the predicate was written on.
    pub fn pk_ref(&self) -> String {
        format!(
            "{}.{}",
            quote_ident(&self.qualifier),
            quote_ident(&self.pk_column)
        )
    }
}

/// Read-only context for one query-compilation call.
#[derive(Debug, Clone)]
pub struct QueryContext<'a> {
    model: &'a ModelMeta,
    aliases: &'a [JoinAlias],
    style: ParamStyle,
    param_offset: usize,
}

impl<'a> QueryContext<'a> {
    /// Creates a context for `model` with no joins, `%s` placeholders and
    /// no preceding parameters.
    pub fn new(model: &'a ModelMeta) -> Self {
        Self {
            model,
            aliases: &[],
            style: ParamStyle::default(),
            param_offset: 0,
        }
    }

    /// Sets the query's join alias map.
    pub fn with_aliases(mut self, aliases: &'a [JoinAlias]) -> Self {
        self.aliases = aliases;
        self
    }

    /// Sets the placeholder convention.
    pub fn with_param_style(mut self, style: ParamStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets how many parameters the surrounding query has already bound.
    pub fn with_param_offset(mut self, offset: usize) -> Self {
        self.param_offset = offset;
        self
    }

    /// The target model's metadata.
    pub fn model(&self) -> &ModelMeta {
        self.model
    }

    /// Starts a placeholder sequence for one fragment.
    pub fn placeholders(&self) -> Placeholders {
        Placeholders::new(self.style, self.param_offset)
    }

    /// Resolves a field path to a table qualifier, column name, and the
    /// base model's primary-key column.
    ///
    /// A path containing [`JOIN_SEPARATOR`] is matched against the alias
    /// map by relation-name prefix. When no alias matches, resolution
    /// falls back to the base table; this is a known degradation of the
    /// original behavior, kept for compatibility and reported at debug
    /// level rather than raised.
    pub fn resolve(&self, field_path: &str) -> ResolvedField {
        let path = field_path.trim();
        let pk_column = self.model.pk_name().to_string();

        if let Some((_, last)) = path.rsplit_once(JOIN_SEPARATOR) {
            for join in self.aliases {
                if path
                    .strip_prefix(join.relation.as_str())
                    .is_some_and(|rest| rest.starts_with(JOIN_SEPARATOR))
                {
                    return ResolvedField {
                        qualifier: join.alias.clone(),
                        column: last.trim().to_string(),
                        pk_column,
                    };
                }
            }
            tracing::debug!(
                field_path = path,
                table = %self.model.table,
                "no join alias matched field path, falling back to the base table"
            );
            return ResolvedField {
                qualifier: self.model.table.clone(),
                column: last.trim().to_string(),
                pk_column,
            };
        }

        ResolvedField {
            qualifier: self.model.table.clone(),
            column: path.to_string(),
            pk_column,
        }
    }
}

/// Quotes a schema-derived identifier for interpolation into SQL text.
pub(crate) fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident)
}
