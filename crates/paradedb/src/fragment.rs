//! SQL fragments with ordered bind parameters.
//!
//! Every builder in this crate produces a [`SqlFragment`]: a piece of SQL
//! text whose placeholders line up left-to-right with `params`. Only
//! identifiers derived from trusted schema metadata are interpolated into
//! the text; every user-supplied value is a bound parameter.

/// A SQL parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// Text parameter.
    Text(String),
    /// Floating point parameter.
    Float(f64),
    /// Integer parameter.
    Integer(i64),
    /// Boolean parameter.
    Bool(bool),
}

impl SqlParam {
    /// Creates a text parameter.
    pub fn text(s: &str) -> Self {
        SqlParam::Text(s.to_string())
    }
}

/// A SQL fragment with associated parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    /// The SQL string with placeholders.
    pub sql: String,
    /// The parameter values, ordered to match the placeholders.
    pub params: Vec<SqlParam>,
}

impl SqlFragment {
    /// Creates a new fragment with no parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Creates a fragment with parameters.
    pub fn with_params(sql: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Combines two fragments with AND.
    pub fn and(self, other: SqlFragment) -> SqlFragment {
        SqlFragment {
            sql: format!("({}) AND ({})", self.sql, other.sql),
            params: [self.params, other.params].concat(),
        }
    }

    /// Combines two fragments with OR.
    pub fn or(self, other: SqlFragment) -> SqlFragment {
        SqlFragment {
            sql: format!("({}) OR ({})", self.sql, other.sql),
            params: [self.params, other.params].concat(),
        }
    }
}

/// Placeholder convention of the host that will execute the fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamStyle {
    /// `%s` positional placeholders (psycopg-style hosts). The default.
    #[default]
    Percent,
    /// `$N` numbered placeholders (tokio-postgres-style hosts).
    Numbered,
}

impl ParamStyle {
    /// Renders the placeholder for the 1-based parameter `position`.
    pub fn placeholder(&self, position: usize) -> String {
        match self {
            ParamStyle::Percent => "%s".to_string(),
            ParamStyle::Numbered => format!("${}", position),
        }
    }
}

/// A left-to-right placeholder sequence for one fragment.
#[derive(Debug, Clone)]
pub struct Placeholders {
    style: ParamStyle,
    position: usize,
}

impl Placeholders {
    /// Creates a sequence. `offset` is the number of parameters already
    /// bound by the surrounding query, so numbered placeholders continue
    /// from `$offset+1`.
    pub fn new(style: ParamStyle, offset: usize) -> Self {
        Self {
            style,
            position: offset,
        }
    }

    /// Renders the next placeholder.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> String {
        self.position += 1;
        self.style.placeholder(self.position)
    }
}
