// Query domain model - requested series, their keys and display options
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Display options a caller attaches to one query.
///
/// These never travel to the TSAR service; they are looked up again by
/// series key once the response arrives.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SeriesOptions {
    pub label: Option<String>,
    pub color: Option<String>,
    pub lines: Option<bool>,
    pub bars: Option<bool>,
    pub line_width: Option<u32>,
    #[serde(flatten)]
    pub styling: BTreeMap<String, serde_json::Value>,
}

/// One requested time series.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Query {
    pub subject: String,
    pub attribute: String,
    #[serde(default)]
    pub cf: Option<String>,
    #[serde(default)]
    pub options: SeriesOptions,
    /// Extra request parameters such as `start`, `stop` or `now`.
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl Query {
    pub fn new(subject: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            attribute: attribute.into(),
            cf: None,
            options: SeriesOptions::default(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_cf(mut self, cf: impl Into<String>) -> Self {
        self.cf = Some(cf.into());
        self
    }

    pub fn with_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_options(mut self, options: SeriesOptions) -> Self {
        self.options = options;
        self
    }

    pub fn key(&self) -> String {
        encode_series_key(&self.subject, &self.attribute, self.cf.as_deref())
    }
}

/// Build the `subject/attribute[/cf]` key naming a series.
///
/// Keys only round-trip when none of the parts contain `/`; this is not
/// checked.
pub fn encode_series_key(subject: &str, attribute: &str, cf: Option<&str>) -> String {
    match cf {
        Some(cf) => format!("{}/{}/{}", subject, attribute, cf),
        None => format!("{}/{}", subject, attribute),
    }
}

/// Render an extra query field as a request parameter value.
pub fn field_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesEntry {
    /// Position of the query in the caller's list.
    pub id: usize,
    pub options: SeriesOptions,
}

/// Series key -> original query position and display options.
#[derive(Debug, Clone, Default)]
pub struct SeriesOptionsTable {
    entries: HashMap<String, SeriesEntry>,
    query_count: usize,
}

impl SeriesOptionsTable {
    pub fn from_queries(queries: &[Query]) -> Self {
        let mut entries = HashMap::with_capacity(queries.len());
        for (id, query) in queries.iter().enumerate() {
            entries.entry(query.key()).or_insert_with(|| SeriesEntry {
                id,
                options: query.options.clone(),
            });
        }
        Self {
            entries,
            query_count: queries.len(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&SeriesEntry> {
        self.entries.get(key)
    }

    /// Number of queries the table was built from; every id is below it.
    pub fn query_count(&self) -> usize {
        self.query_count
    }
}
