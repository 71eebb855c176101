//! Record filter expressions
//!
//! A small expression tree that renders to the backend's filter syntax
//! (`field = "value" && (a = "x" || a = "y")`) and can also be evaluated
//! against a JSON record, which is how the in-memory store applies it.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum RecordFilter {
    /// `field = "value"`
    Eq(String, String),
    /// `field != "value"`
    Ne(String, String),
    /// `field = true`
    Flag(String, bool),
    And(Vec<RecordFilter>),
    Or(Vec<RecordFilter>),
}

impl RecordFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        RecordFilter::Eq(field.into(), value.into())
    }

    pub fn ne(field: impl Into<String>, value: impl Into<String>) -> Self {
        RecordFilter::Ne(field.into(), value.into())
    }

    pub fn flag(field: impl Into<String>, value: bool) -> Self {
        RecordFilter::Flag(field.into(), value)
    }

    /// `field` equal to any of `values`
    pub fn any_of<I, S>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RecordFilter::Or(
            values
                .into_iter()
                .map(|v| RecordFilter::Eq(field.to_string(), v.into()))
                .collect(),
        )
    }

    pub fn and(self, other: RecordFilter) -> Self {
        match self {
            RecordFilter::And(mut items) => {
                items.push(other);
                RecordFilter::And(items)
            }
            first => RecordFilter::And(vec![first, other]),
        }
    }

    /// Render in the backend's filter syntax
    pub fn render(&self) -> String {
        match self {
            RecordFilter::Eq(field, value) => format!("{} = \"{}\"", field, escape(value)),
            RecordFilter::Ne(field, value) => format!("{} != \"{}\"", field, escape(value)),
            RecordFilter::Flag(field, value) => format!("{} = {}", field, value),
            RecordFilter::And(items) => join(items, " && "),
            RecordFilter::Or(items) => join(items, " || "),
        }
    }

    /// Evaluate against a JSON record
    pub fn matches(&self, record: &Value) -> bool {
        match self {
            RecordFilter::Eq(field, value) => field_text(record, field) == *value,
            RecordFilter::Ne(field, value) => field_text(record, field) != *value,
            RecordFilter::Flag(field, value) => {
                record.get(field).and_then(Value::as_bool).unwrap_or(false) == *value
            }
            RecordFilter::And(items) => items.iter().all(|f| f.matches(record)),
            RecordFilter::Or(items) => items.iter().any(|f| f.matches(record)),
        }
    }

    fn is_compound(&self) -> bool {
        matches!(self, RecordFilter::And(items) | RecordFilter::Or(items) if items.len() > 1)
    }
}

impl std::fmt::Display for RecordFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

fn join(items: &[RecordFilter], sep: &str) -> String {
    items
        .iter()
        .map(|item| {
            if item.is_compound() {
                format!("({})", item.render())
            } else {
                item.render()
            }
        })
        .collect::<Vec<_>>()
        .join(sep)
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Field value as the backend compares it: strings verbatim, missing and
/// null as `""`, other scalars in their JSON form.
fn field_text(record: &Value, field: &str) -> String {
    match record.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_simple() {
        let filter = RecordFilter::eq("carrier", "abc123");
        assert_eq!(filter.render(), "carrier = \"abc123\"");
    }

    #[test]
    fn test_render_escapes_quotes() {
        let filter = RecordFilter::eq("carrier", "x\" || id != \"");
        assert_eq!(filter.render(), "carrier = \"x\\\" || id != \\\"\"");
    }

    #[test]
    fn test_render_nested_groups() {
        let filter = RecordFilter::eq("carrier", "u1")
            .and(RecordFilter::any_of("status", ["assigned", "in_transit"]));
        assert_eq!(
            filter.render(),
            "carrier = \"u1\" && (status = \"assigned\" || status = \"in_transit\")"
        );
    }

    #[test]
    fn test_matches_record() {
        let record = json!({"carrier": "u1", "status": "in transit", "verified": true});

        assert!(RecordFilter::eq("carrier", "u1").matches(&record));
        assert!(RecordFilter::flag("verified", true).matches(&record));
        assert!(RecordFilter::flag("hidden", false).matches(&record));
        assert_eq!(RecordFilter::flag("verified", true).render(), "verified = true");
        assert!(RecordFilter::eq("shipper", "").matches(&record));
        assert!(RecordFilter::ne("carrier", "u2").matches(&record));
        assert!(RecordFilter::any_of("status", ["in_transit", "in transit"]).matches(&record));
        assert!(!RecordFilter::eq("carrier", "u1")
            .and(RecordFilter::eq("status", "assigned"))
            .matches(&record));
    }
}
