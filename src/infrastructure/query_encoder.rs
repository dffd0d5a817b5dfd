// Query string encoding for TSAR record requests
use crate::domain::query::{field_value, Query};

const BASE_PARAMS: &str = "?_accept=application/json&missing=skip";

fn paramify(name: &str, value: &str) -> String {
    format!("&{}={}", urlencoding::encode(name), urlencoding::encode(value))
}

/// One `&`-prefixed parameter block per query, in query order.
///
/// Display options are never sent. `filters` become one trailing
/// `filters=a,b` parameter.
pub fn build_query_string(queries: &[Query], filters: &[String]) -> String {
    let mut params = String::new();
    for query in queries {
        params.push_str(&paramify("subject", &query.subject));
        params.push_str(&paramify("attribute", &query.attribute));
        if let Some(cf) = &query.cf {
            params.push_str(&paramify("cf", cf));
        }
        for (name, value) in &query.fields {
            params.push_str(&paramify(name, &field_value(value)));
        }
    }

    if !filters.is_empty() {
        params.push_str(&paramify("filters", &filters.join(",")));
    }

    params
}

pub fn build_request_url(service: &str, queries: &[Query], filters: &[String]) -> String {
    format!(
        "{}{}{}",
        service.trim_end_matches('?'),
        BASE_PARAMS,
        build_query_string(queries, filters)
    )
}
