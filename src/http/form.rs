//! Form value extraction
//!
//! Reads `application/x-www-form-urlencoded` fields from the URL query and,
//! for POST, PUT and PATCH, from the request body. Body fields win over query
//! fields of the same name; within one source the first occurrence wins.

use hyper::body::Bytes;
use hyper::{Method, Request};
use std::collections::HashMap;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Default, Clone)]
pub struct FormValues {
    values: HashMap<String, String>,
}

impl FormValues {
    pub fn from_request(req: &Request<Bytes>) -> Self {
        let mut values = HashMap::new();

        if has_form_body(req) {
            collect_pairs(&mut values, req.body());
        }
        if let Some(query) = req.uri().query() {
            collect_pairs(&mut values, query.as_bytes());
        }

        Self { values }
    }

    /// Value for `name`, or an empty string when absent
    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map_or("", String::as_str)
    }
}

fn has_form_body(req: &Request<Bytes>) -> bool {
    let method = req.method();
    if *method != Method::POST && *method != Method::PUT && *method != Method::PATCH {
        return false;
    }

    req.headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

fn collect_pairs(values: &mut HashMap<String, String>, input: &[u8]) {
    for (key, value) in url::form_urlencoded::parse(input) {
        values
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
}
