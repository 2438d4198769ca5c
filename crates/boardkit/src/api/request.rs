use reqwest::Method;
use serde_json::Value;
use std::collections::BTreeMap;

/// One API call: method, path relative to the base URL, query and optional JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    /// `None` values are left out of the query string
    pub query: BTreeMap<String, Option<String>>,
    pub body: Option<Value>,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };

        Self {
            method,
            path,
            query: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.insert(key.into(), Some(value.to_string()));
        self
    }

    pub fn param_opt<T: ToString>(mut self, key: impl Into<String>, value: Option<T>) -> Self {
        self.query.insert(key.into(), value.map(|v| v.to_string()));
        self
    }

    pub fn set_param(&mut self, key: impl Into<String>, value: impl ToString) {
        self.query.insert(key.into(), Some(value.to_string()));
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Query pairs actually sent, `None` values excluded
    pub fn query_pairs(&self) -> Vec<(&str, &str)> {
        self.query
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
            .collect()
    }
}
