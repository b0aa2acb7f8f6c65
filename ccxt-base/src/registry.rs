//! Endpoint registry.
//!
//! Compiles an exchange's declarative, nested endpoint map into a flat table of
//! [`EndpointDescriptor`]s keyed by a generated accessor name.
//!
//! ```text
//! {"public": {"get": ["ticker/{id}", "trades"]},
//!  "private": {"post": {"order": {"cost": 5}}}}
//!
//! publicGetTickerId   public_get_ticker_id   GET  ticker/{id}  cost 1
//! publicGetTrades     public_get_trades      GET  trades       cost 1
//! privatePostOrder    private_post_order     POST order        cost 5
//! ```
//!
//! Every level above the verb is an API group; the groups form the name prefix
//! and the descriptor's `api` list.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Request parameters keyed by name.
///
/// Ordered so that query strings and signatures are deterministic.
pub type Params = BTreeMap<String, Value>;

/// HTTP verbs an endpoint map may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
    /// PATCH
    Patch,
    /// OPTIONS
    Options,
    /// HEAD
    Head,
}

impl HttpMethod {
    /// Parses a verb case-insensitively.
    pub fn parse(verb: &str) -> Option<Self> {
        match verb.to_ascii_lowercase().as_str() {
            "get" => Some(Self::Get),
            "post" => Some(Self::Post),
            "put" => Some(Self::Put),
            "delete" => Some(Self::Delete),
            "patch" => Some(Self::Patch),
            "options" => Some(Self::Options),
            "head" => Some(Self::Head),
            _ => None,
        }
    }

    /// Upper-case wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
        }
    }

    const fn lowercase(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Patch => "patch",
            Self::Options => "options",
            Self::Head => "head",
        }
    }

    /// True for verbs whose parameters usually travel in the URL.
    pub const fn is_query_method(&self) -> bool {
        matches!(self, Self::Get | Self::Delete | Self::Head | Self::Options)
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
            Self::Patch => reqwest::Method::PATCH,
            Self::Options => reqwest::Method::OPTIONS,
            Self::Head => reqwest::Method::HEAD,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One callable endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointDescriptor {
    /// Generated camelCase accessor name.
    pub name: String,
    /// snake_case alias of `name`.
    pub alias: String,
    /// HTTP verb.
    pub method: HttpMethod,
    /// Path template, may contain `{placeholders}`.
    pub path: String,
    /// API group path, outermost first (`["public"]`, `["sapi", "v1"]`).
    pub api: Vec<String>,
    /// Rate-limit cost in tokens.
    pub cost: f64,
    /// Raw per-endpoint config object, `Null` when declared as a list entry.
    pub config: Value,
}

impl EndpointDescriptor {
    /// The group whose base URL this endpoint is called on.
    pub fn api_group(&self) -> &str {
        self.api.first().map_or("", String::as_str)
    }
}

/// Name-addressable table of endpoint descriptors.
///
/// Built once per exchange instance and immutable afterward.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    by_name: BTreeMap<String, Arc<EndpointDescriptor>>,
    by_alias: HashMap<String, Arc<EndpointDescriptor>>,
}

impl EndpointRegistry {
    /// Compiles a declarative endpoint map.
    ///
    /// Verb leaves are either a list of path strings or a map from path to a
    /// config (an object with an optional `cost`, a bare number taken as the
    /// cost, or `null`). Any key holding a list is a verb leaf. Later
    /// definitions overwrite earlier ones with the same name.
    ///
    /// ```rust
    /// use ccxt_base::registry::{EndpointRegistry, HttpMethod};
    /// use serde_json::json;
    ///
    /// let registry = EndpointRegistry::build(&json!({
    ///     "public": {"get": ["ticker/{id}", "trades"]},
    /// }))?;
    /// let ticker = registry.get("publicGetTickerId").unwrap();
    /// assert_eq!(ticker.method, HttpMethod::Get);
    /// assert_eq!(ticker.cost, 1.0);
    /// assert!(registry.get("public_get_trades").is_some());
    /// # Ok::<(), ccxt_base::error::Error>(())
    /// ```
    pub fn build(api: &Value) -> Result<Self> {
        let mut registry = Self::default();
        match api {
            Value::Object(map) => registry.define(map, &mut Vec::new())?,
            Value::Null => {}
            other => {
                return Err(Error::not_supported(format!(
                    "API definition must be an object, got {}",
                    json_type(other)
                )));
            }
        }
        debug!(endpoints = registry.len(), "Built endpoint registry");
        Ok(registry)
    }

    fn define(&mut self, node: &Map<String, Value>, groups: &mut Vec<String>) -> Result<()> {
        for (key, value) in node {
            match (HttpMethod::parse(key), value) {
                (verb, Value::Array(paths)) => {
                    let method = verb.ok_or_else(|| {
                        Error::not_supported(format!("Unknown HTTP verb '{key}' in API definition"))
                    })?;
                    for path in paths {
                        let path = path.as_str().ok_or_else(|| {
                            Error::not_supported(format!(
                                "API leaf under '{key}' must be a path string, got {}",
                                json_type(path)
                            ))
                        })?;
                        self.insert(method, path.trim(), groups, 1.0, Value::Null);
                    }
                }
                (Some(method), Value::Object(paths)) => {
                    for (path, config) in paths {
                        let cost = match config {
                            Value::Null => 1.0,
                            Value::Number(n) => n.as_f64().unwrap_or(1.0),
                            Value::Object(cfg) => match cfg.get("cost") {
                                None | Some(Value::Null) => 1.0,
                                Some(Value::Number(n)) => n.as_f64().unwrap_or(1.0),
                                Some(other) => {
                                    return Err(Error::not_supported(format!(
                                        "Cost of '{path}' must be a number, got {}",
                                        json_type(other)
                                    )));
                                }
                            },
                            other => {
                                return Err(Error::not_supported(format!(
                                    "API leaf '{path}' must be an object, number or null, got {}",
                                    json_type(other)
                                )));
                            }
                        };
                        self.insert(method, path.trim(), groups, cost, config.clone());
                    }
                }
                (_, Value::Object(children)) => {
                    groups.push(key.clone());
                    self.define(children, groups)?;
                    groups.pop();
                }
                (_, other) => {
                    return Err(Error::not_supported(format!(
                        "API definition entry '{key}' must be an object or a list, got {}",
                        json_type(other)
                    )));
                }
            }
        }
        Ok(())
    }

    fn insert(&mut self, method: HttpMethod, path: &str, groups: &[String], cost: f64, config: Value) {
        let (name, alias) = accessor_names(groups, method, path);
        let descriptor = Arc::new(EndpointDescriptor {
            name: name.clone(),
            alias: alias.clone(),
            method,
            path: path.to_string(),
            api: groups.to_vec(),
            cost,
            config,
        });
        trace!(name = %name, method = %method, path, cost, "Defined endpoint");

        if let Some(previous) = self.by_name.insert(name.clone(), Arc::clone(&descriptor)) {
            debug!(
                name = %name,
                previous = %previous.path,
                path,
                "Endpoint name collision, later definition wins"
            );
            self.by_alias.remove(&previous.alias);
        }
        self.by_alias.insert(alias, descriptor);
    }

    /// Looks up an endpoint by camelCase name or snake_case alias.
    pub fn get(&self, name: &str) -> Option<&Arc<EndpointDescriptor>> {
        self.by_name.get(name).or_else(|| self.by_alias.get(name))
    }

    /// Like [`get`](Self::get), failing with `NotSupported` for unknown names.
    pub fn require(&self, name: &str) -> Result<&Arc<EndpointDescriptor>> {
        self.get(name)
            .ok_or_else(|| Error::not_supported(format!("Unknown endpoint '{name}'")))
    }

    /// True if either name form is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of distinct endpoints.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// True if no endpoint is registered.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// camelCase names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// Descriptors in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EndpointDescriptor>> {
        self.by_name.values()
    }
}

/// Generates the camelCase name and snake_case alias of an endpoint.
///
/// ```rust
/// use ccxt_base::registry::{accessor_names, HttpMethod};
///
/// let groups = vec!["sapi".to_string(), "v1".to_string()];
/// let (camel, snake) = accessor_names(&groups, HttpMethod::Get, "margin/allPairs");
/// assert_eq!(camel, "sapiV1GetMarginAllPairs");
/// assert_eq!(snake, "sapi_v1_get_margin_allpairs");
/// ```
pub fn accessor_names(groups: &[String], method: HttpMethod, path: &str) -> (String, String) {
    let segments: Vec<&str> = path.split(|c: char| !c.is_ascii_alphanumeric()).collect();

    let mut camel = String::new();
    if let Some((first, rest)) = groups.split_first() {
        camel.push_str(first);
        rest.iter().for_each(|g| camel.push_str(&capitalize(g)));
    }
    camel.push_str(&capitalize(method.lowercase()));
    segments.iter().for_each(|s| camel.push_str(&capitalize(s)));
    let camel = lowercase_first(&camel);

    let snake = groups
        .iter()
        .map(|g| g.trim().to_string())
        .chain(std::iter::once(method.lowercase().to_string()))
        .chain(segments.iter().map(|s| s.to_lowercase()))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    (camel, snake)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Names of the `{placeholders}` in a path template, in order.
///
/// ```rust
/// use ccxt_base::registry::extract_params;
///
/// assert_eq!(extract_params("orders/{symbol}/{id}"), vec!["symbol", "id"]);
/// ```
pub fn extract_params(path: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else { break };
        let name = &after[..close];
        if !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            names.push(name);
        }
        rest = &after[close + 1..];
    }
    names
}

/// Substitutes `{placeholders}` with parameter values.
///
/// Strings are inserted verbatim, other JSON values in their JSON form.
/// Placeholders without a parameter are left in place.
pub fn implode_params(path: &str, params: &Params) -> String {
    let mut out = path.to_string();
    for (key, value) in params {
        if value.is_array() || value.is_object() {
            continue;
        }
        let needle = format!("{{{key}}}");
        if out.contains(&needle) {
            out = out.replace(&needle, &value_to_string(value));
        }
    }
    out
}

pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
