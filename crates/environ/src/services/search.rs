// crates/environ/src/services/search.rs
// ============================================================================
// Module: Search Descriptor
// Description: Parses `SEARCH_URL` values into search engine settings.
// Purpose: Map search URL schemes onto framework search engines.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! HTTP engines (`elasticsearch`, `solr`) are rewritten to an `http://` URL;
//! `elasticsearch://host:9200/prefix/index` also yields `INDEX_NAME = index`.
//! File engines (`whoosh`, `xapian`) store an index directory in `PATH`.
//! Recognised query parameters are lifted into typed fields; everything else
//! lands in `OPTIONS`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use percent_encoding::AsciiSet;
use percent_encoding::CONTROLS;
use percent_encoding::utf8_percent_encode;
use serde::Deserialize;
use serde::Serialize;

use super::backend_for;
use crate::cast::CastOptions;
use crate::cast::FromEnvValue;
use crate::cast::parse_bool;
use crate::cast::split_list;
use crate::error::ValueError;
use crate::url_parts::UrlParts;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Supported search schemes and their engines.
const SEARCH_SCHEMES: &[(&str, &str)] = &[
    ("elasticsearch", "haystack.backends.elasticsearch_backend.ElasticsearchSearchEngine"),
    ("solr", "haystack.backends.solr_backend.SolrEngine"),
    ("whoosh", "haystack.backends.whoosh_backend.WhooshEngine"),
    ("xapian", "haystack.backends.xapian_backend.XapianEngine"),
    ("simple", "haystack.backends.simple_backend.SimpleEngine"),
];

/// Characters escaped when credentials are written back into a URL.
const USERINFO: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

// ============================================================================
// SECTION: Types
// ============================================================================

/// Search engine settings block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct SearchConfig {
    /// Engine class path.
    pub engine: String,
    /// HTTP endpoint for `elasticsearch` and `solr`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Index name for `elasticsearch`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    /// Index directory for `whoosh` and `xapian`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Indexes excluded from indexing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_indexes: Option<Vec<String>>,
    /// Enable spelling suggestions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_spelling: Option<bool>,
    /// Indexing batch size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u64>,
    /// Request timeout in seconds (HTTP engines).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Extra client arguments (HTTP engines).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kwargs: Option<String>,
    /// Storage kind (`whoosh`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    /// Post size limit in bytes (`whoosh`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_limit: Option<u64>,
    /// Database flags (`xapian`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,
    /// Unrecognised query parameters.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl SearchConfig {
    /// Parses a search URL.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] (parse kind) for malformed URLs, unsupported
    /// schemes, or non-numeric numeric options.
    pub fn parse(raw: &str) -> Result<Self, ValueError> {
        let parts =
            UrlParts::parse(raw).map_err(|err| ValueError::parse(Self::TARGET, err.reason))?;
        let engine = backend_for(SEARCH_SCHEMES, &parts.scheme).ok_or_else(|| {
            ValueError::parse(Self::TARGET, format!("unsupported scheme `{}`", parts.scheme))
        })?;

        let mut params = parts.query.clone();
        let mut config = Self {
            engine: engine.to_string(),
            excluded_indexes: params
                .remove("EXCLUDED_INDEXES")
                .map(|raw| split_list(&raw, ',').into_iter().map(str::to_string).collect()),
            include_spelling: params.remove("INCLUDE_SPELLING").map(|raw| parse_bool(&raw)),
            batch_size: take_number(&mut params, "BATCH_SIZE")?,
            ..Self::default()
        };

        let path = parts.path_name().trim_end_matches('/');
        match parts.scheme.as_str() {
            "elasticsearch" | "solr" => {
                config.kwargs = params.remove("KWARGS");
                config.timeout = take_number(&mut params, "TIMEOUT")?;
                let (prefix, index) = if parts.scheme == "elasticsearch" {
                    path.rsplit_once('/').map_or(("", Some(path)), |(p, i)| (p, Some(i)))
                } else {
                    (path, None)
                };
                config.url = Some(http_url(&parts, prefix));
                config.index_name = index.filter(|name| !name.is_empty()).map(str::to_string);
            }
            "whoosh" | "xapian" => {
                config.path = Some(format!("/{path}"));
                config.storage = params.remove("STORAGE");
                config.post_limit = take_number(&mut params, "POST_LIMIT")?;
                config.flags = params.remove("FLAGS");
            }
            _ => {}
        }
        config.options = params;
        Ok(config)
    }
}

impl FromEnvValue for SearchConfig {
    const TARGET: &'static str = "search url";

    fn from_env_value(raw: &str, _options: &CastOptions) -> Result<Self, ValueError> {
        Self::parse(raw)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Removes `key` from `params` and parses it as an unsigned integer.
fn take_number(params: &mut BTreeMap<String, String>, key: &str) -> Result<Option<u64>, ValueError> {
    params
        .remove(key)
        .map(|raw| {
            raw.trim().parse::<u64>().map_err(|err| {
                ValueError::parse(SearchConfig::TARGET, format!("option `{key}`: {err}"))
            })
        })
        .transpose()
}

/// Rebuilds an `http://` endpoint from the URL authority and `path`.
fn http_url(parts: &UrlParts, path: &str) -> String {
    let encode = |raw: &str| utf8_percent_encode(raw, USERINFO).to_string();
    let user = parts.username.as_deref().map(encode);
    let password = parts.password.as_deref().map(encode);
    let credentials = match (user, password) {
        (Some(user), Some(password)) => format!("{user}:{password}@"),
        (Some(user), None) => format!("{user}@"),
        (None, Some(password)) => format!(":{password}@"),
        (None, None) => String::new(),
    };
    let path = if path.is_empty() { String::new() } else { format!("/{path}") };
    format!("http://{credentials}{}{path}", parts.host_port())
}
