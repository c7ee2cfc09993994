//! Template matching and rendering.

use tracing::debug;

use super::value::DocValue;
use crate::config::{TemplateConfig, WebhookConfig};
use crate::error::{RelayError, RelayResult};

/// Path sentinel naming the trailing component of the document's ref.
pub const SELF_PATH: &str = "self";

/// A field reference inside a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPath {
    /// Last `/` component of the ref, after the matched prefix.
    SelfRef,
    /// Dotted keys from the document root; the last one is the leaf.
    Keys(Vec<String>),
}

impl FieldPath {
    pub fn parse(raw: &str) -> Self {
        if raw == SELF_PATH {
            Self::SelfRef
        } else {
            Self::Keys(raw.split('.').map(str::to_string).collect())
        }
    }

    fn display(&self) -> String {
        match self {
            Self::SelfRef => SELF_PATH.to_string(),
            Self::Keys(keys) => keys.join("."),
        }
    }
}

/// One compiled template.
#[derive(Debug, Clone)]
pub struct WebhookTemplate {
    pub ref_prefix: String,
    pub format: String,
    pub paths: Vec<FieldPath>,
}

impl From<&TemplateConfig> for WebhookTemplate {
    fn from(config: &TemplateConfig) -> Self {
        Self {
            ref_prefix: config.ref_prefix.clone(),
            format: config.format.clone(),
            paths: config.paths.iter().map(|p| FieldPath::parse(p)).collect(),
        }
    }
}

impl WebhookTemplate {
    fn resolve(&self, root: &DocValue, git_ref: &str) -> RelayResult<Vec<String>> {
        self.paths
            .iter()
            .map(|path| match path {
                FieldPath::SelfRef => Ok(self_value(git_ref, &self.ref_prefix)),
                FieldPath::Keys(keys) => lookup(root, keys).map(str::to_string),
            })
            .collect()
    }

    fn render(&self, values: &[String]) -> String {
        let mut parts = self.format.split("{}");
        let mut out = parts.next().unwrap_or_default().to_string();
        for (i, part) in parts.enumerate() {
            match values.get(i) {
                Some(value) => out.push_str(value),
                None => out.push_str("{}"),
            }
            out.push_str(part);
        }
        out
    }
}

/// Renders webhook documents through an ordered template list.
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    templates: Vec<WebhookTemplate>,
}

impl TemplateEngine {
    pub fn new(config: &WebhookConfig) -> Self {
        Self {
            templates: config.templates.iter().map(WebhookTemplate::from).collect(),
        }
    }

    /// Decode a JSON body and render it.
    pub fn render_body(&self, body: &[u8]) -> RelayResult<String> {
        let doc = DocValue::from_json(body)
            .map_err(|e| RelayError::MalformedWebhook(e.to_string()))?;
        self.render(&doc)
    }

    /// Render a decoded document with the first template whose prefix matches its ref.
    pub fn render(&self, doc: &DocValue) -> RelayResult<String> {
        let root = doc
            .as_mapping()
            .ok_or_else(|| RelayError::MalformedWebhook("document is not an object".into()))?;
        let git_ref = match root.get("ref") {
            Some(DocValue::String(s)) => s.as_str(),
            Some(other) => {
                return Err(RelayError::MalformedWebhook(format!(
                    "'ref' is a {}, not a string",
                    other.kind()
                )));
            }
            None => return Err(RelayError::MalformedWebhook("missing 'ref' field".into())),
        };

        let template = self
            .templates
            .iter()
            .find(|t| git_ref.starts_with(&t.ref_prefix))
            .ok_or_else(|| RelayError::NoTemplateMatch(git_ref.to_string()))?;
        debug!(git_ref = %git_ref, prefix = %template.ref_prefix, "Webhook template matched");

        let values = template.resolve(doc, git_ref)?;
        Ok(template.render(&values))
    }
}

/// Trailing ref component once the matched prefix is removed.
fn self_value(git_ref: &str, prefix: &str) -> String {
    let rest = git_ref.strip_prefix(prefix).unwrap_or(git_ref);
    rest.rsplit('/').next().unwrap_or(rest).to_string()
}

fn lookup<'a>(root: &'a DocValue, keys: &[String]) -> RelayResult<&'a str> {
    let path_err = |reason: String| RelayError::PathResolutionError {
        path: keys.join("."),
        reason,
    };

    let Some((leaf, parents)) = keys.split_last() else {
        return Err(path_err("empty path".into()));
    };

    let mut node = root;
    for key in parents {
        let map = node
            .as_mapping()
            .ok_or_else(|| path_err(format!("parent of '{}' is a {}", key, node.kind())))?;
        node = map
            .get(key)
            .ok_or_else(|| path_err(format!("'{}' is missing", key)))?;
    }

    let map = node
        .as_mapping()
        .ok_or_else(|| path_err(format!("parent of '{}' is a {}", leaf, node.kind())))?;
    match map.get(leaf) {
        Some(DocValue::String(s)) => Ok(s),
        Some(other) => Err(path_err(format!("'{}' is a {}", leaf, other.kind()))),
        None => Err(path_err(format!("'{}' is missing", leaf))),
    }
}
