//! Webhook template configuration.

use serde::Deserialize;

use super::defaults;

/// Webhook rendering configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Templates in match order. The first whose prefix matches wins.
    #[serde(default = "defaults::default_templates")]
    pub templates: Vec<TemplateConfig>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            templates: defaults::default_templates(),
        }
    }
}

/// One `[[webhook.templates]]` block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateConfig {
    /// Matched as a plain string prefix of the document's `ref`.
    pub ref_prefix: String,
    /// Output line; each `{}` takes the next resolved path.
    pub format: String,
    /// Dotted document paths, or `self` for the trailing ref component.
    pub paths: Vec<String>,
}

impl TemplateConfig {
    /// Number of `{}` placeholders in the format string.
    pub fn placeholder_count(&self) -> usize {
        self.format.matches("{}").count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_templates_are_consistent() {
        for template in WebhookConfig::default().templates {
            assert_eq!(template.placeholder_count(), template.paths.len());
        }
    }

    #[test]
    fn templates_parse_in_order() {
        let config: WebhookConfig = toml::from_str(
            r#"
[[templates]]
ref_prefix = "refs/heads/main"
format = "{} on main"
paths = ["sender.login"]

[[templates]]
ref_prefix = "refs/heads/"
format = "{} elsewhere"
paths = ["sender.login"]
"#,
        )
        .unwrap();
        assert_eq!(config.templates.len(), 2);
        assert_eq!(config.templates[0].ref_prefix, "refs/heads/main");
    }
}
