//! Webhook rendering.
//!
//! A JSON event document is matched against an ordered list of templates by
//! the prefix of its `ref` field, and the first match renders one chat line
//! from dotted field paths:
//!
//! ```text
//! {"ref":"refs/tags/v1.2.3", "repository":{"name":"r"}, ...}
//!        │
//!        ▼  prefix "refs/tags/v"
//! "[{}] {} released version {} {}"  ←  repository.name, sender.login, self, repository.url
//! ```

mod template;
mod value;

pub use template::{FieldPath, TemplateEngine, WebhookTemplate};
pub use value::DocValue;
