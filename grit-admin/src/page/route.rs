//! Routes of the dedicated form pages

use anyhow::{Result, bail};
use url::Url;

/// A form page route: `/resources/{slug}?action=create` or
/// `/resources/{slug}?action=edit&edit={id}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormRoute {
    Create { slug: String },
    Edit { slug: String, id: i64 },
}

impl FormRoute {
    pub fn slug(&self) -> &str {
        match self {
            FormRoute::Create { slug } | FormRoute::Edit { slug, .. } => slug,
        }
    }

    pub fn to_path(&self) -> String {
        match self {
            FormRoute::Create { slug } => format!("/resources/{}?action=create", slug),
            FormRoute::Edit { slug, id } => {
                format!("/resources/{}?action=edit&edit={}", slug, id)
            }
        }
    }

    pub fn parse(route: &str) -> Result<Self> {
        let url = Url::parse("http://localhost")
            .and_then(|base| base.join(route))
            .map_err(|e| anyhow::anyhow!("Invalid route '{}': {}", route, e))?;

        let mut segments = url.path_segments().into_iter().flatten();
        let slug = match (segments.next(), segments.next(), segments.next()) {
            (Some("resources"), Some(slug), None) if !slug.is_empty() => slug.to_string(),
            _ => bail!("Route must look like /resources/<slug>?action=..., got '{}'", route),
        };

        let param = |name: &str| {
            url.query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        };
        match param("action").as_deref() {
            Some("create") => Ok(FormRoute::Create { slug }),
            Some("edit") => {
                let Some(raw) = param("edit") else {
                    bail!("Edit route is missing the edit=<id> parameter");
                };
                let id = raw
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid record id '{}'", raw))?;
                Ok(FormRoute::Edit { slug, id })
            }
            Some(other) => bail!("Unknown form action '{}'", other),
            None => bail!("Route has no action parameter"),
        }
    }
}
