//! HTML rendering with minijinja. Templates are compiled into the binary.

use axum::response::Html;
use minijinja::{context, Environment};
use serde::Serialize;

use crate::context::{Module, RequestContext};
use crate::error::ApiError;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("about.html", include_str!("../templates/about.html")),
    ("affinity.html", include_str!("../templates/affinity.html")),
    ("protein.html", include_str!("../templates/protein.html")),
    ("structure.html", include_str!("../templates/structure.html")),
    ("browse.html", include_str!("../templates/browse.html")),
    ("drug_gene.html", include_str!("../templates/drug_gene.html")),
    ("clusters.html", include_str!("../templates/clusters.html")),
    ("evolution.html", include_str!("../templates/evolution.html")),
    ("chat.html", include_str!("../templates/chat.html")),
];

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Renders `name` with the request context as `ctx`, the page data as
    /// `page` and the navigation cards as `modules`.
    pub fn render<T: Serialize>(&self, name: &str, ctx: &RequestContext, page: T) -> Result<Html<String>, ApiError> {
        let modules: Vec<_> = Module::TOOLS.iter().map(|m| m.card()).collect();
        let html = self
            .env
            .get_template(name)?
            .render(context! { ctx => ctx, page => page, modules => modules })?;
        Ok(Html(html))
    }
}
