use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use serde::Serialize;
use serde_yaml::Value;
use tera::{Context as TeraContext, Tera};

use crate::{
    config::SiteConfig,
    context::Context,
    data::{url_path, Document, PageMetadata},
    error::RenderError,
    markdown::MarkdownRenderer,
    navigation::{relative_url, root_prefix, SiteNav},
    pipeline::{ProcessingStep, Result},
};

use super::theme::PAGE_TEMPLATE;

/// An html page ready to be written
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedPage {
    /// output path relative to the site root
    pub path: String,
    pub html: String,
}

/// The `page` variable seen by templates
#[derive(Clone, Debug, Default, Serialize)]
pub struct PageView {
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub url: String,
    pub source: Option<String>,
    pub meta: BTreeMap<String, Value>,
    pub hide_navigation: bool,
    pub hide_toc: bool,
    pub is_homepage: bool,
    pub in_nav: bool,
}

impl PageView {
    pub fn from_document(document: &Document, url: &str, in_nav: bool) -> Self {
        let PageMetadata {
            description,
            icon,
            meta,
            ..
        } = document.metadata.clone();

        Self {
            title: document.title.clone(),
            description,
            icon,
            url: url.to_owned(),
            source: Some(url_path(&document.path)),
            meta,
            hide_navigation: document.metadata.hides("navigation"),
            hide_toc: document.metadata.hides("toc"),
            is_homepage: url == "index.html",
            in_nav,
        }
    }
}

pub struct RenderPage {
    pub tera: Arc<Tera>,
    pub markdown: Arc<MarkdownRenderer>,
    pub nav: Arc<SiteNav>,
    pub site_context: Arc<TeraContext>,
    pub ctx: Arc<Context>,

    /// output path of the page the site name links to
    pub home: String,
}

#[async_trait]
impl ProcessingStep for RenderPage {
    type Input = Document;
    type Output = RenderedPage;

    #[tracing::instrument(name = "render page", level = "trace", skip_all)]
    async fn process(&self, document: Self::Input) -> Result<Self::Output> {
        let url = document.output_path();
        let rendered = self.markdown.render(&document.body);
        let in_nav = self.nav.contains(&url);
        let mut context = (*self.site_context).clone();

        context.insert("page", &PageView::from_document(&document, &url, in_nav));
        context.insert("content", &rendered.html);
        context.insert("toc", &rendered.toc);
        self.insert_navigation(&mut context, &url);
        insert_links(&mut context, &self.ctx.config, &url, &self.home);

        let template_name = template_name(&document.metadata);
        tracing::debug!("Rendering {url} with {template_name}");

        let html = self
            .tera
            .render(&template_name, &context)
            .map_err(|source| RenderError::Template {
                template: template_name.clone(),
                path: document.path.clone(),
                source,
            })?;

        Ok(RenderedPage { path: url, html })
    }
}

impl RenderPage {
    fn insert_navigation(&self, context: &mut TeraContext, url: &str) {
        let (previous, next) = self.nav.neighbours(url);

        context.insert("nav", &self.nav.menu(url));
        context.insert("breadcrumbs", &self.nav.breadcrumbs(url));
        context.insert("previous_page", &previous);
        context.insert("next_page", &next);
    }
}

/// Links that depend on where the page lives in the output tree
pub(crate) fn insert_links(context: &mut TeraContext, config: &SiteConfig, url: &str, home: &str) {
    let prefix = root_prefix(url);
    let asset_url = |asset: &String| {
        if asset.contains("://") || asset.starts_with('/') {
            asset.to_owned()
        } else {
            format!("{prefix}{}", asset.trim_start_matches("./"))
        }
    };
    let extra_css: Vec<String> = config.extra_css.iter().map(asset_url).collect();
    let extra_javascript: Vec<String> = config.extra_javascript.iter().map(asset_url).collect();

    context.insert("base_url", &prefix);
    context.insert("home_url", &relative_url(url, home));
    context.insert("extra_css", &extra_css);
    context.insert("extra_javascript", &extra_javascript);
}

/// `template: landing` in the front matter selects `landing.html`
fn template_name(metadata: &PageMetadata) -> String {
    match &metadata.template {
        Some(name) if name.ends_with(".html") => name.to_owned(),
        Some(name) => format!("{name}.html"),
        None => PAGE_TEMPLATE.to_owned(),
    }
}
