use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use serde::Serialize;
use serde_yaml::Value;
use tera::{Context as TeraContext, Tera};

use crate::{
    config::{SiteMeta, ThemeConfig},
    content_loader::SiteContent,
    context::Context,
    error::{BuildError, RenderError},
    markdown::MarkdownRenderer,
    navigation::SiteNav,
    pipeline::{ProcessingStep, ProcessingStepParallel},
};

use self::render_page::{insert_links, PageView, RenderPage};

mod render_page;
pub mod theme;

pub use render_page::RenderedPage;
pub use theme::load_theme;

/// Output path of the rendered navigation index
pub const SITEMAP_PATH: &str = "sitemap.html";

/// The `config` variable seen by templates
#[derive(Serialize)]
struct ConfigView<'a> {
    #[serde(flatten)]
    site: &'a SiteMeta,
    theme: &'a ThemeConfig,
    extra: &'a BTreeMap<String, Value>,
}

#[derive(Debug)]
pub struct RenderedSite {
    /// one page per loaded document, ordered by source path
    pub pages: Vec<RenderedPage>,
    pub sitemap: RenderedPage,

    /// output paths of pages that no navigation entry links to
    pub orphans: Vec<String>,
}

// renders documents using the theme templates
pub struct ContentRenderer {
    ctx: Arc<Context>,
    tera: Arc<Tera>,
    markdown: Arc<MarkdownRenderer>,
}

impl ContentRenderer {
    pub fn new(ctx: Arc<Context>, tera: Tera, markdown: MarkdownRenderer) -> Self {
        Self {
            ctx,
            tera: Arc::new(tera),
            markdown: Arc::new(markdown),
        }
    }

    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn render_all(&self, content: &SiteContent) -> Result<RenderedSite, BuildError> {
        let nav = Arc::new(SiteNav::resolve(&content.nav, &content.documents));
        let site_context = Arc::new(self.site_context());
        let home = home_page(&nav, &content.documents);

        let pages = RenderPage {
            tera: self.tera.clone(),
            markdown: self.markdown.clone(),
            nav: nav.clone(),
            site_context: site_context.clone(),
            ctx: self.ctx.clone(),
            home: home.clone(),
        }
        .parallel()
        .process(content.documents.values().cloned().collect())
        .await?;

        // every page is resolved at this point, the index can be built
        let sitemap = self.render_sitemap(&nav, &site_context, &home)?;
        let orphans: Vec<String> = pages
            .iter()
            .filter(|p| !nav.contains(&p.path))
            .map(|p| p.path.clone())
            .collect();
        for orphan in &orphans {
            tracing::info!("{orphan} is not included in the navigation");
        }

        Ok(RenderedSite {
            pages,
            sitemap,
            orphans,
        })
    }

    fn site_context(&self) -> TeraContext {
        let config = &self.ctx.config;
        let mut context = TeraContext::new();
        context.insert(
            "config",
            &ConfigView {
                site: &config.site,
                theme: &config.theme,
                extra: &config.extra,
            },
        );

        context
    }

    fn render_sitemap(
        &self,
        nav: &SiteNav,
        site_context: &TeraContext,
        home: &str,
    ) -> Result<RenderedPage, BuildError> {
        let mut context = site_context.clone();
        let page = PageView {
            title: "Site map".into(),
            url: SITEMAP_PATH.into(),
            hide_navigation: true,
            hide_toc: true,
            ..Default::default()
        };

        context.insert("page", &page);
        context.insert("content", "");
        context.insert("toc", &Vec::<()>::new());
        context.insert("nav", &nav.menu(SITEMAP_PATH));
        context.insert("breadcrumbs", &Vec::<String>::new());
        context.insert("previous_page", &None::<()>);
        context.insert("next_page", &None::<()>);
        insert_links(&mut context, &self.ctx.config, SITEMAP_PATH, home);

        let html = self
            .tera
            .render(theme::SITEMAP_TEMPLATE, &context)
            .map_err(|source| RenderError::Template {
                template: theme::SITEMAP_TEMPLATE.into(),
                path: PathBuf::from(SITEMAP_PATH),
                source,
            })?;

        Ok(RenderedPage {
            path: SITEMAP_PATH.into(),
            html,
        })
    }
}

/// `index.html` when there is one, otherwise the first page of the
/// navigation, otherwise the sitemap
fn home_page<T>(nav: &SiteNav, documents: &BTreeMap<PathBuf, T>) -> String {
    if documents.contains_key(&PathBuf::from("index.md")) {
        return "index.html".into();
    }
    nav.pages()
        .into_iter()
        .next()
        .map(|p| p.url)
        .unwrap_or_else(|| SITEMAP_PATH.into())
}
