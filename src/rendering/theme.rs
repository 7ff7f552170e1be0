use std::{collections::BTreeMap, path::Path};

use async_walkdir::WalkDir;
use futures::StreamExt;
use tera::Tera;
use tokio::fs;

use crate::{
    config::ThemeConfig,
    data::url_path,
    error::{BuildError, ConfigError, RenderError},
    processors,
};

pub const BUILTIN_THEMES: [&str; 2] = ["default", "material"];

pub const PAGE_TEMPLATE: &str = "page.html";
pub const SITEMAP_TEMPLATE: &str = "sitemap.html";

const BUILTIN_TEMPLATES: [(&str, &str); 4] = [
    ("macros.html", include_str!("../../theme/default/macros.html")),
    ("base.html", include_str!("../../theme/default/base.html")),
    (PAGE_TEMPLATE, include_str!("../../theme/default/page.html")),
    (SITEMAP_TEMPLATE, include_str!("../../theme/default/sitemap.html")),
];

/// Loads the built-in templates and layers the templates of the theme's
/// `custom_dir` on top of them
#[tracing::instrument(level = "trace", skip_all)]
pub async fn load_theme(theme: &ThemeConfig, base_dir: &Path) -> Result<Tera, BuildError> {
    let custom_dir = theme.custom_dir.as_ref().map(|d| base_dir.join(d));

    if custom_dir.is_none() && !BUILTIN_THEMES.contains(&theme.name.as_str()) {
        return Err(ConfigError::UnknownTheme {
            name: theme.name.to_owned(),
        }
        .into());
    }
    let mut templates: BTreeMap<String, String> = BUILTIN_TEMPLATES
        .iter()
        .map(|(name, source)| (name.to_string(), source.to_string()))
        .collect();

    if let Some(dir) = custom_dir {
        let overrides = read_templates(&dir).await?;
        tracing::debug!("Loaded {} templates from {dir:?}", overrides.len());
        templates.extend(overrides);
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(templates.into_iter().collect::<Vec<_>>())
        .map_err(|source| RenderError::Theme { source })?;
    processors::register_all(&mut tera);

    Ok(tera)
}

async fn read_templates(dir: &Path) -> Result<BTreeMap<String, String>, BuildError> {
    if !dir.is_dir() {
        return Err(ConfigError::MissingDirectory {
            path: dir.to_owned(),
        }
        .into());
    }
    let mut entries = WalkDir::new(dir);
    let mut templates = BTreeMap::new();

    while let Some(res) = entries.next().await {
        let entry = res.map_err(|source| RenderError::ThemeIo {
            path: dir.to_owned(),
            source,
        })?;
        let entry_path = entry.path();
        if !entry_path.is_file() {
            continue;
        }
        let Ok(rel_path) = entry_path.strip_prefix(dir) else {
            continue;
        };
        let source = fs::read_to_string(&entry_path)
            .await
            .map_err(|source| RenderError::ThemeIo {
                path: entry_path.clone(),
                source,
            })?;
        templates.insert(url_path(rel_path), source);
    }

    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tera::Context as TeraContext;

    #[tokio::test]
    async fn unknown_theme_without_custom_dir_fails() {
        let theme = ThemeConfig {
            name: "readthedocs".into(),
            ..Default::default()
        };
        let res = load_theme(&theme, Path::new(".")).await;
        assert!(matches!(
            res,
            Err(BuildError::Config(ConfigError::UnknownTheme { .. }))
        ));
    }

    #[tokio::test]
    async fn builtin_templates_are_registered() {
        let tera = load_theme(&ThemeConfig::default(), Path::new("."))
            .await
            .unwrap();
        let names: Vec<_> = tera.get_template_names().collect();

        for (name, _) in BUILTIN_TEMPLATES {
            assert!(names.contains(&name));
        }
    }

    #[tokio::test]
    async fn custom_dir_overrides_builtin_templates() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = dir.path().join("overrides");
        std::fs::create_dir_all(overrides.join("partials")).unwrap();
        std::fs::write(
            overrides.join(PAGE_TEMPLATE),
            "{% extends \"base.html\" %}{% block content %}custom {{ content | safe }}{% endblock content %}",
        )
        .unwrap();
        std::fs::write(overrides.join("partials/extra.html"), "extra").unwrap();

        let theme = ThemeConfig {
            name: "mytheme".into(),
            custom_dir: Some("overrides".into()),
            ..Default::default()
        };
        let tera = load_theme(&theme, dir.path()).await.unwrap();

        let rendered = tera
            .render("partials/extra.html", &TeraContext::new())
            .unwrap();
        assert_eq!(rendered, "extra");
        assert!(tera.get_template_names().any(|n| n == "base.html"));
    }

    #[tokio::test]
    async fn broken_custom_template_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.html"), "{% if %}").unwrap();

        let theme = ThemeConfig {
            custom_dir: Some(".".into()),
            ..Default::default()
        };
        let res = load_theme(&theme, dir.path()).await;
        assert!(matches!(res, Err(BuildError::Render(RenderError::Theme { .. }))));
    }
}
