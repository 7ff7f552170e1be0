use std::{
    fs,
    path::{Path, PathBuf},
};

use folio::{
    error::{BuildError, ConfigError, RenderError},
    output::list_files,
    Paths,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn site(files: &[(&str, &str)]) -> (TempDir, Paths) {
    let dir = tempfile::tempdir().unwrap();
    for (path, contents) in files {
        let path = dir.path().join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    let paths = Paths {
        input: dir.path().to_owned(),
        output: dir.path().join("site"),
    };

    (dir, paths)
}

fn read(paths: &Paths, file: &str) -> String {
    fs::read_to_string(paths.output.join(file)).unwrap()
}

#[tokio::test]
async fn pages_link_to_each_other() {
    let (_dir, paths) = site(&[
        (
            "folio.yml",
            "site_name: Docs\nnav:\n  - Home: index.md\n  - About: about.md\n",
        ),
        ("index.md", "# Welcome\n\nHello"),
        ("about.md", "# About us\n"),
    ]);

    let report = folio::build(&paths).await.unwrap();

    assert_eq!(report.rendered, vec!["about.html", "index.html"]);
    assert!(report.skipped.is_empty());
    assert!(report.orphans.is_empty());

    let index = read(&paths, "index.html");
    assert!(index.contains("<title>Welcome - Docs</title>"));
    assert!(index.contains(r#"<a href="index.html" aria-current="page">Home</a>"#));
    assert!(index.contains(r#"<a href="about.html">About</a>"#));
    assert!(index.contains(r#"<a class="next" href="about.html">About</a>"#));

    let about = read(&paths, "about.html");
    assert!(about.contains(r#"<a href="index.html">Home</a>"#));
    assert!(about.contains(r#"<a href="about.html" aria-current="page">About</a>"#));
    assert!(about.contains(r#"<a class="previous" href="index.html">Home</a>"#));

    let sitemap = read(&paths, "sitemap.html");
    assert!(sitemap.contains(r#"<a href="index.html">Home</a>"#));
    assert!(sitemap.contains(r#"<a href="about.html">About</a>"#));
}

#[tokio::test]
async fn nested_pages_use_relative_links() {
    let (_dir, paths) = site(&[
        ("folio.yml", "site_name: Docs\nextra_css:\n  - css/site.css\n"),
        ("index.md", "# Home"),
        ("guide/setup.md", "# Setup"),
    ]);

    folio::build(&paths).await.unwrap();

    let setup = read(&paths, "guide/setup.html");
    assert!(setup.contains(r#"<a href="../index.html">Home</a>"#));
    assert!(setup.contains(r#"<link rel="stylesheet" href="../css/site.css">"#));
    assert!(setup.contains(r#"<span class="crumb">Guide</span>"#));
    assert!(setup.contains(r#"href="../sitemap.html""#));
}

#[tokio::test]
async fn missing_nav_target_aborts_without_output() {
    let (_dir, paths) = site(&[
        (
            "folio.yml",
            "site_name: Docs\nnav:\n  - Home: index.md\n  - Gone: missing.md\n",
        ),
        ("index.md", "# Home"),
    ]);

    let err = folio::build(&paths).await.unwrap_err();

    assert!(err.to_string().contains("missing.md"));
    match err {
        BuildError::Config(ConfigError::MissingNavTarget { path }) => {
            assert_eq!(path, PathBuf::from("missing.md"))
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!paths.output.exists());
}

#[tokio::test]
async fn rebuilds_are_byte_identical() {
    let (_dir, paths) = site(&[
        ("folio.yml", "site_name: Docs\nmarkdown_extensions:\n  - toc\n  - admonition\n  - pymdownx.emoji\n"),
        ("index.md", "# Home\n\n## Install :rocket:\n\n!!! note\n    Read this.\n"),
        ("a.md", "# A"),
        ("b/c.md", "# C"),
    ]);

    folio::build(&paths).await.unwrap();
    let first = snapshot(&paths.output).await;
    folio::build(&paths).await.unwrap();
    let second = snapshot(&paths.output).await;

    assert_eq!(first, second);
    assert!(!paths.output.with_file_name("site.staging").exists());
}

async fn snapshot(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    list_files(dir)
        .await
        .unwrap()
        .into_iter()
        .map(|p| {
            let contents = fs::read(dir.join(&p)).unwrap();
            (p, contents)
        })
        .collect()
}

#[tokio::test]
async fn malformed_front_matter_still_renders() {
    let (_dir, paths) = site(&[
        ("folio.yml", "site_name: Docs"),
        ("index.md", "---\ntitle: [unclosed\n---\n# Fallback title\n\nBody text\n"),
    ]);

    let report = folio::build(&paths).await.unwrap();

    assert!(report.skipped.is_empty());
    let index = read(&paths, "index.html");
    assert!(index.contains("<title>Fallback title - Docs</title>"));
    assert!(index.contains("<p>Body text</p>"));
}

#[tokio::test]
async fn orphans_are_rendered_but_not_linked() {
    let (_dir, paths) = site(&[
        ("folio.yml", "site_name: Docs\nnav:\n  - Home: index.md\n"),
        ("index.md", "# Home"),
        ("about.md", "# About"),
    ]);

    let report = folio::build(&paths).await.unwrap();

    assert_eq!(report.orphans, vec!["about.html"]);
    assert!(paths.output.join("about.html").is_file());
    assert!(!read(&paths, "index.html").contains("about.html"));
}

#[tokio::test]
async fn unreadable_pages_are_reported() {
    let (_dir, paths) = site(&[
        ("folio.yml", "site_name: Docs"),
        ("index.md", "# Home"),
    ]);
    fs::write(paths.input.join("broken.md"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();

    let report = folio::build(&paths).await.unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path, PathBuf::from("broken.md"));
    assert!(report.skipped[0].reason.contains("UTF-8"));
    assert_eq!(report.rendered, vec!["index.html"]);
    assert!(!paths.output.join("broken.html").exists());
    assert!(!read(&paths, "sitemap.html").contains("broken.html"));
}

#[tokio::test]
async fn static_dirs_are_copied() {
    let (_dir, paths) = site(&[
        ("folio.yml", "site_name: Docs\ndocs_dir: docs\nstatic_dirs:\n  - assets\n"),
        ("docs/index.md", "# Home"),
        ("docs/assets/css/site.css", "body {}"),
        ("docs/assets/logo.svg", "<svg/>"),
    ]);

    let report = folio::build(&paths).await.unwrap();

    assert_eq!(report.assets, 2);
    assert_eq!(
        list_files(&paths.output).await.unwrap(),
        vec![
            PathBuf::from("assets/css/site.css"),
            PathBuf::from("assets/logo.svg"),
            PathBuf::from("index.html"),
            PathBuf::from("sitemap.html"),
        ]
    );
    assert_eq!(read(&paths, "assets/css/site.css"), "body {}");
}

#[tokio::test]
async fn missing_static_dir_is_a_config_error() {
    let (_dir, paths) = site(&[
        ("folio.yml", "site_name: Docs\nstatic_dirs:\n  - assets\n"),
        ("index.md", "# Home"),
    ]);

    let err = folio::build(&paths).await.unwrap_err();

    assert!(matches!(
        err,
        BuildError::Config(ConfigError::MissingDirectory { .. })
    ));
    assert!(!paths.output.exists());
}

#[tokio::test]
async fn template_errors_keep_previous_output() {
    let (dir, paths) = site(&[
        (
            "folio.yml",
            "site_name: Docs\ntheme:\n  name: default\n  custom_dir: overrides\n",
        ),
        ("index.md", "# Home"),
        (
            "overrides/page.html",
            r#"{% extends "base.html" %}{% block content %}<div class="custom">{{ content | safe }}</div>{% endblock content %}"#,
        ),
    ]);
    folio::build(&paths).await.unwrap();
    assert!(read(&paths, "index.html").contains(r#"<div class="custom"><h1>Home</h1>"#));
    let before = snapshot(&paths.output).await;

    fs::write(
        dir.path().join("overrides/page.html"),
        r#"{% extends "base.html" %}{% block content %}{{ page.missing.field }}{% endblock content %}"#,
    )
    .unwrap();
    let err = folio::build(&paths).await.unwrap_err();

    assert!(matches!(
        err,
        BuildError::Render(RenderError::Template { .. })
    ));
    assert_eq!(snapshot(&paths.output).await, before);
    assert!(!paths.output.with_file_name("site.staging").exists());
}

#[tokio::test]
async fn output_containing_input_is_rejected() {
    let (dir, mut paths) = site(&[("folio.yml", "site_name: Docs"), ("index.md", "# Home")]);
    paths.output = dir.path().to_owned();

    let err = folio::build(&paths).await.unwrap_err();

    assert!(matches!(
        err,
        BuildError::Config(ConfigError::UnsafeOutput { .. })
    ));
    assert!(dir.path().join("index.md").is_file());
}

#[tokio::test]
async fn documents_with_the_same_output_are_rejected() {
    let (_dir, paths) = site(&[
        ("folio.yml", "site_name: Docs"),
        ("a.md", "# One"),
        ("a.markdown", "# Two"),
    ]);

    let err = folio::build(&paths).await.unwrap_err();

    match err {
        BuildError::Config(ConfigError::OutputCollision { output, .. }) => {
            assert_eq!(output, "a.html")
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!paths.output.exists());
}

#[tokio::test]
async fn static_dirs_must_stay_inside_docs() {
    let elsewhere = tempfile::tempdir().unwrap();
    fs::write(elsewhere.path().join("logo.svg"), "<svg/>").unwrap();

    for static_dir in [elsewhere.path().display().to_string(), "../assets".into()] {
        let config = format!("site_name: Docs\ndocs_dir: docs\nstatic_dirs:\n  - '{static_dir}'\n");
        let (_dir, paths) = site(&[
            ("folio.yml", config.as_str()),
            ("docs/index.md", "# Home"),
            ("assets/logo.svg", "<svg/>"),
        ]);

        let err = folio::build(&paths).await.unwrap_err();

        assert!(
            matches!(
                err,
                BuildError::Config(ConfigError::InvalidStaticDir { .. })
            ),
            "{static_dir}: {err:?}"
        );
        assert!(!paths.output.exists());
    }
    assert_eq!(
        list_files(elsewhere.path()).await.unwrap(),
        vec![PathBuf::from("logo.svg")]
    );
}

#[tokio::test]
async fn canonical_links_join_site_url() {
    for site_url in ["https://example.com/docs", "https://example.com/docs/"] {
        let config = format!("site_name: Docs\nsite_url: {site_url}\n");
        let (_dir, paths) = site(&[
            ("folio.yml", config.as_str()),
            ("index.md", "# Home"),
            ("guide/setup.md", "# Setup"),
        ]);

        folio::build(&paths).await.unwrap();

        assert!(read(&paths, "index.html")
            .contains(r#"<link rel="canonical" href="https://example.com/docs/index.html">"#));
        assert!(read(&paths, "guide/setup.html").contains(
            r#"<link rel="canonical" href="https://example.com/docs/guide/setup.html">"#
        ));
    }
}

#[tokio::test]
async fn output_inside_docs_dir_is_rejected() {
    let (dir, mut paths) = site(&[
        ("folio.yml", "site_name: Docs\ndocs_dir: docs\n"),
        ("docs/index.md", "# Home"),
    ]);
    paths.output = dir.path().join("docs");

    let err = folio::build(&paths).await.unwrap_err();

    assert!(matches!(
        err,
        BuildError::Config(ConfigError::UnsafeOutput { .. })
    ));
    assert!(dir.path().join("docs/index.md").is_file());
}
