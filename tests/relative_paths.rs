use std::{env, fs, path::PathBuf};

use folio::{output::list_files, Paths};
use pretty_assertions::assert_eq;

// Changes the working directory of the process, so it lives in its own test
// binary.
#[tokio::test]
async fn rebuild_from_working_directory_ignores_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("folio.yml"),
        "site_name: Docs\nstatic_dirs:\n  - extras\n",
    )
    .unwrap();
    fs::write(dir.path().join("index.md"), "# Home").unwrap();
    fs::create_dir_all(dir.path().join("extras")).unwrap();
    fs::write(dir.path().join("extras/notes.md"), "# Notes").unwrap();
    env::set_current_dir(dir.path()).unwrap();

    let paths = Paths {
        input: PathBuf::from("."),
        output: PathBuf::from("site"),
    };
    let first = folio::build(&paths).await.unwrap();
    let first_files = list_files(&paths.output).await.unwrap();
    let second = folio::build(&paths).await.unwrap();

    assert_eq!(first.rendered, vec!["extras/notes.html", "index.html"]);
    assert_eq!(second, first);
    assert_eq!(list_files(&paths.output).await.unwrap(), first_files);
    assert!(!PathBuf::from("site/site").exists());
}
