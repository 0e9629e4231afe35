// tests/project_files.rs

use std::fs;
use std::path::Path;

use dotwatch::config::{ConfigFile, RawConfigFile, load_for_project};
use dotwatch::fileset::{FileSetFactory, GlobFileSetFactory};
use dotwatch_test_utils::{ConfigFileBuilder, init_tracing};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// A small console project with build output next to the sources.
fn sample_project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    for (path, contents) in [
        ("app.csproj", "<Project Sdk=\"Microsoft.NET.Sdk\" />"),
        ("Program.cs", "class Program {}"),
        ("src/Util.cs", "class Util {}"),
        ("wwwroot/site.css", "body {}"),
        ("bin/Debug/app.dll", ""),
        ("obj/project.assets.json", "{}"),
    ] {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, contents).unwrap();
    }
    dir
}

async fn collect(root: &Path, cfg: &ConfigFile) -> Vec<String> {
    let factory = GlobFileSetFactory::new(root, cfg.patterns().unwrap());
    let set = factory
        .create(&CancellationToken::new())
        .await
        .unwrap()
        .expect("file set");
    let root = root.canonicalize().unwrap();
    set.files()
        .map(|p| {
            p.strip_prefix(&root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[tokio::test]
async fn defaults_skip_build_output() {
    init_tracing();
    let project = sample_project();
    let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();

    let files = collect(project.path(), &cfg).await;

    assert_eq!(
        files,
        vec!["Program.cs", "app.csproj", "src/Util.cs", "wwwroot/site.css"]
    );
}

#[tokio::test]
async fn include_and_exclude_patterns_narrow_the_set() {
    let project = sample_project();
    let cfg = ConfigFileBuilder::new()
        .only_include("**/*.cs")
        .include("*.csproj")
        .exclude("src/**")
        .build();

    let files = collect(project.path(), &cfg).await;

    assert_eq!(files, vec!["Program.cs", "app.csproj"]);
}

#[tokio::test]
async fn no_matching_files_means_no_file_set() {
    let project = sample_project();
    let cfg = ConfigFileBuilder::new().only_include("**/*.fs").build();
    let factory = GlobFileSetFactory::new(project.path(), cfg.patterns().unwrap());

    let set = factory.create(&CancellationToken::new()).await.unwrap();
    assert!(set.is_none());
}

#[tokio::test]
async fn cancelled_walk_yields_nothing() {
    let project = sample_project();
    let factory = GlobFileSetFactory::new(
        project.path(),
        ConfigFileBuilder::new().build().patterns().unwrap(),
    );
    let cancel = CancellationToken::new();
    cancel.cancel();

    assert!(factory.create(&cancel).await.unwrap().is_none());
}

#[test]
fn project_config_file_drives_the_command() {
    let project = sample_project();
    fs::write(
        project.path().join("dotwatch.toml"),
        r#"
[command]
executable = "dotnet"
args = ["test", "--logger", "console"]
env = { ASPNETCORE_ENVIRONMENT = "Development" }

[watch]
debounce_ms = 20
"#,
    )
    .unwrap();

    let cfg = load_for_project(None, project.path()).unwrap();
    let spec = cfg.process_spec(&[], project.path());

    assert_eq!(spec.executable, "dotnet");
    assert_eq!(spec.arguments, vec!["test", "--logger", "console"]);
    assert_eq!(spec.environment["ASPNETCORE_ENVIRONMENT"], "Development");
    assert_eq!(cfg.watcher_options().debounce.as_millis(), 20);
    assert_eq!(spec.working_directory.as_deref(), Some(project.path()));
}

#[test]
fn builder_env_lands_in_the_process_spec() {
    let cfg = ConfigFileBuilder::new()
        .command("dotnet", &["watch-me"])
        .env("DOTNET_ENVIRONMENT", "Staging")
        .debounce_ms(5)
        .build();

    let spec = cfg.process_spec(&[], Path::new("/proj"));

    assert_eq!(spec.arguments, vec!["watch-me"]);
    assert_eq!(spec.environment["DOTNET_ENVIRONMENT"], "Staging");
}

#[test]
fn invalid_glob_is_rejected_at_validation() {
    let raw = ConfigFileBuilder::new().only_include("src/[").raw();
    assert!(ConfigFile::try_from(raw).is_err());
}
