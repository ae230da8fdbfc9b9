use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::archive::{self, JarSource};
use crate::config::{RunConfig, Source};
use crate::discovery;
use crate::driver;
use crate::interrupt::Interrupt;
use crate::maven::{Coordinate, MavenClient};
use crate::select::{self, Prompt};

pub struct Summary {
    pub output_dir: PathBuf,
    pub converted: usize,
}

struct Acquired {
    jar: JarSource,
    artifact: String,
    version: Option<String>,
}

/// `{output}/{artifact}-{version}`, with `latest` standing in for an unknown version.
pub fn output_dir(output: &Path, artifact: &str, version: Option<&str>) -> PathBuf {
    output.join(format!("{}-{}", artifact, version.unwrap_or("latest")))
}

/// Acquire, unpack, discover, convert. The downloaded jar and the
/// extraction directory are removed when this returns, on success or error.
pub async fn run(
    config: &RunConfig,
    prompt: &mut dyn Prompt,
    interrupt: &Interrupt,
) -> Result<Summary> {
    let acquired = acquire(config, prompt, interrupt).await?;
    let out_dir = output_dir(&config.output, &acquired.artifact, acquired.version.as_deref());

    let scratch = archive::extract_jar(acquired.jar.path(), &config.scratch_root, interrupt)?;
    interrupt.check()?;

    let pages = discovery::discover_class_pages(scratch.path())?;
    info!("Found {} class pages", pages.len());

    let stats = driver::convert_pages(&pages, &out_dir, interrupt)?;
    Ok(Summary {
        output_dir: out_dir,
        converted: stats.converted,
    })
}

async fn acquire(
    config: &RunConfig,
    prompt: &mut dyn Prompt,
    interrupt: &Interrupt,
) -> Result<Acquired> {
    match &config.source {
        Source::LocalJar {
            path,
            artifact,
            version,
        } => {
            println!("Using local jar: {}", path.display());
            Ok(Acquired {
                jar: JarSource::Local(path.clone()),
                artifact: artifact.clone(),
                version: version.clone(),
            })
        }
        Source::Coordinate(coordinate) => {
            println!(
                "Downloading javadoc jar for {}:{}:{}...",
                coordinate.group,
                coordinate.artifact,
                coordinate.version.as_deref().unwrap_or("latest")
            );
            let client = MavenClient::new(&config.repository_url, &config.search_url)?;
            download(&client, coordinate, config, interrupt).await
        }
        Source::Search { artifact, version } => {
            println!("ArtifactId '{}' provided without groupId.", artifact);
            println!("Searching for available groupIds and versions on Maven Central...");
            let client = MavenClient::new(&config.repository_url, &config.search_url)?;
            let groups = client.search_artifact(artifact).await?;
            let (group, version) =
                select::select_release(prompt, artifact, &groups, version.as_deref())?;
            println!("Selected: {}:{}:{}", group, artifact, version);

            let coordinate = Coordinate {
                group,
                artifact: artifact.clone(),
                version: Some(version),
            };
            download(&client, &coordinate, config, interrupt).await
        }
    }
}

async fn download(
    client: &MavenClient,
    coordinate: &Coordinate,
    config: &RunConfig,
    interrupt: &Interrupt,
) -> Result<Acquired> {
    let jar = client
        .download_javadoc(coordinate, &config.scratch_root, interrupt)
        .await?;
    println!("Downloaded version: {}", jar.version);
    Ok(Acquired {
        jar: JarSource::Downloaded(jar.file),
        artifact: coordinate.artifact.clone(),
        version: Some(jar.version),
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::jar_bytes;
    use crate::select::FirstChoice;
    use pretty_assertions::assert_eq;

    const CLASS_PAGE: &str = r#"<html><body><main><section class="summary"><p>Foo does <a href="Bar.html">bar</a></p></section></main></body></html>"#;

    fn javadoc_jar() -> Vec<u8> {
        jar_bytes(&[
            ("index.html", CLASS_PAGE),
            ("overview-tree.html", CLASS_PAGE),
            ("allclasses-index.html", CLASS_PAGE),
            ("deprecated-list.html", CLASS_PAGE),
            ("stylesheet.css", "body {}"),
            ("com/example/Foo.html", CLASS_PAGE),
            ("com/example/package-summary.html", CLASS_PAGE),
        ])
    }

    /// Output goes to `{root}/out`, scratch files to `{root}/scratch`.
    fn config(source: Source, root: &Path, server_url: &str) -> RunConfig {
        let scratch_root = root.join("scratch");
        std::fs::create_dir_all(&scratch_root).unwrap();
        RunConfig {
            source,
            output: root.join("out"),
            repository_url: server_url.to_string(),
            search_url: format!("{server_url}/solrsearch/select"),
            scratch_root,
            interactive: false,
        }
    }

    fn scratch_leftovers(root: &Path) -> Vec<String> {
        std::fs::read_dir(root.join("scratch"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn output_dir_naming() {
        assert_eq!(
            output_dir(Path::new("docs"), "guava", Some("33.0.0-jre")),
            PathBuf::from("docs/guava-33.0.0-jre")
        );
        assert_eq!(
            output_dir(Path::new("docs"), "unknown", None),
            PathBuf::from("docs/unknown-latest")
        );
    }

    #[tokio::test]
    async fn converts_local_jar() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("demo-javadoc.jar");
        std::fs::write(&jar, javadoc_jar()).unwrap();

        let source = Source::LocalJar {
            path: jar.clone(),
            artifact: "demo".into(),
            version: None,
        };
        let config = config(source, dir.path(), "http://127.0.0.1:9");
        let summary = run(&config, &mut FirstChoice, &Interrupt::default())
            .await
            .unwrap();

        let root = dir.path().join("out/demo-latest");
        assert_eq!(summary.output_dir, root);
        assert_eq!(summary.converted, 2);
        let foo = std::fs::read_to_string(root.join("com/example/Foo.md")).unwrap();
        assert!(foo.contains("Foo does bar"));
        assert!(!foo.contains("Bar.html"));
        assert!(root.join("com/example/package-summary.md").is_file());
        for skipped in [
            "index.md",
            "overview-tree.md",
            "allclasses-index.md",
            "deprecated-list.md",
            "stylesheet.md",
        ] {
            assert!(!root.join(skipped).exists(), "{skipped} should not be converted");
        }
        assert!(jar.exists(), "local jar must not be deleted");
        assert_eq!(scratch_leftovers(dir.path()), Vec::<String>::new());
    }

    #[tokio::test]
    async fn latest_version_names_output_dir() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/com/example/demo/maven-metadata.xml")
            .with_status(200)
            .with_body("<metadata><versioning><latest>9.9.9</latest></versioning></metadata>")
            .create_async()
            .await;
        server
            .mock("GET", "/com/example/demo/9.9.9/demo-9.9.9-javadoc.jar")
            .with_status(200)
            .with_body(javadoc_jar())
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let source = Source::Coordinate(Coordinate {
            group: "com.example".into(),
            artifact: "demo".into(),
            version: None,
        });
        let config = config(source, dir.path(), &server.url());
        let summary = run(&config, &mut FirstChoice, &Interrupt::default())
            .await
            .unwrap();

        let out = dir.path().join("out");
        assert_eq!(summary.output_dir, out.join("demo-9.9.9"));
        assert!(out.join("demo-9.9.9/com/example/Foo.md").is_file());
        assert_eq!(scratch_leftovers(dir.path()), Vec::<String>::new());
    }

    #[tokio::test]
    async fn failed_conversion_leaves_no_scratch_files() {
        let mut server = mockito::Server::new_async().await;
        let jar = jar_bytes(&[
            ("com/example/Bar.html", CLASS_PAGE.as_bytes()),
            ("com/example/Foo.html", &[0x3c, 0x68, 0xff, 0xfe, 0x3e][..]),
        ]);
        server
            .mock("GET", "/com/example/demo/1.0/demo-1.0-javadoc.jar")
            .with_status(200)
            .with_body(jar)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let source = Source::Coordinate(Coordinate {
            group: "com.example".into(),
            artifact: "demo".into(),
            version: Some("1.0".into()),
        });
        let config = config(source, dir.path(), &server.url());
        let err = run(&config, &mut FirstChoice, &Interrupt::default())
            .await
            .err()
            .unwrap();

        assert!(format!("{err:#}").contains("Foo.html"), "{err:#}");
        // Bar converted before Foo failed
        assert!(dir.path().join("out/demo-1.0/com/example/Bar.md").is_file());
        assert_eq!(scratch_leftovers(dir.path()), Vec::<String>::new());
    }

    #[tokio::test]
    async fn interrupted_run_leaves_no_scratch_files() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/com/example/demo/1.0/demo-1.0-javadoc.jar")
            .with_status(200)
            .with_body(javadoc_jar())
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let source = Source::Coordinate(Coordinate {
            group: "com.example".into(),
            artifact: "demo".into(),
            version: Some("1.0".into()),
        });
        let interrupt = Interrupt::default();
        interrupt.trigger();
        let config = config(source, dir.path(), &server.url());
        let err = run(&config, &mut FirstChoice, &interrupt).await.err().unwrap();

        assert!(err.to_string().to_lowercase().contains("interrupt"), "{err:#}");
        assert_eq!(scratch_leftovers(dir.path()), Vec::<String>::new());
    }

    #[tokio::test]
    async fn search_then_download_selected_release() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/solrsearch/select")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"response":{"docs":[
                    {"g":"org.demo","a":"demo","v":"1.9"},
                    {"g":"org.demo","a":"demo","v":"2.0"},
                    {"g":"io.other","a":"demo","v":"5.0"}
                ]}}"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/org/demo/demo/2.0/demo-2.0-javadoc.jar")
            .with_status(200)
            .with_body(javadoc_jar())
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let source = Source::Search {
            artifact: "demo".into(),
            version: None,
        };
        let config = config(source, dir.path(), &server.url());
        let summary = run(&config, &mut FirstChoice, &Interrupt::default())
            .await
            .unwrap();

        assert_eq!(summary.output_dir, dir.path().join("out/demo-2.0"));
    }

    #[tokio::test]
    async fn empty_search_aborts_before_download() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/solrsearch/select")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"response":{"docs":[]}}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let source = Source::Search {
            artifact: "nothing".into(),
            version: None,
        };
        let config = config(source, dir.path(), &server.url());
        let err = run(&config, &mut FirstChoice, &Interrupt::default())
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("nothing"));
        assert!(!dir.path().join("out/nothing-latest").exists());
    }

    #[tokio::test]
    async fn missing_jar_aborts() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/com/example/demo/1.0/demo-1.0-javadoc.jar")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let source = Source::Coordinate(Coordinate {
            group: "com.example".into(),
            artifact: "demo".into(),
            version: Some("1.0".into()),
        });
        let config = config(source, dir.path(), &server.url());
        let err = run(&config, &mut FirstChoice, &Interrupt::default())
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("demo-1.0-javadoc.jar"));
        assert_eq!(scratch_leftovers(dir.path()), Vec::<String>::new());
    }
}
