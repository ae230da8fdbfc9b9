use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::interrupt::Interrupt;

pub const DEFAULT_REPOSITORY_URL: &str = "https://repo1.maven.org/maven2";
pub const DEFAULT_SEARCH_URL: &str = "https://search.maven.org/solrsearch/select";
const SEARCH_ROWS: usize = 100;

/// A `group:artifact[:version]` package coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: Option<String>,
}

/// A javadoc jar saved to a temporary file; the file is removed on drop.
pub struct DownloadedJar {
    pub file: NamedTempFile,
    pub version: String,
}

/// One group id from a search, with every version seen for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupVersions {
    pub group: String,
    pub versions: BTreeSet<String>,
}

#[derive(Deserialize, Default)]
struct SearchResponse {
    #[serde(default)]
    response: SearchBody,
}

#[derive(Deserialize, Default)]
struct SearchBody {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Deserialize)]
struct SearchDoc {
    g: Option<String>,
    v: Option<String>,
    #[serde(rename = "latestVersion")]
    latest_version: Option<String>,
}

pub fn metadata_url(repository: &str, group: &str, artifact: &str) -> String {
    format!(
        "{}/{}/{}/maven-metadata.xml",
        repository.trim_end_matches('/'),
        group.replace('.', "/"),
        artifact
    )
}

pub fn javadoc_url(repository: &str, group: &str, artifact: &str, version: &str) -> String {
    format!(
        "{}/{}/{artifact}/{version}/{artifact}-{version}-javadoc.jar",
        repository.trim_end_matches('/'),
        group.replace('.', "/"),
    )
}

pub struct MavenClient {
    http: reqwest::Client,
    repository_url: String,
    search_url: String,
}

impl MavenClient {
    pub fn new(repository_url: impl Into<String>, search_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("jdoc2md/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            repository_url: repository_url.into(),
            search_url: search_url.into(),
        })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;
        if !resp.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }
        Ok(resp)
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })
    }

    /// Read the latest published version from `maven-metadata.xml`.
    pub async fn resolve_latest(&self, group: &str, artifact: &str) -> Result<String, FetchError> {
        let url = metadata_url(&self.repository_url, group, artifact);
        info!("Resolving latest version: {}", url);
        let xml = self.get_text(&url).await?;

        match parse_latest_version(&xml) {
            Ok(Some(version)) => {
                info!("Latest version of {}:{} is {}", group, artifact, version);
                Ok(version)
            }
            Ok(None) => Err(FetchError::Metadata {
                url,
                reason: "no <latest> or <release> element".to_string(),
            }),
            Err(e) => Err(FetchError::Metadata {
                url,
                reason: e.to_string(),
            }),
        }
    }

    /// Download the javadoc jar for `coordinate` into a temp file under
    /// `scratch_root`, resolving the version first when it is not pinned.
    pub async fn download_javadoc(
        &self,
        coordinate: &Coordinate,
        scratch_root: &Path,
        interrupt: &Interrupt,
    ) -> Result<DownloadedJar, FetchError> {
        let version = match &coordinate.version {
            Some(v) => v.clone(),
            None => {
                self.resolve_latest(&coordinate.group, &coordinate.artifact)
                    .await?
            }
        };
        let url = javadoc_url(
            &self.repository_url,
            &coordinate.group,
            &coordinate.artifact,
            &version,
        );

        info!("Downloading javadoc jar: {}", url);
        let mut resp = self.get(&url).await?;
        let mut file = tempfile::Builder::new()
            .prefix("jdoc2md_")
            .suffix(".jar")
            .tempfile_in(scratch_root)?;
        interrupt.register_scratch(file.path());

        let mut bytes = 0u64;
        while let Some(chunk) = resp.chunk().await.map_err(|source| FetchError::Request {
            url: url.clone(),
            source,
        })? {
            interrupt.check()?;
            file.write_all(&chunk)?;
            bytes += chunk.len() as u64;
        }
        file.flush()?;

        debug!(bytes, path = %file.path().display(), "Saved javadoc jar");
        Ok(DownloadedJar { file, version })
    }

    /// Find every group publishing `artifact`, with the versions of each.
    pub async fn search_artifact(&self, artifact: &str) -> Result<Vec<GroupVersions>, FetchError> {
        let query = format!("a:{artifact}");
        let rows = SEARCH_ROWS.to_string();
        let url = reqwest::Url::parse_with_params(
            &self.search_url,
            &[
                ("q", query.as_str()),
                ("core", "gav"),
                ("rows", rows.as_str()),
                ("wt", "json"),
            ],
        )
        .map_err(|e| FetchError::Parse {
            url: self.search_url.clone(),
            reason: e.to_string(),
        })?
        .to_string();

        info!("Searching Maven Central: {}", url);
        let body = self.get_text(&url).await?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Parse {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let groups = group_versions(parsed.response.docs);
        debug!("Search for {} matched {} groups", artifact, groups.len());
        Ok(groups)
    }
}

/// Parse `maven-metadata.xml`, preferring `versioning/latest` over
/// `versioning/release`.
fn parse_latest_version(xml: &str) -> Result<Option<String>> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut latest = None;
    let mut release = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => path.push(e.name().as_ref().to_vec()),
            Ok(quick_xml::events::Event::End(_)) => {
                path.pop();
            }
            Ok(quick_xml::events::Event::Text(e)) => {
                let text = e.unescape()?;
                let text = text.trim();
                if !text.is_empty() {
                    if in_versioning(&path, b"latest") {
                        latest = Some(text.to_string());
                    } else if in_versioning(&path, b"release") {
                        release = Some(text.to_string());
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }
    Ok(latest.or(release))
}

fn in_versioning(path: &[Vec<u8>], leaf: &[u8]) -> bool {
    matches!(
        path,
        [.., parent, last] if parent.as_slice() == b"versioning" && last.as_slice() == leaf
    )
}

/// Group search hits by group id in first-seen order, skipping hits that
/// lack a group or a version.
fn group_versions(docs: Vec<SearchDoc>) -> Vec<GroupVersions> {
    let mut groups: Vec<GroupVersions> = Vec::new();
    for doc in docs {
        let (Some(group), Some(version)) = (doc.g, doc.v.or(doc.latest_version)) else {
            continue;
        };
        match groups.iter_mut().find(|g| g.group == group) {
            Some(entry) => {
                entry.versions.insert(version);
            }
            None => groups.push(GroupVersions {
                group,
                versions: BTreeSet::from([version]),
            }),
        }
    }
    groups
}

// ── Tests ──
