use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Course whose skill tree is shown.
    #[arg(long, env = "SKILLTREE_COURSE_ID")]
    course_id: String,

    /// Base URL of the course backend REST API.
    #[arg(long, env = "SKILLTREE_API_BASE", default_value = "http://localhost:3001/api")]
    api_base: String,

    /// Bearer token sent with every backend request.
    #[arg(long, env = "SKILLTREE_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Web app origin used to open lessons in the browser.
    #[arg(long, env = "SKILLTREE_WEB_BASE")]
    web_base: Option<String>,

    /// Read the tree from a JSON export instead of the backend.
    #[arg(long)]
    graph_file: Option<PathBuf>,

    /// Author view: nothing is locked and clicks open the module editor.
    #[arg(long)]
    editor: bool,

    #[arg(long, default_value_t = 15)]
    timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GraphSource {
    Http {
        base_url: String,
        token: Option<String>,
        timeout: Duration,
    },
    File(PathBuf),
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub course_id: String,
    pub source: GraphSource,
    pub web_base: Option<String>,
    pub editor_mode: bool,
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

impl Args {
    pub fn into_config(self) -> Result<AppConfig> {
        let course_id = self.course_id.trim().to_owned();
        if course_id.is_empty() {
            bail!("--course-id must not be empty");
        }

        let source = match self.graph_file {
            Some(path) => GraphSource::File(path),
            None => {
                let base_url = self.api_base.trim().trim_end_matches('/').to_owned();
                if !is_http_url(&base_url) {
                    bail!("--api-base must be an http(s) URL, got {:?}", self.api_base);
                }
                if self.timeout_secs == 0 {
                    bail!("--timeout-secs must be greater than zero");
                }
                GraphSource::Http {
                    base_url,
                    token: self.api_token,
                    timeout: Duration::from_secs(self.timeout_secs),
                }
            }
        };

        let web_base = match self.web_base {
            Some(value) => {
                let value = value.trim().trim_end_matches('/').to_owned();
                if !is_http_url(&value) {
                    bail!("--web-base must be an http(s) URL, got {value:?}");
                }
                Some(value)
            }
            None => None,
        };

        Ok(AppConfig {
            course_id,
            source,
            web_base,
            editor_mode: self.editor,
        })
    }
}

impl AppConfig {
    pub fn lesson_url(&self, lesson_id: &str) -> Option<String> {
        self.web_base
            .as_ref()
            .map(|base| format!("{base}/courses/{}/lessons/{lesson_id}", self.course_id))
    }

    pub fn source_label(&self) -> String {
        match &self.source {
            GraphSource::Http { base_url, .. } => base_url.clone(),
            GraphSource::File(path) => path.display().to_string(),
        }
    }
}
