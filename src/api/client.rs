use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::tree::{Edge, Lesson, Level, LevelDraft, SkillTree};

use super::SkillTreeBackend;
use super::error::{ApiError, server_message};
use super::payload::{RawEdge, RawLesson, RawLevel, RawSkillTree, lessons_into_model};

/// Blocking REST client for the course backend. Meant to be driven from
/// worker threads, never from the UI loop.
pub struct HttpBackend {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ApiError::Transport {
                url: base_url.to_owned(),
                source,
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: token.filter(|value| !value.trim().is_empty()),
        })
    }

    fn url(&self, segments: &[&str]) -> String {
        let path = segments
            .iter()
            .map(|segment| urlencoding::encode(segment))
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{path}", self.base_url)
    }

    fn send(&self, method: Method, url: &str, body: Option<Value>) -> Result<String, ApiError> {
        debug!(%method, %url, "sending backend request");

        let mut request = self.http.request(method.clone(), url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().map_err(|source| ApiError::Transport {
            url: url.to_owned(),
            source,
        })?;
        let status = response.status();
        let text = response.text().map_err(|source| ApiError::Transport {
            url: url.to_owned(),
            source,
        })?;

        if status.is_success() {
            return Ok(text);
        }

        let message = server_message(&text).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_owned()
        });
        warn!(%method, %url, status = status.as_u16(), %message, "backend request failed");

        Err(ApiError::Status {
            method: method.to_string(),
            url: url.to_owned(),
            status: status.as_u16(),
            message,
        })
    }

    fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let text = self.send(method, url, body)?;
        serde_json::from_str(&text).map_err(|source| ApiError::Decode {
            origin: url.to_owned(),
            source,
        })
    }
}

fn draft_body(draft: &LevelDraft) -> Result<Value, ApiError> {
    serde_json::to_value(draft).map_err(|source| ApiError::Decode {
        origin: "level draft".to_owned(),
        source,
    })
}

impl SkillTreeBackend for HttpBackend {
    fn fetch_skill_tree(&self, course_id: &str) -> Result<SkillTree, ApiError> {
        let url = self.url(&["courses", course_id, "skill-tree"]);
        let raw: RawSkillTree = self.request_json(Method::GET, &url, None)?;
        raw.into_model()
    }

    fn fetch_lessons(&self, level_id: &str) -> Result<Vec<Lesson>, ApiError> {
        let url = self.url(&["levels", level_id, "lessons"]);
        let raw: Vec<RawLesson> = self.request_json(Method::GET, &url, None)?;
        lessons_into_model(raw)
    }

    fn create_edge(&self, course_id: &str, from: &str, to: &str) -> Result<Edge, ApiError> {
        let url = self.url(&["courses", course_id, "skill-tree", "edges"]);
        let raw: RawEdge =
            self.request_json(Method::POST, &url, Some(json!({ "from": from, "to": to })))?;
        raw.into_model()
    }

    fn delete_edge(&self, edge_id: &str) -> Result<(), ApiError> {
        let url = self.url(&["skill-tree", "edges", edge_id]);
        self.send(Method::DELETE, &url, None).map(|_| ())
    }

    fn create_level(&self, course_id: &str, draft: &LevelDraft) -> Result<Level, ApiError> {
        let url = self.url(&["courses", course_id, "modules"]);
        let raw: RawLevel = self.request_json(Method::POST, &url, Some(draft_body(draft)?))?;
        raw.into_model()
    }

    fn update_level(&self, level_id: &str, draft: &LevelDraft) -> Result<Level, ApiError> {
        let url = self.url(&["modules", level_id]);
        let raw: RawLevel = self.request_json(Method::PATCH, &url, Some(draft_body(draft)?))?;
        raw.into_model()
    }

    fn delete_level(&self, level_id: &str) -> Result<(), ApiError> {
        let url = self.url(&["modules", level_id]);
        self.send(Method::DELETE, &url, None).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use super::*;

    /// Serves a single canned response and hands back the raw request text.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
        let address = listener.local_addr().expect("listener address");

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept connection");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

            let mut head = String::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("read request line");
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
                let done = line == "\r\n" || line.is_empty();
                head.push_str(&line);
                if done {
                    break;
                }
            }
            let mut payload = vec![0u8; content_length];
            reader.read_exact(&mut payload).expect("read request body");
            head.push_str(&String::from_utf8_lossy(&payload));

            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\n\
                 content-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let mut stream = stream;
            stream
                .write_all(response.as_bytes())
                .expect("write response");
            head
        });

        (format!("http://{address}/api"), handle)
    }

    fn backend(base: &str, token: Option<&str>) -> HttpBackend {
        HttpBackend::new(base, token.map(str::to_owned), Duration::from_secs(5))
            .expect("client builds")
    }

    #[test]
    fn fetches_skill_tree_with_bearer_token() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"levels":[{"id":"a","title":"Intro","isUnlocked":true}],"edges":[]}"#,
        );

        let tree = backend(&base, Some("secret"))
            .fetch_skill_tree("course 1")
            .expect("tree loads");
        let request = server.join().expect("server thread");

        assert!(request.starts_with("GET /api/courses/course%201/skill-tree "));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer secret"));
        assert_eq!(tree.levels.len(), 1);
        assert!(tree.levels[0].is_unlocked);
    }

    #[test]
    fn create_edge_posts_endpoints() {
        let (base, server) = serve_once("201 Created", r#"{"id":"e9","from":"a","to":"b"}"#);

        let edge = backend(&base, None)
            .create_edge("c1", "a", "b")
            .expect("edge created");
        let request = server.join().expect("server thread");

        assert!(request.starts_with("POST /api/courses/c1/skill-tree/edges "));
        assert!(request.contains(r#""from":"a""#));
        assert!(request.contains(r#""to":"b""#));
        assert_eq!(edge.id, "e9");
    }

    #[test]
    fn error_status_carries_server_message() {
        let (base, server) = serve_once("409 Conflict", r#"{"message":"Edge already exists"}"#);

        let error = backend(&base, None)
            .create_edge("c1", "a", "b")
            .expect_err("conflict surfaces");
        server.join().expect("server thread");

        match error {
            ApiError::Status {
                status, message, ..
            } => {
                assert_eq!(status, 409);
                assert_eq!(message, "Edge already exists");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn error_without_body_falls_back_to_reason() {
        let (base, server) = serve_once("404 Not Found", "");

        let error = backend(&base, None)
            .delete_level("gone")
            .expect_err("missing level surfaces");
        server.join().expect("server thread");

        assert_eq!(error.user_message(), "Not Found");
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        let backend = backend("http://courses.test/api/", None);
        assert_eq!(
            backend.url(&["levels", "plain-id_1.2~", "lessons"]),
            "http://courses.test/api/levels/plain-id_1.2~/lessons"
        );
        assert_eq!(
            backend.url(&["modules", "a/b c"]),
            "http://courses.test/api/modules/a%2Fb%20c"
        );
    }
}
