//! Thin client for the Google Tasks v1 and Calendar v3 REST APIs.
//!
//! Credentials are someone else's problem: a [`TokenSource`] hands out a
//! bearer token per request, typically read from a file an external OAuth
//! helper keeps fresh.

use crate::config::GoogleConfig;
use crate::store::timer::TimeInterval;
use crate::store::{StoreError, StoreResult};
use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;

const TASKS_BASE: &str = "https://tasks.googleapis.com/tasks/v1";
const CALENDAR_BASE: &str = "https://www.googleapis.com/calendar/v3";
const TOKEN_ENV: &str = "TASKNAG_GOOGLE_TOKEN";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const STATUS_COMPLETED: &str = "completed";
const STATUS_NEEDS_ACTION: &str = "needsAction";

/// A remote task list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteList {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// A remote task item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTask {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl RemoteTask {
    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some(STATUS_COMPLETED)
    }
}

/// Everything the Google backend needs from the outside world
pub trait TasksApi: Send + Sync {
    fn task_lists(&self) -> StoreResult<Vec<RemoteList>>;

    fn create_task_list(&self, title: &str) -> StoreResult<RemoteList>;

    fn tasks(&self, list_id: &str) -> StoreResult<Vec<RemoteTask>>;

    fn get_task(&self, list_id: &str, task_id: &str) -> StoreResult<RemoteTask>;

    /// Mark completed at `completed`, or reopen when `None`
    fn set_completed(
        &self,
        list_id: &str,
        task_id: &str,
        completed: Option<DateTime<Local>>,
    ) -> StoreResult<RemoteTask>;

    fn delete_task(&self, list_id: &str, task_id: &str) -> StoreResult<()>;

    fn insert_task(&self, list_id: &str, title: &str) -> StoreResult<RemoteTask>;

    /// Id of the calendar named `name`, creating it when missing
    fn ensure_calendar(&self, name: &str) -> StoreResult<String>;

    fn insert_event(&self, calendar_id: &str, interval: &TimeInterval) -> StoreResult<()>;
}

/// Supplies bearer tokens for API calls
pub trait TokenSource: Send + Sync {
    fn bearer(&self) -> StoreResult<String>;
}

/// A fixed token, e.g. from the environment
pub struct StaticToken(String);

impl TokenSource for StaticToken {
    fn bearer(&self) -> StoreResult<String> {
        Ok(self.0.clone())
    }
}

/// Reads `access_token` from a JSON file on every call so an external
/// refresher can rotate it underneath us
pub struct TokenFile {
    path: PathBuf,
}

#[derive(Deserialize)]
struct TokenDocument {
    #[serde(alias = "token")]
    access_token: String,
}

impl TokenFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TokenSource for TokenFile {
    fn bearer(&self) -> StoreResult<String> {
        let content = std::fs::read_to_string(&self.path).map_err(|err| {
            StoreError::Backend(format!("cannot read token file {}: {}", self.path.display(), err))
        })?;
        let doc: TokenDocument = serde_json::from_str(&content)?;
        Ok(doc.access_token)
    }
}

/// Pick the token source: environment override first, then the token file
pub fn token_source(config: &GoogleConfig) -> Result<Box<dyn TokenSource>> {
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        if !token.trim().is_empty() {
            tracing::info!("using Google token from {}", TOKEN_ENV);
            return Ok(Box::new(StaticToken(token.trim().to_string())));
        }
    }
    let path = match &config.token_file {
        Some(path) => path.clone(),
        None => crate::config::config_dir()
            .context("Could not determine config directory")?
            .join("google")
            .join("token.json"),
    };
    tracing::info!(path = %path.display(), "using Google token file");
    Ok(Box::new(TokenFile::new(path)))
}

#[derive(Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default, rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct CalendarEntry {
    id: String,
    #[serde(default)]
    summary: Option<String>,
}

/// HTTP implementation of [`TasksApi`]
pub struct GoogleHttpApi {
    agent: ureq::Agent,
    token: Box<dyn TokenSource>,
}

impl GoogleHttpApi {
    pub fn new(token: Box<dyn TokenSource>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self { agent, token }
    }

    fn request(&self, method: &str, url: &str) -> StoreResult<ureq::Request> {
        let bearer = self.token.bearer()?;
        Ok(self
            .agent
            .request(method, url)
            .set("Authorization", &format!("Bearer {}", bearer)))
    }

    fn send<T: DeserializeOwned>(&self, request: ureq::Request, body: Option<serde_json::Value>) -> StoreResult<T> {
        let response = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        }
        .map_err(http_error)?;
        Ok(response.into_json()?)
    }

    /// Follow `nextPageToken` until the collection is exhausted
    fn paged<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> StoreResult<Vec<T>> {
        let mut out = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self.request("GET", url)?;
            for (key, value) in query {
                request = request.query(key, value);
            }
            if let Some(token) = &page_token {
                request = request.query("pageToken", token);
            }
            let page: Page<T> = self.send(request, None)?;
            out.extend(page.items);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(out)
    }

    fn task_url(list_id: &str, task_id: &str) -> String {
        format!(
            "{}/lists/{}/tasks/{}",
            TASKS_BASE,
            urlencoding::encode(list_id),
            urlencoding::encode(task_id)
        )
    }
}

impl TasksApi for GoogleHttpApi {
    fn task_lists(&self) -> StoreResult<Vec<RemoteList>> {
        self.paged(&format!("{}/users/@me/lists", TASKS_BASE), &[("maxResults", "100")])
    }

    fn create_task_list(&self, title: &str) -> StoreResult<RemoteList> {
        let request = self.request("POST", &format!("{}/users/@me/lists", TASKS_BASE))?;
        self.send(request, Some(json!({ "title": title })))
    }

    fn tasks(&self, list_id: &str) -> StoreResult<Vec<RemoteTask>> {
        let url = format!("{}/lists/{}/tasks", TASKS_BASE, urlencoding::encode(list_id));
        self.paged(&url, &[("showDeleted", "false"), ("maxResults", "100")])
    }

    fn get_task(&self, list_id: &str, task_id: &str) -> StoreResult<RemoteTask> {
        let request = self.request("GET", &Self::task_url(list_id, task_id))?;
        self.send(request, None)
    }

    fn set_completed(
        &self,
        list_id: &str,
        task_id: &str,
        completed: Option<DateTime<Local>>,
    ) -> StoreResult<RemoteTask> {
        let body = match completed {
            Some(at) => json!({ "status": STATUS_COMPLETED, "completed": at.to_rfc3339() }),
            None => json!({ "status": STATUS_NEEDS_ACTION, "completed": null }),
        };
        let request = self.request("PATCH", &Self::task_url(list_id, task_id))?;
        self.send(request, Some(body))
    }

    fn delete_task(&self, list_id: &str, task_id: &str) -> StoreResult<()> {
        self.request("DELETE", &Self::task_url(list_id, task_id))?
            .call()
            .map_err(http_error)?;
        Ok(())
    }

    fn insert_task(&self, list_id: &str, title: &str) -> StoreResult<RemoteTask> {
        let url = format!("{}/lists/{}/tasks", TASKS_BASE, urlencoding::encode(list_id));
        let request = self.request("POST", &url)?;
        self.send(request, Some(json!({ "title": title })))
    }

    fn ensure_calendar(&self, name: &str) -> StoreResult<String> {
        let calendars: Vec<CalendarEntry> = self.paged(
            &format!("{}/users/me/calendarList", CALENDAR_BASE),
            &[("maxResults", "250")],
        )?;
        if let Some(found) = calendars.into_iter().find(|c| c.summary.as_deref() == Some(name)) {
            return Ok(found.id);
        }

        tracing::info!(calendar = name, "creating time-log calendar");
        let request = self.request("POST", &format!("{}/calendars", CALENDAR_BASE))?;
        let created: CalendarEntry = self.send(request, Some(json!({ "summary": name })))?;
        let request = self.request("POST", &format!("{}/users/me/calendarList", CALENDAR_BASE))?;
        let _: serde_json::Value = self.send(request, Some(json!({ "id": created.id })))?;
        Ok(created.id)
    }

    fn insert_event(&self, calendar_id: &str, interval: &TimeInterval) -> StoreResult<()> {
        let url = format!(
            "{}/calendars/{}/events",
            CALENDAR_BASE,
            urlencoding::encode(calendar_id)
        );
        let request = self.request("POST", &url)?;
        let _: serde_json::Value = self.send(request, Some(event_body(interval)?))?;
        Ok(())
    }
}

/// Calendar event payload for a finished interval
fn event_body(interval: &TimeInterval) -> StoreResult<serde_json::Value> {
    let start = local_rfc3339(interval.started)?;
    let end = local_rfc3339(interval.ended)?;
    let summary = if interval.title.is_empty() {
        "tasknag: work"
    } else {
        interval.title.as_str()
    };
    Ok(json!({
        "summary": summary,
        "description": "Logged via tasknag",
        "start": { "dateTime": start },
        "end": { "dateTime": end },
        "extendedProperties": { "private": { "tasknag": "1", "source": "tasknag" } },
    }))
}

fn local_rfc3339(ts: i64) -> StoreResult<String> {
    Local
        .timestamp_opt(ts, 0)
        .single()
        .map(|dt| dt.to_rfc3339())
        .ok_or_else(|| StoreError::Validation(format!("timestamp out of range: {}", ts)))
}

fn http_error(err: ureq::Error) -> StoreError {
    match err {
        ureq::Error::Status(404, response) => StoreError::NotFound(response.get_url().to_string()),
        ureq::Error::Status(code, response) => {
            let url = response.get_url().to_string();
            let body = response.into_string().unwrap_or_default();
            StoreError::Backend(format!("HTTP {} from {}: {}", code, url, body.trim()))
        }
        ureq::Error::Transport(transport) => StoreError::Backend(transport.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_body_shape() {
        let interval = TimeInterval::new("Write report", 1_700_000_000, 1_700_000_060).unwrap();
        let body = event_body(&interval).unwrap();

        assert_eq!(body["summary"], "Write report");
        let start = DateTime::parse_from_rfc3339(body["start"]["dateTime"].as_str().unwrap()).unwrap();
        let end = DateTime::parse_from_rfc3339(body["end"]["dateTime"].as_str().unwrap()).unwrap();
        assert_eq!((end - start).num_seconds(), 60);
        assert_eq!(body["extendedProperties"]["private"]["tasknag"], "1");
    }

    #[test]
    fn test_event_body_untitled() {
        let interval = TimeInterval::new("", 10, 20).unwrap();
        assert_eq!(event_body(&interval).unwrap()["summary"], "tasknag: work");
    }

    #[test]
    fn test_page_without_items() {
        let page: Page<RemoteList> = serde_json::from_str(r#"{"kind":"tasks#taskLists"}"#).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_remote_task_status() {
        let task: RemoteTask =
            serde_json::from_str(r#"{"id":"t1","title":"A","status":"completed"}"#).unwrap();
        assert!(task.is_completed());
        let open: RemoteTask = serde_json::from_str(r#"{"id":"t2"}"#).unwrap();
        assert!(!open.is_completed());
    }

    #[test]
    fn test_token_file_reads_access_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, r#"{"access_token":"abc","expiry":"later"}"#).unwrap();
        assert_eq!(TokenFile::new(path).bearer().unwrap(), "abc");
    }

    #[test]
    fn test_missing_token_file_is_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = TokenFile::new(dir.path().join("absent.json"));
        assert!(matches!(source.bearer(), Err(StoreError::Backend(_))));
    }
}
