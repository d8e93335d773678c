//! Blocking Google Sheets v4 client implementing [`WorksheetStore`].

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::RETRY_AFTER;
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, info};

use super::auth::{AccessToken, ServiceAccountKey, fetch_token};
use super::types::{
    AppendBody, BatchUpdate, BatchUpdateResponse, DimensionRange, ErrorEnvelope, GridProperties,
    NewSheetProperties, Request, Spreadsheet, ValueRange,
};
use crate::config::RemoteConfig;
use crate::error::{RemoteError, Result};
use crate::store::WorksheetStore;

/// Sheets API base URL.
const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent string for API requests.
const USER_AGENT_VALUE: &str = concat!("kino-reconcile/", env!("CARGO_PKG_VERSION"));

/// Fallback wait when a 429 carries no `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// A connected spreadsheet.
pub struct SheetsClient {
    http: Client,
    key: ServiceAccountKey,
    token: Option<AccessToken>,
    spreadsheet_id: String,
    title: String,
    sheet_ids: BTreeMap<String, i64>,
}

impl SheetsClient {
    /// Load credentials, authenticate and open the spreadsheet.
    ///
    /// Fails with [`RemoteError::Authentication`] or
    /// [`RemoteError::DestinationNotFound`] before anything is written.
    pub fn connect(config: &RemoteConfig) -> Result<Self> {
        let key = ServiceAccountKey::from_file(&config.credentials_path)?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT_VALUE)
            .build()
            .map_err(|e| RemoteError::Network(format!("failed to create HTTP client: {e}")))?;

        let mut client = Self {
            http,
            key,
            token: None,
            spreadsheet_id: config.spreadsheet_id.clone(),
            title: String::new(),
            sheet_ids: BTreeMap::new(),
        };
        client.refresh_metadata()?;
        info!(
            spreadsheet = %client.title,
            worksheets = client.sheet_ids.len(),
            "connected to spreadsheet"
        );
        Ok(client)
    }

    fn bearer(&mut self) -> Result<String> {
        if let Some(token) = self.token.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(token.value.clone());
        }
        let token = fetch_token(&self.http, &self.key)?;
        let value = token.value.clone();
        self.token = Some(token);
        Ok(value)
    }

    fn url(&self, suffix: &str) -> String {
        format!("{SHEETS_API_URL}/{}{suffix}", self.spreadsheet_id)
    }

    fn get<T: DeserializeOwned>(&mut self, url: &str) -> Result<T> {
        let token = self.bearer()?;
        debug!(url, "GET");
        let response = self.http.get(url).bearer_auth(token).send()?;
        handle_response(response)
    }

    fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&mut self, url: &str, body: &B) -> Result<T> {
        let token = self.bearer()?;
        debug!(url, "POST");
        let response = self.http.post(url).bearer_auth(token).json(body).send()?;
        handle_response(response)
    }

    fn batch_update(&mut self, requests: Vec<Request>) -> Result<BatchUpdateResponse> {
        let url = self.url(":batchUpdate");
        self.post(&url, &BatchUpdate { requests })
    }

    fn refresh_metadata(&mut self) -> Result<()> {
        let url = self.url("?fields=properties.title,sheets.properties(sheetId,title)");
        let spreadsheet: Spreadsheet = self.get(&url)?;
        self.title = spreadsheet.properties.title;
        self.sheet_ids = spreadsheet
            .sheets
            .into_iter()
            .map(|sheet| (sheet.properties.title, sheet.properties.sheet_id))
            .collect();
        Ok(())
    }

    fn sheet_id(&self, title: &str) -> Result<i64> {
        self.sheet_ids
            .get(title)
            .copied()
            .ok_or_else(|| RemoteError::Api {
                status: 400,
                message: format!("worksheet '{title}' not found"),
            })
    }
}

impl WorksheetStore for SheetsClient {
    fn has_worksheet(&mut self, title: &str) -> Result<bool> {
        self.refresh_metadata()?;
        Ok(self.sheet_ids.contains_key(title))
    }

    fn add_worksheet(&mut self, title: &str, rows: usize, cols: usize) -> Result<()> {
        let response = self.batch_update(vec![Request::AddSheet {
            properties: NewSheetProperties {
                title: title.to_string(),
                grid_properties: GridProperties {
                    row_count: rows,
                    column_count: cols,
                },
            },
        }])?;
        if let Some(added) = response
            .replies
            .into_iter()
            .find_map(|reply| reply.add_sheet)
        {
            self.sheet_ids
                .insert(added.properties.title, added.properties.sheet_id);
        } else {
            self.refresh_metadata()?;
        }
        Ok(())
    }

    fn read_rows(&mut self, title: &str) -> Result<Vec<Vec<String>>> {
        let url = self.url(&format!("/values/{}", a1_range(title)));
        let range: ValueRange = self.get(&url)?;
        Ok(range.values)
    }

    fn append_rows(&mut self, title: &str, rows: &[Vec<String>]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let url = self.url(&format!(
            "/values/{}:append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS",
            a1_range(title)
        ));
        let _: IgnoredAny = self.post(&url, &AppendBody { values: rows })?;
        Ok(())
    }

    fn delete_rows(&mut self, title: &str, start: usize, end: usize) -> Result<()> {
        let sheet_id = self.sheet_id(title)?;
        self.batch_update(vec![Request::DeleteDimension {
            range: DimensionRange {
                sheet_id,
                dimension: "ROWS",
                start_index: start.saturating_sub(1),
                end_index: end,
            },
        }])?;
        Ok(())
    }
}

/// A1 range covering a whole worksheet, percent-encoded for a URL path.
fn a1_range(title: &str) -> String {
    let quoted = format!("'{}'", title.replace('\'', "''"));
    urlencoding::encode(&quoted).into_owned()
}

/// Map a non-success status to an error.
fn error_for_status(status: StatusCode, retry_after: Option<u64>, body: &str) -> RemoteError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    match status {
        StatusCode::TOO_MANY_REQUESTS => RemoteError::RateLimited {
            retry_after: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Authentication(message),
        StatusCode::NOT_FOUND => RemoteError::DestinationNotFound(message),
        _ => RemoteError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Check the status and parse the JSON body.
pub(crate) fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body = response.text().unwrap_or_default();
        return Err(error_for_status(status, retry_after, &body));
    }
    let body = response.text()?;
    Ok(serde_json::from_str(&body)?)
}
