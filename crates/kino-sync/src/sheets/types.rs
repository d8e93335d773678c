//! Google Sheets v4 and OAuth payloads.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Clone, Deserialize)]
pub struct Spreadsheet {
    pub properties: SpreadsheetProperties,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpreadsheetProperties {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sheet {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
}

/// Values of an A1 range. Empty worksheets omit `values`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct AppendBody<'a> {
    pub values: &'a [Vec<String>],
}

#[derive(Debug, Serialize)]
pub struct BatchUpdate {
    pub requests: Vec<Request>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    AddSheet { properties: NewSheetProperties },
    DeleteDimension { range: DimensionRange },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSheetProperties {
    pub title: String,
    pub grid_properties: GridProperties,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProperties {
    pub row_count: usize,
    pub column_count: usize,
}

/// Half-open, 0-based row range.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionRange {
    pub sheet_id: i64,
    pub dimension: &'static str,
    pub start_index: usize,
    pub end_index: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchUpdateResponse {
    #[serde(default)]
    pub replies: Vec<Reply>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(default)]
    pub add_sheet: Option<AddSheetReply>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddSheetReply {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_request_wire_shape() {
        let body = BatchUpdate {
            requests: vec![Request::DeleteDimension {
                range: DimensionRange {
                    sheet_id: 7,
                    dimension: "ROWS",
                    start_index: 4,
                    end_index: 5,
                },
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "requests": [{
                    "deleteDimension": {
                        "range": {"sheetId": 7, "dimension": "ROWS", "startIndex": 4, "endIndex": 5}
                    }
                }]
            })
        );
    }

    #[test]
    fn empty_value_range_parses() {
        let range: ValueRange = serde_json::from_str(r#"{"range":"'Inne'!A1:Z1000","majorDimension":"ROWS"}"#).unwrap();
        assert!(range.values.is_empty());
    }

    #[test]
    fn add_sheet_reply_parses() {
        let response: BatchUpdateResponse = serde_json::from_str(
            r#"{"spreadsheetId":"x","replies":[{"addSheet":{"properties":{"sheetId":42,"title":"Helios","index":2}}}]}"#,
        )
        .unwrap();
        let reply = response.replies[0].add_sheet.as_ref().unwrap();
        assert_eq!(reply.properties.sheet_id, 42);
    }
}
