use crate::errors::ServerError;
use crate::responses::ResultResp;
use astra::{Body, ResponseBuilder};

const CSV: &str = "text/csv; charset=utf-8";
const JSON: &str = "application/json";
const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A download: the browser saves `body` as `filename`.
fn attachment(content_type: &str, filename: &str, body: Body) -> ResultResp {
    ResponseBuilder::new()
        .status(200)
        .header("Content-Type", content_type)
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        )
        .body(body)
        .map_err(|_| ServerError::InternalError)
}

pub fn csv_response(body: String, filename: &str) -> ResultResp {
    attachment(CSV, filename, Body::from(body))
}

pub fn xlsx_response(buffer: Vec<u8>, filename: &str) -> ResultResp {
    attachment(XLSX, filename, Body::from(buffer))
}

pub fn json_response(body: String, filename: &str) -> ResultResp {
    attachment(JSON, filename, Body::from(body))
}
