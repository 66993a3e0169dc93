use crate::errors::ServerError;
use crate::responses::html::markup_response;
use crate::templates::components::error_page;
use astra::Response;
use tracing::{error, warn};

pub type ResultResp = Result<Response, ServerError>;

/// Render a ServerError as an HTML error page with the matching status.
pub fn error_to_response(err: ServerError) -> Response {
    let status = err.status_code();
    let message = match &err {
        ServerError::NotFound => "Page not found".to_string(),
        ServerError::BadRequest(msg) => msg.clone(),
        // Internal details stay in the log.
        ServerError::DbError(_)
        | ServerError::XlsxError(_)
        | ServerError::ConfigError(_)
        | ServerError::InternalError => "Something went wrong on our side".to_string(),
    };

    if status >= 500 {
        error!(status, error = %err, "request failed");
    } else if status != 404 {
        warn!(status, error = %err, "request rejected");
    }

    markup_response(status, error_page(status, &message))
}
