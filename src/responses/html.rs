use crate::responses::ResultResp;
use astra::{Body, Response, ResponseBuilder};
use maud::Markup;

pub fn html_response(markup: Markup) -> ResultResp {
    Ok(markup_response(200, markup))
}

pub fn html_response_with_status(status: u16, markup: Markup) -> ResultResp {
    Ok(markup_response(status, markup))
}

pub(crate) fn markup_response(status: u16, markup: Markup) -> Response {
    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Body::from(markup.into_string()))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}
