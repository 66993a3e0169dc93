pub mod attachment;
pub mod errors;
pub mod html;
pub mod redirect;

pub use attachment::{csv_response, json_response, xlsx_response};
pub use errors::{error_to_response, ResultResp};
pub use html::{html_response, html_response_with_status};
pub use redirect::{redirect, redirect_with_cookie};
