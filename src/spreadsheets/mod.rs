pub mod leads_csv;
pub mod leads_xlsx;

pub use leads_csv::{csv_filename, leads_csv};
pub use leads_xlsx::leads_xlsx;
