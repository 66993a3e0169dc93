pub mod dashboard;
pub mod home;
pub mod lead_detail;
pub mod login;
pub mod thanks;

pub use dashboard::{dashboard_page, DashboardVm};
pub use home::home_page;
pub use lead_detail::lead_detail_page;
pub use login::login_page;
pub use thanks::thanks_page;
