mod admin_tests;
mod auth_tests;
mod export_tests;
mod maintenance_tests;
mod public_tests;
