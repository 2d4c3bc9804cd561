//! Integration tests for the UserHub user directory, session flows and
//! HTTP API.

mod helpers;

mod api_test;
mod quota_test;
mod session_test;
mod user_test;
