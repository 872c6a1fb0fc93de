//! End-to-end tests against a running server
//!
//! Start the server with `DCIM_AUTH__BOOTSTRAP_ADMIN_PASSWORD=admin-password`
//! on an empty database, then run `cargo test -- --ignored`.

mod api_tests;
