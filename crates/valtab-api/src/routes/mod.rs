//! # API Route Modules
//!
//! | Route                              | Module      |
//! |------------------------------------|-------------|
//! | `POST /api/cron/update-tax-data`   | [`cron`]    |
//! | `GET /v1/history`, `GET /v1/status`| [`history`] |

pub mod cron;
pub mod history;
