//! Relay API Routes
//!
//! - /api/execute/:api_id - Live proxy invocation (API key)
//! - /api/apis - Definition management (session)
//! - /api/apis/:id/logs - Execution history of one Definition (session)
//! - /api/logs - Execution history (session)

pub mod apis;
pub mod execute;
pub mod logs;
pub mod swagger;
