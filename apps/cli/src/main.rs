//! # Kero Entry Point
//!
//! ```text
//! kero <tool> <action> [args]
//!   │
//!   ▼
//! kero_cli::run() ──► exit status
//!   0  success, or the operator answered "no"
//!   1  storage or internal failure
//!   2  invalid input or not found
//!   3  login required or access denied
//!   4  endpoint failure
//!   5  configuration error
//! ```

#[tokio::main]
async fn main() {
    let code = kero_cli::run().await;
    std::process::exit(code);
}
