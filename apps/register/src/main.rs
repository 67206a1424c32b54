//! # PartsDesk Register Entry Point
//!
//! Setup lives in `lib.rs` so it can be tested.

#[tokio::main]
async fn main() {
    if let Err(e) = partsdesk_register::run().await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
