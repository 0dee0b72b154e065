//! User-Activity Worker Service (NATS JetStream)
//!
//! Binary entry point for the NATS-based activity worker.

#[tokio::main]
async fn main() {
    if let Err(e) = activity_worker::run().await {
        eprintln!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}
