mod app;
mod audio;
mod config;
mod coordinator;
mod library;
mod runtime;
mod store;
mod tracing_config;
mod ui;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run().await
}
