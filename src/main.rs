#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    gawwe_calendar::run().await
}
