#[tokio::main]
async fn main() -> anyhow::Result<()> {
    handlink::run().await
}
