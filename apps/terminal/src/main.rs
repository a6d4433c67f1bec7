#[tokio::main]
async fn main() -> anyhow::Result<()> {
    matemagica_terminal::run().await
}
