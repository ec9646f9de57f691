#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = pdp_indexer_server::Settings::build()?;
    pdp_indexer_server::run(settings).await
}
