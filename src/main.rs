use anyhow::Result;
use helmsman::cli::App;

#[tokio::main]
async fn main() -> Result<()> {
    let mut app = App::from_args().await?;
    let args = helmsman::cli::Args::parse_args();

    app.run(args).await?;

    Ok(())
}
