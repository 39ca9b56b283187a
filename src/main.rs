use anyhow::Context;
use blogicum::{init_db, run_app, set_staff_in_db, telemetry::init_tracing, Config};

#[tokio::main]
async fn main() -> blogicum::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    init_tracing(&config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["serve"] => run_app(config).await,
        [command @ ("promote" | "demote"), username] => {
            let pool = init_db(&config.database_url).await?;
            set_staff_in_db(&pool, username, *command == "promote")
                .await
                .map_err(|e| anyhow::anyhow!("{:?}", e))
                .with_context(|| format!("Could not update user {}", username))?;
            tracing::info!(%username, command, "staff flag updated");
            Ok(())
        }
        _ => {
            eprintln!("usage: blogicum [serve | promote <username> | demote <username>]");
            std::process::exit(2);
        }
    }
}
