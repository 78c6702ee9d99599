use kgviz_core::cli;
use kgviz_core::telemetry::{env_bool, init_tracing, ENV_LOG_JSON};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let json = env_bool(|key| std::env::var(key).ok(), ENV_LOG_JSON, false);
    init_tracing(json)?;

    let matches = cli::build_command().get_matches();
    let output = cli::run(&matches).await?;
    println!("{output}");
    Ok(())
}
