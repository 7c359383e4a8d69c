use crate::config::AppConfig;

pub async fn handle(config: AppConfig, in_memory: bool) -> anyhow::Result<()> {
    crate::server::serve(config, in_memory).await
}
