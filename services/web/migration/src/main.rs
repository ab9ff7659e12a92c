use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(paddock_web_migration::Migrator).await;
}
