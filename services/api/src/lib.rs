mod cli;
mod infra;
mod lookup;
mod routes;
mod server;

use neighborhood_insights::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
