mod cli;
mod commands;

use tenant_risk::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
