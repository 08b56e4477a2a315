use anyhow::{Result, anyhow, bail};
use chrono::{Duration, Utc};
use clap::Parser;

use tradenet_auth::issue_token;
use tradenet_core::EmployeeId;
use tradenet_infra::{AppConfig, Backends, EmployeeDirectory};

#[derive(Parser, Debug)]
pub struct TokenArgs {
    #[clap(long)]
    pub employee: EmployeeId,

    #[clap(long, default_value_t = 60)]
    pub ttl_minutes: i64,
}

pub async fn run(backends: &Backends, config: &AppConfig, args: TokenArgs) -> Result<()> {
    if args.ttl_minutes <= 0 {
        bail!("--ttl-minutes must be positive");
    }
    let employee = backends
        .employees
        .find(args.employee)
        .await?
        .ok_or_else(|| anyhow!("employee {} not found", args.employee))?;
    if !employee.is_active() {
        bail!("employee {} is inactive", employee.username);
    }

    let token = issue_token(
        config.jwt_secret.as_bytes(),
        employee.id,
        employee.roles,
        Utc::now(),
        Duration::minutes(args.ttl_minutes),
    )?;
    println!("{token}");
    Ok(())
}
