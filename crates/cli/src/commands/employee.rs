use anyhow::{Result, anyhow};
use chrono::Utc;
use clap::{Parser, Subcommand};

use tradenet_auth::{Employee, Role};
use tradenet_core::EmployeeId;
use tradenet_infra::{Backends, EmployeeDirectory};

#[derive(Subcommand, Debug)]
pub enum EmployeeCommands {
    /// Register an employee.
    Add(AddArgs),
    /// Revoke API access.
    Deactivate {
        #[clap(long)]
        id: EmployeeId,
    },
    /// Print all employees.
    List,
}

#[derive(Parser, Debug)]
pub struct AddArgs {
    #[clap(long)]
    pub username: String,

    /// Grant the `admin` role.
    #[clap(long)]
    pub admin: bool,

    /// Create the account already deactivated.
    #[clap(long)]
    pub inactive: bool,
}

pub async fn run(backends: &Backends, command: EmployeeCommands) -> Result<()> {
    let directory = backends.employees.as_ref();
    match command {
        EmployeeCommands::Add(args) => {
            let roles = if args.admin { vec![Role::ADMIN] } else { Vec::new() };
            let mut employee = Employee::new(&args.username, roles, Utc::now())?;
            if args.inactive {
                employee.deactivate();
            }
            let id = employee.id;
            directory.save(employee).await?;
            tracing::info!(employee_id = %id, username = %args.username, "employee added");
            println!("{id}");
        }
        EmployeeCommands::Deactivate { id } => {
            let mut employee = directory
                .find(id)
                .await?
                .ok_or_else(|| anyhow!("employee {id} not found"))?;
            employee.deactivate();
            directory.save(employee).await?;
            tracing::info!(employee_id = %id, "employee deactivated");
        }
        EmployeeCommands::List => {
            for employee in directory.list().await? {
                let roles: Vec<&str> = employee.roles.iter().map(Role::as_str).collect();
                println!(
                    "{}\t{}\t{}\t{}",
                    employee.id,
                    employee.username,
                    employee.status.as_str(),
                    roles.join(",")
                );
            }
        }
    }
    Ok(())
}
