//! Service wiring for the HTTP layer.

use std::sync::Arc;

use tradenet_infra::{Backends, EmployeeDirectory, NetworkService};

pub struct AppServices {
    pub network: NetworkService,
    pub employees: Arc<dyn EmployeeDirectory>,
}

impl AppServices {
    pub fn new(backends: &Backends) -> Self {
        Self {
            network: NetworkService::new(backends.network.clone()),
            employees: backends.employees.clone(),
        }
    }
}
