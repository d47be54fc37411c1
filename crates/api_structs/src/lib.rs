mod cron;
mod status;

pub mod dtos {
    pub use crate::cron::dtos::*;
}

pub use crate::cron::api::*;
pub use crate::status::api::*;
