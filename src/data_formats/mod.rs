mod request;
mod response;
mod wrapper;

pub use request::*;
pub use response::*;
pub use wrapper::*;

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct PageQueryParams {
    #[serde(default)]
    pub page: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct AdminPostQueryParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub is_published: Option<bool>,
}
