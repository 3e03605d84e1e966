// Cloudflare GraphQL analytics client modules
//
// One POST per refresh carrying a batched query document. Both query
// documents live in `queries`, their variable sets in `variables`, and the
// `{ data, errors }` envelope in `models`.

pub mod client;
pub mod models;
pub mod queries;
pub mod variables;

pub use client::{DEFAULT_ENDPOINT, GraphqlClient};
pub use models::{GraphqlError, GraphqlResponse};
pub use variables::{DashboardVariables, RollingVariables};
