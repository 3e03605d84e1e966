// flarestat-api: Async Rust client for the Cloudflare zone analytics GraphQL API

pub mod error;
pub mod graphql;
pub mod transport;

pub use error::{Error, fmt_timeout};
pub use graphql::{
    DEFAULT_ENDPOINT, DashboardVariables, GraphqlClient, GraphqlError, GraphqlResponse,
    RollingVariables,
};
pub use transport::TransportConfig;
