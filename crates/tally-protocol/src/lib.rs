//! HTTP wire protocol for the Tally quota service.
//!
//! Defines the payload shapes exchanged over the commission endpoints, the
//! endpoint path constants, and service-token authentication. Input parsing
//! lives here so the validation rules (and their tests) are shared by the
//! server and any client.

pub mod auth;
pub mod endpoint;
pub mod error;
pub mod message;

pub use auth::{ServiceToken, AUTH_TOKEN_HEADER};
pub use endpoint::{endpoints, HealthResponse};
pub use error::{ProtocolError, ProtocolResult};
pub use message::{
    CommissionRequest, ProvisionPayload, ResolutionResponse, ResolveRequest, SerialResponse,
    ServiceQuotasResponse, SingleAction, PROTOCOL_VERSION,
};
