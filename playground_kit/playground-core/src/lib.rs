//! # Playground Core
//!
//! Wire types shared by the playground server and its clients, plus the
//! [`Dispatcher`] that maps an [`AbstractRequest`] onto a concrete HTTP call
//! and normalizes the response.
//!
//! | operation | verb     | url               | body |
//! |-----------|----------|-------------------|------|
//! | `find`    | `GET`    | `/<service>?query` | no   |
//! | `get`     | `GET`    | `/<service>/<id>`  | no   |
//! | `create`  | `POST`   | `/<service>`       | yes  |
//! | `patch`   | `PATCH`  | `/<service>/<id>`  | yes  |
//! | `remove`  | `DELETE` | `/<service>/<id>`  | no   |

pub mod client;
pub mod descriptor;
pub mod error;
pub mod operation;
pub mod request;
pub mod response;
pub mod schema;

pub use client::Dispatcher;
pub use descriptor::{service_name, ServiceDescriptor};
pub use error::{DispatchError, ErrorCode, NormalizedError, INVALID_REQUEST, NETWORK_ERROR};
pub use operation::OperationKind;
pub use request::{AbstractRequest, Payload, PreparedRequest, ResourceId};
pub use response::{NormalizedResponse, Outcome};
pub use schema::{AdditionalProperties, JsonSchema, SchemaType};
