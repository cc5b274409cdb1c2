use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProtocolError, ProtocolResult};

pub const PROTOCOL_VERSION: u32 = 1;

/// One provision line of a commission request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionPayload {
    pub holder: String,
    pub source: String,
    pub resource: String,
    pub quantity: i64,
}

/// Body of `POST /commissions`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRequest {
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub auto_accept: bool,
    #[serde(default)]
    pub name: String,
    pub provisions: Vec<ProvisionPayload>,
}

impl CommissionRequest {
    /// Strict parse from a decoded JSON body.
    ///
    /// Validation is by hand so every malformed shape the API contract names
    /// (missing field, non-list provisions, wrong field types) maps to a
    /// specific error rather than a generic deserialization failure.
    pub fn from_value(body: &Value) -> ProtocolResult<Self> {
        let object = body.as_object().ok_or(ProtocolError::NotAnObject)?;

        let force = optional_bool(object, "force")?;
        let auto_accept = optional_bool(object, "auto_accept")?;
        let name = match object.get("name") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(ProtocolError::WrongType {
                    field: "name",
                    expected: "string",
                })
            }
        };

        let provisions = object
            .get("provisions")
            .ok_or(ProtocolError::MissingField("provisions"))?;
        let provisions = provisions.as_array().ok_or(ProtocolError::WrongType {
            field: "provisions",
            expected: "list",
        })?;
        if provisions.is_empty() {
            return Err(ProtocolError::EmptyProvisions);
        }

        let provisions = provisions
            .iter()
            .map(parse_provision)
            .collect::<ProtocolResult<Vec<_>>>()?;

        Ok(Self {
            force,
            auto_accept,
            name,
            provisions,
        })
    }
}

fn optional_bool(
    object: &serde_json::Map<String, Value>,
    field: &'static str,
) -> ProtocolResult<bool> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(ProtocolError::WrongType {
            field,
            expected: "bool",
        }),
    }
}

fn parse_provision(value: &Value) -> ProtocolResult<ProvisionPayload> {
    let object = value.as_object().ok_or(ProtocolError::NotAnObject)?;

    let string_field = |field: &'static str| -> ProtocolResult<String> {
        match object.get(field) {
            None => Err(ProtocolError::MissingField(field)),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(ProtocolError::WrongType {
                field,
                expected: "string",
            }),
        }
    };

    let quantity = match object.get("quantity") {
        None => return Err(ProtocolError::MissingField("quantity")),
        Some(v) => v.as_i64().ok_or(ProtocolError::WrongType {
            field: "quantity",
            expected: "integer",
        })?,
    };

    Ok(ProvisionPayload {
        holder: string_field("holder")?,
        source: string_field("source")?,
        resource: string_field("resource")?,
        quantity,
    })
}

/// Body of `POST /commissions/action`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveRequest {
    #[serde(default)]
    pub accept: Vec<u64>,
    #[serde(default)]
    pub reject: Vec<u64>,
}

/// Body of `POST /commissions/<serial>/action`: `{"accept": ""}` or
/// `{"reject": ""}` — presence of the key carries the meaning, the value is
/// ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SingleAction {
    Accept,
    Reject,
}

impl SingleAction {
    pub fn from_value(body: &Value) -> ProtocolResult<Self> {
        let object = body.as_object().ok_or(ProtocolError::NotAnObject)?;
        match (object.contains_key("accept"), object.contains_key("reject")) {
            (true, false) => Ok(Self::Accept),
            (false, true) => Ok(Self::Reject),
            _ => Err(ProtocolError::AmbiguousAction),
        }
    }
}

/// Body of `201 Created` from `POST /commissions`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialResponse {
    pub serial: u64,
}

/// Body of `200 OK` from the action endpoints.
pub type ResolutionResponse = tally_types::Resolution;

/// Body of `200 OK` from `GET /service_quotas`: user → resource → usage.
pub type ServiceQuotasResponse =
    std::collections::BTreeMap<String, std::collections::BTreeMap<String, tally_ledger::ResourceUsage>>;
