//! Progress events emitted by the bulk pipelines
//!
//! Serialized as SSE `data:` frames with the kind discriminated by a `type`
//! field, e.g. `{"type":"start","productId":42,"productName":"..."}`.

use greenrack_common::types::SetImageResponse;
use serde::{Deserialize, Serialize};

/// One unit of a bulk pipeline's output stream.
///
/// For every work item a `Start` is emitted, then exactly one of `Success`
/// or `Error`. After all items, a single terminal `Done` closes the stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ApplyEvent {
    #[serde(rename_all = "camelCase")]
    Start {
        product_id: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        product_name: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    Success {
        product_id: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        product_name: Option<String>,
        result: SetImageResponse,
    },

    #[serde(rename_all = "camelCase")]
    Error {
        product_id: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        product_name: Option<String>,
        error: String,
    },

    Done,
}

impl ApplyEvent {
    pub fn start(product_id: i64, product_name: Option<&str>) -> Self {
        Self::Start {
            product_id,
            product_name: product_name.map(str::to_string),
        }
    }

    pub fn success(product_id: i64, product_name: Option<&str>, result: SetImageResponse) -> Self {
        Self::Success {
            product_id,
            product_name: product_name.map(str::to_string),
            result,
        }
    }

    pub fn error(product_id: i64, product_name: Option<&str>, error: impl ToString) -> Self {
        Self::Error {
            product_id,
            product_name: product_name.map(str::to_string),
            error: error.to_string(),
        }
    }
}
