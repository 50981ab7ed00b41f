//! Result shapes delivered by the client's entry points.

use serde::de::DeserializeOwned;

use crate::http::HttpResponse;
use crate::operation::ShapeKind;

/// Response together with its decoded JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Full {
    pub response: HttpResponse,
    pub body: serde_json::Value,
}

impl Full {
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.body)
    }
}

/// Decoded JSON body and whether the status was 2xx.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyOnly {
    pub body: serde_json::Value,
    pub ok: bool,
}

impl BodyOnly {
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.body)
    }
}

/// Built from a raw response once the transport call succeeded.
pub trait Shape: Sized {
    const KIND: ShapeKind;

    fn from_response(response: HttpResponse) -> Result<Self, serde_json::Error>;
}

impl Shape for Full {
    const KIND: ShapeKind = ShapeKind::Full;

    fn from_response(response: HttpResponse) -> Result<Self, serde_json::Error> {
        let body = response.json()?;
        Ok(Full { response, body })
    }
}

impl Shape for HttpResponse {
    const KIND: ShapeKind = ShapeKind::ResponseOnly;

    fn from_response(response: HttpResponse) -> Result<Self, serde_json::Error> {
        Ok(response)
    }
}

impl Shape for BodyOnly {
    const KIND: ShapeKind = ShapeKind::BodyOnly;

    fn from_response(response: HttpResponse) -> Result<Self, serde_json::Error> {
        Ok(BodyOnly {
            body: response.json()?,
            ok: response.ok(),
        })
    }
}

/// Any of the three shapes, for callers that pick the operation at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Shaped {
    Full(Full),
    ResponseOnly(HttpResponse),
    BodyOnly(BodyOnly),
}

impl Shaped {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shaped::Full(_) => ShapeKind::Full,
            Shaped::ResponseOnly(_) => ShapeKind::ResponseOnly,
            Shaped::BodyOnly(_) => ShapeKind::BodyOnly,
        }
    }
}
