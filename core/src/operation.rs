//! The twelve client entry points as data.
//!
//! Each entry point is one verb crossed with one result shape. Everything
//! the client needs to execute an entry point is derived from its
//! `Operation` here, so the public methods stay one-liners.

use crate::http::HttpMethod;

/// What a successful call hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Response metadata plus the decoded body.
    Full,
    /// Response only; the body is not decoded.
    ResponseOnly,
    /// Decoded body plus the transport success flag.
    BodyOnly,
}

/// Which behavior to use for the two entry points that historically
/// disagreed with their names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quirks {
    /// Every entry point issues and reports its nominal verb.
    #[default]
    Corrected,
    /// `postBody` reports failures as PUT and `putResponse` issues a POST.
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    GetResponse,
    GetBody,
    Post,
    PostResponse,
    PostBody,
    Put,
    PutResponse,
    PutBody,
    Delete,
    DeleteResponse,
    DeleteBody,
}

/// How to issue an operation and how to tag its failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPlan {
    /// Method forced onto the outgoing options. `None` leaves the caller's
    /// options untouched.
    pub wire_method: Option<HttpMethod>,
    /// Method recorded in `ApiError`.
    pub error_tag: HttpMethod,
}

impl Operation {
    pub const ALL: [Operation; 12] = [
        Operation::Get,
        Operation::GetResponse,
        Operation::GetBody,
        Operation::Post,
        Operation::PostResponse,
        Operation::PostBody,
        Operation::Put,
        Operation::PutResponse,
        Operation::PutBody,
        Operation::Delete,
        Operation::DeleteResponse,
        Operation::DeleteBody,
    ];

    pub fn verb(self) -> HttpMethod {
        use Operation::*;
        match self {
            Get | GetResponse | GetBody => HttpMethod::Get,
            Post | PostResponse | PostBody => HttpMethod::Post,
            Put | PutResponse | PutBody => HttpMethod::Put,
            Delete | DeleteResponse | DeleteBody => HttpMethod::Delete,
        }
    }

    pub fn shape(self) -> ShapeKind {
        use Operation::*;
        match self {
            Get | Post | Put | Delete => ShapeKind::Full,
            GetResponse | PostResponse | PutResponse | DeleteResponse => ShapeKind::ResponseOnly,
            GetBody | PostBody | PutBody | DeleteBody => ShapeKind::BodyOnly,
        }
    }

    pub fn name(self) -> &'static str {
        use Operation::*;
        match self {
            Get => "get",
            GetResponse => "getResponse",
            GetBody => "getBody",
            Post => "post",
            PostResponse => "postResponse",
            PostBody => "postBody",
            Put => "put",
            PutResponse => "putResponse",
            PutBody => "putBody",
            Delete => "delete",
            DeleteResponse => "deleteResponse",
            DeleteBody => "deleteBody",
        }
    }

    pub fn plan(self, quirks: Quirks) -> CallPlan {
        let verb = self.verb();
        let wire_method = match (self, quirks) {
            (Operation::PutResponse, Quirks::Legacy) => Some(HttpMethod::Post),
            _ if verb == HttpMethod::Get => None,
            _ => Some(verb),
        };
        let error_tag = match (self, quirks) {
            (Operation::PostBody, Quirks::Legacy) => HttpMethod::Put,
            _ => verb,
        };
        CallPlan {
            wire_method,
            error_tag,
        }
    }
}
