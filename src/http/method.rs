use std::{fmt, str::FromStr};

/// HTTP Method.
///
/// Only the methods of [RFC 7231 section 4][rfc] and `PATCH` are recognized.
///
/// [rfc]: <https://tools.ietf.org/html/rfc7231#section-4>
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Method(Inner);

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum Inner {
    Get,
    Post,
    Delete,
    Patch,
    Put,
    Options,
    Head,
    Trace,
    Connect,
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Method {
    forward! {
        /// The `GET` method requests a representation of the specified resource.
        pub const GET: Get = "GET";
        /// The `POST` method submits an entity to the specified resource.
        pub const POST: Post = "POST";
        /// The `DELETE` method deletes the specified resource.
        pub const DELETE: Delete = "DELETE";
        /// The `PATCH` method applies partial modifications to a resource.
        pub const PATCH: Patch = "PATCH";
        /// The `PUT` method replaces all current representations of the target resource with the
        /// request content.
        pub const PUT: Put = "PUT";
        /// The `OPTIONS` method describes the communication options for the target resource.
        pub const OPTIONS: Options = "OPTIONS";
        /// The `HEAD` method asks for a response identical to a GET request, but without a
        /// response body.
        pub const HEAD: Head = "HEAD";
        /// The `TRACE` method performs a message loop-back test along the path to the target
        /// resource.
        pub const TRACE: Trace = "TRACE";
        /// The `CONNECT` method establishes a tunnel to the server identified by the target
        /// resource.
        pub const CONNECT: Connect = "CONNECT";
    }
}

// ===== Error =====

/// An error when trying to parse [`Method`] from a string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownMethod(s.to_owned()))
    }
}

impl std::error::Error for UnknownMethod { }

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not a valid method", self.0)
    }
}

// ===== Macros =====

macro_rules! forward {
    ($($(#[$doc:meta])* pub const $name:ident: $variant:ident = $val:literal;)*) => {
        $(
            $(#[$doc])*
            pub const $name: Method = Method(Inner::$variant);
        )*

        /// Create [`Method`] from its exact, case-sensitive name.
        pub fn from_name(src: &str) -> Option<Method> {
            match src {
                $(
                    $val => Some(Self::$name),
                )*
                _ => None,
            }
        }

        /// Returns string representation.
        pub const fn as_str(&self) -> &'static str {
            match self.0 {
                $(
                    Inner::$variant => $val,
                )*
            }
        }
    };
}

use forward;
