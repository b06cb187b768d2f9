//! Just enough XML-RPC for `package_releases`.
//!
//! Requests carry string and boolean parameters. Responses are either an
//! array of strings or a fault.

use std::fmt::Write as _;

/// A scalar XML-RPC request parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param<'a> {
    Str(&'a str),
    Bool(bool),
}

/// Errors decoding an XML-RPC response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XmlRpcError {
    #[error("XML-RPC fault: {0}")]
    Fault(String),
    #[error("malformed XML-RPC response: {0}")]
    Malformed(&'static str),
}

/// Encode a `methodCall` document.
pub fn encode_call(method: &str, params: &[Param<'_>]) -> String {
    let mut body = String::from("<?xml version=\"1.0\"?>\n<methodCall>");
    let _ = write!(body, "<methodName>{}</methodName><params>", escape(method));
    for param in params {
        body.push_str("<param><value>");
        match param {
            Param::Str(s) => {
                let _ = write!(body, "<string>{}</string>", escape(s));
            }
            Param::Bool(b) => {
                let _ = write!(body, "<boolean>{}</boolean>", u8::from(*b));
            }
        }
        body.push_str("</value></param>");
    }
    body.push_str("</params></methodCall>\n");
    body
}

/// Decode a `methodResponse` whose single parameter is an array of strings.
pub fn decode_string_array(body: &str) -> Result<Vec<String>, XmlRpcError> {
    if body.contains("<fault>") {
        let message = fault_string(body).unwrap_or_else(|| "unknown fault".to_string());
        return Err(XmlRpcError::Fault(message));
    }
    if !body.contains("<methodResponse") {
        return Err(XmlRpcError::Malformed("missing methodResponse"));
    }
    if body.contains("<data/>") {
        return Ok(Vec::new());
    }
    let data = between(body, "<data>", "</data>").ok_or(XmlRpcError::Malformed("missing array data"))?;

    let mut values = Vec::new();
    let mut rest = data;
    while let Some(start) = rest.find("<value>") {
        let after = &rest[start + "<value>".len()..];
        let end = after
            .find("</value>")
            .ok_or(XmlRpcError::Malformed("unterminated value"))?;
        values.push(scalar_string(&after[..end])?);
        rest = &after[end + "</value>".len()..];
    }
    Ok(values)
}

fn fault_string(body: &str) -> Option<String> {
    let member = body.split("<member>").find(|m| m.contains("<name>faultString</name>"))?;
    let value = between(member, "<value>", "</value>")?;
    scalar_string(value).ok()
}

/// Text of a string value. Untyped values default to string.
fn scalar_string(inner: &str) -> Result<String, XmlRpcError> {
    let trimmed = inner.trim();
    if trimmed == "<string/>" {
        return Ok(String::new());
    }
    if let Some(text) = trimmed
        .strip_prefix("<string>")
        .and_then(|t| t.strip_suffix("</string>"))
    {
        return Ok(unescape(text));
    }
    if trimmed.starts_with('<') {
        return Err(XmlRpcError::Malformed("expected a string value"));
    }
    Ok(unescape(inner))
}

fn between<'a>(haystack: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = haystack.find(open)? + open.len();
    let end = haystack[start..].find(close)? + start;
    Some(&haystack[start..end])
}

fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn unescape(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
