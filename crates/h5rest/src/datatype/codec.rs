// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use serde_json::{json, Map, Value};

use super::predefined;
use super::{CharSet, CompoundType, ReferenceKind, TypeDescriptor};
use crate::error::{Error, Result};
use crate::json;
use crate::version::ServerVersion;

const STR_NULLTERM: &str = "H5T_STR_NULLTERM";
const STR_NULLPAD: &str = "H5T_STR_NULLPAD";
const VARIABLE_LENGTH: &str = "H5T_VARIABLE";

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a datatype into its JSON wire form.
///
/// Committed types encode to their id string only.
pub fn encode(ty: &TypeDescriptor) -> Result<Value> {
    encode_inner(ty, None)
}

/// Encode for a specific server, rejecting features it predates.
pub fn encode_for_server(ty: &TypeDescriptor, version: ServerVersion) -> Result<Value> {
    encode_inner(ty, Some(version))
}

/// Top-level request fragment `"type": <json>` used in creation bodies.
pub fn type_body(ty: &TypeDescriptor) -> Result<String> {
    let value = encode(ty)?;
    Ok(format!("\"type\": {}", serde_json::to_string(&value)?))
}

fn encode_inner(ty: &TypeDescriptor, version: Option<ServerVersion>) -> Result<Value> {
    ty.validate()?;

    let value = match ty {
        TypeDescriptor::NamedTypeRef(uri) => {
            log::trace!("[datatype] committed type {}", uri);
            Value::String(uri.clone())
        }
        TypeDescriptor::Integer { .. } | TypeDescriptor::Float { .. } => {
            let name = predefined::name_of(ty).ok_or_else(|| {
                Error::unsupported_type(format!("no predefined name for {:?}", ty))
            })?;
            json!({ "class": ty.class_name(), "base": name })
        }
        TypeDescriptor::FixedString { length, charset } => {
            if *charset == CharSet::Utf8 {
                if let Some(v) = version {
                    if !v.supports_fixed_length_utf8() {
                        return Err(Error::unsupported_type(format!(
                            "fixed-length UTF-8 strings need server 0.8.5 or later (server is {})",
                            v
                        )));
                    }
                }
            }
            json!({
                "class": "H5T_STRING",
                "charSet": charset.wire_name(),
                "strPad": STR_NULLPAD,
                "length": length,
            })
        }
        TypeDescriptor::VariableString { charset } => json!({
            "class": "H5T_STRING",
            "charSet": charset.wire_name(),
            "strPad": STR_NULLTERM,
            "length": VARIABLE_LENGTH,
        }),
        TypeDescriptor::Compound(compound) => {
            let fields = compound
                .members()
                .iter()
                .map(|m| {
                    Ok(json!({
                        "name": m.name,
                        "type": encode_inner(&m.ty, version)?,
                    }))
                })
                .collect::<Result<Vec<_>>>()?;
            json!({ "class": "H5T_COMPOUND", "fields": fields })
        }
        TypeDescriptor::Enum { base, mapping } => {
            let mut map = Map::new();
            for (name, value) in mapping {
                map.insert(name.clone(), Value::from(*value));
            }
            json!({
                "class": "H5T_ENUM",
                "base": encode_inner(base, version)?,
                "mapping": map,
            })
        }
        TypeDescriptor::Array { base, dims } => json!({
            "class": "H5T_ARRAY",
            "base": encode_inner(base, version)?,
            "dims": dims,
        }),
        TypeDescriptor::Reference(kind) => json!({
            "class": "H5T_REFERENCE",
            "base": kind.wire_name(),
        }),
        TypeDescriptor::Opaque { .. }
        | TypeDescriptor::Bitfield { .. }
        | TypeDescriptor::VarLen(_)
        | TypeDescriptor::Time => {
            return Err(Error::unsupported_type(format!(
                "{} has no JSON encoding",
                ty.class_name()
            )));
        }
    };
    Ok(value)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a datatype from JSON text.
pub fn decode_str(text: &str) -> Result<TypeDescriptor> {
    let value: Value = serde_json::from_str(text)?;
    decode(&value)
}

/// Decode a datatype.
///
/// Accepts the type object itself, a `{"type": ...}` wrapper (as found in
/// dataset and attribute responses), or a committed type id string.
pub fn decode(value: &Value) -> Result<TypeDescriptor> {
    match value {
        Value::String(uri) => {
            if uri.is_empty() {
                return Err(Error::malformed("empty committed type id"));
            }
            Ok(TypeDescriptor::NamedTypeRef(uri.clone()))
        }
        Value::Object(obj) if !obj.contains_key("class") && obj.contains_key("type") => {
            decode(&obj["type"])
        }
        Value::Object(_) => decode_object(value),
        other => Err(Error::malformed(format!(
            "datatype must be an object or id string, got {}",
            kind_of(other)
        ))),
    }
}

fn decode_object(value: &Value) -> Result<TypeDescriptor> {
    let class = json::require_str(value, &["class"])?;
    log::trace!("[datatype] decoding {}", class);

    match class {
        "H5T_INTEGER" | "H5T_FLOAT" => decode_numeric(value, class),
        "H5T_STRING" => decode_string(value),
        "H5T_COMPOUND" => decode_compound(value),
        "H5T_ENUM" => decode_enum(value),
        "H5T_ARRAY" => decode_array(value),
        "H5T_REFERENCE" => decode_reference(value),
        "H5T_OPAQUE" | "H5T_BITFIELD" | "H5T_VLEN" | "H5T_TIME" => Err(
            Error::unsupported_type(format!("{} datatypes are unsupported", class)),
        ),
        other => Err(Error::malformed(format!("unknown datatype class '{}'", other))),
    }
}

fn decode_numeric(value: &Value, class: &str) -> Result<TypeDescriptor> {
    let base = json::require_str(value, &["base"])?;
    let entry = predefined::lookup(base)
        .ok_or_else(|| Error::malformed(format!("unknown predefined type '{}'", base)))?;
    let ty = entry.descriptor();
    if ty.class_name() != class {
        return Err(Error::malformed(format!(
            "predefined type '{}' does not belong to class {}",
            base, class
        )));
    }
    Ok(ty)
}

fn decode_string(value: &Value) -> Result<TypeDescriptor> {
    let length = json::require(value, &["length"])?;
    let is_variable = match length {
        Value::String(s) if s == VARIABLE_LENGTH => true,
        Value::Number(_) => false,
        _ => {
            return Err(Error::malformed(
                "string length must be a number or \"H5T_VARIABLE\"",
            ))
        }
    };

    let cset = json::require_str(value, &["charSet"])?;
    let charset = CharSet::from_wire(cset)
        .ok_or_else(|| Error::malformed(format!("unknown string character set '{}'", cset)))?;

    let pad = json::require_str(value, &["strPad"])?;
    let expected_pad = if is_variable { STR_NULLTERM } else { STR_NULLPAD };
    if pad != expected_pad {
        return Err(Error::malformed(format!(
            "string padding '{}' for {} strings",
            pad,
            if is_variable { "variable-length" } else { "fixed-length" }
        )));
    }

    if is_variable {
        return Ok(TypeDescriptor::VariableString { charset });
    }

    let length = length
        .as_u64()
        .filter(|n| *n > 0)
        .ok_or_else(|| Error::malformed("fixed string length must be a positive integer"))?;
    let length = usize::try_from(length)
        .map_err(|_| Error::malformed("fixed string length does not fit in memory"))?;
    Ok(TypeDescriptor::FixedString { length, charset })
}

fn decode_compound(value: &Value) -> Result<TypeDescriptor> {
    let fields = json::require_array(value, &["fields"])?;
    if fields.is_empty() {
        return Err(Error::malformed("compound datatype has no fields"));
    }

    let mut members = Vec::with_capacity(fields.len());
    for field in fields {
        let name = json::require_str(field, &["name"])?;
        let member_type = json::require(field, &["type"])?;
        members.push((name.to_string(), decode(member_type)?));
    }

    CompoundType::packed(members)
        .map(TypeDescriptor::Compound)
        .map_err(|e| match e {
            Error::InvalidArgument(msg) => Error::MalformedWireData(msg),
            other => other,
        })
}

fn decode_enum(value: &Value) -> Result<TypeDescriptor> {
    let base_json = json::require(value, &["base"])?;
    let base = decode(base_json)?;
    if !matches!(base, TypeDescriptor::Integer { .. }) {
        return Err(Error::malformed(format!(
            "enum base type must be H5T_INTEGER, got {}",
            base.class_name()
        )));
    }

    let mapping_json = json::require_object(value, &["mapping"])?;
    let mut mapping = Vec::with_capacity(mapping_json.len());
    for (name, v) in mapping_json {
        let n = v.as_i64().ok_or_else(|| {
            Error::malformed(format!("enum value for '{}' is not a 64-bit integer", name))
        })?;
        mapping.push((name.clone(), n));
    }

    Ok(TypeDescriptor::Enum {
        base: Box::new(base),
        mapping,
    })
}

fn decode_array(value: &Value) -> Result<TypeDescriptor> {
    let dims = json::u64_array(json::require(value, &["dims"])?, "dims")?;
    let base = decode(json::require(value, &["base"])?)?;
    TypeDescriptor::array(base, dims).map_err(|e| match e {
        Error::InvalidArgument(msg) => Error::MalformedWireData(msg),
        other => other,
    })
}

fn decode_reference(value: &Value) -> Result<TypeDescriptor> {
    match json::require_str(value, &["base"])? {
        "H5T_STD_REF_OBJ" => Ok(TypeDescriptor::Reference(ReferenceKind::Object)),
        "H5T_STD_REF_DSETREG" => Ok(TypeDescriptor::Reference(ReferenceKind::Region)),
        other => Err(Error::malformed(format!("unknown reference type '{}'", other))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
