// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shapes (dataspace extents) and their JSON forms.
//!
//! Three JSON layouts are understood on input:
//!
//! ```text
//! {"shape": {"class": "H5S_SIMPLE", "dims": [10], "maxdims": [0]}}   server response
//! {"class": "H5S_SIMPLE", "dims": [10], "maxdims": [0]}              bare
//! {"class": "H5S_SIMPLE", "shape": {"dims": [10], "maxdims": [0]}}   nested
//! ```
//!
//! A `0` in `maxdims` marks an unlimited extent.

pub mod selection;

pub use selection::{
    decode_selection, encode_selection, parse_url_selection, Hyperslab, Selection,
    SelectionEncoding,
};

use serde_json::{json, Map, Value};

use crate::datatype::MAX_RANK;
use crate::error::{Error, Result};
use crate::json;

/// Maximum size of one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extent {
    Fixed(u64),
    Unlimited,
}

impl Extent {
    /// Wire value; unlimited is `0`.
    pub fn to_wire(self) -> u64 {
        match self {
            Extent::Fixed(n) => n,
            Extent::Unlimited => 0,
        }
    }

    pub fn from_wire(n: u64) -> Self {
        if n == 0 {
            Extent::Unlimited
        } else {
            Extent::Fixed(n)
        }
    }
}

/// Extent of an array-valued object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeDescriptor {
    Null,
    Scalar,
    Simple {
        dims: Vec<u64>,
        maxdims: Option<Vec<Extent>>,
    },
}

/// JSON layout produced by [`encode_shape_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeLayout {
    /// `{"class", "dims", "maxdims"}`
    #[default]
    Flat,
    /// `{"class", "shape": {"dims", "maxdims"}}`
    Nested,
}

impl ShapeDescriptor {
    /// Simple shape with fixed maximum extents.
    pub fn simple(dims: Vec<u64>) -> Self {
        ShapeDescriptor::Simple {
            dims,
            maxdims: None,
        }
    }

    /// Simple shape with explicit maximum extents.
    pub fn simple_with_max(dims: Vec<u64>, maxdims: Vec<Extent>) -> Result<Self> {
        let shape = ShapeDescriptor::Simple {
            dims,
            maxdims: Some(maxdims),
        };
        shape.validate()?;
        Ok(shape)
    }

    pub fn rank(&self) -> usize {
        match self {
            ShapeDescriptor::Simple { dims, .. } => dims.len(),
            _ => 0,
        }
    }

    /// Number of elements; `None` when the product overflows a `u64`.
    pub fn npoints(&self) -> Option<u64> {
        match self {
            ShapeDescriptor::Null => Some(0),
            ShapeDescriptor::Scalar => Some(1),
            ShapeDescriptor::Simple { dims, .. } => {
                dims.iter().try_fold(1u64, |acc, d| acc.checked_mul(*d))
            }
        }
    }

    pub fn dims(&self) -> &[u64] {
        match self {
            ShapeDescriptor::Simple { dims, .. } => dims,
            _ => &[],
        }
    }

    pub fn has_unlimited(&self) -> bool {
        matches!(self, ShapeDescriptor::Simple { maxdims: Some(m), .. } if m.contains(&Extent::Unlimited))
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            ShapeDescriptor::Null => "H5S_NULL",
            ShapeDescriptor::Scalar => "H5S_SCALAR",
            ShapeDescriptor::Simple { .. } => "H5S_SIMPLE",
        }
    }

    pub fn validate(&self) -> Result<()> {
        let ShapeDescriptor::Simple { dims, maxdims } = self else {
            return Ok(());
        };
        if dims.is_empty() {
            return Err(Error::InvalidArgument("simple shape with 0 dimensions".into()));
        }
        if dims.len() > MAX_RANK {
            return Err(Error::InvalidArgument(format!(
                "shape rank {} exceeds {}",
                dims.len(),
                MAX_RANK
            )));
        }
        if let Some(maxdims) = maxdims {
            if maxdims.len() != dims.len() {
                return Err(Error::InvalidArgument(format!(
                    "maxdims rank {} differs from dims rank {}",
                    maxdims.len(),
                    dims.len()
                )));
            }
            for (d, m) in dims.iter().zip(maxdims) {
                match m {
                    Extent::Fixed(0) => {
                        return Err(Error::InvalidArgument(
                            "fixed maximum extent of 0 collides with the unlimited marker".into(),
                        ))
                    }
                    Extent::Fixed(max) if max < d => {
                        return Err(Error::InvalidArgument(format!(
                            "maximum extent {} is smaller than extent {}",
                            max, d
                        )))
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a shape in the flat layout.
pub fn encode_shape(shape: &ShapeDescriptor) -> Result<Value> {
    encode_shape_with(shape, ShapeLayout::Flat)
}

pub fn encode_shape_with(shape: &ShapeDescriptor, layout: ShapeLayout) -> Result<Value> {
    shape.validate()?;
    let ShapeDescriptor::Simple { dims, maxdims } = shape else {
        return Ok(json!({ "class": shape.class_name() }));
    };

    let mut extents = Map::new();
    extents.insert("dims".into(), json!(dims));
    if let Some(maxdims) = maxdims {
        let wire: Vec<u64> = maxdims.iter().map(|m| m.to_wire()).collect();
        extents.insert("maxdims".into(), json!(wire));
    }

    let mut out = Map::new();
    out.insert("class".into(), Value::from(shape.class_name()));
    match layout {
        ShapeLayout::Flat => out.extend(extents),
        ShapeLayout::Nested => {
            out.insert("shape".into(), Value::Object(extents));
        }
    }
    Ok(Value::Object(out))
}

/// Fields a creation request carries for a shape.
///
/// Scalar shapes add nothing, null shapes add `"shape": "H5S_NULL"`,
/// simple shapes add `"shape": [..]` and, when set, `"maxdims": [..]`.
pub fn creation_fields(shape: &ShapeDescriptor) -> Result<Map<String, Value>> {
    shape.validate()?;
    let mut out = Map::new();
    match shape {
        ShapeDescriptor::Scalar => {}
        ShapeDescriptor::Null => {
            out.insert("shape".into(), Value::from("H5S_NULL"));
        }
        ShapeDescriptor::Simple { dims, maxdims } => {
            out.insert("shape".into(), json!(dims));
            if let Some(maxdims) = maxdims {
                let wire: Vec<u64> = maxdims.iter().map(|m| m.to_wire()).collect();
                out.insert("maxdims".into(), json!(wire));
            }
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a shape from any of the accepted layouts.
pub fn decode_shape(value: &Value) -> Result<ShapeDescriptor> {
    let obj = value
        .as_object()
        .ok_or_else(|| Error::malformed("shape must be a JSON object"))?;

    if !obj.contains_key("class") {
        return match obj.get("shape") {
            Some(inner @ Value::Object(_)) => decode_shape(inner),
            _ => Err(Error::malformed("missing key 'class' in shape")),
        };
    }

    match json::require_str(value, &["class"])? {
        "H5S_NULL" => Ok(ShapeDescriptor::Null),
        "H5S_SCALAR" => Ok(ShapeDescriptor::Scalar),
        "H5S_SIMPLE" => {
            let extents = if obj.contains_key("dims") {
                value
            } else {
                match obj.get("shape") {
                    Some(inner @ Value::Object(_)) => inner,
                    _ => return Err(Error::malformed("simple shape has no 'dims'")),
                }
            };
            decode_simple(extents)
        }
        other => Err(Error::malformed(format!("unknown shape class '{}'", other))),
    }
}

fn decode_simple(extents: &Value) -> Result<ShapeDescriptor> {
    let dims = json::u64_array(json::require(extents, &["dims"])?, "dims")?;
    if dims.is_empty() {
        return Err(Error::malformed("simple shape has an empty 'dims' array"));
    }
    let maxdims = match json::get(extents, &["maxdims"]) {
        Some(m) => Some(
            json::u64_array(m, "maxdims")?
                .into_iter()
                .map(Extent::from_wire)
                .collect::<Vec<_>>(),
        ),
        None => None,
    };
    let shape = ShapeDescriptor::Simple { dims, maxdims };
    shape.validate().map_err(|e| match e {
        Error::InvalidArgument(msg) => Error::MalformedWireData(msg),
        other => other,
    })?;
    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_scenario() {
        let shape = ShapeDescriptor::simple_with_max(vec![10], vec![Extent::Unlimited]).unwrap();

        let nested = encode_shape_with(&shape, ShapeLayout::Nested).unwrap();
        assert_eq!(
            nested,
            json!({"class": "H5S_SIMPLE", "shape": {"dims": [10], "maxdims": [0]}})
        );
        assert_eq!(decode_shape(&nested).unwrap(), shape);

        let flat = encode_shape(&shape).unwrap();
        assert_eq!(flat, json!({"class": "H5S_SIMPLE", "dims": [10], "maxdims": [0]}));
        assert_eq!(decode_shape(&flat).unwrap(), shape);
    }

    #[test]
    fn test_server_wrapper_form() {
        let resp = json!({
            "id": "d-1",
            "shape": {"class": "H5S_SIMPLE", "dims": [4, 6], "maxdims": [4, 0]}
        });
        let shape = decode_shape(&resp).unwrap();
        assert_eq!(shape.dims(), &[4, 6]);
        assert!(shape.has_unlimited());
        assert_eq!(shape.npoints(), Some(24));
    }

    #[test]
    fn test_npoints_overflow() {
        let huge = decode_shape(&json!({"class": "H5S_SIMPLE", "dims": [1u64 << 32, 1u64 << 32]}))
            .unwrap();
        assert_eq!(huge.npoints(), None);
        let edge = ShapeDescriptor::simple(vec![1 << 32, (1 << 32) - 1]);
        assert_eq!(edge.npoints(), Some(u64::MAX - ((1 << 32) - 1)));
        assert_eq!(ShapeDescriptor::Null.npoints(), Some(0));
        assert_eq!(ShapeDescriptor::Scalar.npoints(), Some(1));
    }

    #[test]
    fn test_null_and_scalar() {
        assert_eq!(
            encode_shape(&ShapeDescriptor::Null).unwrap(),
            json!({"class": "H5S_NULL"})
        );
        assert_eq!(
            decode_shape(&json!({"shape": {"class": "H5S_SCALAR"}})).unwrap(),
            ShapeDescriptor::Scalar
        );
        assert!(creation_fields(&ShapeDescriptor::Scalar).unwrap().is_empty());
        assert_eq!(
            creation_fields(&ShapeDescriptor::Null).unwrap()["shape"],
            "H5S_NULL"
        );
    }

    #[test]
    fn test_creation_fields_simple() {
        let shape =
            ShapeDescriptor::simple_with_max(vec![3, 0], vec![Extent::Fixed(8), Extent::Unlimited])
                .unwrap();
        let fields = creation_fields(&shape).unwrap();
        assert_eq!(fields["shape"], json!([3, 0]));
        assert_eq!(fields["maxdims"], json!([8, 0]));

        let no_max = creation_fields(&ShapeDescriptor::simple(vec![5])).unwrap();
        assert!(!no_max.contains_key("maxdims"));
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(encode_shape(&ShapeDescriptor::simple(vec![])).is_err());
        assert!(ShapeDescriptor::simple_with_max(vec![2, 2], vec![Extent::Unlimited]).is_err());
        assert!(ShapeDescriptor::simple_with_max(vec![5], vec![Extent::Fixed(4)]).is_err());
        assert!(matches!(
            decode_shape(&json!({"class": "H5S_SIMPLE", "dims": []})),
            Err(Error::MalformedWireData(_))
        ));
        assert!(matches!(
            decode_shape(&json!({"class": "H5S_SIMPLE", "dims": [2], "maxdims": [1]})),
            Err(Error::MalformedWireData(_))
        ));
        assert!(decode_shape(&json!({"class": "H5S_WEIRD"})).is_err());
    }
}
