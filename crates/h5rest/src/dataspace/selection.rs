// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Selections and their two wire forms.
//!
//! Fixed-size transfers carry the selection as a `select` query parameter:
//!
//! ```text
//! [start:stop:step,start:stop:step,...]      one triplet per dimension
//! ```
//!
//! Variable-length transfers carry it in the JSON request body, either as
//! `"points": [...]` or as parallel `"start"`, `"stop"` and `"step"` arrays.
//!
//! Only regular hyperslabs are representable: each dimension selects
//! `count` single elements `stride` apart, or one contiguous run.

use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::json;

/// Regular hyperslab description, one entry per dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperslab {
    pub start: Vec<u64>,
    pub stride: Vec<u64>,
    pub count: Vec<u64>,
    pub block: Vec<u64>,
}

impl Hyperslab {
    /// Contiguous box of `count` elements from `start` in each dimension.
    pub fn contiguous(start: Vec<u64>, count: Vec<u64>) -> Self {
        let rank = start.len();
        Hyperslab {
            start,
            stride: vec![1; rank],
            count,
            block: vec![1; rank],
        }
    }

    pub fn rank(&self) -> usize {
        self.start.len()
    }

    /// Selected elements; `None` when the count does not fit in a `u64`.
    pub fn npoints(&self) -> Option<u64> {
        self.count
            .iter()
            .zip(&self.block)
            .try_fold(1u64, |acc, (c, b)| acc.checked_mul(c.checked_mul(*b)?))
    }

    /// Canonical form with `block == 1` in every dimension.
    ///
    /// Contiguous patterns (a single block, or blocks that touch because
    /// `stride == block`) collapse into one run of single elements.
    /// Anything else with `block > 1` is not a regular pattern.
    pub fn normalized(&self) -> Result<Hyperslab> {
        self.check_rank(self.rank())?;
        let mut out = self.clone();
        for i in 0..self.rank() {
            let (stride, count, block) = (self.stride[i], self.count[i], self.block[i]);
            if count == 0 || block == 0 {
                return Err(Error::UnsupportedSelection(format!(
                    "dimension {} has count {} and block {}",
                    i, count, block
                )));
            }
            if count > 1 && stride == 0 {
                return Err(Error::UnsupportedSelection(format!(
                    "dimension {} has a zero stride",
                    i
                )));
            }
            if block == 1 {
                if count == 1 {
                    out.stride[i] = 1;
                }
                continue;
            }
            if count == 1 || stride == block {
                out.count[i] = count.checked_mul(block).ok_or_else(|| {
                    Error::UnsupportedSelection(format!(
                        "dimension {} selects more than {} elements",
                        i,
                        u64::MAX
                    ))
                })?;
                out.stride[i] = 1;
                out.block[i] = 1;
                continue;
            }
            return Err(Error::UnsupportedSelection(format!(
                "dimension {} selects blocks of {} every {} elements",
                i, block, stride
            )));
        }
        Ok(out)
    }

    /// Exclusive end coordinate per dimension.
    fn stops(&self) -> Result<Vec<u64>> {
        (0..self.rank())
            .map(|i| {
                let span = self.count[i]
                    .checked_sub(1)
                    .and_then(|n| n.checked_mul(self.stride[i]))
                    .and_then(|n| n.checked_add(self.block[i]));
                span.and_then(|n| n.checked_add(self.start[i])).ok_or_else(|| {
                    Error::UnsupportedSelection(format!(
                        "dimension {} extends past coordinate {}",
                        i,
                        u64::MAX
                    ))
                })
            })
            .collect()
    }

    fn steps(&self) -> Vec<u64> {
        (0..self.rank())
            .map(|i| self.stride[i] / self.block[i])
            .collect()
    }

    fn check_rank(&self, rank: usize) -> Result<()> {
        let lens = [
            self.start.len(),
            self.stride.len(),
            self.count.len(),
            self.block.len(),
        ];
        if lens.iter().any(|l| *l != rank) {
            return Err(Error::UnsupportedSelection(format!(
                "hyperslab vectors have lengths {:?}, expected {}",
                lens, rank
            )));
        }
        Ok(())
    }
}

/// A subset of a shape's coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    None,
    /// Coordinates, each tuple as long as the rank.
    Points(Vec<Vec<u64>>),
    Hyperslab(Hyperslab),
}

impl Selection {
    /// Selected elements given the extent the selection applies to;
    /// `None` on overflow.
    pub fn npoints(&self, dims: &[u64]) -> Option<u64> {
        match self {
            Selection::All => dims.iter().try_fold(1u64, |acc, d| acc.checked_mul(*d)),
            Selection::None => Some(0),
            Selection::Points(points) => Some(points.len() as u64),
            Selection::Hyperslab(slab) => slab.npoints(),
        }
    }

    /// Form that survives the JSON body round trip: hyperslabs normalized,
    /// an empty point list as [`Selection::None`].
    pub fn canonical(&self) -> Result<Selection> {
        match self {
            Selection::Points(points) if points.is_empty() => Ok(Selection::None),
            Selection::Hyperslab(slab) => slab.normalized().map(Selection::Hyperslab),
            other => Ok(other.clone()),
        }
    }

    /// True when every selected coordinate lies inside `dims`.
    pub fn fits_within(&self, dims: &[u64]) -> bool {
        match self {
            Selection::All | Selection::None => true,
            Selection::Points(points) => points
                .iter()
                .all(|p| p.len() == dims.len() && p.iter().zip(dims).all(|(c, d)| c < d)),
            Selection::Hyperslab(slab) => match slab.normalized() {
                Ok(n) if n.rank() == dims.len() => match n.stops() {
                    Ok(stops) => stops.iter().zip(dims).all(|(s, d)| s <= d),
                    Err(_) => false,
                },
                _ => false,
            },
        }
    }
}

/// Encoded selection.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEncoding {
    /// Whole extent: nothing to send.
    Empty,
    /// Value of the `select` query parameter.
    Query(String),
    /// Fields to merge into the JSON request body.
    Body(Map<String, Value>),
}

impl SelectionEncoding {
    /// Body fields as a JSON fragment without surrounding braces.
    pub fn to_fragment(&self) -> Result<String> {
        match self {
            SelectionEncoding::Empty => Ok(String::new()),
            SelectionEncoding::Query(q) => Ok(q.clone()),
            SelectionEncoding::Body(fields) => {
                let parts = fields
                    .iter()
                    .map(|(k, v)| Ok(format!("\"{}\": {}", k, serde_json::to_string(v)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(parts.join(", "))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode `selection` over a shape of the given rank.
///
/// With `as_url_param`, hyperslabs become `[start:stop:step,...]`; point
/// and empty selections are refused with `UnsupportedInContext`. In the
/// body form an empty selection is `"points": []`.
pub fn encode_selection(
    selection: &Selection,
    rank: usize,
    as_url_param: bool,
) -> Result<SelectionEncoding> {
    if rank == 0 {
        return Err(Error::InvalidArgument("0-dimension dataspace specified".into()));
    }

    match selection {
        Selection::All => Ok(SelectionEncoding::Empty),
        Selection::None | Selection::Points(_) if as_url_param => Err(Error::UnsupportedInContext(
            "point and empty selections cannot be sent as a request parameter".into(),
        )),
        Selection::None => {
            let mut body = Map::new();
            body.insert("points".into(), Value::Array(Vec::new()));
            Ok(SelectionEncoding::Body(body))
        }
        Selection::Points(points) => {
            let mut items = Vec::with_capacity(points.len());
            for (i, point) in points.iter().enumerate() {
                if point.len() != rank {
                    return Err(Error::InvalidArgument(format!(
                        "point {} has {} coordinates, rank is {}",
                        i,
                        point.len(),
                        rank
                    )));
                }
                items.push(if rank == 1 {
                    json!(point[0])
                } else {
                    json!(point)
                });
            }
            let mut body = Map::new();
            body.insert("points".into(), Value::Array(items));
            Ok(SelectionEncoding::Body(body))
        }
        Selection::Hyperslab(slab) => {
            slab.check_rank(rank)?;
            let slab = slab.normalized()?;
            let stops = slab.stops()?;
            let steps = slab.steps();
            log::trace!(
                "[selection] hyperslab start={:?} stop={:?} step={:?}",
                slab.start,
                stops,
                steps
            );

            if as_url_param {
                let triplets: Vec<String> = (0..rank)
                    .map(|i| format!("{}:{}:{}", slab.start[i], stops[i], steps[i]))
                    .collect();
                Ok(SelectionEncoding::Query(format!("[{}]", triplets.join(","))))
            } else {
                let mut body = Map::new();
                body.insert("start".into(), json!(slab.start));
                body.insert("stop".into(), json!(stops));
                body.insert("step".into(), json!(steps));
                Ok(SelectionEncoding::Body(body))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode the JSON body form. A body with neither `points` nor `start`
/// selects everything; an empty `points` array selects nothing.
pub fn decode_selection(value: &Value, rank: usize) -> Result<Selection> {
    if rank == 0 {
        return Err(Error::InvalidArgument("0-dimension dataspace specified".into()));
    }

    if let Some(points) = json::get(value, &["points"]) {
        let items = points
            .as_array()
            .ok_or_else(|| Error::malformed("'points' is not an array"))?;
        if items.is_empty() {
            return Ok(Selection::None);
        }
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let coords = if rank == 1 && item.is_number() {
                vec![item
                    .as_u64()
                    .ok_or_else(|| Error::malformed("point coordinate is not an integer"))?]
            } else {
                json::u64_array(item, "point")?
            };
            if coords.len() != rank {
                return Err(Error::malformed(format!(
                    "point has {} coordinates, rank is {}",
                    coords.len(),
                    rank
                )));
            }
            out.push(coords);
        }
        return Ok(Selection::Points(out));
    }

    if json::get(value, &["start"]).is_some() {
        let start = json::u64_array(json::require(value, &["start"])?, "start")?;
        let stop = json::u64_array(json::require(value, &["stop"])?, "stop")?;
        let step = match json::get(value, &["step"]) {
            Some(s) => json::u64_array(s, "step")?,
            None => vec![1; rank],
        };
        return triplets_to_hyperslab(&start, &stop, &step, rank).map(Selection::Hyperslab);
    }

    Ok(Selection::All)
}

/// Parse the `[start:stop:step,...]` query form.
///
/// `step` may be omitted (defaults to 1), and a bare index `i` means
/// `i:i+1`.
pub fn parse_url_selection(text: &str) -> Result<Selection> {
    let inner = text
        .trim()
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .ok_or_else(|| Error::malformed(format!("selection '{}' is not bracketed", text)))?;

    let (mut start, mut stop, mut step) = (Vec::new(), Vec::new(), Vec::new());
    for dim in inner.split(',') {
        let fields: Vec<&str> = dim.trim().split(':').collect();
        let parse = |s: &str| -> Result<u64> {
            s.trim()
                .parse::<u64>()
                .map_err(|_| Error::malformed(format!("bad selection bound '{}' in '{}'", s, text)))
        };
        let (b, e, s) = match fields.as_slice() {
            [i] => {
                let i = parse(i)?;
                let end = i
                    .checked_add(1)
                    .ok_or_else(|| Error::malformed(format!("selection index {} is out of range", i)))?;
                (i, end, 1)
            }
            [b, e] => (parse(b)?, parse(e)?, 1),
            [b, e, s] => (parse(b)?, parse(e)?, parse(s)?),
            _ => {
                return Err(Error::malformed(format!(
                    "selection dimension '{}' has too many fields",
                    dim
                )))
            }
        };
        start.push(b);
        stop.push(e);
        step.push(s);
    }

    let rank = start.len();
    triplets_to_hyperslab(&start, &stop, &step, rank).map(Selection::Hyperslab)
}

fn triplets_to_hyperslab(start: &[u64], stop: &[u64], step: &[u64], rank: usize) -> Result<Hyperslab> {
    if start.len() != rank || stop.len() != rank || step.len() != rank {
        return Err(Error::malformed(format!(
            "start/stop/step lengths {}/{}/{} do not match rank {}",
            start.len(),
            stop.len(),
            step.len(),
            rank
        )));
    }

    let mut count = Vec::with_capacity(rank);
    let mut stride = Vec::with_capacity(rank);
    for i in 0..rank {
        if step[i] == 0 {
            return Err(Error::malformed(format!("dimension {} has a zero step", i)));
        }
        if stop[i] <= start[i] {
            return Err(Error::malformed(format!(
                "dimension {} stops at {} before starting at {}",
                i, stop[i], start[i]
            )));
        }
        let n = (stop[i] - start[i]).div_ceil(step[i]);
        count.push(n);
        stride.push(if n == 1 { 1 } else { step[i] });
    }

    Ok(Hyperslab {
        start: start.to_vec(),
        stride,
        count,
        block: vec![1; rank],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slab(start: &[u64], stride: &[u64], count: &[u64], block: &[u64]) -> Selection {
        Selection::Hyperslab(Hyperslab {
            start: start.to_vec(),
            stride: stride.to_vec(),
            count: count.to_vec(),
            block: block.to_vec(),
        })
    }

    #[test]
    fn test_url_param_hyperslab() {
        let sel = slab(&[0, 2], &[2, 1], &[5, 3], &[1, 1]);
        let enc = encode_selection(&sel, 2, true).unwrap();
        assert_eq!(enc, SelectionEncoding::Query("[0:9:2,2:5:1]".into()));
        assert_eq!(parse_url_selection("[0:9:2,2:5:1]").unwrap(), sel);
    }

    #[test]
    fn test_points_rejected_in_url_mode() {
        let sel = Selection::Points(vec![vec![1, 2]]);
        let err = encode_selection(&sel, 2, true).unwrap_err();
        assert!(matches!(err, Error::UnsupportedInContext(_)));
    }

    #[test]
    fn test_points_json_body() {
        let two_d = Selection::Points(vec![vec![1, 2], vec![3, 4]]);
        let SelectionEncoding::Body(body) = encode_selection(&two_d, 2, false).unwrap() else {
            panic!("expected body");
        };
        assert_eq!(body["points"], json!([[1, 2], [3, 4]]));
        assert_eq!(decode_selection(&Value::Object(body), 2).unwrap(), two_d);

        let one_d = Selection::Points(vec![vec![7], vec![0]]);
        let enc = encode_selection(&one_d, 1, false).unwrap();
        assert_eq!(enc.to_fragment().unwrap(), "\"points\": [7,0]");
    }

    #[test]
    fn test_hyperslab_json_body() {
        let sel = slab(&[1], &[3], &[4], &[1]);
        let enc = encode_selection(&sel, 1, false).unwrap();
        assert_eq!(
            enc.to_fragment().unwrap(),
            "\"start\": [1], \"stop\": [11], \"step\": [3]"
        );
        let SelectionEncoding::Body(body) = enc else {
            panic!("expected body");
        };
        assert_eq!(decode_selection(&Value::Object(body), 1).unwrap(), sel);
    }

    #[test]
    fn test_contiguous_blocks_collapse() {
        // two touching blocks of 3 == one run of 6
        let sel = slab(&[4], &[3], &[2], &[3]);
        let enc = encode_selection(&sel, 1, true).unwrap();
        assert_eq!(enc, SelectionEncoding::Query("[4:10:1]".into()));

        // single block with default stride
        let sel = slab(&[0], &[1], &[1], &[5]);
        let enc = encode_selection(&sel, 1, true).unwrap();
        assert_eq!(enc, SelectionEncoding::Query("[0:5:1]".into()));
    }

    #[test]
    fn test_irregular_patterns_unsupported() {
        let gaps = slab(&[0], &[4], &[3], &[2]);
        assert!(matches!(
            encode_selection(&gaps, 1, false),
            Err(Error::UnsupportedSelection(_))
        ));
        let overlap = slab(&[0], &[1], &[3], &[2]);
        assert!(matches!(
            encode_selection(&overlap, 1, true),
            Err(Error::UnsupportedSelection(_))
        ));
        let wrong_rank = slab(&[0, 0], &[1, 1], &[1, 1], &[1, 1]);
        assert!(matches!(
            encode_selection(&wrong_rank, 3, true),
            Err(Error::UnsupportedSelection(_))
        ));
    }

    #[test]
    fn test_all_none_and_rank_zero() {
        assert_eq!(
            encode_selection(&Selection::All, 2, true).unwrap(),
            SelectionEncoding::Empty
        );
        assert!(encode_selection(&Selection::All, 0, false).is_err());
        assert_eq!(decode_selection(&json!({}), 2).unwrap(), Selection::All);
    }

    #[test]
    fn test_none_has_a_body_form() {
        let SelectionEncoding::Body(body) = encode_selection(&Selection::None, 2, false).unwrap() else {
            panic!("expected body");
        };
        assert_eq!(body["points"], json!([]));
        assert_eq!(decode_selection(&Value::Object(body), 2).unwrap(), Selection::None);
        assert!(matches!(
            encode_selection(&Selection::None, 2, true),
            Err(Error::UnsupportedInContext(_))
        ));
        assert_eq!(
            Selection::Points(Vec::new()).canonical().unwrap(),
            Selection::None
        );
    }

    #[test]
    fn test_block_only_slab_round_trips_in_canonical_form() {
        let sel = slab(&[2], &[1], &[1], &[4]);
        let SelectionEncoding::Body(body) = encode_selection(&sel, 1, false).unwrap() else {
            panic!("expected body");
        };
        let back = decode_selection(&Value::Object(body), 1).unwrap();
        assert_eq!(back, slab(&[2], &[1], &[4], &[1]));
        assert_eq!(back, sel.canonical().unwrap());
    }

    #[test]
    fn test_coordinates_near_u64_max() {
        assert!(matches!(
            parse_url_selection("[18446744073709551615]"),
            Err(Error::MalformedWireData(_))
        ));
        assert!(parse_url_selection("[18446744073709551614]").is_ok());

        let edge = slab(&[u64::MAX], &[1], &[1], &[1]);
        for as_url in [true, false] {
            assert!(matches!(
                encode_selection(&edge, 1, as_url),
                Err(Error::UnsupportedSelection(_))
            ));
        }
        assert!(!edge.fits_within(&[u64::MAX]));

        let wide = slab(&[0], &[u64::MAX], &[3], &[1]);
        assert!(encode_selection(&wide, 1, true).is_err());
        let huge_run = slab(&[0], &[2], &[u64::MAX], &[2]);
        assert!(matches!(
            encode_selection(&huge_run, 1, false),
            Err(Error::UnsupportedSelection(_))
        ));
    }

    #[test]
    fn test_npoints_overflow_is_none() {
        let big = [1u64 << 32, 1u64 << 32];
        assert_eq!(Selection::All.npoints(&big), None);
        assert_eq!(Selection::All.npoints(&[1 << 31, 2]), Some(1 << 32));
        assert_eq!(slab(&[0, 0], &[1, 1], &big, &[1, 1]).npoints(&big), None);
        assert_eq!(slab(&[0], &[1], &[3], &[u64::MAX]).npoints(&[1]), None);
        assert_eq!(Selection::None.npoints(&big), Some(0));
    }

    #[test]
    fn test_parse_url_shorthand() {
        let sel = parse_url_selection("[3, 0:4]").unwrap();
        assert_eq!(sel, slab(&[3, 0], &[1, 1], &[1, 4], &[1, 1]));
        assert!(parse_url_selection("0:4").is_err());
        assert!(parse_url_selection("[4:2]").is_err());
    }

    #[test]
    fn test_fits_within() {
        let dims = [10, 10];
        assert!(slab(&[0, 0], &[3, 1], &[4, 10], &[1, 1]).fits_within(&dims));
        assert!(!slab(&[1, 0], &[3, 1], &[4, 10], &[1, 1]).fits_within(&dims));
        assert!(!Selection::Points(vec![vec![10, 0]]).fits_within(&dims));
        assert_eq!(Selection::All.npoints(&dims), Some(100));
    }
}
