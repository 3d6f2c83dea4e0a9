use super::value::{AttrKind, AttrValue};

/// 2^63; whole floats in `[-I64_BOUND, I64_BOUND)` convert to `i64` exactly.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Coerce a bound value to the declared kind of its attribute.
///
/// `None` passes through untouched; required-ness is checked by the
/// descriptor. Lossless conversions are applied (integer to float, numeric
/// strings, a single string to a one-element sequence); everything else is
/// reported as a type mismatch.
pub fn coerce(value: AttrValue, kind: AttrKind) -> Result<AttrValue, String> {
    if value.is_none() || value.kind() == Some(kind) {
        return Ok(value);
    }

    match (kind, value) {
        (AttrKind::Float, AttrValue::Integer(i)) => Ok(AttrValue::Float(i as f64)),
        (AttrKind::Float, AttrValue::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(AttrValue::Float)
            .map_err(|e| format!("cannot convert '{}' to float: {}", s, e)),
        (AttrKind::Integer, AttrValue::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(AttrValue::Integer)
            .map_err(|e| format!("cannot convert '{}' to integer: {}", s, e)),
        (AttrKind::Integer, AttrValue::Float(f))
            if f.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&f) =>
        {
            Ok(AttrValue::Integer(f as i64))
        }
        (AttrKind::Boolean, AttrValue::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" => Ok(AttrValue::Boolean(true)),
            "false" => Ok(AttrValue::Boolean(false)),
            _ => Err(format!("cannot convert '{}' to boolean", s)),
        },
        (AttrKind::String, AttrValue::Integer(i)) => Ok(AttrValue::String(i.to_string())),
        (AttrKind::String, AttrValue::Float(f)) => Ok(AttrValue::String(f.to_string())),
        (AttrKind::String, AttrValue::Boolean(b)) => Ok(AttrValue::String(b.to_string())),
        (AttrKind::StringArray, AttrValue::String(s)) => Ok(AttrValue::StringArray(vec![s])),
        // An empty JSON array carries no element type.
        (AttrKind::Documents, AttrValue::StringArray(v)) if v.is_empty() => Ok(AttrValue::documents(Vec::new())),
        (AttrKind::Clusters, AttrValue::StringArray(v)) if v.is_empty() => Ok(AttrValue::clusters(Vec::new())),
        (kind, other) => Err(format!(
            "expected {}, got {}",
            kind,
            other.kind().map(|k| k.to_string()).unwrap_or_default()
        )),
    }
}
