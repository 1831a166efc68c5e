use serde_json::{Map, Number, Value};

/// Renders a raw value as a single terminal string.
///
/// Returning `None` means the value has structure and should be expanded.
pub trait PropertyFormatter {
    fn format(&self, value: &Value) -> Option<String>;
}

impl<F> PropertyFormatter for F
where
    F: Fn(&Value) -> Option<String>,
{
    fn format(&self, value: &Value) -> Option<String> {
        self(value)
    }
}

/// Formats common geometry shapes and empty collections inline
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatter;

impl PropertyFormatter for DefaultFormatter {
    fn format(&self, value: &Value) -> Option<String> {
        match value {
            Value::Array(items) if items.is_empty() => Some("[]".to_string()),
            Value::Object(map) if map.is_empty() => Some("{}".to_string()),
            Value::Object(map) => format_shape(map),
            _ => None,
        }
    }
}

fn format_shape(map: &Map<String, Value>) -> Option<String> {
    if let Some([left, top, right, bottom]) = numbers(map, ["left", "top", "right", "bottom"]) {
        return Some(format!("({}, {}) - ({}, {})", left, top, right, bottom));
    }
    if let Some([r, g, b, a]) = numbers(map, ["r", "g", "b", "a"]) {
        return Some(format!("(r: {}, g: {}, b: {}, a: {})", r, g, b, a));
    }
    if let Some([w, h]) = numbers(map, ["width", "height"]).or_else(|| numbers(map, ["w", "h"])) {
        return Some(format!("{} x {}", w, h));
    }
    if let Some([x, y]) = numbers(map, ["x", "y"]) {
        return Some(format!("({}, {})", x, y));
    }
    None
}

/// All `keys` present as numbers, and nothing else in the object
fn numbers<const N: usize>(map: &Map<String, Value>, keys: [&str; N]) -> Option<[String; N]> {
    if map.len() != N {
        return None;
    }
    let mut out: [String; N] = std::array::from_fn(|_| String::new());
    for (slot, key) in out.iter_mut().zip(keys) {
        match map.get(key)? {
            Value::Number(n) => *slot = format_number(n),
            _ => return None,
        }
    }
    Some(out)
}

/// Integral floats print without a fractional part (`1.0` -> `1`)
pub fn format_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}
