//! Conversions between wire values and native member types.
//!
//! Wire values are `serde_json::Value`. Each native type that can live
//! behind a property implements [`FromWire`] and [`ToWire`] explicitly; no
//! conversion is ever inferred from type layout.
//!
//! # Conversion Table
//!
//! | Native | Accepted wire forms |
//! |--------|---------------------|
//! | `bool` | `true` / `false` |
//! | integers | integral number (`3`, `3.0`) in range |
//! | `f32` / `f64` | number |
//! | `String` | string |
//! | `Vec<T>` | array of `T` |
//! | `Option<T>` | `null` or `T` |
//! | [`Vec3`] | `{x,y,z}` or `[x,y,z]` |
//! | [`Quat`] | `{x,y,z,w}`, `[x,y,z,w]`, or Euler `{pitch,yaw,roll}` (degrees) |
//! | [`Color`] | `{r,g,b,a?}`, `"#RRGGBB"`, `"#RRGGBBAA"`, `[r,g,b,a?]`, named |
//!
//! Strings are never parsed as numbers and numbers are never stringified.

use crate::AccessError;
use scenebridge_event::value_kind;
use serde_json::{json, Map, Number, Value};
use std::ops::{Add, Mul, Neg, Sub};

/// Converts a wire value into a native type.
pub trait FromWire: Sized {
    /// Wire kind named in conversion errors.
    const EXPECTED: &'static str;

    /// Returns `None` when the wire value has the wrong kind or shape.
    fn from_wire(value: &Value) -> Option<Self>;
}

/// Converts a native value into its wire form.
pub trait ToWire {
    fn to_wire(&self) -> Value;
}

/// Converts `value` for the member `field`.
///
/// # Errors
///
/// [`AccessError::Conversion`] naming `field`, the expected kind and the
/// actual wire kind.
pub fn convert<T: FromWire>(field: &str, value: &Value) -> Result<T, AccessError> {
    T::from_wire(value).ok_or_else(|| AccessError::conversion(field, T::EXPECTED, value_kind(value)))
}

/// Emits a number, using an integer when the value is integral.
///
/// `1.0` becomes `1`; non-finite values become `null`.
#[must_use]
pub fn number(x: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if x.is_finite() && x.fract() == 0.0 && x.abs() < MAX_EXACT {
        // Normalizes -0.0 to 0.
        Value::from(x as i64)
    } else {
        Number::from_f64(x).map_or(Value::Null, Value::Number)
    }
}

// ── Primitives ──────────────────────────────────────────────────────

impl FromWire for bool {
    const EXPECTED: &'static str = "bool";

    fn from_wire(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl ToWire for bool {
    fn to_wire(&self) -> Value {
        Value::Bool(*self)
    }
}

fn integral(value: &Value) -> Option<i128> {
    if let Some(i) = value.as_i64() {
        return Some(i128::from(i));
    }
    if let Some(u) = value.as_u64() {
        return Some(i128::from(u));
    }
    let f = value.as_f64()?;
    (f.is_finite() && f.fract() == 0.0).then_some(f as i128)
}

macro_rules! wire_integer {
    ($($ty:ty),*) => {
        $(
            impl FromWire for $ty {
                const EXPECTED: &'static str = "integer";

                fn from_wire(value: &Value) -> Option<Self> {
                    integral(value).and_then(|i| <$ty>::try_from(i).ok())
                }
            }

            impl ToWire for $ty {
                fn to_wire(&self) -> Value {
                    Value::from(*self)
                }
            }
        )*
    };
}

wire_integer!(i32, i64, u32, u64, usize);

impl FromWire for f64 {
    const EXPECTED: &'static str = "number";

    fn from_wire(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl ToWire for f64 {
    fn to_wire(&self) -> Value {
        number(*self)
    }
}

impl FromWire for f32 {
    const EXPECTED: &'static str = "number";

    fn from_wire(value: &Value) -> Option<Self> {
        value.as_f64().map(|f| f as f32)
    }
}

impl ToWire for f32 {
    fn to_wire(&self) -> Value {
        number(f64::from(*self))
    }
}

impl FromWire for String {
    const EXPECTED: &'static str = "string";

    fn from_wire(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl ToWire for String {
    fn to_wire(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToWire for str {
    fn to_wire(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl<T: FromWire> FromWire for Vec<T> {
    const EXPECTED: &'static str = "array";

    fn from_wire(value: &Value) -> Option<Self> {
        value.as_array()?.iter().map(T::from_wire).collect()
    }
}

impl<T: ToWire> ToWire for Vec<T> {
    fn to_wire(&self) -> Value {
        Value::Array(self.iter().map(ToWire::to_wire).collect())
    }
}

impl<T: FromWire> FromWire for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_wire(value: &Value) -> Option<Self> {
        if value.is_null() {
            Some(None)
        } else {
            T::from_wire(value).map(Some)
        }
    }
}

impl<T: ToWire> ToWire for Option<T> {
    fn to_wire(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToWire::to_wire)
    }
}

impl FromWire for Map<String, Value> {
    const EXPECTED: &'static str = "object";

    fn from_wire(value: &Value) -> Option<Self> {
        value.as_object().cloned()
    }
}

impl ToWire for Map<String, Value> {
    fn to_wire(&self) -> Value {
        Value::Object(self.clone())
    }
}

impl FromWire for Value {
    const EXPECTED: &'static str = "any";

    fn from_wire(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl ToWire for Value {
    fn to_wire(&self) -> Value {
        self.clone()
    }
}

fn field_f64(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(Value::as_f64)
}

fn numbers<const N: usize>(items: &[Value]) -> Option<[f64; N]> {
    if items.len() != N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item.as_f64()?;
    }
    Some(out)
}

// ── Vec3 ────────────────────────────────────────────────────────────

/// A 3-component vector (position, scale, Euler angles).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const ONE: Vec3 = Vec3::new(1.0, 1.0, 1.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Component-wise product.
    #[must_use]
    pub fn scale(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }

    /// Component-wise quotient. Zero divisors yield zero.
    #[must_use]
    pub fn unscale(self, other: Vec3) -> Vec3 {
        let div = |a: f64, b: f64| if b == 0.0 { 0.0 } else { a / b };
        Vec3::new(div(self.x, other.x), div(self.y, other.y), div(self.z, other.z))
    }

    /// Linear interpolation, `t` in `[0, 1]`.
    #[must_use]
    pub fn lerp(self, to: Vec3, t: f64) -> Vec3 {
        self + (to - self) * t
    }

    #[must_use]
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl FromWire for Vec3 {
    const EXPECTED: &'static str = "vector {x,y,z} or [x,y,z]";

    fn from_wire(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Vec3::new(
                field_f64(map, "x")?,
                field_f64(map, "y")?,
                field_f64(map, "z")?,
            )),
            Value::Array(items) => numbers::<3>(items).map(|[x, y, z]| Vec3::new(x, y, z)),
            _ => None,
        }
    }
}

impl ToWire for Vec3 {
    fn to_wire(&self) -> Value {
        json!({ "x": number(self.x), "y": number(self.y), "z": number(self.z) })
    }
}

// ── Quat ────────────────────────────────────────────────────────────

/// A unit quaternion rotation.
///
/// Euler angles are degrees applied yaw (Y), then pitch (X), then roll (Z),
/// i.e. `q = yaw * pitch * roll`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Quat = Quat::new(0.0, 0.0, 0.0, 1.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `degrees` around a unit `axis`.
    #[must_use]
    pub fn from_axis_angle(axis: Vec3, degrees: f64) -> Quat {
        let half = degrees.to_radians() / 2.0;
        let s = half.sin();
        Quat::new(axis.x * s, axis.y * s, axis.z * s, half.cos())
    }

    /// Builds a rotation from Euler angles in degrees.
    #[must_use]
    pub fn from_euler(pitch: f64, yaw: f64, roll: f64) -> Quat {
        let qy = Quat::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), yaw);
        let qx = Quat::from_axis_angle(Vec3::new(1.0, 0.0, 0.0), pitch);
        let qz = Quat::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), roll);
        qy * qx * qz
    }

    /// Returns `(pitch, yaw, roll)` in degrees.
    #[must_use]
    pub fn to_euler(self) -> Vec3 {
        let Quat { x, y, z, w } = self.normalized();
        let m12 = 2.0 * (y * z - w * x);
        let m10 = 2.0 * (x * y + w * z);
        let m11 = 1.0 - 2.0 * (x * x + z * z);
        let m02 = 2.0 * (x * z + w * y);
        let m22 = 1.0 - 2.0 * (x * x + y * y);
        let pitch = (-m12).clamp(-1.0, 1.0).asin();
        let yaw = m02.atan2(m22);
        let roll = m10.atan2(m11);
        Vec3::new(pitch.to_degrees(), yaw.to_degrees(), roll.to_degrees())
    }

    #[must_use]
    pub fn normalized(self) -> Quat {
        let len = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if len == 0.0 {
            Quat::IDENTITY
        } else {
            Quat::new(self.x / len, self.y / len, self.z / len, self.w / len)
        }
    }

    /// Inverse of a unit quaternion.
    #[must_use]
    pub fn inverse(self) -> Quat {
        Quat::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Rotates a vector.
    #[must_use]
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let p = Quat::new(v.x, v.y, v.z, 0.0);
        let r = self * p * self.inverse();
        Vec3::new(r.x, r.y, r.z)
    }

    /// Normalized linear interpolation along the shorter arc.
    #[must_use]
    pub fn nlerp(self, to: Quat, t: f64) -> Quat {
        let dot = self.x * to.x + self.y * to.y + self.z * to.z + self.w * to.w;
        let to = if dot < 0.0 {
            Quat::new(-to.x, -to.y, -to.z, -to.w)
        } else {
            to
        };
        Quat::new(
            self.x + (to.x - self.x) * t,
            self.y + (to.y - self.y) * t,
            self.z + (to.z - self.z) * t,
            self.w + (to.w - self.w) * t,
        )
        .normalized()
    }
}

impl Mul for Quat {
    type Output = Quat;

    fn mul(self, r: Quat) -> Quat {
        let l = self;
        Quat::new(
            l.w * r.x + l.x * r.w + l.y * r.z - l.z * r.y,
            l.w * r.y - l.x * r.z + l.y * r.w + l.z * r.x,
            l.w * r.z + l.x * r.y - l.y * r.x + l.z * r.w,
            l.w * r.w - l.x * r.x - l.y * r.y - l.z * r.z,
        )
    }
}

impl FromWire for Quat {
    const EXPECTED: &'static str = "rotation {x,y,z,w}, [x,y,z,w] or {pitch,yaw,roll}";

    fn from_wire(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) if map.contains_key("w") => Some(
                Quat::new(
                    field_f64(map, "x")?,
                    field_f64(map, "y")?,
                    field_f64(map, "z")?,
                    field_f64(map, "w")?,
                )
                .normalized(),
            ),
            Value::Object(map)
                if ["pitch", "yaw", "roll"].iter().any(|k| map.contains_key(*k)) =>
            {
                let angle = |key: &str| match map.get(key) {
                    None => Some(0.0),
                    Some(v) => v.as_f64(),
                };
                Some(Quat::from_euler(angle("pitch")?, angle("yaw")?, angle("roll")?))
            }
            Value::Array(items) => {
                numbers::<4>(items).map(|[x, y, z, w]| Quat::new(x, y, z, w).normalized())
            }
            _ => None,
        }
    }
}

impl ToWire for Quat {
    fn to_wire(&self) -> Value {
        json!({
            "x": number(self.x),
            "y": number(self.y),
            "z": number(self.z),
            "w": number(self.w),
        })
    }
}

// ── Color ───────────────────────────────────────────────────────────

/// An RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

const NAMED_COLORS: &[(&str, Color)] = &[
    ("red", Color::rgb(1.0, 0.0, 0.0)),
    ("green", Color::rgb(0.0, 1.0, 0.0)),
    ("blue", Color::rgb(0.0, 0.0, 1.0)),
    ("white", Color::WHITE),
    ("black", Color::rgb(0.0, 0.0, 0.0)),
    ("yellow", Color::rgb(1.0, 0.92, 0.016)),
    ("cyan", Color::rgb(0.0, 1.0, 1.0)),
    ("magenta", Color::rgb(1.0, 0.0, 1.0)),
    ("gray", Color::rgb(0.5, 0.5, 0.5)),
    ("grey", Color::rgb(0.5, 0.5, 0.5)),
    ("clear", Color::new(0.0, 0.0, 0.0, 0.0)),
];

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Looks up a named constant, case-insensitively.
    #[must_use]
    pub fn named(name: &str) -> Option<Color> {
        NAMED_COLORS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, c)| *c)
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA`.
    #[must_use]
    pub fn from_hex(text: &str) -> Option<Color> {
        let hex = text.strip_prefix('#')?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .ok()
                .map(|v| f64::from(v) / 255.0)
        };
        let a = if hex.len() == 8 { channel(6)? } else { 1.0 };
        Some(Color::new(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Formats as `#RRGGBBAA`.
    #[must_use]
    pub fn to_hex(self) -> String {
        let byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02X}{:02X}{:02X}{:02X}",
            byte(self.r),
            byte(self.g),
            byte(self.b),
            byte(self.a)
        )
    }
}

impl FromWire for Color {
    const EXPECTED: &'static str = "color {r,g,b,a}, hex string, [r,g,b,a] or name";

    fn from_wire(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => {
                let a = match map.get("a") {
                    None => 1.0,
                    Some(v) => v.as_f64()?,
                };
                Some(Color::new(
                    field_f64(map, "r")?,
                    field_f64(map, "g")?,
                    field_f64(map, "b")?,
                    a,
                ))
            }
            Value::String(s) if s.starts_with('#') => Color::from_hex(s),
            Value::String(s) => Color::named(s),
            Value::Array(items) => match items.len() {
                3 => numbers::<3>(items).map(|[r, g, b]| Color::rgb(r, g, b)),
                4 => numbers::<4>(items).map(|[r, g, b, a]| Color::new(r, g, b, a)),
                _ => None,
            },
            _ => None,
        }
    }
}

impl ToWire for Color {
    fn to_wire(&self) -> Value {
        json!({
            "r": number(self.r),
            "g": number(self.g),
            "b": number(self.b),
            "a": number(self.a),
        })
    }
}
