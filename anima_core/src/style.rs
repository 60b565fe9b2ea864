// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style resolution: from animatable properties to concrete CSS.
//!
//! A [`Properties`] map names *what* should change (`left`, `opacity`,
//! `scale`, ...). [`resolve`] turns it into a [`ResolvedStyle`]: the ordered
//! list of concrete CSS keys a transition has to cover and the value string
//! for each key.
//!
//! # Value rules
//!
//! - **Lengths** (`top`, `bottom`, `left`, `right`, `width`, `height`):
//!   numbers become pixels; strings ending in `px`, `em` or `pt` pass
//!   through; `"+=N"` / `"-=N"` are relative to the element's current value;
//!   any other string contributes its leading number as pixels.
//! - **Opacity**: parsed as a number and clamped to `0..=1`.
//! - **Scale**: composed into the single `transform` key as `scale(..)`.
//!
//! Values that cannot be read as a number are skipped, as are property names
//! the resolver does not know ([`Properties::set_named`]).

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::capability::Capabilities;
use crate::error::ParseError;

/// An animatable property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    /// `top`
    Top,
    /// `bottom`
    Bottom,
    /// `left`
    Left,
    /// `right`
    Right,
    /// `width`
    Width,
    /// `height`
    Height,
    /// `opacity`
    Opacity,
    /// Uniform or per-axis scale, rendered through `transform`.
    Scale,
}

impl Property {
    /// The property's name, which is also its CSS key for non-transform
    /// properties.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
            Self::Width => "width",
            Self::Height => "height",
            Self::Opacity => "opacity",
            Self::Scale => "scale",
        }
    }

    /// Whether this property is written through the `transform` key.
    #[must_use]
    pub const fn is_transform(self) -> bool {
        matches!(self, Self::Scale)
    }
}

impl FromStr for Property {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            "left" => Self::Left,
            "right" => Self::Right,
            "width" => Self::Width,
            "height" => Self::Height,
            "opacity" => Self::Opacity,
            "scale" => Self::Scale,
            _ => return Err(ParseError::UnsupportedProperty(s.to_string())),
        })
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A raw target value, before unit normalization.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A bare number; the unit is implied by the property.
    Number(f64),
    /// A CSS string such as `"2em"` or a relative `"+=20"`.
    Text(String),
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// An ordered property → value map.
///
/// Setting a property twice keeps its first position and the last value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Properties {
    entries: Vec<(Property, Value)>,
}

impl Properties {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `property` to `value`.
    #[must_use]
    pub fn set(mut self, property: Property, value: impl Into<Value>) -> Self {
        self.insert(property, value.into());
        self
    }

    /// Sets a property by name. Unknown names are ignored so that callers can
    /// pass property sets written for newer versions.
    #[must_use]
    pub fn set_named(self, name: &str, value: impl Into<Value>) -> Self {
        match name.parse() {
            Ok(property) => self.set(property, value),
            Err(_) => self,
        }
    }

    /// Sets `top`.
    #[must_use]
    pub fn top(self, value: impl Into<Value>) -> Self {
        self.set(Property::Top, value)
    }

    /// Sets `bottom`.
    #[must_use]
    pub fn bottom(self, value: impl Into<Value>) -> Self {
        self.set(Property::Bottom, value)
    }

    /// Sets `left`.
    #[must_use]
    pub fn left(self, value: impl Into<Value>) -> Self {
        self.set(Property::Left, value)
    }

    /// Sets `right`.
    #[must_use]
    pub fn right(self, value: impl Into<Value>) -> Self {
        self.set(Property::Right, value)
    }

    /// Sets `width`.
    #[must_use]
    pub fn width(self, value: impl Into<Value>) -> Self {
        self.set(Property::Width, value)
    }

    /// Sets `height`.
    #[must_use]
    pub fn height(self, value: impl Into<Value>) -> Self {
        self.set(Property::Height, value)
    }

    /// Sets `opacity`.
    #[must_use]
    pub fn opacity(self, value: impl Into<Value>) -> Self {
        self.set(Property::Opacity, value)
    }

    /// Sets the scale factor.
    #[must_use]
    pub fn scale(self, value: impl Into<Value>) -> Self {
        self.set(Property::Scale, value)
    }

    /// Returns the value set for `property`, if any.
    #[must_use]
    pub fn get(&self, property: Property) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Property, &Value)> {
        self.entries.iter().map(|(p, v)| (*p, v))
    }

    /// Number of properties set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, property: Property, value: Value) {
        match self.entries.iter_mut().find(|(p, _)| *p == property) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((property, value)),
        }
    }
}

/// Concrete CSS produced by [`resolve`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedStyle {
    /// `(css key, value)` pairs in first-touched order. Transform-like
    /// properties share one key.
    pub values: Vec<(String, String)>,
}

impl ResolvedStyle {
    /// The concrete CSS keys, in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(k, _)| k.as_str())
    }

    /// The keys joined for a `transition-property` value.
    #[must_use]
    pub fn transition_property(&self) -> String {
        let mut out = String::new();
        for (i, key) in self.keys().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(key);
        }
        out
    }

    /// Returns the value for a CSS key, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if no key was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Lists the concrete CSS keys `properties` touches, without computing
/// values.
#[must_use]
pub fn keys(properties: &Properties, caps: &Capabilities) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for (property, _) in properties.iter() {
        let key = css_key(property, caps);
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

/// Resolves `properties` into concrete CSS.
///
/// `current` returns the element's present value for a CSS key and is only
/// consulted for relative (`"+=N"`) lengths.
pub fn resolve(
    properties: &Properties,
    caps: &Capabilities,
    current: impl Fn(&str) -> Option<String>,
) -> ResolvedStyle {
    let mut values: Vec<(String, String)> = Vec::new();
    let mut transform_slot: Option<usize> = None;
    let mut transform_parts: Vec<String> = Vec::new();

    for (property, value) in properties.iter() {
        if property.is_transform() {
            let Some(part) = transform_value(property, value) else {
                continue;
            };
            transform_parts.push(part);
            if transform_slot.is_none() {
                transform_slot = Some(values.len());
                values.push((caps.transform(), String::new()));
            }
            continue;
        }
        let resolved = match property {
            Property::Opacity => opacity_value(value),
            _ => length_value(property, value, &current),
        };
        if let Some(resolved) = resolved {
            values.push((property.name().to_string(), resolved));
        }
    }

    if let Some(slot) = transform_slot {
        values[slot].1 = transform_parts.join(" ");
    }
    ResolvedStyle { values }
}

fn css_key(property: Property, caps: &Capabilities) -> String {
    if property.is_transform() {
        caps.transform()
    } else {
        property.name().to_string()
    }
}

fn length_value(
    property: Property,
    value: &Value,
    current: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    let text = match value {
        Value::Number(n) => return px(*n),
        Value::Text(text) => text.trim(),
    };

    if let Some((sign, rest)) = relative_parts(text) {
        let base = current(property.name())
            .and_then(|v| leading_number(&v))
            .unwrap_or(0.0);
        let delta = leading_number(rest).unwrap_or(0.0);
        return px(base + sign * delta);
    }

    if ["px", "em", "pt"].iter().any(|unit| text.ends_with(unit)) {
        return Some(text.to_string());
    }
    leading_number(text).and_then(px)
}

/// Formats a length in pixels. Non-finite numbers have no CSS form.
fn px(n: f64) -> Option<String> {
    n.is_finite().then(|| format!("{n}px"))
}

fn opacity_value(value: &Value) -> Option<String> {
    let opacity = match value {
        Value::Number(n) => *n,
        Value::Text(text) => leading_number(text)?,
    };
    if opacity.is_nan() {
        return None;
    }
    Some(format!("{}", opacity.clamp(0.0, 1.0)))
}

fn transform_value(property: Property, value: &Value) -> Option<String> {
    let args = match value {
        Value::Number(n) if n.is_finite() => format!("{n}"),
        Value::Number(_) => return None,
        Value::Text(text) if !text.trim().is_empty() => text.trim().to_string(),
        Value::Text(_) => return None,
    };
    Some(format!("{}({args})", property.name()))
}

/// Splits `"+=20"` into `(1.0, "20")` and `"-=5"` into `(-1.0, "5")`.
fn relative_parts(text: &str) -> Option<(f64, &str)> {
    if let Some(rest) = text.strip_prefix("+=") {
        Some((1.0, rest))
    } else {
        text.strip_prefix("-=").map(|rest| (-1.0, rest))
    }
}

/// Reads the longest numeric prefix of `text`, e.g. `12.5` from `"12.5px"`.
fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return None;
    }
    text[..end].trim_end_matches('.').parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::VendorPrefix;

    fn no_current(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn numbers_become_pixels() {
        let props = Properties::new().left(100).top(12.5);
        let style = resolve(&props, &Capabilities::STANDARD, no_current);
        assert_eq!(style.get("left"), Some("100px"));
        assert_eq!(style.get("top"), Some("12.5px"));
        assert_eq!(style.transition_property(), "left, top");
    }

    #[test]
    fn explicit_units_pass_through() {
        let props = Properties::new().width("2em").height("10pt").left("30px");
        let style = resolve(&props, &Capabilities::STANDARD, no_current);
        assert_eq!(style.get("width"), Some("2em"));
        assert_eq!(style.get("height"), Some("10pt"));
        assert_eq!(style.get("left"), Some("30px"));
    }

    #[test]
    fn unitless_strings_use_leading_number() {
        let props = Properties::new().left("40").right("7.5%");
        let style = resolve(&props, &Capabilities::STANDARD, no_current);
        assert_eq!(style.get("left"), Some("40px"));
        assert_eq!(style.get("right"), Some("7.5px"));
    }

    #[test]
    fn relative_values_use_current() {
        let props = Properties::new().left("+=20").top("-=5");
        let style = resolve(&props, &Capabilities::STANDARD, |key| match key {
            "left" => Some("100px".into()),
            "top" => Some("10px".into()),
            _ => None,
        });
        assert_eq!(style.get("left"), Some("120px"));
        assert_eq!(style.get("top"), Some("5px"));
    }

    #[test]
    fn relative_without_current_starts_at_zero() {
        let props = Properties::new().left("+=20");
        let style = resolve(&props, &Capabilities::STANDARD, |_| Some("auto".into()));
        assert_eq!(style.get("left"), Some("20px"));
    }

    #[test]
    fn opacity_is_clamped() {
        let high = resolve(
            &Properties::new().opacity(3),
            &Capabilities::STANDARD,
            no_current,
        );
        assert_eq!(high.get("opacity"), Some("1"));
        let low = resolve(
            &Properties::new().opacity("-0.5"),
            &Capabilities::STANDARD,
            no_current,
        );
        assert_eq!(low.get("opacity"), Some("0"));
        let mid = resolve(
            &Properties::new().opacity(0.5),
            &Capabilities::STANDARD,
            no_current,
        );
        assert_eq!(mid.get("opacity"), Some("0.5"));
    }

    #[test]
    fn scale_goes_through_prefixed_transform() {
        let caps = Capabilities::prefixed(VendorPrefix::Webkit);
        let props = Properties::new().scale(1.5).opacity(0.2);
        let style = resolve(&props, &caps, no_current);
        assert_eq!(style.get("-webkit-transform"), Some("scale(1.5)"));
        assert_eq!(style.transition_property(), "-webkit-transform, opacity");
        assert_eq!(keys(&props, &caps), ["-webkit-transform", "opacity"]);
    }

    #[test]
    fn unknown_names_and_garbage_values_are_skipped() {
        let props = Properties::new()
            .set_named("color", "red")
            .set_named("left", "wide")
            .set_named("opacity", 0.3);
        assert_eq!(props.len(), 2);
        let style = resolve(&props, &Capabilities::STANDARD, no_current);
        assert_eq!(style.get("left"), None);
        assert_eq!(style.get("opacity"), Some("0.3"));
    }

    #[test]
    fn non_finite_numbers_are_skipped() {
        let props = Properties::new()
            .left(f64::NAN)
            .width(f64::INFINITY)
            .scale(f64::NAN)
            .top(4);
        let style = resolve(&props, &Capabilities::STANDARD, no_current);
        assert_eq!(style.get("left"), None);
        assert_eq!(style.get("width"), None);
        assert_eq!(style.get("transform"), None);
        assert_eq!(style.get("top"), Some("4px"));
    }

    #[test]
    fn setting_twice_keeps_position_and_last_value() {
        let props = Properties::new().left(1).top(2).left(3);
        let entries: Vec<_> = props.iter().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], (Property::Left, &Value::Number(3.0)));
    }

    #[test]
    fn leading_number_reads_prefixes() {
        assert_eq!(leading_number("12px"), Some(12.0));
        assert_eq!(leading_number("-3.5em"), Some(-3.5));
        assert_eq!(leading_number("5."), Some(5.0));
        assert_eq!(leading_number("auto"), None);
        assert_eq!(leading_number("-"), None);
    }

    #[test]
    fn property_names_parse() {
        assert_eq!("scale".parse::<Property>(), Ok(Property::Scale));
        assert!(matches!(
            "color".parse::<Property>(),
            Err(ParseError::UnsupportedProperty(_))
        ));
    }
}
