//! Scalar conversion between typed property values and their wire form.

use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use xmlmap_core::ConversionError;

/// A property type with a canonical XML text representation.
///
/// `to_xml` returns `None` when the value is absent (an unset `Option`); such values
/// are not written at all. An optional property is `None` only when its attribute or
/// element is absent; present wire text, even empty, goes to the inner type.
pub trait XmlValue: Sized + 'static {
    /// The wire form of this value.
    fn to_xml(&self) -> Option<String>;

    /// Parse a value from its wire form.
    fn from_xml(wire: &str) -> Result<Self, ConversionError>;
}

impl XmlValue for String {
    fn to_xml(&self) -> Option<String> {
        Some(self.clone())
    }

    fn from_xml(wire: &str) -> Result<Self, ConversionError> {
        Ok(wire.to_owned())
    }
}

impl XmlValue for bool {
    fn to_xml(&self) -> Option<String> {
        Some(if *self { "true" } else { "false" }.to_owned())
    }

    fn from_xml(wire: &str) -> Result<Self, ConversionError> {
        match wire.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(ConversionError::new(
                other,
                "bool",
                "expected 'true', 'false', '1' or '0'",
            )),
        }
    }
}

impl XmlValue for char {
    fn to_xml(&self) -> Option<String> {
        Some(self.to_string())
    }

    fn from_xml(wire: &str) -> Result<Self, ConversionError> {
        let mut chars = wire.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ConversionError::new(
                wire,
                "char",
                "expected exactly one character",
            )),
        }
    }
}

macro_rules! impl_xml_value_for_int {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl XmlValue for $ty {
                fn to_xml(&self) -> Option<String> {
                    Some(self.to_string())
                }

                fn from_xml(wire: &str) -> Result<Self, ConversionError> {
                    wire.trim().parse::<$ty>().map_err(|e| {
                        ConversionError::new(wire, stringify!($ty), e.to_string())
                    })
                }
            }
        )+
    };
}

impl_xml_value_for_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! impl_xml_value_for_float {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl XmlValue for $ty {
                fn to_xml(&self) -> Option<String> {
                    Some(if self.is_nan() {
                        "NaN".to_owned()
                    } else if self.is_infinite() {
                        if self.is_sign_positive() { "INF" } else { "-INF" }.to_owned()
                    } else {
                        self.to_string()
                    })
                }

                fn from_xml(wire: &str) -> Result<Self, ConversionError> {
                    match wire.trim() {
                        "INF" => Ok(<$ty>::INFINITY),
                        "-INF" => Ok(<$ty>::NEG_INFINITY),
                        "NaN" => Ok(<$ty>::NAN),
                        other => other.parse::<$ty>().map_err(|e| {
                            ConversionError::new(wire, stringify!($ty), e.to_string())
                        }),
                    }
                }
            }
        )+
    };
}

impl_xml_value_for_float!(f32, f64);

impl XmlValue for DateTime<Utc> {
    fn to_xml(&self) -> Option<String> {
        Some(self.format("%Y-%m-%dT%H:%M:%S%.fZ").to_string())
    }

    fn from_xml(wire: &str) -> Result<Self, ConversionError> {
        let trimmed = wire.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| ConversionError::new(wire, "DateTime<Utc>", e.to_string()))
    }
}

impl XmlValue for NaiveDate {
    fn to_xml(&self) -> Option<String> {
        Some(self.format("%Y-%m-%d").to_string())
    }

    fn from_xml(wire: &str) -> Result<Self, ConversionError> {
        NaiveDate::parse_from_str(wire.trim(), "%Y-%m-%d")
            .map_err(|e| ConversionError::new(wire, "NaiveDate", e.to_string()))
    }
}

impl XmlValue for TimeDelta {
    fn to_xml(&self) -> Option<String> {
        Some(format_duration(*self))
    }

    fn from_xml(wire: &str) -> Result<Self, ConversionError> {
        parse_duration(wire)
    }
}

impl<T: XmlValue> XmlValue for Option<T> {
    fn to_xml(&self) -> Option<String> {
        self.as_ref().and_then(T::to_xml)
    }

    fn from_xml(wire: &str) -> Result<Self, ConversionError> {
        T::from_xml(wire).map(Some)
    }
}

/// Format a duration as `[-][d.]hh:mm:ss[.fffffffff]`.
fn format_duration(delta: TimeDelta) -> String {
    let negative = delta < TimeDelta::zero();
    let magnitude = delta.abs();
    let total = magnitude.num_seconds();
    let nanos = magnitude.subsec_nanos();

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    let days = total / 86_400;
    if days > 0 {
        let _ = write!(out, "{days}.");
    }
    let _ = write!(
        out,
        "{:02}:{:02}:{:02}",
        (total % 86_400) / 3_600,
        (total % 3_600) / 60,
        total % 60
    );
    if nanos > 0 {
        let fraction = format!("{nanos:09}");
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out
}

fn parse_duration(wire: &str) -> Result<TimeDelta, ConversionError> {
    let invalid = |reason: &str| ConversionError::new(wire, "TimeDelta", reason);

    let trimmed = wire.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let mut parts = body.splitn(3, ':');
    let (Some(head), Some(minutes), Some(seconds)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid("expected [-][d.]hh:mm:ss[.fraction]"));
    };

    let number = |text: &str| -> Result<i64, ConversionError> {
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected decimal digits"));
        }
        text.parse::<i64>().map_err(|e| invalid(&e.to_string()))
    };

    let (days, hours) = match head.split_once('.') {
        Some((d, h)) => (number(d)?, number(h)?),
        None => (0, number(head)?),
    };
    let (whole_seconds, fraction) = seconds.split_once('.').unwrap_or((seconds, ""));
    let minutes = number(minutes)?;
    let whole_seconds = number(whole_seconds)?;
    if hours > 23 || minutes > 59 || whole_seconds > 59 {
        return Err(invalid("component out of range"));
    }

    let nanos = if fraction.is_empty() {
        0
    } else {
        if fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("fraction must be at most nine digits"));
        }
        format!("{fraction:0<9}")
            .parse::<u32>()
            .map_err(|e| invalid(&e.to_string()))?
    };

    let total = days
        .checked_mul(86_400)
        .and_then(|s| s.checked_add(hours * 3_600 + minutes * 60 + whole_seconds))
        .ok_or_else(|| invalid("duration out of range"))?;
    let delta = TimeDelta::new(total, nanos).ok_or_else(|| invalid("duration out of range"))?;
    Ok(if negative { -delta } else { delta })
}

type Deserialize<P> = dyn Fn(&str) -> Result<P, ConversionError> + Send + Sync;
type Serialize<P> = dyn Fn(&P) -> Option<String> + Send + Sync;

/// A pair of conversion functions for one property.
///
/// The standard converter defers to [`XmlValue`]; a custom converter can give a
/// property any wire representation.
pub struct Converter<P> {
    deserialize: Arc<Deserialize<P>>,
    serialize: Arc<Serialize<P>>,
}

impl<P: XmlValue> Converter<P> {
    /// The [`XmlValue`] conversion of `P`.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(P::from_xml, P::to_xml)
    }
}

impl<P> Converter<P> {
    /// Create a converter from a parse function and a format function.
    #[must_use]
    pub fn new(
        deserialize: impl Fn(&str) -> Result<P, ConversionError> + Send + Sync + 'static,
        serialize: impl Fn(&P) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            deserialize: Arc::new(deserialize),
            serialize: Arc::new(serialize),
        }
    }

    /// Convert a wire value to the property type.
    pub fn deserialize(&self, wire: &str) -> Result<P, ConversionError> {
        (self.deserialize)(wire)
    }

    /// Convert a property value to its wire form; `None` means "omit".
    pub fn serialize(&self, value: &P) -> Option<String> {
        (self.serialize)(value)
    }
}

impl<P> Clone for Converter<P> {
    fn clone(&self) -> Self {
        Self {
            deserialize: Arc::clone(&self.deserialize),
            serialize: Arc::clone(&self.serialize),
        }
    }
}

impl<P> fmt::Debug for Converter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("property", &std::any::type_name::<P>())
            .finish_non_exhaustive()
    }
}

/// Declare a fieldless enum whose wire form is the variant's symbolic name.
///
/// The generated type derives `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq` and `Hash`,
/// and implements [`XmlValue`](crate::XmlValue) and `Display`.
///
/// # Examples
///
/// ```
/// use xmlmap_schema::{XmlValue, xml_enum};
///
/// xml_enum! {
///     pub enum ContactMethodType {
///         HomePhone,
///         Email,
///     }
/// }
///
/// assert_eq!(ContactMethodType::Email.to_xml().as_deref(), Some("Email"));
/// assert_eq!(
///     ContactMethodType::from_xml("HomePhone").ok(),
///     Some(ContactMethodType::HomePhone)
/// );
/// ```
#[macro_export]
macro_rules! xml_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// The symbolic name of this variant.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::XmlValue for $name {
            fn to_xml(&self) -> Option<String> {
                Some(self.as_str().to_owned())
            }

            fn from_xml(wire: &str) -> Result<Self, $crate::ConversionError> {
                match wire.trim() {
                    $(stringify!($variant) => Ok(Self::$variant),)+
                    other => Err($crate::ConversionError::new(
                        other,
                        stringify!($name),
                        "unknown enumeration symbol",
                    )),
                }
            }
        }
    };
}
