//! Numeric field handlers (`int`, `float`).

use super::attrs::{AttrReader, check_bounds, reject_children, set_opt, write_common};
use crate::handler::FieldHandler;
use crate::registry::FieldRegistry;
use std::fmt::Display;
use std::str::FromStr;
use supermodel_core::{Field, FieldKind, ParseError, SerializeError, XmlNode};

/// Handler for signed integer fields with optional bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntHandler;

/// Handler for floating point fields with optional bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatHandler;

/// Reads `min`, `max` and checks `default` against them.
fn read_bounded<T, F>(node: &XmlNode, kind: F) -> Result<Field, ParseError>
where
    T: FromStr + PartialOrd + Display + Copy,
    F: FnOnce(Option<T>, Option<T>) -> FieldKind,
{
    reject_children(node, &[])?;
    let mut attrs = AttrReader::new(node);
    let element = attrs.element().to_string();
    let min: Option<T> = attrs.parse("min")?;
    let max: Option<T> = attrs.parse("max")?;
    check_bounds(&element, min, max)?;

    let field = attrs.into_field(kind(min, max))?;

    if let Some(raw) = &field.default {
        let value: T = raw
            .trim()
            .parse()
            .map_err(|_| ParseError::invalid_attr(element.clone(), "default", raw))?;
        if min.is_some_and(|min| value < min) || max.is_some_and(|max| value > max) {
            return Err(ParseError::malformed(
                element,
                format!("default {value} is outside the bounds"),
            ));
        }
    }

    Ok(field)
}

impl FieldHandler for IntHandler {
    fn read(&self, node: &XmlNode, _registry: &FieldRegistry) -> Result<Field, ParseError> {
        read_bounded::<i64, _>(node, |min, max| FieldKind::Int { min, max })
    }

    fn write(&self, field: &Field, _registry: &FieldRegistry) -> Result<XmlNode, SerializeError> {
        let FieldKind::Int { min, max } = &field.kind else {
            return Err(SerializeError::kind_mismatch(&field.type_tag, &field.name));
        };

        let mut node = write_common(field);
        set_opt(&mut node, "min", min.as_ref());
        set_opt(&mut node, "max", max.as_ref());
        Ok(node)
    }
}

impl FieldHandler for FloatHandler {
    fn read(&self, node: &XmlNode, _registry: &FieldRegistry) -> Result<Field, ParseError> {
        let field = read_bounded::<f64, _>(node, |min, max| FieldKind::Float { min, max })?;
        if let FieldKind::Float { min, max } = &field.kind {
            if min.is_some_and(|v| !v.is_finite()) || max.is_some_and(|v| !v.is_finite()) {
                return Err(ParseError::malformed(
                    AttrReader::new(node).element(),
                    "bounds must be finite numbers",
                ));
            }
        }
        Ok(field)
    }

    fn write(&self, field: &Field, _registry: &FieldRegistry) -> Result<XmlNode, SerializeError> {
        let FieldKind::Float { min, max } = &field.kind else {
            return Err(SerializeError::kind_mismatch(&field.type_tag, &field.name));
        };

        let mut node = write_common(field);
        set_opt(&mut node, "min", min.as_ref());
        set_opt(&mut node, "max", max.as_ref());
        Ok(node)
    }
}
