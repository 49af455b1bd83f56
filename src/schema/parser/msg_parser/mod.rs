// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! MSG format parser using Pest.
//!
//! Parses ROS1 `.msg` definitions as they are stored in bag connection
//! records:
//! - a root field list
//! - dependency blocks introduced by a `===` line and a `MSG: pkg/Type` header
//! - array types `T[]` (dynamic) and `T[N]` (fixed)
//! - constants `T NAME=value`, kept in the AST but not part of the wire layout
//! - `#` comments

use crate::core::{BridgeError, Result};
use crate::schema::ast::{Constant, Field, FieldType, MessageSchema, MessageType, PrimitiveType};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

/// Pest parser for ROS .msg schema files.
#[derive(Parser)]
#[grammar = "schema/parser/msg_parser/msg.pest"] // Path relative to src/ directory
pub struct MsgParser;

/// Parse a ROS1 message definition into a schema rooted at `name`.
pub fn parse(name: &str, definition: &str) -> Result<MessageSchema> {
    let mut pairs = MsgParser::parse(Rule::schema, definition)
        .map_err(|e| BridgeError::parse(format!("msg schema '{name}'"), format!("{e}")))?;

    let mut schema = MessageSchema::new(name.to_string());
    let Some(root) = pairs.next() else {
        return Ok(schema);
    };

    for item in root.into_inner() {
        match item.as_rule() {
            Rule::body => {
                let mut msg_type = MessageType::new(name.to_string());
                fill_body(&mut msg_type, item)?;
                schema.add_type(msg_type);
            }
            Rule::dependency => {
                let mut inner = item.into_inner();
                let type_name = inner
                    .next()
                    .and_then(|header| header.into_inner().next())
                    .map(|t| t.as_str().to_string())
                    .ok_or_else(|| {
                        BridgeError::parse(format!("msg schema '{name}'"), "empty MSG: header")
                    })?;
                let mut msg_type = MessageType::new(type_name);
                if let Some(body) = inner.next() {
                    fill_body(&mut msg_type, body)?;
                }
                // The first definition of a dependency wins
                if !schema.types.contains_key(&msg_type.name) {
                    schema.add_type(msg_type);
                }
            }
            _ => {}
        }
    }

    Ok(schema)
}

fn fill_body(msg_type: &mut MessageType, body: Pair<Rule>) -> Result<()> {
    for def in body.into_inner() {
        match def.as_rule() {
            Rule::field => {
                let mut inner = def.into_inner();
                let (field_type, field_name) = type_and_name(&mut inner, &msg_type.name)?;
                msg_type.add_field(Field {
                    name: field_name,
                    type_name: field_type,
                });
            }
            Rule::constant => {
                let mut inner = def.into_inner();
                let (field_type, constant_name) = type_and_name(&mut inner, &msg_type.name)?;
                let raw = inner.next().map(|v| v.as_str()).unwrap_or_default();
                let value = if matches!(field_type, FieldType::Primitive(PrimitiveType::String)) {
                    raw.trim().to_string()
                } else {
                    // Non-string constants may carry a trailing comment
                    raw.split('#').next().unwrap_or_default().trim().to_string()
                };
                msg_type.constants.push(Constant {
                    name: constant_name,
                    type_name: field_type,
                    value,
                });
            }
            _ => {}
        }
    }
    Ok(())
}

fn type_and_name(
    inner: &mut pest::iterators::Pairs<Rule>,
    context: &str,
) -> Result<(FieldType, String)> {
    let malformed = || BridgeError::parse(format!("msg schema '{context}'"), "malformed field");
    let field_type = inner.next().ok_or_else(malformed)?;
    let field_name = inner.next().ok_or_else(malformed)?;
    Ok((build_field_type(field_type)?, field_name.as_str().to_string()))
}

/// Build a FieldType from a `field_type` pair.
fn build_field_type(pair: Pair<Rule>) -> Result<FieldType> {
    let text = pair.as_str().to_string();
    let mut inner = pair.into_inner();
    let base_type_str = inner.next().map(|p| p.as_str()).unwrap_or_default();

    let base = match PrimitiveType::try_from_str(base_type_str) {
        Some(prim) => FieldType::Primitive(prim),
        None => FieldType::Nested(base_type_str.to_string()),
    };

    let Some(suffix) = inner.next() else {
        return Ok(base);
    };
    let digits = suffix
        .into_inner()
        .next()
        .map(|p| p.as_str())
        .unwrap_or_default();
    let size = if digits.is_empty() {
        None
    } else {
        Some(
            digits
                .parse::<usize>()
                .map_err(|e| BridgeError::parse(format!("array size in '{text}'"), e.to_string()))?,
        )
    };

    Ok(FieldType::Array {
        base_type: Box::new(base),
        size,
    })
}
