//! Type rules and constant folding
//!
//! This module holds the pure parts of type checking: nothing here touches a
//! symbol table.
//!
//! # Rules
//!
//! - Arithmetic types are non-array `char`, `int` and `float`, ranked in that
//!   order; [`larger_type`] picks the higher rank.
//! - An explicit cast is legal between any two arithmetic types, or between
//!   structurally identical types.
//! - An implicit cast (assignment, argument, return value) additionally
//!   rejects `float` to `int`/`char`.
//! - An unsized array accepts a sized one, never the other way round.
//!
//! # Constant Folding
//!
//! [`is_const`] is syntactic: literals, and casts/unary/binary operators over
//! constants. [`const_value`] evaluates such an expression; integer division
//! truncates and dividing by zero is an error.

use crate::parser::ast::*;
use crate::semantic::errors::SemanticError;
use std::fmt;

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Void => write!(f, "void")?,
            TypeKind::Int => write!(f, "int")?,
            TypeKind::Float => write!(f, "float")?,
            TypeKind::Char => write!(f, "char")?,
            TypeKind::Struct(s) => write!(f, "struct {}", s.name)?,
        }
        if self.is_array {
            match array_len(self) {
                Some(len) => write!(f, "[{}]", len)?,
                None => write!(f, "[]")?,
            }
        }
        Ok(())
    }
}

/// Rank among arithmetic types; `None` for everything else
fn rank(ty: &Type) -> Option<u8> {
    if ty.is_array {
        return None;
    }
    match ty.kind {
        TypeKind::Char => Some(0),
        TypeKind::Int => Some(1),
        TypeKind::Float => Some(2),
        _ => None,
    }
}

pub fn is_arithmetic(ty: &Type) -> bool {
    rank(ty).is_some()
}

pub fn is_integral(ty: &Type) -> bool {
    !ty.is_array && matches!(ty.kind, TypeKind::Int | TypeKind::Char)
}

/// Require `ty` to be a scalar char, int or float.
pub fn check_arithmetic(ty: &Type, location: SourceLocation) -> Result<(), SemanticError> {
    if !matches!(ty.kind, TypeKind::Char | TypeKind::Int | TypeKind::Float) {
        return Err(SemanticError::type_error(
            format!("Expected one of char, int or float (got {})", ty),
            location,
        ));
    }
    if ty.is_array {
        return Err(SemanticError::type_error(
            "Cannot use arrays in arithmetic",
            location,
        ));
    }
    Ok(())
}

/// The result type of arithmetic between `a` and `b`.
pub fn larger_type(a: &Type, b: &Type, location: SourceLocation) -> Result<Type, SemanticError> {
    check_arithmetic(a, location)?;
    check_arithmetic(b, location)?;
    if rank(b) > rank(a) {
        Ok(b.element())
    } else {
        Ok(a.element())
    }
}

/// Require `source` and `target` to be the same type up to array size
/// information that is missing on either side.
pub fn check_same_as(source: &Type, target: &Type, location: SourceLocation) -> Result<(), SemanticError> {
    if source.is_array != target.is_array {
        return Err(SemanticError::type_error(
            "Cast between array and non-array types",
            location,
        ));
    }

    if let (Some(source_len), Some(target_len)) = (array_len(source), array_len(target)) {
        if source_len != target_len {
            return Err(SemanticError::type_error(
                format!("Array size does not match ({}, {})", source_len, target_len),
                location,
            ));
        }
    }

    match (&source.kind, &target.kind) {
        (TypeKind::Struct(a), TypeKind::Struct(b)) => {
            let same_scope = match (a.members, b.members) {
                (Some(x), Some(y)) => x == y,
                _ => true,
            };
            if a.name != b.name || !same_scope {
                return Err(SemanticError::type_error(
                    format!("Different struct types ({}, {})", source, target),
                    location,
                ));
            }
        }
        (a, b) if std::mem::discriminant(a) != std::mem::discriminant(b) => {
            return Err(SemanticError::type_error(
                format!("Type mismatch ({}, {})", source, target),
                location,
            ));
        }
        _ => {}
    }
    Ok(())
}

/// A sized target array cannot take its length from an unsized source.
fn check_sized(source: &Type, target: &Type, location: SourceLocation) -> Result<(), SemanticError> {
    if source.is_array && target.is_array && target.array_size.is_some() && source.array_size.is_none() {
        return Err(SemanticError::type_error(
            "Sized/unsized array mismatch",
            location,
        ));
    }
    Ok(())
}

/// Legality of `(target) source`.
pub fn check_explicit_cast(source: &Type, target: &Type, location: SourceLocation) -> Result<(), SemanticError> {
    if larger_type(source, target, location).is_ok() {
        return Ok(());
    }
    check_same_as(source, target, location)?;
    check_sized(source, target, location)
}

/// Legality of converting `source` to `target` without a cast.
pub fn check_implicit_cast(source: &Type, target: &Type, location: SourceLocation) -> Result<(), SemanticError> {
    if is_arithmetic(source) && is_arithmetic(target) {
        if matches!(source.kind, TypeKind::Float) && is_integral(target) {
            return Err(SemanticError::type_error(
                format!("Implicit conversion from {} to {} loses precision", source, target),
                location,
            ));
        }
        return Ok(());
    }
    check_same_as(source, target, location)?;
    check_sized(source, target, location)
}

/// The type of a literal. A string has room for its terminator.
pub fn value_type(value: &Value, location: SourceLocation) -> Type {
    match value {
        Value::Int(_) => Type::int(),
        Value::Float(_) => Type::float(),
        Value::Char(_) => Type::char(),
        Value::Str(text) => {
            let len = text.chars().count() as i64 + 1;
            Type::char().with_array(Some(Expr::constant(Value::Int(len), location)))
        }
    }
}

/// Whether `expr` can be evaluated at compile time.
pub fn is_const(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Constant(_) => true,
        ExprKind::Cast { expr, .. } => is_const(expr),
        ExprKind::UnaryOp { operand, .. } => is_const(operand),
        ExprKind::BinaryOp { op, left, right } => {
            *op != BinOp::Assign && is_const(left) && is_const(right)
        }
        _ => false,
    }
}

/// The folded length of an array type, when it has one.
pub fn array_len(ty: &Type) -> Option<i64> {
    if !ty.is_array {
        return None;
    }
    match const_value(ty.array_size.as_deref()?) {
        Ok(Value::Int(len)) => Some(len),
        _ => None,
    }
}

enum Number {
    Int(i64),
    Float(f64),
}

fn number(value: &Value, location: SourceLocation) -> Result<Number, SemanticError> {
    match value {
        Value::Int(v) => Ok(Number::Int(*v)),
        Value::Char(c) => Ok(Number::Int(*c as i64)),
        Value::Float(v) => Ok(Number::Float(*v)),
        Value::Str(_) => Err(SemanticError::type_error(
            "Cannot use arrays in arithmetic",
            location,
        )),
    }
}

fn truth(value: &Number) -> bool {
    match value {
        Number::Int(v) => *v != 0,
        Number::Float(v) => *v != 0.0,
    }
}

fn as_float(value: &Number) -> f64 {
    match value {
        Number::Int(v) => *v as f64,
        Number::Float(v) => *v,
    }
}

fn flag(b: bool) -> Value {
    Value::Int(b as i64)
}

/// Evaluate a constant expression.
pub fn const_value(expr: &Expr) -> Result<Value, SemanticError> {
    let location = expr.location;
    match &expr.kind {
        ExprKind::Constant(value) => Ok(value.clone()),

        ExprKind::Cast { target_type, expr } => {
            let value = const_value(expr)?;
            if target_type.is_array {
                return Ok(value);
            }
            match (&target_type.kind, number(&value, location)?) {
                (TypeKind::Int | TypeKind::Char, Number::Int(v)) => Ok(Value::Int(v)),
                (TypeKind::Int | TypeKind::Char, Number::Float(v)) => Ok(Value::Int(v as i64)),
                (TypeKind::Float, n) => Ok(Value::Float(as_float(&n))),
                _ => Ok(value),
            }
        }

        ExprKind::UnaryOp { op, operand } => {
            let value = number(&const_value(operand)?, location)?;
            Ok(match op {
                UnOp::Neg => match value {
                    Number::Int(v) => Value::Int(v.wrapping_neg()),
                    Number::Float(v) => Value::Float(-v),
                },
                UnOp::Not => flag(!truth(&value)),
            })
        }

        ExprKind::BinaryOp { op, left, right } => {
            let l = number(&const_value(left)?, location)?;
            let r = number(&const_value(right)?, location)?;
            fold_binary(*op, l, r, location)
        }

        _ => Err(SemanticError::type_error(
            "Expression is not a compile-time constant",
            location,
        )),
    }
}

fn fold_binary(op: BinOp, l: Number, r: Number, location: SourceLocation) -> Result<Value, SemanticError> {
    match op {
        BinOp::And => return Ok(flag(truth(&l) && truth(&r))),
        BinOp::Or => return Ok(flag(truth(&l) || truth(&r))),
        BinOp::Div if !truth(&r) => {
            return Err(SemanticError::type_error(
                "Division by zero in constant expression",
                location,
            ))
        }
        _ => {}
    }

    match (l, r) {
        (Number::Int(a), Number::Int(b)) => Ok(match op {
            BinOp::Add => Value::Int(a.wrapping_add(b)),
            BinOp::Sub => Value::Int(a.wrapping_sub(b)),
            BinOp::Mul => Value::Int(a.wrapping_mul(b)),
            BinOp::Div => Value::Int(a.wrapping_div(b)),
            BinOp::Eq => flag(a == b),
            BinOp::Ne => flag(a != b),
            BinOp::Lt => flag(a < b),
            BinOp::Le => flag(a <= b),
            BinOp::Gt => flag(a > b),
            BinOp::Ge => flag(a >= b),
            BinOp::Assign | BinOp::And | BinOp::Or => {
                return Err(SemanticError::type_error(
                    "Expression is not a compile-time constant",
                    location,
                ))
            }
        }),
        (l, r) => {
            let (a, b) = (as_float(&l), as_float(&r));
            Ok(match op {
                BinOp::Add => Value::Float(a + b),
                BinOp::Sub => Value::Float(a - b),
                BinOp::Mul => Value::Float(a * b),
                BinOp::Div => Value::Float(a / b),
                BinOp::Eq => flag(a == b),
                BinOp::Ne => flag(a != b),
                BinOp::Lt => flag(a < b),
                BinOp::Le => flag(a <= b),
                BinOp::Gt => flag(a > b),
                BinOp::Ge => flag(a >= b),
                BinOp::Assign | BinOp::And | BinOp::Or => {
                    return Err(SemanticError::type_error(
                        "Expression is not a compile-time constant",
                        location,
                    ))
                }
            })
        }
    }
}
