//! Builtin function table
//!
//! The runtime library every AtomC program can call without declaring it.
//! The validator treats these exactly like user functions; they are bound in
//! the root scope at [`BUILTIN_LOCATION`], so a user function with the same
//! name is a duplicate symbol.

use crate::constants::BUILTIN_LOCATION;
use crate::parser::ast::Type;
use crate::semantic::errors::SemanticError;
use crate::semantic::symbols::{FunctionSig, Symbol, SymbolTable};
use log::debug;

#[derive(Clone, Copy)]
enum Shape {
    Void,
    Int,
    Float,
    Char,
    /// `char[]`
    Text,
}

impl Shape {
    fn to_type(self) -> Type {
        match self {
            Shape::Void => Type::void(),
            Shape::Int => Type::int(),
            Shape::Float => Type::float(),
            Shape::Char => Type::char(),
            Shape::Text => Type::char().with_array(None),
        }
    }
}

const BUILTINS: &[(&str, Shape, &[Shape])] = &[
    ("put_s", Shape::Void, &[Shape::Text]),
    ("get_s", Shape::Void, &[Shape::Text]),
    ("put_i", Shape::Void, &[Shape::Int]),
    ("get_i", Shape::Int, &[]),
    ("put_d", Shape::Void, &[Shape::Float]),
    ("get_d", Shape::Float, &[]),
    ("put_c", Shape::Void, &[Shape::Char]),
    ("get_c", Shape::Char, &[]),
    ("seconds", Shape::Float, &[]),
];

/// Signatures of all builtin functions
pub fn signatures() -> Vec<FunctionSig> {
    BUILTINS
        .iter()
        .map(|(name, ret, params)| FunctionSig {
            name: name.to_string(),
            return_type: ret.to_type(),
            params: params.iter().map(|p| p.to_type()).collect(),
            location: BUILTIN_LOCATION,
        })
        .collect()
}

/// Bind every builtin in the root scope of `symbols`.
pub fn install(symbols: &mut SymbolTable) -> Result<(), SemanticError> {
    let root = symbols.root();
    for sig in signatures() {
        let name = sig.name.clone();
        symbols.insert(root, &name, Symbol::Function(sig))?;
    }
    debug!("installed {} builtin functions", BUILTINS.len());
    Ok(())
}
