// Constants for the AtomC front end

use crate::parser::ast::SourceLocation;

/// Default limit on how deeply statements and expressions may nest before the
/// parser gives up with a syntax error instead of exhausting the stack.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Location attached to symbols that do not come from source text (builtins).
pub const BUILTIN_LOCATION: SourceLocation = SourceLocation { line: 0, column: 0 };
