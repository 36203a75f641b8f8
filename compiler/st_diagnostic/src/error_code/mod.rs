//! Error codes for all installer and compiler diagnostics.
//!
//! Format: E#### where the first digit is the error family:
//! - E1xxx: Name errors (what may be defined)
//! - E2xxx: Binding errors (what an identifier means)
//! - E3xxx: Structural errors (class and pool shape)
//! - E4xxx: Validation errors (method and initializer bodies)
//! - E5xxx: Recompilation after commit
//! - E6xxx: Runtime errors raised while running initializers
//! - E9xxx: Internal errors

use std::fmt;

/// Coarse family of an [`ErrorCode`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCategory {
    Name,
    Binding,
    Structural,
    Validation,
    Recompile,
    Runtime,
    Internal,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Name errors (E1xxx)
    /// Name already defined in the scope being installed into
    E1001,
    /// Name is protected and cannot be (re)defined
    E1002,
    /// Name is not a well-formed identifier
    E1003,
    /// Method selector is malformed
    E1004,
    /// Name already defined as a different kind of global
    E1005,

    // Binding errors (E2xxx)
    /// Undefined identifier
    E2001,
    /// Assignment to a binding that is not writable
    E2002,
    /// Case-insensitive lookup matched several differently-cased members
    E2003,
    /// Pseudo-variable not available in this context
    E2004,
    /// Duplicate argument or temporary name
    E2005,
    /// Reserved word used as an argument or temporary name
    E2006,
    /// Identifier names something that is not a value
    E2007,

    // Structural errors (E3xxx)
    /// Instance variable and class variable share a name
    E3001,
    /// Class variable and class-instance variable share a name
    E3002,
    /// Unknown superclass
    E3003,
    /// Unknown imported pool
    E3004,
    /// Duplicate variable name within one class definition
    E3005,
    /// Superclass chain is circular
    E3006,
    /// Unknown class for a method or class initializer
    E3007,
    /// Unknown pool for a pool variable or pool initializer
    E3008,
    /// Unknown initializer target variable
    E3009,
    /// Variable redefines one inherited from a superclass
    E3010,
    /// Pool imported twice by one class
    E3011,

    // Validation errors (E4xxx)
    /// Method or initializer body failed to compile
    E4001,
    /// Selector arity does not match the argument count
    E4002,

    // Recompilation (E5xxx)
    /// Method failed to recompile after its class changed shape
    E5001,

    // Runtime (E6xxx)
    /// Initializer raised an error
    E6001,
    /// Initializer result could not be stored in its target
    E6002,

    // Internal (E9xxx)
    /// Internal consistency violation
    E9001,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E3006 => "E3006",
            ErrorCode::E3007 => "E3007",
            ErrorCode::E3008 => "E3008",
            ErrorCode::E3009 => "E3009",
            ErrorCode::E3010 => "E3010",
            ErrorCode::E3011 => "E3011",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E5001 => "E5001",
            ErrorCode::E6001 => "E6001",
            ErrorCode::E6002 => "E6002",
            ErrorCode::E9001 => "E9001",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self.as_str().as_bytes()[1] {
            b'1' => ErrorCategory::Name,
            b'2' => ErrorCategory::Binding,
            b'3' => ErrorCategory::Structural,
            b'4' => ErrorCategory::Validation,
            b'5' => ErrorCategory::Recompile,
            b'6' => ErrorCategory::Runtime,
            _ => ErrorCategory::Internal,
        }
    }

    /// One-line description, used by tooling that lists codes.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "name already defined",
            ErrorCode::E1002 => "protected name",
            ErrorCode::E1003 => "malformed identifier",
            ErrorCode::E1004 => "malformed selector",
            ErrorCode::E1005 => "name defined as a different kind of global",
            ErrorCode::E2001 => "undefined identifier",
            ErrorCode::E2002 => "assignment to a non-writable binding",
            ErrorCode::E2003 => "case conflict",
            ErrorCode::E2004 => "pseudo-variable not available here",
            ErrorCode::E2005 => "duplicate local name",
            ErrorCode::E2006 => "reserved word used as a local name",
            ErrorCode::E2007 => "identifier is not a value",
            ErrorCode::E3001 => "instance variable and class variable share a name",
            ErrorCode::E3002 => "class variable and class-instance variable share a name",
            ErrorCode::E3003 => "unknown superclass",
            ErrorCode::E3004 => "unknown imported pool",
            ErrorCode::E3005 => "duplicate variable name",
            ErrorCode::E3006 => "circular superclass chain",
            ErrorCode::E3007 => "unknown class",
            ErrorCode::E3008 => "unknown pool",
            ErrorCode::E3009 => "unknown initializer target",
            ErrorCode::E3010 => "variable redefines an inherited variable",
            ErrorCode::E3011 => "pool imported twice",
            ErrorCode::E4001 => "body failed to compile",
            ErrorCode::E4002 => "selector arity mismatch",
            ErrorCode::E5001 => "recompilation failed",
            ErrorCode::E6001 => "initializer failed",
            ErrorCode::E6002 => "initializer result could not be stored",
            ErrorCode::E9001 => "internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests;
