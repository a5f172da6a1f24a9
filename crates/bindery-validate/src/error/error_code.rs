//! Error codes for the Bindery diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E1xx` - Binds-instance method placement and illegal element kinds
//! - `E2xx` - Binds-instance parameter placement
//! - `E3xx` - Module installation and replacement

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Method Placement Errors (E1xx)
    // =========================================================================
    /// Abstract binds-instance method.
    ///
    /// The annotated method has no body, so it cannot provide a concrete value.
    E100,

    /// Binds-instance method returns `void`.
    E101,

    /// Binds-instance method outside a module.
    ///
    /// The enclosing type does not carry the module marker.
    E102,

    /// Binds-instance method with a parameter count other than one.
    E103,

    /// Binds-instance method binding a deferred framework type.
    E104,

    /// Binds-instance marker on an element kind it cannot annotate.
    ///
    /// Only methods and parameters may carry the marker; fields,
    /// constructors and types are rejected before dispatch.
    E105,

    // =========================================================================
    // Parameter Placement Errors (E2xx)
    // =========================================================================
    /// Binds-instance parameter on an ineligible executable.
    ///
    /// Only constructors and methods of component builders or factories may
    /// carry binds-instance parameters.
    E200,

    /// Binds-instance parameter of a deferred framework type.
    ///
    /// Provider, lazy and producer wrappers cannot be bound as instances.
    E201,

    /// Binds-instance parameter typed as a bare type variable.
    E202,

    /// Binds-instance parameter typed as `void`.
    E203,

    // =========================================================================
    // Module Installation Errors (E3xx)
    // =========================================================================
    /// Install target mismatch.
    ///
    /// A replacement module and the module it replaces are installed in
    /// different components.
    E300,

    /// Conflicting replacements.
    ///
    /// More than one module replaces the same module in the same component.
    E301,

    /// Replacement involving a module that is not installed anywhere.
    E302,

    /// Replacement of a test-only module.
    E303,

    /// Replacement of an unknown module.
    E304,

    /// Duplicate module declaration.
    E305,

    /// Replacement declared by a production module.
    E306,

    /// Module carries both install-in and test-install-in.
    E307,

    /// Install-in used on a type that is not a module.
    E308,

    /// Test-install-in without any replaced module.
    E309,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E100").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E303 => "E303",
            ErrorCode::E304 => "E304",
            ErrorCode::E305 => "E305",
            ErrorCode::E306 => "E306",
            ErrorCode::E307 => "E307",
            ErrorCode::E308 => "E308",
            ErrorCode::E309 => "E309",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Method placement
            ErrorCode::E100 => "abstract binds-instance method",
            ErrorCode::E101 => "binds-instance method returns void",
            ErrorCode::E102 => "binds-instance method outside a module",
            ErrorCode::E103 => "binds-instance method parameter count",
            ErrorCode::E104 => "binds-instance method binds a framework type",
            ErrorCode::E105 => "binds-instance marker on an illegal element kind",
            // Parameter placement
            ErrorCode::E200 => "ineligible binds-instance parameter",
            ErrorCode::E201 => "binds-instance parameter of framework type",
            ErrorCode::E202 => "binds-instance parameter of type variable",
            ErrorCode::E203 => "binds-instance parameter of void type",
            // Module installation
            ErrorCode::E300 => "install target mismatch",
            ErrorCode::E301 => "conflicting replacements",
            ErrorCode::E302 => "uninstalled module in replacement",
            ErrorCode::E303 => "replacement of test-only module",
            ErrorCode::E304 => "replacement of unknown module",
            ErrorCode::E305 => "duplicate module declaration",
            ErrorCode::E306 => "replacement declared by production module",
            ErrorCode::E307 => "conflicting install annotations",
            ErrorCode::E308 => "install annotation outside a module",
            ErrorCode::E309 => "empty replacement list",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E105.to_string(), "E105");
        assert_eq!(ErrorCode::E200.to_string(), "E200");
        assert_eq!(ErrorCode::E309.to_string(), "E309");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E100.description(), "abstract binds-instance method");
        assert_eq!(ErrorCode::E300.description(), "install target mismatch");
        assert_eq!(ErrorCode::E301.description(), "conflicting replacements");
    }
}
