//! Directive tables
//!
//! Every feature that accepts a format string (index lines, status bar,
//! pager header, ...) owns a table listing the directives it understands.

/// One directive a format string may use.
///
/// # Example
///
/// ```
/// use mailrc_expando::ExpandoDefinition;
///
/// static INDEX_FORMAT: &[ExpandoDefinition] = &[
///     ExpandoDefinition::new("a", "from", 1, 100),
///     ExpandoDefinition::new("cr", "date-received", 1, 101),
/// ];
/// assert_eq!(INDEX_FORMAT[1].code, "cr");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpandoDefinition {
    /// Short code written after `%`, one or two characters
    pub code: &'static str,
    /// Canonical long name, usable as `%{name}`
    pub name: &'static str,
    /// Domain the directive belongs to (email, mailbox, ...)
    pub domain: i32,
    /// Identifier unique within the domain
    pub uid: i32,
}

impl ExpandoDefinition {
    pub const fn new(code: &'static str, name: &'static str, domain: i32, uid: i32) -> Self {
        Self {
            code,
            name,
            domain,
            uid,
        }
    }
}

/// Find a directive by its short code.
pub fn find_by_code<'d>(
    defs: &'d [ExpandoDefinition],
    code: &str,
) -> Option<&'d ExpandoDefinition> {
    defs.iter().find(|def| def.code == code)
}

/// Find a directive by its canonical name.
pub fn find_by_name<'d>(
    defs: &'d [ExpandoDefinition],
    name: &str,
) -> Option<&'d ExpandoDefinition> {
    defs.iter().find(|def| def.name == name)
}
