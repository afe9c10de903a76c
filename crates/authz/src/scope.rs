//! Reserved scope grammar.
//!
//! A scope is a whitespace separated set of tokens of the form
//! `resource:field.permission[.permission...]`. Resources, fields and
//! permissions come from closed vocabularies; anything outside them is
//! rejected rather than passed through.

use crate::error::ScopeError;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Resource owning the fields a client may be granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resource {
    User,
}

impl Resource {
    pub const ALL: &'static [Resource] = &[Resource::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::User => "user",
        }
    }

    /// Fields reserved under this resource
    pub fn fields(&self) -> &'static [Field] {
        match self {
            Resource::User => &[Field::Email, Field::Pfp, Field::Username],
        }
    }

    pub fn allows(&self, field: Field) -> bool {
        self.fields().contains(&field)
    }
}

impl FromStr for Resource {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .iter()
            .copied()
            .find(|resource| resource.as_str() == s)
            .ok_or(())
    }
}

// Variants stay in alphabetical order: the derived Ord drives canonical ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Email,
    Pfp,
    Username,
}

impl Field {
    pub const ALL: &'static [Field] = &[Field::Email, Field::Pfp, Field::Username];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Email => "email",
            Field::Pfp => "pfp",
            Field::Username => "username",
        }
    }
}

impl FromStr for Field {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Permission {
    Read,
    Write,
}

impl Permission {
    pub const ALL: &'static [Permission] = &[Permission::Read, Permission::Write];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
        }
    }
}

impl FromStr for Permission {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .copied()
            .find(|permission| permission.as_str() == s)
            .ok_or(())
    }
}

/// A single validated scope token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeToken {
    pub resource: Resource,
    pub field: Field,
    pub permissions: BTreeSet<Permission>,
}

impl fmt::Display for ScopeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource.as_str(), self.field.as_str())?;
        for permission in &self.permissions {
            write!(f, ".{}", permission.as_str())?;
        }
        Ok(())
    }
}

/// Validate one `resource:field.permission[.permission...]` token
pub fn validate(token: &str) -> Result<ScopeToken, ScopeError> {
    let parts: Vec<&str> = token.split(':').collect();
    let (resource_str, remainder) = match parts.as_slice() {
        [resource, remainder] => (*resource, *remainder),
        _ => return Err(ScopeError::Malformed(token.to_string())),
    };

    let resource: Resource = resource_str
        .parse()
        .map_err(|_| ScopeError::UnknownResource {
            token: token.to_string(),
            resource: resource_str.to_string(),
        })?;

    let mut segments = remainder.split('.');
    let field_str = segments.next().unwrap_or_default();
    let field = field_str
        .parse::<Field>()
        .ok()
        .filter(|field| resource.allows(*field))
        .ok_or_else(|| ScopeError::UnknownField {
            token: token.to_string(),
            resource: resource_str.to_string(),
            field: field_str.to_string(),
        })?;

    let mut permissions = BTreeSet::new();
    for segment in segments {
        let permission = segment
            .parse::<Permission>()
            .map_err(|_| ScopeError::UnknownPermission {
                token: token.to_string(),
                permission: segment.to_string(),
            })?;
        permissions.insert(permission);
    }

    if permissions.is_empty() {
        return Err(ScopeError::MissingPermission(token.to_string()));
    }

    Ok(ScopeToken {
        resource,
        field,
        permissions,
    })
}

/// A validated set of scope tokens, keyed by (resource, field)
///
/// Displaying a `Scope` yields its canonical form: one token per
/// (resource, field) pair, sorted, with sorted permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    grants: BTreeMap<(Resource, Field), BTreeSet<Permission>>,
}

impl Scope {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a whitespace separated scope string, failing on the first bad token
    pub fn parse(scope: &str) -> Result<Self, ScopeError> {
        let mut parsed = Scope::empty();
        for token in scope.split_whitespace() {
            parsed.insert(validate(token)?);
        }
        Ok(parsed)
    }

    /// Add a token, merging permissions with an existing grant on the same field
    pub fn insert(&mut self, token: ScopeToken) {
        self.grants
            .entry((token.resource, token.field))
            .or_default()
            .extend(token.permissions);
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn tokens(&self) -> impl Iterator<Item = ScopeToken> + '_ {
        self.grants
            .iter()
            .map(|((resource, field), permissions)| ScopeToken {
                resource: *resource,
                field: *field,
                permissions: permissions.clone(),
            })
    }

    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

impl FromStr for Scope {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scope::parse(s)
    }
}
