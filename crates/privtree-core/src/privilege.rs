//! Privilege bitmask: named bits, aggregates and name lookup.
//!
//! The low 16 bits are resource-scoped privileges that may be granted on any
//! node of a [`PrivilegeTree`](crate::PrivilegeTree). The high bits are
//! global-only privileges and only mean something at the root.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::error::{CoreError, Result};

bitflags! {
    /// A set of privileges.
    ///
    /// Only individually named bits are "known" to bitflags, so
    /// [`Privilege::from_bits_truncate`] never lets reserved or undefined bits
    /// through. The aggregates below also cover the reserved ranges and are
    /// only produced explicitly.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
    pub struct Privilege: u32 {
        // Resource privileges
        const READ      = 1 << 0;
        const WRITE     = 1 << 1;
        const CREATE_CQ = 1 << 2;
        const INSERT    = 1 << 3;
        const SELECT    = 1 << 4;
        const DELETE    = 1 << 5;
        const DROP      = 1 << 6;

        // Global privileges
        const SHOW_USERS      = 1 << 16;
        const CREATE_USER     = 1 << 17;
        const SHOW_ROLES      = 1 << 18;
        const CREATE_ROLE     = 1 << 19;
        const GRANT           = 1 << 20;
        const SHOW_DATABASES  = 1 << 21;
        const CREATE_DATABASE = 1 << 22;
        const SHOW_SYSINFO    = 1 << 23;
        const SET_SYSINFO     = 1 << 24;
        const AUDIT           = 1 << 25;
        const SHOW_CQS        = 1 << 26;
    }
}

impl Privilege {
    /// No privilege at all.
    pub const NONE: Self = Self::empty();

    /// Every resource-scoped bit, including the reserved ones.
    pub const ALL_RESOURCE: Self = Self::from_bits_retain(0xFFFF);

    /// Every defined bit, resource-scoped and global.
    pub const ALL_GLOBAL: Self = Self::from_bits_retain((1 << 31) - 1);

    /// What the legacy READ privilege stood for.
    pub const READ_GROUP: Self = Self::SHOW_DATABASES
        .union(Self::SELECT)
        .union(Self::CREATE_CQ);

    /// What the legacy WRITE privilege stood for.
    pub const WRITE_GROUP: Self = Self::CREATE_DATABASE
        .union(Self::DELETE)
        .union(Self::DROP);

    /// Resolve a single privilege name.
    ///
    /// Matching is case-insensitive after trimming. `ALL` and
    /// `ALL PRIVILEGES` resolve to [`Privilege::ALL_GLOBAL`].
    ///
    /// ```
    /// use privtree_core::Privilege;
    ///
    /// assert_eq!(Privilege::lookup(" create cq ").unwrap(), Privilege::CREATE_CQ);
    /// assert_eq!(Privilege::lookup("all").unwrap(), Privilege::ALL_GLOBAL);
    /// assert!(Privilege::lookup("whatever").is_err());
    /// ```
    pub fn lookup(name: &str) -> Result<Self> {
        let wanted = name.trim();
        if ALIASES.iter().any(|alias| alias.eq_ignore_ascii_case(wanted)) {
            return Ok(Self::ALL_GLOBAL);
        }
        NAMED
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(wanted))
            .map(|(p, _)| *p)
            .ok_or_else(|| CoreError::UnknownPrivilegeName(name.to_string()))
    }

    /// Resolve a comma-separated list of privilege names into one mask.
    pub fn parse_list(list: &str) -> Result<Self> {
        list.split(',')
            .try_fold(Self::NONE, |acc, name| Self::lookup(name).map(|p| acc | p))
    }

    /// Names of the individually named bits set in this mask, lowest bit first.
    pub fn names(self) -> Vec<&'static str> {
        NAMED
            .iter()
            .filter(|(p, _)| self.contains(*p))
            .map(|(_, n)| *n)
            .collect()
    }

    /// Bits of `raw` that carry no name.
    pub const fn unknown_bits(raw: u32) -> u32 {
        raw & !Self::all().bits()
    }

    /// Restrict to the resource-scoped range.
    pub const fn resource_scoped(self) -> Self {
        self.intersection(Self::ALL_RESOURCE)
    }

    /// Expand a held mask with the legacy READ/WRITE equivalences.
    ///
    /// Holding READ implies the whole read group and holding the whole read
    /// group implies READ; WRITE works the same way. A single group member
    /// never implies READ or WRITE on its own.
    pub fn with_legacy_groups(self) -> Self {
        let mut held = self;
        if self.contains(Self::READ) {
            held |= Self::READ_GROUP;
        }
        if self.contains(Self::WRITE) {
            held |= Self::WRITE_GROUP;
        }
        if self.contains(Self::READ_GROUP) {
            held |= Self::READ;
        }
        if self.contains(Self::WRITE_GROUP) {
            held |= Self::WRITE;
        }
        held
    }

    /// Whether a held mask satisfies `wanted`, honouring the legacy groups.
    pub fn satisfies(self, wanted: Self) -> bool {
        self.with_legacy_groups().contains(wanted)
    }
}

/// Name registry, one entry per named bit in ascending bit order.
const NAMED: &[(Privilege, &str)] = &[
    (Privilege::READ, "READ"),
    (Privilege::WRITE, "WRITE"),
    (Privilege::CREATE_CQ, "CREATE CQ"),
    (Privilege::INSERT, "INSERT"),
    (Privilege::SELECT, "SELECT"),
    (Privilege::DELETE, "DELETE"),
    (Privilege::DROP, "DROP"),
    (Privilege::SHOW_USERS, "SHOW USERS"),
    (Privilege::CREATE_USER, "CREATE USER"),
    (Privilege::SHOW_ROLES, "SHOW ROLES"),
    (Privilege::CREATE_ROLE, "CREATE ROLE"),
    (Privilege::GRANT, "GRANT"),
    (Privilege::SHOW_DATABASES, "SHOW DATABASES"),
    (Privilege::CREATE_DATABASE, "CREATE DATABASE"),
    (Privilege::SHOW_SYSINFO, "SHOW SYSINFO"),
    (Privilege::SET_SYSINFO, "SET SYSINFO"),
    (Privilege::AUDIT, "AUDIT"),
    (Privilege::SHOW_CQS, "SHOW CQS"),
];

const ALIASES: &[&str] = &["ALL", "ALL PRIVILEGES"];

/// Renders the canonical names joined by `", "`.
///
/// Both aggregates render as `ALL PRIVILEGES`, which resolves back to
/// [`Privilege::ALL_GLOBAL`]. Rendering [`Privilege::ALL_RESOURCE`] and
/// parsing the text again therefore widens it.
impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ALL_GLOBAL || *self == Self::ALL_RESOURCE {
            return f.write_str("ALL PRIVILEGES");
        }
        f.write_str(&self.names().join(", "))
    }
}

impl FromStr for Privilege {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::lookup(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lookup_names() {
        for name in ["all", "all privileges", "ALL privileges", "create cq", "  Grant "] {
            assert!(Privilege::lookup(name).is_ok(), "{name} should resolve");
        }
        assert_eq!(
            Privilege::lookup("whatever"),
            Err(CoreError::UnknownPrivilegeName("whatever".into()))
        );
        assert!(Privilege::lookup("").is_err());
    }

    #[test]
    fn test_every_name_roundtrips() {
        for (p, name) in NAMED {
            assert_eq!(Privilege::lookup(name).unwrap(), *p);
            assert_eq!(p.to_string(), *name);
        }
    }

    #[test]
    fn test_groups() {
        assert!(Privilege::ALL_RESOURCE.contains(Privilege::READ));
        assert!(Privilege::ALL_RESOURCE.contains(Privilege::DROP));
        assert!(Privilege::ALL_GLOBAL.contains(Privilege::READ));
        assert!(Privilege::ALL_GLOBAL.contains(Privilege::SHOW_CQS));
        assert!(!Privilege::ALL_RESOURCE.contains(Privilege::GRANT));
        assert_eq!(Privilege::ALL_GLOBAL.bits(), 0x7FFF_FFFF);
    }

    #[test]
    fn test_display() {
        assert_eq!(Privilege::ALL_GLOBAL.to_string(), "ALL PRIVILEGES");
        assert_eq!(Privilege::ALL_RESOURCE.to_string(), "ALL PRIVILEGES");
        let p = Privilege::READ | Privilege::DROP | Privilege::SHOW_USERS | Privilege::SHOW_CQS;
        assert_eq!(p.to_string(), "READ, DROP, SHOW USERS, SHOW CQS");
        assert_eq!(Privilege::NONE.to_string(), "");
        // Reserved bits are skipped.
        let reserved = Privilege::from_bits_retain(1 << 9) | Privilege::INSERT;
        assert_eq!(reserved.to_string(), "INSERT");
    }

    #[test]
    fn test_resource_aggregate_text_widens() {
        let text = Privilege::ALL_RESOURCE.to_string();
        assert_eq!(Privilege::lookup(&text).unwrap(), Privilege::ALL_GLOBAL);
        assert_ne!(Privilege::lookup(&text).unwrap(), Privilege::ALL_RESOURCE);
    }

    #[test]
    fn test_parse_list() {
        let p = Privilege::parse_list("select, insert ,DROP").unwrap();
        assert_eq!(p, Privilege::SELECT | Privilege::INSERT | Privilege::DROP);
        assert!(Privilege::parse_list("select,,drop").is_err());
        assert!(Privilege::parse_list("select, nope").is_err());
    }

    #[test]
    fn test_truncate_drops_unnamed_bits() {
        let raw = Privilege::GRANT.bits() | (1 << 9) | (1 << 31);
        assert_eq!(Privilege::from_bits_truncate(raw), Privilege::GRANT);
        assert_eq!(Privilege::unknown_bits(raw), (1 << 9) | (1 << 31));
        assert_eq!(Privilege::unknown_bits(Privilege::GRANT.bits()), 0);
    }

    #[test]
    fn test_legacy_groups() {
        assert!(Privilege::READ.satisfies(Privilege::READ_GROUP));
        assert!(Privilege::WRITE.satisfies(Privilege::WRITE_GROUP));
        assert!(Privilege::READ_GROUP.satisfies(Privilege::READ));
        assert!(Privilege::WRITE_GROUP.satisfies(Privilege::WRITE));
        assert!(!Privilege::SELECT.satisfies(Privilege::READ));
        assert!(!Privilege::DELETE.satisfies(Privilege::WRITE));
        assert!(!Privilege::READ.satisfies(Privilege::DELETE));
    }

    proptest! {
        #[test]
        fn test_names_resolve_back(raw in any::<u32>()) {
            let p = Privilege::from_bits_truncate(raw);
            prop_assume!(!p.is_empty());

            let list = p.names().join(", ");
            prop_assert_eq!(Privilege::parse_list(&list).unwrap(), p);
        }

        #[test]
        fn test_satisfies_is_monotonic(held in any::<u32>(), extra in any::<u32>(), wanted in any::<u32>()) {
            let held = Privilege::from_bits_truncate(held);
            let more = held | Privilege::from_bits_truncate(extra);
            let wanted = Privilege::from_bits_truncate(wanted);

            prop_assert!(held.satisfies(held));
            if held.satisfies(wanted) {
                prop_assert!(more.satisfies(wanted));
            }
        }
    }
}
