use serde::{Deserialize, Serialize};

/// One of the fixed access flags a user record carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PermissionKey {
    Permission1,
    Permission2,
    Permission3,
}

/// Display group a permission belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionCategory {
    Parent1,
    Parent2,
}

impl PermissionCategory {
    pub fn label(&self) -> &'static str {
        match self {
            PermissionCategory::Parent1 => "Parent permissions 1",
            PermissionCategory::Parent2 => "Parent permissions 2",
        }
    }

    /// Keys shown under this category, in display order.
    pub fn keys(&self) -> &'static [PermissionKey] {
        match self {
            PermissionCategory::Parent1 => &[PermissionKey::Permission1, PermissionKey::Permission2],
            PermissionCategory::Parent2 => &[PermissionKey::Permission3],
        }
    }

    pub fn all() -> &'static [PermissionCategory] {
        &[PermissionCategory::Parent1, PermissionCategory::Parent2]
    }
}

impl PermissionKey {
    /// Human-readable name shown next to the checkbox.
    pub fn label(&self) -> &'static str {
        match self {
            PermissionKey::Permission1 => "Child permission 1",
            PermissionKey::Permission2 => "Child permission 2",
            PermissionKey::Permission3 => "Child permission 3",
        }
    }

    /// Key used on the wire and in form field names.
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionKey::Permission1 => "permission1",
            PermissionKey::Permission2 => "permission2",
            PermissionKey::Permission3 => "permission3",
        }
    }

    pub fn from_str(s: &str) -> Option<PermissionKey> {
        match s.trim() {
            "permission1" => Some(PermissionKey::Permission1),
            "permission2" => Some(PermissionKey::Permission2),
            "permission3" => Some(PermissionKey::Permission3),
            _ => None,
        }
    }

    pub fn category(&self) -> PermissionCategory {
        match self {
            PermissionKey::Permission1 | PermissionKey::Permission2 => PermissionCategory::Parent1,
            PermissionKey::Permission3 => PermissionCategory::Parent2,
        }
    }

    pub fn all() -> &'static [PermissionKey] {
        &[
            PermissionKey::Permission1,
            PermissionKey::Permission2,
            PermissionKey::Permission3,
        ]
    }
}

/// The three permission flags of a user record. Every flag is always present;
/// unknown keys are refused when decoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionSet {
    #[serde(default)]
    pub permission1: bool,
    #[serde(default)]
    pub permission2: bool,
    #[serde(default)]
    pub permission3: bool,
}

impl PermissionSet {
    pub fn get(&self, key: PermissionKey) -> bool {
        match key {
            PermissionKey::Permission1 => self.permission1,
            PermissionKey::Permission2 => self.permission2,
            PermissionKey::Permission3 => self.permission3,
        }
    }

    pub fn set(&mut self, key: PermissionKey, granted: bool) {
        match key {
            PermissionKey::Permission1 => self.permission1 = granted,
            PermissionKey::Permission2 => self.permission2 = granted,
            PermissionKey::Permission3 => self.permission3 = granted,
        }
    }

    /// Keys currently granted, in display order.
    pub fn granted(&self) -> Vec<PermissionKey> {
        PermissionKey::all()
            .iter()
            .copied()
            .filter(|k| self.get(*k))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_set_grants_nothing() {
        assert!(PermissionSet::default().granted().is_empty());
    }

    #[test]
    fn setting_one_flag_leaves_others_alone() {
        let mut set = PermissionSet::default();
        set.set(PermissionKey::Permission2, true);
        assert!(!set.permission1);
        assert!(set.permission2);
        assert!(!set.permission3);
        assert_eq!(set.granted(), vec![PermissionKey::Permission2]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let res: Result<PermissionSet, _> =
            serde_json::from_value(json!({"permission1": true, "permission4": true}));
        assert!(res.is_err());
    }

    #[test]
    fn missing_keys_default_to_false() {
        let set: PermissionSet = serde_json::from_value(json!({"permission3": true})).unwrap();
        assert_eq!(set.granted(), vec![PermissionKey::Permission3]);
    }

    #[test]
    fn every_key_belongs_to_exactly_one_category() {
        for key in PermissionKey::all() {
            let hits = PermissionCategory::all()
                .iter()
                .filter(|c| c.keys().contains(key))
                .count();
            assert_eq!(hits, 1, "{:?}", key);
            assert!(key.category().keys().contains(key));
            assert_eq!(PermissionKey::from_str(key.as_str()), Some(*key));
        }
    }
}
