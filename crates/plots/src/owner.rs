use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Group name reserved for the implicit everyone-owner in encoded form.
pub const EVERYONE_GROUP_NAME: &str = "Wilderness";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    pub fn as_u128(self) -> u128 {
        self.0.as_u128()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Name of the world (dimension) a plot lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldId(pub String);

impl WorldId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorldId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who holds a plot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlotOwner {
    User(UserId),
    Group(String),
    /// Owner of the wilderness and of anything without a closer owner.
    Everyone,
}

impl PlotOwner {
    /// `P:<uuid>` for users, `G:<name>` for groups. `Everyone` encodes as
    /// the reserved group name.
    pub fn encode(&self) -> String {
        match self {
            PlotOwner::User(id) => format!("P:{id}"),
            PlotOwner::Group(name) => format!("G:{name}"),
            PlotOwner::Everyone => format!("G:{EVERYONE_GROUP_NAME}"),
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        let (tag, body) = text.split_once(':')?;
        match tag {
            "P" => Uuid::parse_str(body).ok().map(|u| PlotOwner::User(UserId(u))),
            "G" if body == EVERYONE_GROUP_NAME => Some(PlotOwner::Everyone),
            "G" if !body.is_empty() => Some(PlotOwner::Group(body.to_string())),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<UserId> {
        match self {
            PlotOwner::User(id) => Some(*id),
            _ => None,
        }
    }

    pub fn group_name(&self) -> Option<&str> {
        match self {
            PlotOwner::Group(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for PlotOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotOwner::User(id) => write!(f, "user {id}"),
            PlotOwner::Group(name) => write!(f, "group {name}"),
            PlotOwner::Everyone => write!(f, "everyone"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_parse_user() {
        let owner = PlotOwner::User(UserId::from_u128(0xabcdef));
        let encoded = owner.encode();
        assert!(encoded.starts_with("P:"));
        assert_eq!(PlotOwner::parse(&encoded), Some(owner));
    }

    #[test]
    fn test_encode_parse_group() {
        let owner = PlotOwner::Group("builders".into());
        assert_eq!(owner.encode(), "G:builders");
        assert_eq!(PlotOwner::parse("G:builders"), Some(owner));
    }

    #[test]
    fn test_everyone_uses_reserved_group_name() {
        assert_eq!(PlotOwner::Everyone.encode(), "G:Wilderness");
        assert_eq!(PlotOwner::parse("G:Wilderness"), Some(PlotOwner::Everyone));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(PlotOwner::parse("X:foo"), None);
        assert_eq!(PlotOwner::parse("P:not-a-uuid"), None);
        assert_eq!(PlotOwner::parse("G:"), None);
        assert_eq!(PlotOwner::parse("builders"), None);
    }

    #[test]
    fn test_user_id_serde_json() {
        let id = UserId::from_u128(42);
        let json = serde_json::to_string(&id).unwrap();
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
        assert_eq!(back.as_u128(), 42);
    }
}
