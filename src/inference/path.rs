use std::fmt;

use crate::ir::type_name;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Field(String),
    Items,
    Variant(String),
}

/// Structural path of a node in the corpus, e.g. `$.events[].payload`.
///
/// Besides diagnostics it names the records built at that path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    root: String,
    segments: Vec<Segment>,
}

impl Path {
    pub fn root(root_name: &str) -> Self {
        Self { root: root_name.to_string(), segments: Vec::new() }
    }

    pub fn field(&self, name: &str) -> Self {
        self.push(Segment::Field(name.to_string()))
    }

    pub fn items(&self) -> Self {
        self.push(Segment::Items)
    }

    pub fn variant(&self, tag: &str) -> Self {
        self.push(Segment::Variant(tag.to_string()))
    }

    fn push(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { root: self.root.clone(), segments }
    }

    /// Nearest enclosing field name, looking through array item segments.
    pub fn field_name(&self) -> Option<&str> {
        for seg in self.segments.iter().rev() {
            match seg {
                Segment::Field(name) => return Some(name),
                Segment::Items => continue,
                Segment::Variant(_) => return None,
            }
        }
        None
    }

    /// Record name for a node at this path.
    pub fn type_name(&self) -> String {
        let mut name = String::new();
        let mut item_suffixes = 0;
        for seg in self.segments.iter().rev() {
            match seg {
                Segment::Items => item_suffixes += 1,
                Segment::Field(f) => {
                    name = type_name(f);
                    break;
                }
                Segment::Variant(v) => {
                    name = type_name(v);
                    break;
                }
            }
        }
        if name.is_empty() {
            name = type_name(&self.root);
        }
        for _ in 0..item_suffixes {
            name.push_str("Item");
        }
        name
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for seg in &self.segments {
            match seg {
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Items => write!(f, "[]")?,
                Segment::Variant(tag) => write!(f, "<{tag}>")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_json_path_like() {
        let p = Path::root("Root").field("events").items().variant("goal").field("player");
        assert_eq!(p.to_string(), "$.events[]<goal>.player");
    }

    #[test]
    fn names_follow_nearest_segment() {
        let root = Path::root("Root");
        assert_eq!(root.type_name(), "Root");
        assert_eq!(root.items().type_name(), "RootItem");
        assert_eq!(root.field("home_team").type_name(), "HomeTeam");
        assert_eq!(root.field("players").items().type_name(), "PlayersItem");
        assert_eq!(root.variant("goal_event").type_name(), "GoalEvent");
    }

    #[test]
    fn field_name_skips_items() {
        let p = Path::root("Root").field("tags").items();
        assert_eq!(p.field_name(), Some("tags"));
        assert_eq!(Path::root("Root").field_name(), None);
        assert_eq!(Path::root("Root").variant("a").field_name(), None);
    }
}
