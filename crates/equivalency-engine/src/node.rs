//! Position in the dual graph walk
//!
//! Nodes are append-only: a child node borrows its parent and adds one path
//! segment. They live on the stack of the recursion that created them.

use std::fmt;

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Named member (`.Total`)
    Member(String),

    /// Position in an ordered collection (`[3]`)
    Index(usize),

    /// Entry of a keyed collection (`[Orders]`)
    Key(String),
}

impl PathSegment {
    fn write(&self, f: &mut impl fmt::Write, first: bool) -> fmt::Result {
        match self {
            Self::Member(name) if first => write!(f, "{}", name),
            Self::Member(name) => write!(f, ".{}", name),
            Self::Index(index) => write!(f, "[{}]", index),
            Self::Key(key) => write!(f, "[{}]", key),
        }
    }
}

/// A position in the comparison, with the runtime types found on each side
pub struct Node<'p> {
    parent: Option<&'p Node<'p>>,
    segment: Option<PathSegment>,
    subject_type: &'p str,
    expectation_type: &'p str,
    description: Option<&'p dyn Fn() -> String>,
    depth: usize,
}

impl<'p> Node<'p> {
    /// Create the root node
    ///
    /// The description names the root in mismatches found at the root
    /// itself; it is only evaluated when such a mismatch is reported.
    pub fn root(
        subject_type: &'p str,
        expectation_type: &'p str,
        description: &'p dyn Fn() -> String,
    ) -> Self {
        Self {
            parent: None,
            segment: None,
            subject_type,
            expectation_type,
            description: Some(description),
            depth: 0,
        }
    }

    /// Create a child node one segment below this one
    pub fn child<'c>(&'c self, segment: PathSegment, subject_type: &'c str, expectation_type: &'c str) -> Node<'c> {
        Node {
            parent: Some(self),
            segment: Some(segment),
            subject_type,
            expectation_type,
            description: None,
            depth: self.depth + 1,
        }
    }

    /// Create a child node for a named member
    pub fn member<'c>(&'c self, name: &str, subject_type: &'c str, expectation_type: &'c str) -> Node<'c> {
        self.child(PathSegment::Member(name.to_string()), subject_type, expectation_type)
    }

    /// Runtime type on the subject side
    pub fn subject_type(&self) -> &str {
        self.subject_type
    }

    /// Runtime type on the expectation side
    pub fn expectation_type(&self) -> &str {
        self.expectation_type
    }

    /// Distance from the root
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether this is the root node
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Segments from the root down to this node
    pub fn segments(&self) -> Vec<&PathSegment> {
        let mut segments = Vec::with_capacity(self.depth);
        let mut current = Some(self);
        while let Some(node) = current {
            if let Some(segment) = &node.segment {
                segments.push(segment);
            }
            current = node.parent;
        }
        segments.reverse();
        segments
    }

    /// Rendered path, e.g. `Tables[Orders].Rows[2].Total`
    ///
    /// The root renders as its description.
    pub fn path(&self) -> String {
        render(self.segments(), None).unwrap_or_else(|| self.root_description())
    }

    /// Rendered path of a would-be child, without creating the node
    pub fn path_with(&self, segment: &PathSegment) -> String {
        render(self.segments(), Some(segment)).unwrap_or_else(|| self.root_description())
    }

    /// Dotted member chain from the root, without index or key segments
    pub fn member_path(&self) -> String {
        self.member_names().join(".")
    }

    /// Member chain of a would-be member child
    pub fn member_path_with(&self, name: &str) -> String {
        let mut names = self.member_names();
        names.push(name);
        names.join(".")
    }

    fn member_names(&self) -> Vec<&str> {
        self.segments()
            .into_iter()
            .filter_map(|segment| match segment {
                PathSegment::Member(name) => Some(name.as_str()),
                PathSegment::Index(_) | PathSegment::Key(_) => None,
            })
            .collect()
    }

    fn root_description(&self) -> String {
        let mut current = self;
        while let Some(parent) = current.parent {
            current = parent;
        }
        current.description.map_or_else(|| "root".to_string(), |describe| describe())
    }
}

fn render(segments: Vec<&PathSegment>, extra: Option<&PathSegment>) -> Option<String> {
    let mut path = String::new();
    for (i, segment) in segments.into_iter().chain(extra).enumerate() {
        // Writing into a String cannot fail
        let _ = segment.write(&mut path, i == 0);
    }
    (!path.is_empty()).then_some(path)
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("path", &self.path())
            .field("subject_type", &self.subject_type)
            .field("expectation_type", &self.expectation_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe() -> String {
        "the orders table".to_string()
    }

    #[test]
    fn paths_render_members_indices_and_keys() {
        let root = Node::root("DataSet", "DataSet", &describe);
        let tables = root.member("Tables", "Tables", "Tables");
        let orders = tables.child(PathSegment::Key("Orders".into()), "DataTable", "DataTable");
        let rows = orders.member("Rows", "Rows", "Rows");
        let row = rows.child(PathSegment::Index(2), "DataRow", "DataRow");
        let total = row.member("Total", "Int", "Int");

        assert_eq!(total.path(), "Tables[Orders].Rows[2].Total");
        assert_eq!(total.member_path(), "Tables.Rows.Total");
        assert_eq!(total.depth(), 5);
        assert_eq!(row.path_with(&PathSegment::Key("Original".into())), "Tables[Orders].Rows[2][Original]");
    }

    #[test]
    fn root_renders_its_description_lazily() {
        let calls = std::cell::Cell::new(0);
        let describe = || {
            calls.set(calls.get() + 1);
            "subject".to_string()
        };
        let root = Node::root("Int", "Int", &describe);
        let child = root.child(PathSegment::Index(0), "Int", "Int");

        assert_eq!(child.path(), "[0]");
        assert_eq!(calls.get(), 0);
        assert_eq!(root.path(), "subject");
        assert_eq!(calls.get(), 1);
        assert!(root.is_root());
        assert!(!child.is_root());
    }

    #[test]
    fn member_path_of_would_be_child() {
        let root = Node::root("Customer", "Customer", &describe);
        assert_eq!(root.member_path_with("Name"), "Name");
        let address = root.member("Address", "Address", "Address");
        assert_eq!(address.member_path_with("City"), "Address.City");
        assert_eq!(address.path_with(&PathSegment::Member("City".into())), "Address.City");
    }
}
