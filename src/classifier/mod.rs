//! Classification of Sentinel pub/sub events.
//!
//! Maps a `(channel, payload)` pair onto the [`Category`] values the watcher
//! reacts to. The rule table is built once per watched master and is pure, so
//! it can be shared by every connection delivering messages.

mod classification_rules;
pub use classification_rules::*;


/// Kind of work a Sentinel event asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Master/replica roles changed; re-resolve topology
    RefreshTopology,
    /// The Sentinel group itself changed; connect to any missing Sentinel
    ReconnectWatchdogs,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::RefreshTopology, Category::ReconnectWatchdogs];

    pub(crate) fn index(self) -> usize {
        match self {
            Category::RefreshTopology => 0,
            Category::ReconnectWatchdogs => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::RefreshTopology => "refresh_topology",
            Category::ReconnectWatchdogs => "reconnect_watchdogs",
        }
    }
}

/// Result of classifying one message. May be empty or hold both categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategorySet {
    members: [bool; 2],
}

impl CategorySet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        category: Category,
    ) {
        self.members[category.index()] = true;
    }

    pub fn contains(
        &self,
        category: Category,
    ) -> bool {
        self.members[category.index()]
    }

    pub fn is_empty(&self) -> bool {
        !self.members.iter().any(|m| *m)
    }

    /// Members in declaration order of [`Category`].
    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}
