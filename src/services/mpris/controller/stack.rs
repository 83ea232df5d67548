use crate::services::mpris::PlayerId;

/// Players ordered by how recently they changed, most recent first.
///
/// Holds each id at most once. Kept as a plain vector: a desktop rarely has
/// more than a handful of players, so the linear search on every touch is
/// cheaper than maintaining an index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveStack {
    entries: Vec<PlayerId>,
}

impl ActiveStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a player to the head, inserting it if absent.
    pub fn touch(&mut self, player_id: &PlayerId) {
        self.remove(player_id);
        self.entries.insert(0, player_id.clone());
    }

    /// Remove a player wherever it sits. Returns whether it was present.
    pub fn remove(&mut self, player_id: &PlayerId) -> bool {
        match self.entries.iter().position(|entry| entry == player_id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// The most recently active player
    pub fn head(&self) -> Option<&PlayerId> {
        self.entries.first()
    }

    /// Whether the given player is the head
    pub fn is_head(&self, player_id: &PlayerId) -> bool {
        self.head() == Some(player_id)
    }

    /// Whether the player has an entry
    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.entries.contains(player_id)
    }

    /// Entries from most to least recently active
    pub fn as_slice(&self) -> &[PlayerId] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stack has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
