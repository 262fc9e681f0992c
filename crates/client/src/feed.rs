//! Ordered entity list keyed by ID.

/// An entity with a stable identifier.
pub trait Identified {
    /// Server-assigned ID.
    fn id(&self) -> &str;
}

/// A locally held list, newest first, holding each ID at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct Feed<T> {
    items: Vec<T>,
}

impl<T> Default for Feed<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Identified> Feed<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a feed from a server listing. Later duplicates of an ID are
    /// dropped.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        let mut feed = Self::new();
        for item in items {
            if feed.position(item.id()).is_none() {
                feed.items.push(item);
            }
        }
        feed
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&T> {
        self.position(id).map(|i| &self.items[i])
    }

    /// Replace the entity with the same ID in place. Returns `false` and
    /// drops `item` when the ID is absent.
    pub fn replace(&mut self, item: T) -> bool {
        match self.position(item.id()) {
            Some(i) => {
                self.items[i] = item;
                true
            }
            None => false,
        }
    }

    /// Replace in place if present, otherwise prepend. Returns `true` when
    /// the item was prepended.
    pub fn upsert(&mut self, item: T) -> bool {
        match self.position(item.id()) {
            Some(i) => {
                self.items[i] = item;
                false
            }
            None => {
                self.items.insert(0, item);
                true
            }
        }
    }

    /// Mutate the entity with the given ID, if present.
    pub fn update_with(&mut self, id: &str, f: impl FnOnce(&mut T)) -> bool {
        match self.position(id) {
            Some(i) => {
                f(&mut self.items[i]);
                true
            }
            None => false,
        }
    }

    /// Remove the entity with the given ID, if present.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(i) => {
                self.items.remove(i);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(&'static str, u32);

    impl Identified for Item {
        fn id(&self) -> &str {
            self.0
        }
    }

    fn ids(feed: &Feed<Item>) -> Vec<&str> {
        feed.items().iter().map(Identified::id).collect()
    }

    #[test]
    fn test_from_items_keeps_first_occurrence() {
        let feed = Feed::from_items([Item("a", 1), Item("b", 1), Item("a", 2)]);
        assert_eq!(ids(&feed), vec!["a", "b"]);
        assert_eq!(feed.get("a"), Some(&Item("a", 1)));
    }

    #[test]
    fn test_replace_preserves_position() {
        let mut feed = Feed::from_items([Item("a", 1), Item("b", 1), Item("c", 1)]);
        assert!(feed.replace(Item("b", 2)));
        assert_eq!(ids(&feed), vec!["a", "b", "c"]);
        assert_eq!(feed.get("b"), Some(&Item("b", 2)));

        assert!(!feed.replace(Item("z", 1)));
        assert_eq!(feed.len(), 3);
    }

    #[test]
    fn test_upsert_prepends_once() {
        let mut feed = Feed::from_items([Item("a", 1)]);
        assert!(feed.upsert(Item("b", 1)));
        assert!(!feed.upsert(Item("b", 1)));
        assert_eq!(ids(&feed), vec!["b", "a"]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut feed = Feed::from_items([Item("a", 1)]);
        assert!(!feed.remove("z"));
        assert!(feed.remove("a"));
        assert!(feed.is_empty());
        assert!(!feed.update_with("a", |item| item.1 = 9));
    }
}
