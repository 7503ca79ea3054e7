/// Opaque handle to an open-variable session.
///
/// A handle pairs a slot index with the generation the slot carried when the
/// session was opened. Closing the session retires the generation, so a
/// stale handle held across a close (explicit, or implicit via the one-shot
/// read paths) fails instead of aliasing a later session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileHandle {
    index: usize,
    generation: u64,
}

/// State of one open-variable session.
#[derive(Clone, Debug)]
pub struct FileObject {
    pub ts: usize,
    pub name: String,
    pub level: usize,
    pub lod: usize,
    /// Cursor advanced by each `read_slice` call.
    pub slice: usize,
    /// The backend's own token for this session.
    pub token: usize,
}

#[derive(Debug)]
struct Slot {
    generation: u64,
    object: Option<FileObject>,
}

/// Slot map of open-variable sessions.
///
/// Slots are reused after removal; each removal bumps the slot's generation
/// so previously issued handles for it stop resolving.
#[derive(Debug, Default)]
pub struct FileTable {
    slots: Vec<Slot>,
}

impl FileTable {
    pub fn new() -> Self {
        Self { slots: vec![] }
    }

    pub fn insert(&mut self, object: FileObject) -> FileHandle {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.object.is_none() {
                slot.object = Some(object);
                return FileHandle {
                    index,
                    generation: slot.generation,
                };
            }
        }

        self.slots.push(Slot {
            generation: 0,
            object: Some(object),
        });

        FileHandle {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    pub fn get(&self, handle: FileHandle) -> Option<&FileObject> {
        let slot = self.slots.get(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.object.as_ref()
    }

    pub fn get_mut(&mut self, handle: FileHandle) -> Option<&mut FileObject> {
        let slot = self.slots.get_mut(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.object.as_mut()
    }

    pub fn remove(&mut self, handle: FileHandle) -> Option<FileObject> {
        let slot = self.slots.get_mut(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        let object = slot.object.take();
        if object.is_some() {
            slot.generation += 1;
        }
        object
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.object.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(name: &str) -> FileObject {
        FileObject {
            ts: 0,
            name: name.to_string(),
            level: 0,
            lod: 0,
            slice: 0,
            token: 0,
        }
    }

    #[test]
    fn test_insert_get_remove() {
        let mut table = FileTable::new();
        let handle = table.insert(object("u"));
        assert_eq!(table.get(handle).unwrap().name, "u");
        assert_eq!(table.len(), 1);

        let removed = table.remove(handle).unwrap();
        assert_eq!(removed.name, "u");
        assert!(table.is_empty());
        assert!(table.get(handle).is_none());
    }

    #[test]
    fn test_stale_handle_after_reuse() {
        let mut table = FileTable::new();
        let first = table.insert(object("u"));
        table.remove(first);

        // Slot is reused, but the old handle must not alias the new session
        let second = table.insert(object("v"));
        assert!(table.get(first).is_none());
        assert!(table.remove(first).is_none());
        assert_eq!(table.get(second).unwrap().name, "v");
    }

    #[test]
    fn test_cursor_advance() {
        let mut table = FileTable::new();
        let handle = table.insert(object("w"));
        table.get_mut(handle).unwrap().slice += 1;
        table.get_mut(handle).unwrap().slice += 1;
        assert_eq!(table.get(handle).unwrap().slice, 2);
    }

    #[test]
    fn test_double_remove_does_not_bump() {
        let mut table = FileTable::new();
        let handle = table.insert(object("u"));
        assert!(table.remove(handle).is_some());
        assert!(table.remove(handle).is_none());

        let next = table.insert(object("v"));
        assert_eq!(table.get(next).unwrap().name, "v");
    }
}
