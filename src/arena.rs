//! Chunked slot storage with stable handles.

use std::mem;
use std::ops::{Index, IndexMut};
use std::vec::Vec;

/// Slots allocated per chunk when no chunk size is given.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// A handle to a value stored in a `TypedArena<T>`.
///
/// Handles are plain copyable indices. They stay valid until the value they name is freed, after
/// which the slot may be handed out again by a later allocation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Handle {
    chunk_index: usize,
    block_index: usize,
}

enum Block<T> {
    Occupied(T),
    Vacant(Option<Handle>),
}

/// An allocator for a single type of object with a free list.
///
/// Objects live in fixed-capacity chunks, so allocating never moves an existing object and a
/// `Handle` keeps pointing at the same slot for the object's whole lifetime. Freed slots are
/// threaded onto a free list and reused most-recent-first.
///
/// # Examples
///
/// ```
/// use splay_arena::arena::TypedArena;
///
/// let mut arena = TypedArena::new(16);
///
/// let x = arena.allocate(1);
/// assert_eq!(arena[x], 1);
///
/// arena[x] += 1;
/// assert_eq!(arena[x], 2);
///
/// assert_eq!(arena.free(&x), 2);
/// assert!(arena.is_empty());
/// ```
pub struct TypedArena<T> {
    head: Option<Handle>,
    chunks: Vec<Vec<Block<T>>>,
    chunk_size: usize,
    len: usize,
    capacity: usize,
}

impl<T> TypedArena<T> {
    fn is_valid_handle(&self, handle: &Handle) -> bool {
        handle.chunk_index < self.chunks.len()
            && handle.block_index < self.chunks[handle.chunk_index].len()
    }

    /// Constructs a new, empty `TypedArena<T>` holding `chunk_size` objects per chunk.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_arena::arena::TypedArena;
    ///
    /// let arena: TypedArena<u32> = TypedArena::new(1024);
    /// assert_eq!(arena.len(), 0);
    /// ```
    pub fn new(chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "Error: chunk size must be positive.");
        TypedArena {
            head: None,
            chunks: Vec::new(),
            chunk_size,
            len: 0,
            capacity: 0,
        }
    }

    /// Stores `value` and returns its handle.
    pub fn allocate(&mut self, value: T) -> Handle {
        self.len += 1;

        match self.head.take() {
            None => {
                if self.chunks.last().map_or(true, |chunk| chunk.len() == self.chunk_size) {
                    self.chunks.push(Vec::with_capacity(self.chunk_size));
                    self.capacity += self.chunk_size;
                }
                let chunk_index = self.chunks.len() - 1;
                let last_chunk = &mut self.chunks[chunk_index];
                last_chunk.push(Block::Occupied(value));
                Handle {
                    chunk_index,
                    block_index: last_chunk.len() - 1,
                }
            },
            Some(handle) => {
                let vacant_block = mem::replace(
                    &mut self.chunks[handle.chunk_index][handle.block_index],
                    Block::Occupied(value),
                );

                match vacant_block {
                    Block::Vacant(next_handle) => {
                        self.head = next_handle;
                        handle
                    },
                    Block::Occupied(_) => panic!("Error: free list points at an occupied block."),
                }
            },
        }
    }

    /// Removes the object named by `handle` from the arena and returns it.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is out of bounds or names a vacant slot.
    pub fn free(&mut self, handle: &Handle) -> T {
        if !self.is_valid_handle(handle) {
            panic!("Error: attempting to free invalid block.");
        }
        let slot = &mut self.chunks[handle.chunk_index][handle.block_index];
        if let Block::Vacant(_) = slot {
            panic!("Error: attempting to free vacant block.");
        }
        match mem::replace(slot, Block::Vacant(self.head.take())) {
            Block::Occupied(value) => {
                self.len -= 1;
                self.head = Some(*handle);
                value
            },
            Block::Vacant(_) => unreachable!(),
        }
    }

    /// Returns a reference to the object named by `handle`, or `None` if the handle is invalid
    /// or vacant.
    pub fn get(&self, handle: &Handle) -> Option<&T> {
        if !self.is_valid_handle(handle) {
            return None;
        }
        match self.chunks[handle.chunk_index][handle.block_index] {
            Block::Occupied(ref value) => Some(value),
            Block::Vacant(_) => None,
        }
    }

    /// Returns a mutable reference to the object named by `handle`, or `None` if the handle is
    /// invalid or vacant.
    pub fn get_mut(&mut self, handle: &Handle) -> Option<&mut T> {
        if !self.is_valid_handle(handle) {
            return None;
        }
        match self.chunks[handle.chunk_index][handle.block_index] {
            Block::Occupied(ref mut value) => Some(value),
            Block::Vacant(_) => None,
        }
    }

    /// Returns the number of live objects.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no objects are live.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots across all chunks.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every object and releases all chunks. Every outstanding handle becomes invalid.
    pub fn clear(&mut self) {
        self.head = None;
        self.chunks.clear();
        self.len = 0;
        self.capacity = 0;
    }
}

impl<T> Index<Handle> for TypedArena<T> {
    type Output = T;

    fn index(&self, handle: Handle) -> &Self::Output {
        self.get(&handle).expect("Error: handle out of bounds.")
    }
}

impl<T> IndexMut<Handle> for TypedArena<T> {
    fn index_mut(&mut self, handle: Handle) -> &mut Self::Output {
        self.get_mut(&handle).expect("Error: handle out of bounds.")
    }
}

#[cfg(test)]
mod tests {
    use super::Handle;
    use super::TypedArena;

    #[test]
    #[should_panic]
    fn test_zero_chunk_size() {
        let _: TypedArena<u32> = TypedArena::new(0);
    }

    #[test]
    #[should_panic]
    fn test_free_invalid_block() {
        let mut arena: TypedArena<u32> = TypedArena::new(8);
        arena.free(&Handle {
            chunk_index: 0,
            block_index: 0,
        });
    }

    #[test]
    #[should_panic]
    fn test_double_free() {
        let mut arena = TypedArena::new(8);
        let handle = arena.allocate(0);
        arena.free(&handle);
        arena.free(&handle);
    }

    #[test]
    fn test_allocate_multiple_chunks() {
        let mut arena = TypedArena::new(2);
        let handles: Vec<Handle> = (0..3).map(|i| arena.allocate(i)).collect();
        assert_eq!(
            handles[2],
            Handle {
                chunk_index: 1,
                block_index: 0
            },
        );
        assert_eq!(arena.len(), 3);
        assert_eq!(arena.capacity(), 4);
        for (i, handle) in handles.iter().enumerate() {
            assert_eq!(arena[*handle], i);
        }
    }

    #[test]
    fn test_free_list_reuse() {
        let mut arena = TypedArena::new(8);
        let a = arena.allocate("a");
        let b = arena.allocate("b");
        arena.allocate("c");

        assert_eq!(arena.free(&a), "a");
        assert_eq!(arena.free(&b), "b");
        assert_eq!(arena.len(), 1);

        assert_eq!(arena.allocate("d"), b);
        assert_eq!(arena.allocate("e"), a);
        assert_eq!(arena[a], "e");
        assert_eq!(arena.len(), 3);
        assert_eq!(arena.capacity(), 8);
    }

    #[test]
    fn test_get_vacant_block() {
        let mut arena = TypedArena::new(8);
        let handle = arena.allocate(0);
        arena.free(&handle);
        assert_eq!(arena.get(&handle), None);
        assert_eq!(arena.get_mut(&handle), None);
    }

    #[test]
    fn test_get_mut() {
        let mut arena = TypedArena::new(8);
        let handle = arena.allocate(0);
        *arena.get_mut(&handle).unwrap() = 1;
        assert_eq!(arena.get(&handle), Some(&1));
    }

    #[test]
    fn test_clear() {
        let mut arena = TypedArena::new(2);
        let handle = arena.allocate(0);
        arena.allocate(1);
        arena.allocate(2);
        arena.clear();

        assert!(arena.is_empty());
        assert_eq!(arena.capacity(), 0);
        assert_eq!(arena.get(&handle), None);
        assert_eq!(arena.allocate(3), handle);
    }
}
