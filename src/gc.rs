//! Precise mark-and-sweep garbage collection with scoped roots.
//!
//! Objects are kept alive by being reachable from a root: either a handle
//! registered in the root registry through a [`HandleScope`], or a persistent
//! root added with [`Heap::add_root`]. Collection happens at allocation
//! points once the number of allocations since the last collection reaches
//! the threshold, so any allocation may free every unrooted object.
//!
//! A [`Gc`] is a raw reference (slot index + generation). It does not keep
//! anything alive. Reading through a `Gc` whose object was collected yields
//! `None` rather than whatever object reuses the slot.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::rc::Rc;

use rustc_hash::FxHashMap;

// ============================================================================
// ChunkBitmask - 256-bit bitmask for marking objects within a chunk
// ============================================================================

/// 256-bit bitmask for marking objects within a chunk.
/// Each bit corresponds to an index in the chunk (0-255).
#[derive(Clone, Copy, Default)]
struct ChunkBitmask {
    /// 4 × u64 = 256 bits
    bits: [u64; 4],
}

impl ChunkBitmask {
    /// Set a bit at the given index (0-255)
    #[inline]
    fn set(&mut self, index: usize) {
        debug_assert!(index < CHUNK_CAPACITY);
        if let Some(word) = self.bits.get_mut(index >> 6) {
            *word |= 1 << (index & 63);
        }
    }

    /// Check if a bit is set at the given index (0-255)
    #[inline]
    fn get(&self, index: usize) -> bool {
        debug_assert!(index < CHUNK_CAPACITY);
        self.bits
            .get(index >> 6)
            .is_some_and(|word| word & (1 << (index & 63)) != 0)
    }

    /// Clear all bits
    #[inline]
    fn clear(&mut self) {
        self.bits = [0; 4];
    }

    /// Iterate over unmarked indices (bits that are 0) up to `len`
    #[inline]
    fn iter_unmarked(&self, len: usize) -> impl Iterator<Item = usize> + '_ {
        UnmarkedIter {
            bitmask: self,
            len,
            current_word: 0,
            current_bits: !self.bits.first().copied().unwrap_or(0),
            base_index: 0,
        }
    }
}

/// Iterator over unmarked (zero) bits in a ChunkBitmask
struct UnmarkedIter<'a> {
    bitmask: &'a ChunkBitmask,
    len: usize,
    current_word: usize,
    current_bits: u64, // Inverted bits (1 = unmarked)
    base_index: usize,
}

impl Iterator for UnmarkedIter<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current_bits != 0 {
                let bit_pos = self.current_bits.trailing_zeros() as usize;
                let index = self.base_index + bit_pos;
                self.current_bits &= self.current_bits - 1;
                if index < self.len {
                    return Some(index);
                }
            }

            self.current_word += 1;
            self.base_index = self.current_word << 6;
            if self.base_index >= self.len {
                return None;
            }
            self.current_bits = !*self.bitmask.bits.get(self.current_word)?;
        }
    }
}

// ============================================================================
// Gc - raw reference to a GC-managed object
// ============================================================================

/// A raw reference to a GC-managed object.
///
/// `Gc` is `Copy` and does not root its target. Hold it across an allocation
/// only when the target is registered in a [`HandleScope`] or reachable from
/// something that is.
pub struct Gc<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Gc<T> {
    fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Slot index of this object (stable while the object is alive)
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Check if two Gc pointers point to the same object
    pub fn ptr_eq(a: &Gc<T>, b: &Gc<T>) -> bool {
        a == b
    }
}

impl<T> Clone for Gc<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Gc<T> {}

impl<T> PartialEq for Gc<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Gc<T> {}

impl<T> Hash for Gc<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Gc<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gc({}#{})", self.index, self.generation)
    }
}

// ============================================================================
// Traceable / Reset
// ============================================================================

/// Trait for types that can be traced by the garbage collector.
///
/// Objects implement this to yield every `Gc<Self>` they hold. The collector
/// calls `trace()` during the mark phase.
pub trait Traceable: Sized {
    fn trace<F: FnMut(Gc<Self>)>(&self, visitor: F);
}

/// Trait for types that can be reset to a clean state when collected.
///
/// Collected slots are reset (dropping their outgoing references) and kept
/// for reuse by later allocations.
pub trait Reset {
    fn reset(&mut self);
}

// ============================================================================
// Handle scopes - the root registry
// ============================================================================

type RootStack<T> = Rc<RefCell<Vec<Gc<T>>>>;

/// A raw reference registered in the root registry.
///
/// The handle stays valid until the scope that created it is dropped or
/// flushed to a marker taken before the handle was created.
pub struct Handle<T> {
    slot: u32,
    gc: Gc<T>,
}

impl<T> Handle<T> {
    /// The registered reference
    pub fn get(&self) -> Gc<T> {
        self.gc
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle(@{} {:?})", self.slot, self.gc)
    }
}

/// A checkpoint inside a [`HandleScope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    depth: usize,
}

/// A stack-discipline region of the root registry.
///
/// Every handle created through the scope is released when the scope is
/// dropped. Scopes must be dropped in the reverse order of creation.
pub struct HandleScope<T> {
    roots: RootStack<T>,
    base: usize,
}

impl<T> HandleScope<T> {
    fn new(roots: RootStack<T>) -> Self {
        let base = roots.borrow().len();
        Self { roots, base }
    }

    /// Register a reference, keeping its target alive while the handle is live
    pub fn handle(&self, gc: Gc<T>) -> Handle<T> {
        let mut roots = self.roots.borrow_mut();
        let slot = roots.len() as u32;
        roots.push(gc);
        Handle { slot, gc }
    }

    /// Take a checkpoint at the current registry depth
    pub fn marker(&self) -> Marker {
        Marker {
            depth: self.roots.borrow().len(),
        }
    }

    /// Release every handle registered after `marker`. Safe to call repeatedly.
    pub fn flush(&self, marker: Marker) {
        debug_assert!(marker.depth >= self.base, "marker from an outer scope");
        self.roots
            .borrow_mut()
            .truncate(marker.depth.max(self.base));
    }

    /// Number of handles currently registered through this scope
    pub fn len(&self) -> usize {
        self.roots.borrow().len().saturating_sub(self.base)
    }

    /// Check if this scope holds no handles
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Drop for HandleScope<T> {
    fn drop(&mut self) {
        if let Ok(mut roots) = self.roots.try_borrow_mut() {
            roots.truncate(self.base);
        }
    }
}

// ============================================================================
// Heap
// ============================================================================

/// Default threshold: collect after this many allocations
pub const DEFAULT_GC_THRESHOLD: usize = 100;

/// Chunk capacity: objects per chunk (matches the 256-bit ChunkBitmask)
const CHUNK_CAPACITY: usize = 256;

/// Internal storage for a GC-managed object
struct Slot<T> {
    /// Bumped every time the slot is collected, invalidating old `Gc`s
    generation: u32,
    data: T,
    live: bool,
}

/// The managed heap.
pub struct Heap<T: Traceable + Reset> {
    /// Chunks of slots. Each chunk has fixed capacity (CHUNK_CAPACITY).
    chunks: Vec<Vec<Slot<T>>>,
    /// Indices of collected slots available for reuse
    free_list: Vec<u32>,
    /// Per-chunk mark bits
    marked_chunks: Vec<ChunkBitmask>,
    /// Persistent mark stack reused between collections
    mark_stack: Vec<u32>,
    /// Scoped roots, shared with every open HandleScope
    registry: RootStack<T>,
    /// Persistent roots with a registration count, keyed by slot index
    persistent: FxHashMap<u32, (Gc<T>, usize)>,
    allocs_since_gc: usize,
    /// Threshold for triggering collection (0 = never auto-collect)
    gc_threshold: usize,
    collections: usize,
}

/// Statistics about the garbage collector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcStats {
    /// Total number of slots (live and free)
    pub total_slots: usize,
    /// Number of live objects
    pub live_objects: usize,
    /// Number of free slots available for reuse
    pub free_slots: usize,
    /// Handles currently registered in the root registry
    pub registered_handles: usize,
    /// Distinct persistent roots
    pub persistent_roots: usize,
    /// Collections run so far
    pub collections: usize,
}

#[inline]
fn split_index(index: u32) -> (usize, usize) {
    let index = index as usize;
    (index / CHUNK_CAPACITY, index % CHUNK_CAPACITY)
}

impl<T: Traceable + Reset> Heap<T> {
    /// Create a new heap
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_GC_THRESHOLD)
    }

    /// Create a new heap with the given collection threshold
    pub fn with_threshold(gc_threshold: usize) -> Self {
        Self {
            chunks: Vec::new(),
            free_list: Vec::new(),
            marked_chunks: Vec::new(),
            mark_stack: Vec::new(),
            registry: Rc::new(RefCell::new(Vec::new())),
            persistent: FxHashMap::default(),
            allocs_since_gc: 0,
            gc_threshold,
            collections: 0,
        }
    }

    /// Open a new handle scope on top of the registry
    pub fn open_scope(&self) -> HandleScope<T> {
        HandleScope::new(self.registry.clone())
    }

    /// Allocate a new object and register it in `scope`.
    ///
    /// May run a collection before the object is placed: every reference the
    /// caller still needs must already be rooted.
    pub fn alloc(&mut self, scope: &HandleScope<T>, data: T) -> Handle<T> {
        debug_assert!(
            Rc::ptr_eq(&scope.roots, &self.registry),
            "scope belongs to another heap"
        );
        if self.gc_threshold > 0 && self.allocs_since_gc >= self.gc_threshold {
            self.collect();
        }
        let gc = self.place(data);
        self.allocs_since_gc += 1;
        scope.handle(gc)
    }

    fn place(&mut self, data: T) -> Gc<T> {
        if let Some(index) = self.free_list.pop() {
            let (chunk_idx, in_chunk) = split_index(index);
            if let Some(slot) = self
                .chunks
                .get_mut(chunk_idx)
                .and_then(|chunk| chunk.get_mut(in_chunk))
            {
                slot.data = data;
                slot.live = true;
                return Gc::new(index, slot.generation);
            }
        }

        let need_new_chunk = self
            .chunks
            .last()
            .is_none_or(|chunk| chunk.len() >= CHUNK_CAPACITY);
        if need_new_chunk {
            self.chunks.push(Vec::with_capacity(CHUNK_CAPACITY));
            self.marked_chunks.push(ChunkBitmask::default());
        }
        let chunk_idx = self.chunks.len() - 1;
        let mut index = 0;
        if let Some(chunk) = self.chunks.last_mut() {
            index = (chunk_idx * CHUNK_CAPACITY + chunk.len()) as u32;
            chunk.push(Slot {
                generation: 0,
                data,
                live: true,
            });
        }
        Gc::new(index, 0)
    }

    fn slot(&self, gc: Gc<T>) -> Option<&Slot<T>> {
        let (chunk_idx, in_chunk) = split_index(gc.index);
        self.chunks
            .get(chunk_idx)?
            .get(in_chunk)
            .filter(|slot| slot.live && slot.generation == gc.generation)
    }

    /// Borrow a live object
    pub fn get(&self, gc: Gc<T>) -> Option<&T> {
        self.slot(gc).map(|slot| &slot.data)
    }

    /// Mutably borrow a live object
    pub fn get_mut(&mut self, gc: Gc<T>) -> Option<&mut T> {
        let (chunk_idx, in_chunk) = split_index(gc.index);
        self.chunks
            .get_mut(chunk_idx)?
            .get_mut(in_chunk)
            .filter(|slot| slot.live && slot.generation == gc.generation)
            .map(|slot| &mut slot.data)
    }

    /// Whether `gc` still refers to a live object
    pub fn is_live(&self, gc: Gc<T>) -> bool {
        self.slot(gc).is_some()
    }

    /// Whether `handle` is still registered (its scope was not flushed past it)
    pub fn is_registered(&self, handle: &Handle<T>) -> bool {
        self.registry.borrow().get(handle.slot as usize) == Some(&handle.gc)
    }

    /// Current depth of the root registry
    pub fn registry_depth(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Add a persistent root. Roots are counted; each `add_root` needs a
    /// matching `remove_root`.
    pub fn add_root(&mut self, gc: Gc<T>) {
        self.persistent
            .entry(gc.index)
            .and_modify(|(_, count)| *count += 1)
            .or_insert((gc, 1));
    }

    /// Remove one registration of a persistent root
    pub fn remove_root(&mut self, gc: Gc<T>) {
        let remove = match self.persistent.get_mut(&gc.index) {
            Some((root, count)) if *root == gc => {
                *count -= 1;
                *count == 0
            }
            _ => false,
        };
        if remove {
            self.persistent.remove(&gc.index);
        }
    }

    /// Run a full mark-and-sweep collection. Returns the number of objects freed.
    pub fn collect(&mut self) -> usize {
        self.mark();
        let collected = self.sweep();
        self.allocs_since_gc = 0;
        self.collections += 1;
        tracing::debug!(
            collected,
            live = self.live_count(),
            roots = self.registry.borrow().len() + self.persistent.len(),
            "gc: collection finished"
        );
        collected
    }

    /// Mark phase: trace from roots to find all reachable objects
    fn mark(&mut self) {
        for bitmask in &mut self.marked_chunks {
            bitmask.clear();
        }

        let mut stack = std::mem::take(&mut self.mark_stack);
        stack.clear();

        for gc in self.registry.borrow().iter() {
            if self.is_live(*gc) {
                stack.push(gc.index);
            }
        }
        for (gc, _) in self.persistent.values() {
            if self.is_live(*gc) {
                stack.push(gc.index);
            }
        }

        let chunks = &self.chunks;
        let marked = &mut self.marked_chunks;
        while let Some(index) = stack.pop() {
            let (chunk_idx, in_chunk) = split_index(index);
            match marked.get_mut(chunk_idx) {
                Some(bitmask) if !bitmask.get(in_chunk) => bitmask.set(in_chunk),
                _ => continue,
            }
            let Some(slot) = chunks.get(chunk_idx).and_then(|c| c.get(in_chunk)) else {
                continue;
            };
            slot.data.trace(|child: Gc<T>| {
                let (c, i) = split_index(child.index);
                let live = chunks
                    .get(c)
                    .and_then(|chunk| chunk.get(i))
                    .is_some_and(|s| s.live && s.generation == child.generation);
                if live {
                    stack.push(child.index);
                }
            });
        }

        self.mark_stack = stack;
    }

    /// Sweep phase: reset and free all unmarked objects
    fn sweep(&mut self) -> usize {
        let mut collected = 0;
        for (chunk_idx, (chunk, bitmask)) in self
            .chunks
            .iter_mut()
            .zip(self.marked_chunks.iter())
            .enumerate()
        {
            let len = chunk.len();
            for in_chunk in bitmask.iter_unmarked(len) {
                if let Some(slot) = chunk.get_mut(in_chunk) {
                    if slot.live {
                        slot.data.reset();
                        slot.live = false;
                        slot.generation = slot.generation.wrapping_add(1);
                        self.free_list
                            .push((chunk_idx * CHUNK_CAPACITY + in_chunk) as u32);
                        collected += 1;
                    }
                }
            }
        }
        collected
    }

    fn live_count(&self) -> usize {
        self.chunks
            .iter()
            .map(|chunk| chunk.iter().filter(|slot| slot.live).count())
            .sum()
    }

    /// Get statistics
    pub fn stats(&self) -> GcStats {
        let total_slots: usize = self.chunks.iter().map(|c| c.len()).sum();
        GcStats {
            total_slots,
            live_objects: self.live_count(),
            free_slots: self.free_list.len(),
            registered_handles: self.registry.borrow().len(),
            persistent_roots: self.persistent.len(),
            collections: self.collections,
        }
    }

    /// Get the current collection threshold
    pub fn gc_threshold(&self) -> usize {
        self.gc_threshold
    }

    /// Set the GC threshold (0 = disable automatic collection)
    pub fn set_gc_threshold(&mut self, threshold: usize) {
        self.gc_threshold = threshold;
    }
}

impl<T: Traceable + Reset> Default for Heap<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
