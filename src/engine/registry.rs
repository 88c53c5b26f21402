//! Component Registry - Index allocation and per-component records.
//!
//! Manages the lifecycle of component indices:
//! - ID ↔ Index bidirectional mapping
//! - Free index pool for O(1) reuse
//! - Parent links (a digit cell belongs to its OTP row)
//! - Interaction flags read by the focus system (focusable, visible, tab index)

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use crate::types::ComponentType;

// =============================================================================
// Registry State
// =============================================================================

/// What the registry knows about one allocated index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRecord {
    pub id: String,
    pub component_type: ComponentType,
    pub parent: Option<usize>,
    pub focusable: bool,
    pub visible: bool,
    pub tab_index: i32,
}

impl ComponentRecord {
    fn new(id: String) -> Self {
        Self {
            id,
            component_type: ComponentType::None,
            parent: None,
            focusable: false,
            visible: true,
            tab_index: 0,
        }
    }
}

thread_local! {
    /// Map component ID to array index.
    static ID_TO_INDEX: RefCell<HashMap<String, usize>> = RefCell::new(HashMap::new());

    /// Records of currently allocated indices, ordered by index.
    static RECORDS: RefCell<BTreeMap<usize, ComponentRecord>> = RefCell::new(BTreeMap::new());

    /// Pool of freed indices for reuse.
    static FREE_INDICES: RefCell<Vec<usize>> = RefCell::new(Vec::new());

    /// Next index to allocate if pool is empty.
    static NEXT_INDEX: RefCell<usize> = const { RefCell::new(0) };

    /// Counter for generating unique IDs.
    static ID_COUNTER: RefCell<usize> = const { RefCell::new(0) };
}

// =============================================================================
// Index Allocation
// =============================================================================

/// Allocate an index for a new component.
///
/// # Arguments
/// * `id` - Optional component ID. If not provided, one is generated.
///
/// # Returns
/// The allocated index. Allocating an ID that is already live returns its index.
pub fn allocate_index(id: Option<&str>) -> usize {
    let component_id = match id {
        Some(id) => id.to_string(),
        None => ID_COUNTER.with(|counter| {
            let mut counter = counter.borrow_mut();
            let id = format!("c{}", *counter);
            *counter += 1;
            id
        }),
    };

    let existing = ID_TO_INDEX.with(|map| map.borrow().get(&component_id).copied());
    if let Some(index) = existing {
        return index;
    }

    let index = FREE_INDICES.with(|free| {
        let mut free = free.borrow_mut();
        if let Some(index) = free.pop() {
            index
        } else {
            NEXT_INDEX.with(|next| {
                let mut next = next.borrow_mut();
                let index = *next;
                *next += 1;
                index
            })
        }
    });

    ID_TO_INDEX.with(|map| {
        map.borrow_mut().insert(component_id.clone(), index);
    });
    RECORDS.with(|records| {
        records
            .borrow_mut()
            .insert(index, ComponentRecord::new(component_id));
    });

    tracing::trace!(index, "allocated component index");
    index
}

/// Release an index back to the pool.
///
/// Also releases every component whose parent is `index`.
pub fn release_index(index: usize) {
    let Some(record) = RECORDS.with(|records| records.borrow_mut().remove(&index)) else {
        return;
    };

    let children: Vec<usize> = RECORDS.with(|records| {
        records
            .borrow()
            .iter()
            .filter(|(_, child)| child.parent == Some(index))
            .map(|(&child_index, _)| child_index)
            .collect()
    });
    for child_index in children {
        release_index(child_index);
    }

    ID_TO_INDEX.with(|map| {
        map.borrow_mut().remove(&record.id);
    });
    FREE_INDICES.with(|free| {
        free.borrow_mut().push(index);
    });

    // All components gone: start numbering from zero again.
    let is_empty = RECORDS.with(|records| records.borrow().is_empty());
    if is_empty {
        FREE_INDICES.with(|free| free.borrow_mut().clear());
        NEXT_INDEX.with(|next| *next.borrow_mut() = 0);
    }

    tracing::trace!(index, "released component index");
}

// =============================================================================
// Record Accessors
// =============================================================================

fn update_record(index: usize, update: impl FnOnce(&mut ComponentRecord)) {
    RECORDS.with(|records| {
        if let Some(record) = records.borrow_mut().get_mut(&index) {
            update(record);
        }
    });
}

fn read_record<T>(index: usize, read: impl FnOnce(&ComponentRecord) -> T) -> Option<T> {
    RECORDS.with(|records| records.borrow().get(&index).map(read))
}

pub fn set_component_type(index: usize, component_type: ComponentType) {
    update_record(index, |r| r.component_type = component_type);
}

pub fn get_component_type(index: usize) -> ComponentType {
    read_record(index, |r| r.component_type).unwrap_or_default()
}

pub fn set_parent_index(index: usize, parent: Option<usize>) {
    update_record(index, |r| r.parent = parent);
}

pub fn get_parent_index(index: usize) -> Option<usize> {
    read_record(index, |r| r.parent).flatten()
}

pub fn set_focusable(index: usize, focusable: bool) {
    update_record(index, |r| r.focusable = focusable);
}

pub fn get_focusable(index: usize) -> bool {
    read_record(index, |r| r.focusable).unwrap_or(false)
}

pub fn set_visible(index: usize, visible: bool) {
    update_record(index, |r| r.visible = visible);
}

/// Unallocated indices read as invisible.
pub fn get_visible(index: usize) -> bool {
    read_record(index, |r| r.visible).unwrap_or(false)
}

pub fn set_tab_index(index: usize, tab_index: i32) {
    update_record(index, |r| r.tab_index = tab_index);
}

pub fn get_tab_index(index: usize) -> i32 {
    read_record(index, |r| r.tab_index).unwrap_or(0)
}

// =============================================================================
// Lookups
// =============================================================================

/// Get index for a component ID.
pub fn get_index(id: &str) -> Option<usize> {
    ID_TO_INDEX.with(|map| map.borrow().get(id).copied())
}

/// Get ID for an index.
pub fn get_id(index: usize) -> Option<String> {
    read_record(index, |r| r.id.clone())
}

/// Get all currently allocated indices in ascending order.
pub fn get_allocated_indices() -> Vec<usize> {
    RECORDS.with(|records| records.borrow().keys().copied().collect())
}

/// Check if an index is currently allocated.
pub fn is_allocated(index: usize) -> bool {
    RECORDS.with(|records| records.borrow().contains_key(&index))
}

/// Get the count of currently allocated components.
pub fn get_allocated_count() -> usize {
    RECORDS.with(|records| records.borrow().len())
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Reset all registry state (for testing).
pub fn reset_registry() {
    ID_TO_INDEX.with(|map| map.borrow_mut().clear());
    RECORDS.with(|records| records.borrow_mut().clear());
    FREE_INDICES.with(|free| free.borrow_mut().clear());
    NEXT_INDEX.with(|next| *next.borrow_mut() = 0);
    ID_COUNTER.with(|counter| *counter.borrow_mut() = 0);
}
