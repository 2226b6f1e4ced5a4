/// Growable slot storage addressed by `i32` indices.
///
/// Erased slots are remembered and handed out again by [`List::insert`].
/// The list doubles as the LIFO stack used by the iterative traversals.
#[derive(Clone, Debug)]
pub struct List<T> {
    data: Vec<T>,
    vacant: Vec<i32>,
}

impl<T> List<T>
where
    T: Default,
{
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            vacant: Vec::new(),
        }
    }

    /// Number of slots in use or vacant.
    pub fn size(&self) -> i32 {
        self.data.len() as i32
    }

    pub fn contains(&self, index: i32) -> bool {
        index >= 0 && (index as usize) < self.data.len() && !self.vacant.contains(&index)
    }

    pub fn get(&self, index: i32) -> &T {
        debug_assert!(index < self.size());
        &self.data[index as usize]
    }

    pub fn get_mut(&mut self, index: i32) -> &mut T {
        debug_assert!(index < self.size());
        &mut self.data[index as usize]
    }

    pub fn push(&mut self, element: T) -> i32 {
        let index = self.size();
        self.data.push(element);
        index
    }

    pub fn pop(&mut self) -> Option<T> {
        self.data.pop()
    }

    /// Stores `element`, reusing an erased slot when one is available.
    pub fn insert(&mut self, element: T) -> i32 {
        if let Some(index) = self.vacant.pop() {
            self.data[index as usize] = element;
            return index;
        }
        self.push(element)
    }

    /// Takes the element out of its slot and marks the slot for reuse.
    pub fn erase(&mut self, index: i32) -> T {
        self.vacant.push(index);
        std::mem::take(&mut self.data[index as usize])
    }
}

impl<T> Default for List<T>
where
    T: Default,
{
    fn default() -> Self {
        Self::new()
    }
}
