//! Condition variables: the sole blocking primitive. `wait`/`broadcast`
//! live on `Scheduler` (in `scheduler.rs`) since blocking requires picking
//! a new thread to run; this module only holds the queue itself, matching
//! `struct condition { const char *name; struct thread_list list; }`.

use super::list::ThreadList;

pub struct Condition {
    pub(crate) name: &'static str,
    pub(crate) wait_list: ThreadList,
}

impl Condition {
    pub const fn new(name: &'static str) -> Self {
        Condition { name, wait_list: ThreadList::new() }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
