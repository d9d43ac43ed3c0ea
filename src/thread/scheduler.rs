//! The thread table, ready queue, and every operation that moves a thread
//! between them: `spawn`, `yield_now`, `exit`, `join`/`join_any`,
//! `fork_to_user`, `jump_to_user` and the condition-variable primitives.
//! This is the Rust counterpart of `thread.c` in its entirety; `mod.rs`
//! just re-exports the free functions defined here as the module's public
//! surface.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use lazy_static::lazy_static;
use spin::Mutex;

use crate::arch;
use crate::config::{IDLE_TID, MAIN_TID, NTHR};
use crate::platform::{self, AddressSpaceTag};
use crate::thread::condition::Condition;
use crate::thread::idle;
use crate::thread::kernel_stack::KernelStack;
use crate::thread::list::ThreadList;
use crate::thread::types::{Thread, ThreadId, ThreadState};

/// Routine the trap subsystem (an external collaborator, per `spec.md`
/// §1) registers with [`set_trap_return`] to actually transition from
/// supervisor back to user mode. `jump_to_user` and `fork_child_trampoline`
/// both terminate by calling into it; neither ever returns, matching a
/// real trap-return instruction.
pub type TrapReturn = extern "C" fn(&mut arch::active::TrapFrame) -> !;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadError {
    /// `id` outside `[1, NTHR)` or naming an empty slot.
    InvalidId,
    /// Caller is not `id`'s parent.
    NotParent,
}

impl fmt::Display for ThreadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadError::InvalidId => write!(f, "invalid thread id"),
            ThreadError::NotParent => write!(f, "caller is not that thread's parent"),
        }
    }
}

struct Scheduler {
    threads: [Option<Box<Thread>>; NTHR],
    ready_list: ThreadList,
    current: ThreadId,
    /// Set immediately before every raw context switch to the thread
    /// being switched away from. Because exactly one thread runs at a
    /// time, the very next code to execute after a `swtch` call is the
    /// resuming thread reading this field - always the thread that just
    /// gave it the CPU - which is what lets `reap_predecessor` stand in
    /// for `_thread_swtch`'s register-based return-of-identity.
    last_switched_from: Option<ThreadId>,
    trap_return: Option<TrapReturn>,
}

impl Scheduler {
    fn empty() -> Self {
        Scheduler {
            threads: Default::default(),
            ready_list: ThreadList::new(),
            current: ThreadId(MAIN_TID),
            last_switched_from: None,
            trap_return: None,
        }
    }

    fn thread(&self, id: ThreadId) -> &Thread {
        self.threads[id.as_usize()].as_deref().expect("reference to empty thread slot")
    }

    fn thread_mut(&mut self, id: ThreadId) -> &mut Thread {
        self.threads[id.as_usize()].as_deref_mut().expect("reference to empty thread slot")
    }

    fn find_free_slot(&self) -> Option<usize> {
        (1..NTHR - 1).find(|&i| self.threads[i].is_none())
    }

    /// `suspend_self`'s scheduling decision: pick the next ready thread,
    /// demote the outgoing one to `Ready` if it is still `Running`
    /// (a voluntary yield - callers that are already `Waiting`/`Exited`
    /// leave that state alone), and hand back raw pointers to both
    /// contexts plus an address-space tag to switch to, if it differs.
    fn pick_next_and_prepare(&mut self) -> (*mut arch::active::Context, *const arch::active::Context, Option<AddressSpaceTag>) {
        assert!(!self.ready_list.is_empty(), "suspend_self: ready list is empty");
        let next_id = self.ready_list.remove().expect("checked nonempty above");
        let cur_id = self.current;

        if self.thread(cur_id).state == ThreadState::Running {
            self.thread_mut(cur_id).state = ThreadState::Ready;
            self.ready_list.insert(cur_id);
        }
        self.thread_mut(next_id).state = ThreadState::Running;

        let cur_proc = self.thread(cur_id).process;
        let next_proc = self.thread(next_id).process;
        self.last_switched_from = Some(cur_id);
        self.current = next_id;

        let old_ptr = &mut self.thread_mut(cur_id).context as *mut arch::active::Context;
        let new_ptr = &self.thread(next_id).context as *const arch::active::Context;
        let space = if next_proc != cur_proc { Some(next_proc) } else { None };
        (old_ptr, new_ptr, space)
    }
}

lazy_static! {
    static ref SCHEDULER: Mutex<Scheduler> = Mutex::new(Scheduler::empty());
}

/// # Safety
/// Obtains a raw pointer to a thread's embedded `child_exit` condition so
/// it can be passed to [`condition_wait`]/[`condition_broadcast`] without
/// holding `SCHEDULER` re-entrantly. Sound only because this crate never
/// runs two threads at once: nothing can touch the pointee between this
/// call returning and the pointer being dereferenced a few lines later.
fn child_exit_ptr(id: ThreadId) -> *mut Condition {
    let mut sched = SCHEDULER.lock();
    &mut sched.thread_mut(id).child_exit as *mut Condition
}

fn suspend_self() {
    let (old_ptr, new_ptr, space) = { SCHEDULER.lock().pick_next_and_prepare() };
    if let Some(tag) = space {
        platform::active::space_switch(tag);
    }
    platform::active::intr_enable();
    unsafe { arch::active::swtch(old_ptr, new_ptr) };
    reap_predecessor();
}

/// Frees the kernel stack of whichever thread this one just displaced, if
/// that thread has since exited. A thread can never free its own stack
/// while running on it, so this is always done by the successor.
fn reap_predecessor() {
    let mut sched = SCHEDULER.lock();
    if let Some(pred) = sched.last_switched_from {
        if let Some(slot) = sched.threads[pred.as_usize()].as_mut() {
            if slot.state == ThreadState::Exited {
                if let Some(stack) = slot.stack.as_mut() {
                    stack.free();
                }
            }
        }
    }
}

pub(crate) fn ready_queue_nonempty() -> bool {
    !SCHEDULER.lock().ready_list.is_empty()
}

/// Populates the `main` slot with the calling context and spawns `idle`,
/// discarding any previously initialized state first. Production boot
/// code calls this exactly once; tests call it once per `#[test]` to get
/// a clean thread table, since `SCHEDULER` is otherwise a persistent
/// process-wide global.
pub fn init(main_name: &str) {
    let mut sched = SCHEDULER.lock();
    for slot in sched.threads.iter_mut() {
        *slot = None;
    }
    sched.ready_list.clear();
    sched.last_switched_from = None;
    sched.trap_return = None;

    let process = AddressSpaceTag(0);
    let main = Thread {
        context: arch::active::Context::zeroed(),
        name: String::from(main_name),
        stack: None,
        state: ThreadState::Running,
        id: ThreadId(MAIN_TID),
        process,
        parent: None,
        child_exit: Condition::new("child_exit"),
        entry: None,
        trapframe: Default::default(),
    };
    sched.threads[MAIN_TID] = Some(Box::new(main));
    sched.current = ThreadId(MAIN_TID);

    let idle_id = ThreadId(IDLE_TID);
    let idle_stack = KernelStack::alloc(idle_id);
    let idle_context = arch::active::Context::for_entry(idle_stack.top(), thread_entry_trampoline);
    let idle_thread = Thread::new(
        idle_id,
        String::from("idle"),
        Some(ThreadId(MAIN_TID)),
        process,
        idle_stack,
        idle_context,
        Some(Box::new(idle::idle_loop)),
    );
    sched.threads[IDLE_TID] = Some(Box::new(idle_thread));
    sched.ready_list.insert(idle_id);
    log::info!("thread core initialized, main={main_name:?}");
}

/// Entry point written into every freshly spawned thread's context.
/// Recovers the entry closure stashed by `spawn`/`init` and runs it, then
/// falls through to `exit` if it returns - the same "call entry, then
/// terminate" shape as `process_entry_trampoline` in the teacher.
pub extern "C" fn thread_entry_trampoline() -> ! {
    let entry = {
        let mut sched = SCHEDULER.lock();
        let id = sched.current;
        sched.thread_mut(id).entry.take()
    };
    if let Some(f) = entry {
        f();
    }
    exit()
}

/// Entry point for a thread created by `fork_to_user`, once first
/// scheduled: hands its own trap frame (already primed with `a0 == 0`) to
/// the registered trap-return routine.
pub extern "C" fn fork_child_trampoline() -> ! {
    let (hook, mut frame) = {
        let sched = SCHEDULER.lock();
        let id = sched.current;
        (sched.trap_return, sched.thread(id).trapframe)
    };
    match hook {
        Some(hook) => hook(&mut frame),
        None => {
            log::error!("fork_child_trampoline: no trap-return routine registered");
            panic!("fork_child_trampoline: no trap-return routine registered");
        }
    }
}

pub fn spawn<F>(name: &str, f: F) -> ThreadId
where
    F: FnOnce() + Send + 'static,
{
    let saved = platform::active::intr_disable();
    let id = {
        let mut sched = SCHEDULER.lock();
        let slot = sched.find_free_slot().unwrap_or_else(|| {
            log::error!("thread_spawn: no free thread slot");
            panic!("Too many threads")
        });
        let id = ThreadId(slot);
        let stack = KernelStack::alloc(id);
        let context = arch::active::Context::for_entry(stack.top(), thread_entry_trampoline);
        let parent = sched.current;
        let process = sched.thread(parent).process;
        let thread = Thread::new(id, String::from(name), Some(parent), process, stack, context, Some(Box::new(f)));
        sched.threads[slot] = Some(Box::new(thread));
        sched.ready_list.insert(id);
        log::debug!("spawn {name:?} -> {id}");
        id
    };
    unsafe { platform::active::intr_restore(saved) };
    id
}

pub fn yield_now() {
    let saved = platform::active::intr_disable();
    {
        let sched = SCHEDULER.lock();
        assert_eq!(sched.thread(sched.current).state, ThreadState::Running, "yield_now: caller not running");
    }
    suspend_self();
    unsafe { platform::active::intr_restore(saved) };
}

pub fn exit() -> ! {
    let saved = platform::active::intr_disable();
    let parent = {
        let mut sched = SCHEDULER.lock();
        let id = sched.current;
        if id == ThreadId(MAIN_TID) {
            log::info!("main thread exited");
            loop {
                platform::active::wait_for_interrupt();
            }
        }
        sched.thread_mut(id).state = ThreadState::Exited;
        log::debug!("{id} exited");
        sched.thread(id).parent
    };
    if let Some(parent) = parent {
        condition_broadcast(unsafe { &mut *child_exit_ptr(parent) });
    }
    suspend_self();
    unsafe { platform::active::intr_restore(saved) };
    panic!("thread_exit: suspend_self returned")
}

/// Scans the table for a child of the caller that has already exited; if
/// none has, blocks on the caller's own `child_exit` until one does.
/// Fatal if the caller has no children at all, mirroring the original's
/// "thread_join_any called by childless thread" panic.
pub fn join_any() -> ThreadId {
    let caller = running();
    loop {
        let exited = {
            let sched = SCHEDULER.lock();
            sched
                .threads
                .iter()
                .flatten()
                .find(|t| t.parent == Some(caller) && t.state == ThreadState::Exited)
                .map(|t| t.id)
        };
        if let Some(id) = exited {
            return recycle(id);
        }
        let has_child = {
            let sched = SCHEDULER.lock();
            sched.threads.iter().any(|slot| slot.as_ref().is_some_and(|t| t.parent == Some(caller)))
        };
        if !has_child {
            log::error!("thread_join_any: called by childless thread");
            panic!("thread_join_any called by childless thread");
        }
        condition_wait(unsafe { &mut *child_exit_ptr(caller) });
    }
}

/// Waits for a specific child to exit, then recycles it.
pub fn join(id: ThreadId) -> Result<ThreadId, ThreadError> {
    let caller = running();
    if id.as_usize() == 0 || id.as_usize() >= NTHR {
        return Err(ThreadError::InvalidId);
    }
    loop {
        let state = {
            let sched = SCHEDULER.lock();
            match sched.threads[id.as_usize()].as_ref() {
                None => return Err(ThreadError::InvalidId),
                Some(t) if t.parent != Some(caller) => return Err(ThreadError::NotParent),
                Some(t) => t.state,
            }
        };
        if state == ThreadState::Exited {
            return Ok(recycle(id));
        }
        condition_wait(unsafe { &mut *child_exit_ptr(caller) });
    }
}

/// Reparents `id`'s surviving children to `main`, clears its table slot
/// (dropping the `Thread` - its kernel stack, if not already freed by
/// `reap_predecessor`, is released here too, but by this point the
/// successor that displaced it has always already done so).
fn recycle(id: ThreadId) -> ThreadId {
    let mut sched = SCHEDULER.lock();
    let main = ThreadId(MAIN_TID);
    for slot in sched.threads.iter_mut().flatten() {
        if slot.parent == Some(id) {
            slot.parent = Some(main);
        }
    }
    sched.threads[id.as_usize()] = None;
    log::debug!("recycled {id}");
    id
}

/// Creates a child that will resume as though returning from the same
/// trap `parent_trap_frame` was captured from, but with `a0` forced to
/// `0` (the parent's own return value - `child_id` - is simply this
/// function's return, left for the caller to place in its own trap frame).
///
/// This crate does not model per-process virtual memory (the memory
/// manager is an external collaborator per `spec.md` §1), so unlike the
/// original it does not byte-copy the parent's live kernel stack into the
/// child's and resume a shared continuation across that copy - there is
/// no guarantee here that the two stacks are mapped at addresses where
/// such a copied continuation would even be valid. Instead the child is
/// given its own fresh kernel stack and resumes through
/// `fork_child_trampoline`, which reaches the same observable outcome
/// (child sees `a0 == 0`) without depending on identical virtual
/// addressing across address spaces.
pub fn fork_to_user(child_proc: AddressSpaceTag, parent_trap_frame: arch::active::TrapFrame) -> ThreadId {
    let saved = platform::active::intr_disable();
    let child_id = {
        let mut sched = SCHEDULER.lock();
        let slot = sched.find_free_slot().unwrap_or_else(|| {
            log::error!("thread_fork_to_user: no free thread slot");
            panic!("Too many threads")
        });
        let id = ThreadId(slot);
        let stack = KernelStack::alloc(id);
        let context = arch::active::Context::for_entry(stack.top(), fork_child_trampoline);
        let parent = sched.current;
        let mut thread = Thread::new(id, String::from("fork"), Some(parent), child_proc, stack, context, None);
        let mut frame = parent_trap_frame;
        frame.set_a0(0);
        thread.trapframe = frame;
        sched.threads[slot] = Some(Box::new(thread));
        sched.ready_list.insert(id);
        log::debug!("fork_to_user -> {id}");
        id
    };
    unsafe { platform::active::intr_restore(saved) };
    child_id
}

/// Installs the routine `jump_to_user`/`fork_child_trampoline` call into
/// to actually resume user-mode execution. Owned by the trap subsystem,
/// an external collaborator per `spec.md` §1; the thread core only holds
/// the pointer.
pub fn set_trap_return(hook: TrapReturn) {
    SCHEDULER.lock().trap_return = Some(hook);
}

/// Hands off to the registered trap-return routine with a trap frame
/// primed for `(usp, upc)`. Never returns - a successful jump to user
/// mode only comes back to the kernel through a later trap.
pub fn jump_to_user(usp: u64, upc: u64) -> ! {
    let hook = SCHEDULER
        .lock()
        .trap_return
        .unwrap_or_else(|| panic!("jump_to_user: no trap-return routine registered"));
    let mut frame = arch::active::TrapFrame::default();
    frame.set_sp(usp);
    frame.set_pc(upc);
    hook(&mut frame)
}

pub fn running() -> ThreadId {
    SCHEDULER.lock().current
}

pub fn name(id: ThreadId) -> String {
    SCHEDULER.lock().thread(id).name.clone()
}

pub fn process(id: ThreadId) -> AddressSpaceTag {
    SCHEDULER.lock().thread(id).process
}

pub fn set_process(id: ThreadId, proc: AddressSpaceTag) {
    SCHEDULER.lock().thread_mut(id).process = proc;
}

/// Blocks the caller on `cond`. Requires the caller be `Running`.
pub fn condition_wait(cond: &mut Condition) {
    let saved = platform::active::intr_disable();
    {
        let mut sched = SCHEDULER.lock();
        let cur_id = sched.current;
        assert_eq!(sched.thread(cur_id).state, ThreadState::Running, "condition_wait: caller not running");
        sched.thread_mut(cur_id).state = ThreadState::Waiting;
        cond.wait_list.insert(cur_id);
    }
    suspend_self();
    unsafe { platform::active::intr_restore(saved) };
}

/// Wakes every waiter on `cond`, in FIFO order, appending them to the
/// ready queue in one step.
pub fn condition_broadcast(cond: &mut Condition) {
    let saved = platform::active::intr_disable();
    {
        let mut sched = SCHEDULER.lock();
        for id in cond.wait_list.iter() {
            let t = sched.thread_mut(id);
            debug_assert_eq!(t.state, ThreadState::Waiting);
            t.state = ThreadState::Ready;
        }
        sched.ready_list.append(&mut cond.wait_list);
        log::trace!("broadcast {}", cond.name());
    }
    unsafe { platform::active::intr_restore(saved) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::SCHEDULER_TEST_LOCK;

    /// T5: the parent's syscall return is the child id, the child's is 0.
    #[test]
    fn fork_to_user_zeroes_child_a0_and_returns_child_id() {
        let _guard = SCHEDULER_TEST_LOCK.lock();
        init("main");
        let parent = running();
        let parent_frame = arch::active::TrapFrame::new(42);

        let child_id = fork_to_user(AddressSpaceTag(0), parent_frame);

        assert_ne!(child_id, parent);
        let stored = SCHEDULER.lock().thread(child_id).trapframe;
        assert_eq!(stored.a0(), 0);
    }
}
