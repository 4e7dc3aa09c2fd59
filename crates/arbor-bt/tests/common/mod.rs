#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use arbor_bt::{Action, ActionStatus, LeafContext, Result};

#[derive(Debug, Default)]
pub struct Tally {
    /// Ticks over the leaf's whole life.
    pub ticks: u32,
    /// Ticks since the last initialize.
    pub run_ticks: u32,
    pub inits: u32,
    pub cancels: u32,
}

#[derive(Debug, Clone, Default)]
pub struct TallyHandle(Rc<RefCell<Tally>>);

impl TallyHandle {
    pub fn ticks(&self) -> u32 {
        self.0.borrow().ticks
    }

    pub fn run_ticks(&self) -> u32 {
        self.0.borrow().run_ticks
    }

    pub fn inits(&self) -> u32 {
        self.0.borrow().inits
    }

    pub fn cancels(&self) -> u32 {
        self.0.borrow().cancels
    }
}

/// Leaf that replays a fixed list of outcomes, one per tick, and repeats the
/// last one forever once the list is used up.
pub struct Scripted {
    script: Vec<ActionStatus>,
    tally: TallyHandle,
}

impl Scripted {
    pub fn new(script: &[ActionStatus]) -> (Self, TallyHandle) {
        assert!(!script.is_empty(), "script needs at least one outcome");
        let tally = TallyHandle::default();
        (
            Self {
                script: script.to_vec(),
                tally: tally.clone(),
            },
            tally,
        )
    }

    pub fn always(status: ActionStatus) -> (Self, TallyHandle) {
        Self::new(&[status])
    }
}

impl Action for Scripted {
    fn initialize(&mut self, _ctx: &mut LeafContext<'_>) -> Result<()> {
        let mut tally = self.tally.0.borrow_mut();
        tally.inits += 1;
        tally.run_ticks = 0;
        Ok(())
    }

    fn tick(&mut self, _ctx: &mut LeafContext<'_>) -> Result<ActionStatus> {
        let mut tally = self.tally.0.borrow_mut();
        let index = (tally.ticks as usize).min(self.script.len() - 1);
        tally.ticks += 1;
        tally.run_ticks += 1;
        Ok(self.script[index])
    }

    fn cancel(&mut self, _ctx: &mut LeafContext<'_>) {
        self.tally.0.borrow_mut().cancels += 1;
    }
}

pub use ActionStatus::{Failure as F, Running as R, Success as S};
