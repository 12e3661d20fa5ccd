//! Selection tracking and deferred scroll-to-selection
//!
//! A selection change moves the controller to `SelectionChanged`. Once a walk
//! shows the selected node as active, one scroll is scheduled `delay` later and
//! the controller is `ScrollPending`. Polling past the deadline performs the
//! scroll (or skips it when the node has no mounted anchor) and returns to
//! `Idle`.
//!
//! Every selection gets a fresh [`SelectionTicket`]; a scheduled scroll carries
//! the ticket it was scheduled for and is dropped if the ticket is no longer
//! current, so a superseded selection can never scroll.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::domain::{NodeId, TreeNode, ViewNode};
use crate::infrastructure::traits::AnchorLookup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    #[default]
    Smooth,
    Instant,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBlock {
    Start,
    Center,
    End,
    #[default]
    Nearest,
}

/// How an anchor is brought into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScrollOptions {
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

pub const DEFAULT_SCROLL_DELAY: Duration = Duration::from_millis(500);

/// Identity of one selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectionTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    Idle,
    SelectionChanged,
    ScrollPending,
}

/// Current selection context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub node: TreeNode,
    pub parent: TreeNode,
    pub ticket: SelectionTicket,
}

#[derive(Debug, Clone)]
struct ScheduledScroll {
    ticket: SelectionTicket,
    target: NodeId,
    due: Instant,
}

/// Result of polling the scroll schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// Nothing scheduled
    Idle,
    /// Scheduled but the deadline has not passed
    NotDue,
    Scrolled(NodeId),
    /// The node has no mounted anchor; the scroll was skipped
    AnchorMissing(NodeId),
    /// The scheduled scroll belonged to an earlier selection and was dropped
    Superseded,
}

#[derive(Debug)]
pub struct SelectionController {
    selection: Option<Selection>,
    phase: SelectionPhase,
    scheduled: Option<ScheduledScroll>,
    last_ticket: u64,
    delay: Duration,
    options: ScrollOptions,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_DELAY, ScrollOptions::default())
    }
}

impl SelectionController {
    pub fn new(delay: Duration, options: ScrollOptions) -> Self {
        Self {
            selection: None,
            phase: SelectionPhase::Idle,
            scheduled: None,
            last_ticket: 0,
            delay,
            options,
        }
    }

    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn selected_id(&self) -> Option<&NodeId> {
        self.selection.as_ref().map(|s| &s.node.id)
    }

    pub fn current_ticket(&self) -> Option<SelectionTicket> {
        self.selection.as_ref().map(|s| s.ticket)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Records a new selection and supersedes any earlier one.
    #[instrument(level = "debug", skip_all, fields(node = %node.id, parent = %parent.id))]
    pub fn select(&mut self, node: TreeNode, parent: TreeNode) -> SelectionTicket {
        self.last_ticket += 1;
        let ticket = SelectionTicket(self.last_ticket);
        self.selection = Some(Selection {
            node,
            parent,
            ticket,
        });
        self.phase = SelectionPhase::SelectionChanged;
        ticket
    }

    /// Called after every walk. Schedules the scroll once the selected node
    /// shows up as active in the rendered output.
    pub fn confirm_rendered(&mut self, view: &[ViewNode<'_>], now: Instant) -> bool {
        if self.phase != SelectionPhase::SelectionChanged {
            return false;
        }
        let Some(selection) = &self.selection else {
            return false;
        };
        let rendered = view
            .iter()
            .any(|v| v.is_active && v.node.id == selection.node.id);
        if !rendered {
            trace!(node = %selection.node.id, "selection not rendered yet");
            return false;
        }
        let due = now + self.delay;
        debug!(node = %selection.node.id, delay_ms = self.delay.as_millis() as u64, "scroll scheduled");
        self.scheduled = Some(ScheduledScroll {
            ticket: selection.ticket,
            target: selection.node.id.clone(),
            due,
        });
        self.phase = SelectionPhase::ScrollPending;
        true
    }

    /// Deadline of the scheduled scroll, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduled.as_ref().map(|s| s.due)
    }

    /// Fires the scheduled scroll when it is due and still current.
    pub fn poll(&mut self, now: Instant, anchors: &dyn AnchorLookup) -> ScrollOutcome {
        let Some(scheduled) = &self.scheduled else {
            return ScrollOutcome::Idle;
        };
        if self.current_ticket() != Some(scheduled.ticket) {
            debug!(target_node = %scheduled.target, "dropping superseded scroll");
            self.scheduled = None;
            return ScrollOutcome::Superseded;
        }
        if now < scheduled.due {
            return ScrollOutcome::NotDue;
        }

        let target = scheduled.target.clone();
        self.scheduled = None;
        self.phase = SelectionPhase::Idle;
        match anchors.anchor(&target) {
            Some(anchor) => {
                debug!(node = %target, "scrolling into view");
                anchor.scroll_into_view(self.options);
                ScrollOutcome::Scrolled(target)
            }
            None => {
                trace!(node = %target, "no anchor mounted, scroll skipped");
                ScrollOutcome::AnchorMissing(target)
            }
        }
    }

    /// Forgets the selection and any scheduled scroll.
    pub fn clear(&mut self) {
        self.selection = None;
        self.scheduled = None;
        self.phase = SelectionPhase::Idle;
    }
}
