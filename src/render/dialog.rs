//! Dialog modality and popover state.
//!
//! A dialog is closed, open non-modal, or open modal. State is created the
//! first time a dialog is touched and mirrored onto the node's `open` and
//! `modal` flags so `:open` and `:modal` match. Modal and non-modal dialogs
//! keep separate stacks in open order; Escape goes to the topmost modal, then
//! the topmost auto popover, then the topmost non-modal dialog.

use std::collections::HashMap;

use tracing::debug;

use crate::dom::{Dom, NodeId};

/// Errors from dialog state transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DialogError {
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
    #[error("node is not an element in the tree")]
    UnknownNode,
}

/// Which close requests a dialog honors (`closedby` attribute).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedBy {
    /// Light dismiss and close requests.
    Any,
    /// Close requests such as Escape.
    CloseRequest,
    /// Only explicit `close()`.
    None,
}

impl ClosedBy {
    fn parse(value: &str) -> Option<ClosedBy> {
        match value.trim().to_ascii_lowercase().as_str() {
            "any" => Some(ClosedBy::Any),
            "closerequest" => Some(ClosedBy::CloseRequest),
            "none" => Some(ClosedBy::None),
            _ => None,
        }
    }
}

/// Per-dialog state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogState {
    pub open: bool,
    pub modal: bool,
    pub return_value: Option<String>,
    pub closed_by: ClosedBy,
    /// Node focused when the dialog opened modally.
    pub prior_focus: Option<NodeId>,
    /// Open order across all dialogs and popovers.
    pub sequence: u64,
}

impl Default for DialogState {
    fn default() -> Self {
        Self {
            open: false,
            modal: false,
            return_value: None,
            closed_by: ClosedBy::None,
            prior_focus: None,
            sequence: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogEventKind {
    Cancel,
    Close,
}

/// A queued dialog event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogEvent {
    pub kind: DialogEventKind,
    pub node: NodeId,
    pub cancelable: bool,
    pub default_prevented: bool,
}

/// Passed to cancel handlers, which may veto the close.
#[derive(Debug)]
pub struct CancelEvent {
    pub node: NodeId,
    default_prevented: bool,
}

impl CancelEvent {
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

pub type CancelHandler = Box<dyn FnMut(&mut CancelEvent)>;

/// Open dialogs and popovers for a session.
#[derive(Default)]
pub struct DialogManager {
    states: HashMap<NodeId, DialogState>,
    modal_stack: Vec<NodeId>,
    non_modal_stack: Vec<NodeId>,
    popover_stack: Vec<NodeId>,
    popover_sequence: HashMap<NodeId, u64>,
    cancel_handlers: HashMap<NodeId, Vec<CancelHandler>>,
    events: Vec<DialogEvent>,
    next_sequence: u64,
}

impl DialogManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `dialog` non-modally. Does nothing if it is already open.
    pub fn show(&mut self, dom: &mut Dom, dialog: NodeId) -> Result<(), DialogError> {
        if self.is_open(dom, dialog)? {
            return Ok(());
        }
        let closed_by = closed_by_attr(dom, dialog).unwrap_or(ClosedBy::None);
        let sequence = self.bump();
        let state = self.states.entry(dialog).or_default();
        state.open = true;
        state.modal = false;
        state.closed_by = closed_by;
        state.prior_focus = None;
        state.sequence = sequence;
        self.non_modal_stack.push(dialog);
        mirror(dom, dialog, true, false);
        debug!(?dialog, "dialog shown");
        Ok(())
    }

    /// Open `dialog` modally, remembering `focused` for when it closes.
    ///
    /// Fails with `InvalidState` if the dialog is already open.
    pub fn show_modal(&mut self, dom: &mut Dom, dialog: NodeId, focused: Option<NodeId>) -> Result<(), DialogError> {
        if self.is_open(dom, dialog)? {
            return Err(DialogError::InvalidState("dialog is already open"));
        }
        let closed_by = closed_by_attr(dom, dialog).unwrap_or(ClosedBy::CloseRequest);
        let sequence = self.bump();
        let state = self.states.entry(dialog).or_default();
        state.open = true;
        state.modal = true;
        state.closed_by = closed_by;
        state.prior_focus = focused;
        state.sequence = sequence;
        self.modal_stack.push(dialog);
        mirror(dom, dialog, true, true);
        debug!(?dialog, "dialog shown modal");
        Ok(())
    }

    /// Close `dialog`, queueing a `close` event.
    ///
    /// Returns the node to refocus when a modal closes. Closing a closed
    /// dialog does nothing.
    pub fn close(&mut self, dom: &mut Dom, dialog: NodeId, return_value: Option<String>) -> Result<Option<NodeId>, DialogError> {
        if !self.is_open(dom, dialog)? {
            return Ok(None);
        }
        let state = self.states.entry(dialog).or_default();
        let was_modal = state.modal;
        state.open = false;
        state.modal = false;
        if return_value.is_some() {
            state.return_value = return_value;
        }
        let refocus = state.prior_focus.take().filter(|_| was_modal);

        self.modal_stack.retain(|&n| n != dialog);
        self.non_modal_stack.retain(|&n| n != dialog);
        mirror(dom, dialog, false, false);
        if let Some(data) = dom.get_mut(dialog) {
            data.remove_attr("open");
        }
        self.events.push(DialogEvent {
            kind: DialogEventKind::Close,
            node: dialog,
            cancelable: false,
            default_prevented: false,
        });
        debug!(?dialog, "dialog closed");
        Ok(refocus)
    }

    /// Request that `dialog` close.
    ///
    /// Ignored when `closedby` is `none`. Otherwise queues a cancelable
    /// `cancel` event, runs the cancel handlers and closes unless one of them
    /// prevented it. Returns whether the dialog closed.
    pub fn cancel(&mut self, dom: &mut Dom, dialog: NodeId) -> Result<bool, DialogError> {
        if !self.is_open(dom, dialog)? {
            return Ok(false);
        }
        let closed_by = self
            .states
            .get(&dialog)
            .map(|s| s.closed_by)
            .or_else(|| closed_by_attr(dom, dialog))
            .unwrap_or(ClosedBy::None);
        if closed_by == ClosedBy::None {
            return Ok(false);
        }

        let mut event = CancelEvent {
            node: dialog,
            default_prevented: false,
        };
        if let Some(handlers) = self.cancel_handlers.get_mut(&dialog) {
            for handler in handlers.iter_mut() {
                handler(&mut event);
            }
        }
        self.events.push(DialogEvent {
            kind: DialogEventKind::Cancel,
            node: dialog,
            cancelable: true,
            default_prevented: event.default_prevented,
        });
        if event.default_prevented {
            debug!(?dialog, "dialog cancel prevented");
            return Ok(false);
        }
        self.close(dom, dialog, None)?;
        Ok(true)
    }

    /// Register a handler run on every cancel of `dialog`.
    pub fn on_cancel(&mut self, dialog: NodeId, handler: impl FnMut(&mut CancelEvent) + 'static) {
        self.cancel_handlers.entry(dialog).or_default().push(Box::new(handler));
    }

    /// Route an Escape key press. Returns the node it was sent to.
    pub fn handle_escape(&mut self, dom: &mut Dom) -> Result<Option<NodeId>, DialogError> {
        if let Some(&top) = self.modal_stack.last() {
            self.cancel(dom, top)?;
            return Ok(Some(top));
        }
        let auto_popover = self
            .popover_stack
            .iter()
            .rev()
            .copied()
            .find(|&p| dom.get(p).is_some_and(|d| is_auto_popover(&d.attr_or("popover", "auto"))));
        if let Some(popover) = auto_popover {
            self.hide_popover(dom, popover)?;
            return Ok(Some(popover));
        }
        if let Some(&top) = self.non_modal_stack.last() {
            self.cancel(dom, top)?;
            return Ok(Some(top));
        }
        Ok(None)
    }

    /// Show a popover. Does nothing if it is already showing.
    pub fn show_popover(&mut self, dom: &mut Dom, popover: NodeId) -> Result<(), DialogError> {
        let data = dom.get_mut(popover).filter(|d| d.is_element()).ok_or(DialogError::UnknownNode)?;
        if data.state.popover_open {
            return Ok(());
        }
        data.state.popover_open = true;
        let sequence = self.bump();
        self.popover_sequence.insert(popover, sequence);
        self.popover_stack.push(popover);
        debug!(?popover, "popover shown");
        Ok(())
    }

    /// Hide a popover. Does nothing if it is hidden.
    pub fn hide_popover(&mut self, dom: &mut Dom, popover: NodeId) -> Result<(), DialogError> {
        let data = dom.get_mut(popover).filter(|d| d.is_element()).ok_or(DialogError::UnknownNode)?;
        data.state.popover_open = false;
        self.popover_stack.retain(|&p| p != popover);
        self.popover_sequence.remove(&popover);
        Ok(())
    }

    /// Flip a popover. Returns whether it is now showing.
    pub fn toggle_popover(&mut self, dom: &mut Dom, popover: NodeId) -> Result<bool, DialogError> {
        let showing = dom
            .get(popover)
            .filter(|d| d.is_element())
            .ok_or(DialogError::UnknownNode)?
            .state
            .popover_open;
        if showing {
            self.hide_popover(dom, popover)?;
        } else {
            self.show_popover(dom, popover)?;
        }
        Ok(!showing)
    }

    pub fn state(&self, dialog: NodeId) -> Option<&DialogState> {
        self.states.get(&dialog)
    }

    pub fn return_value(&self, dialog: NodeId) -> Option<&str> {
        self.states.get(&dialog)?.return_value.as_deref()
    }

    /// The topmost open modal dialog.
    pub fn top_modal(&self) -> Option<NodeId> {
        self.modal_stack.last().copied()
    }

    /// Open order of a dialog or popover. Unknown nodes sort first.
    pub fn open_sequence(&self, node: NodeId) -> u64 {
        self.states
            .get(&node)
            .filter(|s| s.open)
            .map(|s| s.sequence)
            .or_else(|| self.popover_sequence.get(&node).copied())
            .unwrap_or(0)
    }

    /// Take the queued events.
    pub fn drain_events(&mut self) -> Vec<DialogEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop all state, handlers and queued events.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn is_open(&self, dom: &Dom, dialog: NodeId) -> Result<bool, DialogError> {
        let data = dom.get(dialog).filter(|d| d.is_element()).ok_or(DialogError::UnknownNode)?;
        Ok(self.states.get(&dialog).is_some_and(|s| s.open) || data.is_open())
    }

    fn bump(&mut self) -> u64 {
        self.next_sequence += 1;
        self.next_sequence
    }
}

fn closed_by_attr(dom: &Dom, dialog: NodeId) -> Option<ClosedBy> {
    dom.get(dialog)?.attr("closedby").and_then(|v| ClosedBy::parse(&v))
}

fn is_auto_popover(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "" | "auto")
}

fn mirror(dom: &mut Dom, dialog: NodeId, open: bool, modal: bool) {
    if let Some(data) = dom.get_mut(dialog) {
        data.state.open = open;
        data.state.modal = modal;
    }
}
