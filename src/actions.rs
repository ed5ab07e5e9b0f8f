//! Key and button binding actions.
//!
//! `Action` is the tagged argument a binding carries; `run` interprets it
//! against the engine. The heavier transitions live on `Rawm` so the test
//! suite can drive them directly.

use crate::state::Rawm;
use crate::utils;
use crate::xconn::XConn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Spawn(&'static [&'static str]),
    ToggleBar,
    FocusStack(i32),
    /// Focus the i-th (1-based) visible client in list order.
    FocusNStack(i32),
    IncNMaster(i32),
    SetMfact(f32),
    Zoom,
    /// Tag mask to view; 0 swaps back to the previous tagset.
    View(u32),
    ToggleView(u32),
    Tag(u32),
    ToggleTag(u32),
    /// Index into the layout table; `None` flips to the previous layout.
    SetLayout(Option<usize>),
    ToggleFloating,
    ToggleFullscreen,
    FocusMon(i32),
    TagMon(i32),
    KillClient,
    /// View the tags of the window owning the X input focus.
    WinView,
    /// Rename the tags of the current view via dmenu.
    NameTag,
    MoveMouse,
    ResizeMouse,
    Quit { restart: bool },
}

impl Action {
    pub fn run<X: XConn>(self, wm: &mut Rawm<X>) {
        match self {
            Action::Spawn(argv) => utils::spawn(argv, wm.conn.connection_fd()),
            Action::ToggleBar => wm.toggle_bar(),
            Action::FocusStack(i) => wm.focus_stack(i),
            Action::FocusNStack(i) => wm.focus_nstack(i),
            Action::IncNMaster(i) => wm.inc_nmaster(i),
            Action::SetMfact(f) => wm.set_mfact(f),
            Action::Zoom => wm.zoom(),
            Action::View(mask) => wm.view(mask),
            Action::ToggleView(mask) => wm.toggle_view(mask),
            Action::Tag(mask) => wm.tag(mask),
            Action::ToggleTag(mask) => wm.toggle_tag(mask),
            Action::SetLayout(idx) => wm.set_layout(idx),
            Action::ToggleFloating => wm.toggle_floating(),
            Action::ToggleFullscreen => wm.toggle_fullscreen(),
            Action::FocusMon(dir) => wm.focus_mon(dir),
            Action::TagMon(dir) => wm.tag_mon(dir),
            Action::KillClient => wm.kill_client(),
            Action::WinView => wm.win_view(),
            Action::NameTag => wm.name_tag(),
            Action::MoveMouse => wm.move_mouse(),
            Action::ResizeMouse => wm.resize_mouse(),
            Action::Quit { restart } => wm.quit(restart),
        }
    }

    /// Tag-bar bindings configured with a zero mask take the clicked tag.
    pub fn with_tag_mask(self, mask: u32) -> Action {
        match self {
            Action::View(0) => Action::View(mask),
            Action::ToggleView(0) => Action::ToggleView(mask),
            Action::Tag(0) => Action::Tag(mask),
            Action::ToggleTag(0) => Action::ToggleTag(mask),
            other => other,
        }
    }
}
