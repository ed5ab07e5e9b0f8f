//! Recording X transport for the test suite.
//!
//! `MockX` answers property reads from a fake window store, hands back
//! injected events, and records every protocol call so tests can assert on
//! the traffic the engine generates.

use std::collections::{HashMap, VecDeque};

use crate::xconn::{
    Atom, ButtonSpec, Col, Cur, KeySpec, Net, NormalHints, ScreenGeom, TextProp, Window,
    WindowAttr, Wm, WmHintsData, XConn, XEvent,
};

pub const ROOT: Window = Window(1);

/// Pixels per character of the fake font.
const CHAR_W: i32 = 7;
const FONT_H: i32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ConfigureWindow { win: Window, x: i32, y: i32, w: i32, h: i32, bw: i32 },
    ConfigurePassthrough(Window),
    SendConfigure(Window),
    SetBorderWidth(Window, i32),
    SetBorderColor(Window, usize, Col),
    MoveWindow(Window, i32, i32),
    MoveResizeWindow(Window, i32, i32, i32, i32),
    MapWindow(Window),
    UnmapWindow(Window),
    RaiseWindow(Window),
    RestackBelow(Window, Window),
    SetInputFocus(Window),
    RevertInputFocus,
    SelectClientInput(Window),
    KillClient(Window),
    DestroyWindow(Window),
    SendWmProtocol(Window, Wm),
    GrabServer,
    UngrabServer,
    ErrorIgnore,
    ErrorDefault,
    GrabPointer,
    UngrabPointer,
    WarpPointer(Window),
    GrabButton(Window, u32),
    GrabAnyButton(Window),
    UngrabButtons(Window),
    GrabKeys,
    UngrabKeys,
    SetClientState(Window, i64),
    SetFullscreenProp(Window, bool),
    SetActiveWindow(Window),
    DeleteActiveWindow,
    AppendClientList(Window),
    DeleteClientList,
    SetOpacity(Window, u32),
    ClearUrgency(Window),
    SetNetSupported,
    SetupRoot,
    CreateDrawable(i32, i32),
    DrawText { x: i32, w: i32, scheme: usize, text: Option<String>, pad: bool },
    DrawSquare { x: i32, filled: bool, empty: bool, scheme: usize },
    CopyBar(Window, i32),
    CreateBarWindow(i32, i32, i32, i32),
    Sync,
    DrainEnter,
}

#[derive(Debug, Clone, Default)]
pub struct MockWindow {
    pub attr: WindowAttr,
    pub net_name: Option<String>,
    pub wm_name: Option<String>,
    pub role: Option<String>,
    pub instance: Option<String>,
    pub class: Option<String>,
    pub hints: Option<NormalHints>,
    pub wm_hints: Option<WmHintsData>,
    pub transient: Option<Window>,
    pub protocols: Vec<Wm>,
    /// `_NET_WM_STATE` already carries the fullscreen atom.
    pub state_fullscreen: bool,
    /// `_NET_WM_WINDOW_TYPE` is the dialog type.
    pub dialog: bool,
    pub wm_state: Option<i64>,
}

pub struct MockX {
    pub calls: Vec<Call>,
    pub events: VecDeque<XEvent>,
    pub windows: HashMap<u64, MockWindow>,
    pub heads: Vec<ScreenGeom>,
    pub screen: (i32, i32),
    next_id: u64,
}

impl MockX {
    pub fn new(screen_w: i32, screen_h: i32, heads: Vec<ScreenGeom>) -> Self {
        MockX {
            calls: Vec::new(),
            events: VecDeque::new(),
            windows: HashMap::new(),
            heads,
            screen: (screen_w, screen_h),
            next_id: 100,
        }
    }

    pub fn add_window(&mut self, id: u64, attr: WindowAttr) -> Window {
        self.windows.insert(
            id,
            MockWindow {
                attr,
                ..Default::default()
            },
        );
        Window(id)
    }

    pub fn window_mut(&mut self, id: u64) -> &mut MockWindow {
        self.windows.entry(id).or_default()
    }

    pub fn drawn_texts(&self) -> Vec<(usize, String)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::DrawText {
                    scheme,
                    text: Some(t),
                    ..
                } => Some((*scheme, t.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| f(c)).count()
    }

    fn record(&mut self, call: Call) {
        self.calls.push(call);
    }
}

impl XConn for MockX {
    fn root(&self) -> Window {
        ROOT
    }

    fn screen_size(&self) -> (i32, i32) {
        self.screen
    }

    fn monitors(&self) -> Vec<ScreenGeom> {
        self.heads.clone()
    }

    fn atom(&self, sel: Atom) -> u64 {
        match sel {
            Atom::Net(n) => 1000 + n as u64,
            Atom::Wm(w) => 2000 + w as u64,
        }
    }

    fn next_event(&mut self) -> Option<XEvent> {
        self.events.pop_front()
    }

    fn mask_event(&mut self) -> XEvent {
        self.events
            .pop_front()
            .unwrap_or(XEvent::ButtonRelease { window: ROOT })
    }

    fn drain_enter_events(&mut self) {
        self.record(Call::DrainEnter);
    }

    fn sync(&mut self, _discard: bool) {
        self.record(Call::Sync);
    }

    fn setup_root(&mut self) {
        self.record(Call::SetupRoot);
    }

    fn set_net_supported(&mut self) {
        self.record(Call::SetNetSupported);
    }

    fn grab_keys(&mut self, _numlockmask: u32, _keys: &[KeySpec]) {
        self.record(Call::GrabKeys);
    }

    fn ungrab_keys(&mut self) {
        self.record(Call::UngrabKeys);
    }

    fn numlock_mask(&self) -> u32 {
        0
    }

    fn query_tree_children(&self, _w: Window) -> Vec<Window> {
        Vec::new()
    }

    fn query_parent(&self, _w: Window) -> Option<(Window, Window)> {
        None
    }

    fn get_window_attributes(&self, w: Window) -> Option<WindowAttr> {
        self.windows.get(&w.0).map(|mw| mw.attr)
    }

    fn get_input_focus(&self) -> Option<Window> {
        None
    }

    fn get_root_pointer(&self) -> Option<(i32, i32)> {
        Some((0, 0))
    }

    fn text_prop(&self, w: Window, which: TextProp) -> Option<String> {
        let mw = self.windows.get(&w.0)?;
        match which {
            TextProp::NetWMName => mw.net_name.clone(),
            TextProp::WMName => mw.wm_name.clone(),
            TextProp::WindowRole => mw.role.clone(),
        }
        .filter(|s| !s.is_empty())
    }

    fn class_hint(&self, w: Window) -> (Option<String>, Option<String>) {
        match self.windows.get(&w.0) {
            Some(mw) => (mw.instance.clone(), mw.class.clone()),
            None => (None, None),
        }
    }

    fn normal_hints(&self, w: Window) -> Option<NormalHints> {
        self.windows.get(&w.0).and_then(|mw| mw.hints)
    }

    fn wm_hints(&self, w: Window) -> Option<WmHintsData> {
        self.windows.get(&w.0).and_then(|mw| mw.wm_hints)
    }

    fn transient_for(&self, w: Window) -> Option<Window> {
        self.windows.get(&w.0).and_then(|mw| mw.transient)
    }

    fn atom_prop(&self, w: Window, sel: Atom) -> Option<u64> {
        let mw = self.windows.get(&w.0)?;
        match sel {
            Atom::Net(Net::WMState) if mw.state_fullscreen => {
                Some(self.atom(Atom::Net(Net::WMFullscreen)))
            }
            Atom::Net(Net::WMWindowType) if mw.dialog => {
                Some(self.atom(Atom::Net(Net::WMWindowTypeDialog)))
            }
            _ => None,
        }
    }

    fn wm_state(&self, w: Window) -> Option<i64> {
        self.windows.get(&w.0).and_then(|mw| mw.wm_state)
    }

    fn set_client_state(&mut self, w: Window, state: i64) {
        self.record(Call::SetClientState(w, state));
    }

    fn set_fullscreen_prop(&mut self, w: Window, fullscreen: bool) {
        self.record(Call::SetFullscreenProp(w, fullscreen));
    }

    fn set_active_window(&mut self, w: Window) {
        self.record(Call::SetActiveWindow(w));
    }

    fn delete_active_window(&mut self) {
        self.record(Call::DeleteActiveWindow);
    }

    fn append_client_list(&mut self, w: Window) {
        self.record(Call::AppendClientList(w));
    }

    fn delete_client_list(&mut self) {
        self.record(Call::DeleteClientList);
    }

    fn set_window_opacity(&mut self, w: Window, opacity: u32) {
        self.record(Call::SetOpacity(w, opacity));
    }

    fn clear_urgency_hint(&mut self, w: Window) {
        if let Some(mw) = self.windows.get_mut(&w.0) {
            if let Some(h) = mw.wm_hints.as_mut() {
                h.urgent = false;
            }
        }
        self.record(Call::ClearUrgency(w));
    }

    fn configure_window(&mut self, w: Window, x: i32, y: i32, width: i32, height: i32, bw: i32) {
        self.record(Call::ConfigureWindow {
            win: w,
            x,
            y,
            w: width,
            h: height,
            bw,
        });
    }

    fn configure_passthrough(
        &mut self,
        w: Window,
        _x: i32,
        _y: i32,
        _width: i32,
        _height: i32,
        _border_width: i32,
        _sibling: Window,
        _detail: i32,
        _value_mask: u64,
    ) {
        self.record(Call::ConfigurePassthrough(w));
    }

    fn send_configure_notify(
        &mut self,
        w: Window,
        _x: i32,
        _y: i32,
        _width: i32,
        _height: i32,
        _bw: i32,
    ) {
        self.record(Call::SendConfigure(w));
    }

    fn set_border_width(&mut self, w: Window, bw: i32) {
        self.record(Call::SetBorderWidth(w, bw));
    }

    fn set_border_color(&mut self, w: Window, scheme: usize, slot: Col) {
        self.record(Call::SetBorderColor(w, scheme, slot));
    }

    fn move_window(&mut self, w: Window, x: i32, y: i32) {
        self.record(Call::MoveWindow(w, x, y));
    }

    fn move_resize_window(&mut self, w: Window, x: i32, y: i32, width: i32, height: i32) {
        self.record(Call::MoveResizeWindow(w, x, y, width, height));
    }

    fn map_window(&mut self, w: Window) {
        self.record(Call::MapWindow(w));
    }

    fn unmap_window(&mut self, w: Window) {
        self.record(Call::UnmapWindow(w));
    }

    fn raise_window(&mut self, w: Window) {
        self.record(Call::RaiseWindow(w));
    }

    fn restack_below(&mut self, w: Window, sibling: Window) {
        self.record(Call::RestackBelow(w, sibling));
    }

    fn set_input_focus(&mut self, w: Window) {
        self.record(Call::SetInputFocus(w));
    }

    fn revert_input_focus(&mut self) {
        self.record(Call::RevertInputFocus);
    }

    fn select_client_input(&mut self, w: Window) {
        self.record(Call::SelectClientInput(w));
    }

    fn kill_client(&mut self, w: Window) {
        self.record(Call::KillClient(w));
    }

    fn destroy_window(&mut self, w: Window) {
        self.record(Call::DestroyWindow(w));
    }

    fn send_wm_protocol(&mut self, w: Window, proto: Wm) -> bool {
        let exists = self
            .windows
            .get(&w.0)
            .map_or(false, |mw| mw.protocols.contains(&proto));
        if exists {
            self.record(Call::SendWmProtocol(w, proto));
        }
        exists
    }

    fn grab_server(&mut self) {
        self.record(Call::GrabServer);
    }

    fn ungrab_server(&mut self) {
        self.record(Call::UngrabServer);
    }

    fn set_error_ignore(&mut self) {
        self.record(Call::ErrorIgnore);
    }

    fn set_error_default(&mut self) {
        self.record(Call::ErrorDefault);
    }

    fn grab_pointer(&mut self, _cur: Cur) -> bool {
        self.record(Call::GrabPointer);
        true
    }

    fn ungrab_pointer(&mut self) {
        self.record(Call::UngrabPointer);
    }

    fn warp_pointer(&mut self, w: Window, _x: i32, _y: i32) {
        self.record(Call::WarpPointer(w));
    }

    fn grab_button(&mut self, w: Window, _numlockmask: u32, spec: ButtonSpec) {
        self.record(Call::GrabButton(w, spec.button));
    }

    fn grab_any_button(&mut self, w: Window) {
        self.record(Call::GrabAnyButton(w));
    }

    fn ungrab_buttons(&mut self, w: Window) {
        self.record(Call::UngrabButtons(w));
    }

    fn keysym_for_keycode(&self, keycode: u32) -> u32 {
        // Tests inject keycodes that already are keysyms.
        keycode
    }

    fn font_height(&self) -> i32 {
        FONT_H
    }

    fn text_width(&self, text: &str) -> i32 {
        text.chars().count() as i32 * CHAR_W
    }

    fn create_drawable(&mut self, w: i32, h: i32) {
        self.record(Call::CreateDrawable(w, h));
    }

    fn draw_text(&mut self, x: i32, w: i32, scheme: usize, text: Option<&str>, pad: bool) {
        self.record(Call::DrawText {
            x,
            w,
            scheme,
            text: text.map(str::to_string),
            pad,
        });
    }

    fn draw_square(&mut self, x: i32, filled: bool, empty: bool, scheme: usize) {
        self.record(Call::DrawSquare {
            x,
            filled,
            empty,
            scheme,
        });
    }

    fn copy_bar(&mut self, barwin: Window, w: i32) {
        self.record(Call::CopyBar(barwin, w));
    }

    fn create_bar_window(&mut self, x: i32, y: i32, w: i32, h: i32) -> Window {
        self.record(Call::CreateBarWindow(x, y, w, h));
        let id = self.next_id;
        self.next_id += 1;
        self.add_window(
            id,
            WindowAttr {
                x,
                y,
                w,
                h,
                ..Default::default()
            },
        )
    }

    fn connection_fd(&self) -> Option<i32> {
        None
    }

    fn check_other_wm(&mut self) -> Result<(), String> {
        Ok(())
    }
}
