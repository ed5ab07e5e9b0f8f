//! The X transport contract.
//!
//! Everything the engine asks of the X server goes through [`XConn`]. The
//! production implementation is [`crate::xwrapper::XWrapper`] on top of raw
//! Xlib; the test suite substitutes a recording mock. Events are translated
//! into the owned [`XEvent`] enum before they reach the dispatcher, so the
//! engine never touches an `xlib::XEvent`.

/// An X window id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window(pub u64);

impl Default for Window {
    fn default() -> Self {
        Window(0)
    }
}

/// EWMH atoms the engine addresses by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Net {
    Supported,
    WMName,
    WMState,
    WMFullscreen,
    ActiveWindow,
    ClientList,
    WMWindowType,
    WMWindowTypeDialog,
    WMOpacity,
}

/// ICCCM atoms the engine addresses by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wm {
    Protocols,
    Delete,
    State,
    TakeFocus,
}

/// Atom selector handed to the transport; raw atom values only surface for
/// comparisons against event payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Atom {
    Net(Net),
    Wm(Wm),
}

/// Color slot inside a scheme: border, foreground, background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Col {
    Border,
    Fg,
    Bg,
}

/// Cursor shapes the engine can request for pointer grabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cur {
    Normal,
    Resize,
    Move,
}

/// Text properties the engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextProp {
    NetWMName,
    WMName,
    WindowRole,
}

/// One Xinerama head (or the whole screen).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenGeom {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// The subset of `XWindowAttributes` the engine looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowAttr {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub border_width: i32,
    pub override_redirect: bool,
    pub viewable: bool,
}

/// Raw `WM_NORMAL_HINTS` contents; flag interpretation is engine policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalHints {
    pub flags: i64,
    pub base_w: i32,
    pub base_h: i32,
    pub min_w: i32,
    pub min_h: i32,
    pub max_w: i32,
    pub max_h: i32,
    pub inc_w: i32,
    pub inc_h: i32,
    pub min_aspect_num: i32,
    pub min_aspect_den: i32,
    pub max_aspect_num: i32,
    pub max_aspect_den: i32,
}

/// Parsed `WM_HINTS`: urgency flag plus the `input` field when present.
#[derive(Debug, Clone, Copy, Default)]
pub struct WmHintsData {
    pub urgent: bool,
    pub input: Option<bool>,
}

/// A key grab request: modifier mask plus keysym. Lock-modifier combos are
/// the transport's business.
#[derive(Debug, Clone, Copy)]
pub struct KeySpec {
    pub mask: u32,
    pub keysym: u32,
}

/// A button grab request for a focused client window.
#[derive(Debug, Clone, Copy)]
pub struct ButtonSpec {
    pub mask: u32,
    pub button: u32,
}

/// ICCCM WM_STATE values.
pub const NORMAL_STATE: i64 = 1;
pub const ICONIC_STATE: i64 = 3;
pub const WITHDRAWN_STATE: i64 = 0;

/// X events after translation. Unknown event types never reach the engine.
#[derive(Debug, Clone)]
pub enum XEvent {
    ButtonPress {
        window: Window,
        x: i32,
        x_root: i32,
        y_root: i32,
        button: u32,
        state: u32,
    },
    ButtonRelease {
        window: Window,
    },
    ClientMessage {
        window: Window,
        message_type: u64,
        data: [i64; 5],
    },
    ConfigureRequest {
        window: Window,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        border_width: i32,
        sibling: Window,
        detail: i32,
        value_mask: u64,
    },
    ConfigureNotify {
        window: Window,
        width: i32,
        height: i32,
    },
    DestroyNotify {
        window: Window,
    },
    EnterNotify {
        window: Window,
        mode: i32,
        detail: i32,
    },
    Expose {
        window: Window,
        count: i32,
    },
    FocusIn {
        window: Window,
    },
    KeyPress {
        keycode: u32,
        state: u32,
    },
    MappingNotify {
        keyboard: bool,
    },
    MapRequest {
        window: Window,
    },
    MotionNotify {
        window: Window,
        x_root: i32,
        y_root: i32,
    },
    PropertyNotify {
        window: Window,
        atom: u64,
        deleted: bool,
    },
    ResizeRequest {
        window: Window,
    },
    UnmapNotify {
        window: Window,
        send_event: bool,
    },
}

/// The X transport. One implementation speaks Xlib, the test one records.
///
/// Failure policy: readers return `Option`/empty collections when a window is
/// gone or a property is absent; the engine treats both as "no data". Writes
/// against dead windows are swallowed by the error-handler whitelist.
pub trait XConn {
    // Screen and monitors.
    fn root(&self) -> Window;
    fn screen_size(&self) -> (i32, i32);
    /// Raw Xinerama heads; empty when Xinerama is inactive. Deduplication by
    /// geometry is engine policy.
    fn monitors(&self) -> Vec<ScreenGeom>;

    fn atom(&self, sel: Atom) -> u64;

    // Event pump.
    fn next_event(&mut self) -> Option<XEvent>;
    /// Blocking read restricted to the pointer-grab mask (motion, buttons,
    /// expose, configure/map requests) used by the mouse move/resize loops.
    fn mask_event(&mut self) -> XEvent;
    /// Discard queued EnterNotify events after a restack or pointer ungrab.
    fn drain_enter_events(&mut self);
    fn sync(&mut self, discard: bool);

    // Root setup.
    /// Select the WM event mask on the root and install the normal cursor.
    fn setup_root(&mut self);
    fn set_net_supported(&mut self);
    fn grab_keys(&mut self, numlockmask: u32, keys: &[KeySpec]);
    fn ungrab_keys(&mut self);
    fn numlock_mask(&self) -> u32;

    // Window queries.
    fn query_tree_children(&self, w: Window) -> Vec<Window>;
    /// `(root, parent)` of a window, for walking up to a top-level.
    fn query_parent(&self, w: Window) -> Option<(Window, Window)>;
    fn get_window_attributes(&self, w: Window) -> Option<WindowAttr>;
    fn get_input_focus(&self) -> Option<Window>;
    fn get_root_pointer(&self) -> Option<(i32, i32)>;

    // Property reads.
    fn text_prop(&self, w: Window, which: TextProp) -> Option<String>;
    /// `WM_CLASS` as `(instance, class)`.
    fn class_hint(&self, w: Window) -> (Option<String>, Option<String>);
    fn normal_hints(&self, w: Window) -> Option<NormalHints>;
    fn wm_hints(&self, w: Window) -> Option<WmHintsData>;
    fn transient_for(&self, w: Window) -> Option<Window>;
    /// First atom of an XA_ATOM property.
    fn atom_prop(&self, w: Window, sel: Atom) -> Option<u64>;
    /// ICCCM WM_STATE value.
    fn wm_state(&self, w: Window) -> Option<i64>;

    // Property writes.
    fn set_client_state(&mut self, w: Window, state: i64);
    fn set_fullscreen_prop(&mut self, w: Window, fullscreen: bool);
    fn set_active_window(&mut self, w: Window);
    fn delete_active_window(&mut self);
    fn append_client_list(&mut self, w: Window);
    fn delete_client_list(&mut self);
    fn set_window_opacity(&mut self, w: Window, opacity: u32);
    fn clear_urgency_hint(&mut self, w: Window);

    // Window operations.
    fn configure_window(&mut self, w: Window, x: i32, y: i32, width: i32, height: i32, bw: i32);
    /// Pass an unmanaged window's ConfigureRequest through untouched.
    #[allow(clippy::too_many_arguments)]
    fn configure_passthrough(
        &mut self,
        w: Window,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        border_width: i32,
        sibling: Window,
        detail: i32,
        value_mask: u64,
    );
    /// Send a synthetic ConfigureNotify describing the client's geometry.
    fn send_configure_notify(&mut self, w: Window, x: i32, y: i32, width: i32, height: i32, bw: i32);
    fn set_border_width(&mut self, w: Window, bw: i32);
    fn set_border_color(&mut self, w: Window, scheme: usize, slot: Col);
    fn move_window(&mut self, w: Window, x: i32, y: i32);
    fn move_resize_window(&mut self, w: Window, x: i32, y: i32, width: i32, height: i32);
    fn map_window(&mut self, w: Window);
    fn unmap_window(&mut self, w: Window);
    fn raise_window(&mut self, w: Window);
    /// Stack `w` directly below `sibling`.
    fn restack_below(&mut self, w: Window, sibling: Window);
    fn set_input_focus(&mut self, w: Window);
    /// Revert focus to PointerRoot on shutdown.
    fn revert_input_focus(&mut self);
    /// Select the per-client event mask (enter, focus, property, structure).
    fn select_client_input(&mut self, w: Window);
    fn kill_client(&mut self, w: Window);
    fn destroy_window(&mut self, w: Window);
    /// Probe WM_PROTOCOLS and send the ICCCM message iff advertised.
    fn send_wm_protocol(&mut self, w: Window, proto: Wm) -> bool;

    // Grabs and error scoping.
    fn grab_server(&mut self);
    fn ungrab_server(&mut self);
    fn set_error_ignore(&mut self);
    fn set_error_default(&mut self);
    fn grab_pointer(&mut self, cur: Cur) -> bool;
    fn ungrab_pointer(&mut self);
    fn warp_pointer(&mut self, w: Window, x: i32, y: i32);
    fn grab_button(&mut self, w: Window, numlockmask: u32, spec: ButtonSpec);
    fn grab_any_button(&mut self, w: Window);
    fn ungrab_buttons(&mut self, w: Window);

    fn keysym_for_keycode(&self, keycode: u32) -> u32;

    // Bar drawing. The back buffer is one bar-height row of pixels.
    fn font_height(&self) -> i32;
    fn text_width(&self, text: &str) -> i32;
    fn create_drawable(&mut self, w: i32, h: i32);
    fn draw_text(&mut self, x: i32, w: i32, scheme: usize, text: Option<&str>, pad: bool);
    fn draw_square(&mut self, x: i32, filled: bool, empty: bool, scheme: usize);
    fn copy_bar(&mut self, barwin: Window, w: i32);
    fn create_bar_window(&mut self, x: i32, y: i32, w: i32, h: i32) -> Window;

    /// The display connection fd, closed in spawned children.
    fn connection_fd(&self) -> Option<i32>;
    fn check_other_wm(&mut self) -> Result<(), String>;
}
