//! Xlib-backed implementation of the X transport.
//!
//! All `unsafe` X traffic lives here: the display handle, atom tables, the
//! Xft draw context for the bar, cursors, and the three error handlers. The
//! engine only sees the [`XConn`] trait.

use std::ffi::{c_char, CStr, CString};
use std::os::raw::{c_int, c_long, c_uchar, c_uint, c_ulong};
use std::ptr::null_mut;

use x11::xinerama;
use x11::{keysym, xft, xlib};

use crate::config;
use crate::xconn::{
    Atom, ButtonSpec, Col, Cur, KeySpec, Net, NormalHints, ScreenGeom, TextProp, Window,
    WindowAttr, Wm, WmHintsData, XConn, XEvent,
};

// From <X11/Xproto.h>.
const X_SET_INPUT_FOCUS: u8 = 42;
const X_POLY_TEXT8: u8 = 74;
const X_POLY_FILL_RECTANGLE: u8 = 69;
const X_POLY_SEGMENT: u8 = 66;
const X_CONFIGURE_WINDOW: u8 = 12;
const X_GRAB_BUTTON: u8 = 28;
const X_GRAB_KEY: u8 = 33;
const X_COPY_AREA: u8 = 62;

const BUTTONMASK: i64 = xlib::ButtonPressMask | xlib::ButtonReleaseMask;
const MOUSEMASK: i64 = BUTTONMASK | xlib::PointerMotionMask;

static mut XERROR_XLIB: Option<
    unsafe extern "C" fn(*mut xlib::Display, *mut xlib::XErrorEvent) -> c_int,
> = None;
static mut X_ERROR_OCCURRED: bool = false;

unsafe extern "C" fn xerror_dummy(
    _dpy: *mut xlib::Display,
    _ee: *mut xlib::XErrorEvent,
) -> c_int {
    0
}

unsafe extern "C" fn xerror_start(
    _dpy: *mut xlib::Display,
    _ee: *mut xlib::XErrorEvent,
) -> c_int {
    X_ERROR_OCCURRED = true;
    0
}

/// There's no way to check accesses to destroyed windows, thus those cases
/// are ignored (especially on UnmapNotify's). Other errors fall through to
/// Xlib's default handler, which may call exit.
unsafe extern "C" fn xerror(dpy: *mut xlib::Display, ee: *mut xlib::XErrorEvent) -> c_int {
    let e = &*ee;
    if e.error_code == xlib::BadWindow
        || (e.request_code == X_SET_INPUT_FOCUS && e.error_code == xlib::BadMatch)
        || (e.request_code == X_POLY_TEXT8 && e.error_code == xlib::BadDrawable)
        || (e.request_code == X_POLY_FILL_RECTANGLE && e.error_code == xlib::BadDrawable)
        || (e.request_code == X_POLY_SEGMENT && e.error_code == xlib::BadDrawable)
        || (e.request_code == X_CONFIGURE_WINDOW && e.error_code == xlib::BadMatch)
        || (e.request_code == X_GRAB_BUTTON && e.error_code == xlib::BadAccess)
        || (e.request_code == X_GRAB_KEY && e.error_code == xlib::BadAccess)
        || (e.request_code == X_COPY_AREA && e.error_code == xlib::BadDrawable)
    {
        return 0;
    }

    log::error!(
        "fatal error: request code={}, error code={}",
        e.request_code,
        e.error_code
    );
    eprintln!(
        "rawm: fatal error: request code={}, error code={}",
        e.request_code, e.error_code
    );
    match XERROR_XLIB {
        Some(handler) => handler(dpy, ee),
        None => 0,
    }
}

struct Atoms {
    wmatom: [xlib::Atom; 4],
    /// Exactly the `_NET_SUPPORTED` set, in declaration order.
    netatom: [xlib::Atom; 8],
    opacity: xlib::Atom,
    wm_role: xlib::Atom,
    utf8_string: xlib::Atom,
}

impl Atoms {
    unsafe fn new(dpy: *mut xlib::Display) -> Self {
        let intern = |name: &str| -> xlib::Atom {
            let c = CString::new(name).unwrap_or_default();
            xlib::XInternAtom(dpy, c.as_ptr(), xlib::False)
        };
        Atoms {
            wmatom: [
                intern("WM_PROTOCOLS"),
                intern("WM_DELETE_WINDOW"),
                intern("WM_STATE"),
                intern("WM_TAKE_FOCUS"),
            ],
            netatom: [
                intern("_NET_ACTIVE_WINDOW"),
                intern("_NET_SUPPORTED"),
                intern("_NET_WM_NAME"),
                intern("_NET_WM_STATE"),
                intern("_NET_CLIENT_LIST"),
                intern("_NET_WM_STATE_FULLSCREEN"),
                intern("_NET_WM_WINDOW_TYPE"),
                intern("_NET_WM_WINDOW_TYPE_DIALOG"),
            ],
            opacity: intern("_NET_WM_WINDOW_OPACITY"),
            wm_role: intern("WM_WINDOW_ROLE"),
            utf8_string: intern("UTF8_STRING"),
        }
    }

    fn get(&self, sel: Atom) -> xlib::Atom {
        match sel {
            Atom::Wm(Wm::Protocols) => self.wmatom[0],
            Atom::Wm(Wm::Delete) => self.wmatom[1],
            Atom::Wm(Wm::State) => self.wmatom[2],
            Atom::Wm(Wm::TakeFocus) => self.wmatom[3],
            Atom::Net(Net::ActiveWindow) => self.netatom[0],
            Atom::Net(Net::Supported) => self.netatom[1],
            Atom::Net(Net::WMName) => self.netatom[2],
            Atom::Net(Net::WMState) => self.netatom[3],
            Atom::Net(Net::ClientList) => self.netatom[4],
            Atom::Net(Net::WMFullscreen) => self.netatom[5],
            Atom::Net(Net::WMWindowType) => self.netatom[6],
            Atom::Net(Net::WMWindowTypeDialog) => self.netatom[7],
            Atom::Net(Net::WMOpacity) => self.opacity,
        }
    }
}

struct Font {
    dpy: *mut xlib::Display,
    h: c_int,
    ascent: c_int,
    descent: c_int,
    xfont: *mut xft::XftFont,
}

impl Drop for Font {
    fn drop(&mut self) {
        unsafe {
            if !self.xfont.is_null() {
                xft::XftFontClose(self.dpy, self.xfont);
            }
        }
    }
}

pub struct XWrapper {
    dpy: *mut xlib::Display,
    screen: c_int,
    root: xlib::Window,
    drawable: xlib::Drawable,
    drawable_h: c_int,
    gc: xlib::GC,
    xftdraw: *mut xft::XftDraw,
    font: Font,
    colors: [[xft::XftColor; 3]; config::NUMCOLORS],
    cursors: [xlib::Cursor; 3],
    atoms: Atoms,
}

impl XWrapper {
    pub fn connect() -> Result<Self, String> {
        unsafe {
            let dpy = xlib::XOpenDisplay(null_mut());
            if dpy.is_null() {
                return Err("cannot open display".into());
            }

            let screen = xlib::XDefaultScreen(dpy);
            let root = xlib::XRootWindow(dpy, screen);

            // Xft wants fontconfig initialised before the first font open.
            let _ = fontconfig::Fontconfig::new();
            let font = Self::open_font(dpy, screen, config::FONT)
                .or_else(|| Self::open_font(dpy, screen, "fixed"))
                .ok_or_else(|| format!("cannot load font: '{}'", config::FONT))?;

            let gc = xlib::XCreateGC(dpy, root, 0, null_mut());
            xlib::XSetLineAttributes(dpy, gc, 1, xlib::LineSolid, xlib::CapButt, xlib::JoinMiter);

            let mut colors = [[std::mem::zeroed::<xft::XftColor>(); 3]; config::NUMCOLORS];
            for (i, scheme) in config::COLORS.iter().enumerate() {
                for (j, name) in scheme.iter().enumerate() {
                    colors[i][j] = Self::alloc_color(dpy, screen, name)?;
                }
            }

            let cursors = [
                xlib::XCreateFontCursor(dpy, 68),  // XC_left_ptr
                xlib::XCreateFontCursor(dpy, 120), // XC_sizing
                xlib::XCreateFontCursor(dpy, 52),  // XC_fleur
            ];

            let atoms = Atoms::new(dpy);

            Ok(XWrapper {
                dpy,
                screen,
                root,
                drawable: 0,
                drawable_h: 0,
                gc,
                xftdraw: null_mut(),
                font,
                colors,
                cursors,
                atoms,
            })
        }
    }

    unsafe fn open_font(dpy: *mut xlib::Display, screen: c_int, name: &str) -> Option<Font> {
        let c = CString::new(name).ok()?;
        let xfont = xft::XftFontOpenName(dpy, screen, c.as_ptr());
        if xfont.is_null() {
            log::warn!("cannot load font from name: '{}'", name);
            return None;
        }
        let ascent = (*xfont).ascent;
        let descent = (*xfont).descent;
        Some(Font {
            dpy,
            h: ascent + descent,
            ascent,
            descent,
            xfont,
        })
    }

    unsafe fn alloc_color(
        dpy: *mut xlib::Display,
        screen: c_int,
        name: &str,
    ) -> Result<xft::XftColor, String> {
        let c = CString::new(name).map_err(|_| format!("bad color name '{}'", name))?;
        let mut color: xft::XftColor = std::mem::zeroed();
        if xft::XftColorAllocName(
            dpy,
            xlib::XDefaultVisual(dpy, screen),
            xlib::XDefaultColormap(dpy, screen),
            c.as_ptr(),
            &mut color,
        ) == 0
        {
            return Err(format!("cannot allocate color '{}'", name));
        }
        Ok(color)
    }

    fn cursor(&self, cur: Cur) -> xlib::Cursor {
        match cur {
            Cur::Normal => self.cursors[0],
            Cur::Resize => self.cursors[1],
            Cur::Move => self.cursors[2],
        }
    }

    unsafe fn decode_text_property(&self, prop: &mut xlib::XTextProperty) -> Option<String> {
        if prop.nitems == 0 || prop.value.is_null() {
            return None;
        }
        let out = if prop.encoding == xlib::XA_STRING || prop.encoding == self.atoms.utf8_string {
            let bytes = std::slice::from_raw_parts(prop.value, prop.nitems as usize);
            Some(String::from_utf8_lossy(bytes).into_owned())
        } else {
            let mut list: *mut *mut c_char = null_mut();
            let mut n: c_int = 0;
            if xlib::XmbTextPropertyToTextList(self.dpy, prop, &mut list, &mut n)
                >= xlib::Success as c_int
                && n > 0
                && !list.is_null()
                && !(*list).is_null()
            {
                let s = CStr::from_ptr(*list).to_string_lossy().into_owned();
                xlib::XFreeStringList(list);
                Some(s)
            } else {
                None
            }
        };
        xlib::XFree(prop.value as *mut _);
        out
    }

    unsafe fn get_text(&self, w: Window, atom: xlib::Atom) -> Option<String> {
        let mut prop: xlib::XTextProperty = std::mem::zeroed();
        if xlib::XGetTextProperty(self.dpy, w.0, &mut prop, atom) == 0 {
            return None;
        }
        self.decode_text_property(&mut prop)
    }

    /// Translate one Xlib event into the engine's event type.
    unsafe fn translate(&self, ev: &mut xlib::XEvent) -> Option<XEvent> {
        match ev.get_type() {
            xlib::ButtonPress => {
                let e = ev.button;
                Some(XEvent::ButtonPress {
                    window: Window(e.window),
                    x: e.x,
                    x_root: e.x_root,
                    y_root: e.y_root,
                    button: e.button,
                    state: e.state,
                })
            }
            xlib::ButtonRelease => Some(XEvent::ButtonRelease {
                window: Window(ev.button.window),
            }),
            xlib::ClientMessage => {
                let e = ev.client_message;
                let mut data = [0i64; 5];
                for (i, slot) in data.iter_mut().enumerate() {
                    *slot = e.data.get_long(i) as i64;
                }
                Some(XEvent::ClientMessage {
                    window: Window(e.window),
                    message_type: e.message_type,
                    data,
                })
            }
            xlib::ConfigureRequest => {
                let e = ev.configure_request;
                Some(XEvent::ConfigureRequest {
                    window: Window(e.window),
                    x: e.x,
                    y: e.y,
                    width: e.width,
                    height: e.height,
                    border_width: e.border_width,
                    sibling: Window(e.above),
                    detail: e.detail,
                    value_mask: e.value_mask,
                })
            }
            xlib::ConfigureNotify => {
                let e = ev.configure;
                Some(XEvent::ConfigureNotify {
                    window: Window(e.window),
                    width: e.width,
                    height: e.height,
                })
            }
            xlib::DestroyNotify => Some(XEvent::DestroyNotify {
                window: Window(ev.destroy_window.window),
            }),
            xlib::EnterNotify => {
                let e = ev.crossing;
                Some(XEvent::EnterNotify {
                    window: Window(e.window),
                    mode: e.mode,
                    detail: e.detail,
                })
            }
            xlib::Expose => {
                let e = ev.expose;
                Some(XEvent::Expose {
                    window: Window(e.window),
                    count: e.count,
                })
            }
            xlib::FocusIn => Some(XEvent::FocusIn {
                window: Window(ev.focus_change.window),
            }),
            xlib::KeyPress => {
                let e = ev.key;
                Some(XEvent::KeyPress {
                    keycode: e.keycode,
                    state: e.state,
                })
            }
            xlib::MappingNotify => {
                xlib::XRefreshKeyboardMapping(&mut ev.mapping);
                Some(XEvent::MappingNotify {
                    keyboard: ev.mapping.request == xlib::MappingKeyboard,
                })
            }
            xlib::MapRequest => Some(XEvent::MapRequest {
                window: Window(ev.map_request.window),
            }),
            xlib::MotionNotify => {
                let e = ev.motion;
                Some(XEvent::MotionNotify {
                    window: Window(e.window),
                    x_root: e.x_root,
                    y_root: e.y_root,
                })
            }
            xlib::PropertyNotify => {
                let e = ev.property;
                Some(XEvent::PropertyNotify {
                    window: Window(e.window),
                    atom: e.atom,
                    deleted: e.state == xlib::PropertyDelete,
                })
            }
            xlib::ResizeRequest => Some(XEvent::ResizeRequest {
                window: Window(ev.resize_request.window),
            }),
            xlib::UnmapNotify => {
                let e = ev.unmap;
                Some(XEvent::UnmapNotify {
                    window: Window(e.window),
                    send_event: e.send_event != 0,
                })
            }
            _ => None,
        }
    }
}

impl XConn for XWrapper {
    fn root(&self) -> Window {
        Window(self.root)
    }

    fn screen_size(&self) -> (i32, i32) {
        unsafe {
            (
                xlib::XDisplayWidth(self.dpy, self.screen),
                xlib::XDisplayHeight(self.dpy, self.screen),
            )
        }
    }

    fn monitors(&self) -> Vec<ScreenGeom> {
        unsafe {
            if xinerama::XineramaIsActive(self.dpy) == 0 {
                return Vec::new();
            }
            let mut n: c_int = 0;
            let info = xinerama::XineramaQueryScreens(self.dpy, &mut n);
            if info.is_null() {
                return Vec::new();
            }
            let heads = std::slice::from_raw_parts(info, n as usize)
                .iter()
                .map(|i| ScreenGeom {
                    x: i.x_org as i32,
                    y: i.y_org as i32,
                    w: i.width as i32,
                    h: i.height as i32,
                })
                .collect();
            xlib::XFree(info as *mut _);
            heads
        }
    }

    fn atom(&self, sel: Atom) -> u64 {
        self.atoms.get(sel)
    }

    fn next_event(&mut self) -> Option<XEvent> {
        unsafe {
            loop {
                let mut ev: xlib::XEvent = std::mem::zeroed();
                if xlib::XNextEvent(self.dpy, &mut ev) != 0 {
                    return None;
                }
                if let Some(translated) = self.translate(&mut ev) {
                    return Some(translated);
                }
            }
        }
    }

    fn mask_event(&mut self) -> XEvent {
        unsafe {
            loop {
                let mut ev: xlib::XEvent = std::mem::zeroed();
                xlib::XMaskEvent(
                    self.dpy,
                    MOUSEMASK | xlib::ExposureMask | xlib::SubstructureRedirectMask,
                    &mut ev,
                );
                if let Some(translated) = self.translate(&mut ev) {
                    return translated;
                }
            }
        }
    }

    fn drain_enter_events(&mut self) {
        unsafe {
            let mut ev: xlib::XEvent = std::mem::zeroed();
            while xlib::XCheckMaskEvent(self.dpy, xlib::EnterWindowMask, &mut ev) != 0 {}
        }
    }

    fn sync(&mut self, discard: bool) {
        unsafe {
            xlib::XSync(self.dpy, discard as c_int);
        }
    }

    fn setup_root(&mut self) {
        unsafe {
            let mut wa: xlib::XSetWindowAttributes = std::mem::zeroed();
            wa.cursor = self.cursor(Cur::Normal);
            wa.event_mask = xlib::SubstructureRedirectMask
                | xlib::SubstructureNotifyMask
                | xlib::ButtonPressMask
                | xlib::PointerMotionMask
                | xlib::EnterWindowMask
                | xlib::LeaveWindowMask
                | xlib::StructureNotifyMask
                | xlib::PropertyChangeMask;
            xlib::XChangeWindowAttributes(
                self.dpy,
                self.root,
                xlib::CWEventMask | xlib::CWCursor,
                &mut wa,
            );
            xlib::XSelectInput(self.dpy, self.root, wa.event_mask);
        }
    }

    fn set_net_supported(&mut self) {
        unsafe {
            xlib::XChangeProperty(
                self.dpy,
                self.root,
                self.atoms.get(Atom::Net(Net::Supported)),
                xlib::XA_ATOM,
                32,
                xlib::PropModeReplace,
                self.atoms.netatom.as_ptr() as *const c_uchar,
                self.atoms.netatom.len() as c_int,
            );
        }
    }

    fn grab_keys(&mut self, numlockmask: u32, keys: &[KeySpec]) {
        unsafe {
            xlib::XUngrabKey(self.dpy, xlib::AnyKey, xlib::AnyModifier, self.root);
            let modifiers = [0, xlib::LockMask, numlockmask, numlockmask | xlib::LockMask];
            for key in keys {
                let code = xlib::XKeysymToKeycode(self.dpy, key.keysym as c_ulong);
                if code == 0 {
                    continue;
                }
                for &m in &modifiers {
                    xlib::XGrabKey(
                        self.dpy,
                        code as c_int,
                        key.mask | m,
                        self.root,
                        xlib::True,
                        xlib::GrabModeAsync,
                        xlib::GrabModeAsync,
                    );
                }
            }
        }
    }

    fn ungrab_keys(&mut self) {
        unsafe {
            xlib::XUngrabKey(self.dpy, xlib::AnyKey, xlib::AnyModifier, self.root);
        }
    }

    fn numlock_mask(&self) -> u32 {
        unsafe {
            let mut mask = 0;
            let modmap = xlib::XGetModifierMapping(self.dpy);
            if modmap.is_null() {
                return 0;
            }
            let numlock = xlib::XKeysymToKeycode(self.dpy, keysym::XK_Num_Lock as c_ulong);
            let max = (*modmap).max_keypermod;
            for i in 0..8 {
                for j in 0..max {
                    let code = *(*modmap).modifiermap.offset((i * max + j) as isize);
                    if code != 0 && code == numlock {
                        mask = 1 << i;
                    }
                }
            }
            xlib::XFreeModifiermap(modmap);
            mask
        }
    }

    fn query_tree_children(&self, w: Window) -> Vec<Window> {
        unsafe {
            let mut root_ret: xlib::Window = 0;
            let mut parent_ret: xlib::Window = 0;
            let mut children: *mut xlib::Window = null_mut();
            let mut n: c_uint = 0;
            if xlib::XQueryTree(
                self.dpy,
                w.0,
                &mut root_ret,
                &mut parent_ret,
                &mut children,
                &mut n,
            ) == 0
            {
                return Vec::new();
            }
            let out = if n > 0 && !children.is_null() {
                std::slice::from_raw_parts(children, n as usize)
                    .iter()
                    .map(|&w| Window(w))
                    .collect()
            } else {
                Vec::new()
            };
            if !children.is_null() {
                xlib::XFree(children as *mut _);
            }
            out
        }
    }

    fn query_parent(&self, w: Window) -> Option<(Window, Window)> {
        unsafe {
            let mut root_ret: xlib::Window = 0;
            let mut parent_ret: xlib::Window = 0;
            let mut children: *mut xlib::Window = null_mut();
            let mut n: c_uint = 0;
            if xlib::XQueryTree(
                self.dpy,
                w.0,
                &mut root_ret,
                &mut parent_ret,
                &mut children,
                &mut n,
            ) == 0
            {
                return None;
            }
            if !children.is_null() {
                xlib::XFree(children as *mut _);
            }
            Some((Window(root_ret), Window(parent_ret)))
        }
    }

    fn get_window_attributes(&self, w: Window) -> Option<WindowAttr> {
        unsafe {
            let mut wa: xlib::XWindowAttributes = std::mem::zeroed();
            if xlib::XGetWindowAttributes(self.dpy, w.0, &mut wa) == 0 {
                return None;
            }
            Some(WindowAttr {
                x: wa.x,
                y: wa.y,
                w: wa.width,
                h: wa.height,
                border_width: wa.border_width,
                override_redirect: wa.override_redirect != 0,
                viewable: wa.map_state == xlib::IsViewable,
            })
        }
    }

    fn get_input_focus(&self) -> Option<Window> {
        unsafe {
            let mut w: xlib::Window = 0;
            let mut revert: c_int = 0;
            xlib::XGetInputFocus(self.dpy, &mut w, &mut revert);
            if w == 0 {
                None
            } else {
                Some(Window(w))
            }
        }
    }

    fn get_root_pointer(&self) -> Option<(i32, i32)> {
        unsafe {
            let mut dummy: xlib::Window = 0;
            let (mut x, mut y, mut di) = (0, 0, 0);
            let mut dui: c_uint = 0;
            if xlib::XQueryPointer(
                self.dpy, self.root, &mut dummy, &mut dummy, &mut x, &mut y, &mut di, &mut di,
                &mut dui,
            ) != 0
            {
                Some((x, y))
            } else {
                None
            }
        }
    }

    fn text_prop(&self, w: Window, which: TextProp) -> Option<String> {
        unsafe {
            let atom = match which {
                TextProp::NetWMName => self.atoms.get(Atom::Net(Net::WMName)),
                TextProp::WMName => xlib::XA_WM_NAME,
                TextProp::WindowRole => self.atoms.wm_role,
            };
            self.get_text(w, atom).filter(|s| !s.is_empty())
        }
    }

    fn class_hint(&self, w: Window) -> (Option<String>, Option<String>) {
        unsafe {
            let mut ch = xlib::XClassHint {
                res_name: null_mut(),
                res_class: null_mut(),
            };
            xlib::XGetClassHint(self.dpy, w.0, &mut ch);
            let take = |p: *mut c_char| -> Option<String> {
                if p.is_null() {
                    None
                } else {
                    let s = CStr::from_ptr(p).to_string_lossy().into_owned();
                    xlib::XFree(p as *mut _);
                    Some(s)
                }
            };
            (take(ch.res_name), take(ch.res_class))
        }
    }

    fn normal_hints(&self, w: Window) -> Option<NormalHints> {
        unsafe {
            let mut size: xlib::XSizeHints = std::mem::zeroed();
            let mut supplied: c_long = 0;
            if xlib::XGetWMNormalHints(self.dpy, w.0, &mut size, &mut supplied) == 0 {
                return None;
            }
            Some(NormalHints {
                flags: size.flags as i64,
                base_w: size.base_width,
                base_h: size.base_height,
                min_w: size.min_width,
                min_h: size.min_height,
                max_w: size.max_width,
                max_h: size.max_height,
                inc_w: size.width_inc,
                inc_h: size.height_inc,
                min_aspect_num: size.min_aspect.x,
                min_aspect_den: size.min_aspect.y,
                max_aspect_num: size.max_aspect.x,
                max_aspect_den: size.max_aspect.y,
            })
        }
    }

    fn wm_hints(&self, w: Window) -> Option<WmHintsData> {
        unsafe {
            let wmh = xlib::XGetWMHints(self.dpy, w.0);
            if wmh.is_null() {
                return None;
            }
            let flags = (*wmh).flags;
            let data = WmHintsData {
                urgent: flags & xlib::XUrgencyHint != 0,
                input: if flags & xlib::InputHint != 0 {
                    Some((*wmh).input != 0)
                } else {
                    None
                },
            };
            xlib::XFree(wmh as *mut _);
            Some(data)
        }
    }

    fn transient_for(&self, w: Window) -> Option<Window> {
        unsafe {
            let mut trans: xlib::Window = 0;
            if xlib::XGetTransientForHint(self.dpy, w.0, &mut trans) != 0 && trans != 0 {
                Some(Window(trans))
            } else {
                None
            }
        }
    }

    fn atom_prop(&self, w: Window, sel: Atom) -> Option<u64> {
        unsafe {
            let mut da: xlib::Atom = 0;
            let mut di: c_int = 0;
            let mut nitems: c_ulong = 0;
            let mut bytes: c_ulong = 0;
            let mut p: *mut c_uchar = null_mut();
            let status = xlib::XGetWindowProperty(
                self.dpy,
                w.0,
                self.atoms.get(sel),
                0,
                std::mem::size_of::<xlib::Atom>() as c_long,
                xlib::False,
                xlib::XA_ATOM,
                &mut da,
                &mut di,
                &mut nitems,
                &mut bytes,
                &mut p,
            );
            if status != xlib::Success as c_int || p.is_null() {
                return None;
            }
            let atom = if nitems > 0 {
                Some(*(p as *const xlib::Atom))
            } else {
                None
            };
            xlib::XFree(p as *mut _);
            atom
        }
    }

    fn wm_state(&self, w: Window) -> Option<i64> {
        unsafe {
            let wm_state = self.atoms.get(Atom::Wm(Wm::State));
            let mut real: xlib::Atom = 0;
            let mut format: c_int = 0;
            let mut n: c_ulong = 0;
            let mut extra: c_ulong = 0;
            let mut p: *mut c_uchar = null_mut();
            if xlib::XGetWindowProperty(
                self.dpy, w.0, wm_state, 0, 2, xlib::False, wm_state, &mut real, &mut format,
                &mut n, &mut extra, &mut p,
            ) != xlib::Success as c_int
                || p.is_null()
            {
                return None;
            }
            let state = if n != 0 { Some(*p as i64) } else { None };
            xlib::XFree(p as *mut _);
            state
        }
    }

    fn set_client_state(&mut self, w: Window, state: i64) {
        unsafe {
            let data = [state as c_long, 0 as c_long];
            xlib::XChangeProperty(
                self.dpy,
                w.0,
                self.atoms.get(Atom::Wm(Wm::State)),
                self.atoms.get(Atom::Wm(Wm::State)),
                32,
                xlib::PropModeReplace,
                data.as_ptr() as *const c_uchar,
                2,
            );
        }
    }

    fn set_fullscreen_prop(&mut self, w: Window, fullscreen: bool) {
        unsafe {
            let fs = self.atoms.get(Atom::Net(Net::WMFullscreen));
            let (ptr, n) = if fullscreen {
                (&fs as *const xlib::Atom as *const c_uchar, 1)
            } else {
                (std::ptr::null(), 0)
            };
            xlib::XChangeProperty(
                self.dpy,
                w.0,
                self.atoms.get(Atom::Net(Net::WMState)),
                xlib::XA_ATOM,
                32,
                xlib::PropModeReplace,
                ptr,
                n,
            );
        }
    }

    fn set_active_window(&mut self, w: Window) {
        unsafe {
            xlib::XChangeProperty(
                self.dpy,
                self.root,
                self.atoms.get(Atom::Net(Net::ActiveWindow)),
                xlib::XA_WINDOW,
                32,
                xlib::PropModeReplace,
                &w.0 as *const u64 as *const c_uchar,
                1,
            );
        }
    }

    fn delete_active_window(&mut self) {
        unsafe {
            xlib::XDeleteProperty(
                self.dpy,
                self.root,
                self.atoms.get(Atom::Net(Net::ActiveWindow)),
            );
        }
    }

    fn append_client_list(&mut self, w: Window) {
        unsafe {
            xlib::XChangeProperty(
                self.dpy,
                self.root,
                self.atoms.get(Atom::Net(Net::ClientList)),
                xlib::XA_WINDOW,
                32,
                xlib::PropModeAppend,
                &w.0 as *const u64 as *const c_uchar,
                1,
            );
        }
    }

    fn delete_client_list(&mut self) {
        unsafe {
            xlib::XDeleteProperty(
                self.dpy,
                self.root,
                self.atoms.get(Atom::Net(Net::ClientList)),
            );
        }
    }

    fn set_window_opacity(&mut self, w: Window, opacity: u32) {
        unsafe {
            let val = opacity as c_ulong;
            xlib::XChangeProperty(
                self.dpy,
                w.0,
                self.atoms.opacity,
                xlib::XA_CARDINAL,
                32,
                xlib::PropModeReplace,
                &val as *const c_ulong as *const c_uchar,
                1,
            );
        }
    }

    fn clear_urgency_hint(&mut self, w: Window) {
        unsafe {
            let wmh = xlib::XGetWMHints(self.dpy, w.0);
            if wmh.is_null() {
                return;
            }
            (*wmh).flags &= !xlib::XUrgencyHint;
            xlib::XSetWMHints(self.dpy, w.0, wmh);
            xlib::XFree(wmh as *mut _);
        }
    }

    fn configure_window(&mut self, w: Window, x: i32, y: i32, width: i32, height: i32, bw: i32) {
        unsafe {
            let mut wc: xlib::XWindowChanges = std::mem::zeroed();
            wc.x = x;
            wc.y = y;
            wc.width = width;
            wc.height = height;
            wc.border_width = bw;
            let mask = xlib::CWX | xlib::CWY | xlib::CWWidth | xlib::CWHeight | xlib::CWBorderWidth;
            xlib::XConfigureWindow(self.dpy, w.0, mask as c_uint, &mut wc);
        }
    }

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
    ) {
        unsafe {
            let mut wc: xlib::XWindowChanges = std::mem::zeroed();
            wc.x = x;
            wc.y = y;
            wc.width = width;
            wc.height = height;
            wc.border_width = border_width;
            wc.sibling = sibling.0;
            wc.stack_mode = detail;
            xlib::XConfigureWindow(self.dpy, w.0, value_mask as c_uint, &mut wc);
        }
    }

    fn send_configure_notify(
        &mut self,
        w: Window,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        bw: i32,
    ) {
        unsafe {
            let mut ev: xlib::XEvent = std::mem::zeroed();
            ev.configure.type_ = xlib::ConfigureNotify;
            ev.configure.display = self.dpy;
            ev.configure.event = w.0;
            ev.configure.window = w.0;
            ev.configure.x = x;
            ev.configure.y = y;
            ev.configure.width = width;
            ev.configure.height = height;
            ev.configure.border_width = bw;
            ev.configure.above = 0;
            ev.configure.override_redirect = xlib::False;
            xlib::XSendEvent(self.dpy, w.0, xlib::False, xlib::StructureNotifyMask, &mut ev);
        }
    }

    fn set_border_width(&mut self, w: Window, bw: i32) {
        unsafe {
            let mut wc: xlib::XWindowChanges = std::mem::zeroed();
            wc.border_width = bw;
            xlib::XConfigureWindow(self.dpy, w.0, xlib::CWBorderWidth as c_uint, &mut wc);
        }
    }

    fn set_border_color(&mut self, w: Window, scheme: usize, slot: Col) {
        let idx = match slot {
            Col::Border => 0,
            Col::Fg => 1,
            Col::Bg => 2,
        };
        unsafe {
            xlib::XSetWindowBorder(self.dpy, w.0, self.colors[scheme][idx].pixel);
        }
    }

    fn move_window(&mut self, w: Window, x: i32, y: i32) {
        unsafe {
            xlib::XMoveWindow(self.dpy, w.0, x, y);
        }
    }

    fn move_resize_window(&mut self, w: Window, x: i32, y: i32, width: i32, height: i32) {
        unsafe {
            xlib::XMoveResizeWindow(
                self.dpy,
                w.0,
                x,
                y,
                width.max(1) as c_uint,
                height.max(1) as c_uint,
            );
        }
    }

    fn map_window(&mut self, w: Window) {
        unsafe {
            xlib::XMapWindow(self.dpy, w.0);
        }
    }

    fn unmap_window(&mut self, w: Window) {
        unsafe {
            xlib::XUnmapWindow(self.dpy, w.0);
        }
    }

    fn raise_window(&mut self, w: Window) {
        unsafe {
            xlib::XRaiseWindow(self.dpy, w.0);
        }
    }

    fn restack_below(&mut self, w: Window, sibling: Window) {
        unsafe {
            let mut wc: xlib::XWindowChanges = std::mem::zeroed();
            wc.stack_mode = xlib::Below;
            wc.sibling = sibling.0;
            xlib::XConfigureWindow(
                self.dpy,
                w.0,
                (xlib::CWSibling | xlib::CWStackMode) as c_uint,
                &mut wc,
            );
        }
    }

    fn set_input_focus(&mut self, w: Window) {
        unsafe {
            xlib::XSetInputFocus(self.dpy, w.0, xlib::RevertToPointerRoot, xlib::CurrentTime);
        }
    }

    fn revert_input_focus(&mut self) {
        unsafe {
            xlib::XSetInputFocus(
                self.dpy,
                xlib::PointerRoot as xlib::Window,
                xlib::RevertToPointerRoot,
                xlib::CurrentTime,
            );
        }
    }

    fn select_client_input(&mut self, w: Window) {
        unsafe {
            xlib::XSelectInput(
                self.dpy,
                w.0,
                xlib::EnterWindowMask
                    | xlib::FocusChangeMask
                    | xlib::PropertyChangeMask
                    | xlib::StructureNotifyMask,
            );
        }
    }

    fn kill_client(&mut self, w: Window) {
        unsafe {
            xlib::XSetCloseDownMode(self.dpy, xlib::DestroyAll);
            xlib::XKillClient(self.dpy, w.0);
        }
    }

    fn destroy_window(&mut self, w: Window) {
        unsafe {
            xlib::XUnmapWindow(self.dpy, w.0);
            xlib::XDestroyWindow(self.dpy, w.0);
        }
    }

    fn send_wm_protocol(&mut self, w: Window, proto: Wm) -> bool {
        unsafe {
            let proto_atom = self.atoms.get(Atom::Wm(proto));
            let mut protocols: *mut xlib::Atom = null_mut();
            let mut n: c_int = 0;
            let mut exists = false;
            if xlib::XGetWMProtocols(self.dpy, w.0, &mut protocols, &mut n) != 0
                && !protocols.is_null()
            {
                exists = std::slice::from_raw_parts(protocols, n as usize).contains(&proto_atom);
                xlib::XFree(protocols as *mut _);
            }
            if exists {
                let mut ev: xlib::XEvent = std::mem::zeroed();
                ev.client_message.type_ = xlib::ClientMessage;
                ev.client_message.window = w.0;
                ev.client_message.message_type = self.atoms.get(Atom::Wm(Wm::Protocols));
                ev.client_message.format = 32;
                ev.client_message.data.set_long(0, proto_atom as c_long);
                ev.client_message.data.set_long(1, xlib::CurrentTime as c_long);
                xlib::XSendEvent(self.dpy, w.0, xlib::False, xlib::NoEventMask, &mut ev);
            }
            exists
        }
    }

    fn grab_server(&mut self) {
        unsafe {
            xlib::XGrabServer(self.dpy);
        }
    }

    fn ungrab_server(&mut self) {
        unsafe {
            xlib::XUngrabServer(self.dpy);
        }
    }

    fn set_error_ignore(&mut self) {
        unsafe {
            xlib::XSetErrorHandler(Some(xerror_dummy));
        }
    }

    fn set_error_default(&mut self) {
        unsafe {
            xlib::XSetErrorHandler(Some(xerror));
        }
    }

    fn grab_pointer(&mut self, cur: Cur) -> bool {
        unsafe {
            xlib::XGrabPointer(
                self.dpy,
                self.root,
                xlib::False,
                MOUSEMASK as c_uint,
                xlib::GrabModeAsync,
                xlib::GrabModeAsync,
                0,
                self.cursor(cur),
                xlib::CurrentTime,
            ) == xlib::GrabSuccess
        }
    }

    fn ungrab_pointer(&mut self) {
        unsafe {
            xlib::XUngrabPointer(self.dpy, xlib::CurrentTime);
        }
    }

    fn warp_pointer(&mut self, w: Window, x: i32, y: i32) {
        unsafe {
            xlib::XWarpPointer(self.dpy, 0, w.0, 0, 0, 0, 0, x, y);
        }
    }

    fn grab_button(&mut self, w: Window, numlockmask: u32, spec: ButtonSpec) {
        unsafe {
            let modifiers = [0, xlib::LockMask, numlockmask, numlockmask | xlib::LockMask];
            for &m in &modifiers {
                xlib::XGrabButton(
                    self.dpy,
                    spec.button,
                    spec.mask | m,
                    w.0,
                    xlib::False,
                    BUTTONMASK as c_uint,
                    xlib::GrabModeAsync,
                    xlib::GrabModeSync,
                    0,
                    0,
                );
            }
        }
    }

    fn grab_any_button(&mut self, w: Window) {
        unsafe {
            xlib::XGrabButton(
                self.dpy,
                xlib::AnyButton as c_uint,
                xlib::AnyModifier,
                w.0,
                xlib::False,
                BUTTONMASK as c_uint,
                xlib::GrabModeAsync,
                xlib::GrabModeSync,
                0,
                0,
            );
        }
    }

    fn ungrab_buttons(&mut self, w: Window) {
        unsafe {
            xlib::XUngrabButton(self.dpy, xlib::AnyButton as c_uint, xlib::AnyModifier, w.0);
        }
    }

    fn keysym_for_keycode(&self, keycode: u32) -> u32 {
        unsafe { xlib::XKeycodeToKeysym(self.dpy, keycode as xlib::KeyCode, 0) as u32 }
    }

    fn font_height(&self) -> i32 {
        self.font.h
    }

    fn text_width(&self, text: &str) -> i32 {
        unsafe {
            let mut ext: x11::xrender::XGlyphInfo = std::mem::zeroed();
            xft::XftTextExtentsUtf8(
                self.dpy,
                self.font.xfont,
                text.as_ptr(),
                text.len() as c_int,
                &mut ext,
            );
            ext.xOff as i32
        }
    }

    fn create_drawable(&mut self, w: i32, h: i32) {
        unsafe {
            if !self.xftdraw.is_null() {
                xft::XftDrawDestroy(self.xftdraw);
            }
            if self.drawable != 0 {
                xlib::XFreePixmap(self.dpy, self.drawable);
            }
            self.drawable = xlib::XCreatePixmap(
                self.dpy,
                self.root,
                w.max(1) as c_uint,
                h.max(1) as c_uint,
                xlib::XDefaultDepth(self.dpy, self.screen) as c_uint,
            );
            self.drawable_h = h;
            self.xftdraw = xft::XftDrawCreate(
                self.dpy,
                self.drawable,
                xlib::XDefaultVisual(self.dpy, self.screen),
                xlib::XDefaultColormap(self.dpy, self.screen),
            );
        }
    }

    fn draw_text(&mut self, x: i32, w: i32, scheme: usize, text: Option<&str>, pad: bool) {
        unsafe {
            xlib::XSetForeground(self.dpy, self.gc, self.colors[scheme][2].pixel);
            xlib::XFillRectangle(
                self.dpy,
                self.drawable,
                self.gc,
                x,
                0,
                w.max(0) as c_uint,
                self.drawable_h as c_uint,
            );
            let text = match text {
                Some(t) if !t.is_empty() => t,
                _ => return,
            };

            let h = if pad { self.font.h } else { 0 };
            let y = (self.drawable_h + self.font.ascent - self.font.descent) / 2;
            let tx = x + h / 2;

            // Shorten with an ellipsis if the text overflows its cell.
            let mut buf = text.to_string();
            if self.text_width(&buf) > w - h {
                while !buf.is_empty() && self.text_width(&buf) + self.text_width("...") > w - h {
                    buf.pop();
                }
                buf.push_str("...");
            }
            if buf.is_empty() {
                return;
            }

            xft::XftDrawStringUtf8(
                self.xftdraw,
                &mut self.colors[scheme][1],
                self.font.xfont,
                tx,
                y,
                buf.as_ptr(),
                buf.len() as c_int,
            );
        }
    }

    fn draw_square(&mut self, x: i32, filled: bool, empty: bool, scheme: usize) {
        unsafe {
            xlib::XSetForeground(self.dpy, self.gc, self.colors[scheme][1].pixel);
            let s = (self.font.h + 2) / 4;
            if filled {
                xlib::XFillRectangle(
                    self.dpy,
                    self.drawable,
                    self.gc,
                    x + 1,
                    1,
                    (s + 1) as c_uint,
                    (s + 1) as c_uint,
                );
            } else if empty {
                xlib::XDrawRectangle(
                    self.dpy,
                    self.drawable,
                    self.gc,
                    x + 1,
                    1,
                    s as c_uint,
                    s as c_uint,
                );
            }
        }
    }

    fn copy_bar(&mut self, barwin: Window, w: i32) {
        unsafe {
            xlib::XCopyArea(
                self.dpy,
                self.drawable,
                barwin.0,
                self.gc,
                0,
                0,
                w.max(0) as c_uint,
                self.drawable_h as c_uint,
                0,
                0,
            );
            xlib::XSync(self.dpy, xlib::False);
        }
    }

    fn create_bar_window(&mut self, x: i32, y: i32, w: i32, h: i32) -> Window {
        unsafe {
            let mut wa: xlib::XSetWindowAttributes = std::mem::zeroed();
            wa.override_redirect = xlib::True;
            wa.background_pixmap = xlib::ParentRelative as xlib::Pixmap;
            wa.event_mask = xlib::ButtonPressMask | xlib::ExposureMask;
            let win = xlib::XCreateWindow(
                self.dpy,
                self.root,
                x,
                y,
                w.max(1) as c_uint,
                h.max(1) as c_uint,
                0,
                xlib::XDefaultDepth(self.dpy, self.screen),
                xlib::CopyFromParent as c_uint,
                xlib::XDefaultVisual(self.dpy, self.screen),
                xlib::CWOverrideRedirect | xlib::CWBackPixmap | xlib::CWEventMask,
                &mut wa,
            );
            xlib::XDefineCursor(self.dpy, win, self.cursor(Cur::Normal));
            xlib::XMapRaised(self.dpy, win);
            Window(win)
        }
    }

    fn connection_fd(&self) -> Option<i32> {
        unsafe { Some(xlib::XConnectionNumber(self.dpy)) }
    }

    fn check_other_wm(&mut self) -> Result<(), String> {
        unsafe {
            X_ERROR_OCCURRED = false;
            XERROR_XLIB = xlib::XSetErrorHandler(Some(xerror_start));
            // This causes an error if some other window manager is running.
            xlib::XSelectInput(self.dpy, self.root, xlib::SubstructureRedirectMask);
            xlib::XSync(self.dpy, xlib::False);
            if X_ERROR_OCCURRED {
                return Err("another window manager is already running".into());
            }
            xlib::XSetErrorHandler(Some(xerror));
            xlib::XSync(self.dpy, xlib::False);
            Ok(())
        }
    }
}

impl Drop for XWrapper {
    fn drop(&mut self) {
        unsafe {
            if !self.xftdraw.is_null() {
                xft::XftDrawDestroy(self.xftdraw);
            }
            if self.drawable != 0 {
                xlib::XFreePixmap(self.dpy, self.drawable);
            }
            xlib::XFreeGC(self.dpy, self.gc);
            for &c in &self.cursors {
                xlib::XFreeCursor(self.dpy, c);
            }
            xlib::XCloseDisplay(self.dpy);
        }
    }
}
