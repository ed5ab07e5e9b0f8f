use x11::xlib;

use crate::monitor::Monitor;
use crate::xconn::{NormalHints, Window, WindowAttr};

/// Stable key for a managed client; clients are owned by the engine's
/// handle map, monitors only hold orderings of handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientHandle(pub u64);

impl From<Window> for ClientHandle {
    fn from(w: Window) -> Self {
        ClientHandle(w.0)
    }
}

/// A managed top-level window.
#[derive(Debug, Clone)]
pub struct Client {
    pub name: String,
    pub mina: f32,
    pub maxa: f32,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub oldx: i32,
    pub oldy: i32,
    pub oldw: i32,
    pub oldh: i32,
    pub basew: i32,
    pub baseh: i32,
    pub incw: i32,
    pub inch: i32,
    pub maxw: i32,
    pub maxh: i32,
    pub minw: i32,
    pub minh: i32,
    pub bw: i32,
    pub oldbw: i32,
    pub tags: u32,
    pub isfixed: bool,
    pub isfloating: bool,
    pub iscentered: bool,
    pub isurgent: bool,
    pub neverfocus: bool,
    /// Saved `isfloating` across fullscreen.
    pub oldstate: bool,
    pub isfullscreen: bool,
    /// Index of the owning monitor.
    pub mon: usize,
    pub win: Window,
}

impl Client {
    pub fn new(win: Window, wa: &WindowAttr, mon: usize) -> Self {
        Client {
            name: String::new(),
            mina: 0.0,
            maxa: 0.0,
            x: wa.x,
            y: wa.y,
            w: wa.w,
            h: wa.h,
            oldx: wa.x,
            oldy: wa.y,
            oldw: wa.w,
            oldh: wa.h,
            basew: 0,
            baseh: 0,
            incw: 0,
            inch: 0,
            maxw: 0,
            maxh: 0,
            minw: 0,
            minh: 0,
            bw: 0,
            oldbw: wa.border_width,
            tags: 0,
            isfixed: false,
            isfloating: false,
            iscentered: false,
            isurgent: false,
            neverfocus: false,
            oldstate: false,
            isfullscreen: false,
            mon,
            win,
        }
    }

    /// Outer width including borders.
    pub fn width(&self) -> i32 {
        self.w + 2 * self.bw
    }

    /// Outer height including borders.
    pub fn height(&self) -> i32 {
        self.h + 2 * self.bw
    }

    pub fn is_visible_on(&self, m: &Monitor) -> bool {
        self.tags & m.tagset[m.seltags] != 0
    }

    /// Refresh the size-hint cache from `WM_NORMAL_HINTS`. Flag priority
    /// follows ICCCM: base falls back to min, min falls back to base.
    pub fn apply_normal_hints(&mut self, hints: Option<NormalHints>) {
        // Without hints, behave as if only PSize were set.
        let size = hints.unwrap_or(NormalHints {
            flags: xlib::PSize as i64,
            ..Default::default()
        });

        if size.flags & xlib::PBaseSize as i64 != 0 {
            self.basew = size.base_w;
            self.baseh = size.base_h;
        } else if size.flags & xlib::PMinSize as i64 != 0 {
            self.basew = size.min_w;
            self.baseh = size.min_h;
        } else {
            self.basew = 0;
            self.baseh = 0;
        }

        if size.flags & xlib::PResizeInc as i64 != 0 {
            self.incw = size.inc_w;
            self.inch = size.inc_h;
        } else {
            self.incw = 0;
            self.inch = 0;
        }

        if size.flags & xlib::PMaxSize as i64 != 0 {
            self.maxw = size.max_w;
            self.maxh = size.max_h;
        } else {
            self.maxw = 0;
            self.maxh = 0;
        }

        if size.flags & xlib::PMinSize as i64 != 0 {
            self.minw = size.min_w;
            self.minh = size.min_h;
        } else if size.flags & xlib::PBaseSize as i64 != 0 {
            self.minw = size.base_w;
            self.minh = size.base_h;
        } else {
            self.minw = 0;
            self.minh = 0;
        }

        if size.flags & xlib::PAspect as i64 != 0
            && size.min_aspect_num > 0
            && size.max_aspect_den > 0
        {
            self.mina = size.min_aspect_den as f32 / size.min_aspect_num as f32;
            self.maxa = size.max_aspect_num as f32 / size.max_aspect_den as f32;
        } else {
            self.mina = 0.0;
            self.maxa = 0.0;
        }

        self.isfixed = self.maxw != 0
            && self.minw != 0
            && self.maxh != 0
            && self.minh != 0
            && self.maxw == self.minw
            && self.maxh == self.minh;
    }
}
