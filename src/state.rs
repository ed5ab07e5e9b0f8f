//! The management engine: process-wide state plus every model transition.
//!
//! `Rawm` owns the X transport, the monitor list and the client map. All
//! mutation happens on the event loop's thread; handlers in `events.rs` and
//! bindings in `actions.rs` call into the methods here.

use std::collections::HashMap;

use x11::xlib;

use crate::client::{Client, ClientHandle};
use crate::config::{self, Arrange};
use crate::events;
use crate::monitor::Monitor;
use crate::utils;
use crate::xconn::{
    Atom, ButtonSpec, Col, Cur, KeySpec, Net, ScreenGeom, TextProp, Window, WindowAttr, Wm, XConn,
    XEvent, ICONIC_STATE, NORMAL_STATE, WITHDRAWN_STATE,
};

pub const VERSION_STRING: &str = concat!("rawm ", env!("CARGO_PKG_VERSION"));

/// Hack to mark clients without a usable name.
pub const BROKEN: &str = "broken";

/// Window titles are bounded like the original's 256-byte buffer.
const NAME_MAX: usize = 255;

/// Tag names entered through `nametag` are bounded as well.
const TAGNAME_MAX: usize = 22;

pub struct Rawm<X: XConn> {
    pub conn: X,
    pub root: Window,
    /// X display screen geometry.
    pub sw: i32,
    pub sh: i32,
    /// Bar geometry.
    pub bh: i32,
    pub blw: i32,
    pub stext: String,
    pub numlockmask: u32,
    pub running: bool,
    pub restart: bool,
    pub mons: Vec<Monitor>,
    pub selmon: usize,
    pub clients: HashMap<ClientHandle, Client>,
    /// `_NET_WM_WINDOW_OPACITY` value, when the configured level is sane.
    pub opacity: Option<u32>,
    /// Monitor the pointer was last seen on, for root motion tracking.
    pub motion_mon: Option<usize>,
}

impl<X: XConn> Rawm<X> {
    pub fn new(conn: X) -> Self {
        let root = conn.root();
        let (sw, sh) = conn.screen_size();
        let bh = if config::USER_BH >= 1 {
            config::USER_BH
        } else {
            conn.font_height() + 2
        };
        let opacity = if (0.0..=1.0).contains(&config::DEFAULT_OPACITY) {
            Some((config::DEFAULT_OPACITY * u32::MAX as f64) as u32)
        } else {
            None
        };

        let mut wm = Rawm {
            conn,
            root,
            sw,
            sh,
            bh,
            blw: 0,
            stext: String::new(),
            numlockmask: 0,
            running: true,
            restart: false,
            mons: Vec::new(),
            selmon: 0,
            clients: HashMap::new(),
            opacity,
            motion_mon: None,
        };
        wm.setup();
        wm
    }

    fn setup(&mut self) {
        self.conn.create_drawable(self.sw, self.bh);
        self.update_geom();
        self.update_bars();
        self.update_status();
        self.conn.set_net_supported();
        self.conn.delete_client_list();
        self.conn.setup_root();
        self.grab_keys();
        self.focus(None);
        self.conn.sync(false);
    }

    /* Event loop. */

    pub fn run(&mut self) {
        self.conn.sync(false);
        while self.running {
            if utils::term_requested() {
                self.quit(false);
                break;
            }
            if utils::hup_requested() {
                self.quit(true);
                break;
            }
            match self.conn.next_event() {
                Some(ev) => events::dispatch(self, ev),
                None => break,
            }
        }
    }

    /// Manage pre-existing windows: non-transients first, then transients.
    pub fn scan(&mut self) {
        let wins = self.conn.query_tree_children(self.root);
        for &win in &wins {
            let Some(wa) = self.conn.get_window_attributes(win) else {
                continue;
            };
            if wa.override_redirect || self.conn.transient_for(win).is_some() {
                continue;
            }
            if wa.viewable || self.conn.wm_state(win) == Some(ICONIC_STATE) {
                self.manage(win, &wa);
            }
        }
        for &win in &wins {
            let Some(wa) = self.conn.get_window_attributes(win) else {
                continue;
            };
            if self.conn.transient_for(win).is_some()
                && (wa.viewable || self.conn.wm_state(win) == Some(ICONIC_STATE))
            {
                self.manage(win, &wa);
            }
        }
    }

    pub fn cleanup(&mut self) {
        self.view(!0);
        let m = self.selmon;
        let sellt = self.mons[m].sellt;
        self.mons[m].lt[sellt] = &config::LAYOUTS[1];
        for m in 0..self.mons.len() {
            while let Some(&h) = self.mons[m].stack.first() {
                self.unmanage(h, false);
            }
        }
        self.conn.ungrab_keys();
        for m in 0..self.mons.len() {
            let barwin = self.mons[m].barwin;
            if barwin != Window::default() {
                self.conn.destroy_window(barwin);
            }
        }
        self.conn.sync(false);
        self.conn.revert_input_focus();
        self.conn.delete_active_window();
    }

    /* Lookups. */

    pub fn win_to_client(&self, w: Window) -> Option<ClientHandle> {
        let handle = ClientHandle::from(w);
        self.clients.contains_key(&handle).then_some(handle)
    }

    pub fn win_to_mon(&self, w: Window) -> usize {
        if w == self.root {
            if let Some((x, y)) = self.conn.get_root_pointer() {
                return self.rect_to_mon(x, y, 1, 1);
            }
        }
        for (i, m) in self.mons.iter().enumerate() {
            if m.barwin == w {
                return i;
            }
        }
        if let Some(h) = self.win_to_client(w) {
            return self.clients[&h].mon;
        }
        self.selmon
    }

    pub fn rect_to_mon(&self, x: i32, y: i32, w: i32, h: i32) -> usize {
        let mut r = self.selmon;
        let mut area = 0;
        for (i, m) in self.mons.iter().enumerate() {
            let a = m.intersect_area(x, y, w, h);
            if a > area {
                area = a;
                r = i;
            }
        }
        r
    }

    pub fn dir_to_mon(&self, dir: i32) -> usize {
        if dir > 0 {
            (self.selmon + 1) % self.mons.len()
        } else {
            (self.selmon + self.mons.len() - 1) % self.mons.len()
        }
    }

    pub fn work_area(&self, m: usize) -> (i32, i32, i32, i32) {
        let mon = &self.mons[m];
        (mon.wx, mon.wy, mon.ww, mon.wh)
    }

    pub fn is_visible(&self, h: ClientHandle) -> bool {
        self.clients
            .get(&h)
            .map_or(false, |c| c.is_visible_on(&self.mons[c.mon]))
    }

    /// Visible non-floating clients in list order, the layout iterator.
    pub fn tiled_handles(&self, m: usize) -> Vec<ClientHandle> {
        self.mons[m]
            .clients
            .iter()
            .copied()
            .filter(|&h| {
                self.clients
                    .get(&h)
                    .map_or(false, |c| !c.isfloating && c.is_visible_on(&self.mons[m]))
            })
            .collect()
    }

    pub fn visible_handles(&self, m: usize) -> Vec<ClientHandle> {
        self.mons[m]
            .clients
            .iter()
            .copied()
            .filter(|&h| self.is_visible(h))
            .collect()
    }

    /* List maintenance. */

    fn attach(&mut self, h: ClientHandle) {
        let m = self.clients[&h].mon;
        self.mons[m].clients.insert(0, h);
    }

    fn detach(&mut self, h: ClientHandle) {
        let m = self.clients[&h].mon;
        self.mons[m].clients.retain(|&x| x != h);
    }

    fn attach_stack(&mut self, h: ClientHandle) {
        let m = self.clients[&h].mon;
        self.mons[m].stack.insert(0, h);
    }

    fn detach_stack(&mut self, h: ClientHandle) {
        let m = self.clients[&h].mon;
        self.mons[m].stack.retain(|&x| x != h);
        if self.mons[m].sel == Some(h) {
            let next = self.mons[m].stack.iter().copied().find(|&x| {
                self.clients
                    .get(&x)
                    .map_or(false, |c| c.is_visible_on(&self.mons[m]))
            });
            self.mons[m].sel = next;
        }
    }

    /* Focus. */

    pub fn focus(&mut self, handle: Option<ClientHandle>) {
        let mut sel = handle.filter(|&h| self.is_visible(h));
        if sel.is_none() {
            sel = self.mons[self.selmon]
                .stack
                .iter()
                .copied()
                .find(|&h| self.is_visible(h));
        }

        if let Some(prev) = self.mons[self.selmon].sel {
            if sel != Some(prev) {
                self.unfocus(prev, false);
            }
        }

        if let Some(h) = sel {
            let cmon = self.clients[&h].mon;
            if cmon != self.selmon {
                self.selmon = cmon;
            }
            if self.clients[&h].isurgent {
                self.clear_urgent(h);
            }
            self.detach_stack(h);
            self.attach_stack(h);
            self.grab_buttons(h, true);
            let win = self.clients[&h].win;
            self.conn.set_border_color(win, 1, Col::Border);
            self.set_focus(h);
        } else {
            self.conn.set_input_focus(self.root);
            self.conn.delete_active_window();
        }
        self.mons[self.selmon].sel = sel;
        self.draw_bars();
    }

    pub fn unfocus(&mut self, h: ClientHandle, setfocus: bool) {
        let Some(win) = self.clients.get(&h).map(|c| c.win) else {
            return;
        };
        self.grab_buttons(h, false);
        self.conn.set_border_color(win, 0, Col::Border);
        if setfocus {
            self.conn.set_input_focus(self.root);
            self.conn.delete_active_window();
        }
    }

    /// Hand X input focus to the client. `neverfocus` clients keep
    /// `_NET_ACTIVE_WINDOW` updated but are never given real focus.
    pub fn set_focus(&mut self, h: ClientHandle) {
        let (win, neverfocus) = {
            let c = &self.clients[&h];
            (c.win, c.neverfocus)
        };
        if !neverfocus {
            self.conn.set_input_focus(win);
        }
        self.conn.set_active_window(win);
        self.conn.send_wm_protocol(win, Wm::TakeFocus);
    }

    fn clear_urgent(&mut self, h: ClientHandle) {
        let win = {
            let c = self.clients.get_mut(&h).unwrap();
            c.isurgent = false;
            c.win
        };
        self.conn.clear_urgency_hint(win);
    }

    fn grab_buttons(&mut self, h: ClientHandle, focused: bool) {
        self.numlockmask = self.conn.numlock_mask();
        let Some(win) = self.clients.get(&h).map(|c| c.win) else {
            return;
        };
        self.conn.ungrab_buttons(win);
        if focused {
            for b in config::buttons() {
                if b.click == config::Click::ClientWin {
                    self.conn.grab_button(
                        win,
                        self.numlockmask,
                        ButtonSpec {
                            mask: b.mask,
                            button: b.button,
                        },
                    );
                }
            }
        } else {
            // Any click on an unfocused client must reach us to refocus.
            self.conn.grab_any_button(win);
        }
    }

    pub fn grab_keys(&mut self) {
        self.numlockmask = self.conn.numlock_mask();
        let specs: Vec<KeySpec> = config::keys()
            .iter()
            .map(|k| KeySpec {
                mask: k.mask,
                keysym: k.keysym,
            })
            .collect();
        self.conn.grab_keys(self.numlockmask, &specs);
    }

    pub fn clean_mask(&self, mask: u32) -> u32 {
        mask & !(self.numlockmask | xlib::LockMask)
            & (xlib::ShiftMask
                | xlib::ControlMask
                | xlib::Mod1Mask
                | xlib::Mod2Mask
                | xlib::Mod3Mask
                | xlib::Mod4Mask
                | xlib::Mod5Mask)
    }

    /// Padded text width for bar cells.
    pub fn text_w(&self, s: &str) -> i32 {
        self.conn.text_width(s) + self.conn.font_height()
    }

    /* Arranging. */

    pub fn arrange(&mut self, mon: Option<usize>) {
        match mon {
            Some(m) => {
                self.show_hide(m);
                self.arrange_mon(m);
            }
            None => {
                for m in 0..self.mons.len() {
                    self.show_hide(m);
                }
                for m in 0..self.mons.len() {
                    self.arrange_mon(m);
                }
            }
        }
    }

    fn arrange_mon(&mut self, m: usize) {
        let lt = self.mons[m].layout();
        self.mons[m].ltsymbol = lt.symbol.to_string();
        let n = self.tiled_handles(m).len();

        match lt.arrange {
            Some(ar) if ar != Arrange::Monocle && n > 1 => {
                self.restore_borders(m);
                ar.run(self, m);
            }
            None => {
                self.restore_borders(m);
            }
            // Monocle proper, and single tiled clients under any layout.
            Some(_) => {
                Arrange::Monocle.run(self, m);
            }
        }
        self.restack(m);
    }

    /// Give back the configured border to visible clients that lost it to
    /// monocle or fullscreen.
    fn restore_borders(&mut self, m: usize) {
        let float_layout = self.mons[m].layout().arrange.is_none();
        let handles = self.visible_handles(m);
        let (wx, wy, ww, wh) = self.work_area(m);
        for h in handles {
            let needs = {
                let c = &self.clients[&h];
                (float_layout || !c.isfloating) && c.bw != config::BORDERPX
            };
            if needs {
                let c = self.clients.get_mut(&h).unwrap();
                c.oldbw = c.bw;
                c.bw = config::BORDERPX;
                let bw = c.bw;
                self.resize_client(h, wx, wy, ww - 2 * bw, wh - 2 * bw);
            }
        }
    }

    fn show_hide(&mut self, m: usize) {
        let stack = self.mons[m].stack.clone();
        // Show visible clients top down.
        for &h in &stack {
            if !self.is_visible(h) {
                continue;
            }
            let (win, x, y, w, hh, floats, fullscreen) = {
                let c = &self.clients[&h];
                (c.win, c.x, c.y, c.w, c.h, c.isfloating, c.isfullscreen)
            };
            self.conn.move_window(win, x, y);
            let float_layout = self.mons[self.clients[&h].mon].layout().arrange.is_none();
            if (float_layout || floats) && !fullscreen {
                self.resize(h, x, y, w, hh, false);
            }
        }
        // Hide the rest bottom up.
        for &h in stack.iter().rev() {
            if self.is_visible(h) {
                continue;
            }
            let (win, y, width) = {
                let c = &self.clients[&h];
                (c.win, c.y, c.width())
            };
            self.conn.move_window(win, -2 * width, y);
        }
    }

    pub fn restack(&mut self, m: usize) {
        self.draw_bar(m);
        let Some(sel) = self.mons[m].sel else {
            return;
        };

        let float_layout = self.mons[m].layout().arrange.is_none();
        if self.clients[&sel].isfloating || float_layout {
            let win = self.clients[&sel].win;
            self.conn.raise_window(win);
        }

        if !float_layout {
            let mut sibling = self.mons[m].barwin;
            let stack = self.mons[m].stack.clone();
            for h in stack {
                let c = &self.clients[&h];
                if !c.isfloating && c.is_visible_on(&self.mons[m]) {
                    let win = c.win;
                    self.conn.restack_below(win, sibling);
                    sibling = win;
                }
            }
        }

        self.conn.sync(false);
        // The restack itself generates EnterNotify events; eat them so they
        // don't steal the focus.
        self.conn.drain_enter_events();
    }

    /* Resizing. */

    pub fn resize(&mut self, h: ClientHandle, x: i32, y: i32, w: i32, hh: i32, interact: bool) {
        let (mut x, mut y, mut w, mut hh) = (x, y, w, hh);
        if self.apply_size_hints(h, &mut x, &mut y, &mut w, &mut hh, interact) {
            self.resize_client(h, x, y, w, hh);
        }
    }

    pub fn resize_client(&mut self, h: ClientHandle, x: i32, y: i32, w: i32, hh: i32) {
        let (win, bw, m) = {
            let c = self.clients.get_mut(&h).unwrap();
            c.oldx = c.x;
            c.x = x;
            c.oldy = c.y;
            c.y = y;
            c.oldw = c.w;
            c.w = w;
            c.oldh = c.h;
            c.h = hh;
            (c.win, c.bw, c.mon)
        };

        // Borderless under monocle or with a single tiled client.
        let n = self.tiled_handles(m).len();
        let effective_bw = if self.mons[m].layout().arrange == Some(Arrange::Monocle) || n == 1 {
            0
        } else {
            bw
        };

        self.conn.configure_window(win, x, y, w, hh, effective_bw);
        self.send_configure(h);
        self.conn.sync(false);
    }

    pub fn send_configure(&mut self, h: ClientHandle) {
        let (win, x, y, w, hh, bw) = {
            let c = &self.clients[&h];
            (c.win, c.x, c.y, c.w, c.h, c.bw)
        };
        self.conn.send_configure_notify(win, x, y, w, hh, bw);
    }

    /// Normalize a proposed geometry against the screen (interactive moves)
    /// or the work area, then apply ICCCM size hints when they are honored.
    /// Returns whether the result differs from the client's current geometry.
    pub fn apply_size_hints(
        &mut self,
        h: ClientHandle,
        x: &mut i32,
        y: &mut i32,
        w: &mut i32,
        hh: &mut i32,
        interact: bool,
    ) -> bool {
        let c = self.clients[&h].clone();
        let m = &self.mons[c.mon];

        *w = (*w).max(1);
        *hh = (*hh).max(1);

        if interact {
            if *x > self.sw {
                *x = self.sw - c.width();
            }
            if *y > self.sh {
                *y = self.sh - c.height();
            }
            if *x + *w + 2 * c.bw < 0 {
                *x = 0;
            }
            if *y + *hh + 2 * c.bw < 0 {
                *y = 0;
            }
        } else {
            if *x >= m.wx + m.ww {
                *x = m.wx + m.ww - c.width();
            }
            if *y >= m.wy + m.wh {
                *y = m.wy + m.wh - c.height();
            }
            if *x + *w + 2 * c.bw <= m.wx {
                *x = m.wx;
            }
            if *y + *hh + 2 * c.bw <= m.wy {
                *y = m.wy;
            }
        }

        if *hh < self.bh {
            *hh = self.bh;
        }
        if *w < self.bh {
            *w = self.bh;
        }

        if config::RESIZE_HINTS || c.isfloating || m.layout().arrange.is_none() {
            // See the last two sentences in ICCCM 4.1.2.3.
            let baseismin = c.basew == c.minw && c.baseh == c.minh;
            if !baseismin {
                *w -= c.basew;
                *hh -= c.baseh;
            }

            if c.mina > 0.0 && c.maxa > 0.0 {
                if c.maxa < *w as f32 / *hh as f32 {
                    *w = (*hh as f32 * c.maxa + 0.5) as i32;
                } else if c.mina < *hh as f32 / *w as f32 {
                    *hh = (*w as f32 * c.mina + 0.5) as i32;
                }
            }

            if baseismin {
                // Increment calculation requires this.
                *w -= c.basew;
                *hh -= c.baseh;
            }

            if c.incw > 0 {
                *w -= *w % c.incw;
            }
            if c.inch > 0 {
                *hh -= *hh % c.inch;
            }

            *w = (*w + c.basew).max(c.minw);
            *hh = (*hh + c.baseh).max(c.minh);

            if c.maxw > 0 {
                *w = (*w).min(c.maxw);
            }
            if c.maxh > 0 {
                *hh = (*hh).min(c.maxh);
            }
        }

        *x != c.x || *y != c.y || *w != c.w || *hh != c.h
    }

    /* Manage / unmanage. */

    pub fn manage(&mut self, win: Window, wa: &WindowAttr) {
        let handle = ClientHandle::from(win);
        let mut c = Client::new(win, wa, self.selmon);
        c.name = self.fetch_title(win);
        self.clients.insert(handle, c);

        if let Some(op) = self.opacity {
            self.conn.set_window_opacity(win, op);
        }

        let trans = self
            .conn
            .transient_for(win)
            .and_then(|t| self.win_to_client(t));
        if let Some(t) = trans {
            let (tmon, ttags) = {
                let tc = &self.clients[&t];
                (tc.mon, tc.tags)
            };
            let c = self.clients.get_mut(&handle).unwrap();
            c.mon = tmon;
            c.tags = ttags;
        } else {
            self.apply_rules(handle);
        }

        // Clamp the initial geometry into the monitor's outer rectangle; the
        // y clamp keeps the client's center from covering a top bar.
        {
            let m = self.clients[&handle].mon;
            let (mx, my, mw, mh) = {
                let mon = &self.mons[m];
                (mon.mx, mon.my, mon.mw, mon.mh)
            };
            let (by, wx, ww) = (self.mons[m].by, self.mons[m].wx, self.mons[m].ww);
            let bh = self.bh;
            let c = self.clients.get_mut(&handle).unwrap();
            if c.x + c.width() > mx + mw {
                c.x = mx + mw - c.width();
            }
            if c.y + c.height() > my + mh {
                c.y = my + mh - c.height();
            }
            c.x = c.x.max(mx);
            let min_y = if by == my && c.x + c.w / 2 >= wx && c.x + c.w / 2 < wx + ww {
                bh
            } else {
                my
            };
            c.y = c.y.max(min_y);
            c.bw = config::BORDERPX;
        }

        let bw = self.clients[&handle].bw;
        self.conn.set_border_width(win, bw);
        self.conn.set_border_color(win, 0, Col::Border);
        // Propagates the border width even if the size doesn't change.
        self.send_configure(handle);

        self.update_window_type(handle);
        let hints = self.conn.normal_hints(win);
        if let Some(c) = self.clients.get_mut(&handle) {
            c.apply_normal_hints(hints);
        }
        self.update_wm_hints(handle);

        {
            let m = self.clients[&handle].mon;
            let float_layout = self.mons[m].layout().arrange.is_none();
            let (mx, my, mw, mh) = {
                let mon = &self.mons[m];
                (mon.mx, mon.my, mon.mw, mon.mh)
            };
            let c = self.clients.get_mut(&handle).unwrap();
            if c.iscentered || float_layout {
                c.x = mx + (mw - c.width()) / 2;
                c.y = my + (mh - c.height()) / 2;
            }
        }

        self.conn.select_client_input(win);
        self.grab_buttons(handle, false);

        {
            let isfixed = self.clients[&handle].isfixed;
            let c = self.clients.get_mut(&handle).unwrap();
            if !c.isfloating {
                c.isfloating = trans.is_some() || isfixed;
                c.oldstate = c.isfloating;
            }
        }
        if self.clients[&handle].isfloating {
            self.conn.raise_window(win);
        }

        self.attach(handle);
        self.attach_stack(handle);

        // Park the window off-screen until arrange places it, avoiding a
        // flash at the wrong position.
        let (cx, cy, cw, ch) = {
            let c = &self.clients[&handle];
            (c.x, c.y, c.w, c.h)
        };
        self.conn.move_resize_window(win, cx + 2 * self.sw, cy, cw, ch);
        self.conn.set_client_state(win, NORMAL_STATE);
        self.conn.append_client_list(win);

        let cmon = self.clients[&handle].mon;
        if cmon == self.selmon {
            if let Some(prev) = self.mons[self.selmon].sel {
                self.unfocus(prev, false);
            }
        }
        self.mons[cmon].sel = Some(handle);
        self.arrange(Some(cmon));
        self.conn.map_window(win);
        self.focus(None);
    }

    pub fn unmanage(&mut self, h: ClientHandle, destroyed: bool) {
        let Some((win, oldbw, m)) = self.clients.get(&h).map(|c| (c.win, c.oldbw, c.mon)) else {
            return;
        };

        self.detach(h);
        self.detach_stack(h);

        if !destroyed {
            // The server grab construct avoids race conditions.
            self.conn.grab_server();
            self.conn.set_error_ignore();
            self.conn.set_border_width(win, oldbw);
            self.conn.ungrab_buttons(win);
            self.conn.set_client_state(win, WITHDRAWN_STATE);
            self.conn.sync(false);
            self.conn.set_error_default();
            self.conn.ungrab_server();
        }

        self.clients.remove(&h);
        self.focus(None);
        self.update_client_list();
        self.arrange(Some(m));
    }

    fn fetch_title(&self, win: Window) -> String {
        let mut name = self
            .conn
            .text_prop(win, TextProp::NetWMName)
            .or_else(|| self.conn.text_prop(win, TextProp::WMName))
            .unwrap_or_default();
        if name.is_empty() {
            name = BROKEN.to_string();
        }
        truncate_to(&mut name, NAME_MAX);
        name
    }

    pub fn apply_rules(&mut self, h: ClientHandle) {
        let (win, name) = {
            let c = self.clients.get_mut(&h).unwrap();
            c.isfloating = false;
            c.tags = 0;
            (c.win, c.name.clone())
        };

        let (instance, class) = self.conn.class_hint(win);
        let class = class.unwrap_or_else(|| BROKEN.to_string());
        let instance = instance.unwrap_or_else(|| BROKEN.to_string());
        let role = self
            .conn
            .text_prop(win, TextProp::WindowRole)
            .unwrap_or_else(|| BROKEN.to_string());

        for r in config::RULES {
            let matches = r.title.map_or(true, |t| name.contains(t))
                && r.class.map_or(true, |cl| class.contains(cl))
                && r.instance.map_or(true, |i| instance.contains(i))
                && r.role.map_or(true, |ro| role.contains(ro));
            if matches {
                let target = self.mons.iter().position(|m| m.num as i32 == r.monitor);
                let c = self.clients.get_mut(&h).unwrap();
                c.iscentered = r.iscentered;
                c.isfloating = r.isfloating;
                c.tags |= r.tags;
                if let Some(mi) = target {
                    c.mon = mi;
                }
            }
        }

        let mon = self.clients[&h].mon;
        let fallback = self.mons[mon].tagset[self.mons[mon].seltags];
        let c = self.clients.get_mut(&h).unwrap();
        c.tags = if c.tags & config::TAGMASK != 0 {
            c.tags & config::TAGMASK
        } else {
            fallback
        };
    }

    /* Property refreshers. */

    pub fn update_title(&mut self, h: ClientHandle) {
        let Some(win) = self.clients.get(&h).map(|c| c.win) else {
            return;
        };
        let name = self.fetch_title(win);
        if let Some(c) = self.clients.get_mut(&h) {
            c.name = name;
        }
    }

    pub fn update_window_type(&mut self, h: ClientHandle) {
        let Some(win) = self.clients.get(&h).map(|c| c.win) else {
            return;
        };
        let state = self.conn.atom_prop(win, Atom::Net(Net::WMState));
        let wtype = self.conn.atom_prop(win, Atom::Net(Net::WMWindowType));

        if state == Some(self.conn.atom(Atom::Net(Net::WMFullscreen))) {
            self.set_fullscreen(h, true);
        }
        if wtype == Some(self.conn.atom(Atom::Net(Net::WMWindowTypeDialog))) {
            let c = self.clients.get_mut(&h).unwrap();
            c.iscentered = config::AUTOCENTER_DIALOGS;
            c.isfloating = true;
        }
    }

    pub fn update_wm_hints(&mut self, h: ClientHandle) {
        let Some(win) = self.clients.get(&h).map(|c| c.win) else {
            return;
        };
        let Some(hints) = self.conn.wm_hints(win) else {
            return;
        };
        let selected = self.mons[self.selmon].sel == Some(h);
        if selected && hints.urgent {
            // The selected client clears its own urgency.
            self.conn.clear_urgency_hint(win);
        } else if let Some(c) = self.clients.get_mut(&h) {
            c.isurgent = hints.urgent;
        }
        if let Some(c) = self.clients.get_mut(&h) {
            c.neverfocus = hints.input.map_or(false, |input| !input);
        }
    }

    pub fn update_status(&mut self) {
        self.stext = self
            .conn
            .text_prop(self.root, TextProp::WMName)
            .unwrap_or_else(|| VERSION_STRING.to_string());
        self.draw_bar(self.selmon);
    }

    pub fn update_client_list(&mut self) {
        self.conn.delete_client_list();
        for m in 0..self.mons.len() {
            for i in 0..self.mons[m].clients.len() {
                let h = self.mons[m].clients[i];
                let win = self.clients[&h].win;
                self.conn.append_client_list(win);
            }
        }
    }

    /* Monitors. */

    /// Rebuild the monitor list from Xinerama heads, deduplicated by
    /// geometry; fall back to one monitor covering the whole screen.
    pub fn update_geom(&mut self) -> bool {
        let mut dirty = false;
        let mut unique: Vec<ScreenGeom> = Vec::new();
        for head in self.conn.monitors() {
            if !unique.contains(&head) {
                unique.push(head);
            }
        }

        if unique.is_empty() {
            if self.mons.is_empty() {
                self.mons.push(Monitor::new(0));
            }
            let bh = self.bh;
            let m = &mut self.mons[0];
            if m.mw != self.sw || m.mh != self.sh {
                dirty = true;
                m.mw = self.sw;
                m.ww = self.sw;
                m.mh = self.sh;
                m.wh = self.sh;
                m.update_bar_pos(bh);
            }
        } else {
            let n = self.mons.len();
            let nn = unique.len();
            if n <= nn {
                for i in n..nn {
                    self.mons.push(Monitor::new(i));
                }
                let bh = self.bh;
                for (i, head) in unique.iter().enumerate() {
                    let m = &mut self.mons[i];
                    if i >= n
                        || head.x != m.mx
                        || head.y != m.my
                        || head.w != m.mw
                        || head.h != m.mh
                    {
                        dirty = true;
                        m.num = i;
                        m.mx = head.x;
                        m.wx = head.x;
                        m.my = head.y;
                        m.wy = head.y;
                        m.mw = head.w;
                        m.ww = head.w;
                        m.mh = head.h;
                        m.wh = head.h;
                        m.update_bar_pos(bh);
                    }
                }
            } else {
                // Fewer heads: migrate orphaned clients to the first monitor.
                for i in (nn..n).rev() {
                    dirty = true;
                    let mut removed = self.mons.remove(i);
                    if removed.barwin != Window::default() {
                        self.conn.destroy_window(removed.barwin);
                    }
                    for h in removed.clients.drain(..) {
                        if let Some(c) = self.clients.get_mut(&h) {
                            c.mon = 0;
                        }
                        self.mons[0].clients.insert(0, h);
                        self.mons[0].stack.insert(0, h);
                    }
                    if self.selmon >= self.mons.len() {
                        self.selmon = 0;
                    }
                }
            }
        }

        if dirty {
            self.selmon = 0;
            self.selmon = self.win_to_mon(self.root);
        }
        dirty
    }

    pub fn update_bars(&mut self) {
        for m in 0..self.mons.len() {
            let (wx, by, ww) = {
                let mon = &self.mons[m];
                (mon.wx, mon.by, mon.ww)
            };
            if self.mons[m].barwin == Window::default() {
                let barwin = self.conn.create_bar_window(wx, by, ww, self.bh);
                self.mons[m].barwin = barwin;
                if let Some(op) = self.opacity {
                    self.conn.set_window_opacity(barwin, op);
                }
            } else {
                let barwin = self.mons[m].barwin;
                self.conn.move_resize_window(barwin, wx, by, ww, self.bh);
            }
        }
    }

    pub fn send_mon(&mut self, h: ClientHandle, m: usize) {
        if self.clients[&h].mon == m {
            return;
        }
        self.unfocus(h, true);
        self.detach(h);
        self.detach_stack(h);
        {
            let tags = self.mons[m].tagset[self.mons[m].seltags];
            let c = self.clients.get_mut(&h).unwrap();
            c.mon = m;
            // Not tag-preserving: the client adopts the target's view.
            c.tags = tags;
        }
        self.attach(h);
        self.attach_stack(h);
        self.focus(None);
        self.arrange(None);
    }

    /* Fullscreen. */

    pub fn set_fullscreen(&mut self, h: ClientHandle, fullscreen: bool) {
        let Some(win) = self.clients.get(&h).map(|c| c.win) else {
            return;
        };
        if fullscreen {
            self.conn.set_fullscreen_prop(win, true);
            let m = {
                let c = self.clients.get_mut(&h).unwrap();
                c.isfullscreen = true;
                c.oldstate = c.isfloating;
                c.oldbw = c.bw;
                c.bw = 0;
                c.isfloating = true;
                c.mon
            };
            let (mx, my, mw, mh) = {
                let mon = &self.mons[m];
                (mon.mx, mon.my, mon.mw, mon.mh)
            };
            self.resize_client(h, mx, my, mw, mh);
            self.conn.raise_window(win);
        } else {
            self.conn.set_fullscreen_prop(win, false);
            let m = {
                let c = self.clients.get_mut(&h).unwrap();
                c.isfullscreen = false;
                c.isfloating = c.oldstate;
                c.bw = c.oldbw;
                c.x = c.oldx;
                c.y = c.oldy;
                c.w = c.oldw;
                c.h = c.oldh;
                c.mon
            };
            let (x, y, w, hh) = {
                let c = &self.clients[&h];
                (c.x, c.y, c.w, c.h)
            };
            self.resize_client(h, x, y, w, hh);
            self.arrange(Some(m));
        }
    }

    /* Tag and layout actions. */

    fn apply_pertag(&mut self, m: usize) {
        let curtag = self.mons[m].pertag.curtag;
        {
            let mon = &mut self.mons[m];
            mon.nmaster = mon.pertag.nmasters[curtag];
            mon.mfact = mon.pertag.mfacts[curtag];
            mon.sellt = mon.pertag.sellts[curtag];
            mon.lt[mon.sellt] = mon.pertag.ltidxs[curtag][mon.sellt];
            mon.lt[mon.sellt ^ 1] = mon.pertag.ltidxs[curtag][mon.sellt ^ 1];
        }
        if self.mons[m].showbar != self.mons[m].pertag.showbars[curtag] {
            self.toggle_bar();
        }
    }

    pub fn view(&mut self, mask: u32) {
        let m = self.selmon;
        {
            let mon = &mut self.mons[m];
            if mask & config::TAGMASK == mon.tagset[mon.seltags] {
                return;
            }
            mon.seltags ^= 1;
            let masked = mask & config::TAGMASK;
            if masked != 0 {
                mon.pertag.prevtag = mon.pertag.curtag;
                mon.tagset[mon.seltags] = masked;
                mon.pertag.curtag = if mask == !0 {
                    0
                } else {
                    masked.trailing_zeros() as usize + 1
                };
            } else {
                std::mem::swap(&mut mon.pertag.prevtag, &mut mon.pertag.curtag);
            }
        }
        self.apply_pertag(m);
        self.focus(None);
        self.arrange(Some(m));
    }

    pub fn toggle_view(&mut self, mask: u32) {
        let m = self.selmon;
        {
            let mon = &mut self.mons[m];
            let newtags = mon.tagset[mon.seltags] ^ (mask & config::TAGMASK);
            if newtags == 0 {
                return;
            }
            if newtags == config::TAGMASK {
                mon.pertag.prevtag = mon.pertag.curtag;
                mon.pertag.curtag = 0;
            }
            // Did the user just hide the current tag?
            if mon.pertag.curtag != 0 && newtags & (1 << (mon.pertag.curtag - 1)) == 0 {
                mon.pertag.prevtag = mon.pertag.curtag;
                mon.pertag.curtag = newtags.trailing_zeros() as usize + 1;
            }
            mon.tagset[mon.seltags] = newtags;
        }
        self.apply_pertag(m);
        self.focus(None);
        self.arrange(Some(m));
    }

    pub fn tag(&mut self, mask: u32) {
        let m = self.selmon;
        let Some(sel) = self.mons[m].sel else {
            return;
        };
        if mask & config::TAGMASK == 0 {
            return;
        }
        if let Some(c) = self.clients.get_mut(&sel) {
            c.tags = mask & config::TAGMASK;
        }
        self.focus(None);
        self.arrange(Some(m));
    }

    pub fn toggle_tag(&mut self, mask: u32) {
        let m = self.selmon;
        let Some(sel) = self.mons[m].sel else {
            return;
        };
        let newtags = self.clients[&sel].tags ^ (mask & config::TAGMASK);
        if newtags == 0 {
            return;
        }
        if let Some(c) = self.clients.get_mut(&sel) {
            c.tags = newtags;
        }
        self.focus(None);
        self.arrange(Some(m));
    }

    pub fn set_layout(&mut self, idx: Option<usize>) {
        let m = self.selmon;
        let lt = idx.map(|i| &config::LAYOUTS[i % config::LAYOUTS.len()]);
        {
            let mon = &mut self.mons[m];
            let curtag = mon.pertag.curtag;
            let same = lt.map_or(false, |l| std::ptr::eq(l, mon.lt[mon.sellt]));
            if lt.is_none() || !same {
                mon.pertag.sellts[curtag] ^= 1;
                mon.sellt = mon.pertag.sellts[curtag];
            }
            if let Some(l) = lt {
                mon.pertag.ltidxs[curtag][mon.sellt] = l;
            }
            mon.lt[mon.sellt] = mon.pertag.ltidxs[curtag][mon.sellt];
            mon.ltsymbol = mon.lt[mon.sellt].symbol.to_string();
        }
        if self.mons[m].sel.is_some() {
            self.arrange(Some(m));
        } else {
            self.draw_bar(m);
        }
    }

    /// Deltas below 1.0 adjust the current factor; values above 1.0 set it
    /// absolutely as `f - 1.0`. Results outside [0.1, 0.9] are refused.
    pub fn set_mfact(&mut self, f: f32) {
        let m = self.selmon;
        if self.mons[m].layout().arrange.is_none() {
            return;
        }
        let f = if f < 1.0 {
            f + self.mons[m].mfact
        } else {
            f - 1.0
        };
        if !(0.1..=0.9).contains(&f) {
            return;
        }
        let curtag = self.mons[m].pertag.curtag;
        self.mons[m].mfact = f;
        self.mons[m].pertag.mfacts[curtag] = f;
        self.arrange(Some(m));
    }

    pub fn inc_nmaster(&mut self, i: i32) {
        let m = self.selmon;
        let curtag = self.mons[m].pertag.curtag;
        let n = (self.mons[m].nmaster + i).max(0);
        self.mons[m].nmaster = n;
        self.mons[m].pertag.nmasters[curtag] = n;
        self.arrange(Some(m));
    }

    pub fn toggle_bar(&mut self) {
        let m = self.selmon;
        let curtag = self.mons[m].pertag.curtag;
        let show = !self.mons[m].showbar;
        self.mons[m].showbar = show;
        self.mons[m].pertag.showbars[curtag] = show;
        let bh = self.bh;
        self.mons[m].update_bar_pos(bh);
        let (barwin, wx, by, ww) = {
            let mon = &self.mons[m];
            (mon.barwin, mon.wx, mon.by, mon.ww)
        };
        self.conn.move_resize_window(barwin, wx, by, ww, bh);
        self.arrange(Some(m));
    }

    pub fn toggle_floating(&mut self) {
        let m = self.selmon;
        let Some(sel) = self.mons[m].sel else {
            return;
        };
        let (floating, x, y, w, hh, bw) = {
            let c = self.clients.get_mut(&sel).unwrap();
            c.isfloating = !c.isfloating || c.isfixed;
            if c.isfloating && c.bw != config::BORDERPX {
                c.oldbw = c.bw;
                c.bw = config::BORDERPX;
            }
            (c.isfloating, c.x, c.y, c.w, c.h, c.bw)
        };
        if floating {
            self.resize(sel, x, y, w - 2 * bw, hh - 2 * bw, false);
        }
        self.arrange(Some(m));
    }

    pub fn toggle_fullscreen(&mut self) {
        let m = self.selmon;
        if let Some(sel) = self.mons[m].sel {
            let fs = self.clients[&sel].isfullscreen;
            self.set_fullscreen(sel, !fs);
        }
    }

    /* Focus movement. */

    pub fn focus_stack(&mut self, dir: i32) {
        let m = self.selmon;
        let Some(sel) = self.mons[m].sel else {
            return;
        };
        let list = self.mons[m].clients.clone();
        let Some(pos) = list.iter().position(|&h| h == sel) else {
            return;
        };

        let target = if dir > 0 {
            list[pos + 1..]
                .iter()
                .copied()
                .find(|&h| self.is_visible(h))
                .or_else(|| list.iter().copied().find(|&h| self.is_visible(h)))
        } else {
            list[..pos]
                .iter()
                .copied()
                .filter(|&h| self.is_visible(h))
                .last()
                .or_else(|| {
                    list[pos..]
                        .iter()
                        .copied()
                        .filter(|&h| self.is_visible(h))
                        .last()
                })
        };

        if let Some(t) = target {
            self.focus(Some(t));
            self.restack(m);
        }
    }

    /// Focus the i-th (1-based) visible client in list order.
    pub fn focus_nstack(&mut self, i: i32) {
        let m = self.selmon;
        if self.mons[m].sel.is_none() || i <= 0 {
            return;
        }
        let visible = self.visible_handles(m);
        if let Some(&t) = visible.get(i as usize - 1) {
            self.focus(Some(t));
            self.restack(m);
        }
    }

    pub fn focus_mon(&mut self, dir: i32) {
        if self.mons.len() <= 1 {
            return;
        }
        let m = self.dir_to_mon(dir);
        if m == self.selmon {
            return;
        }
        if let Some(sel) = self.mons[self.selmon].sel {
            self.unfocus(sel, true);
        }
        self.selmon = m;
        self.focus(None);
    }

    pub fn tag_mon(&mut self, dir: i32) {
        if self.mons[self.selmon].sel.is_none() || self.mons.len() <= 1 {
            return;
        }
        let target = self.dir_to_mon(dir);
        if let Some(sel) = self.mons[self.selmon].sel {
            self.send_mon(sel, target);
        }
    }

    /// Promote the selected tiled client to master, or the next tiled one
    /// if it already is master.
    pub fn zoom(&mut self) {
        let m = self.selmon;
        let Some(mut c) = self.mons[m].sel else {
            return;
        };
        if self.mons[m].layout().arrange.is_none() || self.clients[&c].isfloating {
            return;
        }
        let tiled = self.tiled_handles(m);
        if tiled.first() == Some(&c) {
            match tiled.get(1) {
                Some(&next) => c = next,
                None => return,
            }
        }
        self.pop(c);
    }

    pub fn pop(&mut self, h: ClientHandle) {
        self.detach(h);
        self.attach(h);
        self.focus(Some(h));
        let m = self.clients[&h].mon;
        self.arrange(Some(m));
    }

    pub fn kill_client(&mut self) {
        let Some(sel) = self.mons[self.selmon].sel else {
            return;
        };
        let win = self.clients[&sel].win;
        if !self.conn.send_wm_protocol(win, Wm::Delete) {
            self.conn.grab_server();
            self.conn.set_error_ignore();
            self.conn.kill_client(win);
            self.conn.sync(false);
            self.conn.set_error_default();
            self.conn.ungrab_server();
        }
    }

    /// View the tag set of the window holding the X input focus.
    pub fn win_view(&mut self) {
        let Some(mut win) = self.conn.get_input_focus() else {
            return;
        };
        while let Some((root, parent)) = self.conn.query_parent(win) {
            if parent == root || parent == Window::default() {
                break;
            }
            win = parent;
        }
        if let Some(h) = self.win_to_client(win) {
            let tags = self.clients[&h].tags;
            self.view(tags);
        }
    }

    /// Rename every tag in the current view via dmenu. Deliberately
    /// synchronous: the event loop waits for the prompt.
    pub fn name_tag(&mut self) {
        let prompt = std::process::Command::new("dmenu")
            .args(["-p", "Current tag name: "])
            .args(["-fn", config::FONT])
            .args(["-nb", config::COLORS[0][2], "-nf", config::COLORS[0][1]])
            .args(["-sb", config::COLORS[1][2], "-sf", config::COLORS[1][1]])
            .stdin(std::process::Stdio::null())
            .output();

        let output = match prompt {
            Ok(out) => out,
            Err(e) => {
                log::error!("nametag: could not run dmenu: {}", e);
                return;
            }
        };

        let mut name = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or("")
            .to_string();
        truncate_to(&mut name, TAGNAME_MAX);

        let m = self.selmon;
        let tagset = self.mons[m].tagset[self.mons[m].seltags];
        for i in 0..config::TAGS {
            if tagset & (1 << i) != 0 {
                self.mons[m].tag_names[i] = if name.is_empty() {
                    format!("{}", i + 1)
                } else {
                    format!("{}/{}", i + 1, name)
                };
            }
        }
        self.draw_bar(m);
    }

    pub fn quit(&mut self, restart: bool) {
        if restart {
            self.restart = true;
        }
        self.running = false;
    }

    /* Mouse move / resize. */

    pub fn move_mouse(&mut self) {
        let Some(h) = self.mons[self.selmon].sel else {
            return;
        };
        self.restack(self.selmon);
        let (ocx, ocy) = {
            let c = &self.clients[&h];
            (c.x, c.y)
        };
        if !self.conn.grab_pointer(Cur::Move) {
            return;
        }
        let Some((px, py)) = self.conn.get_root_pointer() else {
            self.conn.ungrab_pointer();
            return;
        };

        loop {
            let ev = self.conn.mask_event();
            match ev {
                XEvent::ConfigureRequest { .. }
                | XEvent::Expose { .. }
                | XEvent::MapRequest { .. } => events::dispatch(self, ev),
                XEvent::MotionNotify { x_root, y_root, .. } => {
                    let mut nx = ocx + (x_root - px);
                    let mut ny = ocy + (y_root - py);
                    let (wx, wy, ww, wh) = self.work_area(self.selmon);
                    let (cw, chh, floating) = {
                        let c = &self.clients[&h];
                        (c.width(), c.height(), c.isfloating)
                    };
                    let tiled_layout = self.mons[self.selmon].layout().arrange.is_some();
                    if nx >= wx && nx <= wx + ww && ny >= wy && ny <= wy + wh {
                        if (wx - nx).abs() < config::SNAP {
                            nx = wx;
                        } else if ((wx + ww) - (nx + cw)).abs() < config::SNAP {
                            nx = wx + ww - cw;
                        }
                        if (wy - ny).abs() < config::SNAP {
                            ny = wy;
                        } else if ((wy + wh) - (ny + chh)).abs() < config::SNAP {
                            ny = wy + wh - chh;
                        }
                        let (cx, cy) = {
                            let c = &self.clients[&h];
                            (c.x, c.y)
                        };
                        if !floating
                            && tiled_layout
                            && ((nx - cx).abs() > config::SNAP || (ny - cy).abs() > config::SNAP)
                        {
                            self.toggle_floating();
                        }
                    }
                    let floating = self.clients[&h].isfloating;
                    if !tiled_layout || floating {
                        let (w, hh) = {
                            let c = &self.clients[&h];
                            (c.w, c.h)
                        };
                        self.resize(h, nx, ny, w, hh, true);
                    }
                }
                XEvent::ButtonRelease { .. } => break,
                _ => {}
            }
        }
        self.conn.ungrab_pointer();

        let (cx, cy, cw, ch) = {
            let c = &self.clients[&h];
            (c.x, c.y, c.w, c.h)
        };
        let target = self.rect_to_mon(cx, cy, cw, ch);
        if target != self.selmon {
            self.send_mon(h, target);
            self.selmon = target;
            self.focus(None);
        }
    }

    pub fn resize_mouse(&mut self) {
        let Some(h) = self.mons[self.selmon].sel else {
            return;
        };
        self.restack(self.selmon);
        let (ocx, ocy) = {
            let c = &self.clients[&h];
            (c.x, c.y)
        };
        if !self.conn.grab_pointer(Cur::Resize) {
            return;
        }
        {
            let c = &self.clients[&h];
            let (win, w, hh, bw) = (c.win, c.w, c.h, c.bw);
            self.conn.warp_pointer(win, w + bw - 1, hh + bw - 1);
        }

        loop {
            let ev = self.conn.mask_event();
            match ev {
                XEvent::ConfigureRequest { .. }
                | XEvent::Expose { .. }
                | XEvent::MapRequest { .. } => events::dispatch(self, ev),
                XEvent::MotionNotify { x_root, y_root, .. } => {
                    let bw = self.clients[&h].bw;
                    let nw = (x_root - ocx - 2 * bw + 1).max(1);
                    let nh = (y_root - ocy - 2 * bw + 1).max(1);
                    let (wx, wy, ww, wh) = self.work_area(self.selmon);
                    let cmon_wx = self.mons[self.clients[&h].mon].wx;
                    let cmon_wy = self.mons[self.clients[&h].mon].wy;
                    let tiled_layout = self.mons[self.selmon].layout().arrange.is_some();
                    if cmon_wx + nw >= wx
                        && cmon_wx + nw <= wx + ww
                        && cmon_wy + nh >= wy
                        && cmon_wy + nh <= wy + wh
                    {
                        let (cw, chh, floating) = {
                            let c = &self.clients[&h];
                            (c.w, c.h, c.isfloating)
                        };
                        if !floating
                            && tiled_layout
                            && ((nw - cw).abs() > config::SNAP || (nh - chh).abs() > config::SNAP)
                        {
                            self.toggle_floating();
                        }
                    }
                    let floating = self.clients[&h].isfloating;
                    if !tiled_layout || floating {
                        let (cx, cy) = {
                            let c = &self.clients[&h];
                            (c.x, c.y)
                        };
                        self.resize(h, cx, cy, nw, nh, true);
                    }
                }
                XEvent::ButtonRelease { .. } => break,
                _ => {}
            }
        }

        {
            let c = &self.clients[&h];
            let (win, w, hh, bw) = (c.win, c.w, c.h, c.bw);
            self.conn.warp_pointer(win, w + bw - 1, hh + bw - 1);
        }
        self.conn.ungrab_pointer();
        self.conn.drain_enter_events();

        let (cx, cy, cw, ch) = {
            let c = &self.clients[&h];
            (c.x, c.y, c.w, c.h)
        };
        let target = self.rect_to_mon(cx, cy, cw, ch);
        if target != self.selmon {
            self.send_mon(h, target);
            self.selmon = target;
            self.focus(None);
        }
    }
}

/// Truncate a string to at most `max` bytes on a char boundary.
fn truncate_to(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}
