//! The event dispatcher: one handler per X event type, selected by a single
//! match. Handlers mutate the model and trigger arranging and bar redraws.

use x11::xlib;

use crate::config::{self, Click};
use crate::state::Rawm;
use crate::xconn::{Atom, Net, Window, XConn, XEvent, WITHDRAWN_STATE};

pub fn dispatch<X: XConn>(wm: &mut Rawm<X>, ev: XEvent) {
    match ev {
        XEvent::ButtonPress {
            window,
            x,
            button,
            state,
            ..
        } => button_press(wm, window, x, button, state),
        XEvent::ClientMessage {
            window,
            message_type,
            data,
        } => client_message(wm, window, message_type, data),
        XEvent::ConfigureRequest { .. } => configure_request(wm, ev),
        XEvent::ConfigureNotify { window, width, height } => {
            configure_notify(wm, window, width, height)
        }
        XEvent::DestroyNotify { window } => destroy_notify(wm, window),
        XEvent::EnterNotify { window, mode, detail } => enter_notify(wm, window, mode, detail),
        XEvent::Expose { window, count } => expose(wm, window, count),
        XEvent::FocusIn { window } => focus_in(wm, window),
        XEvent::KeyPress { keycode, state } => key_press(wm, keycode, state),
        XEvent::MappingNotify { keyboard } => mapping_notify(wm, keyboard),
        XEvent::MapRequest { window } => map_request(wm, window),
        XEvent::MotionNotify { window, x_root, y_root } => {
            motion_notify(wm, window, x_root, y_root)
        }
        XEvent::PropertyNotify { window, atom, deleted } => {
            property_notify(wm, window, atom, deleted)
        }
        XEvent::UnmapNotify { window, send_event } => unmap_notify(wm, window, send_event),
        // Systray resize requests are out of scope; button releases only
        // matter inside the mouse-grab loops.
        XEvent::ResizeRequest { .. } | XEvent::ButtonRelease { .. } => {}
    }
}

fn button_press<X: XConn>(wm: &mut Rawm<X>, window: Window, ex: i32, button: u32, state: u32) {
    // Focus the monitor under the click if necessary.
    let m = wm.win_to_mon(window);
    if m != wm.selmon {
        if let Some(sel) = wm.mons[wm.selmon].sel {
            wm.unfocus(sel, true);
        }
        wm.selmon = m;
        wm.focus(None);
    }

    let mut click = Click::RootWin;
    let mut clicked_tag: u32 = 0;

    if window == wm.mons[wm.selmon].barwin {
        let m = wm.selmon;
        let mut occ: u32 = 0;
        for &h in &wm.mons[m].clients {
            let tags = wm.clients[&h].tags;
            // The all-tags shortcut mask never marks tags as occupied.
            occ |= if tags == 255 { 0 } else { tags };
        }

        let tagset = wm.mons[m].tagset[wm.mons[m].seltags];
        let mut x = 0;
        let mut hit = None;
        for i in 0..config::TAGS {
            if occ & 1 << i == 0 && tagset & 1 << i == 0 {
                continue; // vacant tags take no bar space
            }
            x += wm.text_w(&wm.mons[m].tag_names[i]);
            if ex < x {
                hit = Some(i);
                break;
            }
        }

        if let Some(i) = hit {
            click = Click::TagBar;
            clicked_tag = 1 << i;
        } else if ex < x + wm.blw {
            click = Click::LtSymbol;
        } else if config::SHOW_WINTITLE
            && ex <= wm.mons[m].ww - wm.status_width()
        {
            click = Click::WinTitle;
        } else {
            click = Click::StatusText;
        }
    } else if let Some(h) = wm.win_to_client(window) {
        wm.focus(Some(h));
        click = Click::ClientWin;
    }

    for b in config::buttons() {
        if b.click == click
            && b.button == button
            && wm.clean_mask(b.mask) == wm.clean_mask(state)
        {
            let action = if click == Click::TagBar {
                b.action.with_tag_mask(clicked_tag)
            } else {
                b.action
            };
            action.run(wm);
        }
    }
}

fn key_press<X: XConn>(wm: &mut Rawm<X>, keycode: u32, state: u32) {
    let keysym = wm.conn.keysym_for_keycode(keycode);
    for k in config::keys() {
        if keysym == k.keysym && wm.clean_mask(k.mask) == wm.clean_mask(state) {
            k.action.run(wm);
        }
    }
}

fn client_message<X: XConn>(wm: &mut Rawm<X>, window: Window, message_type: u64, data: [i64; 5]) {
    let Some(h) = wm.win_to_client(window) else {
        return;
    };

    if message_type == wm.conn.atom(Atom::Net(Net::WMState)) {
        let fullscreen = wm.conn.atom(Atom::Net(Net::WMFullscreen)) as i64;
        if data[1] == fullscreen || data[2] == fullscreen {
            // data[0]: 0 = remove, 1 = add, 2 = toggle.
            let on = data[0] == 1 || (data[0] == 2 && !wm.clients[&h].isfullscreen);
            wm.set_fullscreen(h, on);
        }
    } else if message_type == wm.conn.atom(Atom::Net(Net::ActiveWindow)) {
        if !wm.is_visible(h) {
            let m = wm.clients[&h].mon;
            let tags = wm.clients[&h].tags;
            let mon = &mut wm.mons[m];
            mon.seltags ^= 1;
            mon.tagset[mon.seltags] = tags;
        }
        wm.pop(h);
    }
}

fn configure_request<X: XConn>(wm: &mut Rawm<X>, ev: XEvent) {
    let XEvent::ConfigureRequest {
        window,
        x,
        y,
        width,
        height,
        border_width,
        sibling,
        detail,
        value_mask,
    } = ev
    else {
        return;
    };

    if let Some(h) = wm.win_to_client(window) {
        if value_mask & xlib::CWBorderWidth as u64 != 0 {
            if let Some(c) = wm.clients.get_mut(&h) {
                c.bw = border_width;
            }
        } else {
            let float_layout = wm.mons[wm.selmon].layout().arrange.is_none();
            let floating = wm.clients[&h].isfloating;
            if floating || float_layout {
                let m = wm.clients[&h].mon;
                let (mx, my, mw, mh) = {
                    let mon = &wm.mons[m];
                    (mon.mx, mon.my, mon.mw, mon.mh)
                };
                let moved_only = {
                    let c = wm.clients.get_mut(&h).unwrap();
                    if value_mask & xlib::CWX as u64 != 0 {
                        c.oldx = c.x;
                        c.x = mx + x;
                    }
                    if value_mask & xlib::CWY as u64 != 0 {
                        c.oldy = c.y;
                        c.y = my + y;
                    }
                    if value_mask & xlib::CWWidth as u64 != 0 {
                        c.oldw = c.w;
                        c.w = width;
                    }
                    if value_mask & xlib::CWHeight as u64 != 0 {
                        c.oldh = c.h;
                        c.h = height;
                    }
                    if c.x + c.w > mx + mw && c.isfloating {
                        c.x = mx + (mw / 2 - c.width() / 2); // center x
                    }
                    if c.y + c.h > my + mh && c.isfloating {
                        c.y = my + (mh / 2 - c.height() / 2); // center y
                    }
                    value_mask & (xlib::CWX | xlib::CWY) as u64 != 0
                        && value_mask & (xlib::CWWidth | xlib::CWHeight) as u64 == 0
                };
                if moved_only {
                    wm.send_configure(h);
                }
                if wm.is_visible(h) {
                    let (win, cx, cy, cw, ch) = {
                        let c = &wm.clients[&h];
                        (c.win, c.x, c.y, c.w, c.h)
                    };
                    wm.conn.move_resize_window(win, cx, cy, cw, ch);
                }
            } else {
                // Tiled clients get told their current geometry instead.
                wm.send_configure(h);
            }
        }
    } else {
        wm.conn.configure_passthrough(
            window,
            x,
            y,
            width,
            height,
            border_width,
            sibling,
            detail,
            value_mask,
        );
    }
    wm.conn.sync(false);
}

/// Root geometry changes (screen resize, head hotplug) rebuild the monitor
/// list and the bar pixmap.
fn configure_notify<X: XConn>(wm: &mut Rawm<X>, window: Window, width: i32, height: i32) {
    if window != wm.root {
        return;
    }
    let dirty = wm.sw != width;
    wm.sw = width;
    wm.sh = height;
    if wm.update_geom() || dirty {
        wm.conn.create_drawable(wm.sw, wm.bh);
        wm.update_bars();
        wm.focus(None);
        wm.arrange(None);
    }
}

fn destroy_notify<X: XConn>(wm: &mut Rawm<X>, window: Window) {
    if let Some(h) = wm.win_to_client(window) {
        wm.unmanage(h, true);
    }
}

fn enter_notify<X: XConn>(wm: &mut Rawm<X>, window: Window, mode: i32, detail: i32) {
    if (mode != xlib::NotifyNormal || detail == xlib::NotifyInferior) && window != wm.root {
        return;
    }

    let c = wm.win_to_client(window);
    let m = match c {
        Some(h) => wm.clients[&h].mon,
        None => wm.win_to_mon(window),
    };

    if m != wm.selmon {
        if let Some(sel) = wm.mons[wm.selmon].sel {
            wm.unfocus(sel, true);
        }
        wm.selmon = m;
    } else if c.is_none() || c == wm.mons[wm.selmon].sel {
        return;
    }
    wm.focus(c);
}

fn expose<X: XConn>(wm: &mut Rawm<X>, window: Window, count: i32) {
    if count == 0 {
        let m = wm.win_to_mon(window);
        wm.draw_bar(m);
    }
}

/// Some clients acquire the input focus on their own; push it back.
fn focus_in<X: XConn>(wm: &mut Rawm<X>, window: Window) {
    if let Some(sel) = wm.mons[wm.selmon].sel {
        if wm.clients[&sel].win != window {
            wm.set_focus(sel);
        }
    }
}

fn mapping_notify<X: XConn>(wm: &mut Rawm<X>, keyboard: bool) {
    if keyboard {
        wm.grab_keys();
    }
}

fn map_request<X: XConn>(wm: &mut Rawm<X>, window: Window) {
    let Some(wa) = wm.conn.get_window_attributes(window) else {
        return;
    };
    if wa.override_redirect {
        return;
    }
    if wm.win_to_client(window).is_none() {
        wm.manage(window, &wa);
    }
}

fn motion_notify<X: XConn>(wm: &mut Rawm<X>, window: Window, x_root: i32, y_root: i32) {
    if window != wm.root {
        return;
    }
    let m = wm.rect_to_mon(x_root, y_root, 1, 1);
    if wm.motion_mon.is_some() && wm.motion_mon != Some(m) {
        wm.selmon = m;
        wm.focus(None);
    }
    wm.motion_mon = Some(m);
}

fn property_notify<X: XConn>(wm: &mut Rawm<X>, window: Window, atom: u64, deleted: bool) {
    if window == wm.root && atom == xlib::XA_WM_NAME {
        wm.update_status();
        return;
    }
    if deleted {
        return;
    }
    let Some(h) = wm.win_to_client(window) else {
        return;
    };

    match atom {
        xlib::XA_WM_TRANSIENT_FOR => {
            let floating = wm.clients[&h].isfloating;
            if !floating {
                let trans = wm
                    .conn
                    .transient_for(window)
                    .and_then(|t| wm.win_to_client(t));
                if trans.is_some() {
                    wm.clients.get_mut(&h).unwrap().isfloating = true;
                    let m = wm.clients[&h].mon;
                    wm.arrange(Some(m));
                }
            }
        }
        xlib::XA_WM_NORMAL_HINTS => {
            let hints = wm.conn.normal_hints(window);
            if let Some(c) = wm.clients.get_mut(&h) {
                c.apply_normal_hints(hints);
            }
        }
        xlib::XA_WM_HINTS => {
            wm.update_wm_hints(h);
            wm.draw_bars();
            if wm.clients[&h].isurgent {
                wm.conn
                    .set_border_color(window, 1, crate::xconn::Col::Fg);
            }
        }
        _ => {}
    }

    if atom == xlib::XA_WM_NAME || atom == wm.conn.atom(Atom::Net(Net::WMName)) {
        wm.update_title(h);
        if wm.mons[wm.clients[&h].mon].sel == Some(h) {
            let m = wm.clients[&h].mon;
            wm.draw_bar(m);
        }
    }
    if atom == wm.conn.atom(Atom::Net(Net::WMWindowType)) {
        wm.update_window_type(h);
    }
}

fn unmap_notify<X: XConn>(wm: &mut Rawm<X>, window: Window, send_event: bool) {
    if let Some(h) = wm.win_to_client(window) {
        if send_event {
            wm.conn.set_client_state(window, WITHDRAWN_STATE);
        } else {
            wm.unmanage(h, false);
        }
    }
}
