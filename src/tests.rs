//! Engine tests driven through the recording transport: the §-numbered
//! invariants, laws, boundary behaviors and scenarios of the design notes.

use x11::xlib;

use crate::client::ClientHandle;
use crate::config;
use crate::events::dispatch;
use crate::layouts::Arrange;
use crate::state::Rawm;
use crate::xconn::{Atom, Net, ScreenGeom, Window, WindowAttr, Wm, XConn, XEvent};
use crate::xmock::{Call, MockX, ROOT};

/// Bar height with the mock font: font height 10 + 2.
const BH: i32 = 12;

fn single_monitor_wm() -> Rawm<MockX> {
    // One monitor, work area (0, 0, 1000, 600) with the bottom bar.
    Rawm::new(MockX::new(1000, 600 + BH, Vec::new()))
}

fn dual_monitor_wm() -> Rawm<MockX> {
    let heads = vec![
        ScreenGeom { x: 0, y: 0, w: 1000, h: 600 + BH },
        ScreenGeom { x: 1000, y: 0, w: 1000, h: 600 + BH },
    ];
    Rawm::new(MockX::new(2000, 600 + BH, heads))
}

fn map_window(wm: &mut Rawm<MockX>, id: u64) -> ClientHandle {
    wm.conn.add_window(
        id,
        WindowAttr {
            x: 50,
            y: 50,
            w: 400,
            h: 300,
            border_width: 1,
            override_redirect: false,
            viewable: true,
        },
    );
    dispatch(wm, XEvent::MapRequest { window: Window(id) });
    ClientHandle(id)
}

fn outer_geom(wm: &Rawm<MockX>, h: ClientHandle) -> (i32, i32, i32, i32) {
    let c = &wm.clients[&h];
    (c.x, c.y, c.width(), c.height())
}

/// The reachable-state invariants checked after every scenario step.
fn assert_invariants(wm: &Rawm<MockX>) {
    for (h, c) in &wm.clients {
        let m = &wm.mons[c.mon];
        assert_eq!(
            m.clients.iter().filter(|&&x| x == *h).count(),
            1,
            "client must appear exactly once in its monitor's client list"
        );
        assert_eq!(
            m.stack.iter().filter(|&&x| x == *h).count(),
            1,
            "client must appear exactly once in its monitor's stack"
        );
        assert_eq!(c.tags & !config::TAGMASK, 0, "tag mask out of range");
        if c.isfullscreen {
            assert_eq!(c.bw, 0);
            assert_eq!((c.x, c.y, c.w, c.h), (m.mx, m.my, m.mw, m.mh));
        }
    }

    for (mi, m) in wm.mons.iter().enumerate() {
        for &h in &m.clients {
            assert_eq!(wm.clients[&h].mon, mi);
        }
        assert_eq!(m.clients.len(), m.stack.len());
        assert!((0.05..=0.95).contains(&m.mfact));
        assert!(m.nmaster >= 0);
    }

    let sm = &wm.mons[wm.selmon];
    if let Some(s) = sm.sel {
        assert!(wm.clients[&s].is_visible_on(sm), "selection must be visible");
    }

    // Tiled geometries are pairwise disjoint under the splitting layouts.
    for (mi, m) in wm.mons.iter().enumerate() {
        match m.layout().arrange {
            Some(Arrange::Monocle) | None => continue,
            _ => {}
        }
        let tiled = wm.tiled_handles(mi);
        for i in 0..tiled.len() {
            for j in i + 1..tiled.len() {
                let a = &wm.clients[&tiled[i]];
                let b = &wm.clients[&tiled[j]];
                let ow = (a.x + a.width()).min(b.x + b.width()) - a.x.max(b.x);
                let oh = (a.y + a.height()).min(b.y + b.height()) - a.y.max(b.y);
                assert!(
                    ow <= 1 || oh <= 1,
                    "tiled clients overlap: {:?} vs {:?}",
                    outer_geom(wm, tiled[i]),
                    outer_geom(wm, tiled[j])
                );
            }
        }
    }
}

#[test]
fn manage_and_unmanage_keep_lists_consistent() {
    let mut wm = single_monitor_wm();
    let a = map_window(&mut wm, 10);
    let b = map_window(&mut wm, 11);
    let c = map_window(&mut wm, 12);
    assert_invariants(&wm);
    assert_eq!(wm.mons[0].sel, Some(c));

    dispatch(&mut wm, XEvent::DestroyNotify { window: Window(11) });
    assert_invariants(&wm);
    assert!(!wm.clients.contains_key(&b));
    assert!(wm.clients.contains_key(&a));
    assert!(wm.mons[0].sel.is_some());
}

#[test]
fn view_swaps_back_to_previous_tagset() {
    let mut wm = single_monitor_wm();
    wm.view(1 << 1);
    wm.view(1 << 3);
    wm.view(0);
    let m = &wm.mons[0];
    assert_eq!(m.tagset[m.seltags], 1 << 1);
    assert_invariants(&wm);
}

#[test]
fn setlayout_toggle_twice_restores_pair() {
    let mut wm = single_monitor_wm();
    let before = (
        wm.mons[0].sellt,
        wm.mons[0].lt[0].symbol,
        wm.mons[0].lt[1].symbol,
    );
    wm.set_layout(None);
    wm.set_layout(None);
    let after = (
        wm.mons[0].sellt,
        wm.mons[0].lt[0].symbol,
        wm.mons[0].lt[1].symbol,
    );
    assert_eq!(before, after);
    assert_invariants(&wm);
}

#[test]
fn toggletag_twice_leaves_tags_unchanged() {
    let mut wm = single_monitor_wm();
    let h = map_window(&mut wm, 10);
    let before = wm.clients[&h].tags;
    wm.toggle_tag(1 << 2);
    assert_eq!(wm.clients[&h].tags, before | 1 << 2);
    wm.toggle_tag(1 << 2);
    assert_eq!(wm.clients[&h].tags, before);
    assert_invariants(&wm);
}

#[test]
fn sendmon_round_trip_restores_owner() {
    let mut wm = dual_monitor_wm();
    let h = map_window(&mut wm, 10);
    assert_eq!(wm.clients[&h].mon, 0);

    wm.send_mon(h, 1);
    assert_eq!(wm.clients[&h].mon, 1);
    // Not tag-preserving: the client adopts the target monitor's view.
    let m1 = &wm.mons[1];
    assert_eq!(wm.clients[&h].tags, m1.tagset[m1.seltags]);
    assert_invariants(&wm);

    wm.send_mon(h, 0);
    assert_eq!(wm.clients[&h].mon, 0);
    assert_invariants(&wm);
}

#[test]
fn oversized_window_is_pulled_into_the_monitor() {
    let mut wm = single_monitor_wm();
    wm.conn.add_window(
        10,
        WindowAttr {
            x: 700,
            y: 500,
            w: 2000,
            h: 1200,
            border_width: 0,
            override_redirect: false,
            viewable: true,
        },
    );
    dispatch(&mut wm, XEvent::MapRequest { window: Window(10) });
    let h = ClientHandle(10);
    // Tiled on a monocle tag: ends up exactly inside the work area.
    let c = &wm.clients[&h];
    assert!(c.x >= 0 && c.y >= 0);
    assert!(c.x + c.width() <= 1000);
    assert!(c.y + c.height() <= 600 + BH);
    assert_invariants(&wm);

    // A floating dialog keeps its size but its origin is clamped inside.
    wm.conn.add_window(
        11,
        WindowAttr {
            x: 900,
            y: 600,
            w: 2000,
            h: 1200,
            border_width: 0,
            override_redirect: false,
            viewable: true,
        },
    );
    wm.conn.window_mut(11).dialog = true;
    dispatch(&mut wm, XEvent::MapRequest { window: Window(11) });
    let d = &wm.clients[&ClientHandle(11)];
    assert!(d.isfloating);
    assert!(d.x >= 0 && d.y >= 0);
    assert_invariants(&wm);
}

#[test]
fn fullscreen_add_and_remove_restores_geometry() {
    let mut wm = single_monitor_wm();
    wm.set_layout(Some(0)); // tile
    let _b = map_window(&mut wm, 10);
    let h = map_window(&mut wm, 11);

    let before = {
        let c = &wm.clients[&h];
        (c.x, c.y, c.w, c.h, c.bw, c.isfloating)
    };
    assert_eq!(before.4, config::BORDERPX);

    let net_wm_state = wm.conn.atom(Atom::Net(Net::WMState));
    let fullscreen = wm.conn.atom(Atom::Net(Net::WMFullscreen)) as i64;

    dispatch(
        &mut wm,
        XEvent::ClientMessage {
            window: Window(11),
            message_type: net_wm_state,
            data: [1, fullscreen, 0, 0, 0],
        },
    );
    {
        let c = &wm.clients[&h];
        assert!(c.isfullscreen && c.isfloating);
        assert_eq!(c.bw, 0);
        assert_eq!((c.x, c.y, c.w, c.h), (0, 0, 1000, 600 + BH));
    }
    assert_invariants(&wm);

    dispatch(
        &mut wm,
        XEvent::ClientMessage {
            window: Window(11),
            message_type: net_wm_state,
            data: [0, fullscreen, 0, 0, 0],
        },
    );
    let after = {
        let c = &wm.clients[&h];
        (c.x, c.y, c.w, c.h, c.bw, c.isfloating)
    };
    assert_eq!(before, after);
    assert_invariants(&wm);
}

#[test]
fn killing_the_last_client_clears_the_selection() {
    let mut wm = single_monitor_wm();
    map_window(&mut wm, 10);
    dispatch(
        &mut wm,
        XEvent::UnmapNotify {
            window: Window(10),
            send_event: false,
        },
    );
    assert!(wm.clients.is_empty());
    assert_eq!(wm.mons[0].sel, None);
    assert_invariants(&wm);
}

#[test]
fn resize_below_minimum_stays_positive() {
    let mut wm = single_monitor_wm();
    let h = map_window(&mut wm, 10);
    wm.toggle_floating();
    wm.resize(h, 0, 0, -5, 0, false);
    let c = &wm.clients[&h];
    assert!(c.w >= 1 && c.h >= 1);
    assert_invariants(&wm);
}

#[test]
fn five_clients_in_gapless_grid_split_two_and_three() {
    let mut wm = single_monitor_wm();
    wm.set_layout(Some(5)); // gaplessgrid
    for id in 60..65 {
        map_window(&mut wm, id);
    }
    let tiled = wm.tiled_handles(0);
    assert_eq!(tiled.len(), 5);

    let geoms: Vec<_> = tiled.iter().map(|&h| outer_geom(&wm, h)).collect();
    assert_eq!(
        geoms,
        vec![
            (0, 0, 500, 300),
            (0, 300, 500, 300),
            (500, 0, 500, 200),
            (500, 200, 500, 200),
            (500, 400, 500, 200),
        ]
    );
    assert_invariants(&wm);
}

#[test]
fn rules_place_firefox_on_monitor_zero() {
    let mut wm = dual_monitor_wm();
    wm.focus_mon(1);
    assert_eq!(wm.selmon, 1);

    wm.conn.add_window(
        90,
        WindowAttr {
            x: 1100,
            y: 50,
            w: 800,
            h: 500,
            border_width: 0,
            override_redirect: false,
            viewable: true,
        },
    );
    wm.conn.window_mut(90).instance = Some("firefox".into());
    wm.conn.window_mut(90).class = Some("Firefox".into());
    dispatch(&mut wm, XEvent::MapRequest { window: Window(90) });

    let c = &wm.clients[&ClientHandle(90)];
    assert_eq!(c.mon, 0);
    let m0 = &wm.mons[0];
    assert_eq!(c.tags, m0.tagset[m0.seltags]);
    assert!(!c.isfloating);
    assert_invariants(&wm);
}

#[test]
fn tile_splits_master_and_stack() {
    let mut wm = single_monitor_wm();
    wm.set_layout(Some(0)); // tile
    wm.set_mfact(1.5); // absolute 0.5
    map_window(&mut wm, 10);
    map_window(&mut wm, 11);
    map_window(&mut wm, 12);

    let tiled = wm.tiled_handles(0);
    let geoms: Vec<_> = tiled.iter().map(|&h| outer_geom(&wm, h)).collect();
    assert_eq!(
        geoms,
        vec![(0, 0, 500, 600), (500, 0, 500, 300), (500, 300, 500, 300)]
    );
    assert_invariants(&wm);
}

#[test]
fn pertag_remembers_mfact_and_nmaster() {
    let mut wm = single_monitor_wm();
    wm.set_mfact(1.7); // absolute 0.7 on tag 1
    wm.inc_nmaster(1); // 2 masters on tag 1

    wm.view(1 << 1);
    wm.set_mfact(1.3);
    assert!((wm.mons[0].mfact - 0.3).abs() < 1e-5);

    wm.view(1);
    assert!((wm.mons[0].mfact - 0.7).abs() < 1e-5);
    assert_eq!(wm.mons[0].nmaster, 2);
    assert_invariants(&wm);
}

#[test]
fn colored_status_text_switches_schemes() {
    let mut wm = single_monitor_wm();
    wm.conn.window_mut(ROOT.0).wm_name = Some("\u{1}A\u{2}B".into());
    wm.conn.calls.clear();
    dispatch(
        &mut wm,
        XEvent::PropertyNotify {
            window: ROOT,
            atom: xlib::XA_WM_NAME,
            deleted: false,
        },
    );

    let drawn = wm.conn.drawn_texts();
    let a = drawn.iter().position(|d| d == &(1, "A".to_string()));
    let b = drawn.iter().position(|d| d == &(2, "B".to_string()));
    assert!(a.is_some(), "scheme-1 run missing: {:?}", drawn);
    assert!(b.is_some(), "scheme-2 run missing: {:?}", drawn);
    assert!(a < b, "status runs drawn out of order");
    for (_, text) in &drawn {
        assert!(
            !text.contains('\u{1}') && !text.contains('\u{2}'),
            "control bytes must not be rendered"
        );
    }
}

#[test]
fn killclient_prefers_the_delete_protocol() {
    let mut wm = single_monitor_wm();
    let h = map_window(&mut wm, 20);
    wm.conn.window_mut(20).protocols = vec![Wm::Delete];
    assert_eq!(wm.mons[0].sel, Some(h));

    wm.conn.calls.clear();
    wm.kill_client();
    assert_eq!(
        wm.conn
            .count(|c| *c == Call::SendWmProtocol(Window(20), Wm::Delete)),
        1
    );
    assert_eq!(wm.conn.count(|c| matches!(c, Call::KillClient(_))), 0);
}

#[test]
fn killclient_falls_back_to_xkillclient_under_grab() {
    let mut wm = single_monitor_wm();
    map_window(&mut wm, 21);
    wm.conn.calls.clear();
    wm.kill_client();

    let calls = &wm.conn.calls;
    assert_eq!(wm.conn.count(|c| matches!(c, Call::SendWmProtocol(..))), 0);
    let grab = calls.iter().position(|c| *c == Call::GrabServer);
    let kill = calls.iter().position(|c| *c == Call::KillClient(Window(21)));
    let ungrab = calls.iter().position(|c| *c == Call::UngrabServer);
    assert!(grab.is_some() && kill.is_some() && ungrab.is_some());
    assert!(grab < kill && kill < ungrab, "kill must run under the grab");
}

#[test]
fn active_window_message_reveals_hidden_client() {
    let mut wm = single_monitor_wm();
    let h = map_window(&mut wm, 30);
    wm.view(1 << 1);
    assert!(!wm.is_visible(h));

    let active = wm.conn.atom(Atom::Net(Net::ActiveWindow));
    dispatch(
        &mut wm,
        XEvent::ClientMessage {
            window: Window(30),
            message_type: active,
            data: [0; 5],
        },
    );
    assert!(wm.is_visible(h));
    assert_eq!(wm.mons[0].sel, Some(h));
    assert_invariants(&wm);
}

#[test]
fn focus_stack_wraps_over_visible_clients() {
    let mut wm = single_monitor_wm();
    let a = map_window(&mut wm, 10);
    let b = map_window(&mut wm, 11);
    let c = map_window(&mut wm, 12);
    assert_eq!(wm.mons[0].sel, Some(c));

    // List order is newest first: [c, b, a].
    wm.focus_stack(1);
    assert_eq!(wm.mons[0].sel, Some(b));
    wm.focus_stack(1);
    assert_eq!(wm.mons[0].sel, Some(a));
    wm.focus_stack(1);
    assert_eq!(wm.mons[0].sel, Some(c), "forward focus wraps to the head");
    wm.focus_stack(-1);
    assert_eq!(wm.mons[0].sel, Some(a), "backward focus wraps to the tail");
    assert_invariants(&wm);
}

#[test]
fn focus_nstack_selects_by_position() {
    let mut wm = single_monitor_wm();
    let a = map_window(&mut wm, 10);
    let b = map_window(&mut wm, 11);
    map_window(&mut wm, 12);

    wm.focus_nstack(2);
    assert_eq!(wm.mons[0].sel, Some(b));
    wm.focus_nstack(3);
    assert_eq!(wm.mons[0].sel, Some(a));
    // Out of range is a no-op.
    wm.focus_nstack(9);
    assert_eq!(wm.mons[0].sel, Some(a));
    assert_invariants(&wm);
}

#[test]
fn zoom_promotes_the_selection_to_master() {
    let mut wm = single_monitor_wm();
    wm.set_layout(Some(0));
    let a = map_window(&mut wm, 10);
    let b = map_window(&mut wm, 11);

    // b is master; zooming it promotes the next tiled client instead.
    assert_eq!(wm.tiled_handles(0), vec![b, a]);
    wm.zoom();
    assert_eq!(wm.tiled_handles(0), vec![a, b]);
    assert_eq!(wm.mons[0].sel, Some(a));
    assert_invariants(&wm);
}

#[test]
fn urgent_clients_mark_the_bar_until_focused() {
    let mut wm = single_monitor_wm();
    let a = map_window(&mut wm, 10);
    let b = map_window(&mut wm, 11);
    assert_eq!(wm.mons[0].sel, Some(b));

    wm.conn.window_mut(10).wm_hints = Some(crate::xconn::WmHintsData {
        urgent: true,
        input: None,
    });
    dispatch(
        &mut wm,
        XEvent::PropertyNotify {
            window: Window(10),
            atom: xlib::XA_WM_HINTS,
            deleted: false,
        },
    );
    assert!(wm.clients[&a].isurgent);

    // Focusing the urgent client clears the flag and the hint.
    wm.focus(Some(a));
    assert!(!wm.clients[&a].isurgent);
    assert!(wm
        .conn
        .calls
        .iter()
        .any(|c| *c == Call::ClearUrgency(Window(10))));
    assert_invariants(&wm);
}

#[test]
fn toggleview_refuses_an_empty_view() {
    let mut wm = single_monitor_wm();
    let before = wm.mons[0].tagset[wm.mons[0].seltags];
    wm.toggle_view(before); // would leave no tag visible
    assert_eq!(wm.mons[0].tagset[wm.mons[0].seltags], before);
    assert_invariants(&wm);
}

#[test]
fn setmfact_rejects_out_of_band_factors() {
    let mut wm = single_monitor_wm();
    wm.set_layout(Some(0));
    wm.set_mfact(1.95); // absolute 0.95 is out of the accepted band
    assert_eq!(wm.mons[0].mfact, config::MFACT);
    wm.set_mfact(1.05); // absolute 0.05 as well
    assert_eq!(wm.mons[0].mfact, config::MFACT);
    assert_invariants(&wm);
}

#[test]
fn monocle_symbol_counts_visible_clients() {
    let mut wm = single_monitor_wm();
    // Tag 1 defaults to monocle on monitor 0.
    map_window(&mut wm, 10);
    map_window(&mut wm, 11);
    wm.draw_bar(0);
    assert_eq!(wm.mons[0].ltsymbol, "[1/2]");
    assert_invariants(&wm);
}

#[test]
fn transient_windows_follow_their_parent_and_float() {
    let mut wm = single_monitor_wm();
    let parent = map_window(&mut wm, 10);
    wm.tag(1 << 4);
    wm.view(1 << 4);

    wm.conn.add_window(
        11,
        WindowAttr {
            x: 10,
            y: 10,
            w: 200,
            h: 100,
            border_width: 0,
            override_redirect: false,
            viewable: true,
        },
    );
    wm.conn.window_mut(11).transient = Some(Window(10));
    dispatch(&mut wm, XEvent::MapRequest { window: Window(11) });

    let t = &wm.clients[&ClientHandle(11)];
    assert_eq!(t.tags, wm.clients[&parent].tags);
    assert!(t.isfloating, "transients of managed windows float");
    assert_invariants(&wm);
}
