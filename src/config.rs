//! Compile-time configuration. Everything here is data the engine consumes;
//! recompile to change it.

use x11::keysym::*;
use x11::xlib::{Button1, Button2, Button3, ControlMask, Mod4Mask, ShiftMask};

use crate::actions::Action;
pub use crate::layouts::{Arrange, Layout};

/* Appearance. */

/// See http://freedesktop.org/software/fontconfig/fontconfig-user.html
pub const FONT: &str = "Sans Mono:size=9";

pub const NUMCOLORS: usize = 4; // need at least 3
/// border / foreground / background per scheme.
pub const COLORS: [[&str; 3]; NUMCOLORS] = [
    ["#cccccc", "#000000", "#cccccc"], // 0 = normal: black on gray
    ["#0066ff", "#ffffff", "#0066ff"], // 1 = selected: white on blue
    ["#0066ff", "#0066ff", "#ffffff"], // 2 = urgent/warning: blue on white
    ["#ff0000", "#ffffff", "#ff0000"], // 3 = error: white on red
];

/// Border pixel of windows.
pub const BORDERPX: i32 = 2;
/// Snap pixel for mouse moves and resizes.
pub const SNAP: i32 = 32;
pub const SHOWBAR: bool = true;
/// false means bottom bar.
pub const TOPBAR: bool = false;
/// 0 means the bar height is derived from the font; >= 1 overrides it.
pub const USER_BH: i32 = 0;
/// Default `_NET_WM_WINDOW_OPACITY` level for a compositor, in [0, 1].
pub const DEFAULT_OPACITY: f64 = 0.80;
/// Auto centering of dialog windows (`_NET_WM_WINDOW_TYPE_DIALOG`).
pub const AUTOCENTER_DIALOGS: bool = false;
/// Draw the focused client's title in the bar.
pub const SHOW_WINTITLE: bool = true;

/* Layouts. */

/// Factor of the master area size, [0.05..0.95].
pub const MFACT: f32 = 0.55;
/// Number of clients in the master area.
pub const NMASTER: i32 = 1;
/// true means respect size hints in tiled resizals.
pub const RESIZE_HINTS: bool = false;

pub static LAYOUTS: [Layout; 6] = [
    /* Symbol        Arrange function */
    Layout { symbol: "[]=", arrange: Some(Arrange::Tile) }, // first entry is default
    Layout { symbol: "<1/1>", arrange: None }, // no arrange function means floating behaviour
    Layout { symbol: "[1/1]", arrange: Some(Arrange::Monocle) },
    Layout { symbol: "TTT", arrange: Some(Arrange::BStack) },
    Layout { symbol: "===", arrange: Some(Arrange::BStackHoriz) },
    Layout { symbol: "###", arrange: Some(Arrange::GaplessGrid) },
];

/* Tags. */

/// Number of tags per monitor.
pub const TAGS: usize = 9;
pub const TAGMASK: u32 = (1 << TAGS) - 1;
const _: () = assert!(TAGS <= 31, "tag masks are u32 bit sets");

pub struct TagDef {
    pub name: &'static str,
    /// Index into [`LAYOUTS`] selecting this tag's default layout.
    pub layout_idx: usize,
}

/// Per-monitor tag table. Monitors beyond the table reuse the last row.
pub const TAG_TABLE: &[[TagDef; TAGS]] = &[
    /* Monitor 0 */
    [
        TagDef { name: "1", layout_idx: 2 }, // monocle
        TagDef { name: "2", layout_idx: 0 },
        TagDef { name: "3", layout_idx: 5 }, // gaplessgrid
        TagDef { name: "4", layout_idx: 0 },
        TagDef { name: "5", layout_idx: 0 },
        TagDef { name: "6", layout_idx: 0 },
        TagDef { name: "7", layout_idx: 0 },
        TagDef { name: "8", layout_idx: 0 },
        TagDef { name: "9", layout_idx: 2 }, // monocle
    ],
];

pub fn tag_row(mon: usize) -> &'static [TagDef; TAGS] {
    &TAG_TABLE[mon.min(TAG_TABLE.len() - 1)]
}

/* Rules.
 *
 * xprop(1):
 *    WM_CLASS(STRING) = instance, class
 *    WM_NAME(STRING) = title
 *    WM_WINDOW_ROLE(STRING) = role
 */

pub struct Rule {
    pub class: Option<&'static str>,
    pub instance: Option<&'static str>,
    pub title: Option<&'static str>,
    pub role: Option<&'static str>,
    /// Tags to assign; 0 means the target monitor's current tags.
    pub tags: u32,
    pub iscentered: bool,
    pub isfloating: bool,
    /// Monitor to spawn on, -1 for the current one.
    pub monitor: i32,
}

pub const RULES: &[Rule] = &[
    /* Fixed monitor. */
    Rule { class: Some("Firefox"), instance: None, title: None, role: None, tags: 0, iscentered: false, isfloating: false, monitor: 0 },
    Rule { class: Some("Navigator"), instance: None, title: None, role: None, tags: 0, iscentered: false, isfloating: false, monitor: 0 },
    /* Current active monitor. */
    Rule { class: Some("Ktsuss"), instance: None, title: None, role: None, tags: 0, iscentered: true, isfloating: true, monitor: -1 },
    Rule { class: Some("pinentry-gtk-2"), instance: None, title: None, role: None, tags: 0, iscentered: true, isfloating: true, monitor: -1 },
];

/* Commands. */

pub const DRUN_CMD: &[&str] = &[
    "dmenu_run", "-p", "Run:", "-fn", FONT, "-nb", COLORS[0][2], "-nf", COLORS[0][1], "-sb",
    COLORS[1][2], "-sf", COLORS[1][1],
];
pub const PASS_CMD: &[&str] = &[
    "passmenu", "-p", "Password:", "-fn", FONT, "-nb", COLORS[0][2], "-nf", COLORS[0][1], "-sb",
    COLORS[1][2], "-sf", COLORS[1][1],
];
pub const TERM_CMD: &[&str] = &["st"];

pub const MIXER_MUTE_CMD: &[&str] = &["amixer", "sset", "Master", "toggle"];
pub const MIXER_DEC_CMD: &[&str] = &["amixer", "sset", "Master", "1-"];
pub const MIXER_INC_CMD: &[&str] = &["amixer", "sset", "Master", "1+"];
pub const BACKLIGHT_INC_CMD: &[&str] = &["xbacklight", "-inc", "10"];
pub const BACKLIGHT_DEC_CMD: &[&str] = &["xbacklight", "-dec", "10"];

/* Key definitions. */

pub const MODKEY: u32 = Mod4Mask;

pub struct Key {
    pub mask: u32,
    pub keysym: u32,
    pub action: Action,
}

pub fn keys() -> Vec<Key> {
    let mut keys = vec![
        Key { mask: MODKEY, keysym: XK_r, action: Action::Spawn(DRUN_CMD) },
        Key { mask: MODKEY, keysym: XK_p, action: Action::Spawn(PASS_CMD) },
        Key { mask: MODKEY | ShiftMask, keysym: XK_Return, action: Action::Spawn(TERM_CMD) },
        Key { mask: MODKEY, keysym: XK_b, action: Action::ToggleBar },
        Key { mask: MODKEY, keysym: XK_n, action: Action::NameTag },
        Key { mask: MODKEY, keysym: XK_j, action: Action::FocusStack(1) },
        Key { mask: MODKEY, keysym: XK_k, action: Action::FocusStack(-1) },
        Key { mask: MODKEY, keysym: XK_i, action: Action::IncNMaster(1) },
        Key { mask: MODKEY, keysym: XK_d, action: Action::IncNMaster(-1) },
        Key { mask: MODKEY | ShiftMask, keysym: XK_h, action: Action::SetMfact(-0.01) },
        Key { mask: MODKEY | ShiftMask, keysym: XK_l, action: Action::SetMfact(0.01) },
        Key { mask: MODKEY, keysym: XK_Return, action: Action::Zoom },
        Key { mask: MODKEY, keysym: XK_Tab, action: Action::View(0) },
        Key { mask: MODKEY, keysym: XK_c, action: Action::KillClient },
        Key { mask: MODKEY, keysym: XK_t, action: Action::SetLayout(Some(0)) },
        Key { mask: MODKEY, keysym: XK_f, action: Action::SetLayout(Some(1)) },
        Key { mask: MODKEY, keysym: XK_m, action: Action::SetLayout(Some(2)) },
        Key { mask: MODKEY, keysym: XK_s, action: Action::SetLayout(Some(3)) },
        Key { mask: MODKEY, keysym: XK_h, action: Action::SetLayout(Some(4)) },
        Key { mask: MODKEY, keysym: XK_g, action: Action::SetLayout(Some(5)) },
        Key { mask: MODKEY, keysym: XK_space, action: Action::SetLayout(None) },
        Key { mask: MODKEY | ShiftMask, keysym: XK_space, action: Action::ToggleFloating },
        Key { mask: MODKEY, keysym: XK_0, action: Action::View(!0) },
        Key { mask: MODKEY | ShiftMask, keysym: XK_0, action: Action::Tag(!0) },
        Key { mask: MODKEY, keysym: XK_o, action: Action::WinView },
        Key { mask: MODKEY | ShiftMask, keysym: XK_f, action: Action::ToggleFullscreen },
        Key { mask: MODKEY, keysym: XK_comma, action: Action::FocusMon(-1) },
        Key { mask: MODKEY, keysym: XK_period, action: Action::FocusMon(1) },
        Key { mask: MODKEY | ShiftMask, keysym: XK_comma, action: Action::TagMon(-1) },
        Key { mask: MODKEY | ShiftMask, keysym: XK_period, action: Action::TagMon(1) },
        Key { mask: MODKEY | ShiftMask, keysym: XK_q, action: Action::Quit { restart: false } },
        Key {
            mask: MODKEY | ControlMask | ShiftMask,
            keysym: XK_q,
            action: Action::Quit { restart: true },
        },
        /* Multimedia keys. */
        Key { mask: 0, keysym: XF86XK_AudioMute, action: Action::Spawn(MIXER_MUTE_CMD) },
        Key { mask: 0, keysym: XF86XK_AudioLowerVolume, action: Action::Spawn(MIXER_DEC_CMD) },
        Key { mask: 0, keysym: XF86XK_AudioRaiseVolume, action: Action::Spawn(MIXER_INC_CMD) },
        Key { mask: 0, keysym: XF86XK_MonBrightnessDown, action: Action::Spawn(BACKLIGHT_DEC_CMD) },
        Key { mask: 0, keysym: XF86XK_MonBrightnessUp, action: Action::Spawn(BACKLIGHT_INC_CMD) },
    ];

    const FN_KEYS: [u32; 9] = [XK_F1, XK_F2, XK_F3, XK_F4, XK_F5, XK_F6, XK_F7, XK_F8, XK_F9];
    for (i, &keysym) in FN_KEYS.iter().enumerate() {
        keys.push(Key { mask: MODKEY, keysym, action: Action::FocusNStack(i as i32 + 1) });
    }

    const TAG_KEYS: [u32; 9] = [XK_1, XK_2, XK_3, XK_4, XK_5, XK_6, XK_7, XK_8, XK_9];
    for (i, &keysym) in TAG_KEYS.iter().enumerate() {
        let mask = 1 << i;
        keys.push(Key { mask: MODKEY, keysym, action: Action::View(mask) });
        keys.push(Key { mask: MODKEY | ControlMask, keysym, action: Action::ToggleView(mask) });
        keys.push(Key { mask: MODKEY | ShiftMask, keysym, action: Action::Tag(mask) });
        keys.push(Key {
            mask: MODKEY | ControlMask | ShiftMask,
            keysym,
            action: Action::ToggleTag(mask),
        });
    }

    keys
}

/* Button definitions. */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Click {
    TagBar,
    LtSymbol,
    StatusText,
    WinTitle,
    ClientWin,
    RootWin,
}

pub struct Button {
    pub click: Click,
    pub mask: u32,
    pub button: u32,
    pub action: Action,
}

pub fn buttons() -> Vec<Button> {
    vec![
        Button { click: Click::LtSymbol, mask: 0, button: Button1, action: Action::SetLayout(None) },
        Button { click: Click::LtSymbol, mask: 0, button: Button3, action: Action::SetLayout(Some(2)) },
        Button { click: Click::WinTitle, mask: 0, button: Button2, action: Action::Zoom },
        Button { click: Click::StatusText, mask: 0, button: Button2, action: Action::Spawn(TERM_CMD) },
        Button { click: Click::ClientWin, mask: MODKEY, button: Button1, action: Action::MoveMouse },
        Button { click: Click::ClientWin, mask: MODKEY, button: Button2, action: Action::ToggleFloating },
        Button { click: Click::ClientWin, mask: MODKEY, button: Button3, action: Action::ResizeMouse },
        /* A zero tag mask means "the clicked tag". */
        Button { click: Click::TagBar, mask: 0, button: Button1, action: Action::View(0) },
        Button { click: Click::TagBar, mask: 0, button: Button3, action: Action::ToggleView(0) },
        Button { click: Click::TagBar, mask: MODKEY, button: Button1, action: Action::Tag(0) },
        Button { click: Click::TagBar, mask: MODKEY, button: Button3, action: Action::ToggleTag(0) },
    ]
}
