use crate::client::ClientHandle;
use crate::config::{self, Layout, TAGS};
use crate::xconn::Window;

/// Per-view settings remembered for each of the `TAGS + 1` tag indices.
/// Index 0 is the "all tags" pseudo-view.
#[derive(Debug, Clone)]
pub struct Pertag {
    /// Current and previous tag index (1-based; 0 = all tags).
    pub curtag: usize,
    pub prevtag: usize,
    pub nmasters: [i32; TAGS + 1],
    pub mfacts: [f32; TAGS + 1],
    pub sellts: [usize; TAGS + 1],
    pub ltidxs: [[&'static Layout; 2]; TAGS + 1],
    pub showbars: [bool; TAGS + 1],
}

/// A display region: one Xinerama head, or the whole screen.
#[derive(Debug, Clone)]
pub struct Monitor {
    pub ltsymbol: String,
    /// Master area factor, per tag.
    pub mfact: f32,
    /// Number of clients in the master area, per tag.
    pub nmaster: i32,
    pub num: usize,
    /// Bar y-coordinate.
    pub by: i32,
    /// Outer geometry.
    pub mx: i32,
    pub my: i32,
    pub mw: i32,
    pub mh: i32,
    /// Work area (outer geometry minus the bar).
    pub wx: i32,
    pub wy: i32,
    pub ww: i32,
    pub wh: i32,
    /// Index of the selected tagset (0 or 1).
    pub seltags: usize,
    /// Index of the selected layout slot (0 or 1).
    pub sellt: usize,
    /// Current and previous tag masks.
    pub tagset: [u32; 2],
    pub showbar: bool,
    pub topbar: bool,
    /// Creation-ordered client list, newest first.
    pub clients: Vec<ClientHandle>,
    /// Focus history, most recently focused first.
    pub stack: Vec<ClientHandle>,
    pub sel: Option<ClientHandle>,
    pub barwin: Window,
    /// Current and previous layout.
    pub lt: [&'static Layout; 2],
    /// Mutable tag names, seeded from the config table.
    pub tag_names: [String; TAGS],
    pub pertag: Pertag,
}

impl Monitor {
    pub fn new(num: usize) -> Self {
        let row = config::tag_row(num);
        let lt0 = &config::LAYOUTS[row[0].layout_idx % config::LAYOUTS.len()];
        let lt1 = &config::LAYOUTS[1 % config::LAYOUTS.len()];

        let mut pertag = Pertag {
            curtag: 1,
            prevtag: 1,
            nmasters: [config::NMASTER; TAGS + 1],
            mfacts: [config::MFACT; TAGS + 1],
            sellts: [0; TAGS + 1],
            ltidxs: [[lt0, lt1]; TAGS + 1],
            showbars: [config::SHOWBAR; TAGS + 1],
        };
        // The all-tags view gets the grid, with monocle as its previous.
        pertag.ltidxs[0] = [&config::LAYOUTS[5], &config::LAYOUTS[2]];
        for i in 1..=TAGS {
            pertag.ltidxs[i] = [
                &config::LAYOUTS[row[i - 1].layout_idx % config::LAYOUTS.len()],
                lt1,
            ];
        }

        Monitor {
            ltsymbol: lt0.symbol.to_string(),
            mfact: config::MFACT,
            nmaster: config::NMASTER,
            num,
            by: 0,
            mx: 0,
            my: 0,
            mw: 0,
            mh: 0,
            wx: 0,
            wy: 0,
            ww: 0,
            wh: 0,
            seltags: 0,
            sellt: 0,
            tagset: [1, 1],
            showbar: config::SHOWBAR,
            topbar: config::TOPBAR,
            clients: Vec::new(),
            stack: Vec::new(),
            sel: None,
            barwin: Window::default(),
            lt: [lt0, lt1],
            tag_names: std::array::from_fn(|i| row[i].name.to_string()),
            pertag,
        }
    }

    pub fn layout(&self) -> &'static Layout {
        self.lt[self.sellt]
    }

    /// Area of the intersection between a rectangle and this monitor's
    /// work area.
    pub fn intersect_area(&self, x: i32, y: i32, w: i32, h: i32) -> i32 {
        ((x + w).min(self.wx + self.ww) - x.max(self.wx)).max(0)
            * ((y + h).min(self.wy + self.wh) - y.max(self.wy)).max(0)
    }

    /// Recompute the work area and bar position from the outer geometry.
    pub fn update_bar_pos(&mut self, bh: i32) {
        self.wy = self.my;
        self.wh = self.mh;
        if self.showbar {
            self.wh -= bh;
            self.by = if self.topbar { self.wy } else { self.wy + self.wh };
            self.wy = if self.topbar { self.wy + bh } else { self.wy };
        } else {
            self.by = -bh;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Monitor;
    use crate::config;

    #[test]
    fn pertag_is_seeded_from_the_tag_table() {
        let m = Monitor::new(0);
        assert_eq!(m.pertag.curtag, 1);
        let row = config::tag_row(0);
        for i in 1..=config::TAGS {
            assert!(std::ptr::eq(
                m.pertag.ltidxs[i][0],
                &config::LAYOUTS[row[i - 1].layout_idx]
            ));
            assert_eq!(m.pertag.mfacts[i], config::MFACT);
            assert_eq!(m.pertag.nmasters[i], config::NMASTER);
        }
    }

    #[test]
    fn monitors_beyond_the_table_reuse_the_last_row() {
        let far = Monitor::new(7);
        let last = Monitor::new(config::TAG_TABLE.len() - 1);
        assert_eq!(far.tag_names, last.tag_names);
    }

    #[test]
    fn bar_position_carves_the_work_area() {
        let mut m = Monitor::new(0);
        m.my = 0;
        m.mh = 612;
        m.showbar = true;

        m.topbar = false;
        m.update_bar_pos(12);
        assert_eq!((m.wy, m.wh, m.by), (0, 600, 600));

        m.topbar = true;
        m.update_bar_pos(12);
        assert_eq!((m.wy, m.wh, m.by), (12, 600, 0));

        m.showbar = false;
        m.update_bar_pos(12);
        assert_eq!((m.wy, m.wh, m.by), (0, 612, -12));
    }
}
