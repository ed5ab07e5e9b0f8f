//! Per-monitor status bar rendering.
//!
//! The bar shows tag cells (vacant tags are skipped), the layout symbol
//! adorned with master counts or monocle counters, the status text on the
//! selected monitor, and optionally the focused client's title.

use crate::config::{self, Arrange};
use crate::state::Rawm;
use crate::xconn::XConn;

impl<X: XConn> Rawm<X> {
    pub fn draw_bars(&mut self) {
        for m in 0..self.mons.len() {
            self.draw_bar(m);
        }
    }

    pub fn draw_bar(&mut self, m: usize) {
        if m >= self.mons.len() {
            return;
        }

        let mut occ: u32 = 0;
        let mut urg: u32 = 0;
        for &h in &self.mons[m].clients {
            let c = &self.clients[&h];
            // A mask of exactly 255 is the all-tags shortcut and never
            // marks tags as occupied.
            occ |= if c.tags == 255 { 0 } else { c.tags };
            if c.isurgent {
                urg |= c.tags;
            }
        }

        let tagset = self.mons[m].tagset[self.mons[m].seltags];
        let sel_tags = self.mons[m]
            .sel
            .and_then(|s| self.clients.get(&s))
            .map(|c| c.tags)
            .unwrap_or(0);

        let mut x = 0;
        for i in 0..config::TAGS {
            // Do not draw vacant tags.
            if occ & 1 << i == 0 && tagset & 1 << i == 0 {
                continue;
            }
            let name = self.mons[m].tag_names[i].clone();
            let w = self.text_w(&name);
            let scheme = if tagset & 1 << i != 0 {
                1
            } else if urg & 1 << i != 0 {
                2
            } else {
                0
            };
            self.conn.draw_text(x, w, scheme, Some(&name), true);
            let filled = m == self.selmon && sel_tags & 1 << i != 0;
            self.conn.draw_square(x, filled, occ & 1 << i != 0, scheme);
            x += w;
        }

        let symbol = self.layout_symbol(m);
        self.mons[m].ltsymbol = symbol.clone();
        let w = self.text_w(&symbol);
        self.blw = w;
        self.conn.draw_text(x, w, 0, Some(&symbol), true);
        x += w;

        let left = x;
        let status_x = if m == self.selmon {
            // Status is only drawn on the selected monitor.
            let mut sw = self.status_width();
            let mut sx = self.mons[m].ww - sw;
            if sx < left {
                sx = left;
                sw = self.mons[m].ww - left;
            }
            self.draw_status(sx, sw);
            sx
        } else {
            self.mons[m].ww
        };

        let tw = status_x - left;
        if tw > self.bh {
            let sel = self.mons[m].sel;
            match sel {
                Some(s) if config::SHOW_WINTITLE => {
                    let scheme = if m == self.selmon { 1 } else { 0 };
                    let (name, isfixed, isfloating) = {
                        let c = &self.clients[&s];
                        (c.name.clone(), c.isfixed, c.isfloating)
                    };
                    self.conn.draw_text(left, tw, scheme, Some(&name), true);
                    self.conn.draw_square(left, isfixed, isfloating, scheme);
                }
                _ => {
                    self.conn.draw_text(left, tw, 0, None, false);
                }
            }
        }

        let (barwin, ww) = {
            let mon = &self.mons[m];
            (mon.barwin, mon.ww)
        };
        self.conn.copy_bar(barwin, ww);
    }

    /// The layout symbol, adorned with the master count for the stacked
    /// layouts or `position/count` counters for monocle and floating.
    fn layout_symbol(&self, m: usize) -> String {
        let mon = &self.mons[m];
        match mon.layout().arrange {
            Some(Arrange::Tile) => format!("[]= {}", mon.nmaster),
            Some(Arrange::BStack) => format!("TTT {}", mon.nmaster),
            Some(Arrange::BStackHoriz) => format!("=== {}", mon.nmaster),
            Some(Arrange::GaplessGrid) => "###".to_string(),
            Some(Arrange::Monocle) | None if m == self.selmon => {
                let mut count = 0;
                let mut pos = 0;
                for &h in &mon.clients {
                    if self.clients[&h].is_visible_on(mon) {
                        count += 1;
                        if mon.sel == Some(h) {
                            pos = count;
                        }
                    }
                }
                if mon.layout().arrange.is_none() {
                    format!("<{}/{}>", pos, count)
                } else {
                    format!("[{}/{}]", pos, count)
                }
            }
            _ => mon.ltsymbol.clone(),
        }
    }

    /// Width of the status text, control bytes excluded, plus padding.
    pub fn status_width(&self) -> i32 {
        let segments = split_status(&self.stext);
        let text: i32 = segments
            .iter()
            .map(|(_, s)| self.conn.text_width(s))
            .sum();
        text + self.conn.font_height()
    }

    /// Draw the status text. Bytes `0x01..NUMCOLORS` switch the color
    /// scheme for the following characters and are not rendered.
    fn draw_status(&mut self, x: i32, w: i32) {
        self.conn.draw_text(x, w, 0, None, false);
        let segments = split_status(&self.stext);
        let mut sx = x + self.conn.font_height() / 2;
        for (scheme, text) in segments {
            let tw = self.conn.text_width(&text);
            self.conn.draw_text(sx, tw, scheme, Some(&text), false);
            sx += tw;
        }
    }
}

/// Split status text into `(scheme, run)` segments. The default scheme is 0
/// until the first switch byte.
fn split_status(stext: &str) -> Vec<(usize, String)> {
    let mut segments = Vec::new();
    let mut scheme = 0usize;
    let mut run = String::new();
    for ch in stext.chars() {
        let code = ch as u32;
        if code >= 1 && (code as usize) < config::NUMCOLORS {
            if !run.is_empty() {
                segments.push((scheme, std::mem::take(&mut run)));
            }
            scheme = code as usize;
        } else {
            run.push(ch);
        }
    }
    if !run.is_empty() {
        segments.push((scheme, run));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::split_status;

    #[test]
    fn status_runs_follow_switch_bytes() {
        let segs = split_status("\u{1}A\u{2}B");
        assert_eq!(segs, vec![(1, "A".to_string()), (2, "B".to_string())]);
    }

    #[test]
    fn status_without_switches_uses_scheme_zero() {
        assert_eq!(split_status("plain"), vec![(0, "plain".to_string())]);
    }

    #[test]
    fn leading_text_keeps_default_scheme() {
        let segs = split_status("ab\u{3}cd");
        assert_eq!(
            segs,
            vec![(0, "ab".to_string()), (3, "cd".to_string())]
        );
    }
}
