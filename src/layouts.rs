//! Client arrangement algorithms.
//!
//! A [`Layout`] pairs a bar symbol with an optional arrange function; no
//! arrange function means floating behaviour. The engine is generic over the
//! X transport, so dispatch goes through the [`Arrange`] enum rather than a
//! bare fn pointer.

use crate::client::ClientHandle;
use crate::state::Rawm;
use crate::xconn::XConn;

#[derive(Debug)]
pub struct Layout {
    pub symbol: &'static str,
    pub arrange: Option<Arrange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrange {
    Tile,
    Monocle,
    BStack,
    BStackHoriz,
    GaplessGrid,
}

impl Arrange {
    pub fn run<X: XConn>(self, wm: &mut Rawm<X>, m: usize) {
        match self {
            Arrange::Tile => tile(wm, m),
            Arrange::Monocle => monocle(wm, m),
            Arrange::BStack => bstack(wm, m),
            Arrange::BStackHoriz => bstackhoriz(wm, m),
            Arrange::GaplessGrid => gaplessgrid(wm, m),
        }
    }
}

/// Master column on the left, remaining clients stacked on the right.
fn tile<X: XConn>(wm: &mut Rawm<X>, m: usize) {
    let tiled: Vec<ClientHandle> = wm.tiled_handles(m);
    let n = tiled.len();
    if n == 0 {
        return;
    }

    let (wx, wy, ww, wh) = wm.work_area(m);
    let nmaster = wm.mons[m].nmaster.max(0) as usize;
    let mfact = wm.mons[m].mfact;

    let mw = if n > nmaster {
        if nmaster > 0 {
            (ww as f32 * mfact) as i32
        } else {
            0
        }
    } else {
        ww
    };

    let mut my = 0;
    let mut ty = 0;
    for (i, &handle) in tiled.iter().enumerate() {
        let bw = wm.clients[&handle].bw;
        if i < nmaster {
            let h = (wh - my) / (n.min(nmaster) - i) as i32;
            wm.resize(handle, wx, wy + my, mw - 2 * bw, h - 2 * bw, false);
            my += wm.clients[&handle].height();
        } else {
            let h = (wh - ty) / (n - i) as i32;
            wm.resize(handle, wx + mw, wy + ty, ww - mw - 2 * bw, h - 2 * bw, false);
            ty += wm.clients[&handle].height();
        }
    }
}

/// Every visible tiled client takes the full work area.
fn monocle<X: XConn>(wm: &mut Rawm<X>, m: usize) {
    let tiled: Vec<ClientHandle> = wm.tiled_handles(m);
    let (wx, wy, ww, wh) = wm.work_area(m);

    for &handle in &tiled {
        let bw = wm.clients[&handle].bw;
        wm.resize(handle, wx, wy, ww - 2 * bw, wh - 2 * bw, false);
        if wm.clients[&handle].bw != 0 {
            let c = wm.clients.get_mut(&handle).unwrap();
            c.oldbw = c.bw;
            c.bw = 0;
            wm.resize_client(handle, wx, wy, ww, wh);
        }
    }
}

/// Masters side by side on top, the stack row below.
fn bstack<X: XConn>(wm: &mut Rawm<X>, m: usize) {
    let tiled: Vec<ClientHandle> = wm.tiled_handles(m);
    let n = tiled.len();
    if n == 0 {
        return;
    }

    let (wx, wy, ww, wh) = wm.work_area(m);
    let nmaster = wm.mons[m].nmaster.max(0) as usize;
    let mfact = wm.mons[m].mfact;

    let (mh, tw, ty) = if n > nmaster {
        let mh = if nmaster > 0 {
            (mfact * wh as f32) as i32
        } else {
            0
        };
        (mh, ww / (n - nmaster) as i32, wy + mh)
    } else {
        (wh, ww, wy)
    };

    let mut mx = 0;
    let mut tx = wx;
    for (i, &handle) in tiled.iter().enumerate() {
        let bw = wm.clients[&handle].bw;
        if i < nmaster {
            let w = (ww - mx) / (n.min(nmaster) - i) as i32;
            wm.resize(handle, wx + mx, wy, w - 2 * bw, mh - 2 * bw, false);
            mx += wm.clients[&handle].width();
        } else {
            let h = wh - mh;
            wm.resize(handle, tx, ty, tw - 2 * bw, h - 2 * bw, false);
            if tw != ww {
                tx += wm.clients[&handle].width();
            }
        }
    }
}

/// Masters side by side on top, the stack stacked vertically below at
/// full width.
fn bstackhoriz<X: XConn>(wm: &mut Rawm<X>, m: usize) {
    let tiled: Vec<ClientHandle> = wm.tiled_handles(m);
    let n = tiled.len();
    if n == 0 {
        return;
    }

    let (wx, wy, ww, wh) = wm.work_area(m);
    let nmaster = wm.mons[m].nmaster.max(0) as usize;
    let mfact = wm.mons[m].mfact;

    let (mh, th, ty) = if n > nmaster {
        let mh = if nmaster > 0 {
            (mfact * wh as f32) as i32
        } else {
            0
        };
        (mh, (wh - mh) / (n - nmaster) as i32, wy + mh)
    } else {
        (wh, wh, wy)
    };

    let mut mx = 0;
    let mut ty = ty;
    for (i, &handle) in tiled.iter().enumerate() {
        let bw = wm.clients[&handle].bw;
        if i < nmaster {
            let w = (ww - mx) / (n.min(nmaster) - i) as i32;
            wm.resize(handle, wx + mx, wy, w - 2 * bw, mh - 2 * bw, false);
            mx += wm.clients[&handle].width();
        } else {
            wm.resize(handle, wx, ty, ww - 2 * bw, th - 2 * bw, false);
            if th != wh {
                ty += wm.clients[&handle].height();
            }
        }
    }
}

/// Grid without gaps; columns grow by one row as needed to absorb the
/// remainder, filled column-major.
fn gaplessgrid<X: XConn>(wm: &mut Rawm<X>, m: usize) {
    let tiled: Vec<ClientHandle> = wm.tiled_handles(m);
    let n = tiled.len();
    if n == 0 {
        return;
    }

    let (wx, wy, ww, wh) = wm.work_area(m);
    let cols = grid_cols(n);
    let mut rows = n / cols;

    let cw = if cols > 0 { ww / cols as i32 } else { ww };
    let mut cn = 0; // current column
    let mut rn = 0; // current row
    for (i, &handle) in tiled.iter().enumerate() {
        if i / rows + 1 > cols - n % cols {
            rows = n / cols + 1;
        }
        let ch = if rows > 0 { wh / rows as i32 } else { wh };
        let bw = wm.clients[&handle].bw;
        let cx = wx + cn as i32 * cw;
        let cy = wy + rn as i32 * ch;
        wm.resize(handle, cx, cy, cw - 2 * bw, ch - 2 * bw, false);
        rn += 1;
        if rn >= rows {
            rn = 0;
            cn += 1;
        }
    }
}

/// Column count for the gapless grid: smallest square that fits, except
/// five clients prefer a 2:3 split over 1:2:2.
fn grid_cols(n: usize) -> usize {
    if n == 5 {
        return 2;
    }
    let mut cols = 0;
    while cols <= n / 2 {
        if cols * cols >= n {
            break;
        }
        cols += 1;
    }
    cols.max(1)
}

#[cfg(test)]
mod tests {
    use super::grid_cols;

    #[test]
    fn grid_prefers_two_columns_for_five() {
        assert_eq!(grid_cols(5), 2);
    }

    #[test]
    fn grid_cols_grow_with_client_count() {
        assert_eq!(grid_cols(1), 1);
        assert_eq!(grid_cols(2), 2);
        assert_eq!(grid_cols(4), 2);
        assert_eq!(grid_cols(6), 3);
        assert_eq!(grid_cols(9), 3);
        assert_eq!(grid_cols(10), 4);
    }
}
