//! Procedural weather icons.
//!
//! Every icon is drawn from primitives into a 16-bit canvas at an animation
//! phase `t` in `[0, 1)`, so the same code scales to any icon size.

use std::f32::consts::TAU;

use crate::raster::{Canvas16, Rgb24, Rgb565};
use crate::weather::{Condition, IconCode};

const SUN: Rgb565 = Rgb24::new(255, 237, 128).to_rgb565();
const MOON: Rgb565 = Rgb24::new(230, 230, 200).to_rgb565();
const CLOUD: Rgb565 = Rgb24::new(200, 200, 210).to_rgb565();
const DARK_CLOUD: Rgb565 = Rgb24::new(110, 110, 125).to_rgb565();
const RAIN: Rgb565 = Rgb24::new(80, 140, 255).to_rgb565();
const SNOW: Rgb565 = Rgb565::WHITE;
const BOLT: Rgb565 = Rgb24::new(255, 220, 0).to_rgb565();
const MIST: Rgb565 = Rgb24::new(160, 160, 170).to_rgb565();

/// Rays around the sun
const RAY_COUNT: usize = 8;
/// Angular gap between the two lines of one ray
const RAY_SPREAD: f32 = TAU / 100.0;

struct Frame<'a> {
    canvas: &'a mut Canvas16,
    cx: i32,
    cy: i32,
    /// Smaller of width and height
    size: i32,
    daytime: bool,
    t: f32,
}

/// Clear `canvas` and draw `icon` centred on it
pub fn draw_icon(canvas: &mut Canvas16, icon: IconCode, t: f32) {
    canvas.fill_screen(Rgb565::BLACK);
    let (w, h) = (canvas.width() as i32, canvas.height() as i32);
    let mut frame = Frame {
        cx: w >> 1,
        cy: h >> 1,
        size: w.min(h),
        daytime: icon.daytime,
        t: t.rem_euclid(1.0),
        canvas,
    };

    match icon.condition {
        Condition::ClearSky => clear_sky(&mut frame),
        Condition::FewClouds => few_clouds(&mut frame),
        Condition::ScatteredClouds => scattered_clouds(&mut frame),
        Condition::BrokenClouds => broken_clouds(&mut frame),
        Condition::ShowerRain => shower_rain(&mut frame),
        Condition::Rain => rain(&mut frame),
        Condition::Thunderstorm => thunderstorm(&mut frame),
        Condition::Snow => snow(&mut frame),
        Condition::Mist => mist(&mut frame),
    }
}

// ============================================================================
// Building blocks
// ============================================================================

/// Double ring with a rotating crown of paired rays
fn sun(f: &mut Frame, cx: i32, cy: i32, r_outer: i32) {
    let r_inner = r_outer / 2;
    let r_mid = r_inner + 4;

    f.canvas.draw_circle(cx, cy, r_inner, SUN);
    f.canvas.draw_circle(cx, cy, r_inner - 1, SUN);

    let mut angle = f.t * TAU;
    for _ in 0..RAY_COUNT {
        let mut a = angle;
        for _ in 0..2 {
            let (sin, cos) = a.sin_cos();
            f.canvas.draw_line(
                cx + (cos * r_mid as f32) as i32,
                cy + (sin * r_mid as f32) as i32,
                cx + (cos * r_outer as f32) as i32,
                cy + (sin * r_outer as f32) as i32,
                SUN,
            );
            a += RAY_SPREAD;
        }
        angle += TAU / RAY_COUNT as f32;
    }
}

/// Crescent cut from a disc
fn moon(f: &mut Frame, cx: i32, cy: i32, r: i32) {
    f.canvas.fill_circle(cx, cy, r, MOON);
    f.canvas.fill_circle(cx + r / 2, cy - r / 3, r - r / 4, Rgb565::BLACK);
}

/// Small sun or moon peeking out behind a cloud
fn orb(f: &mut Frame, cx: i32, cy: i32, r: i32) {
    if f.daytime {
        f.canvas.fill_circle(cx, cy, r, SUN);
    } else {
        moon(f, cx, cy, r);
    }
}

/// Three puffs on a flat base; (x, y) is the middle of the base's top edge
fn cloud(f: &mut Frame, x: i32, y: i32, r: i32, color: Rgb565) {
    let side = r - r / 3;
    f.canvas.fill_circle(x - r, y, side, color);
    f.canvas.fill_circle(x, y - r / 2, r, color);
    f.canvas.fill_circle(x + r, y, side, color);
    f.canvas.fill_rect(x - r, y, 2 * r + 1, side + 1, color);
}

/// Slanted streaks falling below the cloud base
fn streaks(f: &mut Frame, count: i32, color: Rgb565) {
    let span = (f.size / 4).max(1);
    let top = f.cy + f.size / 8;
    let fall = (f.t * span as f32) as i32;
    for i in 0..count {
        let x = f.cx - f.size / 4 + i * f.size / (2 * count.max(1));
        let y = top + (fall + i * 3) % span;
        f.canvas.draw_line(x, y, x - 1, y + 3, color);
    }
}

// ============================================================================
// Conditions
// ============================================================================

fn clear_sky(f: &mut Frame) {
    let (cx, cy, size) = (f.cx, f.cy, f.size);
    if f.daytime {
        sun(f, cx, cy, size / 2);
    } else {
        moon(f, cx, cy, size * 3 / 8);
        // Twinkling star
        if (f.t * 4.0) as i32 % 2 == 0 {
            let (sx, sy) = (cx + size * 3 / 8, cy + size / 4);
            f.canvas.draw_fast_hline(sx - 1, sy, 3, SNOW);
            f.canvas.draw_fast_vline(sx, sy - 1, 3, SNOW);
        }
    }
}

fn few_clouds(f: &mut Frame) {
    let (cx, cy, size) = (f.cx, f.cy, f.size);
    orb(f, cx - size / 6, cy - size / 6, size / 5);
    cloud(f, cx + size / 12, cy + size / 8, size / 6, CLOUD);
}

fn scattered_clouds(f: &mut Frame) {
    let (cx, cy, size) = (f.cx, f.cy, f.size);
    // Drift left and right with the phase
    let drift = ((f.t * TAU).sin() * (size / 16) as f32) as i32;
    cloud(f, cx + drift, cy, size / 5, CLOUD);
}

fn broken_clouds(f: &mut Frame) {
    let (cx, cy, size) = (f.cx, f.cy, f.size);
    cloud(f, cx + size / 8, cy - size / 8, size / 6, DARK_CLOUD);
    cloud(f, cx - size / 12, cy + size / 10, size / 5, CLOUD);
}

fn shower_rain(f: &mut Frame) {
    let (cx, cy, size) = (f.cx, f.cy, f.size);
    cloud(f, cx, cy - size / 8, size / 5, DARK_CLOUD);
    streaks(f, 5, RAIN);
}

fn rain(f: &mut Frame) {
    let (cx, cy, size) = (f.cx, f.cy, f.size);
    orb(f, cx - size / 5, cy - size / 4, size / 6);
    cloud(f, cx, cy - size / 8, size / 5, CLOUD);
    streaks(f, 3, RAIN);
}

fn thunderstorm(f: &mut Frame) {
    let (cx, cy, size) = (f.cx, f.cy, f.size);
    cloud(f, cx, cy - size / 8, size / 5, DARK_CLOUD);

    // Flash off for a quarter of the cycle
    if (f.t * 8.0) as i32 % 4 == 0 {
        return;
    }
    let s = (size / 16).max(1);
    let points = [
        (cx + s, cy),
        (cx - s, cy + 3 * s),
        (cx + s, cy + 3 * s),
        (cx - 2 * s, cy + 7 * s),
    ];
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        f.canvas.draw_line(x0, y0, x1, y1, BOLT);
    }
}

fn snow(f: &mut Frame) {
    let (cx, cy, size) = (f.cx, f.cy, f.size);
    cloud(f, cx, cy - size / 8, size / 5, CLOUD);

    let span = (size / 4).max(1);
    let fall = (f.t * span as f32) as i32;
    for i in 0..4 {
        let x = cx - size / 4 + i * size / 6;
        let y = cy + size / 8 + (fall + i * 5) % span;
        f.canvas.draw_pixel(x, y, SNOW);
        f.canvas.draw_pixel(x + 1, y, SNOW);
    }
}

fn mist(f: &mut Frame) {
    let (cx, cy, size) = (f.cx, f.cy, f.size);
    let length = 2 * size / 3;
    for band in 0..4 {
        let y = cy - size / 4 + band * size / 6;
        let shift = ((f.t * TAU + band as f32).sin() * 3.0) as i32;
        f.canvas.draw_fast_hline(cx - size / 3 + shift, y, length, MIST);
    }
}
